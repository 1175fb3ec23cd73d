// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Runtime arguments for formatting a message.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

/// A typed argument value.
///
/// Opaque objects are only meaningful to custom functions; the built-in
/// formatters reject them.
#[derive(Clone)]
pub enum Value {
    /// A string.
    String(String),
    /// A 64-bit integer.
    Integer(i64),
    /// A double-precision float.
    Double(f64),
    /// A number kept in its decimal string form.
    Decimal(String),
    /// A date, as milliseconds since the Unix epoch.
    Date(i64),
    /// A list of strings.
    List(Vec<String>),
    /// An opaque object, passed through to custom functions.
    Object(Rc<dyn Any>),
}

impl Value {
    /// The numeric interpretation of this value, if it has one.
    /// Decimal and plain strings are parsed.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Integer(i) => Some(*i as f64),
            Value::Double(d) => Some(*d),
            Value::Decimal(s) | Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::String(s) => write!(f, "String({:?})", s),
            Value::Integer(i) => write!(f, "Integer({})", i),
            Value::Double(d) => write!(f, "Double({})", d),
            Value::Decimal(s) => write!(f, "Decimal({:?})", s),
            Value::Date(ms) => write!(f, "Date({})", ms),
            Value::List(items) => write!(f, "List({:?})", items),
            Value::Object(_) => f.write_str("Object(..)"),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Integer(a), Value::Integer(b)) => a == b,
            (Value::Double(a), Value::Double(b)) => a == b,
            (Value::Decimal(a), Value::Decimal(b)) => a == b,
            (Value::Date(a), Value::Date(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_owned())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Integer(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Integer(value as i64)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Double(value)
    }
}

impl From<Vec<String>> for Value {
    fn from(value: Vec<String>) -> Self {
        Value::List(value)
    }
}

/// Holds the arguments being used to format a message: a mapping from
/// argument names to typed values.
///
/// ```
/// use message_format2::arg;
///
/// let args = arg("name", "John").arg("count", 3);
/// assert!(args.get("name").is_some());
/// assert!(args.get("count").is_some());
/// ```
#[derive(Debug, Clone, Default)]
pub struct MessageArguments {
    values: HashMap<String, Value>,
}

/// Create an argument holder with one argument set. Further arguments
/// are chained with [`MessageArguments::arg`].
pub fn arg<T>(name: &str, value: T) -> MessageArguments
where
    Value: From<T>,
{
    MessageArguments::new().arg(name, value)
}

impl MessageArguments {
    /// An empty argument mapping.
    pub fn new() -> Self {
        MessageArguments::default()
    }

    /// Add an argument, replacing any previous value under the same
    /// name.
    pub fn arg<T>(mut self, name: &str, value: T) -> Self
    where
        Value: From<T>,
    {
        self.values.insert(name.to_owned(), Value::from(value));
        self
    }

    /// Add a date argument, given as milliseconds since the Unix epoch.
    pub fn date(mut self, name: &str, epoch_millis: i64) -> Self {
        self.values.insert(name.to_owned(), Value::Date(epoch_millis));
        self
    }

    /// Add a number kept in its decimal string form.
    pub fn decimal(mut self, name: &str, digits: &str) -> Self {
        self.values
            .insert(name.to_owned(), Value::Decimal(digits.to_owned()));
        self
    }

    /// Add an opaque object argument for custom functions.
    pub fn object(mut self, name: &str, value: Rc<dyn Any>) -> Self {
        self.values.insert(name.to_owned(), Value::Object(value));
        self
    }

    /// Retrieve the argument with the given `name`.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    /// True when an argument with the given `name` is present.
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }
}
