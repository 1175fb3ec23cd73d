// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Resolved values flowing through the evaluator.
//!
//! A [`FormattedPlaceholder`] is the resolved form of an operand: the
//! input value (if any), the formatted output (if a function produced
//! one), and the fallback surface string used when evaluation fails.
//! A [`FunctionValue`] is what a formatting function returns; the
//! built-in functions provide number, datetime and string values, and
//! custom functions may return their own implementations.

use std::fmt;

use language_tags::LanguageTag;

use crate::args::Value;
use crate::functions::{format_date_with_defaults, format_number_with_defaults};

/// Options after resolution: every variable reference substituted by
/// its value. Insertion order is kept; inserting a name twice replaces
/// the earlier value.
#[derive(Debug, Clone, Default)]
pub struct ResolvedOptions {
    options: Vec<(String, Value)>,
}

impl ResolvedOptions {
    /// An empty option set.
    pub fn new() -> Self {
        ResolvedOptions::default()
    }

    /// Insert an option, replacing any earlier value under `name`.
    pub fn insert(&mut self, name: impl Into<String>, value: Value) {
        let name = name.into();
        if let Some(slot) = self.options.iter_mut().find(|(n, _)| *n == name) {
            slot.1 = value;
        } else {
            self.options.push((name, value));
        }
    }

    /// The value of the option `name`.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.options
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    /// The option as a string, if it is one.
    pub fn get_str(&self, name: &str) -> Option<&str> {
        match self.get(name) {
            Some(Value::String(s)) | Some(Value::Decimal(s)) => Some(s),
            _ => None,
        }
    }

    /// The option interpreted as a number. String values parse the way
    /// numeric literals do.
    pub fn get_number(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(Value::as_number)
    }

    /// The option interpreted as a digit count.
    pub fn get_digits(&self, name: &str) -> Option<usize> {
        let n = self.get_number(name)?;
        if n >= 0.0 && n.fract() == 0.0 {
            Some(n as usize)
        } else {
            None
        }
    }

    /// Iterate over the options in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.options.iter().map(|(n, v)| (n.as_str(), v))
    }

    /// The number of options.
    pub fn len(&self) -> usize {
        self.options.len()
    }

    /// True when no options were given.
    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }
}

/// The formatted output carried by a placeholder.
#[derive(Debug, Clone, PartialEq)]
pub enum Output {
    /// String output.
    Text(String),
    /// Numeric output, keeping the exact value alongside its rendering
    /// so selection on formatted numbers still sees the number.
    Number {
        /// The numeric value.
        value: f64,
        /// The rendered form.
        formatted: String,
    },
}

impl Output {
    fn as_str(&self) -> &str {
        match self {
            Output::Text(s) => s,
            Output::Number { formatted, .. } => formatted,
        }
    }
}

/// A resolved operand: input value, optional formatted output, and the
/// fallback surface string substituted on failure.
#[derive(Debug, Clone)]
pub struct FormattedPlaceholder {
    input: Option<Value>,
    output: Option<Output>,
    fallback: String,
    fallen_back: bool,
}

impl FormattedPlaceholder {
    /// A placeholder holding a value, with the given fallback surface
    /// form (`$name`, `|literal|`, or `:function`).
    pub fn from_value(value: Value, fallback: impl Into<String>) -> Self {
        FormattedPlaceholder {
            input: Some(value),
            output: None,
            fallback: fallback.into(),
            fallen_back: false,
        }
    }

    /// A placeholder for an absent operand.
    pub fn absent(fallback: impl Into<String>) -> Self {
        FormattedPlaceholder {
            input: None,
            output: None,
            fallback: fallback.into(),
            fallen_back: false,
        }
    }

    /// A placeholder in the error state: it renders as its fallback.
    pub fn fallback(fallback: impl Into<String>) -> Self {
        FormattedPlaceholder {
            input: None,
            output: None,
            fallback: fallback.into(),
            fallen_back: true,
        }
    }

    /// The resolved input value, if any.
    pub fn input(&self) -> Option<&Value> {
        self.input.as_ref()
    }

    /// The formatted output, if a function has produced one.
    pub fn output(&self) -> Option<&Output> {
        self.output.as_ref()
    }

    /// Attach formatted output.
    pub fn set_output(&mut self, output: Output) {
        self.output = Some(output);
    }

    /// The fallback surface string, without the surrounding braces.
    pub fn fallback_str(&self) -> &str {
        &self.fallback
    }

    /// Replace the fallback surface string, keeping everything else.
    /// Used when a value resolved through a variable should fall back
    /// to the variable's own surface form.
    pub fn with_fallback(mut self, fallback: impl Into<String>) -> Self {
        self.fallback = fallback.into();
        self
    }

    /// True when evaluation failed and this placeholder renders as its
    /// fallback.
    pub fn is_fallback(&self) -> bool {
        self.fallen_back
    }

    /// The numeric reading of this placeholder, from its output or its
    /// input value.
    pub fn numeric_value(&self) -> Option<f64> {
        if let Some(Output::Number { value, .. }) = &self.output {
            return Some(*value);
        }
        if self.fallen_back {
            return None;
        }
        self.input.as_ref().and_then(Value::as_number)
    }

    /// The string this placeholder selects on: the formatted output if
    /// present, otherwise the input under default conventions. `None`
    /// in the error state and for opaque objects.
    pub fn selection_string(&self, locale: &LanguageTag) -> Option<String> {
        if self.fallen_back {
            return None;
        }
        if let Some(output) = &self.output {
            return Some(output.as_str().to_owned());
        }
        match self.input.as_ref() {
            Some(Value::Object(_)) | None => None,
            Some(value) => Some(format_value_with_defaults(value, locale)),
        }
    }

    /// Format this placeholder to a string: the output if present, the
    /// input under the locale's default conventions otherwise, or the
    /// brace-wrapped fallback in the error state.
    pub fn format_to_string(&self, locale: &LanguageTag) -> String {
        if self.fallen_back {
            return format!("{{{}}}", self.fallback);
        }
        if let Some(output) = &self.output {
            return output.as_str().to_owned();
        }
        match self.input.as_ref() {
            Some(Value::Object(_)) => format!("{{{}}}", self.fallback),
            Some(value) => format_value_with_defaults(value, locale),
            None => String::new(),
        }
    }
}

/// Format a value with the locale's default conventions, without any
/// function applied.
pub(crate) fn format_value_with_defaults(value: &Value, locale: &LanguageTag) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Integer(i) => i.to_string(),
        Value::Double(d) => format_number_with_defaults(*d),
        Value::Decimal(s) => s.clone(),
        Value::Date(ms) => format_date_with_defaults(*ms, locale),
        Value::List(items) => items.join(", "),
        Value::Object(_) => String::new(),
    }
}

/// The result of invoking a formatting function: the operand, the
/// resolved options, and a formatted representation.
pub trait FunctionValue: fmt::Debug {
    /// Render this value to a string for the given locale.
    fn format_to_string(&self, locale: &LanguageTag) -> String;

    /// Rank the candidate keys this value prefers, most preferred
    /// first. The default implementation expresses no preference.
    fn select_keys(&self, candidates: &[String]) -> Vec<String> {
        let _ = candidates;
        Vec::new()
    }

    /// The operand the function was applied to.
    fn operand(&self) -> Option<&Value>;

    /// The options after variable substitution.
    fn resolved_options(&self) -> &ResolvedOptions;

    /// The numeric reading of this value, if it has one. Used so that
    /// values bound by `let` keep selecting numerically.
    fn numeric_value(&self) -> Option<f64> {
        None
    }
}
