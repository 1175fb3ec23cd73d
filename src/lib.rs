// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! # MessageFormat 2.0
//!
//! This crate implements the draft [MessageFormat 2.0] syntax and
//! formatting model: messages are short programs combining literal
//! text with placeholders that reference arguments, call formatting
//! functions, and select between variants with multi-arm selectors.
//!
//! A message is compiled once into a [`MessageFormatter`] and then
//! formatted any number of times with different arguments:
//!
//! ```
//! use message_format2::{arg, MessageFormatter};
//!
//! let mut formatter = MessageFormatter::builder()
//!     .pattern("{hello {$place}}")
//!     .build()
//!     .expect("a pattern was set");
//! let (result, errors) = formatter.format_to_string(&arg("place", "world"));
//! assert_eq!(result, "hello world");
//! assert!(errors.is_empty());
//! ```
//!
//! Selection works the same way:
//!
//! ```
//! use message_format2::{arg, MessageFormatter};
//!
//! let mut formatter = MessageFormatter::builder()
//!     .pattern("match {$count :plural} when 1 {one apple} when * {{$count} apples}")
//!     .build()
//!     .expect("a pattern was set");
//! let (result, _) = formatter.format_to_string(&arg("count", 1));
//! assert_eq!(result, "one apple");
//! let (result, _) = formatter.format_to_string(&arg("count", 3));
//! assert_eq!(result, "3 apples");
//! ```
//!
//! Errors never abort formatting. Each failure substitutes the
//! expression's fallback form in the output and is recorded in the
//! [`ErrorReport`] returned alongside the string.
//!
//! Custom formatting and selection functions are registered through a
//! [`FunctionRegistry`] and passed, borrowed, to the builder.
//!
//! [MessageFormat 2.0]: https://github.com/unicode-org/message-format-wg

#![warn(missing_docs)]

pub mod ast;

mod args;
mod chars;
mod context;
mod env;
mod errors;
mod format;
mod functions;
mod parse;
mod registry;
mod validate;
mod value;

pub use args::{arg, MessageArguments, Value};
pub use errors::{
    BuildError, DynamicError, DynamicErrorKind, ErrorCode, ErrorReport, FunctionError, ParseError,
    StaticError, StaticErrorKind,
};
pub use format::{MessageFormatter, MessageFormatterBuilder};
pub use registry::{
    Formatter, FormatterFactory, FunctionRegistry, FunctionRegistryBuilder, Selector,
    SelectorFactory,
};
pub use value::{FormattedPlaceholder, FunctionValue, Output, ResolvedOptions};
