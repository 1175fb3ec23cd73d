// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! The error taxonomy.
//!
//! Errors are split into two classes. *Static* errors are determined by
//! the source text and the data model alone: they are final once a
//! message has been compiled. *Dynamic* errors depend on the arguments
//! of a particular format call and are reset between calls. No error of
//! either class aborts formatting; each one substitutes a fallback
//! string at the point of failure.

use std::fmt::{self, Display};

use thiserror::Error;

/// The position of the first syntax error in a message pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("syntax error at line {line}, offset {offset}")]
pub struct ParseError {
    /// The number of line feeds before the error.
    pub line: u32,
    /// The byte index of the first offending character.
    pub offset: usize,
}

/// An error raised by `MessageFormatterBuilder::build`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum BuildError {
    /// Neither a pattern nor a data model was supplied.
    #[error("a pattern or a data model must be set before building")]
    InvalidState,
}

/// An error raised by a formatter or selector implementation. The
/// engine maps it to a formatting or selector error and substitutes
/// the fallback string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct FunctionError(
    /// What went wrong, in the function's own words.
    pub String,
);

impl FunctionError {
    /// Construct a function error with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        FunctionError(message.into())
    }
}

/// The closed set of stable external error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ErrorCode {
    /// The message could not be parsed.
    #[error("syntax error")]
    Syntax,
    /// An option name occurred twice in one expression.
    #[error("duplicate option name")]
    DuplicateOptionName,
    /// A variant's key count differs from the selector count.
    #[error("variant key mismatch")]
    VariantKeyMismatch,
    /// A `match` has no variant with only wildcard keys.
    #[error("nonexhaustive pattern")]
    NonexhaustivePattern,
    /// A selector expression needs an annotation and has none.
    #[error("missing selector annotation")]
    MissingSelectorAnnotation,
    /// A reserved annotation was used (unsupported property).
    #[error("unsupported property")]
    Reserved,
    /// A function name is registered in no registry.
    #[error("unknown function")]
    UnknownFunction,
    /// A variable is neither a declared local nor an argument.
    #[error("unresolved variable")]
    UnresolvedVariable,
    /// A formatting function failed or was misused.
    #[error("formatting error")]
    Formatting,
    /// A selector function failed or was misused.
    #[error("selector error")]
    Selector,
}

/// The kinds of static (syntax and data model) errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StaticErrorKind {
    /// The source could not be parsed.
    Syntax,
    /// An option name occurred twice in one expression.
    DuplicateOptionName,
    /// A variant's key count differs from the selector count.
    VariantKeyMismatch,
    /// A `match` has no catch-all variant.
    NonexhaustivePattern,
    /// A selector expression needs an annotation and has none.
    MissingSelectorAnnotation,
    /// A reserved annotation occurs in the message.
    Reserved,
}

impl StaticErrorKind {
    /// The external code this kind maps to.
    pub fn code(self) -> ErrorCode {
        match self {
            StaticErrorKind::Syntax => ErrorCode::Syntax,
            StaticErrorKind::DuplicateOptionName => ErrorCode::DuplicateOptionName,
            StaticErrorKind::VariantKeyMismatch => ErrorCode::VariantKeyMismatch,
            StaticErrorKind::NonexhaustivePattern => ErrorCode::NonexhaustivePattern,
            StaticErrorKind::MissingSelectorAnnotation => ErrorCode::MissingSelectorAnnotation,
            StaticErrorKind::Reserved => ErrorCode::Reserved,
        }
    }
}

/// The kinds of dynamic (resolution and formatting) errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DynamicErrorKind {
    /// A variable is neither a declared local nor an argument.
    UnresolvedVariable,
    /// A function name is registered in no registry.
    UnknownFunction,
    /// A formatting function failed or was misused.
    Formatting,
    /// A selector function failed or was misused.
    Selector,
}

impl DynamicErrorKind {
    /// The external code this kind maps to.
    pub fn code(self) -> ErrorCode {
        match self {
            DynamicErrorKind::UnresolvedVariable => ErrorCode::UnresolvedVariable,
            DynamicErrorKind::UnknownFunction => ErrorCode::UnknownFunction,
            DynamicErrorKind::Formatting => ErrorCode::Formatting,
            DynamicErrorKind::Selector => ErrorCode::Selector,
        }
    }
}

/// A recorded static error with the offending name, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticError {
    /// The kind of error.
    pub kind: StaticErrorKind,
    /// The offending option name, annotation text, or similar.
    pub detail: String,
}

impl fmt::Display for StaticError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.detail.is_empty() {
            self.kind.code().fmt(f)
        } else {
            write!(f, "{}: {}", self.kind.code(), self.detail)
        }
    }
}

/// A recorded dynamic error with the offending name, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DynamicError {
    /// The kind of error.
    pub kind: DynamicErrorKind,
    /// The offending variable or function name, or similar.
    pub detail: String,
}

impl fmt::Display for DynamicError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.detail.is_empty() {
            self.kind.code().fmt(f)
        } else {
            write!(f, "{}: {}", self.kind.code(), self.detail)
        }
    }
}

/// Accumulator for static errors, first-seen order, with flags for
/// fast per-class queries.
#[derive(Debug, Clone, Default)]
pub(crate) struct StaticErrors {
    errors: Vec<StaticError>,
    syntax: bool,
    data_model: bool,
}

impl StaticErrors {
    pub(crate) fn new() -> Self {
        StaticErrors::default()
    }

    pub(crate) fn add_syntax_error(&mut self) {
        self.syntax = true;
        self.errors.push(StaticError {
            kind: StaticErrorKind::Syntax,
            detail: String::new(),
        });
    }

    pub(crate) fn set_duplicate_option_name(&mut self, name: &str) {
        self.data_model = true;
        self.errors.push(StaticError {
            kind: StaticErrorKind::DuplicateOptionName,
            detail: name.to_owned(),
        });
    }

    pub(crate) fn set_variant_key_mismatch(&mut self) {
        self.data_model = true;
        self.errors.push(StaticError {
            kind: StaticErrorKind::VariantKeyMismatch,
            detail: String::new(),
        });
    }

    pub(crate) fn set_nonexhaustive_pattern(&mut self) {
        self.data_model = true;
        self.errors.push(StaticError {
            kind: StaticErrorKind::NonexhaustivePattern,
            detail: String::new(),
        });
    }

    pub(crate) fn set_missing_selector_annotation(&mut self) {
        self.data_model = true;
        self.errors.push(StaticError {
            kind: StaticErrorKind::MissingSelectorAnnotation,
            detail: String::new(),
        });
    }

    pub(crate) fn set_reserved(&mut self, source: &str) {
        self.data_model = true;
        self.errors.push(StaticError {
            kind: StaticErrorKind::Reserved,
            detail: source.to_owned(),
        });
    }

    pub(crate) fn has_syntax_error(&self) -> bool {
        self.syntax
    }

    pub(crate) fn has_data_model_error(&self) -> bool {
        self.data_model
    }

    pub(crate) fn list(&self) -> &[StaticError] {
        &self.errors
    }
}

/// Accumulator for dynamic errors, first-seen order. One instance
/// lives per format call.
#[derive(Debug, Default)]
pub(crate) struct DynamicErrors {
    errors: Vec<DynamicError>,
}

impl DynamicErrors {
    pub(crate) fn new() -> Self {
        DynamicErrors::default()
    }

    pub(crate) fn set_unresolved_variable(&mut self, name: &str) {
        self.errors.push(DynamicError {
            kind: DynamicErrorKind::UnresolvedVariable,
            detail: name.to_owned(),
        });
    }

    pub(crate) fn set_unknown_function(&mut self, name: &str) {
        self.errors.push(DynamicError {
            kind: DynamicErrorKind::UnknownFunction,
            detail: name.to_owned(),
        });
    }

    pub(crate) fn set_formatting_error(&mut self, detail: impl Into<String>) {
        self.errors.push(DynamicError {
            kind: DynamicErrorKind::Formatting,
            detail: detail.into(),
        });
    }

    pub(crate) fn set_selector_error(&mut self, detail: impl Into<String>) {
        self.errors.push(DynamicError {
            kind: DynamicErrorKind::Selector,
            detail: detail.into(),
        });
    }

    pub(crate) fn into_list(self) -> Vec<DynamicError> {
        self.errors
    }
}

/// The full error report of one format call: every static error of the
/// compiled message plus every dynamic error of this call, each list in
/// first-seen order.
#[derive(Debug, Clone, Default)]
pub struct ErrorReport {
    statics: Vec<StaticError>,
    dynamics: Vec<DynamicError>,
}

impl ErrorReport {
    pub(crate) fn new(statics: Vec<StaticError>, dynamics: Vec<DynamicError>) -> Self {
        ErrorReport { statics, dynamics }
    }

    /// True when neither list holds an error.
    pub fn is_empty(&self) -> bool {
        self.statics.is_empty() && self.dynamics.is_empty()
    }

    /// The single status code of this call: the first static error if
    /// any, else the first dynamic error, else `None`.
    pub fn first_code(&self) -> Option<ErrorCode> {
        if let Some(e) = self.statics.first() {
            return Some(e.kind.code());
        }
        self.dynamics.first().map(|e| e.kind.code())
    }

    /// Fast per-kind query.
    pub fn has(&self, code: ErrorCode) -> bool {
        self.statics.iter().any(|e| e.kind.code() == code)
            || self.dynamics.iter().any(|e| e.kind.code() == code)
    }

    /// The static errors, first-seen order.
    pub fn static_errors(&self) -> &[StaticError] {
        &self.statics
    }

    /// The dynamic errors of this call, first-seen order.
    pub fn dynamic_errors(&self) -> &[DynamicError] {
        &self.dynamics
    }
}
