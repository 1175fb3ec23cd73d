// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! The function registry.
//!
//! A registry maps function names to factories. Selector factories and
//! formatter factories live in disjoint namespaces: a name is one or
//! the other, never both. The engine composes the built-in registry
//! with an optional caller-supplied custom registry; the lookup policy
//! across the two lives in the formatter.

use std::collections::HashMap;

use language_tags::LanguageTag;

use crate::errors::FunctionError;
use crate::value::{FormattedPlaceholder, FunctionValue, ResolvedOptions};

/// Constructs formatter instances for one function name. Factories may
/// hold mutable state across messages, so a fresh formatter is created
/// per compiled message (and then cached there).
pub trait FormatterFactory {
    /// Construct a formatter for the given locale.
    fn create_formatter(&self, locale: &LanguageTag) -> Result<Box<dyn Formatter>, FunctionError>;
}

/// A formatting function.
pub trait Formatter {
    /// Apply the function to a resolved operand and resolved options.
    fn format(
        &self,
        operand: FormattedPlaceholder,
        options: ResolvedOptions,
    ) -> Result<Box<dyn FunctionValue>, FunctionError>;
}

/// Constructs selector instances for one function name. Selectors are
/// never cached; a fresh one is constructed per `match`.
pub trait SelectorFactory {
    /// Construct a selector for the given locale.
    fn create_selector(&self, locale: &LanguageTag) -> Result<Box<dyn Selector>, FunctionError>;
}

/// A selection function.
pub trait Selector {
    /// Rank the candidate keys against the operand, returning an
    /// ordered subset of `candidates`, most preferred first. The
    /// wildcard key is never passed in; the engine handles it.
    fn select_keys(
        &self,
        operand: &FormattedPlaceholder,
        options: &ResolvedOptions,
        candidates: &[String],
    ) -> Result<Vec<String>, FunctionError>;
}

/// A name-indexed dispatch table of formatter and selector factories.
#[derive(Default)]
pub struct FunctionRegistry {
    formatters: HashMap<String, Box<dyn FormatterFactory>>,
    selectors: HashMap<String, Box<dyn SelectorFactory>>,
}

impl FunctionRegistry {
    /// Start building a registry.
    pub fn builder() -> FunctionRegistryBuilder {
        FunctionRegistryBuilder::default()
    }

    /// The formatter factory registered under `name`.
    pub fn formatter(&self, name: &str) -> Option<&dyn FormatterFactory> {
        self.formatters.get(name).map(|f| f.as_ref())
    }

    /// The selector factory registered under `name`.
    pub fn selector(&self, name: &str) -> Option<&dyn SelectorFactory> {
        self.selectors.get(name).map(|s| s.as_ref())
    }

    /// True when `name` is registered as a formatter.
    pub fn has_formatter(&self, name: &str) -> bool {
        self.formatters.contains_key(name)
    }

    /// True when `name` is registered as a selector.
    pub fn has_selector(&self, name: &str) -> bool {
        self.selectors.contains_key(name)
    }
}

/// Builds a [`FunctionRegistry`], one factory at a time.
///
/// Registering a name as a formatter removes any selector previously
/// registered under that name, and the other way around: a name is
/// always exactly one kind.
#[derive(Default)]
pub struct FunctionRegistryBuilder {
    formatters: HashMap<String, Box<dyn FormatterFactory>>,
    selectors: HashMap<String, Box<dyn SelectorFactory>>,
}

impl FunctionRegistryBuilder {
    /// Register a formatter factory under `name`.
    pub fn formatter(
        mut self,
        name: &str,
        factory: impl FormatterFactory + 'static,
    ) -> Self {
        self.selectors.remove(name);
        self.formatters.insert(name.to_owned(), Box::new(factory));
        self
    }

    /// Register a selector factory under `name`.
    pub fn selector(mut self, name: &str, factory: impl SelectorFactory + 'static) -> Self {
        self.formatters.remove(name);
        self.selectors.insert(name.to_owned(), Box::new(factory));
        self
    }

    /// Finish building.
    pub fn build(self) -> FunctionRegistry {
        FunctionRegistry {
            formatters: self.formatters,
            selectors: self.selectors,
        }
    }
}
