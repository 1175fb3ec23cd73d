// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Per-call formatting state and the formatter cache.

use std::collections::HashMap;

use crate::args::{MessageArguments, Value};
use crate::errors::{DynamicError, DynamicErrors};
use crate::registry::Formatter;

/// The per-compiled-message formatter cache: function name to the
/// instance built by its factory. First use populates; later uses hit
/// the cache. Selectors are never cached.
#[derive(Default)]
pub(crate) struct CachedFormatters {
    cache: HashMap<String, Box<dyn Formatter>>,
}

impl CachedFormatters {
    pub(crate) fn new() -> Self {
        CachedFormatters::default()
    }

    pub(crate) fn get(&self, name: &str) -> Option<&dyn Formatter> {
        self.cache.get(name).map(|f| f.as_ref())
    }

    pub(crate) fn contains(&self, name: &str) -> bool {
        self.cache.contains_key(name)
    }

    pub(crate) fn insert(&mut self, name: &str, formatter: Box<dyn Formatter>) {
        self.cache.insert(name.to_owned(), formatter);
    }
}

/// Everything one format call needs: the arguments, the dynamic error
/// list (fresh per call), and exclusive access to the formatter cache.
pub(crate) struct MessageContext<'c> {
    pub(crate) arguments: &'c MessageArguments,
    pub(crate) errors: DynamicErrors,
    pub(crate) cache: &'c mut CachedFormatters,
}

impl<'c> MessageContext<'c> {
    pub(crate) fn new(arguments: &'c MessageArguments, cache: &'c mut CachedFormatters) -> Self {
        MessageContext {
            arguments,
            errors: DynamicErrors::new(),
            cache,
        }
    }

    pub(crate) fn global(&self, name: &str) -> Option<&'c Value> {
        self.arguments.get(name)
    }

    pub(crate) fn into_errors(self) -> Vec<DynamicError> {
        self.errors.into_list()
    }
}
