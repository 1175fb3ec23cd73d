// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Post-parse data-model checks.
//!
//! These run once after parsing and feed the static error list:
//! duplicate option names, variant key arity, catch-all existence,
//! reserved annotations, and selectors that structurally lack an
//! annotation.

use crate::ast::{Annotation, Body, Declaration, Expression, Message, Operand, Pattern};
use crate::errors::StaticErrors;

/// Run every static data-model check over a parsed message.
pub(crate) fn validate(message: &Message, errors: &mut StaticErrors) {
    for declaration in &message.declarations {
        check_expression(&declaration.expression, errors);
    }
    match &message.body {
        Body::Pattern(pattern) => check_pattern(pattern, errors),
        Body::Selectors { selectors, variants } => {
            for selector in selectors {
                check_expression(selector, errors);
                if !selector_is_annotated(selector, &message.declarations) {
                    errors.set_missing_selector_annotation();
                }
            }
            for variant in variants {
                if variant.keys.len() != selectors.len() {
                    errors.set_variant_key_mismatch();
                }
                check_pattern(&variant.pattern, errors);
            }
            if !variants.iter().any(|v| v.keys.is_catch_all()) {
                errors.set_nonexhaustive_pattern();
            }
        }
    }
}

fn check_pattern(pattern: &Pattern, errors: &mut StaticErrors) {
    for part in &pattern.parts {
        if let crate::ast::PatternPart::Expression(expression) = part {
            check_expression(expression, errors);
        }
    }
}

fn check_expression(expression: &Expression, errors: &mut StaticErrors) {
    match &expression.annotation {
        Some(Annotation::Function { options, .. }) => {
            for name in options.duplicate_names() {
                errors.set_duplicate_option_name(name);
            }
        }
        Some(Annotation::Reserved { source }) => {
            errors.set_reserved(source);
        }
        None => {}
    }
}

// A selector needs an annotation, except when its operand can refer to
// a runtime argument: arguments carry typed values and are checked
// dynamically. `let`-bound variables are followed through their
// declarations, respecting scope (a declaration only sees the ones
// before it).
fn selector_is_annotated(expression: &Expression, declarations: &[Declaration]) -> bool {
    if expression.annotation.is_some() {
        return true;
    }
    match &expression.operand {
        Operand::Variable(name) => {
            match declarations.iter().rposition(|d| d.name == *name) {
                Some(i) => selector_is_annotated(&declarations[i].expression, &declarations[..i]),
                None => true,
            }
        }
        Operand::Literal(_) | Operand::Absent => false,
    }
}
