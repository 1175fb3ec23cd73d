// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! The message formatter: compilation, evaluation and selection.
//!
//! A [`MessageFormatter`] owns the parsed data model, the standard
//! function registry, the per-message formatter cache, and the static
//! error list. The custom registry, when present, is borrowed from the
//! caller. Formatting takes a mutable receiver because the formatter
//! cache is populated lazily; distinct formatter instances may be used
//! concurrently, one instance may not.

use language_tags::LanguageTag;
use log::{debug, trace};

use crate::args::{MessageArguments, Value};
use crate::ast::{
    Annotation, Body, Declaration, Expression, Message, Operand, OptionMap, OptionValue, Pattern,
    PatternPart, Variant,
};
use crate::context::{CachedFormatters, MessageContext};
use crate::env::{Closure, Environment};
use crate::errors::{BuildError, DynamicErrors, ErrorReport, ParseError, StaticErrors};
use crate::functions::standard_registry;
use crate::parse::parse;
use crate::registry::{Formatter, FormatterFactory, FunctionRegistry, Selector, SelectorFactory};
use crate::validate::validate;
use crate::value::{FormattedPlaceholder, FunctionValue, Output, ResolvedOptions};

fn default_locale() -> LanguageTag {
    LanguageTag {
        language: Some("en".to_owned()),
        ..Default::default()
    }
}

/// Builds a [`MessageFormatter`].
///
/// Exactly one of [`pattern`](Self::pattern) and
/// [`data_model`](Self::data_model) must be set before
/// [`build`](Self::build); setting one clears the other. The locale
/// defaults to `en`.
pub struct MessageFormatterBuilder<'r> {
    pattern: Option<String>,
    data_model: Option<Message>,
    locale: LanguageTag,
    custom_registry: Option<&'r FunctionRegistry>,
}

impl<'r> Default for MessageFormatterBuilder<'r> {
    fn default() -> Self {
        MessageFormatterBuilder {
            pattern: None,
            data_model: None,
            locale: default_locale(),
            custom_registry: None,
        }
    }
}

impl<'r> MessageFormatterBuilder<'r> {
    /// A builder with no pattern or data model set.
    pub fn new() -> Self {
        MessageFormatterBuilder::default()
    }

    /// Set the pattern to parse. Clears any data model set earlier.
    pub fn pattern(mut self, pattern: impl Into<String>) -> Self {
        self.data_model = None;
        self.pattern = Some(pattern.into());
        self
    }

    /// Set a ready-made data model. Clears any pattern set earlier.
    pub fn data_model(mut self, message: Message) -> Self {
        self.pattern = None;
        self.data_model = Some(message);
        self
    }

    /// Set the locale to format for.
    pub fn locale(mut self, locale: LanguageTag) -> Self {
        self.locale = locale;
        self
    }

    /// Borrow a custom function registry. The registry is not copied;
    /// it must outlive the built formatter.
    pub fn function_registry(mut self, registry: &'r FunctionRegistry) -> Self {
        self.custom_registry = Some(registry);
        self
    }

    /// Build the formatter.
    ///
    /// A syntax error does not fail the build: the error is recorded,
    /// retained for [`MessageFormatter::parse_error`], and formatting
    /// produces best-effort output. Only a builder with neither a
    /// pattern nor a data model fails.
    pub fn build(self) -> Result<MessageFormatter<'r>, BuildError> {
        let mut static_errors = StaticErrors::new();
        let (data_model, normalized_input, parse_error) = match (self.pattern, self.data_model) {
            (None, None) => return Err(BuildError::InvalidState),
            (Some(pattern), _) => match parse(&pattern) {
                Ok(message) => {
                    let normalized = message.to_string();
                    (message, normalized, None)
                }
                Err(error) => {
                    static_errors.add_syntax_error();
                    (Message::empty(), String::new(), Some(error))
                }
            },
            (None, Some(message)) => {
                let normalized = message.to_string();
                (message, normalized, None)
            }
        };
        validate(&data_model, &mut static_errors);
        Ok(MessageFormatter {
            locale: self.locale,
            standard_registry: standard_registry(),
            custom_registry: self.custom_registry,
            data_model,
            normalized_input,
            cached_formatters: CachedFormatters::new(),
            static_errors,
            parse_error,
        })
    }
}

/// A compiled message.
///
/// Owns the data model, the standard function registry, the formatter
/// cache and the static error list; borrows the custom registry.
pub struct MessageFormatter<'r> {
    locale: LanguageTag,
    standard_registry: FunctionRegistry,
    custom_registry: Option<&'r FunctionRegistry>,
    data_model: Message,
    normalized_input: String,
    cached_formatters: CachedFormatters,
    static_errors: StaticErrors,
    parse_error: Option<ParseError>,
}

impl<'r> MessageFormatter<'r> {
    /// Start building a formatter.
    pub fn builder() -> MessageFormatterBuilder<'r> {
        MessageFormatterBuilder::new()
    }

    /// Format the message with the given arguments.
    ///
    /// Returns the formatted string together with the full error
    /// report of this call. Errors never abort formatting; each one
    /// substitutes a fallback string at the point of failure.
    pub fn format_to_string(&mut self, arguments: &MessageArguments) -> (String, ErrorReport) {
        trace!("formatting `{}`", self.normalized_input);
        let evaluator = Evaluator {
            locale: &self.locale,
            standard: &self.standard_registry,
            custom: self.custom_registry,
        };
        let mut ctx = MessageContext::new(arguments, &mut self.cached_formatters);
        let env = evaluator.check_declarations(&self.data_model.declarations, &mut ctx);
        let mut output = String::new();
        match &self.data_model.body {
            Body::Pattern(pattern) => {
                evaluator.format_pattern(&mut ctx, &env, pattern, &mut output)
            }
            Body::Selectors { selectors, variants } => {
                evaluator.format_selectors(&mut ctx, &env, selectors, variants, &mut output)
            }
        }
        let dynamics = ctx.into_errors();
        if !dynamics.is_empty() {
            debug!("format call recorded {} dynamic error(s)", dynamics.len());
        }
        let report = ErrorReport::new(self.static_errors.list().to_vec(), dynamics);
        (output, report)
    }

    /// The syntax error of the pattern this formatter was built from,
    /// if parsing failed.
    pub fn parse_error(&self) -> Option<&ParseError> {
        self.parse_error.as_ref()
    }

    /// The input with optional whitespace removed; empty when the
    /// pattern failed to parse.
    pub fn normalized_pattern(&self) -> &str {
        &self.normalized_input
    }

    /// The parsed data model.
    pub fn data_model(&self) -> &Message {
        &self.data_model
    }

    /// The locale this formatter was built for.
    pub fn locale(&self) -> &LanguageTag {
        &self.locale
    }

    /// True when compilation recorded a syntax error.
    pub fn has_syntax_error(&self) -> bool {
        self.static_errors.has_syntax_error()
    }

    /// True when compilation recorded any data-model error.
    pub fn has_data_model_error(&self) -> bool {
        self.static_errors.has_data_model_error()
    }
}

/// The result of evaluating one expression: either a plain resolved
/// placeholder, or the value returned by a formatting function.
enum Evaluated {
    Placeholder(FormattedPlaceholder),
    Value(Box<dyn FunctionValue>),
}

impl Evaluated {
    fn format_to_string(&self, locale: &LanguageTag) -> String {
        match self {
            Evaluated::Placeholder(p) => p.format_to_string(locale),
            Evaluated::Value(v) => v.format_to_string(locale),
        }
    }

    // Collapse to a placeholder, so the result of one expression can
    // flow into another as an operand. Numeric function output stays
    // numeric.
    fn into_placeholder(self, fallback: String, locale: &LanguageTag) -> FormattedPlaceholder {
        match self {
            Evaluated::Placeholder(p) => p,
            Evaluated::Value(v) => {
                let mut placeholder = match v.operand() {
                    Some(value) => FormattedPlaceholder::from_value(value.clone(), fallback),
                    None => FormattedPlaceholder::absent(fallback),
                };
                placeholder.set_output(match v.numeric_value() {
                    Some(value) => Output::Number {
                        value,
                        formatted: v.format_to_string(locale),
                    },
                    None => Output::Text(v.format_to_string(locale)),
                });
                placeholder
            }
        }
    }
}

/// A selector expression after resolution: the (possibly absent)
/// selector instance, its resolved options, and the value scrutinized
/// by the `match`.
struct ResolvedSelector {
    name: Option<String>,
    selector: Option<Box<dyn Selector>>,
    options: ResolvedOptions,
    value: FormattedPlaceholder,
}

impl ResolvedSelector {
    fn unannotated(value: FormattedPlaceholder) -> Self {
        ResolvedSelector {
            name: None,
            selector: None,
            options: ResolvedOptions::new(),
            value,
        }
    }

    // The ordered key preferences of this selector. An unannotated
    // runtime value selects by string equality under default
    // conventions; an annotation whose selector lookup failed (a
    // formatter name, an unknown function, a factory error) has
    // already recorded its error and contributes no preferences.
    fn select_keys(
        &self,
        locale: &LanguageTag,
        candidates: &[String],
        ctx: &mut MessageContext<'_>,
    ) -> Vec<String> {
        if let Some(selector) = &self.selector {
            match selector.select_keys(&self.value, &self.options, candidates) {
                Ok(preferred) => preferred,
                Err(error) => {
                    let name = self.name.as_deref().unwrap_or("<anonymous>");
                    ctx.errors
                        .set_selector_error(format!("{}: {}", name, error));
                    Vec::new()
                }
            }
        } else if self.name.is_some() {
            Vec::new()
        } else {
            match self.value.selection_string(locale) {
                Some(subject) => candidates
                    .iter()
                    .filter(|c| **c == subject)
                    .cloned()
                    .collect(),
                None => Vec::new(),
            }
        }
    }
}

/// The per-call evaluation driver, holding the shared parts of the
/// formatter.
struct Evaluator<'e, 'r> {
    locale: &'e LanguageTag,
    standard: &'e FunctionRegistry,
    custom: Option<&'r FunctionRegistry>,
}

impl<'e, 'r> Evaluator<'e, 'r> {
    // Process declarations in source order, building the environment.
    // Each right-hand side is checked for unresolved references before
    // any evaluation happens; the closures themselves stay lazy.
    fn check_declarations<'m>(
        &self,
        declarations: &'m [Declaration],
        ctx: &mut MessageContext<'_>,
    ) -> Environment<'m> {
        let mut env = Environment::empty();
        for declaration in declarations {
            self.check_expression_refs(&declaration.expression, &env, &mut ctx.errors, ctx.arguments);
            env = Environment::extend(
                declaration.name.name(),
                Closure::new(&declaration.expression, env.clone()),
                env,
            );
        }
        env
    }

    fn check_expression_refs(
        &self,
        expression: &Expression,
        env: &Environment<'_>,
        errors: &mut DynamicErrors,
        arguments: &MessageArguments,
    ) {
        let mut check = |name: &crate::ast::VariableName| {
            if !env.has(name.name()) && !arguments.contains(name.name()) {
                errors.set_unresolved_variable(name.name());
            }
        };
        if let Operand::Variable(name) = &expression.operand {
            check(name);
        }
        if let Some(Annotation::Function { options, .. }) = &expression.annotation {
            for (_, value) in options.iter() {
                if let OptionValue::Variable(name) = value {
                    check(name);
                }
            }
        }
    }

    // Resolve an operand to a placeholder. Variables resolve through
    // the environment first, then through the arguments; an unbound
    // name yields an unresolved-variable error and the `{$name}`
    // fallback.
    fn format_operand<'m>(
        &self,
        env: &Environment<'m>,
        operand: &'m Operand,
        ctx: &mut MessageContext<'_>,
    ) -> FormattedPlaceholder {
        match operand {
            Operand::Literal(literal) => FormattedPlaceholder::from_value(
                Value::String(literal.value().to_owned()),
                literal.to_string(),
            ),
            Operand::Variable(variable) => {
                let fallback = variable.to_string();
                if let Some(closure) = env.lookup(variable.name()) {
                    let closure = closure.clone();
                    let evaluated =
                        self.eval_expression(closure.environment(), closure.expression(), ctx);
                    evaluated
                        .into_placeholder(fallback.clone(), self.locale)
                        .with_fallback(fallback)
                } else if let Some(value) = ctx.global(variable.name()) {
                    FormattedPlaceholder::from_value(value.clone(), fallback)
                } else {
                    ctx.errors.set_unresolved_variable(variable.name());
                    FormattedPlaceholder::fallback(fallback)
                }
            }
            Operand::Absent => FormattedPlaceholder::absent(String::new()),
        }
    }

    // Resolve an option map: literals and nmtokens become strings,
    // variables resolve as operands. An unresolved option is omitted
    // after recording the error.
    fn resolve_options<'m>(
        &self,
        env: &Environment<'m>,
        options: &'m OptionMap,
        ctx: &mut MessageContext<'_>,
    ) -> ResolvedOptions {
        let mut resolved = ResolvedOptions::new();
        for (name, value) in options.iter() {
            let value = match value {
                OptionValue::Literal(literal) => Some(Value::String(literal.value().to_owned())),
                OptionValue::Nmtoken(token) => Some(Value::String(token.clone())),
                OptionValue::Variable(variable) => {
                    if let Some(closure) = env.lookup(variable.name()) {
                        let closure = closure.clone();
                        let evaluated =
                            self.eval_expression(closure.environment(), closure.expression(), ctx);
                        self.option_value(evaluated)
                    } else if let Some(value) = ctx.global(variable.name()) {
                        Some(value.clone())
                    } else {
                        ctx.errors.set_unresolved_variable(variable.name());
                        None
                    }
                }
            };
            if let Some(value) = value {
                resolved.insert(name, value);
            }
        }
        resolved
    }

    fn option_value(&self, evaluated: Evaluated) -> Option<Value> {
        match evaluated {
            Evaluated::Placeholder(p) if p.is_fallback() => None,
            Evaluated::Placeholder(p) => match (p.output(), p.input()) {
                (Some(Output::Number { value, .. }), _) => Some(Value::Double(*value)),
                (Some(Output::Text(text)), _) => Some(Value::String(text.clone())),
                (None, Some(value)) => Some(value.clone()),
                (None, None) => None,
            },
            Evaluated::Value(v) => Some(match v.numeric_value() {
                Some(n) => Value::Double(n),
                None => Value::String(v.format_to_string(self.locale)),
            }),
        }
    }

    // Evaluate an expression in formatter position.
    fn eval_expression<'m>(
        &self,
        env: &Environment<'m>,
        expression: &'m Expression,
        ctx: &mut MessageContext<'_>,
    ) -> Evaluated {
        let operand = self.format_operand(env, &expression.operand, ctx);
        match &expression.annotation {
            None => {
                if let Some(Value::Object(_)) = operand.input() {
                    // Objects are only meaningful to custom functions.
                    ctx.errors
                        .set_formatting_error("cannot format an opaque object without a function");
                    return Evaluated::Placeholder(FormattedPlaceholder::fallback(
                        operand.fallback_str().to_owned(),
                    ));
                }
                Evaluated::Placeholder(operand)
            }
            Some(Annotation::Reserved { source }) => {
                // Parseable but unsupported; the static error was
                // recorded at compile time. Render the original
                // bracketed form.
                let fallback = match &expression.operand {
                    Operand::Absent => source.clone(),
                    _ => format!("{} {}", operand.fallback_str(), source),
                };
                debug!("reserved annotation `{}` renders as fallback", source);
                Evaluated::Placeholder(FormattedPlaceholder::fallback(fallback))
            }
            Some(Annotation::Function { name, options }) => {
                if operand.is_fallback() {
                    // The operand already failed; its fallback wins.
                    return Evaluated::Placeholder(operand);
                }
                let operand = if expression.operand.is_absent() {
                    FormattedPlaceholder::absent(name.to_string())
                } else {
                    operand
                };
                let fallback = operand.fallback_str().to_owned();
                let resolved = self.resolve_options(env, options, ctx);
                let outcome = self
                    .maybe_cached_formatter(&name.name, ctx)
                    .map(|formatter| formatter.format(operand, resolved));
                match outcome {
                    Some(Ok(value)) => Evaluated::Value(value),
                    Some(Err(error)) => {
                        ctx.errors
                            .set_formatting_error(format!("{}: {}", name.name, error));
                        Evaluated::Placeholder(FormattedPlaceholder::fallback(fallback))
                    }
                    // Lookup or construction failed; the error is
                    // already recorded.
                    None => Evaluated::Placeholder(FormattedPlaceholder::fallback(fallback)),
                }
            }
        }
    }

    // Fetch the cached formatter for `name`, constructing and caching
    // it on first use.
    fn maybe_cached_formatter<'a>(
        &self,
        name: &str,
        ctx: &'a mut MessageContext<'_>,
    ) -> Option<&'a dyn Formatter> {
        if !ctx.cache.contains(name) {
            let factory = self.lookup_formatter_factory(name, &mut ctx.errors)?;
            match factory.create_formatter(self.locale) {
                Ok(formatter) => ctx.cache.insert(name, formatter),
                Err(error) => {
                    ctx.errors
                        .set_formatting_error(format!("{}: {}", name, error));
                    return None;
                }
            }
        }
        ctx.cache.get(name)
    }

    // The formatter lookup policy across the built-in and custom
    // registries. A selector name used here is a formatting error;
    // a name in neither registry is an unknown function.
    fn lookup_formatter_factory(
        &self,
        name: &str,
        errors: &mut DynamicErrors,
    ) -> Option<&dyn FormatterFactory> {
        if let Some(factory) = self.standard.formatter(name) {
            return Some(factory);
        }
        if self.standard.has_selector(name) {
            errors.set_formatting_error(format!("{} is a selector", name));
            return None;
        }
        if let Some(custom) = self.custom {
            if let Some(factory) = custom.formatter(name) {
                return Some(factory);
            }
            if custom.has_selector(name) {
                errors.set_formatting_error(format!("{} is a selector", name));
                return None;
            }
        }
        errors.set_unknown_function(name);
        None
    }

    // The mirror-image policy for selector position.
    fn lookup_selector_factory(
        &self,
        name: &str,
        errors: &mut DynamicErrors,
    ) -> Option<&dyn SelectorFactory> {
        if let Some(factory) = self.standard.selector(name) {
            return Some(factory);
        }
        if self.standard.has_formatter(name) {
            errors.set_selector_error(format!("{} is a formatter", name));
            return None;
        }
        if let Some(custom) = self.custom {
            if let Some(factory) = custom.selector(name) {
                return Some(factory);
            }
            if custom.has_formatter(name) {
                errors.set_selector_error(format!("{} is a formatter", name));
                return None;
            }
        }
        errors.set_unknown_function(name);
        None
    }

    // A fresh selector per `match`; selectors are never cached.
    fn create_selector(
        &self,
        name: &str,
        ctx: &mut MessageContext<'_>,
    ) -> Option<Box<dyn Selector>> {
        let factory = self.lookup_selector_factory(name, &mut ctx.errors)?;
        match factory.create_selector(self.locale) {
            Ok(selector) => Some(selector),
            Err(error) => {
                ctx.errors
                    .set_selector_error(format!("{}: {}", name, error));
                None
            }
        }
    }

    // Resolve a selector expression, following unannotated variables
    // through their closures until a value or an annotation is found.
    fn resolve_selector_expression<'m>(
        &self,
        env: &Environment<'m>,
        expression: &'m Expression,
        ctx: &mut MessageContext<'_>,
    ) -> ResolvedSelector {
        match &expression.annotation {
            Some(Annotation::Function { name, options }) => {
                let operand = match &expression.operand {
                    Operand::Absent => FormattedPlaceholder::absent(name.to_string()),
                    operand => self.format_operand(env, operand, ctx),
                };
                let options = self.resolve_options(env, options, ctx);
                let selector = self.create_selector(&name.name, ctx);
                ResolvedSelector {
                    name: Some(name.name.clone()),
                    selector,
                    options,
                    value: operand,
                }
            }
            Some(Annotation::Reserved { source }) => {
                ResolvedSelector::unannotated(FormattedPlaceholder::fallback(source.clone()))
            }
            None => match &expression.operand {
                Operand::Variable(variable) => {
                    if let Some(closure) = env.lookup(variable.name()) {
                        let closure = closure.clone();
                        self.resolve_selector_expression(
                            closure.environment(),
                            closure.expression(),
                            ctx,
                        )
                    } else if let Some(value) = ctx.global(variable.name()) {
                        ResolvedSelector::unannotated(FormattedPlaceholder::from_value(
                            value.clone(),
                            variable.to_string(),
                        ))
                    } else {
                        ctx.errors.set_unresolved_variable(variable.name());
                        ResolvedSelector::unannotated(FormattedPlaceholder::fallback(
                            variable.to_string(),
                        ))
                    }
                }
                Operand::Literal(literal) => {
                    ResolvedSelector::unannotated(FormattedPlaceholder::from_value(
                        Value::String(literal.value().to_owned()),
                        literal.to_string(),
                    ))
                }
                Operand::Absent => {
                    ResolvedSelector::unannotated(FormattedPlaceholder::absent(String::new()))
                }
            },
        }
    }

    // Append each text part verbatim; evaluate and append each
    // expression part. Errors contribute fallbacks, never abort.
    fn format_pattern<'m>(
        &self,
        ctx: &mut MessageContext<'_>,
        env: &Environment<'m>,
        pattern: &'m Pattern,
        output: &mut String,
    ) {
        for part in &pattern.parts {
            match part {
                PatternPart::Text(text) => output.push_str(text),
                PatternPart::Expression(expression) => {
                    let evaluated = self.eval_expression(env, expression, ctx);
                    output.push_str(&evaluated.format_to_string(self.locale));
                }
            }
        }
    }

    // The selection algorithm: resolve selectors, collect per-position
    // candidate keys, ask each selector for its ordered preferences,
    // filter and rank the variants, and format the winner.
    fn format_selectors<'m>(
        &self,
        ctx: &mut MessageContext<'_>,
        env: &Environment<'m>,
        selectors: &'m [Expression],
        variants: &'m [Variant],
        output: &mut String,
    ) {
        let resolved: Vec<ResolvedSelector> = selectors
            .iter()
            .map(|selector| self.resolve_selector_expression(env, selector, ctx))
            .collect();

        // Variants whose key count does not match the selector count
        // were already reported statically; they never match.
        let usable: Vec<&'m Variant> = variants
            .iter()
            .filter(|v| v.keys.len() == selectors.len())
            .collect();

        // Per-position preference lists. Candidates are the non-wild
        // keys at that position, deduplicated preserving first
        // appearance; the wildcard is handled by the engine below.
        let mut preferences: Vec<Vec<String>> = Vec::with_capacity(resolved.len());
        for (i, selector) in resolved.iter().enumerate() {
            let mut candidates: Vec<String> = Vec::new();
            for variant in &usable {
                if let Some(value) = variant.keys.keys[i].value() {
                    if !candidates.iter().any(|c| c == value) {
                        candidates.push(value.to_owned());
                    }
                }
            }
            preferences.push(selector.select_keys(self.locale, &candidates, ctx));
        }

        // Filter and rank. A variant matches when every key is either
        // the wildcard or preferred at its position; its priority tuple
        // ranks the wildcard after every concrete preference. The sort
        // is stable, so ties keep source order.
        let mut matching: Vec<(Vec<usize>, &'m Variant)> = Vec::new();
        'variants: for &variant in &usable {
            let mut priority = Vec::with_capacity(preferences.len());
            for (i, preferred) in preferences.iter().enumerate() {
                match variant.keys.keys[i].value() {
                    None => priority.push(preferred.len()),
                    Some(key) => match preferred.iter().position(|p| p == key) {
                        Some(rank) => priority.push(rank),
                        None => continue 'variants,
                    },
                }
            }
            matching.push((priority, variant));
        }
        matching.sort_by(|a, b| a.0.cmp(&b.0));

        let chosen = matching
            .first()
            .map(|(_, variant)| *variant)
            .or_else(|| variants.iter().find(|v| v.keys.is_catch_all()));
        match chosen {
            Some(variant) => {
                debug!("selected variant `when {}`", variant.keys);
                self.format_pattern(ctx, env, &variant.pattern, output);
            }
            // Only reachable when the catch-all invariant failed; the
            // static error was recorded at compile time.
            None => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args::arg;

    #[test]
    fn builder_requires_a_pattern_or_data_model() {
        assert_eq!(
            MessageFormatter::builder().build().err(),
            Some(BuildError::InvalidState)
        );
    }

    #[test]
    fn setting_a_pattern_clears_the_data_model() {
        let model = parse("{from model}").expect("parse");
        let mut formatter = MessageFormatter::builder()
            .data_model(model)
            .pattern("{from pattern}")
            .build()
            .expect("build");
        let (result, report) = formatter.format_to_string(&MessageArguments::new());
        assert_eq!(result, "from pattern");
        assert!(report.is_empty());
    }

    #[test]
    fn syntax_errors_do_not_prevent_construction() {
        let mut formatter = MessageFormatter::builder()
            .pattern("{missing end brace")
            .build()
            .expect("build");
        let error = formatter.parse_error().copied().expect("parse error");
        assert_eq!(error.offset, 18);
        assert!(formatter.has_syntax_error());
        let (result, report) = formatter.format_to_string(&MessageArguments::new());
        assert_eq!(result, "");
        assert_eq!(
            report.first_code(),
            Some(crate::errors::ErrorCode::Syntax)
        );
    }

    #[test]
    fn data_model_input_formats() {
        let model = parse("{hello {$place}}").expect("parse");
        let mut formatter = MessageFormatter::builder()
            .data_model(model)
            .build()
            .expect("build");
        let (result, report) = formatter.format_to_string(&arg("place", "world"));
        assert_eq!(result, "hello world");
        assert!(report.is_empty());
        assert_eq!(formatter.normalized_pattern(), "{hello {$place}}");
    }

    #[test]
    fn formatting_is_idempotent() {
        let mut formatter = MessageFormatter::builder()
            .pattern("{hello {|4.2| :number minimumFractionDigits=2}}")
            .build()
            .expect("build");
        let args = MessageArguments::new();
        let (first, first_report) = formatter.format_to_string(&args);
        let (second, second_report) = formatter.format_to_string(&args);
        assert_eq!(first, second);
        assert_eq!(first_report.is_empty(), second_report.is_empty());
    }
}
