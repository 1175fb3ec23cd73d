// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! The MessageFormat 2.0 data model.
//!
//! A [`Message`] is the typed tree produced by parsing a message in the
//! MF2 surface syntax. The tree is immutable after construction.
//!
//! Every node implements `Display`, producing the canonical surface
//! form with optional whitespace collapsed. `Message::to_string()` is
//! the *normalized* form of a message: it re-parses without error to an
//! equal data model.

use std::fmt::{self, Display};

/// An immutable Unicode string literal, stored with its escapes
/// removed (the content between `|...|`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Literal(
    /// The unescaped content.
    pub String,
);

impl Literal {
    /// Construct a literal from its unescaped content.
    pub fn new(value: impl Into<String>) -> Self {
        Literal(value.into())
    }

    /// The unescaped content.
    pub fn value(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "|{}|", escape_literal(&self.0))
    }
}

/// The name of a declared local or an external argument.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VariableName(
    /// The bare name, without the `$` sigil.
    pub String,
);

impl VariableName {
    /// Construct a variable name (without the `$` sigil).
    pub fn new(name: impl Into<String>) -> Self {
        VariableName(name.into())
    }

    /// The bare name, without the `$` sigil.
    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VariableName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${}", self.0)
    }
}

/// The sigil introducing a function annotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sigil {
    /// `:`, an ordinary function.
    Default,
    /// `+`, markup-open form.
    Open,
    /// `-`, markup-close form.
    Close,
}

impl Sigil {
    fn as_char(self) -> char {
        match self {
            Sigil::Default => ':',
            Sigil::Open => '+',
            Sigil::Close => '-',
        }
    }
}

/// A function name together with the sigil it was written with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionName {
    /// The sigil (`:`, `+` or `-`).
    pub sigil: Sigil,
    /// The bare name.
    pub name: String,
}

impl FunctionName {
    /// An ordinary `:name` function reference.
    pub fn new(name: impl Into<String>) -> Self {
        FunctionName {
            sigil: Sigil::Default,
            name: name.into(),
        }
    }

    /// A function reference with an explicit sigil.
    pub fn with_sigil(sigil: Sigil, name: impl Into<String>) -> Self {
        FunctionName {
            sigil,
            name: name.into(),
        }
    }
}

impl fmt::Display for FunctionName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.sigil.as_char(), self.name)
    }
}

/// The right-hand side of an option.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptionValue {
    /// A quoted literal, `opt=|value|`.
    Literal(Literal),
    /// A bare token, `opt=value`.
    Nmtoken(String),
    /// A variable reference, `opt=$var`.
    Variable(VariableName),
}

impl fmt::Display for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionValue::Literal(l) => l.fmt(f),
            OptionValue::Nmtoken(t) => f.write_str(t),
            OptionValue::Variable(v) => v.fmt(f),
        }
    }
}

/// An ordered mapping from option names to option values.
///
/// Duplicate names are retained in source order so that the post-parse
/// checks can report them; resolution uses the last occurrence.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OptionMap {
    options: Vec<(String, OptionValue)>,
}

impl OptionMap {
    /// An empty option map.
    pub fn new() -> Self {
        OptionMap::default()
    }

    /// Append an option, preserving source order.
    pub fn push(&mut self, name: impl Into<String>, value: OptionValue) {
        self.options.push((name.into(), value));
    }

    /// Iterate over the options in source order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &OptionValue)> {
        self.options.iter().map(|(n, v)| (n.as_str(), v))
    }

    /// The number of options, duplicates included.
    pub fn len(&self) -> usize {
        self.options.len()
    }

    /// True when no options were written.
    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }

    /// The names that occur more than once, first-seen order.
    pub fn duplicate_names(&self) -> Vec<&str> {
        let mut dups = Vec::new();
        for (i, (name, _)) in self.options.iter().enumerate() {
            if self.options[..i].iter().any(|(n, _)| n == name)
                && !dups.contains(&name.as_str())
            {
                dups.push(name.as_str());
            }
        }
        dups
    }
}

impl fmt::Display for OptionMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (name, value)) in self.options.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{}={}", name, value)?;
        }
        Ok(())
    }
}

/// The annotation of an expression: a function call, or a reserved
/// sequence that is parseable but unsupported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Annotation {
    /// A function call with its options.
    Function {
        /// The function name.
        name: FunctionName,
        /// The ordered options.
        options: OptionMap,
    },
    /// A reserved annotation, kept as the raw source text (sigil
    /// included, escapes as written).
    Reserved {
        /// The raw annotation text.
        source: String,
    },
}

impl fmt::Display for Annotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Annotation::Function { name, options } => {
                name.fmt(f)?;
                if !options.is_empty() {
                    write!(f, " {}", options)?;
                }
                Ok(())
            }
            Annotation::Reserved { source } => f.write_str(source),
        }
    }
}

/// The subject of an expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operand {
    /// A quoted literal.
    Literal(Literal),
    /// A variable reference.
    Variable(VariableName),
    /// No operand (`{:fn}` and similar forms).
    Absent,
}

impl Operand {
    /// True when the expression has no operand.
    pub fn is_absent(&self) -> bool {
        matches!(self, Operand::Absent)
    }
}

/// A brace-enclosed expression: an operand with an optional annotation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expression {
    /// The operand, possibly absent.
    pub operand: Operand,
    /// The annotation, if any.
    pub annotation: Option<Annotation>,
}

impl Expression {
    /// An expression with both an operand and an annotation.
    pub fn new(operand: Operand, annotation: Option<Annotation>) -> Self {
        Expression { operand, annotation }
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        match (&self.operand, &self.annotation) {
            (Operand::Absent, Some(a)) => a.fmt(f)?,
            (Operand::Absent, None) => {}
            (op, None) => match op {
                Operand::Literal(l) => l.fmt(f)?,
                Operand::Variable(v) => v.fmt(f)?,
                Operand::Absent => unreachable!(),
            },
            (op, Some(a)) => {
                match op {
                    Operand::Literal(l) => l.fmt(f)?,
                    Operand::Variable(v) => v.fmt(f)?,
                    Operand::Absent => unreachable!(),
                }
                write!(f, " {}", a)?;
            }
        }
        f.write_str("}")
    }
}

/// One part of a pattern: a text run or an expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatternPart {
    /// A run of text, stored with its escapes removed.
    Text(String),
    /// A placeholder expression.
    Expression(Expression),
}

impl fmt::Display for PatternPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PatternPart::Text(t) => f.write_str(&escape_text(t)),
            PatternPart::Expression(e) => e.fmt(f),
        }
    }
}

/// A brace-delimited sequence of text runs and expressions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Pattern {
    /// The parts, in source order.
    pub parts: Vec<PatternPart>,
}

impl Pattern {
    /// Construct a pattern from its parts.
    pub fn new(parts: Vec<PatternPart>) -> Self {
        Pattern { parts }
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for part in &self.parts {
            part.fmt(f)?;
        }
        f.write_str("}")
    }
}

/// One key of a variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Key {
    /// A quoted literal key.
    Literal(Literal),
    /// A bare token key.
    Nmtoken(String),
    /// The wildcard `*`, matching any selector value.
    Wildcard,
}

impl Key {
    /// The key's value, or `None` for the wildcard.
    pub fn value(&self) -> Option<&str> {
        match self {
            Key::Literal(l) => Some(l.value()),
            Key::Nmtoken(t) => Some(t),
            Key::Wildcard => None,
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Literal(l) => l.fmt(f),
            Key::Nmtoken(t) => f.write_str(t),
            Key::Wildcard => f.write_str("*"),
        }
    }
}

/// The ordered key list of a variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorKeys {
    /// The keys, one per selector position.
    pub keys: Vec<Key>,
}

impl SelectorKeys {
    /// Construct a key list.
    pub fn new(keys: Vec<Key>) -> Self {
        SelectorKeys { keys }
    }

    /// The number of keys.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// True when there are no keys (not producible by the parser).
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// True when every key is the wildcard.
    pub fn is_catch_all(&self) -> bool {
        self.keys.iter().all(|k| matches!(k, Key::Wildcard))
    }
}

impl fmt::Display for SelectorKeys {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, key) in self.keys.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            key.fmt(f)?;
        }
        Ok(())
    }
}

/// A key tuple paired with the pattern it selects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variant {
    /// The keys, one per selector.
    pub keys: SelectorKeys,
    /// The pattern formatted when this variant is selected.
    pub pattern: Pattern,
}

impl Variant {
    /// Construct a variant.
    pub fn new(keys: SelectorKeys, pattern: Pattern) -> Self {
        Variant { keys, pattern }
    }
}

/// A `let $name = expression` binding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    /// The declared name.
    pub name: VariableName,
    /// The right-hand side, evaluated lazily.
    pub expression: Expression,
}

impl Declaration {
    /// Construct a declaration.
    pub fn new(name: VariableName, expression: Expression) -> Self {
        Declaration { name, expression }
    }
}

impl fmt::Display for Declaration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "let {} = {}", self.name, self.expression)
    }
}

/// The body of a message: a single pattern, or selectors with variants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Body {
    /// A plain pattern.
    Pattern(Pattern),
    /// A `match` over one or more selectors.
    Selectors {
        /// The selector expressions, left to right.
        selectors: Vec<Expression>,
        /// The variants, in source order.
        variants: Vec<Variant>,
    },
}

impl fmt::Display for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Body::Pattern(p) => p.fmt(f),
            Body::Selectors { selectors, variants } => {
                f.write_str("match")?;
                for sel in selectors {
                    write!(f, " {}", sel)?;
                }
                for variant in variants {
                    write!(f, " when {} {}", variant.keys, variant.pattern)?;
                }
                Ok(())
            }
        }
    }
}

/// A complete parsed message: declarations followed by a body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    /// The `let` declarations, in source order.
    pub declarations: Vec<Declaration>,
    /// The body.
    pub body: Body,
}

impl Message {
    /// Construct a message.
    pub fn new(declarations: Vec<Declaration>, body: Body) -> Self {
        Message { declarations, body }
    }

    /// The placeholder message used when a pattern failed to parse:
    /// no declarations and an empty pattern body.
    pub(crate) fn empty() -> Self {
        Message {
            declarations: Vec::new(),
            body: Body::Pattern(Pattern::default()),
        }
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for decl in &self.declarations {
            write!(f, "{} ", decl)?;
        }
        self.body.fmt(f)
    }
}

/// Re-apply the escapes that are stripped from pattern text.
pub(crate) fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '{' => out.push_str("\\{"),
            '}' => out.push_str("\\}"),
            _ => out.push(c),
        }
    }
    out
}

/// Re-apply the escapes that are stripped from literal content.
pub(crate) fn escape_literal(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '|' => out.push_str("\\|"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literal_display_reapplies_escapes() {
        assert_eq!(Literal::new("a|b\\c").to_string(), "|a\\|b\\\\c|");
    }

    #[test]
    fn expression_display() {
        let expr = Expression::new(
            Operand::Variable(VariableName::new("count")),
            Some(Annotation::Function {
                name: FunctionName::new("number"),
                options: {
                    let mut opts = OptionMap::new();
                    opts.push("minimumFractionDigits", OptionValue::Nmtoken("2".into()));
                    opts
                },
            }),
        );
        assert_eq!(expr.to_string(), "{$count :number minimumFractionDigits=2}");
    }

    #[test]
    fn duplicate_option_names() {
        let mut opts = OptionMap::new();
        opts.push("a", OptionValue::Nmtoken("1".into()));
        opts.push("b", OptionValue::Nmtoken("2".into()));
        opts.push("a", OptionValue::Nmtoken("3".into()));
        opts.push("a", OptionValue::Nmtoken("4".into()));
        assert_eq!(opts.duplicate_names(), vec!["a"]);
    }

    #[test]
    fn catch_all_keys() {
        let keys = SelectorKeys::new(vec![Key::Wildcard, Key::Wildcard]);
        assert!(keys.is_catch_all());
        let keys = SelectorKeys::new(vec![Key::Wildcard, Key::Nmtoken("one".into())]);
        assert!(!keys.is_catch_all());
    }

    #[test]
    fn message_display_collapses_whitespace() {
        let msg = Message::new(
            vec![Declaration::new(
                VariableName::new("foo"),
                Expression::new(Operand::Literal(Literal::new("bar")), None),
            )],
            Body::Pattern(Pattern::new(vec![
                PatternPart::Text("bar ".into()),
                PatternPart::Expression(Expression::new(
                    Operand::Variable(VariableName::new("foo")),
                    None,
                )),
            ])),
        );
        assert_eq!(msg.to_string(), "let $foo = {|bar|} {bar {$foo}}");
    }
}
