// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! The recursive-descent parser.
//!
//! One function per grammar production, all driven by a byte-index
//! cursor over the source. The parser stops at the first syntax error
//! and reports its byte offset together with the number of line feeds
//! consumed up to that point. Data-model errors (duplicate options,
//! key arity, and so on) are not raised here; see [`crate::validate`].
//!
//! ```text
//! message       = [ws] *declaration body [ws]
//! declaration   = "let" ws variable-name [ws] "=" [ws] expression [ws]
//! body          = pattern / selectors
//! pattern       = "{" *(text / expression) "}"
//! selectors     = "match" 1*([ws] expression) 1*(ws "when" 1*(ws key) [ws] pattern)
//! expression    = "{" [ws] (literal-with-anno / variable-with-anno / annotation) [ws] "}"
//! annotation    = function / reserved
//! function      = (":" / "+" / "-") name [ws options]
//! option        = name [ws] "=" [ws] (literal / nmtoken / variable-name)
//! key           = literal / nmtoken / "*"
//! ```

use log::{debug, trace};

use crate::ast::{
    Annotation, Body, Declaration, Expression, FunctionName, Key, Literal, Message, Operand,
    OptionMap, OptionValue, Pattern, PatternPart, SelectorKeys, Sigil, Variant, VariableName,
};
use crate::chars::{
    is_annotation_start, is_literal_char, is_name_char, is_name_start, is_reserved_char,
    is_reserved_start, is_text_char, is_whitespace,
};
use crate::errors::ParseError;

/// Parse a message, returning the data model or the first syntax error.
pub(crate) fn parse(source: &str) -> Result<Message, ParseError> {
    trace!("parsing message ({} bytes)", source.len());
    let mut parser = Parser {
        source,
        index: 0,
        line: 0,
    };
    let result = parser.parse_message();
    if let Err(error) = &result {
        debug!(
            "parse failed at line {}, offset {}",
            error.line, error.offset
        );
    }
    result
}

struct Parser<'s> {
    source: &'s str,
    /// Byte offset into `source`.
    index: usize,
    /// Line feeds consumed so far.
    line: u32,
}

type PResult<T> = Result<T, ParseError>;

impl<'s> Parser<'s> {
    fn peek(&self) -> Option<char> {
        self.source[self.index..].chars().next()
    }

    fn bump(&mut self) {
        if let Some(c) = self.peek() {
            self.index += c.len_utf8();
            if c == '\n' {
                self.line += 1;
            }
        }
    }

    fn at_end(&self) -> bool {
        self.index >= self.source.len()
    }

    fn error<T>(&self) -> PResult<T> {
        Err(ParseError {
            line: self.line,
            offset: self.index,
        })
    }

    fn next_is(&self, token: &str) -> bool {
        self.source[self.index..].starts_with(token)
    }

    fn expect(&mut self, expected: char) -> PResult<()> {
        match self.peek() {
            Some(c) if c == expected => {
                self.bump();
                Ok(())
            }
            _ => self.error(),
        }
    }

    fn expect_keyword(&mut self, keyword: &str) -> PResult<()> {
        for expected in keyword.chars() {
            match self.peek() {
                Some(c) if c == expected => self.bump(),
                _ => return self.error(),
            }
        }
        Ok(())
    }

    fn ws_opt(&mut self) {
        while matches!(self.peek(), Some(c) if is_whitespace(c)) {
            self.bump();
        }
    }

    fn ws_req(&mut self) -> PResult<()> {
        match self.peek() {
            Some(c) if is_whitespace(c) => {
                self.ws_opt();
                Ok(())
            }
            _ => self.error(),
        }
    }

    // message = [ws] *declaration body [ws]
    fn parse_message(&mut self) -> PResult<Message> {
        self.ws_opt();
        let mut declarations = Vec::new();
        while self.next_is("let") {
            declarations.push(self.parse_declaration()?);
            self.ws_opt();
        }
        let body = match self.peek() {
            Some('{') => Body::Pattern(self.parse_pattern()?),
            Some(_) if self.next_is("match") => self.parse_selectors()?,
            // A body is required; premature EOF and anything else
            // error out here.
            _ => return self.error(),
        };
        self.ws_opt();
        if !self.at_end() {
            return self.error();
        }
        Ok(Message::new(declarations, body))
    }

    // declaration = "let" ws variable-name [ws] "=" [ws] expression
    fn parse_declaration(&mut self) -> PResult<Declaration> {
        self.expect_keyword("let")?;
        self.ws_req()?;
        let name = self.parse_variable_name()?;
        self.ws_opt();
        self.expect('=')?;
        self.ws_opt();
        let expression = self.parse_expression()?;
        Ok(Declaration::new(name, expression))
    }

    fn parse_variable_name(&mut self) -> PResult<VariableName> {
        self.expect('$')?;
        Ok(VariableName::new(self.parse_name()?))
    }

    fn parse_name(&mut self) -> PResult<String> {
        let start = self.index;
        match self.peek() {
            Some(c) if is_name_start(c) => self.bump(),
            _ => return self.error(),
        }
        while matches!(self.peek(), Some(c) if is_name_char(c)) {
            self.bump();
        }
        Ok(self.source[start..self.index].to_owned())
    }

    fn parse_nmtoken(&mut self) -> PResult<String> {
        let start = self.index;
        while matches!(self.peek(), Some(c) if is_name_char(c)) {
            self.bump();
        }
        if self.index == start {
            return self.error();
        }
        Ok(self.source[start..self.index].to_owned())
    }

    // expression = "{" [ws] (literal-with-anno / variable-with-anno / annotation) [ws] "}"
    fn parse_expression(&mut self) -> PResult<Expression> {
        self.expect('{')?;
        self.ws_opt();
        let (operand, annotation) = match self.peek() {
            Some('|') => {
                let literal = self.parse_literal()?;
                (Operand::Literal(literal), self.parse_optional_annotation()?)
            }
            Some('$') => {
                let variable = self.parse_variable_name()?;
                (
                    Operand::Variable(variable),
                    self.parse_optional_annotation()?,
                )
            }
            Some(c) if is_annotation_start(c) || is_reserved_start(c) => {
                (Operand::Absent, Some(self.parse_annotation()?))
            }
            _ => return self.error(),
        };
        self.ws_opt();
        self.expect('}')?;
        Ok(Expression::new(operand, annotation))
    }

    // An annotation following an operand, if one is present after
    // optional whitespace.
    fn parse_optional_annotation(&mut self) -> PResult<Option<Annotation>> {
        self.ws_opt();
        match self.peek() {
            Some(c) if is_annotation_start(c) || is_reserved_start(c) => {
                Ok(Some(self.parse_annotation()?))
            }
            _ => Ok(None),
        }
    }

    // annotation = function / reserved
    fn parse_annotation(&mut self) -> PResult<Annotation> {
        match self.peek() {
            Some(c) if is_annotation_start(c) => {
                let sigil = match c {
                    ':' => Sigil::Default,
                    '+' => Sigil::Open,
                    _ => Sigil::Close,
                };
                self.bump();
                let name = self.parse_name()?;
                let options = if matches!(self.peek(), Some(c) if is_whitespace(c)) {
                    self.ws_opt();
                    self.parse_options()?
                } else {
                    OptionMap::new()
                };
                Ok(Annotation::Function {
                    name: FunctionName::with_sigil(sigil, name),
                    options,
                })
            }
            Some(c) if is_reserved_start(c) => self.parse_reserved(),
            _ => self.error(),
        }
    }

    // options = option *(ws option)
    fn parse_options(&mut self) -> PResult<OptionMap> {
        let mut options = OptionMap::new();
        loop {
            match self.peek() {
                Some(c) if is_name_start(c) => {}
                _ => break,
            }
            let (name, value) = self.parse_option()?;
            // Duplicates are kept; the post-parse checks report them.
            options.push(name, value);
            self.ws_opt();
        }
        Ok(options)
    }

    // option = name [ws] "=" [ws] (literal / nmtoken / variable-name)
    fn parse_option(&mut self) -> PResult<(String, OptionValue)> {
        let name = self.parse_name()?;
        self.ws_opt();
        self.expect('=')?;
        self.ws_opt();
        let value = match self.peek() {
            Some('|') => OptionValue::Literal(self.parse_literal()?),
            Some('$') => OptionValue::Variable(self.parse_variable_name()?),
            Some(c) if is_name_char(c) => OptionValue::Nmtoken(self.parse_nmtoken()?),
            _ => return self.error(),
        };
        Ok((name, value))
    }

    // literal = "|" *(literal-char / literal-escape) "|"
    fn parse_literal(&mut self) -> PResult<Literal> {
        self.expect('|')?;
        let mut value = String::new();
        loop {
            match self.peek() {
                None => return self.error(),
                Some('|') => break,
                Some('\\') => {
                    self.bump();
                    match self.peek() {
                        Some(c @ ('\\' | '|')) => {
                            value.push(c);
                            self.bump();
                        }
                        _ => return self.error(),
                    }
                }
                Some(c) if is_literal_char(c) => {
                    value.push(c);
                    self.bump();
                }
                Some(_) => return self.error(),
            }
        }
        self.bump();
        Ok(Literal::new(value))
    }

    // reserved = reserved-start *(reserved-char / reserved-escape / literal)
    //
    // The raw source text is retained; reserved annotations are
    // parseable but unsupported.
    fn parse_reserved(&mut self) -> PResult<Annotation> {
        let start = self.index;
        self.bump();
        loop {
            match self.peek() {
                None => return self.error(),
                Some('\\') => {
                    self.bump();
                    match self.peek() {
                        Some('\\' | '|' | '{' | '}') => self.bump(),
                        _ => return self.error(),
                    }
                }
                Some('|') => {
                    self.parse_literal()?;
                }
                Some(c) if is_reserved_char(c) => self.bump(),
                Some(_) => break,
            }
        }
        Ok(Annotation::Reserved {
            source: self.source[start..self.index].to_owned(),
        })
    }

    // pattern = "{" *(text / expression) "}"
    //
    // A pattern must contain at least one part; `{}` is rejected at
    // the offset of the closing brace.
    fn parse_pattern(&mut self) -> PResult<Pattern> {
        self.expect('{')?;
        let mut parts = Vec::new();
        loop {
            match self.peek() {
                None => return self.error(),
                Some('}') => break,
                Some('{') => parts.push(PatternPart::Expression(self.parse_expression()?)),
                Some(_) => parts.push(PatternPart::Text(self.parse_text()?)),
            }
        }
        if parts.is_empty() {
            return self.error();
        }
        self.bump();
        Ok(Pattern::new(parts))
    }

    fn parse_text(&mut self) -> PResult<String> {
        let mut text = String::new();
        loop {
            match self.peek() {
                Some('\\') => {
                    self.bump();
                    match self.peek() {
                        Some(c @ ('\\' | '{' | '}')) => {
                            text.push(c);
                            self.bump();
                        }
                        _ => return self.error(),
                    }
                }
                Some(c) if is_text_char(c) => {
                    text.push(c);
                    self.bump();
                }
                _ => break,
            }
        }
        if text.is_empty() {
            return self.error();
        }
        Ok(text)
    }

    // selectors = "match" 1*([ws] expression) 1*(ws "when" 1*(ws key) [ws] pattern)
    fn parse_selectors(&mut self) -> PResult<Body> {
        self.expect_keyword("match")?;
        self.ws_opt();
        // At least one selector expression is required.
        if self.peek() != Some('{') {
            return self.error();
        }
        let mut selectors = Vec::new();
        while self.peek() == Some('{') {
            selectors.push(self.parse_expression()?);
            self.ws_opt();
        }
        // At least one variant is required.
        if !self.next_is("when") {
            return self.error();
        }
        let mut variants = Vec::new();
        while self.next_is("when") {
            self.expect_keyword("when")?;
            let keys = self.parse_keys()?;
            self.ws_opt();
            let pattern = self.parse_pattern()?;
            variants.push(Variant::new(SelectorKeys::new(keys), pattern));
            self.ws_opt();
        }
        Ok(Body::Selectors { selectors, variants })
    }

    // Whitespace is required before the first key. Before every other
    // key it is ambiguous whether whitespace separates two keys or
    // precedes the variant's pattern, so the list ends as soon as a
    // `{` follows the whitespace.
    fn parse_keys(&mut self) -> PResult<Vec<Key>> {
        self.ws_req()?;
        let mut keys = vec![self.parse_key()?];
        loop {
            match self.peek() {
                Some(c) if is_whitespace(c) => {
                    self.ws_opt();
                    if self.peek() == Some('{') {
                        break;
                    }
                    keys.push(self.parse_key()?);
                }
                _ => break,
            }
        }
        Ok(keys)
    }

    // key = literal / nmtoken / "*"
    fn parse_key(&mut self) -> PResult<Key> {
        match self.peek() {
            Some('|') => Ok(Key::Literal(self.parse_literal()?)),
            Some('*') => {
                self.bump();
                Ok(Key::Wildcard)
            }
            _ => Ok(Key::Nmtoken(self.parse_nmtoken()?)),
        }
    }
}
