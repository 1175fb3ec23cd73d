// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! The standard functions.
//!
//! Formatters: `number`, `integer`, `datetime`, `date`, `time`,
//! `string`. Selectors: `plural`, `selectordinal`, `select`, `gender`.
//!
//! The locale-aware back-ends proper (CLDR number shaping, date
//! patterns, the full plural rule set) are external collaborators;
//! what lives here are deterministic default renderings behind the
//! registry interface, so the pipeline is complete without them.

use language_tags::LanguageTag;

use crate::args::Value;
use crate::errors::FunctionError;
use crate::registry::{
    Formatter, FormatterFactory, FunctionRegistry, Selector, SelectorFactory,
};
use crate::value::{FormattedPlaceholder, FunctionValue, ResolvedOptions};

/// The registry of built-in functions, constructed per formatter.
pub(crate) fn standard_registry() -> FunctionRegistry {
    FunctionRegistry::builder()
        .formatter("datetime", DateTimeFormatterFactory::date_time())
        .formatter("date", DateTimeFormatterFactory::date())
        .formatter("time", DateTimeFormatterFactory::time())
        .formatter("number", NumberFormatterFactory::number())
        .formatter("integer", NumberFormatterFactory::integer())
        .formatter("string", StringFormatterFactory)
        .selector("plural", PluralSelectorFactory::cardinal())
        .selector("selectordinal", PluralSelectorFactory::ordinal())
        .selector("select", TextSelectorFactory)
        .selector("gender", TextSelectorFactory)
        .build()
}

fn primary_language(locale: &LanguageTag) -> String {
    locale.language.clone().unwrap_or_else(|| "en".to_owned())
}

// ---------------------------------------------------------------------
// number / integer

pub(crate) struct NumberFormatterFactory {
    integer: bool,
}

impl NumberFormatterFactory {
    pub(crate) fn number() -> Self {
        NumberFormatterFactory { integer: false }
    }

    pub(crate) fn integer() -> Self {
        NumberFormatterFactory { integer: true }
    }
}

impl FormatterFactory for NumberFormatterFactory {
    fn create_formatter(&self, locale: &LanguageTag) -> Result<Box<dyn Formatter>, FunctionError> {
        let _ = locale;
        Ok(Box::new(NumberFormatter {
            integer: self.integer,
        }))
    }
}

struct NumberFormatter {
    integer: bool,
}

enum NumberOperand {
    Int(i64),
    Float(f64),
}

impl NumberOperand {
    fn as_f64(&self) -> f64 {
        match self {
            NumberOperand::Int(i) => *i as f64,
            NumberOperand::Float(f) => *f,
        }
    }
}

fn numeric_operand(value: &Value) -> Result<NumberOperand, FunctionError> {
    match value {
        Value::Integer(i) => Ok(NumberOperand::Int(*i)),
        Value::Double(d) => Ok(NumberOperand::Float(*d)),
        Value::Decimal(s) | Value::String(s) => {
            let s = s.trim();
            if let Ok(i) = s.parse::<i64>() {
                Ok(NumberOperand::Int(i))
            } else {
                s.parse::<f64>()
                    .map(NumberOperand::Float)
                    .map_err(|_| FunctionError::new(format!("`{}` is not a number", s)))
            }
        }
        other => Err(FunctionError::new(format!(
            "operand {:?} is not a number",
            other
        ))),
    }
}

// Option accessors with their respective defaults.
struct NumberOptions {
    minimum_fraction_digits: usize,
    maximum_fraction_digits: usize,
    minimum_integer_digits: usize,
    percent: bool,
}

impl NumberOptions {
    fn from_resolved(options: &ResolvedOptions, integer: bool) -> Self {
        let maximum_fraction_digits = if integer {
            0
        } else {
            options.get_digits("maximumFractionDigits").unwrap_or(6)
        };
        let minimum_fraction_digits = options
            .get_digits("minimumFractionDigits")
            .unwrap_or(0)
            .min(maximum_fraction_digits);
        NumberOptions {
            minimum_fraction_digits,
            maximum_fraction_digits,
            minimum_integer_digits: options.get_digits("minimumIntegerDigits").unwrap_or(1),
            percent: options.get_str("style") == Some("percent"),
        }
    }
}

fn shape_number(value: f64, opts: &NumberOptions) -> String {
    let value = if opts.percent { value * 100.0 } else { value };
    let negative = value < 0.0;
    let rounded = format!("{:.*}", opts.maximum_fraction_digits, value.abs());
    let (int_part, frac_part) = match rounded.split_once('.') {
        Some((i, f)) => (i.to_owned(), f.to_owned()),
        None => (rounded, String::new()),
    };
    let mut int_part = int_part;
    let mut frac_part = frac_part;
    while frac_part.len() > opts.minimum_fraction_digits && frac_part.ends_with('0') {
        frac_part.pop();
    }
    while int_part.len() < opts.minimum_integer_digits {
        int_part.insert(0, '0');
    }
    let mut out = String::new();
    if negative {
        out.push('-');
    }
    out.push_str(&int_part);
    if !frac_part.is_empty() {
        out.push('.');
        out.push_str(&frac_part);
    }
    if opts.percent {
        out.push('%');
    }
    out
}

fn shape_integer(value: i64, opts: &NumberOptions) -> String {
    if opts.percent {
        return shape_number(value as f64, opts);
    }
    let mut int_part = value.unsigned_abs().to_string();
    while int_part.len() < opts.minimum_integer_digits {
        int_part.insert(0, '0');
    }
    let mut out = String::new();
    if value < 0 {
        out.push('-');
    }
    out.push_str(&int_part);
    if opts.minimum_fraction_digits > 0 {
        out.push('.');
        for _ in 0..opts.minimum_fraction_digits {
            out.push('0');
        }
    }
    out
}

impl Formatter for NumberFormatter {
    fn format(
        &self,
        operand: FormattedPlaceholder,
        options: ResolvedOptions,
    ) -> Result<Box<dyn FunctionValue>, FunctionError> {
        let value = operand
            .input()
            .ok_or_else(|| FunctionError::new("number needs an operand"))?;
        let number = numeric_operand(value)?;
        let opts = NumberOptions::from_resolved(&options, self.integer);
        let formatted = match &number {
            NumberOperand::Int(i) => shape_integer(*i, &opts),
            NumberOperand::Float(f) => shape_number(*f, &opts),
        };
        Ok(Box::new(NumberValue {
            operand: value.clone(),
            value: number.as_f64(),
            formatted,
            options,
        }))
    }
}

/// A formatted number: the exact value plus its rendering.
#[derive(Debug)]
struct NumberValue {
    operand: Value,
    value: f64,
    formatted: String,
    options: ResolvedOptions,
}

impl FunctionValue for NumberValue {
    fn format_to_string(&self, _locale: &LanguageTag) -> String {
        self.formatted.clone()
    }

    fn select_keys(&self, candidates: &[String]) -> Vec<String> {
        candidates
            .iter()
            .filter(|c| *c == &self.formatted || c.parse::<f64>() == Ok(self.value))
            .cloned()
            .collect()
    }

    fn operand(&self) -> Option<&Value> {
        Some(&self.operand)
    }

    fn resolved_options(&self) -> &ResolvedOptions {
        &self.options
    }

    fn numeric_value(&self) -> Option<f64> {
        Some(self.value)
    }
}

/// Default rendering for an unannotated double.
pub(crate) fn format_number_with_defaults(value: f64) -> String {
    format!("{}", value)
}

// ---------------------------------------------------------------------
// datetime / date / time

#[derive(Clone, Copy, PartialEq)]
enum DateTimeKind {
    Date,
    Time,
    DateTime,
}

pub(crate) struct DateTimeFormatterFactory {
    kind: DateTimeKind,
}

impl DateTimeFormatterFactory {
    pub(crate) fn date() -> Self {
        DateTimeFormatterFactory {
            kind: DateTimeKind::Date,
        }
    }

    pub(crate) fn time() -> Self {
        DateTimeFormatterFactory {
            kind: DateTimeKind::Time,
        }
    }

    pub(crate) fn date_time() -> Self {
        DateTimeFormatterFactory {
            kind: DateTimeKind::DateTime,
        }
    }
}

impl FormatterFactory for DateTimeFormatterFactory {
    fn create_formatter(&self, locale: &LanguageTag) -> Result<Box<dyn Formatter>, FunctionError> {
        let _ = locale;
        Ok(Box::new(DateTimeFormatter { kind: self.kind }))
    }
}

struct DateTimeFormatter {
    kind: DateTimeKind,
}

struct CivilDateTime {
    year: i64,
    month: u32,
    day: u32,
    hour: u32,
    minute: u32,
    second: u32,
}

// Calendrical conversion from days since 1970-01-01, proleptic
// Gregorian.
fn civil_from_days(days: i64) -> (i64, u32, u32) {
    let z = days + 719_468;
    let shifted = if z >= 0 { z } else { z - 146_096 };
    let era = shifted / 146_097;
    let doe = z - era * 146_097;
    let yoe = (doe - doe / 1_460 + doe / 36_524 - doe / 146_096) / 365;
    let year = yoe + era * 400;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let day = (doy - (153 * mp + 2) / 5 + 1) as u32;
    let month = if mp < 10 { mp + 3 } else { mp - 9 };
    let year = if month <= 2 { year + 1 } else { year };
    (year, month as u32, day)
}

fn civil_from_epoch_millis(ms: i64) -> CivilDateTime {
    let days = ms.div_euclid(86_400_000);
    let rem = ms.rem_euclid(86_400_000) / 1000;
    let (year, month, day) = civil_from_days(days);
    CivilDateTime {
        year,
        month,
        day,
        hour: (rem / 3600) as u32,
        minute: (rem % 3600 / 60) as u32,
        second: (rem % 60) as u32,
    }
}

const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

fn render_date(civil: &CivilDateTime, style: &str) -> String {
    match style {
        "full" | "long" => format!(
            "{} {}, {}",
            MONTH_NAMES[(civil.month - 1) as usize],
            civil.day,
            civil.year
        ),
        _ => format!("{:04}-{:02}-{:02}", civil.year, civil.month, civil.day),
    }
}

fn render_time(civil: &CivilDateTime, style: &str) -> String {
    match style {
        "short" => format!("{:02}:{:02}", civil.hour, civil.minute),
        _ => format!("{:02}:{:02}:{:02}", civil.hour, civil.minute, civil.second),
    }
}

impl Formatter for DateTimeFormatter {
    fn format(
        &self,
        operand: FormattedPlaceholder,
        options: ResolvedOptions,
    ) -> Result<Box<dyn FunctionValue>, FunctionError> {
        let value = operand
            .input()
            .ok_or_else(|| FunctionError::new("datetime needs an operand"))?;
        let ms = match value {
            Value::Date(ms) => *ms,
            Value::Integer(ms) => *ms,
            other => {
                return Err(FunctionError::new(format!(
                    "operand {:?} is not a date",
                    other
                )))
            }
        };
        let civil = civil_from_epoch_millis(ms);
        let date_style = options.get_str("datestyle").unwrap_or("medium").to_owned();
        let time_style = options.get_str("timestyle").unwrap_or("medium").to_owned();
        let formatted = match self.kind {
            DateTimeKind::Date => render_date(&civil, &date_style),
            DateTimeKind::Time => render_time(&civil, &time_style),
            DateTimeKind::DateTime => format!(
                "{} {}",
                render_date(&civil, &date_style),
                render_time(&civil, &time_style)
            ),
        };
        Ok(Box::new(DateTimeValue {
            operand: value.clone(),
            formatted,
            options,
        }))
    }
}

/// Default rendering for an unannotated date value.
pub(crate) fn format_date_with_defaults(ms: i64, _locale: &LanguageTag) -> String {
    let civil = civil_from_epoch_millis(ms);
    format!("{} {}", render_date(&civil, "medium"), render_time(&civil, "medium"))
}

#[derive(Debug)]
struct DateTimeValue {
    operand: Value,
    formatted: String,
    options: ResolvedOptions,
}

impl FunctionValue for DateTimeValue {
    fn format_to_string(&self, _locale: &LanguageTag) -> String {
        self.formatted.clone()
    }

    fn operand(&self) -> Option<&Value> {
        Some(&self.operand)
    }

    fn resolved_options(&self) -> &ResolvedOptions {
        &self.options
    }
}

// ---------------------------------------------------------------------
// string

pub(crate) struct StringFormatterFactory;

impl FormatterFactory for StringFormatterFactory {
    fn create_formatter(&self, locale: &LanguageTag) -> Result<Box<dyn Formatter>, FunctionError> {
        Ok(Box::new(StringFormatter {
            locale: locale.clone(),
        }))
    }
}

struct StringFormatter {
    locale: LanguageTag,
}

impl Formatter for StringFormatter {
    fn format(
        &self,
        operand: FormattedPlaceholder,
        options: ResolvedOptions,
    ) -> Result<Box<dyn FunctionValue>, FunctionError> {
        let value = operand
            .input()
            .ok_or_else(|| FunctionError::new("string needs an operand"))?;
        if matches!(value, Value::Object(_)) {
            return Err(FunctionError::new("cannot format an opaque object"));
        }
        let formatted = operand
            .selection_string(&self.locale)
            .unwrap_or_default();
        Ok(Box::new(StringValue {
            operand: value.clone(),
            formatted,
            options,
        }))
    }
}

#[derive(Debug)]
struct StringValue {
    operand: Value,
    formatted: String,
    options: ResolvedOptions,
}

impl FunctionValue for StringValue {
    fn format_to_string(&self, _locale: &LanguageTag) -> String {
        self.formatted.clone()
    }

    fn select_keys(&self, candidates: &[String]) -> Vec<String> {
        candidates
            .iter()
            .filter(|c| *c == &self.formatted)
            .cloned()
            .collect()
    }

    fn operand(&self) -> Option<&Value> {
        Some(&self.operand)
    }

    fn resolved_options(&self) -> &ResolvedOptions {
        &self.options
    }
}

// ---------------------------------------------------------------------
// plural / selectordinal

#[derive(Clone, Copy)]
enum PluralKind {
    Cardinal,
    Ordinal,
}

pub(crate) struct PluralSelectorFactory {
    kind: PluralKind,
}

impl PluralSelectorFactory {
    pub(crate) fn cardinal() -> Self {
        PluralSelectorFactory {
            kind: PluralKind::Cardinal,
        }
    }

    pub(crate) fn ordinal() -> Self {
        PluralSelectorFactory {
            kind: PluralKind::Ordinal,
        }
    }
}

impl SelectorFactory for PluralSelectorFactory {
    fn create_selector(&self, locale: &LanguageTag) -> Result<Box<dyn Selector>, FunctionError> {
        Ok(Box::new(PluralSelector {
            kind: self.kind,
            language: primary_language(locale),
        }))
    }
}

struct PluralSelector {
    kind: PluralKind,
    language: String,
}

// A compact subset of the CLDR plural rules. The full rule set is the
// locale back-end's concern; this covers the common Western-European
// shape, the no-plural languages, and English ordinals.
fn cardinal_category(language: &str, n: f64) -> &'static str {
    let abs = n.abs();
    let has_fraction = abs.fract() != 0.0;
    match language {
        "ja" | "zh" | "ko" | "th" | "vi" | "id" => "other",
        "fr" | "pt" => {
            if abs < 2.0 {
                "one"
            } else {
                "other"
            }
        }
        _ => {
            if !has_fraction && abs == 1.0 {
                "one"
            } else {
                "other"
            }
        }
    }
}

fn ordinal_category(language: &str, n: f64) -> &'static str {
    if language != "en" || n.fract() != 0.0 || n < 0.0 {
        return "other";
    }
    let n = n as u64;
    match (n % 10, n % 100) {
        (1, 11) | (2, 12) | (3, 13) => "other",
        (1, _) => "one",
        (2, _) => "two",
        (3, _) => "few",
        _ => "other",
    }
}

impl Selector for PluralSelector {
    fn select_keys(
        &self,
        operand: &FormattedPlaceholder,
        options: &ResolvedOptions,
        candidates: &[String],
    ) -> Result<Vec<String>, FunctionError> {
        let _ = options;
        let n = operand
            .numeric_value()
            .ok_or_else(|| FunctionError::new("plural selector operand is not a number"))?;
        // Exact matches rank ahead of keyword matches.
        let mut preferred: Vec<String> = candidates
            .iter()
            .filter(|c| c.parse::<f64>() == Ok(n))
            .cloned()
            .collect();
        let category = match self.kind {
            PluralKind::Cardinal => cardinal_category(&self.language, n),
            PluralKind::Ordinal => ordinal_category(&self.language, n),
        };
        for candidate in candidates {
            if candidate == category && !preferred.contains(candidate) {
                preferred.push(candidate.clone());
            }
        }
        Ok(preferred)
    }
}

// ---------------------------------------------------------------------
// select / gender

pub(crate) struct TextSelectorFactory;

impl SelectorFactory for TextSelectorFactory {
    fn create_selector(&self, locale: &LanguageTag) -> Result<Box<dyn Selector>, FunctionError> {
        Ok(Box::new(TextSelector {
            locale: locale.clone(),
        }))
    }
}

struct TextSelector {
    locale: LanguageTag,
}

impl Selector for TextSelector {
    fn select_keys(
        &self,
        operand: &FormattedPlaceholder,
        options: &ResolvedOptions,
        candidates: &[String],
    ) -> Result<Vec<String>, FunctionError> {
        let _ = options;
        let subject = operand
            .selection_string(&self.locale)
            .ok_or_else(|| FunctionError::new("select operand is missing"))?;
        Ok(candidates
            .iter()
            .filter(|c| **c == subject)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn opts() -> ResolvedOptions {
        ResolvedOptions::new()
    }

    fn placeholder(value: Value) -> FormattedPlaceholder {
        FormattedPlaceholder::from_value(value, "$x")
    }

    fn en() -> LanguageTag {
        LanguageTag {
            language: Some("en".to_owned()),
            ..Default::default()
        }
    }

    #[test]
    fn number_keeps_minimum_fraction_digits() {
        let factory = NumberFormatterFactory::number();
        let formatter = factory.create_formatter(&en()).expect("formatter");
        let mut options = opts();
        options.insert("minimumFractionDigits", Value::String("2".into()));
        let value = formatter
            .format(placeholder(Value::String("4.2".into())), options)
            .expect("format");
        assert_eq!(value.format_to_string(&en()), "4.20");
        assert_eq!(value.numeric_value(), Some(4.2));
    }

    #[test]
    fn number_defaults_trim_trailing_zeros() {
        let factory = NumberFormatterFactory::number();
        let formatter = factory.create_formatter(&en()).expect("formatter");
        let value = formatter
            .format(placeholder(Value::Double(3.0)), opts())
            .expect("format");
        assert_eq!(value.format_to_string(&en()), "3");
    }

    #[test]
    fn integer_rounds_to_whole_numbers() {
        let factory = NumberFormatterFactory::integer();
        let formatter = factory.create_formatter(&en()).expect("formatter");
        let value = formatter
            .format(placeholder(Value::Double(4.7)), opts())
            .expect("format");
        assert_eq!(value.format_to_string(&en()), "5");
        let value = formatter
            .format(placeholder(Value::Integer(12)), opts())
            .expect("format");
        assert_eq!(value.format_to_string(&en()), "12");
    }

    #[test]
    fn number_rejects_non_numbers() {
        let factory = NumberFormatterFactory::number();
        let formatter = factory.create_formatter(&en()).expect("formatter");
        assert!(formatter
            .format(placeholder(Value::String("foo".into())), opts())
            .is_err());
        assert!(formatter
            .format(FormattedPlaceholder::absent(":number"), opts())
            .is_err());
    }

    #[test]
    fn minimum_integer_digits_pad() {
        let factory = NumberFormatterFactory::number();
        let formatter = factory.create_formatter(&en()).expect("formatter");
        let mut options = opts();
        options.insert("minimumIntegerDigits", Value::String("3".into()));
        let value = formatter
            .format(placeholder(Value::Integer(7)), options)
            .expect("format");
        assert_eq!(value.format_to_string(&en()), "007");
    }

    #[test]
    fn civil_conversion_at_epoch() {
        let civil = civil_from_epoch_millis(0);
        assert_eq!(
            (civil.year, civil.month, civil.day, civil.hour, civil.minute, civil.second),
            (1970, 1, 1, 0, 0, 0)
        );
    }

    #[test]
    fn civil_conversion_known_instant() {
        // 2023-11-14T22:13:20Z
        let civil = civil_from_epoch_millis(1_700_000_000_000);
        assert_eq!((civil.year, civil.month, civil.day), (2023, 11, 14));
        assert_eq!((civil.hour, civil.minute, civil.second), (22, 13, 20));
    }

    #[test]
    fn civil_conversion_before_epoch() {
        let civil = civil_from_epoch_millis(-86_400_000);
        assert_eq!((civil.year, civil.month, civil.day), (1969, 12, 31));
    }

    #[test]
    fn date_styles() {
        let factory = DateTimeFormatterFactory::date();
        let formatter = factory.create_formatter(&en()).expect("formatter");
        let mut options = opts();
        options.insert("datestyle", Value::String("long".into()));
        let value = formatter
            .format(placeholder(Value::Date(1_700_000_000_000)), options)
            .expect("format");
        assert_eq!(value.format_to_string(&en()), "November 14, 2023");
        let value = formatter
            .format(placeholder(Value::Date(1_700_000_000_000)), opts())
            .expect("format");
        assert_eq!(value.format_to_string(&en()), "2023-11-14");
    }

    #[test]
    fn cardinal_rules() {
        assert_eq!(cardinal_category("en", 1.0), "one");
        assert_eq!(cardinal_category("en", 1.5), "other");
        assert_eq!(cardinal_category("en", 2.0), "other");
        assert_eq!(cardinal_category("fr", 1.5), "one");
        assert_eq!(cardinal_category("fr", 2.0), "other");
        assert_eq!(cardinal_category("ja", 1.0), "other");
    }

    #[test]
    fn ordinal_rules() {
        assert_eq!(ordinal_category("en", 1.0), "one");
        assert_eq!(ordinal_category("en", 2.0), "two");
        assert_eq!(ordinal_category("en", 3.0), "few");
        assert_eq!(ordinal_category("en", 4.0), "other");
        assert_eq!(ordinal_category("en", 11.0), "other");
        assert_eq!(ordinal_category("en", 21.0), "one");
        assert_eq!(ordinal_category("de", 1.0), "other");
    }

    #[test]
    fn plural_exact_match_ranks_first() {
        let factory = PluralSelectorFactory::cardinal();
        let selector = factory.create_selector(&en()).expect("selector");
        let candidates = vec!["1".to_owned(), "one".to_owned(), "other".to_owned()];
        let prefs = selector
            .select_keys(&placeholder(Value::Integer(1)), &opts(), &candidates)
            .expect("select");
        assert_eq!(prefs, vec!["1".to_owned(), "one".to_owned()]);
    }

    #[test]
    fn text_selector_matches_equal_strings() {
        let factory = TextSelectorFactory;
        let selector = factory.create_selector(&en()).expect("selector");
        let candidates = vec!["female".to_owned(), "male".to_owned()];
        let prefs = selector
            .select_keys(
                &placeholder(Value::String("female".into())),
                &opts(),
                &candidates,
            )
            .expect("select");
        assert_eq!(prefs, vec!["female".to_owned()]);
    }
}
