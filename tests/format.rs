// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! End-to-end formatting tests: the core scenarios, declarations and
//! shadowing, selection, the error taxonomy, and custom registries.

use language_tags::LanguageTag;
use message_format2::{
    arg, ErrorCode, ErrorReport, FormattedPlaceholder, Formatter, FormatterFactory, FunctionError,
    FunctionRegistry, FunctionValue, MessageArguments, MessageFormatter, ResolvedOptions, Selector,
    SelectorFactory, Value,
};

fn format(pattern: &str, args: &MessageArguments) -> (String, ErrorReport) {
    let mut formatter = MessageFormatter::builder()
        .pattern(pattern)
        .build()
        .expect("a pattern was set");
    formatter.format_to_string(args)
}

fn format_ok(pattern: &str, args: &MessageArguments) -> String {
    let (result, report) = format(pattern, args);
    assert!(
        report.is_empty(),
        "unexpected errors for `{}`: {:?}",
        pattern,
        report
    );
    result
}

fn locale(tag: &str) -> LanguageTag {
    tag.parse().expect("a well-formed language tag")
}

// ---------------------------------------------------------------------
// The core scenarios.

#[test]
fn formats_a_variable() {
    assert_eq!(
        format_ok("{hello {$place}}", &arg("place", "world")),
        "hello world"
    );
}

#[test]
fn formats_a_literal_through_number() {
    assert_eq!(
        format_ok(
            "{hello {|4.2| :number minimumFractionDigits=2}}",
            &MessageArguments::new()
        ),
        "hello 4.20"
    );
}

#[test]
fn formats_a_declared_variable() {
    assert_eq!(
        format_ok("let $foo = {$bar :number} {bar {$foo}}", &arg("bar", 3)),
        "bar 3"
    );
}

#[test]
fn selects_a_plural_category() {
    let pattern = "match {$n :plural} when 1 {one} when * {other}";
    assert_eq!(format_ok(pattern, &arg("n", 1)), "one");
    assert_eq!(format_ok(pattern, &arg("n", 5)), "other");
}

#[test]
fn exact_match_beats_plural_category() {
    let pattern = "match {$n :plural} when 1 {=1} when one {one} when * {other}";
    assert_eq!(format_ok(pattern, &arg("n", 1)), "=1");
}

#[test]
fn unresolved_variable_falls_back() {
    let (result, report) = format("{hello {$unknown}}", &MessageArguments::new());
    assert_eq!(result, "hello {$unknown}");
    assert_eq!(report.first_code(), Some(ErrorCode::UnresolvedVariable));
    assert_eq!(report.dynamic_errors().len(), 1);
    assert_eq!(report.dynamic_errors()[0].detail, "unknown");
}

// ---------------------------------------------------------------------
// Declarations, environments, shadowing.

#[test]
fn declarations_resolve_lazily_through_arguments() {
    assert_eq!(
        format_ok("let $foo = {$bar} {bar {$foo}}", &arg("bar", "baz")),
        "bar baz"
    );
}

#[test]
fn later_binding_wins_for_later_uses() {
    assert_eq!(
        format_ok(
            "let $x = {|1|} let $x = {|2|} {{$x}}",
            &MessageArguments::new()
        ),
        "2"
    );
}

#[test]
fn closures_capture_the_environment_at_declaration() {
    // $b captures the environment before $a is shadowed.
    assert_eq!(
        format_ok(
            "let $a = {|first|} let $b = {$a} let $a = {|second|} {{$b} {$a}}",
            &MessageArguments::new()
        ),
        "first second"
    );
}

#[test]
fn unused_broken_declarations_still_report() {
    // The declaration list is checked in source order even when the
    // body never uses the binding.
    let (result, report) = format("let $a = {$missing} {ok}", &MessageArguments::new());
    assert_eq!(result, "ok");
    assert_eq!(report.first_code(), Some(ErrorCode::UnresolvedVariable));
}

#[test]
fn number_options_resolve_variables() {
    assert_eq!(
        format_ok(
            "{x {|4.2| :number minimumFractionDigits=$digits}}",
            &arg("digits", 3)
        ),
        "x 4.200"
    );
}

// ---------------------------------------------------------------------
// Selection.

#[test]
fn select_matches_strings() {
    let pattern = "match {$userGender :select} \
                   when female {{$userName} will respond shortly.} \
                   when * {They will respond shortly.}";
    assert_eq!(
        format_ok(pattern, &arg("userGender", "female").arg("userName", "She")),
        "She will respond shortly."
    );
    assert_eq!(
        format_ok(pattern, &arg("userGender", "other").arg("userName", "x")),
        "They will respond shortly."
    );
}

#[test]
fn multiple_selectors_rank_lexicographically() {
    let pattern = "match {$a :select} {$b :select} \
                   when x * {x-any} when x y {x-y} when * * {any}";
    // The more specific variant wins over the earlier, less specific
    // one.
    assert_eq!(format_ok(pattern, &arg("a", "x").arg("b", "y")), "x-y");
    assert_eq!(format_ok(pattern, &arg("a", "x").arg("b", "z")), "x-any");
    assert_eq!(format_ok(pattern, &arg("a", "q").arg("b", "y")), "any");
}

#[test]
fn ties_break_by_source_order() {
    let pattern = "match {$a :select} when x {first} when x {second} when * {other}";
    assert_eq!(format_ok(pattern, &arg("a", "x")), "first");
}

#[test]
fn catch_all_is_sound() {
    let pattern = "match {$a :select} when nope {no} when * {yes}";
    assert_eq!(format_ok(pattern, &arg("a", "something")), "yes");
}

#[test]
fn unannotated_selector_matches_runtime_values() {
    let pattern = "match {$foo} when 1 {one} when * {other}";
    assert_eq!(format_ok(pattern, &arg("foo", 1)), "one");
    assert_eq!(format_ok(pattern, &arg("foo", "1")), "one");
    assert_eq!(format_ok(pattern, &arg("foo", 2)), "other");
}

#[test]
fn selectordinal_uses_ordinal_rules() {
    let pattern = "match {$place :selectordinal} \
                   when one {{$place}st} when two {{$place}nd} \
                   when few {{$place}rd} when * {{$place}th}";
    assert_eq!(format_ok(pattern, &arg("place", 1)), "1st");
    assert_eq!(format_ok(pattern, &arg("place", 22)), "22nd");
    assert_eq!(format_ok(pattern, &arg("place", 3)), "3rd");
    assert_eq!(format_ok(pattern, &arg("place", 11)), "11th");
}

#[test]
fn plural_respects_the_locale() {
    let pattern = "match {$n :plural} when one {un} when * {autres}";
    let mut formatter = MessageFormatter::builder()
        .pattern(pattern)
        .locale(locale("fr"))
        .build()
        .expect("a pattern was set");
    let (result, _) = formatter.format_to_string(&arg("n", 0));
    assert_eq!(result, "un");
    let (result, _) = formatter.format_to_string(&arg("n", 7));
    assert_eq!(result, "autres");
}

#[test]
fn two_selector_party_message() {
    let pattern = "match {$hostGender :gender} {$guestCount :plural} \
                   when female 1 {She invites one guest.} \
                   when female * {She invites {$guestCount} guests.} \
                   when * 1 {They invite one guest.} \
                   when * * {They invite {$guestCount} guests.}";
    assert_eq!(
        format_ok(pattern, &arg("hostGender", "female").arg("guestCount", 1)),
        "She invites one guest."
    );
    assert_eq!(
        format_ok(pattern, &arg("hostGender", "female").arg("guestCount", 4)),
        "She invites 4 guests."
    );
    assert_eq!(
        format_ok(pattern, &arg("hostGender", "male").arg("guestCount", 1)),
        "They invite one guest."
    );
}

// ---------------------------------------------------------------------
// The error taxonomy.

#[test]
fn unknown_function_reports_and_falls_back() {
    let (result, report) = format("{a {$x :nonesuch}}", &arg("x", 1));
    assert_eq!(result, "a {$x}");
    assert_eq!(report.first_code(), Some(ErrorCode::UnknownFunction));
}

#[test]
fn selector_used_as_formatter_is_a_formatting_error() {
    let (result, report) = format("{a {$x :plural}}", &arg("x", 1));
    assert_eq!(result, "a {$x}");
    assert_eq!(report.first_code(), Some(ErrorCode::Formatting));
}

#[test]
fn formatter_used_as_selector_is_a_selector_error() {
    let (result, report) = format(
        "match {$x :number} when 1 {one} when * {other}",
        &arg("x", 1),
    );
    // The selector contributes no preferences, so only the catch-all
    // matches.
    assert_eq!(result, "other");
    assert_eq!(report.first_code(), Some(ErrorCode::Selector));
}

#[test]
fn reserved_annotations_render_as_fallback() {
    let (result, report) = format("{hello {$x @reserved}}", &arg("x", 1));
    assert_eq!(result, "hello {$x @reserved}");
    assert_eq!(report.first_code(), Some(ErrorCode::Reserved));
}

#[test]
fn markup_forms_dispatch_like_functions() {
    // `+tag` and `-tag` parse as function annotations; nothing is
    // registered under "tag", so they fall back.
    let (result, report) = format("{{+tag}content{-tag}}", &MessageArguments::new());
    assert_eq!(result, "{+tag}content{-tag}");
    assert_eq!(report.first_code(), Some(ErrorCode::UnknownFunction));
    assert_eq!(report.dynamic_errors().len(), 2);
}

#[test]
fn absent_operand_function_failure_uses_function_fallback() {
    let (result, report) = format("{hello {:number}}", &MessageArguments::new());
    assert_eq!(result, "hello {:number}");
    assert_eq!(report.first_code(), Some(ErrorCode::Formatting));
}

#[test]
fn duplicate_options_are_static_and_resolution_uses_the_last() {
    let (result, report) = format(
        "{a {$x :number minimumFractionDigits=2 minimumFractionDigits=3}}",
        &arg("x", 1),
    );
    assert_eq!(result, "a 1.000");
    assert_eq!(report.first_code(), Some(ErrorCode::DuplicateOptionName));
}

#[test]
fn nonexhaustive_match_reports_statically() {
    let (result, report) = format("match {$n :plural} when 1 {one}", &arg("n", 2));
    assert_eq!(result, "");
    assert_eq!(report.first_code(), Some(ErrorCode::NonexhaustivePattern));
}

#[test]
fn missing_selector_annotation_is_static() {
    let (result, report) = format("match {|foo|} when * {x}", &MessageArguments::new());
    assert_eq!(result, "x");
    assert_eq!(
        report.first_code(),
        Some(ErrorCode::MissingSelectorAnnotation)
    );
}

#[test]
fn static_errors_outrank_dynamic_errors() {
    let (_, report) = format("{{$x @res} {$missing}}", &arg("x", 1));
    assert!(report.has(ErrorCode::UnresolvedVariable));
    assert_eq!(report.first_code(), Some(ErrorCode::Reserved));
}

#[test]
fn errors_accumulate_without_aborting() {
    let (result, report) = format(
        "{{$a} and {$b} and {$c :nonesuch}}",
        &arg("c", 1),
    );
    assert_eq!(result, "{$a} and {$b} and {$c}");
    assert_eq!(report.dynamic_errors().len(), 3);
    assert_eq!(report.dynamic_errors()[0].detail, "a");
    assert_eq!(report.dynamic_errors()[1].detail, "b");
    assert_eq!(report.dynamic_errors()[2].detail, "nonesuch");
}

#[test]
fn dynamic_errors_reset_between_calls() {
    let mut formatter = MessageFormatter::builder()
        .pattern("{hello {$place}}")
        .build()
        .expect("a pattern was set");
    let (_, report) = formatter.format_to_string(&MessageArguments::new());
    assert!(report.has(ErrorCode::UnresolvedVariable));
    let (result, report) = formatter.format_to_string(&arg("place", "world"));
    assert_eq!(result, "hello world");
    assert!(report.is_empty());
}

// ---------------------------------------------------------------------
// Dates, decimals, strings.

#[test]
fn formats_dates() {
    let when = 1_700_000_000_000;
    let args = MessageArguments::new().date("when", when);
    assert_eq!(
        format_ok("{today is {$when :date}}", &args),
        "today is 2023-11-14"
    );
    assert_eq!(
        format_ok("{at {$when :time timestyle=short}}", &args),
        "at 22:13"
    );
    assert_eq!(
        format_ok("{on {$when :datetime datestyle=long}}", &args),
        "on November 14, 2023 22:13:20"
    );
}

#[test]
fn formats_decimal_arguments() {
    let args = MessageArguments::new().decimal("rate", "0.125");
    assert_eq!(
        format_ok("{rate {$rate :number minimumFractionDigits=2}}", &args),
        "rate 0.125"
    );
    assert_eq!(format_ok("{rate {$rate}}", &args), "rate 0.125");
}

#[test]
fn string_function_passes_text_through() {
    assert_eq!(
        format_ok("{hi {$name :string}}", &arg("name", "Ada")),
        "hi Ada"
    );
    assert_eq!(format_ok("{n {$n :string}}", &arg("n", 7)), "n 7");
}

#[test]
fn string_lists_join() {
    let args = MessageArguments::new().arg(
        "names",
        vec!["a".to_owned(), "b".to_owned(), "c".to_owned()],
    );
    assert_eq!(format_ok("{all: {$names}}", &args), "all: a, b, c");
}

// ---------------------------------------------------------------------
// Custom registries.

struct UppercaseFactory;

impl FormatterFactory for UppercaseFactory {
    fn create_formatter(
        &self,
        _locale: &LanguageTag,
    ) -> Result<Box<dyn Formatter>, FunctionError> {
        Ok(Box::new(Uppercase))
    }
}

struct Uppercase;

#[derive(Debug)]
struct UppercaseValue {
    operand: Value,
    text: String,
    options: ResolvedOptions,
}

impl FunctionValue for UppercaseValue {
    fn format_to_string(&self, _locale: &LanguageTag) -> String {
        self.text.clone()
    }

    fn operand(&self) -> Option<&Value> {
        Some(&self.operand)
    }

    fn resolved_options(&self) -> &ResolvedOptions {
        &self.options
    }
}

impl Formatter for Uppercase {
    fn format(
        &self,
        operand: FormattedPlaceholder,
        options: ResolvedOptions,
    ) -> Result<Box<dyn FunctionValue>, FunctionError> {
        match operand.input() {
            Some(Value::String(s)) => Ok(Box::new(UppercaseValue {
                operand: Value::String(s.clone()),
                text: s.to_uppercase(),
                options,
            })),
            _ => Err(FunctionError::new("uppercase needs a string operand")),
        }
    }
}

struct ParityFactory;

impl SelectorFactory for ParityFactory {
    fn create_selector(&self, _locale: &LanguageTag) -> Result<Box<dyn Selector>, FunctionError> {
        Ok(Box::new(Parity))
    }
}

struct Parity;

impl Selector for Parity {
    fn select_keys(
        &self,
        operand: &FormattedPlaceholder,
        _options: &ResolvedOptions,
        candidates: &[String],
    ) -> Result<Vec<String>, FunctionError> {
        let n = operand
            .numeric_value()
            .ok_or_else(|| FunctionError::new("parity needs a number"))?;
        let category = if (n as i64) % 2 == 0 { "even" } else { "odd" };
        Ok(candidates
            .iter()
            .filter(|c| *c == category)
            .cloned()
            .collect())
    }
}

fn custom_registry() -> FunctionRegistry {
    FunctionRegistry::builder()
        .formatter("uppercase", UppercaseFactory)
        .selector("parity", ParityFactory)
        .build()
}

#[test]
fn custom_formatter_is_dispatched() {
    let registry = custom_registry();
    let mut formatter = MessageFormatter::builder()
        .pattern("{shout {$word :uppercase}}")
        .function_registry(&registry)
        .build()
        .expect("a pattern was set");
    let (result, report) = formatter.format_to_string(&arg("word", "hello"));
    assert_eq!(result, "shout HELLO");
    assert!(report.is_empty());
}

#[test]
fn custom_selector_is_dispatched() {
    let registry = custom_registry();
    let mut formatter = MessageFormatter::builder()
        .pattern("match {$n :parity} when even {even} when odd {odd} when * {other}")
        .function_registry(&registry)
        .build()
        .expect("a pattern was set");
    let (result, _) = formatter.format_to_string(&arg("n", 4));
    assert_eq!(result, "even");
    let (result, _) = formatter.format_to_string(&arg("n", 3));
    assert_eq!(result, "odd");
}

#[test]
fn custom_selector_in_formatter_position_falls_back() {
    let registry = custom_registry();
    let mut formatter = MessageFormatter::builder()
        .pattern("{x {$n :parity}}")
        .function_registry(&registry)
        .build()
        .expect("a pattern was set");
    let (result, report) = formatter.format_to_string(&arg("n", 4));
    assert_eq!(result, "x {$n}");
    assert_eq!(report.first_code(), Some(ErrorCode::Formatting));
}

#[test]
fn custom_formatter_failure_reports_and_falls_back() {
    let registry = custom_registry();
    let mut formatter = MessageFormatter::builder()
        .pattern("{shout {$word :uppercase}}")
        .function_registry(&registry)
        .build()
        .expect("a pattern was set");
    let (result, report) = formatter.format_to_string(&arg("word", 12));
    assert_eq!(result, "shout {$word}");
    assert_eq!(report.first_code(), Some(ErrorCode::Formatting));
}

#[test]
fn built_ins_shadow_the_custom_registry() {
    // A custom "number" formatter never wins over the built-in.
    let registry = FunctionRegistry::builder()
        .formatter("number", UppercaseFactory)
        .build();
    let mut formatter = MessageFormatter::builder()
        .pattern("{n {$n :number}}")
        .function_registry(&registry)
        .build()
        .expect("a pattern was set");
    let (result, report) = formatter.format_to_string(&arg("n", 3));
    assert_eq!(result, "n 3");
    assert!(report.is_empty());
}

// ---------------------------------------------------------------------
// Idempotence.

#[test]
fn formatting_is_idempotent_across_calls() {
    let mut formatter = MessageFormatter::builder()
        .pattern(
            "let $count = {$n :number} \
             match {$n :plural} when 1 {one ({$count})} when * {many ({$count})}",
        )
        .build()
        .expect("a pattern was set");
    let args = arg("n", 1);
    let (first, first_report) = formatter.format_to_string(&args);
    let (second, second_report) = formatter.format_to_string(&args);
    assert_eq!(first, "one (1)");
    assert_eq!(first, second);
    assert_eq!(
        first_report.dynamic_errors(),
        second_report.dynamic_errors()
    );
}
