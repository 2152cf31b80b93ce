//! Tests for string, number, bigint, boolean, date, enum and the value-less
//! primitives.

use crate::prelude::*;
use crate::{IssueCode, ParsedType};
use chrono::{TimeZone, Utc};
use proptest::prelude::*;

fn codes(result: Result<Value, ValidationError>) -> Vec<IssueCode> {
    result.expect_err("parse should fail").codes()
}

// =============================================================================
// Strings
// =============================================================================

#[test]
fn test_string_rejects_other_types() {
    let error = z::string().parse(1).unwrap_err();
    assert_eq!(error.codes(), vec![IssueCode::InvalidType]);
    assert_eq!(error.issues()[0].message, "Expected string, received number");
}

#[test]
fn test_missing_value_reports_required() {
    let error = z::string().parse(Value::Undefined).unwrap_err();
    assert_eq!(error.issues()[0].message, "Required");
}

#[test]
fn test_trim_converts_before_later_rules() {
    let schema = z::string().trim().min(2);
    assert_eq!(schema.parse("  ab  ").unwrap(), Value::from("ab"));
    assert_eq!(codes(schema.parse("  a  ")), vec![IssueCode::InvalidString]);
}

#[test]
fn test_trimmed_only_validates() {
    let schema = z::string().trimmed();
    assert!(schema.is("ab"));
    assert!(!schema.is(" ab"));
}

#[test]
fn test_case_conversion_and_validation() {
    assert_eq!(z::string().to_lowercase().parse("AbC").unwrap(), Value::from("abc"));
    assert_eq!(z::string().to_uppercase().parse("AbC").unwrap(), Value::from("ABC"));
    assert!(!z::string().lowercase().is("AbC"));
    assert!(z::string().uppercase().is("ABC"));
}

#[test]
fn test_string_collects_every_failed_rule() {
    let error = z::string().min(5).email().parse("a@b").unwrap_err();
    assert_eq!(error.len(), 2);
    let messages: Vec<_> = error.issues().iter().map(|i| i.message.as_str()).collect();
    assert_eq!(
        messages,
        vec!["String must contain at least 5 character(s)", "Invalid email"]
    );
}

#[test]
fn test_abort_early_stops_at_first_rule() {
    let options = ParseOptions::new().with_abort_early(true);
    let error = z::string().min(5).email().parse_with("a@b", &options).unwrap_err();
    assert_eq!(error.len(), 1);
}

#[test]
fn test_custom_rule_message() {
    let schema = z::string().min(3).with_message("too short").max(5);
    let error = schema.parse("a").unwrap_err();
    assert_eq!(error.issues()[0].message, "too short");
    let error = schema.parse("abcdefg").unwrap_err();
    assert_eq!(error.issues()[0].message, "String must contain at most 5 character(s)");
}

#[test]
fn test_string_formats() {
    assert!(z::string().uuid().is("67e55044-10b1-426f-9247-bb680e5fe0c8"));
    assert!(z::string().url().is("https://example.com/path?q=1"));
    assert!(!z::string().url().is("example"));
    assert!(z::string().starts_with("ab").ends_with("yz").is("abxyz"));
    assert!(!z::string().includes("needle").is("haystack"));
    assert!(z::string().iso_date().is("2024-02-29"));
}

#[test]
fn test_invalid_pattern_is_a_schema_error() {
    assert!(z::string().pattern("[a-z]+").is_ok());
    assert!(matches!(
        z::string().pattern("(unclosed"),
        Err(crate::SchemaError::InvalidPattern(_))
    ));
}

#[test]
fn test_string_coercion() {
    let schema = z::coerce::string();
    assert_eq!(schema.parse(42).unwrap(), Value::from("42"));
    assert_eq!(schema.parse(true).unwrap(), Value::from("true"));
    assert_eq!(schema.parse(Value::Null).unwrap(), Value::from("null"));
}

// =============================================================================
// Numbers
// =============================================================================

#[test]
fn test_nan_is_an_invalid_type() {
    let error = z::number().parse(f64::NAN).unwrap_err();
    assert_eq!(error.codes(), vec![IssueCode::InvalidType]);
    assert!(matches!(
        error.issues()[0].kind,
        IssueKind::InvalidType {
            expected: ParsedType::Number,
            received: ParsedType::Nan
        }
    ));
}

#[test]
fn test_number_bounds() {
    let schema = z::number().gt(0.0).lte(10.0);
    assert!(schema.is(10));
    assert!(!schema.is(0));
    assert!(!schema.is(10.5));
    assert_eq!(
        z::number().gte(13.0).parse(12).unwrap_err().issues()[0].message,
        "Number must be greater than or equal to 13"
    );
}

#[test]
fn test_int_finite_and_safe() {
    assert_eq!(codes(z::number().int().parse(1.5)), vec![IssueCode::InvalidNumber]);
    assert!(!z::number().finite().is(f64::INFINITY));
    assert!(!z::number().safe().is(9_007_199_254_740_993.0));
}

#[test]
fn test_multiple_of_tolerates_float_steps() {
    let schema = z::number().multiple_of(0.1);
    assert!(schema.is(0.3));
    assert!(schema.is(1.2));
    assert!(!schema.is(0.35));
}

#[test]
fn test_multiple_of_negative_step_does_not_overflow() {
    let schema = z::number().multiple_of(-1.0);
    assert!(schema.safe_parse(-1e300).is_success());
    assert!(!schema.is(-0.5));
    let schema = z::bigint().multiple_of(-1);
    assert!(schema.safe_parse(Value::BigInt(i128::MIN)).is_success());
    let error = z::bigint()
        .multiple_of(-3)
        .parse(Value::BigInt(i128::MIN))
        .unwrap_err();
    assert_eq!(error.codes(), vec![IssueCode::InvalidBigint]);
}

#[test]
fn test_multiple_of_rejects_tiny_non_multiples() {
    let schema = z::number().multiple_of(0.1);
    assert!(!schema.is(1e-300));
    assert!(!schema.is(-1e-20));
    assert!(schema.is(0.0));
}

#[test]
fn test_number_coercion() {
    assert_eq!(z::coerce::number().parse("36").unwrap(), Value::from(36));
    assert_eq!(codes(z::coerce::number().parse("abc")), vec![IssueCode::InvalidType]);
}

#[test]
fn test_bigint_rules_and_coercion() {
    let schema = z::bigint().positive().multiple_of(3);
    assert!(schema.is(Value::BigInt(9)));
    assert!(!schema.is(Value::BigInt(-3)));
    assert!(!schema.is(9));
    assert_eq!(z::coerce::bigint().parse("12").unwrap(), Value::BigInt(12));
}

// =============================================================================
// Booleans and value-less primitives
// =============================================================================

#[test]
fn test_boolean_coercion_uses_truthiness() {
    let schema = z::coerce::boolean();
    assert_eq!(schema.parse("").unwrap(), Value::Bool(false));
    assert_eq!(schema.parse("false").unwrap(), Value::Bool(true));
    assert_eq!(schema.parse(0).unwrap(), Value::Bool(false));
    assert!(!z::boolean().is("true"));
}

#[test]
fn test_value_less_primitives() {
    assert!(z::undefined().is(Value::Undefined));
    assert!(z::void().is(Value::Undefined));
    assert!(z::null().is(Value::Null));
    assert!(!z::null().is(Value::Undefined));
    assert!(z::any().is(Value::Null));
    assert!(z::unknown().is("anything"));
    assert!(z::nan().is(f64::NAN));
    assert!(!z::nan().is(1));
    assert!(z::symbol().is(crate::Symbol::new("tag")));
}

#[test]
fn test_never_is_forbidden() {
    assert_eq!(codes(z::never().parse(1)), vec![IssueCode::Forbidden]);
}

#[test]
fn test_literal_equality() {
    let schema = z::literal("admin");
    assert!(schema.is("admin"));
    let error = schema.parse("user").unwrap_err();
    assert_eq!(error.codes(), vec![IssueCode::InvalidLiteral]);
    assert_eq!(error.issues()[0].message, "Invalid literal value, expected \"admin\"");
}

// =============================================================================
// Dates
// =============================================================================

#[test]
fn test_date_requires_date_values() {
    let at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    assert!(z::date().is(at));
    assert_eq!(codes(z::date().parse("2024-01-01")), vec![IssueCode::InvalidType]);
}

#[test]
fn test_date_coercion() {
    let at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    assert_eq!(z::coerce::date().parse("2024-01-01").unwrap(), Value::Date(at));
    assert_eq!(
        z::coerce::date().parse(at.timestamp_millis()).unwrap(),
        Value::Date(at)
    );
    assert!(z::coerce::date().is("now"));
    assert_eq!(codes(z::coerce::date().parse("garbage")), vec![IssueCode::InvalidDate]);
}

#[test]
fn test_date_range() {
    let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    let end = Utc.with_ymd_and_hms(2024, 12, 31, 0, 0, 0).unwrap();
    let schema = z::date().range(start, end, Inclusivity::Min);
    assert!(schema.is(start));
    assert!(!schema.is(end));
    let error = schema.parse(end).unwrap_err();
    assert_eq!(error.codes(), vec![IssueCode::InvalidDate]);
}

// =============================================================================
// Enums
// =============================================================================

#[test]
fn test_enum_membership() {
    let schema = z::enum_(["red", "green"]);
    assert!(schema.is("red"));
    let error = schema.parse("blue").unwrap_err();
    assert_eq!(error.codes(), vec![IssueCode::InvalidEnumValue]);
    assert_eq!(
        error.issues()[0].message,
        "Invalid enum value. Expected 'red' | 'green', received 'blue'"
    );
    assert_eq!(codes(schema.parse(1)), vec![IssueCode::InvalidType]);
}

#[test]
fn test_native_enum_accepts_values() {
    let schema = z::native_enum([("Up", 1), ("Down", 2)]);
    assert!(schema.is(2));
    assert!(!schema.is("Up"));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Strings within bounds come back unchanged.
    #[test]
    fn prop_valid_strings_round_trip(s in "[a-z]{3,10}") {
        let schema = z::string().min(3).max(10);
        prop_assert_eq!(schema.parse(s.as_str()).unwrap(), Value::from(s.as_str()));
    }

    /// Integers pass `int()`, fractional values do not.
    #[test]
    fn prop_int_rule(n in -1_000_000i64..1_000_000) {
        let schema = z::number().int();
        prop_assert!(schema.is(n));
        prop_assert!(!schema.is(n as f64 + 0.5));
    }

    /// Enum extract and exclude partition the values in declaration order.
    #[test]
    fn prop_enum_extract_exclude_partition(mask in prop::collection::vec(any::<bool>(), 5)) {
        let names = ["a", "b", "c", "d", "e"];
        let schema = z::enum_(names);
        let picked: Vec<&str> = names.iter().zip(&mask).filter(|(_, keep)| **keep).map(|(n, _)| *n).collect();
        let extracted = schema.extract(picked.iter().copied());
        let excluded = schema.exclude(picked.iter().copied());
        prop_assert_eq!(extracted.values().len() + excluded.values().len(), names.len());
        let expected: Vec<Value> = picked.iter().map(|n| Value::from(*n)).collect();
        prop_assert_eq!(extracted.values(), expected.as_slice());
    }
}
