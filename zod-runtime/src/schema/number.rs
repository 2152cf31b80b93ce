//! Number and big-integer schemas.

use crate::context::{Outcome, ParseContext, Status};
use crate::error::IssueKind;
use crate::schema::Base;
use crate::schema::rules::{Rule, RuleList};
use crate::value::{ParsedType, Value, format_number};

/// Largest integer a double represents exactly (2^53 - 1).
pub const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

/// A number rule.
#[derive(Debug, Clone, PartialEq)]
pub enum NumberRule {
    Min { value: f64, inclusive: bool },
    Max { value: f64, inclusive: bool },
    Int,
    Finite,
    /// Within `±MAX_SAFE_INTEGER`.
    Safe,
    MultipleOf(f64),
}

impl NumberRule {
    fn accepts(&self, n: f64) -> bool {
        match self {
            Self::Min { value, inclusive } => {
                if *inclusive {
                    n >= *value
                } else {
                    n > *value
                }
            }
            Self::Max { value, inclusive } => {
                if *inclusive {
                    n <= *value
                } else {
                    n < *value
                }
            }
            Self::Int => n.is_finite() && n.fract() == 0.0,
            Self::Finite => n.is_finite(),
            Self::Safe => (-MAX_SAFE_INTEGER..=MAX_SAFE_INTEGER).contains(&n),
            Self::MultipleOf(step) => is_multiple_of(n, *step),
        }
    }
}

fn decimals(n: f64) -> usize {
    let text = format_number(n);
    let (mantissa, exponent) = match text.split_once('e') {
        Some((mantissa, exponent)) => (mantissa, exponent.parse::<i32>().unwrap_or(0)),
        None => (text.as_str(), 0),
    };
    let fraction = mantissa.split_once('.').map_or(0, |(_, frac)| frac.len()) as i32;
    (fraction - exponent).max(0) as usize
}

/// Whether `value` is a whole multiple of `step`, compared on scaled integers
/// so that e.g. `0.3` is a multiple of `0.1`.
fn is_multiple_of(value: f64, step: f64) -> bool {
    if step == 0.0 || !value.is_finite() || !step.is_finite() {
        return false;
    }
    let places = decimals(value).max(decimals(step)).min(15);
    let scale = 10f64.powi(places as i32);
    let scaled_value = (value * scale).round();
    let scaled_step = (step * scale).round();
    let limit = i128::MAX as f64;
    let representable = scaled_value.abs() < limit && scaled_step.abs() < limit;
    if representable && scaled_step != 0.0 && (scaled_value != 0.0 || value == 0.0) {
        let value_int = (scaled_value as i128).unsigned_abs();
        let step_int = (scaled_step as i128).unsigned_abs();
        return value_int % step_int == 0;
    }
    // Out of integer range, or too small to survive scaling.
    let quotient = (value / step).round();
    (quotient * step - value).abs() <= 4.0 * f64::EPSILON * value.abs()
}

impl Rule for NumberRule {
    fn kind(&self) -> &'static str {
        match self {
            Self::Min { .. } => "min",
            Self::Max { .. } => "max",
            Self::Int => "int",
            Self::Finite => "finite",
            Self::Safe => "safe",
            Self::MultipleOf(_) => "multiple_of",
        }
    }

    fn message(&self) -> String {
        match self {
            Self::Min {
                value,
                inclusive: true,
            } => format!("Number must be greater than or equal to {}", format_number(*value)),
            Self::Min { value, .. } => {
                format!("Number must be greater than {}", format_number(*value))
            }
            Self::Max {
                value,
                inclusive: true,
            } => format!("Number must be less than or equal to {}", format_number(*value)),
            Self::Max { value, .. } => format!("Number must be less than {}", format_number(*value)),
            Self::Int => "Expected integer, received float".to_string(),
            Self::Finite => "Number must be finite".to_string(),
            Self::Safe => "Number must be a safe integer".to_string(),
            Self::MultipleOf(step) => {
                format!("Number must be a multiple of {}", format_number(*step))
            }
        }
    }
}

#[derive(Debug, Clone, Default)]
pub(crate) struct NumberDef {
    pub(crate) rules: RuleList<NumberRule>,
    pub(crate) coerce: bool,
}

/// Builder for number schemas. NaN is rejected as an invalid type.
#[derive(Debug, Clone, Default)]
pub struct NumberSchema {
    pub(crate) def: NumberDef,
    pub(crate) base: Base,
}

typed_schema!(NumberSchema, Number);

pub fn number() -> NumberSchema {
    NumberSchema::default()
}

impl NumberSchema {
    fn rule(mut self, rule: NumberRule) -> Self {
        self.def.rules.add(rule);
        self
    }

    /// Convert any input with `Number(x)` semantics before validating.
    pub fn coerce(mut self) -> Self {
        self.def.coerce = true;
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.def.rules.set_last_message(message.into());
        self
    }

    pub fn rules(&self) -> impl Iterator<Item = &NumberRule> {
        self.def.rules.rules()
    }

    pub fn gte(self, value: f64) -> Self {
        self.rule(NumberRule::Min {
            value,
            inclusive: true,
        })
    }

    /// Alias of [`gte`](Self::gte).
    pub fn min(self, value: f64) -> Self {
        self.gte(value)
    }

    pub fn gt(self, value: f64) -> Self {
        self.rule(NumberRule::Min {
            value,
            inclusive: false,
        })
    }

    pub fn lte(self, value: f64) -> Self {
        self.rule(NumberRule::Max {
            value,
            inclusive: true,
        })
    }

    /// Alias of [`lte`](Self::lte).
    pub fn max(self, value: f64) -> Self {
        self.lte(value)
    }

    pub fn lt(self, value: f64) -> Self {
        self.rule(NumberRule::Max {
            value,
            inclusive: false,
        })
    }

    pub fn positive(self) -> Self {
        self.gt(0.0)
    }

    pub fn nonnegative(self) -> Self {
        self.gte(0.0)
    }

    pub fn negative(self) -> Self {
        self.lt(0.0)
    }

    pub fn nonpositive(self) -> Self {
        self.lte(0.0)
    }

    pub fn int(self) -> Self {
        self.rule(NumberRule::Int)
    }

    pub fn finite(self) -> Self {
        self.rule(NumberRule::Finite)
    }

    pub fn safe(self) -> Self {
        self.rule(NumberRule::Safe)
    }

    pub fn multiple_of(self, step: f64) -> Self {
        self.rule(NumberRule::MultipleOf(step))
    }

    /// Alias of [`multiple_of`](Self::multiple_of).
    pub fn step(self, step: f64) -> Self {
        self.multiple_of(step)
    }

    pub fn is_int(&self) -> bool {
        self.def.rules.find("int").is_some()
    }

    pub fn min_value(&self) -> Option<f64> {
        match self.def.rules.find("min") {
            Some(NumberRule::Min { value, .. }) => Some(*value),
            _ => None,
        }
    }

    pub fn max_value(&self) -> Option<f64> {
        match self.def.rules.find("max") {
            Some(NumberRule::Max { value, .. }) => Some(*value),
            _ => None,
        }
    }
}

pub(crate) fn parse(def: &NumberDef, mut ctx: ParseContext) -> Outcome {
    if def.coerce {
        ctx.data = Value::Number(ctx.data.coerce_number());
    }
    let n = match ctx.data {
        Value::Number(n) if !n.is_nan() => n,
        _ => return ctx.invalid_type(ParsedType::Number),
    };
    let mut status = Status::default();
    for check in def.rules.iter() {
        if !check.rule.accepts(n)
            && ctx.report(
                &mut status,
                IssueKind::InvalidNumber {
                    rule: check.rule.clone(),
                },
                check.message.as_deref(),
            )
        {
            return Outcome::Aborted;
        }
    }
    status.finish(Value::Number(n))
}

// =============================================================================
// BigInt
// =============================================================================

/// A big-integer rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BigIntRule {
    Min { value: i128, inclusive: bool },
    Max { value: i128, inclusive: bool },
    MultipleOf(i128),
}

impl BigIntRule {
    fn accepts(&self, n: i128) -> bool {
        match self {
            Self::Min { value, inclusive } => {
                if *inclusive {
                    n >= *value
                } else {
                    n > *value
                }
            }
            Self::Max { value, inclusive } => {
                if *inclusive {
                    n <= *value
                } else {
                    n < *value
                }
            }
            Self::MultipleOf(step) => {
                *step != 0 && n.unsigned_abs() % step.unsigned_abs() == 0
            }
        }
    }
}

impl Rule for BigIntRule {
    fn kind(&self) -> &'static str {
        match self {
            Self::Min { .. } => "min",
            Self::Max { .. } => "max",
            Self::MultipleOf(_) => "multiple_of",
        }
    }

    fn message(&self) -> String {
        match self {
            Self::Min {
                value,
                inclusive: true,
            } => format!("BigInt must be greater than or equal to {}", value),
            Self::Min { value, .. } => format!("BigInt must be greater than {}", value),
            Self::Max {
                value,
                inclusive: true,
            } => format!("BigInt must be less than or equal to {}", value),
            Self::Max { value, .. } => format!("BigInt must be less than {}", value),
            Self::MultipleOf(step) => format!("BigInt must be a multiple of {}", step),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub(crate) struct BigIntDef {
    pub(crate) rules: RuleList<BigIntRule>,
    pub(crate) coerce: bool,
}

/// Builder for big-integer schemas.
#[derive(Debug, Clone, Default)]
pub struct BigIntSchema {
    pub(crate) def: BigIntDef,
    pub(crate) base: Base,
}

typed_schema!(BigIntSchema, BigInt);

pub fn bigint() -> BigIntSchema {
    BigIntSchema::default()
}

impl BigIntSchema {
    fn rule(mut self, rule: BigIntRule) -> Self {
        self.def.rules.add(rule);
        self
    }

    /// Convert with `BigInt(x)` semantics; inputs it cannot convert are
    /// reported as invalid type.
    pub fn coerce(mut self) -> Self {
        self.def.coerce = true;
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.def.rules.set_last_message(message.into());
        self
    }

    pub fn gte(self, value: i128) -> Self {
        self.rule(BigIntRule::Min {
            value,
            inclusive: true,
        })
    }

    pub fn min(self, value: i128) -> Self {
        self.gte(value)
    }

    pub fn gt(self, value: i128) -> Self {
        self.rule(BigIntRule::Min {
            value,
            inclusive: false,
        })
    }

    pub fn lte(self, value: i128) -> Self {
        self.rule(BigIntRule::Max {
            value,
            inclusive: true,
        })
    }

    pub fn max(self, value: i128) -> Self {
        self.lte(value)
    }

    pub fn lt(self, value: i128) -> Self {
        self.rule(BigIntRule::Max {
            value,
            inclusive: false,
        })
    }

    pub fn positive(self) -> Self {
        self.gt(0)
    }

    pub fn nonnegative(self) -> Self {
        self.gte(0)
    }

    pub fn negative(self) -> Self {
        self.lt(0)
    }

    pub fn nonpositive(self) -> Self {
        self.lte(0)
    }

    pub fn multiple_of(self, step: i128) -> Self {
        self.rule(BigIntRule::MultipleOf(step))
    }
}

pub(crate) fn parse_bigint(def: &BigIntDef, mut ctx: ParseContext) -> Outcome {
    if def.coerce
        && let Some(n) = ctx.data.coerce_bigint()
    {
        ctx.data = Value::BigInt(n);
    }
    let Value::BigInt(n) = ctx.data else {
        return ctx.invalid_type(ParsedType::Bigint);
    };
    let mut status = Status::default();
    for check in def.rules.iter() {
        if !check.rule.accepts(n)
            && ctx.report(
                &mut status,
                IssueKind::InvalidBigInt {
                    rule: check.rule.clone(),
                },
                check.message.as_deref(),
            )
        {
            return Outcome::Aborted;
        }
    }
    status.finish(Value::BigInt(n))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_is_multiple_of() {
        assert!(is_multiple_of(0.3, 0.1));
        assert!(is_multiple_of(1.2, 0.4));
        assert!(!is_multiple_of(0.35, 0.1));
        assert!(!is_multiple_of(1.0, 0.0));
        assert!(is_multiple_of(1.5e-7, 5e-8));
        assert_eq!(decimals(1.5e-7), 8);
        assert_eq!(decimals(2e21), 0);
    }

    #[test]
    fn test_multiple_of_negative_step_at_extremes() {
        assert!(is_multiple_of(-1e300, -1.0));
        assert!(is_multiple_of(-6.0, -1.5));
        assert!(!is_multiple_of(-7.0, -1.5));
        assert!(BigIntRule::MultipleOf(-1).accepts(i128::MIN));
        assert!(BigIntRule::MultipleOf(i128::MIN).accepts(i128::MIN));
        assert!(!BigIntRule::MultipleOf(-3).accepts(i128::MIN));
    }

    #[test]
    fn test_multiple_of_rejects_values_lost_in_scaling() {
        assert!(!is_multiple_of(1e-300, 0.1));
        assert!(!is_multiple_of(-5e-324, 1.0));
        assert!(is_multiple_of(0.0, 0.1));
        assert!(is_multiple_of(2e-300, 1e-300));
        assert!(!is_multiple_of(3e-300, 2e-300));
    }

    #[test]
    fn test_bounds() {
        assert!(NumberRule::Min { value: 1.0, inclusive: true }.accepts(1.0));
        assert!(!NumberRule::Min { value: 1.0, inclusive: false }.accepts(1.0));
        assert!(NumberRule::Max { value: 1.0, inclusive: true }.accepts(1.0));
        assert!(!NumberRule::Max { value: 1.0, inclusive: false }.accepts(1.0));
    }

    #[test]
    fn test_int_finite_safe() {
        assert!(NumberRule::Int.accepts(3.0));
        assert!(!NumberRule::Int.accepts(3.5));
        assert!(!NumberRule::Int.accepts(f64::INFINITY));
        assert!(!NumberRule::Finite.accepts(f64::NEG_INFINITY));
        assert!(NumberRule::Safe.accepts(MAX_SAFE_INTEGER));
        assert!(!NumberRule::Safe.accepts(MAX_SAFE_INTEGER + 2.0));
    }

    #[test]
    fn test_messages() {
        assert_eq!(
            NumberRule::Min { value: 5.0, inclusive: true }.message(),
            "Number must be greater than or equal to 5"
        );
        assert_eq!(
            BigIntRule::MultipleOf(3).message(),
            "BigInt must be a multiple of 3"
        );
    }

    #[test]
    fn test_builder_replaces_same_kind() {
        let schema = number().gt(0.0).gte(5.0);
        assert_eq!(schema.min_value(), Some(5.0));
        assert_eq!(schema.rules().count(), 1);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn prop_integer_multiples_have_zero_remainder(k in -1000i64..1000, step in 1i64..50) {
            let value = (k * step) as f64;
            prop_assert!(NumberRule::MultipleOf(step as f64).accepts(value));
        }

        #[test]
        fn prop_bigint_multiple_matches_modulo(n in -10_000i128..10_000, step in 1i128..100) {
            prop_assert_eq!(BigIntRule::MultipleOf(step).accepts(n), n % step == 0);
        }
    }
}
