//! Date schema.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};

use crate::context::{Outcome, ParseContext, Status};
use crate::error::{IssueKind, SchemaError};
use crate::schema::Base;
use crate::schema::rules::{Rule, RuleList};
use crate::value::{ParsedType, Value, format_date, parse_date};

/// A date bound; `Now` is resolved each time a rule is checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateBound {
    Now,
    At(DateTime<Utc>),
}

impl DateBound {
    pub fn resolve(&self) -> DateTime<Utc> {
        match self {
            Self::Now => Utc::now(),
            Self::At(at) => *at,
        }
    }
}

impl From<DateTime<Utc>> for DateBound {
    fn from(at: DateTime<Utc>) -> Self {
        Self::At(at)
    }
}

impl FromStr for DateBound {
    type Err = SchemaError;

    /// Accepts `"now"` or any form accepted by date coercion.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("now") {
            return Ok(Self::Now);
        }
        parse_date(s)
            .map(Self::At)
            .ok_or_else(|| SchemaError::InvalidDateBound(s.to_string()))
    }
}

impl fmt::Display for DateBound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Now => f.write_str("now"),
            Self::At(at) => f.write_str(&format_date(at)),
        }
    }
}

/// Which ends of a range are inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Inclusivity {
    Min,
    Max,
    #[default]
    Both,
    None,
}

impl Inclusivity {
    fn includes_start(&self) -> bool {
        matches!(self, Self::Min | Self::Both)
    }

    fn includes_end(&self) -> bool {
        matches!(self, Self::Max | Self::Both)
    }
}

/// A date rule.
#[derive(Debug, Clone, PartialEq)]
pub enum DateRule {
    /// Inclusive lower bound.
    Min(DateBound),
    /// Inclusive upper bound.
    Max(DateBound),
    Range {
        start: DateBound,
        end: DateBound,
        inclusivity: Inclusivity,
    },
}

impl DateRule {
    fn accepts(&self, date: &DateTime<Utc>) -> bool {
        match self {
            Self::Min(bound) => *date >= bound.resolve(),
            Self::Max(bound) => *date <= bound.resolve(),
            Self::Range {
                start,
                end,
                inclusivity,
            } => {
                let (start, end) = (start.resolve(), end.resolve());
                let after_start = if inclusivity.includes_start() {
                    *date >= start
                } else {
                    *date > start
                };
                let before_end = if inclusivity.includes_end() {
                    *date <= end
                } else {
                    *date < end
                };
                after_start && before_end
            }
        }
    }
}

impl Rule for DateRule {
    fn kind(&self) -> &'static str {
        match self {
            Self::Min(_) => "min",
            Self::Max(_) => "max",
            Self::Range { .. } => "range",
        }
    }

    fn excludes(&self) -> &'static [&'static str] {
        match self {
            Self::Min(_) | Self::Max(_) => &["range"],
            Self::Range { .. } => &["min", "max"],
        }
    }

    fn message(&self) -> String {
        match self {
            Self::Min(bound) => format!("Date must be greater than or equal to {}", bound),
            Self::Max(bound) => format!("Date must be smaller than or equal to {}", bound),
            Self::Range { start, end, .. } => format!("Date must be between {} and {}", start, end),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub(crate) struct DateDef {
    pub(crate) rules: RuleList<DateRule>,
    pub(crate) coerce: bool,
}

/// Builder for date schemas.
#[derive(Debug, Clone, Default)]
pub struct DateSchema {
    pub(crate) def: DateDef,
    pub(crate) base: Base,
}

typed_schema!(DateSchema, Date);

pub fn date() -> DateSchema {
    DateSchema::default()
}

impl DateSchema {
    fn rule(mut self, rule: DateRule) -> Self {
        self.def.rules.add(rule);
        self
    }

    /// Accept `"now"`, ISO strings and epoch milliseconds.
    pub fn coerce(mut self) -> Self {
        self.def.coerce = true;
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.def.rules.set_last_message(message.into());
        self
    }

    pub fn min(self, bound: impl Into<DateBound>) -> Self {
        self.rule(DateRule::Min(bound.into()))
    }

    pub fn max(self, bound: impl Into<DateBound>) -> Self {
        self.rule(DateRule::Max(bound.into()))
    }

    pub fn range(
        self,
        start: impl Into<DateBound>,
        end: impl Into<DateBound>,
        inclusivity: Inclusivity,
    ) -> Self {
        self.rule(DateRule::Range {
            start: start.into(),
            end: end.into(),
            inclusivity,
        })
    }

    pub fn rules(&self) -> impl Iterator<Item = &DateRule> {
        self.def.rules.rules()
    }
}

pub(crate) fn parse(def: &DateDef, mut ctx: ParseContext) -> Outcome {
    if def.coerce && !matches!(ctx.data, Value::Date(_)) {
        match ctx.data.coerce_date() {
            Some(date) => ctx.data = Value::Date(date),
            None => {
                ctx.add_issue(IssueKind::InvalidDate { rule: None });
                return Outcome::Aborted;
            }
        }
    }
    let Value::Date(date) = ctx.data else {
        return ctx.invalid_type(ParsedType::Date);
    };
    let mut status = Status::default();
    for check in def.rules.iter() {
        if !check.rule.accepts(&date)
            && ctx.report(
                &mut status,
                IssueKind::InvalidDate {
                    rule: Some(check.rule.clone()),
                },
                check.message.as_deref(),
            )
        {
            return Outcome::Aborted;
        }
    }
    status.finish(Value::Date(date))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(year: i32, month: u32, day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(year, month, day, 0, 0, 0).unwrap()
    }

    #[test]
    fn test_bound_from_str() {
        assert_eq!("now".parse::<DateBound>().unwrap(), DateBound::Now);
        assert_eq!(
            "2024-01-01".parse::<DateBound>().unwrap(),
            DateBound::At(at(2024, 1, 1))
        );
        assert!(matches!(
            "yesterday".parse::<DateBound>(),
            Err(SchemaError::InvalidDateBound(_))
        ));
    }

    #[test]
    fn test_range_inclusivity() {
        let range = |inclusivity| DateRule::Range {
            start: at(2024, 1, 1).into(),
            end: at(2024, 12, 31).into(),
            inclusivity,
        };
        assert!(range(Inclusivity::Both).accepts(&at(2024, 1, 1)));
        assert!(!range(Inclusivity::Max).accepts(&at(2024, 1, 1)));
        assert!(range(Inclusivity::Max).accepts(&at(2024, 12, 31)));
        assert!(!range(Inclusivity::None).accepts(&at(2024, 12, 31)));
        assert!(range(Inclusivity::None).accepts(&at(2024, 6, 1)));
    }

    #[test]
    fn test_range_evicts_min_max() {
        let schema = date()
            .min(at(2020, 1, 1))
            .max(at(2030, 1, 1))
            .range(at(2021, 1, 1), at(2022, 1, 1), Inclusivity::Both);
        let kinds: Vec<_> = schema.rules().map(Rule::kind).collect();
        assert_eq!(kinds, vec!["range"]);
        let schema = schema.min(at(2020, 1, 1));
        let kinds: Vec<_> = schema.rules().map(Rule::kind).collect();
        assert_eq!(kinds, vec!["min"]);
    }

    #[test]
    fn test_now_bound_is_resolved_at_check_time() {
        let past = DateRule::Max(DateBound::Now);
        assert!(past.accepts(&at(2000, 1, 1)));
        assert!(!DateRule::Min(DateBound::Now).accepts(&at(2000, 1, 1)));
    }
}
