//! String schema and its rules.

use chrono::{DateTime, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::context::{Outcome, ParseContext, Status};
use crate::error::{IssueKind, SchemaError};
use crate::schema::Base;
use crate::schema::rules::{Rule, RuleList};
use crate::value::{ParsedType, Value};

static EMAIL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9_'+\-]+(\.[A-Za-z0-9_'+\-]+)*@([A-Za-z0-9][A-Za-z0-9\-]*\.)+[A-Za-z]{2,}$")
        .expect("valid email pattern")
});

static URL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z][A-Za-z0-9+.\-]*://[^\s/?#]+[^\s]*$")
        .expect("valid url pattern")
});

static CUID: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^c[^\s-]{8,}$").expect("valid cuid pattern"));

static HEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9A-Fa-f]+$").expect("valid hex pattern"));

static DURATION: Lazy<Regex> = Lazy::new(|| {
    let n = r"\d+(?:[.,]\d+)?";
    Regex::new(&format!(
        r"^P(?:{n}Y)?(?:{n}M)?(?:{n}W)?(?:{n}D)?(?:T(?:{n}H)?(?:{n}M)?(?:{n}S)?)?$"
    ))
    .expect("valid duration pattern")
});

static DATA_URI: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)^data:([\w!#$&.+\-^]+/[\w!#$&.+\-^]+(;[\w\-]+=[^;,]+)*)?(;base64)?,.*$")
        .expect("valid data uri pattern")
});

/// A string rule.
#[derive(Debug, Clone)]
pub enum StringRule {
    /// Minimum length in characters; exclusive when `inclusive` is false.
    Min { value: usize, inclusive: bool },
    Max { value: usize, inclusive: bool },
    Length(usize),
    Email,
    Url,
    Uuid,
    Cuid,
    Hex,
    Alphanumeric,
    IsoDate,
    IsoDateTime,
    IsoDuration,
    DataUri,
    Regex(Regex),
    StartsWith(String),
    EndsWith(String),
    Includes(String),
    /// Leading/trailing whitespace; `convert` trims instead of rejecting.
    Trim { convert: bool },
    /// Letter case; `convert` rewrites instead of rejecting.
    Case { upper: bool, convert: bool },
}

impl StringRule {
    /// Check (and, for converting rules, rewrite) `s`.
    fn apply(&self, s: &mut String) -> bool {
        match self {
            Self::Trim { convert: true } => {
                let trimmed = s.trim();
                if trimmed.len() != s.len() {
                    *s = trimmed.to_string();
                }
                true
            }
            Self::Case {
                upper,
                convert: true,
            } => {
                *s = if *upper { s.to_uppercase() } else { s.to_lowercase() };
                true
            }
            _ => self.accepts(s),
        }
    }

    fn accepts(&self, s: &str) -> bool {
        let chars = || s.chars().count();
        match self {
            Self::Min { value, inclusive } => {
                if *inclusive {
                    chars() >= *value
                } else {
                    chars() > *value
                }
            }
            Self::Max { value, inclusive } => {
                if *inclusive {
                    chars() <= *value
                } else {
                    chars() < *value
                }
            }
            Self::Length(value) => chars() == *value,
            Self::Email => EMAIL.is_match(s),
            Self::Url => URL.is_match(s),
            Self::Uuid => s.len() == 36 && uuid::Uuid::try_parse(s).is_ok(),
            Self::Cuid => CUID.is_match(s),
            Self::Hex => HEX.is_match(s),
            Self::Alphanumeric => !s.is_empty() && s.chars().all(|c| c.is_ascii_alphanumeric()),
            Self::IsoDate => s.len() == 10 && NaiveDate::parse_from_str(s, "%Y-%m-%d").is_ok(),
            Self::IsoDateTime => DateTime::parse_from_rfc3339(s).is_ok(),
            Self::IsoDuration => s != "P" && !s.ends_with('T') && DURATION.is_match(s),
            Self::DataUri => DATA_URI.is_match(s),
            Self::Regex(re) => re.is_match(s),
            Self::StartsWith(prefix) => s.starts_with(prefix.as_str()),
            Self::EndsWith(suffix) => s.ends_with(suffix.as_str()),
            Self::Includes(needle) => s.contains(needle.as_str()),
            Self::Trim { .. } => s.trim().len() == s.len(),
            Self::Case { upper: true, .. } => s.to_uppercase() == s,
            Self::Case { upper: false, .. } => s.to_lowercase() == s,
        }
    }
}

impl Rule for StringRule {
    fn kind(&self) -> &'static str {
        match self {
            Self::Min { .. } => "min",
            Self::Max { .. } => "max",
            Self::Length(_) => "length",
            Self::Email => "email",
            Self::Url => "url",
            Self::Uuid => "uuid",
            Self::Cuid => "cuid",
            Self::Hex => "hex",
            Self::Alphanumeric => "alphanumeric",
            Self::IsoDate => "iso_date",
            Self::IsoDateTime => "iso_datetime",
            Self::IsoDuration => "iso_duration",
            Self::DataUri => "data_uri",
            Self::Regex(_) => "regex",
            Self::StartsWith(_) => "starts_with",
            Self::EndsWith(_) => "ends_with",
            Self::Includes(_) => "includes",
            Self::Trim { .. } => "trim",
            Self::Case { upper: true, .. } => "uppercase",
            Self::Case { upper: false, .. } => "lowercase",
        }
    }

    fn excludes(&self) -> &'static [&'static str] {
        match self {
            Self::Min { .. } | Self::Max { .. } => &["length"],
            Self::Length(_) => &["min", "max"],
            Self::Case { upper: true, .. } => &["lowercase"],
            Self::Case { upper: false, .. } => &["uppercase"],
            _ => &[],
        }
    }

    fn repeatable(&self) -> bool {
        matches!(
            self,
            Self::Regex(_) | Self::StartsWith(_) | Self::EndsWith(_) | Self::Includes(_)
        )
    }

    fn message(&self) -> String {
        match self {
            Self::Min {
                value,
                inclusive: true,
            } => format!("String must contain at least {} character(s)", value),
            Self::Min { value, .. } => format!("String must contain over {} character(s)", value),
            Self::Max {
                value,
                inclusive: true,
            } => format!("String must contain at most {} character(s)", value),
            Self::Max { value, .. } => format!("String must contain under {} character(s)", value),
            Self::Length(value) => format!("String must contain exactly {} character(s)", value),
            Self::Email => "Invalid email".to_string(),
            Self::Url => "Invalid url".to_string(),
            Self::Uuid => "Invalid uuid".to_string(),
            Self::Cuid => "Invalid cuid".to_string(),
            Self::Hex => "Invalid hex".to_string(),
            Self::Alphanumeric => "String must be alphanumeric".to_string(),
            Self::IsoDate => "Invalid date".to_string(),
            Self::IsoDateTime => "Invalid datetime".to_string(),
            Self::IsoDuration => "Invalid duration".to_string(),
            Self::DataUri => "Invalid data URI".to_string(),
            Self::Regex(_) => "Invalid".to_string(),
            Self::StartsWith(prefix) => format!("Invalid input: must start with \"{}\"", prefix),
            Self::EndsWith(suffix) => format!("Invalid input: must end with \"{}\"", suffix),
            Self::Includes(needle) => format!("Invalid input: must include \"{}\"", needle),
            Self::Trim { .. } => "String must not have leading or trailing whitespace".to_string(),
            Self::Case { upper: true, .. } => "String must be uppercase".to_string(),
            Self::Case { upper: false, .. } => "String must be lowercase".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub(crate) struct StringDef {
    pub(crate) rules: RuleList<StringRule>,
    pub(crate) coerce: bool,
}

/// Builder for string schemas.
#[derive(Debug, Clone, Default)]
pub struct StringSchema {
    pub(crate) def: StringDef,
    pub(crate) base: Base,
}

typed_schema!(StringSchema, String);

pub fn string() -> StringSchema {
    StringSchema::default()
}

impl StringSchema {
    fn rule(mut self, rule: StringRule) -> Self {
        self.def.rules.add(rule);
        self
    }

    /// Convert any input with `String(x)` semantics before validating.
    pub fn coerce(mut self) -> Self {
        self.def.coerce = true;
        self
    }

    pub fn is_coerced(&self) -> bool {
        self.def.coerce
    }

    /// Custom message for the most recently added rule.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.def.rules.set_last_message(message.into());
        self
    }

    pub fn rules(&self) -> impl Iterator<Item = &StringRule> {
        self.def.rules.rules()
    }

    pub fn min(self, value: usize) -> Self {
        self.rule(StringRule::Min {
            value,
            inclusive: true,
        })
    }

    pub fn max(self, value: usize) -> Self {
        self.rule(StringRule::Max {
            value,
            inclusive: true,
        })
    }

    pub fn min_with(self, value: usize, inclusive: bool) -> Self {
        self.rule(StringRule::Min { value, inclusive })
    }

    pub fn max_with(self, value: usize, inclusive: bool) -> Self {
        self.rule(StringRule::Max { value, inclusive })
    }

    pub fn length(self, value: usize) -> Self {
        self.rule(StringRule::Length(value))
    }

    pub fn nonempty(self) -> Self {
        self.min(1)
    }

    pub fn email(self) -> Self {
        self.rule(StringRule::Email)
    }

    pub fn url(self) -> Self {
        self.rule(StringRule::Url)
    }

    pub fn uuid(self) -> Self {
        self.rule(StringRule::Uuid)
    }

    pub fn cuid(self) -> Self {
        self.rule(StringRule::Cuid)
    }

    pub fn hex(self) -> Self {
        self.rule(StringRule::Hex)
    }

    pub fn alphanumeric(self) -> Self {
        self.rule(StringRule::Alphanumeric)
    }

    /// `YYYY-MM-DD`.
    pub fn iso_date(self) -> Self {
        self.rule(StringRule::IsoDate)
    }

    /// RFC 3339 date-time.
    pub fn iso_datetime(self) -> Self {
        self.rule(StringRule::IsoDateTime)
    }

    /// ISO 8601 duration such as `P1DT2H`.
    pub fn iso_duration(self) -> Self {
        self.rule(StringRule::IsoDuration)
    }

    pub fn data_uri(self) -> Self {
        self.rule(StringRule::DataUri)
    }

    pub fn regex(self, regex: Regex) -> Self {
        self.rule(StringRule::Regex(regex))
    }

    /// Compile `pattern` and add it as a regex rule.
    pub fn pattern(self, pattern: &str) -> Result<Self, SchemaError> {
        let regex = Regex::new(pattern)?;
        Ok(self.regex(regex))
    }

    pub fn starts_with(self, prefix: impl Into<String>) -> Self {
        self.rule(StringRule::StartsWith(prefix.into()))
    }

    pub fn ends_with(self, suffix: impl Into<String>) -> Self {
        self.rule(StringRule::EndsWith(suffix.into()))
    }

    pub fn includes(self, needle: impl Into<String>) -> Self {
        self.rule(StringRule::Includes(needle.into()))
    }

    /// Trim surrounding whitespace.
    pub fn trim(self) -> Self {
        self.rule(StringRule::Trim { convert: true })
    }

    /// Reject surrounding whitespace.
    pub fn trimmed(self) -> Self {
        self.rule(StringRule::Trim { convert: false })
    }

    pub fn to_lowercase(self) -> Self {
        self.rule(StringRule::Case {
            upper: false,
            convert: true,
        })
    }

    pub fn to_uppercase(self) -> Self {
        self.rule(StringRule::Case {
            upper: true,
            convert: true,
        })
    }

    pub fn lowercase(self) -> Self {
        self.rule(StringRule::Case {
            upper: false,
            convert: false,
        })
    }

    pub fn uppercase(self) -> Self {
        self.rule(StringRule::Case {
            upper: true,
            convert: false,
        })
    }

    /// Minimum length configured, if any.
    pub fn min_length(&self) -> Option<usize> {
        match self.def.rules.find("min") {
            Some(StringRule::Min { value, .. }) => Some(*value),
            _ => None,
        }
    }

    pub fn max_length(&self) -> Option<usize> {
        match self.def.rules.find("max") {
            Some(StringRule::Max { value, .. }) => Some(*value),
            _ => None,
        }
    }
}

pub(crate) fn parse(def: &StringDef, mut ctx: ParseContext) -> Outcome {
    if def.coerce {
        ctx.data = Value::String(ctx.data.coerce_string());
    }
    let mut s = match ctx.take_data() {
        Value::String(s) => s,
        other => {
            ctx.data = other;
            return ctx.invalid_type(ParsedType::String);
        }
    };
    let mut status = Status::default();
    for check in def.rules.iter() {
        if !check.rule.apply(&mut s)
            && ctx.report(
                &mut status,
                IssueKind::InvalidString {
                    rule: check.rule.clone(),
                },
                check.message.as_deref(),
            )
        {
            return Outcome::Aborted;
        }
    }
    status.finish(Value::String(s))
}
