//! Issues and error types
//!
//! Validation failures are reported as ordered lists of [`Issue`]s. Each issue
//! carries a closed [`IssueKind`] with its payload, the path to the offending
//! value and a message. Issue codes serialize to snake_case strings.
//!
//! # Example
//! ```rust
//! use zod_runtime::prelude::*;
//!
//! let schema = z::object().field("name", z::string().min(2));
//! let error = schema.parse(serde_json::json!({"name": "x"})).unwrap_err();
//!
//! assert_eq!(error.issues()[0].code(), IssueCode::InvalidString);
//! assert_eq!(error.flatten().field_errors["name"].len(), 1);
//! ```

use std::collections::BTreeMap;
use std::fmt;

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use thiserror::Error;

use crate::schema::array::{ArrayRule, SetRule};
use crate::schema::date::DateRule;
use crate::schema::number::{BigIntRule, NumberRule};
use crate::schema::rules::Rule;
use crate::schema::string::StringRule;
use crate::value::{ParsedType, Value};

/// Discriminant of an [`IssueKind`].
///
/// Serialized as snake_case (e.g. `InvalidType` becomes `"invalid_type"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueCode {
    InvalidType,
    InvalidLiteral,
    InvalidEnumValue,
    InvalidString,
    InvalidNumber,
    InvalidBigint,
    InvalidArray,
    InvalidSet,
    InvalidDate,
    InvalidTuple,
    UnrecognizedKeys,
    InvalidUnion,
    InvalidIntersection,
    InvalidArguments,
    InvalidReturnType,
    Forbidden,
    Required,
    Custom,
}

impl IssueCode {
    /// Returns the string representation of the code.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidType => "invalid_type",
            Self::InvalidLiteral => "invalid_literal",
            Self::InvalidEnumValue => "invalid_enum_value",
            Self::InvalidString => "invalid_string",
            Self::InvalidNumber => "invalid_number",
            Self::InvalidBigint => "invalid_bigint",
            Self::InvalidArray => "invalid_array",
            Self::InvalidSet => "invalid_set",
            Self::InvalidDate => "invalid_date",
            Self::InvalidTuple => "invalid_tuple",
            Self::UnrecognizedKeys => "unrecognized_keys",
            Self::InvalidUnion => "invalid_union",
            Self::InvalidIntersection => "invalid_intersection",
            Self::InvalidArguments => "invalid_arguments",
            Self::InvalidReturnType => "invalid_return_type",
            Self::Forbidden => "forbidden",
            Self::Required => "required",
            Self::Custom => "custom",
        }
    }
}

impl fmt::Display for IssueCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One step of an issue path: an object key or an array index.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PathSegment {
    Key(String),
    Index(usize),
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Key(key) => f.write_str(key),
            Self::Index(index) => write!(f, "{}", index),
        }
    }
}

impl Serialize for PathSegment {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Key(key) => serializer.serialize_str(key),
            Self::Index(index) => serializer.serialize_u64(*index as u64),
        }
    }
}

impl From<&str> for PathSegment {
    fn from(key: &str) -> Self {
        Self::Key(key.to_string())
    }
}

impl From<String> for PathSegment {
    fn from(key: String) -> Self {
        Self::Key(key)
    }
}

impl From<usize> for PathSegment {
    fn from(index: usize) -> Self {
        Self::Index(index)
    }
}

/// Render a path as `a.0.b`; the empty path renders as `(root)`.
pub fn display_path(path: &[PathSegment]) -> String {
    if path.is_empty() {
        return "(root)".to_string();
    }
    path.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(".")
}

/// Which arity bound a tuple violated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TupleBound {
    Min,
    Max,
}

/// Kind-specific payload of an issue.
#[derive(Debug, Clone)]
pub enum IssueKind {
    InvalidType {
        expected: ParsedType,
        received: ParsedType,
    },
    InvalidLiteral {
        expected: Value,
        received: Value,
    },
    InvalidEnumValue {
        options: Vec<Value>,
        received: Value,
    },
    InvalidString {
        rule: StringRule,
    },
    InvalidNumber {
        rule: NumberRule,
    },
    InvalidBigInt {
        rule: BigIntRule,
    },
    InvalidArray {
        rule: ArrayRule,
    },
    InvalidSet {
        rule: SetRule,
    },
    /// `rule` is `None` when the input could not be read as a date at all.
    InvalidDate {
        rule: Option<DateRule>,
    },
    InvalidTuple {
        bound: TupleBound,
        expected: usize,
        received: usize,
    },
    UnrecognizedKeys {
        keys: Vec<String>,
    },
    InvalidUnion {
        union_errors: Vec<Vec<Issue>>,
    },
    InvalidIntersection,
    InvalidArguments {
        argument_errors: Vec<Issue>,
    },
    InvalidReturnType {
        return_type_errors: Vec<Issue>,
    },
    Forbidden,
    Required,
    Custom {
        params: Option<serde_json::Value>,
    },
}

impl IssueKind {
    pub fn code(&self) -> IssueCode {
        match self {
            Self::InvalidType { .. } => IssueCode::InvalidType,
            Self::InvalidLiteral { .. } => IssueCode::InvalidLiteral,
            Self::InvalidEnumValue { .. } => IssueCode::InvalidEnumValue,
            Self::InvalidString { .. } => IssueCode::InvalidString,
            Self::InvalidNumber { .. } => IssueCode::InvalidNumber,
            Self::InvalidBigInt { .. } => IssueCode::InvalidBigint,
            Self::InvalidArray { .. } => IssueCode::InvalidArray,
            Self::InvalidSet { .. } => IssueCode::InvalidSet,
            Self::InvalidDate { .. } => IssueCode::InvalidDate,
            Self::InvalidTuple { .. } => IssueCode::InvalidTuple,
            Self::UnrecognizedKeys { .. } => IssueCode::UnrecognizedKeys,
            Self::InvalidUnion { .. } => IssueCode::InvalidUnion,
            Self::InvalidIntersection => IssueCode::InvalidIntersection,
            Self::InvalidArguments { .. } => IssueCode::InvalidArguments,
            Self::InvalidReturnType { .. } => IssueCode::InvalidReturnType,
            Self::Forbidden => IssueCode::Forbidden,
            Self::Required => IssueCode::Required,
            Self::Custom { .. } => IssueCode::Custom,
        }
    }

    /// English message used when neither the rule nor an error map supplies one.
    pub fn default_message(&self) -> String {
        match self {
            Self::InvalidType {
                received: ParsedType::Undefined,
                ..
            } => "Required".to_string(),
            Self::InvalidType { expected, received } => {
                format!("Expected {}, received {}", expected, received)
            }
            Self::InvalidLiteral { expected, .. } => {
                format!("Invalid literal value, expected {}", expected)
            }
            Self::InvalidEnumValue { options, received } => format!(
                "Invalid enum value. Expected {}, received {}",
                options
                    .iter()
                    .map(|option| format!("'{}'", option.coerce_string()))
                    .collect::<Vec<_>>()
                    .join(" | "),
                match received {
                    Value::String(s) => format!("'{}'", s),
                    other => other.to_string(),
                }
            ),
            Self::InvalidString { rule } => rule.message(),
            Self::InvalidNumber { rule } => rule.message(),
            Self::InvalidBigInt { rule } => rule.message(),
            Self::InvalidArray { rule } => rule.message(),
            Self::InvalidSet { rule } => rule.message(),
            Self::InvalidDate { rule: Some(rule) } => rule.message(),
            Self::InvalidDate { rule: None } => "Invalid date".to_string(),
            Self::InvalidTuple {
                bound: TupleBound::Min,
                expected,
                ..
            } => format!("Array must contain at least {} element(s)", expected),
            Self::InvalidTuple {
                bound: TupleBound::Max,
                expected,
                ..
            } => format!("Array must contain at most {} element(s)", expected),
            Self::UnrecognizedKeys { keys } => format!(
                "Unrecognized key(s) in object: {}",
                keys.iter()
                    .map(|key| format!("'{}'", key))
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
            Self::InvalidUnion { .. } => "Invalid input".to_string(),
            Self::InvalidIntersection => "Intersection results could not be merged".to_string(),
            Self::InvalidArguments { .. } => "Invalid function arguments".to_string(),
            Self::InvalidReturnType { .. } => "Invalid function return type".to_string(),
            Self::Forbidden => "Value is forbidden".to_string(),
            Self::Required => "Required".to_string(),
            Self::Custom { .. } => "Invalid input".to_string(),
        }
    }
}

/// A single validation diagnostic.
#[derive(Debug, Clone)]
pub struct Issue {
    pub kind: IssueKind,
    pub path: Vec<PathSegment>,
    pub message: String,
}

impl Issue {
    /// Create an issue with the kind's default message.
    pub fn new(kind: IssueKind, path: Vec<PathSegment>) -> Self {
        let message = kind.default_message();
        Self {
            kind,
            path,
            message,
        }
    }

    /// Replace the message.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    pub fn code(&self) -> IssueCode {
        self.kind.code()
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", display_path(&self.path), self.message)
    }
}

impl Serialize for Issue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("code", &self.code())?;
        map.serialize_entry("path", &self.path)?;
        map.serialize_entry("message", &self.message)?;
        match &self.kind {
            IssueKind::InvalidType { expected, received } => {
                map.serialize_entry("expected", expected)?;
                map.serialize_entry("received", received)?;
            }
            IssueKind::InvalidLiteral { expected, received } => {
                map.serialize_entry("expected", expected)?;
                map.serialize_entry("received", received)?;
            }
            IssueKind::InvalidEnumValue { options, received } => {
                map.serialize_entry("options", options)?;
                map.serialize_entry("received", received)?;
            }
            IssueKind::InvalidString { rule } => map.serialize_entry("validation", rule.kind())?,
            IssueKind::InvalidNumber { rule } => map.serialize_entry("validation", rule.kind())?,
            IssueKind::InvalidBigInt { rule } => map.serialize_entry("validation", rule.kind())?,
            IssueKind::InvalidArray { rule } => map.serialize_entry("validation", rule.kind())?,
            IssueKind::InvalidSet { rule } => map.serialize_entry("validation", rule.kind())?,
            IssueKind::InvalidDate { rule: Some(rule) } => {
                map.serialize_entry("validation", rule.kind())?
            }
            IssueKind::InvalidTuple {
                bound,
                expected,
                received,
            } => {
                map.serialize_entry("bound", bound)?;
                map.serialize_entry("expected", expected)?;
                map.serialize_entry("received", received)?;
            }
            IssueKind::UnrecognizedKeys { keys } => map.serialize_entry("keys", keys)?,
            IssueKind::InvalidUnion { union_errors } => {
                map.serialize_entry("union_errors", union_errors)?
            }
            IssueKind::InvalidArguments { argument_errors } => {
                map.serialize_entry("argument_errors", argument_errors)?
            }
            IssueKind::InvalidReturnType { return_type_errors } => {
                map.serialize_entry("return_type_errors", return_type_errors)?
            }
            IssueKind::Custom {
                params: Some(params),
            } => map.serialize_entry("params", params)?,
            _ => {}
        }
        map.end()
    }
}

/// Information handed to an error map alongside the issue kind.
#[derive(Debug, Clone, Copy)]
pub struct ErrorMapContext<'a> {
    /// Path of the value that failed.
    pub path: &'a [PathSegment],
    /// The message that will be used if this map declines.
    pub default_message: &'a str,
}

// =============================================================================
// ValidationError
// =============================================================================

/// Failed parse: the ordered list of issues collected during the call.
#[derive(Debug, Clone, Error)]
#[error("{}", summarize(.issues))]
pub struct ValidationError {
    issues: Vec<Issue>,
}

fn summarize(issues: &[Issue]) -> String {
    match issues {
        [] => "Validation failed".to_string(),
        [single] => single.to_string(),
        many => format!(
            "{} validation issues: {}",
            many.len(),
            many.iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join("; ")
        ),
    }
}

impl ValidationError {
    pub fn new(issues: Vec<Issue>) -> Self {
        Self { issues }
    }

    /// A single `custom` issue at the root with the given message.
    pub fn custom(message: impl Into<String>) -> Self {
        Self::new(vec![
            Issue::new(IssueKind::Custom { params: None }, Vec::new()).with_message(message),
        ])
    }

    pub fn issues(&self) -> &[Issue] {
        &self.issues
    }

    pub fn into_issues(self) -> Vec<Issue> {
        self.issues
    }

    pub fn len(&self) -> usize {
        self.issues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    /// Issue codes in report order.
    pub fn codes(&self) -> Vec<IssueCode> {
        self.issues.iter().map(Issue::code).collect()
    }

    /// Split issues into root-level messages and messages keyed by the first
    /// path segment.
    pub fn flatten(&self) -> FlattenedErrors {
        let mut flattened = FlattenedErrors::default();
        for issue in &self.issues {
            match issue.path.first() {
                Some(segment) => flattened
                    .field_errors
                    .entry(segment.to_string())
                    .or_default()
                    .push(issue.message.clone()),
                None => flattened.form_errors.push(issue.message.clone()),
            }
        }
        flattened
    }

    /// Nest messages in a tree mirroring the input's shape. Issues of union
    /// members and function signatures are expanded into the tree.
    pub fn format(&self) -> FormattedError {
        let mut root = FormattedError::default();
        insert_formatted(&mut root, &self.issues);
        root
    }
}

fn insert_formatted(root: &mut FormattedError, issues: &[Issue]) {
    for issue in issues {
        match &issue.kind {
            IssueKind::InvalidUnion { union_errors } => {
                for member in union_errors {
                    insert_formatted(root, member);
                }
            }
            IssueKind::InvalidArguments { argument_errors } => {
                insert_formatted(root, argument_errors)
            }
            IssueKind::InvalidReturnType { return_type_errors } => {
                insert_formatted(root, return_type_errors)
            }
            _ => {
                let mut node = &mut *root;
                for segment in &issue.path {
                    node = node.children.entry(segment.to_string()).or_default();
                }
                node.errors.push(issue.message.clone());
            }
        }
    }
}

impl From<Vec<Issue>> for ValidationError {
    fn from(issues: Vec<Issue>) -> Self {
        Self::new(issues)
    }
}

impl Serialize for ValidationError {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry("issues", &self.issues)?;
        map.end()
    }
}

/// Output of [`ValidationError::flatten`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FlattenedErrors {
    pub form_errors: Vec<String>,
    pub field_errors: BTreeMap<String, Vec<String>>,
}

/// Output of [`ValidationError::format`]; serializes with the node's own
/// messages under `_errors` next to its children.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormattedError {
    pub errors: Vec<String>,
    pub children: BTreeMap<String, FormattedError>,
}

impl FormattedError {
    /// Child node for a key or index.
    pub fn get(&self, segment: impl fmt::Display) -> Option<&FormattedError> {
        self.children.get(&segment.to_string())
    }
}

impl Serialize for FormattedError {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.children.len() + 1))?;
        map.serialize_entry("_errors", &self.errors)?;
        for (key, child) in &self.children {
            map.serialize_entry(key, child)?;
        }
        map.end()
    }
}

// =============================================================================
// SchemaError
// =============================================================================

/// Errors raised while building a schema.
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("Invalid pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    #[error("Invalid date bound: {0}")]
    InvalidDateBound(String),
}

/// Result type alias for parse operations.
pub type ParseResult<T> = Result<T, ValidationError>;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn issue(path: Vec<PathSegment>, message: &str) -> Issue {
        Issue::new(IssueKind::Custom { params: None }, path).with_message(message)
    }

    #[test]
    fn test_issue_code_serialization() {
        let json = serde_json::to_string(&IssueCode::InvalidEnumValue).unwrap();
        assert_eq!(json, "\"invalid_enum_value\"");
        let parsed: IssueCode = serde_json::from_str("\"unrecognized_keys\"").unwrap();
        assert_eq!(parsed, IssueCode::UnrecognizedKeys);
    }

    #[test]
    fn test_flatten_splits_root_and_fields() {
        let error = ValidationError::new(vec![
            issue(vec![], "root"),
            issue(vec!["a".into(), 0.into()], "first"),
            issue(vec!["a".into()], "second"),
        ]);
        let flat = error.flatten();
        assert_eq!(flat.form_errors, vec!["root"]);
        assert_eq!(flat.field_errors["a"], vec!["first", "second"]);
    }

    #[test]
    fn test_format_builds_tree() {
        let error = ValidationError::new(vec![issue(vec!["a".into(), 1.into()], "bad")]);
        let tree = error.format();
        assert!(tree.errors.is_empty());
        assert_eq!(tree.get("a").unwrap().get(1).unwrap().errors, vec!["bad"]);
        assert_eq!(
            serde_json::to_value(&tree).unwrap(),
            json!({"_errors": [], "a": {"_errors": [], "1": {"_errors": ["bad"]}}})
        );
    }

    #[test]
    fn test_format_expands_union_members() {
        let union = Issue::new(
            IssueKind::InvalidUnion {
                union_errors: vec![
                    vec![issue(vec!["x".into()], "one")],
                    vec![issue(vec![], "two")],
                ],
            },
            vec![],
        );
        let tree = ValidationError::new(vec![union]).format();
        assert_eq!(tree.errors, vec!["two"]);
        assert_eq!(tree.get("x").unwrap().errors, vec!["one"]);
    }

    #[test]
    fn test_issue_serialization_carries_payload() {
        let issue = Issue::new(
            IssueKind::InvalidType {
                expected: ParsedType::String,
                received: ParsedType::Number,
            },
            vec!["name".into()],
        );
        assert_eq!(
            serde_json::to_value(&issue).unwrap(),
            json!({
                "code": "invalid_type",
                "path": ["name"],
                "message": "Expected string, received number",
                "expected": "string",
                "received": "number",
            })
        );
    }

    #[test]
    fn test_display_summarises() {
        let error = ValidationError::new(vec![issue(vec!["a".into()], "bad")]);
        assert_eq!(error.to_string(), "a: bad");
    }
}
