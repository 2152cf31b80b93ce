//! The untyped value domain validated by schemas.
//!
//! [`Value`] models everything a schema can receive or produce: the JSON
//! primitives plus `undefined`, big integers, symbols, dates, sets, maps,
//! promises and functions. Conversions from `serde_json::Value` and a
//! [`Serialize`] implementation make it easy to move data in and out of the
//! engine.
//!
//! # Example
//!
//! ```rust
//! use zod_runtime::{ParsedType, Value};
//!
//! let value: Value = serde_json::json!({"name": "Ada", "tags": ["math"]}).into();
//! assert_eq!(value.parsed_type(), ParsedType::Object);
//! assert_eq!(value.get("name"), Some(&Value::from("Ada")));
//! ```

use std::cmp::Ordering;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use futures::future::{BoxFuture, FutureExt, Shared};
use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Deserialize, Serialize, Serializer};

use crate::error::ValidationError;

/// Insertion-ordered property map used for object values.
pub type Object = IndexMap<String, Value>;

/// An untyped runtime value.
#[derive(Clone, Default)]
pub enum Value {
    /// Absence of a value (a missing key, an omitted argument).
    #[default]
    Undefined,
    /// Explicit null.
    Null,
    /// Boolean.
    Bool(bool),
    /// Double-precision number; may be NaN or infinite.
    Number(f64),
    /// Arbitrary-size integer, bounded here by `i128`.
    BigInt(i128),
    /// UTF-8 string.
    String(String),
    /// Unique symbol, compared by identity.
    Symbol(Symbol),
    /// Concrete instant.
    Date(DateTime<Utc>),
    /// Ordered list.
    Array(Vec<Value>),
    /// Plain object with string keys.
    Object(Object),
    /// Set of unique values in insertion order.
    Set(Vec<Value>),
    /// Map with arbitrary keys in insertion order.
    Map(Vec<(Value, Value)>),
    /// Deferred value.
    Promise(Promise),
    /// Callable value.
    Function(Function),
}

/// Runtime type family of a [`Value`], used in `invalid_type` issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParsedType {
    Undefined,
    Null,
    Boolean,
    Number,
    Nan,
    Bigint,
    String,
    Symbol,
    Date,
    Array,
    Object,
    Set,
    Map,
    Promise,
    Function,
}

impl ParsedType {
    /// Returns the lowercase name of the type family.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Undefined => "undefined",
            Self::Null => "null",
            Self::Boolean => "boolean",
            Self::Number => "number",
            Self::Nan => "nan",
            Self::Bigint => "bigint",
            Self::String => "string",
            Self::Symbol => "symbol",
            Self::Date => "date",
            Self::Array => "array",
            Self::Object => "object",
            Self::Set => "set",
            Self::Map => "map",
            Self::Promise => "promise",
            Self::Function => "function",
        }
    }
}

impl fmt::Display for ParsedType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Symbol / Promise / Function
// =============================================================================

/// A unique symbol. Two symbols are equal only if they are the same symbol.
#[derive(Clone)]
pub struct Symbol(Arc<Option<String>>);

impl Symbol {
    /// Create a new symbol with a description.
    pub fn new(description: impl Into<String>) -> Self {
        Self(Arc::new(Some(description.into())))
    }

    /// Create a new symbol without a description.
    pub fn anonymous() -> Self {
        Self(Arc::new(None))
    }

    /// The description given at creation, if any.
    pub fn description(&self) -> Option<&str> {
        self.0.as_deref()
    }
}

impl PartialEq for Symbol {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Symbol({})", self.description().unwrap_or(""))
    }
}

/// A value that becomes available later.
///
/// Promises are cloneable handles over one shared computation; awaiting any
/// clone yields the same resolved value.
#[derive(Clone)]
pub struct Promise(Shared<BoxFuture<'static, Value>>);

impl Promise {
    /// Wrap a future.
    pub fn new<F>(future: F) -> Self
    where
        F: Future<Output = Value> + Send + 'static,
    {
        Self(future.boxed().shared())
    }

    /// A promise that is already resolved.
    pub fn resolved(value: impl Into<Value>) -> Self {
        Self::new(futures::future::ready(value.into()))
    }

    /// Wait for the value.
    pub async fn resolve(&self) -> Value {
        self.0.clone().await
    }

    fn ptr_eq(&self, other: &Self) -> bool {
        self.0.ptr_eq(&other.0)
    }
}

/// Signature of a callable [`Value::Function`].
pub type NativeFn = dyn Fn(Vec<Value>) -> Result<Value, ValidationError> + Send + Sync;

/// A callable value.
#[derive(Clone)]
pub struct Function(Arc<NativeFn>);

impl Function {
    /// Wrap a closure.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(Vec<Value>) -> Result<Value, ValidationError> + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    /// Call the function.
    pub fn call(&self, args: Vec<Value>) -> Result<Value, ValidationError> {
        (self.0)(args)
    }

    fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

// =============================================================================
// Value API
// =============================================================================

impl Value {
    /// Build an object value from key/value pairs.
    pub fn object<K, V>(entries: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
    {
        Self::Object(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// Build an array value.
    pub fn array<V: Into<Value>>(items: impl IntoIterator<Item = V>) -> Self {
        Self::Array(items.into_iter().map(Into::into).collect())
    }

    /// Build a set value; duplicates are dropped, first occurrence wins.
    pub fn set<V: Into<Value>>(items: impl IntoIterator<Item = V>) -> Self {
        let mut out: Vec<Value> = Vec::new();
        for item in items.into_iter().map(Into::into) {
            if !out.contains(&item) {
                out.push(item);
            }
        }
        Self::Set(out)
    }

    /// Build a map value from entries.
    pub fn map<K, V>(entries: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<Value>,
        V: Into<Value>,
    {
        Self::Map(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// Classify the value.
    pub fn parsed_type(&self) -> ParsedType {
        match self {
            Self::Undefined => ParsedType::Undefined,
            Self::Null => ParsedType::Null,
            Self::Bool(_) => ParsedType::Boolean,
            Self::Number(n) if n.is_nan() => ParsedType::Nan,
            Self::Number(_) => ParsedType::Number,
            Self::BigInt(_) => ParsedType::Bigint,
            Self::String(_) => ParsedType::String,
            Self::Symbol(_) => ParsedType::Symbol,
            Self::Date(_) => ParsedType::Date,
            Self::Array(_) => ParsedType::Array,
            Self::Object(_) => ParsedType::Object,
            Self::Set(_) => ParsedType::Set,
            Self::Map(_) => ParsedType::Map,
            Self::Promise(_) => ParsedType::Promise,
            Self::Function(_) => ParsedType::Function,
        }
    }

    pub fn is_undefined(&self) -> bool {
        matches!(self, Self::Undefined)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Self::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&Object> {
        match self {
            Self::Object(map) => Some(map),
            _ => None,
        }
    }

    /// Look up an object property.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.as_object().and_then(|map| map.get(key))
    }

    /// Order two values of the same comparable family (numbers, big
    /// integers, strings, dates, booleans).
    pub fn compare(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Self::Number(a), Self::Number(b)) => a.partial_cmp(b),
            (Self::BigInt(a), Self::BigInt(b)) => Some(a.cmp(b)),
            (Self::String(a), Self::String(b)) => Some(a.cmp(b)),
            (Self::Date(a), Self::Date(b)) => Some(a.cmp(b)),
            (Self::Bool(a), Self::Bool(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }

    /// Convert to a `serde_json::Value`. `undefined` object entries are
    /// dropped; values without a JSON form become `null`.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }

    /// Deserialize the value into a typed Rust structure.
    pub fn deserialize_into<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_value(self.to_json())
    }

    // -------------------------------------------------------------------------
    // Coercions
    // -------------------------------------------------------------------------

    /// String conversion with JavaScript `String(x)` semantics.
    pub fn coerce_string(&self) -> String {
        match self {
            Self::Undefined => "undefined".to_string(),
            Self::Null => "null".to_string(),
            Self::Bool(b) => b.to_string(),
            Self::Number(n) => format_number(*n),
            Self::BigInt(i) => i.to_string(),
            Self::String(s) => s.clone(),
            Self::Symbol(s) => format!("Symbol({})", s.description().unwrap_or("")),
            Self::Date(d) => format_date(d),
            Self::Array(items) => items
                .iter()
                .map(|item| match item {
                    Self::Undefined | Self::Null => String::new(),
                    other => other.coerce_string(),
                })
                .collect::<Vec<_>>()
                .join(","),
            Self::Object(_) => "[object Object]".to_string(),
            Self::Set(_) => "[object Set]".to_string(),
            Self::Map(_) => "[object Map]".to_string(),
            Self::Promise(_) => "[object Promise]".to_string(),
            Self::Function(_) => "function".to_string(),
        }
    }

    /// Number conversion with JavaScript `Number(x)` semantics.
    pub fn coerce_number(&self) -> f64 {
        match self {
            Self::Null => 0.0,
            Self::Bool(b) => f64::from(u8::from(*b)),
            Self::Number(n) => *n,
            Self::BigInt(i) => *i as f64,
            Self::String(s) => parse_number(s),
            Self::Date(d) => d.timestamp_millis() as f64,
            Self::Array(items) if items.is_empty() => 0.0,
            Self::Array(items) if items.len() == 1 => parse_number(&items[0].coerce_string()),
            _ => f64::NAN,
        }
    }

    /// Big-integer conversion; `None` where JavaScript's `BigInt(x)` throws.
    pub fn coerce_bigint(&self) -> Option<i128> {
        match self {
            Self::BigInt(i) => Some(*i),
            Self::Bool(b) => Some(i128::from(*b)),
            Self::Number(n) if n.is_finite() && n.fract() == 0.0 => Some(*n as i128),
            Self::String(s) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    Some(0)
                } else {
                    trimmed.parse().ok()
                }
            }
            _ => None,
        }
    }

    /// JavaScript truthiness.
    pub fn truthy(&self) -> bool {
        match self {
            Self::Undefined | Self::Null => false,
            Self::Bool(b) => *b,
            Self::Number(n) => *n != 0.0 && !n.is_nan(),
            Self::BigInt(i) => *i != 0,
            Self::String(s) => !s.is_empty(),
            _ => true,
        }
    }

    /// Date conversion: the `"now"` token, ISO strings, epoch milliseconds
    /// or an existing date.
    pub fn coerce_date(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::Date(d) => Some(*d),
            Self::String(s) => parse_date(s),
            Self::Number(n) if n.is_finite() => DateTime::from_timestamp_millis(*n as i64),
            _ => None,
        }
    }
}

/// Parse the textual date forms accepted by date coercion.
pub(crate) fn parse_date(input: &str) -> Option<DateTime<Utc>> {
    let s = input.trim();
    if s.eq_ignore_ascii_case("now") {
        return Some(Utc::now());
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

fn parse_number(s: &str) -> f64 {
    let trimmed = s.trim();
    if let Some(n) = parse_radix_literal(trimmed) {
        return n;
    }
    match trimmed {
        "" => 0.0,
        "Infinity" | "+Infinity" => f64::INFINITY,
        "-Infinity" => f64::NEG_INFINITY,
        _ if trimmed
            .chars()
            .any(|c| c.is_ascii_alphabetic() && c != 'e' && c != 'E') =>
        {
            f64::NAN
        }
        _ => trimmed.parse().unwrap_or(f64::NAN),
    }
}

/// `0x`, `0o` and `0b` literals. Returns `None` when `s` has no such prefix.
fn parse_radix_literal(s: &str) -> Option<f64> {
    let radix = match s.get(..2)? {
        "0x" | "0X" => 16,
        "0o" | "0O" => 8,
        "0b" | "0B" => 2,
        _ => return None,
    };
    let digits = &s[2..];
    if digits.is_empty() {
        return Some(f64::NAN);
    }
    let parsed = digits.chars().try_fold(0.0f64, |acc, c| {
        c.to_digit(radix)
            .map(|d| acc * f64::from(radix) + f64::from(d))
    });
    Some(parsed.unwrap_or(f64::NAN))
}

/// Render a number the way JavaScript prints it.
pub(crate) fn format_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string()
    } else if n == 0.0 {
        "0".to_string()
    } else if (1e-6..1e21).contains(&n.abs()) {
        n.to_string()
    } else {
        let text = format!("{:e}", n);
        match text.split_once('e') {
            Some((mantissa, exponent)) if !exponent.starts_with('-') => {
                format!("{}e+{}", mantissa, exponent)
            }
            _ => text,
        }
    }
}

pub(crate) fn format_date(d: &DateTime<Utc>) -> String {
    d.to_rfc3339_opts(SecondsFormat::Millis, true)
}

// =============================================================================
// Equality / formatting
// =============================================================================

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Undefined, Self::Undefined) | (Self::Null, Self::Null) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Number(a), Self::Number(b)) => a == b,
            (Self::BigInt(a), Self::BigInt(b)) => a == b,
            (Self::String(a), Self::String(b)) => a == b,
            (Self::Symbol(a), Self::Symbol(b)) => a == b,
            (Self::Date(a), Self::Date(b)) => a == b,
            (Self::Array(a), Self::Array(b)) | (Self::Set(a), Self::Set(b)) => a == b,
            (Self::Object(a), Self::Object(b)) => a == b,
            (Self::Map(a), Self::Map(b)) => a == b,
            (Self::Promise(a), Self::Promise(b)) => a.ptr_eq(b),
            (Self::Function(a), Self::Function(b)) => a.ptr_eq(b),
            _ => false,
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Undefined => f.write_str("undefined"),
            Self::Null => f.write_str("null"),
            Self::Bool(b) => write!(f, "{}", b),
            Self::Number(n) => f.write_str(&format_number(*n)),
            Self::BigInt(i) => write!(f, "{}n", i),
            Self::String(s) => write!(f, "{:?}", s),
            Self::Symbol(s) => write!(f, "{:?}", s),
            Self::Date(d) => write!(f, "Date({})", format_date(d)),
            Self::Array(items) => f.debug_list().entries(items).finish(),
            Self::Object(map) => f.debug_map().entries(map.iter()).finish(),
            Self::Set(items) => {
                f.write_str("Set")?;
                f.debug_set().entries(items).finish()
            }
            Self::Map(entries) => {
                f.write_str("Map")?;
                f.debug_map()
                    .entries(entries.iter().map(|(k, v)| (k, v)))
                    .finish()
            }
            Self::Promise(_) => f.write_str("Promise"),
            Self::Function(_) => f.write_str("Function"),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

// =============================================================================
// Serde interop
// =============================================================================

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Undefined | Self::Null => serializer.serialize_unit(),
            Self::Bool(b) => serializer.serialize_bool(*b),
            Self::Number(n) if !n.is_finite() => serializer.serialize_unit(),
            Self::Number(n) if n.fract() == 0.0 && n.abs() < 9_007_199_254_740_992.0 => {
                serializer.serialize_i64(*n as i64)
            }
            Self::Number(n) => serializer.serialize_f64(*n),
            Self::BigInt(i) => match i64::try_from(*i) {
                Ok(small) => serializer.serialize_i64(small),
                Err(_) => serializer.serialize_str(&i.to_string()),
            },
            Self::String(s) => serializer.serialize_str(s),
            Self::Date(d) => serializer.serialize_str(&format_date(d)),
            Self::Array(items) | Self::Set(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Self::Object(map) => {
                let present = map.iter().filter(|(_, v)| !v.is_undefined());
                let mut out = serializer.serialize_map(None)?;
                for (key, value) in present {
                    out.serialize_entry(key, value)?;
                }
                out.end()
            }
            Self::Map(entries) => {
                let mut seq = serializer.serialize_seq(Some(entries.len()))?;
                for (key, value) in entries {
                    seq.serialize_element(&(key, value))?;
                }
                seq.end()
            }
            Self::Symbol(_) | Self::Promise(_) | Self::Function(_) => serializer.serialize_unit(),
        }
    }
}

impl From<serde_json::Value> for Value {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Bool(b) => Self::Bool(b),
            serde_json::Value::Number(n) => Self::Number(n.as_f64().unwrap_or(f64::NAN)),
            serde_json::Value::String(s) => Self::String(s),
            serde_json::Value::Array(items) => {
                Self::Array(items.into_iter().map(Self::from).collect())
            }
            serde_json::Value::Object(map) => {
                Self::Object(map.into_iter().map(|(k, v)| (k, Self::from(v))).collect())
            }
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<f32> for Value {
    fn from(value: f32) -> Self {
        Self::Number(f64::from(value))
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Self::Number(f64::from(value))
    }
}

impl From<u32> for Value {
    fn from(value: u32) -> Self {
        Self::Number(f64::from(value))
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Number(value as f64)
    }
}

impl From<u64> for Value {
    fn from(value: u64) -> Self {
        Self::Number(value as f64)
    }
}

impl From<usize> for Value {
    fn from(value: usize) -> Self {
        Self::Number(value as f64)
    }
}

impl From<i128> for Value {
    fn from(value: i128) -> Self {
        Self::BigInt(value)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(value: DateTime<Utc>) -> Self {
        Self::Date(value)
    }
}

impl From<Vec<Value>> for Value {
    fn from(value: Vec<Value>) -> Self {
        Self::Array(value)
    }
}

impl From<Object> for Value {
    fn from(value: Object) -> Self {
        Self::Object(value)
    }
}

impl From<Symbol> for Value {
    fn from(value: Symbol) -> Self {
        Self::Symbol(value)
    }
}

impl From<Promise> for Value {
    fn from(value: Promise) -> Self {
        Self::Promise(value)
    }
}

impl From<Function> for Value {
    fn from(value: Function) -> Self {
        Self::Function(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parsed_type_distinguishes_nan() {
        assert_eq!(Value::Number(f64::NAN).parsed_type(), ParsedType::Nan);
        assert_eq!(Value::Number(1.5).parsed_type(), ParsedType::Number);
    }

    #[test]
    fn test_json_round_trip_preserves_key_order() {
        let source = json!({"b": 1, "a": [true, null, "x"]});
        let value = Value::from(source.clone());
        assert_eq!(value.to_json(), source);
        let keys: Vec<_> = value.as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys, vec!["b", "a"]);
    }

    #[test]
    fn test_undefined_entries_are_dropped_from_json() {
        let value = Value::object([("a", Value::Undefined), ("b", Value::from(2))]);
        assert_eq!(value.to_json(), json!({"b": 2}));
    }

    #[test]
    fn test_coerce_string_matches_js() {
        assert_eq!(Value::from(12.0).coerce_string(), "12");
        assert_eq!(Value::from(0.5).coerce_string(), "0.5");
        assert_eq!(Value::Null.coerce_string(), "null");
        assert_eq!(Value::array([1, 2]).coerce_string(), "1,2");
    }

    #[test]
    fn test_format_number_uses_exponent_outside_decimal_range() {
        assert_eq!(format_number(1e21), "1e+21");
        assert_eq!(format_number(-1.5e300), "-1.5e+300");
        assert_eq!(format_number(1e20), "100000000000000000000");
        assert_eq!(format_number(0.000001), "0.000001");
        assert_eq!(format_number(1.5e-7), "1.5e-7");
        assert_eq!(format_number(-0.0), "0");
    }

    #[test]
    fn test_coerce_number_matches_js() {
        assert_eq!(Value::from(" 42 ").coerce_number(), 42.0);
        assert_eq!(Value::from("").coerce_number(), 0.0);
        assert!(Value::from("abc").coerce_number().is_nan());
        assert!(Value::from("inf").coerce_number().is_nan());
        assert_eq!(Value::from(true).coerce_number(), 1.0);
        assert!(Value::Undefined.coerce_number().is_nan());
        assert_eq!(Value::from("0x1F").coerce_number(), 31.0);
        assert_eq!(Value::from("0b101").coerce_number(), 5.0);
        assert_eq!(Value::from(" 0o17 ").coerce_number(), 15.0);
        assert!(Value::from("0x").coerce_number().is_nan());
        assert!(Value::from("0x1G").coerce_number().is_nan());
        assert!(Value::from("-0x1F").coerce_number().is_nan());
    }

    #[test]
    fn test_coerce_date_forms() {
        let iso = Value::from("2024-01-02T03:04:05Z").coerce_date().unwrap();
        assert_eq!(format_date(&iso), "2024-01-02T03:04:05.000Z");
        let plain = Value::from("2024-01-02").coerce_date().unwrap();
        assert_eq!(format_date(&plain), "2024-01-02T00:00:00.000Z");
        let epoch = Value::from(0).coerce_date().unwrap();
        assert_eq!(epoch.timestamp_millis(), 0);
        assert!(Value::from("now").coerce_date().is_some());
        assert!(Value::from("not a date").coerce_date().is_none());
    }

    #[test]
    fn test_symbols_compare_by_identity() {
        let a = Symbol::new("id");
        let b = Symbol::new("id");
        assert_eq!(Value::from(a.clone()), Value::from(a));
        assert_ne!(Value::from(b), Value::from(Symbol::new("id")));
    }

    #[test]
    fn test_set_constructor_deduplicates() {
        assert_eq!(
            Value::set([1, 2, 1]),
            Value::Set(vec![Value::from(1), Value::from(2)])
        );
    }

    #[test]
    fn test_deserialize_into_typed() {
        #[derive(serde::Deserialize, PartialEq, Debug)]
        struct Point {
            x: i32,
            y: i32,
        }
        let value = Value::from(json!({"x": 1, "y": 2}));
        let point: Point = value.deserialize_into().unwrap();
        assert_eq!(point, Point { x: 1, y: 2 });
    }
}
