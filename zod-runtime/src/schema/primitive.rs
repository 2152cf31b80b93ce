//! Boolean, literal and the value-less primitive schemas.

use crate::context::{Outcome, ParseContext};
use crate::error::IssueKind;
use crate::schema::{Base, Kind, Schema};
use crate::value::{ParsedType, Value};

#[derive(Debug, Clone, Default)]
pub(crate) struct BooleanDef {
    pub(crate) coerce: bool,
}

/// Builder for boolean schemas.
#[derive(Debug, Clone, Default)]
pub struct BooleanSchema {
    pub(crate) def: BooleanDef,
    pub(crate) base: Base,
}

typed_schema!(BooleanSchema, Boolean);

pub fn boolean() -> BooleanSchema {
    BooleanSchema::default()
}

impl BooleanSchema {
    /// Convert any input by truthiness before validating.
    pub fn coerce(mut self) -> Self {
        self.def.coerce = true;
        self
    }
}

pub fn symbol() -> Schema {
    Schema::from_kind(Kind::Symbol)
}

pub fn undefined() -> Schema {
    Schema::from_kind(Kind::Undefined)
}

pub fn null() -> Schema {
    Schema::from_kind(Kind::Null)
}

/// Accepts only `undefined`.
pub fn void() -> Schema {
    Schema::from_kind(Kind::Void)
}

pub fn any() -> Schema {
    Schema::from_kind(Kind::Any)
}

pub fn unknown() -> Schema {
    Schema::from_kind(Kind::Unknown)
}

/// Rejects every input with a `forbidden` issue.
pub fn never() -> Schema {
    Schema::from_kind(Kind::Never)
}

/// Accepts only NaN.
pub fn nan() -> Schema {
    Schema::from_kind(Kind::NaN)
}

/// Accepts exactly `value`.
pub fn literal(value: impl Into<Value>) -> Schema {
    Schema::from_kind(Kind::Literal(value.into()))
}

pub(crate) fn parse_boolean(def: &BooleanDef, mut ctx: ParseContext) -> Outcome {
    if def.coerce {
        ctx.data = Value::Bool(ctx.data.truthy());
    }
    match ctx.data {
        Value::Bool(b) => Outcome::Valid(Value::Bool(b)),
        _ => ctx.invalid_type(ParsedType::Boolean),
    }
}

/// Accept the data if it belongs to `expected`.
pub(crate) fn expect(mut ctx: ParseContext, expected: ParsedType) -> Outcome {
    if ctx.data.parsed_type() == expected {
        Outcome::Valid(ctx.take_data())
    } else {
        ctx.invalid_type(expected)
    }
}

pub(crate) fn forbidden(ctx: ParseContext) -> Outcome {
    ctx.add_issue(IssueKind::Forbidden);
    Outcome::Aborted
}

pub(crate) fn parse_nan(ctx: ParseContext) -> Outcome {
    match ctx.data {
        Value::Number(n) if n.is_nan() => Outcome::Valid(Value::Number(n)),
        _ => ctx.invalid_type(ParsedType::Nan),
    }
}

pub(crate) fn parse_literal(expected: &Value, mut ctx: ParseContext) -> Outcome {
    if ctx.data == *expected {
        return Outcome::Valid(ctx.take_data());
    }
    ctx.add_issue(IssueKind::InvalidLiteral {
        expected: expected.clone(),
        received: ctx.data.clone(),
    });
    Outcome::Aborted
}
