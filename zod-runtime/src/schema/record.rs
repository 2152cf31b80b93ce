//! Record (string-keyed object) and map schemas.

use std::mem;

use crate::context::{Outcome, ParseContext, Status, drive};
use crate::schema::string::string;
use crate::schema::{Base, Schema};
use crate::value::{Object, ParsedType, Value};

#[derive(Debug, Clone)]
pub(crate) struct RecordDef {
    pub(crate) key: Schema,
    pub(crate) value: Schema,
}

/// Builder for record schemas.
#[derive(Debug, Clone)]
pub struct RecordSchema {
    pub(crate) def: RecordDef,
    pub(crate) base: Base,
}

typed_schema!(RecordSchema, Record);

/// Record with string keys.
pub fn record(value: impl Into<Schema>) -> RecordSchema {
    record_with_key(string(), value)
}

pub fn record_with_key(key: impl Into<Schema>, value: impl Into<Schema>) -> RecordSchema {
    RecordSchema {
        def: RecordDef {
            key: key.into(),
            value: value.into(),
        },
        base: Base::default(),
    }
}

impl RecordSchema {
    pub fn key_schema(&self) -> &Schema {
        &self.def.key
    }

    pub fn value_schema(&self) -> &Schema {
        &self.def.value
    }
}

#[derive(Debug, Clone)]
pub(crate) struct MapDef {
    pub(crate) key: Schema,
    pub(crate) value: Schema,
}

/// Builder for map schemas.
#[derive(Debug, Clone)]
pub struct MapSchema {
    pub(crate) def: MapDef,
    pub(crate) base: Base,
}

typed_schema!(MapSchema, Map);

pub fn map(key: impl Into<Schema>, value: impl Into<Schema>) -> MapSchema {
    MapSchema {
        def: MapDef {
            key: key.into(),
            value: value.into(),
        },
        base: Base::default(),
    }
}

impl MapSchema {
    pub fn key_schema(&self) -> &Schema {
        &self.def.key
    }

    pub fn value_schema(&self) -> &Schema {
        &self.def.value
    }
}

fn both_valid(pair: &(Outcome, Outcome)) -> bool {
    pair.0.is_valid() && pair.1.is_valid()
}

/// Parse a record key. Keys that read as finite numbers are first tried as
/// numbers on a silent fork; the string form is the fallback. A numeric key
/// the schema passes through unchanged keeps its original spelling.
async fn parse_key(schema: &Schema, ctx: ParseContext) -> Outcome {
    if let Value::String(raw) = &ctx.data
        && let Ok(n) = raw.parse::<f64>()
        && n.is_finite()
        && let Outcome::Valid(key) = schema.step(ctx.forked(Value::Number(n))).await
    {
        if key == Value::Number(n) {
            return Outcome::Valid(Value::String(raw.clone()));
        }
        return Outcome::Valid(key);
    }
    schema.step(ctx).await
}

/// Fold `(key, value)` outcomes, returning the entries that produced both.
fn collect_entries(
    results: Vec<(Outcome, Outcome)>,
    expected: usize,
    status: &mut Status,
) -> Vec<(Value, Value)> {
    if results.len() < expected {
        status.mark_aborted();
    }
    results
        .into_iter()
        .filter_map(|(key, value)| {
            let key = status.absorb(key);
            let value = status.absorb(value);
            key.zip(value)
        })
        .collect()
}

pub(crate) async fn parse(def: &RecordDef, mut ctx: ParseContext) -> Outcome {
    let input = match &mut ctx.data {
        Value::Object(map) => mem::take(map),
        _ => return ctx.invalid_type(ParsedType::Object),
    };
    let count = input.len();
    let tasks = input
        .into_iter()
        .map(|(key, value)| {
            let key_ctx = ctx.child(Value::String(key.clone()), key.as_str());
            let value_ctx = ctx.child(value, key);
            async move {
                let key = parse_key(&def.key, key_ctx).await;
                let value = def.value.step(value_ctx).await;
                (key, value)
            }
        })
        .collect();
    let results = drive(ctx.abort_early(), ctx.is_async(), tasks, both_valid).await;

    let mut status = Status::default();
    let output: Object = collect_entries(results, count, &mut status)
        .into_iter()
        .map(|(key, value)| (key.coerce_string(), value))
        .collect();
    status.finish(Value::Object(output))
}

pub(crate) async fn parse_map(def: &MapDef, mut ctx: ParseContext) -> Outcome {
    let entries = match &mut ctx.data {
        Value::Map(entries) => mem::take(entries),
        _ => return ctx.invalid_type(ParsedType::Map),
    };
    let count = entries.len();
    let tasks = entries
        .into_iter()
        .enumerate()
        .map(|(index, (key, value))| {
            let entry = ctx.child(Value::Undefined, index);
            let key_ctx = entry.child(key, "key");
            let value_ctx = entry.child(value, "value");
            async move {
                let key = def.key.step(key_ctx).await;
                let value = def.value.step(value_ctx).await;
                (key, value)
            }
        })
        .collect();
    let results = drive(ctx.abort_early(), ctx.is_async(), tasks, both_valid).await;

    let mut status = Status::default();
    let output = collect_entries(results, count, &mut status);
    status.finish(Value::Map(output))
}
