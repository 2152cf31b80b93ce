//! Object schemas: a shape of named properties plus an unknown-key policy.

use std::mem;

use indexmap::IndexMap;

use crate::context::{Outcome, ParseContext, Status, run_children};
use crate::error::IssueKind;
use crate::schema::array::ArrayDef;
use crate::schema::enums::{EnumSchema, enum_};
use crate::schema::modifiers;
use crate::schema::tuple::TupleDef;
use crate::schema::{Base, Kind, Schema, ZodType};
use crate::value::{Object, ParsedType, Value};

/// What happens to input keys that are not part of the shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnknownKeys {
    /// Drop them from the output.
    #[default]
    Strip,
    /// Copy them to the output unvalidated.
    Passthrough,
    /// Report them in one `unrecognized_keys` issue.
    Strict,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct ObjectDef {
    pub(crate) shape: IndexMap<String, Schema>,
    pub(crate) unknown_keys: UnknownKeys,
    pub(crate) catchall: Option<Schema>,
}

/// Builder for object schemas.
#[derive(Debug, Clone, Default)]
pub struct ObjectSchema {
    pub(crate) def: ObjectDef,
    pub(crate) base: Base,
}

typed_schema!(ObjectSchema, Object);

pub fn object() -> ObjectSchema {
    ObjectSchema::default()
}

impl ObjectSchema {
    /// Add or replace one property.
    pub fn field(mut self, key: impl Into<String>, schema: impl Into<Schema>) -> Self {
        self.def.shape.insert(key.into(), schema.into());
        self
    }

    /// Add or replace several properties.
    pub fn extend<I, K>(mut self, shape: I) -> Self
    where
        I: IntoIterator<Item = (K, Schema)>,
        K: Into<String>,
    {
        self.def
            .shape
            .extend(shape.into_iter().map(|(k, schema)| (k.into(), schema)));
        self
    }

    pub fn shape(&self) -> &IndexMap<String, Schema> {
        &self.def.shape
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.def.shape.keys().map(String::as_str)
    }

    pub fn unknown_keys(&self) -> UnknownKeys {
        self.def.unknown_keys
    }

    /// Keep only `keys`, in shape order.
    pub fn pick(mut self, keys: &[&str]) -> Self {
        self.def.shape.retain(|key, _| keys.contains(&key.as_str()));
        self
    }

    pub fn omit(mut self, keys: &[&str]) -> Self {
        self.def.shape.retain(|key, _| !keys.contains(&key.as_str()));
        self
    }

    /// Combine shapes; `other` wins on shared keys and supplies the
    /// unknown-key policy and catchall.
    pub fn merge(mut self, other: ObjectSchema) -> Self {
        self.def.shape.extend(other.def.shape);
        self.def.unknown_keys = other.def.unknown_keys;
        self.def.catchall = other.def.catchall;
        self
    }

    /// Make every property optional.
    pub fn partial(mut self) -> Self {
        for schema in self.def.shape.values_mut() {
            *schema = optional_once(schema.clone());
        }
        self
    }

    pub fn partial_keys(mut self, keys: &[&str]) -> Self {
        for (key, schema) in self.def.shape.iter_mut() {
            if keys.contains(&key.as_str()) {
                *schema = optional_once(schema.clone());
            }
        }
        self
    }

    /// Make every property required.
    pub fn required(mut self) -> Self {
        for schema in self.def.shape.values_mut() {
            *schema = modifiers::required(schema.clone());
        }
        self
    }

    pub fn required_keys(mut self, keys: &[&str]) -> Self {
        for (key, schema) in self.def.shape.iter_mut() {
            if keys.contains(&key.as_str()) {
                *schema = modifiers::required(schema.clone());
            }
        }
        self
    }

    /// Make every property optional, recursing into nested objects, arrays,
    /// tuples and optional/nullable wrappers.
    pub fn deep_partial(mut self) -> Self {
        for schema in self.def.shape.values_mut() {
            *schema = optional_once(deep_partial(schema));
        }
        self
    }

    /// Enum of the shape's keys.
    pub fn keyof(&self) -> EnumSchema {
        enum_(self.def.shape.keys().cloned())
    }

    /// Reject unknown keys. Clears any catchall.
    pub fn strict(self) -> Self {
        self.policy(UnknownKeys::Strict)
    }

    /// Drop unknown keys. Clears any catchall.
    pub fn strip(self) -> Self {
        self.policy(UnknownKeys::Strip)
    }

    /// Keep unknown keys. Clears any catchall.
    pub fn passthrough(self) -> Self {
        self.policy(UnknownKeys::Passthrough)
    }

    /// Validate unknown keys with `schema`. Resets the policy to strip.
    pub fn catchall(mut self, schema: impl Into<Schema>) -> Self {
        self.def.catchall = Some(schema.into());
        self.def.unknown_keys = UnknownKeys::Strip;
        self
    }

    fn policy(mut self, unknown_keys: UnknownKeys) -> Self {
        self.def.unknown_keys = unknown_keys;
        self.def.catchall = None;
        self
    }
}

fn optional_once(schema: Schema) -> Schema {
    match schema.kind() {
        Kind::Optional(_) => schema,
        _ => schema.optional(),
    }
}

fn deep_partial(schema: &Schema) -> Schema {
    let base = schema.base().clone();
    match schema.kind() {
        Kind::Object(def) => ObjectSchema {
            def: def.clone(),
            base,
        }
        .deep_partial()
        .into(),
        Kind::Array(def) => Schema::new(
            Kind::Array(ArrayDef {
                element: deep_partial(&def.element),
                rules: def.rules.clone(),
            }),
            base,
        ),
        Kind::Tuple(def) => Schema::new(
            Kind::Tuple(TupleDef {
                items: def.items.iter().map(deep_partial).collect(),
                rest: def.rest.clone(),
            }),
            base,
        ),
        Kind::Optional(inner) => Schema::new(Kind::Optional(deep_partial(inner)), base),
        Kind::Nullable(inner) => Schema::new(Kind::Nullable(deep_partial(inner)), base),
        _ => schema.clone(),
    }
}

pub(crate) async fn parse(def: &ObjectDef, mut ctx: ParseContext) -> Outcome {
    let mut input = match &mut ctx.data {
        Value::Object(map) => mem::take(map),
        _ => return ctx.invalid_type(ParsedType::Object),
    };

    let mut keys = Vec::with_capacity(def.shape.len());
    let mut jobs = Vec::with_capacity(def.shape.len());
    for (key, schema) in &def.shape {
        let value = input.shift_remove(key).unwrap_or_default();
        jobs.push((schema, ctx.child(value, key.as_str())));
        keys.push(key.clone());
    }

    let mut passthrough = Object::new();
    let mut unrecognized = Vec::new();
    match &def.catchall {
        Some(catchall) => {
            for (key, value) in input {
                jobs.push((catchall, ctx.child(value, key.as_str())));
                keys.push(key);
            }
        }
        None => match def.unknown_keys {
            UnknownKeys::Strip => {}
            UnknownKeys::Passthrough => passthrough = input,
            UnknownKeys::Strict => unrecognized = input.into_keys().collect(),
        },
    }

    let count = jobs.len();
    let outcomes = run_children(ctx.abort_early(), ctx.is_async(), jobs).await;
    let mut status = Status::default();
    if outcomes.len() < count {
        status.mark_aborted();
    }
    let mut output = Object::with_capacity(count + passthrough.len());
    for (key, outcome) in keys.into_iter().zip(outcomes) {
        if let Some(value) = status.absorb(outcome)
            && !value.is_undefined()
        {
            output.insert(key, value);
        }
    }
    output.extend(passthrough);

    if !unrecognized.is_empty() {
        if ctx.abort_early() && status.is_aborted() {
            return Outcome::Aborted;
        }
        if ctx.report(
            &mut status,
            IssueKind::UnrecognizedKeys { keys: unrecognized },
            None,
        ) {
            return Outcome::Aborted;
        }
    }
    status.finish(Value::Object(output))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::number::number;
    use crate::schema::string::string;

    fn user() -> ObjectSchema {
        object()
            .field("name", string())
            .field("age", number())
            .field("email", string().email())
    }

    #[test]
    fn test_pick_and_omit_keep_shape_order() {
        let picked = user().pick(&["email", "name"]);
        assert_eq!(picked.keys().collect::<Vec<_>>(), vec!["name", "email"]);
        let omitted = user().omit(&["age"]);
        assert_eq!(omitted.keys().collect::<Vec<_>>(), vec!["name", "email"]);
    }

    #[test]
    fn test_policy_and_catchall_are_exclusive() {
        let schema = user().catchall(string());
        assert!(schema.def.catchall.is_some());
        let schema = schema.strict();
        assert!(schema.def.catchall.is_none());
        assert_eq!(schema.unknown_keys(), UnknownKeys::Strict);
        let schema = schema.catchall(number());
        assert_eq!(schema.unknown_keys(), UnknownKeys::Strip);
    }

    #[test]
    fn test_partial_does_not_double_wrap() {
        let schema = user().partial().partial();
        for field in schema.shape().values() {
            assert!(matches!(field.kind(), Kind::Optional(inner) if !matches!(inner.kind(), Kind::Optional(_))));
        }
    }

    #[test]
    fn test_required_strips_optional_chain() {
        let schema = object()
            .field("a", string().optional().nullable().optional())
            .required();
        let field = &schema.shape()["a"];
        assert!(matches!(field.kind(), Kind::Required(inner) if matches!(inner.kind(), Kind::String(_))));
    }

    #[test]
    fn test_deep_partial_reaches_nested_objects() {
        let schema = object()
            .field("profile", object().field("bio", string()))
            .deep_partial();
        let Kind::Optional(profile) = schema.shape()["profile"].kind() else {
            panic!("expected optional profile");
        };
        let Kind::Object(inner) = profile.kind() else {
            panic!("expected object");
        };
        assert!(inner.shape["bio"].is_optional());
    }

    #[test]
    fn test_keyof_lists_keys() {
        let keys = user().keyof();
        assert_eq!(
            keys.values(),
            &[Value::from("name"), Value::from("age"), Value::from("email")]
        );
    }

    #[test]
    fn test_merge_prefers_other() {
        let merged = user().merge(object().field("age", string()).passthrough());
        assert!(matches!(merged.shape()["age"].kind(), Kind::String(_)));
        assert_eq!(merged.unknown_keys(), UnknownKeys::Passthrough);
    }
}
