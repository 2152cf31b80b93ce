//! Enum schemas: a closed, ordered set of allowed values.

use indexmap::IndexMap;

use crate::context::{Outcome, ParseContext};
use crate::error::IssueKind;
use crate::schema::Base;
use crate::value::{ParsedType, Value};

#[derive(Debug, Clone, Default)]
pub(crate) struct EnumDef {
    /// Distinct values in declaration order.
    pub(crate) values: Vec<Value>,
    pub(crate) names: IndexMap<String, Value>,
}

impl EnumDef {
    fn from_entries(entries: impl IntoIterator<Item = (String, Value)>) -> Self {
        let mut def = Self::default();
        for (name, value) in entries {
            if !def.values.contains(&value) {
                def.values.push(value.clone());
            }
            def.names.insert(name, value);
        }
        def
    }
}

/// Builder for enum schemas.
#[derive(Debug, Clone, Default)]
pub struct EnumSchema {
    pub(crate) def: EnumDef,
    pub(crate) base: Base,
}

typed_schema!(EnumSchema, Enum);

/// String enum whose names are its values.
pub fn enum_<I, S>(values: I) -> EnumSchema
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    EnumSchema {
        def: EnumDef::from_entries(values.into_iter().map(|value| {
            let value = value.into();
            (value.clone(), Value::String(value))
        })),
        base: Base::default(),
    }
}

/// Enum with explicit names mapped to string or number values.
pub fn native_enum<I, K, V>(entries: I) -> EnumSchema
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<Value>,
{
    EnumSchema {
        def: EnumDef::from_entries(entries.into_iter().map(|(k, v)| (k.into(), v.into()))),
        base: Base::default(),
    }
}

impl EnumSchema {
    /// Allowed values in declaration order.
    pub fn values(&self) -> &[Value] {
        &self.def.values
    }

    /// Name to value mapping.
    pub fn enum_map(&self) -> &IndexMap<String, Value> {
        &self.def.names
    }

    /// Keep only the given values, in declaration order.
    pub fn extract<I>(&self, values: I) -> EnumSchema
    where
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        let values: Vec<Value> = values.into_iter().map(Into::into).collect();
        self.filtered(|value| values.contains(value))
    }

    /// Drop the given values, keeping the rest in declaration order.
    pub fn exclude<I>(&self, values: I) -> EnumSchema
    where
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        let values: Vec<Value> = values.into_iter().map(Into::into).collect();
        self.filtered(|value| !values.contains(value))
    }

    fn filtered(&self, keep: impl Fn(&Value) -> bool) -> EnumSchema {
        EnumSchema {
            def: EnumDef::from_entries(
                self.def
                    .names
                    .iter()
                    .filter(|(_, value)| keep(value))
                    .map(|(name, value)| (name.clone(), value.clone())),
            ),
            base: self.base.clone(),
        }
    }
}

pub(crate) fn parse(def: &EnumDef, mut ctx: ParseContext) -> Outcome {
    if def.values.contains(&ctx.data) {
        return Outcome::Valid(ctx.take_data());
    }
    let received = ctx.data.parsed_type();
    if !def.values.iter().any(|v| v.parsed_type() == received) {
        let expected = def
            .values
            .first()
            .map_or(ParsedType::String, Value::parsed_type);
        return ctx.invalid_type(expected);
    }
    ctx.add_issue(IssueKind::InvalidEnumValue {
        options: def.values.clone(),
        received: ctx.data.clone(),
    });
    Outcome::Aborted
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_values_are_deduplicated_in_order() {
        let schema = enum_(["b", "a", "b"]);
        assert_eq!(schema.values(), &[Value::from("b"), Value::from("a")]);
    }

    #[test]
    fn test_extract_and_exclude_preserve_order() {
        let schema = enum_(["red", "green", "blue"]);
        let extracted = schema.extract(["blue", "red"]);
        assert_eq!(extracted.values(), &[Value::from("red"), Value::from("blue")]);
        let excluded = schema.exclude(["green"]);
        assert_eq!(excluded.values(), &[Value::from("red"), Value::from("blue")]);
    }

    #[test]
    fn test_native_enum_maps_names() {
        let schema = native_enum([("Up", 1), ("Down", 2)]);
        assert_eq!(schema.enum_map()["Down"], Value::from(2));
        assert_eq!(schema.values().len(), 2);
    }

    #[test]
    fn test_native_enum_subsets_by_value() {
        let schema = native_enum([("Up", 1), ("Down", 2), ("Left", 3)]);
        let vertical = schema.extract([1, 2]);
        assert_eq!(vertical.values(), &[Value::from(1), Value::from(2)]);
        assert_eq!(vertical.enum_map().keys().collect::<Vec<_>>(), ["Up", "Down"]);
        let horizontal = schema.exclude([1, 2]);
        assert_eq!(horizontal.values(), &[Value::from(3)]);
        assert!(schema.extract(["Up"]).values().is_empty());
    }
}
