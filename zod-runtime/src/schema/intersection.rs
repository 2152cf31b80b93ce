//! Intersection schemas: every member must accept the input and their
//! outputs must merge. Failures surface as a single `invalid_intersection`
//! issue.

use std::mem;

use crate::context::{Outcome, ParseContext, run_children};
use crate::error::IssueKind;
use crate::schema::{Kind, Schema};
use crate::value::Value;

#[derive(Debug, Clone)]
pub(crate) struct IntersectionDef {
    pub(crate) members: Vec<Schema>,
}

pub fn intersection<I>(members: I) -> Schema
where
    I: IntoIterator<Item = Schema>,
{
    Schema::from_kind(Kind::Intersection(IntersectionDef {
        members: members.into_iter().collect(),
    }))
}

/// Merge two member outputs.
///
/// Equal values unify, objects merge key by key, and arrays of equal length
/// merge element-wise. Anything else is irreconcilable.
pub fn merge_values(a: Value, b: Value) -> Option<Value> {
    if a == b {
        return Some(a);
    }
    match (a, b) {
        (Value::Object(mut left), Value::Object(right)) => {
            for (key, value) in right {
                match left.get_mut(&key) {
                    Some(existing) => *existing = merge_values(mem::take(existing), value)?,
                    None => {
                        left.insert(key, value);
                    }
                }
            }
            Some(Value::Object(left))
        }
        (Value::Array(left), Value::Array(right)) if left.len() == right.len() => left
            .into_iter()
            .zip(right)
            .map(|(a, b)| merge_values(a, b))
            .collect::<Option<Vec<_>>>()
            .map(Value::Array),
        _ => None,
    }
}

pub(crate) async fn parse(def: &IntersectionDef, mut ctx: ParseContext) -> Outcome {
    let data = ctx.take_data();
    if def.members.is_empty() {
        return Outcome::Valid(data);
    }
    // Members report into forked accumulators; only the merge verdict surfaces.
    let jobs = def
        .members
        .iter()
        .map(|member| (member, ctx.forked(data.clone())))
        .collect();
    let outcomes = run_children(ctx.abort_early(), ctx.is_async(), jobs).await;

    let count = def.members.len();
    let values: Option<Vec<Value>> = outcomes
        .into_iter()
        .map(|outcome| match outcome {
            Outcome::Valid(value) => Some(value),
            _ => None,
        })
        .collect();
    let merged = values
        .filter(|values| values.len() == count)
        .and_then(|values| {
            let mut values = values.into_iter();
            let first = values.next()?;
            values.try_fold(first, merge_values)
        });
    match merged {
        Some(merged) => Outcome::Valid(merged),
        None => {
            ctx.add_issue(IssueKind::InvalidIntersection);
            Outcome::Aborted
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_objects_merge_key_by_key() {
        let a = Value::object([("a", Value::from(1)), ("shared", Value::object([("x", 1)]))]);
        let b = Value::object([("shared", Value::object([("y", 2)])), ("b", Value::from(2))]);
        let merged = merge_values(a, b).unwrap();
        assert_eq!(
            merged.to_json(),
            serde_json::json!({"a": 1, "shared": {"x": 1, "y": 2}, "b": 2})
        );
    }

    #[test]
    fn test_conflicting_primitives_do_not_merge() {
        assert!(merge_values(Value::from(1), Value::from(2)).is_none());
        assert!(merge_values(Value::from("a"), Value::from(1)).is_none());
    }

    #[test]
    fn test_arrays_merge_when_lengths_match() {
        let merged = merge_values(Value::array([1, 2]), Value::array([1, 2])).unwrap();
        assert_eq!(merged, Value::array([1, 2]));
        assert!(merge_values(Value::array([1]), Value::array([1, 2])).is_none());
    }
}
