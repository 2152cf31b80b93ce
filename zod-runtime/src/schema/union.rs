//! Union schemas: the first member that accepts the input wins.

use std::sync::Arc;

use crate::context::{Outcome, ParseContext, run_children};
use crate::error::IssueKind;
use crate::schema::{Kind, Schema};

#[derive(Debug, Clone)]
pub(crate) struct UnionDef {
    pub(crate) options: Vec<Schema>,
}

/// Union of `options`. Nested unions are flattened depth-first.
pub fn union<I>(options: I) -> Schema
where
    I: IntoIterator<Item = Schema>,
{
    let mut flat = Vec::new();
    for option in options {
        flatten_into(option, &mut flat);
    }
    Schema::from_kind(Kind::Union(UnionDef { options: flat }))
}

fn flatten_into(schema: Schema, out: &mut Vec<Schema>) {
    match schema.kind() {
        Kind::Union(def) => {
            for option in &def.options {
                flatten_into(option.clone(), out);
            }
        }
        _ => out.push(schema),
    }
}

pub(crate) async fn parse(def: &UnionDef, ctx: ParseContext) -> Outcome {
    let jobs: Vec<_> = def
        .options
        .iter()
        .map(|option| (option, ctx.forked(ctx.data.clone())))
        .collect();
    let accumulators: Vec<_> = jobs
        .iter()
        .map(|(_, member)| Arc::clone(&member.common))
        .collect();
    // Members never abort each other; every result is collected first.
    let outcomes = run_children(false, ctx.is_async(), jobs).await;

    if let Some(value) = outcomes.into_iter().find_map(|outcome| match outcome {
        Outcome::Valid(value) => Some(value),
        _ => None,
    }) {
        return Outcome::Valid(value);
    }

    let union_errors = accumulators
        .iter()
        .map(|common| common.take_issues())
        .collect();
    ctx.add_issue(IssueKind::InvalidUnion { union_errors });
    Outcome::Aborted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::ZodType;
    use crate::schema::number::number;
    use crate::schema::primitive::{boolean, null};
    use crate::schema::string::string;

    #[test]
    fn test_nested_unions_flatten_depth_first() {
        let schema = string().or(number()).or(boolean().or(null()));
        let Kind::Union(def) = schema.kind() else {
            panic!("expected union");
        };
        let tags: Vec<_> = def.options.iter().map(Schema::type_tag).collect();
        assert_eq!(
            tags,
            vec![
                crate::schema::TypeTag::String,
                crate::schema::TypeTag::Number,
                crate::schema::TypeTag::Boolean,
                crate::schema::TypeTag::Null,
            ]
        );
    }
}
