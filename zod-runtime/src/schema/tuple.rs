//! Fixed-position tuple schemas with an optional rest element.

use std::mem;

use crate::context::{Outcome, ParseContext, Status, run_children};
use crate::error::{IssueKind, TupleBound};
use crate::schema::{Base, Schema};
use crate::value::{ParsedType, Value};

#[derive(Debug, Clone)]
pub(crate) struct TupleDef {
    pub(crate) items: Vec<Schema>,
    pub(crate) rest: Option<Schema>,
}

/// Builder for tuple schemas.
#[derive(Debug, Clone)]
pub struct TupleSchema {
    pub(crate) def: TupleDef,
    pub(crate) base: Base,
}

typed_schema!(TupleSchema, Tuple);

pub fn tuple(items: Vec<Schema>) -> TupleSchema {
    TupleSchema {
        def: TupleDef { items, rest: None },
        base: Base::default(),
    }
}

impl TupleSchema {
    /// Validate indices past the fixed positions with `rest`.
    pub fn rest(mut self, rest: impl Into<Schema>) -> Self {
        self.def.rest = Some(rest.into());
        self
    }

    pub fn items(&self) -> &[Schema] {
        &self.def.items
    }

    pub fn rest_schema(&self) -> Option<&Schema> {
        self.def.rest.as_ref()
    }
}

pub(crate) async fn parse(def: &TupleDef, mut ctx: ParseContext) -> Outcome {
    let items = match &mut ctx.data {
        Value::Array(items) => mem::take(items),
        _ => return ctx.invalid_type(ParsedType::Array),
    };
    let positions = def.items.len();
    if items.len() < positions {
        ctx.add_issue(IssueKind::InvalidTuple {
            bound: TupleBound::Min,
            expected: positions,
            received: items.len(),
        });
        return Outcome::Aborted;
    }
    if def.rest.is_none() && items.len() > positions {
        ctx.add_issue(IssueKind::InvalidTuple {
            bound: TupleBound::Max,
            expected: positions,
            received: items.len(),
        });
        return Outcome::Aborted;
    }

    let count = items.len();
    let jobs = items
        .into_iter()
        .enumerate()
        .filter_map(|(index, item)| {
            def.items
                .get(index)
                .or(def.rest.as_ref())
                .map(|schema| (schema, ctx.child(item, index)))
        })
        .collect();
    let outcomes = run_children(ctx.abort_early(), ctx.is_async(), jobs).await;

    let mut status = Status::default();
    if outcomes.len() < count {
        status.mark_aborted();
    }
    let output = outcomes
        .into_iter()
        .filter_map(|outcome| status.absorb(outcome))
        .collect();
    status.finish(Value::Array(output))
}
