//! Array and set schemas.

use std::cmp::Ordering;
use std::mem;

use crate::context::{Outcome, ParseContext, Status, run_children};
use crate::error::IssueKind;
use crate::schema::rules::{Rule, RuleList};
use crate::schema::{Base, Kind, Schema};
use crate::value::{ParsedType, Value};

/// Element order for [`ArraySchema::sorted`] and [`ArraySchema::sort`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

impl SortOrder {
    fn as_str(&self) -> &'static str {
        match self {
            Self::Ascending => "ascending",
            Self::Descending => "descending",
        }
    }

    fn compare(&self, a: &Value, b: &Value) -> Ordering {
        let ordering = a.compare(b).unwrap_or(Ordering::Equal);
        match self {
            Self::Ascending => ordering,
            Self::Descending => ordering.reverse(),
        }
    }
}

/// An array rule.
#[derive(Debug, Clone, PartialEq)]
pub enum ArrayRule {
    Min(usize),
    Max(usize),
    Length(usize),
    /// Require (or, with `convert`, produce) sorted output.
    Sorted { order: SortOrder, convert: bool },
}

impl ArrayRule {
    fn accepts_len(&self, len: usize) -> bool {
        match self {
            Self::Min(min) => len >= *min,
            Self::Max(max) => len <= *max,
            Self::Length(exact) => len == *exact,
            Self::Sorted { .. } => true,
        }
    }
}

impl Rule for ArrayRule {
    fn kind(&self) -> &'static str {
        match self {
            Self::Min(_) => "min",
            Self::Max(_) => "max",
            Self::Length(_) => "length",
            Self::Sorted { .. } => "sorted",
        }
    }

    fn excludes(&self) -> &'static [&'static str] {
        match self {
            Self::Min(_) | Self::Max(_) => &["length"],
            Self::Length(_) => &["min", "max"],
            Self::Sorted { .. } => &[],
        }
    }

    fn message(&self) -> String {
        match self {
            Self::Min(n) => format!("Array must contain at least {} element(s)", n),
            Self::Max(n) => format!("Array must contain at most {} element(s)", n),
            Self::Length(n) => format!("Array must contain exactly {} element(s)", n),
            Self::Sorted { order, .. } => format!("Array must be sorted in {} order", order.as_str()),
        }
    }
}

/// A set rule.
#[derive(Debug, Clone, PartialEq)]
pub enum SetRule {
    Min(usize),
    Max(usize),
    Size(usize),
}

impl SetRule {
    fn accepts_len(&self, len: usize) -> bool {
        match self {
            Self::Min(min) => len >= *min,
            Self::Max(max) => len <= *max,
            Self::Size(exact) => len == *exact,
        }
    }
}

impl Rule for SetRule {
    fn kind(&self) -> &'static str {
        match self {
            Self::Min(_) => "min",
            Self::Max(_) => "max",
            Self::Size(_) => "size",
        }
    }

    fn excludes(&self) -> &'static [&'static str] {
        match self {
            Self::Min(_) | Self::Max(_) => &["size"],
            Self::Size(_) => &["min", "max"],
        }
    }

    fn message(&self) -> String {
        match self {
            Self::Min(n) => format!("Set must contain at least {} element(s)", n),
            Self::Max(n) => format!("Set must contain at most {} element(s)", n),
            Self::Size(n) => format!("Set must contain exactly {} element(s)", n),
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct ArrayDef {
    pub(crate) element: Schema,
    pub(crate) rules: RuleList<ArrayRule>,
}

/// Builder for array schemas.
#[derive(Debug, Clone)]
pub struct ArraySchema {
    pub(crate) def: ArrayDef,
    pub(crate) base: Base,
}

typed_schema!(ArraySchema, Array);

pub fn array(element: impl Into<Schema>) -> ArraySchema {
    ArraySchema {
        def: ArrayDef {
            element: element.into(),
            rules: RuleList::new(),
        },
        base: Base::default(),
    }
}

impl ArraySchema {
    fn rule(mut self, rule: ArrayRule) -> Self {
        self.def.rules.add(rule);
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.def.rules.set_last_message(message.into());
        self
    }

    pub fn min(self, len: usize) -> Self {
        self.rule(ArrayRule::Min(len))
    }

    pub fn max(self, len: usize) -> Self {
        self.rule(ArrayRule::Max(len))
    }

    pub fn length(self, len: usize) -> Self {
        self.rule(ArrayRule::Length(len))
    }

    pub fn nonempty(self) -> Self {
        self.min(1)
    }

    /// Reject arrays whose elements are out of `order`.
    pub fn sorted(self, order: SortOrder) -> Self {
        self.rule(ArrayRule::Sorted {
            order,
            convert: false,
        })
    }

    /// Sort the output into `order`.
    pub fn sort(self, order: SortOrder) -> Self {
        self.rule(ArrayRule::Sorted {
            order,
            convert: true,
        })
    }

    /// Replace an array element schema by its own element schema.
    /// Non-array elements are left as they are.
    pub fn flatten(mut self) -> Self {
        if let Kind::Array(inner) = self.def.element.kind() {
            self.def.element = inner.element.clone();
        }
        self
    }

    pub fn element(&self) -> &Schema {
        &self.def.element
    }

    pub fn rules(&self) -> impl Iterator<Item = &ArrayRule> {
        self.def.rules.rules()
    }
}

#[derive(Debug, Clone)]
pub(crate) struct SetDef {
    pub(crate) element: Schema,
    pub(crate) rules: RuleList<SetRule>,
}

/// Builder for set schemas.
#[derive(Debug, Clone)]
pub struct SetSchema {
    pub(crate) def: SetDef,
    pub(crate) base: Base,
}

typed_schema!(SetSchema, Set);

pub fn set(element: impl Into<Schema>) -> SetSchema {
    SetSchema {
        def: SetDef {
            element: element.into(),
            rules: RuleList::new(),
        },
        base: Base::default(),
    }
}

impl SetSchema {
    fn rule(mut self, rule: SetRule) -> Self {
        self.def.rules.add(rule);
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.def.rules.set_last_message(message.into());
        self
    }

    pub fn min(self, len: usize) -> Self {
        self.rule(SetRule::Min(len))
    }

    pub fn max(self, len: usize) -> Self {
        self.rule(SetRule::Max(len))
    }

    pub fn size(self, len: usize) -> Self {
        self.rule(SetRule::Size(len))
    }

    pub fn nonempty(self) -> Self {
        self.min(1)
    }

    pub fn element(&self) -> &Schema {
        &self.def.element
    }
}

/// Validate `items` against `element`, returning the surviving outputs.
async fn parse_elements(
    element: &Schema,
    items: Vec<Value>,
    ctx: &ParseContext,
    status: &mut Status,
) -> Vec<Value> {
    let count = items.len();
    let jobs = items
        .into_iter()
        .enumerate()
        .map(|(index, item)| (element, ctx.child(item, index)))
        .collect();
    let outcomes = run_children(ctx.abort_early(), ctx.is_async(), jobs).await;
    if outcomes.len() < count {
        status.mark_aborted();
    }
    outcomes
        .into_iter()
        .filter_map(|outcome| status.absorb(outcome))
        .collect()
}

pub(crate) async fn parse(def: &ArrayDef, mut ctx: ParseContext) -> Outcome {
    let items = match &mut ctx.data {
        Value::Array(items) => mem::take(items),
        _ => return ctx.invalid_type(ParsedType::Array),
    };
    let mut status = Status::default();
    for check in def.rules.iter() {
        if !check.rule.accepts_len(items.len())
            && ctx.report(
                &mut status,
                IssueKind::InvalidArray {
                    rule: check.rule.clone(),
                },
                check.message.as_deref(),
            )
        {
            return Outcome::Aborted;
        }
    }

    let mut output = parse_elements(&def.element, items, &ctx, &mut status).await;
    if status.is_aborted() {
        return Outcome::Aborted;
    }

    for check in def.rules.iter() {
        let ArrayRule::Sorted { order, convert } = check.rule else {
            continue;
        };
        if convert {
            output.sort_by(|a, b| order.compare(a, b));
        } else if output
            .windows(2)
            .any(|pair| order.compare(&pair[0], &pair[1]) == Ordering::Greater)
            && ctx.report(
                &mut status,
                IssueKind::InvalidArray {
                    rule: check.rule.clone(),
                },
                check.message.as_deref(),
            )
        {
            return Outcome::Aborted;
        }
    }
    status.finish(Value::Array(output))
}

pub(crate) async fn parse_set(def: &SetDef, mut ctx: ParseContext) -> Outcome {
    let items = match &mut ctx.data {
        Value::Set(items) => mem::take(items),
        _ => return ctx.invalid_type(ParsedType::Set),
    };
    let mut status = Status::default();
    for check in def.rules.iter() {
        if !check.rule.accepts_len(items.len())
            && ctx.report(
                &mut status,
                IssueKind::InvalidSet {
                    rule: check.rule.clone(),
                },
                check.message.as_deref(),
            )
        {
            return Outcome::Aborted;
        }
    }

    let output = parse_elements(&def.element, items, &ctx, &mut status).await;
    status.finish(Value::set(output))
}
