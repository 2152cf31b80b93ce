//! Preprocessing, refinements, transforms and pipelines.
//!
//! Effects wrap an inner schema. Refinements and transforms only see values
//! the inner schema accepted without issues; dirty or aborted results pass
//! through untouched.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures::future::{BoxFuture, FutureExt};

use crate::context::{Outcome, ParseContext};
use crate::error::{IssueKind, PathSegment};
use crate::schema::{Kind, Schema};
use crate::value::Value;

type PreprocessFn = Arc<dyn Fn(Value) -> Value + Send + Sync>;
type RefinementFn = Arc<dyn Fn(&Value, &mut RefinementCtx) + Send + Sync>;
type AsyncCheckFn = Arc<dyn Fn(Value) -> BoxFuture<'static, bool> + Send + Sync>;
type TransformFn = Arc<dyn Fn(Value, &mut RefinementCtx) -> Value + Send + Sync>;
type AsyncTransformFn = Arc<dyn Fn(Value) -> BoxFuture<'static, Value> + Send + Sync>;

#[derive(Clone)]
pub(crate) enum Effect {
    Preprocess(PreprocessFn),
    Refinement(RefinementFn),
    AsyncRefinement(AsyncCheckFn, RefineMessage),
    Transform(TransformFn),
    AsyncTransform(AsyncTransformFn),
}

impl fmt::Debug for Effect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Preprocess(_) => "Preprocess",
            Self::Refinement(_) => "Refinement",
            Self::AsyncRefinement(..) => "AsyncRefinement",
            Self::Transform(_) => "Transform",
            Self::AsyncTransform(_) => "AsyncTransform",
        })
    }
}

#[derive(Debug, Clone)]
pub(crate) struct EffectsDef {
    pub(crate) inner: Schema,
    pub(crate) effect: Effect,
}

#[derive(Debug, Clone)]
pub(crate) struct PipelineDef {
    pub(crate) input: Schema,
    pub(crate) output: Schema,
}

/// Message, relative path and params of a failed refinement.
#[derive(Debug, Clone, Default)]
pub struct RefineParams {
    pub message: Option<String>,
    pub path: Vec<PathSegment>,
    pub params: Option<serde_json::Value>,
}

impl RefineParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Path appended to the refined value's path.
    pub fn path<I, S>(mut self, path: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<PathSegment>,
    {
        self.path = path.into_iter().map(Into::into).collect();
        self
    }

    pub fn params(mut self, params: serde_json::Value) -> Self {
        self.params = Some(params);
        self
    }
}

/// How a failed [`refine`](crate::ZodType::refine) describes itself.
#[derive(Clone)]
pub enum RefineMessage {
    Text(String),
    Params(RefineParams),
    /// Computed from the rejected value.
    Dynamic(Arc<dyn Fn(&Value) -> RefineParams + Send + Sync>),
}

impl RefineMessage {
    pub fn dynamic<F>(f: F) -> Self
    where
        F: Fn(&Value) -> RefineParams + Send + Sync + 'static,
    {
        Self::Dynamic(Arc::new(f))
    }

    fn resolve(&self, value: &Value) -> RefineParams {
        match self {
            Self::Text(message) => RefineParams::new().message(message.clone()),
            Self::Params(params) => params.clone(),
            Self::Dynamic(f) => f(value),
        }
    }
}

impl Default for RefineMessage {
    fn default() -> Self {
        Self::Params(RefineParams::default())
    }
}

impl fmt::Debug for RefineMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(message) => f.debug_tuple("Text").field(message).finish(),
            Self::Params(params) => f.debug_tuple("Params").field(params).finish(),
            Self::Dynamic(_) => f.write_str("Dynamic"),
        }
    }
}

impl From<&str> for RefineMessage {
    fn from(message: &str) -> Self {
        Self::Text(message.to_string())
    }
}

impl From<String> for RefineMessage {
    fn from(message: String) -> Self {
        Self::Text(message)
    }
}

impl From<RefineParams> for RefineMessage {
    fn from(params: RefineParams) -> Self {
        Self::Params(params)
    }
}

struct PendingIssue {
    kind: IssueKind,
    path: Vec<PathSegment>,
    message: Option<String>,
}

/// Handle given to refinement and transform callbacks for reporting issues.
pub struct RefinementCtx {
    path: Vec<PathSegment>,
    issues: Vec<PendingIssue>,
    aborted: bool,
}

impl RefinementCtx {
    fn new(path: Vec<PathSegment>) -> Self {
        Self {
            path,
            issues: Vec::new(),
            aborted: false,
        }
    }

    /// Path of the value being refined.
    pub fn path(&self) -> &[PathSegment] {
        &self.path
    }

    /// Add a `custom` issue at the value's path.
    pub fn add_issue(&mut self, message: impl Into<String>) {
        self.add_issue_at(Vec::<PathSegment>::new(), message);
    }

    /// Add a `custom` issue at a path relative to the value.
    pub fn add_issue_at<I, S>(&mut self, path: I, message: impl Into<String>)
    where
        I: IntoIterator<Item = S>,
        S: Into<PathSegment>,
    {
        self.push(
            IssueKind::Custom { params: None },
            path.into_iter().map(Into::into).collect(),
            Some(message.into()),
        );
    }

    /// Add an issue of any kind; without a message the error maps decide.
    pub fn add_issue_kind(&mut self, kind: IssueKind, message: Option<String>) {
        self.push(kind, Vec::new(), message);
    }

    /// Stop the parse at this node.
    pub fn abort(&mut self) {
        self.aborted = true;
    }

    pub fn issue_count(&self) -> usize {
        self.issues.len()
    }

    fn push(&mut self, kind: IssueKind, relative: Vec<PathSegment>, message: Option<String>) {
        let mut path = self.path.clone();
        path.extend(relative);
        self.issues.push(PendingIssue {
            kind,
            path,
            message,
        });
    }

    fn reject(&mut self, message: &RefineMessage, value: &Value) {
        let RefineParams {
            message,
            path,
            params,
        } = message.resolve(value);
        self.push(IssueKind::Custom { params }, path, message);
        self.abort();
    }

    /// Move pending issues into the parse and fold them into an outcome.
    fn finish(self, ctx: &ParseContext, value: Value) -> Outcome {
        let dirty = !self.issues.is_empty();
        for issue in self.issues {
            ctx.add_issue_at(issue.kind, issue.path, issue.message);
        }
        if self.aborted {
            Outcome::Aborted
        } else if dirty {
            Outcome::Dirty(value)
        } else {
            Outcome::Valid(value)
        }
    }
}

fn effects(inner: Schema, effect: Effect) -> Schema {
    Schema::from_kind(Kind::Effects(EffectsDef { inner, effect }))
}

/// Run `f` on the raw input before `schema` sees it.
pub fn preprocess<F>(f: F, schema: impl Into<Schema>) -> Schema
where
    F: Fn(Value) -> Value + Send + Sync + 'static,
{
    effects(schema.into(), Effect::Preprocess(Arc::new(f)))
}

pub(crate) fn refine<F>(schema: Schema, check: F, message: RefineMessage) -> Schema
where
    F: Fn(&Value) -> bool + Send + Sync + 'static,
{
    super_refine(schema, move |value, ctx| {
        if !check(value) {
            ctx.reject(&message, value);
        }
    })
}

pub(crate) fn super_refine<F>(schema: Schema, check: F) -> Schema
where
    F: Fn(&Value, &mut RefinementCtx) + Send + Sync + 'static,
{
    effects(schema, Effect::Refinement(Arc::new(check)))
}

pub(crate) fn refine_async<F, Fut>(schema: Schema, check: F, message: RefineMessage) -> Schema
where
    F: Fn(Value) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = bool> + Send + 'static,
{
    let check: AsyncCheckFn = Arc::new(move |value| check(value).boxed());
    effects(schema, Effect::AsyncRefinement(check, message))
}

pub(crate) fn transform<F>(schema: Schema, f: F) -> Schema
where
    F: Fn(Value, &mut RefinementCtx) -> Value + Send + Sync + 'static,
{
    effects(schema, Effect::Transform(Arc::new(f)))
}

pub(crate) fn transform_async<F, Fut>(schema: Schema, f: F) -> Schema
where
    F: Fn(Value) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Value> + Send + 'static,
{
    let f: AsyncTransformFn = Arc::new(move |value| f(value).boxed());
    effects(schema, Effect::AsyncTransform(f))
}

pub(crate) fn pipeline(input: Schema, output: Schema) -> Schema {
    Schema::from_kind(Kind::Pipeline(PipelineDef { input, output }))
}

impl Schema {
    /// The innermost schema below any chain of effects.
    pub fn source_type(&self) -> &Schema {
        let mut schema = self;
        while let Kind::Effects(def) = schema.kind() {
            schema = &def.inner;
        }
        schema
    }
}

fn ensure_async(ctx: &ParseContext, what: &str) {
    if !ctx.is_async() {
        panic!("asynchronous {what} encountered during a synchronous parse; use parse_async");
    }
}

pub(crate) async fn parse(def: &EffectsDef, mut ctx: ParseContext) -> Outcome {
    match &def.effect {
        Effect::Preprocess(f) => {
            let data = f(ctx.take_data());
            def.inner.step(ctx.sibling(data)).await
        }
        Effect::Refinement(check) => {
            let value = match def.inner.step(ctx.detach()).await {
                Outcome::Valid(value) => value,
                other => return other,
            };
            let mut refinement = RefinementCtx::new(ctx.path.clone());
            check(&value, &mut refinement);
            refinement.finish(&ctx, value)
        }
        Effect::AsyncRefinement(check, message) => {
            ensure_async(&ctx, "refinement");
            let value = match def.inner.step(ctx.detach()).await {
                Outcome::Valid(value) => value,
                other => return other,
            };
            if check(value.clone()).await {
                return Outcome::Valid(value);
            }
            let mut refinement = RefinementCtx::new(ctx.path.clone());
            refinement.reject(message, &value);
            refinement.finish(&ctx, value)
        }
        Effect::Transform(f) => {
            let value = match def.inner.step(ctx.detach()).await {
                Outcome::Valid(value) => value,
                other => return other,
            };
            let mut refinement = RefinementCtx::new(ctx.path.clone());
            let value = f(value, &mut refinement);
            refinement.finish(&ctx, value)
        }
        Effect::AsyncTransform(f) => {
            ensure_async(&ctx, "transform");
            match def.inner.step(ctx.detach()).await {
                Outcome::Valid(value) => Outcome::Valid(f(value).await),
                other => other,
            }
        }
    }
}

pub(crate) async fn parse_pipeline(def: &PipelineDef, mut ctx: ParseContext) -> Outcome {
    match def.input.step(ctx.detach()).await {
        Outcome::Valid(value) => def.output.step(ctx.sibling(value)).await,
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::ZodType;
    use crate::schema::string::string;

    #[test]
    fn test_source_type_walks_back_through_effects() {
        let schema = string()
            .min(2)
            .refine(|_| true, "never")
            .transform(|v| v)
            .refine(|_| true, "never");
        assert_eq!(schema.type_tag(), crate::schema::TypeTag::Effects);
        assert_eq!(schema.source_type().type_tag(), crate::schema::TypeTag::String);
    }

    #[test]
    fn test_refine_message_resolution() {
        let value = Value::from(3);
        let params = RefineMessage::from("bad").resolve(&value);
        assert_eq!(params.message.as_deref(), Some("bad"));
        let dynamic = RefineMessage::dynamic(|v| RefineParams::new().message(format!("got {}", v)));
        assert_eq!(dynamic.resolve(&value).message.as_deref(), Some("got 3"));
        assert!(RefineMessage::default().resolve(&value).message.is_none());
    }

    #[test]
    fn test_refinement_ctx_paths_are_relative() {
        let mut ctx = RefinementCtx::new(vec![PathSegment::from("user")]);
        ctx.add_issue_at(["confirm"], "mismatch");
        ctx.add_issue("top");
        assert_eq!(ctx.issue_count(), 2);
        assert_eq!(
            ctx.issues[0].path,
            vec![PathSegment::from("user"), PathSegment::from("confirm")]
        );
        assert_eq!(ctx.issues[1].path, vec![PathSegment::from("user")]);
    }
}
