//! Schema nodes and the public parse API.
//!
//! Every schema is an immutable [`Schema`] (an `Arc`-shared node) or one of
//! the typed builders that convert into it. Builders consume `self` and
//! return a new value; a node is never mutated once shared.
//!
//! Parsing runs one engine of boxed futures for both modes. Synchronous
//! parses drive the root future with `now_or_never`; asynchronous parses
//! await it and evaluate sibling children concurrently.
//!
//! # Example
//! ```rust
//! use zod_runtime::prelude::*;
//!
//! let user = z::object()
//!     .field("name", z::string().trim().min(1))
//!     .field("age", z::number().int().nonnegative().optional());
//!
//! let parsed = user.parse(serde_json::json!({"name": "  Ada ", "extra": 1})).unwrap();
//! assert_eq!(parsed.to_json(), serde_json::json!({"name": "Ada"}));
//! ```

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures::future::{BoxFuture, FutureExt};
use serde::Serialize;
use tracing::debug;

use crate::config::{ParseOptions, SchemaOptions};
use crate::context::{Common, Outcome, ParseContext, ParseMode};
use crate::error::{ErrorMapContext, IssueKind, ValidationError, display_path};
use crate::metadata::{SchemaDescriptor, SchemaMetadata};
use crate::value::{ParsedType, Value};

/// Implements `From<Builder> for Schema` and `ZodType` for a typed builder
/// holding `def` and `base` fields.
macro_rules! typed_schema {
    ($builder:ident, $variant:ident) => {
        impl From<$builder> for $crate::schema::Schema {
            fn from(builder: $builder) -> Self {
                $crate::schema::Schema::new($crate::schema::Kind::$variant(builder.def), builder.base)
            }
        }

        impl $crate::schema::ZodType for $builder {
            fn base(&self) -> &$crate::schema::Base {
                &self.base
            }

            fn base_mut(&mut self) -> &mut $crate::schema::Base {
                &mut self.base
            }
        }
    };
}

pub mod array;
pub mod date;
pub mod effects;
pub mod enums;
pub mod function;
pub mod intersection;
pub mod modifiers;
pub mod number;
pub mod object;
pub mod primitive;
pub mod record;
pub mod rules;
pub mod string;
pub mod tuple;
pub mod union;

use array::{ArrayDef, ArraySchema, SetDef};
use date::DateDef;
use effects::{EffectsDef, PipelineDef, RefineMessage, RefinementCtx};
use enums::EnumDef;
use function::FunctionDef;
use intersection::IntersectionDef;
use modifiers::{BrandedDef, CatchContext, CatchDef, DefaultDef, LazyDef};
use number::{BigIntDef, NumberDef};
use object::ObjectDef;
use primitive::BooleanDef;
use record::{MapDef, RecordDef};
use string::StringDef;
use tuple::TupleDef;
use union::UnionDef;

/// Discriminant of a schema node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeTag {
    String,
    Number,
    BigInt,
    Boolean,
    Date,
    Symbol,
    Undefined,
    Null,
    Void,
    Any,
    Unknown,
    Never,
    NaN,
    Literal,
    Enum,
    Array,
    Set,
    Tuple,
    Object,
    Record,
    Map,
    Union,
    Intersection,
    Function,
    Lazy,
    Promise,
    Optional,
    Nullable,
    Required,
    Default,
    Catch,
    Branded,
    Readonly,
    Effects,
    Pipeline,
}

impl TypeTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::BigInt => "bigint",
            Self::Boolean => "boolean",
            Self::Date => "date",
            Self::Symbol => "symbol",
            Self::Undefined => "undefined",
            Self::Null => "null",
            Self::Void => "void",
            Self::Any => "any",
            Self::Unknown => "unknown",
            Self::Never => "never",
            Self::NaN => "nan",
            Self::Literal => "literal",
            Self::Enum => "enum",
            Self::Array => "array",
            Self::Set => "set",
            Self::Tuple => "tuple",
            Self::Object => "object",
            Self::Record => "record",
            Self::Map => "map",
            Self::Union => "union",
            Self::Intersection => "intersection",
            Self::Function => "function",
            Self::Lazy => "lazy",
            Self::Promise => "promise",
            Self::Optional => "optional",
            Self::Nullable => "nullable",
            Self::Required => "required",
            Self::Default => "default",
            Self::Catch => "catch",
            Self::Branded => "branded",
            Self::Readonly => "readonly",
            Self::Effects => "effects",
            Self::Pipeline => "pipeline",
        }
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Variant payloads.
#[derive(Clone)]
pub(crate) enum Kind {
    String(StringDef),
    Number(NumberDef),
    BigInt(BigIntDef),
    Boolean(BooleanDef),
    Date(DateDef),
    Symbol,
    Undefined,
    Null,
    Void,
    Any,
    Unknown,
    Never,
    NaN,
    Literal(Value),
    Enum(EnumDef),
    Array(ArrayDef),
    Set(SetDef),
    Tuple(TupleDef),
    Object(ObjectDef),
    Record(RecordDef),
    Map(MapDef),
    Union(UnionDef),
    Intersection(IntersectionDef),
    Function(FunctionDef),
    Lazy(LazyDef),
    Promise(Schema),
    Optional(Schema),
    Nullable(Schema),
    Required(Schema),
    Default(DefaultDef),
    Catch(CatchDef),
    Branded(BrandedDef),
    Readonly(Schema),
    Effects(EffectsDef),
    Pipeline(PipelineDef),
}

/// Options and documentation shared by every node.
#[derive(Debug, Clone, Default)]
pub struct Base {
    pub(crate) options: SchemaOptions,
    pub(crate) metadata: SchemaMetadata,
}

#[derive(Clone)]
pub(crate) struct Node {
    kind: Kind,
    base: Base,
}

/// A frozen schema node.
#[derive(Clone)]
pub struct Schema {
    node: Arc<Node>,
}

impl Schema {
    pub(crate) fn new(kind: Kind, base: Base) -> Self {
        Self {
            node: Arc::new(Node { kind, base }),
        }
    }

    pub(crate) fn from_kind(kind: Kind) -> Self {
        Self::new(kind, Base::default())
    }

    pub(crate) fn kind(&self) -> &Kind {
        &self.node.kind
    }

    pub fn type_tag(&self) -> TypeTag {
        match self.kind() {
            Kind::String(_) => TypeTag::String,
            Kind::Number(_) => TypeTag::Number,
            Kind::BigInt(_) => TypeTag::BigInt,
            Kind::Boolean(_) => TypeTag::Boolean,
            Kind::Date(_) => TypeTag::Date,
            Kind::Symbol => TypeTag::Symbol,
            Kind::Undefined => TypeTag::Undefined,
            Kind::Null => TypeTag::Null,
            Kind::Void => TypeTag::Void,
            Kind::Any => TypeTag::Any,
            Kind::Unknown => TypeTag::Unknown,
            Kind::Never => TypeTag::Never,
            Kind::NaN => TypeTag::NaN,
            Kind::Literal(_) => TypeTag::Literal,
            Kind::Enum(_) => TypeTag::Enum,
            Kind::Array(_) => TypeTag::Array,
            Kind::Set(_) => TypeTag::Set,
            Kind::Tuple(_) => TypeTag::Tuple,
            Kind::Object(_) => TypeTag::Object,
            Kind::Record(_) => TypeTag::Record,
            Kind::Map(_) => TypeTag::Map,
            Kind::Union(_) => TypeTag::Union,
            Kind::Intersection(_) => TypeTag::Intersection,
            Kind::Function(_) => TypeTag::Function,
            Kind::Lazy(_) => TypeTag::Lazy,
            Kind::Promise(_) => TypeTag::Promise,
            Kind::Optional(_) => TypeTag::Optional,
            Kind::Nullable(_) => TypeTag::Nullable,
            Kind::Required(_) => TypeTag::Required,
            Kind::Default(_) => TypeTag::Default,
            Kind::Catch(_) => TypeTag::Catch,
            Kind::Branded(_) => TypeTag::Branded,
            Kind::Readonly(_) => TypeTag::Readonly,
            Kind::Effects(_) => TypeTag::Effects,
            Kind::Pipeline(_) => TypeTag::Pipeline,
        }
    }

    /// Whether `undefined` is accepted, judged from the node structure.
    /// Lazy nodes are not resolved and report `false`.
    pub fn is_optional(&self) -> bool {
        match self.kind() {
            Kind::Optional(_)
            | Kind::Default(_)
            | Kind::Catch(_)
            | Kind::Any
            | Kind::Unknown
            | Kind::Undefined
            | Kind::Void => true,
            Kind::Union(def) => def.options.iter().any(Schema::is_optional),
            Kind::Pipeline(def) => def.input.is_optional(),
            _ => self.unwrap().is_some_and(Schema::is_optional),
        }
    }

    /// Whether `null` is accepted, judged from the node structure.
    pub fn is_nullable(&self) -> bool {
        match self.kind() {
            Kind::Nullable(_) | Kind::Catch(_) | Kind::Any | Kind::Unknown | Kind::Null => true,
            Kind::Union(def) => def.options.iter().any(Schema::is_nullable),
            Kind::Pipeline(def) => def.input.is_nullable(),
            Kind::Required(_) => false,
            _ => self.unwrap().is_some_and(Schema::is_nullable),
        }
    }

    /// Peel one wrapper (optional, nullable, required, default, catch,
    /// branded, readonly, promise, effects).
    pub fn unwrap(&self) -> Option<&Schema> {
        match self.kind() {
            Kind::Optional(inner)
            | Kind::Nullable(inner)
            | Kind::Required(inner)
            | Kind::Readonly(inner)
            | Kind::Promise(inner) => Some(inner),
            Kind::Default(def) => Some(&def.inner),
            Kind::Catch(def) => Some(&def.inner),
            Kind::Branded(def) => Some(&def.inner),
            Kind::Effects(def) => Some(&def.inner),
            _ => None,
        }
    }

    /// Direct child schemas in declaration order. Object children are the
    /// shape values followed by the catchall. Lazy nodes report none.
    pub fn children(&self) -> Vec<Schema> {
        match self.kind() {
            Kind::Array(def) => vec![def.element.clone()],
            Kind::Set(def) => vec![def.element.clone()],
            Kind::Tuple(def) => def.items.iter().chain(def.rest.as_ref()).cloned().collect(),
            Kind::Object(def) => def
                .shape
                .values()
                .chain(def.catchall.as_ref())
                .cloned()
                .collect(),
            Kind::Record(def) => vec![def.key.clone(), def.value.clone()],
            Kind::Map(def) => vec![def.key.clone(), def.value.clone()],
            Kind::Union(def) => def.options.clone(),
            Kind::Intersection(def) => def.members.clone(),
            Kind::Function(def) => vec![def.args.clone(), def.returns.clone()],
            Kind::Pipeline(def) => vec![def.input.clone(), def.output.clone()],
            _ => self.unwrap().cloned().into_iter().collect(),
        }
    }

    pub fn metadata(&self) -> &SchemaMetadata {
        &self.node.base.metadata
    }

    pub fn description(&self) -> Option<&str> {
        self.metadata().description.as_deref()
    }

    /// Serializable snapshot of this schema tree.
    pub fn descriptor(&self) -> SchemaDescriptor {
        let keys = match self.kind() {
            Kind::Object(def) => def.shape.keys().cloned().collect(),
            _ => Vec::new(),
        };
        SchemaDescriptor {
            type_tag: self.type_tag(),
            optional: self.is_optional(),
            nullable: self.is_nullable(),
            metadata: self.metadata().clone(),
            keys,
            children: self.children().iter().map(Schema::descriptor).collect(),
        }
    }

    // -------------------------------------------------------------------------
    // Engine
    // -------------------------------------------------------------------------

    /// Validate the context's data against this node.
    pub(crate) fn step<'a>(&'a self, mut ctx: ParseContext) -> BoxFuture<'a, Outcome> {
        ctx.enter(&self.node.base.options);
        if ctx.debug() {
            debug!(
                path = %display_path(&ctx.path),
                schema = %self.type_tag(),
                received = %ctx.data.parsed_type(),
                "validating"
            );
        }
        match self.kind() {
            Kind::String(def) => resolved(string::parse(def, ctx)),
            Kind::Number(def) => resolved(number::parse(def, ctx)),
            Kind::BigInt(def) => resolved(number::parse_bigint(def, ctx)),
            Kind::Boolean(def) => resolved(primitive::parse_boolean(def, ctx)),
            Kind::Date(def) => resolved(date::parse(def, ctx)),
            Kind::Symbol => resolved(primitive::expect(ctx, ParsedType::Symbol)),
            Kind::Undefined | Kind::Void => resolved(primitive::expect(ctx, ParsedType::Undefined)),
            Kind::Null => resolved(primitive::expect(ctx, ParsedType::Null)),
            Kind::Any | Kind::Unknown => resolved(Outcome::Valid(ctx.take_data())),
            Kind::Never => resolved(primitive::forbidden(ctx)),
            Kind::NaN => resolved(primitive::parse_nan(ctx)),
            Kind::Literal(expected) => resolved(primitive::parse_literal(expected, ctx)),
            Kind::Enum(def) => resolved(enums::parse(def, ctx)),
            Kind::Array(def) => array::parse(def, ctx).boxed(),
            Kind::Set(def) => array::parse_set(def, ctx).boxed(),
            Kind::Tuple(def) => tuple::parse(def, ctx).boxed(),
            Kind::Object(def) => object::parse(def, ctx).boxed(),
            Kind::Record(def) => record::parse(def, ctx).boxed(),
            Kind::Map(def) => record::parse_map(def, ctx).boxed(),
            Kind::Union(def) => union::parse(def, ctx).boxed(),
            Kind::Intersection(def) => intersection::parse(def, ctx).boxed(),
            Kind::Function(def) => resolved(function::parse(def, ctx)),
            Kind::Lazy(def) => modifiers::parse_lazy(def, ctx),
            Kind::Promise(inner) => modifiers::parse_promise(inner, ctx).boxed(),
            Kind::Optional(inner) => modifiers::parse_optional(inner, ctx),
            Kind::Nullable(inner) => modifiers::parse_nullable(inner, ctx),
            Kind::Required(inner) => modifiers::parse_required(inner, ctx),
            Kind::Default(def) => modifiers::parse_default(def, ctx),
            Kind::Catch(def) => modifiers::parse_catch(def, ctx).boxed(),
            Kind::Branded(def) => def.inner.step(ctx),
            Kind::Readonly(inner) => inner.step(ctx),
            Kind::Effects(def) => effects::parse(def, ctx).boxed(),
            Kind::Pipeline(def) => effects::parse_pipeline(def, ctx).boxed(),
        }
    }

    /// Synchronous entry point.
    ///
    /// # Panics
    ///
    /// Panics if the tree contains an asynchronous effect or receives a
    /// promise value.
    pub(crate) fn run_sync(&self, data: Value, options: &ParseOptions) -> SafeParseResult {
        let common = Common::new(options, ParseMode::Sync);
        let ctx = ParseContext::root(data, Arc::clone(&common));
        match self.step(ctx).now_or_never() {
            Some(outcome) => self.finish(outcome, &common),
            None => panic!(
                "synchronous parse of a {} schema suspended on an asynchronous step; use parse_async",
                self.type_tag()
            ),
        }
    }

    pub(crate) async fn run_async(&self, data: Value, options: &ParseOptions) -> SafeParseResult {
        let common = Common::new(options, ParseMode::Async);
        let ctx = ParseContext::root(data, Arc::clone(&common));
        let outcome = self.step(ctx).await;
        self.finish(outcome, &common)
    }

    fn finish(&self, outcome: Outcome, common: &Common) -> SafeParseResult {
        let issues = common.take_issues();
        debug!(
            schema = %self.type_tag(),
            mode = ?common.mode,
            issues = issues.len(),
            "parse finished"
        );
        match outcome {
            Outcome::Valid(value) if issues.is_empty() => SafeParseResult::Success(value),
            _ if issues.is_empty() => SafeParseResult::Failure(ValidationError::custom("Invalid input")),
            _ => SafeParseResult::Failure(ValidationError::new(issues)),
        }
    }
}

pub(crate) fn resolved<'a>(outcome: Outcome) -> BoxFuture<'a, Outcome> {
    futures::future::ready(outcome).boxed()
}

impl fmt::Debug for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Schema")
            .field("type", &self.type_tag())
            .field("description", &self.description())
            .finish()
    }
}

impl ZodType for Schema {
    fn base(&self) -> &Base {
        &self.node.base
    }

    fn base_mut(&mut self) -> &mut Base {
        &mut Arc::make_mut(&mut self.node).base
    }
}

// =============================================================================
// Parse result
// =============================================================================

/// Result of a non-throwing parse.
#[derive(Debug, Clone)]
pub enum SafeParseResult {
    Success(Value),
    Failure(ValidationError),
}

impl SafeParseResult {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    pub fn is_failure(&self) -> bool {
        !self.is_success()
    }

    pub fn data(&self) -> Option<&Value> {
        match self {
            Self::Success(value) => Some(value),
            Self::Failure(_) => None,
        }
    }

    pub fn error(&self) -> Option<&ValidationError> {
        match self {
            Self::Success(_) => None,
            Self::Failure(error) => Some(error),
        }
    }

    pub fn into_result(self) -> Result<Value, ValidationError> {
        self.into()
    }
}

impl From<SafeParseResult> for Result<Value, ValidationError> {
    fn from(result: SafeParseResult) -> Self {
        match result {
            SafeParseResult::Success(value) => Ok(value),
            SafeParseResult::Failure(error) => Err(error),
        }
    }
}

// =============================================================================
// ZodType
// =============================================================================

fn update_metadata<T: ZodType>(
    mut schema: T,
    update: impl FnOnce(SchemaMetadata) -> SchemaMetadata,
) -> T {
    let metadata = &mut schema.base_mut().metadata;
    *metadata = update(std::mem::take(metadata));
    schema
}

/// Behaviour shared by [`Schema`] and every typed builder: metadata, wrapper
/// combinators and the parse API.
///
/// Parse methods convert the receiver into a [`Schema`] first; convert long
/// lived builders once with [`into_schema`](ZodType::into_schema) to avoid
/// repeated clones.
pub trait ZodType: Clone + Into<Schema> {
    fn base(&self) -> &Base;

    fn base_mut(&mut self) -> &mut Base;

    fn into_schema(self) -> Schema {
        self.into()
    }

    // -------------------------------------------------------------------------
    // Metadata and options
    // -------------------------------------------------------------------------

    /// Replace this node's documentation metadata.
    fn meta(mut self, metadata: SchemaMetadata) -> Self {
        self.base_mut().metadata = metadata;
        self
    }

    fn describe(self, description: impl Into<String>) -> Self {
        update_metadata(self, |m| m.with_description(description))
    }

    fn deprecated(self, message: impl Into<String>) -> Self {
        update_metadata(self, |m| m.with_deprecation_message(message))
    }

    fn example(self, example: impl Into<Value>) -> Self {
        let example = example.into().to_json();
        update_metadata(self, |m| m.with_example(example))
    }

    fn tag(self, tag: impl Into<String>) -> Self {
        update_metadata(self, |m| m.with_tag(tag))
    }

    /// Override abort-early for this node and, unless they override it
    /// again, its descendants.
    fn abort_early(mut self, abort_early: bool) -> Self {
        self.base_mut().options.abort_early = Some(abort_early);
        self
    }

    /// Message hook consulted for issues raised directly by this node.
    fn error_map<F>(mut self, map: F) -> Self
    where
        F: Fn(&IssueKind, &ErrorMapContext<'_>) -> Option<String> + Send + Sync + 'static,
    {
        self.base_mut().options.error_map = Some(Arc::new(map));
        self
    }

    /// Emit a `tracing` debug event for each step at or below this node.
    fn debug(mut self, debug: bool) -> Self {
        self.base_mut().options.debug = debug;
        self
    }

    fn type_tag(&self) -> TypeTag {
        self.clone().into_schema().type_tag()
    }

    fn is_optional(&self) -> bool {
        self.clone().into_schema().is_optional()
    }

    fn is_nullable(&self) -> bool {
        self.clone().into_schema().is_nullable()
    }

    fn metadata(&self) -> &SchemaMetadata {
        &self.base().metadata
    }

    // -------------------------------------------------------------------------
    // Parse API
    // -------------------------------------------------------------------------

    fn parse(&self, data: impl Into<Value>) -> Result<Value, ValidationError> {
        self.safe_parse(data).into_result()
    }

    fn parse_with(
        &self,
        data: impl Into<Value>,
        options: &ParseOptions,
    ) -> Result<Value, ValidationError> {
        self.safe_parse_with(data, options).into_result()
    }

    fn safe_parse(&self, data: impl Into<Value>) -> SafeParseResult {
        self.safe_parse_with(data, &ParseOptions::default())
    }

    /// # Panics
    ///
    /// Panics if the schema contains an asynchronous refinement or transform,
    /// or if a promise schema receives a promise value.
    fn safe_parse_with(&self, data: impl Into<Value>, options: &ParseOptions) -> SafeParseResult {
        self.clone().into_schema().run_sync(data.into(), options)
    }

    fn parse_async(
        &self,
        data: impl Into<Value>,
    ) -> BoxFuture<'static, Result<Value, ValidationError>> {
        self.parse_async_with(data, &ParseOptions::default())
    }

    fn parse_async_with(
        &self,
        data: impl Into<Value>,
        options: &ParseOptions,
    ) -> BoxFuture<'static, Result<Value, ValidationError>> {
        self.safe_parse_async_with(data, options)
            .map(SafeParseResult::into_result)
            .boxed()
    }

    fn safe_parse_async(&self, data: impl Into<Value>) -> BoxFuture<'static, SafeParseResult> {
        self.safe_parse_async_with(data, &ParseOptions::default())
    }

    fn safe_parse_async_with(
        &self,
        data: impl Into<Value>,
        options: &ParseOptions,
    ) -> BoxFuture<'static, SafeParseResult> {
        let schema = self.clone().into_schema();
        let options = options.clone();
        let data = data.into();
        async move { schema.run_async(data, &options).await }.boxed()
    }

    fn is(&self, data: impl Into<Value>) -> bool {
        self.safe_parse(data).is_success()
    }

    /// Type-guard form of [`is`](ZodType::is).
    fn guard(&self, data: &Value) -> bool {
        self.is(data.clone())
    }

    // -------------------------------------------------------------------------
    // Wrappers
    // -------------------------------------------------------------------------

    fn optional(self) -> Schema {
        Schema::from_kind(Kind::Optional(self.into()))
    }

    fn nullable(self) -> Schema {
        Schema::from_kind(Kind::Nullable(self.into()))
    }

    /// Optional of nullable.
    fn nullish(self) -> Schema {
        self.nullable().optional()
    }

    /// Strip optional/nullable wrappers and reject `undefined`.
    fn required(self) -> Schema {
        modifiers::required(self.into())
    }

    /// Substitute `value` for `undefined`, then validate.
    fn default_value(self, value: impl Into<Value>) -> Schema {
        modifiers::default_value(self.into(), value.into())
    }

    /// Like [`default_value`](ZodType::default_value) with a factory
    /// evaluated on each use.
    fn default_with<F>(self, factory: F) -> Schema
    where
        F: Fn() -> Value + Send + Sync + 'static,
    {
        modifiers::default_with(self.into(), factory)
    }

    /// Output `value` whenever validation fails.
    fn catch_value(self, value: impl Into<Value>) -> Schema {
        modifiers::catch_value(self.into(), value.into())
    }

    fn catch_with<F>(self, factory: F) -> Schema
    where
        F: Fn(&CatchContext) -> Value + Send + Sync + 'static,
    {
        modifiers::catch_with(self.into(), factory)
    }

    fn brand(self, brand: impl Into<String>) -> Schema {
        modifiers::brand(self.into(), brand.into())
    }

    fn readonly(self) -> Schema {
        Schema::from_kind(Kind::Readonly(self.into()))
    }

    fn promise(self) -> Schema {
        Schema::from_kind(Kind::Promise(self.into()))
    }

    fn array(self) -> ArraySchema {
        array::array(self)
    }

    fn or(self, other: impl Into<Schema>) -> Schema {
        union::union([self.into(), other.into()])
    }

    fn and(self, other: impl Into<Schema>) -> Schema {
        intersection::intersection([self.into(), other.into()])
    }

    // -------------------------------------------------------------------------
    // Effects
    // -------------------------------------------------------------------------

    /// Run `check` on the validated value; `false` records a `custom` issue
    /// and aborts.
    fn refine<F>(self, check: F, message: impl Into<RefineMessage>) -> Schema
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        effects::refine(self.into(), check, message.into())
    }

    /// Run `check` with a [`RefinementCtx`] that may add any number of issues.
    fn super_refine<F>(self, check: F) -> Schema
    where
        F: Fn(&Value, &mut RefinementCtx) + Send + Sync + 'static,
    {
        effects::super_refine(self.into(), check)
    }

    /// Asynchronous [`refine`](ZodType::refine); requires `parse_async`.
    fn refine_async<F, Fut>(self, check: F, message: impl Into<RefineMessage>) -> Schema
    where
        F: Fn(Value) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = bool> + Send + 'static,
    {
        effects::refine_async(self.into(), check, message.into())
    }

    fn transform<F>(self, f: F) -> Schema
    where
        F: Fn(Value) -> Value + Send + Sync + 'static,
    {
        effects::transform(self.into(), move |value, _ctx| f(value))
    }

    /// Transform with access to a [`RefinementCtx`] for reporting issues.
    fn transform_with<F>(self, f: F) -> Schema
    where
        F: Fn(Value, &mut RefinementCtx) -> Value + Send + Sync + 'static,
    {
        effects::transform(self.into(), f)
    }

    /// Asynchronous transform; requires `parse_async`.
    fn transform_async<F, Fut>(self, f: F) -> Schema
    where
        F: Fn(Value) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Value> + Send + 'static,
    {
        effects::transform_async(self.into(), f)
    }

    /// Validate with `self`, then feed the output to `output`.
    fn pipe(self, output: impl Into<Schema>) -> Schema {
        effects::pipeline(self.into(), output.into())
    }
}
