//! Wrapper schemas: optional, nullable, required, default, catch, branded,
//! lazy and promise.

use std::fmt;
use std::sync::{Arc, OnceLock, Weak};

use futures::future::{BoxFuture, FutureExt};

use crate::context::{Outcome, ParseContext};
use crate::error::{IssueKind, ValidationError};
use crate::registry::{RegistryInner, SchemaId};
use crate::schema::{Kind, Schema, ZodType, resolved};
use crate::value::{ParsedType, Promise, Value};

#[derive(Clone)]
pub(crate) enum DefaultValue {
    Value(Value),
    Factory(Arc<dyn Fn() -> Value + Send + Sync>),
}

impl DefaultValue {
    fn produce(&self) -> Value {
        match self {
            Self::Value(value) => value.clone(),
            Self::Factory(factory) => factory(),
        }
    }
}

#[derive(Clone)]
pub(crate) struct DefaultDef {
    pub(crate) inner: Schema,
    pub(crate) value: DefaultValue,
}

/// What a catch factory sees when the wrapped schema fails.
#[derive(Debug, Clone)]
pub struct CatchContext {
    pub error: ValidationError,
    pub input: Value,
}

#[derive(Clone)]
pub(crate) enum CatchValue {
    Value(Value),
    Factory(Arc<dyn Fn(&CatchContext) -> Value + Send + Sync>),
}

#[derive(Clone)]
pub(crate) struct CatchDef {
    pub(crate) inner: Schema,
    pub(crate) value: CatchValue,
}

#[derive(Debug, Clone)]
pub(crate) struct BrandedDef {
    pub(crate) inner: Schema,
    pub(crate) brand: String,
}

#[derive(Clone)]
enum LazySource {
    Getter {
        getter: Arc<dyn Fn() -> Schema + Send + Sync>,
        memo: Arc<OnceLock<Schema>>,
    },
    Registry {
        registry: Weak<RegistryInner>,
        id: SchemaId,
    },
}

#[derive(Clone)]
pub(crate) struct LazyDef {
    source: LazySource,
}

impl LazyDef {
    pub(crate) fn registry(registry: Weak<RegistryInner>, id: SchemaId) -> Self {
        Self {
            source: LazySource::Registry { registry, id },
        }
    }

    /// # Panics
    ///
    /// Panics if a registry reference outlives its registry or points at a
    /// slot that was never defined.
    pub(crate) fn resolve(&self) -> Schema {
        match &self.source {
            LazySource::Getter { getter, memo } => memo.get_or_init(|| getter()).clone(),
            LazySource::Registry { registry, id } => {
                let Some(registry) = registry.upgrade() else {
                    panic!("schema {id} referenced after its registry was dropped");
                };
                match registry.get(*id) {
                    Some(schema) => schema,
                    None => panic!("schema {id} referenced before it was defined"),
                }
            }
        }
    }
}

impl fmt::Debug for LazyDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.source {
            LazySource::Getter { memo, .. } => f
                .debug_struct("Lazy")
                .field("resolved", &memo.get().is_some())
                .finish(),
            LazySource::Registry { id, .. } => f.debug_struct("Lazy").field("id", id).finish(),
        }
    }
}

/// Schema built on first use by `getter`, for recursive definitions.
pub fn lazy<F, S>(getter: F) -> Schema
where
    F: Fn() -> S + Send + Sync + 'static,
    S: Into<Schema>,
{
    Schema::from_kind(Kind::Lazy(LazyDef {
        source: LazySource::Getter {
            getter: Arc::new(move || getter().into()),
            memo: Arc::new(OnceLock::new()),
        },
    }))
}

/// Accepts a promise whose resolved value matches `inner`.
pub fn promise(inner: impl Into<Schema>) -> Schema {
    Schema::from_kind(Kind::Promise(inner.into()))
}

pub(crate) fn required(schema: Schema) -> Schema {
    let base = schema.base().clone();
    let mut inner = schema;
    while let Kind::Optional(next) | Kind::Nullable(next) = inner.kind() {
        inner = next.clone();
    }
    Schema::new(Kind::Required(inner), base)
}

pub(crate) fn default_value(inner: Schema, value: Value) -> Schema {
    Schema::from_kind(Kind::Default(DefaultDef {
        inner,
        value: DefaultValue::Value(value),
    }))
}

pub(crate) fn default_with<F>(inner: Schema, factory: F) -> Schema
where
    F: Fn() -> Value + Send + Sync + 'static,
{
    Schema::from_kind(Kind::Default(DefaultDef {
        inner,
        value: DefaultValue::Factory(Arc::new(factory)),
    }))
}

pub(crate) fn catch_value(inner: Schema, value: Value) -> Schema {
    Schema::from_kind(Kind::Catch(CatchDef {
        inner,
        value: CatchValue::Value(value),
    }))
}

pub(crate) fn catch_with<F>(inner: Schema, factory: F) -> Schema
where
    F: Fn(&CatchContext) -> Value + Send + Sync + 'static,
{
    Schema::from_kind(Kind::Catch(CatchDef {
        inner,
        value: CatchValue::Factory(Arc::new(factory)),
    }))
}

pub(crate) fn brand(inner: Schema, brand: String) -> Schema {
    Schema::from_kind(Kind::Branded(BrandedDef { inner, brand }))
}

impl Schema {
    /// Brand name of a branded schema.
    pub fn brand_name(&self) -> Option<&str> {
        match self.kind() {
            Kind::Branded(def) => Some(&def.brand),
            _ => None,
        }
    }
}

pub(crate) fn parse_lazy(def: &LazyDef, ctx: ParseContext) -> BoxFuture<'_, Outcome> {
    async move {
        let schema = def.resolve();
        schema.step(ctx).await
    }
    .boxed()
}

pub(crate) fn parse_optional(inner: &Schema, ctx: ParseContext) -> BoxFuture<'_, Outcome> {
    if ctx.data.is_undefined() {
        return resolved(Outcome::Valid(Value::Undefined));
    }
    inner.step(ctx)
}

pub(crate) fn parse_nullable(inner: &Schema, ctx: ParseContext) -> BoxFuture<'_, Outcome> {
    if ctx.data.is_null() {
        return resolved(Outcome::Valid(Value::Null));
    }
    inner.step(ctx)
}

pub(crate) fn parse_required(inner: &Schema, ctx: ParseContext) -> BoxFuture<'_, Outcome> {
    if ctx.data.is_undefined() {
        ctx.add_issue(IssueKind::Required);
        return resolved(Outcome::Aborted);
    }
    inner.step(ctx)
}

pub(crate) fn parse_default(def: &DefaultDef, mut ctx: ParseContext) -> BoxFuture<'_, Outcome> {
    if ctx.data.is_undefined() {
        ctx.data = def.value.produce();
    }
    def.inner.step(ctx)
}

pub(crate) async fn parse_catch(def: &CatchDef, mut ctx: ParseContext) -> Outcome {
    let input = ctx.take_data();
    let attempt = ctx.forked(input.clone());
    let accumulator = Arc::clone(&attempt.common);
    if let Outcome::Valid(value) = def.inner.step(attempt).await {
        return Outcome::Valid(value);
    }
    let value = match &def.value {
        CatchValue::Value(value) => value.clone(),
        CatchValue::Factory(factory) => factory(&CatchContext {
            error: ValidationError::new(accumulator.take_issues()),
            input,
        }),
    };
    Outcome::Valid(value)
}

/// # Panics
///
/// Panics when a promise value reaches a synchronous parse.
pub(crate) async fn parse_promise(inner: &Schema, ctx: ParseContext) -> Outcome {
    let Value::Promise(promise) = &ctx.data else {
        return ctx.invalid_type(ParsedType::Promise);
    };
    if !ctx.is_async() {
        panic!("promise value encountered during a synchronous parse; use parse_async");
    }
    let value = promise.resolve().await;
    match inner.step(ctx.sibling(value)).await {
        Outcome::Valid(value) => Outcome::Valid(Value::Promise(Promise::resolved(value))),
        Outcome::Dirty(value) => Outcome::Dirty(Value::Promise(Promise::resolved(value))),
        Outcome::Aborted => Outcome::Aborted,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::TypeTag;
    use crate::schema::string::string;

    #[test]
    fn test_required_peels_optional_and_nullable_chains() {
        let schema = string().nullish().required();
        assert_eq!(schema.type_tag(), TypeTag::Required);
        assert_eq!(schema.unwrap().map(Schema::type_tag), Some(TypeTag::String));
        assert!(!schema.is_optional());
        assert!(!schema.is_nullable());
    }

    #[test]
    fn test_lazy_getter_is_memoized() {
        use std::sync::atomic::{AtomicUsize, Ordering};
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let schema = lazy(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            string()
        });
        let Kind::Lazy(def) = schema.kind() else {
            panic!("expected lazy");
        };
        def.resolve();
        def.resolve();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_brand_name() {
        let schema = string().brand("UserId");
        assert_eq!(schema.brand_name(), Some("UserId"));
        assert_eq!(string().into_schema().brand_name(), None);
    }
}
