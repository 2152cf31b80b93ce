//! # zod-runtime
//!
//! Composable runtime schema validation in the style of zod.
//!
//! ## Overview
//!
//! Schemas are immutable trees built through fluent constructors under
//! [`z`]. Parsing an untyped [`Value`] against a schema either returns the
//! validated (and possibly coerced or transformed) output or a
//! [`ValidationError`] listing every [`Issue`] with its path.
//!
//! - **Primitives** with rule lists: strings, numbers, big integers, dates
//! - **Composites**: arrays, sets, tuples, objects, records, maps
//! - **Combinators**: unions, intersections, pipelines
//! - **Effects**: refinements, transforms, preprocessing, async variants
//! - **Modifiers**: optional, nullable, default, catch, branded, lazy
//!
//! ## Quick Start
//!
//! ```rust
//! use zod_runtime::prelude::*;
//! use serde_json::json;
//!
//! let signup = z::object()
//!     .field("email", z::string().trim().email())
//!     .field("password", z::string().min(8))
//!     .field("age", z::coerce::number().int().gte(13.0).optional())
//!     .strict();
//!
//! let ok = signup.parse(json!({"email": " ada@example.com ", "password": "hunter22", "age": "36"}));
//! assert_eq!(
//!     ok.unwrap().to_json(),
//!     json!({"email": "ada@example.com", "password": "hunter22", "age": 36})
//! );
//!
//! let err = signup.parse(json!({"email": "nope", "password": "short", "admin": true})).unwrap_err();
//! assert_eq!(err.len(), 3);
//! assert!(err.flatten().field_errors.contains_key("password"));
//! ```
//!
//! ## Async
//!
//! Asynchronous refinements and transforms require
//! [`parse_async`](ZodType::parse_async). Synchronous parsing of a schema that
//! reaches one panics.

pub mod config;
pub(crate) mod context;
pub mod error;
pub mod metadata;
pub mod registry;
pub mod schema;
pub mod value;

#[cfg(test)]
mod tests;

// Public API
pub use config::{ErrorMap, ParseOptions, SchemaOptions};
pub use error::{
    ErrorMapContext, FlattenedErrors, FormattedError, Issue, IssueCode, IssueKind, ParseResult,
    PathSegment, SchemaError, TupleBound, ValidationError, display_path,
};
pub use metadata::{SchemaDescriptor, SchemaMetadata};
pub use registry::{SchemaId, SchemaRegistry};
pub use schema::array::{ArrayRule, ArraySchema, SetRule, SetSchema, SortOrder};
pub use schema::date::{DateBound, DateRule, DateSchema, Inclusivity};
pub use schema::effects::{RefineMessage, RefineParams, RefinementCtx};
pub use schema::enums::EnumSchema;
pub use schema::function::FunctionSchema;
pub use schema::intersection::merge_values;
pub use schema::modifiers::CatchContext;
pub use schema::number::{BigIntRule, BigIntSchema, NumberRule, NumberSchema};
pub use schema::object::{ObjectSchema, UnknownKeys};
pub use schema::primitive::BooleanSchema;
pub use schema::record::{MapSchema, RecordSchema};
pub use schema::rules::{Check, Rule, RuleList};
pub use schema::string::{StringRule, StringSchema};
pub use schema::tuple::TupleSchema;
pub use schema::{Base, SafeParseResult, Schema, TypeTag, ZodType};
pub use value::{Function, Object, ParsedType, Promise, Symbol, Value};

/// Schema constructors.
///
/// ```rust
/// use zod_runtime::prelude::*;
///
/// let point = z::tuple(schemas![z::number(), z::number()]);
/// assert!(point.is(serde_json::json!([1, 2])));
/// ```
pub mod z {
    pub use crate::schema::array::{array, set};
    pub use crate::schema::date::date;
    pub use crate::schema::effects::preprocess;
    pub use crate::schema::enums::{enum_, native_enum};
    pub use crate::schema::function::function;
    pub use crate::schema::intersection::intersection;
    pub use crate::schema::modifiers::{lazy, promise};
    pub use crate::schema::number::{bigint, number};
    pub use crate::schema::object::object;
    pub use crate::schema::primitive::{
        any, boolean, literal, nan, never, null, symbol, undefined, unknown, void,
    };
    pub use crate::schema::record::{map, record, record_with_key};
    pub use crate::schema::string::string;
    pub use crate::schema::tuple::tuple;
    pub use crate::schema::union::union;

    /// Constructors with input coercion switched on.
    pub mod coerce {
        use crate::schema::date::DateSchema;
        use crate::schema::number::{BigIntSchema, NumberSchema};
        use crate::schema::primitive::BooleanSchema;
        use crate::schema::string::StringSchema;

        pub fn string() -> StringSchema {
            super::string().coerce()
        }

        pub fn number() -> NumberSchema {
            super::number().coerce()
        }

        pub fn bigint() -> BigIntSchema {
            super::bigint().coerce()
        }

        pub fn boolean() -> BooleanSchema {
            super::boolean().coerce()
        }

        pub fn date() -> DateSchema {
            super::date().coerce()
        }
    }
}

/// Collect heterogeneous builders into a `Vec<Schema>`.
///
/// ```rust
/// use zod_runtime::prelude::*;
///
/// let items: Vec<Schema> = schemas![z::string(), z::number().int(), z::null()];
/// assert_eq!(items.len(), 3);
/// ```
#[macro_export]
macro_rules! schemas {
    ($($schema:expr),* $(,)?) => {
        vec![$($crate::Schema::from($schema)),*]
    };
}

/// Prelude for convenient imports
///
/// ```rust
/// use zod_runtime::prelude::*;
/// ```
pub mod prelude {
    pub use crate::schemas;
    pub use crate::z;
    pub use crate::{
        Inclusivity, IssueCode, IssueKind, ParseOptions, PathSegment, RefineMessage,
        RefineParams, RefinementCtx, SafeParseResult, Schema, SchemaRegistry, SortOrder,
        TypeTag, UnknownKeys, ValidationError, Value, ZodType,
    };
}
