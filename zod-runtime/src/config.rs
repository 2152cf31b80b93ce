//! Parse-time and per-schema configuration.
//!
//! [`ParseOptions`] is handed to a single parse call and applies to the whole
//! tree. [`SchemaOptions`] is attached to an individual node through
//! [`ZodType::abort_early`](crate::ZodType::abort_early),
//! [`ZodType::error_map`](crate::ZodType::error_map) and
//! [`ZodType::debug`](crate::ZodType::debug), and overrides the parse options
//! for that node's step.
//!
//! # Message priority
//!
//! A message attached to a rule with `with_message` wins. Otherwise the
//! contextual map from [`ParseOptions`] is consulted, then the node's own
//! map, then the issue kind's default English message.
//!
//! # Example
//! ```rust
//! use zod_runtime::prelude::*;
//!
//! let options = ParseOptions::new()
//!     .with_abort_early(true)
//!     .with_error_map(|kind, _ctx| match kind.code() {
//!         IssueCode::InvalidType => Some("wrong type".to_string()),
//!         _ => None,
//!     });
//!
//! let error = z::string().parse_with(1, &options).unwrap_err();
//! assert_eq!(error.issues()[0].message, "wrong type");
//! ```

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{ErrorMapContext, IssueKind};

/// Message hook: return `Some` to replace the message of an issue.
pub type ErrorMap = Arc<dyn Fn(&IssueKind, &ErrorMapContext<'_>) -> Option<String> + Send + Sync>;

/// Options for a single parse call.
///
/// * `abort_early` - Stop at the first issue instead of collecting all of
///   them. Default: false.
///
/// * `debug` - Emit a `tracing` debug event for every step. Default: false.
///
/// * `error_map` - Contextual message hook. Not serialized.
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct ParseOptions {
    #[serde(default)]
    pub abort_early: bool,
    #[serde(default)]
    pub debug: bool,
    #[serde(skip)]
    pub error_map: Option<ErrorMap>,
}

impl ParseOptions {
    /// Create options with default values.
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use = "This method returns new ParseOptions and does not modify self"]
    pub fn with_abort_early(mut self, abort_early: bool) -> Self {
        self.abort_early = abort_early;
        self
    }

    #[must_use = "This method returns new ParseOptions and does not modify self"]
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Set the contextual error map.
    #[must_use = "This method returns new ParseOptions and does not modify self"]
    pub fn with_error_map<F>(mut self, map: F) -> Self
    where
        F: Fn(&IssueKind, &ErrorMapContext<'_>) -> Option<String> + Send + Sync + 'static,
    {
        self.error_map = Some(Arc::new(map));
        self
    }
}

impl fmt::Debug for ParseOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParseOptions")
            .field("abort_early", &self.abort_early)
            .field("debug", &self.debug)
            .field("error_map", &self.error_map.as_ref().map(|_| "<fn>"))
            .finish()
    }
}

/// Options attached to one schema node.
///
/// `abort_early` of `None` inherits the value in effect for the parent.
#[derive(Clone, Default)]
pub struct SchemaOptions {
    pub abort_early: Option<bool>,
    pub debug: bool,
    pub error_map: Option<ErrorMap>,
}

impl fmt::Debug for SchemaOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchemaOptions")
            .field("abort_early", &self.abort_early)
            .field("debug", &self.debug)
            .field("error_map", &self.error_map.as_ref().map(|_| "<fn>"))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn prop_builder_sets_flags(abort in any::<bool>(), debug in any::<bool>()) {
            let options = ParseOptions::new().with_abort_early(abort).with_debug(debug);
            prop_assert_eq!(options.abort_early, abort);
            prop_assert_eq!(options.debug, debug);
        }
    }

    #[test]
    fn test_defaults() {
        let options = ParseOptions::default();
        assert!(!options.abort_early);
        assert!(!options.debug);
        assert!(options.error_map.is_none());
    }

    #[test]
    fn test_deserialize_skips_error_map() {
        let options: ParseOptions = serde_json::from_str(r#"{"abort_early": true}"#).unwrap();
        assert!(options.abort_early);
        assert!(!options.debug);
        assert!(options.error_map.is_none());

        let json = serde_json::to_value(ParseOptions::new().with_error_map(|_, _| None)).unwrap();
        assert_eq!(json, serde_json::json!({"abort_early": false, "debug": false}));
    }

    #[test]
    fn test_debug_hides_closure() {
        let options = ParseOptions::new().with_error_map(|_, _| None);
        assert!(format!("{:?}", options).contains("<fn>"));
    }
}
