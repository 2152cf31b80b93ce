//! Per-call parse state.
//!
//! A parse call creates one [`Common`] block (mode, global flags, issue
//! accumulator) shared by every [`ParseContext`] of that call. Child contexts
//! extend the path and replace the data; union members and catch wrappers run
//! against a forked `Common` with the same settings and an empty accumulator.

use std::future::Future;
use std::mem;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::trace;

use crate::config::{ErrorMap, ParseOptions, SchemaOptions};
use crate::error::{ErrorMapContext, Issue, IssueKind, PathSegment, display_path};
use crate::schema::Schema;
use crate::value::{ParsedType, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ParseMode {
    Sync,
    Async,
}

/// State shared by every context of one parse call.
pub(crate) struct Common {
    pub(crate) mode: ParseMode,
    abort_early: bool,
    debug: bool,
    error_map: Option<ErrorMap>,
    issues: Mutex<Vec<Issue>>,
}

impl Common {
    pub(crate) fn new(options: &ParseOptions, mode: ParseMode) -> Arc<Self> {
        Arc::new(Self {
            mode,
            abort_early: options.abort_early,
            debug: options.debug,
            error_map: options.error_map.clone(),
            issues: Mutex::new(Vec::new()),
        })
    }

    /// Same settings, empty accumulator.
    pub(crate) fn fork(&self) -> Arc<Self> {
        Arc::new(Self {
            mode: self.mode,
            abort_early: self.abort_early,
            debug: self.debug,
            error_map: self.error_map.clone(),
            issues: Mutex::new(Vec::new()),
        })
    }

    pub(crate) fn take_issues(&self) -> Vec<Issue> {
        mem::take(&mut *self.lock())
    }

    fn push(&self, issue: Issue) {
        self.lock().push(issue);
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Issue>> {
        self.issues.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Result of one step.
#[derive(Debug)]
pub(crate) enum Outcome {
    /// No issue was recorded.
    Valid(Value),
    /// Issues were recorded but traversal continued; the value is best effort.
    Dirty(Value),
    /// The step gave up.
    Aborted,
}

impl Outcome {
    pub(crate) fn is_valid(&self) -> bool {
        matches!(self, Self::Valid(_))
    }
}

/// Folds child outcomes into a parent outcome.
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct Status {
    dirty: bool,
    aborted: bool,
}

impl Status {
    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub(crate) fn mark_aborted(&mut self) {
        self.aborted = true;
    }

    pub(crate) fn is_aborted(&self) -> bool {
        self.aborted
    }

    /// Record a child outcome, returning its value if it produced one.
    pub(crate) fn absorb(&mut self, outcome: Outcome) -> Option<Value> {
        match outcome {
            Outcome::Valid(value) => Some(value),
            Outcome::Dirty(value) => {
                self.dirty = true;
                Some(value)
            }
            Outcome::Aborted => {
                self.aborted = true;
                None
            }
        }
    }

    pub(crate) fn finish(self, value: Value) -> Outcome {
        if self.aborted {
            Outcome::Aborted
        } else if self.dirty {
            Outcome::Dirty(value)
        } else {
            Outcome::Valid(value)
        }
    }
}

/// Context handed to one step.
pub(crate) struct ParseContext {
    pub(crate) data: Value,
    pub(crate) path: Vec<PathSegment>,
    pub(crate) common: Arc<Common>,
    abort_early: bool,
    debug: bool,
    schema_error_map: Option<ErrorMap>,
}

impl ParseContext {
    pub(crate) fn root(data: Value, common: Arc<Common>) -> Self {
        Self {
            data,
            path: Vec::new(),
            abort_early: common.abort_early,
            debug: common.debug,
            common,
            schema_error_map: None,
        }
    }

    /// Apply a node's options on entry to its step.
    pub(crate) fn enter(&mut self, options: &SchemaOptions) {
        if let Some(abort_early) = options.abort_early {
            self.abort_early = abort_early;
        }
        self.debug |= options.debug;
        if let Some(map) = &options.error_map {
            self.schema_error_map = Some(map.clone());
        }
    }

    /// Context for a nested value one segment deeper.
    pub(crate) fn child(&self, data: Value, segment: impl Into<PathSegment>) -> Self {
        let mut path = self.path.clone();
        path.push(segment.into());
        Self {
            data,
            path,
            common: Arc::clone(&self.common),
            abort_early: self.abort_early,
            debug: self.debug,
            schema_error_map: None,
        }
    }

    /// Context for another schema at the same path.
    pub(crate) fn sibling(&self, data: Value) -> Self {
        Self {
            data,
            path: self.path.clone(),
            common: Arc::clone(&self.common),
            abort_early: self.abort_early,
            debug: self.debug,
            schema_error_map: None,
        }
    }

    /// Like [`sibling`](Self::sibling) but with a fresh accumulator.
    pub(crate) fn forked(&self, data: Value) -> Self {
        let mut ctx = self.sibling(data);
        ctx.common = self.common.fork();
        ctx
    }

    pub(crate) fn take_data(&mut self) -> Value {
        mem::take(&mut self.data)
    }

    /// Move the data into a sibling context for a wrapped schema, keeping
    /// this context for reporting.
    pub(crate) fn detach(&mut self) -> Self {
        let data = self.take_data();
        self.sibling(data)
    }

    pub(crate) fn is_async(&self) -> bool {
        self.common.mode == ParseMode::Async
    }

    pub(crate) fn abort_early(&self) -> bool {
        self.abort_early
    }

    pub(crate) fn debug(&self) -> bool {
        self.debug
    }

    pub(crate) fn add_issue(&self, kind: IssueKind) {
        self.add_issue_at(kind, self.path.clone(), None);
    }

    pub(crate) fn add_issue_with(&self, kind: IssueKind, message: Option<&str>) {
        self.add_issue_at(kind, self.path.clone(), message.map(str::to_string));
    }

    /// Record an issue. An explicit message wins; otherwise the contextual
    /// map, then the schema map, then the default message.
    pub(crate) fn add_issue_at(
        &self,
        kind: IssueKind,
        path: Vec<PathSegment>,
        message: Option<String>,
    ) {
        let message = match message {
            Some(message) => message,
            None => self.map_message(&kind, &path),
        };
        trace!(code = %kind.code(), path = %display_path(&path), "issue recorded");
        self.common.push(Issue {
            kind,
            path,
            message,
        });
    }

    /// Record a rule failure. Returns `true` when the caller must abort.
    pub(crate) fn report(&self, status: &mut Status, kind: IssueKind, message: Option<&str>) -> bool {
        self.add_issue_with(kind, message);
        if self.abort_early {
            status.mark_aborted();
            true
        } else {
            status.mark_dirty();
            false
        }
    }

    fn map_message(&self, kind: &IssueKind, path: &[PathSegment]) -> String {
        let default_message = kind.default_message();
        let maps = [
            self.common.error_map.as_ref(),
            self.schema_error_map.as_ref(),
        ];
        for map in maps.into_iter().flatten() {
            let ctx = ErrorMapContext {
                path,
                default_message: &default_message,
            };
            if let Some(message) = map(kind, &ctx) {
                return message;
            }
        }
        default_message
    }

    /// Record an `invalid_type` issue and abort.
    pub(crate) fn invalid_type(&self, expected: ParsedType) -> Outcome {
        self.add_issue(IssueKind::InvalidType {
            expected,
            received: self.data.parsed_type(),
        });
        Outcome::Aborted
    }
}

/// Run child steps and return their outcomes in job order.
///
/// Async parses without abort-early evaluate the jobs concurrently. Otherwise
/// jobs run one after another and, under abort-early, stop at the first
/// outcome that is not valid.
pub(crate) async fn run_children(
    abort_early: bool,
    is_async: bool,
    jobs: Vec<(&Schema, ParseContext)>,
) -> Vec<Outcome> {
    let tasks = jobs
        .into_iter()
        .map(|(schema, ctx)| schema.step(ctx))
        .collect();
    drive(abort_early, is_async, tasks, Outcome::is_valid).await
}

/// Await `tasks` in order, concurrently when allowed. With abort-early the
/// run stops after the first result rejected by `is_ok`.
pub(crate) async fn drive<F, T>(
    abort_early: bool,
    is_async: bool,
    tasks: Vec<F>,
    is_ok: fn(&T) -> bool,
) -> Vec<T>
where
    F: Future<Output = T>,
{
    if is_async && !abort_early {
        return futures::future::join_all(tasks).await;
    }
    let mut results = Vec::with_capacity(tasks.len());
    for task in tasks {
        let result = task.await;
        let stop = abort_early && !is_ok(&result);
        results.push(result);
        if stop {
            break;
        }
    }
    results
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context() -> ParseContext {
        ParseContext::root(Value::Null, Common::new(&ParseOptions::new(), ParseMode::Sync))
    }

    #[test]
    fn test_child_extends_path_and_shares_issues() {
        let ctx = context();
        let child = ctx.child(Value::from(1), "a").child(Value::from(2), 0usize);
        assert_eq!(child.path, vec![PathSegment::from("a"), PathSegment::Index(0)]);
        child.add_issue(IssueKind::Forbidden);
        assert_eq!(ctx.common.take_issues().len(), 1);
    }

    #[test]
    fn test_fork_isolates_issues() {
        let ctx = context();
        let forked = ctx.forked(Value::Null);
        forked.add_issue(IssueKind::Forbidden);
        assert!(ctx.common.take_issues().is_empty());
        assert_eq!(forked.common.take_issues().len(), 1);
    }

    #[test]
    fn test_explicit_message_beats_maps() {
        let options = ParseOptions::new().with_error_map(|_, _| Some("mapped".to_string()));
        let ctx = ParseContext::root(Value::Null, Common::new(&options, ParseMode::Sync));
        ctx.add_issue_with(IssueKind::Forbidden, Some("explicit"));
        ctx.add_issue(IssueKind::Forbidden);
        let issues = ctx.common.take_issues();
        assert_eq!(issues[0].message, "explicit");
        assert_eq!(issues[1].message, "mapped");
    }

    #[test]
    fn test_status_folds_outcomes() {
        let mut status = Status::default();
        assert!(status.absorb(Outcome::Valid(Value::Null)).is_some());
        assert!(matches!(status.finish(Value::Null), Outcome::Valid(_)));
        assert!(status.absorb(Outcome::Dirty(Value::Null)).is_some());
        assert!(matches!(status.finish(Value::Null), Outcome::Dirty(_)));
        assert!(status.absorb(Outcome::Aborted).is_none());
        assert!(matches!(status.finish(Value::Null), Outcome::Aborted));
    }
}
