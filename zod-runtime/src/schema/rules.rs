//! Ordered rule lists shared by the rule-bearing schemas.

use std::fmt;

/// A validation rule attached to a schema.
pub trait Rule: Clone + fmt::Debug + Send + Sync {
    /// Stable name of the rule family, e.g. `"min"`.
    fn kind(&self) -> &'static str;

    /// Kinds removed from the list when this rule is added.
    fn excludes(&self) -> &'static [&'static str] {
        &[]
    }

    /// Whether several rules of this kind may coexist.
    fn repeatable(&self) -> bool {
        false
    }

    /// English failure message.
    fn message(&self) -> String;
}

/// A rule with its optional custom message.
#[derive(Debug, Clone)]
pub struct Check<R> {
    pub rule: R,
    pub message: Option<String>,
}

/// Rules in insertion order, deduplicated by kind.
#[derive(Debug, Clone)]
pub struct RuleList<R> {
    checks: Vec<Check<R>>,
}

impl<R> Default for RuleList<R> {
    fn default() -> Self {
        Self { checks: Vec::new() }
    }
}

impl<R: Rule> RuleList<R> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a rule, replacing earlier rules of the same kind (unless the
    /// kind is repeatable) and evicting the kinds it excludes.
    pub fn add(&mut self, rule: R) {
        let kind = rule.kind();
        let excludes = rule.excludes();
        let repeatable = rule.repeatable();
        self.checks.retain(|check| {
            let existing = check.rule.kind();
            (repeatable || existing != kind) && !excludes.contains(&existing)
        });
        self.checks.push(Check {
            rule,
            message: None,
        });
    }

    /// Attach a message to the most recently added rule.
    pub fn set_last_message(&mut self, message: String) {
        if let Some(check) = self.checks.last_mut() {
            check.message = Some(message);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Check<R>> {
        self.checks.iter()
    }

    pub fn rules(&self) -> impl Iterator<Item = &R> {
        self.checks.iter().map(|check| &check.rule)
    }

    pub fn find(&self, kind: &str) -> Option<&R> {
        self.rules().find(|rule| rule.kind() == kind)
    }

    pub fn kinds(&self) -> Vec<&'static str> {
        self.rules().map(Rule::kind).collect()
    }

    pub fn len(&self) -> usize {
        self.checks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.checks.is_empty()
    }
}
