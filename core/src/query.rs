//! Compiled queries and their evaluation strategies.
//!
//! A [`QueryMatcher`] owns one matcher tree and offers three ways to run it:
//!
//! - [`is_match`](QueryMatcher::is_match) normalizes the record, evaluates,
//!   and turns any evaluation error into `false`.
//! - [`to_proc`](QueryMatcher::to_proc) returns a [`FastPredicate`] that
//!   reuses one closure chain for every record and applies the same guard.
//! - [`trace`](QueryMatcher::trace) evaluates every node and records one
//!   [`TraceEntry`](crate::TraceEntry) per visit.

use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

use crate::convert::{Condition, RawCondition};
use crate::matcher::{condition_depth, render_tree};
use crate::matchers::HashConditionMatcher;
use crate::{
    Context, EvalError, Map, MatchFn, Matcher, MatcherError, ProcCell, Tracer, Value, MAX_DEPTH,
};

/// A compiled condition ready to test records.
///
/// The tree is immutable once built; share it across threads behind an
/// `Arc`. Each instance has its own [`Context`].
#[derive(Debug)]
pub struct QueryMatcher {
    condition: Condition,
    context: Arc<Context>,
    root: Arc<dyn Matcher>,
    proc: ProcCell,
}

impl QueryMatcher {
    /// Compiles an already normalized condition against `context`.
    ///
    /// # Errors
    ///
    /// Returns [`MatcherError::DepthExceeded`] if the condition nests deeper
    /// than [`MAX_DEPTH`], or any validation error from the tree.
    pub fn new(condition: Condition, context: Arc<Context>) -> Result<Self, MatcherError> {
        let depth = condition_depth(condition.as_value());
        if depth > MAX_DEPTH {
            return Err(MatcherError::DepthExceeded {
                depth,
                max: MAX_DEPTH,
            });
        }
        let root = HashConditionMatcher::build(condition.as_value().clone(), &context)?;
        Ok(Self {
            condition,
            context,
            root,
            proc: ProcCell::default(),
        })
    }

    /// The normalized condition this query was compiled from.
    #[must_use]
    pub fn condition(&self) -> &Condition {
        &self.condition
    }

    /// The context shared by every node of this query.
    #[must_use]
    pub fn context(&self) -> &Arc<Context> {
        &self.context
    }

    /// The root of the matcher tree.
    #[must_use]
    pub fn root(&self) -> &dyn Matcher {
        self.root.as_ref()
    }

    /// Tests `record`, normalizing it first. Never fails.
    #[must_use]
    pub fn is_match(&self, record: &Value) -> bool {
        self.matches(&self.normalize_record(record)).unwrap_or(false)
    }

    /// Tests `record` as given, without normalization or error guard.
    ///
    /// # Errors
    ///
    /// Returns the first [`EvalError`] raised by a node.
    pub fn matches(&self, record: &Value) -> Result<bool, EvalError> {
        self.root.matches(record)
    }

    /// Normalizes a record with this query's converters.
    ///
    /// Fast-path callers run this once per record upstream, then turn
    /// conversion off with [`set_need_convert`](Self::set_need_convert).
    #[must_use]
    pub fn normalize_record<'a>(&self, record: &'a Value) -> Cow<'a, Value> {
        self.context.normalizer().normalize_record(record)
    }

    /// Turns nested value conversion on or off for every node.
    pub fn set_need_convert(&self, need_convert: bool) {
        self.context.set_need_convert(need_convert);
    }

    /// The precompiled predicate. Built once and cached.
    #[must_use]
    pub fn to_proc(&self) -> FastPredicate {
        FastPredicate(self.proc.get_or_build(|| self.root.to_proc()))
    }

    /// Evaluates `record` with tracing.
    ///
    /// Every node is visited, so the trace shows why each branch passed or
    /// failed. The result equals [`is_match`](Self::is_match).
    #[must_use]
    pub fn trace(&self, record: &Value) -> Tracer {
        let record = self.normalize_record(record);
        self.context.set_current_record(Some(record.clone().into_owned()));
        let mut tracer = Tracer::new();
        // the outcome is kept in the tracer
        let _ = self.root.matches_with_trace(&record, &mut tracer);
        self.context.set_current_record(None);
        tracer
    }

    /// The matcher tree as connector-prefixed lines.
    #[must_use]
    pub fn render_tree(&self) -> Vec<String> {
        render_tree(self.root.as_ref())
    }

    /// The matcher tree under a `QueryMatcher Tree:` header.
    #[must_use]
    pub fn explain(&self) -> String {
        let mut out = String::new();
        // writing to a String cannot fail
        let _ = self.explain_to(&mut out);
        out
    }

    /// Writes [`explain`](Self::explain) output to `out`.
    ///
    /// # Errors
    ///
    /// Propagates errors from `out`.
    pub fn explain_to<W: fmt::Write>(&self, out: &mut W) -> fmt::Result {
        writeln!(out, "QueryMatcher Tree:")?;
        for line in self.render_tree() {
            writeln!(out, "{line}")?;
        }
        Ok(())
    }

    /// Recompiles this condition under a fresh context carrying `config`.
    ///
    /// # Errors
    ///
    /// As [`new`](Self::new).
    pub fn with_config(&self, config: Map) -> Result<Self, MatcherError> {
        Self::new(self.condition.clone(), Arc::new(self.context.fork(config)))
    }
}

impl From<&QueryMatcher> for RawCondition {
    fn from(query: &QueryMatcher) -> Self {
        RawCondition::from(query.condition())
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Fast path
// ═══════════════════════════════════════════════════════════════════════════════

/// The closure chain of a compiled query.
///
/// Records are not normalized: pass records through
/// [`QueryMatcher::normalize_record`] first when they hold custom values.
#[derive(Clone)]
pub struct FastPredicate(MatchFn);

impl FastPredicate {
    /// Tests `record`. Evaluation errors count as a non-match.
    #[inline]
    #[must_use]
    pub fn call(&self, record: &Value) -> bool {
        (self.0)(record).unwrap_or(false)
    }

    /// Tests `record`, surfacing evaluation errors.
    ///
    /// # Errors
    ///
    /// Returns the first [`EvalError`] raised by a node.
    #[inline]
    pub fn try_call(&self, record: &Value) -> Result<bool, EvalError> {
        (self.0)(record)
    }
}

impl fmt::Debug for FastPredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("FastPredicate")
    }
}
