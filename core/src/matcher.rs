//! The `Matcher` trait and the helpers every matcher node shares.
//!
//! A compiled condition is a tree of `Arc<dyn Matcher>`. Each node can be
//! evaluated directly ([`Matcher::matches`]), turned into a standalone
//! closure ([`Matcher::to_proc`]), traced, and rendered for `explain`.

use std::collections::HashSet;
use std::fmt;
use std::sync::{Arc, OnceLock};

use crate::{EvalError, MatcherError, Tracer, Value};

/// A compiled evaluation closure.
///
/// Errors are returned, not swallowed: the top-level guard lives in
/// [`FastPredicate`](crate::FastPredicate) and
/// [`QueryMatcher::is_match`](crate::QueryMatcher::is_match).
pub type MatchFn = Arc<dyn Fn(&Value) -> Result<bool, EvalError> + Send + Sync>;

/// A node in a compiled matcher tree.
///
/// # Thread Safety
///
/// Trees are immutable after construction apart from memoized state, so
/// they can be shared across threads.
pub trait Matcher: Send + Sync + fmt::Debug {
    /// Evaluates `record`.
    ///
    /// # Errors
    ///
    /// Returns [`EvalError`] when evaluation cannot complete (for example a
    /// lazily built sub-matcher failed to compile).
    fn matches(&self, record: &Value) -> Result<bool, EvalError>;

    /// Evaluates `record`, reading any error as a non-match.
    fn is_match(&self, record: &Value) -> bool {
        self.matches(record).unwrap_or(false)
    }

    /// The node's evaluation closure, built once and memoized.
    ///
    /// Returns the same result as [`matches`](Self::matches) for every record.
    fn to_proc(&self) -> MatchFn;

    /// Re-checks the condition's shape.
    ///
    /// Construction already runs this; it is exposed for extension operators
    /// and for tests. Nodes that keep their raw argument re-validate it and
    /// wrappers defer to their children. Nodes that keep only a parsed
    /// argument (`$regex`, `$exists`, `$present`, comparisons) are valid by
    /// construction and keep this default.
    ///
    /// # Errors
    ///
    /// Returns [`MatcherError`] for a malformed condition.
    fn check_validity(&self) -> Result<(), MatcherError> {
        Ok(())
    }

    /// One-line description used by `explain` and `trace`.
    fn title(&self) -> String;

    /// Child nodes, in evaluation order.
    fn children(&self) -> Vec<&dyn Matcher> {
        Vec::new()
    }

    /// Structural identity: nodes with equal keys are interchangeable.
    fn uniq_key(&self) -> String;

    /// Evaluates `record`, recording this node (and its children) in `tracer`.
    ///
    /// Composite nodes evaluate every child; the returned result equals
    /// [`matches`](Self::matches).
    ///
    /// # Errors
    ///
    /// As [`matches`](Self::matches).
    fn matches_with_trace(&self, record: &Value, tracer: &mut Tracer) -> Result<bool, EvalError> {
        tracer.scope(self.title(), record, |_| self.matches(record))
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Memoized closure
// ═══════════════════════════════════════════════════════════════════════════════

/// Write-once cell for a node's [`MatchFn`].
#[derive(Default)]
pub struct ProcCell(OnceLock<MatchFn>);

impl ProcCell {
    /// Returns the memoized closure, building it on first use.
    pub fn get_or_build(&self, build: impl FnOnce() -> MatchFn) -> MatchFn {
        Arc::clone(self.0.get_or_init(build))
    }
}

impl fmt::Debug for ProcCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(if self.0.get().is_some() {
            "ProcCell(built)"
        } else {
            "ProcCell(empty)"
        })
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Composition helpers
// ═══════════════════════════════════════════════════════════════════════════════

/// Drops children whose [`uniq_key`](Matcher::uniq_key) was already seen.
///
/// The first occurrence wins, so evaluation order is preserved.
#[must_use]
pub fn dedup(children: Vec<Arc<dyn Matcher>>) -> Vec<Arc<dyn Matcher>> {
    let mut seen = HashSet::with_capacity(children.len());
    children
        .into_iter()
        .filter(|child| seen.insert(child.uniq_key()))
        .collect()
}

/// Returns the only child itself, or `wrap(children)` for zero or many.
///
/// Empty AND must match everything and empty OR nothing, so the empty case
/// is left to the wrapper.
pub fn maybe_unwrap<F>(children: Vec<Arc<dyn Matcher>>, wrap: F) -> Arc<dyn Matcher>
where
    F: FnOnce(Vec<Arc<dyn Matcher>>) -> Arc<dyn Matcher>,
{
    match <[Arc<dyn Matcher>; 1]>::try_from(children) {
        Ok([only]) => only,
        Err(children) => wrap(children),
    }
}

/// AND over child closures, short-circuiting.
#[must_use]
pub fn all_of(procs: Vec<MatchFn>) -> MatchFn {
    Arc::new(move |record: &Value| {
        for proc in &procs {
            if !proc(record)? {
                return Ok(false);
            }
        }
        Ok(true)
    })
}

/// OR over child closures, short-circuiting.
#[must_use]
pub fn any_of(procs: Vec<MatchFn>) -> MatchFn {
    Arc::new(move |record: &Value| {
        for proc in &procs {
            if proc(record)? {
                return Ok(true);
            }
        }
        Ok(false)
    })
}

/// Depth of a condition value (scalars are 0, each map or array level adds 1).
#[must_use]
pub fn condition_depth(value: &Value) -> usize {
    match value {
        Value::Map(map) => 1 + map.values().map(condition_depth).max().unwrap_or(0),
        Value::Array(items) => 1 + items.iter().map(condition_depth).max().unwrap_or(0),
        _ => 0,
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Tree rendering
// ═══════════════════════════════════════════════════════════════════════════════

/// Renders `matcher` and its subtree as connector-prefixed lines.
///
/// ```text
/// └─ And: {"age": {"$gte": 18}, "name": "Ann"}
///    ├─ Field: "age" to match: {"$gte": 18}
///    │  └─ Gte: 18
///    └─ Field: "name" to match: "Ann"
///       └─ Eq: "Ann"
/// ```
#[must_use]
pub fn render_tree(matcher: &dyn Matcher) -> Vec<String> {
    let mut lines = Vec::new();
    render_node(matcher, "", true, &mut lines);
    lines
}

fn render_node(matcher: &dyn Matcher, prefix: &str, is_last: bool, lines: &mut Vec<String>) {
    let connector = if is_last { "└─ " } else { "├─ " };
    lines.push(format!("{prefix}{connector}{}", matcher.title()));

    let child_prefix = format!("{prefix}{}", if is_last { "   " } else { "│  " });
    let children = matcher.children();
    let count = children.len();
    for (i, child) in children.into_iter().enumerate() {
        render_node(child, &child_prefix, i + 1 == count, lines);
    }
}
