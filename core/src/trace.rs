//! Evaluation trace for debugging matcher behavior.
//!
//! [`QueryMatcher::trace`](crate::QueryMatcher::trace) evaluates one record
//! and records every matcher node it touched. Composite matchers evaluate
//! ALL children while tracing (no short-circuit) for maximum debugging
//! value; the recorded result is still the one normal evaluation returns.
//!
//! Entries are pushed when a node finishes, so children come before their
//! parent. [`Tracer::reordered`] restores display order (parent first).
//!
//! # Example
//!
//! ```
//! use mongory::{compile, Value};
//! use serde_json::json;
//!
//! let matcher = compile(json!({"age": {"$gte": 18}, "name": "Ann"})).unwrap();
//! let trace = matcher.trace(&Value::from(json!({"age": 20, "name": "Bob"})));
//!
//! assert_eq!(trace.result(), Some(false));
//! println!("{}", trace.render());
//! ```

use std::fmt;

use crate::{EvalError, Value};

/// Outcome of one traced node.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum TraceOutcome {
    /// The node matched.
    Matched,
    /// The node did not match.
    Unmatched,
    /// Evaluation raised an error (read as a non-match at the top level).
    Error(String),
}

impl TraceOutcome {
    /// Returns `true` only for [`TraceOutcome::Matched`].
    #[must_use]
    pub fn matched(&self) -> bool {
        matches!(self, Self::Matched)
    }
}

impl From<&Result<bool, EvalError>> for TraceOutcome {
    fn from(result: &Result<bool, EvalError>) -> Self {
        match result {
            Ok(true) => Self::Matched,
            Ok(false) => Self::Unmatched,
            Err(e) => Self::Error(e.to_string()),
        }
    }
}

impl fmt::Display for TraceOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Matched => f.write_str("matched"),
            Self::Unmatched => f.write_str("dismatch"),
            Self::Error(e) => write!(f, "error: {e}"),
        }
    }
}

/// One traced matcher node.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct TraceEntry {
    /// Nesting depth (root is 0).
    pub level: usize,
    /// The node's title, as shown by `explain`.
    pub title: String,
    /// The record the node saw, rendered.
    pub record: String,
    /// What the node returned.
    pub outcome: TraceOutcome,
}

impl fmt::Display for TraceEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:indent$}{} {}, record: {}",
            "",
            self.title,
            self.outcome,
            self.record,
            indent = self.level * 2
        )
    }
}

/// Collects [`TraceEntry`]s during a traced evaluation.
#[derive(Debug, Default)]
pub struct Tracer {
    entries: Vec<TraceEntry>,
    level: usize,
}

impl Tracer {
    /// Creates an empty tracer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs `f` one level deeper and records its result under `title`.
    ///
    /// # Errors
    ///
    /// Returns whatever `f` returns.
    pub fn scope<F>(&mut self, title: String, record: &Value, f: F) -> Result<bool, EvalError>
    where
        F: FnOnce(&mut Self) -> Result<bool, EvalError>,
    {
        let level = self.level;
        self.level += 1;
        let result = f(self);
        self.level = level;

        self.entries.push(TraceEntry {
            level,
            title,
            record: record.to_string(),
            outcome: TraceOutcome::from(&result),
        });
        result
    }

    /// Entries in completion order (children before parents).
    #[must_use]
    pub fn entries(&self) -> &[TraceEntry] {
        &self.entries
    }

    /// Entries in display order (parents before children).
    #[must_use]
    pub fn reordered(&self) -> Vec<&TraceEntry> {
        let mut ordered = Vec::with_capacity(self.entries.len());
        reorder(&self.entries, 0, &mut ordered);
        ordered
    }

    /// The root node's result, if anything was traced.
    #[must_use]
    pub fn result(&self) -> Option<bool> {
        self.entries
            .iter()
            .rev()
            .find(|e| e.level == 0)
            .map(|e| e.outcome.matched())
    }

    /// Renders the trace as indented lines in display order.
    #[must_use]
    pub fn render(&self) -> String {
        let mut out = String::new();
        // writing to a String cannot fail
        let _ = self.render_to(&mut out);
        out
    }

    /// Writes the rendered trace to `out`.
    ///
    /// # Errors
    ///
    /// Propagates errors from `out`.
    pub fn render_to<W: fmt::Write>(&self, out: &mut W) -> fmt::Result {
        for entry in self.reordered() {
            writeln!(out, "{entry}")?;
        }
        Ok(())
    }

    /// Discards all entries.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.level = 0;
    }
}

// Each node at `level` closes the run of deeper entries before it.
fn reorder<'a>(entries: &'a [TraceEntry], level: usize, out: &mut Vec<&'a TraceEntry>) {
    let mut group_start = 0;
    for (i, entry) in entries.iter().enumerate() {
        if entry.level == level {
            out.push(entry);
            reorder(&entries[group_start..i], level + 1, out);
            group_start = i + 1;
        }
    }
}

/// Folds child results the way a short-circuiting AND would.
///
/// # Errors
///
/// Returns the first error that occurs before a `false`.
pub fn fold_all(results: impl IntoIterator<Item = Result<bool, EvalError>>) -> Result<bool, EvalError> {
    for result in results {
        if !result? {
            return Ok(false);
        }
    }
    Ok(true)
}

/// Folds child results the way a short-circuiting OR would.
///
/// # Errors
///
/// Returns the first error that occurs before a `true`.
pub fn fold_any(results: impl IntoIterator<Item = Result<bool, EvalError>>) -> Result<bool, EvalError> {
    for result in results {
        if result? {
            return Ok(true);
        }
    }
    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scope_records_post_order_with_levels() {
        let mut tracer = Tracer::new();
        let record = Value::Int(1);
        let result = tracer.scope("root".into(), &record, |t| {
            let a = t.scope("a".into(), &record, |t| {
                t.scope("a1".into(), &record, |_| Ok(true))
            })?;
            let b = t.scope("b".into(), &record, |_| Ok(false))?;
            Ok(a && b)
        });

        assert_eq!(result, Ok(false));
        let titles: Vec<_> = tracer.entries().iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, vec!["a1", "a", "b", "root"]);
        let levels: Vec<_> = tracer.entries().iter().map(|e| e.level).collect();
        assert_eq!(levels, vec![2, 1, 1, 0]);
    }

    #[test]
    fn reordered_is_pre_order() {
        let mut tracer = Tracer::new();
        let record = Value::Null;
        let _ = tracer.scope("root".into(), &record, |t| {
            let _ = t.scope("a".into(), &record, |t| {
                let _ = t.scope("a1".into(), &record, |_| Ok(true));
                t.scope("a2".into(), &record, |_| Ok(true))
            });
            t.scope("b".into(), &record, |_| Ok(true))
        });

        let titles: Vec<_> = tracer.reordered().iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, vec!["root", "a", "a1", "a2", "b"]);
        assert_eq!(tracer.result(), Some(true));
    }

    #[test]
    fn render_indents_by_level() {
        let mut tracer = Tracer::new();
        let record = Value::Int(5);
        let _ = tracer.scope("Gt: 3".into(), &record, |_| Ok(true));
        assert_eq!(tracer.render(), "Gt: 3 matched, record: 5\n");
    }

    #[test]
    fn error_outcome_is_recorded() {
        let mut tracer = Tracer::new();
        let result = tracer.scope("x".into(), &Value::Null, |_| Err(EvalError::Custom("boom".into())));
        assert!(result.is_err());
        assert_eq!(tracer.entries()[0].outcome, TraceOutcome::Error("boom".into()));
        assert_eq!(tracer.result(), Some(false));
    }

    #[test]
    fn folds_match_short_circuit_semantics() {
        let boom = || Err(EvalError::Custom("boom".into()));
        assert_eq!(fold_all(vec![Ok(true), Ok(false), boom()]), Ok(false));
        assert!(fold_all(vec![Ok(true), boom(), Ok(false)]).is_err());
        assert_eq!(fold_any(vec![Ok(false), Ok(true), boom()]), Ok(true));
        assert!(fold_any(vec![boom(), Ok(true)]).is_err());
        assert_eq!(fold_all(Vec::<Result<bool, EvalError>>::new()), Ok(true));
        assert_eq!(fold_any(Vec::<Result<bool, EvalError>>::new()), Ok(false));
    }
}
