//! `$regex`.

use std::sync::Arc;

use crate::{
    Context, EvalError, IntoMatcher, MatchFn, Matcher, MatcherError, Pattern, ProcCell, Value,
};

/// Matches string records against a pattern.
///
/// A string argument is compiled once, at build time. Records that are not
/// strings never match.
#[derive(Debug)]
pub struct RegexMatcher {
    pattern: Pattern,
    proc: ProcCell,
}

impl RegexMatcher {
    /// Wraps an already compiled pattern.
    #[must_use]
    pub fn new(pattern: Pattern) -> Self {
        Self {
            pattern,
            proc: ProcCell::default(),
        }
    }

    /// The compiled pattern.
    #[must_use]
    pub fn pattern(&self) -> &Pattern {
        &self.pattern
    }
}

impl Matcher for RegexMatcher {
    fn matches(&self, record: &Value) -> Result<bool, EvalError> {
        Ok(record.as_str().is_some_and(|s| self.pattern.is_match(s)))
    }

    fn to_proc(&self) -> MatchFn {
        self.proc.get_or_build(|| {
            let pattern = self.pattern.clone();
            Arc::new(move |record: &Value| Ok(record.as_str().is_some_and(|s| pattern.is_match(s))))
        })
    }

    fn title(&self) -> String {
        format!("Regex: {}", self.pattern)
    }

    fn uniq_key(&self) -> String {
        format!("Regex:{}", self.pattern)
    }
}

impl IntoMatcher for RegexMatcher {
    fn build(condition: Value, _ctx: &Arc<Context>) -> Result<Arc<dyn Matcher>, MatcherError> {
        let pattern = match condition {
            Value::String(source) => Pattern::new(&source)?,
            Value::Regex(pattern) => pattern,
            other => return Err(MatcherError::invalid("$regex", "a string or a regex", &other)),
        };
        Ok(Arc::new(Self::new(pattern)))
    }
}
