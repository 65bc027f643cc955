//! `$size`: match the length of an array record.

use std::sync::Arc;

use super::LiteralMatcher;
use crate::{
    Context, EvalError, IntoMatcher, MatchFn, Matcher, MatcherError, ProcCell, Tracer, Value,
};

/// Matches an array record whose length satisfies the argument.
///
/// The argument is a literal, so both `{"$size": 2}` and
/// `{"$size": {"$gte": 2}}` work. Non-array records never match.
#[derive(Debug)]
pub struct SizeMatcher {
    literal: LiteralMatcher,
    proc: ProcCell,
}

fn length(record: &Value) -> Option<Value> {
    record.as_array().map(|items| Value::from(items.len()))
}

impl Matcher for SizeMatcher {
    fn matches(&self, record: &Value) -> Result<bool, EvalError> {
        match length(record) {
            Some(len) => self.literal.evaluate(&len),
            None => Ok(false),
        }
    }

    fn to_proc(&self) -> MatchFn {
        self.proc.get_or_build(|| {
            let literal = self.literal.evaluate_proc();
            Arc::new(move |record: &Value| match length(record) {
                Some(len) => literal(&len),
                None => Ok(false),
            })
        })
    }

    fn check_validity(&self) -> Result<(), MatcherError> {
        self.literal.check_validity()
    }

    fn title(&self) -> String {
        format!("Size: {}", self.literal.condition())
    }

    fn children(&self) -> Vec<&dyn Matcher> {
        self.literal.literal_children()
    }

    fn uniq_key(&self) -> String {
        format!("Size:{:#}", self.literal.condition())
    }

    fn matches_with_trace(&self, record: &Value, tracer: &mut Tracer) -> Result<bool, EvalError> {
        tracer.scope(self.title(), record, |tracer| match length(record) {
            Some(len) => self.literal.evaluate_with_trace(&len, tracer),
            None => Ok(false),
        })
    }
}

impl IntoMatcher for SizeMatcher {
    fn build(condition: Value, ctx: &Arc<Context>) -> Result<Arc<dyn Matcher>, MatcherError> {
        Ok(Arc::new(Self {
            literal: LiteralMatcher::new(condition, ctx)?,
            proc: ProcCell::default(),
        }))
    }
}
