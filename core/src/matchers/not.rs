//! `$not`: negates its argument's literal form.

use std::sync::Arc;

use super::LiteralMatcher;
use crate::{
    Context, EvalError, IntoMatcher, MatchFn, Matcher, MatcherError, ProcCell, Tracer, Value,
};

/// Matches when the argument, read as a literal, does not.
///
/// Errors from the argument propagate: a failing child is a non-match at
/// the top level, not a match.
#[derive(Debug)]
pub struct NotMatcher {
    literal: LiteralMatcher,
    proc: ProcCell,
}

impl Matcher for NotMatcher {
    fn matches(&self, record: &Value) -> Result<bool, EvalError> {
        Ok(!self.literal.evaluate(record)?)
    }

    fn to_proc(&self) -> MatchFn {
        self.proc.get_or_build(|| {
            let literal = self.literal.evaluate_proc();
            Arc::new(move |record: &Value| Ok(!literal(record)?))
        })
    }

    fn check_validity(&self) -> Result<(), MatcherError> {
        self.literal.check_validity()
    }

    fn title(&self) -> String {
        format!("Not: {}", self.literal.condition())
    }

    fn children(&self) -> Vec<&dyn Matcher> {
        self.literal.literal_children()
    }

    fn uniq_key(&self) -> String {
        format!("Not:{:#}", self.literal.condition())
    }

    fn matches_with_trace(&self, record: &Value, tracer: &mut Tracer) -> Result<bool, EvalError> {
        tracer.scope(self.title(), record, |tracer| {
            Ok(!self.literal.evaluate_with_trace(record, tracer)?)
        })
    }
}

impl IntoMatcher for NotMatcher {
    fn build(condition: Value, ctx: &Arc<Context>) -> Result<Arc<dyn Matcher>, MatcherError> {
        Ok(Arc::new(Self {
            literal: LiteralMatcher::new(condition, ctx)?,
            proc: ProcCell::default(),
        }))
    }
}
