//! `$in` and `$nin`.
//!
//! The argument is an array of candidates or a [`ValueRange`]. A range is
//! expanded into bound checks (see [`ValueRange::to_in_condition`] and
//! [`ValueRange::to_nin_condition`]) and built as a hash condition.

use std::sync::Arc;

use super::HashConditionMatcher;
use crate::{
    Context, EvalError, IntoMatcher, MatchFn, Matcher, MatcherError, ProcCell, Tracer, Value,
    ValueRange,
};

const EXPECTED: &str = "an array or a range";

/// The compiled argument of a membership operator.
#[derive(Debug)]
enum Members {
    Set(Vec<Value>),
    Range(Arc<dyn Matcher>),
}

impl Members {
    fn check(operator: &str, condition: &Value) -> Result<(), MatcherError> {
        match condition {
            Value::Array(_) | Value::Range(_) => Ok(()),
            other => Err(MatcherError::invalid(operator, EXPECTED, other)),
        }
    }

    fn set(operator: &str, condition: &Value) -> Result<Vec<Value>, MatcherError> {
        condition
            .as_array()
            .map(<[Value]>::to_vec)
            .ok_or_else(|| MatcherError::invalid(operator, EXPECTED, condition))
    }

    fn range(
        range: &ValueRange,
        expand: fn(&ValueRange) -> Value,
        ctx: &Arc<Context>,
    ) -> Result<Self, MatcherError> {
        Ok(Self::Range(HashConditionMatcher::build(expand(range), ctx)?))
    }

    fn children(&self) -> Vec<&dyn Matcher> {
        match self {
            Self::Set(_) => Vec::new(),
            Self::Range(matcher) => vec![matcher.as_ref()],
        }
    }
}

/// Any element of an array record, or the record itself, is in `set`.
fn intersects(record: &Value, set: &[Value]) -> bool {
    match record {
        Value::Array(items) => items.iter().any(|item| set.contains(item)),
        other => set.contains(other.normalized()),
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// $in
// ═══════════════════════════════════════════════════════════════════════════════

/// `$in`: the record (or any element of an array record) is a member.
///
/// With a range argument, an array record matches if any element falls
/// inside the range.
#[derive(Debug)]
pub struct InMatcher {
    condition: Value,
    members: Members,
    proc: ProcCell,
}

impl Matcher for InMatcher {
    fn matches(&self, record: &Value) -> Result<bool, EvalError> {
        match (&self.members, record) {
            (Members::Set(set), _) => Ok(intersects(record, set)),
            (Members::Range(range), Value::Array(items)) => {
                for item in items {
                    if range.matches(item)? {
                        return Ok(true);
                    }
                }
                Ok(false)
            }
            (Members::Range(range), _) => range.matches(record),
        }
    }

    fn to_proc(&self) -> MatchFn {
        self.proc.get_or_build(|| match &self.members {
            Members::Set(set) => {
                let set = set.clone();
                Arc::new(move |record: &Value| Ok(intersects(record, &set)))
            }
            Members::Range(range) => {
                let range = range.to_proc();
                Arc::new(move |record: &Value| match record {
                    Value::Array(items) => {
                        for item in items {
                            if range(item)? {
                                return Ok(true);
                            }
                        }
                        Ok(false)
                    }
                    _ => range(record),
                })
            }
        })
    }

    fn check_validity(&self) -> Result<(), MatcherError> {
        Members::check("$in", &self.condition)
    }

    fn title(&self) -> String {
        format!("In: {}", self.condition)
    }

    fn children(&self) -> Vec<&dyn Matcher> {
        self.members.children()
    }

    fn uniq_key(&self) -> String {
        format!("In:{:#}", self.condition)
    }

    fn matches_with_trace(&self, record: &Value, tracer: &mut Tracer) -> Result<bool, EvalError> {
        tracer.scope(self.title(), record, |tracer| match (&self.members, record) {
            (Members::Range(range), Value::Array(items)) => {
                let results: Vec<_> = items
                    .iter()
                    .map(|item| range.matches_with_trace(item, tracer))
                    .collect();
                crate::trace::fold_any(results)
            }
            (Members::Range(range), _) => range.matches_with_trace(record, tracer),
            (Members::Set(_), _) => self.matches(record),
        })
    }
}

impl IntoMatcher for InMatcher {
    fn build(condition: Value, ctx: &Arc<Context>) -> Result<Arc<dyn Matcher>, MatcherError> {
        let members = match &condition {
            Value::Range(range) => Members::range(range, ValueRange::to_in_condition, ctx)?,
            other => Members::Set(Members::set("$in", other)?),
        };
        Ok(Arc::new(Self {
            condition,
            members,
            proc: ProcCell::default(),
        }))
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// $nin
// ═══════════════════════════════════════════════════════════════════════════════

/// `$nin`: neither the record nor any element of an array record is a member.
///
/// With a range argument, an array record matches only if every element
/// lies outside the range.
#[derive(Debug)]
pub struct NinMatcher {
    condition: Value,
    members: Members,
    proc: ProcCell,
}

impl Matcher for NinMatcher {
    fn matches(&self, record: &Value) -> Result<bool, EvalError> {
        match (&self.members, record) {
            (Members::Set(set), _) => Ok(!intersects(record, set)),
            (Members::Range(range), Value::Array(items)) => {
                for item in items {
                    if !range.matches(item)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
            (Members::Range(range), _) => range.matches(record),
        }
    }

    fn to_proc(&self) -> MatchFn {
        self.proc.get_or_build(|| match &self.members {
            Members::Set(set) => {
                let set = set.clone();
                Arc::new(move |record: &Value| Ok(!intersects(record, &set)))
            }
            Members::Range(range) => {
                let range = range.to_proc();
                Arc::new(move |record: &Value| match record {
                    Value::Array(items) => {
                        for item in items {
                            if !range(item)? {
                                return Ok(false);
                            }
                        }
                        Ok(true)
                    }
                    _ => range(record),
                })
            }
        })
    }

    fn check_validity(&self) -> Result<(), MatcherError> {
        Members::check("$nin", &self.condition)
    }

    fn title(&self) -> String {
        format!("Nin: {}", self.condition)
    }

    fn children(&self) -> Vec<&dyn Matcher> {
        self.members.children()
    }

    fn uniq_key(&self) -> String {
        format!("Nin:{:#}", self.condition)
    }

    fn matches_with_trace(&self, record: &Value, tracer: &mut Tracer) -> Result<bool, EvalError> {
        tracer.scope(self.title(), record, |tracer| match (&self.members, record) {
            (Members::Range(range), Value::Array(items)) => {
                let results: Vec<_> = items
                    .iter()
                    .map(|item| range.matches_with_trace(item, tracer))
                    .collect();
                crate::trace::fold_all(results)
            }
            (Members::Range(range), _) => range.matches_with_trace(record, tracer),
            (Members::Set(_), _) => self.matches(record),
        })
    }
}

impl IntoMatcher for NinMatcher {
    fn build(condition: Value, ctx: &Arc<Context>) -> Result<Arc<dyn Matcher>, MatcherError> {
        let members = match &condition {
            Value::Range(range) => Members::range(range, ValueRange::to_nin_condition, ctx)?,
            other => Members::Set(Members::set("$nin", other)?),
        };
        Ok(Arc::new(Self {
            condition,
            members,
            proc: ProcCell::default(),
        }))
    }
}
