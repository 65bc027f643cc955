//! `$elemMatch` and `$every`: a hash condition applied to each element.

use std::borrow::Cow;
use std::sync::Arc;

use super::HashConditionMatcher;
use crate::trace::{fold_all, fold_any};
use crate::{
    Context, EvalError, IntoMatcher, MatchFn, Matcher, MatcherError, ProcCell, Tracer, Value,
};

/// The per-element matcher plus what it needs to normalize elements.
#[derive(Debug)]
struct ElementCondition {
    condition: Value,
    inner: Arc<dyn Matcher>,
    ctx: Arc<Context>,
}

impl ElementCondition {
    fn build(operator: &str, condition: Value, ctx: &Arc<Context>) -> Result<Self, MatcherError> {
        check_map(operator, &condition)?;
        Ok(Self {
            inner: HashConditionMatcher::build(condition.clone(), ctx)?,
            condition,
            ctx: Arc::clone(ctx),
        })
    }

    fn check(&self, operator: &str) -> Result<(), MatcherError> {
        check_map(operator, &self.condition)?;
        self.inner.check_validity()
    }
}

fn check_map(operator: &str, condition: &Value) -> Result<(), MatcherError> {
    if condition.is_map() {
        Ok(())
    } else {
        Err(MatcherError::invalid(operator, "a map", condition))
    }
}

fn element<'a>(ctx: &Context, item: &'a Value) -> Cow<'a, Value> {
    if ctx.need_convert() {
        ctx.normalizer().normalize_shallow(Cow::Borrowed(item))
    } else {
        Cow::Borrowed(item)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// $elemMatch
// ═══════════════════════════════════════════════════════════════════════════════

/// `$elemMatch`: some element of an array record matches.
///
/// Records that are not arrays never match.
#[derive(Debug)]
pub struct ElemMatchMatcher {
    elements: ElementCondition,
    proc: ProcCell,
}

impl Matcher for ElemMatchMatcher {
    fn matches(&self, record: &Value) -> Result<bool, EvalError> {
        let Some(items) = record.as_array() else {
            return Ok(false);
        };
        for item in items {
            if self.elements.inner.matches(&element(&self.elements.ctx, item))? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    fn to_proc(&self) -> MatchFn {
        self.proc.get_or_build(|| {
            let inner = self.elements.inner.to_proc();
            let ctx = Arc::clone(&self.elements.ctx);
            Arc::new(move |record: &Value| {
                let Some(items) = record.as_array() else {
                    return Ok(false);
                };
                for item in items {
                    if inner(&element(&ctx, item))? {
                        return Ok(true);
                    }
                }
                Ok(false)
            })
        })
    }

    fn check_validity(&self) -> Result<(), MatcherError> {
        self.elements.check("$elemMatch")
    }

    fn title(&self) -> String {
        format!("ElemMatch: {}", self.elements.condition)
    }

    fn children(&self) -> Vec<&dyn Matcher> {
        vec![self.elements.inner.as_ref()]
    }

    fn uniq_key(&self) -> String {
        format!("ElemMatch:{:#}", self.elements.condition)
    }

    fn matches_with_trace(&self, record: &Value, tracer: &mut Tracer) -> Result<bool, EvalError> {
        tracer.scope(self.title(), record, |tracer| {
            let Some(items) = record.as_array() else {
                return Ok(false);
            };
            let results: Vec<_> = items
                .iter()
                .map(|item| {
                    let item = element(&self.elements.ctx, item);
                    self.elements.inner.matches_with_trace(&item, tracer)
                })
                .collect();
            fold_any(results)
        })
    }
}

impl IntoMatcher for ElemMatchMatcher {
    fn build(condition: Value, ctx: &Arc<Context>) -> Result<Arc<dyn Matcher>, MatcherError> {
        Ok(Arc::new(Self {
            elements: ElementCondition::build("$elemMatch", condition, ctx)?,
            proc: ProcCell::default(),
        }))
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// $every
// ═══════════════════════════════════════════════════════════════════════════════

/// `$every`: every element of a non-empty array record matches.
///
/// An empty array does not match.
#[derive(Debug)]
pub struct EveryMatcher {
    elements: ElementCondition,
    proc: ProcCell,
}

impl Matcher for EveryMatcher {
    fn matches(&self, record: &Value) -> Result<bool, EvalError> {
        let items = match record.as_array() {
            Some(items) if !items.is_empty() => items,
            _ => return Ok(false),
        };
        for item in items {
            if !self.elements.inner.matches(&element(&self.elements.ctx, item))? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    fn to_proc(&self) -> MatchFn {
        self.proc.get_or_build(|| {
            let inner = self.elements.inner.to_proc();
            let ctx = Arc::clone(&self.elements.ctx);
            Arc::new(move |record: &Value| {
                let items = match record.as_array() {
                    Some(items) if !items.is_empty() => items,
                    _ => return Ok(false),
                };
                for item in items {
                    if !inner(&element(&ctx, item))? {
                        return Ok(false);
                    }
                }
                Ok(true)
            })
        })
    }

    fn check_validity(&self) -> Result<(), MatcherError> {
        self.elements.check("$every")
    }

    fn title(&self) -> String {
        format!("Every: {}", self.elements.condition)
    }

    fn children(&self) -> Vec<&dyn Matcher> {
        vec![self.elements.inner.as_ref()]
    }

    fn uniq_key(&self) -> String {
        format!("Every:{:#}", self.elements.condition)
    }

    fn matches_with_trace(&self, record: &Value, tracer: &mut Tracer) -> Result<bool, EvalError> {
        tracer.scope(self.title(), record, |tracer| {
            let items = match record.as_array() {
                Some(items) if !items.is_empty() => items,
                _ => return Ok(false),
            };
            let results: Vec<_> = items
                .iter()
                .map(|item| {
                    let item = element(&self.elements.ctx, item);
                    self.elements.inner.matches_with_trace(&item, tracer)
                })
                .collect();
            fold_all(results)
        })
    }
}

impl IntoMatcher for EveryMatcher {
    fn build(condition: Value, ctx: &Arc<Context>) -> Result<Arc<dyn Matcher>, MatcherError> {
        Ok(Arc::new(Self {
            elements: ElementCondition::build("$every", condition, ctx)?,
            proc: ProcCell::default(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::matchers::test_context;

    fn elem_match(condition: serde_json::Value) -> Arc<dyn Matcher> {
        ElemMatchMatcher::build(condition.into(), &test_context()).unwrap()
    }

    fn every(condition: serde_json::Value) -> Arc<dyn Matcher> {
        EveryMatcher::build(condition.into(), &test_context()).unwrap()
    }

    #[test]
    fn elem_match_needs_one_element() {
        let matcher = elem_match(json!({"status": "active"}));
        let record = Value::from(json!([{"status": "inactive"}, {"status": "active"}]));
        assert_eq!(matcher.matches(&record), Ok(true));
        let record = Value::from(json!([{"status": "inactive"}]));
        assert_eq!(matcher.matches(&record), Ok(false));
        assert_eq!(matcher.matches(&Value::from(json!([]))), Ok(false));
    }

    #[test]
    fn elem_match_operators_apply_to_scalars() {
        let matcher = elem_match(json!({"$gt": 5, "$lt": 10}));
        assert_eq!(matcher.matches(&Value::from(json!([1, 7]))), Ok(true));
        // no single element satisfies both bounds
        assert_eq!(matcher.matches(&Value::from(json!([1, 12]))), Ok(false));
    }

    #[test]
    fn every_on_empty_array_is_false() {
        let matcher = every(json!({"status": "active"}));
        assert_eq!(matcher.matches(&Value::from(json!([]))), Ok(false));
        assert_eq!(matcher.matches(&Value::from(json!([{"status": "active"}]))), Ok(true));
        let mixed = Value::from(json!([{"status": "active"}, {"status": "inactive"}]));
        assert_eq!(matcher.matches(&mixed), Ok(false));
    }

    #[test]
    fn non_array_records_never_match() {
        for matcher in [elem_match(json!({})), every(json!({}))] {
            assert_eq!(matcher.matches(&Value::from(json!({"a": 1}))), Ok(false));
            assert_eq!(matcher.matches(&Value::Missing), Ok(false));
        }
    }

    #[test]
    fn condition_must_be_a_map() {
        let ctx = test_context();
        let err = ElemMatchMatcher::build(Value::Int(1), &ctx).unwrap_err();
        assert_eq!(err.to_string(), "$elemMatch needs a map, got int");
        assert!(EveryMatcher::build(Value::from(json!([1])), &ctx).is_err());
    }

    #[test]
    fn proc_and_trace_agree_with_matches() {
        let matcher = every(json!({"n": {"$gte": 2}}));
        let proc = matcher.to_proc();
        for record in [json!([{"n": 2}, {"n": 3}]), json!([{"n": 1}, {"n": 3}]), json!([])] {
            let record = Value::from(record);
            let mut tracer = Tracer::new();
            assert_eq!(proc(&record), matcher.matches(&record));
            assert_eq!(matcher.matches_with_trace(&record, &mut tracer), matcher.matches(&record));
        }
    }

    #[test]
    fn validity_recurses_into_the_element_condition() {
        let ctx = test_context();
        let matcher = EveryMatcher::build(Value::from(json!({"$or": [{"a": 1}]})), &ctx).unwrap();
        assert_eq!(matcher.check_validity(), Ok(()));
        assert!(check_map("$elemMatch", &Value::Int(1)).is_err());
    }
}
