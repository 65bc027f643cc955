//! `$and` and `$or`.

use std::sync::Arc;

use super::HashConditionMatcher;
use crate::matcher::{all_of, any_of, dedup, maybe_unwrap};
use crate::trace::{fold_all, fold_any};
use crate::{
    Context, EvalError, IntoMatcher, MatchFn, Matcher, MatcherError, ProcCell, Tracer, Value,
};

fn validate_branches<'a>(operator: &str, condition: &'a Value) -> Result<&'a [Value], MatcherError> {
    let branches = condition
        .as_array()
        .ok_or_else(|| MatcherError::invalid(operator, "an array of maps", condition))?;
    if let Some(bad) = branches.iter().find(|b| !b.is_map()) {
        return Err(MatcherError::invalid(operator, "an array of maps", bad));
    }
    Ok(branches)
}

// ═══════════════════════════════════════════════════════════════════════════════
// $and
// ═══════════════════════════════════════════════════════════════════════════════

/// `$and`: every branch must match.
///
/// The branches' entries are flattened into one list of children, so
/// `{"$and": [{"a": 1}, {"b": 2}]}` evaluates like `{"a": 1, "b": 2}`.
/// An empty `$and` matches every record.
#[derive(Debug)]
pub struct AndMatcher {
    condition: Value,
    children: Vec<Arc<dyn Matcher>>,
    proc: ProcCell,
}

impl Matcher for AndMatcher {
    fn matches(&self, record: &Value) -> Result<bool, EvalError> {
        for child in &self.children {
            if !child.matches(record)? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    fn to_proc(&self) -> MatchFn {
        self.proc
            .get_or_build(|| all_of(self.children.iter().map(|c| c.to_proc()).collect()))
    }

    fn check_validity(&self) -> Result<(), MatcherError> {
        validate_branches("$and", &self.condition).map(|_| ())
    }

    fn title(&self) -> String {
        format!("And: {}", self.condition)
    }

    fn children(&self) -> Vec<&dyn Matcher> {
        self.children.iter().map(|c| c.as_ref()).collect()
    }

    fn uniq_key(&self) -> String {
        format!("And:{:#}", self.condition)
    }

    fn matches_with_trace(&self, record: &Value, tracer: &mut Tracer) -> Result<bool, EvalError> {
        tracer.scope(self.title(), record, |tracer| {
            let results: Vec<_> = self
                .children
                .iter()
                .map(|c| c.matches_with_trace(record, tracer))
                .collect();
            fold_all(results)
        })
    }
}

impl IntoMatcher for AndMatcher {
    fn build(condition: Value, ctx: &Arc<Context>) -> Result<Arc<dyn Matcher>, MatcherError> {
        let mut children = Vec::new();
        for branch in validate_branches("$and", &condition)? {
            children.extend(HashConditionMatcher::sub_matchers(branch, ctx)?);
        }
        Ok(maybe_unwrap(dedup(children), |children| {
            Arc::new(Self {
                condition,
                children,
                proc: ProcCell::default(),
            })
        }))
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// $or
// ═══════════════════════════════════════════════════════════════════════════════

/// `$or`: at least one branch must match.
///
/// An empty `$or` matches no record.
#[derive(Debug)]
pub struct OrMatcher {
    condition: Value,
    children: Vec<Arc<dyn Matcher>>,
    proc: ProcCell,
}

impl Matcher for OrMatcher {
    fn matches(&self, record: &Value) -> Result<bool, EvalError> {
        for child in &self.children {
            if child.matches(record)? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    fn to_proc(&self) -> MatchFn {
        self.proc
            .get_or_build(|| any_of(self.children.iter().map(|c| c.to_proc()).collect()))
    }

    fn check_validity(&self) -> Result<(), MatcherError> {
        validate_branches("$or", &self.condition).map(|_| ())
    }

    fn title(&self) -> String {
        format!("Or: {}", self.condition)
    }

    fn children(&self) -> Vec<&dyn Matcher> {
        self.children.iter().map(|c| c.as_ref()).collect()
    }

    fn uniq_key(&self) -> String {
        format!("Or:{:#}", self.condition)
    }

    fn matches_with_trace(&self, record: &Value, tracer: &mut Tracer) -> Result<bool, EvalError> {
        tracer.scope(self.title(), record, |tracer| {
            let results: Vec<_> = self
                .children
                .iter()
                .map(|c| c.matches_with_trace(record, tracer))
                .collect();
            fold_any(results)
        })
    }
}

impl IntoMatcher for OrMatcher {
    fn build(condition: Value, ctx: &Arc<Context>) -> Result<Arc<dyn Matcher>, MatcherError> {
        let children = validate_branches("$or", &condition)?
            .iter()
            .map(|branch| HashConditionMatcher::build(branch.clone(), ctx))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(maybe_unwrap(dedup(children), |children| {
            Arc::new(Self {
                condition,
                children,
                proc: ProcCell::default(),
            })
        }))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::matchers::test_context;

    fn and(condition: serde_json::Value) -> Arc<dyn Matcher> {
        AndMatcher::build(condition.into(), &test_context()).unwrap()
    }

    fn or(condition: serde_json::Value) -> Arc<dyn Matcher> {
        OrMatcher::build(condition.into(), &test_context()).unwrap()
    }

    #[test]
    fn empty_and_matches_everything() {
        let matcher = and(json!([]));
        assert_eq!(matcher.matches(&Value::Null), Ok(true));
        assert_eq!(matcher.matches(&Value::from(json!({"x": 1}))), Ok(true));
    }

    #[test]
    fn empty_or_matches_nothing() {
        let matcher = or(json!([]));
        assert_eq!(matcher.matches(&Value::Null), Ok(false));
        assert_eq!(matcher.matches(&Value::from(json!({"x": 1}))), Ok(false));
    }

    #[test]
    fn and_flattens_branches() {
        let matcher = and(json!([{"a": 1, "b": 2}, {"c": 3}]));
        assert_eq!(matcher.children().len(), 3);
        assert_eq!(matcher.matches(&Value::from(json!({"a": 1, "b": 2, "c": 3}))), Ok(true));
        assert_eq!(matcher.matches(&Value::from(json!({"a": 1, "b": 2, "c": 4}))), Ok(false));
    }

    #[test]
    fn duplicate_branches_collapse() {
        let matcher = and(json!([{"a": 1}, {"a": 1}]));
        assert!(matcher.title().starts_with("Field:"));

        let matcher = or(json!([{"a": 1}, {"a": 1}]));
        assert!(matcher.title().starts_with("Field:"));
    }

    #[test]
    fn or_matches_any_branch() {
        let matcher = or(json!([{"a": 1}, {"b": 2}]));
        assert_eq!(matcher.matches(&Value::from(json!({"b": 2}))), Ok(true));
        assert_eq!(matcher.matches(&Value::from(json!({"a": 2, "b": 1}))), Ok(false));
    }

    #[test]
    fn branches_must_be_maps() {
        let ctx = test_context();
        assert!(AndMatcher::build(Value::from(json!({"a": 1})), &ctx).is_err());
        assert!(OrMatcher::build(Value::from(json!([1])), &ctx).is_err());
    }
}
