//! Matching a condition against a record that is itself an array.
//!
//! A map condition is reparsed before it is built:
//!
//! | Key | Goes to |
//! |-----|---------|
//! | `-?\d+` | index access on the array |
//! | `$elemMatch` | merged into the element clause |
//! | any registered operator | the whole array |
//! | anything else | the element clause |
//!
//! The element clause becomes a single `$elemMatch` entry, placed where its
//! first key appeared. Per-element ordering goes through an explicit
//! `$elemMatch`: `{"$elemMatch": {"$gt": 2}}`.

use std::sync::Arc;

use super::field::is_index_key;
use super::{ElemMatchMatcher, EqMatcher, HashConditionMatcher};
use crate::matcher::{any_of, dedup, maybe_unwrap};
use crate::registry::OperatorRegistry;
use crate::trace::fold_any;
use crate::{
    Context, EvalError, IntoMatcher, Map, MatchFn, Matcher, MatcherError, ProcCell, Tracer, Value,
};

/// OR over the ways a condition can hold for an array record.
///
/// - an array condition equal to the whole record
/// - a map condition, reparsed (see the module docs)
/// - any element matching `$eq` (or `$regex` for a pattern)
#[derive(Debug)]
pub struct ArrayRecordMatcher {
    condition: Value,
    children: Vec<Arc<dyn Matcher>>,
    proc: ProcCell,
}

impl ArrayRecordMatcher {
    /// Reparses a map condition for an array record.
    ///
    /// # Errors
    ///
    /// Returns [`MatcherError::InvalidCondition`] if an `$elemMatch` body is
    /// not a map.
    pub fn reparse(condition: &Map, operators: &OperatorRegistry) -> Result<Map, MatcherError> {
        let mut result = Map::with_capacity(condition.len());
        let mut element = Map::new();
        for (key, value) in condition.iter() {
            if is_index_key(key) {
                result.insert(key, value.clone());
                continue;
            }
            if key == "$elemMatch" {
                let body = value
                    .as_map()
                    .ok_or_else(|| MatcherError::invalid("$elemMatch", "a map", value))?;
                element.deep_merge(body.clone());
            } else if operators.contains(key) {
                result.insert(key, value.clone());
                continue;
            } else {
                element.insert(key, value.clone());
            }
            if !result.contains_key("$elemMatch") {
                result.insert("$elemMatch", Value::Null);
            }
        }
        if let Some(slot) = result.get_mut("$elemMatch") {
            *slot = Value::Map(element);
        }
        Ok(result)
    }
}

fn single(operator: &str, condition: Value) -> Value {
    Value::Map([(operator, condition)].into_iter().collect())
}

impl IntoMatcher for ArrayRecordMatcher {
    fn build(condition: Value, ctx: &Arc<Context>) -> Result<Arc<dyn Matcher>, MatcherError> {
        let mut children = Vec::with_capacity(2);
        match &condition {
            Value::Map(map) => {
                let reparsed = Self::reparse(map, ctx.operators())?;
                children.push(HashConditionMatcher::build(Value::Map(reparsed), ctx)?);
            }
            Value::Regex(_) => {
                children.push(ElemMatchMatcher::build(single("$regex", condition.clone()), ctx)?);
            }
            Value::Array(_) => {
                children.push(EqMatcher::build(condition.clone(), ctx)?);
                children.push(ElemMatchMatcher::build(single("$eq", condition.clone()), ctx)?);
            }
            _ => {
                children.push(ElemMatchMatcher::build(single("$eq", condition.clone()), ctx)?);
            }
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

impl Matcher for ArrayRecordMatcher {
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

    fn title(&self) -> String {
        format!("ArrayRecord: {}", self.condition)
    }

    fn children(&self) -> Vec<&dyn Matcher> {
        self.children.iter().map(|c| c.as_ref()).collect()
    }

    fn uniq_key(&self) -> String {
        format!("ArrayRecord:{:#}", self.condition)
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

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::matchers::test_context;

    fn reparse(condition: serde_json::Value) -> serde_json::Value {
        let ctx = test_context();
        let condition = Value::from(condition);
        let map = condition.as_map().unwrap();
        Value::Map(ArrayRecordMatcher::reparse(map, ctx.operators()).unwrap()).to_json()
    }

    fn build(condition: serde_json::Value) -> Arc<dyn Matcher> {
        ArrayRecordMatcher::build(condition.into(), &test_context()).unwrap()
    }

    #[test]
    fn reparse_classifies_keys() {
        assert_eq!(
            reparse(json!({"0": "a", "name": "x", "$size": 2, "age": 3})),
            json!({"0": "a", "$elemMatch": {"name": "x", "age": 3}, "$size": 2})
        );
    }

    #[test]
    fn reparse_merges_explicit_elem_match() {
        assert_eq!(
            reparse(json!({"$elemMatch": {"a": 1}, "b": 2})),
            json!({"$elemMatch": {"a": 1, "b": 2}})
        );
    }

    #[test]
    fn reparse_keeps_every_registered_operator_on_the_array() {
        assert_eq!(
            reparse(json!({"$gt": 1, "$in": [5], "name": "x", "$regex": "^a"})),
            json!({"$gt": 1, "$in": [5], "$elemMatch": {"name": "x"}, "$regex": "^a"})
        );
    }

    #[test]
    fn reparse_leaves_unregistered_dollar_keys_to_elements() {
        assert_eq!(reparse(json!({"$foo": 1})), json!({"$elemMatch": {"$foo": 1}}));
    }

    #[test]
    fn reparse_rejects_non_map_elem_match() {
        let ctx = test_context();
        let condition = Value::from(json!({"$elemMatch": 1}));
        let err = ArrayRecordMatcher::reparse(condition.as_map().unwrap(), ctx.operators());
        assert!(err.is_err());
    }

    #[test]
    fn scalar_condition_matches_any_element() {
        let matcher = build(json!("x"));
        assert_eq!(matcher.matches(&Value::from(json!(["x", "y"]))), Ok(true));
        assert_eq!(matcher.matches(&Value::from(json!(["y", "z"]))), Ok(false));
    }

    #[test]
    fn array_condition_matches_whole_or_nested() {
        let matcher = build(json!([1, 2]));
        assert!(matcher.title().starts_with("ArrayRecord:"));
        assert_eq!(matcher.children().len(), 2);
        assert_eq!(matcher.matches(&Value::from(json!([1, 2]))), Ok(true));
        assert_eq!(matcher.matches(&Value::from(json!([[1, 2]]))), Ok(true));
        assert_eq!(matcher.matches(&Value::from(json!([1]))), Ok(false));
    }

    #[test]
    fn map_condition_mixes_index_and_element_access() {
        let matcher = build(json!({"0": {"$gt": 0}, "name": "b"}));
        let record = Value::from(json!([1, {"name": "b"}]));
        assert_eq!(matcher.matches(&record), Ok(true));
        let record = Value::from(json!([0, {"name": "b"}]));
        assert_eq!(matcher.matches(&record), Ok(false));
    }

    #[test]
    fn operators_read_the_array_consistently() {
        let record = Value::from(json!([1, 10]));
        assert_eq!(build(json!({"$gt": 5})).matches(&record), Ok(false));
        assert_eq!(build(json!({"$eq": 10})).matches(&record), Ok(false));
        assert_eq!(build(json!({"$ne": 10})).matches(&record), Ok(true));
        assert_eq!(build(json!({"$regex": "^1"})).matches(&record), Ok(false));
        assert_eq!(build(json!({"$elemMatch": {"$gt": 5}})).matches(&record), Ok(true));
    }

    #[test]
    fn whole_array_operators_stay_on_the_array() {
        let matcher = build(json!({"$size": 2}));
        assert_eq!(matcher.matches(&Value::from(json!([7, 7]))), Ok(true));
        assert_eq!(matcher.matches(&Value::from(json!([2]))), Ok(false));
    }

    #[test]
    fn regex_condition_matches_string_elements() {
        let pattern = Value::Regex(crate::Pattern::new("^J").unwrap());
        let matcher = ArrayRecordMatcher::build(pattern, &test_context()).unwrap();
        assert_eq!(matcher.matches(&Value::from(json!(["Ann", "Jane"]))), Ok(true));
    }
}
