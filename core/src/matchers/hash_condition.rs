//! A condition map: every key must match.

use std::sync::Arc;

use super::FieldMatcher;
use crate::matcher::{all_of, dedup, maybe_unwrap};
use crate::trace::fold_all;
use crate::{Context, EvalError, Map, MatchFn, Matcher, MatcherError, ProcCell, Tracer, Value};

/// AND over the entries of a condition map.
///
/// Each key is either a registered operator (built from the registry) or a
/// field name (built as a [`FieldMatcher`]). An empty map matches every
/// record; a single entry is unwrapped to its child.
#[derive(Debug)]
pub struct HashConditionMatcher {
    condition: Value,
    children: Vec<Arc<dyn Matcher>>,
    proc: ProcCell,
}

impl HashConditionMatcher {
    /// Builds the matcher, unwrapping a single child.
    ///
    /// # Errors
    ///
    /// Returns [`MatcherError::InvalidCondition`] if `condition` is not a
    /// map, or any error raised by a child.
    pub fn build(condition: Value, ctx: &Arc<Context>) -> Result<Arc<dyn Matcher>, MatcherError> {
        let children = Self::sub_matchers(&condition, ctx)?;
        Ok(maybe_unwrap(children, |children| {
            Arc::new(Self {
                condition,
                children,
                proc: ProcCell::default(),
            })
        }))
    }

    /// Builds one child per key, deduplicated, in key order.
    ///
    /// # Errors
    ///
    /// As [`build`](Self::build).
    pub fn sub_matchers(
        condition: &Value,
        ctx: &Arc<Context>,
    ) -> Result<Vec<Arc<dyn Matcher>>, MatcherError> {
        let map = validate(condition)?;
        let children = map
            .iter()
            .map(|(key, value)| match ctx.operators().lookup(key) {
                Some(entry) => entry.build(value.clone(), ctx),
                None => FieldMatcher::build(key, value.clone(), ctx),
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(dedup(children))
    }
}

fn validate(condition: &Value) -> Result<&Map, MatcherError> {
    condition
        .as_map()
        .ok_or_else(|| MatcherError::invalid("condition", "a map", condition))
}

impl Matcher for HashConditionMatcher {
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
        validate(&self.condition)?;
        self.children.iter().try_for_each(|c| c.check_validity())
    }

    fn title(&self) -> String {
        format!("HashCondition: {}", self.condition)
    }

    fn children(&self) -> Vec<&dyn Matcher> {
        self.children.iter().map(|c| c.as_ref()).collect()
    }

    fn uniq_key(&self) -> String {
        format!("HashCondition:{:#}", self.condition)
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
