//! Dispatch on the shape of a condition value.
//!
//! | Condition | Non-array record | Array record |
//! |-----------|------------------|--------------|
//! | map       | [`HashConditionMatcher`] | [`ArrayRecordMatcher`] |
//! | regex     | [`RegexMatcher`] | [`ArrayRecordMatcher`] |
//! | null      | `$exists: false` OR `$eq: null` | [`ArrayRecordMatcher`] |
//! | other     | [`EqMatcher`] | [`ArrayRecordMatcher`] |
//!
//! The array-record form is built on first use and then kept.

use std::fmt;
use std::sync::{Arc, OnceLock};

use super::{ArrayRecordMatcher, EqMatcher, HashConditionMatcher, OrMatcher, RegexMatcher};
use crate::{
    Context, EvalError, IntoMatcher, Map, MatchFn, Matcher, MatcherError, ProcCell, Tracer, Value,
};

/// A condition value matched against a record of any shape.
///
/// Used standalone and embedded in the field, `$not`, and `$size` matchers.
#[derive(Debug)]
pub struct LiteralMatcher {
    condition: Value,
    dispatched: Arc<dyn Matcher>,
    array_record: Arc<LazyArrayRecord>,
    proc: ProcCell,
}

impl LiteralMatcher {
    /// Builds the dispatched matcher now and prepares the array-record form.
    ///
    /// # Errors
    ///
    /// Returns [`MatcherError`] if the dispatched matcher cannot be built.
    pub fn new(condition: Value, ctx: &Arc<Context>) -> Result<Self, MatcherError> {
        let dispatched = dispatch(&condition, ctx)?;
        Ok(Self {
            array_record: Arc::new(LazyArrayRecord::new(condition.clone(), Arc::clone(ctx))),
            condition,
            dispatched,
            proc: ProcCell::default(),
        })
    }

    /// Builds a standalone literal node.
    ///
    /// # Errors
    ///
    /// As [`new`](Self::new).
    pub fn build(condition: Value, ctx: &Arc<Context>) -> Result<Arc<dyn Matcher>, MatcherError> {
        Ok(Arc::new(Self::new(condition, ctx)?))
    }

    /// The condition value.
    #[must_use]
    pub fn condition(&self) -> &Value {
        &self.condition
    }

    pub(crate) fn evaluate(&self, record: &Value) -> Result<bool, EvalError> {
        match record {
            Value::Array(_) => self.array_record.get()?.matches(record),
            _ => self.dispatched.matches(record),
        }
    }

    pub(crate) fn evaluate_with_trace(
        &self,
        record: &Value,
        tracer: &mut Tracer,
    ) -> Result<bool, EvalError> {
        match record {
            Value::Array(_) => self.array_record.get()?.matches_with_trace(record, tracer),
            _ => self.dispatched.matches_with_trace(record, tracer),
        }
    }

    pub(crate) fn evaluate_proc(&self) -> MatchFn {
        self.proc.get_or_build(|| {
            let dispatched = self.dispatched.to_proc();
            let array_record = Arc::clone(&self.array_record);
            Arc::new(move |record: &Value| match record {
                Value::Array(_) => array_record.get()?.to_proc()(record),
                _ => dispatched(record),
            })
        })
    }

    pub(crate) fn literal_children(&self) -> Vec<&dyn Matcher> {
        let mut children: Vec<&dyn Matcher> = vec![self.dispatched.as_ref()];
        if let Some(array_record) = self.array_record.built() {
            children.push(array_record.as_ref());
        }
        children
    }
}

fn dispatch(condition: &Value, ctx: &Arc<Context>) -> Result<Arc<dyn Matcher>, MatcherError> {
    match condition {
        Value::Map(_) => HashConditionMatcher::build(condition.clone(), ctx),
        Value::Regex(_) => RegexMatcher::build(condition.clone(), ctx),
        Value::Null => {
            let absent: Map = [("$exists", false)].into_iter().collect();
            let null: Map = [("$eq", Value::Null)].into_iter().collect();
            OrMatcher::build(Value::Array(vec![absent.into(), null.into()]), ctx)
        }
        _ => EqMatcher::build(condition.clone(), ctx),
    }
}

impl Matcher for LiteralMatcher {
    fn matches(&self, record: &Value) -> Result<bool, EvalError> {
        self.evaluate(record)
    }

    fn to_proc(&self) -> MatchFn {
        self.evaluate_proc()
    }

    fn check_validity(&self) -> Result<(), MatcherError> {
        self.dispatched.check_validity()
    }

    fn title(&self) -> String {
        format!("Literal: {}", self.condition)
    }

    fn children(&self) -> Vec<&dyn Matcher> {
        self.literal_children()
    }

    fn uniq_key(&self) -> String {
        format!("Literal:{:#}", self.condition)
    }

    fn matches_with_trace(&self, record: &Value, tracer: &mut Tracer) -> Result<bool, EvalError> {
        tracer.scope(self.title(), record, |tracer| self.evaluate_with_trace(record, tracer))
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Lazy array-record form
// ═══════════════════════════════════════════════════════════════════════════════

/// The array-record matcher, built on first array record.
///
/// A construction failure is kept and reported on every later array record.
pub(crate) struct LazyArrayRecord {
    condition: Value,
    ctx: Arc<Context>,
    matcher: OnceLock<Result<Arc<dyn Matcher>, MatcherError>>,
}

impl LazyArrayRecord {
    fn new(condition: Value, ctx: Arc<Context>) -> Self {
        Self {
            condition,
            ctx,
            matcher: OnceLock::new(),
        }
    }

    fn get(&self) -> Result<&Arc<dyn Matcher>, EvalError> {
        self.matcher
            .get_or_init(|| ArrayRecordMatcher::build(self.condition.clone(), &self.ctx))
            .as_ref()
            .map_err(|e| EvalError::Construction(e.clone()))
    }

    fn built(&self) -> Option<&Arc<dyn Matcher>> {
        self.matcher.get().and_then(|result| result.as_ref().ok())
    }
}

impl fmt::Debug for LazyArrayRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LazyArrayRecord")
            .field("condition", &self.condition)
            .field("built", &self.matcher.get().is_some())
            .finish()
    }
}
