//! `$eq`, `$ne`, `$gt`, `$gte`, `$lt`, `$lte`.
//!
//! All six read a missing field as null. Ordering operators use
//! [`Value::compare`]; an incomparable pair never matches.

use std::cmp::Ordering;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use crate::{Context, EvalError, IntoMatcher, MatchFn, Matcher, MatcherError, ProcCell, Value};

/// A comparison between a record and the operator's argument.
pub trait Comparison: Send + Sync + 'static {
    /// Node name used in titles and unique keys.
    const NAME: &'static str;

    /// Returns `true` if `record` satisfies the comparison against `condition`.
    fn test(record: &Value, condition: &Value) -> bool;
}

/// `$eq`
#[derive(Debug)]
pub struct Equal;

/// `$ne`
#[derive(Debug)]
pub struct NotEqual;

/// `$gt`
#[derive(Debug)]
pub struct GreaterThan;

/// `$gte`
#[derive(Debug)]
pub struct GreaterOrEqual;

/// `$lt`
#[derive(Debug)]
pub struct LessThan;

/// `$lte`
#[derive(Debug)]
pub struct LessOrEqual;

impl Comparison for Equal {
    const NAME: &'static str = "Eq";

    fn test(record: &Value, condition: &Value) -> bool {
        record == condition
    }
}

impl Comparison for NotEqual {
    const NAME: &'static str = "Ne";

    fn test(record: &Value, condition: &Value) -> bool {
        record != condition
    }
}

impl Comparison for GreaterThan {
    const NAME: &'static str = "Gt";

    fn test(record: &Value, condition: &Value) -> bool {
        record.compare(condition) == Some(Ordering::Greater)
    }
}

impl Comparison for GreaterOrEqual {
    const NAME: &'static str = "Gte";

    fn test(record: &Value, condition: &Value) -> bool {
        matches!(
            record.compare(condition),
            Some(Ordering::Greater | Ordering::Equal)
        )
    }
}

impl Comparison for LessThan {
    const NAME: &'static str = "Lt";

    fn test(record: &Value, condition: &Value) -> bool {
        record.compare(condition) == Some(Ordering::Less)
    }
}

impl Comparison for LessOrEqual {
    const NAME: &'static str = "Lte";

    fn test(record: &Value, condition: &Value) -> bool {
        matches!(
            record.compare(condition),
            Some(Ordering::Less | Ordering::Equal)
        )
    }
}

/// Leaf matcher comparing the record against a fixed value.
pub struct CompareMatcher<C> {
    condition: Value,
    proc: ProcCell,
    _comparison: PhantomData<fn() -> C>,
}

/// `$eq`
pub type EqMatcher = CompareMatcher<Equal>;
/// `$ne`
pub type NeMatcher = CompareMatcher<NotEqual>;
/// `$gt`
pub type GtMatcher = CompareMatcher<GreaterThan>;
/// `$gte`
pub type GteMatcher = CompareMatcher<GreaterOrEqual>;
/// `$lt`
pub type LtMatcher = CompareMatcher<LessThan>;
/// `$lte`
pub type LteMatcher = CompareMatcher<LessOrEqual>;

impl<C: Comparison> CompareMatcher<C> {
    /// Creates the matcher. Any value is a valid argument.
    #[must_use]
    pub fn new(condition: Value) -> Self {
        Self {
            condition,
            proc: ProcCell::default(),
            _comparison: PhantomData,
        }
    }

    /// The comparison argument.
    #[must_use]
    pub fn condition(&self) -> &Value {
        &self.condition
    }
}

impl<C: Comparison> Matcher for CompareMatcher<C> {
    fn matches(&self, record: &Value) -> Result<bool, EvalError> {
        Ok(C::test(record.normalized(), &self.condition))
    }

    fn to_proc(&self) -> MatchFn {
        self.proc.get_or_build(|| {
            let condition = self.condition.clone();
            Arc::new(move |record: &Value| Ok(C::test(record.normalized(), &condition)))
        })
    }

    fn title(&self) -> String {
        format!("{}: {}", C::NAME, self.condition)
    }

    fn uniq_key(&self) -> String {
        format!("{}:{:#}", C::NAME, self.condition)
    }
}

impl<C: Comparison> IntoMatcher for CompareMatcher<C> {
    fn build(condition: Value, _ctx: &Arc<Context>) -> Result<Arc<dyn Matcher>, MatcherError> {
        Ok(Arc::new(Self::new(condition)))
    }
}

impl<C: Comparison> fmt::Debug for CompareMatcher<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct(C::NAME)
            .field("condition", &self.condition)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn eq_treats_missing_as_null() {
        let eq_null = EqMatcher::new(Value::Null);
        assert_eq!(eq_null.matches(&Value::Missing), Ok(true));
        assert_eq!(eq_null.matches(&Value::Null), Ok(true));
        assert_eq!(eq_null.matches(&Value::Int(0)), Ok(false));
    }

    #[test]
    fn ne_is_inverse_of_eq() {
        let ne = NeMatcher::new(Value::from("a"));
        assert_eq!(ne.matches(&Value::from("a")), Ok(false));
        assert_eq!(ne.matches(&Value::from("b")), Ok(true));
        assert_eq!(ne.matches(&Value::Missing), Ok(true));
    }

    #[test]
    fn ordering_across_numeric_types() {
        let gt = GtMatcher::new(Value::Int(18));
        assert_eq!(gt.matches(&Value::Float(18.5)), Ok(true));
        assert_eq!(gt.matches(&Value::Int(18)), Ok(false));

        let gte = GteMatcher::new(Value::Float(18.0));
        assert_eq!(gte.matches(&Value::Int(18)), Ok(true));
    }

    #[test]
    fn incomparable_never_matches() {
        for matcher in [
            Box::new(GtMatcher::new(Value::Int(1))) as Box<dyn Matcher>,
            Box::new(GteMatcher::new(Value::Int(1))),
            Box::new(LtMatcher::new(Value::Int(1))),
            Box::new(LteMatcher::new(Value::Int(1))),
        ] {
            assert_eq!(matcher.matches(&Value::from("1")), Ok(false));
            assert_eq!(matcher.matches(&Value::Missing), Ok(false));
            assert_eq!(matcher.matches(&Value::Null), Ok(false));
        }
    }

    #[test]
    fn strings_order_lexicographically() {
        let lt = LtMatcher::new(Value::from("m"));
        assert_eq!(lt.matches(&Value::from("apple")), Ok(true));
        assert_eq!(lt.matches(&Value::from("zebra")), Ok(false));
        let lte = LteMatcher::new(Value::from("m"));
        assert_eq!(lte.matches(&Value::from("m")), Ok(true));
    }

    #[test]
    fn proc_agrees_with_matches() {
        let gte = GteMatcher::new(Value::Int(3));
        let proc = gte.to_proc();
        for record in [Value::Int(2), Value::Int(3), Value::Float(3.5), Value::Missing] {
            assert_eq!(proc(&record), gte.matches(&record));
        }
    }

    #[test]
    fn titles_and_keys() {
        let gt = GtMatcher::new(Value::Int(18));
        assert_eq!(gt.title(), "Gt: 18");
        assert_eq!(gt.uniq_key(), "Gt:18");
        assert_ne!(gt.uniq_key(), GteMatcher::new(Value::Int(18)).uniq_key());
    }
}
