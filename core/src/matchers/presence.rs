//! `$exists` and `$present`.

use std::sync::Arc;

use crate::{Context, EvalError, IntoMatcher, MatchFn, Matcher, MatcherError, ProcCell, Value};

fn expect_bool(operator: &str, condition: &Value) -> Result<bool, MatcherError> {
    condition
        .as_bool()
        .ok_or_else(|| MatcherError::invalid(operator, "a boolean", condition))
}

/// `$exists`: whether the field is there at all.
///
/// Only [`Value::Missing`] counts as absent; an explicit null exists.
#[derive(Debug)]
pub struct ExistsMatcher {
    expected: bool,
    proc: ProcCell,
}

impl Matcher for ExistsMatcher {
    fn matches(&self, record: &Value) -> Result<bool, EvalError> {
        Ok(!record.is_missing() == self.expected)
    }

    fn to_proc(&self) -> MatchFn {
        let expected = self.expected;
        self.proc
            .get_or_build(|| Arc::new(move |record: &Value| Ok(!record.is_missing() == expected)))
    }

    fn title(&self) -> String {
        format!("Exists: {}", self.expected)
    }

    fn uniq_key(&self) -> String {
        format!("Exists:{}", self.expected)
    }
}

impl IntoMatcher for ExistsMatcher {
    fn build(condition: Value, _ctx: &Arc<Context>) -> Result<Arc<dyn Matcher>, MatcherError> {
        Ok(Arc::new(Self {
            expected: expect_bool("$exists", &condition)?,
            proc: ProcCell::default(),
        }))
    }
}

/// `$present`: whether the value carries content.
///
/// Missing, null, `false`, and empty strings, arrays and maps are not
/// present. See [`Value::is_present`].
#[derive(Debug)]
pub struct PresentMatcher {
    expected: bool,
    proc: ProcCell,
}

impl Matcher for PresentMatcher {
    fn matches(&self, record: &Value) -> Result<bool, EvalError> {
        Ok(record.is_present() == self.expected)
    }

    fn to_proc(&self) -> MatchFn {
        let expected = self.expected;
        self.proc
            .get_or_build(|| Arc::new(move |record: &Value| Ok(record.is_present() == expected)))
    }

    fn title(&self) -> String {
        format!("Present: {}", self.expected)
    }

    fn uniq_key(&self) -> String {
        format!("Present:{}", self.expected)
    }
}

impl IntoMatcher for PresentMatcher {
    fn build(condition: Value, _ctx: &Arc<Context>) -> Result<Arc<dyn Matcher>, MatcherError> {
        Ok(Arc::new(Self {
            expected: expect_bool("$present", &condition)?,
            proc: ProcCell::default(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::matchers::test_context;

    #[test]
    fn exists_distinguishes_missing_from_null() {
        let ctx = test_context();
        let exists = ExistsMatcher::build(Value::Bool(true), &ctx).unwrap();
        assert_eq!(exists.matches(&Value::Null), Ok(true));
        assert_eq!(exists.matches(&Value::Missing), Ok(false));

        let absent = ExistsMatcher::build(Value::Bool(false), &ctx).unwrap();
        assert_eq!(absent.matches(&Value::Missing), Ok(true));
        assert_eq!(absent.matches(&Value::Int(0)), Ok(false));
    }

    #[test]
    fn present_checks_content() {
        let present = PresentMatcher::build(Value::Bool(true), &test_context()).unwrap();
        for blank in [json!(null), json!(false), json!(""), json!([]), json!({})] {
            assert_eq!(present.matches(&Value::from(blank)), Ok(false));
        }
        assert_eq!(present.matches(&Value::Missing), Ok(false));
        for filled in [json!(0), json!(true), json!("x"), json!([null]), json!({"a": 1})] {
            assert_eq!(present.matches(&Value::from(filled)), Ok(true));
        }
    }

    #[test]
    fn non_boolean_argument_rejected() {
        let ctx = test_context();
        let err = ExistsMatcher::build(Value::Int(1), &ctx).unwrap_err();
        assert_eq!(err.to_string(), "$exists needs a boolean, got int");
        assert!(PresentMatcher::build(Value::from("yes"), &ctx).is_err());
    }
}
