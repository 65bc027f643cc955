//! Conformance test fixture runner
//!
//! Loads YAML fixtures and runs them against the mongory engine. Every case
//! is checked three ways: safe evaluation, the fast predicate, and a trace.

use mongory::{Engine, MatcherError, QueryMatcher, Value};
use serde::Deserialize;

/// A complete test fixture
#[derive(Debug, Deserialize)]
pub struct Fixture {
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// The condition document, as written by a user.
    pub condition: serde_json::Value,
    #[serde(default)]
    pub cases: Vec<TestCase>,
    /// The condition must fail to compile.
    #[serde(default)]
    pub expect_error: bool,
}

/// Test case
#[derive(Debug, Deserialize)]
pub struct TestCase {
    pub name: String,
    pub record: serde_json::Value,
    pub expect: bool,
}

/// Result of running a single test case
#[derive(Debug)]
pub struct CaseResult {
    pub case_name: String,
    pub passed: bool,
    pub expected: bool,
    /// `QueryMatcher::is_match`
    pub safe: bool,
    /// `FastPredicate::call`
    pub fast: bool,
    /// `Tracer::result`
    pub traced: Option<bool>,
}

impl TestCase {
    fn run(&self, query: &QueryMatcher) -> CaseResult {
        let record = Value::from(self.record.clone());
        let safe = query.is_match(&record);
        let fast = query.to_proc().call(&query.normalize_record(&record));
        let traced = query.trace(&record).result();
        CaseResult {
            case_name: self.name.clone(),
            passed: safe == self.expect && fast == self.expect && traced == Some(self.expect),
            expected: self.expect,
            safe,
            fast,
            traced,
        }
    }
}

impl Fixture {
    /// Parse a fixture from YAML
    pub fn from_yaml(yaml: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(yaml)
    }

    /// Parse multiple fixtures from a YAML file with `---` separators
    pub fn from_yaml_multi(yaml: &str) -> Result<Vec<Self>, serde_yaml::Error> {
        let mut fixtures = Vec::new();
        for doc in serde_yaml::Deserializer::from_str(yaml) {
            fixtures.push(Self::deserialize(doc)?);
        }
        Ok(fixtures)
    }

    /// Compile this fixture's condition.
    pub fn compile(&self, engine: &Engine) -> Result<QueryMatcher, MatcherError> {
        engine.compile(self.condition.clone())
    }

    /// Run all test cases and return results
    pub fn run(&self, engine: &Engine) -> Result<Vec<CaseResult>, MatcherError> {
        let query = self.compile(engine)?;
        Ok(self.cases.iter().map(|case| case.run(&query)).collect())
    }

    /// Run all test cases and panic on first failure
    pub fn run_and_assert(&self, engine: &Engine) {
        if self.expect_error {
            assert!(
                self.compile(engine).is_err(),
                "Fixture '{}' compiled but was expected to fail",
                self.name
            );
            return;
        }
        let results = self
            .run(engine)
            .unwrap_or_else(|e| panic!("Fixture '{}' failed to compile: {e}", self.name));
        for result in results {
            assert!(
                result.passed,
                "Fixture '{}' case '{}' failed: expected {}, got safe={} fast={} traced={:?}",
                self.name, result.case_name, result.expected, result.safe, result.fast, result.traced
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const YAML: &str = r#"
name: adults
condition:
  age: { $gte: 18 }
cases:
  - name: adult
    record: { age: 30 }
    expect: true
  - name: minor
    record: { age: 12 }
    expect: false
---
name: bad regex
condition:
  name: { $regex: 3 }
expect_error: true
"#;

    #[test]
    fn parses_and_runs_multi_document_yaml() {
        let fixtures = Fixture::from_yaml_multi(YAML).unwrap();
        assert_eq!(fixtures.len(), 2);
        assert!(fixtures[1].expect_error);

        let engine = crate::engine();
        let results = fixtures[0].run(&engine).unwrap();
        assert!(results.iter().all(|r| r.passed));
        fixtures[1].run_and_assert(&engine);
    }

    #[test]
    fn failing_case_is_reported() {
        let fixture = Fixture::from_yaml(
            "name: wrong\ncondition: { a: 1 }\ncases:\n  - { name: c, record: { a: 1 }, expect: false }\n",
        )
        .unwrap();
        let results = fixture.run(&crate::engine()).unwrap();
        assert!(!results[0].passed);
        assert!(results[0].safe && results[0].fast);
    }
}
