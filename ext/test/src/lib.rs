//! mongory-test: Test domain for conformance testing
//!
//! Provides an extension operator, custom record types, and the YAML fixture
//! runner. This is the reference extension that demonstrates how to extend
//! mongory from outside the core crate.
//!
//! # Example
//!
//! ```
//! use mongory_test::prelude::*;
//! use serde_json::json;
//!
//! // `$mod: [divisor, remainder]` is registered by `register`
//! let engine = mongory_test::engine();
//! let query = engine.compile(json!({"n": {"$mod": [3, 1]}})).unwrap();
//! assert!(query.is_match(&Value::from(json!({"n": 7}))));
//!
//! // Point exposes fields to the Field matcher
//! let mut record = Map::new();
//! record.insert("at", Point::new(1, 2));
//! let query = engine.compile(json!({"at.x": 1})).unwrap();
//! assert!(query.is_match(&Value::Map(record)));
//! ```

use std::any::Any;
use std::sync::Arc;

use mongory::prelude::*;
use mongory::{Context, MatchFn, ProcCell};

#[cfg(feature = "fixtures")]
pub mod fixture;

// ═══════════════════════════════════════════════════════════════════════════════
// $mod
// ═══════════════════════════════════════════════════════════════════════════════

/// `{"$mod": [divisor, remainder]}`: integer records with the given remainder.
///
/// Non-integer records never match.
#[derive(Debug)]
pub struct ModMatcher {
    divisor: i64,
    remainder: i64,
    proc: ProcCell,
}

impl ModMatcher {
    fn test(record: &Value, divisor: i64, remainder: i64) -> bool {
        record
            .as_i64()
            .is_some_and(|n| n.rem_euclid(divisor) == remainder)
    }
}

impl Matcher for ModMatcher {
    fn matches(&self, record: &Value) -> Result<bool, EvalError> {
        Ok(Self::test(record, self.divisor, self.remainder))
    }

    fn to_proc(&self) -> MatchFn {
        let (divisor, remainder) = (self.divisor, self.remainder);
        self.proc
            .get_or_build(|| Arc::new(move |record: &Value| Ok(Self::test(record, divisor, remainder))))
    }

    fn title(&self) -> String {
        format!("Mod: [{}, {}]", self.divisor, self.remainder)
    }

    fn uniq_key(&self) -> String {
        format!("Mod:{}:{}", self.divisor, self.remainder)
    }
}

impl IntoMatcher for ModMatcher {
    fn build(condition: Value, _ctx: &Arc<Context>) -> Result<Arc<dyn Matcher>, MatcherError> {
        let invalid = || MatcherError::InvalidCondition {
            operator: "$mod".into(),
            expected: "[divisor, remainder] with a non-zero divisor",
            actual: condition.to_string(),
        };
        let (divisor, remainder) = match condition.as_array() {
            Some([divisor, remainder]) => (
                divisor.as_i64().ok_or_else(invalid)?,
                remainder.as_i64().ok_or_else(invalid)?,
            ),
            _ => return Err(invalid()),
        };
        if divisor == 0 {
            return Err(invalid());
        }
        Ok(Arc::new(Self {
            divisor,
            remainder,
            proc: ProcCell::default(),
        }))
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Custom values
// ═══════════════════════════════════════════════════════════════════════════════

/// A host type that exposes `x` and `y` to field access.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Point {
    /// Horizontal coordinate.
    pub x: i64,
    /// Vertical coordinate.
    pub y: i64,
}

impl Point {
    /// Create a point.
    #[must_use]
    pub fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }
}

impl CustomValue for Point {
    fn custom_type_name(&self) -> &'static str {
        "point"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn get_field(&self, key: &str) -> Option<Value> {
        Some(match key {
            "x" => Value::Int(self.x),
            "y" => Value::Int(self.y),
            _ => Value::Missing,
        })
    }
}

impl From<Point> for Value {
    fn from(point: Point) -> Self {
        Value::Custom(Arc::new(point))
    }
}

/// A temperature that converts to a float before matching.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Celsius(pub f64);

impl CustomValue for Celsius {
    fn custom_type_name(&self) -> &'static str {
        "celsius"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl From<Celsius> for Value {
    fn from(celsius: Celsius) -> Self {
        Value::Custom(Arc::new(celsius))
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Registration
// ═══════════════════════════════════════════════════════════════════════════════

/// Register the test-domain extensions with the given builder.
///
/// - `$mod` → [`ModMatcher`]
/// - [`Celsius`] → its degrees as a float
#[must_use]
pub fn register(builder: EngineBuilder) -> EngineBuilder {
    builder
        .operator::<ModMatcher>("mod", "$mod")
        .converter::<Celsius, _>(|celsius| Value::Float(celsius.0))
}

/// The core engine plus the test-domain extensions.
#[must_use]
pub fn engine() -> Engine {
    register(EngineBuilder::new()).build()
}

/// Prelude for convenient imports.
pub mod prelude {
    pub use super::{Celsius, ModMatcher, Point};
    pub use mongory::prelude::*;
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn mod_operator() {
        let query = engine().compile(json!({"n": {"$mod": [4, 0]}})).unwrap();
        assert!(query.is_match(&Value::from(json!({"n": 8}))));
        assert!(!query.is_match(&Value::from(json!({"n": 6}))));
        assert!(!query.is_match(&Value::from(json!({"n": "8"}))));
        // negative numbers use the euclidean remainder
        assert!(query.is_match(&Value::from(json!({"n": -4}))));
    }

    #[test]
    fn mod_rejects_bad_arguments() {
        let engine = engine();
        assert!(engine.compile(json!({"n": {"$mod": [0, 1]}})).is_err());
        assert!(engine.compile(json!({"n": {"$mod": 3}})).is_err());
        assert!(engine.compile(json!({"n": {"$mod": [3]}})).is_err());
    }

    #[test]
    fn mod_stays_on_whole_array() {
        // a registered extension operator is not folded into the element clause
        let query = engine().compile(json!({"n": {"$mod": [2, 0]}})).unwrap();
        assert!(!query.is_match(&Value::from(json!({"n": [2, 4]}))));
    }

    #[test]
    fn point_fields_are_diggable() {
        let engine = engine();
        let mut record = Map::new();
        record.insert("at", Point::new(3, -1));
        let record = Value::Map(record);
        assert!(engine.compile(json!({"at.x": {"$gt": 2}})).unwrap().is_match(&record));
        assert!(engine.compile(json!({"at.z": {"$exists": false}})).unwrap().is_match(&record));
        assert!(!engine.compile(json!({"at.y": 1})).unwrap().is_match(&record));
    }

    #[test]
    fn celsius_converts_before_matching() {
        let mut record = Map::new();
        record.insert("temp", Celsius(21.5));
        let query = engine().compile(json!({"temp": {"$gte": 20}})).unwrap();
        assert!(query.is_match(&Value::Map(record.clone())));

        // without the converter the custom value is incomparable
        let bare = EngineBuilder::new().build();
        let query = bare.compile(json!({"temp": {"$gte": 20}})).unwrap();
        assert!(!query.is_match(&Value::Map(record)));
    }
}
