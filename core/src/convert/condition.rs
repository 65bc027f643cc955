//! Condition normalization.
//!
//! A raw condition is a list of `(key, value)` pairs. Each value is
//! normalized, each key is expanded (dotted paths become nested maps,
//! operator shorthands become `{field: {op: value}}`), and the resulting
//! fragments are deep-merged in order. The output is wrapped in
//! [`Condition`], which is never normalized twice.

use std::fmt;

use super::{key::expand_path, Normalizer};
use crate::{FieldOperator, Map, Value};

/// A normalized condition.
///
/// Produced only by [`Normalizer::normalize_condition`]; passing it back in
/// returns it unchanged.
#[derive(Debug, Clone, PartialEq)]
pub struct Condition(Value);

impl Condition {
    /// The normalized condition value (a map for every well-formed condition).
    #[inline]
    #[must_use]
    pub fn as_value(&self) -> &Value {
        &self.0
    }

    /// Unwraps the normalized value.
    #[must_use]
    pub fn into_value(self) -> Value {
        self.0
    }

    /// The condition as a map, if it is one.
    #[must_use]
    pub fn as_map(&self) -> Option<&Map> {
        self.0.as_map()
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl From<Condition> for Value {
    fn from(condition: Condition) -> Self {
        condition.0
    }
}

/// A key in a raw condition: a dotted field path or an operator shorthand.
#[derive(Debug, Clone, PartialEq)]
pub enum ConditionKey {
    /// `"a.b.c"`; `\.` escapes a literal dot.
    Path(String),
    /// `field("age").gte()`.
    Operator(FieldOperator),
    /// A top-level key of an already normalized condition. Neither the key
    /// nor its value is expanded again.
    Normalized(String),
}

impl From<&str> for ConditionKey {
    fn from(path: &str) -> Self {
        Self::Path(path.to_owned())
    }
}

impl From<String> for ConditionKey {
    fn from(path: String) -> Self {
        Self::Path(path)
    }
}

impl From<FieldOperator> for ConditionKey {
    fn from(op: FieldOperator) -> Self {
        Self::Operator(op)
    }
}

/// A condition before normalization.
///
/// # Example
///
/// ```
/// use mongory::{field, RawCondition, Value};
///
/// let raw = RawCondition::new()
///     .with(field("age").gte(), 18)
///     .with("address.city", "Taipei");
///
/// let condition = mongory::Engine::default().normalize_condition(raw);
/// let address = condition.as_map().and_then(|m| m.get("address")).unwrap();
/// assert_eq!(address.as_map().and_then(|m| m.get("city")), Some(&Value::from("Taipei")));
/// ```
#[derive(Debug, Clone)]
pub enum RawCondition {
    /// Keyed pairs, possibly with operator shorthand keys.
    Pairs(Vec<(ConditionKey, Value)>),
    /// A plain value; well-formed conditions are maps.
    Value(Value),
    /// Already normalized.
    Normalized(Condition),
}

impl RawCondition {
    /// An empty condition (matches everything).
    #[must_use]
    pub fn new() -> Self {
        Self::Pairs(Vec::new())
    }

    /// Appends a `(key, value)` pair.
    ///
    /// A map-valued condition is turned into pairs first; the entries of an
    /// already normalized one are kept as they are. A non-map condition is
    /// kept as the single branch of an `$and`, so compiling still rejects it.
    #[must_use]
    pub fn with(self, key: impl Into<ConditionKey>, value: impl Into<Value>) -> Self {
        let mut pairs = match self {
            Self::Pairs(pairs) => pairs,
            Self::Value(Value::Map(map)) => map
                .into_iter()
                .map(|(k, v)| (ConditionKey::Path(k), v))
                .collect(),
            Self::Normalized(Condition(Value::Map(map))) => map
                .into_iter()
                .map(|(k, v)| (ConditionKey::Normalized(k), v))
                .collect(),
            Self::Value(other) => {
                vec![(ConditionKey::Path("$and".to_owned()), Value::Array(vec![other]))]
            }
            Self::Normalized(Condition(other)) => {
                vec![(ConditionKey::Normalized("$and".to_owned()), Value::Array(vec![other]))]
            }
        };
        pairs.push((key.into(), value.into()));
        Self::Pairs(pairs)
    }
}

impl Default for RawCondition {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Value> for RawCondition {
    fn from(value: Value) -> Self {
        Self::Value(value)
    }
}

impl From<Map> for RawCondition {
    fn from(map: Map) -> Self {
        Self::Value(Value::Map(map))
    }
}

impl From<serde_json::Value> for RawCondition {
    fn from(json: serde_json::Value) -> Self {
        Self::Value(json.into())
    }
}

impl From<Condition> for RawCondition {
    fn from(condition: Condition) -> Self {
        Self::Normalized(condition)
    }
}

impl From<&Condition> for RawCondition {
    fn from(condition: &Condition) -> Self {
        Self::Normalized(condition.clone())
    }
}

impl<K: Into<ConditionKey>, V: Into<Value>> FromIterator<(K, V)> for RawCondition {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self::Pairs(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

impl Normalizer {
    /// Normalizes a raw condition.
    ///
    /// Idempotent: a [`Condition`] comes back unchanged.
    #[must_use]
    pub fn normalize_condition(&self, raw: impl Into<RawCondition>) -> Condition {
        match raw.into() {
            RawCondition::Normalized(condition) => condition,
            RawCondition::Value(Value::Map(map)) => Condition(self.normalize_map(map)),
            RawCondition::Value(other) => Condition(self.normalize_value(other)),
            RawCondition::Pairs(pairs) => Condition(Value::Map(self.merge_pairs(pairs))),
        }
    }

    /// Expands one key into the nested map it stands for.
    #[must_use]
    pub fn normalize_key(&self, key: ConditionKey, value: Value) -> Map {
        match key {
            ConditionKey::Path(path) => expand_path(&path, value),
            ConditionKey::Normalized(key) => [(key, value)].into_iter().collect(),
            ConditionKey::Operator(op) => {
                let inner: Map = [(op.operator(), value)].into_iter().collect();
                expand_path(op.field(), Value::Map(inner))
            }
        }
    }

    pub(super) fn normalize_map(&self, map: Map) -> Value {
        Value::Map(self.merge_pairs(
            map.into_iter().map(|(k, v)| (ConditionKey::Path(k), v)),
        ))
    }

    fn merge_pairs(&self, pairs: impl IntoIterator<Item = (ConditionKey, Value)>) -> Map {
        let mut merged = Map::new();
        for (key, value) in pairs {
            let value = match key {
                ConditionKey::Normalized(_) => value,
                _ => self.normalize_value(value),
            };
            merged.deep_merge(self.normalize_key(key, value));
        }
        merged
    }
}
