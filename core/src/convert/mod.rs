//! Normalization of conditions and records.
//!
//! - [`DataConverter`] turns records into plain data (custom values through
//!   registered rules).
//! - [`ValueConverter`] turns condition values into plain data, with
//!   condition-only rules taking precedence.
//! - [`key`] expands dotted paths.
//! - [`Normalizer`] ties them together and produces [`Condition`]s.

mod condition;
mod data;
pub mod key;
#[cfg(feature = "chrono")]
mod time;
mod value;

use std::borrow::Cow;

pub use condition::{Condition, ConditionKey, RawCondition};
pub use data::{DataConverter, Rules, Symbol};
pub use value::ValueConverter;

use crate::Value;

/// Owns the record and condition converters.
///
/// Configured on the [`EngineBuilder`](crate::EngineBuilder) and shared
/// read-only by every matcher the engine compiles.
#[derive(Debug, Default)]
pub struct Normalizer {
    data: DataConverter,
    values: ValueConverter,
}

impl Normalizer {
    /// A normalizer with no conversion rules.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A normalizer with the built-in record rules.
    #[must_use]
    pub fn with_core_rules() -> Self {
        Self {
            data: DataConverter::with_core_rules(),
            values: ValueConverter::new(),
        }
    }

    /// The record converter.
    #[must_use]
    pub fn data(&self) -> &DataConverter {
        &self.data
    }

    /// Mutable access to the record converter (builder phase).
    pub fn data_mut(&mut self) -> &mut DataConverter {
        &mut self.data
    }

    /// The condition value converter.
    #[must_use]
    pub fn values(&self) -> &ValueConverter {
        &self.values
    }

    /// Mutable access to the condition value converter (builder phase).
    pub fn values_mut(&mut self) -> &mut ValueConverter {
        &mut self.values
    }

    /// Converts a record into plain data, borrowing when nothing changes.
    #[must_use]
    pub fn normalize_record<'a>(&self, record: &'a Value) -> Cow<'a, Value> {
        self.data.convert(record)
    }

    /// Converts `value` itself when it is a custom value with a rule.
    ///
    /// Containers are returned untouched: matchers that descend into them
    /// convert each extracted field or element on the way down.
    #[must_use]
    pub fn normalize_shallow<'a>(&self, value: Cow<'a, Value>) -> Cow<'a, Value> {
        let converted = match value.as_ref() {
            Value::Custom(custom) => self.data.convert_custom(custom.as_ref()),
            _ => None,
        };
        converted.map_or(value, Cow::Owned)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn shallow_conversion_handles_the_value_itself() {
        let normalizer = Normalizer::with_core_rules();
        let symbol = Value::from(Symbol::new("admin"));
        let converted = normalizer.normalize_shallow(Cow::Borrowed(&symbol));
        assert_eq!(converted.as_ref(), &Value::from("admin"));
    }

    #[test]
    fn shallow_conversion_leaves_containers_borrowed() {
        let normalizer = Normalizer::with_core_rules();
        let record = Value::Array(vec![Value::from(Symbol::new("a")), Value::from(json!(1))]);
        let converted = normalizer.normalize_shallow(Cow::Borrowed(&record));
        assert!(matches!(converted, Cow::Borrowed(_)));
        assert_eq!(normalizer.normalize_record(&record).as_ref(), &Value::from(json!(["a", 1])));
    }
}
