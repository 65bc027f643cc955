//! Condition-side conversion of individual values.

use std::fmt;

use super::{DataConverter, Normalizer, Rules};
use crate::{CustomValue, Value};

/// Converts the values that appear inside a condition.
///
/// Arrays are converted element by element and maps are normalized as nested
/// conditions (see [`Normalizer::normalize_value`]). Strings, integers and
/// regexes pass through. Custom values try the condition-only rules first,
/// then fall back to the record-side [`DataConverter`].
#[derive(Default)]
pub struct ValueConverter {
    rules: Rules,
}

impl ValueConverter {
    /// A converter with no condition-only rules.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a condition-only conversion for values of type `T`.
    pub fn register<T, F>(&mut self, convert: F)
    where
        T: CustomValue + 'static,
        F: Fn(&T) -> Value + Send + Sync + 'static,
    {
        self.rules.register::<T, F>(convert);
    }

    pub(super) fn convert_custom(&self, custom: &dyn CustomValue, data: &DataConverter) -> Option<Value> {
        self.rules
            .apply(custom)
            .or_else(|| data.convert_custom(custom))
    }
}

impl fmt::Debug for ValueConverter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValueConverter")
            .field("rules", &self.rules)
            .finish()
    }
}

impl Normalizer {
    /// Normalizes one condition value.
    #[must_use]
    pub fn normalize_value(&self, value: Value) -> Value {
        match value {
            Value::Array(items) => {
                Value::Array(items.into_iter().map(|v| self.normalize_value(v)).collect())
            }
            Value::Map(map) => self.normalize_map(map),
            Value::String(_) | Value::Int(_) | Value::Regex(_) => value,
            Value::Range(mut range) => {
                range.start = range.start.take().map(|v| self.normalize_value(v));
                range.end = range.end.take().map(|v| self.normalize_value(v));
                Value::Range(range)
            }
            Value::Custom(custom) => self
                .values
                .convert_custom(custom.as_ref(), &self.data)
                .unwrap_or(Value::Custom(custom)),
            other => other,
        }
    }
}
