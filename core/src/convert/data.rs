//! Record-side conversion: host values into plain data.

use std::any::Any;
use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

use crate::{CustomValue, Value};

type ConvertFn = Box<dyn Fn(&dyn CustomValue) -> Option<Value> + Send + Sync>;

/// Ordered list of type-keyed conversion rules.
///
/// A rule applies to one concrete [`CustomValue`] type. Rules are tried most
/// recently registered first, so a later registration overrides an earlier
/// one for the same type.
#[derive(Default)]
pub struct Rules {
    rules: Vec<(&'static str, ConvertFn)>,
}

impl Rules {
    /// Registers a rule for values of type `T`.
    pub fn register<T, F>(&mut self, convert: F)
    where
        T: CustomValue + 'static,
        F: Fn(&T) -> Value + Send + Sync + 'static,
    {
        self.rules.push((
            std::any::type_name::<T>(),
            Box::new(move |custom: &dyn CustomValue| custom.as_any().downcast_ref::<T>().map(&convert)),
        ));
    }

    /// Applies the first matching rule, most recent first.
    #[must_use]
    pub fn apply(&self, custom: &dyn CustomValue) -> Option<Value> {
        self.rules.iter().rev().find_map(|(_, rule)| rule(custom))
    }

    /// Number of registered rules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Returns `true` if no rules are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl fmt::Debug for Rules {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.rules.iter().map(|(name, _)| name)).finish()
    }
}

/// Converts records into plain data before matching.
///
/// Maps and arrays are converted element by element, custom values through
/// the registered [`Rules`]. Values with no custom value anywhere inside are
/// returned borrowed.
#[derive(Debug, Default)]
pub struct DataConverter {
    rules: Rules,
}

impl DataConverter {
    /// A converter with no rules: every value passes through unchanged.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A converter with the built-in rules: [`Symbol`] to string, and with
    /// the `chrono` feature, dates and times to ISO-8601 strings.
    #[must_use]
    pub fn with_core_rules() -> Self {
        let mut converter = Self::new();
        converter.register::<Symbol, _>(|symbol| Value::String(symbol.as_str().to_owned()));
        #[cfg(feature = "chrono")]
        super::time::register_rules(&mut converter.rules);
        converter
    }

    /// Registers a conversion for values of type `T`.
    pub fn register<T, F>(&mut self, convert: F)
    where
        T: CustomValue + 'static,
        F: Fn(&T) -> Value + Send + Sync + 'static,
    {
        self.rules.register::<T, F>(convert);
    }

    /// Converts a record, borrowing when nothing needs converting.
    #[must_use]
    pub fn convert<'a>(&self, value: &'a Value) -> Cow<'a, Value> {
        if value.has_custom() {
            Cow::Owned(self.convert_owned(value))
        } else {
            Cow::Borrowed(value)
        }
    }

    /// Converts a single custom value, if a rule applies.
    #[must_use]
    pub fn convert_custom(&self, custom: &dyn CustomValue) -> Option<Value> {
        self.rules.apply(custom)
    }

    fn convert_owned(&self, value: &Value) -> Value {
        match value {
            Value::Array(items) => Value::Array(items.iter().map(|v| self.convert_owned(v)).collect()),
            Value::Map(map) => Value::Map(
                map.iter()
                    .map(|(k, v)| (k.to_owned(), self.convert_owned(v)))
                    .collect(),
            ),
            Value::Custom(custom) => self
                .rules
                .apply(custom.as_ref())
                .unwrap_or_else(|| value.clone()),
            other => other.clone(),
        }
    }
}

/// An interned-name style value, converted to a plain string by default.
///
/// Useful for hosts whose records carry enum tags or atoms that should match
/// string conditions.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Symbol(String);

impl Symbol {
    /// Creates a symbol.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The symbol's name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl CustomValue for Symbol {
    fn custom_type_name(&self) -> &'static str {
        "symbol"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl From<Symbol> for Value {
    fn from(symbol: Symbol) -> Self {
        Value::Custom(Arc::new(symbol))
    }
}
