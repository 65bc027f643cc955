//! `Value` — the tagged union that both records and conditions are made of.
//!
//! Records are plain data trees (maps, arrays, scalars). Conditions use the
//! same shape plus two condition-only forms: [`Value::Regex`] and
//! [`Value::Range`]. Anything else a host wants to put in a tree goes through
//! [`Value::Custom`].
//!
//! # Extensibility via `Custom`
//!
//! Implement [`CustomValue`] for a host type and wrap it in
//! `Value::Custom(Arc::new(your_type))`. Register a converter on the
//! [`EngineBuilder`](crate::EngineBuilder) to turn it into plain data before
//! matching, or implement [`CustomValue::get_field`] so field access can dig
//! into it directly.

use std::any::Any;
use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use crate::{Map, Pattern, ValueRange};

/// Extension trait for host values carried inside a [`Value`].
///
/// # Example
///
/// ```
/// use std::any::Any;
/// use std::sync::Arc;
/// use mongory::{CustomValue, Value};
///
/// #[derive(Debug)]
/// struct Point {
///     x: i64,
///     y: i64,
/// }
///
/// impl CustomValue for Point {
///     fn custom_type_name(&self) -> &'static str {
///         "point"
///     }
///
///     fn as_any(&self) -> &dyn Any {
///         self
///     }
///
///     fn get_field(&self, key: &str) -> Option<Value> {
///         match key {
///             "x" => Some(Value::Int(self.x)),
///             "y" => Some(Value::Int(self.y)),
///             _ => Some(Value::Missing),
///         }
///     }
/// }
///
/// let value = Value::Custom(Arc::new(Point { x: 1, y: 2 }));
/// assert_eq!(value.type_name(), "point");
/// ```
pub trait CustomValue: Send + Sync + fmt::Debug {
    /// Human-readable type identifier, `snake_case` by convention.
    fn custom_type_name(&self) -> &'static str;

    /// Returns `self` as `&dyn Any` for downcasting in converters and operators.
    fn as_any(&self) -> &dyn Any;

    /// Key access for records that are neither maps nor arrays.
    ///
    /// `None` means the value cannot be dug into and the field condition
    /// fails. Return `Some(Value::Missing)` for "diggable, key absent".
    fn get_field(&self, _key: &str) -> Option<Value> {
        None
    }
}

/// A record or condition value.
///
/// `Missing` is distinct from `Null`: it is what field extraction yields when
/// a key or index is absent, and what `$exists` tests for.
#[derive(Debug, Clone, Default)]
pub enum Value {
    /// Explicit null.
    #[default]
    Null,
    /// Boolean.
    Bool(bool),
    /// Signed integer.
    Int(i64),
    /// Floating point number. Compares numerically with `Int`.
    Float(f64),
    /// UTF-8 string.
    String(String),
    /// Ordered sequence.
    Array(Vec<Value>),
    /// Insertion-ordered string-keyed map.
    Map(Map),
    /// Compiled regular expression (condition-only).
    Regex(Pattern),
    /// Range with optional ends (condition-only; `$in`/`$nin` sugar).
    Range(Box<ValueRange>),
    /// Host value.
    Custom(Arc<dyn CustomValue>),
    /// Absent key or index. Never produced by parsing, only by extraction.
    Missing,
}

pub(crate) static NULL: Value = Value::Null;
pub(crate) static MISSING: Value = Value::Missing;

// Manual PartialEq: Int and Float compare numerically, Custom compares by
// allocation, Map ignores key order.
#[allow(clippy::cast_precision_loss)]
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Null, Self::Null) | (Self::Missing, Self::Missing) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Int(a), Self::Int(b)) => a == b,
            (Self::Float(a), Self::Float(b)) => a == b,
            (Self::Int(a), Self::Float(b)) | (Self::Float(b), Self::Int(a)) => (*a as f64) == *b,
            (Self::String(a), Self::String(b)) => a == b,
            (Self::Array(a), Self::Array(b)) => a == b,
            (Self::Map(a), Self::Map(b)) => a == b,
            (Self::Regex(a), Self::Regex(b)) => a == b,
            (Self::Range(a), Self::Range(b)) => a == b,
            (Self::Custom(a), Self::Custom(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl Value {
    /// Returns `true` for [`Value::Null`].
    #[inline]
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns `true` for [`Value::Missing`].
    #[inline]
    #[must_use]
    pub fn is_missing(&self) -> bool {
        matches!(self, Self::Missing)
    }

    /// Returns `true` for [`Value::Array`].
    #[inline]
    #[must_use]
    pub fn is_array(&self) -> bool {
        matches!(self, Self::Array(_))
    }

    /// Returns `true` for [`Value::Map`].
    #[inline]
    #[must_use]
    pub fn is_map(&self) -> bool {
        matches!(self, Self::Map(_))
    }

    /// Returns the string slice if this is a `String`.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the integer if this is an `Int`.
    #[inline]
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Returns the number as `f64` if this is an `Int` or a `Float`.
    #[inline]
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(i) => Some(*i as f64),
            Self::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Returns the boolean if this is a `Bool`.
    #[inline]
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the elements if this is an `Array`.
    #[inline]
    #[must_use]
    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Self::Array(items) => Some(items),
            _ => None,
        }
    }

    /// Returns the map if this is a `Map`.
    #[inline]
    #[must_use]
    pub fn as_map(&self) -> Option<&Map> {
        match self {
            Self::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Returns the type name for diagnostics.
    ///
    /// For `Custom` values, this delegates to [`CustomValue::custom_type_name`].
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::String(_) => "string",
            Self::Array(_) => "array",
            Self::Map(_) => "map",
            Self::Regex(_) => "regex",
            Self::Range(_) => "range",
            Self::Custom(c) => c.custom_type_name(),
            Self::Missing => "missing",
        }
    }

    /// `Missing` read as `Null`, everything else unchanged.
    ///
    /// Comparison operators see an absent field as null.
    #[inline]
    #[must_use]
    pub fn normalized(&self) -> &Value {
        match self {
            Self::Missing => &NULL,
            other => other,
        }
    }

    /// Ordering between two values, if one is defined.
    ///
    /// Numbers order numerically across `Int` and `Float`; strings order
    /// lexicographically by bytes. Every other pairing, including NaN, is
    /// incomparable.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn compare(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Self::Int(a), Self::Int(b)) => Some(a.cmp(b)),
            (Self::Float(a), Self::Float(b)) => a.partial_cmp(b),
            (Self::Int(a), Self::Float(b)) => (*a as f64).partial_cmp(b),
            (Self::Float(a), Self::Int(b)) => a.partial_cmp(&(*b as f64)),
            (Self::String(a), Self::String(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }

    /// Presence as tested by `$present`.
    ///
    /// `Null`, `Missing`, `false`, and empty strings, arrays, and maps are
    /// not present. Everything else is.
    #[must_use]
    pub fn is_present(&self) -> bool {
        match self {
            Self::Null | Self::Missing | Self::Bool(false) => false,
            Self::String(s) => !s.is_empty(),
            Self::Array(items) => !items.is_empty(),
            Self::Map(map) => !map.is_empty(),
            _ => true,
        }
    }

    /// Returns `true` if a `Custom` value occurs anywhere in this tree.
    #[must_use]
    pub fn has_custom(&self) -> bool {
        match self {
            Self::Custom(_) => true,
            Self::Array(items) => items.iter().any(Value::has_custom),
            Self::Map(map) => map.values().any(Value::has_custom),
            Self::Range(range) => range
                .start
                .iter()
                .chain(range.end.iter())
                .any(Value::has_custom),
            _ => false,
        }
    }

    /// Lossy conversion into JSON.
    ///
    /// Regexes, ranges and custom values become their display string;
    /// `Missing` becomes `null`.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Self::Null | Self::Missing => serde_json::Value::Null,
            Self::Bool(b) => serde_json::Value::Bool(*b),
            Self::Int(i) => serde_json::Value::from(*i),
            Self::Float(f) => serde_json::Number::from_f64(*f)
                .map_or(serde_json::Value::Null, serde_json::Value::Number),
            Self::String(s) => serde_json::Value::String(s.clone()),
            Self::Array(items) => serde_json::Value::Array(items.iter().map(Value::to_json).collect()),
            Self::Map(map) => serde_json::Value::Object(
                map.iter()
                    .map(|(k, v)| (k.to_owned(), v.to_json()))
                    .collect(),
            ),
            Self::Regex(_) | Self::Range(_) | Self::Custom(_) => {
                serde_json::Value::String(self.to_string())
            }
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("null"),
            Self::Missing => f.write_str("<missing>"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(x) => write!(f, "{x:?}"),
            Self::String(s) => write!(f, "{s:?}"),
            Self::Array(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    fmt::Display::fmt(item, f)?;
                }
                f.write_str("]")
            }
            Self::Map(map) => fmt::Display::fmt(map, f),
            Self::Regex(pattern) => write!(f, "{pattern}"),
            Self::Range(range) => fmt::Display::fmt(range, f),
            // `{:#}` adds the address: custom values are equal only by identity
            Self::Custom(c) if f.alternate() => {
                write!(f, "#<{} {c:?} @{:p}>", c.custom_type_name(), Arc::as_ptr(c))
            }
            Self::Custom(c) => write!(f, "#<{} {c:?}>", c.custom_type_name()),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Conversions
// ═══════════════════════════════════════════════════════════════════════════════

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Self::Int(i64::from(i))
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

impl From<u32> for Value {
    fn from(i: u32) -> Self {
        Self::Int(i64::from(i))
    }
}

impl From<usize> for Value {
    #[allow(clippy::cast_precision_loss)]
    fn from(i: usize) -> Self {
        i64::try_from(i).map_or(Self::Float(i as f64), Self::Int)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Self::Float(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(s.to_owned())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Self::Array(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

impl From<Map> for Value {
    fn from(map: Map) -> Self {
        Self::Map(map)
    }
}

impl From<Pattern> for Value {
    fn from(pattern: Pattern) -> Self {
        Self::Regex(pattern)
    }
}

impl From<ValueRange> for Value {
    fn from(range: ValueRange) -> Self {
        Self::Range(Box::new(range))
    }
}

impl From<Arc<dyn CustomValue>> for Value {
    fn from(custom: Arc<dyn CustomValue>) -> Self {
        Self::Custom(custom)
    }
}

#[allow(clippy::cast_precision_loss)]
impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Bool(b) => Self::Bool(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Self::Int(i),
                None => Self::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            serde_json::Value::String(s) => Self::String(s),
            serde_json::Value::Array(items) => {
                Self::Array(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(object) => {
                Self::Map(object.into_iter().map(|(k, v)| (k, Value::from(v))).collect())
            }
        }
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for Value {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for Value {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        serde_json::Value::deserialize(deserializer).map(Value::from)
    }
}
