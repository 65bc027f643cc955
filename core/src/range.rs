//! Range values used as `$in` / `$nin` sugar.

use std::fmt;
use std::ops::{Range, RangeFrom, RangeInclusive, RangeTo, RangeToInclusive};

use crate::{Map, Value};

/// A range with optional ends.
///
/// `$in` over a range becomes bound checks on the record; `$nin` becomes
/// the complement. An open end adds no bound.
#[derive(Debug, Clone, PartialEq)]
pub struct ValueRange {
    /// Lower bound (always inclusive), or `None` for an open start.
    pub start: Option<Value>,
    /// Upper bound, or `None` for an open end.
    pub end: Option<Value>,
    /// Whether `end` itself is excluded.
    pub exclusive_end: bool,
}

impl ValueRange {
    /// Creates a range.
    #[must_use]
    pub fn new(start: Option<Value>, end: Option<Value>, exclusive_end: bool) -> Self {
        Self {
            start,
            end,
            exclusive_end,
        }
    }

    /// `start..=end`.
    #[must_use]
    pub fn inclusive(start: impl Into<Value>, end: impl Into<Value>) -> Self {
        Self::new(Some(start.into()), Some(end.into()), false)
    }

    /// `start..end`.
    #[must_use]
    pub fn exclusive(start: impl Into<Value>, end: impl Into<Value>) -> Self {
        Self::new(Some(start.into()), Some(end.into()), true)
    }

    /// Condition equivalent to `$in` over this range.
    ///
    /// `{"$gte": start, "$lte": end}`, with `$lt` for an exclusive end.
    #[must_use]
    pub fn to_in_condition(&self) -> Value {
        let mut condition = Map::with_capacity(2);
        if let Some(start) = &self.start {
            condition.insert("$gte", start.clone());
        }
        if let Some(end) = &self.end {
            let op = if self.exclusive_end { "$lt" } else { "$lte" };
            condition.insert(op, end.clone());
        }
        Value::Map(condition)
    }

    /// Condition equivalent to `$nin` over this range.
    ///
    /// `{"$or": [{"$lt": start}, {"$gt": end}]}`, with `$gte` for an
    /// exclusive end.
    #[must_use]
    pub fn to_nin_condition(&self) -> Value {
        let mut branches = Vec::with_capacity(2);
        if let Some(start) = &self.start {
            branches.push(Value::Map([("$lt", start.clone())].into_iter().collect()));
        }
        if let Some(end) = &self.end {
            let op = if self.exclusive_end { "$gte" } else { "$gt" };
            branches.push(Value::Map([(op, end.clone())].into_iter().collect()));
        }
        Value::Map([("$or", Value::Array(branches))].into_iter().collect())
    }
}

impl fmt::Display for ValueRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(start) = &self.start {
            fmt::Display::fmt(start, f)?;
        }
        f.write_str(if self.exclusive_end { ".." } else { "..=" })?;
        if let Some(end) = &self.end {
            fmt::Display::fmt(end, f)?;
        }
        Ok(())
    }
}

macro_rules! impl_range_from {
    ($($t:ty),*) => {$(
        impl From<Range<$t>> for ValueRange {
            fn from(r: Range<$t>) -> Self {
                Self::new(Some(r.start.into()), Some(r.end.into()), true)
            }
        }

        impl From<RangeInclusive<$t>> for ValueRange {
            fn from(r: RangeInclusive<$t>) -> Self {
                let (start, end) = r.into_inner();
                Self::new(Some(start.into()), Some(end.into()), false)
            }
        }

        impl From<RangeFrom<$t>> for ValueRange {
            fn from(r: RangeFrom<$t>) -> Self {
                Self::new(Some(r.start.into()), None, false)
            }
        }

        impl From<RangeTo<$t>> for ValueRange {
            fn from(r: RangeTo<$t>) -> Self {
                Self::new(None, Some(r.end.into()), true)
            }
        }

        impl From<RangeToInclusive<$t>> for ValueRange {
            fn from(r: RangeToInclusive<$t>) -> Self {
                Self::new(None, Some(r.end.into()), false)
            }
        }

        impl From<Range<$t>> for Value {
            fn from(r: Range<$t>) -> Self {
                ValueRange::from(r).into()
            }
        }

        impl From<RangeInclusive<$t>> for Value {
            fn from(r: RangeInclusive<$t>) -> Self {
                ValueRange::from(r).into()
            }
        }

        impl From<RangeFrom<$t>> for Value {
            fn from(r: RangeFrom<$t>) -> Self {
                ValueRange::from(r).into()
            }
        }

        impl From<RangeTo<$t>> for Value {
            fn from(r: RangeTo<$t>) -> Self {
                ValueRange::from(r).into()
            }
        }

        impl From<RangeToInclusive<$t>> for Value {
            fn from(r: RangeToInclusive<$t>) -> Self {
                ValueRange::from(r).into()
            }
        }
    )*};
}

impl_range_from!(i32, i64, f64);
