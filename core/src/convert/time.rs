//! Date and time values (feature = `"chrono"`).
//!
//! Dates and times are carried as [`Value::Custom`] and converted to
//! ISO-8601 strings before matching, so they compare lexicographically
//! against string conditions and against each other.

use std::any::Any;
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};

use super::Rules;
use crate::{CustomValue, Value};

impl CustomValue for DateTime<Utc> {
    fn custom_type_name(&self) -> &'static str {
        "datetime"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl CustomValue for NaiveDateTime {
    fn custom_type_name(&self) -> &'static str {
        "naive_datetime"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl CustomValue for NaiveDate {
    fn custom_type_name(&self) -> &'static str {
        "date"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(time: DateTime<Utc>) -> Self {
        Value::Custom(Arc::new(time))
    }
}

impl From<NaiveDateTime> for Value {
    fn from(time: NaiveDateTime) -> Self {
        Value::Custom(Arc::new(time))
    }
}

impl From<NaiveDate> for Value {
    fn from(date: NaiveDate) -> Self {
        Value::Custom(Arc::new(date))
    }
}

pub(super) fn register_rules(rules: &mut Rules) {
    rules.register::<DateTime<Utc>, _>(|time| {
        Value::String(time.to_rfc3339_opts(SecondsFormat::Secs, true))
    });
    rules.register::<NaiveDateTime, _>(|time| {
        Value::String(time.format("%Y-%m-%dT%H:%M:%S").to_string())
    });
    rules.register::<NaiveDate, _>(|date| Value::String(date.format("%Y-%m-%d").to_string()));
}
