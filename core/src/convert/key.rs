//! Dotted-path expansion.
//!
//! `"a.b.c"` becomes `{"a": {"b": {"c": value}}}`. A backslash before a dot
//! (`\.`) keeps the dot literal inside one segment.

use crate::{Map, Value};

/// Splits a dotted path on unescaped dots.
#[must_use]
pub fn split_path(path: &str) -> Vec<String> {
    let mut segments = Vec::new();
    let mut current = String::new();
    let mut chars = path.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\\' if chars.peek() == Some(&'.') => {
                current.push('.');
                chars.next();
            }
            '.' => segments.push(std::mem::take(&mut current)),
            other => current.push(other),
        }
    }
    segments.push(current);
    segments
}

/// Builds the nested single-key map a dotted path stands for.
#[must_use]
pub fn expand_path(path: &str, value: Value) -> Map {
    let mut segments = split_path(path);
    // split_path always yields at least one segment
    let last = segments.pop().unwrap_or_default();
    let mut nested: Map = [(last, value)].into_iter().collect();
    while let Some(segment) = segments.pop() {
        nested = [(segment, Value::Map(nested))].into_iter().collect();
    }
    nested
}
