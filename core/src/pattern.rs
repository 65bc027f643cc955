//! Regex values carried in conditions.
//!
//! Uses the `regex` crate (linear-time, RE2 semantics). Backreferences and
//! lookaround are not supported; a pattern that uses them fails to compile
//! when the condition is built.

use std::fmt;

use regex::{Regex, RegexBuilder};

use crate::{MatcherError, MAX_REGEX_PATTERN_LENGTH};

/// A compiled regular expression with its source and flags.
///
/// Supported flags: `i` (case-insensitive), `m` (multi-line), `s` (dot
/// matches newline), `x` (ignore whitespace). Matching is unanchored.
///
/// # Example
///
/// ```
/// use mongory::Pattern;
///
/// let pattern = Pattern::with_flags("^ann", "i").unwrap();
/// assert!(pattern.is_match("Annie"));
/// assert!(!pattern.is_match("Joanna"));
/// ```
#[derive(Clone)]
pub struct Pattern {
    source: String,
    flags: String,
    regex: Regex,
}

impl Pattern {
    /// Compiles `source` without flags.
    ///
    /// # Errors
    ///
    /// Returns [`MatcherError::PatternTooLong`] if the pattern exceeds
    /// [`MAX_REGEX_PATTERN_LENGTH`], or [`MatcherError::InvalidPattern`] if
    /// it does not compile.
    pub fn new(source: &str) -> Result<Self, MatcherError> {
        Self::with_flags(source, "")
    }

    /// Compiles `source` with flags.
    ///
    /// # Errors
    ///
    /// As [`Pattern::new`], plus [`MatcherError::InvalidPattern`] for an
    /// unknown flag.
    pub fn with_flags(source: &str, flags: &str) -> Result<Self, MatcherError> {
        if source.len() > MAX_REGEX_PATTERN_LENGTH {
            return Err(MatcherError::PatternTooLong {
                len: source.len(),
                max: MAX_REGEX_PATTERN_LENGTH,
            });
        }

        let mut builder = RegexBuilder::new(source);
        for flag in flags.chars() {
            match flag {
                'i' => builder.case_insensitive(true),
                'm' => builder.multi_line(true),
                's' => builder.dot_matches_new_line(true),
                'x' => builder.ignore_whitespace(true),
                other => {
                    return Err(MatcherError::InvalidPattern {
                        pattern: source.to_owned(),
                        reason: format!("unknown flag '{other}'"),
                    })
                }
            };
        }

        let regex = builder.build().map_err(|e| MatcherError::InvalidPattern {
            pattern: source.to_owned(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            source: source.to_owned(),
            flags: flags.to_owned(),
            regex,
        })
    }

    /// The pattern source.
    #[inline]
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// The flags the pattern was compiled with.
    #[inline]
    #[must_use]
    pub fn flags(&self) -> &str {
        &self.flags
    }

    /// Returns `true` if the pattern matches anywhere in `haystack`.
    #[inline]
    #[must_use]
    pub fn is_match(&self, haystack: &str) -> bool {
        self.regex.is_match(haystack)
    }

    /// The compiled regex.
    #[must_use]
    pub fn as_regex(&self) -> &Regex {
        &self.regex
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source && self.flags == other.flags
    }
}

impl fmt::Debug for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Pattern({self})")
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}/{}", self.source, self.flags)
    }
}
