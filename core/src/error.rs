//! Error types for condition compilation and evaluation.
//!
//! [`MatcherError`] is raised while a condition is compiled into a matcher
//! tree and always reaches the caller. [`EvalError`] only exists inside
//! evaluation: the safe entry point and the fast predicate both turn it into
//! a non-match.

use thiserror::Error;

use crate::Value;

/// Error raised while building a matcher tree.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MatcherError {
    /// An operator received an argument of the wrong shape.
    #[error("{operator} needs {expected}, got {actual}")]
    InvalidCondition {
        /// The operator (or `"condition"` for a top-level shape error).
        operator: String,
        /// What the operator accepts.
        expected: &'static str,
        /// Type name of the value actually given.
        actual: String,
    },

    /// A regex pattern failed to compile.
    #[error("invalid pattern \"{pattern}\": {reason}")]
    InvalidPattern {
        /// The pattern that failed.
        pattern: String,
        /// Compiler message.
        reason: String,
    },

    /// A regex pattern is longer than [`MAX_REGEX_PATTERN_LENGTH`](crate::MAX_REGEX_PATTERN_LENGTH).
    #[error("pattern length is {len}, but maximum allowed is {max}")]
    PatternTooLong {
        /// Actual length in bytes.
        len: usize,
        /// Configured maximum.
        max: usize,
    },

    /// The condition nests deeper than [`MAX_DEPTH`](crate::MAX_DEPTH).
    #[error("condition nesting depth is {depth}, but maximum allowed is {max}")]
    DepthExceeded {
        /// Actual nesting depth.
        depth: usize,
        /// Configured maximum.
        max: usize,
    },
}

impl MatcherError {
    pub(crate) fn invalid(operator: impl Into<String>, expected: &'static str, actual: &Value) -> Self {
        Self::InvalidCondition {
            operator: operator.into(),
            expected,
            actual: actual.type_name().to_owned(),
        }
    }
}

/// Error raised while a record is evaluated.
///
/// Never escapes [`QueryMatcher::is_match`](crate::QueryMatcher::is_match)
/// or a [`FastPredicate`](crate::FastPredicate).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvalError {
    /// A lazily built sub-matcher (the array-record form) failed to compile.
    #[error("array record matcher could not be built: {0}")]
    Construction(#[from] MatcherError),

    /// Raised by an extension operator.
    #[error("{0}")]
    Custom(String),
}

/// Result alias for compilation.
pub type Result<T, E = MatcherError> = std::result::Result<T, E>;
