//! mongory - MongoDB-style query matching over in-memory records
//!
//! Compiles a condition document (`$gt`, `$or`, `$elemMatch`, dotted paths,
//! operator shorthand) into a tree of matchers, then tests records against
//! it.
//!
//! # Architecture
//!
//! - [`Value`] — Records and conditions (plain data plus [`CustomValue`] for host types)
//! - [`Normalizer`] — Condition front end: dotted keys, shorthand, custom values
//! - [`Matcher`] — One compiled node; [`matchers`] holds every node type
//! - [`OperatorRegistry`] — `$`-keys to matcher factories, frozen at build time
//! - [`Engine`] — Registries plus compilation entry point
//! - [`QueryMatcher`] — A compiled query: safe, fast and traced evaluation
//!
//! # Key Design Insights
//!
//! 1. **Validation at compile time**: a malformed operator argument fails
//!    [`Engine::compile`]; evaluation never reports it.
//!
//! 2. **Errors are non-matches**: [`QueryMatcher::is_match`] and
//!    [`FastPredicate::call`] turn any [`EvalError`] into `false` at one
//!    top-level guard, so both paths agree.
//!
//! 3. **Missing is not null**: an absent key is [`Value::Missing`]. Comparison
//!    operators read it as null; `$exists` tells the two apart.
//!
//! 4. **Array records match by element**: `{"tags": "x"}` matches
//!    `{"tags": ["x", "y"]}`.
//!
//! # Example
//!
//! ```
//! use mongory::prelude::*;
//! use serde_json::json;
//!
//! let engine = Engine::default();
//! let query = engine
//!     .compile(json!({
//!         "age": {"$gte": 18},
//!         "$or": [{"status": "active"}, {"name": {"$regex": "^J"}}]
//!     }))
//!     .unwrap();
//!
//! let jane = Value::from(json!({"age": 25, "status": "inactive", "name": "Jane"}));
//! assert!(query.is_match(&jane));
//!
//! // Fast path: one closure chain reused for every record
//! let fast = query.to_proc();
//! assert!(fast.call(&jane));
//!
//! // Shorthand keys
//! let query = engine
//!     .compile(RawCondition::new().with(field("tags").in_(), vec!["a", "b"]))
//!     .unwrap();
//! assert!(query.is_match(&Value::from(json!({"tags": ["b", "c"]}))));
//! ```
//!
//! # Extensions
//!
//! - Custom operators: implement [`IntoMatcher`] and register it with
//!   [`EngineBuilder::operator`].
//! - Custom values: implement [`CustomValue`] and register a converter with
//!   [`EngineBuilder::converter`].
//! - [`mongory-test`](https://docs.rs/mongory-test) — YAML conformance fixtures (internal)

// ═══════════════════════════════════════════════════════════════════════════════
// Modules
// ═══════════════════════════════════════════════════════════════════════════════

mod context;
pub mod convert;
mod engine;
mod error;
mod map;
mod matcher;
pub mod matchers;
mod operator;
mod pattern;
mod query;
mod range;
mod registry;
mod trace;
mod value;

// ═══════════════════════════════════════════════════════════════════════════════
// Public API
// ═══════════════════════════════════════════════════════════════════════════════

// Data
pub use map::Map;
pub use pattern::Pattern;
pub use range::ValueRange;
pub use value::{CustomValue, Value};

// Normalization
pub use convert::{
    Condition, ConditionKey, DataConverter, Normalizer, RawCondition, Rules, Symbol,
    ValueConverter,
};
pub use operator::{field, Field, FieldOperator};

// Compilation
pub use context::Context;
pub use engine::{compile, Engine, EngineBuilder};
pub use error::{EvalError, MatcherError, Result};
pub use matcher::{
    all_of, any_of, condition_depth, dedup, maybe_unwrap, render_tree, MatchFn, Matcher, ProcCell,
};
pub use registry::{
    register_core_operators, IntoMatcher, OperatorEntry, OperatorRegistry,
    OperatorRegistryBuilder,
};

// Evaluation
pub use query::{FastPredicate, QueryMatcher};
pub use trace::{fold_all, fold_any, TraceEntry, TraceOutcome, Tracer};

// ═══════════════════════════════════════════════════════════════════════════════
// Prelude
// ═══════════════════════════════════════════════════════════════════════════════

/// Prelude module for convenient imports.
///
/// ```
/// use mongory::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        // Compilation
        compile,
        // Shorthand
        field,
        Condition,
        // Extension seams
        CustomValue,
        Engine,
        EngineBuilder,
        // Errors
        EvalError,
        FastPredicate,
        IntoMatcher,
        // Data
        Map,
        Matcher,
        MatcherError,
        Pattern,
        QueryMatcher,
        RawCondition,
        // Trace
        Tracer,
        Value,
        ValueRange,
    };
}

// ═══════════════════════════════════════════════════════════════════════════════
// Constants
// ═══════════════════════════════════════════════════════════════════════════════

/// Maximum nesting depth of a normalized condition.
///
/// Matchers recurse once per level, so this bounds stack use during both
/// compilation and evaluation. Checked by [`Engine::compile`].
pub const MAX_DEPTH: usize = 64;

/// Maximum length for regex patterns.
///
/// Regex compilation is expensive even with the linear-time Rust `regex` crate.
pub const MAX_REGEX_PATTERN_LENGTH: usize = 4096;
