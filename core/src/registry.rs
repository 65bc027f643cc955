//! Operator registry: `$`-keys to matcher factories.
//!
//! # Architecture (axum `BoxedIntoRoute` pattern)
//!
//! Each operator type registers itself via [`IntoMatcher`]. At registration
//! time the concrete type `T` is monomorphized into a closure and erased
//! behind `Box<dyn Fn>`. Lookup happens while a condition is compiled, never
//! while a record is evaluated.
//!
//! The registry is immutable after [`OperatorRegistryBuilder::build`]. A key
//! that is not registered is treated as a field name, so `{"$foo": 1}`
//! matches records whose `"$foo"` field equals 1.
//!
//! # Example
//!
//! ```
//! use mongory::{register_core_operators, OperatorRegistryBuilder};
//!
//! let registry = register_core_operators(OperatorRegistryBuilder::new()).build();
//! assert!(registry.contains("$elemMatch"));
//! assert!(!registry.contains("$foo"));
//! ```

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::matchers::{
    AndMatcher, ElemMatchMatcher, EqMatcher, EveryMatcher, ExistsMatcher, GtMatcher, GteMatcher,
    InMatcher, LtMatcher, LteMatcher, NeMatcher, NinMatcher, NotMatcher, OrMatcher,
    PresentMatcher, RegexMatcher, SizeMatcher,
};
use crate::{Context, Matcher, MatcherError, Value};

// ═══════════════════════════════════════════════════════════════════════════════
// Traits
// ═══════════════════════════════════════════════════════════════════════════════

/// Trait for matcher types that can be built from an operator's argument.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use mongory::{
///     Context, EvalError, IntoMatcher, MatchFn, Matcher, MatcherError, ProcCell, Value,
/// };
///
/// /// `{"$even": true}`
/// #[derive(Debug)]
/// struct EvenMatcher {
///     expected: bool,
///     proc: ProcCell,
/// }
///
/// impl Matcher for EvenMatcher {
///     fn matches(&self, record: &Value) -> Result<bool, EvalError> {
///         Ok(record.as_i64().is_some_and(|n| n % 2 == 0) == self.expected)
///     }
///
///     fn to_proc(&self) -> MatchFn {
///         let expected = self.expected;
///         self.proc.get_or_build(|| {
///             Arc::new(move |record: &Value| Ok(record.as_i64().is_some_and(|n| n % 2 == 0) == expected))
///         })
///     }
///
///     fn title(&self) -> String {
///         format!("Even: {}", self.expected)
///     }
///
///     fn uniq_key(&self) -> String {
///         format!("Even:{}", self.expected)
///     }
/// }
///
/// impl IntoMatcher for EvenMatcher {
///     fn build(condition: Value, _ctx: &Arc<Context>) -> Result<Arc<dyn Matcher>, MatcherError> {
///         let expected = condition
///             .as_bool()
///             .ok_or_else(|| MatcherError::InvalidCondition {
///                 operator: "$even".into(),
///                 expected: "a boolean",
///                 actual: condition.type_name().into(),
///             })?;
///         Ok(Arc::new(EvenMatcher { expected, proc: ProcCell::default() }))
///     }
/// }
/// ```
pub trait IntoMatcher: Send + Sync + 'static {
    /// Builds the matcher for `condition`, validating its shape.
    ///
    /// # Errors
    ///
    /// Returns [`MatcherError`] when the condition has the wrong shape.
    fn build(condition: Value, ctx: &Arc<Context>) -> Result<Arc<dyn Matcher>, MatcherError>;
}

// ═══════════════════════════════════════════════════════════════════════════════
// Type-erased factories
// ═══════════════════════════════════════════════════════════════════════════════

type BoxedMatcherFactory =
    Box<dyn Fn(Value, &Arc<Context>) -> Result<Arc<dyn Matcher>, MatcherError> + Send + Sync>;

/// A registered operator.
pub struct OperatorEntry {
    name: String,
    operator: String,
    factory: BoxedMatcherFactory,
}

impl OperatorEntry {
    /// Short name, e.g. `"gte"`.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Condition key, e.g. `"$gte"`.
    #[must_use]
    pub fn operator(&self) -> &str {
        &self.operator
    }

    /// Builds the operator's matcher.
    ///
    /// # Errors
    ///
    /// Propagates the factory's [`MatcherError`].
    pub fn build(&self, condition: Value, ctx: &Arc<Context>) -> Result<Arc<dyn Matcher>, MatcherError> {
        (self.factory)(condition, ctx)
    }
}

impl fmt::Debug for OperatorEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OperatorEntry")
            .field("name", &self.name)
            .field("operator", &self.operator)
            .finish_non_exhaustive()
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Builder
// ═══════════════════════════════════════════════════════════════════════════════

/// Builder for an [`OperatorRegistry`].
///
/// Registering an operator key twice replaces the earlier entry.
#[derive(Default)]
pub struct OperatorRegistryBuilder {
    entries: HashMap<String, OperatorEntry>,
}

impl OperatorRegistryBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers matcher type `T` under `name` / `operator`.
    #[must_use]
    pub fn operator<T: IntoMatcher>(self, name: &str, operator: &str) -> Self {
        self.operator_fn(name, operator, T::build)
    }

    /// Registers a factory closure under `name` / `operator`.
    #[must_use]
    pub fn operator_fn<F>(mut self, name: &str, operator: &str, factory: F) -> Self
    where
        F: Fn(Value, &Arc<Context>) -> Result<Arc<dyn Matcher>, MatcherError> + Send + Sync + 'static,
    {
        self.entries.insert(
            operator.to_owned(),
            OperatorEntry {
                name: name.to_owned(),
                operator: operator.to_owned(),
                factory: Box::new(factory),
            },
        );
        self
    }

    /// Freezes the registry.
    #[must_use]
    pub fn build(self) -> OperatorRegistry {
        OperatorRegistry {
            entries: self.entries,
        }
    }
}

impl fmt::Debug for OperatorRegistryBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OperatorRegistryBuilder")
            .field("operators", &self.entries.len())
            .finish()
    }
}

/// Registers the seventeen core operators.
#[must_use]
pub fn register_core_operators(builder: OperatorRegistryBuilder) -> OperatorRegistryBuilder {
    builder
        .operator::<InMatcher>("in", "$in")
        .operator::<NinMatcher>("nin", "$nin")
        .operator::<EqMatcher>("eq", "$eq")
        .operator::<NeMatcher>("ne", "$ne")
        .operator::<GtMatcher>("gt", "$gt")
        .operator::<GteMatcher>("gte", "$gte")
        .operator::<LtMatcher>("lt", "$lt")
        .operator::<LteMatcher>("lte", "$lte")
        .operator::<ExistsMatcher>("exists", "$exists")
        .operator::<PresentMatcher>("present", "$present")
        .operator::<RegexMatcher>("regex", "$regex")
        .operator::<AndMatcher>("and", "$and")
        .operator::<OrMatcher>("or", "$or")
        .operator::<NotMatcher>("not", "$not")
        .operator::<ElemMatchMatcher>("elem_match", "$elemMatch")
        .operator::<EveryMatcher>("every", "$every")
        .operator::<SizeMatcher>("size", "$size")
}

// ═══════════════════════════════════════════════════════════════════════════════
// Registry
// ═══════════════════════════════════════════════════════════════════════════════

/// Immutable mapping from operator keys to matcher factories.
pub struct OperatorRegistry {
    entries: HashMap<String, OperatorEntry>,
}

impl OperatorRegistry {
    /// Looks up an operator key such as `"$gt"`.
    #[must_use]
    pub fn lookup(&self, operator: &str) -> Option<&OperatorEntry> {
        self.entries.get(operator)
    }

    /// Returns `true` if `operator` is registered.
    #[must_use]
    pub fn contains(&self, operator: &str) -> bool {
        self.entries.contains_key(operator)
    }

    /// Registered operator keys, sorted.
    #[must_use]
    pub fn operators(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }

    /// Registered short names, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.entries.values().map(OperatorEntry::name).collect();
        names.sort_unstable();
        names
    }

    /// Number of registered operators.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Debug for OperatorRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OperatorRegistry")
            .field("operators", &self.operators())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn core() -> OperatorRegistry {
        register_core_operators(OperatorRegistryBuilder::new()).build()
    }

    #[test]
    fn core_operators_registered() {
        let registry = core();
        assert_eq!(registry.len(), 17);
        for op in [
            "$in", "$nin", "$eq", "$ne", "$gt", "$gte", "$lt", "$lte", "$exists", "$present",
            "$regex", "$and", "$or", "$not", "$elemMatch", "$every", "$size",
        ] {
            assert!(registry.contains(op), "missing {op}");
        }
    }

    #[test]
    fn lookup_exposes_names() {
        let registry = core();
        let entry = registry.lookup("$elemMatch").unwrap();
        assert_eq!(entry.name(), "elem_match");
        assert_eq!(entry.operator(), "$elemMatch");
        assert!(registry.lookup("$foo").is_none());
    }

    #[test]
    fn operators_are_sorted() {
        let registry = core();
        let ops = registry.operators();
        let mut sorted = ops.clone();
        sorted.sort_unstable();
        assert_eq!(ops, sorted);
        assert_eq!(registry.names()[0], "and");
        assert!(registry.names().contains(&"elem_match"));
    }

    #[test]
    fn later_registration_replaces_earlier() {
        let registry = OperatorRegistryBuilder::new()
            .operator::<EqMatcher>("first", "$x")
            .operator::<NeMatcher>("second", "$x")
            .build();
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.lookup("$x").unwrap().name(), "second");
    }

    #[test]
    fn registry_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<OperatorRegistry>();
    }
}
