//! Engine: the registries a query is compiled against.
//!
//! ```
//! use mongory::{Engine, Value};
//! use serde_json::json;
//!
//! let engine = Engine::default();
//! let query = engine.compile(json!({"age": {"$gte": 18}})).unwrap();
//! assert!(query.is_match(&Value::from(json!({"age": 21}))));
//! assert!(!query.is_match(&Value::from(json!({"age": 12}))));
//! ```

use std::sync::Arc;

use crate::convert::{Condition, Normalizer, RawCondition};
use crate::{
    register_core_operators, Context, CustomValue, IntoMatcher, Map, Matcher, MatcherError,
    OperatorRegistry, OperatorRegistryBuilder, QueryMatcher, Value,
};

/// Compiles conditions into [`QueryMatcher`]s.
///
/// Immutable once built. Cloning is cheap; clones share the registries.
#[derive(Debug, Clone)]
pub struct Engine {
    operators: Arc<OperatorRegistry>,
    normalizer: Arc<Normalizer>,
}

impl Engine {
    /// An engine with every core operator and the core conversion rules.
    #[must_use]
    pub fn new() -> Self {
        EngineBuilder::new().build()
    }

    /// Starts from the core operators and rules.
    #[must_use]
    pub fn builder() -> EngineBuilder {
        EngineBuilder::new()
    }

    /// Normalizes and compiles a condition.
    ///
    /// # Errors
    ///
    /// Returns [`MatcherError`] when the condition is malformed. Nothing is
    /// deferred to evaluation.
    pub fn compile(&self, condition: impl Into<RawCondition>) -> Result<QueryMatcher, MatcherError> {
        self.compile_with_config(condition, Map::new())
    }

    /// As [`compile`](Self::compile), with a config map on the query's context.
    ///
    /// # Errors
    ///
    /// As [`compile`](Self::compile).
    pub fn compile_with_config(
        &self,
        condition: impl Into<RawCondition>,
        config: Map,
    ) -> Result<QueryMatcher, MatcherError> {
        let condition = self.normalize_condition(condition);
        QueryMatcher::new(condition, Arc::new(self.context().with_config(config)))
    }

    /// Normalizes a condition without compiling it.
    #[must_use]
    pub fn normalize_condition(&self, condition: impl Into<RawCondition>) -> Condition {
        self.normalizer.normalize_condition(condition)
    }

    /// The operator registry.
    #[must_use]
    pub fn operators(&self) -> &OperatorRegistry {
        &self.operators
    }

    /// The normalizer.
    #[must_use]
    pub fn normalizer(&self) -> &Normalizer {
        &self.normalizer
    }

    /// A fresh context over this engine's registries.
    #[must_use]
    pub fn context(&self) -> Context {
        Context::new(Arc::clone(&self.operators), Arc::clone(&self.normalizer))
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

/// Compiles `condition` with a default [`Engine`].
///
/// Builds the registries on every call; hold an [`Engine`] when compiling
/// many conditions.
///
/// # Errors
///
/// As [`Engine::compile`].
pub fn compile(condition: impl Into<RawCondition>) -> Result<QueryMatcher, MatcherError> {
    Engine::new().compile(condition)
}

// ═══════════════════════════════════════════════════════════════════════════════
// Builder
// ═══════════════════════════════════════════════════════════════════════════════

/// Builder for an [`Engine`].
///
/// [`new`](Self::new) starts from the core operators and rules;
/// [`empty`](Self::empty) starts from nothing.
///
/// ```
/// use std::sync::Arc;
/// use mongory::{Context, EngineBuilder, Matcher, Value};
/// use mongory::matchers::EqMatcher;
/// use serde_json::json;
///
/// let engine = EngineBuilder::new()
///     .operator_fn("is", "$is", |condition: Value, _ctx: &Arc<Context>| {
///         Ok(Arc::new(EqMatcher::new(condition)) as Arc<dyn Matcher>)
///     })
///     .build();
/// let query = engine.compile(json!({"a": {"$is": 1}})).unwrap();
/// assert!(query.is_match(&Value::from(json!({"a": 1}))));
/// ```
#[derive(Debug)]
pub struct EngineBuilder {
    operators: OperatorRegistryBuilder,
    normalizer: Normalizer,
}

impl EngineBuilder {
    /// Core operators and conversion rules.
    #[must_use]
    pub fn new() -> Self {
        Self {
            operators: register_core_operators(OperatorRegistryBuilder::new()),
            normalizer: Normalizer::with_core_rules(),
        }
    }

    /// No operators and no conversion rules.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            operators: OperatorRegistryBuilder::new(),
            normalizer: Normalizer::new(),
        }
    }

    /// Registers matcher type `T` under `name` / `operator`, replacing any
    /// earlier registration of `operator`.
    #[must_use]
    pub fn operator<T: IntoMatcher>(mut self, name: &str, operator: &str) -> Self {
        self.operators = self.operators.operator::<T>(name, operator);
        self
    }

    /// Registers a factory closure under `name` / `operator`.
    #[must_use]
    pub fn operator_fn<F>(mut self, name: &str, operator: &str, factory: F) -> Self
    where
        F: Fn(Value, &Arc<Context>) -> Result<Arc<dyn Matcher>, MatcherError> + Send + Sync + 'static,
    {
        self.operators = self.operators.operator_fn(name, operator, factory);
        self
    }

    /// Registers a record conversion for custom values of type `T`.
    ///
    /// Also applies to condition values that have no condition-only rule.
    #[must_use]
    pub fn converter<T, F>(mut self, convert: F) -> Self
    where
        T: CustomValue + 'static,
        F: Fn(&T) -> Value + Send + Sync + 'static,
    {
        self.normalizer.data_mut().register::<T, F>(convert);
        self
    }

    /// Registers a condition-only conversion for custom values of type `T`.
    #[must_use]
    pub fn condition_converter<T, F>(mut self, convert: F) -> Self
    where
        T: CustomValue + 'static,
        F: Fn(&T) -> Value + Send + Sync + 'static,
    {
        self.normalizer.values_mut().register::<T, F>(convert);
        self
    }

    /// Freezes the registries.
    #[must_use]
    pub fn build(self) -> Engine {
        Engine {
            operators: Arc::new(self.operators.build()),
            normalizer: Arc::new(self.normalizer),
        }
    }
}

impl Default for EngineBuilder {
    fn default() -> Self {
        Self::new()
    }
}
