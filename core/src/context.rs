//! Per-compilation context shared by every matcher in one tree.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use crate::convert::Normalizer;
use crate::{Map, OperatorRegistry, Value};

/// State shared by all matchers compiled from one condition.
///
/// Holds the user config map, the `need_convert` flag, the record currently
/// being traced, and the engine's registries. Matchers hold it behind an
/// `Arc`; the flag and the current record can be changed after compilation.
pub struct Context {
    config: Map,
    need_convert: AtomicBool,
    current_record: Mutex<Option<Value>>,
    operators: Arc<OperatorRegistry>,
    normalizer: Arc<Normalizer>,
}

impl Context {
    /// Creates a context over the given registries with an empty config.
    ///
    /// `need_convert` starts `true`.
    #[must_use]
    pub fn new(operators: Arc<OperatorRegistry>, normalizer: Arc<Normalizer>) -> Self {
        Self {
            config: Map::new(),
            need_convert: AtomicBool::new(true),
            current_record: Mutex::new(None),
            operators,
            normalizer,
        }
    }

    /// Replaces the user config map.
    #[must_use]
    pub fn with_config(mut self, config: Map) -> Self {
        self.config = config;
        self
    }

    /// The user config map. Core matchers never read it; extension operators may.
    #[inline]
    #[must_use]
    pub fn config(&self) -> &Map {
        &self.config
    }

    /// Whether nested values are converted during evaluation.
    #[inline]
    #[must_use]
    pub fn need_convert(&self) -> bool {
        self.need_convert.load(Ordering::Relaxed)
    }

    /// Turns nested value conversion on or off.
    ///
    /// Turn it off when records are normalized once upstream.
    pub fn set_need_convert(&self, need_convert: bool) {
        self.need_convert.store(need_convert, Ordering::Relaxed);
    }

    /// The record currently being traced, if any.
    #[must_use]
    pub fn current_record(&self) -> Option<Value> {
        self.current_record
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Records which record is being evaluated.
    pub fn set_current_record(&self, record: Option<Value>) {
        *self
            .current_record
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = record;
    }

    /// The operator registry this context compiles against.
    #[inline]
    #[must_use]
    pub fn operators(&self) -> &OperatorRegistry {
        &self.operators
    }

    /// The normalizer for records and nested values.
    #[inline]
    #[must_use]
    pub fn normalizer(&self) -> &Normalizer {
        &self.normalizer
    }

    /// A fresh context over the same registries with a different config.
    #[must_use]
    pub fn fork(&self, config: Map) -> Self {
        Self::new(Arc::clone(&self.operators), Arc::clone(&self.normalizer)).with_config(config)
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("config", &self.config)
            .field("need_convert", &self.need_convert())
            .field("operators", &self.operators.len())
            .finish_non_exhaustive()
    }
}
