//! The strategy registry: name → validator, options, watcher binding.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde_json::Value;
use tollgate_watch::WatcherBinding;

use crate::Strategy;

/// One registered strategy: the validator plus everything the session
/// handler needs to use it.
pub struct StrategyEntry {
    strategy: Arc<dyn Strategy>,
    options: Value,
    binding: Option<WatcherBinding>,
}

impl StrategyEntry {
    /// Wraps a validator with no options and no watcher binding.
    pub fn new(strategy: Arc<dyn Strategy>) -> Self {
        Self {
            strategy,
            options: Value::Null,
            binding: None,
        }
    }

    /// Attaches the per-strategy options from configuration.
    pub fn with_options(mut self, options: Value) -> Self {
        self.options = options;
        self
    }

    /// Attaches the binding used to keep principals authenticated through
    /// this strategy synchronized with their backing service.
    pub fn with_binding(mut self, binding: WatcherBinding) -> Self {
        self.binding = Some(binding);
        self
    }

    /// The validator.
    pub fn strategy(&self) -> &Arc<dyn Strategy> {
        &self.strategy
    }

    /// The per-strategy options (`Value::Null` when none configured).
    pub fn options(&self) -> &Value {
        &self.options
    }

    /// The entity-watch binding, if this strategy has one. Strategies
    /// without a binding (e.g. anonymous access) skip entity sync.
    pub fn binding(&self) -> Option<&WatcherBinding> {
        self.binding.as_ref()
    }
}

impl fmt::Debug for StrategyEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StrategyEntry")
            .field("options", &self.options)
            .field("binding", &self.binding)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// StrategyRegistry
// ---------------------------------------------------------------------------

/// All strategies a deployment accepts, keyed by name.
///
/// Built once at startup, then shared as an `Arc` by every session —
/// immutable after build, so concurrent lookups need no locking. An
/// `authenticate` naming anything not in here fails with a configuration
/// error before any validator runs.
#[derive(Debug)]
pub struct StrategyRegistry {
    entries: HashMap<String, StrategyEntry>,
}

impl StrategyRegistry {
    /// Starts building a registry.
    pub fn builder() -> StrategyRegistryBuilder {
        StrategyRegistryBuilder {
            entries: HashMap::new(),
        }
    }

    /// Looks up a strategy by name.
    pub fn get(&self, name: &str) -> Option<&StrategyEntry> {
        self.entries.get(name)
    }

    /// Whether a strategy with this name is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// The registered names, sorted for stable logging.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// The number of registered strategies.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Builder for [`StrategyRegistry`].
pub struct StrategyRegistryBuilder {
    entries: HashMap<String, StrategyEntry>,
}

impl StrategyRegistryBuilder {
    /// Registers an entry under `name`. Re-registering a name replaces
    /// the previous entry.
    pub fn register(mut self, name: impl Into<String>, entry: StrategyEntry) -> Self {
        let name = name.into();
        if self.entries.insert(name.clone(), entry).is_some() {
            tracing::warn!(strategy = %name, "strategy re-registered, previous entry replaced");
        }
        self
    }

    /// Finalizes the registry.
    pub fn build(self) -> StrategyRegistry {
        let registry = StrategyRegistry {
            entries: self.entries,
        };
        if registry.is_empty() {
            tracing::warn!("strategy registry built with no strategies, every authenticate will fail");
        } else {
            tracing::debug!(strategies = ?registry.names(), "strategy registry built");
        }
        registry
    }
}

// =========================================================================
// Tests
// =========================================================================
