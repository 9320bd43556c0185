//! Type Registry
//!
//! Maps type tags to reconstruction rules. A registry has two phases:
//!
//! - [`RegistryBuilder`] is open for registration during initialization
//! - [`Registry`] is the frozen result; it is immutable, cheap to clone and
//!   safe to share between threads, so lookups never take a lock
//!
//! # Example
//!
//! ```ignore
//! let registry = RegistryBuilder::with_builtins()?
//!     .register("Point", |args| Ok(Value::list(args)))?
//!     .freeze();
//! telepath::install(registry)?;
//! ```

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, OnceLock};

use telepath_value::{ConversionError, FromArgs, Value};
use tracing::debug;

use crate::adapters;
use crate::error::{DecodeError, RegistryError};

/// A reconstruction rule: builds a value from the node's reconstructed
/// arguments, in wire order.
pub type Rule = Arc<dyn Fn(Vec<Value>) -> Result<Value, ConversionError> + Send + Sync>;

/// Registry in its write phase.
#[derive(Default)]
pub struct RegistryBuilder {
    rules: HashMap<String, Rule>,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// A builder with the shipped adapters already registered.
    pub fn with_builtins() -> Result<Self, RegistryError> {
        let mut builder = Self::new();
        adapters::register_builtins(&mut builder)?;
        Ok(builder)
    }

    /// Register a rule under `tag`.
    pub fn register<F>(&mut self, tag: impl Into<String>, rule: F) -> Result<&mut Self, RegistryError>
    where
        F: Fn(Vec<Value>) -> Result<Value, ConversionError> + Send + Sync + 'static,
    {
        let tag = tag.into();
        if tag.is_empty() {
            return Err(RegistryError::EmptyTag);
        }
        match self.rules.entry(tag) {
            Entry::Occupied(entry) => Err(RegistryError::DuplicateTag(entry.key().clone())),
            Entry::Vacant(entry) => {
                debug!(tag = %entry.key(), "registered adapter");
                entry.insert(Arc::new(rule));
                Ok(self)
            }
        }
    }

    /// Register `T` under `T::TAG`; instances come back as `Value::Object`.
    pub fn register_type<T: FromArgs>(&mut self) -> Result<&mut Self, RegistryError> {
        self.register(T::TAG, |args| T::from_args(args).map(Value::object))
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.rules.contains_key(tag)
    }

    /// End the write phase.
    pub fn freeze(&mut self) -> Registry {
        let rules = std::mem::take(&mut self.rules);
        debug!(adapters = rules.len(), "registry frozen");
        Registry {
            rules: Arc::new(rules),
        }
    }
}

impl fmt::Debug for RegistryBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistryBuilder")
            .field("tags", &sorted_tags(&self.rules))
            .finish()
    }
}

/// Frozen registry.
#[derive(Clone)]
pub struct Registry {
    rules: Arc<HashMap<String, Rule>>,
}

impl Registry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    pub fn lookup(&self, tag: &str) -> Result<&Rule, DecodeError> {
        self.rules
            .get(tag)
            .ok_or_else(|| DecodeError::UnknownTag(tag.to_string()))
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.rules.contains_key(tag)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Registered tags, sorted.
    pub fn tags(&self) -> Vec<&str> {
        sorted_tags(&self.rules)
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("tags", &self.tags())
            .finish()
    }
}

fn sorted_tags(rules: &HashMap<String, Rule>) -> Vec<&str> {
    let mut tags: Vec<&str> = rules.keys().map(String::as_str).collect();
    tags.sort_unstable();
    tags
}

// ============================================================================
// Process-wide registry
// ============================================================================

static GLOBAL: OnceLock<Registry> = OnceLock::new();

/// Install the process-wide registry used by [`crate::decode`]. Only the
/// first call succeeds.
pub fn install(registry: Registry) -> Result<(), RegistryError> {
    let tags = registry.len();
    GLOBAL
        .set(registry)
        .map_err(|_| RegistryError::AlreadyInstalled)?;
    debug!(adapters = tags, "installed process-wide registry");
    Ok(())
}

pub fn global() -> Option<&'static Registry> {
    GLOBAL.get()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_tags_are_rejected() {
        let mut builder = RegistryBuilder::new();
        builder.register("Point", |args| Ok(Value::list(args))).unwrap();
        let err = builder
            .register("Point", |_| Ok(Value::Null))
            .err()
            .expect("duplicate");
        assert_eq!(err, RegistryError::DuplicateTag("Point".to_string()));
    }

    #[test]
    fn empty_tag_is_rejected() {
        let mut builder = RegistryBuilder::new();
        assert_eq!(
            builder.register("", |_| Ok(Value::Null)).err(),
            Some(RegistryError::EmptyTag)
        );
    }

    #[test]
    fn lookup_after_freeze() {
        let registry = RegistryBuilder::new()
            .register("Pair", |args| Ok(Value::list(args)))
            .unwrap()
            .register("Unit", |_| Ok(Value::Null))
            .unwrap()
            .freeze();

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.tags(), vec!["Pair", "Unit"]);

        let rule = registry.lookup("Pair").unwrap();
        let built = rule(vec![Value::from(1), Value::from(2)]).unwrap();
        assert_eq!(built, Value::from(vec![1, 2]));

        match registry.lookup("Missing") {
            Err(DecodeError::UnknownTag(tag)) => assert_eq!(tag, "Missing"),
            other => panic!("expected UnknownTag, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn repeated_lookups_give_equivalent_results() {
        let registry = RegistryBuilder::with_builtins().unwrap().freeze();
        let first = registry.lookup("ObjectId").unwrap()(vec![Value::from("abc")]).unwrap();
        let second = registry.lookup("ObjectId").unwrap()(vec![Value::from("abc")]).unwrap();
        assert_eq!(first, second);
        assert!(!first.same_instance(&second));
    }

    #[test]
    fn frozen_registry_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Registry>();
    }
}
