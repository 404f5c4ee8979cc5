//! Namespaced, thread-safe fact container.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use serde_json::{Map, Value};

/// Maps a namespace label to an arbitrary JSON value.
///
/// Every probe and provider of a collection run merges its result here.
/// `add` takes `&self`, so any number of threads can share one store; writes
/// to different namespaces never interfere and a race on the same namespace
/// resolves to whichever write lands last.
#[derive(Debug, Default)]
pub struct FactStore {
    facts: Mutex<BTreeMap<String, Value>>,
}

impl FactStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces the entry for `namespace`.
    pub fn add(&self, namespace: impl Into<String>, value: Value) {
        self.lock().insert(namespace.into(), value);
    }

    /// Returns a copy of the entry for `namespace`.
    pub fn get(&self, namespace: &str) -> Option<Value> {
        self.lock().get(namespace).cloned()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Returns the namespaces currently present, sorted.
    pub fn namespaces(&self) -> Vec<String> {
        self.lock().keys().cloned().collect()
    }

    /// Consumes the store and returns the finished document.
    pub fn into_document(self) -> Value {
        let facts = self
            .facts
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner);
        Value::Object(facts.into_iter().collect::<Map<String, Value>>())
    }

    // A panicking writer cannot leave a half-inserted entry behind, so a
    // poisoned map is still consistent.
    fn lock(&self) -> MutexGuard<'_, BTreeMap<String, Value>> {
        self.facts.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
