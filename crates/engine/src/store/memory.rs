//! In-memory [`KvStore`] used by tests and `--memory` runs.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;

use crate::ResultEngine;

use super::KvStore;

/// A `BTreeMap` behind a mutex. Cloning shares the underlying map.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    entries: Arc<Mutex<BTreeMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BTreeMap<String, String>> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl KvStore for MemoryStore {
    async fn get(&self, key: &str) -> ResultEngine<Option<String>> {
        Ok(self.lock().get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> ResultEngine<()> {
        self.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> ResultEngine<()> {
        self.lock().remove(key);
        Ok(())
    }

    async fn keys(&self) -> ResultEngine<Vec<String>> {
        Ok(self.lock().keys().cloned().collect())
    }

    async fn multi_get(&self, keys: &[String]) -> ResultEngine<Vec<(String, Option<String>)>> {
        let entries = self.lock();
        Ok(keys
            .iter()
            .map(|key| (key.clone(), entries.get(key).cloned()))
            .collect())
    }

    async fn multi_remove(&self, keys: &[String]) -> ResultEngine<()> {
        let mut entries = self.lock();
        for key in keys {
            entries.remove(key);
        }
        Ok(())
    }
}
