//! In-memory [`SecretStore`] backed by `Arc<Mutex<HashMap>>`.
//!
//! For tests and local development. Holds secrets in plain process memory.

use std::collections::HashMap;
use std::convert::Infallible;
use std::sync::{Arc, Mutex};

use crate::store::SecretStore;

/// Thread-safe in-memory secret store, keyed by `(path, field)`.
///
/// `Clone` shares state, so a test can keep a handle after handing the store
/// to the code under test.
#[derive(Clone, Default)]
pub struct MemorySecretStore {
    inner: Arc<Mutex<HashMap<(String, String), String>>>,
}

impl MemorySecretStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, path: impl Into<String>, field: impl Into<String>, value: impl Into<String>) {
        self.inner
            .lock()
            .unwrap()
            .insert((path.into(), field.into()), value.into());
    }
}

impl SecretStore for MemorySecretStore {
    type Error = Infallible;

    async fn read_field(&self, path: &str, field: &str) -> Result<Option<String>, Self::Error> {
        let guard = self.inner.lock().unwrap();
        Ok(guard.get(&(path.to_string(), field.to_string())).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn insert_then_read() {
        let store = MemorySecretStore::new();
        store.insert("tunegate", "JWT_SECRET", "abc");
        assert_eq!(
            store.read_field("tunegate", "JWT_SECRET").await.unwrap(),
            Some("abc".to_string())
        );
    }

    #[tokio::test]
    async fn other_path_or_field_is_none() {
        let store = MemorySecretStore::new();
        store.insert("tunegate", "JWT_SECRET", "abc");
        assert_eq!(store.read_field("other", "JWT_SECRET").await.unwrap(), None);
        assert_eq!(store.read_field("tunegate", "OTHER").await.unwrap(), None);
    }

    #[tokio::test]
    async fn clone_shares_state() {
        let store = MemorySecretStore::new();
        let handle = store.clone();
        handle.insert("p", "f", "v");
        assert_eq!(store.read_field("p", "f").await.unwrap().as_deref(), Some("v"));
    }
}
