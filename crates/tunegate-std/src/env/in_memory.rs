#[cfg(any(test, feature = "test-support"))]
use std::collections::HashMap;
#[cfg(any(test, feature = "test-support"))]
use std::env;
#[cfg(any(test, feature = "test-support"))]
use std::sync::Mutex;

#[cfg(any(test, feature = "test-support"))]
use super::ReadEnv;

/// Won't touch the global process environment.
///
/// Backed by a `Mutex`, so it can be handed to code that requires `Sync`.
#[cfg(any(test, feature = "test-support"))]
#[derive(Default)]
pub struct InMemoryEnv {
    vars: Mutex<HashMap<String, String>>,
}

#[cfg(any(test, feature = "test-support"))]
impl InMemoryEnv {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        let env = Self::new();
        for (k, v) in pairs {
            env.set(k, v);
        }
        env
    }

    pub fn set(&self, key: impl Into<String>, value: impl Into<String>) {
        self.vars.lock().unwrap().insert(key.into(), value.into());
    }

    pub fn remove(&self, key: &str) {
        self.vars.lock().unwrap().remove(key);
    }
}

#[cfg(any(test, feature = "test-support"))]
impl ReadEnv for InMemoryEnv {
    fn var(&self, key: &str) -> Result<String, env::VarError> {
        self.vars
            .lock()
            .unwrap()
            .get(key)
            .cloned()
            .ok_or(env::VarError::NotPresent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_then_read() {
        let env = InMemoryEnv::new();
        env.set("VAULT_TOKEN", "root");
        assert_eq!(env.var("VAULT_TOKEN").unwrap(), "root");
    }

    #[test]
    fn missing_is_not_present() {
        let env = InMemoryEnv::new();
        assert!(matches!(
            env.var("VAULT_TOKEN"),
            Err(std::env::VarError::NotPresent)
        ));
    }

    #[test]
    fn remove_unsets() {
        let env = InMemoryEnv::from_pairs([("A", "1")]);
        env.remove("A");
        assert!(env.var("A").is_err());
    }

    #[test]
    fn empty_values_count_as_unset() {
        let env = InMemoryEnv::from_pairs([("EMPTY", "  "), ("FULL", "x")]);
        assert_eq!(env.non_empty("EMPTY"), None);
        assert_eq!(env.non_empty("FULL").as_deref(), Some("x"));
        assert_eq!(env.var_or("EMPTY", "default"), "default");
    }

    #[test]
    fn require_reports_the_missing_key() {
        let env = InMemoryEnv::from_pairs([("PRESENT", "yes"), ("BLANK", "")]);
        assert_eq!(env.require("PRESENT").unwrap(), "yes");

        let err = env.require("BLANK").unwrap_err();
        assert_eq!(err.to_string(), "BLANK is not set in environment variables");
        assert!(env.require("ABSENT").is_err());
    }

    #[test]
    fn is_sync() {
        fn assert_sync<T: Sync>() {}
        assert_sync::<InMemoryEnv>();
    }
}
