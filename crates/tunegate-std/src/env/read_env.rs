use std::env;
use std::fmt;

pub trait ReadEnv {
    fn var(&self, key: &str) -> Result<String, env::VarError>;

    /// Value of `key`, treating an empty string the same as an unset variable.
    fn non_empty(&self, key: &str) -> Option<String> {
        self.var(key).ok().filter(|v| !v.trim().is_empty())
    }

    fn var_or(&self, key: &str, default: &str) -> String {
        self.non_empty(key).unwrap_or_else(|| default.to_string())
    }

    /// Like [`non_empty`](ReadEnv::non_empty), but a missing value is an error.
    fn require(&self, key: &str) -> Result<String, MissingVar> {
        self.non_empty(key).ok_or_else(|| MissingVar(key.to_string()))
    }
}

/// A required environment variable is unset or empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingVar(pub String);

impl fmt::Display for MissingVar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} is not set in environment variables", self.0)
    }
}

impl std::error::Error for MissingVar {}
