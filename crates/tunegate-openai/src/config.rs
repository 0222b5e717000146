use std::time::Duration;

use tracing::warn;
use tunegate_std::env::{MissingVar, ReadEnv};

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_TIMEOUT_SECS: u64 = 300;

#[derive(Clone)]
pub struct OpenAiConfig {
    /// Provider API key (`OPENAI_API_KEY`).
    pub api_key: String,
    /// Env: `OPENAI_BASE_URL`. Default: `https://api.openai.com/v1`.
    pub base_url: String,
    /// Env: `OPENAI_TIMEOUT_SECS`. Default: `300`.
    pub timeout: Duration,
}

impl OpenAiConfig {
    pub fn from_env<E: ReadEnv>(env: &E) -> Result<Self, MissingVar> {
        let api_key = env.require("OPENAI_API_KEY")?;
        let base_url = env
            .var_or("OPENAI_BASE_URL", DEFAULT_BASE_URL)
            .trim_end_matches('/')
            .to_string();

        let timeout_secs = match env.non_empty("OPENAI_TIMEOUT_SECS") {
            None => DEFAULT_TIMEOUT_SECS,
            Some(raw) => raw.parse().unwrap_or_else(|_| {
                warn!("OPENAI_TIMEOUT_SECS={raw:?} is not a valid integer, using default");
                DEFAULT_TIMEOUT_SECS
            }),
        };

        Ok(Self {
            api_key,
            base_url,
            timeout: Duration::from_secs(timeout_secs),
        })
    }
}

impl std::fmt::Debug for OpenAiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiConfig")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tunegate_std::InMemoryEnv;

    #[test]
    fn api_key_is_required() {
        let env = InMemoryEnv::new();
        let err = OpenAiConfig::from_env(&env).unwrap_err();
        assert_eq!(err, MissingVar("OPENAI_API_KEY".to_string()));
    }

    #[test]
    fn defaults() {
        let env = InMemoryEnv::from_pairs([("OPENAI_API_KEY", "sk-test")]);
        let config = OpenAiConfig::from_env(&env).unwrap();

        assert_eq!(config.api_key, "sk-test");
        assert_eq!(config.base_url, "https://api.openai.com/v1");
        assert_eq!(config.timeout, Duration::from_secs(300));
    }

    #[test]
    fn reads_overrides() {
        let env = InMemoryEnv::from_pairs([
            ("OPENAI_API_KEY", "sk-test"),
            ("OPENAI_BASE_URL", "http://localhost:9000/v1/"),
            ("OPENAI_TIMEOUT_SECS", "12"),
        ]);
        let config = OpenAiConfig::from_env(&env).unwrap();

        assert_eq!(config.base_url, "http://localhost:9000/v1");
        assert_eq!(config.timeout, Duration::from_secs(12));
    }

    #[test]
    fn invalid_timeout_falls_back_to_default() {
        let env = InMemoryEnv::from_pairs([
            ("OPENAI_API_KEY", "sk-test"),
            ("OPENAI_TIMEOUT_SECS", "soon"),
        ]);
        let config = OpenAiConfig::from_env(&env).unwrap();
        assert_eq!(config.timeout, Duration::from_secs(DEFAULT_TIMEOUT_SECS));
    }

    #[test]
    fn debug_hides_api_key() {
        let env = InMemoryEnv::from_pairs([("OPENAI_API_KEY", "sk-very-secret")]);
        let config = OpenAiConfig::from_env(&env).unwrap();
        assert!(!format!("{config:?}").contains("sk-very-secret"));
    }
}
