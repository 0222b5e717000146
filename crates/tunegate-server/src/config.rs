use tracing::warn;
use tunegate_auth::SigningSecret;
use tunegate_openai::{InferenceConfig, OpenAiConfig};
use tunegate_std::env::{MissingVar, ReadEnv};
use tunegate_vault::{
    HashicorpVaultConfig, HashicorpVaultError, HashicorpVaultStore, ResolveError, SecretStore,
    VaultAuth, resolve_field,
};

const DEFAULT_PORT: u16 = 8000;
const DEFAULT_MODEL: &str = "davinci-002";
const DEFAULT_VAULT_URL: &str = "http://localhost:8200";
const DEFAULT_VAULT_MOUNT: &str = "secret";
const DEFAULT_SECRET_PATH: &str = "tunegate";
const DEFAULT_SECRET_FIELD: &str = "JWT_SECRET";

/// Startup failures. Any of these stops the process before it binds a port.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error(transparent)]
    Missing(#[from] MissingVar),

    #[error("secret store: {0}")]
    Vault(#[from] HashicorpVaultError),

    #[error("failed to resolve signing secret: {0}")]
    Secret(#[from] ResolveError),

    #[error("{var}={value:?} is not valid, expected one of: {expected}")]
    Invalid {
        var: &'static str,
        value: String,
        expected: &'static str,
    },
}

/// Which gateway serves `/predict`. Fine-tuning always uses the provider.
#[derive(Debug, Clone)]
pub enum PredictBackend {
    Provider,
    Inference(InferenceConfig),
}

impl PredictBackend {
    /// `TUNEGATE_PREDICT_BACKEND`: `provider` (default) or `inference`.
    pub fn from_env<E: ReadEnv>(env: &E) -> Result<Self, ConfigError> {
        let raw = env.var_or("TUNEGATE_PREDICT_BACKEND", "provider");
        match raw.trim().to_ascii_lowercase().as_str() {
            "provider" | "openai" => Ok(Self::Provider),
            "inference" => Ok(Self::Inference(InferenceConfig::from_env(env)?)),
            _ => Err(ConfigError::Invalid {
                var: "TUNEGATE_PREDICT_BACKEND",
                value: raw,
                expected: "provider, inference",
            }),
        }
    }
}

/// Where the signing secret lives and how to authenticate to its store.
#[derive(Clone)]
pub struct VaultSettings {
    pub url: String,
    pub auth: VaultAuth,
    pub mount: String,
    pub path: String,
    pub field: String,
}

impl VaultSettings {
    /// `VAULT_ROLE_ID` + `VAULT_SECRET_ID` select AppRole login; otherwise
    /// `VAULT_TOKEN` is required.
    pub fn from_env<E: ReadEnv>(env: &E) -> Result<Self, MissingVar> {
        let auth = match (env.non_empty("VAULT_ROLE_ID"), env.non_empty("VAULT_SECRET_ID")) {
            (Some(role_id), Some(secret_id)) => VaultAuth::AppRole { role_id, secret_id },
            _ => VaultAuth::Token(env.require("VAULT_TOKEN")?),
        };

        Ok(Self {
            url: env.var_or("VAULT_URL", DEFAULT_VAULT_URL),
            auth,
            mount: env.var_or("VAULT_MOUNT", DEFAULT_VAULT_MOUNT),
            path: env.var_or("VAULT_SECRET_PATH", DEFAULT_SECRET_PATH),
            field: env.var_or("VAULT_SECRET_FIELD", DEFAULT_SECRET_FIELD),
        })
    }

    /// Authenticate with the configured store.
    pub async fn connect(&self) -> Result<HashicorpVaultStore, ConfigError> {
        let config = HashicorpVaultConfig::new(&self.url, &self.mount, self.auth.clone());
        Ok(HashicorpVaultStore::new(config).await?)
    }
}

impl std::fmt::Debug for VaultSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let auth = match self.auth {
            VaultAuth::Token(_) => "token",
            VaultAuth::AppRole { .. } => "approle",
        };
        f.debug_struct("VaultSettings")
            .field("url", &self.url)
            .field("auth", &auth)
            .field("mount", &self.mount)
            .field("path", &self.path)
            .field("field", &self.field)
            .finish()
    }
}

/// Everything the gateway process needs, read once at startup.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub openai: OpenAiConfig,
    pub vault: VaultSettings,
    pub predict_backend: PredictBackend,
    pub port: u16,
    /// Model used by `/predict` when the request names none.
    pub predict_model: String,
    /// Base model for `/fine-tune` when the request names none.
    pub base_model: String,
}

impl GatewayConfig {
    pub fn from_env<E: ReadEnv>(env: &E) -> Result<Self, ConfigError> {
        let port = match env.non_empty("TUNEGATE_PORT") {
            None => DEFAULT_PORT,
            Some(raw) => raw.parse().unwrap_or_else(|_| {
                warn!("TUNEGATE_PORT={raw:?} is not a valid port, using {DEFAULT_PORT}");
                DEFAULT_PORT
            }),
        };

        Ok(Self {
            openai: OpenAiConfig::from_env(env)?,
            vault: VaultSettings::from_env(env)?,
            predict_backend: PredictBackend::from_env(env)?,
            port,
            predict_model: env.var_or("TUNEGATE_PREDICT_MODEL", DEFAULT_MODEL),
            base_model: env.var_or("TUNEGATE_BASE_MODEL", DEFAULT_MODEL),
        })
    }
}

/// Read the signing secret named by `settings` from `store`.
pub async fn resolve_signing_secret<S: SecretStore>(
    store: &S,
    settings: &VaultSettings,
) -> Result<SigningSecret, ConfigError> {
    let value = resolve_field(store, &settings.path, &settings.field).await?;
    SigningSecret::new(value).map_err(|_| {
        ConfigError::Secret(ResolveError::MissingField {
            path: settings.path.clone(),
            field: settings.field.clone(),
        })
    })
}
