//! HashiCorp Vault (and OpenBao) KV v2 backend for [`SecretStore`].
//!
//! Secret path → Vault URL mapping:
//! ```text
//! tunegate  →  {addr}/v1/{mount}/data/tunegate
//! ```

use reqwest::Client;
use serde_json::Value;

use crate::store::SecretStore;

// ── Public types ──────────────────────────────────────────────────────────────

/// How the client authenticates with Vault / OpenBao.
#[derive(Clone)]
pub enum VaultAuth {
    /// Static Vault token (e.g. from `VAULT_TOKEN`). Checked once with
    /// `lookup-self` when the store is created.
    Token(String),
    /// AppRole authentication. A token is obtained via `/v1/auth/approle/login`.
    AppRole { role_id: String, secret_id: String },
}

/// Configuration for [`HashicorpVaultStore`].
pub struct HashicorpVaultConfig {
    pub vault_addr: String,
    pub mount: String,
    pub auth: VaultAuth,
}

impl HashicorpVaultConfig {
    pub fn new(vault_addr: impl Into<String>, mount: impl Into<String>, auth: VaultAuth) -> Self {
        Self {
            vault_addr: vault_addr.into().trim_end_matches('/').to_string(),
            mount: mount.into().trim_matches('/').to_string(),
            auth,
        }
    }
}

/// Errors produced by [`HashicorpVaultStore`].
#[derive(Debug)]
pub enum HashicorpVaultError {
    /// An HTTP transport error (store unreachable, TLS failure, ...).
    Http(reqwest::Error),
    /// Vault returned a non-2xx status code.
    Api { status: u16, errors: Vec<String> },
    /// Authentication failed or the response is missing a client token.
    Auth(String),
    /// The secret exists but has an unexpected shape.
    Deserialize(String),
}

impl std::fmt::Display for HashicorpVaultError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Http(e) => write!(f, "HTTP error: {e}"),
            Self::Api { status, errors } => {
                write!(f, "Vault API error ({status}): {}", errors.join(", "))
            }
            Self::Auth(msg) => write!(f, "Vault auth error: {msg}"),
            Self::Deserialize(msg) => write!(f, "deserialization error: {msg}"),
        }
    }
}

impl std::error::Error for HashicorpVaultError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Http(e) => Some(e),
            _ => None,
        }
    }
}

// ── Store ─────────────────────────────────────────────────────────────────────

/// [`SecretStore`] backed by a HashiCorp Vault (or OpenBao) KV v2 mount.
pub struct HashicorpVaultStore {
    client: Client,
    vault_addr: String,
    mount: String,
    token: String,
}

impl HashicorpVaultStore {
    /// Create a store and authenticate with Vault.
    ///
    /// A static token is validated with `GET /v1/auth/token/lookup-self`, so a
    /// bad token fails here rather than on the first read.
    pub async fn new(config: HashicorpVaultConfig) -> Result<Self, HashicorpVaultError> {
        let client = Client::new();
        let token = authenticate(&client, &config.vault_addr, &config.auth).await?;

        Ok(Self {
            client,
            vault_addr: config.vault_addr,
            mount: config.mount,
            token,
        })
    }

    fn data_url(&self, path: &str) -> String {
        format!(
            "{}/v1/{}/data/{}",
            self.vault_addr,
            self.mount,
            path.trim_matches('/'),
        )
    }
}

// ── Free-standing auth helpers ────────────────────────────────────────────────

async fn authenticate(
    client: &Client,
    vault_addr: &str,
    auth: &VaultAuth,
) -> Result<String, HashicorpVaultError> {
    match auth {
        VaultAuth::Token(t) => {
            lookup_self(client, vault_addr, t).await?;
            Ok(t.clone())
        }
        VaultAuth::AppRole { role_id, secret_id } => {
            approle_login(client, vault_addr, role_id, secret_id).await
        }
    }
}

async fn lookup_self(
    client: &Client,
    vault_addr: &str,
    token: &str,
) -> Result<(), HashicorpVaultError> {
    let url = format!("{vault_addr}/v1/auth/token/lookup-self");
    let resp = client
        .get(&url)
        .header("X-Vault-Token", token)
        .send()
        .await
        .map_err(HashicorpVaultError::Http)?;

    if resp.status().is_success() {
        Ok(())
    } else {
        let status = resp.status().as_u16();
        let errors = parse_vault_errors(resp).await;
        Err(HashicorpVaultError::Auth(format!(
            "token rejected ({status}): {}",
            errors.join(", ")
        )))
    }
}

async fn approle_login(
    client: &Client,
    vault_addr: &str,
    role_id: &str,
    secret_id: &str,
) -> Result<String, HashicorpVaultError> {
    let url = format!("{vault_addr}/v1/auth/approle/login");
    let body = serde_json::json!({"role_id": role_id, "secret_id": secret_id});
    let resp = client
        .post(&url)
        .json(&body)
        .send()
        .await
        .map_err(HashicorpVaultError::Http)?;

    if resp.status().is_success() {
        let json: Value = resp.json().await.map_err(HashicorpVaultError::Http)?;
        json.pointer("/auth/client_token")
            .and_then(|v| v.as_str())
            .map(String::from)
            .ok_or_else(|| {
                HashicorpVaultError::Auth("missing client_token in approle login response".into())
            })
    } else {
        let status = resp.status().as_u16();
        let errors = parse_vault_errors(resp).await;
        Err(HashicorpVaultError::Api { status, errors })
    }
}

async fn parse_vault_errors(resp: reqwest::Response) -> Vec<String> {
    resp.json::<Value>()
        .await
        .ok()
        .and_then(|v| {
            v.get("errors")?.as_array().map(|arr| {
                arr.iter()
                    .filter_map(|e| e.as_str().map(String::from))
                    .collect()
            })
        })
        .unwrap_or_default()
}

// ── SecretStore impl ──────────────────────────────────────────────────────────

impl SecretStore for HashicorpVaultStore {
    type Error = HashicorpVaultError;

    async fn read_field(&self, path: &str, field: &str) -> Result<Option<String>, Self::Error> {
        let resp = self
            .client
            .get(self.data_url(path))
            .header("X-Vault-Token", &self.token)
            .send()
            .await
            .map_err(HashicorpVaultError::Http)?;

        let status = resp.status();
        if status.as_u16() == 404 {
            return Ok(None);
        }

        if !status.is_success() {
            let errors = parse_vault_errors(resp).await;
            return Err(HashicorpVaultError::Api {
                status: status.as_u16(),
                errors,
            });
        }

        let json: Value = resp.json().await.map_err(HashicorpVaultError::Http)?;
        let data = json.pointer("/data/data").ok_or_else(|| {
            HashicorpVaultError::Deserialize("missing .data.data in Vault response".to_string())
        })?;

        match data.get(field) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.clone())),
            Some(_) => Err(HashicorpVaultError::Deserialize(format!(
                "field {field} is not a string"
            ))),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    fn mock_lookup_self(server: &MockServer) -> httpmock::Mock<'_> {
        server.mock(|when, then| {
            when.method(GET)
                .path("/v1/auth/token/lookup-self")
                .header("x-vault-token", "test-token");
            then.status(200)
                .header("content-type", "application/json")
                .body(r#"{"data":{"id":"test-token","policies":["default"]}}"#);
        })
    }

    async fn token_store(server: &MockServer) -> HashicorpVaultStore {
        let vault_addr = format!("http://{}", server.address());
        let config = HashicorpVaultConfig::new(
            &vault_addr,
            "secret",
            VaultAuth::Token("test-token".to_string()),
        );
        HashicorpVaultStore::new(config).await.unwrap()
    }

    #[tokio::test]
    async fn data_url_format() {
        let server = MockServer::start();
        mock_lookup_self(&server);
        let store = token_store(&server).await;
        assert_eq!(
            store.data_url("/tunegate/"),
            format!("http://{}/v1/secret/data/tunegate", server.address())
        );
    }

    #[tokio::test]
    async fn token_is_checked_on_new() {
        let server = MockServer::start();
        let lookup = mock_lookup_self(&server);
        token_store(&server).await;
        lookup.assert();
    }

    #[tokio::test]
    async fn rejected_token_fails_new() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/v1/auth/token/lookup-self");
            then.status(403)
                .header("content-type", "application/json")
                .body(r#"{"errors":["permission denied"]}"#);
        });

        let config = HashicorpVaultConfig::new(
            format!("http://{}", server.address()),
            "secret",
            VaultAuth::Token("bad".to_string()),
        );
        let result = HashicorpVaultStore::new(config).await;
        match result {
            Err(HashicorpVaultError::Auth(msg)) => assert!(msg.contains("permission denied")),
            Err(other) => panic!("expected auth error, got {other}"),
            Ok(_) => panic!("expected auth error, got a store"),
        }
    }

    #[tokio::test]
    async fn unreachable_vault_is_http_error() {
        // Nothing listens on port 1.
        let config = HashicorpVaultConfig::new(
            "http://127.0.0.1:1",
            "secret",
            VaultAuth::Token("t".to_string()),
        );
        let result = HashicorpVaultStore::new(config).await;
        assert!(matches!(result, Err(HashicorpVaultError::Http(_))));
    }

    #[tokio::test]
    async fn read_field_returns_value() {
        let server = MockServer::start();
        mock_lookup_self(&server);
        let read = server.mock(|when, then| {
            when.method(GET)
                .path("/v1/secret/data/tunegate")
                .header("x-vault-token", "test-token");
            then.status(200)
                .header("content-type", "application/json")
                .body(r#"{"data":{"data":{"JWT_SECRET":"hs256-secret"},"metadata":{"version":3}}}"#);
        });

        let store = token_store(&server).await;
        let value = store.read_field("tunegate", "JWT_SECRET").await.unwrap();
        assert_eq!(value.as_deref(), Some("hs256-secret"));
        read.assert();
    }

    #[tokio::test]
    async fn read_field_absent_field_is_none() {
        let server = MockServer::start();
        mock_lookup_self(&server);
        server.mock(|when, then| {
            when.method(GET).path("/v1/secret/data/tunegate");
            then.status(200)
                .header("content-type", "application/json")
                .body(r#"{"data":{"data":{"OTHER":"x"},"metadata":{}}}"#);
        });

        let store = token_store(&server).await;
        assert_eq!(store.read_field("tunegate", "JWT_SECRET").await.unwrap(), None);
    }

    #[tokio::test]
    async fn read_field_404_is_none() {
        let server = MockServer::start();
        mock_lookup_self(&server);
        server.mock(|when, then| {
            when.method(GET).path("/v1/secret/data/tunegate");
            then.status(404)
                .header("content-type", "application/json")
                .body(r#"{"errors":[]}"#);
        });

        let store = token_store(&server).await;
        assert_eq!(store.read_field("tunegate", "JWT_SECRET").await.unwrap(), None);
    }

    #[tokio::test]
    async fn read_field_non_string_is_deserialize_error() {
        let server = MockServer::start();
        mock_lookup_self(&server);
        server.mock(|when, then| {
            when.method(GET).path("/v1/secret/data/tunegate");
            then.status(200)
                .header("content-type", "application/json")
                .body(r#"{"data":{"data":{"JWT_SECRET":42}}}"#);
        });

        let store = token_store(&server).await;
        let result = store.read_field("tunegate", "JWT_SECRET").await;
        assert!(matches!(result, Err(HashicorpVaultError::Deserialize(_))));
    }

    #[tokio::test]
    async fn api_error_propagated() {
        let server = MockServer::start();
        mock_lookup_self(&server);
        server.mock(|when, then| {
            when.method(GET).path("/v1/secret/data/tunegate");
            then.status(403)
                .header("content-type", "application/json")
                .body(r#"{"errors":["permission denied"]}"#);
        });

        let store = token_store(&server).await;
        let result = store.read_field("tunegate", "JWT_SECRET").await;
        assert!(matches!(result, Err(HashicorpVaultError::Api { status: 403, .. })));
    }

    #[tokio::test]
    async fn approle_login_on_new() {
        let server = MockServer::start();
        let login = server.mock(|when, then| {
            when.method(POST)
                .path("/v1/auth/approle/login")
                .json_body(serde_json::json!({"role_id": "my-role", "secret_id": "my-secret"}));
            then.status(200)
                .header("content-type", "application/json")
                .body(r#"{"auth":{"client_token":"hvs.approle","lease_duration":3600,"renewable":true}}"#);
        });
        let read = server.mock(|when, then| {
            when.method(GET)
                .path("/v1/secret/data/tunegate")
                .header("x-vault-token", "hvs.approle");
            then.status(200)
                .header("content-type", "application/json")
                .body(r#"{"data":{"data":{"JWT_SECRET":"from-approle"}}}"#);
        });

        let config = HashicorpVaultConfig::new(
            format!("http://{}", server.address()),
            "secret",
            VaultAuth::AppRole {
                role_id: "my-role".to_string(),
                secret_id: "my-secret".to_string(),
            },
        );
        let store = HashicorpVaultStore::new(config).await.unwrap();
        let value = store.read_field("tunegate", "JWT_SECRET").await.unwrap();

        assert_eq!(value.as_deref(), Some("from-approle"));
        login.assert();
        read.assert();
    }
}
