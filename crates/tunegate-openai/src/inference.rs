//! [`ModelGateway`] for a self-hosted text-generation endpoint.
//!
//! The endpoint takes `{"inputs": ..., "parameters": {...}}` and answers
//! `{"generated_text": ...}`. It only generates text: the fine-tuning
//! operations return [`GatewayError::Unsupported`].

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use reqwest::Client as HttpClient;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};
use tunegate_std::env::{MissingVar, ReadEnv};

use crate::gateway::{GatewayError, ModelGateway};
use crate::types::{FineTuneJob, Hyperparameters};

const BACKEND: &str = "inference";
const DEFAULT_TIMEOUT_SECS: u64 = 60;

#[derive(Clone)]
pub struct InferenceConfig {
    /// Full generate URL, e.g. `http://localhost:8080/generate` (`INFERENCE_URL`).
    pub url: String,
    /// Sent as a bearer token when set (`INFERENCE_API_KEY`).
    pub api_key: Option<String>,
    /// Env: `INFERENCE_TIMEOUT_SECS`. Default: `60`.
    pub timeout: Duration,
}

impl InferenceConfig {
    pub fn from_env<E: ReadEnv>(env: &E) -> Result<Self, MissingVar> {
        let timeout_secs = match env.non_empty("INFERENCE_TIMEOUT_SECS") {
            None => DEFAULT_TIMEOUT_SECS,
            Some(raw) => raw.parse().unwrap_or_else(|_| {
                warn!("INFERENCE_TIMEOUT_SECS={raw:?} is not a valid integer, using default");
                DEFAULT_TIMEOUT_SECS
            }),
        };

        Ok(Self {
            url: env.require("INFERENCE_URL")?,
            api_key: env.non_empty("INFERENCE_API_KEY"),
            timeout: Duration::from_secs(timeout_secs),
        })
    }
}

impl std::fmt::Debug for InferenceConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InferenceConfig")
            .field("url", &self.url)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Sampling settings sent with every generate request.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct InferenceParams {
    pub max_new_tokens: u32,
    pub temperature: f64,
}

impl InferenceParams {
    pub const FIXED: Self = Self {
        max_new_tokens: 200,
        temperature: 0.7,
    };
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    inputs: &'a str,
    parameters: InferenceParams,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    generated_text: String,
}

#[derive(Clone)]
pub struct InferenceClient {
    http: HttpClient,
    url: Arc<str>,
    api_key: Option<Arc<str>>,
}

impl InferenceClient {
    pub fn new(config: &InferenceConfig) -> Result<Self, GatewayError> {
        reqwest::Url::parse(&config.url)
            .map_err(|e| GatewayError::InvalidUrl(format!("{}: {e}", config.url)))?;
        let http = HttpClient::builder().timeout(config.timeout).build()?;
        Ok(Self {
            http,
            url: config.url.as_str().into(),
            api_key: config.api_key.as_deref().map(Arc::from),
        })
    }
}

fn unsupported(operation: &'static str) -> GatewayError {
    GatewayError::Unsupported {
        backend: BACKEND,
        operation,
    }
}

impl ModelGateway for InferenceClient {
    async fn upload_training_file(&self, _path: &Path, _purpose: &str) -> Result<String, GatewayError> {
        Err(unsupported("upload_training_file"))
    }

    async fn start_fine_tune(
        &self,
        _file_id: &str,
        _base_model: &str,
        _hyperparameters: &Hyperparameters,
    ) -> Result<String, GatewayError> {
        Err(unsupported("start_fine_tune"))
    }

    async fn get_status(&self, _job_id: &str) -> Result<FineTuneJob, GatewayError> {
        Err(unsupported("get_status"))
    }

    /// The endpoint serves a single model, so `model_id` is only logged.
    async fn predict(&self, prompt: &str, model_id: &str) -> Result<String, GatewayError> {
        debug!(model_id, "Generating with self-hosted endpoint");

        let body = GenerateRequest {
            inputs: prompt,
            parameters: InferenceParams::FIXED,
        };
        let mut req = self.http.post(&*self.url).json(&body);
        if let Some(key) = &self.api_key {
            req = req.bearer_auth(key);
        }

        let resp = req.send().await?;
        let status = resp.status();
        let text = resp.text().await?;

        if !status.is_success() {
            // FastAPI-style `{"detail": "..."}`, else the raw body.
            let message = serde_json::from_str::<Value>(&text)
                .ok()
                .and_then(|v| v.get("detail")?.as_str().map(String::from))
                .filter(|m| !m.is_empty())
                .or_else(|| Some(text.clone()).filter(|t| !t.trim().is_empty()))
                .unwrap_or_else(|| status.canonical_reason().unwrap_or("inference error").to_string());
            warn!(status = status.as_u16(), error = %message, "Inference endpoint rejected request");
            return Err(GatewayError::Upstream {
                status: status.as_u16(),
                message,
            });
        }

        let generated: GenerateResponse =
            serde_json::from_str(&text).map_err(|e| GatewayError::Decode(e.to_string()))?;
        if generated.generated_text.is_empty() {
            return Err(GatewayError::Decode("no text generated".to_string()));
        }
        Ok(generated.generated_text)
    }
}
