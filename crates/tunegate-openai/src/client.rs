//! [`ModelGateway`] implementation for the OpenAI REST API.

use std::path::Path;
use std::sync::Arc;

use reqwest::multipart::{Form, Part};
use reqwest::{Client as HttpClient, Response, StatusCode, Url};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::config::OpenAiConfig;
use crate::gateway::{GatewayError, ModelGateway};
use crate::types::{FineTuneJob, FineTuneStatus, GenerationParams, Hyperparameters};

#[derive(Clone)]
pub struct OpenAiClient {
    http: HttpClient,
    base_url: Arc<str>,
    api_key: Arc<str>,
}

#[derive(Deserialize)]
struct FileObject {
    id: String,
}

#[derive(Deserialize)]
struct JobObject {
    id: String,
    status: String,
    #[serde(default)]
    fine_tuned_model: Option<String>,
}

#[derive(Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<CompletionChoice>,
}

#[derive(Deserialize)]
struct CompletionChoice {
    text: String,
}

impl OpenAiClient {
    pub fn new(config: &OpenAiConfig) -> Result<Self, GatewayError> {
        Url::parse(&config.base_url)
            .map_err(|e| GatewayError::InvalidUrl(format!("{}: {e}", config.base_url)))?;
        let http = HttpClient::builder().timeout(config.timeout).build()?;
        Ok(Self {
            http,
            base_url: config.base_url.as_str().into(),
            api_key: config.api_key.as_str().into(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// `{base}/fine_tuning/jobs/{job_id}` with the id percent-encoded as a
    /// single path segment.
    fn job_url(&self, job_id: &str) -> Result<Url, GatewayError> {
        if matches!(job_id, "" | "." | "..") {
            return Err(GatewayError::InvalidJobId(job_id.to_string()));
        }
        let mut url = Url::parse(&self.url("/fine_tuning/jobs"))
            .map_err(|e| GatewayError::InvalidUrl(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|()| GatewayError::InvalidUrl(self.base_url.to_string()))?
            .push(job_id);
        Ok(url)
    }

    fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.http.post(self.url(path)).bearer_auth(&*self.api_key)
    }
}

/// Turn a non-2xx response into [`GatewayError::Upstream`] carrying the
/// provider's `error.message`, or the raw body when it is not JSON.
async fn check(resp: Response) -> Result<Response, GatewayError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }

    let message = upstream_message(status, resp.text().await.ok());

    warn!(status = status.as_u16(), error = %message, "Provider rejected request");
    Err(GatewayError::Upstream {
        status: status.as_u16(),
        message,
    })
}

/// The provider's `error.message`, else the raw body, else the status reason.
fn upstream_message(status: StatusCode, body: Option<String>) -> String {
    let body = body.filter(|b| !b.trim().is_empty());
    let from_json = body.as_deref().and_then(|b| {
        let value: Value = serde_json::from_str(b).ok()?;
        value.pointer("/error/message")?.as_str().map(String::from)
    });

    from_json.or(body).unwrap_or_else(|| {
        status
            .canonical_reason()
            .unwrap_or("provider returned an error")
            .to_string()
    })
}

async fn read_json<T: DeserializeOwned>(resp: Response) -> Result<T, GatewayError> {
    let body = resp.text().await?;
    serde_json::from_str(&body).map_err(|e| GatewayError::Decode(e.to_string()))
}

impl ModelGateway for OpenAiClient {
    async fn upload_training_file(&self, path: &Path, purpose: &str) -> Result<String, GatewayError> {
        let bytes = tokio::fs::read(path).await.map_err(|source| GatewayError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("training.jsonl")
            .to_string();

        let form = Form::new()
            .text("purpose", purpose.to_string())
            .part("file", Part::bytes(bytes).file_name(file_name));

        let resp = check(self.post("/files").multipart(form).send().await?).await?;
        let file: FileObject = read_json(resp).await?;

        info!(file_id = %file.id, "Training file uploaded");
        Ok(file.id)
    }

    async fn start_fine_tune(
        &self,
        file_id: &str,
        base_model: &str,
        hyperparameters: &Hyperparameters,
    ) -> Result<String, GatewayError> {
        let body = serde_json::json!({
            "training_file": file_id,
            "model": base_model,
            "hyperparameters": hyperparameters,
        });

        let resp = check(self.post("/fine_tuning/jobs").json(&body).send().await?).await?;
        let job: JobObject = read_json(resp).await?;

        info!(fine_tune_id = %job.id, base_model, "Fine-tuning job started");
        Ok(job.id)
    }

    async fn get_status(&self, job_id: &str) -> Result<FineTuneJob, GatewayError> {
        let url = self.job_url(job_id)?;
        let resp = check(self.http.get(url).bearer_auth(&*self.api_key).send().await?).await?;
        let job: JobObject = read_json(resp).await?;

        let status = FineTuneStatus::from_provider(&job.status).ok_or_else(|| {
            GatewayError::Decode(format!("unknown fine-tune status {:?}", job.status))
        })?;

        debug!(fine_tune_id = %job.id, %status, "Fetched fine-tune status");
        Ok(FineTuneJob {
            id: job.id,
            status,
            fine_tuned_model: job.fine_tuned_model,
        })
    }

    async fn predict(&self, prompt: &str, model_id: &str) -> Result<String, GatewayError> {
        let params = GenerationParams::FIXED;
        let body = serde_json::json!({
            "model": model_id,
            "prompt": prompt,
            "max_tokens": params.max_tokens,
            "temperature": params.temperature,
            "top_p": params.top_p,
            "frequency_penalty": params.frequency_penalty,
            "presence_penalty": params.presence_penalty,
        });

        let resp = check(self.post("/completions").json(&body).send().await?).await?;
        let completion: CompletionResponse = read_json(resp).await?;

        completion
            .choices
            .into_iter()
            .next()
            .map(|c| c.text.trim().to_string())
            .ok_or_else(|| GatewayError::Decode("completion has no choices".to_string()))
    }
}
