use std::future::Future;
use std::sync::Arc;

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::http::header::AUTHORIZATION;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{Span, info, instrument};
use tunegate_auth::{AuthError, TokenValidator};
use tunegate_openai::{FineTuneStatus, Hyperparameters, ModelGateway};

use crate::error::ApiError;
use crate::signal::shutdown_signal;

const TEXT_REQUIRED: &str = "Input data must contain 'text' field.";
const FILE_ID_REQUIRED: &str = "Request must contain 'training_file_id' field.";
const JOB_ID_REQUIRED: &str = "Query must contain 'fine_tune_id' parameter.";

/// Shared, read-only request state.
#[derive(Clone)]
pub struct AppState<G> {
    pub gateway: G,
    pub validator: Arc<TokenValidator>,
    pub predict_model: String,
    pub base_model: String,
}

impl<G: ModelGateway> AppState<G> {
    pub fn new(
        gateway: G,
        validator: TokenValidator,
        predict_model: impl Into<String>,
        base_model: impl Into<String>,
    ) -> Self {
        Self {
            gateway,
            validator: Arc::new(validator),
            predict_model: predict_model.into(),
            base_model: base_model.into(),
        }
    }

    fn authenticate(&self, headers: &HeaderMap) -> Result<String, AuthError> {
        let subject = self.validator.validate(authorization(headers))?;
        Span::current().record("subject", subject.as_str());
        Ok(subject)
    }
}

#[derive(Debug, Deserialize)]
pub struct PredictionRequest {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub model: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PredictionResponse {
    pub prediction: String,
}

#[derive(Debug, Deserialize)]
pub struct FineTuneRequest {
    #[serde(default)]
    pub training_file_id: String,
    #[serde(default)]
    pub model: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FineTuneResponse {
    pub status: String,
    pub fine_tune_id: String,
}

#[derive(Debug, Deserialize)]
pub struct StatusQuery {
    pub fine_tune_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StatusResponse {
    pub fine_tune_id: String,
    pub status: FineTuneStatus,
}

/// Build the gateway router.
pub fn router<G: ModelGateway>(state: AppState<G>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/predict", post(predict::<G>))
        .route("/fine-tune", post(fine_tune::<G>))
        .route("/status", get(status::<G>))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve `app` until SIGINT or SIGTERM, then drain in-flight requests.
pub async fn serve(listener: TcpListener, app: Router) -> std::io::Result<()> {
    serve_until(listener, app, shutdown_signal()).await
}

/// Serve `app` until `shutdown` resolves.
pub async fn serve_until<F>(listener: TcpListener, app: Router, shutdown: F) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;
    info!("Gateway stopped");
    Ok(())
}

fn authorization(headers: &HeaderMap) -> Option<&str> {
    // A non-UTF-8 value is treated as present but malformed.
    headers
        .get(AUTHORIZATION)
        .map(|v| v.to_str().unwrap_or_default())
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "healthy" }))
}

#[instrument(
    name = "tunegate.predict",
    skip_all,
    fields(subject = tracing::field::Empty, model = tracing::field::Empty)
)]
async fn predict<G: ModelGateway>(
    State(state): State<AppState<G>>,
    headers: HeaderMap,
    body: Result<Json<PredictionRequest>, JsonRejection>,
) -> Result<Json<PredictionResponse>, ApiError> {
    // A missing header is rejected before the body is looked at; a present
    // but invalid token only after.
    if authorization(&headers).is_none() {
        return Err(AuthError::MissingHeader.into());
    }

    let Json(request) = body?;
    if request.text.trim().is_empty() {
        return Err(ApiError::BadRequest(TEXT_REQUIRED.to_string()));
    }

    state.authenticate(&headers)?;

    let model = non_empty(request.model).unwrap_or_else(|| state.predict_model.clone());
    Span::current().record("model", model.as_str());

    let gateway = state.gateway.clone();
    let text = request.text;
    let prediction = tokio::spawn(async move { gateway.predict(&text, &model).await })
        .await
        .map_err(|e| ApiError::Internal(format!("prediction task failed: {e}")))??;

    Ok(Json(PredictionResponse { prediction }))
}

#[instrument(
    name = "tunegate.fine_tune",
    skip_all,
    fields(subject = tracing::field::Empty, fine_tune_id = tracing::field::Empty)
)]
async fn fine_tune<G: ModelGateway>(
    State(state): State<AppState<G>>,
    headers: HeaderMap,
    body: Result<Json<FineTuneRequest>, JsonRejection>,
) -> Result<Json<FineTuneResponse>, ApiError> {
    state.authenticate(&headers)?;

    let Json(request) = body?;
    if request.training_file_id.trim().is_empty() {
        return Err(ApiError::BadRequest(FILE_ID_REQUIRED.to_string()));
    }
    let base_model = non_empty(request.model).unwrap_or_else(|| state.base_model.clone());

    let job_id = state
        .gateway
        .start_fine_tune(&request.training_file_id, &base_model, &Hyperparameters::default())
        .await?;
    Span::current().record("fine_tune_id", job_id.as_str());

    Ok(Json(FineTuneResponse {
        status: "Fine-tune job created".to_string(),
        fine_tune_id: job_id,
    }))
}

#[instrument(
    name = "tunegate.status",
    skip_all,
    fields(subject = tracing::field::Empty)
)]
async fn status<G: ModelGateway>(
    State(state): State<AppState<G>>,
    headers: HeaderMap,
    query: Result<Query<StatusQuery>, QueryRejection>,
) -> Result<Json<StatusResponse>, ApiError> {
    state.authenticate(&headers)?;

    let Query(query) = query?;
    let job_id = non_empty(query.fine_tune_id)
        .ok_or_else(|| ApiError::BadRequest(JOB_ID_REQUIRED.to_string()))?;

    let job = state.gateway.get_status(&job_id).await?;

    Ok(Json(StatusResponse {
        fine_tune_id: job_id,
        status: job.status,
    }))
}
