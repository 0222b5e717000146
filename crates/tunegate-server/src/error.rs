//! HTTP error responses. Every error body is `{"detail": "<message>"}`.

use axum::Json;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use tracing::{error, warn};
use tunegate_auth::AuthError;
use tunegate_openai::GatewayError;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The reason is logged; the client only ever sees "Not authenticated".
    #[error("Not authenticated")]
    Unauthorized(AuthError),

    #[error("{0}")]
    BadRequest(String),

    /// Provider failure. The provider's message is passed through as-is.
    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::BadRequest(_) | Self::Gateway(GatewayError::InvalidJobId(_)) => {
                StatusCode::BAD_REQUEST
            }
            Self::Gateway(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        Self::Unauthorized(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self {
            Self::Unauthorized(reason) => warn!(reason = %reason, "Rejected unauthenticated request"),
            Self::BadRequest(msg) => warn!(error = %msg, "Rejected invalid request"),
            Self::Gateway(e @ GatewayError::InvalidJobId(_)) => {
                warn!(error = %e, "Rejected invalid request")
            }
            Self::Gateway(e) => error!(error = %e, "Provider call failed"),
            Self::Internal(msg) => error!(error = %msg, "Internal error"),
        }

        (self.status(), Json(json!({ "detail": self.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn detail(resp: Response) -> String {
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        body["detail"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn every_auth_failure_is_the_same_401() {
        let reasons = [
            AuthError::MissingHeader,
            AuthError::MalformedHeader,
            AuthError::InvalidSignature,
            AuthError::InvalidToken("bad".to_string()),
            AuthError::Expired,
            AuthError::MissingSubject,
        ];
        for reason in reasons {
            let resp = ApiError::from(reason).into_response();
            assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
            assert_eq!(detail(resp).await, "Not authenticated");
        }
    }

    #[tokio::test]
    async fn bad_request_maps_to_400_with_message() {
        let resp = ApiError::BadRequest("Input data must contain 'text' field.".into()).into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(detail(resp).await, "Input data must contain 'text' field.");
    }

    #[tokio::test]
    async fn provider_error_is_500_with_verbatim_message() {
        let err = GatewayError::Upstream {
            status: 429,
            message: "Rate limit reached for requests".to_string(),
        };
        let resp = ApiError::from(err).into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(detail(resp).await, "Rate limit reached for requests");
    }

    #[tokio::test]
    async fn invalid_job_id_is_a_client_error() {
        let resp = ApiError::from(GatewayError::InvalidJobId("..".to_string())).into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(detail(resp).await, "invalid fine-tune job id \"..\"");
    }

    #[test]
    fn internal_maps_to_500() {
        let resp = ApiError::Internal("task panicked".into()).into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
