//! [`ModelGateway`] trait, the seam between the gateway and the provider.

use std::future::Future;
use std::path::Path;

use crate::types::{FineTuneJob, Hyperparameters};

/// Errors from a provider call, propagated unmodified to the caller.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// The provider answered with a non-2xx status. `message` is the
    /// provider's own error text.
    #[error("{message}")]
    Upstream { status: u16, message: String },

    /// The provider could not be reached or the transfer failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// A local file could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The provider answered 2xx with a body the client does not understand.
    #[error("unexpected provider response: {0}")]
    Decode(String),

    /// A job id that cannot name a single job.
    #[error("invalid fine-tune job id {0:?}")]
    InvalidJobId(String),

    #[error("invalid provider URL: {0}")]
    InvalidUrl(String),

    /// The backend does not implement this operation.
    #[error("{operation} is not supported by the {backend} backend")]
    Unsupported {
        backend: &'static str,
        operation: &'static str,
    },
}

/// Pass-through operations against the completion / fine-tuning provider.
///
/// No caching, no retry. Implementations are cheap to clone and are shared
/// read-only between concurrent requests.
pub trait ModelGateway: Clone + Send + Sync + 'static {
    /// Upload a JSONL training file and return the provider's file id.
    fn upload_training_file(
        &self,
        path: &Path,
        purpose: &str,
    ) -> impl Future<Output = Result<String, GatewayError>> + Send;

    /// Start a fine-tuning job and return its id.
    fn start_fine_tune(
        &self,
        file_id: &str,
        base_model: &str,
        hyperparameters: &Hyperparameters,
    ) -> impl Future<Output = Result<String, GatewayError>> + Send;

    fn get_status(
        &self,
        job_id: &str,
    ) -> impl Future<Output = Result<FineTuneJob, GatewayError>> + Send;

    /// One completion round trip with the fixed generation parameters.
    fn predict(
        &self,
        prompt: &str,
        model_id: &str,
    ) -> impl Future<Output = Result<String, GatewayError>> + Send;
}
