//! Split fine-tuning and text generation across two gateways.

use std::future::Future;
use std::path::Path;

use crate::gateway::{GatewayError, ModelGateway};
use crate::types::{FineTuneJob, Hyperparameters};

/// Sends upload, fine-tune and status calls to `training` and `predict`
/// calls to `predictor`.
#[derive(Clone)]
pub struct RoutedGateway<T, P> {
    training: T,
    predictor: P,
}

impl<T: ModelGateway, P: ModelGateway> RoutedGateway<T, P> {
    pub fn new(training: T, predictor: P) -> Self {
        Self {
            training,
            predictor,
        }
    }
}

impl<T: ModelGateway, P: ModelGateway> ModelGateway for RoutedGateway<T, P> {
    fn upload_training_file(
        &self,
        path: &Path,
        purpose: &str,
    ) -> impl Future<Output = Result<String, GatewayError>> + Send {
        self.training.upload_training_file(path, purpose)
    }

    fn start_fine_tune(
        &self,
        file_id: &str,
        base_model: &str,
        hyperparameters: &Hyperparameters,
    ) -> impl Future<Output = Result<String, GatewayError>> + Send {
        self.training
            .start_fine_tune(file_id, base_model, hyperparameters)
    }

    fn get_status(
        &self,
        job_id: &str,
    ) -> impl Future<Output = Result<FineTuneJob, GatewayError>> + Send {
        self.training.get_status(job_id)
    }

    fn predict(
        &self,
        prompt: &str,
        model_id: &str,
    ) -> impl Future<Output = Result<String, GatewayError>> + Send {
        self.predictor.predict(prompt, model_id)
    }
}
