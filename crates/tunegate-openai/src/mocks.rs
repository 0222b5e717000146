//! In-memory [`ModelGateway`] for tests that should not talk to a provider.
//!
//! Enabled with the `test-support` feature:
//!
//! ```toml
//! [dev-dependencies]
//! tunegate-openai = { path = "...", features = ["test-support"] }
//! ```

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::gateway::{GatewayError, ModelGateway};
use crate::types::{FineTuneJob, FineTuneStatus, Hyperparameters};

/// Canned responses plus a record of every call made.
///
/// Clones share state, so a test can keep a handle after passing the gateway
/// to the code under test.
#[derive(Clone)]
pub struct MockGateway {
    state: Arc<Mutex<MockState>>,
}

struct MockState {
    prediction: String,
    file_id: String,
    job_id: String,
    /// The front status is returned on each `get_status` call; the last one repeats.
    statuses: VecDeque<FineTuneStatus>,
    failure: Option<(u16, String)>,
    calls: Vec<Call>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Upload { path: PathBuf, purpose: String },
    StartFineTune { file_id: String, base_model: String, hyperparameters: Hyperparameters },
    GetStatus { job_id: String },
    Predict { prompt: String, model_id: String },
}

impl Default for MockGateway {
    fn default() -> Self {
        Self {
            state: Arc::new(Mutex::new(MockState {
                prediction: "mock prediction".to_string(),
                file_id: "file-mock".to_string(),
                job_id: "ftjob-mock".to_string(),
                statuses: VecDeque::from([FineTuneStatus::Pending]),
                failure: None,
                calls: Vec::new(),
            })),
        }
    }
}

impl MockGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_prediction(self, text: impl Into<String>) -> Self {
        self.state.lock().unwrap().prediction = text.into();
        self
    }

    pub fn with_file_id(self, id: impl Into<String>) -> Self {
        self.state.lock().unwrap().file_id = id.into();
        self
    }

    pub fn with_job_id(self, id: impl Into<String>) -> Self {
        self.state.lock().unwrap().job_id = id.into();
        self
    }

    /// Script the statuses returned by successive `get_status` calls.
    pub fn with_statuses(self, statuses: impl IntoIterator<Item = FineTuneStatus>) -> Self {
        let statuses: VecDeque<_> = statuses.into_iter().collect();
        assert!(!statuses.is_empty(), "at least one status is required");
        self.state.lock().unwrap().statuses = statuses;
        self
    }

    /// Make every operation fail with a provider error.
    pub fn failing(self, status: u16, message: impl Into<String>) -> Self {
        self.state.lock().unwrap().failure = Some((status, message.into()));
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn status_calls(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::GetStatus { job_id } => Some(job_id),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: Call) -> Result<(), GatewayError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(call);
        match &state.failure {
            Some((status, message)) => Err(GatewayError::Upstream {
                status: *status,
                message: message.clone(),
            }),
            None => Ok(()),
        }
    }
}

impl ModelGateway for MockGateway {
    async fn upload_training_file(&self, path: &Path, purpose: &str) -> Result<String, GatewayError> {
        self.record(Call::Upload {
            path: path.to_path_buf(),
            purpose: purpose.to_string(),
        })?;
        Ok(self.state.lock().unwrap().file_id.clone())
    }

    async fn start_fine_tune(
        &self,
        file_id: &str,
        base_model: &str,
        hyperparameters: &Hyperparameters,
    ) -> Result<String, GatewayError> {
        self.record(Call::StartFineTune {
            file_id: file_id.to_string(),
            base_model: base_model.to_string(),
            hyperparameters: *hyperparameters,
        })?;
        Ok(self.state.lock().unwrap().job_id.clone())
    }

    async fn get_status(&self, job_id: &str) -> Result<FineTuneJob, GatewayError> {
        self.record(Call::GetStatus {
            job_id: job_id.to_string(),
        })?;

        let mut state = self.state.lock().unwrap();
        let status = if state.statuses.len() > 1 {
            state.statuses.pop_front()
        } else {
            state.statuses.front().copied()
        }
        .unwrap_or(FineTuneStatus::Pending);

        Ok(FineTuneJob {
            id: job_id.to_string(),
            status,
            fine_tuned_model: None,
        })
    }

    async fn predict(&self, prompt: &str, model_id: &str) -> Result<String, GatewayError> {
        self.record(Call::Predict {
            prompt: prompt.to_string(),
            model_id: model_id.to_string(),
        })?;
        Ok(self.state.lock().unwrap().prediction.clone())
    }
}
