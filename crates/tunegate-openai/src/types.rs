use std::fmt;

use serde::{Deserialize, Serialize};

/// Lifecycle of a fine-tuning job as reported to gateway callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FineTuneStatus {
    Pending,
    Running,
    Succeeded,
    Failed,
}

impl FineTuneStatus {
    /// Map a provider status string onto the gateway's four states.
    ///
    /// Returns `None` for statuses the gateway does not know about.
    pub fn from_provider(raw: &str) -> Option<Self> {
        match raw {
            "validating_files" | "queued" | "pending" => Some(Self::Pending),
            "running" => Some(Self::Running),
            "succeeded" => Some(Self::Succeeded),
            "failed" | "cancelled" => Some(Self::Failed),
            _ => None,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Running => "running",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for FineTuneStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Current view of a fine-tuning job. Re-fetched on demand, never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FineTuneJob {
    pub id: String,
    pub status: FineTuneStatus,
    /// Name of the resulting model, once the job has succeeded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fine_tuned_model: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Hyperparameters {
    pub n_epochs: u32,
    pub batch_size: u32,
    pub learning_rate_multiplier: f64,
}

impl Default for Hyperparameters {
    fn default() -> Self {
        Self {
            n_epochs: 4,
            batch_size: 8,
            learning_rate_multiplier: 0.1,
        }
    }
}

/// Sampling settings sent with every completion request.
///
/// Fixed on the predict path; HTTP callers cannot change them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GenerationParams {
    pub max_tokens: u32,
    pub temperature: f64,
    pub top_p: f64,
    pub frequency_penalty: f64,
    pub presence_penalty: f64,
}

impl GenerationParams {
    pub const FIXED: Self = Self {
        max_tokens: 150,
        temperature: 0.7,
        top_p: 1.0,
        frequency_penalty: 0.0,
        presence_penalty: 0.0,
    };
}
