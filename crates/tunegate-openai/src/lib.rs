//! # tunegate-openai
//!
//! Thin clients for an OpenAI-compatible provider (training file upload,
//! fine-tuning jobs and single-shot completions) and for a self-hosted
//! text-generation endpoint. Every call is one HTTP
//! round trip; nothing is cached and nothing is retried. Provider errors are
//! returned to the caller with the provider's own message.
//!
//! The [`ModelGateway`] trait is the seam the HTTP server and the CLI are
//! written against. [`OpenAiClient`] talks to the provider,
//! [`InferenceClient`] only generates text, and [`RoutedGateway`] combines
//! the two. `MockGateway` (feature `test-support`) is an in-memory one.
//!
//! ## Configuration (env vars)
//!
//! | Variable | Default | Description |
//! |---|---|---|
//! | `OPENAI_API_KEY` | required | Provider API key |
//! | `OPENAI_BASE_URL` | `https://api.openai.com/v1` | Provider base URL |
//! | `OPENAI_TIMEOUT_SECS` | `300` | Per-request HTTP timeout |
//! | `INFERENCE_URL` | required for [`InferenceClient`] | Generate endpoint URL |
//! | `INFERENCE_API_KEY` | unset | Optional bearer token |
//! | `INFERENCE_TIMEOUT_SECS` | `60` | Per-request HTTP timeout |

pub mod client;
pub mod config;
pub mod gateway;
pub mod inference;
#[cfg(any(test, feature = "test-support"))]
pub mod mocks;
pub mod poll;
pub mod routed;
pub mod types;

pub use client::OpenAiClient;
pub use config::OpenAiConfig;
pub use gateway::{GatewayError, ModelGateway};
pub use inference::{InferenceClient, InferenceConfig, InferenceParams};
pub use poll::{PollError, PollOptions, await_completion};
pub use routed::RoutedGateway;
pub use types::{FineTuneJob, FineTuneStatus, GenerationParams, Hyperparameters};

/// `purpose` sent with training file uploads unless the caller overrides it.
pub const DEFAULT_UPLOAD_PURPOSE: &str = "fine-tune";
