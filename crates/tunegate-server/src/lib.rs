//! # tunegate-server
//!
//! HTTP front for the model gateway. Every route except `/health` requires
//! `Authorization: Bearer <token>` signed with the secret resolved from the
//! secret store at startup.
//!
//! | Route | Success body |
//! |---|---|
//! | `GET /health` | `{"status": "healthy"}` |
//! | `POST /predict` | `{"prediction": "..."}` |
//! | `POST /fine-tune` | `{"status": "Fine-tune job created", "fine_tune_id": "..."}` |
//! | `GET /status?fine_tune_id=...` | `{"fine_tune_id": "...", "status": "running"}` |
//!
//! Errors are `{"detail": "..."}` with 400 for invalid input, 401 for any
//! authentication failure and 500 when the provider call fails.

pub mod config;
pub mod error;
pub mod server;
mod signal;

pub use config::{ConfigError, GatewayConfig, PredictBackend, VaultSettings, resolve_signing_secret};
pub use error::ApiError;
pub use server::{AppState, router, serve, serve_until};
