//! Env and clock abstractions for the tunegate crates.
//!
//! | Concern | Trait | Production | Test |
//! |---------|-------|------------|------|
//! | Env vars | [`ReadEnv`] | [`SystemEnv`] | [`InMemoryEnv`]* |
//! | Wall clock | [`GetUnixTime`] | [`SystemClock`] | [`MockClock`]* |
//!
//! *Available with `#[cfg(test)]` or the `"test-support"` feature.
//!
//! Every type here is `Send + Sync`, so test doubles can be shared with
//! handlers running on a multi-threaded tokio runtime.

pub mod env;
pub mod time;

#[cfg(any(test, feature = "test-support"))]
pub use env::InMemoryEnv;
pub use env::{MissingVar, ReadEnv, SystemEnv};
#[cfg(any(test, feature = "test-support"))]
pub use time::MockClock;
pub use time::{GetUnixTime, SystemClock};
