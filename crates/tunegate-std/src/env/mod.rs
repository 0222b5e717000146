//! Environment variable access.
//!
//! ```
//! use tunegate_std::env::{ReadEnv, SystemEnv};
//!
//! fn vault_url<E: ReadEnv>(env: &E) -> String {
//!     env.var_or("VAULT_URL", "http://localhost:8200")
//! }
//!
//! let url = vault_url(&SystemEnv);
//! ```

mod in_memory;
mod read_env;
mod system;

#[cfg(any(test, feature = "test-support"))]
pub use in_memory::InMemoryEnv;
pub use read_env::{MissingVar, ReadEnv};
pub use system::SystemEnv;
