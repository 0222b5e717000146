//! Secret store access for the token signing secret.
//!
//! The gateway reads one field from one KV v2 path at startup and never
//! again. A failure here is a configuration error: the process must not serve
//! requests without a signing secret.
//!
//! ```rust
//! use tunegate_vault::{MemorySecretStore, resolve_field};
//!
//! # #[tokio::main]
//! # async fn main() {
//! let store = MemorySecretStore::new();
//! store.insert("tunegate", "JWT_SECRET", "s3cr3t");
//!
//! let secret = resolve_field(&store, "tunegate", "JWT_SECRET").await.unwrap();
//! assert_eq!(secret, "s3cr3t");
//! # }
//! ```

pub mod backends;
pub mod resolve;
pub mod store;

pub use backends::hashicorp_vault::{
    HashicorpVaultConfig, HashicorpVaultError, HashicorpVaultStore, VaultAuth,
};
pub use backends::memory::MemorySecretStore;
pub use resolve::{ResolveError, resolve_field};
pub use store::SecretStore;
