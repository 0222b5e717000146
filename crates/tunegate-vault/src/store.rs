//! [`SecretStore`] trait, the seam between secret resolution and a backend.

/// Read-only access to named fields stored under secret paths.
///
/// Implementations must be `Send + Sync` so a store can be shared across
/// async tasks.
pub trait SecretStore: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Read `field` from the secret stored at `path`.
    ///
    /// Returns `Ok(None)` if the path does not exist or has no such field.
    fn read_field(
        &self,
        path: &str,
        field: &str,
    ) -> impl std::future::Future<Output = Result<Option<String>, Self::Error>> + Send;
}
