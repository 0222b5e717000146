//! One-shot resolution of the signing secret at process start.

use tracing::info;

use crate::store::SecretStore;

#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    #[error("secret store error: {0}")]
    Store(Box<dyn std::error::Error + Send + Sync>),

    #[error("field {field} is missing or empty at secret path {path}")]
    MissingField { path: String, field: String },
}

/// Read `field` at `path` from `store`.
///
/// No retry: an unreachable store or an absent field is returned as an error
/// for the caller to treat as fatal.
pub async fn resolve_field<S: SecretStore>(
    store: &S,
    path: &str,
    field: &str,
) -> Result<String, ResolveError> {
    let value = store
        .read_field(path, field)
        .await
        .map_err(|e| ResolveError::Store(Box::new(e)))?;

    match value {
        Some(v) if !v.is_empty() => {
            info!(path, field, "Resolved secret from store");
            Ok(v)
        }
        _ => Err(ResolveError::MissingField {
            path: path.to_string(),
            field: field.to_string(),
        }),
    }
}
