use std::fmt;

/// Symmetric key used to sign and verify bearer tokens.
///
/// Resolved once per process. `Debug` never prints the key.
#[derive(Clone, PartialEq, Eq)]
pub struct SigningSecret(String);

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("signing secret must not be empty")]
pub struct EmptySecret;

impl SigningSecret {
    pub fn new(secret: impl Into<String>) -> Result<Self, EmptySecret> {
        let secret = secret.into();
        if secret.is_empty() {
            return Err(EmptySecret);
        }
        Ok(Self(secret))
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl fmt::Debug for SigningSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SigningSecret(<redacted>)")
    }
}
