use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};
use tunegate_std::{GetUnixTime, SystemClock};

use crate::secret::SigningSecret;

/// Claims the gateway reads from a token. Anything else in the payload is ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,
    pub exp: u64,
}

/// Why a request failed authentication.
///
/// Every variant is reported to the client as the same 401; the variant is
/// for logs only.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("authorization header missing")]
    MissingHeader,

    #[error("authorization header is not of the form 'Bearer <token>'")]
    MalformedHeader,

    #[error("token signature does not verify")]
    InvalidSignature,

    #[error("token is not a valid HS256 JWT: {0}")]
    InvalidToken(String),

    #[error("token expired")]
    Expired,

    #[error("token has no subject claim")]
    MissingSubject,
}

/// Verifies bearer tokens against the resolved [`SigningSecret`].
///
/// Read-only after construction; share it behind an `Arc`.
pub struct TokenValidator {
    key: DecodingKey,
    validation: Validation,
    clock: Box<dyn GetUnixTime + Send + Sync>,
}

impl TokenValidator {
    pub fn new(secret: SigningSecret) -> Self {
        Self::with_clock(secret, SystemClock)
    }

    pub fn with_clock<C>(secret: SigningSecret, clock: C) -> Self
    where
        C: GetUnixTime + Send + Sync + 'static,
    {
        let mut validation = Validation::new(crate::ALGORITHM);
        // Expiry is checked against the injected clock in `validate_token`.
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp"]);

        Self {
            key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            clock: Box::new(clock),
        }
    }

    /// Validate an `Authorization` header value and return the token subject.
    pub fn validate(&self, header_value: Option<&str>) -> Result<String, AuthError> {
        let header = header_value.ok_or(AuthError::MissingHeader)?;
        let token = bearer_token(header)?;
        self.validate_token(token)
    }

    /// Validate a bare token (no `Bearer ` prefix) and return its subject.
    pub fn validate_token(&self, token: &str) -> Result<String, AuthError> {
        let data = decode::<Claims>(token, &self.key, &self.validation).map_err(|e| {
            match e.kind() {
                ErrorKind::InvalidSignature => AuthError::InvalidSignature,
                _ => AuthError::InvalidToken(e.to_string()),
            }
        })?;

        if data.claims.exp <= self.clock.unix_time() {
            return Err(AuthError::Expired);
        }

        match data.claims.sub {
            Some(sub) if !sub.is_empty() => Ok(sub),
            _ => Err(AuthError::MissingSubject),
        }
    }
}

/// Extract `<token>` from `Bearer <token>`.
pub fn bearer_token(header: &str) -> Result<&str, AuthError> {
    let token = header
        .strip_prefix("Bearer ")
        .ok_or(AuthError::MalformedHeader)?
        .trim();

    if token.is_empty() || token.contains(' ') {
        return Err(AuthError::MalformedHeader);
    }
    Ok(token)
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use jsonwebtoken::{EncodingKey, Header, encode};
    use serde_json::json;
    use tunegate_std::MockClock;

    use super::*;
    use crate::issue_token;

    const NOW: u64 = 1_700_000_000;

    fn secret(s: &str) -> SigningSecret {
        SigningSecret::new(s).unwrap()
    }

    fn validator(s: &str) -> TokenValidator {
        TokenValidator::with_clock(secret(s), MockClock::at(NOW))
    }

    fn sign(payload: serde_json::Value, key: &str) -> String {
        encode(
            &Header::new(crate::ALGORITHM),
            &payload,
            &EncodingKey::from_secret(key.as_bytes()),
        )
        .unwrap()
    }

    #[test]
    fn valid_token_yields_subject() {
        let token = sign(json!({"sub": "user-1", "exp": NOW + 60}), "k");
        let header = format!("Bearer {token}");
        assert_eq!(validator("k").validate(Some(&header)).unwrap(), "user-1");
    }

    #[test]
    fn issued_token_is_accepted() {
        let clock = MockClock::at(NOW);
        let token = issue_token(&secret("k"), "bob", Duration::from_secs(60), &clock).unwrap();
        assert_eq!(validator("k").validate_token(&token).unwrap(), "bob");
    }

    #[test]
    fn missing_header() {
        assert_eq!(validator("k").validate(None), Err(AuthError::MissingHeader));
    }

    #[test]
    fn malformed_headers() {
        let v = validator("k");
        for header in ["Basic abc", "Bearer", "Bearer ", "bearer abc", "Bearer a b", "abc"] {
            assert_eq!(
                v.validate(Some(header)),
                Err(AuthError::MalformedHeader),
                "header {header:?}"
            );
        }
    }

    #[test]
    fn token_signed_with_other_secret_is_invalid_signature() {
        let token = sign(json!({"sub": "user-1", "exp": NOW + 60}), "other-secret");
        assert_eq!(
            validator("k").validate_token(&token),
            Err(AuthError::InvalidSignature)
        );
    }

    #[test]
    fn garbage_token_is_invalid_token() {
        assert!(matches!(
            validator("k").validate_token("not.a.jwt"),
            Err(AuthError::InvalidToken(_))
        ));
    }

    #[test]
    fn other_algorithm_is_invalid_token() {
        let token = encode(
            &Header::new(jsonwebtoken::Algorithm::HS512),
            &json!({"sub": "user-1", "exp": NOW + 60}),
            &EncodingKey::from_secret(b"k"),
        )
        .unwrap();
        assert!(matches!(
            validator("k").validate_token(&token),
            Err(AuthError::InvalidToken(_))
        ));
    }

    #[test]
    fn missing_exp_is_invalid_token() {
        let token = sign(json!({"sub": "user-1"}), "k");
        assert!(matches!(
            validator("k").validate_token(&token),
            Err(AuthError::InvalidToken(_))
        ));
    }

    #[test]
    fn expiry_must_be_in_the_future() {
        let clock = MockClock::at(NOW);
        let v = TokenValidator::with_clock(secret("k"), clock.clone());
        let token = sign(json!({"sub": "user-1", "exp": NOW + 10}), "k");

        assert!(v.validate_token(&token).is_ok());

        clock.advance(Duration::from_secs(10));
        assert_eq!(v.validate_token(&token), Err(AuthError::Expired));
    }

    #[test]
    fn missing_subject_is_distinct_from_signature_failure() {
        let v = validator("k");
        let no_sub = sign(json!({"exp": NOW + 60}), "k");
        let empty_sub = sign(json!({"sub": "", "exp": NOW + 60}), "k");

        assert_eq!(v.validate_token(&no_sub), Err(AuthError::MissingSubject));
        assert_eq!(v.validate_token(&empty_sub), Err(AuthError::MissingSubject));
    }

    #[test]
    fn extra_claims_are_ignored() {
        let token = sign(
            json!({"sub": "user-1", "exp": NOW + 60, "aud": "someone", "role": "admin"}),
            "k",
        );
        assert_eq!(validator("k").validate_token(&token).unwrap(), "user-1");
    }
}
