use std::time::Duration;

use jsonwebtoken::{EncodingKey, Header, encode};
use tunegate_std::GetUnixTime;

use crate::secret::SigningSecret;
use crate::validator::Claims;

#[derive(Debug, thiserror::Error)]
pub enum IssueError {
    #[error("subject must not be empty")]
    EmptySubject,

    #[error("failed to encode token: {0}")]
    Encode(#[from] jsonwebtoken::errors::Error),
}

/// Mint a token for `subject` that expires `ttl` after the clock's "now".
pub fn issue_token<C: GetUnixTime>(
    secret: &SigningSecret,
    subject: &str,
    ttl: Duration,
    clock: &C,
) -> Result<String, IssueError> {
    if subject.is_empty() {
        return Err(IssueError::EmptySubject);
    }

    let claims = Claims {
        sub: Some(subject.to_string()),
        exp: clock.unix_time().saturating_add(ttl.as_secs()),
    };

    let token = encode(
        &Header::new(crate::ALGORITHM),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;
    Ok(token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{DecodingKey, Validation, decode};
    use tunegate_std::MockClock;

    #[test]
    fn expiry_is_now_plus_ttl() {
        let secret = SigningSecret::new("k").unwrap();
        let clock = MockClock::at(1_700_000_000);

        let token = issue_token(&secret, "alice", Duration::from_secs(30 * 60), &clock).unwrap();

        let mut validation = Validation::new(crate::ALGORITHM);
        validation.validate_exp = false;
        let data = decode::<Claims>(&token, &DecodingKey::from_secret(b"k"), &validation).unwrap();
        assert_eq!(data.claims.sub.as_deref(), Some("alice"));
        assert_eq!(data.claims.exp, 1_700_001_800);
        assert_eq!(data.header.alg, crate::ALGORITHM);
    }

    #[test]
    fn empty_subject_rejected() {
        let secret = SigningSecret::new("k").unwrap();
        let result = issue_token(&secret, "", Duration::from_secs(1), &MockClock::at(0));
        assert!(matches!(result, Err(IssueError::EmptySubject)));
    }
}
