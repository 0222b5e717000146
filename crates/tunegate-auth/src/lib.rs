//! Bearer token authentication for the gateway.
//!
//! Tokens are HS256 JWTs carrying a `sub` (who is calling) and an `exp`
//! (seconds since the Unix epoch). They are issued out of band, by
//! `tunegate-cli token`, and checked on every protected request against the
//! [`SigningSecret`] resolved at startup.
//!
//! ```rust
//! use std::time::Duration;
//! use tunegate_auth::{SigningSecret, TokenValidator, issue_token};
//! use tunegate_std::SystemClock;
//!
//! let secret = SigningSecret::new("s3cr3t").unwrap();
//! let token = issue_token(&secret, "user-42", Duration::from_secs(60), &SystemClock).unwrap();
//!
//! let validator = TokenValidator::new(secret);
//! let header = format!("Bearer {token}");
//! assert_eq!(validator.validate(Some(&header)).unwrap(), "user-42");
//! ```

pub mod issue;
pub mod secret;
pub mod validator;

pub use issue::{IssueError, issue_token};
pub use secret::{EmptySecret, SigningSecret};
pub use validator::{AuthError, Claims, TokenValidator};

/// The only algorithm tokens are signed and verified with.
pub const ALGORITHM: jsonwebtoken::Algorithm = jsonwebtoken::Algorithm::HS256;
