pub mod verifier;

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use verifier::{KeySetError, TokenVerifier};

/// Claims carried by a verified access token.
///
/// Issuer, audience and expiry are checked during verification; only the
/// fields handlers care about are kept here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    #[serde(default)]
    pub sub: Option<String>,
    pub exp: i64,
    #[serde(default)]
    pub permissions: Option<BTreeSet<String>>,
}

impl Claims {
    /// Fails unless `permission` is listed in the token's `permissions` claim
    pub fn require(&self, permission: &str) -> Result<(), AuthError> {
        let permissions = self
            .permissions
            .as_ref()
            .ok_or_else(|| AuthError::InvalidClaims("permissions not included in token".into()))?;

        if permissions.contains(permission) {
            Ok(())
        } else {
            Err(AuthError::InsufficientScope(permission.to_string()))
        }
    }

    pub fn subject(&self) -> &str {
        self.sub.as_deref().unwrap_or("unknown")
    }
}

/// Why a request was refused by the token verifier or the permission gate
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("Authorization header is expected")]
    MissingToken,

    #[error("Authorization header must be of the form 'Bearer <token>'")]
    MalformedHeader,

    #[error("Unable to parse authentication token")]
    MalformedToken,

    #[error("Unable to find the appropriate signing key")]
    UnknownSigningKey,

    #[error("Token signature could not be verified")]
    InvalidSignature,

    #[error("Token expired")]
    TokenExpired,

    #[error("Incorrect claims: {0}")]
    InvalidClaims(String),

    #[error("Permission '{0}' not granted")]
    InsufficientScope(String),
}

impl AuthError {
    pub fn status_code(&self) -> u16 {
        match self {
            AuthError::InsufficientScope(_) => 403,
            _ => 401,
        }
    }

    /// Stable machine-readable code for clients
    pub fn code(&self) -> &'static str {
        match self {
            AuthError::MissingToken => "authorization_header_missing",
            AuthError::MalformedHeader => "invalid_header",
            AuthError::MalformedToken => "invalid_token",
            AuthError::UnknownSigningKey => "unknown_signing_key",
            AuthError::InvalidSignature => "invalid_signature",
            AuthError::TokenExpired => "token_expired",
            AuthError::InvalidClaims(_) => "invalid_claims",
            AuthError::InsufficientScope(_) => "insufficient_scope",
        }
    }
}
