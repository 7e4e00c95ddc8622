use std::collections::HashMap;

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::jwk::{AlgorithmParameters, JwkSet};
use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Validation};
use thiserror::Error;
use tracing::{debug, info, warn};

use super::{AuthError, Claims};
use crate::config::AuthConfig;

/// Errors while loading the identity provider's signing keys at startup
#[derive(Debug, Error)]
pub enum KeySetError {
    #[error("Missing configuration: {0}")]
    Missing(&'static str),

    #[error("Failed to read key set file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to fetch key set: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Key set is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Key set contains no usable RSA signing keys")]
    NoUsableKeys,
}

/// Verifies RS256 bearer tokens against a fixed set of trusted public keys.
///
/// Keys are loaded once; verification never touches the network.
pub struct TokenVerifier {
    keys: HashMap<String, DecodingKey>,
    validation: Validation,
}

impl TokenVerifier {
    /// Load keys from `jwks_path` if set, otherwise fetch them from `jwks_url`
    pub async fn load(config: &AuthConfig) -> Result<Self, KeySetError> {
        let jwks: JwkSet = if let Some(path) = &config.jwks_path {
            let raw = tokio::fs::read_to_string(path).await?;
            info!("Loaded signing keys from {}", path.display());
            serde_json::from_str(&raw)?
        } else if let Some(url) = &config.jwks_url {
            let jwks: JwkSet = reqwest::get(url).await?.error_for_status()?.json().await?;
            info!("Fetched signing keys from {}", url);
            jwks
        } else {
            return Err(KeySetError::Missing("AUTH0_DOMAIN or AUTH_JWKS_URL or AUTH_JWKS_PATH"));
        };

        Self::new(&jwks, config)
    }

    pub fn from_jwks_json(raw: &str, config: &AuthConfig) -> Result<Self, KeySetError> {
        let jwks: JwkSet = serde_json::from_str(raw)?;
        Self::new(&jwks, config)
    }

    pub fn new(jwks: &JwkSet, config: &AuthConfig) -> Result<Self, KeySetError> {
        let issuer = config
            .issuer
            .as_deref()
            .ok_or(KeySetError::Missing("AUTH_ISSUER"))?;
        let audience = config
            .audience
            .as_deref()
            .ok_or(KeySetError::Missing("AUTH_AUDIENCE"))?;

        let mut keys = HashMap::new();
        for jwk in &jwks.keys {
            let Some(kid) = jwk.common.key_id.clone() else {
                debug!("Skipping signing key without kid");
                continue;
            };
            if !matches!(jwk.algorithm, AlgorithmParameters::RSA(_)) {
                debug!("Skipping non-RSA signing key {}", kid);
                continue;
            }
            match DecodingKey::from_jwk(jwk) {
                Ok(key) => {
                    keys.insert(kid, key);
                }
                Err(e) => warn!("Ignoring unusable signing key {}: {}", kid, e),
            }
        }

        if keys.is_empty() {
            return Err(KeySetError::NoUsableKeys);
        }

        let mut validation = Validation::new(Algorithm::RS256);
        validation.leeway = config.leeway_secs;
        validation.set_issuer(&[issuer]);
        validation.set_audience(&[audience]);
        validation.set_required_spec_claims(&["exp", "iss", "aud"]);

        Ok(Self { keys, validation })
    }

    pub fn key_count(&self) -> usize {
        self.keys.len()
    }

    /// Verify a raw token and return its claims
    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        let header = decode_header(token).map_err(|e| {
            debug!("Undecodable token header: {}", e);
            AuthError::MalformedToken
        })?;

        if header.alg != Algorithm::RS256 {
            debug!("Rejecting token signed with {:?}", header.alg);
            return Err(AuthError::MalformedToken);
        }

        let kid = header.kid.ok_or(AuthError::MalformedToken)?;
        let key = self.keys.get(&kid).ok_or(AuthError::UnknownSigningKey)?;

        decode::<Claims>(token, key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| map_decode_error(e.kind()))
    }
}

fn map_decode_error(kind: &ErrorKind) -> AuthError {
    match kind {
        ErrorKind::ExpiredSignature => AuthError::TokenExpired,
        ErrorKind::InvalidSignature => AuthError::InvalidSignature,
        ErrorKind::InvalidIssuer => AuthError::InvalidClaims("incorrect issuer".into()),
        ErrorKind::InvalidAudience => AuthError::InvalidClaims("incorrect audience".into()),
        ErrorKind::ImmatureSignature => AuthError::InvalidClaims("token not yet valid".into()),
        ErrorKind::MissingRequiredClaim(claim) => {
            AuthError::InvalidClaims(format!("missing {} claim", claim))
        }
        other => {
            debug!("Token rejected: {:?}", other);
            AuthError::MalformedToken
        }
    }
}
