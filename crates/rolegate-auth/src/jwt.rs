//! JWT token verification

use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::AuthError;

/// JWT claims
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (user ID)
    pub id: i64,
    /// Expiration time (Unix timestamp); tokens without one never expire
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,
    /// Issued at (Unix timestamp)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,
}

/// Extract the bearer token from a raw `Authorization` header value
///
/// The token is the second whitespace-separated segment; the scheme word is
/// not inspected.
pub fn extract_bearer_token(header: Option<&str>) -> Result<&str, AuthError> {
    header
        .and_then(|value| value.split_whitespace().nth(1))
        .ok_or(AuthError::MissingToken)
}

/// Verifies HMAC-signed tokens (HS256, HS384, HS512) with a shared secret
#[derive(Clone)]
pub struct TokenVerifier {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl TokenVerifier {
    /// Create a new token verifier
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.algorithms = vec![Algorithm::HS256, Algorithm::HS384, Algorithm::HS512];
        validation.set_required_spec_claims::<&str>(&[]);
        validation.validate_nbf = true;
        validation.leeway = 0;

        Self {
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    /// Validate a token and return its claims
    pub fn decode_claims(&self, token: &str) -> Result<Claims, AuthError> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| {
                debug!("Token rejected: {}", e);
                AuthError::InvalidToken
            })
    }

    /// Validate a token and return the subject ID embedded in it
    pub fn verify(&self, token: &str) -> Result<i64, AuthError> {
        let claims = self.decode_claims(token)?;
        debug!("Verified token for subject {}", claims.id);
        Ok(claims.id)
    }
}
