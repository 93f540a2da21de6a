//! Staff access tokens.
//!
//! Tokens are HS256 JWTs carrying [`Claims`]. The server only verifies them;
//! they are minted by whatever holds the shared `JWT_SECRET` (the identity
//! service, admin tooling, tests) through [`generate_access_token`].

use chrono::{Duration, Utc};
use gymdesk_core::types::DbId;
use jsonwebtoken::errors::Error as TokenError;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Payload of a staff access token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Staff member id.
    pub sub: DbId,
    /// `admin` or `teacher`.
    pub role: String,
    pub exp: i64,
    pub iat: i64,
    /// Random per-token id.
    pub jti: String,
}

impl Claims {
    fn issue(user_id: DbId, role: &str, lifetime: Duration) -> Self {
        let issued_at = Utc::now();
        Self {
            sub: user_id,
            role: role.to_owned(),
            exp: (issued_at + lifetime).timestamp(),
            iat: issued_at.timestamp(),
            jti: Uuid::new_v4().to_string(),
        }
    }
}

/// Signing secret and token lifetime.
#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    /// Lifetime of minted tokens (`JWT_ACCESS_EXPIRY_MINS`).
    pub access_token_expiry_mins: i64,
}

impl JwtConfig {
    fn encoding_key(&self) -> EncodingKey {
        EncodingKey::from_secret(self.secret.as_bytes())
    }

    fn decoding_key(&self) -> DecodingKey {
        DecodingKey::from_secret(self.secret.as_bytes())
    }

    fn lifetime(&self) -> Duration {
        Duration::minutes(self.access_token_expiry_mins)
    }
}

/// Mint a signed token for `user_id` acting as `role`.
pub fn generate_access_token(
    user_id: DbId,
    role: &str,
    config: &JwtConfig,
) -> Result<String, TokenError> {
    let claims = Claims::issue(user_id, role, config.lifetime());
    jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &config.encoding_key())
}

/// Check signature and expiry and return the token's claims.
pub fn validate_token(token: &str, config: &JwtConfig) -> Result<Claims, TokenError> {
    let validation = Validation::new(Algorithm::HS256);
    jsonwebtoken::decode::<Claims>(token, &config.decoding_key(), &validation)
        .map(|data| data.claims)
}
