//! JWT access-token generation and validation.
//!
//! Access tokens are HS256-signed and carry a [`Claims`] payload that
//! identifies the caller and nothing more. Authorization never rides in
//! the token: project roles live in the membership table and are looked
//! up per request, so access changes apply to tokens already in flight.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use fixline_core::types::DbId;

/// Access token lifetime when `JWT_ACCESS_EXPIRY_MINS` is unset.
const DEFAULT_ACCESS_EXPIRY_MINS: i64 = 15;

/// Claims carried by every access token.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject -- the user's database id.
    pub sub: DbId,
    /// Expiration (Unix timestamp, UTC).
    pub exp: i64,
    /// Issued at (Unix timestamp, UTC).
    pub iat: i64,
    /// Token id (UUID v4), recorded for audit trails.
    pub jti: String,
}

/// Signing and lifetime settings for access tokens.
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// HMAC-SHA256 signing secret.
    pub secret: String,
    /// Access token lifetime in minutes.
    pub access_token_expiry_mins: i64,
}

impl JwtConfig {
    /// Load JWT settings from the environment.
    ///
    /// `JWT_SECRET` is required and must be non-empty;
    /// `JWT_ACCESS_EXPIRY_MINS` defaults to 15.
    ///
    /// # Panics
    ///
    /// Panics if `JWT_SECRET` is missing or empty, or if the expiry
    /// override does not parse.
    pub fn from_env() -> Self {
        let secret = std::env::var("JWT_SECRET").expect("JWT_SECRET is required");
        assert!(!secret.is_empty(), "JWT_SECRET must not be empty");

        let access_token_expiry_mins =
            std::env::var("JWT_ACCESS_EXPIRY_MINS").map_or(DEFAULT_ACCESS_EXPIRY_MINS, |raw| {
                raw.parse()
                    .unwrap_or_else(|e| panic!("JWT_ACCESS_EXPIRY_MINS must be a valid i64: {e}"))
            });

        Self {
            secret,
            access_token_expiry_mins,
        }
    }
}

/// Issue an HS256 access token for one user.
pub fn generate_access_token(
    user_id: DbId,
    config: &JwtConfig,
) -> Result<String, jsonwebtoken::errors::Error> {
    let issued_at = Utc::now();
    let expires_at = issued_at + Duration::minutes(config.access_token_expiry_mins);

    let claims = Claims {
        sub: user_id,
        exp: expires_at.timestamp(),
        iat: issued_at.timestamp(),
        jti: Uuid::new_v4().to_string(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )
}

/// Check signature and expiry, returning the embedded [`Claims`].
pub fn validate_token(
    token: &str,
    config: &JwtConfig,
) -> Result<Claims, jsonwebtoken::errors::Error> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &Validation::new(Algorithm::HS256),
    )?;
    Ok(token_data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> JwtConfig {
        JwtConfig {
            secret: "unit-test-signing-secret".to_string(),
            access_token_expiry_mins: 30,
        }
    }

    #[test]
    fn round_trips_the_subject_and_token_id() {
        let config = test_config();
        let token = generate_access_token(42, &config).expect("token should generate");

        let claims = validate_token(&token, &config).expect("token should validate");
        assert_eq!(claims.sub, 42);
        assert!(claims.exp > claims.iat);
        assert!(!claims.jti.is_empty());
    }

    #[test]
    fn rejects_an_expired_token() {
        let config = test_config();

        // Issued 19 minutes ago, expired 4 minutes ago -- well past the
        // validator's 60-second leeway.
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: 9,
            exp: now - 240,
            iat: now - 1140,
            jti: Uuid::new_v4().to_string(),
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(config.secret.as_bytes()),
        )
        .expect("encoding should succeed");

        assert!(validate_token(&token, &config).is_err());
    }

    #[test]
    fn rejects_a_token_signed_with_another_secret() {
        let signer = JwtConfig {
            secret: "signing-side-secret".to_string(),
            access_token_expiry_mins: 5,
        };
        let verifier = JwtConfig {
            secret: "verifying-side-secret".to_string(),
            access_token_expiry_mins: 5,
        };

        let token = generate_access_token(1, &signer).expect("token should generate");

        assert!(validate_token(&token, &verifier).is_err());
    }

    #[test]
    fn rejects_a_spliced_signature() {
        let config = test_config();
        let first = generate_access_token(7, &config).expect("token should generate");
        let second = generate_access_token(8, &config).expect("token should generate");

        // Same signer, but the signature belongs to a different payload.
        let payload = first.rsplit_once('.').expect("JWTs have three segments").0;
        let signature = second.rsplit_once('.').expect("JWTs have three segments").1;
        let spliced = format!("{payload}.{signature}");

        assert!(validate_token(&spliced, &config).is_err());
    }
}
