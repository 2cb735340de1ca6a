//! Session token issuance (HS256 JWT).

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use user_apis_core::{Email, Role};

/// Claims embedded in every session token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Account ID (opaque).
    pub id: String,
    /// Normalized account email.
    pub email: String,
    /// Account collection the ID belongs to.
    pub role: Role,
    /// Issued at (seconds since the epoch).
    pub iat: i64,
    /// Expires at (seconds since the epoch).
    pub exp: i64,
    /// Variant-specific claims (e.g. `username`, `fullname` for users).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Signs and verifies session tokens.
#[derive(Clone)]
pub struct TokenIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl std::fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenIssuer")
            .field("ttl", &self.ttl)
            .field("secret", &"[REDACTED]")
            .finish()
    }
}

impl TokenIssuer {
    /// Create an issuer from the signing secret and token lifetime.
    ///
    /// The secret is validated when configuration is loaded; an issuer is
    /// only ever built from a secret that passed those checks.
    #[must_use]
    pub fn new(secret: &SecretString, ttl: Duration) -> Self {
        let bytes = secret.expose_secret().as_bytes();
        Self {
            encoding: EncodingKey::from_secret(bytes),
            decoding: DecodingKey::from_secret(bytes),
            ttl,
        }
    }

    /// Issue a signed token for an account.
    ///
    /// Reserved claim names in `extra` are ignored.
    ///
    /// # Errors
    ///
    /// Returns a `jsonwebtoken` error if signing fails.
    pub fn issue(
        &self,
        account_id: &impl ToString,
        email: &Email,
        role: Role,
        extra: Option<Map<String, Value>>,
    ) -> Result<String, jsonwebtoken::errors::Error> {
        let now = Utc::now();
        let mut extra = extra.unwrap_or_default();
        for reserved in ["id", "email", "role", "iat", "exp"] {
            extra.remove(reserved);
        }

        let claims = Claims {
            id: account_id.to_string(),
            email: email.as_str().to_owned(),
            role,
            iat: now.timestamp(),
            exp: now
                .checked_add_signed(self.ttl)
                .unwrap_or(DateTime::<Utc>::MAX_UTC)
                .timestamp(),
            extra,
        };

        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
    }

    /// Verify a token's signature and expiry and return its claims.
    ///
    /// # Errors
    ///
    /// Returns a `jsonwebtoken` error if the token is malformed, forged or expired.
    pub fn verify(&self, token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        jsonwebtoken::decode::<Claims>(token, &self.decoding, &validation).map(|data| data.claims)
    }
}
