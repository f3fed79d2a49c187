use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{error::Result, model::CurrentUser};

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub user_id: Uuid,
    pub username: String,
    pub iat: i64, // issued at
    pub exp: i64, // expiration time
}

/// Issues and verifies HS256 session tokens.
pub struct TokenManager {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    lifetime: Duration,
}

impl TokenManager {
    pub fn new(secret: &str, expiration_hours: i64) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            lifetime: Duration::hours(expiration_hours),
        }
    }

    pub fn issue(&self, user_id: Uuid, username: &str) -> Result<String> {
        self.issue_at(user_id, username, Utc::now())
    }

    fn issue_at(&self, user_id: Uuid, username: &str, issued_at: DateTime<Utc>) -> Result<String> {
        let claims = Claims {
            user_id,
            username: username.to_string(),
            iat: issued_at.timestamp(),
            exp: (issued_at + self.lifetime).timestamp(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)?;
        Ok(token)
    }

    /// Returns the token's identity, or `None` for any malformed, forged or
    /// expired token.
    pub fn verify(&self, token: &str) -> Option<CurrentUser> {
        match decode::<Claims>(token, &self.decoding_key, &self.validation) {
            Ok(data) => Some(CurrentUser {
                user_id: data.claims.user_id,
                username: data.claims.username,
            }),
            Err(e) => {
                tracing::debug!("token rejected: {}", e);
                None
            }
        }
    }
}
