//! Stateless session cookie: an HS256 JWT carrying the user and an expiry.

use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::db::models::{Role, User};

pub const SESSION_COOKIE: &str = "gh_session";

/// Lifetime of both the cookie and the token inside it.
pub const SESSION_MAX_AGE_SECS: i64 = 60 * 60 * 24 * 7;

/// What a logged-in browser carries between requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    pub user_id: Uuid,
    pub username: String,
    pub role: Role,
}

impl From<&User> for SessionUser {
    fn from(u: &User) -> Self {
        Self {
            user_id: u.id,
            username: u.username.clone(),
            role: u.role,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: Uuid,
    username: String,
    role: Role,
    iat: i64,
    exp: i64,
}

#[derive(Clone)]
pub struct SessionSigner {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl std::fmt::Debug for SessionSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionSigner").finish_non_exhaustive()
    }
}

impl SessionSigner {
    pub fn new(secret: &str) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
        }
    }

    pub fn encode(&self, user: &SessionUser) -> Result<String, jsonwebtoken::errors::Error> {
        self.encode_at(user, Utc::now().timestamp())
    }

    fn encode_at(&self, user: &SessionUser, issued_at: i64) -> Result<String, jsonwebtoken::errors::Error> {
        let claims = Claims {
            sub: user.user_id,
            username: user.username.clone(),
            role: user.role,
            iat: issued_at,
            exp: issued_at + SESSION_MAX_AGE_SECS,
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
    }

    /// `None` for anything malformed, expired, or not signed with this secret.
    pub fn decode(&self, token: &str) -> Option<SessionUser> {
        let data = decode::<Claims>(token, &self.decoding, &Validation::new(Algorithm::HS256)).ok()?;
        Some(SessionUser {
            user_id: data.claims.sub,
            username: data.claims.username,
            role: data.claims.role,
        })
    }
}
