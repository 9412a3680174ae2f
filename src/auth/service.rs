use thiserror::Error;
use tracing::{info, warn};

use super::password::{hash_password, verify_dummy, verify_password};
use crate::{
    db::models::{Role, User},
    store::{is_unique_violation, Store},
};

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("username and password are required")]
    MissingField,
    #[error("username already taken")]
    UsernameTaken,
    /// Unknown user and wrong password are deliberately indistinguishable.
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("password hashing failed: {0}")]
    Hashing(String),
    #[error(transparent)]
    Storage(#[from] sqlx::Error),
}

#[derive(Debug, Clone)]
pub struct AuthService {
    store: Store,
}

impl AuthService {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    pub async fn register(&self, username: &str, password: &str, role: Role) -> Result<User, AuthError> {
        let username = username.trim();
        if username.is_empty() || password.is_empty() {
            return Err(AuthError::MissingField);
        }

        let hash = hash_password(password).map_err(|e| AuthError::Hashing(e.to_string()))?;
        let user = self
            .store
            .insert_user(username, &hash, role)
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    AuthError::UsernameTaken
                } else {
                    AuthError::Storage(e)
                }
            })?;

        info!(user_id = %user.id, username = %user.username, role = %user.role, "User registered");
        Ok(user)
    }

    pub async fn login(&self, username: &str, password: &str) -> Result<User, AuthError> {
        let user = self.store.find_user_by_username(username.trim()).await?;
        let verified = match user {
            Some(user) if verify_password(password, &user.password_hash) => Some(user),
            Some(_) => None,
            None => {
                verify_dummy(password);
                None
            }
        };
        match verified {
            Some(user) => {
                info!(user_id = %user.id, "Login succeeded");
                Ok(user)
            }
            None => {
                warn!(username = %username, "Login failed");
                Err(AuthError::InvalidCredentials)
            }
        }
    }
}
