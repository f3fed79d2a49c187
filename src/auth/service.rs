use uuid::Uuid;

use super::{password::PasswordHasher, token::TokenManager};
use crate::{
    error::{AppError, Result},
    model::{CurrentUser, User, UserProfile},
    store::UserStore,
};

/// Registration, login and token checks over the user store.
pub struct AuthService {
    users: UserStore,
    hasher: PasswordHasher,
    tokens: TokenManager,
}

impl AuthService {
    pub fn new(users: UserStore, hasher: PasswordHasher, tokens: TokenManager) -> Self {
        Self {
            users,
            hasher,
            tokens,
        }
    }

    pub async fn register(&self, username: &str, password: &str) -> Result<(UserProfile, String)> {
        let username = username.trim();
        if username.is_empty() {
            return Err(AppError::EmptyUsername);
        }
        if password.trim().is_empty() {
            return Err(AppError::EmptyPassword);
        }

        // Fail fast before paying for the hash; `create` re-checks under the lock.
        if self.users.username_exists(username).await? {
            tracing::warn!("registration rejected, username taken: {}", username);
            return Err(AppError::UsernameExists);
        }

        let password_hash = self.hasher.hash(password).await?;
        let user = self.users.create(username, password_hash).await?;
        let token = self.tokens.issue(user.id, &user.username)?;

        tracing::info!("registered user {} ({})", user.username, user.id);
        Ok((UserProfile::from(&user), token))
    }

    pub async fn login(&self, username: &str, password: &str) -> Result<(UserProfile, String)> {
        let username = username.trim();
        if username.is_empty() || password.is_empty() {
            return Err(AppError::MissingCredentials);
        }

        let user = match self.users.find_by_username(username).await? {
            Some(user) => user,
            None => {
                self.hasher.verify_dummy(password).await?;
                tracing::warn!("login rejected, unknown user: {}", username);
                return Err(AppError::InvalidCredentials);
            }
        };

        if !self.hasher.verify(password, &user.password_hash).await? {
            tracing::warn!("login rejected, wrong password for user: {}", username);
            return Err(AppError::InvalidCredentials);
        }

        let token = self.tokens.issue(user.id, &user.username)?;

        tracing::info!("user {} logged in", user.username);
        Ok((UserProfile::from(&user), token))
    }

    pub fn verify(&self, token: &str) -> Option<CurrentUser> {
        self.tokens.verify(token)
    }

    pub async fn find_user(&self, user_id: Uuid) -> Result<Option<User>> {
        self.users.find_by_id(user_id).await
    }

    pub async fn current_user(&self, token: &str) -> Result<Option<User>> {
        match self.verify(token) {
            Some(identity) => self.find_user(identity.user_id).await,
            None => Ok(None),
        }
    }
}
