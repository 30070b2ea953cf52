//! Core identity logic: registration, login and admin lookup.
//!
//! The service only sees the narrow store contracts below; the SQLite
//! storage implements all three with one type. Token issuance is
//! delegated to the shared codec.

use async_trait::async_trait;
use chrono::Duration;
use std::sync::Arc;
use tracing::info;

use shared::auth::password;
use shared::model::{App, User};
use shared::{AppError, TokenCodec};

#[async_trait]
pub trait UserSaver: Send + Sync {
    /// Persists a new user. Fails with `UserExists` when the email is
    /// already taken.
    async fn save_user(&self, email: &str, pass_hash: &[u8]) -> Result<i64, AppError>;
}

#[async_trait]
pub trait UserProvider: Send + Sync {
    async fn user_by_email(&self, email: &str) -> Result<User, AppError>;
    async fn is_admin(&self, user_id: i64) -> Result<bool, AppError>;
}

#[async_trait]
pub trait AppProvider: Send + Sync {
    async fn app(&self, app_id: i64) -> Result<App, AppError>;
}

pub struct AuthService<S, P, A> {
    user_saver: Arc<S>,
    user_provider: Arc<P>,
    app_provider: Arc<A>,
    codec: TokenCodec,
    token_ttl: Duration,
}

impl<S, P, A> AuthService<S, P, A>
where
    S: UserSaver,
    P: UserProvider,
    A: AppProvider,
{
    pub fn new(
        user_saver: Arc<S>,
        user_provider: Arc<P>,
        app_provider: Arc<A>,
        codec: TokenCodec,
        token_ttl: Duration,
    ) -> Self {
        Self {
            user_saver,
            user_provider,
            app_provider,
            codec,
            token_ttl,
        }
    }

    /// Registers a new account and returns its id. The password is
    /// bcrypt-hashed before it reaches the store.
    pub async fn register(&self, email: &str, password_plain: &str) -> Result<i64, AppError> {
        if email.is_empty() {
            return Err(AppError::InvalidInput("email is required".into()));
        }
        if password_plain.is_empty() {
            return Err(AppError::InvalidInput("password is required".into()));
        }

        info!(email, "started register");

        let pass_hash = password::hash_password(password_plain)?;
        let id = self.user_saver.save_user(email, &pass_hash).await?;

        info!(user_id = id, "finished register");
        Ok(id)
    }

    /// Authenticates the credentials and issues a session token for the
    /// given application.
    ///
    /// An unknown email and a wrong password are deliberately collapsed
    /// into the same `InvalidCredentials` outcome so responses do not
    /// reveal which emails are registered. A missing application is a
    /// separate `AppNotFound` failure.
    pub async fn login(
        &self,
        email: &str,
        password_plain: &str,
        app_id: i64,
    ) -> Result<String, AppError> {
        if email.is_empty() {
            return Err(AppError::InvalidInput("email is required".into()));
        }
        if password_plain.is_empty() {
            return Err(AppError::InvalidInput("password is required".into()));
        }
        if app_id == 0 {
            return Err(AppError::InvalidInput("app_id is required".into()));
        }

        info!(email, "started login");

        let user = match self.user_provider.user_by_email(email).await {
            Ok(user) => user,
            Err(AppError::UserNotFound) => return Err(AppError::InvalidCredentials),
            Err(e) => return Err(e),
        };

        if !password::verify_password(password_plain, &user.pass_hash)? {
            return Err(AppError::InvalidCredentials);
        }

        let app = self.app_provider.app(app_id).await?;

        let token = self.codec.issue(&user, &app, self.token_ttl)?;

        info!(email, app_id, "finished login");
        Ok(token)
    }

    /// Reports whether the user has the admin flag set.
    pub async fn is_admin(&self, user_id: i64) -> Result<bool, AppError> {
        if user_id == 0 {
            return Err(AppError::InvalidInput("user_id is required".into()));
        }

        let is_admin = self.user_provider.is_admin(user_id).await?;

        info!(user_id, is_admin, "checked admin status");
        Ok(is_admin)
    }
}
