use crate::auth::Identity;
use crate::database::postgres_repository::Repository;
use crate::error::app_error::AppError;
use crate::models::user::{RegisterRequest, User};
use crate::service::credentials::Credentials;
use tracing::{info, warn};
use validator::Validate;

/// Login and registration over the record store, shared by both surfaces.
pub struct AuthService<'a> {
    pub store: &'a dyn Repository,
    pub credentials: &'a Credentials,
}

impl<'a> AuthService<'a> {
    pub fn new(store: &'a dyn Repository, credentials: &'a Credentials) -> Self {
        Self { store, credentials }
    }

    /// Exact, case-sensitive username match. Unknown user and wrong password
    /// are indistinguishable to the caller.
    pub async fn login(&self, username: &str, password: &str) -> Result<Identity, AppError> {
        let user = self.store.get_user_by_username(username).await?;
        let verified = self
            .credentials
            .verify_blocking(password.to_string(), user.as_ref().map(|u| u.password_hash.clone()))
            .await?;

        match user {
            Some(user) if verified => {
                info!(user_id = user.id, "login succeeded");
                Ok(Identity::from(&user))
            }
            _ => {
                warn!(username = %username, "login failed");
                Err(AppError::InvalidCredentials)
            }
        }
    }

    pub async fn register(&self, request: &RegisterRequest) -> Result<User, AppError> {
        request.validate()?;

        if self.store.get_user_by_username(&request.username).await?.is_some() {
            return Err(AppError::UserAlreadyExists(request.username.clone()));
        }

        let hash = self.credentials.hash_blocking(request.password.clone()).await?;
        // The unique constraint still decides a concurrent race.
        let user = self.store.create_user(&request.username, &hash).await?;
        info!(user_id = user.id, "user registered");
        Ok(user)
    }
}
