//! Authentication and user management service

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

use super::activity_log::ActivityLogService;
use crate::{
    config::AuthConfig,
    error::{AppError, AppResult},
    models::{
        user::{Actor, CreateUser, PageQuery, User, UserClaims},
        Role,
    },
    policy::{authorize, Action},
    repository::Repository,
};

#[derive(Clone)]
pub struct UsersService {
    repository: Repository,
    config: AuthConfig,
    activity: ActivityLogService,
}

impl UsersService {
    pub fn new(repository: Repository, config: AuthConfig, activity: ActivityLogService) -> Self {
        Self { repository, config, activity }
    }

    /// Authenticate by username and password, returning a JWT token
    pub async fn authenticate(&self, username: &str, password: &str) -> AppResult<(String, User)> {
        let user = self
            .repository
            .users
            .get_by_username(username)
            .await?
            .ok_or_else(|| AppError::Unauthorized("Invalid username or password".to_string()))?;

        if !verify_password(&user.password_hash, password)? {
            tracing::info!(username, "Rejected login attempt");
            return Err(AppError::Unauthorized("Invalid username or password".to_string()));
        }

        let token = UserClaims::new(&user, self.config.jwt_expiration_hours)
            .create_token(&self.config.jwt_secret)
            .map_err(|e| AppError::Internal(format!("Failed to create token: {}", e)))?;

        self.activity.record(Some(user.id), "LOGIN", format!("{} logged in", user.username));
        Ok((token, user))
    }

    /// Create the configured administrator account if it does not exist yet
    pub async fn ensure_bootstrap_admin(&self) -> AppResult<()> {
        let (Some(username), Some(password)) = (
            self.config.bootstrap_admin.as_deref(),
            self.config.bootstrap_password.as_deref(),
        ) else {
            return Ok(());
        };

        if self.repository.users.get_by_username(username).await?.is_some() {
            return Ok(());
        }

        let data = CreateUser {
            username: username.to_string(),
            password: password.to_string(),
            full_name: "Administrator".to_string(),
            role: Role::Admin,
        };
        let hash = hash_password(&data.password)?;
        let user = self.repository.users.create(&data, &hash).await?;

        tracing::info!(user_id = user.id, username, "Bootstrap administrator created");
        Ok(())
    }

    pub async fn get_by_id(&self, id: i32) -> AppResult<User> {
        self.repository.users.get_by_id(id).await
    }

    pub async fn list(&self, actor: &Actor, page: &PageQuery) -> AppResult<(Vec<User>, i64)> {
        authorize(actor, &Action::ManageUsers)?;
        self.repository.users.list(page).await
    }

    pub async fn create(&self, actor: &Actor, data: &CreateUser) -> AppResult<User> {
        authorize(actor, &Action::ManageUsers)?;

        let hash = hash_password(&data.password)?;
        let user = self.repository.users.create(data, &hash).await?;

        tracing::info!(user_id = user.id, role = %user.role, "User created");
        self.activity.record(
            Some(actor.id),
            "CREATE_USER",
            format!("Created {} account '{}'", user.role, user.username),
        );
        Ok(user)
    }

    pub async fn delete(&self, actor: &Actor, id: i32) -> AppResult<()> {
        authorize(actor, &Action::ManageUsers)?;
        if actor.id == id {
            return Err(AppError::Validation("You cannot delete your own account".to_string()));
        }

        self.repository.users.delete(id).await?;
        self.activity.record(Some(actor.id), "DELETE_USER", format!("Deleted user {}", id));
        Ok(())
    }
}

/// Hash a password with argon2 and a random salt
pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))
}

/// Check a password against a stored argon2 hash
pub fn verify_password(stored_hash: &str, password: &str) -> AppResult<bool> {
    let parsed = PasswordHash::new(stored_hash)
        .map_err(|e| AppError::Internal(format!("Invalid password hash: {}", e)))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_hash_round_trip() {
        let hash = hash_password("rahasia123").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password(&hash, "rahasia123").unwrap());
        assert!(!verify_password(&hash, "salah").unwrap());
    }

    #[test]
    fn test_malformed_hash_is_an_error() {
        assert!(verify_password("not-a-hash", "x").is_err());
    }
}
