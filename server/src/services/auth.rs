//! Authentication service
//!
//! Password check against Argon2id hashes. A failed login never reveals
//! whether the email exists.

use crate::database::{Repository, User, UserProfile};
use crate::error::{AppError, Result};
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use rand::rngs::OsRng;

/// Hash a password into a PHC string using Argon2id
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);

    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::PasswordHash(format!("Hashing failed: {}", e)))?;

    Ok(hash.to_string())
}

/// Check a password against a stored PHC string.
/// A malformed stored hash counts as a mismatch.
pub fn verify_password(password: &str, stored_hash: &str) -> bool {
    let parsed = match PasswordHash::new(stored_hash) {
        Ok(parsed) => parsed,
        Err(e) => {
            tracing::warn!("Stored password hash is malformed: {}", e);
            return false;
        }
    };

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

/// Service for user login and creation
#[derive(Clone)]
pub struct AuthService {
    repo: Repository,
}

impl AuthService {
    pub fn new(repo: Repository) -> Self {
        Self { repo }
    }

    /// Verify credentials and return the user's profile
    pub async fn login(&self, email: &str, password: &str) -> Result<UserProfile> {
        let email = email.trim();
        if email.is_empty() || password.is_empty() {
            return Err(AppError::Validation(
                "Email and password are required".to_string(),
            ));
        }

        let user = self
            .repo
            .find_user_by_email(email)
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        if !verify_password(password, &user.password_hash) {
            tracing::info!("Failed login for user {}", user.id);
            return Err(AppError::InvalidCredentials);
        }

        tracing::info!("User logged in: {}", user.id);
        Ok(user.into())
    }

    /// Create a user with a freshly hashed password
    pub async fn create_user(
        &self,
        email: &str,
        password: &str,
        name: &str,
        is_admin: bool,
    ) -> Result<User> {
        let email = email.trim();
        if email.is_empty() || !email.contains('@') {
            return Err(AppError::Validation(format!("Invalid email: {}", email)));
        }
        if password.is_empty() {
            return Err(AppError::Validation("Password cannot be empty".to_string()));
        }

        let hash = hash_password(password)?;
        let user = self.repo.create_user(email, &hash, name.trim(), is_admin).await?;

        tracing::info!("Created user {} ({})", user.id, user.email);
        Ok(user)
    }

    /// Create an admin user unless one with this email already exists
    pub async fn seed_admin(&self, email: &str, password: &str, name: &str) -> Result<User> {
        if let Some(existing) = self.repo.find_user_by_email(email.trim()).await? {
            tracing::info!("User {} already exists, leaving it unchanged", existing.email);
            return Ok(existing);
        }

        self.create_user(email, password, name, true).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::create_memory_pool;

    async fn create_test_service() -> AuthService {
        let pool = create_memory_pool().await.unwrap();
        AuthService::new(Repository::new(pool))
    }

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password("admin123").unwrap();

        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("admin123", &hash));
        assert!(!verify_password("admin124", &hash));
    }

    #[test]
    fn test_same_password_different_hashes() {
        let first = hash_password("same").unwrap();
        let second = hash_password("same").unwrap();

        assert_ne!(first, second);
    }

    #[test]
    fn test_malformed_hash_never_matches() {
        assert!(!verify_password("anything", "not-a-phc-string"));
    }

    #[tokio::test]
    async fn test_login_success() {
        let service = create_test_service().await;
        service
            .create_user("admin@example.com", "admin123", "Admin", true)
            .await
            .unwrap();

        let profile = service.login("admin@example.com", "admin123").await.unwrap();

        assert_eq!(profile.email, "admin@example.com");
        assert_eq!(profile.name, "Admin");
        assert!(profile.is_admin);
    }

    #[tokio::test]
    async fn test_login_failures_are_uniform() {
        let service = create_test_service().await;
        service
            .create_user("admin@example.com", "admin123", "Admin", true)
            .await
            .unwrap();

        let wrong_password = service.login("admin@example.com", "nope").await.unwrap_err();
        let unknown_email = service.login("ghost@example.com", "admin123").await.unwrap_err();

        assert!(matches!(wrong_password, AppError::InvalidCredentials));
        assert!(matches!(unknown_email, AppError::InvalidCredentials));
        assert_eq!(wrong_password.to_string(), unknown_email.to_string());
        assert_eq!(wrong_password.to_string(), "Invalid credentials");
    }

    #[tokio::test]
    async fn test_login_requires_fields() {
        let service = create_test_service().await;

        let result = service.login("", "").await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_seed_admin_is_idempotent() {
        let service = create_test_service().await;

        let first = service
            .seed_admin("admin@example.com", "admin123", "Admin")
            .await
            .unwrap();
        let second = service
            .seed_admin("admin@example.com", "other", "Other")
            .await
            .unwrap();

        assert_eq!(first.id, second.id);
        assert!(service.login("admin@example.com", "admin123").await.is_ok());
    }
}
