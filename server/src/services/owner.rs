//! Default album owner
//!
//! Albums created by sync or by an admin need an owning user. Which user
//! that is comes from configuration rather than from whoever happens to be
//! first in the users table.

use crate::database::{Repository, User};
use crate::error::{AppError, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OwnerPolicy {
    /// The user with this email owns new albums and must exist
    Designated(String),
    /// The oldest admin owns new albums, else the oldest user
    FirstAdmin,
}

impl OwnerPolicy {
    pub fn from_config(default_owner_email: Option<String>) -> Self {
        match default_owner_email {
            Some(email) if !email.trim().is_empty() => OwnerPolicy::Designated(email),
            _ => OwnerPolicy::FirstAdmin,
        }
    }

    /// Find the user that should own a newly created album
    pub async fn resolve(&self, repo: &Repository) -> Result<User> {
        match self {
            OwnerPolicy::Designated(email) => repo
                .find_user_by_email(email)
                .await?
                .ok_or_else(|| AppError::Validation(format!("Default owner {} not found", email))),
            OwnerPolicy::FirstAdmin => {
                if let Some(admin) = repo.first_admin_user().await? {
                    return Ok(admin);
                }

                let user = repo.first_user().await?.ok_or(AppError::NoOwnerAvailable)?;
                tracing::warn!(
                    "No admin user exists, assigning new albums to {}",
                    user.email
                );
                Ok(user)
            }
        }
    }
}
