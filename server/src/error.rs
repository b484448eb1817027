//! Error types for the photo album server
//!
//! All errors use thiserror for structured error handling.
//! At the HTTP boundary they are converted to a JSON body of the form
//! `{ "error": "<message>" }` with a status code matching the variant.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Album not found")]
    AlbumNotFound(String),

    #[error("Album folder not found")]
    AlbumFolderNotFound(String),

    #[error("Albums folder not found")]
    AlbumsRootNotFound(String),

    #[error("Photo not found")]
    PhotoNotFound(String),

    #[error("No user found to assign albums to")]
    NoOwnerAvailable,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("{0}")]
    Validation(String),

    #[error("Password hashing error: {0}")]
    PasswordHash(String),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::AlbumNotFound(_)
            | AppError::AlbumFolderNotFound(_)
            | AppError::AlbumsRootNotFound(_)
            | AppError::PhotoNotFound(_) => StatusCode::NOT_FOUND,
            AppError::NoOwnerAvailable | AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AppError::Database(_) | AppError::Io(_) | AppError::PasswordHash(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Message safe to show to clients. Internal failures are not described.
    pub fn public_message(&self) -> String {
        if self.status_code() == StatusCode::INTERNAL_SERVER_ERROR {
            "Internal server error".to_string()
        } else {
            self.to_string()
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        match &self {
            AppError::AlbumNotFound(id) | AppError::PhotoNotFound(id) => {
                tracing::debug!("{}: {}", self, id);
            }
            AppError::AlbumFolderNotFound(path) | AppError::AlbumsRootNotFound(path) => {
                tracing::warn!("{}: {}", self, path);
            }
            _ if status == StatusCode::INTERNAL_SERVER_ERROR => {
                tracing::error!("Request failed: {}", self);
            }
            _ => {}
        }

        let body = Json(serde_json::json!({ "error": self.public_message() }));
        (status, body).into_response()
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
