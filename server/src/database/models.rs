//! Database models
//!
//! Rust structs representing database entities, the request payloads that
//! create or modify them, and the JSON views returned to clients.
//! Everything serialized to clients uses camelCase keys.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A registered user
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: String,
    pub email: String,
    /// Argon2id PHC string
    pub password_hash: String,
    pub name: String,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
}

/// Public view of a user, returned on successful login
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: String,
    pub email: String,
    pub name: String,
    pub is_admin: bool,
}

impl From<User> for UserProfile {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            name: user.name,
            is_admin: user.is_admin,
        }
    }
}

/// An album, mapped one-to-one onto a folder under the albums root
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Album {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    /// Unique across albums
    pub folder_name: String,
    pub cover_image: Option<String>,
    pub user_id: String,
    pub date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Album identity and folder, the album-level reconciliation key
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct AlbumRef {
    pub id: String,
    pub folder_name: String,
}

/// Album row joined with its photo count
#[derive(Debug, Clone, FromRow)]
pub struct AlbumWithCount {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub folder_name: String,
    pub cover_image: Option<String>,
    pub date: DateTime<Utc>,
    pub photo_count: i64,
}

/// Create album request
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAlbumRequest {
    #[serde(default)]
    pub title: String,
    pub description: Option<String>,
    #[serde(default)]
    pub folder_name: String,
    /// RFC 3339 timestamp or `YYYY-MM-DD`
    pub date: Option<String>,
}

/// Update album request
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAlbumRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub date: Option<String>,
}

/// A photo file tracked inside an album
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Photo {
    pub id: String,
    pub album_id: String,
    /// Unique within the album
    pub filename: String,
    /// URL path under the static albums mount
    pub path: String,
    pub title: Option<String>,
    pub width: Option<i64>,
    pub height: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Photo identity and filename, the photo-level reconciliation key
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct PhotoRef {
    pub id: String,
    pub filename: String,
}

/// A photo record about to be inserted by sync
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPhoto {
    pub filename: String,
    pub path: String,
    pub title: String,
}

/// Update photo request
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdatePhotoRequest {
    pub title: Option<String>,
}

/// A comment on a photo
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: String,
    pub photo_id: String,
    pub user_id: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// Comment row joined with its author
#[derive(Debug, Clone, FromRow)]
pub struct CommentWithAuthor {
    pub id: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub user_id: String,
    pub user_name: String,
    pub user_email: String,
}

/// Create comment request
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCommentRequest {
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub user_id: String,
}

// ===== Client Views =====

/// Album as shown in the album listing
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlbumSummary {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub cover_image: Option<String>,
    pub folder_name: String,
    pub photo_count: i64,
    pub date: DateTime<Utc>,
}

/// Photo as shown in an album grid or lightbox
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhotoView {
    pub id: String,
    pub filename: String,
    pub src: String,
    pub thumbnail: String,
    pub title: String,
    pub width: i64,
    pub height: i64,
}

/// Album with its photos
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlbumDetail {
    #[serde(flatten)]
    pub album: Album,
    pub photos: Vec<PhotoView>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentAuthor {
    pub id: String,
    pub name: String,
}

/// Comment as shown in the comments panel
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentView {
    pub id: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub user: CommentAuthor,
}

impl From<CommentWithAuthor> for CommentView {
    fn from(row: CommentWithAuthor) -> Self {
        Self {
            id: row.id,
            content: row.content,
            created_at: row.created_at,
            user: CommentAuthor {
                id: row.user_id,
                name: row.user_name,
            },
        }
    }
}

/// One page of comments
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentPage {
    pub comments: Vec<CommentView>,
    pub total: i64,
    pub has_more: bool,
}

/// Author details included with a photo's comments
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhotoCommentAuthor {
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhotoComment {
    pub id: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub user_id: String,
    pub user: PhotoCommentAuthor,
}

impl From<CommentWithAuthor> for PhotoComment {
    fn from(row: CommentWithAuthor) -> Self {
        Self {
            id: row.id,
            content: row.content,
            created_at: row.created_at,
            user_id: row.user_id,
            user: PhotoCommentAuthor {
                name: row.user_name,
                email: row.user_email,
            },
        }
    }
}

/// Photo with its album and comments, newest comment first
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhotoDetail {
    #[serde(flatten)]
    pub photo: Photo,
    pub album: Album,
    pub comments: Vec<PhotoComment>,
}
