//! Application configuration
//!
//! Central location for configuration constants, resource limits and
//! validation boundaries, plus the runtime `ServerConfig` assembled by the
//! binary from command-line arguments and environment variables.

use std::net::SocketAddr;
use std::path::PathBuf;

// ===== Filesystem Scanning =====

/// File extensions (lowercase, without dot) recognised as photos
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp"];

/// Reserved album thumbnail filename, never treated as a photo
pub const COVER_IMAGE_FILENAME: &str = "cover.jpg";

/// Default upper bound on directory entries read by a single scan.
/// Larger folders are rejected rather than listed inside a request.
pub const DEFAULT_MAX_SCAN_ENTRIES: usize = 10_000;

/// URL prefix under which the albums root is served as static files
pub const ALBUMS_URL_PREFIX: &str = "/albums";

/// Rows per INSERT statement when adding photos in bulk.
/// Keeps each statement well below SQLite's bound parameter limit.
pub const PHOTO_INSERT_CHUNK_SIZE: usize = 500;

// ===== Presentation Fallbacks =====

/// Width reported for photos without stored dimensions
pub const FALLBACK_PHOTO_WIDTH: i64 = 1200;

/// Height reported for photos without stored dimensions
pub const FALLBACK_PHOTO_HEIGHT: i64 = 800;

// ===== Comment Paging =====

/// Comments returned when no limit is requested
pub const DEFAULT_COMMENT_PAGE_SIZE: i64 = 10;

/// Largest page of comments a client may request
pub const MAX_COMMENT_PAGE_SIZE: i64 = 100;

/// Maximum accepted comment length in characters
pub const MAX_COMMENT_LENGTH: usize = 2_000;

// ===== Defaults =====

pub const DEFAULT_DATABASE_PATH: &str = "data/photoalbum.db";
pub const DEFAULT_ALBUMS_DIR: &str = "public/albums";
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";

/// Runtime configuration shared by the server and the CLI subcommands
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub database_path: PathBuf,
    pub albums_dir: PathBuf,
    pub bind_addr: SocketAddr,
    /// Email of the user that owns albums created by sync.
    /// When unset, the first admin (else the first user) is used.
    pub default_owner_email: Option<String>,
    pub max_scan_entries: usize,
}

impl ServerConfig {
    pub fn new(database_path: PathBuf, albums_dir: PathBuf, bind_addr: SocketAddr) -> Self {
        Self {
            database_path,
            albums_dir,
            bind_addr,
            default_owner_email: None,
            max_scan_entries: DEFAULT_MAX_SCAN_ENTRIES,
        }
    }
}
