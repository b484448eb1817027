//! Services module
//!
//! Business logic services that coordinate between the HTTP handlers, the
//! repository and the album folders on disk.

pub mod albums;
pub mod auth;
pub mod owner;
pub mod photos;
pub mod sync;

pub use albums::AlbumsService;
pub use auth::AuthService;
pub use owner::OwnerPolicy;
pub use photos::PhotosService;
pub use sync::{PhotoSyncReport, SyncAllReport, SyncLocks, SyncService};
