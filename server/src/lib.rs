//! Photo album server library
//!
//! Albums are folders below a configured root; photos are the image files
//! inside them. This library syncs those folders into SQLite and serves the
//! albums, photos and comments over HTTP.

pub mod api;
pub mod app;
pub mod config;
pub mod database;
pub mod error;
pub mod services;
pub mod storage;
