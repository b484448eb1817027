//! Storage module
//!
//! Read access to the album folders on disk.

pub mod scanner;

pub use scanner::FolderScanner;
