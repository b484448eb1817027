//! Application state and initialization
//!
//! This module manages the central application state and lifecycle.
//! All services are initialized here and made available through AppState.

use crate::config::ServerConfig;
use crate::database::{create_pool, Repository};
use crate::error::Result;
use crate::services::{AlbumsService, AuthService, OwnerPolicy, PhotosService, SyncService};
use crate::storage::FolderScanner;
use sqlx::SqlitePool;
use std::sync::Arc;

/// Central application state holding all services
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    pub albums_service: AlbumsService,
    pub photos_service: PhotosService,
    pub sync_service: SyncService,
    pub auth_service: AuthService,
}

impl AppState {
    /// Wire services over an initialized pool
    pub fn new(config: ServerConfig, pool: SqlitePool) -> Self {
        let repo = Repository::new(pool);
        let scanner = FolderScanner::new(config.albums_dir.clone(), config.max_scan_entries);
        let owner = OwnerPolicy::from_config(config.default_owner_email.clone());

        let sync_service = SyncService::new(repo.clone(), scanner.clone(), owner.clone());

        Self {
            albums_service: AlbumsService::new(
                repo.clone(),
                scanner,
                owner,
                sync_service.locks(),
            ),
            photos_service: PhotosService::new(repo.clone()),
            sync_service,
            auth_service: AuthService::new(repo),
            config: Arc::new(config),
        }
    }
}

/// Application setup - opens the database and builds the state
pub async fn setup(config: ServerConfig) -> Result<AppState> {
    tracing::info!("Initializing application");
    tracing::info!("Database: {:?}", config.database_path);
    tracing::info!("Albums directory: {:?}", config.albums_dir);

    if !config.albums_dir.is_dir() {
        tracing::warn!(
            "Albums directory {:?} does not exist yet, sync will report it missing",
            config.albums_dir
        );
    }

    let pool = create_pool(&config.database_path).await?;
    let state = AppState::new(config, pool);

    tracing::info!("Application initialized successfully");

    Ok(state)
}
