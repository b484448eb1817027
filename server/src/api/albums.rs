//! Album endpoints
//!
//! Listing, CRUD and folder sync for albums.

use super::Success;
use crate::app::AppState;
use crate::database::{Album, AlbumDetail, AlbumSummary, CreateAlbumRequest, UpdateAlbumRequest};
use crate::error::Result;
use crate::services::{PhotoSyncReport, SyncAllReport};
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncAllParams {
    #[serde(default)]
    pub dry_run: bool,
}

/// List all albums, newest first
pub async fn list_albums(State(state): State<AppState>) -> Result<Json<Vec<AlbumSummary>>> {
    Ok(Json(state.albums_service.list_albums().await?))
}

/// Create an album and its folder
pub async fn create_album(
    State(state): State<AppState>,
    payload: std::result::Result<Json<CreateAlbumRequest>, JsonRejection>,
) -> Result<Json<Album>> {
    let Json(req) = payload?;
    Ok(Json(state.albums_service.create_album(req).await?))
}

/// Get an album with its photos
pub async fn get_album(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<AlbumDetail>> {
    Ok(Json(state.albums_service.get_album(&id).await?))
}

/// Update album metadata
pub async fn update_album(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: std::result::Result<Json<UpdateAlbumRequest>, JsonRejection>,
) -> Result<Json<Album>> {
    let Json(req) = payload?;
    Ok(Json(state.albums_service.update_album(&id, req).await?))
}

/// Delete an album with its photos and comments
pub async fn delete_album(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Success>> {
    state.albums_service.delete_album(&id).await?;
    Ok(Json(Success::ok()))
}

/// Sync one album's photos with its folder
pub async fn sync_album(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<PhotoSyncReport>> {
    Ok(Json(state.sync_service.sync_album(&id).await?))
}

/// Sync all albums with the albums root
pub async fn sync_all_albums(
    State(state): State<AppState>,
    Query(params): Query<SyncAllParams>,
) -> Result<Json<SyncAllReport>> {
    Ok(Json(state.sync_service.sync_all(params.dry_run).await?))
}
