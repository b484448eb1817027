//! Albums service
//!
//! Album listing, detail and admin management. Album folders live under the
//! albums root; creating an album creates its folder when missing.

use crate::config::{FALLBACK_PHOTO_HEIGHT, FALLBACK_PHOTO_WIDTH};
use crate::database::{
    Album, AlbumDetail, AlbumSummary, CreateAlbumRequest, Photo, PhotoView, Repository,
    UpdateAlbumRequest,
};
use crate::error::{AppError, Result};
use crate::services::owner::OwnerPolicy;
use crate::services::sync::SyncLocks;
use crate::storage::scanner::{
    cover_url_path, default_photo_title, is_safe_folder_name, photo_url_path,
};
use crate::storage::FolderScanner;
use chrono::{DateTime, NaiveDate, Utc};
use std::sync::Arc;

/// Parse an album date given as RFC 3339 or as a plain `YYYY-MM-DD` day
pub fn parse_album_date(value: &str) -> Result<DateTime<Utc>> {
    let value = value.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.with_timezone(&Utc));
    }

    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|day| day.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
        .ok_or_else(|| AppError::Validation(format!("Invalid date: {}", value)))
}

fn photo_view(folder_name: &str, photo: Photo) -> PhotoView {
    let src = if photo.path.starts_with('/') {
        photo.path.clone()
    } else {
        photo_url_path(folder_name, &photo.filename)
    };

    PhotoView {
        id: photo.id,
        title: photo
            .title
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| photo.filename.clone()),
        filename: photo.filename,
        thumbnail: src.clone(),
        src,
        width: photo.width.unwrap_or(FALLBACK_PHOTO_WIDTH),
        height: photo.height.unwrap_or(FALLBACK_PHOTO_HEIGHT),
    }
}

/// Service for browsing and managing albums
#[derive(Clone)]
pub struct AlbumsService {
    repo: Repository,
    scanner: FolderScanner,
    owner: OwnerPolicy,
    locks: Arc<SyncLocks>,
}

impl AlbumsService {
    pub fn new(
        repo: Repository,
        scanner: FolderScanner,
        owner: OwnerPolicy,
        locks: Arc<SyncLocks>,
    ) -> Self {
        Self {
            repo,
            scanner,
            owner,
            locks,
        }
    }

    /// List albums newest first, filling in the folder's cover image when
    /// no cover is stored
    pub async fn list_albums(&self) -> Result<Vec<AlbumSummary>> {
        let rows = self.repo.list_albums_with_counts().await?;

        let mut albums = Vec::with_capacity(rows.len());
        for row in rows {
            let cover_image = match row.cover_image {
                Some(cover) => Some(cover),
                None if self.scanner.has_cover_image(&row.folder_name).await => {
                    Some(cover_url_path(&row.folder_name))
                }
                None => None,
            };

            albums.push(AlbumSummary {
                id: row.id,
                title: row.title,
                description: row.description,
                cover_image,
                folder_name: row.folder_name,
                photo_count: row.photo_count,
                date: row.date,
            });
        }

        Ok(albums)
    }

    /// Get an album with its photos.
    ///
    /// An album that has never been synced shows the photos found in its
    /// folder, with temporary ids, without storing them.
    pub async fn get_album(&self, id: &str) -> Result<AlbumDetail> {
        let album = self.repo.get_album(id).await?;
        let stored = self.repo.list_photos(&album.id).await?;

        let photos = if stored.is_empty() {
            self.unsynced_photos(&album.folder_name).await?
        } else {
            stored
                .into_iter()
                .map(|photo| photo_view(&album.folder_name, photo))
                .collect()
        };

        Ok(AlbumDetail { album, photos })
    }

    async fn unsynced_photos(&self, folder_name: &str) -> Result<Vec<PhotoView>> {
        let Some(files) = self.scanner.scan_album(folder_name).await? else {
            return Ok(Vec::new());
        };

        Ok(files
            .into_iter()
            .enumerate()
            .map(|(index, filename)| {
                let src = photo_url_path(folder_name, &filename);
                PhotoView {
                    id: format!("temp-{}", index),
                    title: default_photo_title(&filename),
                    filename,
                    thumbnail: src.clone(),
                    src,
                    width: FALLBACK_PHOTO_WIDTH,
                    height: FALLBACK_PHOTO_HEIGHT,
                }
            })
            .collect())
    }

    /// Create an album and its folder
    pub async fn create_album(&self, req: CreateAlbumRequest) -> Result<Album> {
        let title = req.title.trim();
        let folder_name = req.folder_name.trim();

        if title.is_empty() {
            return Err(AppError::Validation("Title is required".to_string()));
        }
        if !is_safe_folder_name(folder_name) {
            return Err(AppError::Validation(format!(
                "Invalid folder name: {}",
                req.folder_name
            )));
        }

        let date = match req.date.as_deref() {
            Some(value) if !value.trim().is_empty() => parse_album_date(value)?,
            _ => Utc::now(),
        };

        let owner = self.owner.resolve(&self.repo).await?;

        tracing::info!("Creating album: {} ({})", title, folder_name);

        let _sync = self.locks.exclusive().await;

        self.scanner.ensure_album_folder(folder_name).await?;

        let album = self
            .repo
            .create_album(
                title,
                req.description.as_deref(),
                folder_name,
                date,
                &owner.id,
            )
            .await?;

        tracing::info!("Album created: {}", album.id);
        Ok(album)
    }

    /// Update an album's title, description or date
    pub async fn update_album(&self, id: &str, req: UpdateAlbumRequest) -> Result<Album> {
        if matches!(req.title.as_deref(), Some(t) if t.trim().is_empty()) {
            return Err(AppError::Validation("Title cannot be empty".to_string()));
        }

        let date = match req.date.as_deref() {
            Some(value) if !value.trim().is_empty() => Some(parse_album_date(value)?),
            _ => None,
        };

        tracing::debug!("Updating album: {}", id);

        self.repo
            .update_album(
                id,
                req.title.as_deref().map(str::trim),
                req.description.as_deref(),
                date,
            )
            .await
    }

    /// Delete an album with its photos and comments. The folder stays on
    /// disk, so the next sync-all will recreate the album.
    pub async fn delete_album(&self, id: &str) -> Result<()> {
        tracing::info!("Deleting album: {}", id);

        let _sync = self.locks.exclusive().await;
        self.repo.delete_album(id).await?;
        self.locks.forget([id.to_string()]);

        tracing::info!("Album deleted: {}", id);
        Ok(())
    }
}
