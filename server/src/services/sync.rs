//! Folder sync service
//!
//! Reconciles the album folders on disk with the album and photo records in
//! the database. The filesystem decides which albums and photos exist; the
//! database keeps their metadata, so titles of photos that stay on disk are
//! never touched.
//!
//! Every sync first computes a plan from the on-disk and stored sets, then
//! applies it. Photo changes for one album are applied in one transaction.
//! A sync-all applies album creation/removal in one transaction and then each
//! album's photo changes in its own, so a failure part way leaves the albums
//! already processed reconciled.
//!
//! Syncs are serialized: a per-album sync holds its album's lock and a shared
//! lock on the albums root; a sync-all holds the root lock exclusively, as do
//! album creation and deletion.

use crate::database::{AlbumRef, NewPhoto, PhotoRef, Repository};
use crate::error::{AppError, Result};
use crate::services::owner::OwnerPolicy;
use crate::storage::scanner::{default_photo_title, photo_url_path};
use crate::storage::FolderScanner;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Photo changes needed to bring one album in line with its folder
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PhotoSyncPlan {
    pub to_delete: Vec<PhotoRef>,
    pub to_add: Vec<NewPhoto>,
    /// Number of photos on disk
    pub total: usize,
}

/// Album changes needed to bring the collection in line with the root folder
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AlbumSyncPlan {
    pub to_create: Vec<String>,
    pub to_delete: Vec<AlbumRef>,
}

/// Compute the photo delta for one album
pub fn plan_photo_sync(
    folder_name: &str,
    existing: &[PhotoRef],
    on_disk: &BTreeSet<String>,
) -> PhotoSyncPlan {
    let stored: HashSet<&str> = existing.iter().map(|p| p.filename.as_str()).collect();

    let to_delete = existing
        .iter()
        .filter(|p| !on_disk.contains(&p.filename))
        .cloned()
        .collect();

    let to_add = on_disk
        .iter()
        .filter(|name| !stored.contains(name.as_str()))
        .map(|name| NewPhoto {
            filename: name.clone(),
            path: photo_url_path(folder_name, name),
            title: default_photo_title(name),
        })
        .collect();

    PhotoSyncPlan {
        to_delete,
        to_add,
        total: on_disk.len(),
    }
}

/// Compute the album delta for the whole collection
pub fn plan_album_sync(existing: &[AlbumRef], on_disk: &BTreeSet<String>) -> AlbumSyncPlan {
    let stored: HashSet<&str> = existing.iter().map(|a| a.folder_name.as_str()).collect();

    AlbumSyncPlan {
        to_create: on_disk
            .iter()
            .filter(|name| !stored.contains(name.as_str()))
            .cloned()
            .collect(),
        to_delete: existing
            .iter()
            .filter(|a| !on_disk.contains(&a.folder_name))
            .cloned()
            .collect(),
    }
}

/// Result of syncing one album
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhotoSyncReport {
    pub added: usize,
    pub removed: usize,
    pub total: usize,
}

impl From<&PhotoSyncPlan> for PhotoSyncReport {
    fn from(plan: &PhotoSyncPlan) -> Self {
        Self {
            added: plan.to_add.len(),
            removed: plan.to_delete.len(),
            total: plan.total,
        }
    }
}

/// Result of syncing the whole album collection
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncAllReport {
    pub albums_created: usize,
    pub albums_removed: usize,
    pub photos_added: usize,
    pub photos_removed: usize,
    pub total_albums: usize,
    pub new_album_names: Vec<String>,
    pub removed_album_names: Vec<String>,
    /// Set when nothing was written
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub dry_run: bool,
}

/// Locks serializing sync operations with each other and with album
/// creation and deletion
#[derive(Default)]
pub struct SyncLocks {
    root: RwLock<()>,
    albums: std::sync::Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl SyncLocks {
    /// Hold while changing the set of albums or album folders
    pub async fn exclusive(&self) -> RwLockWriteGuard<'_, ()> {
        self.root.write().await
    }

    async fn shared(&self) -> RwLockReadGuard<'_, ()> {
        self.root.read().await
    }

    /// Only call for albums known to exist, and `forget` them on deletion
    fn album(&self, album_id: &str) -> Arc<Mutex<()>> {
        let mut albums = self.albums.lock().unwrap_or_else(|e| e.into_inner());
        albums
            .entry(album_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    pub fn forget(&self, album_ids: impl IntoIterator<Item = String>) {
        let mut albums = self.albums.lock().unwrap_or_else(|e| e.into_inner());
        for id in album_ids {
            albums.remove(&id);
        }
    }

    #[cfg(test)]
    pub(crate) fn tracked_albums(&self) -> usize {
        self.albums.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}

/// Service reconciling album folders with the database
#[derive(Clone)]
pub struct SyncService {
    repo: Repository,
    scanner: FolderScanner,
    owner: OwnerPolicy,
    locks: Arc<SyncLocks>,
}

impl SyncService {
    pub fn new(repo: Repository, scanner: FolderScanner, owner: OwnerPolicy) -> Self {
        Self {
            repo,
            scanner,
            owner,
            locks: Arc::new(SyncLocks::default()),
        }
    }

    /// Locks shared with services that create or delete albums
    pub fn locks(&self) -> Arc<SyncLocks> {
        self.locks.clone()
    }

    /// Sync one album's photos with its folder
    pub async fn sync_album(&self, album_id: &str) -> Result<PhotoSyncReport> {
        // Albums cannot be created or deleted while this is held
        let _root = self.locks.shared().await;
        let album = self.repo.get_album(album_id).await?;

        let album_lock = self.locks.album(&album.id);
        let _album = album_lock.lock().await;

        tracing::info!("Syncing album {} ({})", album.id, album.folder_name);

        let on_disk = self
            .scanner
            .scan_album(&album.folder_name)
            .await?
            .ok_or_else(|| {
                AppError::AlbumFolderNotFound(
                    self.scanner.album_path(&album.folder_name).display().to_string(),
                )
            })?;

        let report = self
            .reconcile_photos(&album.id, &album.folder_name, &on_disk, true)
            .await?;

        tracing::info!(
            "Album {} synced: {} added, {} removed, {} total",
            album.folder_name,
            report.added,
            report.removed,
            report.total
        );

        Ok(report)
    }

    /// Sync the album collection with the albums root, then every album's
    /// photos. With `dry_run` the same report is computed without writing.
    pub async fn sync_all(&self, dry_run: bool) -> Result<SyncAllReport> {
        let _root = self.locks.exclusive().await;

        tracing::info!(
            "Syncing all albums from {:?}{}",
            self.scanner.root(),
            if dry_run { " (dry run)" } else { "" }
        );

        let folders = self.scanner.list_album_folders().await?.ok_or_else(|| {
            AppError::AlbumsRootNotFound(self.scanner.root().display().to_string())
        })?;

        let existing = self.repo.list_album_refs().await?;
        let plan = plan_album_sync(&existing, &folders);

        // Only needed, and only required to exist, when albums get created
        let owner = if plan.to_create.is_empty() {
            None
        } else {
            Some(self.owner.resolve(&self.repo).await?)
        };

        let created: Vec<AlbumRef> = if dry_run {
            Vec::new()
        } else {
            let owner_id = owner.as_ref().map(|u| u.id.as_str()).unwrap_or_default();
            let created = self
                .repo
                .apply_album_changes(&plan.to_create, owner_id, &plan.to_delete)
                .await?;
            self.locks.forget(plan.to_delete.iter().map(|a| a.id.clone()));

            created
                .into_iter()
                .map(|album| AlbumRef {
                    id: album.id,
                    folder_name: album.folder_name,
                })
                .collect()
        };

        let removed_ids: HashSet<&str> = plan.to_delete.iter().map(|a| a.id.as_str()).collect();
        let mut surviving: Vec<AlbumRef> = existing
            .iter()
            .filter(|a| !removed_ids.contains(a.id.as_str()))
            .cloned()
            .collect();
        surviving.extend(created);
        surviving.sort_by(|a, b| a.folder_name.cmp(&b.folder_name));

        let mut report = SyncAllReport {
            albums_created: plan.to_create.len(),
            albums_removed: plan.to_delete.len(),
            total_albums: surviving.len() + if dry_run { plan.to_create.len() } else { 0 },
            new_album_names: plan.to_create.clone(),
            removed_album_names: plan
                .to_delete
                .iter()
                .map(|a| a.folder_name.clone())
                .collect(),
            dry_run,
            ..Default::default()
        };

        for album in &surviving {
            let Some(on_disk) = self.scanner.scan_album(&album.folder_name).await? else {
                tracing::warn!("Album folder disappeared during sync: {}", album.folder_name);
                continue;
            };

            let photos = self
                .reconcile_photos(&album.id, &album.folder_name, &on_disk, !dry_run)
                .await?;
            report.photos_added += photos.added;
            report.photos_removed += photos.removed;
        }

        // Albums that would be created hold no photo records yet
        if dry_run {
            for folder_name in &plan.to_create {
                if let Some(on_disk) = self.scanner.scan_album(folder_name).await? {
                    report.photos_added += on_disk.len();
                }
            }
        }

        tracing::info!(
            "Sync complete: {} albums created, {} removed, {} photos added, {} removed, {} albums total",
            report.albums_created,
            report.albums_removed,
            report.photos_added,
            report.photos_removed,
            report.total_albums
        );

        Ok(report)
    }

    async fn reconcile_photos(
        &self,
        album_id: &str,
        folder_name: &str,
        on_disk: &BTreeSet<String>,
        apply: bool,
    ) -> Result<PhotoSyncReport> {
        let existing = self.repo.list_photo_refs(album_id).await?;
        let plan = plan_photo_sync(folder_name, &existing, on_disk);

        if apply {
            self.repo
                .apply_photo_changes(album_id, &plan.to_delete, &plan.to_add)
                .await?;
        }

        Ok(PhotoSyncReport::from(&plan))
    }
}
