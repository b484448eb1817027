//! Album folder scanner
//!
//! Lists the album folders under the albums root and the image files inside
//! each album folder. Filtering is done by pure functions over filenames so
//! the rules can be exercised without touching the filesystem; the
//! `FolderScanner` methods are thin async wrappers that read directories.
//!
//! A missing directory is reported as `None`, never as an error: callers
//! decide whether that means "not found" or "zero photos".

use crate::config::{ALBUMS_URL_PREFIX, COVER_IMAGE_FILENAME, IMAGE_EXTENSIONS};
use crate::error::{AppError, Result};
use std::collections::BTreeSet;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;

/// True for filenames with an allowed image extension (case-insensitive)
pub fn is_image_file(name: &str) -> bool {
    match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => {
            let ext = ext.to_ascii_lowercase();
            IMAGE_EXTENSIONS.contains(&ext.as_str())
        }
        _ => false,
    }
}

/// True for the reserved album cover filename (case-insensitive)
pub fn is_cover_image(name: &str) -> bool {
    name.eq_ignore_ascii_case(COVER_IMAGE_FILENAME)
}

/// Reduce a directory listing to the set of photo filenames
pub fn filter_image_files<I, S>(names: I) -> BTreeSet<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    names
        .into_iter()
        .map(Into::into)
        .filter(|name| is_image_file(name) && !is_cover_image(name))
        .collect()
}

/// Default photo title: the filename without its final extension
pub fn default_photo_title(filename: &str) -> String {
    match filename.rfind('.') {
        Some(idx) if idx + 1 < filename.len() => filename[..idx].to_string(),
        _ => filename.to_string(),
    }
}

/// URL path of a photo under the static albums mount
pub fn photo_url_path(folder_name: &str, filename: &str) -> String {
    format!("{}/{}/{}", ALBUMS_URL_PREFIX, folder_name, filename)
}

/// URL path of an album's cover image
pub fn cover_url_path(folder_name: &str) -> String {
    format!(
        "{}/{}/{}",
        ALBUMS_URL_PREFIX,
        urlencoding::encode(folder_name),
        COVER_IMAGE_FILENAME
    )
}

/// True if `name` can be used as a single directory below the albums root
pub fn is_safe_folder_name(name: &str) -> bool {
    !name.trim().is_empty()
        && name != "."
        && name != ".."
        && !name.contains(['/', '\\', '\0'])
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EntryKind {
    Directory,
    File,
}

/// Reads album folders below a fixed root directory
#[derive(Debug, Clone)]
pub struct FolderScanner {
    root: PathBuf,
    max_entries: usize,
}

impl FolderScanner {
    pub fn new(root: PathBuf, max_entries: usize) -> Self {
        Self { root, max_entries }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn album_path(&self, folder_name: &str) -> PathBuf {
        self.root.join(folder_name)
    }

    /// Names of the subdirectories of the albums root, or `None` if the
    /// root does not exist. Names `scan_album` would refuse are skipped.
    pub async fn list_album_folders(&self) -> Result<Option<BTreeSet<String>>> {
        let folders = self.read_entries(&self.root, EntryKind::Directory).await?;
        Ok(folders.map(|names| {
            names
                .into_iter()
                .filter(|name| {
                    let safe = is_safe_folder_name(name);
                    if !safe {
                        tracing::warn!("Ignoring album folder with unsafe name: {:?}", name);
                    }
                    safe
                })
                .collect()
        }))
    }

    /// Photo filenames in an album folder, or `None` if the folder does not
    /// exist
    pub async fn scan_album(&self, folder_name: &str) -> Result<Option<BTreeSet<String>>> {
        if !is_safe_folder_name(folder_name) {
            tracing::warn!("Refusing to scan unsafe folder name: {:?}", folder_name);
            return Ok(None);
        }

        let files = self
            .read_entries(&self.album_path(folder_name), EntryKind::File)
            .await?;
        Ok(files.map(|names| filter_image_files(names)))
    }

    /// Whether the album folder holds a cover image
    pub async fn has_cover_image(&self, folder_name: &str) -> bool {
        if !is_safe_folder_name(folder_name) {
            return false;
        }

        fs::metadata(self.album_path(folder_name).join(COVER_IMAGE_FILENAME))
            .await
            .map(|m| m.is_file())
            .unwrap_or(false)
    }

    /// Create the album folder if it does not exist yet
    pub async fn ensure_album_folder(&self, folder_name: &str) -> Result<PathBuf> {
        if !is_safe_folder_name(folder_name) {
            return Err(AppError::Validation(format!(
                "Invalid folder name: {}",
                folder_name
            )));
        }

        let path = self.album_path(folder_name);
        fs::create_dir_all(&path).await?;
        Ok(path)
    }

    async fn read_entries(&self, dir: &Path, kind: EntryKind) -> Result<Option<Vec<String>>> {
        match fs::metadata(dir).await {
            Ok(meta) if meta.is_dir() => {}
            Ok(_) => return Ok(None),
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        }

        let mut entries = fs::read_dir(dir).await?;
        let mut names = Vec::new();
        let mut seen = 0usize;

        while let Some(entry) = entries.next_entry().await? {
            seen += 1;
            if seen > self.max_entries {
                return Err(AppError::Validation(format!(
                    "Folder {} has more than {} entries",
                    dir.display(),
                    self.max_entries
                )));
            }

            // Follow symlinks so linked files and folders count
            let meta = match fs::metadata(entry.path()).await {
                Ok(meta) => meta,
                Err(e) => {
                    tracing::warn!("Skipping unreadable entry {:?}: {}", entry.path(), e);
                    continue;
                }
            };
            let matches = match kind {
                EntryKind::Directory => meta.is_dir(),
                EntryKind::File => meta.is_file(),
            };
            if !matches {
                continue;
            }

            match entry.file_name().into_string() {
                Ok(name) => names.push(name),
                Err(raw) => tracing::warn!("Skipping non UTF-8 filename: {:?}", raw),
            }
        }

        Ok(Some(names))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_filter_image_files() {
        let names = vec![
            "a.jpg", "b.PNG", "c.jpeg", "d.gif", "e.webp", "cover.jpg", "notes.txt", "raw.CR2",
            "noext", ".jpg",
        ];

        let images = filter_image_files(names);

        let expected: Vec<&str> = vec!["a.jpg", "b.PNG", "c.jpeg", "d.gif", "e.webp"];
        assert_eq!(images.iter().map(String::as_str).collect::<Vec<_>>(), expected);
    }

    #[test]
    fn test_cover_is_case_insensitive() {
        let images = filter_image_files(vec!["COVER.JPG", "Cover.jpg", "cover.png"]);

        // Only cover.jpg is reserved
        assert_eq!(images.into_iter().collect::<Vec<_>>(), vec!["cover.png"]);
    }

    #[test]
    fn test_default_photo_title() {
        assert_eq!(default_photo_title("beach.jpg"), "beach");
        assert_eq!(default_photo_title("IMG.0001.jpeg"), "IMG.0001");
        assert_eq!(default_photo_title("noext"), "noext");
        assert_eq!(default_photo_title("trailing."), "trailing.");
    }

    #[test]
    fn test_url_paths() {
        assert_eq!(photo_url_path("Album1", "a.jpg"), "/albums/Album1/a.jpg");
        assert_eq!(cover_url_path("My Trip"), "/albums/My%20Trip/cover.jpg");
    }

    #[test]
    fn test_safe_folder_names() {
        assert!(is_safe_folder_name("Album1"));
        assert!(is_safe_folder_name("Zomer 2025"));
        assert!(!is_safe_folder_name(""));
        assert!(!is_safe_folder_name(".."));
        assert!(!is_safe_folder_name("a/b"));
        assert!(!is_safe_folder_name("a\\b"));
    }

    #[tokio::test]
    async fn test_scan_album() {
        let temp = TempDir::new().unwrap();
        let album = temp.path().join("Album1");
        std::fs::create_dir_all(album.join("nested.jpg")).unwrap();
        for name in ["a.jpg", "b.png", "cover.jpg", "readme.md"] {
            std::fs::write(album.join(name), b"x").unwrap();
        }

        let scanner = FolderScanner::new(temp.path().to_path_buf(), 100);
        let files = scanner.scan_album("Album1").await.unwrap().unwrap();

        assert_eq!(files.into_iter().collect::<Vec<_>>(), vec!["a.jpg", "b.png"]);
        assert!(scanner.has_cover_image("Album1").await);
    }

    #[tokio::test]
    async fn test_missing_folder_is_none() {
        let temp = TempDir::new().unwrap();
        let scanner = FolderScanner::new(temp.path().join("missing"), 100);

        assert!(scanner.scan_album("Album1").await.unwrap().is_none());
        assert!(scanner.list_album_folders().await.unwrap().is_none());
        assert!(!scanner.has_cover_image("Album1").await);
    }

    #[tokio::test]
    async fn test_list_album_folders_ignores_files() {
        let temp = TempDir::new().unwrap();
        std::fs::create_dir(temp.path().join("Album1")).unwrap();
        std::fs::create_dir(temp.path().join("Album2")).unwrap();
        std::fs::write(temp.path().join("stray.jpg"), b"x").unwrap();

        let scanner = FolderScanner::new(temp.path().to_path_buf(), 100);
        let folders = scanner.list_album_folders().await.unwrap().unwrap();

        assert_eq!(folders.into_iter().collect::<Vec<_>>(), vec!["Album1", "Album2"]);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_list_album_folders_skips_unscannable_names() {
        let temp = TempDir::new().unwrap();
        std::fs::create_dir(temp.path().join("Album1")).unwrap();
        std::fs::create_dir(temp.path().join("a\\b")).unwrap();
        std::fs::write(temp.path().join("a\\b/x.jpg"), b"x").unwrap();

        let scanner = FolderScanner::new(temp.path().to_path_buf(), 100);
        let folders = scanner.list_album_folders().await.unwrap().unwrap();

        assert_eq!(folders.into_iter().collect::<Vec<_>>(), vec!["Album1"]);
        assert!(scanner.scan_album("a\\b").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_scan_is_bounded() {
        let temp = TempDir::new().unwrap();
        let album = temp.path().join("Big");
        std::fs::create_dir(&album).unwrap();
        for i in 0..5 {
            std::fs::write(album.join(format!("{}.jpg", i)), b"x").unwrap();
        }

        let scanner = FolderScanner::new(temp.path().to_path_buf(), 3);
        let result = scanner.scan_album("Big").await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }
}
