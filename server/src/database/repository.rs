//! Repository layer for database operations
//!
//! This module provides CRUD operations for all entities plus the batch
//! operations used by folder sync. Each batch is applied inside a single
//! transaction.

use super::models::*;
use crate::config::PHOTO_INSERT_CHUNK_SIZE;
use crate::error::{AppError, Result};
use chrono::{DateTime, Utc};
use sqlx::{QueryBuilder, Sqlite, SqliteConnection, SqlitePool};
use uuid::Uuid;

/// Repository for database operations
#[derive(Clone)]
pub struct Repository {
    pool: SqlitePool,
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .map(|e| e.is_unique_violation())
        .unwrap_or(false)
}

impl Repository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    // ===== Users =====

    /// Create a user from an already hashed password
    pub async fn create_user(
        &self,
        email: &str,
        password_hash: &str,
        name: &str,
        is_admin: bool,
    ) -> Result<User> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now();

        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, email, password_hash, name, is_admin, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(&id)
        .bind(email)
        .bind(password_hash)
        .bind(name)
        .bind(is_admin)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::Validation(format!("A user with email {} already exists", email))
            } else {
                AppError::Database(e)
            }
        })?;

        tracing::debug!("Created user: {}", id);
        Ok(user)
    }

    pub async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = ?")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    pub async fn get_user(&self, id: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    /// Oldest admin user, if any
    pub async fn first_admin_user(&self) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "SELECT * FROM users WHERE is_admin = 1 ORDER BY created_at ASC, id ASC LIMIT 1",
        )
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Oldest user of any role, if any
    pub async fn first_user(&self) -> Result<Option<User>> {
        let user =
            sqlx::query_as::<_, User>("SELECT * FROM users ORDER BY created_at ASC, id ASC LIMIT 1")
                .fetch_optional(&self.pool)
                .await?;

        Ok(user)
    }

    // ===== Albums =====

    /// Create an album owned by `user_id`
    pub async fn create_album(
        &self,
        title: &str,
        description: Option<&str>,
        folder_name: &str,
        date: DateTime<Utc>,
        user_id: &str,
    ) -> Result<Album> {
        let mut conn = self.pool.acquire().await?;
        insert_album(&mut conn, title, description, folder_name, date, user_id).await
    }

    /// Get an album by ID
    pub async fn get_album(&self, id: &str) -> Result<Album> {
        sqlx::query_as::<_, Album>("SELECT * FROM albums WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::AlbumNotFound(id.to_string()))
    }

    /// List albums, newest first, with their photo counts
    pub async fn list_albums_with_counts(&self) -> Result<Vec<AlbumWithCount>> {
        let albums = sqlx::query_as::<_, AlbumWithCount>(
            r#"
            SELECT a.id, a.title, a.description, a.folder_name, a.cover_image, a.date,
                   COUNT(p.id) AS photo_count
            FROM albums a
            LEFT JOIN photos p ON p.album_id = a.id
            GROUP BY a.id
            ORDER BY a.date DESC, a.title ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(albums)
    }

    /// List every album's identity and folder
    pub async fn list_album_refs(&self) -> Result<Vec<AlbumRef>> {
        let albums = sqlx::query_as::<_, AlbumRef>(
            "SELECT id, folder_name FROM albums ORDER BY folder_name ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(albums)
    }

    /// Update album metadata. Absent fields are left unchanged.
    pub async fn update_album(
        &self,
        id: &str,
        title: Option<&str>,
        description: Option<&str>,
        date: Option<DateTime<Utc>>,
    ) -> Result<Album> {
        let album = sqlx::query_as::<_, Album>(
            r#"
            UPDATE albums
            SET title = COALESCE(?, title),
                description = COALESCE(?, description),
                date = COALESCE(?, date),
                updated_at = ?
            WHERE id = ?
            RETURNING *
            "#,
        )
        .bind(title)
        .bind(description)
        .bind(date)
        .bind(Utc::now())
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::AlbumNotFound(id.to_string()))?;

        tracing::debug!("Updated album: {}", id);
        Ok(album)
    }

    /// Delete an album together with its photos and their comments
    pub async fn delete_album(&self, id: &str) -> Result<()> {
        let rows = sqlx::query("DELETE FROM albums WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?
            .rows_affected();

        if rows == 0 {
            return Err(AppError::AlbumNotFound(id.to_string()));
        }

        tracing::debug!("Deleted album: {}", id);
        Ok(())
    }

    /// Create albums for new folders and delete albums whose folders are gone,
    /// all in one transaction. Returns the created albums.
    pub async fn apply_album_changes(
        &self,
        to_create: &[String],
        owner_id: &str,
        to_delete: &[AlbumRef],
    ) -> Result<Vec<Album>> {
        if to_create.is_empty() && to_delete.is_empty() {
            return Ok(Vec::new());
        }

        let mut tx = self.pool.begin().await?;
        let now = Utc::now();

        let mut created = Vec::with_capacity(to_create.len());
        for folder_name in to_create {
            let album = insert_album(&mut tx, folder_name, None, folder_name, now, owner_id).await?;
            created.push(album);
        }

        if !to_delete.is_empty() {
            let mut query: QueryBuilder<Sqlite> =
                QueryBuilder::new("DELETE FROM albums WHERE id IN (");
            let mut ids = query.separated(", ");
            for album in to_delete {
                ids.push_bind(album.id.clone());
            }
            ids.push_unseparated(")");
            query.build().execute(&mut *tx).await?;
        }

        tx.commit().await?;

        tracing::debug!(
            "Applied album changes: {} created, {} deleted",
            created.len(),
            to_delete.len()
        );
        Ok(created)
    }

    // ===== Photos =====

    /// List an album's photos ordered by filename
    pub async fn list_photos(&self, album_id: &str) -> Result<Vec<Photo>> {
        let photos = sqlx::query_as::<_, Photo>(
            "SELECT * FROM photos WHERE album_id = ? ORDER BY filename ASC",
        )
        .bind(album_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(photos)
    }

    /// List an album's photo identities and filenames
    pub async fn list_photo_refs(&self, album_id: &str) -> Result<Vec<PhotoRef>> {
        let photos = sqlx::query_as::<_, PhotoRef>(
            "SELECT id, filename FROM photos WHERE album_id = ? ORDER BY filename ASC",
        )
        .bind(album_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(photos)
    }

    /// Delete and insert photo records for one album in a single transaction
    pub async fn apply_photo_changes(
        &self,
        album_id: &str,
        to_delete: &[PhotoRef],
        to_add: &[NewPhoto],
    ) -> Result<()> {
        if to_delete.is_empty() && to_add.is_empty() {
            return Ok(());
        }

        let mut tx = self.pool.begin().await?;

        if !to_delete.is_empty() {
            let mut query: QueryBuilder<Sqlite> =
                QueryBuilder::new("DELETE FROM photos WHERE album_id = ");
            query.push_bind(album_id.to_string());
            query.push(" AND id IN (");
            let mut ids = query.separated(", ");
            for photo in to_delete {
                ids.push_bind(photo.id.clone());
            }
            ids.push_unseparated(")");
            query.build().execute(&mut *tx).await?;
        }

        let now = Utc::now();
        for chunk in to_add.chunks(PHOTO_INSERT_CHUNK_SIZE) {
            let mut query: QueryBuilder<Sqlite> = QueryBuilder::new(
                "INSERT INTO photos (id, album_id, filename, path, title, created_at, updated_at) ",
            );
            query.push_values(chunk, |mut row, photo| {
                row.push_bind(Uuid::new_v4().to_string())
                    .push_bind(album_id.to_string())
                    .push_bind(photo.filename.clone())
                    .push_bind(photo.path.clone())
                    .push_bind(photo.title.clone())
                    .push_bind(now)
                    .push_bind(now);
            });
            query.build().execute(&mut *tx).await?;
        }

        tx.commit().await?;

        tracing::debug!(
            "Applied photo changes for album {}: {} added, {} removed",
            album_id,
            to_add.len(),
            to_delete.len()
        );
        Ok(())
    }

    /// Get a photo by ID
    pub async fn get_photo(&self, id: &str) -> Result<Photo> {
        sqlx::query_as::<_, Photo>("SELECT * FROM photos WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::PhotoNotFound(id.to_string()))
    }

    pub async fn update_photo_title(&self, id: &str, title: Option<&str>) -> Result<Photo> {
        let photo = sqlx::query_as::<_, Photo>(
            "UPDATE photos SET title = ?, updated_at = ? WHERE id = ? RETURNING *",
        )
        .bind(title)
        .bind(Utc::now())
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::PhotoNotFound(id.to_string()))?;

        tracing::debug!("Updated photo title: {}", id);
        Ok(photo)
    }

    /// Delete a photo together with its comments
    pub async fn delete_photo(&self, id: &str) -> Result<()> {
        let rows = sqlx::query("DELETE FROM photos WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?
            .rows_affected();

        if rows == 0 {
            return Err(AppError::PhotoNotFound(id.to_string()));
        }

        tracing::debug!("Deleted photo: {}", id);
        Ok(())
    }

    // ===== Comments =====

    pub async fn create_comment(
        &self,
        photo_id: &str,
        user_id: &str,
        content: &str,
    ) -> Result<Comment> {
        let id = Uuid::new_v4().to_string();

        let comment = sqlx::query_as::<_, Comment>(
            r#"
            INSERT INTO comments (id, photo_id, user_id, content, created_at)
            VALUES (?, ?, ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(&id)
        .bind(photo_id)
        .bind(user_id)
        .bind(content)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        tracing::debug!("Created comment: {} on photo: {}", id, photo_id);
        Ok(comment)
    }

    /// One page of a photo's comments, newest first, with authors
    pub async fn list_comments(
        &self,
        photo_id: &str,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<CommentWithAuthor>> {
        let comments = sqlx::query_as::<_, CommentWithAuthor>(
            r#"
            SELECT c.id, c.content, c.created_at,
                   u.id AS user_id, u.name AS user_name, u.email AS user_email
            FROM comments c
            JOIN users u ON u.id = c.user_id
            WHERE c.photo_id = ?
            ORDER BY c.created_at DESC, c.id DESC
            LIMIT ? OFFSET ?
            "#,
        )
        .bind(photo_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(comments)
    }

    pub async fn count_comments(&self, photo_id: &str) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM comments WHERE photo_id = ?")
            .bind(photo_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

async fn insert_album(
    conn: &mut SqliteConnection,
    title: &str,
    description: Option<&str>,
    folder_name: &str,
    date: DateTime<Utc>,
    user_id: &str,
) -> Result<Album> {
    let id = Uuid::new_v4().to_string();
    let now = Utc::now();

    let album = sqlx::query_as::<_, Album>(
        r#"
        INSERT INTO albums (id, title, description, folder_name, cover_image, user_id, date, created_at, updated_at)
        VALUES (?, ?, ?, ?, NULL, ?, ?, ?, ?)
        RETURNING *
        "#,
    )
    .bind(&id)
    .bind(title)
    .bind(description)
    .bind(folder_name)
    .bind(user_id)
    .bind(date)
    .bind(now)
    .bind(now)
    .fetch_one(&mut *conn)
    .await
    .map_err(|e| {
        if is_unique_violation(&e) {
            AppError::Validation(format!("Folder {} is already used by another album", folder_name))
        } else {
            AppError::Database(e)
        }
    })?;

    tracing::debug!("Created album: {} ({})", id, folder_name);
    Ok(album)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::create_memory_pool;

    async fn create_test_repo() -> Repository {
        let pool = create_memory_pool().await.unwrap();
        Repository::new(pool)
    }

    fn new_photo(filename: &str) -> NewPhoto {
        NewPhoto {
            filename: filename.to_string(),
            path: format!("/albums/Test/{}", filename),
            title: filename.to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_and_find_user() {
        let repo = create_test_repo().await;

        let user = repo
            .create_user("admin@example.com", "hash", "Admin", true)
            .await
            .unwrap();
        assert!(user.is_admin);

        let found = repo.find_user_by_email("admin@example.com").await.unwrap();
        assert_eq!(found.unwrap().id, user.id);

        let missing = repo.find_user_by_email("nobody@example.com").await.unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn test_duplicate_email_is_validation_error() {
        let repo = create_test_repo().await;

        repo.create_user("a@example.com", "h", "A", false).await.unwrap();
        let result = repo.create_user("a@example.com", "h", "A", false).await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_first_admin_prefers_admins() {
        let repo = create_test_repo().await;

        repo.create_user("user@example.com", "h", "User", false).await.unwrap();
        assert!(repo.first_admin_user().await.unwrap().is_none());
        assert_eq!(
            repo.first_user().await.unwrap().unwrap().email,
            "user@example.com"
        );

        repo.create_user("admin@example.com", "h", "Admin", true).await.unwrap();
        assert_eq!(
            repo.first_admin_user().await.unwrap().unwrap().email,
            "admin@example.com"
        );
    }

    #[tokio::test]
    async fn test_album_crud() {
        let repo = create_test_repo().await;
        let user = repo.create_user("a@example.com", "h", "A", true).await.unwrap();

        let album = repo
            .create_album("Summer", Some("Beach"), "Summer2025", Utc::now(), &user.id)
            .await
            .unwrap();
        assert_eq!(album.folder_name, "Summer2025");

        let updated = repo
            .update_album(&album.id, Some("Summer '25"), None, None)
            .await
            .unwrap();
        assert_eq!(updated.title, "Summer '25");
        assert_eq!(updated.description.as_deref(), Some("Beach"));

        repo.delete_album(&album.id).await.unwrap();
        assert!(matches!(
            repo.get_album(&album.id).await,
            Err(AppError::AlbumNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_folder_name_is_unique() {
        let repo = create_test_repo().await;
        let user = repo.create_user("a@example.com", "h", "A", true).await.unwrap();

        repo.create_album("One", None, "Shared", Utc::now(), &user.id)
            .await
            .unwrap();
        let result = repo
            .create_album("Two", None, "Shared", Utc::now(), &user.id)
            .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_apply_photo_changes() {
        let repo = create_test_repo().await;
        let user = repo.create_user("a@example.com", "h", "A", true).await.unwrap();
        let album = repo
            .create_album("Test", None, "Test", Utc::now(), &user.id)
            .await
            .unwrap();

        repo.apply_photo_changes(&album.id, &[], &[new_photo("a.jpg"), new_photo("b.jpg")])
            .await
            .unwrap();

        let refs = repo.list_photo_refs(&album.id).await.unwrap();
        assert_eq!(refs.len(), 2);

        let doomed: Vec<PhotoRef> = refs.into_iter().filter(|p| p.filename == "a.jpg").collect();
        repo.apply_photo_changes(&album.id, &doomed, &[new_photo("c.jpg")])
            .await
            .unwrap();

        let names: Vec<String> = repo
            .list_photos(&album.id)
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.filename)
            .collect();
        assert_eq!(names, vec!["b.jpg", "c.jpg"]);
    }

    #[tokio::test]
    async fn test_failed_batch_rolls_back() {
        let repo = create_test_repo().await;
        let user = repo.create_user("a@example.com", "h", "A", true).await.unwrap();
        let album = repo
            .create_album("Test", None, "Test", Utc::now(), &user.id)
            .await
            .unwrap();

        repo.apply_photo_changes(&album.id, &[], &[new_photo("a.jpg")])
            .await
            .unwrap();
        let existing = repo.list_photo_refs(&album.id).await.unwrap();

        // The duplicate filename violates the per-album unique key
        let result = repo
            .apply_photo_changes(&album.id, &existing, &[new_photo("b.jpg"), new_photo("b.jpg")])
            .await;
        assert!(result.is_err());

        let after = repo.list_photo_refs(&album.id).await.unwrap();
        assert_eq!(after, existing);
    }

    #[tokio::test]
    async fn test_album_delete_cascades() {
        let repo = create_test_repo().await;
        let user = repo.create_user("a@example.com", "h", "A", true).await.unwrap();
        let album = repo
            .create_album("Test", None, "Test", Utc::now(), &user.id)
            .await
            .unwrap();
        repo.apply_photo_changes(&album.id, &[], &[new_photo("a.jpg")])
            .await
            .unwrap();
        let photo = repo.list_photos(&album.id).await.unwrap().remove(0);
        repo.create_comment(&photo.id, &user.id, "Nice").await.unwrap();

        repo.delete_album(&album.id).await.unwrap();

        let photos: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM photos")
            .fetch_one(repo.pool())
            .await
            .unwrap();
        let comments: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM comments")
            .fetch_one(repo.pool())
            .await
            .unwrap();
        assert_eq!(photos, 0);
        assert_eq!(comments, 0);
    }

    #[tokio::test]
    async fn test_comment_paging() {
        let repo = create_test_repo().await;
        let user = repo.create_user("a@example.com", "h", "Ann", true).await.unwrap();
        let album = repo
            .create_album("Test", None, "Test", Utc::now(), &user.id)
            .await
            .unwrap();
        repo.apply_photo_changes(&album.id, &[], &[new_photo("a.jpg")])
            .await
            .unwrap();
        let photo = repo.list_photos(&album.id).await.unwrap().remove(0);

        for i in 0..3 {
            repo.create_comment(&photo.id, &user.id, &format!("Comment {}", i))
                .await
                .unwrap();
        }

        let page = repo.list_comments(&photo.id, 2, 0).await.unwrap();
        assert_eq!(page.len(), 2);
        assert_eq!(page[0].content, "Comment 2");
        assert_eq!(page[0].user_name, "Ann");

        let rest = repo.list_comments(&photo.id, 2, 2).await.unwrap();
        assert_eq!(rest.len(), 1);
        assert_eq!(repo.count_comments(&photo.id).await.unwrap(), 3);
    }
}
