//! Photos service
//!
//! Photo detail, title edits and the comments attached to a photo.

use crate::config::{DEFAULT_COMMENT_PAGE_SIZE, MAX_COMMENT_LENGTH, MAX_COMMENT_PAGE_SIZE};
use crate::database::{
    CommentAuthor, CommentPage, CommentView, CreateCommentRequest, Photo, PhotoDetail,
    Repository, UpdatePhotoRequest,
};
use crate::error::{AppError, Result};

/// Service for photos and their comments
#[derive(Clone)]
pub struct PhotosService {
    repo: Repository,
}

impl PhotosService {
    pub fn new(repo: Repository) -> Self {
        Self { repo }
    }

    /// Get a photo with its album and every comment, newest first
    pub async fn get_photo(&self, id: &str) -> Result<PhotoDetail> {
        let photo = self.repo.get_photo(id).await?;
        let album = self.repo.get_album(&photo.album_id).await?;
        // SQLite treats a negative LIMIT as unbounded
        let comments = self.repo.list_comments(&photo.id, -1, 0).await?;

        Ok(PhotoDetail {
            photo,
            album,
            comments: comments.into_iter().map(Into::into).collect(),
        })
    }

    /// Replace a photo's title. Sync never overwrites it afterwards.
    pub async fn update_photo(&self, id: &str, req: UpdatePhotoRequest) -> Result<Photo> {
        let title = req.title.as_deref().map(str::trim);

        tracing::debug!("Updating photo title: {}", id);

        self.repo.update_photo_title(id, title).await
    }

    /// Delete a photo record and its comments. The file stays on disk, so
    /// the next sync of its album will add it again.
    pub async fn delete_photo(&self, id: &str) -> Result<()> {
        tracing::info!("Deleting photo: {}", id);

        self.repo.delete_photo(id).await
    }

    /// One page of a photo's comments, newest first
    pub async fn list_comments(
        &self,
        photo_id: &str,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> Result<CommentPage> {
        let limit = limit
            .unwrap_or(DEFAULT_COMMENT_PAGE_SIZE)
            .clamp(1, MAX_COMMENT_PAGE_SIZE);
        let offset = offset.unwrap_or(0).max(0);

        let comments = self.repo.list_comments(photo_id, limit, offset).await?;
        let total = self.repo.count_comments(photo_id).await?;

        Ok(CommentPage {
            comments: comments.into_iter().map(Into::into).collect(),
            total,
            has_more: offset.saturating_add(limit) < total,
        })
    }

    /// Add a comment to a photo
    pub async fn add_comment(
        &self,
        photo_id: &str,
        req: CreateCommentRequest,
    ) -> Result<CommentView> {
        let content = req.content.trim();
        if content.is_empty() {
            return Err(AppError::Validation("Comment cannot be empty".to_string()));
        }
        if content.chars().count() > MAX_COMMENT_LENGTH {
            return Err(AppError::Validation(format!(
                "Comment cannot be longer than {} characters",
                MAX_COMMENT_LENGTH
            )));
        }

        let photo = self.repo.get_photo(photo_id).await?;
        let user = self
            .repo
            .get_user(&req.user_id)
            .await?
            .ok_or_else(|| AppError::Validation("Unknown user".to_string()))?;

        let comment = self.repo.create_comment(&photo.id, &user.id, content).await?;

        tracing::info!("Comment {} added to photo {}", comment.id, photo.id);

        Ok(CommentView {
            id: comment.id,
            content: comment.content,
            created_at: comment.created_at,
            user: CommentAuthor {
                id: user.id,
                name: user.name,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::{create_memory_pool, NewPhoto, User};
    use chrono::Utc;

    async fn create_test_service() -> (PhotosService, Repository, User, Photo) {
        let repo = Repository::new(create_memory_pool().await.unwrap());
        let user = repo
            .create_user("ann@example.com", "h", "Ann", false)
            .await
            .unwrap();
        let album = repo
            .create_album("Trip", None, "Trip", Utc::now(), &user.id)
            .await
            .unwrap();
        repo.apply_photo_changes(
            &album.id,
            &[],
            &[NewPhoto {
                filename: "a.jpg".into(),
                path: "/albums/Trip/a.jpg".into(),
                title: "a".into(),
            }],
        )
        .await
        .unwrap();
        let photo = repo.list_photos(&album.id).await.unwrap().remove(0);

        (PhotosService::new(repo.clone()), repo, user, photo)
    }

    fn comment(user: &User, content: &str) -> CreateCommentRequest {
        CreateCommentRequest {
            content: content.to_string(),
            user_id: user.id.clone(),
        }
    }

    #[tokio::test]
    async fn test_add_and_list_comments() {
        let (service, _repo, user, photo) = create_test_service().await;

        let created = service
            .add_comment(&photo.id, comment(&user, "  Lovely  "))
            .await
            .unwrap();
        assert_eq!(created.content, "Lovely");
        assert_eq!(created.user.name, "Ann");

        let page = service.list_comments(&photo.id, None, None).await.unwrap();
        assert_eq!(page.total, 1);
        assert!(!page.has_more);
        assert_eq!(page.comments[0].id, created.id);
    }

    #[tokio::test]
    async fn test_comment_paging_has_more() {
        let (service, _repo, user, photo) = create_test_service().await;
        for i in 0..3 {
            service
                .add_comment(&photo.id, comment(&user, &format!("#{}", i)))
                .await
                .unwrap();
        }

        let page = service
            .list_comments(&photo.id, Some(2), Some(0))
            .await
            .unwrap();
        assert_eq!(page.comments.len(), 2);
        assert!(page.has_more);

        let last = service
            .list_comments(&photo.id, Some(2), Some(2))
            .await
            .unwrap();
        assert_eq!(last.comments.len(), 1);
        assert!(!last.has_more);
    }

    #[tokio::test]
    async fn test_comment_paging_past_the_end() {
        let (service, _repo, user, photo) = create_test_service().await;
        service
            .add_comment(&photo.id, comment(&user, "Only one"))
            .await
            .unwrap();

        let page = service
            .list_comments(&photo.id, Some(10), Some(i64::MAX))
            .await
            .unwrap();
        assert!(page.comments.is_empty());
        assert_eq!(page.total, 1);
        assert!(!page.has_more);
    }

    #[tokio::test]
    async fn test_comment_validation() {
        let (service, _repo, user, photo) = create_test_service().await;

        let empty = service.add_comment(&photo.id, comment(&user, "   ")).await;
        assert!(matches!(empty, Err(AppError::Validation(_))));

        let unknown_photo = service.add_comment("nope", comment(&user, "Hi")).await;
        assert!(matches!(unknown_photo, Err(AppError::PhotoNotFound(_))));

        let unknown_user = service
            .add_comment(
                &photo.id,
                CreateCommentRequest {
                    content: "Hi".into(),
                    user_id: "ghost".into(),
                },
            )
            .await;
        assert!(matches!(unknown_user, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_photo_detail_and_title_update() {
        let (service, _repo, user, photo) = create_test_service().await;
        service
            .add_comment(&photo.id, comment(&user, "First"))
            .await
            .unwrap();

        let updated = service
            .update_photo(
                &photo.id,
                UpdatePhotoRequest {
                    title: Some("Beach".into()),
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.title.as_deref(), Some("Beach"));

        let detail = service.get_photo(&photo.id).await.unwrap();
        assert_eq!(detail.album.folder_name, "Trip");
        assert_eq!(detail.comments.len(), 1);
        assert_eq!(detail.comments[0].user.email, "ann@example.com");
    }

    #[tokio::test]
    async fn test_delete_photo_cascades_comments() {
        let (service, repo, user, photo) = create_test_service().await;
        service
            .add_comment(&photo.id, comment(&user, "Bye"))
            .await
            .unwrap();

        service.delete_photo(&photo.id).await.unwrap();

        assert!(matches!(
            service.get_photo(&photo.id).await,
            Err(AppError::PhotoNotFound(_))
        ));
        assert_eq!(repo.count_comments(&photo.id).await.unwrap(), 0);
    }
}
