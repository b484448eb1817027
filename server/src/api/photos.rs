//! Photo and comment endpoints

use super::Success;
use crate::app::AppState;
use crate::database::{
    CommentPage, CommentView, CreateCommentRequest, Photo, PhotoDetail, UpdatePhotoRequest,
};
use crate::error::Result;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
pub struct CommentQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

pub async fn get_photo(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<PhotoDetail>> {
    Ok(Json(state.photos_service.get_photo(&id).await?))
}

pub async fn update_photo(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: std::result::Result<Json<UpdatePhotoRequest>, JsonRejection>,
) -> Result<Json<Photo>> {
    let Json(req) = payload?;
    Ok(Json(state.photos_service.update_photo(&id, req).await?))
}

pub async fn delete_photo(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Success>> {
    state.photos_service.delete_photo(&id).await?;
    Ok(Json(Success::ok()))
}

/// Page through a photo's comments
pub async fn list_comments(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<CommentQuery>,
) -> Result<Json<CommentPage>> {
    let page = state
        .photos_service
        .list_comments(&id, query.limit, query.offset)
        .await?;
    Ok(Json(page))
}

pub async fn create_comment(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: std::result::Result<Json<CreateCommentRequest>, JsonRejection>,
) -> Result<Json<CommentView>> {
    let Json(req) = payload?;
    Ok(Json(state.photos_service.add_comment(&id, req).await?))
}
