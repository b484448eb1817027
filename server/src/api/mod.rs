//! HTTP API
//!
//! Routes are organized into submodules:
//! - `albums`: album listing, management and folder sync
//! - `photos`: photo detail, title edits and comments
//! - `auth`: login
//!
//! JSON endpoints are mounted under `/api`; the albums root is served as
//! static files under `/albums` so stored photo paths resolve directly.

pub mod albums;
pub mod auth;
pub mod photos;

use crate::app::AppState;
use crate::config::ALBUMS_URL_PREFIX;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;

/// Build the application router
pub fn router(state: AppState) -> Router {
    let api = Router::new()
        .route(
            "/albums",
            get(albums::list_albums).post(albums::create_album),
        )
        .route("/albums/sync-all", post(albums::sync_all_albums))
        .route(
            "/albums/:id",
            get(albums::get_album)
                .put(albums::update_album)
                .delete(albums::delete_album),
        )
        .route("/albums/:id/sync", post(albums::sync_album))
        .route(
            "/photos/:id",
            get(photos::get_photo)
                .put(photos::update_photo)
                .delete(photos::delete_photo),
        )
        .route(
            "/photos/:id/comments",
            get(photos::list_comments).post(photos::create_comment),
        )
        .route("/auth/login", post(auth::login));

    let static_albums = ServeDir::new(&state.config.albums_dir);

    Router::new()
        .route("/health", get(|| async { "ok" }))
        .nest("/api", api)
        .nest_service(ALBUMS_URL_PREFIX, static_albums)
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// JSON body for endpoints that only acknowledge success
#[derive(Debug, serde::Serialize)]
pub struct Success {
    pub success: bool,
}

impl Success {
    pub fn ok() -> Self {
        Self { success: true }
    }
}
