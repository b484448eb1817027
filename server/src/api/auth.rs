//! Login endpoint
//!
//! Returns the user's profile on success. Keeping the user signed in is up
//! to the client.

use crate::app::AppState;
use crate::database::UserProfile;
use crate::error::Result;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

pub async fn login(
    State(state): State<AppState>,
    payload: std::result::Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<UserProfile>> {
    let Json(req) = payload?;
    let profile = state.auth_service.login(&req.email, &req.password).await?;
    Ok(Json(profile))
}
