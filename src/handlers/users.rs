// User CRUD handlers

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use super::api::json_body;
use super::error::Result;
use crate::server::AppState;
use crate::users::User;

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

pub async fn list_users(State(state): State<AppState>) -> Result<Json<Vec<User>>> {
    Ok(Json(state.users.list().await?))
}

pub async fn create_user(
    State(state): State<AppState>,
    payload: std::result::Result<Json<CreateUserRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<User>)> {
    let request = json_body(payload)?;
    let user = state
        .users
        .create(
            request.username.as_deref().unwrap_or(""),
            request.email.as_deref().unwrap_or(""),
        )
        .await?;
    Ok((StatusCode::CREATED, Json(user)))
}
