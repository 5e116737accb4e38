use axum::{http::StatusCode, response::Json};
use serde_json::{Value, json};

use crate::session::AuthUser;

/// Basic information about the signed-in user, for client-side scripts
pub(super) async fn user_info(
    auth_user: Option<AuthUser>,
) -> Result<Json<Value>, (StatusCode, String)> {
    match auth_user {
        Some(user) => Ok(Json(json!({
            "id": user.id,
            "username": user.username,
            "is_admin": user.is_admin,
            "created_at": user.created_at,
        }))),
        None => Err((StatusCode::UNAUTHORIZED, "Not logged in".to_string())),
    }
}
