use axum::{Json, extract::State, response::IntoResponse};
use serde_json::json;
use sqlx::PgPool;

use crate::{
    error::AppError,
    models::user::{GetProfileRequest, PublicProfile, SearchUsersRequest, User},
};

/// Username search for the search page's people tab.
pub async fn search_users(
    State(pool): State<PgPool>,
    Json(payload): Json<SearchUsersRequest>,
) -> Result<impl IntoResponse, AppError> {
    let users = sqlx::query_as::<_, PublicProfile>(
        r#"
        SELECT username, fullname, profile_img
        FROM users
        WHERE username ILIKE '%' || $1 || '%'
        LIMIT 10
        "#,
    )
    .bind(&payload.query)
    .fetch_all(&pool)
    .await?;

    Ok(Json(json!({ "users": users })))
}

/// Public profile page payload.
pub async fn get_profile(
    State(pool): State<PgPool>,
    Json(payload): Json<GetProfileRequest>,
) -> Result<impl IntoResponse, AppError> {
    let user = sqlx::query_as::<_, User>(
        "SELECT id, username, fullname, profile_img, bio, created_at FROM users WHERE username = $1",
    )
    .bind(&payload.username)
    .fetch_optional(&pool)
    .await?
    .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    Ok(Json(user))
}
