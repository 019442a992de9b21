use axum::{Extension, Json, extract::State, response::IntoResponse};
use serde_json::json;
use sqlx::PgPool;

use crate::{
    error::AppError,
    handlers::notifications::insert_notification,
    models::{
        notification::NotificationKind,
        post::{IsLikedRequest, LikePostRequest},
    },
    utils::jwt::Claims,
};

/// Like or unlike a post.
///
/// The like notification doubles as the like record, so there is at most
/// one per (user, post) pair; the existence check keeps a repeated like
/// from double-counting.
pub async fn like_post(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<LikePostRequest>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = claims.sub.parse::<i64>().unwrap_or(0);

    let mut tx = pool.begin().await?;

    if !payload.is_liked_by_user {
        let already = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM notifications WHERE user_id = $1 AND post_id = $2 AND type = 'like')",
        )
        .bind(user_id)
        .bind(payload.post_id)
        .fetch_one(&mut *tx)
        .await?;

        if already {
            return Ok(Json(json!({ "liked_by_user": true })));
        }

        let post_author = sqlx::query_scalar::<_, i64>(
            "UPDATE posts SET total_likes = total_likes + 1 WHERE id = $1 RETURNING user_id",
        )
        .bind(payload.post_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Post not found".to_string()))?;

        insert_notification(
            &mut tx,
            NotificationKind::Like,
            payload.post_id,
            post_author,
            user_id,
        )
        .await?;

        tx.commit().await?;
        Ok(Json(json!({ "liked_by_user": true })))
    } else {
        let removed = sqlx::query(
            "DELETE FROM notifications WHERE user_id = $1 AND post_id = $2 AND type = 'like'",
        )
        .bind(user_id)
        .bind(payload.post_id)
        .execute(&mut *tx)
        .await?;

        if removed.rows_affected() > 0 {
            sqlx::query("UPDATE posts SET total_likes = GREATEST(0, total_likes - 1) WHERE id = $1")
                .bind(payload.post_id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(Json(json!({ "liked_by_user": false })))
    }
}

/// Whether the current user has liked the given post.
pub async fn is_liked_by_user(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<IsLikedRequest>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = claims.sub.parse::<i64>().unwrap_or(0);

    let result = sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS(SELECT 1 FROM notifications WHERE user_id = $1 AND post_id = $2 AND type = 'like')",
    )
    .bind(user_id)
    .bind(payload.post_id)
    .fetch_one(&pool)
    .await?;

    Ok(Json(json!({ "result": result })))
}
