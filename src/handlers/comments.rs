use axum::{Extension, Json, extract::State, response::IntoResponse};
use serde_json::json;
use sqlx::{PgPool, Row};
use validator::Validate;

use crate::{
    error::AppError,
    handlers::notifications::insert_notification,
    models::{
        comment::{
            AddCommentRequest, AddCommentResponse, Comment, CommentDetail, DeleteCommentRequest,
            GetRepliesRequest, PostCommentsRequest,
        },
        notification::NotificationKind,
    },
    utils::{html::clean_html, jwt::Claims},
};

/// Page size for both top-level comments and reply batches.
const COMMENT_PAGE: i64 = 5;

/// Submit a comment or a reply.
///
/// Everything the submission touches moves in one transaction: the comment
/// row, the post's activity counters, the parent's children list and the
/// fanned-out notification.
pub async fn add_comment(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<AddCommentRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;
    let user_id = claims.sub.parse::<i64>().unwrap_or(0);

    let content = clean_html(payload.comment.trim());
    if content.is_empty() {
        return Err(AppError::BadRequest(
            "You must write something to publish a comment".to_string(),
        ));
    }

    let mut tx = pool.begin().await?;

    let post = sqlx::query("SELECT id, user_id FROM posts WHERE id = $1")
        .bind(payload.post_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::InternalServerError("Post not found".to_string()))?;
    let post_author_id: i64 = post.try_get("user_id")?;

    let is_reply = payload.replying_to.is_some();

    let inserted = sqlx::query(
        r#"
        INSERT INTO comments (post_id, post_author_id, user_id, content, is_reply, parent_id)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING id, commented_at
        "#,
    )
    .bind(payload.post_id)
    .bind(post_author_id)
    .bind(user_id)
    .bind(&content)
    .bind(is_reply)
    .bind(payload.replying_to)
    .fetch_one(&mut *tx)
    .await?;
    let comment_id: i64 = inserted.try_get("id")?;
    let commented_at: chrono::DateTime<chrono::Utc> = inserted.try_get("commented_at")?;

    sqlx::query(
        r#"
        UPDATE posts
        SET total_comments = total_comments + 1,
            total_parent_comments = total_parent_comments + $2
        WHERE id = $1
        "#,
    )
    .bind(payload.post_id)
    .bind(if is_reply { 0i64 } else { 1i64 })
    .execute(&mut *tx)
    .await?;

    let (kind, recipient) = if let Some(parent_id) = payload.replying_to {
        let parent = sqlx::query(
            "UPDATE comments SET children = array_append(children, $2) WHERE id = $1 RETURNING user_id",
        )
        .bind(parent_id)
        .bind(comment_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::InternalServerError("Parent comment not found".to_string()))?;

        if let Some(notification_id) = payload.notification_id {
            sqlx::query("UPDATE notifications SET reply_id = $2 WHERE id = $1")
                .bind(notification_id)
                .bind(comment_id)
                .execute(&mut *tx)
                .await?;
        }

        // Replying to a reply notifies the parent comment's author, not the
        // post author.
        (
            NotificationKind::Reply {
                comment: comment_id,
                replied_on_comment: parent_id,
            },
            parent.try_get::<i64, _>("user_id")?,
        )
    } else {
        (
            NotificationKind::Comment {
                comment: comment_id,
            },
            post_author_id,
        )
    };

    insert_notification(&mut tx, kind, payload.post_id, recipient, user_id).await?;

    tx.commit().await?;

    Ok(Json(AddCommentResponse {
        id: comment_id,
        comment: content,
        commented_at,
        user_id,
        children: Vec::new(),
    }))
}

/// Page through a post's top-level comments, newest first.
pub async fn post_comments(
    State(pool): State<PgPool>,
    Json(payload): Json<PostCommentsRequest>,
) -> Result<impl IntoResponse, AppError> {
    let comments = sqlx::query_as::<_, CommentDetail>(
        r#"
        SELECT c.id, c.content, c.commented_at, c.user_id,
               u.username, u.fullname, u.profile_img,
               c.parent_id, c.children
        FROM comments c
        JOIN users u ON u.id = c.user_id
        WHERE c.post_id = $1 AND c.is_reply = FALSE
        ORDER BY c.commented_at DESC
        OFFSET $2 LIMIT $3
        "#,
    )
    .bind(payload.post_id)
    .bind(payload.skip.max(0))
    .bind(COMMENT_PAGE)
    .fetch_all(&pool)
    .await?;

    Ok(Json(comments))
}

/// Page through one comment's direct replies (never deeper descendants),
/// newest first.
pub async fn get_replies(
    State(pool): State<PgPool>,
    Json(payload): Json<GetRepliesRequest>,
) -> Result<impl IntoResponse, AppError> {
    let replies = sqlx::query_as::<_, CommentDetail>(
        r#"
        SELECT c.id, c.content, c.commented_at, c.user_id,
               u.username, u.fullname, u.profile_img,
               c.parent_id, c.children
        FROM comments c
        JOIN users u ON u.id = c.user_id
        WHERE c.parent_id = $1
        ORDER BY c.commented_at DESC
        OFFSET $2 LIMIT $3
        "#,
    )
    .bind(payload.comment_id)
    .bind(payload.skip.max(0))
    .bind(COMMENT_PAGE)
    .fetch_all(&pool)
    .await?;

    Ok(Json(json!({ "replies": replies })))
}

/// Delete a comment and its whole reply subtree.
///
/// Only the comment's author or the post's author may delete. The cascade
/// walks the subtree node by node inside a single transaction; each node
/// gets the full treatment (parent unlink, notification delete, reply
/// unset, counter decrement) so no orphaned records survive a commit.
pub async fn delete_comment(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<DeleteCommentRequest>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = claims.sub.parse::<i64>().unwrap_or(0);

    let comment = sqlx::query_as::<_, Comment>("SELECT * FROM comments WHERE id = $1")
        .bind(payload.comment_id)
        .fetch_optional(&pool)
        .await?
        .ok_or_else(|| AppError::NotFound("Comment not found".to_string()))?;

    if user_id != comment.user_id && user_id != comment.post_author_id {
        return Err(AppError::Forbidden(
            "You can't delete this comment".to_string(),
        ));
    }

    let mut tx = pool.begin().await?;

    let mut stack = vec![payload.comment_id];
    while let Some(id) = stack.pop() {
        let Some(row) =
            sqlx::query("DELETE FROM comments WHERE id = $1 RETURNING post_id, parent_id, children")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?
        else {
            continue;
        };

        let post_id: i64 = row.try_get("post_id")?;
        let parent_id: Option<i64> = row.try_get("parent_id")?;
        let children: Vec<i64> = row.try_get("children")?;

        if let Some(parent_id) = parent_id {
            sqlx::query("UPDATE comments SET children = array_remove(children, $2) WHERE id = $1")
                .bind(parent_id)
                .bind(id)
                .execute(&mut *tx)
                .await?;
        }

        sqlx::query("DELETE FROM notifications WHERE comment_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("UPDATE notifications SET reply_id = NULL WHERE reply_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        sqlx::query(
            r#"
            UPDATE posts
            SET total_comments = GREATEST(0, total_comments - 1),
                total_parent_comments = GREATEST(0, total_parent_comments - $2)
            WHERE id = $1
            "#,
        )
        .bind(post_id)
        .bind(if parent_id.is_some() { 0i64 } else { 1i64 })
        .execute(&mut *tx)
        .await?;

        stack.extend(children);
    }

    tx.commit().await.map_err(|e| {
        tracing::error!("Failed to commit comment cascade delete: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    Ok(Json(json!({ "success": true })))
}
