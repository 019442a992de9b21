use axum::{Extension, Json, extract::State, response::IntoResponse};
use serde_json::json;
use sqlx::{FromRow, PgPool, Postgres, Row, Transaction};

use crate::{
    error::AppError,
    models::{
        notification::{
            CommentSnippet, NotificationDetail, NotificationItem, NotificationKind,
            NotificationsCountRequest, NotificationsRequest, PostRef,
        },
        user::PublicProfile,
    },
    utils::jwt::Claims,
};

const NOTIFICATION_PAGE: i64 = 10;

/// Persists one notification as part of the caller's transaction.
pub(crate) async fn insert_notification(
    tx: &mut Transaction<'_, Postgres>,
    kind: NotificationKind,
    post_id: i64,
    notification_for: i64,
    actor: i64,
) -> Result<i64, AppError> {
    let row = sqlx::query(
        r#"
        INSERT INTO notifications (type, post_id, notification_for, user_id, comment_id, replied_on_comment_id)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING id
        "#,
    )
    .bind(kind.type_str())
    .bind(post_id)
    .bind(notification_for)
    .bind(actor)
    .bind(kind.comment_id())
    .bind(kind.replied_on_comment_id())
    .fetch_one(&mut **tx)
    .await?;

    Ok(row.try_get("id")?)
}

/// Whether anything unseen is waiting for the current user. Self-actions
/// never count.
pub async fn new_notification(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = claims.sub.parse::<i64>().unwrap_or(0);

    let available = sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS(SELECT 1 FROM notifications WHERE notification_for = $1 AND seen = FALSE AND user_id <> $1)",
    )
    .bind(user_id)
    .fetch_one(&pool)
    .await?;

    Ok(Json(json!({ "new_notification_available": available })))
}

/// Joined row shape of the notifications page.
#[derive(Debug, FromRow)]
struct NotificationListRow {
    id: i64,
    kind: String,
    seen: bool,
    created_at: chrono::DateTime<chrono::Utc>,
    blog_slug: String,
    blog_title: String,
    actor_username: String,
    actor_fullname: String,
    actor_profile_img: String,
    comment_id: Option<i64>,
    comment_content: Option<String>,
    replied_on_id: Option<i64>,
    replied_on_content: Option<String>,
    reply_comment_id: Option<i64>,
    reply_content: Option<String>,
}

fn notification_detail(row: &NotificationListRow) -> Option<NotificationDetail> {
    let kind = NotificationKind::from_parts(&row.kind, row.comment_id, row.replied_on_id)?;
    Some(match kind {
        NotificationKind::Like => NotificationDetail::Like,
        NotificationKind::Comment { comment } => NotificationDetail::Comment {
            comment: CommentSnippet {
                id: comment,
                comment: row.comment_content.clone().unwrap_or_default(),
            },
        },
        NotificationKind::Reply {
            comment,
            replied_on_comment,
        } => NotificationDetail::Reply {
            comment: CommentSnippet {
                id: comment,
                comment: row.comment_content.clone().unwrap_or_default(),
            },
            replied_on_comment: CommentSnippet {
                id: replied_on_comment,
                comment: row.replied_on_content.clone().unwrap_or_default(),
            },
            reply: row.reply_comment_id.map(|id| CommentSnippet {
                id,
                comment: row.reply_content.clone().unwrap_or_default(),
            }),
        },
    })
}

/// One page of the current user's notifications, fully populated for the
/// cards: post title, actor profile, comment snippets. The page is marked
/// seen once served.
pub async fn list_notifications(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<NotificationsRequest>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = claims.sub.parse::<i64>().unwrap_or(0);

    let kind_filter = match payload.filter.as_str() {
        "all" => None,
        other => Some(other.to_string()),
    };

    // Client-side deletions shift server ordinals; correct the skip the
    // same way every paginated list does.
    let skip = ((payload.page - 1) * NOTIFICATION_PAGE - payload.deleted_doc_count).max(0);

    let rows = sqlx::query_as::<_, NotificationListRow>(
        r#"
        SELECT n.id, n.type AS kind, n.seen, n.created_at,
               p.slug AS blog_slug, p.title AS blog_title,
               u.username AS actor_username, u.fullname AS actor_fullname,
               u.profile_img AS actor_profile_img,
               n.comment_id, c.content AS comment_content,
               n.replied_on_comment_id AS replied_on_id, rc.content AS replied_on_content,
               n.reply_id AS reply_comment_id, r.content AS reply_content
        FROM notifications n
        JOIN posts p ON p.id = n.post_id
        JOIN users u ON u.id = n.user_id
        LEFT JOIN comments c ON c.id = n.comment_id
        LEFT JOIN comments rc ON rc.id = n.replied_on_comment_id
        LEFT JOIN comments r ON r.id = n.reply_id
        WHERE n.notification_for = $1
          AND n.user_id <> $1
          AND ($2::TEXT IS NULL OR n.type = $2)
        ORDER BY n.created_at DESC
        OFFSET $3 LIMIT $4
        "#,
    )
    .bind(user_id)
    .bind(kind_filter)
    .bind(skip)
    .bind(NOTIFICATION_PAGE)
    .fetch_all(&pool)
    .await?;

    let ids: Vec<i64> = rows.iter().map(|r| r.id).collect();

    let notifications = rows
        .iter()
        .map(|row| {
            let detail = notification_detail(row).ok_or_else(|| {
                AppError::InternalServerError(format!(
                    "notification {} violates its variant invariants",
                    row.id
                ))
            })?;
            Ok(NotificationItem {
                id: row.id,
                seen: row.seen,
                created_at: row.created_at,
                blog: PostRef {
                    blog_id: row.blog_slug.clone(),
                    title: row.blog_title.clone(),
                },
                user: PublicProfile {
                    username: row.actor_username.clone(),
                    fullname: row.actor_fullname.clone(),
                    profile_img: row.actor_profile_img.clone(),
                },
                detail,
            })
        })
        .collect::<Result<Vec<_>, AppError>>()?;

    if !ids.is_empty() {
        sqlx::query("UPDATE notifications SET seen = TRUE WHERE id = ANY($1)")
            .bind(&ids)
            .execute(&pool)
            .await?;
    }

    Ok(Json(json!({ "notifications": notifications })))
}

/// Total for the current filter, for the client's load-more predicate.
pub async fn notifications_count(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<NotificationsCountRequest>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = claims.sub.parse::<i64>().unwrap_or(0);

    let kind_filter = match payload.filter.as_str() {
        "all" => None,
        other => Some(other.to_string()),
    };

    let count = sqlx::query_scalar::<_, i64>(
        r#"
        SELECT COUNT(*) FROM notifications
        WHERE notification_for = $1
          AND user_id <> $1
          AND ($2::TEXT IS NULL OR type = $2)
        "#,
    )
    .bind(user_id)
    .bind(kind_filter)
    .fetch_one(&pool)
    .await?;

    Ok(Json(json!({ "totalDocs": count })))
}
