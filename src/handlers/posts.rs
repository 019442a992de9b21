use axum::{Extension, Json, extract::State, response::IntoResponse};
use serde_json::json;
use sqlx::PgPool;
use validator::Validate;

use crate::{
    error::AppError,
    models::{
        post::{
            CreatePostRequest, GetPostRequest, LatestPostsRequest, Post, PostListItem,
            SearchPostsCountRequest, SearchPostsRequest, TrendingPostItem, UserPostItem,
            UserPostsCountRequest, UserPostsRequest,
        },
        user::PublicProfile,
    },
    utils::{jwt::Claims, slug::slug_from_title},
};

const FEED_PAGE: i64 = 5;

const LIST_COLUMNS: &str = r#"
    p.slug, p.title, p.des, p.banner, p.tags, p.published_at,
    p.total_likes, p.total_reads, p.total_comments, p.total_parent_comments,
    u.username AS author_username, u.fullname AS author_fullname,
    u.profile_img AS author_profile_img
"#;

/// Home feed: published posts, newest first.
pub async fn latest_posts(
    State(pool): State<PgPool>,
    Json(payload): Json<LatestPostsRequest>,
) -> Result<impl IntoResponse, AppError> {
    let page = payload.page.max(1);

    let posts = sqlx::query_as::<_, PostListItem>(&format!(
        r#"
        SELECT {LIST_COLUMNS}
        FROM posts p
        JOIN users u ON u.id = p.user_id
        WHERE p.draft = FALSE
        ORDER BY p.published_at DESC
        OFFSET $1 LIMIT $2
        "#
    ))
    .bind((page - 1) * FEED_PAGE)
    .bind(FEED_PAGE)
    .fetch_all(&pool)
    .await?;

    Ok(Json(json!({ "blogs": posts })))
}

/// Total published posts, for the home feed's load-more predicate.
pub async fn latest_posts_count(
    State(pool): State<PgPool>,
) -> Result<impl IntoResponse, AppError> {
    let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM posts WHERE draft = FALSE")
        .fetch_one(&pool)
        .await?;

    Ok(Json(json!({ "totalDocs": count })))
}

/// Trending sidebar: most read, then most liked, then newest.
pub async fn trending_posts(State(pool): State<PgPool>) -> Result<impl IntoResponse, AppError> {
    let posts = sqlx::query_as::<_, TrendingPostItem>(
        r#"
        SELECT p.slug, p.title, p.published_at,
               u.username AS author_username, u.fullname AS author_fullname,
               u.profile_img AS author_profile_img
        FROM posts p
        JOIN users u ON u.id = p.user_id
        WHERE p.draft = FALSE
        ORDER BY p.total_reads DESC, p.total_likes DESC, p.published_at DESC
        LIMIT 5
        "#,
    )
    .fetch_all(&pool)
    .await?;

    Ok(Json(json!({ "blogs": posts })))
}

/// Search feed, filtered by tag, title text or author username. The same
/// query also powers the similar-posts strip, which excludes the post being
/// read via `eliminate_blog`.
pub async fn search_posts(
    State(pool): State<PgPool>,
    Json(payload): Json<SearchPostsRequest>,
) -> Result<impl IntoResponse, AppError> {
    let page = payload.page.unwrap_or(1).max(1);
    let limit = payload.limit.unwrap_or(FEED_PAGE).min(100);

    let posts = sqlx::query_as::<_, PostListItem>(&format!(
        r#"
        SELECT {LIST_COLUMNS}
        FROM posts p
        JOIN users u ON u.id = p.user_id
        WHERE p.draft = FALSE
          AND ($1::TEXT IS NULL OR $1 = ANY(p.tags))
          AND ($2::TEXT IS NULL OR p.title ILIKE '%' || $2 || '%')
          AND ($3::TEXT IS NULL OR u.username = $3)
          AND ($4::TEXT IS NULL OR p.slug <> $4)
        ORDER BY p.published_at DESC
        OFFSET $5 LIMIT $6
        "#
    ))
    .bind(&payload.tag)
    .bind(&payload.query)
    .bind(&payload.author)
    .bind(&payload.eliminate_blog)
    .bind((page - 1) * limit)
    .bind(limit)
    .fetch_all(&pool)
    .await?;

    Ok(Json(json!({ "blogs": posts })))
}

/// Count for the search feed, same filters sans page.
pub async fn search_posts_count(
    State(pool): State<PgPool>,
    Json(payload): Json<SearchPostsCountRequest>,
) -> Result<impl IntoResponse, AppError> {
    let count = sqlx::query_scalar::<_, i64>(
        r#"
        SELECT COUNT(*)
        FROM posts p
        JOIN users u ON u.id = p.user_id
        WHERE p.draft = FALSE
          AND ($1::TEXT IS NULL OR $1 = ANY(p.tags))
          AND ($2::TEXT IS NULL OR p.title ILIKE '%' || $2 || '%')
          AND ($3::TEXT IS NULL OR u.username = $3)
        "#,
    )
    .bind(&payload.tag)
    .bind(&payload.query)
    .bind(&payload.author)
    .fetch_one(&pool)
    .await?;

    Ok(Json(json!({ "totalDocs": count })))
}

/// The author's own posts or drafts, title-filtered, with the client's
/// deleted-document skip correction applied.
pub async fn user_written_posts(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<UserPostsRequest>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = claims.sub.parse::<i64>().unwrap_or(0);
    let skip = ((payload.page - 1) * FEED_PAGE - payload.deleted_doc_count).max(0);

    let posts = sqlx::query_as::<_, UserPostItem>(
        r#"
        SELECT slug, title, des, banner, draft, published_at,
               total_likes, total_reads, total_comments, total_parent_comments
        FROM posts
        WHERE user_id = $1 AND draft = $2 AND title ILIKE '%' || $3 || '%'
        ORDER BY published_at DESC
        OFFSET $4 LIMIT $5
        "#,
    )
    .bind(user_id)
    .bind(payload.draft)
    .bind(&payload.query)
    .bind(skip)
    .bind(FEED_PAGE)
    .fetch_all(&pool)
    .await?;

    Ok(Json(json!({ "blogs": posts })))
}

pub async fn user_written_posts_count(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<UserPostsCountRequest>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = claims.sub.parse::<i64>().unwrap_or(0);

    let count = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM posts WHERE user_id = $1 AND draft = $2 AND title ILIKE '%' || $3 || '%'",
    )
    .bind(user_id)
    .bind(payload.draft)
    .bind(&payload.query)
    .fetch_one(&pool)
    .await?;

    Ok(Json(json!({ "totalDocs": count })))
}

/// Fetch a single post for reading or editing.
///
/// A plain read bumps the read counter; the editor passes mode = "edit" to
/// leave it untouched.
pub async fn get_post(
    State(pool): State<PgPool>,
    Json(payload): Json<GetPostRequest>,
) -> Result<impl IntoResponse, AppError> {
    let increment: i64 = if payload.mode.as_deref() == Some("edit") {
        0
    } else {
        1
    };

    let post = sqlx::query_as::<_, Post>(
        "UPDATE posts SET total_reads = total_reads + $2 WHERE slug = $1 RETURNING *",
    )
    .bind(&payload.blog_id)
    .bind(increment)
    .fetch_optional(&pool)
    .await?
    .ok_or_else(|| AppError::NotFound("Blog not found".to_string()))?;

    if post.draft && !payload.draft {
        return Err(AppError::InternalServerError(
            "You can't access a draft blog".to_string(),
        ));
    }

    let author = sqlx::query_as::<_, PublicProfile>(
        "SELECT username, fullname, profile_img FROM users WHERE id = $1",
    )
    .bind(post.user_id)
    .fetch_one(&pool)
    .await?;

    let mut blog = serde_json::to_value(&post)
        .map_err(|e| AppError::InternalServerError(e.to_string()))?;
    blog["author"] = serde_json::to_value(&author)
        .map_err(|e| AppError::InternalServerError(e.to_string()))?;

    Ok(Json(json!({ "blog": blog })))
}

/// Create a post, or update one when `id` carries the slug being edited.
pub async fn create_post(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<CreatePostRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;
    let user_id = claims.sub.parse::<i64>().unwrap_or(0);

    // Drafts may be bare; publishing demands the full envelope.
    if !payload.draft {
        if payload.des.is_empty() || payload.des.len() > 200 {
            return Err(AppError::BadRequest(
                "You must provide a description under 200 characters".to_string(),
            ));
        }
        if payload.banner.is_empty() {
            return Err(AppError::BadRequest(
                "You must provide a blog banner".to_string(),
            ));
        }
        if payload.content.as_array().is_none_or(|b| b.is_empty()) {
            return Err(AppError::BadRequest(
                "You must provide some blog content".to_string(),
            ));
        }
        if payload.tags.is_empty() || payload.tags.len() > 10 {
            return Err(AppError::BadRequest(
                "You must provide some tags. Max 10".to_string(),
            ));
        }
    }

    let tags: Vec<String> = payload.tags.iter().map(|t| t.to_lowercase()).collect();

    if let Some(slug) = payload.id {
        let updated = sqlx::query(
            r#"
            UPDATE posts
            SET title = $2, des = $3, banner = $4, content = $5, tags = $6, draft = $7
            WHERE slug = $1 AND user_id = $8
            "#,
        )
        .bind(&slug)
        .bind(&payload.title)
        .bind(&payload.des)
        .bind(&payload.banner)
        .bind(&payload.content)
        .bind(&tags)
        .bind(payload.draft)
        .bind(user_id)
        .execute(&pool)
        .await?;

        if updated.rows_affected() == 0 {
            return Err(AppError::NotFound("Blog not found".to_string()));
        }

        Ok(Json(json!({ "id": slug })))
    } else {
        let slug = slug_from_title(&payload.title);

        sqlx::query(
            r#"
            INSERT INTO posts (slug, user_id, title, des, banner, content, tags, draft)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(&slug)
        .bind(user_id)
        .bind(&payload.title)
        .bind(&payload.des)
        .bind(&payload.banner)
        .bind(&payload.content)
        .bind(&tags)
        .bind(payload.draft)
        .execute(&pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to create post: {:?}", e);
            AppError::InternalServerError(e.to_string())
        })?;

        Ok(Json(json!({ "id": slug })))
    }
}
