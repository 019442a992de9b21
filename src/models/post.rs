use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Represents the 'posts' table in the database.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Post {
    pub id: i64,

    /// Public identifier used in URLs, derived from the title.
    pub slug: String,

    pub user_id: i64,
    pub title: String,
    pub des: String,
    pub banner: String,

    /// Opaque ordered block list produced by the editor.
    pub content: serde_json::Value,

    pub tags: Vec<String>,
    pub draft: bool,
    pub published_at: chrono::DateTime<chrono::Utc>,

    // Activity counters, maintained by the comment and like paths.
    pub total_likes: i64,
    pub total_reads: i64,
    pub total_comments: i64,
    pub total_parent_comments: i64,
}

/// List item for the home / search feeds, author-populated.
#[derive(Debug, Serialize, FromRow)]
pub struct PostListItem {
    pub slug: String,
    pub title: String,
    pub des: String,
    pub banner: String,
    pub tags: Vec<String>,
    pub published_at: chrono::DateTime<chrono::Utc>,
    pub total_likes: i64,
    pub total_reads: i64,
    pub total_comments: i64,
    pub total_parent_comments: i64,
    pub author_username: String,
    pub author_fullname: String,
    pub author_profile_img: String,
}

/// Compact item for the trending sidebar.
#[derive(Debug, Serialize, FromRow)]
pub struct TrendingPostItem {
    pub slug: String,
    pub title: String,
    pub published_at: chrono::DateTime<chrono::Utc>,
    pub author_username: String,
    pub author_fullname: String,
    pub author_profile_img: String,
}

/// Item for the author's own manage-blogs lists (drafts included).
#[derive(Debug, Serialize, FromRow)]
pub struct UserPostItem {
    pub slug: String,
    pub title: String,
    pub des: String,
    pub banner: String,
    pub draft: bool,
    pub published_at: chrono::DateTime<chrono::Utc>,
    pub total_likes: i64,
    pub total_reads: i64,
    pub total_comments: i64,
    pub total_parent_comments: i64,
}

/// DTO for creating or updating a post.
#[derive(Debug, Deserialize, Validate)]
pub struct CreatePostRequest {
    #[validate(length(min = 1, message = "You must provide a title"))]
    pub title: String,

    #[serde(default)]
    pub des: String,

    #[serde(default)]
    pub banner: String,

    #[serde(default = "empty_blocks")]
    pub content: serde_json::Value,

    #[serde(default)]
    pub tags: Vec<String>,

    #[serde(default)]
    pub draft: bool,

    /// Present when editing: the slug of the post being updated.
    pub id: Option<String>,
}

fn empty_blocks() -> serde_json::Value {
    serde_json::json!([])
}

/// Page request for the latest-posts feed.
#[derive(Debug, Deserialize)]
pub struct LatestPostsRequest {
    pub page: i64,
}

/// Filtered page request shared by the tag / text / author search feeds.
#[derive(Debug, Deserialize)]
pub struct SearchPostsRequest {
    pub tag: Option<String>,
    pub query: Option<String>,
    pub author: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
    /// Slug to exclude, used by the similar-posts strip on the reading page.
    pub eliminate_blog: Option<String>,
}

/// Count request carrying the same filter fields sans page.
#[derive(Debug, Deserialize)]
pub struct SearchPostsCountRequest {
    pub tag: Option<String>,
    pub query: Option<String>,
    pub author: Option<String>,
}

/// Page request for the author's manage-blogs lists.
#[derive(Debug, Deserialize)]
pub struct UserPostsRequest {
    pub page: i64,
    #[serde(default)]
    pub draft: bool,
    #[serde(default)]
    pub query: String,
    #[serde(default, rename = "deletedDocCount")]
    pub deleted_doc_count: i64,
}

/// Count request for the manage-blogs lists.
#[derive(Debug, Deserialize)]
pub struct UserPostsCountRequest {
    #[serde(default)]
    pub draft: bool,
    #[serde(default)]
    pub query: String,
}

/// DTO for toggling a like. The client sends the liked state it currently
/// renders; the server moves to the opposite one.
#[derive(Debug, Deserialize)]
pub struct LikePostRequest {
    pub post_id: i64,
    #[serde(rename = "isLikedByUser")]
    pub is_liked_by_user: bool,
}

#[derive(Debug, Deserialize)]
pub struct IsLikedRequest {
    pub post_id: i64,
}

/// DTO for fetching a single post.
#[derive(Debug, Deserialize)]
pub struct GetPostRequest {
    pub blog_id: String,
    /// Set when the caller expects a draft (the editor).
    #[serde(default)]
    pub draft: bool,
    /// "edit" suppresses the read-count increment.
    pub mode: Option<String>,
}
