use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Represents the 'comments' table in the database.
///
/// `children` holds the ordered ids of direct replies; every id in it names
/// a comment whose `parent_id` is this comment. `is_reply` is true exactly
/// when `parent_id` is set.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Comment {
    pub id: i64,
    pub post_id: i64,
    /// Author of the owning post, denormalized for delete authorization.
    pub post_author_id: i64,
    /// The commenting user.
    pub user_id: i64,
    pub content: String,
    pub is_reply: bool,
    pub parent_id: Option<i64>,
    pub children: Vec<i64>,
    pub commented_at: chrono::DateTime<chrono::Utc>,
}

/// Author-populated comment as served to clients and held by the
/// client-side thread index.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct CommentDetail {
    pub id: i64,
    pub content: String,
    #[serde(rename = "commentedAt")]
    pub commented_at: chrono::DateTime<chrono::Utc>,
    pub user_id: i64,
    pub username: String,
    pub fullname: String,
    pub profile_img: String,
    pub parent_id: Option<i64>,
    pub children: Vec<i64>,
}

/// DTO for submitting a comment or a reply.
#[derive(Debug, Deserialize, Validate)]
pub struct AddCommentRequest {
    pub post_id: i64,

    #[validate(length(min = 1, message = "You must write something to publish a comment"))]
    pub comment: String,

    /// Id of the comment being replied to, absent for top-level comments.
    pub replying_to: Option<i64>,

    /// Set when the reply was composed from a notification card; the new
    /// comment id gets attached to that notification's `reply` field.
    pub notification_id: Option<i64>,
}

/// Response for a freshly created comment.
#[derive(Debug, Serialize)]
pub struct AddCommentResponse {
    pub id: i64,
    pub comment: String,
    #[serde(rename = "commentedAt")]
    pub commented_at: chrono::DateTime<chrono::Utc>,
    pub user_id: i64,
    pub children: Vec<i64>,
}

/// DTO for paging through a post's top-level comments.
#[derive(Debug, Deserialize)]
pub struct PostCommentsRequest {
    pub post_id: i64,
    #[serde(default)]
    pub skip: i64,
}

/// DTO for paging through one comment's direct replies.
#[derive(Debug, Deserialize)]
pub struct GetRepliesRequest {
    pub comment_id: i64,
    #[serde(default)]
    pub skip: i64,
}

/// DTO for deleting a comment (and its subtree).
#[derive(Debug, Deserialize)]
pub struct DeleteCommentRequest {
    pub comment_id: i64,
}
