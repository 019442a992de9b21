use serde::{Deserialize, Serialize};

use crate::models::user::PublicProfile;

/// What a notification is about.
///
/// One variant per action instead of a single record with optional fields:
/// a like never references a comment, a reply always knows which comment it
/// landed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Like,
    Comment {
        comment: i64,
    },
    Reply {
        comment: i64,
        replied_on_comment: i64,
    },
}

impl NotificationKind {
    pub fn type_str(&self) -> &'static str {
        match self {
            NotificationKind::Like => "like",
            NotificationKind::Comment { .. } => "comment",
            NotificationKind::Reply { .. } => "reply",
        }
    }

    pub fn comment_id(&self) -> Option<i64> {
        match self {
            NotificationKind::Like => None,
            NotificationKind::Comment { comment } => Some(*comment),
            NotificationKind::Reply { comment, .. } => Some(*comment),
        }
    }

    pub fn replied_on_comment_id(&self) -> Option<i64> {
        match self {
            NotificationKind::Reply {
                replied_on_comment, ..
            } => Some(*replied_on_comment),
            _ => None,
        }
    }

    /// Rebuilds the kind from its stored columns. Returns `None` when the
    /// row violates the variant invariants (a like with a comment ref, a
    /// reply without one, an unknown type tag).
    pub fn from_parts(
        type_str: &str,
        comment_id: Option<i64>,
        replied_on_comment_id: Option<i64>,
    ) -> Option<Self> {
        match (type_str, comment_id, replied_on_comment_id) {
            ("like", None, None) => Some(NotificationKind::Like),
            ("comment", Some(comment), None) => Some(NotificationKind::Comment { comment }),
            ("reply", Some(comment), Some(replied_on_comment)) => Some(NotificationKind::Reply {
                comment,
                replied_on_comment,
            }),
            _ => None,
        }
    }
}

/// Post reference rendered on a notification card.
#[derive(Debug, Serialize)]
pub struct PostRef {
    pub blog_id: String,
    pub title: String,
}

/// Comment text snippet rendered on a notification card.
#[derive(Debug, Clone, Serialize)]
pub struct CommentSnippet {
    pub id: i64,
    pub comment: String,
}

/// Populated per-variant payload of a listed notification.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum NotificationDetail {
    Like,
    Comment {
        comment: CommentSnippet,
    },
    Reply {
        comment: CommentSnippet,
        replied_on_comment: CommentSnippet,
        #[serde(skip_serializing_if = "Option::is_none")]
        reply: Option<CommentSnippet>,
    },
}

/// One row of the notifications page, fully populated for rendering.
#[derive(Debug, Serialize)]
pub struct NotificationItem {
    pub id: i64,
    pub seen: bool,
    #[serde(rename = "createdAt")]
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub blog: PostRef,
    pub user: PublicProfile,
    #[serde(flatten)]
    pub detail: NotificationDetail,
}

/// Page request for the notifications list.
#[derive(Debug, Deserialize)]
pub struct NotificationsRequest {
    pub page: i64,
    #[serde(default = "all_filter")]
    pub filter: String,
    #[serde(default, rename = "deletedDocCount")]
    pub deleted_doc_count: i64,
}

/// Count request carrying the same filter sans page.
#[derive(Debug, Deserialize)]
pub struct NotificationsCountRequest {
    #[serde(default = "all_filter")]
    pub filter: String,
}

fn all_filter() -> String {
    "all".to_string()
}
