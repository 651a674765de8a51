//! Decision Room posts: bulletins and Q&A threads.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::User;

/// Board a post belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostCategory {
    /// Bulletins published to all analysts.
    Notice,
    Qna,
}

impl PostCategory {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Notice => "notice",
            Self::Qna => "qna",
        }
    }
}

impl std::str::FromStr for PostCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "notice" | "bulletin" => Ok(Self::Notice),
            "qna" => Ok(Self::Qna),
            other => Err(format!("unknown post category '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostStatus {
    #[default]
    Open,
    Answered,
    Closed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    pub id: String,
    pub file_name: String,
    pub content_type: String,
    pub size_bytes: u64,
    pub uploaded_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Answer {
    /// Display name at the time of answering.
    pub author: String,
    #[serde(default)]
    pub author_id: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: String,
    pub category: PostCategory,
    pub title: String,
    pub body: String,
    /// Display name; searchable and filterable, never used for ownership.
    pub author: String,
    /// Id of the creating user. Posts stored without one belong to admins only.
    #[serde(default)]
    pub author_id: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub status: PostStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub answers: Vec<Answer>,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
}

/// Body of `POST /api/posts/{category}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPost {
    pub title: String,
    pub body: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Body of `PATCH /api/posts/{category}/{id}`; absent fields are left alone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<PostStatus>,
    /// Appends an answer and marks the post answered.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub answer: Option<String>,
}

impl Post {
    /// Whether `user` created this post.
    pub fn is_authored_by(&self, user: &User) -> bool {
        !self.author_id.is_empty() && self.author_id == user.id
    }

    /// Apply a patch, bumping `updated_at`.
    pub fn apply(&mut self, patch: PostPatch, editor: &User, now: DateTime<Utc>) {
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(body) = patch.body {
            self.body = body;
        }
        if let Some(tags) = patch.tags {
            self.tags = tags;
        }
        if let Some(body) = patch.answer {
            self.answers.push(Answer {
                author: editor.name.clone(),
                author_id: editor.id.clone(),
                body,
                created_at: now,
            });
            if self.status == PostStatus::Open {
                self.status = PostStatus::Answered;
            }
        }
        // An explicit status wins over the implicit one from answering.
        if let Some(status) = patch.status {
            self.status = status;
        }
        self.updated_at = now;
    }
}
