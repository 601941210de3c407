use serde_json::Value;

use crate::client::AgoraClient;
use crate::error::ApiError;
use crate::model::{
    Comment, CommentDraft, Discussion, DiscussionDetail, DiscussionDraft, VoteChoice, VoteResult,
    avatar_of,
};
use crate::normalize::{self, ANONYMOUS};
use crate::reconcile::{LikeBackend, VoteBackend};

/// Domain client calls composed with the normalizer into the shapes the
/// presentation layer renders.
#[derive(Clone)]
pub struct AgoraService {
    client: AgoraClient,
}

impl AgoraService {
    pub fn new(client: AgoraClient) -> Self {
        Self { client }
    }

    pub async fn discussions(&self) -> Result<Vec<Discussion>, ApiError> {
        let raw = self.client.list_discussions().await?;
        Ok(normalize::discussion_list(&raw))
    }

    pub async fn discussion(&self, id: &str) -> Result<DiscussionDetail, ApiError> {
        let raw = self.client.get_discussion(id).await?;
        Ok(normalize::discussion_detail(&raw))
    }

    pub async fn comments(&self, id: &str) -> Result<Vec<Comment>, ApiError> {
        let raw = self.client.get_discussion(id).await?;
        Ok(normalize::comments(raw.get("comments").unwrap_or(&Value::Null)))
    }

    /// Counts the visit, then loads the discussion. The visitor bump is best
    /// effort.
    pub async fn open_discussion(&self, id: &str) -> Result<DiscussionDetail, ApiError> {
        if let Err(e) = self.client.increment_visitor(id).await {
            tracing::warn!(discussion = id, error = %e, "visitor increment failed");
        }
        self.discussion(id).await
    }

    pub async fn create_discussion(&self, draft: &DiscussionDraft) -> Result<Discussion, ApiError> {
        let raw = self.client.create_discussion(draft).await?;
        Ok(normalize::discussion(&raw))
    }

    pub async fn vote(&self, id: &str, choice: VoteChoice) -> Result<VoteResult, ApiError> {
        self.client.vote(id, choice).await
    }

    /// Posts a comment. When the backend echoes the stored comment it is
    /// normalized; otherwise the comment is assembled from the draft.
    pub async fn submit_comment(&self, id: &str, draft: &CommentDraft) -> Result<Comment, ApiError> {
        let raw = self.client.create_comment(id, draft).await?;
        if raw.get("id").is_some_and(|v| !v.is_null()) {
            return Ok(normalize::comment(&raw));
        }
        Ok(local_comment(draft, chrono::Local::now()))
    }

    pub async fn toggle_like(&self, comment_id: &str) -> Result<Value, ApiError> {
        self.client.toggle_comment_like(comment_id).await
    }

    pub async fn visit(&self, id: &str) -> Result<Value, ApiError> {
        self.client.increment_visitor(id).await
    }
}

/// Comment view model for a draft the backend accepted without echoing it.
pub fn local_comment(draft: &CommentDraft, now: chrono::DateTime<chrono::Local>) -> Comment {
    let author = match draft.nickname.trim() {
        "" => ANONYMOUS.to_string(),
        name => name.to_string(),
    };
    Comment {
        id: format!("local-{}", now.timestamp_millis()),
        avatar: avatar_of(&author).to_uppercase(),
        author,
        content: draft.content.clone(),
        stance: draft.stance,
        likes: 0,
        created_at: normalize::format_korean_date(now.date_naive()),
        references: draft.references.clone(),
        is_liked: false,
    }
}

impl VoteBackend for AgoraService {
    async fn vote(&self, id: &str, choice: VoteChoice) -> Result<VoteResult, ApiError> {
        self.client.vote(id, choice).await
    }
}

impl LikeBackend for AgoraService {
    async fn toggle_like(&self, comment_id: &str) -> Result<(), ApiError> {
        self.client.toggle_comment_like(comment_id).await.map(|_| ())
    }
}
