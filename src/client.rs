use std::sync::Arc;

use reqwest::Method;
use serde_json::Value;

use crate::config::ClientConfig;
use crate::decode::{self, Decoded};
use crate::error::{ApiError, Operation};
use crate::model::{CommentDraft, DiscussionDraft, VoteChoice, VoteResult};
use crate::normalize;
use crate::progress::Progress;
use crate::transport::{RawResponse, Transport};
use crate::wire::{CreateCommentPayload, CreateDiscussionPayload};

/// One method per backend capability. Results are raw JSON except for
/// `vote`, whose fallback policy needs the normalizer.
#[derive(Clone)]
pub struct AgoraClient {
    transport: Transport,
}

impl AgoraClient {
    pub fn new(config: &ClientConfig, progress: Option<Arc<Progress>>) -> Result<Self, ApiError> {
        Ok(Self {
            transport: Transport::new(config, progress)?,
        })
    }

    pub async fn list_discussions(&self) -> Result<Value, ApiError> {
        let op = Operation::ListDiscussions;
        let resp = self.transport.send_empty(Method::GET, "/api/discussions/list").await?;
        let resp = ensure_success(op, resp)?;
        Ok(decode::decode_or(op, &resp.body, Value::Array(Vec::new())))
    }

    pub async fn get_discussion(&self, id: &str) -> Result<Value, ApiError> {
        let op = Operation::GetDiscussion;
        let path = format!("/api/discussions/{}", segment(id));
        let resp = self.transport.send_empty(Method::GET, &path).await?;
        let resp = ensure_success(op, resp)?;
        decode::decode_strict(op, &resp.body)
    }

    pub async fn create_discussion(&self, draft: &DiscussionDraft) -> Result<Value, ApiError> {
        let op = Operation::CreateDiscussion;
        let payload = CreateDiscussionPayload::from(draft);
        let resp = self
            .transport
            .send(Method::POST, "/api/discussions", Some(&payload))
            .await?;
        let resp = ensure_success(op, resp)?;
        decode::decode_strict(op, &resp.body)
    }

    /// Casts a vote. A success body without usable tallies is recovered by
    /// re-reading the discussion; if that fails too the vote still counts as
    /// accepted, with zeroed tallies marked as unknown.
    pub async fn vote(&self, id: &str, choice: VoteChoice) -> Result<VoteResult, ApiError> {
        let op = Operation::Vote;
        let path = format!(
            "/api/discussions/{}/vote?agree={}",
            segment(id),
            choice.is_agree()
        );
        let resp = self.transport.send_empty(Method::PATCH, &path).await?;
        let resp = ensure_success(op, resp)?;

        match decode::decode(op, &resp.body) {
            Decoded::Json(v) if normalize::has_vote_counts(&v) => {
                Ok(normalize::vote_result(&v, choice))
            }
            shape => {
                tracing::warn!(
                    discussion = id,
                    body = shape_label(&shape),
                    "vote response has no usable body; re-reading discussion"
                );
                Ok(self.recover_vote_result(id, choice).await)
            }
        }
    }

    async fn recover_vote_result(&self, id: &str, choice: VoteChoice) -> VoteResult {
        match self.get_discussion(id).await {
            Ok(raw) => VoteResult::reported(normalize::vote_counts(&raw), choice),
            Err(e) => {
                tracing::warn!(discussion = id, error = %e, "vote fallback fetch failed");
                let zeroed = normalize::vote_counts(&decode::vote_default());
                VoteResult::unconfirmed(zeroed, choice)
            }
        }
    }

    pub async fn create_comment(&self, id: &str, draft: &CommentDraft) -> Result<Value, ApiError> {
        let op = Operation::CreateComment;
        let path = format!("/api/discussions/{}/comments", segment(id));
        let payload = CreateCommentPayload::from(draft);
        let resp = self.transport.send(Method::PATCH, &path, Some(&payload)).await?;
        let resp = ensure_success(op, resp)?;
        Ok(decode::decode_or(op, &resp.body, decode::success_default()))
    }

    pub async fn toggle_comment_like(&self, comment_id: &str) -> Result<Value, ApiError> {
        let op = Operation::ToggleLike;
        let path = format!("/api/comments/{}/like", segment(comment_id));
        let resp = self.transport.send_empty(Method::POST, &path).await?;
        let resp = ensure_success(op, resp)?;
        Ok(decode::decode_or(op, &resp.body, decode::success_default()))
    }

    pub async fn increment_visitor(&self, id: &str) -> Result<Value, ApiError> {
        let op = Operation::IncrementVisitor;
        let path = format!("/api/discussions/{}/visit", segment(id));
        let resp = self.transport.send_empty(Method::POST, &path).await?;
        let resp = ensure_success(op, resp)?;
        Ok(decode::decode_or(op, &resp.body, decode::success_default()))
    }
}

fn ensure_success(op: Operation, resp: RawResponse) -> Result<RawResponse, ApiError> {
    if resp.is_success() {
        return Ok(resp);
    }
    tracing::warn!(operation = %op, status = %resp.status, "request rejected");
    Err(ApiError::from_status(op, resp.status))
}

fn shape_label(shape: &Decoded) -> &'static str {
    match shape {
        Decoded::Empty => "empty",
        Decoded::Malformed => "malformed",
        Decoded::Json(_) => "no tallies",
    }
}

// Ids are opaque; keep them from escaping their path segment.
fn segment(id: &str) -> String {
    url::form_urlencoded::byte_serialize(id.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn segment_escapes_separators() {
        assert_eq!(segment("42"), "42");
        assert_eq!(segment("a/b c"), "a%2Fb%20c");
    }
}
