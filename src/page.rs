use tokio::sync::Mutex;

use crate::filter::DiscussionFilter;
use crate::model::{CommentDraft, Discussion, DiscussionDetail, VoteChoice, VoteCounts, VoteResult};
use crate::normalize::format_korean_date;
use crate::reconcile::{self, LikeState, Outcome, VoteState};
use crate::service::AgoraService;

pub const COMMENT_FAILED: &str = "댓글 작성에 실패했습니다.";

/// Shown when the very first detail load fails.
pub fn placeholder_discussion(id: &str) -> DiscussionDetail {
    DiscussionDetail {
        discussion: Discussion {
            id: id.to_string(),
            title: "샘플 토론 주제".to_string(),
            description: "이것은 샘플 토론 주제입니다.".to_string(),
            author: "관리자".to_string(),
            created_at: format_korean_date(chrono::Local::now().date_naive()),
            category: "일반".to_string(),
            comment_count: 0,
            vote_count: 0,
            visitors_count: 0,
            vote_counts: VoteCounts::new(60, 40),
            user_vote: None,
        },
        comments: Vec::new(),
    }
}

// (id, title, description, author, created, category, comments, likes, visitors, agree, disagree)
type Sample = (
    u32,
    &'static str,
    &'static str,
    &'static str,
    &'static str,
    &'static str,
    u64,
    u64,
    u64,
    u64,
    u64,
);

const SAMPLES: &[Sample] = &[
    (
        1,
        "프랑스 혁명은 정당한 혁명이었는가?",
        "1789년 프랑스 혁명의 정당성과 그 결과에 대해 토론해봅시다.",
        "역사학도",
        "2024. 1. 15.",
        "근세사",
        18,
        24,
        12,
        15,
        9,
    ),
    (
        2,
        "조선의 쇄국정책, 옳은 선택이었을까?",
        "조선 후기 쇄국정책의 배경과 그 영향에 대한 다양한 관점을 나누어봅시다.",
        "한국사연구자",
        "2024. 1. 14.",
        "조선사",
        12,
        31,
        18,
        12,
        19,
    ),
    (
        3,
        "콜럼버스의 아메리카 발견, 발견인가 침략인가?",
        "1492년 콜럼버스의 아메리카 대륙 도달에 대한 역사적 평가를 논의해봅시다.",
        "세계사탐구",
        "2024. 1. 13.",
        "세계사",
        9,
        30,
        15,
        8,
        22,
    ),
];

/// Shown when the very first list load fails.
pub fn placeholder_discussions() -> Vec<Discussion> {
    SAMPLES
        .iter()
        .map(
            |&(id, title, description, author, created_at, category, comments, likes, visitors, agree, disagree)| {
                Discussion {
                    id: id.to_string(),
                    title: title.to_string(),
                    description: description.to_string(),
                    author: author.to_string(),
                    created_at: created_at.to_string(),
                    category: category.to_string(),
                    comment_count: comments,
                    vote_count: likes,
                    visitors_count: visitors,
                    vote_counts: VoteCounts::new(agree, disagree),
                    user_vote: None,
                }
            },
        )
        .collect()
}

/// State behind the discussion detail screen.
#[derive(Debug, Default)]
pub struct DiscussionPage {
    pub id: String,
    pub detail: Option<DiscussionDetail>,
    pub error: Option<String>,
    vote: Mutex<VoteState>,
    likes: Vec<Mutex<LikeState>>,
}

impl DiscussionPage {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    /// Loads (or retries) the discussion. On failure an already rendered
    /// discussion stays as it is; with nothing rendered the placeholder is
    /// shown. Either way the error message is kept for display.
    pub async fn load(&mut self, service: &AgoraService) {
        match service.open_discussion(&self.id).await {
            Ok(detail) => {
                self.install(detail);
                self.error = None;
            }
            Err(e) => {
                tracing::warn!(discussion = %self.id, error = %e, "discussion load failed");
                self.error = Some(e.to_string());
                if self.detail.is_none() {
                    let placeholder = placeholder_discussion(&self.id);
                    self.install(placeholder);
                }
            }
        }
    }

    fn install(&mut self, detail: DiscussionDetail) {
        self.vote = Mutex::new(VoteState::from_discussion(&detail.discussion));
        self.likes = detail
            .comments
            .iter()
            .map(|c| Mutex::new(LikeState::from_comment(c)))
            .collect();
        self.detail = Some(detail);
    }

    pub fn dismiss_error(&mut self) {
        self.error = None;
    }

    pub fn vote_counts(&self) -> Option<VoteCounts> {
        self.detail.as_ref().map(|d| d.discussion.vote_counts)
    }

    pub async fn vote(&mut self, service: &AgoraService, choice: VoteChoice) -> Outcome<VoteResult> {
        if self.detail.is_none() {
            return Outcome::Ignored;
        }
        let outcome = reconcile::cast_vote(&self.vote, service, &self.id, choice).await;
        if let Some(msg) = outcome.error_message() {
            self.error = Some(msg.to_string());
        }
        let state = self.vote.get_mut().clone();
        if let Some(detail) = self.detail.as_mut() {
            state.write_to(&mut detail.discussion);
        }
        outcome
    }

    pub async fn like(&mut self, service: &AgoraService, index: usize) -> Outcome<()> {
        let Some(comment_id) = self
            .detail
            .as_ref()
            .and_then(|d| d.comments.get(index))
            .map(|c| c.id.clone())
        else {
            return Outcome::Ignored;
        };
        let Some(state) = self.likes.get(index) else {
            return Outcome::Ignored;
        };
        let outcome = reconcile::toggle_like(state, service, &comment_id).await;
        if let Some(msg) = outcome.error_message() {
            self.error = Some(msg.to_string());
        }
        let state = self.likes[index].get_mut().clone();
        if let Some(comment) = self.detail.as_mut().and_then(|d| d.comments.get_mut(index)) {
            state.write_to(comment);
        }
        outcome
    }

    pub async fn comment(&mut self, service: &AgoraService, draft: &CommentDraft) -> bool {
        if draft.content.trim().is_empty() || self.detail.is_none() {
            return false;
        }
        match service.submit_comment(&self.id, draft).await {
            Ok(comment) => {
                self.likes.push(Mutex::new(LikeState::from_comment(&comment)));
                if let Some(detail) = self.detail.as_mut() {
                    detail.comments.push(comment);
                }
                true
            }
            Err(e) => {
                tracing::warn!(discussion = %self.id, error = %e, "comment failed");
                self.error = Some(COMMENT_FAILED.to_string());
                false
            }
        }
    }
}

/// State behind the discussion list screen.
#[derive(Debug, Default)]
pub struct DiscussionListPage {
    pub discussions: Option<Vec<Discussion>>,
    pub filter: DiscussionFilter,
    pub error: Option<String>,
}

impl DiscussionListPage {
    pub async fn load(&mut self, service: &AgoraService) {
        match service.discussions().await {
            Ok(list) => {
                self.discussions = Some(list);
                self.error = None;
            }
            Err(e) => {
                tracing::warn!(error = %e, "discussion list load failed");
                self.error = Some(e.to_string());
                if self.discussions.is_none() {
                    self.discussions = Some(placeholder_discussions());
                }
            }
        }
    }

    pub fn dismiss_error(&mut self) {
        self.error = None;
    }

    pub fn visible(&self) -> Vec<&Discussion> {
        match &self.discussions {
            Some(list) => self.filter.apply(list),
            None => Vec::new(),
        }
    }
}
