//! Optimistic vote and like updates.
//!
//! A vote moves `Idle -> Voting` and applies the local tally change right
//! away. The remote result either overwrites the tally (server counts win,
//! when it carries any) or restores the snapshot taken on entry; both paths
//! return to `Idle`.
//! While `Voting`, further votes are ignored.

use std::future::Future;

use tokio::sync::Mutex;

use crate::error::ApiError;
use crate::model::{Comment, Discussion, VoteChoice, VoteCounts, VoteResult};

pub const VOTE_FAILED: &str = "투표에 실패했습니다.";
pub const LIKE_FAILED: &str = "좋아요 처리에 실패했습니다.";

pub trait VoteBackend {
    fn vote(
        &self,
        id: &str,
        choice: VoteChoice,
    ) -> impl Future<Output = Result<VoteResult, ApiError>> + Send;
}

pub trait LikeBackend {
    fn toggle_like(&self, comment_id: &str) -> impl Future<Output = Result<(), ApiError>> + Send;
}

#[derive(Debug)]
pub enum Outcome<T> {
    Committed(T),
    RolledBack { message: &'static str, error: ApiError },
    /// A request for the same target was already in flight.
    Ignored,
}

impl<T> Outcome<T> {
    pub fn error_message(&self) -> Option<&'static str> {
        match self {
            Outcome::RolledBack { message, .. } => Some(*message),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VotePhase {
    #[default]
    Idle,
    Voting,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VoteSnapshot {
    pub vote_counts: VoteCounts,
    pub user_vote: Option<VoteChoice>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct VoteState {
    pub vote_counts: VoteCounts,
    pub user_vote: Option<VoteChoice>,
    phase: VotePhase,
}

impl VoteState {
    pub fn new(vote_counts: VoteCounts, user_vote: Option<VoteChoice>) -> Self {
        Self {
            vote_counts,
            user_vote,
            phase: VotePhase::Idle,
        }
    }

    pub fn from_discussion(d: &Discussion) -> Self {
        Self::new(d.vote_counts, d.user_vote)
    }

    pub fn phase(&self) -> VotePhase {
        self.phase
    }

    pub fn snapshot(&self) -> VoteSnapshot {
        VoteSnapshot {
            vote_counts: self.vote_counts,
            user_vote: self.user_vote,
        }
    }

    /// Applies `choice` locally. Returns `None` while another vote is pending.
    pub fn begin(&mut self, choice: VoteChoice) -> Option<VoteSnapshot> {
        if self.phase == VotePhase::Voting {
            return None;
        }
        let snapshot = self.snapshot();
        self.vote_counts.shift(self.user_vote, choice);
        self.user_vote = Some(choice);
        self.phase = VotePhase::Voting;
        Some(snapshot)
    }

    /// Settles an accepted vote. Without a readable server tally the
    /// optimistic counts stay.
    pub fn reconcile(&mut self, result: &VoteResult) {
        if result.counts_known {
            self.vote_counts = result.vote_counts;
        }
        if result.user_vote.is_some() {
            self.user_vote = result.user_vote;
        }
        self.phase = VotePhase::Idle;
    }

    pub fn rollback(&mut self, snapshot: &VoteSnapshot) {
        self.vote_counts = snapshot.vote_counts;
        self.user_vote = snapshot.user_vote;
        self.phase = VotePhase::Idle;
    }

    pub fn write_to(&self, d: &mut Discussion) {
        d.vote_counts = self.vote_counts;
        d.user_vote = self.user_vote;
    }
}

/// Runs one optimistic vote. The lock is only held around state changes.
pub async fn cast_vote<B: VoteBackend>(
    state: &Mutex<VoteState>,
    backend: &B,
    id: &str,
    choice: VoteChoice,
) -> Outcome<VoteResult> {
    let Some(snapshot) = state.lock().await.begin(choice) else {
        tracing::debug!(discussion = id, "vote already in flight; ignoring");
        return Outcome::Ignored;
    };

    match backend.vote(id, choice).await {
        Ok(result) => {
            state.lock().await.reconcile(&result);
            Outcome::Committed(result)
        }
        Err(error) => {
            tracing::warn!(discussion = id, error = %error, "vote failed; rolling back");
            state.lock().await.rollback(&snapshot);
            Outcome::RolledBack {
                message: VOTE_FAILED,
                error,
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LikeSnapshot {
    pub likes: u64,
    pub is_liked: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LikeState {
    pub likes: u64,
    pub is_liked: bool,
    pending: bool,
}

impl LikeState {
    pub fn from_comment(c: &Comment) -> Self {
        Self {
            likes: c.likes,
            is_liked: c.is_liked,
            pending: false,
        }
    }

    pub fn begin(&mut self) -> Option<LikeSnapshot> {
        if self.pending {
            return None;
        }
        let snapshot = LikeSnapshot {
            likes: self.likes,
            is_liked: self.is_liked,
        };
        self.likes = if self.is_liked {
            self.likes.saturating_sub(1)
        } else {
            self.likes + 1
        };
        self.is_liked = !self.is_liked;
        self.pending = true;
        Some(snapshot)
    }

    pub fn settle(&mut self) {
        self.pending = false;
    }

    pub fn rollback(&mut self, snapshot: &LikeSnapshot) {
        self.likes = snapshot.likes;
        self.is_liked = snapshot.is_liked;
        self.pending = false;
    }

    pub fn write_to(&self, c: &mut Comment) {
        c.likes = self.likes;
        c.is_liked = self.is_liked;
    }
}

pub async fn toggle_like<B: LikeBackend>(
    state: &Mutex<LikeState>,
    backend: &B,
    comment_id: &str,
) -> Outcome<()> {
    let Some(snapshot) = state.lock().await.begin() else {
        return Outcome::Ignored;
    };

    match backend.toggle_like(comment_id).await {
        Ok(()) => {
            state.lock().await.settle();
            Outcome::Committed(())
        }
        Err(error) => {
            tracing::warn!(comment = comment_id, error = %error, "like failed; rolling back");
            state.lock().await.rollback(&snapshot);
            Outcome::RolledBack {
                message: LIKE_FAILED,
                error,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn begin_moves_previous_vote() {
        let mut s = VoteState::new(VoteCounts::new(3, 1), Some(VoteChoice::Agree));
        let snap = s.begin(VoteChoice::Disagree).unwrap();
        assert_eq!(s.vote_counts, VoteCounts::new(2, 2));
        assert_eq!(s.user_vote, Some(VoteChoice::Disagree));
        assert_eq!(s.phase(), VotePhase::Voting);
        assert_eq!(snap.vote_counts, VoteCounts::new(3, 1));
    }

    #[test]
    fn second_begin_is_noop() {
        let mut s = VoteState::default();
        assert!(s.begin(VoteChoice::Agree).is_some());
        let before = s.clone();
        assert!(s.begin(VoteChoice::Disagree).is_none());
        assert_eq!(s, before);
    }

    #[test]
    fn counts_stay_non_negative_for_any_sequence() {
        let seq = [
            VoteChoice::Disagree,
            VoteChoice::Agree,
            VoteChoice::Agree,
            VoteChoice::Disagree,
            VoteChoice::Disagree,
            VoteChoice::Agree,
        ];
        // Start from a user vote the tally does not reflect.
        let mut s = VoteState::new(VoteCounts::default(), Some(VoteChoice::Agree));
        for (i, c) in seq.iter().copied().enumerate() {
            let snap = s.begin(c).unwrap();
            if i % 2 == 0 {
                s.rollback(&snap);
            } else {
                let counts = s.vote_counts;
                s.reconcile(&VoteResult::reported(counts, c));
            }
            assert_eq!(s.phase(), VotePhase::Idle);
            assert!(s.vote_counts.total() <= seq.len() as u64);
        }
    }

    #[test]
    fn rollback_is_exact_and_idempotent() {
        let mut s = VoteState::new(VoteCounts::new(60, 40), None);
        let snap = s.begin(VoteChoice::Agree).unwrap();
        s.rollback(&snap);
        let once = s.clone();
        s.rollback(&snap);
        assert_eq!(s, once);
        assert_eq!(s.vote_counts, VoteCounts::new(60, 40));
        assert_eq!(s.user_vote, None);
    }

    #[test]
    fn reconcile_takes_server_counts() {
        let mut s = VoteState::new(VoteCounts::new(60, 40), None);
        s.begin(VoteChoice::Agree).unwrap();
        s.reconcile(&VoteResult::reported(VoteCounts::new(7, 3), VoteChoice::Agree));
        assert_eq!(s.vote_counts, VoteCounts::new(7, 3));
        assert_eq!(s.user_vote, Some(VoteChoice::Agree));
    }

    #[test]
    fn reconcile_without_server_counts_keeps_optimistic_tally() {
        let mut s = VoteState::new(VoteCounts::new(10, 4), None);
        s.begin(VoteChoice::Agree).unwrap();
        s.reconcile(&VoteResult::unconfirmed(VoteCounts::default(), VoteChoice::Agree));
        assert_eq!(s.vote_counts, VoteCounts::new(11, 4));
        assert_eq!(s.user_vote, Some(VoteChoice::Agree));
        assert_eq!(s.phase(), VotePhase::Idle);
    }

    #[test]
    fn unlike_saturates() {
        let mut s = LikeState {
            likes: 0,
            is_liked: true,
            pending: false,
        };
        s.begin().unwrap();
        assert_eq!(s.likes, 0);
        assert!(!s.is_liked);
        assert!(s.begin().is_none());
    }
}
