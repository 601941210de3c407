use serde::{Deserialize, Serialize};

pub const DEFAULT_CATEGORY: &str = "일반";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoteChoice {
    Agree,
    Disagree,
}

impl VoteChoice {
    pub fn is_agree(self) -> bool {
        matches!(self, VoteChoice::Agree)
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "agree" => Some(VoteChoice::Agree),
            "disagree" => Some(VoteChoice::Disagree),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stance {
    Agree,
    Disagree,
    #[default]
    Neutral,
}

impl Stance {
    /// Backend enum spelling.
    pub fn wire(self) -> &'static str {
        match self {
            Stance::Agree => "AGREE",
            Stance::Disagree => "DISAGREE",
            Stance::Neutral => "NEUTRAL",
        }
    }

    pub fn from_wire(s: &str) -> Self {
        match s {
            "AGREE" => Stance::Agree,
            "DISAGREE" => Stance::Disagree,
            _ => Stance::Neutral,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct VoteCounts {
    pub agree: u64,
    pub disagree: u64,
}

impl VoteCounts {
    pub fn new(agree: u64, disagree: u64) -> Self {
        Self { agree, disagree }
    }

    pub fn total(&self) -> u64 {
        self.agree + self.disagree
    }

    pub fn agree_rate(&self) -> u64 {
        rate(self.agree, self.total())
    }

    pub fn disagree_rate(&self) -> u64 {
        rate(self.disagree, self.total())
    }

    /// Moves one vote: out of `previous` (clamped at zero) and into `next`.
    pub fn shift(&mut self, previous: Option<VoteChoice>, next: VoteChoice) {
        match previous {
            Some(VoteChoice::Agree) => self.agree = self.agree.saturating_sub(1),
            Some(VoteChoice::Disagree) => self.disagree = self.disagree.saturating_sub(1),
            None => {}
        }
        match next {
            VoteChoice::Agree => self.agree += 1,
            VoteChoice::Disagree => self.disagree += 1,
        }
    }
}

fn rate(part: u64, total: u64) -> u64 {
    if total == 0 {
        return 0;
    }
    ((part as f64 / total as f64) * 100.0).round() as u64
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteResult {
    pub vote_counts: VoteCounts,
    pub user_vote: Option<VoteChoice>,
    /// False when the backend accepted the vote but no tally could be read
    /// back. `vote_counts` is then a placeholder, not the server's tally.
    pub counts_known: bool,
}

impl VoteResult {
    pub fn reported(vote_counts: VoteCounts, user_vote: VoteChoice) -> Self {
        Self {
            vote_counts,
            user_vote: Some(user_vote),
            counts_known: true,
        }
    }

    pub fn unconfirmed(vote_counts: VoteCounts, user_vote: VoteChoice) -> Self {
        Self {
            vote_counts,
            user_vote: Some(user_vote),
            counts_known: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reference {
    pub title: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Discussion {
    pub id: String,
    pub title: String,
    pub description: String,
    pub author: String,
    pub created_at: String,
    pub category: String,
    pub comment_count: u64,
    pub vote_count: u64,
    pub visitors_count: u64,
    pub vote_counts: VoteCounts,
    pub user_vote: Option<VoteChoice>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: String,
    pub author: String,
    pub avatar: String,
    pub content: String,
    pub stance: Stance,
    pub likes: u64,
    pub created_at: String,
    pub references: Vec<Reference>,
    pub is_liked: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscussionDetail {
    #[serde(flatten)]
    pub discussion: Discussion,
    pub comments: Vec<Comment>,
}

#[derive(Debug, Clone, Default)]
pub struct DiscussionDraft {
    pub name: String,
    pub title: String,
    pub content: String,
    pub category: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct CommentDraft {
    pub nickname: String,
    pub content: String,
    pub stance: Stance,
    pub references: Vec<Reference>,
}

/// First character of a display name.
pub fn avatar_of(author: &str) -> String {
    author.chars().next().map(String::from).unwrap_or_default()
}

/// Pairs comma-separated reference titles and urls.
///
/// Lists of unequal length are padded: a missing title becomes
/// `참고자료 N` (1-based) and a missing url becomes `#`. If either input
/// is blank no references are produced.
pub fn parse_references(titles: &str, urls: &str) -> Vec<Reference> {
    if titles.trim().is_empty() || urls.trim().is_empty() {
        return Vec::new();
    }
    let split = |s: &str| -> Vec<String> {
        s.split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()
    };
    let titles = split(titles);
    let urls = split(urls);

    let len = titles.len().max(urls.len());
    (0..len)
        .map(|i| Reference {
            title: titles
                .get(i)
                .cloned()
                .unwrap_or_else(|| format!("참고자료 {}", i + 1)),
            url: urls.get(i).cloned().unwrap_or_else(|| "#".to_string()),
        })
        .collect()
}
