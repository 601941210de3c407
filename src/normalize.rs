//! Raw backend JSON → view models.
//!
//! Every function here is total: missing, null or oddly typed fields fall
//! back to a fixed default instead of failing. Field-name variance lives in
//! the candidate lists below and nowhere else.

use chrono::{DateTime, Datelike as _, NaiveDate, NaiveDateTime};
use serde_json::Value;

use crate::model::{
    Comment, DEFAULT_CATEGORY, Discussion, DiscussionDetail, Reference, Stance, VoteChoice,
    VoteCounts, VoteResult, avatar_of,
};

const AGREE: &[&str] = &["agree_count", "agreeCount"];
const DISAGREE: &[&str] = &["disagree_count", "disagreeCount"];
const COMMENT_COUNT: &[&str] = &["comment_count", "commentCount"];
const VOTE_COUNT: &[&str] = &["vote_count", "voteCount"];
const VISITORS: &[&str] = &["read_count", "visitors_count", "visitorsCount", "visit_count"];
const CREATED_AT: &[&str] = &["created_at", "createdAt"];
const LIKES: &[&str] = &["like_count", "likeCount", "likes"];
const USER_VOTE: &[&str] = &["userVote", "user_vote"];
const REF_TITLE: &[&str] = &["reference_title", "title"];
const REF_URL: &[&str] = &["reference_url", "url"];

pub const UNKNOWN_DATE: &str = "날짜 미상";
pub const ANONYMOUS: &str = "익명";

pub fn discussion(raw: &Value) -> Discussion {
    Discussion {
        id: id(raw),
        title: text(raw, &["title"]).unwrap_or_else(|| "제목 없음".to_string()),
        description: text(raw, &["content", "description"])
            .unwrap_or_else(|| "내용 없음".to_string()),
        author: text(raw, &["writer", "author", "name"])
            .unwrap_or_else(|| "작성자 미상".to_string()),
        created_at: localized_date(first(raw, CREATED_AT)),
        category: text(raw, &["category"]).unwrap_or_else(|| DEFAULT_CATEGORY.to_string()),
        comment_count: count(raw, COMMENT_COUNT),
        vote_count: count(raw, VOTE_COUNT),
        visitors_count: count(raw, VISITORS),
        vote_counts: vote_counts(raw),
        user_vote: None,
    }
}

/// Accepts a bare array or a `{ "posts": [...] }` envelope.
pub fn discussion_list(raw: &Value) -> Vec<Discussion> {
    let items = match raw {
        Value::Array(items) => items,
        Value::Object(map) => match map.get("posts") {
            Some(Value::Array(items)) => items,
            _ => return Vec::new(),
        },
        _ => return Vec::new(),
    };
    items.iter().map(discussion).collect()
}

pub fn discussion_detail(raw: &Value) -> DiscussionDetail {
    DiscussionDetail {
        discussion: discussion(raw),
        comments: comments(raw.get("comments").unwrap_or(&Value::Null)),
    }
}

pub fn comments(raw: &Value) -> Vec<Comment> {
    match raw {
        Value::Array(items) => items.iter().map(comment).collect(),
        _ => Vec::new(),
    }
}

pub fn comment(raw: &Value) -> Comment {
    let author = text(raw, &["name", "author"]).unwrap_or_else(|| ANONYMOUS.to_string());
    Comment {
        id: id(raw),
        avatar: avatar_of(&author),
        author,
        content: text(raw, &["content"]).unwrap_or_default(),
        stance: raw
            .get("agree")
            .and_then(Value::as_str)
            .map(Stance::from_wire)
            .unwrap_or_default(),
        likes: count(raw, LIKES),
        created_at: localized_date(first(raw, CREATED_AT)),
        references: references(raw.get("references").unwrap_or(&Value::Null)),
        is_liked: false,
    }
}

pub fn references(raw: &Value) -> Vec<Reference> {
    let Value::Array(items) = raw else {
        return Vec::new();
    };
    items
        .iter()
        .filter(|r| r.is_object())
        .map(|r| Reference {
            title: text(r, REF_TITLE).unwrap_or_default(),
            url: text(r, REF_URL).unwrap_or_else(|| "#".to_string()),
        })
        .collect()
}

pub fn vote_counts(raw: &Value) -> VoteCounts {
    VoteCounts::new(count(raw, AGREE), count(raw, DISAGREE))
}

/// True when the body names at least one tally field.
pub fn has_vote_counts(raw: &Value) -> bool {
    AGREE.iter().chain(DISAGREE).any(|k| raw.get(*k).is_some())
}

/// Server tallies plus the reconciled vote. A server `userVote` other than
/// `agree`/`disagree` is replaced by `cast`.
pub fn vote_result(raw: &Value, cast: VoteChoice) -> VoteResult {
    let user_vote = USER_VOTE
        .iter()
        .filter_map(|k| raw.get(*k).and_then(Value::as_str))
        .find_map(VoteChoice::parse)
        .unwrap_or(cast);
    VoteResult::reported(vote_counts(raw), user_vote)
}

/// Korean short date (`2024. 1. 15.`) from the timestamp shapes the backend
/// has been seen to send.
pub fn localized_date(raw: Option<&Value>) -> String {
    let date = match raw {
        Some(Value::String(s)) => parse_date(s),
        Some(Value::Array(parts)) => date_from_parts(parts),
        _ => None,
    };
    match date {
        Some(d) => format_korean_date(d),
        None => UNKNOWN_DATE.to_string(),
    }
}

pub fn format_korean_date(d: NaiveDate) -> String {
    format!("{}. {}. {}.", d.year(), d.month(), d.day())
}

fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive());
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.date());
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
}

// `[2024, 1, 15, 10, 30, 0]` style arrays.
fn date_from_parts(parts: &[Value]) -> Option<NaiveDate> {
    let y = i32::try_from(parts.first()?.as_i64()?).ok()?;
    let m = u32::try_from(parts.get(1)?.as_u64()?).ok()?;
    let d = u32::try_from(parts.get(2)?.as_u64()?).ok()?;
    NaiveDate::from_ymd_opt(y, m, d)
}

fn first<'a>(raw: &'a Value, names: &[&str]) -> Option<&'a Value> {
    names
        .iter()
        .filter_map(|k| raw.get(*k))
        .find(|v| !v.is_null())
}

fn id(raw: &Value) -> String {
    match raw.get("id") {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}

// First candidate holding a non-empty string.
fn text(raw: &Value, names: &[&str]) -> Option<String> {
    names
        .iter()
        .filter_map(|k| raw.get(*k).and_then(Value::as_str))
        .map(str::trim)
        .find(|s| !s.is_empty())
        .map(str::to_string)
}

// First candidate with a positive count; zero otherwise.
fn count(raw: &Value, names: &[&str]) -> u64 {
    names
        .iter()
        .filter_map(|k| raw.get(*k))
        .map(coerce_count)
        .find(|n| *n > 0)
        .unwrap_or(0)
}

/// Non-negative integer from a JSON number or numeric string; negatives
/// clamp to zero and fractions truncate.
pub fn coerce_count(v: &Value) -> u64 {
    let f = match v {
        Value::Number(n) => {
            if let Some(u) = n.as_u64() {
                return u;
            }
            n.as_f64().unwrap_or(0.0)
        }
        Value::String(s) => s.trim().parse::<f64>().unwrap_or(0.0),
        _ => 0.0,
    };
    if f.is_finite() && f > 0.0 {
        f.trunc() as u64
    } else {
        0
    }
}
