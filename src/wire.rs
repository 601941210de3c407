use serde::Serialize;

use crate::model::{CommentDraft, DEFAULT_CATEGORY, DiscussionDraft};

#[derive(Debug, Serialize)]
pub struct CreateDiscussionPayload<'a> {
    pub name: &'a str,
    pub title: &'a str,
    pub content: &'a str,
    pub category: &'a str,
}

impl<'a> From<&'a DiscussionDraft> for CreateDiscussionPayload<'a> {
    fn from(d: &'a DiscussionDraft) -> Self {
        let category = d
            .category
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .unwrap_or(DEFAULT_CATEGORY);
        Self {
            name: &d.name,
            title: &d.title,
            content: &d.content,
            category,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ReferencePayload<'a> {
    pub reference_title: &'a str,
    pub reference_url: &'a str,
}

#[derive(Debug, Serialize)]
pub struct CreateCommentPayload<'a> {
    pub name: &'a str,
    pub content: &'a str,
    pub agree: &'static str,
    pub references: Vec<ReferencePayload<'a>>,
}

impl<'a> From<&'a CommentDraft> for CreateCommentPayload<'a> {
    fn from(d: &'a CommentDraft) -> Self {
        Self {
            name: &d.nickname,
            content: &d.content,
            agree: d.stance.wire(),
            references: d
                .references
                .iter()
                .map(|r| ReferencePayload {
                    reference_title: &r.title,
                    reference_url: &r.url,
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::model::{Reference, Stance};

    #[test]
    fn discussion_category_defaults() {
        let draft = DiscussionDraft {
            name: "kim".into(),
            title: "t".into(),
            content: "c".into(),
            category: Some("  ".into()),
        };
        let v = serde_json::to_value(CreateDiscussionPayload::from(&draft)).unwrap();
        assert_eq!(
            v,
            json!({ "name": "kim", "title": "t", "content": "c", "category": "일반" })
        );
    }

    #[test]
    fn comment_payload_renames_fields() {
        let draft = CommentDraft {
            nickname: "lee".into(),
            content: "hi".into(),
            stance: Stance::Disagree,
            references: vec![Reference {
                title: "A".into(),
                url: "u".into(),
            }],
        };
        let v = serde_json::to_value(CreateCommentPayload::from(&draft)).unwrap();
        assert_eq!(
            v,
            json!({
                "name": "lee",
                "content": "hi",
                "agree": "DISAGREE",
                "references": [{ "reference_title": "A", "reference_url": "u" }]
            })
        );
    }
}
