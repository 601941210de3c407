use crate::model::Discussion;

pub const ALL_CATEGORIES: &str = "전체";

/// Search box plus category tab over an already fetched list.
#[derive(Debug, Clone, Default)]
pub struct DiscussionFilter {
    pub search: String,
    pub category: Option<String>,
}

impl DiscussionFilter {
    pub fn new(search: impl Into<String>, category: Option<String>) -> Self {
        Self {
            search: search.into(),
            category,
        }
    }

    pub fn matches(&self, d: &Discussion) -> bool {
        let needle = self.search.trim().to_lowercase();
        let matches_search = needle.is_empty()
            || d.title.to_lowercase().contains(&needle)
            || d.description.to_lowercase().contains(&needle);

        let matches_category = match self.category.as_deref().map(str::trim) {
            None | Some("") | Some(ALL_CATEGORIES) => true,
            Some(c) => d.category == c,
        };

        matches_search && matches_category
    }

    pub fn apply<'a>(&self, list: &'a [Discussion]) -> Vec<&'a Discussion> {
        list.iter().filter(|d| self.matches(d)).collect()
    }
}
