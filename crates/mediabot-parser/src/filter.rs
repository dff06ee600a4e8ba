//! Eligibility gating by tags and categories.

use mediabot_common::CategoryId;

/// Which tags and categories are opted in to automatic lookups.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContentFilter {
    /// Tags that enable lookups. Compared case-insensitively.
    pub enabled_tags: Vec<String>,
    /// Category allow-list. Empty means every category is allowed.
    pub enabled_categories: Vec<CategoryId>,
}

impl ContentFilter {
    pub fn new(enabled_tags: Vec<String>, enabled_categories: Vec<CategoryId>) -> Self {
        Self {
            enabled_tags,
            enabled_categories,
        }
    }

    /// Whether any of `tags` is in the enabled set.
    pub fn matches_tags(&self, tags: &[String]) -> bool {
        tags.iter().any(|tag| {
            let tag = tag.trim();
            self.enabled_tags
                .iter()
                .any(|enabled| enabled.trim().eq_ignore_ascii_case(tag))
        })
    }

    /// Whether `category_id` passes the allow-list.
    pub fn allows_category(&self, category_id: Option<CategoryId>) -> bool {
        if self.enabled_categories.is_empty() {
            return true;
        }
        category_id.is_some_and(|id| self.enabled_categories.contains(&id))
    }
}

/// Split a comma-separated setting into trimmed, non-empty entries.
pub fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
