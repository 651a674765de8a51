//! List derivation for directory and board views.
//!
//! A [`ListQuery`] holds the currently selected search text, filters and
//! sort mode. [`apply`] derives the visible list from the full in-memory
//! collection: case-insensitive keyword match over each item's searchable
//! fields, filters ANDed together, then a total order.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{Company, Post, PostCategory, PostStatus, RiskLevel};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortMode {
    #[default]
    NameAsc,
    NameDesc,
    RecentFirst,
    /// Highest risk score first; items without a score sort last.
    RiskDesc,
}

/// Selected status filter. Posts match on post status, companies on tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StatusFilter {
    Post(PostStatus),
    Risk(RiskLevel),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    #[serde(default)]
    pub search_text: String,
    #[serde(default)]
    pub status_filter: Option<StatusFilter>,
    #[serde(default)]
    pub author_filter: Option<String>,
    #[serde(default)]
    pub category_filter: Option<PostCategory>,
    #[serde(default)]
    pub sort_mode: SortMode,
}

/// Something that can be searched, filtered and sorted in a list view.
pub trait Listable {
    /// Fields the keyword is matched against.
    fn search_fields(&self) -> Vec<&str>;
    /// Primary label used for name sorts and tie-breaks.
    fn sort_name(&self) -> &str;
    fn timestamp(&self) -> DateTime<Utc>;

    fn matches_status(&self, _filter: StatusFilter) -> bool {
        false
    }
    fn author(&self) -> Option<&str> {
        None
    }
    fn category(&self) -> Option<PostCategory> {
        None
    }
    fn risk_score(&self) -> Option<f64> {
        None
    }
}

impl Listable for Post {
    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![self.title.as_str(), self.body.as_str(), self.author.as_str()];
        fields.extend(self.tags.iter().map(String::as_str));
        fields
    }

    fn sort_name(&self) -> &str {
        &self.title
    }

    fn timestamp(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn matches_status(&self, filter: StatusFilter) -> bool {
        matches!(filter, StatusFilter::Post(s) if s == self.status)
    }

    fn author(&self) -> Option<&str> {
        Some(&self.author)
    }

    fn category(&self) -> Option<PostCategory> {
        Some(self.category)
    }
}

impl Listable for Company {
    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![
            self.name.as_str(),
            self.business_number.as_str(),
            self.industry.as_str(),
        ];
        fields.extend(self.tags.iter().map(String::as_str));
        fields
    }

    fn sort_name(&self) -> &str {
        &self.name
    }

    fn timestamp(&self) -> DateTime<Utc> {
        self.updated_at
    }

    fn matches_status(&self, filter: StatusFilter) -> bool {
        matches!(filter, StatusFilter::Risk(level) if level == self.risk_level)
    }

    fn risk_score(&self) -> Option<f64> {
        Some(self.risk_score)
    }
}

impl ListQuery {
    pub fn search(text: &str) -> Self {
        Self {
            search_text: text.to_string(),
            ..Self::default()
        }
    }

    /// Whether `item` passes every active filter.
    pub fn matches<T: Listable>(&self, item: &T) -> bool {
        let keyword = self.search_text.trim().to_lowercase();
        if !keyword.is_empty()
            && !item
                .search_fields()
                .iter()
                .any(|f| f.to_lowercase().contains(&keyword))
        {
            return false;
        }

        if let Some(status) = self.status_filter {
            if !item.matches_status(status) {
                return false;
            }
        }

        if let Some(author) = self.author_filter.as_deref().filter(|a| !a.is_empty()) {
            if !item.author().is_some_and(|a| a.eq_ignore_ascii_case(author)) {
                return false;
            }
        }

        if let Some(category) = self.category_filter {
            if item.category() != Some(category) {
                return false;
            }
        }

        true
    }

    /// Total order for the selected sort mode.
    pub fn compare<T: Listable>(&self, a: &T, b: &T) -> Ordering {
        let by_name = || {
            a.sort_name()
                .to_lowercase()
                .cmp(&b.sort_name().to_lowercase())
                .then_with(|| a.sort_name().cmp(b.sort_name()))
        };

        match self.sort_mode {
            SortMode::NameAsc => by_name(),
            SortMode::NameDesc => by_name().reverse(),
            SortMode::RecentFirst => b.timestamp().cmp(&a.timestamp()).then_with(by_name),
            SortMode::RiskDesc => {
                let sa = a.risk_score().unwrap_or(f64::NEG_INFINITY);
                let sb = b.risk_score().unwrap_or(f64::NEG_INFINITY);
                sb.total_cmp(&sa).then_with(by_name)
            }
        }
    }
}

/// Derive the visible list from the full collection.
pub fn apply<'a, T: Listable>(items: &'a [T], query: &ListQuery) -> Vec<&'a T> {
    let mut visible: Vec<&T> = items.iter().filter(|item| query.matches(*item)).collect();
    visible.sort_by(|a, b| query.compare(*a, *b));
    visible
}

/// Distinct authors in the collection, for the author filter dropdown.
pub fn authors<T: Listable>(items: &[T]) -> Vec<String> {
    let mut out: Vec<String> = items
        .iter()
        .filter_map(|i| i.author().map(str::to_string))
        .collect();
    out.sort_unstable();
    out.dedup();
    out
}
