//! Metadata - citations, search results and token usage for one category

use serde::{Deserialize, Serialize};

/// A titled URL reference. The URL is the identity key.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Resource {
    /// Display title (falls back to the URL for bare-string citations)
    pub title: String,
    /// Resource location; two resources with the same URL are the same resource
    pub url: String,
    /// Publication date as reported by the service
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
}

impl Resource {
    /// Create a resource with a title and URL.
    #[must_use]
    pub fn new(title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
            date: None,
        }
    }

    /// Set the publication date.
    #[must_use]
    pub fn with_date(mut self, date: impl Into<String>) -> Self {
        self.date = Some(date.into());
        self
    }
}

/// A citation backing a category's rationale.
pub type Citation = Resource;

/// A search result consulted while ranking a category.
pub type SearchResult = Resource;

/// Token usage counters reported by the ranking model.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Usage {
    /// Prompt tokens
    #[serde(default)]
    pub prompt_tokens: u64,
    /// Completion tokens
    #[serde(default)]
    pub completion_tokens: u64,
    /// Total tokens
    #[serde(default)]
    pub total_tokens: u64,
    /// Search context size requested from the service
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_context_size: Option<String>,
}

/// Citation, search-result and usage metadata for one category.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Metadata {
    /// Citations, in the order they were found
    #[serde(default)]
    pub citations: Vec<Citation>,
    /// Search results, in the order they were found
    #[serde(default)]
    pub search_results: Vec<SearchResult>,
    /// Token usage, when reported
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<Usage>,
    /// Model identifier
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// Unix timestamp of the model response
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<i64>,
    /// Search context size
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_context_size: Option<String>,
}

impl Metadata {
    /// True when there are no citations and no search results.
    #[must_use]
    pub fn has_no_resources(&self) -> bool {
        self.citations.is_empty() && self.search_results.is_empty()
    }
}
