//! ResourceCollector: citations and search results across an experiment
//!
//! Two views are produced from the canonical category metadata:
//!
//! - tagged lists, one entry per (category, resource) pair, duplicates across
//!   categories kept because each tag carries its own context;
//! - global lists deduplicated by URL, keeping the first-seen title and date.
//!
//! Experiment-root resources were already replicated into every surviving
//! category by the normalizer, so they show up in the tagged lists under each
//! category. The global lists also take the root lists directly, after the
//! category metadata, so they cover the whole experiment even when every
//! category was dropped as malformed.

use std::collections::BTreeMap;

use rustc_hash::FxHashSet;
use serde::Serialize;

use crate::experiment::{CategoryResult, Resource};
use crate::normalize::RootResources;

/// A resource tagged with the category it was attached to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaggedResource {
    /// Originating category
    pub category: String,
    /// The citation or search result
    #[serde(flatten)]
    pub resource: Resource,
}

/// Citations and search results collected from every surviving category.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ResourceCollection {
    /// Every citation, tagged, in category order
    pub citations: Vec<TaggedResource>,
    /// Every search result, tagged, in category order
    pub search_results: Vec<TaggedResource>,
    /// Citations deduplicated by URL
    pub unique_citations: Vec<Resource>,
    /// Search results deduplicated by URL
    pub unique_search_results: Vec<Resource>,
}

impl ResourceCollection {
    /// Tagged citations of one category.
    pub fn citations_for<'a, 'b>(
        &'a self,
        category: &'b str,
    ) -> impl Iterator<Item = &'a Resource> + 'b
    where
        'a: 'b,
    {
        tagged_for(&self.citations, category)
    }

    /// Tagged search results of one category.
    pub fn search_results_for<'a, 'b>(
        &'a self,
        category: &'b str,
    ) -> impl Iterator<Item = &'a Resource> + 'b
    where
        'a: 'b,
    {
        tagged_for(&self.search_results, category)
    }

    /// True when nothing was collected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.citations.is_empty()
            && self.search_results.is_empty()
            && self.unique_citations.is_empty()
            && self.unique_search_results.is_empty()
    }
}

fn tagged_for<'a, 'b>(
    tagged: &'a [TaggedResource],
    category: &'b str,
) -> impl Iterator<Item = &'a Resource> + 'b
where
    'a: 'b,
{
    tagged
        .iter()
        .filter(move |t| t.category == category)
        .map(|t| &t.resource)
}

/// Collect tagged resources over the given categories, and deduplicated
/// resources over those categories plus the experiment root.
#[must_use]
pub fn collect(
    categories: &[String],
    results: &BTreeMap<String, CategoryResult>,
    root: &RootResources,
) -> ResourceCollection {
    let mut citations = Vec::new();
    let mut search_results = Vec::new();

    for category in categories {
        let Some(result) = results.get(category) else {
            continue;
        };
        let metadata = result.metadata();
        if metadata.has_no_resources() {
            continue;
        }
        citations.extend(tag(category, &metadata.citations));
        search_results.extend(tag(category, &metadata.search_results));
    }

    let unique_citations = dedupe_by_url(
        citations
            .iter()
            .map(|t| &t.resource)
            .chain(&root.citations),
    );
    let unique_search_results = dedupe_by_url(
        search_results
            .iter()
            .map(|t| &t.resource)
            .chain(&root.search_results),
    );

    tracing::debug!(
        citations = citations.len(),
        unique_citations = unique_citations.len(),
        search_results = search_results.len(),
        unique_search_results = unique_search_results.len(),
        "collected resources"
    );

    ResourceCollection {
        citations,
        search_results,
        unique_citations,
        unique_search_results,
    }
}

fn tag<'a>(category: &'a str, resources: &'a [Resource]) -> impl Iterator<Item = TaggedResource> + 'a {
    resources.iter().map(move |resource| TaggedResource {
        category: category.to_string(),
        resource: resource.clone(),
    })
}

/// Deduplicate resources by URL, keeping the first occurrence.
#[must_use]
pub fn dedupe_by_url<'a, I>(resources: I) -> Vec<Resource>
where
    I: IntoIterator<Item = &'a Resource>,
{
    let mut seen = FxHashSet::default();
    let mut unique = Vec::new();
    for resource in resources {
        if seen.insert(resource.url.trim()) {
            unique.push(resource.clone());
        }
    }
    unique
}

/// Token usage and model identifiers summed over the surviving categories.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UsageSummary {
    /// Prompt tokens across all categories
    pub prompt_tokens: u64,
    /// Completion tokens across all categories
    pub completion_tokens: u64,
    /// Total tokens across all categories
    pub total_tokens: u64,
    /// Number of categories that reported usage
    pub categories_reporting: usize,
    /// Distinct model identifiers, first-seen order
    pub models: Vec<String>,
}

/// Sum token usage over the given categories.
#[must_use]
pub fn summarize_usage(
    categories: &[String],
    results: &BTreeMap<String, CategoryResult>,
) -> UsageSummary {
    let mut summary = UsageSummary::default();
    for metadata in categories
        .iter()
        .filter_map(|category| results.get(category))
        .map(CategoryResult::metadata)
    {
        if let Some(usage) = &metadata.usage {
            summary.prompt_tokens += usage.prompt_tokens;
            summary.completion_tokens += usage.completion_tokens;
            summary.total_tokens += usage.total_tokens;
            summary.categories_reporting += 1;
        }
        if let Some(model) = &metadata.model {
            if !summary.models.contains(model) {
                summary.models.push(model.clone());
            }
        }
    }
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::experiment::{Metadata, Usage};

    fn category(citations: &[(&str, &str)], search: &[(&str, &str)]) -> CategoryResult {
        let metadata = Metadata {
            citations: citations
                .iter()
                .map(|(title, url)| Resource::new(*title, *url))
                .collect(),
            search_results: search
                .iter()
                .map(|(title, url)| Resource::new(*title, *url))
                .collect(),
            ..Metadata::default()
        };
        CategoryResult::default().with_metadata(metadata)
    }

    #[test]
    fn test_tagged_keeps_duplicates_global_dedupes() {
        let categories = vec!["Sneakers".to_string(), "Running".to_string()];
        let mut results = BTreeMap::new();
        results.insert(
            "Sneakers".to_string(),
            category(&[("First", "https://a"), ("B", "https://b")], &[("S", "https://s")]),
        );
        results.insert(
            "Running".to_string(),
            category(&[("Second", "https://a")], &[("S again", "https://s")]),
        );

        let collection = collect(&categories, &results, &RootResources::default());

        assert_eq!(collection.citations.len(), 3);
        assert_eq!(collection.unique_citations.len(), 2);
        assert_eq!(collection.unique_citations[0].title, "First");
        assert_eq!(collection.unique_search_results.len(), 1);
        assert_eq!(collection.citations_for("Running").count(), 1);
        assert_eq!(collection.citations[2].category, "Running");
    }

    #[test]
    fn test_empty_metadata_collects_nothing() {
        let categories = vec!["Laptops".to_string()];
        let mut results = BTreeMap::new();
        results.insert("Laptops".to_string(), CategoryResult::default());

        let collection = collect(&categories, &results, &RootResources::default());
        assert!(collection.is_empty());
        assert!(collection.unique_citations.is_empty());
    }

    #[test]
    fn test_root_resources_reach_global_lists_without_categories() {
        let root = RootResources {
            citations: vec![Resource::new("Survey", "https://survey")],
            search_results: vec![Resource::new("Query", "https://query")],
        };

        let collection = collect(&[], &BTreeMap::new(), &root);

        assert!(collection.citations.is_empty());
        assert_eq!(collection.unique_citations, root.citations);
        assert_eq!(collection.unique_search_results, root.search_results);
        assert!(!collection.is_empty());
    }

    #[test]
    fn test_lookup_outlives_category_name() {
        let categories = vec!["Coffee".to_string()];
        let mut results = BTreeMap::new();
        results.insert("Coffee".to_string(), category(&[("Beans", "https://beans")], &[]));
        let collection = collect(&categories, &results, &RootResources::default());

        let found: Vec<&Resource> = {
            let name = String::from("Coffee");
            collection.citations_for(&name).collect()
        };
        assert_eq!(found[0].url, "https://beans");
    }

    #[test]
    fn test_tagged_serializes_flat() {
        let tagged = TaggedResource {
            category: "Coffee".to_string(),
            resource: Resource::new("Beans", "https://beans").with_date("2025-01-01"),
        };
        let json = serde_json::to_value(&tagged).unwrap();
        assert_eq!(json["category"], "Coffee");
        assert_eq!(json["url"], "https://beans");
        assert_eq!(json["date"], "2025-01-01");
    }

    #[test]
    fn test_usage_summary() {
        let categories = vec!["A".to_string(), "B".to_string(), "C".to_string()];
        let with_usage = |total, model: &str| {
            CategoryResult::default().with_metadata(Metadata {
                usage: Some(Usage {
                    prompt_tokens: total / 2,
                    completion_tokens: total / 2,
                    total_tokens: total,
                    search_context_size: None,
                }),
                model: Some(model.to_string()),
                ..Metadata::default()
            })
        };
        let mut results = BTreeMap::new();
        results.insert("A".to_string(), with_usage(100, "sonar-pro"));
        results.insert("B".to_string(), with_usage(50, "sonar-pro"));
        results.insert("C".to_string(), CategoryResult::default());

        let summary = summarize_usage(&categories, &results);
        assert_eq!(summary.total_tokens, 150);
        assert_eq!(summary.prompt_tokens, 75);
        assert_eq!(summary.categories_reporting, 2);
        assert_eq!(summary.models, ["sonar-pro"]);
    }
}
