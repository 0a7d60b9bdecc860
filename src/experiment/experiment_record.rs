//! Experiment - the raw ranking payload produced by the external ranking service

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::Result;

/// Identifier assigned to an experiment by the result store.
///
/// The ranking service issues integer ids; other stores use opaque strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ExperimentId {
    /// Numeric identifier
    Number(i64),
    /// Opaque string identifier
    Text(String),
}

impl fmt::Display for ExperimentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for ExperimentId {
    fn from(value: i64) -> Self {
        Self::Number(value)
    }
}

impl From<&str> for ExperimentId {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for ExperimentId {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

/// A ranking experiment as delivered by the ranking service.
///
/// The experiment is read-only input to the engine. Per-category results are
/// kept as raw JSON because their shape varies between service versions; the
/// [`normalize`](crate::normalize) stage turns them into
/// [`CategoryResult`](super::CategoryResult) values.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Experiment {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    id: Option<ExperimentId>,
    #[serde(default, alias = "brands")]
    companies: Vec<String>,
    #[serde(default)]
    categories: Vec<String>,
    #[serde(default)]
    results: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    average_ranks: Option<BTreeMap<String, Option<f64>>>,
    #[serde(
        default,
        deserialize_with = "lenient_timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    citations: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    search_results: Option<Value>,
}

impl Experiment {
    /// Create a builder for an experiment with the given id.
    #[must_use]
    pub fn builder(id: impl Into<ExperimentId>) -> ExperimentBuilder {
        ExperimentBuilder::new(id)
    }

    /// Decode an experiment from the ranking service's JSON.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Json`](crate::Error::Json) if the text is not JSON or
    /// the top-level fields have the wrong types.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Decode an experiment from an already-parsed JSON value.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Json`](crate::Error::Json) if the top-level fields have
    /// the wrong types.
    pub fn from_value(value: Value) -> Result<Self> {
        Ok(serde_json::from_value(value)?)
    }

    /// Get the experiment id, if the store assigned one.
    #[must_use]
    pub const fn id(&self) -> Option<&ExperimentId> {
        self.id.as_ref()
    }

    /// Brand names in submission order, as delivered (may contain duplicates).
    #[must_use]
    pub fn companies(&self) -> &[String] {
        &self.companies
    }

    /// Category names in submission order, as delivered (may contain duplicates).
    #[must_use]
    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    /// Raw per-category results keyed by category name.
    #[must_use]
    pub const fn results(&self) -> &Map<String, Value> {
        &self.results
    }

    /// Raw result value for one category.
    #[must_use]
    pub fn raw_category(&self, category: &str) -> Option<&Value> {
        self.results.get(category)
    }

    /// Average rank reported by the upstream service for a brand.
    ///
    /// Informational only; the engine recomputes averages from `results`.
    #[must_use]
    pub fn upstream_average(&self, brand: &str) -> Option<f64> {
        self.average_ranks
            .as_ref()
            .and_then(|ranks| ranks.get(brand).copied().flatten())
    }

    /// Whether the payload carried upstream average ranks at all.
    #[must_use]
    pub const fn has_upstream_averages(&self) -> bool {
        self.average_ranks.is_some()
    }

    /// Get the creation timestamp, if present and parseable.
    #[must_use]
    pub const fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }

    /// Citations attached to the experiment root (apply to every category).
    #[must_use]
    pub const fn root_citations(&self) -> Option<&Value> {
        self.citations.as_ref()
    }

    /// Search results attached to the experiment root (apply to every category).
    #[must_use]
    pub const fn root_search_results(&self) -> Option<&Value> {
        self.search_results.as_ref()
    }
}

/// Builder for `Experiment`.
#[derive(Debug)]
pub struct ExperimentBuilder {
    id: ExperimentId,
    companies: Vec<String>,
    categories: Vec<String>,
    results: Map<String, Value>,
    average_ranks: Option<BTreeMap<String, Option<f64>>>,
    created_at: Option<DateTime<Utc>>,
    citations: Option<Value>,
    search_results: Option<Value>,
}

impl ExperimentBuilder {
    /// Create a new builder with the experiment id.
    #[must_use]
    pub fn new(id: impl Into<ExperimentId>) -> Self {
        Self {
            id: id.into(),
            companies: Vec::new(),
            categories: Vec::new(),
            results: Map::new(),
            average_ranks: None,
            created_at: None,
            citations: None,
            search_results: None,
        }
    }

    /// Set the brand names, in submission order.
    #[must_use]
    pub fn companies<I, S>(mut self, companies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.companies = companies.into_iter().map(Into::into).collect();
        self
    }

    /// Set the category names, in submission order.
    #[must_use]
    pub fn categories<I, S>(mut self, categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.categories = categories.into_iter().map(Into::into).collect();
        self
    }

    /// Attach the raw result value for one category.
    #[must_use]
    pub fn result(mut self, category: impl Into<String>, raw: Value) -> Self {
        self.results.insert(category.into(), raw);
        self
    }

    /// Record an upstream-supplied average rank for a brand.
    #[must_use]
    pub fn upstream_average(mut self, brand: impl Into<String>, average: f64) -> Self {
        self.average_ranks
            .get_or_insert_with(BTreeMap::new)
            .insert(brand.into(), Some(average));
        self
    }

    /// Set the creation timestamp.
    #[must_use]
    pub const fn created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = Some(created_at);
        self
    }

    /// Attach experiment-root citations.
    #[must_use]
    pub fn root_citations(mut self, citations: Value) -> Self {
        self.citations = Some(citations);
        self
    }

    /// Attach experiment-root search results.
    #[must_use]
    pub fn root_search_results(mut self, search_results: Value) -> Self {
        self.search_results = Some(search_results);
        self
    }

    /// Build the `Experiment`.
    #[must_use]
    pub fn build(self) -> Experiment {
        Experiment {
            id: Some(self.id),
            companies: self.companies,
            categories: self.categories,
            results: self.results,
            average_ranks: self.average_ranks,
            created_at: self.created_at,
            citations: self.citations,
            search_results: self.search_results,
        }
    }
}

/// Accept RFC 3339 timestamps as well as naive ISO-8601 ones (taken as UTC).
/// Unparseable timestamps become `None` rather than failing the whole payload.
fn lenient_timestamp<'de, D>(deserializer: D) -> std::result::Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(parse_timestamp))
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
        .or_else(|| {
            tracing::debug!(timestamp = raw, "ignoring unparseable created_at");
            None
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_experiment_builder() {
        let experiment = Experiment::builder(7)
            .companies(["Nike", "Adidas"])
            .categories(["Sneakers"])
            .result("Sneakers", serde_json::json!({"rankings": {"Nike": 1}}))
            .build();

        assert_eq!(experiment.id(), Some(&ExperimentId::Number(7)));
        assert_eq!(experiment.companies(), ["Nike", "Adidas"]);
        assert!(experiment.raw_category("Sneakers").is_some());
        assert!(!experiment.has_upstream_averages());
    }

    #[test]
    fn test_naive_timestamp_is_utc() {
        let ts = parse_timestamp("2024-03-01T12:30:00.123456").unwrap();
        assert_eq!(ts.to_rfc3339(), "2024-03-01T12:30:00.123456+00:00");
    }

    #[test]
    fn test_garbage_timestamp_is_dropped() {
        assert!(parse_timestamp("yesterday").is_none());
    }

    #[test]
    fn test_upstream_null_average() {
        let experiment = Experiment::from_json(
            r#"{"companies": ["A"], "categories": [], "results": {}, "average_ranks": {"A": null}}"#,
        )
        .unwrap();
        assert!(experiment.has_upstream_averages());
        assert_eq!(experiment.upstream_average("A"), None);
    }
}
