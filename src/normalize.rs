//! Normalizer: raw per-category payloads → canonical `CategoryResult`
//!
//! The ranking service has shipped several payload shapes over time:
//!
//! ```text
//! { "rankings": { "Nike": 1, "Adidas": 2 }, "reason": "...", "metadata": {...} }
//! { "rankings": [ { "company": "Nike", "rank": 1, "reason": "..." } ] }
//! { "Nike": 1, "Adidas": 2 }                       // bare map
//! [ { "brand": "Nike", "rank": 1 } ]               // bare list
//! ```
//!
//! Citations and search results may sit under `metadata`, directly on the
//! category, or at the experiment root. The canonical metadata of a category
//! is the union of all three, in that order; root entries are replicated into
//! every category.

use std::collections::BTreeMap;

use rustc_hash::FxHashSet;
use serde_json::{Map, Value};

use crate::diagnostics::Diagnostic;
use crate::experiment::{CategoryResult, Experiment, Metadata, Resource, Usage};

/// Keys of a category object that never hold a brand rank.
const RESERVED_KEYS: [&str; 4] = ["reason", "metadata", "citations", "search_results"];

/// Canonical view of an experiment after shape detection.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizedExperiment {
    /// Unique brand names in declared order
    pub brands: Vec<String>,
    /// Unique category names in declared order, including dropped ones
    pub declared_categories: Vec<String>,
    /// Categories that survived normalization, in declared order
    pub categories: Vec<String>,
    /// Canonical results for the surviving categories
    pub results: BTreeMap<String, CategoryResult>,
    /// Anomalies found while normalizing
    pub diagnostics: Vec<Diagnostic>,
    /// Resources attached to the experiment root
    pub root: RootResources,
}

/// Citations and search results attached to the experiment root.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RootResources {
    /// Root-level citations
    pub citations: Vec<Resource>,
    /// Root-level search results
    pub search_results: Vec<Resource>,
}

impl RootResources {
    /// Read the root-level resource lists of an experiment.
    #[must_use]
    pub fn from_experiment(experiment: &Experiment) -> Self {
        Self {
            citations: experiment
                .root_citations()
                .map(parse_resources)
                .unwrap_or_default(),
            search_results: experiment
                .root_search_results()
                .map(parse_resources)
                .unwrap_or_default(),
        }
    }
}

/// Normalize every declared category of an experiment.
///
/// Duplicate brand and category names collapse to their first occurrence.
/// Malformed categories are dropped and reported; results for undeclared
/// categories are ignored and reported.
#[must_use]
pub fn normalize(experiment: &Experiment) -> NormalizedExperiment {
    let mut diagnostics = Vec::new();

    let brands = unique_names(experiment.companies(), |brand| {
        diagnostics.push(Diagnostic::DuplicateBrand {
            brand: brand.to_string(),
        });
    });
    let declared_categories = unique_names(experiment.categories(), |category| {
        diagnostics.push(Diagnostic::DuplicateCategory {
            category: category.to_string(),
        });
    });

    let root = RootResources::from_experiment(experiment);
    let mut categories = Vec::with_capacity(declared_categories.len());
    let mut results = BTreeMap::new();

    for category in &declared_categories {
        match normalize_category(experiment.raw_category(category), &root) {
            Ok(result) => {
                categories.push(category.clone());
                results.insert(category.clone(), result);
            }
            Err(reason) => {
                tracing::warn!(category = %category, %reason, "dropping malformed category");
                diagnostics.push(Diagnostic::MalformedCategoryData {
                    category: category.clone(),
                    reason,
                });
            }
        }
    }

    let declared: FxHashSet<&str> = declared_categories.iter().map(String::as_str).collect();
    for category in experiment.results().keys() {
        if !declared.contains(category.as_str()) {
            tracing::debug!(category = %category, "ignoring undeclared category");
            diagnostics.push(Diagnostic::UndeclaredCategory {
                category: category.clone(),
            });
        }
    }

    tracing::debug!(
        brands = brands.len(),
        categories = categories.len(),
        dropped = declared_categories.len() - categories.len(),
        "normalized experiment"
    );

    NormalizedExperiment {
        brands,
        declared_categories,
        categories,
        results,
        diagnostics,
        root,
    }
}

/// Normalize one raw category value.
///
/// A missing or `null` value yields an empty result carrying only the root
/// resources. Unknown object shapes yield an empty ranking map.
///
/// # Errors
///
/// Returns a description of the problem when the value cannot be read as
/// rankings: a scalar category value, a `rankings` field that is neither a
/// map nor a list, a rank that is not a positive integer, or a ranking
/// record without a brand name.
pub fn normalize_category(
    raw: Option<&Value>,
    root: &RootResources,
) -> std::result::Result<CategoryResult, String> {
    let mut result = match raw {
        None | Some(Value::Null) => CategoryResult::default(),
        Some(Value::Array(records)) => parse_record_list(records)?,
        Some(Value::Object(object)) => parse_category_object(object)?,
        Some(other) => {
            return Err(format!(
                "expected an object or a list of rankings, found {}",
                json_kind(other)
            ))
        }
    };

    let mut metadata = result.metadata().clone();
    metadata.citations.extend(root.citations.iter().cloned());
    metadata
        .search_results
        .extend(root.search_results.iter().cloned());
    result = result.with_metadata(metadata);

    Ok(result)
}

fn parse_category_object(object: &Map<String, Value>) -> std::result::Result<CategoryResult, String> {
    let mut result = match object.get("rankings") {
        Some(Value::Object(map)) => parse_rank_map(map.iter())?,
        Some(Value::Array(records)) => parse_record_list(records)?,
        Some(Value::Null) => CategoryResult::default(),
        Some(other) => {
            return Err(format!(
                "rankings must be a map or a list, found {}",
                json_kind(other)
            ))
        }
        None => parse_bare_map(object)?,
    };

    if let Some(reason) = object.get("reason").and_then(Value::as_str) {
        result = result.with_reason(reason);
    }

    let mut metadata = object
        .get("metadata")
        .and_then(Value::as_object)
        .map(parse_metadata)
        .unwrap_or_default();
    if let Some(citations) = object.get("citations") {
        metadata.citations.extend(parse_resources(citations));
    }
    if let Some(search_results) = object.get("search_results") {
        metadata.search_results.extend(parse_resources(search_results));
    }

    Ok(result.with_metadata(metadata))
}

/// The category object itself is the brand→rank map. Accepted only when every
/// non-reserved entry is numeric; anything else is an unknown shape.
fn parse_bare_map(object: &Map<String, Value>) -> std::result::Result<CategoryResult, String> {
    let entries: Vec<(&String, &Value)> = object
        .iter()
        .filter(|(key, _)| !RESERVED_KEYS.contains(&key.as_str()))
        .collect();

    if entries.iter().all(|(_, value)| value.is_number()) {
        parse_rank_map(entries.into_iter())
    } else {
        tracing::debug!("category object has no recognizable rankings");
        Ok(CategoryResult::default())
    }
}

fn parse_rank_map<'a, I>(entries: I) -> std::result::Result<CategoryResult, String>
where
    I: Iterator<Item = (&'a String, &'a Value)>,
{
    let mut rankings = Vec::new();
    for (brand, value) in entries {
        let rank = parse_rank(value)
            .ok_or_else(|| format!("rank for '{brand}' is not a positive integer: {value}"))?;
        rankings.push((brand.clone(), rank));
    }
    Ok(CategoryResult::new(rankings))
}

fn parse_record_list(records: &[Value]) -> std::result::Result<CategoryResult, String> {
    let mut seen = FxHashSet::default();
    let mut rankings = Vec::with_capacity(records.len());
    let mut reasons = Vec::new();

    for (index, record) in records.iter().enumerate() {
        let record = record
            .as_object()
            .ok_or_else(|| format!("ranking record {index} is not an object"))?;
        let brand = record
            .get("company")
            .or_else(|| record.get("brand"))
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|brand| !brand.is_empty())
            .ok_or_else(|| format!("ranking record {index} has no brand name"))?;
        let rank = record
            .get("rank")
            .and_then(parse_rank)
            .ok_or_else(|| format!("ranking record {index} ('{brand}') has no positive integer rank"))?;

        // first record wins for a repeated brand
        if !seen.insert(brand.to_string()) {
            continue;
        }
        rankings.push((brand.to_string(), rank));
        if let Some(reason) = record.get("reason").and_then(Value::as_str) {
            reasons.push((brand.to_string(), reason.to_string()));
        }
    }

    Ok(reasons
        .into_iter()
        .fold(CategoryResult::new(rankings), |result, (brand, reason)| {
            result.with_brand_reason(brand, reason)
        }))
}

/// Positive integers only; integral floats such as `2.0` are accepted.
fn parse_rank(value: &Value) -> Option<u32> {
    if let Some(n) = value.as_u64() {
        return u32::try_from(n).ok().filter(|&rank| rank >= 1);
    }
    let f = value.as_f64()?;
    if f.fract() == 0.0 && f >= 1.0 && f <= f64::from(u32::MAX) {
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        return Some(f as u32);
    }
    None
}

fn parse_metadata(object: &Map<String, Value>) -> Metadata {
    Metadata {
        citations: object
            .get("citations")
            .map(parse_resources)
            .unwrap_or_default(),
        search_results: object
            .get("search_results")
            .map(parse_resources)
            .unwrap_or_default(),
        usage: object
            .get("usage")
            .and_then(|usage| serde_json::from_value::<Usage>(usage.clone()).ok()),
        model: object
            .get("model")
            .and_then(Value::as_str)
            .map(ToString::to_string),
        created: object.get("created").and_then(Value::as_i64),
        search_context_size: object
            .get("search_context_size")
            .and_then(Value::as_str)
            .map(ToString::to_string),
    }
}

/// Read a list of citations or search results. Bare strings are URLs; entries
/// without a URL are skipped. Anything other than a list yields nothing.
fn parse_resources(value: &Value) -> Vec<Resource> {
    let Some(items) = value.as_array() else {
        return Vec::new();
    };
    items.iter().filter_map(parse_resource).collect()
}

fn parse_resource(item: &Value) -> Option<Resource> {
    match item {
        Value::String(url) => {
            let url = url.trim();
            (!url.is_empty()).then(|| Resource::new(url, url))
        }
        Value::Object(object) => {
            let url = object.get("url").and_then(Value::as_str).map(str::trim)?;
            if url.is_empty() {
                return None;
            }
            let title = object
                .get("title")
                .and_then(Value::as_str)
                .filter(|title| !title.trim().is_empty())
                .unwrap_or(url);
            let mut resource = Resource::new(title, url);
            resource.date = object
                .get("date")
                .and_then(Value::as_str)
                .map(ToString::to_string);
            Some(resource)
        }
        _ => None,
    }
}

fn unique_names(names: &[String], mut on_duplicate: impl FnMut(&str)) -> Vec<String> {
    let mut seen = FxHashSet::default();
    let mut unique = Vec::with_capacity(names.len());
    for name in names {
        if seen.insert(name.as_str()) {
            unique.push(name.clone());
        } else {
            on_duplicate(name);
        }
    }
    unique
}

const fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}
