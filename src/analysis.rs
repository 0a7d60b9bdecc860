//! Analysis - the complete derived view of one experiment

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::aggregate::{AverageRank, AverageRanks};
use crate::diagnostics::Diagnostic;
use crate::experiment::{CategoryResult, ExperimentId, Resource};
use crate::insights::{brand_breakdown, AggregateInsights, BrandBreakdown};
use crate::resources::{ResourceCollection, UsageSummary};
use crate::{Error, Result};

/// Everything the presentation layer needs for one experiment.
///
/// An `Analysis` is a view: it is recomputed from the experiment on every
/// request and never stored as the source of truth.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Analysis {
    pub(crate) experiment_id: Option<ExperimentId>,
    pub(crate) created_at: Option<DateTime<Utc>>,
    pub(crate) brands: Vec<String>,
    pub(crate) declared_categories: Vec<String>,
    pub(crate) categories: Vec<String>,
    pub(crate) results: BTreeMap<String, CategoryResult>,
    pub(crate) average_ranks: AverageRanks,
    pub(crate) sorted_brands: Vec<String>,
    pub(crate) insights: AggregateInsights,
    pub(crate) resources: ResourceCollection,
    pub(crate) usage: UsageSummary,
    pub(crate) diagnostics: Vec<Diagnostic>,
}

impl Analysis {
    /// Id of the analyzed experiment.
    #[must_use]
    pub const fn experiment_id(&self) -> Option<&ExperimentId> {
        self.experiment_id.as_ref()
    }

    /// Creation timestamp of the analyzed experiment.
    #[must_use]
    pub const fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }

    /// True for the "no data" state: no brands or no usable categories.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.brands.is_empty() || self.categories.is_empty()
    }

    /// Unique brands in declared order.
    #[must_use]
    pub fn brands(&self) -> &[String] {
        &self.brands
    }

    /// Unique declared categories, including dropped ones.
    #[must_use]
    pub fn declared_categories(&self) -> &[String] {
        &self.declared_categories
    }

    /// Categories that survived normalization, in declared order.
    #[must_use]
    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    /// Declared categories dropped as malformed.
    pub fn dropped_categories(&self) -> impl Iterator<Item = &str> {
        self.declared_categories
            .iter()
            .filter(|category| !self.results.contains_key(*category))
            .map(String::as_str)
    }

    /// Canonical results of the surviving categories.
    #[must_use]
    pub const fn results(&self) -> &BTreeMap<String, CategoryResult> {
        &self.results
    }

    /// Recomputed average ranks.
    #[must_use]
    pub const fn average_ranks(&self) -> &AverageRanks {
        &self.average_ranks
    }

    /// Brands best-first.
    #[must_use]
    pub fn sorted_brands(&self) -> &[String] {
        &self.sorted_brands
    }

    /// Derived insights.
    #[must_use]
    pub const fn insights(&self) -> &AggregateInsights {
        &self.insights
    }

    /// Collected citations and search results.
    #[must_use]
    pub const fn resources(&self) -> &ResourceCollection {
        &self.resources
    }

    /// Token usage across the surviving categories.
    #[must_use]
    pub const fn usage(&self) -> &UsageSummary {
        &self.usage
    }

    /// Anomalies found in the payload.
    #[must_use]
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Average rank of a declared brand.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownBrand`] if the experiment never declared `brand`.
    pub fn average_rank(&self, brand: &str) -> Result<AverageRank> {
        self.average_ranks
            .get(brand)
            .ok_or_else(|| Error::UnknownBrand(brand.to_string()))
    }

    /// Canonical result of a declared category; `None` if it was dropped.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownCategory`] if the experiment never declared
    /// `category`.
    pub fn category_result(&self, category: &str) -> Result<Option<&CategoryResult>> {
        self.ensure_declared(category)?;
        Ok(self.results.get(category))
    }

    /// Brand holding rank 1 in a declared category.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownCategory`] if the experiment never declared
    /// `category`.
    pub fn category_winner(&self, category: &str) -> Result<Option<&str>> {
        Ok(self
            .category_result(category)?
            .and_then(CategoryResult::winner))
    }

    /// Tagged citations of a declared category.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownCategory`] if the experiment never declared
    /// `category`.
    pub fn category_citations(&self, category: &str) -> Result<Vec<&Resource>> {
        self.ensure_declared(category)?;
        Ok(self.resources.citations_for(category).collect())
    }

    /// Tagged search results of a declared category.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownCategory`] if the experiment never declared
    /// `category`.
    pub fn category_search_results(&self, category: &str) -> Result<Vec<&Resource>> {
        self.ensure_declared(category)?;
        Ok(self.resources.search_results_for(category).collect())
    }

    /// Per-category detail for a declared brand.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownBrand`] if the experiment never declared `brand`.
    pub fn brand_breakdown(&self, brand: &str) -> Result<BrandBreakdown> {
        let average = self.average_rank(brand)?;
        let position = self
            .sorted_brands
            .iter()
            .position(|b| b == brand)
            .map_or(0, |i| i + 1);
        Ok(brand_breakdown(
            brand,
            position,
            average,
            &self.categories,
            &self.results,
        ))
    }

    fn ensure_declared(&self, category: &str) -> Result<()> {
        if self.declared_categories.iter().any(|c| c == category) {
            Ok(())
        } else {
            Err(Error::UnknownCategory(category.to_string()))
        }
    }
}
