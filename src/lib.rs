//! # rank-insights: Ranking Aggregation & Insights Engine
//!
//! Turns the raw, heterogeneously-shaped result of an AI brand-ranking
//! experiment into a canonical, sorted, annotated view.
//!
//! ## Pipeline
//!
//! ```text
//! Experiment ──> normalize ──┬──> aggregate ──> sort ──> insights
//!                            └──> resources
//! ```
//!
//! Every stage is a pure function of its input. Re-running the pipeline on
//! the same experiment yields the same [`Analysis`].
//!
//! ## Example Usage
//!
//! ```rust
//! use rank_insights::{experiment::Experiment, InsightEngine};
//! use serde_json::json;
//!
//! let experiment = Experiment::builder(1)
//!     .companies(["Nike", "Adidas", "Puma"])
//!     .categories(["Sneakers", "Running"])
//!     .result("Sneakers", json!({"rankings": {"Nike": 1, "Adidas": 2, "Puma": 3}}))
//!     .result("Running", json!({"rankings": {"Nike": 2, "Adidas": 1, "Puma": 3}}))
//!     .build();
//!
//! let analysis = InsightEngine::default().analyze(&experiment);
//!
//! assert_eq!(analysis.sorted_brands(), ["Nike", "Adidas", "Puma"]);
//! assert_eq!(analysis.insights().overall_winner.as_ref().unwrap().brand, "Nike");
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

pub mod aggregate;
pub mod analysis;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod experiment;
pub mod insights;
pub mod normalize;
pub mod resources;
pub mod sort;

pub use analysis::Analysis;
pub use config::EngineConfig;
pub use diagnostics::Diagnostic;
pub use error::{Error, Result};

use experiment::Experiment;
use normalize::NormalizedExperiment;
use sort::RankTable;

/// The ranking aggregation and insights engine.
///
/// Holds only immutable configuration; one engine can analyze any number of
/// experiments, from any number of threads.
#[derive(Debug, Clone, Default)]
pub struct InsightEngine {
    config: EngineConfig,
}

impl InsightEngine {
    /// Create a new engine builder
    #[must_use]
    pub fn builder() -> InsightEngineBuilder {
        InsightEngineBuilder::default()
    }

    /// Create an engine from a configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] if the configuration fails validation.
    pub fn with_config(config: EngineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// The active configuration.
    #[must_use]
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Run the full pipeline over one experiment.
    ///
    /// Never fails on irregular payload data; anomalies are returned in
    /// [`Analysis::diagnostics`].
    #[must_use]
    pub fn analyze(&self, experiment: &Experiment) -> Analysis {
        let span = tracing::debug_span!(
            "analyze",
            experiment = %experiment.id().map_or_else(String::new, ToString::to_string)
        );
        let _enter = span.enter();

        let NormalizedExperiment {
            brands,
            declared_categories,
            categories,
            results,
            mut diagnostics,
            root,
        } = normalize::normalize(experiment);

        let average_ranks = aggregate::average_ranks(&brands, &categories, &results);
        diagnostics.extend(aggregate::undefined_averages(&average_ranks));
        if self.config.check_upstream_averages {
            diagnostics.extend(aggregate::upstream_mismatches(experiment, &average_ranks));
        }

        let sorted_brands = RankTable::new(&categories, &results, &average_ranks).sort(&brands);
        let insights = insights::generate(
            &sorted_brands,
            &categories,
            &results,
            &average_ranks,
            self.config.consistency_threshold,
        );
        let resources = resources::collect(&categories, &results, &root);
        let usage = resources::summarize_usage(&categories, &results);

        if brands.is_empty() || categories.is_empty() {
            tracing::debug!("experiment has no data");
            diagnostics.push(Diagnostic::EmptyExperiment);
        }

        Analysis {
            experiment_id: experiment.id().cloned(),
            created_at: experiment.created_at(),
            brands,
            declared_categories,
            categories,
            results,
            average_ranks,
            sorted_brands,
            insights,
            resources,
            usage,
            diagnostics,
        }
    }
}

/// Engine builder
#[derive(Debug, Default)]
pub struct InsightEngineBuilder {
    config: EngineConfig,
}

impl InsightEngineBuilder {
    /// Set the average rank at or below which a brand is a consistent performer
    #[must_use]
    pub fn consistency_threshold(mut self, threshold: f64) -> Self {
        self.config.consistency_threshold = threshold;
        self
    }

    /// Enable or disable reporting of disagreeing upstream averages
    #[must_use]
    pub const fn check_upstream_averages(mut self, enabled: bool) -> Self {
        self.config.check_upstream_averages = enabled;
        self
    }

    /// Build the engine
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] if the configuration fails validation
    pub fn build(self) -> Result<InsightEngine> {
        InsightEngine::with_config(self.config)
    }
}
