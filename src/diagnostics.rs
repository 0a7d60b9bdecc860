//! Diagnostics reported alongside an analysis
//!
//! The engine never fails on irregular payload data. Anything it had to
//! drop, ignore or override is recorded here so callers can surface it.

use std::fmt;

use serde::Serialize;

/// A data-shape anomaly found while analyzing an experiment.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Diagnostic {
    /// A category's raw value could not be read as rankings; the category was
    /// excluded from aggregation, insights and resource collection.
    MalformedCategoryData {
        /// Category name
        category: String,
        /// What was wrong with the value
        reason: String,
    },
    /// `results` held a category the experiment never declared; it was ignored.
    UndeclaredCategory {
        /// Category name
        category: String,
    },
    /// A brand name was listed more than once; later copies were ignored.
    DuplicateBrand {
        /// Brand name
        brand: String,
    },
    /// A category name was listed more than once; later copies were ignored.
    DuplicateCategory {
        /// Category name
        category: String,
    },
    /// A brand was not ranked in any surviving category.
    UndefinedAverage {
        /// Brand name
        brand: String,
    },
    /// The upstream `average_ranks` disagreed with the recomputed average.
    UpstreamAverageMismatch {
        /// Brand name
        brand: String,
        /// Value supplied by the upstream service
        upstream: Option<f64>,
        /// Value recomputed from the category results
        computed: Option<f64>,
    },
    /// No brands or no usable categories; the analysis is the "no data" state.
    EmptyExperiment,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MalformedCategoryData { category, reason } => {
                write!(f, "category '{category}' dropped: {reason}")
            }
            Self::UndeclaredCategory { category } => {
                write!(f, "result for undeclared category '{category}' ignored")
            }
            Self::DuplicateBrand { brand } => write!(f, "duplicate brand '{brand}' ignored"),
            Self::DuplicateCategory { category } => {
                write!(f, "duplicate category '{category}' ignored")
            }
            Self::UndefinedAverage { brand } => {
                write!(f, "brand '{brand}' is not ranked in any category")
            }
            Self::UpstreamAverageMismatch {
                brand,
                upstream,
                computed,
            } => write!(
                f,
                "upstream average for '{brand}' ({}) differs from recomputed ({})",
                display_opt(*upstream),
                display_opt(*computed)
            ),
            Self::EmptyExperiment => f.write_str("experiment has no brands or no usable categories"),
        }
    }
}

fn display_opt(value: Option<f64>) -> String {
    value.map_or_else(|| "none".to_string(), |v| format!("{v:.3}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_mismatch() {
        let diag = Diagnostic::UpstreamAverageMismatch {
            brand: "Nike".to_string(),
            upstream: Some(0.0),
            computed: None,
        };
        assert_eq!(
            diag.to_string(),
            "upstream average for 'Nike' (0.000) differs from recomputed (none)"
        );
    }

    #[test]
    fn test_serializes_with_kind_tag() {
        let diag = Diagnostic::UndeclaredCategory {
            category: "Laptops".to_string(),
        };
        let json = serde_json::to_value(&diag).unwrap();
        assert_eq!(json["kind"], "undeclared_category");
        assert_eq!(json["category"], "Laptops");
    }
}
