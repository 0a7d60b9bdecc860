//! Aggregator: mean rank per brand
//!
//! A brand's average is taken only over the categories in which it was
//! ranked. A brand ranked nowhere has an [`AverageRank::Undefined`] average,
//! never `0`, so "no data" cannot be mistaken for "best possible rank".

use std::cmp::Ordering;
use std::collections::BTreeMap;

use rustc_hash::FxHashMap;
use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::diagnostics::Diagnostic;
use crate::experiment::{CategoryResult, Experiment};

/// Tolerance when comparing an upstream-supplied average to a recomputed one.
const UPSTREAM_TOLERANCE: f64 = 1e-6;

/// Average rank of a brand across the categories it was ranked in.
///
/// Stored as an exact sum/count pair so that equal averages compare equal
/// regardless of floating-point rounding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AverageRank {
    /// Ranked in `count` categories with ranks summing to `sum`
    Ranked {
        /// Sum of ranks
        sum: u64,
        /// Number of categories contributing a rank (always ≥ 1)
        count: u32,
    },
    /// Not ranked in any category
    Undefined,
}

impl AverageRank {
    /// Average over a set of ranks; `Undefined` for an empty set.
    #[must_use]
    pub fn from_ranks<I>(ranks: I) -> Self
    where
        I: IntoIterator<Item = u32>,
    {
        let (sum, count) = ranks
            .into_iter()
            .fold((0u64, 0u32), |(sum, count), rank| {
                (sum + u64::from(rank), count + 1)
            });
        if count == 0 {
            Self::Undefined
        } else {
            Self::Ranked { sum, count }
        }
    }

    /// The mean rank, or `None` when undefined.
    #[must_use]
    pub fn value(self) -> Option<f64> {
        match self {
            #[allow(clippy::cast_precision_loss)]
            Self::Ranked { sum, count } => Some(sum as f64 / f64::from(count)),
            Self::Undefined => None,
        }
    }

    /// True when the brand was ranked somewhere.
    #[must_use]
    pub const fn is_defined(self) -> bool {
        matches!(self, Self::Ranked { .. })
    }

    /// Number of categories that contributed a rank.
    #[must_use]
    pub const fn category_count(self) -> u32 {
        match self {
            Self::Ranked { count, .. } => count,
            Self::Undefined => 0,
        }
    }

    /// Compare mean ranks exactly; `Undefined` sorts after every defined mean.
    #[must_use]
    pub fn compare(self, other: Self) -> Ordering {
        match (self, other) {
            (
                Self::Ranked { sum: a, count: ca },
                Self::Ranked { sum: b, count: cb },
            ) => (u128::from(a) * u128::from(cb)).cmp(&(u128::from(b) * u128::from(ca))),
            (Self::Ranked { .. }, Self::Undefined) => Ordering::Less,
            (Self::Undefined, Self::Ranked { .. }) => Ordering::Greater,
            (Self::Undefined, Self::Undefined) => Ordering::Equal,
        }
    }
}

impl Serialize for AverageRank {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.value().serialize(serializer)
    }
}

/// Average ranks of every declared brand, in declared brand order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AverageRanks {
    entries: Vec<(String, AverageRank)>,
    index: FxHashMap<String, usize>,
}

impl AverageRanks {
    /// Average rank of a brand; `None` if the brand was never declared.
    #[must_use]
    pub fn get(&self, brand: &str) -> Option<AverageRank> {
        self.index.get(brand).map(|&i| self.entries[i].1)
    }

    /// Iterate brand/average pairs in declared brand order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, AverageRank)> {
        self.entries
            .iter()
            .map(|(brand, average)| (brand.as_str(), *average))
    }

    /// Number of brands.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when there are no brands.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn push(&mut self, brand: String, average: AverageRank) {
        self.index.insert(brand.clone(), self.entries.len());
        self.entries.push((brand, average));
    }
}

impl Serialize for AverageRanks {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (brand, average) in &self.entries {
            map.serialize_entry(brand, average)?;
        }
        map.end()
    }
}

/// Compute the average rank of every brand over the given categories.
///
/// Ranked names that are not in `brands` are ignored.
#[must_use]
pub fn average_ranks(
    brands: &[String],
    categories: &[String],
    results: &BTreeMap<String, CategoryResult>,
) -> AverageRanks {
    let mut averages = AverageRanks::default();
    for brand in brands {
        let average = AverageRank::from_ranks(
            categories
                .iter()
                .filter_map(|category| results.get(category))
                .filter_map(|result| result.rank(brand)),
        );
        averages.push(brand.clone(), average);
    }
    tracing::debug!(
        brands = averages.len(),
        undefined = averages.iter().filter(|(_, avg)| !avg.is_defined()).count(),
        "computed average ranks"
    );
    averages
}

/// One diagnostic per brand whose average is undefined.
#[must_use]
pub fn undefined_averages(averages: &AverageRanks) -> Vec<Diagnostic> {
    averages
        .iter()
        .filter(|(_, average)| !average.is_defined())
        .map(|(brand, _)| Diagnostic::UndefinedAverage {
            brand: brand.to_string(),
        })
        .collect()
}

/// Compare upstream-supplied averages with the recomputed ones.
///
/// Returns nothing when the payload carried no upstream averages. The
/// recomputed value is always authoritative.
#[must_use]
pub fn upstream_mismatches(experiment: &Experiment, averages: &AverageRanks) -> Vec<Diagnostic> {
    if !experiment.has_upstream_averages() {
        return Vec::new();
    }
    averages
        .iter()
        .filter_map(|(brand, average)| {
            let upstream = experiment.upstream_average(brand);
            let computed = average.value();
            let agrees = match (upstream, computed) {
                (Some(u), Some(c)) => (u - c).abs() <= UPSTREAM_TOLERANCE,
                (None, None) => true,
                _ => false,
            };
            if agrees {
                return None;
            }
            tracing::warn!(
                brand,
                ?upstream,
                ?computed,
                "upstream average disagrees with recomputed average"
            );
            Some(Diagnostic::UpstreamAverageMismatch {
                brand: brand.to_string(),
                upstream,
                computed,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_average_skips_unranked_categories() {
        let mut results = BTreeMap::new();
        results.insert("A".to_string(), CategoryResult::new([("Nike", 1), ("Puma", 3)]));
        results.insert("B".to_string(), CategoryResult::new([("Nike", 2)]));

        let averages = average_ranks(&names(&["Nike", "Puma", "Reebok"]), &names(&["A", "B"]), &results);

        assert_eq!(averages.get("Nike").unwrap().value(), Some(1.5));
        assert_eq!(averages.get("Puma").unwrap().value(), Some(3.0));
        assert_eq!(averages.get("Puma").unwrap().category_count(), 1);
        assert_eq!(averages.get("Reebok"), Some(AverageRank::Undefined));
        assert_eq!(averages.get("Unknown"), None);
    }

    #[test]
    fn test_exact_comparison() {
        let a = AverageRank::from_ranks([1, 2, 4]); // 7/3
        let b = AverageRank::from_ranks([7]);
        let c = AverageRank::Ranked { sum: 14, count: 6 };
        assert_eq!(a.compare(c), Ordering::Equal);
        assert_eq!(a.compare(b), Ordering::Less);
        assert_eq!(b.compare(AverageRank::Undefined), Ordering::Less);
        assert_eq!(AverageRank::Undefined.compare(AverageRank::Undefined), Ordering::Equal);
    }

    #[test]
    fn test_undefined_serializes_as_null() {
        let json = serde_json::to_string(&AverageRank::Undefined).unwrap();
        assert_eq!(json, "null");
        let json = serde_json::to_string(&AverageRank::from_ranks([1, 2])).unwrap();
        assert_eq!(json, "1.5");
    }

    #[test]
    fn test_upstream_zero_for_unranked_is_flagged() {
        let experiment = Experiment::builder(1)
            .companies(["Nike", "Puma"])
            .upstream_average("Nike", 1.0)
            .upstream_average("Puma", 0.0)
            .build();
        let mut averages = AverageRanks::default();
        averages.push("Nike".to_string(), AverageRank::from_ranks([1]));
        averages.push("Puma".to_string(), AverageRank::Undefined);

        let diagnostics = upstream_mismatches(&experiment, &averages);
        assert_eq!(
            diagnostics,
            vec![Diagnostic::UpstreamAverageMismatch {
                brand: "Puma".to_string(),
                upstream: Some(0.0),
                computed: None,
            }]
        );
    }
}
