//! Category Result - canonical rankings for one category

use std::cmp::Ordering;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::Metadata;

/// Canonical ranking result for a single category.
///
/// Ranks are positive integers, 1 = best. Uniqueness of ranks within a
/// category is an upstream guarantee and is not re-validated here.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CategoryResult {
    rankings: BTreeMap<String, u32>,
    #[serde(default)]
    reason: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    brand_reasons: BTreeMap<String, String>,
    #[serde(default)]
    metadata: Metadata,
}

impl CategoryResult {
    /// Create a category result from brand/rank pairs.
    #[must_use]
    pub fn new<I, S>(rankings: I) -> Self
    where
        I: IntoIterator<Item = (S, u32)>,
        S: Into<String>,
    {
        Self {
            rankings: rankings
                .into_iter()
                .map(|(brand, rank)| (brand.into(), rank))
                .collect(),
            ..Self::default()
        }
    }

    /// Set the category-level rationale.
    #[must_use]
    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = reason.into();
        self
    }

    /// Set the citation/search-result metadata.
    #[must_use]
    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = metadata;
        self
    }

    /// Set the rationale the service gave for one brand's rank.
    #[must_use]
    pub fn with_brand_reason(mut self, brand: impl Into<String>, reason: impl Into<String>) -> Self {
        self.brand_reasons.insert(brand.into(), reason.into());
        self
    }

    /// Rank of a brand in this category, if it was ranked.
    #[must_use]
    pub fn rank(&self, brand: &str) -> Option<u32> {
        self.rankings.get(brand).copied()
    }

    /// All brand/rank pairs.
    #[must_use]
    pub const fn rankings(&self) -> &BTreeMap<String, u32> {
        &self.rankings
    }

    /// Number of ranked brands.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rankings.len()
    }

    /// True when no brand was ranked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rankings.is_empty()
    }

    /// Free-text rationale for the whole category.
    #[must_use]
    pub fn reason(&self) -> &str {
        &self.reason
    }

    /// Rationale for one brand, when the service supplied per-brand reasons.
    #[must_use]
    pub fn brand_reason(&self, brand: &str) -> Option<&str> {
        self.brand_reasons.get(brand).map(String::as_str)
    }

    /// Citation/search-result metadata.
    #[must_use]
    pub const fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    /// The brand holding rank 1, if any.
    #[must_use]
    pub fn winner(&self) -> Option<&str> {
        self.rankings
            .iter()
            .find(|&(_, &rank)| rank == 1)
            .map(|(brand, _)| brand.as_str())
    }

    /// Population variance of the ranks (divisor = number of ranked brands).
    ///
    /// `None` when the category has no ranks.
    #[must_use]
    pub fn rank_variance(&self) -> Option<RankVariance> {
        RankVariance::from_ranks(self.rankings.values().copied())
    }
}

/// Population variance of a set of ranks, kept as an exact fraction.
///
/// `n·Σr² − (Σr)²` over `n²`, reduced. Two categories with the same rank
/// multiset always compare equal, whatever order the ranks were summed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RankVariance {
    numerator: u128,
    denominator: u128,
}

impl RankVariance {
    /// Variance of a set of ranks; `None` for an empty set.
    #[must_use]
    pub fn from_ranks<I>(ranks: I) -> Option<Self>
    where
        I: IntoIterator<Item = u32>,
    {
        let (n, sum, sum_sq) = ranks
            .into_iter()
            .fold((0u128, 0u128, 0u128), |(n, sum, sum_sq), rank| {
                let r = u128::from(rank);
                (n + 1, sum + r, sum_sq + r * r)
            });
        if n == 0 {
            return None;
        }
        // n·Σr² ≥ (Σr)² for any set of reals
        let numerator = n * sum_sq - sum * sum;
        let denominator = n * n;
        let divisor = gcd(numerator, denominator);
        Some(Self {
            numerator: numerator / divisor,
            denominator: denominator / divisor,
        })
    }

    /// The variance as a float, for display.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn value(self) -> f64 {
        self.numerator as f64 / self.denominator as f64
    }

    /// Compare two variances exactly.
    #[must_use]
    pub fn compare(self, other: Self) -> Ordering {
        (self.numerator * other.denominator).cmp(&(other.numerator * self.denominator))
    }
}

const fn gcd(mut a: u128, mut b: u128) -> u128 {
    while b != 0 {
        let t = a % b;
        a = b;
        b = t;
    }
    a
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_winner_requires_rank_one() {
        let result = CategoryResult::new([("Nike", 2), ("Adidas", 3)]);
        assert_eq!(result.winner(), None);

        let result = CategoryResult::new([("Nike", 2), ("Adidas", 1)]);
        assert_eq!(result.winner(), Some("Adidas"));
    }

    #[test]
    fn test_population_variance() {
        let result = CategoryResult::new([("A", 1), ("B", 2), ("C", 3)]);
        let variance = result.rank_variance().unwrap();
        assert!((variance.value() - 2.0 / 3.0).abs() < 1e-12);

        assert_eq!(CategoryResult::default().rank_variance(), None);
        let single = CategoryResult::new([("A", 4)]).rank_variance().unwrap();
        assert_eq!(single.value(), 0.0);
    }

    #[test]
    fn test_variance_is_order_independent() {
        // {1, 2, 4} in different brand orders
        let first = CategoryResult::new([("a", 1), ("b", 2), ("c", 4)]);
        let second = CategoryResult::new([("a", 4), ("b", 1), ("c", 2)]);
        let v1 = first.rank_variance().unwrap();
        let v2 = second.rank_variance().unwrap();

        assert_eq!(v1, v2);
        assert_eq!(v1.compare(v2), Ordering::Equal);
        assert!((v1.value() - 14.0 / 9.0).abs() < 1e-12);
    }

    #[test]
    fn test_variance_compare() {
        let low = RankVariance::from_ranks([1, 2]).unwrap();
        let high = RankVariance::from_ranks([1, 5]).unwrap();
        assert_eq!(low.compare(high), Ordering::Less);
        assert_eq!(high.compare(low), Ordering::Greater);
        assert_eq!(RankVariance::from_ranks([]), None);
    }
}
