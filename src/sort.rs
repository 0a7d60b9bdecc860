//! Sorter: deterministic total order of brands
//!
//! Brands are ordered by:
//!
//! 1. average rank ascending, undefined averages last;
//! 2. the first category (in declared order) where the two brands' ranks
//!    differ, lower rank first. A brand ranked in a category precedes a brand
//!    that is not; categories where neither is ranked are skipped;
//! 3. name, case-insensitively, then by exact code points.
//!
//! Step 2 is a lexicographic comparison of per-category rank vectors with
//! "unranked" as the largest value, which keeps the relation transitive.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use crate::aggregate::{AverageRank, AverageRanks};
use crate::experiment::CategoryResult;

/// Everything the comparator needs to order two brands.
#[derive(Debug, Clone, Copy)]
pub struct RankTable<'a> {
    categories: &'a [String],
    results: &'a BTreeMap<String, CategoryResult>,
    averages: &'a AverageRanks,
}

impl<'a> RankTable<'a> {
    /// Create a rank table over the surviving categories in declared order.
    #[must_use]
    pub const fn new(
        categories: &'a [String],
        results: &'a BTreeMap<String, CategoryResult>,
        averages: &'a AverageRanks,
    ) -> Self {
        Self {
            categories,
            results,
            averages,
        }
    }

    fn average(&self, brand: &str) -> AverageRank {
        self.averages.get(brand).unwrap_or(AverageRank::Undefined)
    }

    fn rank(&self, category: &str, brand: &str) -> Option<u32> {
        self.results.get(category).and_then(|result| result.rank(brand))
    }

    /// Compare two brands under the full tie-break chain.
    #[must_use]
    pub fn compare(&self, a: &str, b: &str) -> Ordering {
        self.average(a)
            .compare(self.average(b))
            .then_with(|| self.compare_by_category(a, b))
            .then_with(|| compare_names(a, b))
    }

    fn compare_by_category(&self, a: &str, b: &str) -> Ordering {
        for category in self.categories {
            let ordering = match (self.rank(category, a), self.rank(category, b)) {
                (Some(ra), Some(rb)) => ra.cmp(&rb),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            };
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        Ordering::Equal
    }

    /// Sort brands best-first.
    #[must_use]
    pub fn sort(&self, brands: &[String]) -> Vec<String> {
        let mut sorted = brands.to_vec();
        sorted.sort_by(|a, b| self.compare(a, b));
        sorted
    }
}

/// Case-insensitive code-point order, falling back to exact code points so
/// that names differing only in case still compare unequal.
#[must_use]
pub fn compare_names(a: &str, b: &str) -> Ordering {
    a.chars()
        .flat_map(char::to_lowercase)
        .cmp(b.chars().flat_map(char::to_lowercase))
        .then_with(|| a.cmp(b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::average_ranks;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(ToString::to_string).collect()
    }

    fn fixture(rows: &[(&str, &[(&str, u32)])]) -> (Vec<String>, BTreeMap<String, CategoryResult>) {
        let categories = rows.iter().map(|(c, _)| (*c).to_string()).collect();
        let results = rows
            .iter()
            .map(|(c, ranks)| ((*c).to_string(), CategoryResult::new(ranks.iter().copied())))
            .collect();
        (categories, results)
    }

    #[test]
    fn test_tie_broken_by_first_category() {
        let brands = names(&["Puma", "Adidas", "Nike"]);
        let (categories, results) = fixture(&[
            ("Sneakers", &[("Nike", 1), ("Adidas", 2), ("Puma", 3)]),
            ("Running", &[("Nike", 2), ("Adidas", 1), ("Puma", 3)]),
        ]);
        let averages = average_ranks(&brands, &categories, &results);
        let table = RankTable::new(&categories, &results, &averages);

        assert_eq!(table.sort(&brands), ["Nike", "Adidas", "Puma"]);

        // Swapping category order flips the tie
        let swapped = names(&["Running", "Sneakers"]);
        let table = RankTable::new(&swapped, &results, &averages);
        assert_eq!(table.sort(&brands), ["Adidas", "Nike", "Puma"]);
    }

    #[test]
    fn test_undefined_average_sorts_last() {
        let brands = names(&["Ghost", "Nike", "Puma"]);
        let (categories, results) = fixture(&[("Sneakers", &[("Nike", 2), ("Puma", 9)])]);
        let averages = average_ranks(&brands, &categories, &results);
        let table = RankTable::new(&categories, &results, &averages);

        assert_eq!(table.sort(&brands), ["Nike", "Puma", "Ghost"]);
    }

    #[test]
    fn test_name_fallback_is_case_insensitive() {
        let brands = names(&["zara", "Asos", "asos"]);
        let (categories, results) = fixture(&[]);
        let averages = average_ranks(&brands, &categories, &results);
        let table = RankTable::new(&categories, &results, &averages);

        assert_eq!(table.sort(&brands), ["Asos", "asos", "zara"]);
    }

    #[test]
    fn test_ranked_beats_unranked_when_averages_tie() {
        // A (1,3) B (-,2) C (3,1): all average 2
        let brands = names(&["A", "B", "C"]);
        let (categories, results) = fixture(&[
            ("c1", &[("A", 1), ("C", 3)]),
            ("c2", &[("A", 3), ("B", 2), ("C", 1)]),
        ]);
        let averages = average_ranks(&brands, &categories, &results);
        let table = RankTable::new(&categories, &results, &averages);

        assert_eq!(table.compare("A", "C"), Ordering::Less);
        assert_eq!(table.compare("C", "B"), Ordering::Less);
        assert_eq!(table.compare("A", "B"), Ordering::Less);
        assert_eq!(table.sort(&brands), ["A", "C", "B"]);
    }
}
