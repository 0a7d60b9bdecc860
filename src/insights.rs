//! InsightGenerator: winners, gaps, competitiveness and consistency
//!
//! All insights are derived from the sorted brand list and the surviving
//! category results. An experiment with no brands or no categories yields
//! [`AggregateInsights::default`], the "no data" state.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use serde::Serialize;

use crate::aggregate::{AverageRank, AverageRanks};
use crate::experiment::{CategoryResult, RankVariance};
use crate::sort::compare_names;

/// A brand together with its (defined) average rank.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BrandScore {
    /// Brand name
    pub brand: String,
    /// Mean rank over the categories the brand was ranked in
    pub average_rank: f64,
    /// Number of categories contributing to the mean
    pub category_count: u32,
}

/// The brand holding rank 1 in a category, if any.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryWinner {
    /// Category name
    pub category: String,
    /// Brand with rank 1; `None` when nobody holds rank 1
    pub brand: Option<String>,
}

/// Distance of a brand's average rank from the overall winner's.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PerformanceGap {
    /// Brand name
    pub brand: String,
    /// The brand's average rank
    pub average_rank: f64,
    /// `average_rank - winner average`; 0 means tied for first
    pub gap: f64,
}

/// The category whose ranks are most spread out.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompetitiveCategory {
    /// Category name
    pub category: String,
    /// Population variance of the category's ranks
    pub variance: f64,
}

/// Best/worst summary of one category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryPerformance {
    /// Category name
    pub category: String,
    /// Brand with the lowest rank
    pub best_brand: Option<String>,
    /// Brand with the highest rank
    pub worst_brand: Option<String>,
    /// Highest rank minus lowest rank (0 for fewer than two brands)
    pub rank_spread: u32,
    /// Number of ranked brands
    pub ranked_brands: usize,
}

/// Derived insights over a whole experiment.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AggregateInsights {
    /// Brand with the best defined average rank
    pub overall_winner: Option<BrandScore>,
    /// Rank-1 holder per category, in declared category order
    pub category_winners: Vec<CategoryWinner>,
    /// Gap from the winner for every brand with a defined average, ascending
    pub performance_gaps: Vec<PerformanceGap>,
    /// Category with the highest rank variance
    pub most_competitive_category: Option<CompetitiveCategory>,
    /// Brands whose average rank is within the consistency threshold
    pub consistent_performers: Vec<BrandScore>,
    /// Best/worst summary per category, in declared category order
    pub category_performance: Vec<CategoryPerformance>,
}

impl AggregateInsights {
    /// True for the "no data" state.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.overall_winner.is_none()
            && self.category_winners.is_empty()
            && self.performance_gaps.is_empty()
            && self.most_competitive_category.is_none()
            && self.consistent_performers.is_empty()
            && self.category_performance.is_empty()
    }
}

/// Compute all insights.
///
/// `sorted_brands` must be in sorter order; the winner and every tie in the
/// gap and consistency lists inherit that order.
#[must_use]
pub fn generate(
    sorted_brands: &[String],
    categories: &[String],
    results: &BTreeMap<String, CategoryResult>,
    averages: &AverageRanks,
    consistency_threshold: f64,
) -> AggregateInsights {
    if sorted_brands.is_empty() || categories.is_empty() {
        return AggregateInsights::default();
    }

    let scores: Vec<(BrandScore, AverageRank)> = sorted_brands
        .iter()
        .filter_map(|brand| {
            let average = averages.get(brand)?;
            let score = brand_score(brand, average)?;
            Some((score, average))
        })
        .collect();

    let overall_winner = scores.first().map(|(score, _)| score.clone());
    let performance_gaps = scores.first().map_or_else(Vec::new, |(leader, leader_avg)| {
        scores
            .iter()
            .map(|(score, average)| PerformanceGap {
                brand: score.brand.clone(),
                average_rank: score.average_rank,
                gap: if average.compare(*leader_avg) == Ordering::Equal {
                    0.0
                } else {
                    score.average_rank - leader.average_rank
                },
            })
            .collect()
    });
    let consistent_performers = scores
        .iter()
        .filter(|(score, _)| score.average_rank <= consistency_threshold)
        .map(|(score, _)| score.clone())
        .collect();

    let category_winners = surviving(categories, results)
        .map(|(category, result)| CategoryWinner {
            category: category.clone(),
            brand: result.winner().map(ToString::to_string),
        })
        .collect();
    let category_performance = surviving(categories, results)
        .map(|(category, result)| summarize_category(category, result))
        .collect();
    let most_competitive_category = most_competitive(surviving(categories, results));

    let insights = AggregateInsights {
        overall_winner,
        category_winners,
        performance_gaps,
        most_competitive_category,
        consistent_performers,
        category_performance,
    };
    tracing::debug!(
        winner = ?insights.overall_winner.as_ref().map(|w| w.brand.as_str()),
        competitive = ?insights
            .most_competitive_category
            .as_ref()
            .map(|c| c.category.as_str()),
        consistent = insights.consistent_performers.len(),
        "generated insights"
    );
    insights
}

/// Surviving categories paired with their results, in declared order.
fn surviving<'a>(
    categories: &'a [String],
    results: &'a BTreeMap<String, CategoryResult>,
) -> impl Iterator<Item = (&'a String, &'a CategoryResult)> + 'a {
    categories
        .iter()
        .filter_map(move |category| results.get(category).map(|result| (category, result)))
}

fn brand_score(brand: &str, average: AverageRank) -> Option<BrandScore> {
    Some(BrandScore {
        brand: brand.to_string(),
        average_rank: average.value()?,
        category_count: average.category_count(),
    })
}

/// Highest population variance wins; the earliest declared category wins ties.
fn most_competitive<'a, I>(categories: I) -> Option<CompetitiveCategory>
where
    I: Iterator<Item = (&'a String, &'a CategoryResult)>,
{
    let mut best: Option<(&'a String, RankVariance)> = None;
    for (category, result) in categories {
        let Some(variance) = result.rank_variance() else {
            continue;
        };
        if best.map_or(true, |(_, current)| variance.compare(current) == Ordering::Greater) {
            best = Some((category, variance));
        }
    }
    best.map(|(category, variance)| CompetitiveCategory {
        category: category.clone(),
        variance: variance.value(),
    })
}

fn summarize_category(category: &str, result: &CategoryResult) -> CategoryPerformance {
    let by_rank = |a: &(&String, &u32), b: &(&String, &u32)| {
        a.1.cmp(b.1).then_with(|| compare_names(a.0, b.0))
    };
    let best = result.rankings().iter().min_by(by_rank);
    let worst = result.rankings().iter().max_by(by_rank);
    let rank_spread = match (best, worst) {
        (Some((_, &lo)), Some((_, &hi))) => hi - lo,
        _ => 0,
    };
    CategoryPerformance {
        category: category.to_string(),
        best_brand: best.map(|(brand, _)| brand.clone()),
        worst_brand: worst.map(|(brand, _)| brand.clone()),
        rank_spread,
        ranked_brands: result.len(),
    }
}

/// Qualitative label for a single-category rank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PerformanceLevel {
    /// Rank 1
    Excellent,
    /// Rank 2
    Good,
    /// Rank 3
    Average,
    /// Rank 4 or worse
    BelowAverage,
}

impl PerformanceLevel {
    /// Label a rank.
    #[must_use]
    pub const fn from_rank(rank: u32) -> Self {
        match rank {
            0 | 1 => Self::Excellent,
            2 => Self::Good,
            3 => Self::Average,
            _ => Self::BelowAverage,
        }
    }
}

/// How one brand fared in one category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryStanding {
    /// Category name
    pub category: String,
    /// Rank in the category, `None` when unranked
    pub rank: Option<u32>,
    /// Label for the rank
    pub performance_level: Option<PerformanceLevel>,
    /// `rank/ranked-brands`, e.g. `"2/5"`
    pub relative_position: Option<String>,
    /// Places to climb to reach rank 1
    pub positions_to_top: Option<u32>,
    /// Per-brand rationale supplied by the ranking service
    pub reason: Option<String>,
}

/// Per-category detail for one brand.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BrandBreakdown {
    /// Brand name
    pub brand: String,
    /// 1-based position in sorter order
    pub position: usize,
    /// Average rank (`null` when undefined)
    pub average_rank: AverageRank,
    /// Standing in each surviving category, in declared order
    pub standings: Vec<CategoryStanding>,
}

/// Build the per-category breakdown for one brand.
#[must_use]
pub fn brand_breakdown(
    brand: &str,
    position: usize,
    average_rank: AverageRank,
    categories: &[String],
    results: &BTreeMap<String, CategoryResult>,
) -> BrandBreakdown {
    let standings = surviving(categories, results)
        .map(|(category, result)| {
            let rank = result.rank(brand);
            CategoryStanding {
                category: category.clone(),
                rank,
                performance_level: rank.map(PerformanceLevel::from_rank),
                relative_position: rank.map(|r| format!("{r}/{}", result.len())),
                positions_to_top: rank.map(|r| r.saturating_sub(1)),
                reason: result.brand_reason(brand).map(ToString::to_string),
            }
        })
        .collect();
    BrandBreakdown {
        brand: brand.to_string(),
        position,
        average_rank,
        standings,
    }
}
