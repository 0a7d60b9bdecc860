//! Insights Report Example
//!
//! Analyzes a ranking-service payload and prints the derived view.
//!
//! Run with: RUST_LOG=rank_insights=debug cargo run --example insights_report

use rank_insights::experiment::Experiment;
use rank_insights::InsightEngine;
use tracing_subscriber::EnvFilter;

const PAYLOAD: &str = r#"{
    "id": 17,
    "companies": ["Nike", "Adidas", "Puma", "Reebok"],
    "categories": ["Sneakers", "Running", "Sustainability"],
    "results": {
        "Sneakers": {
            "rankings": {"Nike": 1, "Adidas": 2, "Puma": 3},
            "reason": "Nike leads in design and cultural relevance",
            "metadata": {
                "citations": [{"title": "Sneaker market 2025", "url": "https://example.com/sneakers"}],
                "usage": {"prompt_tokens": 80, "completion_tokens": 70, "total_tokens": 150},
                "model": "sonar-pro"
            }
        },
        "Running": {
            "rankings": [
                {"company": "Adidas", "rank": 1, "reason": "Boost cushioning"},
                {"company": "Nike", "rank": 2, "reason": "Wide range"},
                {"company": "Puma", "rank": 3, "reason": "Improving fast"}
            ],
            "citations": ["https://example.com/sneakers", "https://example.com/running"]
        },
        "Sustainability": "ranking unavailable"
    },
    "average_ranks": {"Nike": 1.5, "Adidas": 1.5, "Puma": 3.0, "Reebok": 0.0},
    "created_at": "2025-02-03T10:00:00"
}"#;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("=== rank-insights Report ===\n");

    let experiment = Experiment::from_json(PAYLOAD)?;
    let engine = InsightEngine::builder().consistency_threshold(2.0).build()?;
    let analysis = engine.analyze(&experiment);

    println!("1. Ranking (best first)");
    for (position, brand) in analysis.sorted_brands().iter().enumerate() {
        let average = analysis
            .average_rank(brand)?
            .value()
            .map_or_else(|| "n/a".to_string(), |v| format!("{v:.2}"));
        println!("   {}. {brand:<8} avg {average}", position + 1);
    }

    let insights = analysis.insights();
    println!("\n2. Insights");
    if let Some(winner) = &insights.overall_winner {
        println!("   Overall winner: {} ({:.2})", winner.brand, winner.average_rank);
    }
    for winner in &insights.category_winners {
        println!(
            "   {}: {}",
            winner.category,
            winner.brand.as_deref().unwrap_or("no rank-1 brand")
        );
    }
    for gap in &insights.performance_gaps {
        println!("   gap {:<8} +{:.2}", gap.brand, gap.gap);
    }
    if let Some(competitive) = &insights.most_competitive_category {
        println!(
            "   Most competitive: {} (variance {:.3})",
            competitive.category, competitive.variance
        );
    }

    println!("\n3. Resources");
    for citation in &analysis.resources().unique_citations {
        println!("   {} <{}>", citation.title, citation.url);
    }
    println!("   total tokens: {}", analysis.usage().total_tokens);

    println!("\n4. Diagnostics");
    for diagnostic in analysis.diagnostics() {
        println!("   - {diagnostic}");
    }

    println!("\n5. JSON view");
    println!("{}", serde_json::to_string_pretty(&analysis)?);

    Ok(())
}
