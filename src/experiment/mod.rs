//! Experiment data model
//!
//! ## Schema Overview
//!
//! ```text
//! Experiment (raw payload)
//!   ├── companies [ordered, unique]
//!   ├── categories [ordered, unique]
//!   └── results { category -> raw value }
//!                    │  normalize
//!                    ▼
//!              CategoryResult
//!                ├── rankings { brand -> rank }
//!                └── Metadata
//!                      ├──< Citation
//!                      └──< SearchResult
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use rank_insights::experiment::Experiment;
//!
//! let experiment = Experiment::builder(1)
//!     .companies(["Nike", "Adidas"])
//!     .categories(["Sneakers"])
//!     .result("Sneakers", serde_json::json!({"rankings": {"Nike": 1, "Adidas": 2}}))
//!     .build();
//!
//! assert_eq!(experiment.categories(), ["Sneakers"]);
//! ```

mod category_result;
mod experiment_record;
mod metadata;

pub use category_result::{CategoryResult, RankVariance};
pub use experiment_record::{Experiment, ExperimentBuilder, ExperimentId};
pub use metadata::{Citation, Metadata, Resource, SearchResult, Usage};
