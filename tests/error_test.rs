//! Tests for error types

use rank_insights::{EngineConfig, Error};

#[test]
fn test_unknown_category_error() {
    let error = Error::UnknownCategory("Laptops".to_string());
    let error_str = format!("{error}");
    assert!(error_str.contains("Unknown category: Laptops"));
    assert!(error_str.contains("declared by the experiment"));
}

#[test]
fn test_unknown_brand_error() {
    let error = Error::UnknownBrand("Reebok".to_string());
    let error_str = format!("{error}");
    assert!(error_str.contains("Unknown brand: Reebok"));
}

#[test]
fn test_invalid_config_error() {
    let error = Error::InvalidConfig("threshold too low".to_string());
    let error_str = format!("{error}");
    assert!(error_str.contains("Invalid configuration"));
    assert!(error_str.contains("threshold too low"));
}

#[test]
fn test_json_error_conversion() {
    let json_error = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
    let error: Error = json_error.into();
    let error_str = format!("{error}");
    assert!(error_str.contains("JSON error"));
}

#[test]
fn test_config_from_bad_json() {
    let result = EngineConfig::from_json(r#"{"consistency_threshold": "high"}"#);
    assert!(matches!(result, Err(Error::Json(_))));
}

#[test]
fn test_experiment_with_wrong_top_level_types() {
    let result = rank_insights::experiment::Experiment::from_json(r#"{"companies": "Nike"}"#);
    assert!(matches!(result, Err(Error::Json(_))));
}

#[test]
fn test_error_debug() {
    let error = Error::UnknownBrand("x".to_string());
    let debug_str = format!("{error:?}");
    assert!(debug_str.contains("UnknownBrand"));
}
