//! Tests for the top-level InsightEngine API

use rank_insights::{EngineConfig, Error, InsightEngine};

#[test]
fn test_engine_builder() {
    // Test InsightEngine::builder() returns InsightEngineBuilder
    let _builder = InsightEngine::builder();
}

#[test]
fn test_engine_builder_chain() {
    let engine = InsightEngine::builder()
        .consistency_threshold(2.5)
        .check_upstream_averages(false)
        .build()
        .unwrap();

    assert!((engine.config().consistency_threshold - 2.5).abs() < f64::EPSILON);
    assert!(!engine.config().check_upstream_averages);
}

#[test]
fn test_engine_build_defaults() {
    let result = InsightEngine::builder().build();
    assert!(result.is_ok(), "Engine build should succeed");
    assert_eq!(result.unwrap().config(), &EngineConfig::default());
}

#[test]
fn test_engine_rejects_invalid_threshold() {
    for threshold in [0.0, 0.99, f64::NAN, f64::INFINITY] {
        let result = InsightEngine::builder()
            .consistency_threshold(threshold)
            .build();
        assert!(
            matches!(result, Err(Error::InvalidConfig(_))),
            "threshold {threshold} should be rejected"
        );
    }
}

#[test]
fn test_engine_with_config() {
    let config = EngineConfig::from_json(r#"{"check_upstream_averages": false}"#).unwrap();
    let engine = InsightEngine::with_config(config).unwrap();
    assert!(!engine.config().check_upstream_averages);
}

#[test]
fn test_engine_is_send_and_sync() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<InsightEngine>();
}
