//! Tests for config loading and the environment overlay.

use super::*;
use crate::{KeyStyle, ListStrategy};
use pretty_assertions::assert_eq;
use std::collections::HashMap;
use tempfile::TempDir;

fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> + use<> {
    let vars: HashMap<String, String> = pairs
        .iter()
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect();
    move |name| vars.get(name).cloned()
}

/// A minimal config parses with defaults.
#[test]
fn parse_minimal_config() {
    let config = CairnConfig::load_from_str("{}").expect("config");
    assert_eq!(config.memory.dimension, 1024);
    assert_eq!(config.memory.top_k, 20);
    assert_eq!(config.memory.key_style, KeyStyle::Prefixed);
    assert_eq!(config.memory.list_strategy, ListStrategy::Anchor);
    assert_eq!(config.media.max_inline_bytes, 20 * 1024 * 1024);
}

/// Reject unexpected top-level config keys.
#[test]
fn rejects_unknown_top_level_key() {
    let err = CairnConfig::load_from_str("{ unexpected: true }").unwrap_err();
    assert!(format!("{err}").contains("unknown field"));
}

/// Reject similarity thresholds outside [0, 1].
#[test]
fn rejects_out_of_range_min_score() {
    let err = CairnConfig::load_from_str("{ memory: { min_score: 1.5 } }").unwrap_err();
    assert!(format!("{err}").contains("memory.min_score"));
}

/// A missing explicit config file is an error naming the path.
#[test]
fn missing_config_file_names_path() {
    let temp = TempDir::new().expect("tmp");
    let path = temp.path().join("absent.json5");
    let err = CairnConfig::load_from_path(&path).unwrap_err();
    assert!(matches!(err, ConfigError::ReadFailed { .. }));
    assert!(err.to_string().contains("absent.json5"));
}

/// JSON5 syntax (comments, unquoted keys, trailing commas) is accepted.
#[test]
fn parses_json5_file() {
    let temp = TempDir::new().expect("tmp");
    let path = temp.path().join("cairn.json5");
    fs::write(
        &path,
        r#"{
            // memory settings
            memory: {
                vector_bucket_name: "file-bucket",
                list_strategy: "scan",
                key_style: "uuid",
            },
        }"#,
    )
    .expect("write");
    let config = CairnConfig::load_from_path(&path).expect("config");
    assert_eq!(
        config.memory.vector_bucket_name.as_deref(),
        Some("file-bucket")
    );
    assert_eq!(config.memory.list_strategy, ListStrategy::Scan);
    assert_eq!(config.memory.key_style, KeyStyle::Uuid);
}

/// Environment variables win over file values.
#[test]
fn environment_overrides_file() {
    let temp = TempDir::new().expect("tmp");
    let path = temp.path().join("cairn.json5");
    fs::write(
        &path,
        r#"{ memory: { vector_bucket_name: "file-bucket", index_name: "file-index" } }"#,
    )
    .expect("write");
    let lookup = lookup_from(&[(env::VECTOR_BUCKET_NAME, "env-bucket")]);
    let config = CairnConfig::load_with(Some(&path), lookup).expect("config");
    assert_eq!(
        config.memory.vector_bucket_name.as_deref(),
        Some("env-bucket")
    );
    assert_eq!(config.memory.index_name.as_deref(), Some("file-index"));
}

/// The config file can be named through `CAIRN_CONFIG`.
#[test]
fn config_path_from_environment() {
    let temp = TempDir::new().expect("tmp");
    let path = temp.path().join("custom.json5");
    fs::write(&path, r#"{ media: { model_id: "file-model" } }"#).expect("write");
    let path_str = path.to_string_lossy().to_string();
    let lookup = lookup_from(&[(env::CAIRN_CONFIG, path_str.as_str())]);
    let config = CairnConfig::load_with(None, lookup).expect("config");
    assert_eq!(config.media.model_id.as_deref(), Some("file-model"));
}

/// Media prefers `REGION_NAME`; memory reads `AWS_REGION`.
#[test]
fn region_variables_split_by_component() {
    let mut config = CairnConfig::default();
    config
        .apply_env_with(lookup_from(&[
            (env::REGION_NAME, "eu-west-1"),
            (env::AWS_REGION, "us-west-2"),
        ]))
        .expect("env");
    assert_eq!(config.media.region.as_deref(), Some("eu-west-1"));
    assert_eq!(config.memory.region.as_deref(), Some("us-west-2"));

    let mut config = CairnConfig::default();
    config
        .apply_env_with(lookup_from(&[(env::AWS_REGION, "us-west-2")]))
        .expect("env");
    assert_eq!(config.media.region.as_deref(), Some("us-west-2"));
}

/// The legacy index variable is used only when the new one is absent.
#[test]
fn legacy_index_variable_is_fallback() {
    let mut config = CairnConfig::default();
    config
        .apply_env_with(lookup_from(&[(env::VECTOR_INDEX, "legacy")]))
        .expect("env");
    assert_eq!(config.memory.index_name.as_deref(), Some("legacy"));

    let mut config = CairnConfig::default();
    config
        .apply_env_with(lookup_from(&[
            (env::VECTOR_INDEX, "legacy"),
            (env::VECTOR_INDEX_NAME, "current"),
        ]))
        .expect("env");
    assert_eq!(config.memory.index_name.as_deref(), Some("current"));
}

/// Setting a classification model turns classification on.
#[test]
fn classification_model_enables_classification() {
    let mut config = CairnConfig::default();
    config
        .apply_env_with(lookup_from(&[(env::CLASSIFICATION_MODEL, "classifier")]))
        .expect("env");
    assert!(config.memory.classification.enabled);
    assert_eq!(
        config.memory.classification.model_id.as_deref(),
        Some("classifier")
    );
}

/// Unknown list strategies are rejected with the variable name.
#[test]
fn rejects_unknown_list_strategy() {
    let mut config = CairnConfig::default();
    let err = config
        .apply_env_with(lookup_from(&[(env::MEMORY_LIST_STRATEGY, "everything")]))
        .unwrap_err();
    assert!(format!("{err}").contains(env::MEMORY_LIST_STRATEGY));
}

/// Blank variables do not clobber configured values.
#[test]
fn blank_variables_are_ignored() {
    let mut config = CairnConfig::default();
    config.memory.vector_bucket_name = Some("configured".to_string());
    config
        .apply_env_with(lookup_from(&[(env::VECTOR_BUCKET_NAME, "   ")]))
        .expect("env");
    assert_eq!(
        config.memory.vector_bucket_name.as_deref(),
        Some("configured")
    );
}
