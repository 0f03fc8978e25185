// SPDX-FileCopyrightText: 2026 Glance Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the Glance configuration system.

use glance_config::diagnostic::{ConfigError, suggest_key};
use glance_config::model::GlanceConfig;
use glance_config::{load_and_validate_str, load_config_from_str};

/// Valid TOML with all known fields deserializes successfully.
#[test]
fn valid_toml_deserializes_into_glance_config() {
    let toml = r#"
[assistant]
name = "test-assistant"
log_level = "debug"

[openai]
api_key = "sk-test-123"
model = "gpt-4o-mini"

[retry]
max_attempts = 5
base_delay_secs = 1
watchdog_secs = 20
request_timeout_secs = 30

[budget]
total_ceiling = 16000
buffer_tokens = 800
response_floor = 500
response_ceiling = 2000

[prompt]
system_prompt = "Answer briefly."
custom_instructions = "Prefer bullet points."
"#;

    let config = load_config_from_str(toml).expect("valid TOML should deserialize");
    assert_eq!(config.assistant.name, "test-assistant");
    assert_eq!(config.assistant.log_level, "debug");
    assert_eq!(config.openai.api_key.as_deref(), Some("sk-test-123"));
    assert_eq!(config.openai.model, "gpt-4o-mini");
    assert_eq!(config.retry.max_attempts, 5);
    assert_eq!(config.retry.watchdog_secs, 20);
    assert_eq!(config.budget.total_ceiling, 16_000);
    assert_eq!(config.budget.response_ceiling, 2_000);
    assert_eq!(config.prompt.system_prompt.as_deref(), Some("Answer briefly."));
    assert_eq!(
        config.prompt.custom_instructions.as_deref(),
        Some("Prefer bullet points.")
    );
}

/// Unknown field in a section produces an error naming the bad key.
#[test]
fn unknown_field_produces_error() {
    let toml = r#"
[retry]
max_attemps = 5
"#;

    let err = load_config_from_str(toml).expect_err("should reject unknown field");
    let err_str = format!("{err}");
    assert!(
        err_str.contains("unknown field") || err_str.contains("max_attemps"),
        "error should mention the bad key, got: {err_str}"
    );
}

/// Missing optional sections use defaults without error.
#[test]
fn missing_optional_sections_use_defaults() {
    let config = load_config_from_str("").expect("empty TOML should use defaults");

    assert_eq!(config.assistant.name, "glance");
    assert_eq!(config.assistant.log_level, "info");
    assert!(config.openai.api_key.is_none());
    assert_eq!(config.openai.model, "gpt-4o");
    assert_eq!(config.retry.max_attempts, 3);
    assert_eq!(config.retry.base_delay_secs, 2);
    assert_eq!(config.retry.watchdog_secs, 40);
    assert_eq!(config.retry.request_timeout_secs, 60);
    assert_eq!(config.budget.total_ceiling, 32_000);
    assert!(config.prompt.system_prompt.is_none());
    assert!(config.prompt.system_prompt_file.is_none());
}

/// Dot-notation overrides (how `GLANCE_OPENAI_MODEL` lands after env
/// mapping) take precedence over TOML values.
#[test]
fn dotted_override_beats_toml() {
    use figment::{
        Figment,
        providers::{Format, Serialized, Toml},
    };

    let toml_content = r#"
[openai]
model = "from-toml"
"#;

    let config: GlanceConfig = Figment::new()
        .merge(Serialized::defaults(GlanceConfig::default()))
        .merge(Toml::string(toml_content))
        .merge(("openai.model", "from-env"))
        .extract()
        .expect("should merge override");

    assert_eq!(config.openai.model, "from-env");
}

/// Underscore-containing keys map to the right section key, not a nested one.
#[test]
fn dotted_override_handles_underscore_keys() {
    use figment::{Figment, providers::Serialized};

    let config: GlanceConfig = Figment::new()
        .merge(Serialized::defaults(GlanceConfig::default()))
        .merge(("openai.api_key", "sk-from-env"))
        .extract()
        .expect("should set api_key via dot notation");

    assert_eq!(config.openai.api_key.as_deref(), Some("sk-from-env"));
}

/// The full load-and-validate path rejects a config that parses but breaks
/// the deadline invariant.
#[test]
fn validation_rejects_watchdog_not_shorter_than_request_timeout() {
    let toml = r#"
[retry]
watchdog_secs = 60
request_timeout_secs = 60
"#;

    let errors = load_and_validate_str(toml).expect_err("should fail validation");
    assert!(errors.iter().any(|e| matches!(
        e,
        ConfigError::Validation { message } if message.contains("watchdog_secs")
    )));
}

/// Typoed keys come back with a usable suggestion.
#[test]
fn typo_suggestions_cover_the_retry_section() {
    let valid = &[
        "max_attempts",
        "base_delay_secs",
        "watchdog_secs",
        "request_timeout_secs",
    ];
    assert_eq!(
        suggest_key("max_attemps", valid),
        Some("max_attempts".to_string())
    );
    assert_eq!(
        suggest_key("request_timeout", valid),
        Some("request_timeout_secs".to_string())
    );
}

/// A fully valid config passes load_and_validate_str end to end.
#[test]
fn valid_config_passes_end_to_end() {
    let toml = r#"
[assistant]
log_level = "warn"

[retry]
watchdog_secs = 10
request_timeout_secs = 15
"#;
    let config = load_and_validate_str(toml).expect("should load and validate");
    assert_eq!(config.assistant.log_level, "warn");
    assert_eq!(config.retry.watchdog_secs, 10);
}
