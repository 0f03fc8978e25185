// SPDX-FileCopyrightText: 2026 Glance Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints serde cannot express, most importantly
//! the deadline ordering invariant: the orchestrator's watchdog must fire
//! strictly before the transport's own timeout.

use crate::diagnostic::ConfigError;
use crate::model::GlanceConfig;

const KNOWN_LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration for semantic correctness.
///
/// Collects all validation errors instead of failing fast.
pub fn validate_config(config: &GlanceConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if !KNOWN_LOG_LEVELS.contains(&config.assistant.log_level.as_str()) {
        errors.push(ConfigError::Validation {
            message: format!(
                "assistant.log_level `{}` is not one of: {}",
                config.assistant.log_level,
                KNOWN_LOG_LEVELS.join(", ")
            ),
        });
    }

    if config.openai.model.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "openai.model must not be empty".to_string(),
        });
    }

    if config.retry.max_attempts < 1 {
        errors.push(ConfigError::Validation {
            message: format!(
                "retry.max_attempts must be at least 1, got {}",
                config.retry.max_attempts
            ),
        });
    }

    if config.retry.watchdog_secs < 1 {
        errors.push(ConfigError::Validation {
            message: "retry.watchdog_secs must be at least 1".to_string(),
        });
    }

    // The watchdog must win the race against the transport's own timeout,
    // otherwise a hung call is surfaced by the wrong layer.
    if config.retry.watchdog_secs >= config.retry.request_timeout_secs {
        errors.push(ConfigError::Validation {
            message: format!(
                "retry.watchdog_secs ({}) must be strictly less than retry.request_timeout_secs ({})",
                config.retry.watchdog_secs, config.retry.request_timeout_secs
            ),
        });
    }

    if config.budget.response_floor < 1 {
        errors.push(ConfigError::Validation {
            message: "budget.response_floor must be at least 1".to_string(),
        });
    }

    if config.budget.response_floor > config.budget.response_ceiling {
        errors.push(ConfigError::Validation {
            message: format!(
                "budget.response_floor ({}) must not exceed budget.response_ceiling ({})",
                config.budget.response_floor, config.budget.response_ceiling
            ),
        });
    }

    if config.budget.buffer_tokens >= config.budget.total_ceiling {
        errors.push(ConfigError::Validation {
            message: format!(
                "budget.buffer_tokens ({}) must be smaller than budget.total_ceiling ({})",
                config.budget.buffer_tokens, config.budget.total_ceiling
            ),
        });
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}
