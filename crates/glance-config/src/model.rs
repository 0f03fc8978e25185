// SPDX-FileCopyrightText: 2026 Glance Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for Glance.
//!
//! All structs use `#[serde(deny_unknown_fields)]` so a typoed key fails at
//! startup with a diagnostic instead of being silently ignored.

use serde::{Deserialize, Serialize};

/// Top-level Glance configuration.
///
/// Loaded from TOML files following the XDG hierarchy, with environment
/// variable overrides. Every section is optional and defaults to sensible
/// values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GlanceConfig {
    /// Assistant identity and logging.
    #[serde(default)]
    pub assistant: AssistantConfig,

    /// OpenAI API settings.
    #[serde(default)]
    pub openai: OpenAiConfig,

    /// Retry and deadline policy for the request pipeline.
    #[serde(default)]
    pub retry: RetryConfig,

    /// Token budget planning parameters.
    #[serde(default)]
    pub budget: BudgetConfig,

    /// Prompt overrides.
    #[serde(default)]
    pub prompt: PromptConfig,
}

/// Assistant identity and logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AssistantConfig {
    /// Display name of the assistant.
    #[serde(default = "default_assistant_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            name: default_assistant_name(),
            log_level: default_log_level(),
        }
    }
}

fn default_assistant_name() -> String {
    "glance".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// OpenAI API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct OpenAiConfig {
    /// OpenAI API key. `None` falls back to the `OPENAI_API_KEY` env var.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Model used for requests.
    #[serde(default = "default_model")]
    pub model: String,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: default_model(),
        }
    }
}

fn default_model() -> String {
    "gpt-4o".to_string()
}

/// Retry and deadline policy configuration.
///
/// `watchdog_secs` must be strictly less than `request_timeout_secs`: the
/// orchestrator's watchdog has to fire before the transport's own timeout.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RetryConfig {
    /// Total attempts per request.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// First backoff delay in seconds; doubles per further retry.
    #[serde(default = "default_base_delay_secs")]
    pub base_delay_secs: u64,

    /// Wall-clock bound on waiting for a single attempt, in seconds.
    #[serde(default = "default_watchdog_secs")]
    pub watchdog_secs: u64,

    /// Per-call timeout handed to the transport, in seconds.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            base_delay_secs: default_base_delay_secs(),
            watchdog_secs: default_watchdog_secs(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

fn default_max_attempts() -> u32 {
    3
}

fn default_base_delay_secs() -> u64 {
    2
}

fn default_watchdog_secs() -> u64 {
    40
}

fn default_request_timeout_secs() -> u64 {
    60
}

/// Token budget planning configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct BudgetConfig {
    /// Fixed total context ceiling in tokens.
    #[serde(default = "default_total_ceiling")]
    pub total_ceiling: u32,

    /// Reserve subtracted for wire overhead and estimate error.
    #[serde(default = "default_buffer_tokens")]
    pub buffer_tokens: u32,

    /// Minimum response tokens requested.
    #[serde(default = "default_response_floor")]
    pub response_floor: u32,

    /// Maximum response tokens requested.
    #[serde(default = "default_response_ceiling")]
    pub response_ceiling: u32,
}

impl Default for BudgetConfig {
    fn default() -> Self {
        Self {
            total_ceiling: default_total_ceiling(),
            buffer_tokens: default_buffer_tokens(),
            response_floor: default_response_floor(),
            response_ceiling: default_response_ceiling(),
        }
    }
}

fn default_total_ceiling() -> u32 {
    32_000
}

fn default_buffer_tokens() -> u32 {
    1_500
}

fn default_response_floor() -> u32 {
    1_000
}

fn default_response_ceiling() -> u32 {
    4_000
}

/// Prompt override configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PromptConfig {
    /// Inline system prompt. Overridden by `system_prompt_file` if both set.
    #[serde(default)]
    pub system_prompt: Option<String>,

    /// Path to a file containing the system prompt. Takes precedence over
    /// `system_prompt` when both are set and the file is readable.
    #[serde(default)]
    pub system_prompt_file: Option<String>,

    /// Extra instructions appended to every request's system prompt.
    #[serde(default)]
    pub custom_instructions: Option<String>,
}
