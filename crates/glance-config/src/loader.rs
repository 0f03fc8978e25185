// SPDX-FileCopyrightText: 2026 Glance Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports the XDG hierarchy: `./glance.toml` > `~/.config/glance/glance.toml`
//! > `/etc/glance/glance.toml`, with environment variable overrides via the
//! `GLANCE_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::GlanceConfig;

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/glance/glance.toml` (system-wide)
/// 3. `~/.config/glance/glance.toml` (user XDG config)
/// 4. `./glance.toml` (local directory)
/// 5. `GLANCE_*` environment variables
pub fn load_config() -> Result<GlanceConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env).
///
/// Used for testing and explicit configuration.
pub fn load_config_from_str(toml_content: &str) -> Result<GlanceConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(GlanceConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<GlanceConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(GlanceConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the Figment used for the standard hierarchy (exposed for
/// diagnostic use, before extraction).
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(GlanceConfig::default()))
        .merge(Toml::file("/etc/glance/glance.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("glance/glance.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("glance.toml"))
        .merge(env_provider())
}

/// Environment variable provider with explicit section mapping.
///
/// Uses `Env::map()` rather than `Env::split("_")` so key names containing
/// underscores stay unambiguous: `GLANCE_OPENAI_API_KEY` must map to
/// `openai.api_key`, not `openai.api.key`.
fn env_provider() -> Env {
    Env::prefixed("GLANCE_").map(|key| {
        let mapped = key
            .as_str()
            .replacen("assistant_", "assistant.", 1)
            .replacen("openai_", "openai.", 1)
            .replacen("retry_", "retry.", 1)
            .replacen("budget_", "budget.", 1)
            .replacen("prompt_", "prompt.", 1);
        mapped.into()
    })
}
