//! Settings loading with deep merge and environment variable overrides.
//!
//! Loading flow:
//! 1. Start with compiled [`ImpostorSettings::default()`]
//! 2. If `~/.impostor/settings.json` exists, deep-merge user values over defaults
//! 3. Apply environment variable overrides (highest priority)
//!
//! Deep merge rules:
//! - Objects are merged recursively (source overrides target per-key)
//! - Arrays and primitives are replaced entirely by source
//! - Null values in source are skipped (preserving target)

use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::debug;

use crate::errors::{Result, SettingsError};
use crate::types::{ImpostorSettings, LogLevel};

/// Resolve the path to the settings file (`~/.impostor/settings.json`).
pub fn settings_path() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
    PathBuf::from(home).join(".impostor").join("settings.json")
}

/// Load settings from the default path with env var overrides.
pub fn load_settings() -> Result<ImpostorSettings> {
    load_settings_from_path(&settings_path())
}

/// Load settings from a specific path with env var overrides.
///
/// If the file does not exist, returns defaults. If the file contains
/// invalid JSON, returns an error.
pub fn load_settings_from_path(path: &Path) -> Result<ImpostorSettings> {
    let defaults = serde_json::to_value(ImpostorSettings::default())?;

    let merged = if path.exists() {
        debug!(?path, "loading settings from file");
        let content = std::fs::read_to_string(path)?;
        let user: Value = serde_json::from_str(&content)?;
        deep_merge(defaults, user)
    } else {
        debug!(?path, "settings file not found, using defaults");
        defaults
    };

    let mut settings: ImpostorSettings = serde_json::from_value(merged)?;
    apply_env_overrides(&mut settings);
    validate(&settings)?;
    Ok(settings)
}

/// Recursive deep merge of two JSON values.
///
/// - Objects are merged recursively (source overrides target per-key)
/// - Arrays and primitives are replaced entirely by source
/// - Null values in source are skipped (preserving target)
pub fn deep_merge(target: Value, source: Value) -> Value {
    match (target, source) {
        (Value::Object(mut target_map), Value::Object(source_map)) => {
            for (key, source_val) in source_map {
                if source_val.is_null() {
                    continue;
                }
                let merged = if let Some(target_val) = target_map.remove(&key) {
                    deep_merge(target_val, source_val)
                } else {
                    source_val
                };
                let _ = target_map.insert(key, merged);
            }
            Value::Object(target_map)
        }
        (_, source) => source,
    }
}

/// Apply environment variable overrides to loaded settings.
///
/// Integers must parse and fall within range; booleans accept
/// `true`/`1`/`yes`/`on` or `false`/`0`/`no`/`off`. Invalid values are
/// ignored with a warning.
pub fn apply_env_overrides(settings: &mut ImpostorSettings) {
    // ── Server settings ─────────────────────────────────────────────
    if let Some(v) = read_env_string("IMPOSTOR_HOST") {
        settings.server.host = v;
    }
    if let Some(v) = read_env_u16("IMPOSTOR_PORT", 0, 65535) {
        settings.server.port = v;
    }

    // ── Game settings ───────────────────────────────────────────────
    if let Some(v) = read_env_u64("IMPOSTOR_READINESS_TIMEOUT_MS", 100, 600_000) {
        settings.game.readiness_timeout_ms = v;
    }
    if let Some(v) = read_env_u64("IMPOSTOR_READINESS_POLL_MS", 1, 10_000) {
        settings.game.readiness_poll_ms = v;
    }
    if let Some(v) = read_env_string("IMPOSTOR_CREWMATE_MODEL") {
        settings.game.crewmate_model = v;
    }
    if let Some(v) = read_env_string("IMPOSTOR_IMPOSTOR_MODEL") {
        settings.game.impostor_model = v;
    }
    if let Some(v) = read_env_u64("IMPOSTOR_AUTONOMOUS_DELAY_MS", 0, 60_000) {
        settings.game.autonomous_delay_ms = v;
    }

    // ── Experiment settings ─────────────────────────────────────────
    if let Some(v) = read_env_bool("IMPOSTOR_EXPERIMENT_ENABLED") {
        settings.experiment.enabled = v;
    }
    if let Some(v) = read_env_string("IMPOSTOR_EXPERIMENT_DIR") {
        settings.experiment.logs_dir = v;
    }

    // ── Logging ─────────────────────────────────────────────────────
    if let Some(v) = read_env_string("IMPOSTOR_LOG_LEVEL") {
        match LogLevel::parse(&v) {
            Some(level) => settings.logging.level = level,
            None => {
                tracing::warn!(key = "IMPOSTOR_LOG_LEVEL", value = %v, "invalid log level env var, ignoring");
            }
        }
    }
}

/// Reject combinations that cannot work at runtime.
pub fn validate(settings: &ImpostorSettings) -> Result<()> {
    let game = &settings.game;
    if game.readiness_poll_ms == 0 {
        return Err(SettingsError::InvalidValue(
            "game.readinessPollMs must be positive".into(),
        ));
    }
    if game.readiness_poll_ms > game.readiness_timeout_ms {
        return Err(SettingsError::InvalidValue(format!(
            "game.readinessPollMs ({}) exceeds game.readinessTimeoutMs ({})",
            game.readiness_poll_ms, game.readiness_timeout_ms
        )));
    }
    Ok(())
}

// ── Pure parsing functions (testable without env vars) ──────────────────────

/// Parse a string as a boolean.
///
/// Accepts (case-insensitive): `true`/`1`/`yes`/`on` or `false`/`0`/`no`/`off`.
pub fn parse_bool(val: &str) -> Option<bool> {
    match val.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Parse a string as a `u16` within a range.
pub fn parse_u16_range(val: &str, min: u16, max: u16) -> Option<u16> {
    let n: u16 = val.parse().ok()?;
    (n >= min && n <= max).then_some(n)
}

/// Parse a string as a `u64` within a range.
pub fn parse_u64_range(val: &str, min: u64, max: u64) -> Option<u64> {
    let n: u64 = val.parse().ok()?;
    (n >= min && n <= max).then_some(n)
}

// ── Env var readers (thin wrappers) ─────────────────────────────────────────

fn read_env_string(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

fn read_env_bool(name: &str) -> Option<bool> {
    let val = std::env::var(name).ok()?;
    let result = parse_bool(&val);
    if result.is_none() {
        tracing::warn!(key = name, value = %val, "invalid boolean env var, ignoring");
    }
    result
}

fn read_env_u16(name: &str, min: u16, max: u16) -> Option<u16> {
    let val = std::env::var(name).ok()?;
    let result = parse_u16_range(&val, min, max);
    if result.is_none() {
        tracing::warn!(key = name, value = %val, "invalid u16 env var, ignoring");
    }
    result
}

fn read_env_u64(name: &str, min: u64, max: u64) -> Option<u64> {
    let val = std::env::var(name).ok()?;
    let result = parse_u64_range(&val, min, max);
    if result.is_none() {
        tracing::warn!(key = name, value = %val, "invalid u64 env var, ignoring");
    }
    result
}
