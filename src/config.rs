//! Configuration: JSON file + environment variable overrides, with sensible defaults.
//!
//! Reuses this codebase's merge-then-deserialize loading shape (inline JSON env var, optional
//! file, then per-field env overrides with a `__`-nested separator) scoped to the handful of
//! settings a duel server actually needs.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;

fn default_port() -> u16 {
    3000
}

fn default_preview_secs() -> u64 {
    30
}

fn default_sequence_secs() -> u64 {
    60
}

fn default_swap_secs() -> u64 {
    20
}

fn default_continue_secs() -> u64 {
    5
}

fn default_reconnect_window_secs() -> u64 {
    120
}

fn default_lobby_sweep_interval_secs() -> u64 {
    60
}

fn default_cors_origins() -> String {
    "*".to_string()
}

fn default_log_format() -> LogFormat {
    LogFormat::Json
}

/// Root configuration.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Config {
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub game: GameConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: default_port(),
            game: GameConfig::default(),
            server: ServerConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

/// Round-timer durations, surfaced so operators can retune pacing without a rebuild.
#[derive(Debug, Deserialize, Serialize, Clone, Copy)]
pub struct GameConfig {
    #[serde(default = "default_preview_secs")]
    pub preview_secs: u64,
    #[serde(default = "default_sequence_secs")]
    pub sequence_secs: u64,
    #[serde(default = "default_swap_secs")]
    pub swap_secs: u64,
    #[serde(default = "default_continue_secs")]
    pub continue_secs: u64,
    #[serde(default = "default_reconnect_window_secs")]
    pub reconnect_window_secs: u64,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            preview_secs: default_preview_secs(),
            sequence_secs: default_sequence_secs(),
            swap_secs: default_swap_secs(),
            continue_secs: default_continue_secs(),
            reconnect_window_secs: default_reconnect_window_secs(),
        }
    }
}

impl From<GameConfig> for crate::session::SessionTimings {
    fn from(cfg: GameConfig) -> Self {
        crate::session::SessionTimings {
            preview_secs: cfg.preview_secs,
            sequence_secs: cfg.sequence_secs,
            swap_secs: cfg.swap_secs,
            continue_secs: cfg.continue_secs,
        }
    }
}

/// Transport-level behavior: CORS and the stale-lobby sweep cadence.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_lobby_sweep_interval_secs")]
    pub lobby_sweep_interval_secs: u64,
    #[serde(default = "default_cors_origins")]
    pub cors_origins: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            lobby_sweep_interval_secs: default_lobby_sweep_interval_secs(),
            cors_origins: default_cors_origins(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggingConfig {
    #[serde(default)]
    pub level: Option<LogLevel>,
    #[serde(default = "default_log_format")]
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: None,
            format: default_log_format(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Json,
    Text,
}

/// Loads configuration with the following precedence (highest first):
/// 1. `DUEL_CONFIG_JSON` env var containing raw JSON
/// 2. File at `DUEL_CONFIG_PATH`
/// 3. `config.json` in the current working directory
/// 4. Compiled-in defaults
///
/// Afterward, individual fields can be overridden by env vars prefixed `DUEL__`, using `__` as a
/// nesting separator, e.g. `DUEL__PORT=8080` or `DUEL__GAME__SWAP_SECS=15`.
#[must_use]
pub fn load() -> Config {
    let defaults = Config::default();
    let mut merged =
        serde_json::to_value(&defaults).unwrap_or_else(|_| Value::Object(serde_json::Map::new()));

    if let Ok(json) = std::env::var("DUEL_CONFIG_JSON") {
        if let Some(value) = parse_json_document(&json, "DUEL_CONFIG_JSON") {
            merge_values(&mut merged, value);
        }
    }

    if let Ok(path) = std::env::var("DUEL_CONFIG_PATH") {
        merge_file_source(&mut merged, &PathBuf::from(path));
    }
    merge_file_source(&mut merged, &PathBuf::from("config.json"));

    apply_env_overrides(&mut merged);

    match serde_json::from_value::<Config>(merged) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Failed to deserialize config; using defaults: {e}");
            defaults
        }
    }
}

/// Validates constraints that serde's `#[serde(default)]` values can't express on their own.
pub fn validate(cfg: &Config) -> Result<(), String> {
    if cfg.game.preview_secs == 0
        || cfg.game.sequence_secs == 0
        || cfg.game.swap_secs == 0
        || cfg.game.continue_secs == 0
    {
        return Err("game timer durations must all be non-zero".to_string());
    }
    if cfg.game.reconnect_window_secs == 0 {
        return Err("reconnect_window_secs must be non-zero".to_string());
    }
    if cfg.server.lobby_sweep_interval_secs == 0 {
        return Err("lobby_sweep_interval_secs must be non-zero".to_string());
    }
    Ok(())
}

fn parse_json_document(raw: &str, label: &str) -> Option<Value> {
    if raw.trim().is_empty() {
        return None;
    }
    match serde_json::from_str(raw) {
        Ok(value) => Some(value),
        Err(err) => {
            eprintln!("Failed to parse config from {label}: {err}");
            None
        }
    }
}

fn merge_file_source(target: &mut Value, path: &Path) {
    if path.as_os_str().is_empty() || !path.exists() {
        return;
    }
    match fs::read_to_string(path) {
        Ok(contents) => {
            if let Some(value) = parse_json_document(&contents, &format!("file {}", path.display()))
            {
                merge_values(target, value);
            }
        }
        Err(err) => eprintln!("Failed to read config from {}: {err}", path.display()),
    }
}

fn merge_values(target: &mut Value, source: Value) {
    match (target, source) {
        (Value::Object(target_map), Value::Object(source_map)) => {
            for (key, value) in source_map {
                match target_map.get_mut(&key) {
                    Some(existing) => merge_values(existing, value),
                    None => {
                        target_map.insert(key, value);
                    }
                }
            }
        }
        (target_slot, source_value) => *target_slot = source_value,
    }
}

fn apply_env_overrides(root: &mut Value) {
    for (key, raw_value) in std::env::vars() {
        let Some(stripped) = key.strip_prefix("DUEL__") else {
            continue;
        };
        let segments: Vec<String> = stripped
            .split("__")
            .filter(|s| !s.is_empty())
            .map(str::to_ascii_lowercase)
            .collect();
        if segments.is_empty() {
            continue;
        }
        let value = parse_scalar(raw_value.trim());
        set_nested_value(root, &segments, value);
    }
}

fn parse_scalar(raw: &str) -> Value {
    if raw.is_empty() {
        return Value::String(String::new());
    }
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

fn set_nested_value(target: &mut Value, segments: &[String], value: Value) {
    if segments.len() == 1 {
        let map = ensure_object(target);
        map.insert(segments[0].clone(), value);
        return;
    }
    let map = ensure_object(target);
    let entry = map
        .entry(segments[0].clone())
        .or_insert_with(|| Value::Object(serde_json::Map::new()));
    set_nested_value(entry, &segments[1..], value);
}

fn ensure_object(value: &mut Value) -> &mut serde_json::Map<String, Value> {
    if !value.is_object() {
        *value = Value::Object(serde_json::Map::new());
    }
    value.as_object_mut().expect("just coerced into an object")
}
