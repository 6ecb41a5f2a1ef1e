// ⚙️ Configuration - constants + runtime settings
//
// Every default the core relies on lives here. Runtime settings start from
// these defaults, then LIFTKEY_* environment variables, then CLI flags
// (applied by the binaries).

use crate::capability::Platform;
use crate::logging::LogFormat;
use chrono::Duration;
use std::env;
use std::path::PathBuf;

// ============================================================================
// CARD DEFAULTS
// ============================================================================

/// Floor assigned when the user supplies nothing parseable.
pub const DEFAULT_FLOOR: i32 = 0;

/// Label used when a new card is saved without a name.
pub const DEFAULT_CARD_NAME: &str = "New Card";

/// Label pre-filled for merged cards.
pub const DEFAULT_MERGED_NAME: &str = "Hybrid Access Card";

/// Marker prefix for synthesized (merged) serial numbers.
pub const MERGED_SERIAL_PREFIX: &str = "MK-";

// ============================================================================
// STORAGE
// ============================================================================

/// Key under which the serialized card list is stored.
pub const DEFAULT_STORAGE_KEY: &str = "liftkey_cards";

/// Key holding an identifier delivered by the bridge but not yet consumed.
pub const BRIDGE_STORAGE_KEY: &str = "liftkey_bridge_uid";

pub const DEFAULT_DB_PATH: &str = "liftkey.db";

// ============================================================================
// SESSIONS / BRIDGE / SERVER
// ============================================================================

/// How long a transient emulation error stays on screen.
pub const DEFAULT_ERROR_DISPLAY_MS: i64 = 3000;

/// Upper bound for the error display interval (one hour).
pub const MAX_ERROR_DISPLAY_MS: i64 = 3_600_000;

/// Base URL a platform automation opens with `?uid=<serial>` appended.
pub const DEFAULT_BRIDGE_BASE_URL: &str = "https://liftkey.vercel.app/";

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";

pub const DEFAULT_LOG_FILE: &str = "liftkey.log";

#[derive(Debug, Clone)]
pub struct Config {
    pub db_path: PathBuf,
    pub storage_key: String,
    pub bridge_base_url: String,
    pub error_display_ms: i64,
    pub platform: Platform,
    pub bind_addr: String,
    pub log_format: LogFormat,
    pub log_file: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            db_path: PathBuf::from(DEFAULT_DB_PATH),
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            bridge_base_url: DEFAULT_BRIDGE_BASE_URL.to_string(),
            error_display_ms: DEFAULT_ERROR_DISPLAY_MS,
            platform: Platform::Desktop,
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            log_format: LogFormat::Pretty,
            log_file: PathBuf::from(DEFAULT_LOG_FILE),
        }
    }
}

impl Config {
    /// Defaults overridden by LIFTKEY_* environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as `from_env`, reading variables through `lookup`
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Config::default();

        if let Some(path) = lookup("LIFTKEY_DB") {
            config.db_path = PathBuf::from(path);
        }
        if let Some(key) = lookup("LIFTKEY_STORAGE_KEY").filter(|k| !k.trim().is_empty()) {
            config.storage_key = key;
        }
        if let Some(url) = lookup("LIFTKEY_BRIDGE_BASE_URL") {
            config.bridge_base_url = url;
        }
        if let Some(ms) = lookup("LIFTKEY_ERROR_DISPLAY_MS") {
            match ms.trim().parse::<i64>() {
                Ok(ms) if ms >= 0 => {
                    if ms > MAX_ERROR_DISPLAY_MS {
                        tracing::warn!(value = ms, max = MAX_ERROR_DISPLAY_MS, "clamping LIFTKEY_ERROR_DISPLAY_MS");
                    }
                    config.error_display_ms = ms.min(MAX_ERROR_DISPLAY_MS);
                }
                _ => tracing::warn!(value = %ms, "ignoring invalid LIFTKEY_ERROR_DISPLAY_MS"),
            }
        }
        if let Some(platform) = lookup("LIFTKEY_PLATFORM") {
            config.platform = Platform::from_name(&platform);
        }
        if let Some(addr) = lookup("LIFTKEY_BIND") {
            config.bind_addr = addr;
        }
        if let Some(format) = lookup("LIFTKEY_LOG_FORMAT") {
            config.log_format = LogFormat::from_str_lossy(&format);
        }
        if let Some(file) = lookup("LIFTKEY_LOG_FILE") {
            config.log_file = PathBuf::from(file);
        }

        config
    }

    pub fn error_display(&self) -> Duration {
        Duration::milliseconds(self.error_display_ms.clamp(0, MAX_ERROR_DISPLAY_MS))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.storage_key, "liftkey_cards");
        assert_eq!(config.error_display(), Duration::milliseconds(3000));
        assert_eq!(config.platform, Platform::Desktop);
    }

    #[test]
    fn test_env_overrides() {
        let vars: HashMap<&str, &str> = [
            ("LIFTKEY_DB", "/tmp/cards.db"),
            ("LIFTKEY_ERROR_DISPLAY_MS", "1500"),
            ("LIFTKEY_PLATFORM", "ios"),
            ("LIFTKEY_LOG_FORMAT", "json"),
        ]
        .into_iter()
        .collect();

        let config = Config::from_lookup(|k| vars.get(k).map(|v| v.to_string()));

        assert_eq!(config.db_path, PathBuf::from("/tmp/cards.db"));
        assert_eq!(config.error_display_ms, 1500);
        assert_eq!(config.platform, Platform::Ios);
        assert_eq!(config.log_format, LogFormat::Json);
        // Untouched values keep their defaults
        assert_eq!(config.bind_addr, DEFAULT_BIND_ADDR);
    }

    #[test]
    fn test_invalid_values_fall_back() {
        let config = Config::from_lookup(|k| match k {
            "LIFTKEY_ERROR_DISPLAY_MS" => Some("soon".to_string()),
            "LIFTKEY_STORAGE_KEY" => Some("  ".to_string()),
            _ => None,
        });

        assert_eq!(config.error_display_ms, DEFAULT_ERROR_DISPLAY_MS);
        assert_eq!(config.storage_key, DEFAULT_STORAGE_KEY);
    }

    #[test]
    fn test_huge_error_display_is_clamped() {
        let config = Config::from_lookup(|k| match k {
            "LIFTKEY_ERROR_DISPLAY_MS" => Some(i64::MAX.to_string()),
            _ => None,
        });
        assert_eq!(config.error_display_ms, MAX_ERROR_DISPLAY_MS);
        assert_eq!(config.error_display(), Duration::hours(1));

        let direct = Config {
            error_display_ms: i64::MAX,
            ..Config::default()
        };
        assert_eq!(direct.error_display(), Duration::hours(1));
    }
}
