//! Configuration module
//!
//! TOML file with nested sections, loaded from
//! `~/.config/cantieri-console/config.toml` by default. Every field
//! has a default so a partial file is fine; backend base URLs are the
//! only values that must be provided before talking to the backend.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::shared::errors::ConfigError;

/// Default location of the config file.
pub fn default_config_path() -> PathBuf {
    dirs_next::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("cantieri-console")
        .join("config.toml")
}

/// Backend endpoint groups and HTTP behavior.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Base of the `auth/` endpoint group.
    pub auth_base_url: String,
    /// Base of the default application endpoint group.
    pub app_base_url: String,
    /// Base of the `admin/` endpoint group.
    pub admin_base_url: String,
    /// Per-request timeout in seconds.
    pub timeout_seconds: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            auth_base_url: String::new(),
            app_base_url: String::new(),
            admin_base_url: String::new(),
            timeout_seconds: 30,
        }
    }
}

/// Business display constants. These have no source of truth in the
/// backend data model; the defaults reproduce the published figures.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TargetsConfig {
    /// Monthly revenue target in EUR.
    pub monthly_target_eur: f64,
    /// Hourly rate above which the bonus applies, EUR/h.
    pub bonus_threshold_eur_hour: f64,
    /// Hours credited to one working day.
    pub daily_hours: f64,
    /// Working days credited to one month.
    pub working_days_per_month: u32,
}

impl TargetsConfig {
    /// Hours credited to one month (daily hours × working days).
    pub fn monthly_hours(&self) -> f64 {
        self.daily_hours * f64::from(self.working_days_per_month)
    }
}

impl Default for TargetsConfig {
    fn default() -> Self {
        Self {
            monthly_target_eur: 21_000.0,
            bonus_threshold_eur_hour: 44.0,
            daily_hours: 24.0,
            working_days_per_month: 21,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// trace, debug, info, warn, error.
    pub level: String,
    /// Emit JSON log lines instead of the human format.
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Override for the token/user cache directory.
    pub cache_dir: Option<PathBuf>,
}

/// Complete application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub backend: BackendConfig,
    pub targets: TargetsConfig,
    pub logging: LoggingConfig,
    pub session: SessionConfig,
}

impl AppConfig {
    /// Load from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let mut cfg: AppConfig =
            toml::from_str(&raw).map_err(|source| ConfigError::Parse {
                path: path.display().to_string(),
                source,
            })?;
        cfg.apply_env();
        Ok(cfg)
    }

    /// Environment overrides for the backend bases, applied after file
    /// load (and to the fallback default when no file exists).
    pub fn apply_env(&mut self) {
        for (var, slot) in [
            ("CANTIERI_AUTH_BASE_URL", &mut self.backend.auth_base_url),
            ("CANTIERI_APP_BASE_URL", &mut self.backend.app_base_url),
            ("CANTIERI_ADMIN_BASE_URL", &mut self.backend.admin_base_url),
        ] {
            if let Ok(v) = std::env::var(var) {
                if !v.trim().is_empty() {
                    *slot = v.trim().to_string();
                }
            }
        }
    }

    /// Check that the backend section is usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut missing = Vec::new();
        for (name, value) in [
            ("backend.auth_base_url", &self.backend.auth_base_url),
            ("backend.app_base_url", &self.backend.app_base_url),
            ("backend.admin_base_url", &self.backend.admin_base_url),
        ] {
            if value.trim().is_empty() {
                missing.push(name);
            } else if !value.starts_with("http://") && !value.starts_with("https://") {
                return Err(ConfigError::Invalid(format!(
                    "{name} must start with http:// or https://"
                )));
            }
        }
        if !missing.is_empty() {
            return Err(ConfigError::Invalid(format!(
                "missing {}",
                missing.join(", ")
            )));
        }
        if self.backend.timeout_seconds == 0 {
            return Err(ConfigError::Invalid(
                "backend.timeout_seconds must be positive".into(),
            ));
        }
        if self.targets.daily_hours <= 0.0 || self.targets.working_days_per_month == 0 {
            return Err(ConfigError::Invalid(
                "targets hours must be positive".into(),
            ));
        }
        Ok(())
    }

    /// Directory for the cached token and user profile.
    pub fn session_cache_dir(&self) -> PathBuf {
        self.session.cache_dir.clone().unwrap_or_else(|| {
            dirs_next::config_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("cantieri-console")
                .join("session")
        })
    }
}

// ── Tests ──────────────────────────────────────────────────────
