//! # Configuration State
//!
//! Application configuration loaded at startup.
//!
//! ## Configuration Sources (Priority Order)
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     KADE_DB_PATH, KADE_TAX_RATE, KADE_PIN,                             │
//! │     KADE_SETTLEMENT_MODE, KADE_NOTIFY, KADE_COUNTRY_CODE               │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/kade-pos/kade.toml (Linux)                               │
//! │     ~/Library/Application Support/com.kade.pos/kade.toml (macOS)       │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     tax 0%, settle as cash, notifications off, country code 94         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # kade.toml
//! database_path = "/srv/kade/kade.db"
//! default_tax_percent = 0.0
//! pin = "2580"
//! settlement_mode = "record_as_cash"   # record_as_cash | status_only
//! notify_on_checkout = true
//! country_code = "94"
//! ```
//!
//! ## Thread Safety
//! Configuration is read-only after initialization, so no lock is needed.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use kade_core::ledger::SettlementMode;
use kade_core::notify::DEFAULT_COUNTRY_CODE;
use kade_core::TaxRate;

/// Name of the config file inside the platform config directory.
pub const CONFIG_FILE_NAME: &str = "kade.toml";

/// Errors raised while loading or saving `kade.toml`.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config file I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config file is not valid TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Config could not be serialized: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigState {
    /// Database file. `None` means the platform data directory.
    pub database_path: Option<PathBuf>,

    /// Tax percent pre-filled on every new bill.
    pub default_tax_percent: f64,

    /// PIN that unlocks the session. `None` accepts any PIN.
    pub pin: Option<String>,

    /// What settling a credit bill does to the record.
    pub settlement_mode: SettlementMode,

    /// Whether the "send to customer" toggle starts switched on.
    pub notify_on_checkout: bool,

    /// Dialling code prefixed to local contact numbers in message links.
    pub country_code: String,
}

impl Default for ConfigState {
    fn default() -> Self {
        ConfigState {
            database_path: None,
            default_tax_percent: 0.0,
            pin: None,
            settlement_mode: SettlementMode::RecordAsCash,
            notify_on_checkout: false,
            country_code: DEFAULT_COUNTRY_CODE.to_string(),
        }
    }
}

impl ConfigState {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (`kade.toml`)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> ConfigResult<Self> {
        let mut config = match config_path.or_else(Self::default_config_path) {
            Some(path) if path.exists() => {
                info!(?path, "Loading config from file");
                Self::from_file(&path)?
            }
            Some(path) => {
                debug!(?path, "Config file not found, using defaults");
                Self::default()
            }
            None => Self::default(),
        };

        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;

        Ok(config)
    }

    /// Loads config or returns defaults (plus environment) if loading fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load config: {}. Using defaults.", e);
            let mut config = Self::default();
            config.apply_overrides(|key| std::env::var(key).ok());
            config
        })
    }

    /// Parses a config file.
    pub fn from_file(path: &Path) -> ConfigResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&contents)?)
    }

    /// Saves configuration to file.
    pub fn save(&self, path: &Path) -> ConfigResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(path, contents)?;

        info!(?path, "Config saved");
        Ok(())
    }

    /// Rejects values no bill could be computed with.
    pub fn validate(&self) -> ConfigResult<()> {
        if !self.default_tax_percent.is_finite()
            || !(0.0..=100.0).contains(&self.default_tax_percent)
        {
            return Err(ConfigError::Invalid(format!(
                "default_tax_percent must be between 0 and 100, got {}",
                self.default_tax_percent
            )));
        }

        if self.country_code.is_empty() || !self.country_code.chars().all(|c| c.is_ascii_digit())
        {
            return Err(ConfigError::Invalid(format!(
                "country_code must be digits, got '{}'",
                self.country_code
            )));
        }

        Ok(())
    }

    /// Applies `KADE_*` overrides read through `lookup`.
    ///
    /// Unparsable values are logged and ignored.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = lookup("KADE_DB_PATH") {
            debug!(path = %path, "Overriding database path from environment");
            self.database_path = Some(PathBuf::from(path));
        }

        if let Some(rate) = lookup("KADE_TAX_RATE") {
            match rate.trim().parse::<f64>() {
                Ok(pct) => self.default_tax_percent = pct,
                Err(_) => warn!(value = %rate, "Ignoring unparsable KADE_TAX_RATE"),
            }
        }

        if let Some(pin) = lookup("KADE_PIN") {
            self.pin = if pin.is_empty() { None } else { Some(pin) };
        }

        if let Some(mode) = lookup("KADE_SETTLEMENT_MODE") {
            match mode.parse() {
                Ok(parsed) => self.settlement_mode = parsed,
                Err(e) => warn!(error = %e, "Ignoring KADE_SETTLEMENT_MODE"),
            }
        }

        if let Some(flag) = lookup("KADE_NOTIFY") {
            match flag.trim().to_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => self.notify_on_checkout = true,
                "0" | "false" | "no" | "off" => self.notify_on_checkout = false,
                _ => warn!(value = %flag, "Ignoring unparsable KADE_NOTIFY"),
            }
        }

        if let Some(code) = lookup("KADE_COUNTRY_CODE") {
            self.country_code = code.trim().trim_start_matches('+').to_string();
        }
    }

    /// Default tax rate for new bills.
    pub fn default_tax_rate(&self) -> TaxRate {
        TaxRate::from_percentage(self.default_tax_percent)
    }

    /// Returns the default config file path.
    pub fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "kade", "pos")
            .map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
    }
}
