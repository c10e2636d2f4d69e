//! Configuration loading and management
//!
//! Configuration is loaded from `~/.config/tenantpulse/config.toml`
//!
//! This module follows the XDG Base Directory Specification:
//! - Config: `$XDG_CONFIG_HOME/tenantpulse/` (~/.config/tenantpulse/)
//! - State/Logs: `$XDG_STATE_HOME/tenantpulse/` (~/.local/state/tenantpulse/)

use crate::error::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

fn home_dir() -> PathBuf {
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
}

/// `$var` when set and non-empty, else `~/<fallback>`.
fn xdg_dir(var: &str, fallback: &str) -> PathBuf {
    std::env::var_os(var)
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| home_dir().join(fallback))
}

/// Main configuration struct
#[derive(Debug, Deserialize, Default, Clone)]
pub struct Config {
    /// Unit pricing and revenue tier thresholds
    #[serde(default)]
    pub pricing: PricingConfig,

    /// Synthetic backfill and projection settings
    #[serde(default)]
    pub forecast: ForecastConfig,

    /// Default snapshot location
    #[serde(default)]
    pub snapshot: SnapshotConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Unit pricing applied to usage counters.
///
/// Revenue tiers are matched high to low with an inclusive lower bound:
/// monthly revenue `>= enterprise_threshold` is Enterprise, and so on down
/// to Starter for anything below `growth_threshold`.
#[derive(Debug, Deserialize, Clone)]
pub struct PricingConfig {
    /// Monthly price per user (applied to `users_count`, not active users)
    #[serde(default = "default_price_per_user")]
    pub price_per_user: f64,

    /// Monthly price per instance
    #[serde(default = "default_price_per_instance")]
    pub price_per_instance: f64,

    /// Price per broadcast
    #[serde(default = "default_price_per_broadcast")]
    pub price_per_broadcast: f64,

    /// Lower bound of the Enterprise tier (monthly revenue)
    #[serde(default = "default_enterprise_threshold")]
    pub enterprise_threshold: f64,

    /// Lower bound of the Professional tier (monthly revenue)
    #[serde(default = "default_professional_threshold")]
    pub professional_threshold: f64,

    /// Lower bound of the Growth tier (monthly revenue)
    #[serde(default = "default_growth_threshold")]
    pub growth_threshold: f64,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            price_per_user: default_price_per_user(),
            price_per_instance: default_price_per_instance(),
            price_per_broadcast: default_price_per_broadcast(),
            enterprise_threshold: default_enterprise_threshold(),
            professional_threshold: default_professional_threshold(),
            growth_threshold: default_growth_threshold(),
        }
    }
}

impl PricingConfig {
    /// Validate configuration, returning error message if invalid
    pub fn validate(&self) -> Result<()> {
        let prices = [
            ("pricing.price_per_user", self.price_per_user),
            ("pricing.price_per_instance", self.price_per_instance),
            ("pricing.price_per_broadcast", self.price_per_broadcast),
        ];
        for (name, value) in prices {
            if !value.is_finite() || value < 0.0 {
                return Err(Error::Config(format!("{name} must be a non-negative number")));
            }
        }

        if !(self.enterprise_threshold > self.professional_threshold
            && self.professional_threshold > self.growth_threshold)
        {
            return Err(Error::Config(
                "pricing tier thresholds must be strictly descending: enterprise > professional > growth"
                    .to_string(),
            ));
        }
        Ok(())
    }
}

fn default_price_per_user() -> f64 {
    10.0
}

fn default_price_per_instance() -> f64 {
    50.0
}

fn default_price_per_broadcast() -> f64 {
    0.01
}

fn default_enterprise_threshold() -> f64 {
    5000.0
}

fn default_professional_threshold() -> f64 {
    1000.0
}

fn default_growth_threshold() -> f64 {
    100.0
}

/// Settings for the linear trend forecast.
///
/// The history the trend is fitted to is synthetic: it is backfilled from
/// the current snapshot by dividing each total by `1 + growth_step * i + e`
/// where `i` is the number of periods ago and `e` is drawn uniformly from
/// `[0, max_jitter)`. It is not real telemetry.
#[derive(Debug, Deserialize, Clone)]
pub struct ForecastConfig {
    /// Number of synthesized periods before the current one
    #[serde(default = "default_history_periods")]
    pub history_periods: usize,

    /// Number of periods to project forward
    #[serde(default = "default_horizon")]
    pub horizon: usize,

    /// Growth factor increment per period ago
    #[serde(default = "default_growth_step")]
    pub growth_step: f64,

    /// Upper bound (exclusive) of the random perturbation per period
    #[serde(default = "default_max_jitter")]
    pub max_jitter: f64,

    /// Fixed seed for reproducible backfill
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            history_periods: default_history_periods(),
            horizon: default_horizon(),
            growth_step: default_growth_step(),
            max_jitter: default_max_jitter(),
            seed: None,
        }
    }
}

impl ForecastConfig {
    /// Backfill without perturbation or growth: history equals the current value.
    pub fn flat() -> Self {
        Self {
            growth_step: 0.0,
            max_jitter: 0.0,
            ..Default::default()
        }
    }

    /// Validate configuration, returning error message if invalid
    pub fn validate(&self) -> Result<()> {
        if self.history_periods == 0 {
            return Err(Error::Config(
                "forecast.history_periods must be at least 1".to_string(),
            ));
        }
        if self.horizon == 0 {
            return Err(Error::Config("forecast.horizon must be at least 1".to_string()));
        }
        if !self.growth_step.is_finite() || self.growth_step < 0.0 {
            return Err(Error::Config(
                "forecast.growth_step must be a non-negative number".to_string(),
            ));
        }
        if !self.max_jitter.is_finite() || self.max_jitter < 0.0 {
            return Err(Error::Config(
                "forecast.max_jitter must be a non-negative number".to_string(),
            ));
        }
        Ok(())
    }
}

fn default_history_periods() -> usize {
    12
}

fn default_horizon() -> usize {
    3
}

fn default_growth_step() -> f64 {
    0.05
}

fn default_max_jitter() -> f64 {
    0.1
}

/// Snapshot input defaults
#[derive(Debug, Deserialize, Default, Clone)]
pub struct SnapshotConfig {
    /// Snapshot JSON used when no `--input` is given
    pub path: Option<PathBuf>,
}

/// Logging configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Maximum number of log files to keep
    #[serde(default = "default_max_log_files")]
    pub max_files: usize,

    /// Also echo warnings and errors to stderr
    #[serde(default)]
    pub stderr: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            max_files: default_max_log_files(),
            stderr: false,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_max_log_files() -> usize {
    5
}

/// Where a loaded [`Config`] came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    File(PathBuf),
    /// No file at this path
    Defaults(PathBuf),
}

impl ConfigSource {
    pub fn log(&self) {
        match self {
            ConfigSource::File(path) => {
                tracing::info!(path = %path.display(), "Loaded config");
            }
            ConfigSource::Defaults(path) => {
                tracing::info!(path = %path.display(), "No config file, using defaults");
            }
        }
    }
}

impl Config {
    /// Load configuration from the default path.
    ///
    /// Runs before logging is set up, so the caller logs the returned
    /// [`ConfigSource`] once a subscriber exists.
    pub fn load() -> Result<(Self, ConfigSource)> {
        Self::load_or_default(&Self::config_path())
    }

    /// Load `path`, or fall back to defaults when it does not exist.
    pub fn load_or_default(path: &Path) -> Result<(Self, ConfigSource)> {
        if !path.exists() {
            return Ok((Config::default(), ConfigSource::Defaults(path.to_path_buf())));
        }
        let config = Self::load_from(path)?;
        Ok((config, ConfigSource::File(path.to_path_buf())))
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("cannot read {}: {e}", path.display()))
        })?;
        let config: Config = toml::from_str(&content).map_err(|e| {
            Error::Config(format!("invalid TOML in {}: {e}", path.display()))
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Validate every section.
    pub fn validate(&self) -> Result<()> {
        self.pricing.validate()?;
        self.forecast.validate()
    }

    /// Returns the default config file path
    ///
    /// `$XDG_CONFIG_HOME/tenantpulse/config.toml` (~/.config/tenantpulse/config.toml)
    pub fn config_path() -> PathBuf {
        xdg_dir("XDG_CONFIG_HOME", ".config").join("tenantpulse").join("config.toml")
    }

    /// Returns the state directory path (for logs)
    ///
    /// `$XDG_STATE_HOME/tenantpulse/` (~/.local/state/tenantpulse/)
    pub fn state_dir() -> PathBuf {
        xdg_dir("XDG_STATE_HOME", ".local/state").join("tenantpulse")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.pricing.price_per_user, 10.0);
        assert_eq!(config.pricing.price_per_instance, 50.0);
        assert_eq!(config.pricing.price_per_broadcast, 0.01);
        assert_eq!(config.forecast.history_periods, 12);
        assert_eq!(config.forecast.horizon, 3);
        assert!(config.forecast.seed.is_none());
        assert!(config.snapshot.path.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_config() {
        let toml = r#"
[pricing]
price_per_user = 12.5

[forecast]
seed = 42
horizon = 6

[snapshot]
path = "/data/merged.json"

[logging]
level = "debug"
stderr = true
"#;
        let config: Config = toml::from_str(toml).unwrap();

        assert_eq!(config.pricing.price_per_user, 12.5);
        assert_eq!(config.pricing.price_per_instance, 50.0);
        assert_eq!(config.forecast.seed, Some(42));
        assert_eq!(config.forecast.horizon, 6);
        assert_eq!(config.forecast.history_periods, 12);
        assert_eq!(
            config.snapshot.path.as_deref(),
            Some(Path::new("/data/merged.json"))
        );
        assert_eq!(config.logging.level, "debug");
        assert!(config.logging.stderr);
        assert_eq!(config.logging.max_files, 5);
    }

    #[test]
    fn test_pricing_validation() {
        let pricing = PricingConfig {
            price_per_user: -1.0,
            ..Default::default()
        };
        assert!(pricing.validate().is_err());

        // Thresholds out of order
        let pricing = PricingConfig {
            growth_threshold: 2000.0,
            ..Default::default()
        };
        assert!(pricing.validate().is_err());
    }

    #[test]
    fn test_forecast_validation() {
        let forecast = ForecastConfig {
            horizon: 0,
            ..Default::default()
        };
        assert!(forecast.validate().is_err());

        let forecast = ForecastConfig {
            max_jitter: -0.1,
            ..Default::default()
        };
        assert!(forecast.validate().is_err());

        assert!(ForecastConfig::flat().validate().is_ok());
    }

    #[test]
    fn test_load_from_rejects_invalid_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[forecast]\nhistory_periods = 0\n").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(err.to_string().contains("history_periods"));
    }

    #[test]
    fn test_load_or_default_reports_source() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let (config, source) = Config::load_or_default(&path).unwrap();
        assert_eq!(source, ConfigSource::Defaults(path.clone()));
        assert_eq!(config.forecast.history_periods, 12);

        std::fs::write(&path, "[forecast]\nhorizon = 6\n").unwrap();
        let (config, source) = Config::load_or_default(&path).unwrap();
        assert_eq!(source, ConfigSource::File(path));
        assert_eq!(config.forecast.horizon, 6);
    }
}
