//! TOML-based run configuration.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::sim::battery::OverchargePolicy;
use crate::sim::tariff::TariffPeriod;

/// Top-level configuration parsed from TOML.
///
/// The `battery`, `years`, and `cost` sections are required; `simulation`
/// defaults to the standard meter-logger layout. Load with
/// [`Config::from_toml_file`] and check [`Config::validate`] before use.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Input location and interval policy.
    #[serde(default)]
    pub simulation: SimulationConfig,
    /// Battery parameters.
    pub battery: BatteryConfig,
    /// Year directories to scan under the base directory, in order.
    pub years: Vec<i32>,
    /// Tariff periods ordered by ascending start date.
    pub cost: Vec<TariffPeriod>,
}

/// Input location and interval policy.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulationConfig {
    /// Base directory containing one subdirectory per year of CSV files.
    pub base_dir: PathBuf,
    /// Maximum gap between samples before an interval is discarded (minutes).
    pub max_interval_minutes: i64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            base_dir: PathBuf::from("/var/lib/MeterMan/csv"),
            max_interval_minutes: 10,
        }
    }
}

/// Battery parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BatteryConfig {
    /// Capacity (kWh).
    pub size: f64,
    /// Energy retained per unit drawn while charging (percent).
    pub recharge: f64,
    /// Power limit for both the discharge and charge legs (kWh per hour).
    pub discharge: f64,
    /// What to do when a computed charge level exceeds capacity.
    #[serde(default)]
    pub overcharge: OverchargePolicy,
}

/// Configuration error with field path and constraint description.
#[derive(Debug)]
pub struct ConfigError {
    /// Dotted field path (e.g., `"battery.size"`).
    pub field: String,
    /// Human-readable constraint description.
    pub message: String,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "config error: {}: {}", self.field, self.message)
    }
}

impl std::error::Error for ConfigError {}

impl Config {
    /// Parses a configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the file cannot be read or the TOML is
    /// invalid.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError {
            field: "config".to_string(),
            message: format!("cannot read \"{}\": {e}", path.display()),
        })?;
        Self::from_toml_str(&content)
    }

    /// Parses a configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the TOML is invalid or contains unknown
    /// fields.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError {
            field: "toml".to_string(),
            message: e.to_string(),
        })
    }

    /// Validates all fields and returns a list of errors.
    ///
    /// Returns an empty vector if the configuration is valid.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();

        let b = &self.battery;
        if b.size <= 0.0 {
            errors.push(ConfigError {
                field: "battery.size".into(),
                message: "must be > 0".into(),
            });
        }
        if b.discharge <= 0.0 {
            errors.push(ConfigError {
                field: "battery.discharge".into(),
                message: "must be > 0".into(),
            });
        }
        if !(b.recharge > 0.0 && b.recharge <= 100.0) {
            errors.push(ConfigError {
                field: "battery.recharge".into(),
                message: "must be a percentage in (0, 100]".into(),
            });
        }

        if self.years.is_empty() {
            errors.push(ConfigError {
                field: "years".into(),
                message: "at least one year is required".into(),
            });
        }

        if self.cost.is_empty() {
            errors.push(ConfigError {
                field: "cost".into(),
                message: "at least one tariff period is required".into(),
            });
        }
        for pair in self.cost.windows(2) {
            if pair[1].start <= pair[0].start {
                errors.push(ConfigError {
                    field: "cost".into(),
                    message: format!(
                        "period starts must be strictly increasing ({} follows {})",
                        pair[1].start, pair[0].start
                    ),
                });
            }
        }

        if self.simulation.max_interval_minutes <= 0 {
            errors.push(ConfigError {
                field: "simulation.max_interval_minutes".into(),
                message: "must be > 0".into(),
            });
        }

        errors
    }
}
