//! Typed configuration loading for the Telemon daemon.
//!
//! The canonical configuration lives in `telemon.yaml` at the project
//! root. This module defines strongly-typed structs mirroring the YAML
//! structure and a loader that reads and validates the file. The rest of
//! the workspace only ever sees validated values.

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::buffer::{DEFAULT_HISTORY_CAPACITY, DEFAULT_TREND_CAPACITY};
use crate::sensors::{SensorDescriptor, SensorModel};

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// The configuration parsed but carries an invalid value.
    #[error("invalid configuration: {reason}")]
    Invalid {
        /// Explanation of what is wrong.
        reason: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level daemon configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct TelemonConfig {
    /// HTTP server settings.
    pub server: ServerSection,
    /// Device bus settings.
    pub bus: BusSection,
    /// Acquisition loop and buffer settings.
    pub acquisition: AcquisitionSection,
    /// Configured sensors, in poll order.
    pub sensors: Vec<SensorSection>,
}

impl Default for TelemonConfig {
    fn default() -> Self {
        Self {
            server: ServerSection::default(),
            bus: BusSection::default(),
            acquisition: AcquisitionSection::default(),
            sensors: Vec::new(),
        }
    }
}

/// HTTP server settings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ServerSection {
    /// Address to bind to.
    pub host: String,
    /// TCP port to listen on.
    pub port: u16,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            host: String::from("0.0.0.0"),
            port: 8080,
        }
    }
}

/// Device bus settings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct BusSection {
    /// Bus driver to use (currently only `sim`).
    pub driver: String,
    /// Bus id (`/dev/i2c-[id]` on a real system).
    pub id: u8,
    /// Mux address on the bus.
    pub addr: u8,
}

impl Default for BusSection {
    fn default() -> Self {
        Self {
            driver: String::from("sim"),
            id: 1,
            addr: 0x70,
        }
    }
}

/// Acquisition loop and buffer settings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AcquisitionSection {
    /// Interval between sensor polls, in milliseconds.
    pub poll_interval_ms: u64,
    /// Log every Nth successful poll at debug level (0 disables).
    pub log_every: u64,
    /// History buffer capacity.
    pub history_capacity: usize,
    /// Trend buffer capacity.
    pub trend_capacity: usize,
    /// Interval between trend samples, in seconds.
    pub trend_interval_secs: u64,
}

impl Default for AcquisitionSection {
    fn default() -> Self {
        Self {
            poll_interval_ms: 2000,
            log_every: 10,
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            trend_capacity: DEFAULT_TREND_CAPACITY,
            trend_interval_secs: 60,
        }
    }
}

/// One configured sensor entry.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SensorSection {
    /// The label this sensor's readings carry.
    pub name: String,
    /// Mux channel the device sits behind (0..=7).
    pub channel: u8,
    /// Device model name: `at30tse`, `hts221`, `bme280`, `onboard`, or
    /// `adc101x`.
    pub model: String,
    /// Device address override.
    #[serde(default)]
    pub i2c_addr: Option<u8>,
    /// Reference voltage; required for `adc101x`.
    #[serde(default)]
    pub vdd: Option<f64>,
    /// ADC full range; defaults to 1024 for `adc101x`.
    #[serde(default)]
    pub full_range: Option<u16>,
}

impl TelemonConfig {
    /// Load and validate configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the file cannot be read, fails to
    /// parse, or carries invalid values.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml(&contents)
    }

    /// Parse and validate configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] on parse or validation failure.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// The interval between sensor polls.
    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.acquisition.poll_interval_ms)
    }

    /// The interval between trend samples.
    #[must_use]
    pub fn trend_interval(&self) -> Duration {
        Duration::from_secs(self.acquisition.trend_interval_secs)
    }

    /// The echo rendezvous timeout: twice the poll interval, spanning at
    /// most one missed tick.
    #[must_use]
    pub fn echo_timeout(&self) -> Duration {
        self.poll_interval() * 2
    }

    /// Build the validated sensor dispatch table.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] for unknown model names, missing
    /// ADC parameters, or out-of-range channels.
    pub fn descriptors(&self) -> Result<Vec<SensorDescriptor>, ConfigError> {
        self.sensors.iter().map(SensorSection::descriptor).collect()
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.acquisition.poll_interval_ms == 0 {
            return Err(ConfigError::Invalid {
                reason: String::from("acquisition.poll_interval_ms must be at least 1"),
            });
        }
        if self.acquisition.trend_interval_secs == 0 {
            return Err(ConfigError::Invalid {
                reason: String::from("acquisition.trend_interval_secs must be at least 1"),
            });
        }
        if self.acquisition.history_capacity == 0 || self.acquisition.trend_capacity == 0 {
            return Err(ConfigError::Invalid {
                reason: String::from("buffer capacities must be at least 1"),
            });
        }
        // Surface descriptor problems at load time, not at first poll.
        self.descriptors().map(|_| ())
    }
}

impl SensorSection {
    fn descriptor(&self) -> Result<SensorDescriptor, ConfigError> {
        if self.channel > 7 {
            return Err(ConfigError::Invalid {
                reason: format!(
                    "sensor {}: channel {} out of range (expected 0..=7)",
                    self.name, self.channel
                ),
            });
        }
        let model = match self.model.to_lowercase().as_str() {
            "at30tse" => SensorModel::At30tse,
            "hts221" => SensorModel::Hts221,
            "bme280" => SensorModel::Bme280,
            "onboard" => SensorModel::Onboard,
            "adc101x" => {
                let vdd = self.vdd.ok_or_else(|| ConfigError::Invalid {
                    reason: format!("sensor {}: adc101x requires vdd", self.name),
                })?;
                if vdd <= 0.0 {
                    return Err(ConfigError::Invalid {
                        reason: format!("sensor {}: vdd must be positive", self.name),
                    });
                }
                let full_range = self.full_range.unwrap_or(1024);
                if full_range == 0 {
                    return Err(ConfigError::Invalid {
                        reason: format!("sensor {}: full_range must be positive", self.name),
                    });
                }
                SensorModel::Adc101x { vdd, full_range }
            }
            other => {
                return Err(ConfigError::Invalid {
                    reason: format!("sensor {}: unknown model {other:?}", self.name),
                });
            }
        };
        Ok(SensorDescriptor {
            name: self.name.clone(),
            channel: self.channel,
            model,
            i2c_addr: self.i2c_addr,
        })
    }
}
