//! The closed enumeration of measurement kinds.
//!
//! Every reading produced by a sensor carries exactly one
//! [`MeasurementKind`]. The set is closed: adding a kind means adding a
//! variant here and letting the compiler point at every match that needs
//! updating. There is deliberately no "unknown" variant -- an unknown kind
//! is a programming error, not a runtime condition.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The physical quantity a reading measures.
///
/// Serialized as its lowercase name (`"humidity"`, `"pressure"`, ...),
/// matching the wire format consumed by dashboard clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MeasurementKind {
    /// Relative humidity, in percent.
    Humidity,
    /// Atmospheric pressure, in hPa.
    Pressure,
    /// Temperature, in degrees Celsius.
    Temperature,
    /// Ambient light level, in lux.
    Luminosity,
    /// Measured voltage, in volts.
    Voltage,
}

impl MeasurementKind {
    /// All kinds, in display order.
    ///
    /// Used by renderers that lay out one panel per kind.
    pub const ALL: [Self; 5] = [
        Self::Humidity,
        Self::Pressure,
        Self::Temperature,
        Self::Luminosity,
        Self::Voltage,
    ];

    /// The lowercase name used on the wire and in logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Humidity => "humidity",
            Self::Pressure => "pressure",
            Self::Temperature => "temperature",
            Self::Luminosity => "luminosity",
            Self::Voltage => "voltage",
        }
    }
}

impl fmt::Display for MeasurementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
