//! Readings and immutable timestamped snapshots.
//!
//! A [`Snapshot`] is one acquisition cycle's worth of sensor data: a UTC
//! timestamp plus an ordered sequence of [`Reading`]s. Snapshots are
//! immutable once produced -- they are copied into history buffers and
//! serialized payloads, never mutated.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::kind::MeasurementKind;

/// A single named measurement taken from one sensor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    /// The configured sensor name this reading came from.
    pub name: String,
    /// The physical quantity measured.
    #[serde(rename = "type")]
    pub kind: MeasurementKind,
    /// The measured value, in the kind's natural unit.
    pub value: f64,
}

/// One immutable, timestamped set of sensor readings.
///
/// The `labels` map records which kinds each configured sensor produces,
/// so a dashboard can lay out its panels without scanning the readings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// When the acquisition cycle that produced this snapshot ran.
    pub timestamp: DateTime<Utc>,
    /// All readings from this cycle, in descriptor order.
    #[serde(rename = "sensors")]
    pub readings: Vec<Reading>,
    /// Kinds produced per sensor name.
    pub labels: BTreeMap<String, Vec<MeasurementKind>>,
}

impl Snapshot {
    /// Create an empty snapshot stamped `now`.
    #[must_use]
    pub fn new(timestamp: DateTime<Utc>) -> Self {
        Self {
            timestamp,
            readings: Vec::new(),
            labels: BTreeMap::new(),
        }
    }

    /// Record one reading and its label entry.
    pub fn record(&mut self, name: &str, kind: MeasurementKind, value: f64) {
        self.readings.push(Reading {
            name: name.to_owned(),
            kind,
            value,
        });
        let kinds = self.labels.entry(name.to_owned()).or_default();
        if !kinds.contains(&kind) {
            kinds.push(kind);
        }
    }

    /// The value a named sensor reported for the given kind, if any.
    #[must_use]
    pub fn value_of(&self, name: &str, kind: MeasurementKind) -> Option<f64> {
        self.readings
            .iter()
            .find(|r| r.kind == kind && r.name == name)
            .map(|r| r.value)
    }

    /// Sensor names that produce the given kind, in label order.
    #[must_use]
    pub fn names_for(&self, kind: MeasurementKind) -> Vec<&str> {
        self.labels
            .iter()
            .filter(|(_, kinds)| kinds.contains(&kind))
            .map(|(name, _)| name.as_str())
            .collect()
    }

    /// Render the readings as an aligned plain-text table.
    ///
    /// One line per reading: `name  value  (kind)`, columns padded to the
    /// widest entry. This is the `data` field of the broadcast frame.
    #[must_use]
    pub fn text_table(&self) -> String {
        let name_width = self
            .readings
            .iter()
            .map(|r| r.name.len())
            .max()
            .unwrap_or(0);
        let value_width = self
            .readings
            .iter()
            .map(|r| format!("{}", r.value).len())
            .max()
            .unwrap_or(0);

        let mut out = String::new();
        for r in &self.readings {
            out.push_str(&format!(
                "{:<nw$} {:<vw$} ({})\n",
                r.name,
                r.value,
                r.kind,
                nw = name_width,
                vw = value_width,
            ));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use chrono::Utc;

    use super::Snapshot;
    use crate::kind::MeasurementKind;

    fn sample() -> Snapshot {
        let mut snap = Snapshot::new(Utc::now());
        snap.record("cave", MeasurementKind::Humidity, 41.5);
        snap.record("cave", MeasurementKind::Temperature, 19.25);
        snap.record("roof", MeasurementKind::Luminosity, 1200.0);
        snap
    }

    #[test]
    fn record_tracks_labels_without_duplicates() {
        let mut snap = sample();
        snap.record("cave", MeasurementKind::Humidity, 42.0);
        assert_eq!(
            snap.labels.get("cave").unwrap(),
            &[MeasurementKind::Humidity, MeasurementKind::Temperature]
        );
    }

    #[test]
    fn value_of_finds_by_name_and_kind() {
        let snap = sample();
        assert_eq!(snap.value_of("cave", MeasurementKind::Temperature), Some(19.25));
        assert_eq!(snap.value_of("roof", MeasurementKind::Temperature), None);
    }

    #[test]
    fn names_for_filters_by_kind() {
        let snap = sample();
        assert_eq!(snap.names_for(MeasurementKind::Temperature), vec!["cave"]);
        assert!(snap.names_for(MeasurementKind::Voltage).is_empty());
    }

    #[test]
    fn wire_format_matches_dashboard_contract() {
        let snap = sample();
        let json: serde_json::Value = serde_json::from_str(&serde_json::to_string(&snap).unwrap()).unwrap();
        assert!(json.get("timestamp").is_some());
        assert_eq!(json["sensors"][0]["name"], "cave");
        assert_eq!(json["sensors"][0]["type"], "humidity");
        assert_eq!(json["labels"]["cave"][1], "temperature");
    }

    #[test]
    fn text_table_aligns_columns() {
        let table = sample().text_table();
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("cave "));
        assert!(lines[2].contains("(luminosity)"));
    }
}
