//! Sensor descriptors, the device bus capability, and the snapshot source.
//!
//! The descriptor model is a closed tagged variant over the supported
//! device models: each [`SensorModel`] maps to exactly one read strategy,
//! selected by an exhaustive match when [`BusSource::poll`] walks the
//! dispatch table built at configuration time. Adding a model means
//! adding a variant and letting the compiler flag every match to update.
//!
//! Register-level device protocol is out of scope: it hides behind the
//! [`SensorBus`] trait, which exposes one typed read per device model.

use chrono::Utc;
use telemon_types::{MeasurementKind, Snapshot};

/// Mux action masks indexed by channel id: a sensor on channel `n` is
/// reached by selecting mask `1 << n` first.
const MUX_MASKS: [u8; 8] = [0x01, 0x02, 0x04, 0x08, 0x10, 0x20, 0x40, 0x80];

/// The supported device models.
///
/// `Adc101x` carries its conversion parameters: the reference voltage and
/// the ADC full range, used to turn raw counts into volts.
#[derive(Debug, Clone, PartialEq)]
pub enum SensorModel {
    /// AT30TSE75x temperature sensor.
    At30tse,
    /// HTS221 humidity and temperature sensor.
    Hts221,
    /// BME280 humidity, pressure, and temperature sensor.
    Bme280,
    /// Onboard combo: BME280 pressure plus TSL2591 luminosity.
    Onboard,
    /// ADC101x analog-to-digital converter reporting a voltage.
    Adc101x {
        /// Reference supply voltage.
        vdd: f64,
        /// Full scale of the raw counts (1024 for a 10-bit ADC).
        full_range: u16,
    },
}

impl SensorModel {
    /// The measurement kinds this model produces, in reading order.
    #[must_use]
    pub const fn kinds(&self) -> &'static [MeasurementKind] {
        match self {
            Self::At30tse => &[MeasurementKind::Temperature],
            Self::Hts221 => &[MeasurementKind::Humidity, MeasurementKind::Temperature],
            Self::Bme280 => &[
                MeasurementKind::Humidity,
                MeasurementKind::Pressure,
                MeasurementKind::Temperature,
            ],
            Self::Onboard => &[MeasurementKind::Pressure, MeasurementKind::Luminosity],
            Self::Adc101x { .. } => &[MeasurementKind::Voltage],
        }
    }
}

/// One configured sensor: a name, a mux channel, a model, and an optional
/// device address override.
#[derive(Debug, Clone, PartialEq)]
pub struct SensorDescriptor {
    /// The label this sensor's readings carry.
    pub name: String,
    /// Mux channel the device sits behind (0..=7).
    pub channel: u8,
    /// The device model, which fixes the read strategy.
    pub model: SensorModel,
    /// Device address override; `None` uses the model default.
    pub i2c_addr: Option<u8>,
}

/// A failure reported by the device bus.
#[derive(Debug, thiserror::Error)]
#[error("bus error: {0}")]
pub struct BusError(pub String);

/// Errors produced while building or polling a snapshot source.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// A device read failed. Transient: the acquisition loop logs it and
    /// skips the tick.
    #[error("reading sensor {name}: {source}")]
    Read {
        /// The configured sensor name.
        name: String,
        /// The underlying bus failure.
        source: BusError,
    },

    /// A descriptor references a mux channel outside 0..=7.
    #[error("sensor {name}: channel {channel} out of range (expected 0..=7)")]
    Channel {
        /// The configured sensor name.
        name: String,
        /// The offending channel id.
        channel: u8,
    },
}

/// Opaque device access, one typed read per supported model.
///
/// Implementations own the wire protocol (I2C registers, calibration,
/// unit conversion up to raw counts); the core never sees any of it.
pub trait SensorBus: Send {
    /// Select a mux channel before addressing the device behind it.
    fn select(&mut self, mask: u8) -> Result<(), BusError>;

    /// Read an AT30TSE75x: temperature in Celsius.
    fn read_at30tse(&mut self, addr: Option<u8>) -> Result<f64, BusError>;

    /// Read an HTS221: (humidity %, temperature C).
    fn read_hts221(&mut self) -> Result<(f64, f64), BusError>;

    /// Read a BME280: (humidity %, pressure hPa, temperature C).
    fn read_bme280(&mut self) -> Result<(f64, f64, f64), BusError>;

    /// Read a TSL2591: luminosity in lux.
    fn read_tsl2591(&mut self) -> Result<f64, BusError>;

    /// Read an ADC101x: raw counts.
    fn read_adc101x(&mut self) -> Result<u16, BusError>;
}

/// The "read one snapshot" capability the acquisition loop depends on.
pub trait SnapshotSource: Send {
    /// Produce one immutable snapshot, or fail.
    fn poll(&mut self) -> Result<Snapshot, SourceError>;
}

/// A snapshot source that walks a fixed dispatch table over a device bus.
///
/// The table is validated once at construction; polling performs one
/// exhaustive-match read per descriptor and assembles the readings into
/// a single timestamped snapshot. Dropping the source releases the bus
/// handle, on every exit path of the owning task.
#[derive(Debug)]
pub struct BusSource<B> {
    bus: B,
    table: Vec<SensorDescriptor>,
}

impl<B: SensorBus> BusSource<B> {
    /// Build a source from a bus handle and validated descriptors.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Channel`] if any descriptor names a mux
    /// channel outside 0..=7. This is a configuration error, caught
    /// before the acquisition loop ever starts.
    pub fn new(bus: B, table: Vec<SensorDescriptor>) -> Result<Self, SourceError> {
        for descr in &table {
            if usize::from(descr.channel) >= MUX_MASKS.len() {
                return Err(SourceError::Channel {
                    name: descr.name.clone(),
                    channel: descr.channel,
                });
            }
        }
        Ok(Self { bus, table })
    }

    /// The configured descriptors, in poll order.
    #[must_use]
    pub fn descriptors(&self) -> &[SensorDescriptor] {
        &self.table
    }
}

impl<B: SensorBus> SnapshotSource for BusSource<B> {
    fn poll(&mut self) -> Result<Snapshot, SourceError> {
        let mut snapshot = Snapshot::new(Utc::now());
        for descr in &self.table {
            let mask = MUX_MASKS
                .get(usize::from(descr.channel))
                .copied()
                .ok_or(SourceError::Channel {
                    name: descr.name.clone(),
                    channel: descr.channel,
                })?;
            let read_failed = |source: BusError| SourceError::Read {
                name: descr.name.clone(),
                source,
            };

            self.bus.select(mask).map_err(read_failed)?;
            match &descr.model {
                SensorModel::At30tse => {
                    let temp = self.bus.read_at30tse(descr.i2c_addr).map_err(read_failed)?;
                    snapshot.record(&descr.name, MeasurementKind::Temperature, temp);
                }
                SensorModel::Hts221 => {
                    let (humi, temp) = self.bus.read_hts221().map_err(read_failed)?;
                    snapshot.record(&descr.name, MeasurementKind::Humidity, humi);
                    snapshot.record(&descr.name, MeasurementKind::Temperature, temp);
                }
                SensorModel::Bme280 => {
                    let (humi, pres, temp) = self.bus.read_bme280().map_err(read_failed)?;
                    snapshot.record(&descr.name, MeasurementKind::Humidity, humi);
                    snapshot.record(&descr.name, MeasurementKind::Pressure, pres);
                    snapshot.record(&descr.name, MeasurementKind::Temperature, temp);
                }
                SensorModel::Onboard => {
                    let (_, pres, _) = self.bus.read_bme280().map_err(read_failed)?;
                    snapshot.record(&descr.name, MeasurementKind::Pressure, pres);
                    let lux = self.bus.read_tsl2591().map_err(read_failed)?;
                    snapshot.record(&descr.name, MeasurementKind::Luminosity, lux);
                }
                SensorModel::Adc101x { vdd, full_range } => {
                    let raw = self.bus.read_adc101x().map_err(read_failed)?;
                    let volts = f64::from(raw) * vdd / f64::from(*full_range);
                    snapshot.record(&descr.name, MeasurementKind::Voltage, volts);
                }
            }
        }
        Ok(snapshot)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use telemon_types::MeasurementKind;

    use super::{
        BusError, BusSource, SensorBus, SensorDescriptor, SensorModel, SnapshotSource, SourceError,
    };

    /// Records selected masks and hands out fixed values.
    #[derive(Debug, Default)]
    struct FakeBus {
        selected: Vec<u8>,
        fail_hts221: bool,
    }

    impl SensorBus for FakeBus {
        fn select(&mut self, mask: u8) -> Result<(), BusError> {
            self.selected.push(mask);
            Ok(())
        }

        fn read_at30tse(&mut self, _addr: Option<u8>) -> Result<f64, BusError> {
            Ok(21.5)
        }

        fn read_hts221(&mut self) -> Result<(f64, f64), BusError> {
            if self.fail_hts221 {
                return Err(BusError(String::from("nack")));
            }
            Ok((44.0, 20.0))
        }

        fn read_bme280(&mut self) -> Result<(f64, f64, f64), BusError> {
            Ok((50.0, 1013.25, 19.0))
        }

        fn read_tsl2591(&mut self) -> Result<f64, BusError> {
            Ok(800.0)
        }

        fn read_adc101x(&mut self) -> Result<u16, BusError> {
            Ok(512)
        }
    }

    fn table() -> Vec<SensorDescriptor> {
        vec![
            SensorDescriptor {
                name: String::from("outer"),
                channel: 0,
                model: SensorModel::At30tse,
                i2c_addr: None,
            },
            SensorDescriptor {
                name: String::from("board"),
                channel: 3,
                model: SensorModel::Onboard,
                i2c_addr: None,
            },
            SensorDescriptor {
                name: String::from("rail"),
                channel: 7,
                model: SensorModel::Adc101x {
                    vdd: 3.3,
                    full_range: 1024,
                },
                i2c_addr: None,
            },
        ]
    }

    #[test]
    fn poll_walks_the_dispatch_table_in_order() {
        let mut source = BusSource::new(FakeBus::default(), table()).unwrap();
        let snapshot = source.poll().unwrap();

        // Channel ids 0, 3, 7 map to masks 0x01, 0x08, 0x80.
        assert_eq!(source.bus.selected, vec![0x01, 0x08, 0x80]);

        assert_eq!(snapshot.value_of("outer", MeasurementKind::Temperature), Some(21.5));
        assert_eq!(snapshot.value_of("board", MeasurementKind::Pressure), Some(1013.25));
        assert_eq!(snapshot.value_of("board", MeasurementKind::Luminosity), Some(800.0));
    }

    #[test]
    fn adc_counts_convert_to_volts() {
        let mut source = BusSource::new(FakeBus::default(), table()).unwrap();
        let snapshot = source.poll().unwrap();
        let volts = snapshot.value_of("rail", MeasurementKind::Voltage).unwrap();
        assert!((volts - 512.0 * 3.3 / 1024.0).abs() < 1e-9);
    }

    #[test]
    fn labels_reflect_model_kinds() {
        let mut source = BusSource::new(FakeBus::default(), table()).unwrap();
        let snapshot = source.poll().unwrap();
        assert_eq!(
            snapshot.labels.get("board").unwrap(),
            &[MeasurementKind::Pressure, MeasurementKind::Luminosity]
        );
    }

    #[test]
    fn out_of_range_channel_is_rejected_at_construction() {
        let descr = SensorDescriptor {
            name: String::from("bad"),
            channel: 8,
            model: SensorModel::Hts221,
            i2c_addr: None,
        };
        let err = BusSource::new(FakeBus::default(), vec![descr]).unwrap_err();
        assert!(matches!(err, SourceError::Channel { channel: 8, .. }));
    }

    #[test]
    fn read_failure_carries_the_sensor_name() {
        let bus = FakeBus {
            fail_hts221: true,
            ..FakeBus::default()
        };
        let descr = SensorDescriptor {
            name: String::from("cave"),
            channel: 1,
            model: SensorModel::Hts221,
            i2c_addr: None,
        };
        let mut source = BusSource::new(bus, vec![descr]).unwrap();
        let err = source.poll().unwrap_err();
        assert!(err.to_string().contains("cave"));
    }
}
