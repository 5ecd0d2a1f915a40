//! Simulated device bus for running without hardware.
//!
//! Hands out plausible jittered readings for every supported device
//! model. Real register-level drivers plug into the same [`SensorBus`]
//! seam; this driver exists so the daemon (and anyone poking at the
//! dashboard) can run on a development machine.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use telemon_core::sensors::{BusError, SensorBus};
use tracing::debug;

/// A fake bus producing jittered readings around fixed baselines.
pub struct SimulatedBus {
    rng: StdRng,
}

impl SimulatedBus {
    /// "Open" the simulated bus. Logs the would-be device coordinates so
    /// a sim run reads like a real one.
    #[must_use]
    pub fn open(id: u8, addr: u8) -> Self {
        debug!(id, addr, "simulated bus opened");
        Self {
            rng: StdRng::from_os_rng(),
        }
    }

    fn jitter(&mut self, spread: f64) -> f64 {
        self.rng.random_range(-spread..spread)
    }
}

impl SensorBus for SimulatedBus {
    fn select(&mut self, _mask: u8) -> Result<(), BusError> {
        Ok(())
    }

    fn read_at30tse(&mut self, _addr: Option<u8>) -> Result<f64, BusError> {
        Ok(21.0 + self.jitter(0.8))
    }

    fn read_hts221(&mut self) -> Result<(f64, f64), BusError> {
        Ok((45.0 + self.jitter(4.0), 20.0 + self.jitter(0.8)))
    }

    fn read_bme280(&mut self) -> Result<(f64, f64, f64), BusError> {
        Ok((
            50.0 + self.jitter(4.0),
            1013.25 + self.jitter(1.5),
            19.0 + self.jitter(0.8),
        ))
    }

    fn read_tsl2591(&mut self) -> Result<f64, BusError> {
        Ok((900.0 + self.jitter(120.0)).max(0.0))
    }

    fn read_adc101x(&mut self) -> Result<u16, BusError> {
        let counts = (512.0 + self.jitter(48.0)).clamp(0.0, 1023.0);
        Ok(counts as u16)
    }
}
