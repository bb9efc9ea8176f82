//! Synthetic scale for stations without hardware.
//!
//! Fabricates one reading per interval. Unstable readings get an extra
//! random multiplier so the values look noisier while "in motion".
use std::time::{Duration, Instant};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use scale_traits::{Reading, Scale};
use tracing::trace;

use crate::error::{HwError, Result};

#[derive(Debug, Clone, Copy)]
pub struct SyntheticCfg {
    pub interval: Duration,
    /// Upper bound (exclusive) of the settled magnitude, in kg.
    pub max_weight_kg: f64,
    pub stable_probability: f64,
    pub seed: Option<u64>,
}

impl Default for SyntheticCfg {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(1),
            max_weight_kg: 1.0,
            stable_probability: 0.7,
            seed: None,
        }
    }
}

pub struct SyntheticScale {
    cfg: SyntheticCfg,
    rng: StdRng,
    next_due: Option<Instant>,
}

impl SyntheticScale {
    /// A non-finite `stable_probability` falls back to the default; finite
    /// values are clamped to `[0, 1]`.
    pub fn new(mut cfg: SyntheticCfg) -> Self {
        cfg.stable_probability = if cfg.stable_probability.is_finite() {
            cfg.stable_probability.clamp(0.0, 1.0)
        } else {
            SyntheticCfg::default().stable_probability
        };
        let rng = match cfg.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self {
            cfg,
            rng,
            next_due: None,
        }
    }

    /// Fabricate one reading without pacing.
    pub fn fabricate(&mut self) -> Reading {
        let mut weight = self.rng.random::<f64>() * self.cfg.max_weight_kg;
        let stable = self.rng.random_bool(self.cfg.stable_probability);
        if !stable {
            weight *= 0.3 + self.rng.random::<f64>();
        }
        Reading::new(weight, stable)
    }

    /// Wait up to `timeout` for the next reading to fall due.
    ///
    /// The first reading is produced immediately; later ones follow the
    /// configured interval. Returns [`HwError::Timeout`] when the reading is
    /// not yet due so callers can check for shutdown.
    pub fn next_reading(&mut self, timeout: Duration) -> Result<Reading> {
        let now = Instant::now();
        let due = *self.next_due.get_or_insert(now);
        if due > now {
            let wait = due - now;
            if wait > timeout {
                std::thread::sleep(timeout);
                return Err(HwError::Timeout);
            }
            std::thread::sleep(wait);
        }
        // Schedule from the due time so the cadence does not drift
        self.next_due = Some(due + self.cfg.interval);
        let reading = self.fabricate();
        trace!(weight = reading.weight, stable = reading.stable, "synthetic reading");
        Ok(reading)
    }
}

impl Scale for SyntheticScale {
    fn read(
        &mut self,
        timeout: Duration,
    ) -> std::result::Result<Reading, Box<dyn std::error::Error + Send + Sync>> {
        self.next_reading(timeout).map_err(Into::into)
    }
}
