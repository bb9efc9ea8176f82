//! The closed set of reading sources, chosen once from configuration.

use eyre::WrapErr;
use scale_config::Config;
use scale_hardware::{DeviceScale, SyntheticScale};
use scale_traits::{Reading, Scale};
use std::time::Duration;

use crate::conversions::{serial_settings, synthetic_cfg, wire_format};
use crate::error::{BuildError, Result};

pub enum SourceDriver {
    /// Serial-attached instrument (or a replayed capture of one).
    Device(DeviceScale),
    /// Random readings at a fixed cadence, for stations without hardware.
    Synthetic(SyntheticScale),
}

impl SourceDriver {
    /// Build the driver the config selects. Device mode enumerates ports and
    /// opens the matching adapter; failures here are configuration faults.
    pub fn from_config(cfg: &Config) -> Result<Self> {
        if cfg.use_synthetic {
            tracing::info!("using synthetic scale");
            return Ok(Self::Synthetic(SyntheticScale::new(synthetic_cfg(cfg))));
        }
        let device_id = cfg
            .device_id
            .as_deref()
            .filter(|id| !id.is_empty())
            .ok_or_else(|| eyre::Report::new(BuildError::MissingDeviceId))?;
        let scale = scale_hardware::open_device(device_id, serial_settings(cfg), wire_format(cfg))
            .wrap_err_with(|| format!("open scale device {device_id}"))?;
        Ok(Self::Device(scale))
    }

    /// Device driver fed from a captured stream instead of a serial port.
    pub fn replay(path: &std::path::Path, cfg: &Config) -> Result<Self> {
        let scale = scale_hardware::open_replay(path, wire_format(cfg))
            .wrap_err_with(|| format!("open capture {}", path.display()))?;
        Ok(Self::Device(scale))
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Device(_) => "device",
            Self::Synthetic(_) => "synthetic",
        }
    }
}

impl Scale for SourceDriver {
    fn read(
        &mut self,
        timeout: Duration,
    ) -> std::result::Result<Reading, Box<dyn std::error::Error + Send + Sync>> {
        match self {
            Self::Device(s) => s.read(timeout),
            Self::Synthetic(s) => s.read(timeout),
        }
    }
}
