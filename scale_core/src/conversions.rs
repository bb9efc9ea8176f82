//! Bridges `scale_config` sections to the driver-level settings in `scale_hardware`.
//!
//! Free functions rather than `From` impls: both sides are foreign to this crate.

use scale_config::Config;
use scale_hardware::{SerialSettings, SyntheticCfg, WireFormat};
use std::time::Duration;

// ── WireFormat ───────────────────────────────────────────────────────────────

pub fn wire_format(cfg: &Config) -> WireFormat {
    WireFormat {
        marker_offset: cfg.protocol.marker_offset,
        stable_code: cfg.stable_code_byte(),
        header_width: cfg.protocol.header_width,
        magnitude_token: cfg.protocol.magnitude_token,
    }
}

// ── SerialSettings ───────────────────────────────────────────────────────────

pub fn serial_settings(cfg: &Config) -> SerialSettings {
    SerialSettings {
        baud_rate: cfg.serial.baud_rate,
        read_timeout: Duration::from_millis(cfg.serial.read_timeout_ms),
    }
}

// ── SyntheticCfg ─────────────────────────────────────────────────────────────

pub fn synthetic_cfg(cfg: &Config) -> SyntheticCfg {
    SyntheticCfg {
        interval: Duration::from_millis(cfg.synthetic.interval_ms),
        max_weight_kg: cfg.synthetic.max_weight_kg,
        stable_probability: cfg.synthetic.stable_probability,
        seed: cfg.synthetic.seed,
    }
}

/// Upper bound on each driver read; also the sampler's shutdown latency.
pub fn poll_interval(cfg: &Config) -> Duration {
    Duration::from_millis(cfg.serial.read_timeout_ms.max(1))
}

pub fn take_timeout(cfg: &Config) -> Option<Duration> {
    cfg.request.take_timeout_ms.map(Duration::from_millis)
}
