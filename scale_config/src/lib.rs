#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
//! Config schema for the weighing station.
//!
//! `Config` is deserialized from TOML and checked by `validate()`. The two
//! source-selection keys sit at the top level and also accept the names used
//! by older station files (`UseFakeScale`, `UsdScaleDeviceId`).
use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SerialCfg {
    pub baud_rate: u32,
    /// Per-read timeout on the port; bounds shutdown latency of the sampler.
    pub read_timeout_ms: u64,
}

impl Default for SerialCfg {
    fn default() -> Self {
        Self {
            baud_rate: 9600,
            read_timeout_ms: 100,
        }
    }
}

/// Column layout of instrument lines. Defaults match `S  12.34  kg`.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ProtocolCfg {
    pub marker_offset: usize,
    pub stable_code: String,
    pub header_width: usize,
    pub magnitude_token: usize,
}

impl Default for ProtocolCfg {
    fn default() -> Self {
        Self {
            marker_offset: 0,
            stable_code: "S".to_string(),
            header_width: 1,
            magnitude_token: 0,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SyntheticCfg {
    pub interval_ms: u64,
    pub max_weight_kg: f64,
    pub stable_probability: f64,
    /// Fixed RNG seed for reproducible runs; random when absent.
    pub seed: Option<u64>,
}

impl Default for SyntheticCfg {
    fn default() -> Self {
        Self {
            interval_ms: 1000,
            max_weight_kg: 1.0,
            stable_probability: 0.7,
            seed: None,
        }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct RequestCfg {
    /// Give up on a "current weight" request after this long; absent = wait indefinitely.
    pub take_timeout_ms: Option<u64>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Logging {
    pub file: Option<String>,  // path to .log (JSON lines)
    pub level: Option<String>, // "info","debug"
    /// Log rotation policy: "never" | "daily" | "hourly" (default: never)
    pub rotation: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
pub struct Config {
    /// Use the synthetic scale instead of the serial instrument.
    #[serde(default, alias = "UseFakeScale")]
    pub use_synthetic: bool,
    /// USB `VID:PID` of the scale's serial adapter (uppercase hex).
    #[serde(default, alias = "UsdScaleDeviceId")]
    pub device_id: Option<String>,
    #[serde(default)]
    pub serial: SerialCfg,
    #[serde(default)]
    pub protocol: ProtocolCfg,
    #[serde(default)]
    pub synthetic: SyntheticCfg,
    #[serde(default)]
    pub request: RequestCfg,
    #[serde(default)]
    pub logging: Logging,
}

pub fn load_toml(s: &str) -> Result<Config, toml::de::Error> {
    toml::from_str::<Config>(s)
}

/// Read, parse and validate a config file.
pub fn load_file(path: &std::path::Path) -> eyre::Result<Config> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| eyre::eyre!("read config {}: {}", path.display(), e))?;
    let cfg =
        load_toml(&text).map_err(|e| eyre::eyre!("parse config {}: {}", path.display(), e))?;
    cfg.validate()?;
    Ok(cfg)
}

/// `XXXX:XXXX`, uppercase hex, as rendered by port enumeration.
fn is_usb_id(s: &str) -> bool {
    let Some((vid, pid)) = s.split_once(':') else {
        return false;
    };
    let part_ok = |p: &str| {
        p.len() == 4
            && p
                .bytes()
                .all(|b| b.is_ascii_digit() || (b'A'..=b'F').contains(&b))
    };
    part_ok(vid) && part_ok(pid)
}

impl Config {
    pub fn validate(&self) -> eyre::Result<()> {
        // Source selection
        if !self.use_synthetic {
            match self.device_id.as_deref() {
                None | Some("") => {
                    eyre::bail!("device_id must be set when use_synthetic = false")
                }
                Some(id) if !is_usb_id(id) => eyre::bail!(
                    "device_id {id:?} must be VID:PID in uppercase hex (e.g. \"1A86:7523\")"
                ),
                Some(_) => {}
            }
        }

        // Serial
        if self.serial.baud_rate == 0 {
            eyre::bail!("serial.baud_rate must be > 0");
        }
        if self.serial.read_timeout_ms == 0 {
            eyre::bail!("serial.read_timeout_ms must be >= 1");
        }

        // Protocol
        if self.protocol.stable_code.len() != 1 || !self.protocol.stable_code.is_ascii() {
            eyre::bail!("protocol.stable_code must be exactly one ASCII character");
        }
        if self.protocol.header_width == 0 {
            eyre::bail!("protocol.header_width must be >= 1");
        }
        if self.protocol.header_width > 256 || self.protocol.marker_offset > 256 {
            eyre::bail!("protocol offsets are unreasonably large (>256)");
        }

        // Synthetic
        if self.synthetic.interval_ms == 0 {
            eyre::bail!("synthetic.interval_ms must be >= 1");
        }
        if !self.synthetic.max_weight_kg.is_finite() || self.synthetic.max_weight_kg <= 0.0 {
            eyre::bail!("synthetic.max_weight_kg must be finite and > 0");
        }
        if !(0.0..=1.0).contains(&self.synthetic.stable_probability) {
            eyre::bail!("synthetic.stable_probability must be in [0.0, 1.0]");
        }

        // Request
        if self.request.take_timeout_ms == Some(0) {
            eyre::bail!("request.take_timeout_ms must be >= 1 when set");
        }

        // Logging
        if let Some(rot) = self.logging.rotation.as_deref()
            && !matches!(rot, "never" | "daily" | "hourly")
        {
            eyre::bail!("logging.rotation must be one of never|daily|hourly, got {rot:?}");
        }

        Ok(())
    }

    /// Stability marker as a byte; only meaningful after `validate()`.
    pub fn stable_code_byte(&self) -> u8 {
        self.protocol.stable_code.bytes().next().unwrap_or(b'S')
    }
}
