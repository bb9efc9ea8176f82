//! Human-readable error descriptions, exit codes and structured JSON errors.

use scale_core::error::{BuildError, TelemetryError};
use scale_hardware::HwError;
use std::fmt;
use std::path::PathBuf;

/// Context attached to every failure while loading the config file.
#[derive(Debug)]
pub struct ConfigLoad(pub PathBuf);

impl fmt::Display for ConfigLoad {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid configuration in {}", self.0.display())
    }
}

/// Coarse failure class; drives the exit code and the JSON `reason`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Config,
    Device,
    Timeout,
    Interrupted,
    Other,
}

impl Kind {
    pub fn exit_code(self) -> i32 {
        match self {
            Kind::Config => 2,
            Kind::Device => 3,
            Kind::Timeout => 4,
            Kind::Interrupted | Kind::Other => 1,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Kind::Config => "Config",
            Kind::Device => "Device",
            Kind::Timeout => "Timeout",
            Kind::Interrupted => "Interrupted",
            Kind::Other => "Error",
        }
    }
}

fn hw_kind(e: &HwError) -> Kind {
    match e {
        HwError::Timeout => Kind::Timeout,
        HwError::InvalidDeviceId(_) | HwError::Unsupported => Kind::Config,
        HwError::Io(_)
        | HwError::Disconnected
        | HwError::Decode { .. }
        | HwError::NoPorts
        | HwError::NoMatchingPort { .. }
        | HwError::Serial(_) => Kind::Device,
    }
}

fn telemetry_kind(e: &TelemetryError) -> Kind {
    match e {
        TelemetryError::Config(_) => Kind::Config,
        TelemetryError::Disconnected | TelemetryError::Io(_) | TelemetryError::Hardware(_) => {
            Kind::Device
        }
        TelemetryError::Timeout => Kind::Timeout,
        TelemetryError::Cancelled => Kind::Interrupted,
    }
}

/// Classify a report by the typed errors it carries, outermost first.
pub fn classify(err: &eyre::Report) -> Kind {
    if err.downcast_ref::<ConfigLoad>().is_some() || err.downcast_ref::<BuildError>().is_some() {
        return Kind::Config;
    }
    if let Some(te) = err.downcast_ref::<TelemetryError>() {
        return telemetry_kind(te);
    }
    for cause in err.chain() {
        if let Some(hw) = cause.downcast_ref::<HwError>() {
            return hw_kind(hw);
        }
        if let Some(te) = cause.downcast_ref::<TelemetryError>() {
            return telemetry_kind(te);
        }
    }
    Kind::Other
}

/// Map an eyre::Report to a human-readable explanation with likely causes and fix hints.
pub fn humanize(err: &eyre::Report) -> String {
    if err.downcast_ref::<ConfigLoad>().is_some() {
        let root = err.root_cause();
        return format!(
            "What happened: The config file could not be used ({root}).\nLikely causes: Wrong --config path, a TOML typo, or an out-of-range value.\nHow to fix: Edit the config file, then rerun. See etc/scale.toml for a sample."
        );
    }

    if let Some(BuildError::MissingDeviceId) = err.downcast_ref::<BuildError>() {
        return "What happened: No scale device id is configured.\nLikely causes: use_synthetic = false without device_id.\nHow to fix: Set device_id = \"VID:PID\" (see `scale ports`) or set use_synthetic = true.".to_string();
    }

    if let Some(hw) = err.chain().find_map(|c| c.downcast_ref::<HwError>()) {
        match hw {
            HwError::NoPorts => {
                return "What happened: No serial ports were found.\nLikely causes: The scale's USB adapter is unplugged or its driver is missing.\nHow to fix: Plug in the scale and check that the OS lists a serial device.".to_string();
            }
            HwError::NoMatchingPort { wanted, available } => {
                return format!(
                    "What happened: No serial port matches device id {wanted}.\nLikely causes: A different adapter is plugged in, or the id is not written exactly as enumerated (available: {available}).\nHow to fix: Run `scale ports` and copy the id into device_id."
                );
            }
            HwError::Unsupported => {
                return "What happened: This build cannot open serial ports.\nLikely causes: Built without the `hardware` feature.\nHow to fix: Rebuild with --features hardware, or set use_synthetic = true.".to_string();
            }
            HwError::InvalidDeviceId(id) => {
                return format!(
                    "What happened: Device id {id:?} is not a USB VID:PID.\nLikely causes: Typo or lowercase hex in device_id.\nHow to fix: Use four uppercase hex digits on each side, e.g. 1A86:7523."
                );
            }
            _ => {}
        }
    }

    if let Some(te) = err.downcast_ref::<TelemetryError>() {
        return match te {
            TelemetryError::Timeout => "What happened: No reading arrived in time.\nLikely causes: The instrument is quiet, unplugged, or request.take_timeout_ms is too low.\nHow to fix: Check the cable and the scale display; raise request.take_timeout_ms.".to_string(),
            TelemetryError::Disconnected => "What happened: The scale stream ended.\nLikely causes: USB cable pulled, adapter reset, or the replayed capture ran out.\nHow to fix: Reconnect the scale and restart.".to_string(),
            TelemetryError::Cancelled => {
                "What happened: Interrupted before a reading arrived.".to_string()
            }
            other => format!(
                "What happened: {other}.\nLikely causes: See logs.\nHow to fix: Re-run with --log-level=debug or set RUST_LOG for more detail."
            ),
        };
    }

    // Generic fallback
    let msg = err.to_string();
    let mut cause = String::new();
    if let Some(src) = err.source() {
        cause = format!(" Cause: {src}");
    }
    format!(
        "Something went wrong.{cause}\nHow to fix: Re-run with --log-level=debug for details. Original: {msg}"
    )
}

pub fn exit_code_for_error(err: &eyre::Report) -> i32 {
    classify(err).exit_code()
}

/// Structured JSON for errors when --json is enabled.
pub fn format_error_json(err: &eyre::Report) -> String {
    serde_json::json!({
        "reason": classify(err).name(),
        "message": humanize(err),
    })
    .to_string()
}
