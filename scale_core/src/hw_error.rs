//! Classifies `Box<dyn Error>` from the `Scale` trait boundary.
//!
//! The sampler needs three outcomes: keep waiting, drop this line, or stop.
//! Known `scale_hardware` errors are matched by downcast; anything else falls
//! back to string heuristics.

use crate::error::TelemetryError;
use scale_hardware::{DecodeError, HwError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fault {
    /// Nothing arrived within the poll window.
    Idle,
    /// One bad line; skip it and keep reading.
    Transient,
    /// The driver cannot continue.
    Fatal(TelemetryError),
}

pub fn classify(e: &(dyn std::error::Error + 'static)) -> Fault {
    if let Some(hw) = e.downcast_ref::<HwError>() {
        return match hw {
            HwError::Timeout => Fault::Idle,
            HwError::Decode { .. } => Fault::Transient,
            HwError::Disconnected => Fault::Fatal(TelemetryError::Disconnected),
            HwError::Io(io) => Fault::Fatal(TelemetryError::Io(io.to_string())),
            HwError::NoPorts
            | HwError::NoMatchingPort { .. }
            | HwError::InvalidDeviceId(_)
            | HwError::Unsupported => Fault::Fatal(TelemetryError::Config(hw.to_string())),
            HwError::Serial(msg) => Fault::Fatal(TelemetryError::Hardware(msg.clone())),
        };
    }
    if e.downcast_ref::<DecodeError>().is_some() {
        return Fault::Transient;
    }

    // Fallback: string-based detection
    let s = e.to_string();
    if s.to_lowercase().contains("timeout") {
        Fault::Idle
    } else {
        Fault::Fatal(TelemetryError::Hardware(s))
    }
}
