//! Serial port enumeration and device selection by USB `VID:PID`.
use std::fmt;
use std::str::FromStr;

use tracing::info;

use crate::error::{HwError, Result};

/// USB vendor/product pair, written `VID:PID` in hex (e.g. `1A86:7523`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UsbId {
    pub vid: u16,
    pub pid: u16,
}

impl FromStr for UsbId {
    type Err = HwError;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || HwError::InvalidDeviceId(s.to_string());
        let (vid, pid) = s.split_once(':').ok_or_else(invalid)?;
        let parse = |part: &str| {
            if part.len() != 4 || !part.bytes().all(|b| b.is_ascii_hexdigit()) {
                return Err(invalid());
            }
            u16::from_str_radix(part, 16).map_err(|_| invalid())
        };
        Ok(Self {
            vid: parse(vid)?,
            pid: parse(pid)?,
        })
    }
}

impl fmt::Display for UsbId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04X}:{:04X}", self.vid, self.pid)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsbInfo {
    pub id: UsbId,
    pub serial_number: Option<String>,
    pub manufacturer: Option<String>,
    pub product: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortInfo {
    pub name: String,
    pub usb: Option<UsbInfo>,
}

impl PortInfo {
    pub fn usb_id(&self) -> Option<UsbId> {
        self.usb.as_ref().map(|u| u.id)
    }
}

/// Pick the port whose USB id renders exactly as `device_id`.
///
/// The comparison is textual and case-sensitive: `1a86:7523` does not match
/// an adapter rendered as `1A86:7523`. There is no fallback to another port.
pub fn select_port<'a>(ports: &'a [PortInfo], device_id: &str) -> Result<&'a PortInfo> {
    if ports.is_empty() {
        return Err(HwError::NoPorts);
    }
    ports
        .iter()
        .find(|p| p.usb_id().is_some_and(|id| id.to_string() == device_id))
        .ok_or_else(|| HwError::NoMatchingPort {
            wanted: device_id.to_string(),
            available: describe_ports(ports),
        })
}

/// Compact one-line summary used in diagnostics.
pub fn describe_ports(ports: &[PortInfo]) -> String {
    if ports.is_empty() {
        return "none".to_string();
    }
    ports
        .iter()
        .map(|p| match p.usb_id() {
            Some(id) => format!("{} [{id}]", p.name),
            None => p.name.clone(),
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// Log every enumerated port the way the station banner does at startup.
pub fn log_ports(ports: &[PortInfo]) {
    if ports.is_empty() {
        info!("no serial ports found");
        return;
    }
    for p in ports {
        match &p.usb {
            Some(usb) => info!(
                port = %p.name,
                usb_id = %usb.id,
                serial = usb.serial_number.as_deref().unwrap_or("-"),
                "found serial port"
            ),
            None => info!(port = %p.name, "found serial port"),
        }
    }
}

/// Enumerate serial adapters known to the OS.
#[cfg(feature = "hardware")]
pub fn enumerate_ports() -> Result<Vec<PortInfo>> {
    let ports = serialport::available_ports()?;
    Ok(ports
        .into_iter()
        .map(|p| PortInfo {
            name: p.port_name,
            usb: match p.port_type {
                serialport::SerialPortType::UsbPort(u) => Some(UsbInfo {
                    id: UsbId {
                        vid: u.vid,
                        pid: u.pid,
                    },
                    serial_number: u.serial_number,
                    manufacturer: u.manufacturer,
                    product: u.product,
                }),
                _ => None,
            },
        })
        .collect())
}

#[cfg(not(feature = "hardware"))]
pub fn enumerate_ports() -> Result<Vec<PortInfo>> {
    Err(HwError::Unsupported)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_and_renders_uppercase() {
        let id: UsbId = "1A86:7523".parse().unwrap();
        assert_eq!(id, UsbId { vid: 0x1A86, pid: 0x7523 });
        assert_eq!(id.to_string(), "1A86:7523");
    }

    #[test]
    fn rejects_malformed_ids() {
        for bad in ["", "1A86", "1A86-7523", "1A8:7523", "1A86:75234", "ZZZZ:0001", ":"] {
            assert!(
                matches!(bad.parse::<UsbId>(), Err(HwError::InvalidDeviceId(_))),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn describe_lists_names_and_ids() {
        let ports = vec![
            PortInfo {
                name: "/dev/ttyS0".into(),
                usb: None,
            },
            PortInfo {
                name: "/dev/ttyUSB0".into(),
                usb: Some(UsbInfo {
                    id: UsbId { vid: 0x0403, pid: 0x6001 },
                    serial_number: None,
                    manufacturer: None,
                    product: None,
                }),
            },
        ];
        assert_eq!(describe_ports(&ports), "/dev/ttyS0, /dev/ttyUSB0 [0403:6001]");
        assert_eq!(describe_ports(&[]), "none");
    }
}
