//! Serial connection to the instrument: 8 data bits, no parity, one stop bit.
use std::time::Duration;

use tracing::info;

use crate::discovery::{enumerate_ports, log_ports, select_port};
use crate::error::Result;
use crate::protocol::WireFormat;
use crate::DeviceScale;

pub const DEFAULT_BAUD_RATE: u32 = 9600;

#[derive(Debug, Clone, Copy)]
pub struct SerialSettings {
    pub baud_rate: u32,
    /// Internal read timeout; bounds how long a read blocks before the
    /// sampler gets a chance to observe shutdown.
    pub read_timeout: Duration,
}

impl Default for SerialSettings {
    fn default() -> Self {
        Self {
            baud_rate: DEFAULT_BAUD_RATE,
            read_timeout: Duration::from_millis(100),
        }
    }
}

/// Enumerate ports, select the one matching `device_id`, and open it.
pub fn open_device(
    device_id: &str,
    settings: SerialSettings,
    format: WireFormat,
) -> Result<DeviceScale> {
    let ports = enumerate_ports()?;
    log_ports(&ports);
    let port = select_port(&ports, device_id)?;
    info!(port = %port.name, device_id, baud = settings.baud_rate, "using serial port");
    let stream = open_port(&port.name, settings)?;
    Ok(DeviceScale::new(stream, format))
}

#[cfg(feature = "hardware")]
fn open_port(name: &str, settings: SerialSettings) -> Result<Box<dyn std::io::BufRead + Send>> {
    use std::io::BufReader;

    let port = serialport::new(name, settings.baud_rate)
        .data_bits(serialport::DataBits::Eight)
        .parity(serialport::Parity::None)
        .stop_bits(serialport::StopBits::One)
        .flow_control(serialport::FlowControl::None)
        .timeout(settings.read_timeout)
        .open()?;
    Ok(Box::new(BufReader::new(port)))
}

#[cfg(not(feature = "hardware"))]
fn open_port(_name: &str, _settings: SerialSettings) -> Result<Box<dyn std::io::BufRead + Send>> {
    Err(crate::error::HwError::Unsupported)
}
