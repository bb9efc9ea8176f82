//! Instrument-facing drivers for the weighing station.
//!
//! - `protocol`: pure decoder for the instrument's ASCII lines
//! - `line_scale`: device driver over any buffered byte stream
//! - `synthetic`: paced random readings for stations without hardware
//! - `discovery` / `serial`: locate and open the USB serial adapter
//!   (real I/O requires the `hardware` feature)
pub mod discovery;
pub mod error;
pub mod line_scale;
pub mod protocol;
pub mod serial;
pub mod synthetic;

pub use discovery::{PortInfo, UsbId, UsbInfo, enumerate_ports, select_port};
pub use error::HwError;
pub use line_scale::LineScale;
pub use protocol::{DecodeError, MAX_LINE_BYTES, WireFormat, decode_line};
pub use serial::{SerialSettings, open_device};
pub use synthetic::{SyntheticCfg, SyntheticScale};

/// Device driver as wired in production: a line scale over a boxed stream.
pub type DeviceScale = LineScale<Box<dyn std::io::BufRead + Send>>;

/// Replay a captured instrument stream from a file through the device driver.
pub fn open_replay(path: &std::path::Path, format: WireFormat) -> error::Result<DeviceScale> {
    let file = std::fs::File::open(path)?;
    tracing::info!(path = %path.display(), "replaying captured scale stream");
    Ok(DeviceScale::new(
        Box::new(std::io::BufReader::new(file)),
        format,
    ))
}
