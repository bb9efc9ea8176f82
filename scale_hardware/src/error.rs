use thiserror::Error;

use crate::protocol::DecodeError;

#[derive(Debug, Error)]
pub enum HwError {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    #[error("instrument disconnected (end of stream)")]
    Disconnected,
    #[error("scale timeout")]
    Timeout,
    #[error("undecodable line {line:?}: {source}")]
    Decode {
        line: String,
        #[source]
        source: DecodeError,
    },
    #[error("no serial ports found")]
    NoPorts,
    #[error("no serial port matches device id {wanted} (available: {available})")]
    NoMatchingPort { wanted: String, available: String },
    #[error("invalid device id {0:?}: expected VID:PID in hex, e.g. 1A86:7523")]
    InvalidDeviceId(String),
    #[error("serial support not enabled; rebuild with --features hardware")]
    Unsupported,
    #[error("serial port: {0}")]
    Serial(String),
}

#[cfg(feature = "hardware")]
impl From<serialport::Error> for HwError {
    fn from(e: serialport::Error) -> Self {
        match e.kind() {
            serialport::ErrorKind::Io(kind) => {
                HwError::Io(std::io::Error::new(kind, e.description))
            }
            _ => HwError::Serial(e.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, HwError>;
