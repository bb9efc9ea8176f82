//! ASCII line protocol spoken by the weighing instrument.
//!
//! A line is a fixed-width status block followed by whitespace-separated
//! tokens, one of which is the decimal magnitude:
//!
//! ```text
//! S  12.34  kg          (SIMPLE: marker at 0, one-byte header)
//! ASNG/W+  0.00  kg     (STATUS_BLOCK: marker at 1, four-byte header)
//! ```
//!
//! Every column offset lives in [`WireFormat`]; nothing else in the crate
//! hard-codes a position.
use scale_traits::Reading;
use thiserror::Error;

/// Longest line accepted, excluding the terminator. Instrument lines are a
/// few dozen bytes; anything longer is framing noise.
pub const MAX_LINE_BYTES: usize = 1024;

/// Column layout of one instrument line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WireFormat {
    /// Byte offset of the stability marker in the raw line.
    pub marker_offset: usize,
    /// Marker value meaning "settled"; anything else is in motion.
    pub stable_code: u8,
    /// Bytes of status prefix skipped before tokenizing.
    pub header_width: usize,
    /// Index of the magnitude among the tokens after the header.
    pub magnitude_token: usize,
}

impl WireFormat {
    pub const SIMPLE: Self = Self {
        marker_offset: 0,
        stable_code: b'S',
        header_width: 1,
        magnitude_token: 0,
    };

    /// Layout captured from the serial scale at the station (`ASNG/W+  0.00  kg`).
    pub const STATUS_BLOCK: Self = Self {
        marker_offset: 1,
        stable_code: b'S',
        header_width: 4,
        magnitude_token: 1,
    };

    /// Shortest line that still carries a marker and a full header.
    #[inline]
    pub fn min_len(&self) -> usize {
        self.header_width.max(self.marker_offset + 1)
    }
}

impl Default for WireFormat {
    fn default() -> Self {
        Self::SIMPLE
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("empty line")]
    Empty,
    #[error("line longer than {max} bytes")]
    LineTooLong { max: usize },
    #[error("line too short: {len} bytes, need at least {min}")]
    TooShort { len: usize, min: usize },
    #[error("status header is not ASCII")]
    NotAscii,
    #[error("no magnitude token at index {index}")]
    MissingMagnitude { index: usize },
    #[error("magnitude {token:?} is not a decimal number")]
    InvalidMagnitude { token: String },
    #[error("magnitude {token:?} is negative")]
    NegativeMagnitude { token: String },
    #[error("magnitude {token:?} is not finite")]
    NonFiniteMagnitude { token: String },
}

/// Decode one instrument line into a [`Reading`].
///
/// Pure function of `line` and `format`. Trailing CR/LF are ignored.
pub fn decode_line(line: &str, format: &WireFormat) -> Result<Reading, DecodeError> {
    let line = line.trim_end_matches(['\r', '\n']);
    if line.trim().is_empty() {
        return Err(DecodeError::Empty);
    }
    if line.len() > MAX_LINE_BYTES {
        return Err(DecodeError::LineTooLong {
            max: MAX_LINE_BYTES,
        });
    }
    let min = format.min_len();
    if line.len() < min {
        return Err(DecodeError::TooShort {
            len: line.len(),
            min,
        });
    }

    let stable = line.as_bytes()[format.marker_offset] == format.stable_code;
    let body = line
        .get(format.header_width..)
        .ok_or(DecodeError::NotAscii)?;

    let token = body
        .split_whitespace()
        .nth(format.magnitude_token)
        .ok_or(DecodeError::MissingMagnitude {
            index: format.magnitude_token,
        })?;
    let weight = parse_magnitude(token)?;
    Ok(Reading::new(weight, stable))
}

fn parse_magnitude(token: &str) -> Result<f64, DecodeError> {
    // f64::from_str accepts "inf"/"nan" spellings; only plain decimals are valid here
    if !token
        .bytes()
        .all(|b| b.is_ascii_digit() || matches!(b, b'.' | b'-' | b'+' | b'e' | b'E'))
    {
        return Err(DecodeError::InvalidMagnitude {
            token: token.to_string(),
        });
    }
    let value: f64 = token.parse().map_err(|_| DecodeError::InvalidMagnitude {
        token: token.to_string(),
    })?;
    if !value.is_finite() {
        return Err(DecodeError::NonFiniteMagnitude {
            token: token.to_string(),
        });
    }
    if value.is_sign_negative() && value != 0.0 {
        return Err(DecodeError::NegativeMagnitude {
            token: token.to_string(),
        });
    }
    Ok(value)
}
