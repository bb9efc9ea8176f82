//! Device driver: decodes instrument lines from any buffered byte stream.
//!
//! The serial port is the production stream; tests and replays feed a
//! `Cursor` or a file instead.
use std::io::{BufRead, ErrorKind, Read};
use std::time::Duration;

use scale_traits::{Reading, Scale};
use tracing::trace;

use crate::error::{HwError, Result};
use crate::protocol::{DecodeError, MAX_LINE_BYTES, WireFormat, decode_line};

pub struct LineScale<R> {
    stream: R,
    format: WireFormat,
    // Bytes of a line still being received; survives read timeouts.
    // Never longer than MAX_LINE_BYTES + 1.
    pending: Vec<u8>,
    // Set after an overlong line; input is skipped up to the next newline.
    discarding: bool,
}

impl<R: BufRead> LineScale<R> {
    pub fn new(stream: R, format: WireFormat) -> Self {
        Self {
            stream,
            format,
            pending: Vec::with_capacity(64),
            discarding: false,
        }
    }

    /// Read and decode the next complete line.
    ///
    /// Timeouts surface as [`HwError::Timeout`] with partial bytes retained;
    /// end of stream is [`HwError::Disconnected`]. A line longer than
    /// [`MAX_LINE_BYTES`] is reported once as a decode error and the rest of
    /// it is skipped.
    pub fn read_reading(&mut self) -> Result<Reading> {
        if self.discarding {
            match self.stream.skip_until(b'\n') {
                Ok(0) => return Err(HwError::Disconnected),
                Ok(_) => self.discarding = false,
                Err(e) => return Err(io_fault(e)),
            }
        }

        let room = (MAX_LINE_BYTES + 1).saturating_sub(self.pending.len()) as u64;
        let read = (&mut self.stream)
            .take(room)
            .read_until(b'\n', &mut self.pending);
        let overlong = self.pending.len() > MAX_LINE_BYTES && self.pending.last() != Some(&b'\n');
        match read {
            Ok(0) if self.pending.is_empty() => Err(HwError::Disconnected),
            Ok(_) if overlong => {
                let head = String::from_utf8_lossy(&self.pending[..32]).into_owned();
                self.pending.clear();
                self.discarding = true;
                Err(HwError::Decode {
                    line: format!("{head}..."),
                    source: DecodeError::LineTooLong {
                        max: MAX_LINE_BYTES,
                    },
                })
            }
            Ok(_) => {
                let raw = std::mem::take(&mut self.pending);
                let line = String::from_utf8_lossy(&raw);
                trace!(line = %line.trim_end(), "scale line");
                decode_line(&line, &self.format).map_err(|source| HwError::Decode {
                    line: line.trim_end().to_string(),
                    source,
                })
            }
            Err(e) => Err(io_fault(e)),
        }
    }
}

fn io_fault(e: std::io::Error) -> HwError {
    match e.kind() {
        ErrorKind::TimedOut | ErrorKind::WouldBlock | ErrorKind::Interrupted => HwError::Timeout,
        _ => HwError::Io(e),
    }
}

impl<R: BufRead> Scale for LineScale<R> {
    // The stream carries its own read timeout (see `serial::open`).
    fn read(
        &mut self,
        _timeout: Duration,
    ) -> std::result::Result<Reading, Box<dyn std::error::Error + Send + Sync>> {
        self.read_reading().map_err(Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{BufReader, Cursor, Read};

    #[test]
    fn decodes_lines_in_order_then_disconnects() {
        let data = "S  1.00  kg\nU  2.00  kg\n";
        let mut scale = LineScale::new(Cursor::new(data), WireFormat::SIMPLE);
        assert_eq!(scale.read_reading().unwrap(), Reading::stable(1.0));
        assert_eq!(scale.read_reading().unwrap(), Reading::unstable(2.0));
        assert!(matches!(scale.read_reading(), Err(HwError::Disconnected)));
    }

    #[test]
    fn bad_line_is_reported_and_next_line_still_decodes() {
        let data = "S  abc  kg\nS  3.50  kg\n";
        let mut scale = LineScale::new(Cursor::new(data), WireFormat::SIMPLE);
        match scale.read_reading() {
            Err(HwError::Decode { line, .. }) => assert_eq!(line, "S  abc  kg"),
            other => panic!("expected decode error, got {other:?}"),
        }
        assert_eq!(scale.read_reading().unwrap(), Reading::stable(3.5));
    }

    #[test]
    fn unterminated_tail_is_decoded_before_disconnect() {
        let mut scale = LineScale::new(Cursor::new("S  4.00  kg"), WireFormat::SIMPLE);
        assert_eq!(scale.read_reading().unwrap(), Reading::stable(4.0));
        assert!(matches!(scale.read_reading(), Err(HwError::Disconnected)));
    }

    /// Yields its chunks one per read, with a timeout between each.
    struct Stuttering {
        chunks: Vec<&'static [u8]>,
        timed_out: bool,
    }

    impl Read for Stuttering {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            if !self.timed_out {
                self.timed_out = true;
                return Err(std::io::Error::new(ErrorKind::TimedOut, "no data"));
            }
            self.timed_out = false;
            if self.chunks.is_empty() {
                return Ok(0);
            }
            let chunk = self.chunks.remove(0);
            buf[..chunk.len()].copy_from_slice(chunk);
            Ok(chunk.len())
        }
    }

    #[test]
    fn partial_line_survives_timeouts() {
        let src = Stuttering {
            chunks: vec![b"S  7.", b"25  kg\n"],
            timed_out: false,
        };
        let mut scale = LineScale::new(BufReader::new(src), WireFormat::SIMPLE);
        let mut timeouts = 0;
        let reading = loop {
            match scale.read_reading() {
                Ok(r) => break r,
                Err(HwError::Timeout) => timeouts += 1,
                Err(e) => panic!("unexpected: {e}"),
            }
        };
        assert_eq!(reading, Reading::stable(7.25));
        assert!(timeouts >= 2);
    }

    /// `left` bytes of unframed noise in 4 KiB chunks, a timeout before
    /// every chunk, then `tail`.
    struct Noise {
        left: usize,
        tail: &'static [u8],
        timed_out: bool,
    }

    impl Read for Noise {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            if !self.timed_out {
                self.timed_out = true;
                return Err(std::io::Error::new(ErrorKind::TimedOut, "no data"));
            }
            self.timed_out = false;
            if self.left > 0 {
                let n = self.left.min(buf.len()).min(4096);
                buf[..n].fill(b'x');
                self.left -= n;
                return Ok(n);
            }
            let n = self.tail.len().min(buf.len());
            buf[..n].copy_from_slice(&self.tail[..n]);
            self.tail = &self.tail[n..];
            Ok(n)
        }
    }

    #[test]
    fn unframed_noise_keeps_the_line_buffer_bounded() {
        let src = Noise {
            left: 4 << 20,
            tail: b"\nS  1.00  kg\n",
            timed_out: false,
        };
        let mut scale = LineScale::new(BufReader::new(src), WireFormat::SIMPLE);
        let mut too_long = 0;
        let mut reading = None;
        for _ in 0..20_000 {
            match scale.read_reading() {
                Ok(r) => {
                    reading = Some(r);
                    break;
                }
                Err(HwError::Timeout) => {}
                Err(HwError::Decode {
                    source: DecodeError::LineTooLong { .. },
                    ..
                }) => too_long += 1,
                Err(e) => panic!("unexpected: {e}"),
            }
            assert!(scale.pending.len() <= MAX_LINE_BYTES);
        }
        // reported once per overlong line, then skipped to the next newline
        assert_eq!(too_long, 1);
        assert_eq!(reading, Some(Reading::stable(1.0)));
        assert!(scale.pending.capacity() <= 4 * MAX_LINE_BYTES);
    }

    #[test]
    fn overlong_line_is_rejected_and_next_line_decodes() {
        let data = format!("S  {}  kg\nU  2.00  kg\n", "9".repeat(MAX_LINE_BYTES));
        let mut scale = LineScale::new(Cursor::new(data), WireFormat::SIMPLE);
        match scale.read_reading() {
            Err(HwError::Decode { line, source }) => {
                assert_eq!(
                    source,
                    DecodeError::LineTooLong {
                        max: MAX_LINE_BYTES
                    }
                );
                assert!(line.len() < 64);
            }
            other => panic!("expected overlong line, got {other:?}"),
        }
        assert_eq!(scale.read_reading().unwrap(), Reading::unstable(2.0));
        assert!(matches!(scale.read_reading(), Err(HwError::Disconnected)));
    }

    #[test]
    fn other_io_errors_are_fatal() {
        struct Broken;
        impl Read for Broken {
            fn read(&mut self, _buf: &mut [u8]) -> std::io::Result<usize> {
                Err(std::io::Error::new(ErrorKind::BrokenPipe, "unplugged"))
            }
        }
        let mut scale = LineScale::new(BufReader::new(Broken), WireFormat::SIMPLE);
        assert!(matches!(scale.read_reading(), Err(HwError::Io(_))));
    }
}
