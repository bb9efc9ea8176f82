//! Single-slot relay between the scale driver and on-demand readers.
//!
//! Capacity is exactly one reading. A deposit into an occupied slot is
//! dropped (the unconsumed reading wins) and never blocks the producer.
//! A take on an empty slot parks the caller until the next deposit.
//!
//! Built on a `bounded(1)` channel: `try_send` gives the non-blocking
//! drop-when-full deposit, `recv` gives a parked (not spinning) take, and
//! each value is received by exactly one reader.
use crossbeam_channel as xch;
use scale_traits::Reading;
use std::time::Duration;
use thiserror::Error;
use tracing::trace;

use crate::shutdown::Shutdown;

/// Create the relay. The writer goes to the producer thread, readers to
/// request handlers.
pub fn channel() -> (RelayWriter, RelayReader) {
    let (tx, rx) = xch::bounded(1);
    (RelayWriter { tx }, RelayReader { rx })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Deposit {
    /// Slot was empty; the reading is now waiting for a reader.
    Stored,
    /// Slot was occupied; the reading was discarded.
    Dropped,
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("relay closed: no readers remain")]
pub struct RelayClosed;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum TakeError {
    #[error("timed out waiting for a reading")]
    Timeout,
    #[error("cancelled while waiting for a reading")]
    Cancelled,
    #[error("producer stopped")]
    Closed,
}

/// Producer end. Deliberately not `Clone`: one driver feeds the relay.
#[derive(Debug)]
pub struct RelayWriter {
    tx: xch::Sender<Reading>,
}

impl RelayWriter {
    /// Offer a reading without blocking.
    pub fn deposit(&self, reading: Reading) -> Result<Deposit, RelayClosed> {
        match self.tx.try_send(reading) {
            Ok(()) => Ok(Deposit::Stored),
            Err(xch::TrySendError::Full(dropped)) => {
                trace!(weight = dropped.weight, "relay slot occupied, reading dropped");
                Ok(Deposit::Dropped)
            }
            Err(xch::TrySendError::Disconnected(_)) => Err(RelayClosed),
        }
    }
}

/// Consumer end. Clones share the same slot; each reading reaches one of them.
#[derive(Debug, Clone)]
pub struct RelayReader {
    rx: xch::Receiver<Reading>,
}

impl RelayReader {
    /// Block until a reading is available and take it.
    ///
    /// Fails only with [`TakeError::Closed`], once the producer is gone and
    /// the slot is empty.
    pub fn take(&self) -> Result<Reading, TakeError> {
        self.rx.recv().map_err(|_| TakeError::Closed)
    }

    pub fn take_timeout(&self, timeout: Duration) -> Result<Reading, TakeError> {
        self.take_with(None, Some(timeout))
    }

    pub fn take_until(&self, cancel: &Shutdown) -> Result<Reading, TakeError> {
        self.take_with(Some(cancel), None)
    }

    /// Wait for a reading, giving up on cancellation or after `timeout`.
    /// With neither, behaves like [`take`](Self::take).
    pub fn take_with(
        &self,
        cancel: Option<&Shutdown>,
        timeout: Option<Duration>,
    ) -> Result<Reading, TakeError> {
        let never = xch::never();
        let cancel_rx = cancel.map_or(&never, |c| &c.rx);
        let deadline = timeout.map_or_else(xch::never, xch::after);
        xch::select! {
            recv(self.rx) -> msg => msg.map_err(|_| TakeError::Closed),
            recv(cancel_rx) -> _ => Err(TakeError::Cancelled),
            recv(deadline) -> _ => Err(TakeError::Timeout),
        }
    }

    /// Take the pending reading if there is one.
    pub fn try_take(&self) -> Option<Reading> {
        self.rx.try_recv().ok()
    }
}
