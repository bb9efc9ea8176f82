//! Request-facing side of the pipeline: start a driver, fetch the current weight.

use scale_traits::{Reading, Scale};
use serde::Serialize;
use std::time::Duration;

use crate::error::{Result, TelemetryError};
use crate::relay::{self, RelayReader, TakeError};
use crate::sampler::{Sampler, SamplerStats};
use crate::shutdown::Shutdown;

/// Response body of a "current weight" request: `{"value": .., "stable": ..}`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CurrentWeight {
    pub value: f64,
    pub stable: bool,
}

impl From<Reading> for CurrentWeight {
    fn from(r: Reading) -> Self {
        Self {
            value: r.weight,
            stable: r.stable,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct TelemetryOptions {
    /// Upper bound on one driver read.
    pub poll: Duration,
    /// Give up on a fetch after this long; `None` waits indefinitely.
    pub take_timeout: Option<Duration>,
}

impl Default for TelemetryOptions {
    fn default() -> Self {
        Self {
            poll: Duration::from_millis(100),
            take_timeout: None,
        }
    }
}

impl TelemetryOptions {
    pub fn from_config(cfg: &scale_config::Config) -> Self {
        Self {
            poll: crate::conversions::poll_interval(cfg),
            take_timeout: crate::conversions::take_timeout(cfg),
        }
    }
}

/// Running acquisition pipeline: one sampler thread feeding one relay.
pub struct Telemetry {
    reader: RelayReader,
    sampler: Sampler,
    take_timeout: Option<Duration>,
}

impl Telemetry {
    pub fn start<S: Scale + Send + 'static>(scale: S, opts: TelemetryOptions) -> Self {
        let (writer, reader) = relay::channel();
        let sampler = Sampler::spawn(scale, writer, opts.poll);
        Self {
            reader,
            sampler,
            take_timeout: opts.take_timeout,
        }
    }

    /// Start the configured driver.
    pub fn start_driver(driver: crate::SourceDriver, opts: TelemetryOptions) -> Self {
        tracing::info!(
            driver = driver.kind(),
            poll_ms = opts.poll.as_millis() as u64,
            "scale driver started"
        );
        Self::start(driver, opts)
    }

    /// Next reading from the instrument, waiting for one if none is pending.
    ///
    /// Blocks until a reading arrives, the configured timeout elapses, or the
    /// driver stops. A stopped driver reports the fault that stopped it.
    pub fn fetch_current(&self) -> Result<CurrentWeight> {
        self.fetch(None)
    }

    /// As [`fetch_current`](Self::fetch_current), also giving up when `cancel` fires.
    pub fn fetch_current_until(&self, cancel: &Shutdown) -> Result<CurrentWeight> {
        self.fetch(Some(cancel))
    }

    fn fetch(&self, cancel: Option<&Shutdown>) -> Result<CurrentWeight> {
        match self.reader.take_with(cancel, self.take_timeout) {
            Ok(reading) => Ok(reading.into()),
            Err(TakeError::Timeout) => Err(TelemetryError::Timeout.into()),
            Err(TakeError::Cancelled) => Err(TelemetryError::Cancelled.into()),
            Err(TakeError::Closed) => Err(self
                .sampler
                .fault()
                .unwrap_or(TelemetryError::Cancelled)
                .into()),
        }
    }

    /// Another handle on the relay, for callers that want the raw reading.
    pub fn reader(&self) -> RelayReader {
        self.reader.clone()
    }

    pub fn stats(&self) -> &SamplerStats {
        self.sampler.stats()
    }

    pub fn fault(&self) -> Option<TelemetryError> {
        self.sampler.fault()
    }

    /// Milliseconds since the driver last delivered a reading.
    pub fn stalled_for_now(&self) -> u64 {
        self.sampler.stalled_for_now()
    }

    /// Stop the driver and return how it ended.
    pub fn stop(self) -> std::result::Result<(), TelemetryError> {
        self.sampler.stop()
    }
}
