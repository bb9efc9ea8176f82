//! Background acquisition thread.
//!
//! Spawns a thread that owns the active `Scale`, deposits every reading into
//! the relay, and tracks the last-ok timestamp so callers can tell a quiet
//! instrument from a dead one. Undecodable lines are logged and skipped;
//! fatal driver errors stop the thread and are kept for `fault()`/`join()`.
//!
//! Safety: Each `Sampler` spawns exactly one thread that is shut down and
//! joined when the `Sampler` is dropped.
use scale_traits::Scale;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use crate::error::TelemetryError;
use crate::hw_error::{Fault, classify};
use crate::relay::{Deposit, RelayWriter};
use crate::shutdown::{self, ShutdownHandle};

/// Counters updated by the sampler thread.
#[derive(Debug, Default)]
pub struct SamplerStats {
    stored: AtomicU64,
    dropped: AtomicU64,
    rejected_lines: AtomicU64,
}

impl SamplerStats {
    pub fn stored(&self) -> u64 {
        self.stored.load(Ordering::Relaxed)
    }
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
    pub fn rejected_lines(&self) -> u64 {
        self.rejected_lines.load(Ordering::Relaxed)
    }
}

pub struct Sampler {
    shutdown: ShutdownHandle,
    stats: Arc<SamplerStats>,
    fault: Arc<Mutex<Option<TelemetryError>>>,
    last_ok: Arc<AtomicU64>,
    epoch: Instant,
    join_handle: Option<std::thread::JoinHandle<Result<(), TelemetryError>>>,
}

impl Sampler {
    /// Start the acquisition thread. `poll` bounds each `scale.read` so the
    /// thread notices shutdown promptly.
    pub fn spawn<S: Scale + Send + 'static>(
        mut scale: S,
        relay: RelayWriter,
        poll: Duration,
    ) -> Self {
        let (shutdown, signal) = shutdown::pair();
        let stats = Arc::new(SamplerStats::default());
        let stats_bg = stats.clone();
        let fault = Arc::new(Mutex::new(None));
        let fault_bg = fault.clone();
        let last_ok = Arc::new(AtomicU64::new(0));
        let last_ok_bg = last_ok.clone();
        let epoch = Instant::now();

        let join_handle = std::thread::spawn(move || {
            let outcome = loop {
                if signal.is_triggered() {
                    tracing::debug!("sampler thread received shutdown signal");
                    break Ok(());
                }

                match scale.read(poll) {
                    Ok(reading) => {
                        match relay.deposit(reading) {
                            Ok(Deposit::Stored) => {
                                stats_bg.stored.fetch_add(1, Ordering::Relaxed);
                            }
                            Ok(Deposit::Dropped) => {
                                stats_bg.dropped.fetch_add(1, Ordering::Relaxed);
                            }
                            // Consumer is gone; exit gracefully
                            Err(_) => {
                                tracing::debug!("relay has no readers, sampler exiting");
                                break Ok(());
                            }
                        }
                        last_ok_bg.store(ms_since(epoch), Ordering::Relaxed);
                    }
                    Err(e) => match classify(&*e) {
                        Fault::Idle => {}
                        Fault::Transient => {
                            stats_bg.rejected_lines.fetch_add(1, Ordering::Relaxed);
                            tracing::warn!(error = %e, "discarding undecodable scale line");
                        }
                        Fault::Fatal(err) => {
                            tracing::error!(
                                error = %err,
                                "scale driver stopped; live weight unavailable"
                            );
                            if let Ok(mut slot) = fault_bg.lock() {
                                *slot = Some(err.clone());
                            }
                            break Err(err);
                        }
                    },
                }
            };
            tracing::trace!("sampler thread exiting");
            outcome
        });

        Self {
            shutdown,
            stats,
            fault,
            last_ok,
            epoch,
            join_handle: Some(join_handle),
        }
    }

    pub fn stats(&self) -> &SamplerStats {
        &self.stats
    }

    /// Fatal error that stopped the driver, if any.
    pub fn fault(&self) -> Option<TelemetryError> {
        self.fault.lock().ok().and_then(|f| f.clone())
    }

    pub fn is_finished(&self) -> bool {
        self.join_handle
            .as_ref()
            .is_none_or(std::thread::JoinHandle::is_finished)
    }

    /// Milliseconds since the last successful reading (or since start).
    pub fn stalled_for_now(&self) -> u64 {
        ms_since(self.epoch).saturating_sub(self.last_ok.load(Ordering::Relaxed))
    }

    /// Signal shutdown and wait for the thread; returns the driver's outcome.
    pub fn stop(mut self) -> Result<(), TelemetryError> {
        self.shutdown.trigger();
        self.join_inner()
    }

    /// Wait for the thread to end on its own (fatal error or no readers).
    pub fn join(mut self) -> Result<(), TelemetryError> {
        self.join_inner()
    }

    fn join_inner(&mut self) -> Result<(), TelemetryError> {
        match self.join_handle.take() {
            Some(handle) => handle.join().unwrap_or_else(|_| {
                Err(TelemetryError::Hardware("sampler thread panicked".into()))
            }),
            None => Ok(()),
        }
    }
}

impl Drop for Sampler {
    fn drop(&mut self) {
        self.shutdown.trigger();
        // The thread exits at its next loop check, at most one poll window away.
        if let Some(handle) = self.join_handle.take() {
            match handle.join() {
                Ok(_) => tracing::trace!("sampler thread joined"),
                Err(e) => tracing::warn!(?e, "sampler thread panicked during shutdown"),
            }
        }
    }
}

fn ms_since(epoch: Instant) -> u64 {
    let ms = Instant::now().saturating_duration_since(epoch).as_millis();
    ms.min(u128::from(u64::MAX)) as u64
}
