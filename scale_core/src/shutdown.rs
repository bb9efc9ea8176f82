//! One-shot shutdown signal shared by the sampler thread and blocked readers.
//!
//! Triggering drops the only sender, which disconnects every `Shutdown`
//! receiver at once. Receivers can poll it, sleep on it, or select on it.
use crossbeam_channel as xch;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Create a linked trigger/signal pair.
pub fn pair() -> (ShutdownHandle, Shutdown) {
    let (tx, rx) = xch::bounded(0);
    (
        ShutdownHandle {
            tx: Arc::new(Mutex::new(Some(tx))),
        },
        Shutdown { rx },
    )
}

/// Fires the signal. Cloneable so it can move into a Ctrl-C handler.
/// Dropping the last clone also fires it.
#[derive(Debug, Clone)]
pub struct ShutdownHandle {
    tx: Arc<Mutex<Option<xch::Sender<()>>>>,
}

impl ShutdownHandle {
    pub fn trigger(&self) {
        if let Ok(mut tx) = self.tx.lock() {
            tx.take();
        }
    }
}

#[derive(Debug, Clone)]
pub struct Shutdown {
    pub(crate) rx: xch::Receiver<()>,
}

impl Shutdown {
    #[inline]
    pub fn is_triggered(&self) -> bool {
        matches!(self.rx.try_recv(), Err(xch::TryRecvError::Disconnected))
    }

    /// Sleep for up to `d`; returns true as soon as shutdown fires.
    pub fn wait_timeout(&self, d: Duration) -> bool {
        matches!(
            self.rx.recv_timeout(d),
            Err(xch::RecvTimeoutError::Disconnected)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[test]
    fn trigger_is_seen_by_every_clone() {
        let (handle, signal) = pair();
        let other = signal.clone();
        assert!(!signal.is_triggered());
        handle.trigger();
        assert!(signal.is_triggered());
        assert!(other.is_triggered());
        // idempotent
        handle.trigger();
        assert!(signal.is_triggered());
    }

    #[test]
    fn dropping_last_handle_fires() {
        let (handle, signal) = pair();
        let clone = handle.clone();
        drop(handle);
        assert!(!signal.is_triggered());
        drop(clone);
        assert!(signal.is_triggered());
    }

    #[test]
    fn wait_timeout_wakes_early_on_trigger() {
        let (handle, signal) = pair();
        assert!(!signal.wait_timeout(Duration::from_millis(5)));
        let t = std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(20));
            handle.trigger();
        });
        let start = Instant::now();
        assert!(signal.wait_timeout(Duration::from_secs(5)));
        assert!(start.elapsed() < Duration::from_secs(2));
        t.join().unwrap();
    }
}
