//! Test and helper scales for scale_core

use scale_hardware::HwError;
use scale_traits::{Reading, Scale};
use std::collections::VecDeque;
use std::time::Duration;

pub enum Step {
    Read(Reading),
    Fail(HwError),
}

/// Plays back a fixed script, then idles (or disconnects if asked).
pub struct ScriptedScale {
    steps: VecDeque<Step>,
    disconnect_when_done: bool,
}

impl ScriptedScale {
    pub fn new(steps: impl IntoIterator<Item = Step>) -> Self {
        Self {
            steps: steps.into_iter().collect(),
            disconnect_when_done: false,
        }
    }

    pub fn then_disconnect(mut self) -> Self {
        self.disconnect_when_done = true;
        self
    }
}

impl Scale for ScriptedScale {
    fn read(
        &mut self,
        timeout: Duration,
    ) -> Result<Reading, Box<dyn std::error::Error + Send + Sync>> {
        match self.steps.pop_front() {
            Some(Step::Read(r)) => Ok(r),
            Some(Step::Fail(e)) => Err(Box::new(e)),
            None if self.disconnect_when_done => Err(Box::new(HwError::Disconnected)),
            None => {
                std::thread::sleep(timeout);
                Err(Box::new(HwError::Timeout))
            }
        }
    }
}

/// Emits readings whose weight is a strictly increasing sequence number,
/// as fast as it is polled.
#[derive(Default)]
pub struct CountingScale {
    next: u64,
}

impl Scale for CountingScale {
    fn read(
        &mut self,
        _timeout: Duration,
    ) -> Result<Reading, Box<dyn std::error::Error + Send + Sync>> {
        let n = self.next;
        self.next += 1;
        Ok(Reading::new(n as f64, n % 2 == 0))
    }
}
