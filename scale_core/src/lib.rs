#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
//! Live weight telemetry (hardware-agnostic core).
//!
//! One long-lived sampler thread drives the selected `Scale` and feeds a
//! single-slot relay; request handlers pull the next reading on demand.
//!
//! ## Architecture
//!
//! - **Relay**: capacity-1, drop-when-full, blocking take (`relay` module)
//! - **Sampler**: acquisition thread, fault classification, shutdown (`sampler`)
//! - **Source**: device or synthetic driver chosen from config (`source`)
//! - **Telemetry**: request boundary returning `{value, stable}` (`telemetry`)

pub mod conversions;
pub mod error;
pub mod hw_error;
pub mod mocks;
pub mod relay;
pub mod sampler;
pub mod shutdown;
pub mod source;
pub mod telemetry;

pub use error::{BuildError, Result, TelemetryError};
pub use relay::{Deposit, RelayClosed, RelayReader, RelayWriter, TakeError};
pub use sampler::Sampler;
pub use scale_traits::Reading;
pub use shutdown::{Shutdown, ShutdownHandle};
pub use source::SourceDriver;
pub use telemetry::{CurrentWeight, Telemetry, TelemetryOptions};
