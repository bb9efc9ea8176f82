//! Subscriber setup: console on stderr (pretty or JSON), optional JSON file sink.
//!
//! Stdout is reserved for readings so the binary can be piped.

use eyre::{WrapErr, eyre};
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Install the global subscriber. `RUST_LOG` takes precedence over `level`.
///
/// The returned guard flushes the file sink when dropped; hold it until exit.
pub fn init_logging(
    json: bool,
    level: &str,
    cfg: &scale_config::Logging,
) -> eyre::Result<Option<WorkerGuard>> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(f) => f,
        Err(_) => EnvFilter::try_new(level)
            .wrap_err_with(|| format!("invalid log level {level:?}"))?,
    };

    let (pretty, structured) = if json {
        (None, Some(fmt::layer().json().with_writer(std::io::stderr)))
    } else {
        (
            Some(fmt::layer().with_writer(std::io::stderr).with_target(false)),
            None,
        )
    };

    let mut guard = None;
    let file = match cfg.file.as_deref() {
        Some(path) => {
            let path = Path::new(path);
            let dir = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new("."));
            let name = path
                .file_name()
                .ok_or_else(|| eyre!("logging.file {} has no file name", path.display()))?;
            let appender = match cfg.rotation.as_deref() {
                Some("daily") => rolling::daily(dir, name),
                Some("hourly") => rolling::hourly(dir, name),
                _ => rolling::never(dir, name),
            };
            let (writer, worker) = tracing_appender::non_blocking(appender);
            guard = Some(worker);
            Some(fmt::layer().json().with_ansi(false).with_writer(writer))
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(pretty)
        .with(structured)
        .with(file)
        .try_init()
        .map_err(|e| eyre!("install logging: {e}"))?;
    Ok(guard)
}
