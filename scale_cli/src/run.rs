//! Subcommand bodies: driver assembly, fetching and printing readings.

use eyre::WrapErr;
use scale_config::Config;
use scale_core::error::{BuildError, TelemetryError};
use scale_core::{CurrentWeight, Reading, Shutdown, SourceDriver, Telemetry, TelemetryOptions};
use std::path::PathBuf;
use std::time::Duration;

use crate::cli::TEST_STREAM_ENV;

fn test_stream() -> Option<PathBuf> {
    std::env::var_os(TEST_STREAM_ENV).map(PathBuf::from)
}

/// Device or synthetic driver per config; a capture file when `SCALE_TEST_STREAM` is set.
fn open_driver(cfg: &Config) -> eyre::Result<SourceDriver> {
    match test_stream() {
        Some(path) => SourceDriver::replay(&path, cfg),
        None => SourceDriver::from_config(cfg),
    }
}

fn start(cfg: &Config) -> eyre::Result<Telemetry> {
    let driver = open_driver(cfg)?;
    Ok(Telemetry::start_driver(driver, TelemetryOptions::from_config(cfg)))
}

fn print_weight(w: CurrentWeight, json: bool) -> eyre::Result<()> {
    if json {
        println!("{}", serde_json::to_string(&w).wrap_err("serialize reading")?);
    } else {
        println!("{}", Reading::new(w.value, w.stable));
    }
    Ok(())
}

fn is_cancelled(err: &eyre::Report) -> bool {
    matches!(err.downcast_ref::<TelemetryError>(), Some(TelemetryError::Cancelled))
}

pub fn read_once(cfg: &Config, json: bool, cancel: &Shutdown) -> eyre::Result<()> {
    let telemetry = start(cfg)?;
    let w = telemetry.fetch_current_until(cancel)?;
    print_weight(w, json)
}

pub fn monitor(
    cfg: &Config,
    json: bool,
    count: Option<u64>,
    interval: Option<Duration>,
    cancel: &Shutdown,
) -> eyre::Result<()> {
    let telemetry = start(cfg)?;
    let mut printed = 0u64;
    while count.is_none_or(|n| printed < n) {
        match telemetry.fetch_current_until(cancel) {
            Ok(w) => {
                print_weight(w, json)?;
                printed += 1;
            }
            Err(e) if is_cancelled(&e) => break,
            Err(e) => return Err(e),
        }
        if let Some(d) = interval
            && cancel.wait_timeout(d)
        {
            break;
        }
    }
    let stats = telemetry.stats();
    tracing::info!(
        printed,
        stored = stats.stored(),
        dropped = stats.dropped(),
        rejected_lines = stats.rejected_lines(),
        stalled_ms = telemetry.stalled_for_now(),
        "monitor finished"
    );
    Ok(())
}

pub fn list_ports(cfg: &Config, json: bool) -> eyre::Result<()> {
    let ports = scale_hardware::enumerate_ports().wrap_err("enumerate serial ports")?;
    scale_hardware::discovery::log_ports(&ports);
    let wanted = cfg.device_id.as_deref();
    let is_wanted = |p: &scale_hardware::PortInfo| {
        p.usb_id()
            .is_some_and(|id| wanted == Some(id.to_string().as_str()))
    };

    if json {
        let list: Vec<_> = ports
            .iter()
            .map(|p| {
                let usb = p.usb.as_ref();
                serde_json::json!({
                    "name": p.name,
                    "usb_id": usb.map(|u| u.id.to_string()),
                    "serial_number": usb.and_then(|u| u.serial_number.clone()),
                    "manufacturer": usb.and_then(|u| u.manufacturer.clone()),
                    "product": usb.and_then(|u| u.product.clone()),
                    "configured": is_wanted(p),
                })
            })
            .collect();
        println!("{}", serde_json::Value::Array(list));
        return Ok(());
    }

    if ports.is_empty() {
        println!("no serial ports found");
    }
    for p in &ports {
        let mark = if is_wanted(p) { '*' } else { ' ' };
        match &p.usb {
            Some(usb) => println!(
                "{mark} {}  {}  serial={}",
                p.name,
                usb.id,
                usb.serial_number.as_deref().unwrap_or("-")
            ),
            None => println!("{mark} {}", p.name),
        }
    }
    Ok(())
}

pub fn self_check(cfg: &Config, json: bool) -> eyre::Result<()> {
    let source = if let Some(path) = test_stream() {
        SourceDriver::replay(&path, cfg)?;
        format!("replay {}", path.display())
    } else if cfg.use_synthetic {
        "synthetic scale".to_string()
    } else {
        let id = cfg
            .device_id
            .as_deref()
            .ok_or_else(|| eyre::Report::new(BuildError::MissingDeviceId))?;
        let ports = scale_hardware::enumerate_ports().wrap_err("enumerate serial ports")?;
        let port = scale_hardware::select_port(&ports, id)
            .wrap_err_with(|| format!("select scale device {id}"))?;
        format!("device {id} on {}", port.name)
    };
    if json {
        println!("{}", serde_json::json!({ "status": "ok", "source": source }));
    } else {
        println!("OK ({source})");
    }
    Ok(())
}
