#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
//! `scale`: live weight from the station's instrument, on the command line.

mod cli;
mod error_fmt;
mod logging;
mod run;

use clap::Parser;
use eyre::WrapErr;
use std::time::Duration;

use crate::cli::{Cli, Commands, JSON_MODE};
use crate::error_fmt::{ConfigLoad, exit_code_for_error, format_error_json, humanize};

fn main() {
    let _ = color_eyre::install();
    let cli = Cli::parse();
    let _ = JSON_MODE.set(cli.json);

    if let Err(e) = real_main(cli) {
        if JSON_MODE.get().copied().unwrap_or(false) {
            eprintln!("{}", format_error_json(&e));
        } else {
            eprintln!("{}", humanize(&e));
        }
        tracing::debug!(error = ?e, "command failed");
        std::process::exit(exit_code_for_error(&e));
    }
}

fn real_main(cli: Cli) -> eyre::Result<()> {
    let cfg = scale_config::load_file(&cli.config)
        .wrap_err_with(|| ConfigLoad(cli.config.clone()))?;

    let level = cli
        .log_level
        .as_deref()
        .or(cfg.logging.level.as_deref())
        .unwrap_or("info");
    // Dropped on return, before main exits the process
    let _log_guard = logging::init_logging(cli.json, level, &cfg.logging)?;
    tracing::info!(
        config = %cli.config.display(),
        synthetic = cfg.use_synthetic,
        device_id = cfg.device_id.as_deref().unwrap_or("-"),
        "config loaded"
    );

    // Ctrl-C cancels blocked fetches; the sampler is stopped when telemetry drops
    let (interrupt, cancel) = scale_core::shutdown::pair();
    ctrlc::set_handler(move || {
        tracing::info!("interrupt received");
        interrupt.trigger();
    })
    .wrap_err("install Ctrl-C handler")?;

    match cli.cmd {
        Commands::Read => run::read_once(&cfg, cli.json, &cancel),
        Commands::Monitor { count, interval_ms } => run::monitor(
            &cfg,
            cli.json,
            count,
            interval_ms.map(Duration::from_millis),
            &cancel,
        ),
        Commands::Ports => run::list_ports(&cfg, cli.json),
        Commands::SelfCheck => run::self_check(&cfg, cli.json),
    }
}
