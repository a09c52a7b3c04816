//! `rover` binary: runs the sensing and calibration core on a simulated drive.

mod cli;
mod error_fmt;
mod run;

use std::path::Path;
use std::sync::atomic::AtomicBool;

use clap::Parser;
use eyre::WrapErr;
use serde_json::json;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry, fmt};

use crate::cli::{Cli, Commands, JSON_MODE};
use crate::error_fmt::{exit_code_for_error, format_error_json, humanize};
use crate::run::{CalibrationReport, DriveParams, SimRig, TelemetryRow};

fn main() {
    let cli = Cli::parse();
    let _ = JSON_MODE.set(cli.json);
    if let Err(e) = color_eyre::install() {
        eprintln!("failed to install error hooks: {e}");
    }

    if let Err(err) = run(cli) {
        if JSON_MODE.get().copied().unwrap_or(false) {
            eprintln!("{}", format_error_json(&err));
        } else {
            eprintln!("{}", humanize(&err));
        }
        std::process::exit(exit_code_for_error(&err));
    }
}

fn load_config(path: Option<&Path>) -> eyre::Result<rover_config::Config> {
    let cfg = match path {
        Some(p) => rover_config::load_file(p)?,
        None => rover_config::Config::default(),
    };
    cfg.validate()?;
    Ok(cfg)
}

/// Returns the file writer guard; logs are flushed when it is dropped.
fn init_tracing(
    cli: &Cli,
    logging: &rover_config::Logging,
) -> eyre::Result<Option<WorkerGuard>> {
    let console_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));

    let mut layers: Vec<Box<dyn Layer<Registry> + Send + Sync>> = Vec::new();
    if cli.json {
        layers.push(
            fmt::layer()
                .json()
                .with_writer(std::io::stderr)
                .with_filter(console_filter)
                .boxed(),
        );
    } else {
        layers.push(
            fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr)
                .with_filter(console_filter)
                .boxed(),
        );
    }

    let mut guard = None;
    if let Some(file) = logging.file.as_deref() {
        let path = Path::new(file);
        let dir = path
            .parent()
            .filter(|d| !d.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let name = path
            .file_name()
            .ok_or_else(|| eyre::eyre!("logging.file must name a file"))?;
        let appender = match logging.rotation.as_deref() {
            Some("daily") => tracing_appender::rolling::daily(dir, name),
            Some("hourly") => tracing_appender::rolling::hourly(dir, name),
            _ => tracing_appender::rolling::never(dir, name),
        };
        let (writer, file_guard) = tracing_appender::non_blocking(appender);
        guard = Some(file_guard);
        let file_filter = EnvFilter::new(logging.level.as_deref().unwrap_or("info"));
        layers.push(
            fmt::layer()
                .json()
                .with_ansi(false)
                .with_writer(writer)
                .with_filter(file_filter)
                .boxed(),
        );
    }

    tracing_subscriber::registry()
        .with(layers)
        .try_init()
        .wrap_err("init logging")?;
    Ok(guard)
}

fn run(cli: Cli) -> eyre::Result<()> {
    let cfg = load_config(cli.config.as_deref())?;
    let _log_guard = init_tracing(&cli, &cfg.logging)?;
    tracing::debug!(config = ?cli.config, "configuration loaded");

    let shutdown = run::shutdown_flag();
    match cli.cmd {
        Commands::Calibrate => {
            let mut rig = SimRig::from_config(&cfg)?;
            let report = run::run_calibration(&mut rig, &cfg, &shutdown)?;
            print_calibration(&report, cli.json);
        }
        Commands::Drive {
            left,
            right,
            duration_ms,
            every_ms,
        } => {
            let mut rig = SimRig::from_config(&cfg)?;
            let report = run::run_calibration(&mut rig, &cfg, &shutdown)?;
            if !cli.json {
                println!(
                    "calibrated: max motor speed {} steps/s",
                    report.calibration.max_motor_speed()
                );
            }
            let params = DriveParams {
                left,
                right,
                duration_ms,
                every_ms,
            };
            run::run_drive(&mut rig, params, &shutdown, |row| {
                print_row(row, cli.json);
            })?;
        }
        Commands::SelfCheck => {
            self_check(&cfg, &shutdown)?;
            if cli.json {
                println!("{}", json!({ "status": "ok" }));
            } else {
                println!("OK");
            }
        }
    }
    Ok(())
}

fn self_check(cfg: &rover_config::Config, shutdown: &AtomicBool) -> eyre::Result<()> {
    let mut rig = SimRig::from_config(cfg)?;
    if shutdown.load(std::sync::atomic::Ordering::Relaxed) {
        eyre::bail!("interrupted");
    }
    rig.tick();
    if rig.robot.state().is_none() {
        eyre::bail!("state machine did not start");
    }
    Ok(())
}

fn print_calibration(report: &CalibrationReport, as_json: bool) {
    let c = &report.calibration;
    if as_json {
        println!(
            "{}",
            json!({
                "backward": { "left": c.backward.left, "right": c.backward.right },
                "forward": { "left": c.forward.left, "right": c.forward.right },
                "max_motor_speed": c.max_motor_speed(),
                "duration_ms": report.duration_ms,
            })
        );
    } else {
        println!("calibration complete in {} ms", report.duration_ms);
        println!(
            "  backward: left={} right={} steps/s",
            c.backward.left, c.backward.right
        );
        println!(
            "  forward:  left={} right={} steps/s",
            c.forward.left, c.forward.right
        );
        println!("  max motor speed: {} steps/s", c.max_motor_speed());
    }
}

fn print_row(row: &TelemetryRow, as_json: bool) {
    if as_json {
        println!(
            "{}",
            json!({
                "t_ms": row.t_ms,
                "speed_left": row.speed_left,
                "speed_right": row.speed_right,
                "speed_center_avg": row.speed_center_avg,
                "mileage_mm": row.mileage_mm,
            })
        );
    } else {
        println!(
            "t={}ms left={} right={} center={} mileage={}mm",
            row.t_ms, row.speed_left, row.speed_right, row.speed_center_avg, row.mileage_mm
        );
    }
}
