//! `bcss`: rewrite NC programs so the spindle speed tracks the B-axis tilt.

mod cli;
mod convert;
mod error_fmt;

use std::path::Path;

use bcss_core::BcssError;
use bcss_traits::SystemClock;
use clap::Parser;
use eyre::WrapErr;
use tracing_appender::non_blocking::WorkerGuard;

use crate::cli::{Cli, JSON_MODE};
use crate::convert::{RunPlan, summary_json, summary_line};

fn main() {
    // clap exits with 2 on usage errors and 0 for --help/--version.
    let cli = Cli::parse();
    let _ = JSON_MODE.set(cli.json);
    let _ = color_eyre::install();

    if let Err(err) = run(cli) {
        tracing::debug!("{err:?}");
        if JSON_MODE.get().copied().unwrap_or(false) {
            eprintln!("{}", error_fmt::format_error_json(&err));
        } else {
            eprintln!("error: {err:#}\n{}", error_fmt::humanize(&err));
        }
        std::process::exit(error_fmt::exit_code_for_error(&err));
    }
}

fn run(cli: Cli) -> eyre::Result<()> {
    let mut cfg = match cli.config.as_deref() {
        Some(path) => load_config(path)?,
        None => bcss_config::Config::default(),
    };
    cli.overrides.apply(&mut cfg);
    cfg.validate()
        .map_err(|e| BcssError::Config(format!("{e:#}")))?;

    // Held until the last file is done so buffered log lines reach the file.
    let _log_guard = init_tracing(cli.json, &cli.log_level, &cfg.logging)?;

    let plan = RunPlan::new(&cfg, cli.out_dir);
    tracing::debug!(config = ?plan.core, out_dir = ?plan.out_dir, suffix = %plan.suffix, "effective configuration");

    let clock = SystemClock::new();
    for input in &cli.inputs {
        let report = plan.convert(input, &clock)?;
        if cli.json {
            println!("{}", summary_json(&report));
        } else {
            println!("{}", summary_line(&report));
        }
    }
    Ok(())
}

fn load_config(path: &Path) -> eyre::Result<bcss_config::Config> {
    if !path.is_file() {
        return Err(BcssError::Config(format!("config file not found: {}", path.display())).into());
    }
    bcss_config::load_file(path).map_err(|e| BcssError::Config(format!("{e:#}")).into())
}

fn init_tracing(
    json: bool,
    level: &str,
    logging: &bcss_config::Logging,
) -> eyre::Result<Option<WorkerGuard>> {
    use tracing_appender::rolling::{RollingFileAppender, Rotation};
    use tracing_subscriber::{EnvFilter, Layer, Registry, fmt, prelude::*};

    // RUST_LOG wins over --log-level for the console.
    let console_filter = match EnvFilter::try_from_default_env() {
        Ok(f) => f,
        Err(_) => EnvFilter::try_new(level).wrap_err_with(|| format!("invalid --log-level {level:?}"))?,
    };
    let console: Box<dyn Layer<Registry> + Send + Sync> = if json {
        fmt::layer().json().with_writer(std::io::stderr).boxed()
    } else {
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .boxed()
    };

    let mut guard = None;
    let file_layer = match logging.file.as_deref() {
        Some(file) => {
            let path = Path::new(file);
            let dir = path
                .parent()
                .filter(|d| !d.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new("."));
            let prefix = path
                .file_name()
                .ok_or_else(|| BcssError::Config(format!("logging.file has no file name: {file}")))?
                .to_string_lossy()
                .into_owned();
            let rotation = match logging.rotation.as_deref() {
                Some("daily") => Rotation::DAILY,
                Some("hourly") => Rotation::HOURLY,
                _ => Rotation::NEVER,
            };
            let appender = RollingFileAppender::builder()
                .rotation(rotation)
                .filename_prefix(prefix)
                .build(dir)
                .map_err(|e| BcssError::Io(format!("open log file {file}: {e}")))?;
            let (writer, file_guard) = tracing_appender::non_blocking(appender);
            guard = Some(file_guard);

            let file_level = logging.level.as_deref().unwrap_or("info");
            let file_filter = EnvFilter::try_new(file_level)
                .wrap_err_with(|| format!("invalid logging.level {file_level:?}"))?;
            Some(
                fmt::layer()
                    .json()
                    .with_ansi(false)
                    .with_writer(writer)
                    .with_filter(file_filter),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(console.with_filter(console_filter))
        .with(file_layer)
        .try_init()
        .wrap_err("install tracing subscriber")?;
    Ok(guard)
}
