use clap::Parser;
use eyre::WrapErr;
use potstat_config::{Config, Journal};
use std::path::Path;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

mod cli;
mod error_fmt;
mod export;
mod reduce;

use cli::{Cli, Commands, FILE_GUARD, JSON_MODE, JournalAction};
use error_fmt::{exit_code_for_error, format_error_json, humanize};

fn load_config(path: Option<&Path>) -> eyre::Result<Config> {
    let Some(path) = path else {
        return Ok(Config::default());
    };
    let text = std::fs::read_to_string(path)
        .wrap_err_with(|| format!("read config {}", path.display()))?;
    let cfg = potstat_config::load_toml(&text)
        .map_err(|e| eyre::eyre!("invalid configuration in {}: {e}", path.display()))?;
    cfg.validate()?;
    Ok(cfg)
}

/// Console layer on stderr (pretty or JSON) plus an optional JSON file sink.
/// `RUST_LOG` overrides `--log-level`, which overrides `[logging] level`.
fn init_tracing(cli: &Cli, cfg: &Config) -> eyre::Result<()> {
    let level = cli
        .log_level
        .as_deref()
        .or(cfg.logging.level.as_deref())
        .unwrap_or("info");
    let filter = match EnvFilter::try_from_default_env() {
        Ok(f) => f,
        Err(_) => EnvFilter::try_new(level).wrap_err_with(|| format!("bad log level {level:?}"))?,
    };

    let file_layer = match cfg.logging.file.as_deref() {
        Some(file) => {
            let path = Path::new(file);
            let dir = path
                .parent()
                .filter(|d| !d.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new("."));
            let name = path
                .file_name()
                .ok_or_else(|| eyre::eyre!("logging.file {file:?} has no file name"))?;
            let appender = match cfg.logging.rotation.as_deref() {
                Some("daily") => tracing_appender::rolling::daily(dir, name),
                Some("hourly") => tracing_appender::rolling::hourly(dir, name),
                _ => tracing_appender::rolling::never(dir, name),
            };
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let _ = FILE_GUARD.set(guard);
            Some(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_ansi(false)
                    .with_writer(writer),
            )
        }
        None => None,
    };

    let registry = tracing_subscriber::registry().with(filter).with(file_layer);
    let res = if cli.json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .try_init()
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .try_init()
    };
    res.map_err(|e| eyre::eyre!("init logging: {e}"))
}

fn run_journal(cfg: &Config, action: &JournalAction, json: bool) -> eyre::Result<()> {
    let path = Path::new(&cfg.journal.path);
    let mut journal = Journal::load(path)?;
    match action {
        JournalAction::List => {
            for e in &journal.entries {
                let p = &e.properties;
                if json {
                    let obj = serde_json::json!({
                        "id": e.id,
                        "file": e.file,
                        "start": e.start,
                        "electrode": e.electrode,
                        "mass_mg": p.mass_mg,
                        "capacity_mah_g": p.capacity_mah_g,
                        "area_cm2": p.area_cm2,
                        "volume_ul": p.volume_ul,
                    });
                    println!("{obj}");
                } else {
                    println!(
                        "{:>4} {:<24} {:>12} {:<8} mass={} mg capacity={} mAh/g area={} cm² volume={} µL",
                        e.id,
                        e.file,
                        e.start,
                        format!("{:?}", e.electrode).to_lowercase(),
                        p.mass_mg,
                        p.capacity_mah_g,
                        p.area_cm2,
                        p.volume_ul
                    );
                }
            }
        }
        JournalAction::Delete { id } => {
            if !journal.delete(*id) {
                eyre::bail!("no journal entry with id {id}");
            }
            journal.save(path)?;
            tracing::info!(id, "journal entry deleted");
            if !json {
                println!("deleted entry {id}");
            }
        }
    }
    Ok(())
}

fn real_main(cli: &Cli) -> eyre::Result<()> {
    let cfg = load_config(cli.config.as_deref())?;
    init_tracing(cli, &cfg)?;
    tracing::debug!(config = ?cli.config, "configuration loaded");

    match &cli.cmd {
        Commands::Reduce(args) => {
            let reduction = reduce::run_reduce(&cfg, args)?;
            if !args.quiet {
                reduce::print_summary(&reduction, cli.json);
            }
        }
        Commands::Journal { action } => run_journal(&cfg, action, cli.json)?,
    }
    Ok(())
}

fn main() {
    let _ = color_eyre::install();
    let cli = Cli::parse();
    let _ = JSON_MODE.set(cli.json);

    if let Err(err) = real_main(&cli) {
        tracing::error!(error = %err, "potstat failed");
        if JSON_MODE.get().copied().unwrap_or(false) {
            eprintln!("{}", format_error_json(&err));
        } else {
            eprintln!("{}", humanize(&err));
        }
        std::process::exit(exit_code_for_error(&err));
    }
}
