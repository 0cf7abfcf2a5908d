//! CLI argument definitions and shared statics.

use clap::{ArgAction, Args, Parser, Subcommand};
use potstat_config::ElectrodeCfg;
use std::path::PathBuf;
use std::sync::OnceLock;

pub static FILE_GUARD: OnceLock<tracing_appender::non_blocking::WorkerGuard> = OnceLock::new();
/// Whether the user asked for JSON output (controls structured error output).
pub static JSON_MODE: OnceLock<bool> = OnceLock::new();

#[derive(Parser, Debug)]
#[command(name = "potstat", version, about = "Cycle statistics for galvanostatic battery tests")]
pub struct Cli {
    /// Path to config TOML (defaults apply when omitted)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Log and print results as JSON lines instead of text
    #[arg(long, action = ArgAction::SetTrue)]
    pub json: bool,

    /// Console log level (error|warn|info|debug|trace); RUST_LOG wins
    #[arg(long = "log-level", value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Command to execute
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Reduce one converted run into per-cycle statistics
    Reduce(ReduceArgs),
    /// Inspect or edit the electrode property journal
    Journal {
        #[command(subcommand)]
        action: JournalAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum JournalAction {
    /// List every stored entry
    List,
    /// Remove one entry
    Delete {
        /// Entry id as shown by `journal list`
        #[arg(long)]
        id: u32,
    },
}

#[derive(Args, Debug)]
pub struct ReduceArgs {
    /// Directory holding the converter tables of one run
    #[arg(value_name = "DIR")]
    pub source: PathBuf,

    /// Select full cycles: "N" for 1..=N or "A,B"
    #[arg(short = 'c', long, value_name = "RANGE", conflicts_with_all = ["time", "data"])]
    pub cycles: Option<String>,

    /// Select test time in hours: "N" for 0..=N or "A,B"
    #[arg(short = 't', long, value_name = "RANGE", conflicts_with_all = ["cycles", "data"])]
    pub time: Option<String>,

    /// Select data point indices: "N" for 1..=N or "A,B"
    #[arg(short = 'd', long, value_name = "RANGE", conflicts_with_all = ["cycles", "time"])]
    pub data: Option<String>,

    /// Take the counter electrode potential from the aux channel (Biologic)
    #[arg(short = 'b', long, action = ArgAction::SetTrue)]
    pub biologic_ce: bool,

    #[command(flatten)]
    pub working: WorkingArgs,

    #[command(flatten)]
    pub counter: CounterArgs,

    /// Write data, statistics and profile files into DIR
    #[arg(short = 'e', long, value_name = "DIR")]
    pub export: Option<PathBuf>,

    /// Neither read nor update the property journal
    #[arg(long, action = ArgAction::SetTrue)]
    pub no_journal: bool,

    /// Do not print the per-cycle summary
    #[arg(short = 'q', long, action = ArgAction::SetTrue)]
    pub quiet: bool,
}

#[derive(Args, Debug, Default)]
#[command(next_help_heading = "Working electrode")]
pub struct WorkingArgs {
    /// Active mass [mg]
    #[arg(long, value_name = "MG", value_parser = parse_property)]
    pub mass: Option<f64>,
    /// Theoretical capacity [mAh/g]
    #[arg(long, value_name = "MAH_G", value_parser = parse_property)]
    pub capacity: Option<f64>,
    /// Electrode area [cm²]
    #[arg(long, value_name = "CM2", value_parser = parse_property)]
    pub area: Option<f64>,
    /// Electrode volume [µL]
    #[arg(long, value_name = "UL", value_parser = parse_property)]
    pub volume: Option<f64>,
}

#[derive(Args, Debug, Default)]
#[command(next_help_heading = "Counter electrode (full cells)")]
pub struct CounterArgs {
    /// Counter electrode active mass [mg]
    #[arg(id = "ce_mass", long = "ce-mass", value_name = "MG", value_parser = parse_property)]
    pub mass: Option<f64>,
    /// Counter electrode theoretical capacity [mAh/g]
    #[arg(id = "ce_capacity", long = "ce-capacity", value_name = "MAH_G", value_parser = parse_property)]
    pub capacity: Option<f64>,
    /// Counter electrode area [cm²]
    #[arg(id = "ce_area", long = "ce-area", value_name = "CM2", value_parser = parse_property)]
    pub area: Option<f64>,
    /// Counter electrode volume [µL]
    #[arg(id = "ce_volume", long = "ce-volume", value_name = "UL", value_parser = parse_property)]
    pub volume: Option<f64>,
}

fn electrode_cfg(
    mass: Option<f64>,
    capacity: Option<f64>,
    area: Option<f64>,
    volume: Option<f64>,
) -> ElectrodeCfg {
    ElectrodeCfg {
        mass_mg: mass.unwrap_or(0.0),
        capacity_mah_g: capacity.unwrap_or(0.0),
        area_cm2: area.unwrap_or(0.0),
        volume_ul: volume.unwrap_or(0.0),
    }
}

impl WorkingArgs {
    pub fn to_cfg(&self) -> ElectrodeCfg {
        electrode_cfg(self.mass, self.capacity, self.area, self.volume)
    }
}

impl CounterArgs {
    pub fn to_cfg(&self) -> ElectrodeCfg {
        electrode_cfg(self.mass, self.capacity, self.area, self.volume)
    }
}

fn parse_property(s: &str) -> Result<f64, String> {
    let v: f64 = s.parse().map_err(|_| format!("{s:?} is not a number"))?;
    if !v.is_finite() || v < 0.0 {
        return Err(format!("{s:?} must be a finite number >= 0"));
    }
    Ok(v)
}
