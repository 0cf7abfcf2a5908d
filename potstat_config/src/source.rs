//! CSV loaders for the tables written by the upstream converter.
//!
//! Column names follow the converter's relational schema
//! (`Channel_Normal_Table`, `Full_Cycle_Table`, `Half_Cycle_Table`).
//! Headers are checked before any row is parsed; rows are 1-based in error
//! messages, counting the header line.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use std::path::Path;

use crate::SourceCfg;

/// One row of the per-sample table.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
pub struct SampleRow {
    #[serde(rename = "Data_Point")]
    pub data_point: u64,
    #[serde(rename = "Full_Cycle")]
    pub full_cycle: u32,
    #[serde(rename = "Step_Index")]
    pub step_index: i32,
    #[serde(rename = "Test_Time")]
    pub test_time: f64,
    #[serde(rename = "Step_Time")]
    pub step_time: f64,
    #[serde(rename = "DateTime")]
    pub date_time: f64,
    #[serde(rename = "Current")]
    pub current: f64,
    #[serde(rename = "Voltage")]
    pub voltage: f64,
    #[serde(rename = "Voltage2", default)]
    pub voltage2: f64,
    #[serde(rename = "Capacity")]
    pub capacity: f64,
    #[serde(rename = "Energy")]
    pub energy: f64,
    #[serde(rename = "Energy2", default)]
    pub energy2: f64,
    #[serde(rename = "dQdV")]
    pub dqdv: f64,
    #[serde(rename = "dQdV2", default)]
    pub dqdv2: f64,
    #[serde(rename = "Aux_Channel", default, deserialize_with = "zero_if_empty")]
    pub aux_channel: f64,
}

/// One row of the per-full-cycle table. Aggregates of a missing half-cycle
/// are written as empty cells by the converter and read back as 0. The
/// converter's `Hysteresis` and `Efficiency` columns are ignored; both are
/// recomputed after the sign fix.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
pub struct FullCycleRow {
    #[serde(rename = "Full_Cycle")]
    pub full_cycle: u32,
    #[serde(rename = "Cycle_Start")]
    pub cycle_start: usize,
    #[serde(rename = "Cycle_End")]
    pub cycle_end: usize,
    #[serde(rename = "Charge_Time", deserialize_with = "zero_if_empty")]
    pub charge_time: f64,
    #[serde(rename = "Discharge_Time", deserialize_with = "zero_if_empty")]
    pub discharge_time: f64,
    #[serde(rename = "Charge_Capacity", deserialize_with = "zero_if_empty")]
    pub charge_capacity: f64,
    #[serde(rename = "Discharge_Capacity", deserialize_with = "zero_if_empty")]
    pub discharge_capacity: f64,
    #[serde(rename = "Charge_Energy", deserialize_with = "zero_if_empty")]
    pub charge_energy: f64,
    #[serde(rename = "Discharge_Energy", deserialize_with = "zero_if_empty")]
    pub discharge_energy: f64,
    #[serde(rename = "Charge_Voltage", deserialize_with = "zero_if_empty")]
    pub charge_voltage: f64,
    #[serde(rename = "Discharge_Voltage", deserialize_with = "zero_if_empty")]
    pub discharge_voltage: f64,
}

/// One row of the per-half-cycle table.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct HalfCycleRow {
    #[serde(rename = "Half_Cycle")]
    pub half_cycle: u32,
    #[serde(rename = "Cycle_Start")]
    pub cycle_start: usize,
    #[serde(rename = "Cycle_End")]
    pub cycle_end: usize,
    #[serde(rename = "Step_Index")]
    pub step_index: i32,
}

/// The three converter tables of one run, as read from disk.
#[derive(Debug, Clone, Default)]
pub struct RunTables {
    pub samples: Vec<SampleRow>,
    pub full_cycles: Vec<FullCycleRow>,
    pub half_cycles: Vec<HalfCycleRow>,
}

pub const SAMPLE_HEADERS: &[&str] = &[
    "Data_Point",
    "Full_Cycle",
    "Step_Index",
    "Test_Time",
    "Step_Time",
    "DateTime",
    "Current",
    "Voltage",
    "Capacity",
    "Energy",
    "dQdV",
];

pub const FULL_CYCLE_HEADERS: &[&str] = &[
    "Full_Cycle",
    "Cycle_Start",
    "Cycle_End",
    "Charge_Time",
    "Discharge_Time",
    "Charge_Capacity",
    "Discharge_Capacity",
    "Charge_Energy",
    "Discharge_Energy",
    "Charge_Voltage",
    "Discharge_Voltage",
];

pub const HALF_CYCLE_HEADERS: &[&str] = &["Half_Cycle", "Cycle_Start", "Cycle_End", "Step_Index"];

fn zero_if_empty<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let opt: Option<f64> = Option::deserialize(deserializer)?;
    Ok(opt.unwrap_or(0.0))
}

fn load_table<T: DeserializeOwned>(
    path: &Path,
    what: &str,
    required: &[&str],
) -> eyre::Result<Vec<T>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|e| eyre::eyre!("open {what} CSV {:?}: {}", path, e))?;

    // Enforce required headers (extra columns are tolerated)
    let headers = rdr
        .headers()
        .map_err(|e| eyre::eyre!("read CSV headers {:?}: {}", path, e))?
        .clone();
    let missing: Vec<&str> = required
        .iter()
        .copied()
        .filter(|h| !headers.iter().any(|a| a == *h))
        .collect();
    if !missing.is_empty() {
        eyre::bail!(
            "{what} CSV {:?} is missing required headers: {}",
            path,
            missing.join(",")
        );
    }

    let mut rows = Vec::new();
    for (idx, rec) in rdr.deserialize::<T>().enumerate() {
        match rec {
            Ok(row) => rows.push(row),
            Err(e) => {
                eyre::bail!("invalid {what} CSV row {} in {:?}: {}", idx + 2, path, e);
            }
        }
    }
    tracing::debug!(table = what, rows = rows.len(), path = %path.display(), "loaded table");
    Ok(rows)
}

pub fn load_samples_csv(path: &Path) -> eyre::Result<Vec<SampleRow>> {
    load_table(path, "sample", SAMPLE_HEADERS)
}

pub fn load_full_cycles_csv(path: &Path) -> eyre::Result<Vec<FullCycleRow>> {
    load_table(path, "full-cycle", FULL_CYCLE_HEADERS)
}

pub fn load_half_cycles_csv(path: &Path) -> eyre::Result<Vec<HalfCycleRow>> {
    load_table(path, "half-cycle", HALF_CYCLE_HEADERS)
}

/// Load all three tables of a run directory using the configured file names.
pub fn load_run(dir: &Path, cfg: &SourceCfg) -> eyre::Result<RunTables> {
    if !dir.is_dir() {
        eyre::bail!("run directory {:?} does not exist", dir);
    }
    Ok(RunTables {
        samples: load_samples_csv(&dir.join(&cfg.samples))?,
        full_cycles: load_full_cycles_csv(&dir.join(&cfg.full_cycles))?,
        half_cycles: load_half_cycles_csv(&dir.join(&cfg.half_cycles))?,
    })
}
