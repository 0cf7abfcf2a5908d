#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
//! Config schemas, converter table loading and the property journal.
//!
//! - `Config` and sub-structs are deserialized from TOML and validated.
//! - `source` loads the three tables written by the upstream converter
//!   (per-sample, per-full-cycle, per-half-cycle) and enforces their headers.
//! - `journal` remembers electrode properties across runs.
use serde::{Deserialize, Serialize};

pub mod journal;
pub mod source;

pub use journal::{ElectrodeKey, Journal, JournalEntry};
pub use source::{
    FullCycleRow, HalfCycleRow, RunTables, SampleRow, load_full_cycles_csv, load_half_cycles_csv,
    load_run, load_samples_csv,
};

/// File names of the converter tables inside a run directory.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SourceCfg {
    pub samples: String,
    pub full_cycles: String,
    pub half_cycles: String,
}

impl Default for SourceCfg {
    fn default() -> Self {
        Self {
            samples: "samples.csv".to_string(),
            full_cycles: "full_cycles.csv".to_string(),
            half_cycles: "half_cycles.csv".to_string(),
        }
    }
}

/// Physical properties of one electrode. Zero means "unknown" and disables
/// every statistic normalized by that property.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, Default, PartialEq)]
#[serde(default)]
pub struct ElectrodeCfg {
    /// active mass [mg]
    pub mass_mg: f64,
    /// theoretical capacity [mAh/g]
    pub capacity_mah_g: f64,
    /// electrode area [cm²]
    pub area_cm2: f64,
    /// electrode volume [µL]
    pub volume_ul: f64,
}

impl ElectrodeCfg {
    /// True when no property has been supplied.
    pub fn is_unset(&self) -> bool {
        self.mass_mg == 0.0
            && self.capacity_mah_g == 0.0
            && self.area_cm2 == 0.0
            && self.volume_ul == 0.0
    }

    /// Field-wise merge: non-zero values of `over` win.
    #[must_use]
    pub fn overlay(self, over: &Self) -> Self {
        let pick = |base: f64, top: f64| if top != 0.0 { top } else { base };
        Self {
            mass_mg: pick(self.mass_mg, over.mass_mg),
            capacity_mah_g: pick(self.capacity_mah_g, over.capacity_mah_g),
            area_cm2: pick(self.area_cm2, over.area_cm2),
            volume_ul: pick(self.volume_ul, over.volume_ul),
        }
    }

    fn validate(&self, section: &str) -> eyre::Result<()> {
        for (name, v) in [
            ("mass_mg", self.mass_mg),
            ("capacity_mah_g", self.capacity_mah_g),
            ("area_cm2", self.area_cm2),
            ("volume_ul", self.volume_ul),
        ] {
            if !v.is_finite() {
                eyre::bail!("{section}.{name} must be a finite number");
            }
            if v < 0.0 {
                eyre::bail!("{section}.{name} must be >= 0 (0 = unknown)");
            }
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Logging {
    pub file: Option<String>,  // path to .log (JSON lines)
    pub level: Option<String>, // "info","debug"
    /// Log rotation policy: "never" | "daily" | "hourly" (default: never)
    pub rotation: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ExportCfg {
    /// Write per-half-cycle voltage profiles next to the tables
    pub profiles: bool,
    /// Digits after the decimal point in exported tables
    pub precision: usize,
}

impl Default for ExportCfg {
    fn default() -> Self {
        Self {
            profiles: true,
            precision: 6,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct JournalCfg {
    pub enabled: bool,
    pub path: String,
}

impl Default for JournalCfg {
    fn default() -> Self {
        Self {
            enabled: true,
            path: "potstat-journal.toml".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub source: SourceCfg,
    /// Working electrode properties
    #[serde(default)]
    pub working: ElectrodeCfg,
    /// Counter electrode properties (full cells only)
    #[serde(default)]
    pub counter: ElectrodeCfg,
    #[serde(default)]
    pub logging: Logging,
    #[serde(default)]
    pub export: ExportCfg,
    #[serde(default)]
    pub journal: JournalCfg,
}

pub fn load_toml(s: &str) -> Result<Config, toml::de::Error> {
    toml::from_str::<Config>(s)
}

impl Config {
    pub fn validate(&self) -> eyre::Result<()> {
        // Source
        for (name, v) in [
            ("samples", &self.source.samples),
            ("full_cycles", &self.source.full_cycles),
            ("half_cycles", &self.source.half_cycles),
        ] {
            if v.trim().is_empty() {
                eyre::bail!("source.{name} must not be empty");
            }
        }

        // Electrodes
        self.working.validate("working")?;
        self.counter.validate("counter")?;

        // Logging
        if let Some(rot) = self.logging.rotation.as_deref()
            && !matches!(rot, "never" | "daily" | "hourly")
        {
            eyre::bail!("logging.rotation must be one of never|daily|hourly, got {rot:?}");
        }

        // Export
        if self.export.precision > 12 {
            eyre::bail!("export.precision must be <= 12");
        }

        // Journal
        if self.journal.enabled && self.journal.path.trim().is_empty() {
            eyre::bail!("journal.path must not be empty when the journal is enabled");
        }

        Ok(())
    }
}
