//! The `reduce` command: load, resolve properties, reduce, export, report.

use crate::cli::ReduceArgs;
use crate::export::{ExportOptions, write_all};
use potstat_config::{Config, ElectrodeCfg, ElectrodeKey, Journal};
use potstat_core::error::{ReduceError, Result as CoreResult};
use potstat_core::{Electrode, ElectrodeProperties, Reduction, Selection, SourceTables, reduce};
use std::path::Path;

/// Identity of a run in the journal.
#[derive(Debug, Clone)]
pub struct RunKey {
    pub file: String,
    pub start: i64,
}

pub fn selection_from(args: &ReduceArgs) -> Result<Selection, ReduceError> {
    let sel = if let Some(c) = &args.cycles {
        Selection::parse_cycles(c)?
    } else if let Some(t) = &args.time {
        Selection::parse_time_hours(t)?
    } else if let Some(d) = &args.data {
        Selection::parse_points(d)?
    } else {
        Selection::All
    };
    Ok(sel)
}

fn run_stem(dir: &Path) -> String {
    dir.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| "run".to_string())
}

/// Properties for one electrode: flag > journal > config > 0. When flags were
/// given and a journal is open, the merged result is stored back.
pub fn resolve_properties(
    cfg: &ElectrodeCfg,
    flags: &ElectrodeCfg,
    journal: Option<&mut Journal>,
    key: &RunKey,
    electrode: Electrode,
) -> ElectrodeCfg {
    let Some(journal) = journal else {
        return cfg.overlay(flags);
    };
    let jkey = ElectrodeKey::from(electrode);
    let stored = journal
        .lookup(&key.file, key.start, jkey)
        .map(|e| e.properties)
        .unwrap_or_default();
    let merged = cfg.overlay(&stored).overlay(flags);
    if !flags.is_unset() {
        let id = journal.upsert(&key.file, key.start, jkey, merged);
        tracing::info!(id, electrode = electrode.label(), "journal entry updated");
    } else if !stored.is_unset() {
        tracing::info!(electrode = electrode.label(), "properties taken from journal");
    }
    merged
}

pub fn run_reduce(cfg: &Config, args: &ReduceArgs) -> CoreResult<Reduction> {
    let selection = selection_from(args)?;

    let run = potstat_config::load_run(&args.source, &cfg.source)?;
    let key = RunKey {
        file: run_stem(&args.source),
        start: run.samples.first().map_or(0, |s| s.date_time.floor() as i64),
    };

    let use_journal = cfg.journal.enabled && !args.no_journal;
    let journal_path = Path::new(&cfg.journal.path);
    let mut journal = if use_journal {
        Some(Journal::load(journal_path)?)
    } else {
        None
    };
    let before = journal.clone();

    let working = resolve_properties(
        &cfg.working,
        &args.working.to_cfg(),
        journal.as_mut(),
        &key,
        Electrode::Working,
    );
    let counter = resolve_properties(
        &cfg.counter,
        &args.counter.to_cfg(),
        journal.as_mut(),
        &key,
        Electrode::Counter,
    );
    if working.mass_mg == 0.0 {
        tracing::warn!("working electrode mass unknown; mass-normalized columns are zero");
    }

    let mut source = SourceTables::from(&run);
    if args.biologic_ce {
        tracing::info!("counter electrode potential taken from aux channel");
        source = source.with_aux_counter_potential();
    }
    let reduction = reduce(
        source,
        &selection,
        &ElectrodeProperties::from(&working),
        &ElectrodeProperties::from(&counter),
    )?;

    // a failed reduction leaves the journal untouched
    if let Some(j) = &journal
        && before.as_ref() != Some(j)
    {
        j.save(journal_path)?;
    }

    if let Some(dir) = &args.export {
        let opts = ExportOptions {
            precision: cfg.export.precision,
            profiles: cfg.export.profiles,
        };
        write_all(dir, &key.file, &reduction.report, &reduction.profiles, &opts)?;
    }
    Ok(reduction)
}

/// Per-cycle summary on stdout, as text or one JSON object per cycle.
pub fn print_summary(reduction: &Reduction, json: bool) {
    let report = &reduction.report;
    if json {
        for s in &report.statistics {
            let w = &s.working;
            let obj = serde_json::json!({
                "cycle": s.cycle,
                "full_cell": report.full_cell,
                "capacity_mah_g": { "charge": w.specific_capacity.charge, "discharge": w.specific_capacity.discharge },
                "energy_wh_kg": { "charge": w.specific_energy.charge, "discharge": w.specific_energy.discharge },
                "voltage_v": { "charge": w.voltage.charge, "discharge": w.voltage.discharge },
                "hysteresis_v": w.hysteresis,
                "efficiency": s.efficiency,
                "c_rate_h": { "charge": w.c_rate.charge, "discharge": w.c_rate.discharge },
            });
            println!("{obj}");
        }
        return;
    }

    println!(
        "{} cell, {} cycles, {} data points, {} profiles",
        if report.full_cell { "full" } else { "half" },
        report.statistics.len(),
        report.data.len(),
        reduction.profiles.len()
    );
    println!(
        "{:>5} {:>12} {:>12} {:>8} {:>8} {:>8} {:>8}",
        "cycle", "Qc[mAh/g]", "Qd[mAh/g]", "CE[%]", "Vc[V]", "Vd[V]", "dV[V]"
    );
    for s in &report.statistics {
        let w = &s.working;
        println!(
            "{:>5} {:>12.3} {:>12.3} {:>8.2} {:>8.4} {:>8.4} {:>8.4}",
            s.cycle,
            w.specific_capacity.charge,
            w.specific_capacity.discharge,
            s.efficiency * 100.0,
            w.voltage.charge,
            w.voltage.discharge,
            w.hysteresis
        );
    }
}
