//! Writing a reduction to disk: data table, statistics table and profiles.
//!
//! Tables are CSV with a name row and a unit row. Profiles are whitespace
//! aligned text with a `#` header, one file per half-cycle.

use eyre::WrapErr;
use potstat_core::battery::{BatteryReport, data_columns, statistics_columns};
use potstat_core::{ElectrodeProperties, ProfileBlock};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

/// Leading integer columns (point/cycle/step, cycle/start/end).
const INTEGER_COLUMNS: usize = 3;

pub struct ExportOptions {
    pub precision: usize,
    pub profiles: bool,
}

fn format_row(values: &[f64], precision: usize) -> Vec<String> {
    values
        .iter()
        .enumerate()
        .map(|(i, v)| {
            if i < INTEGER_COLUMNS {
                format!("{}", v.round() as i64)
            } else {
                format!("{v:.precision$}")
            }
        })
        .collect()
}

fn header_rows<'a>(columns: &'a [(String, &'static str)]) -> (Vec<&'a str>, Vec<&'a str>) {
    columns.iter().map(|(n, u)| (n.as_str(), *u)).unzip()
}

pub fn write_data(path: &Path, report: &BatteryReport, precision: usize) -> eyre::Result<()> {
    let mut w = csv::Writer::from_path(path).wrap_err_with(|| format!("create {}", path.display()))?;
    let columns = data_columns();
    let (names, units) = header_rows(&columns);
    w.write_record(&names)?;
    w.write_record(&units)?;
    for row in &report.data {
        w.write_record(format_row(&row.values(), precision))?;
    }
    w.flush()?;
    Ok(())
}

pub fn write_statistics(
    path: &Path,
    report: &BatteryReport,
    precision: usize,
) -> eyre::Result<()> {
    let mut w = csv::WriterBuilder::new()
        .flexible(true)
        .from_path(path)
        .wrap_err_with(|| format!("create {}", path.display()))?;

    // electrode properties block
    w.write_record(["electrode", "Mass", "Capacity", "Area", "Volume", "Loading"])?;
    w.write_record(["", "mg", "mAh/g", "cm²", "µL", "mg/cm²"])?;
    let mut electrodes = vec![&report.working];
    if report.full_cell {
        electrodes.push(&report.counter);
    }
    for e in electrodes {
        let p: &ElectrodeProperties = &e.properties;
        let mut rec = vec![e.electrode.label().to_string()];
        rec.extend(
            [p.mass, p.capacity, p.area, p.volume, p.loading()]
                .iter()
                .map(|v| format!("{v:.2}")),
        );
        w.write_record(&rec)?;
    }

    let columns = statistics_columns();
    let (names, units) = header_rows(&columns);
    w.write_record(&names)?;
    w.write_record(&units)?;
    for row in &report.statistics {
        w.write_record(format_row(&row.values(), precision))?;
    }
    w.flush()?;
    Ok(())
}

/// Profile file body: `#` header, then `capacity voltage dQ/dV` lines.
pub fn render_profile(block: &ProfileBlock) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "# cycle {}", block.cycle);
    let _ = writeln!(out, "# {}", block.direction.as_str());
    let _ = writeln!(out, "# mass {:.2} mg", block.mass);
    let _ = writeln!(out, "# {:<12} {:<12} {:<12}", "capacity", "voltage", "dQ/dV");
    let _ = writeln!(out, "# {:<12} {:<12} {:<12}", "mAh/g", "V", "As/V");
    for i in 0..block.len() {
        let _ = writeln!(
            out,
            "{:12.6} {:12.6} {:12.6}",
            block.capacity[i], block.voltage[i], block.dqdv[i]
        );
    }
    out
}

/// Write every export file for one run into `dir`; returns the written paths.
pub fn write_all(
    dir: &Path,
    stem: &str,
    report: &BatteryReport,
    profiles: &[ProfileBlock],
    opts: &ExportOptions,
) -> eyre::Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir).wrap_err_with(|| format!("create export dir {}", dir.display()))?;
    let mut written = Vec::new();

    let data = dir.join(format!("{stem}_data.csv"));
    write_data(&data, report, opts.precision)?;
    written.push(data);

    let stats = dir.join(format!("{stem}_statistics.csv"));
    write_statistics(&stats, report, opts.precision)?;
    written.push(stats);

    if opts.profiles {
        for block in profiles {
            let path = dir.join(format!("{stem}_{}.txt", block.name));
            std::fs::write(&path, render_profile(block))
                .wrap_err_with(|| format!("write profile {}", path.display()))?;
            written.push(path);
        }
    }

    tracing::info!(dir = %dir.display(), files = written.len(), "export written");
    Ok(written)
}
