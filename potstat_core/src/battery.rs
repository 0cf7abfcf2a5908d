//! Unified per-sample and per-cycle tables for a half or full cell.
//!
//! Column order is part of the contract with the export layer: shared
//! columns first, then the working electrode block, then the counter
//! electrode block. In a half cell the counter block is present and zero.

use crate::electrode::{CycleStatistics, ElectrodeStatistics};
use crate::model::{Electrode, ElectrodeProperties, Pair};
use crate::range::Windows;
use crate::segment::CycleTables;

/// Leading per-sample columns `(name, unit)`.
const DATA_SHARED: [(&str, &str); 8] = [
    ("data_point", ""),
    ("cycle_index", ""),
    ("step_index", ""),
    ("test_time", "s"),
    ("step_time", "s"),
    ("datetime", "s"),
    ("temperature", "°C"),
    ("current", "A"),
];

const DATA_ELECTRODE: [(&str, &str); 4] = [
    ("voltage", "V"),
    ("capacity", "mAh/g"),
    ("energy", "Wh/kg"),
    ("dQ/dV", "As/V"),
];

const STATS_SHARED: [(&str, &str); 6] = [
    ("cycle_index", ""),
    ("start", ""),
    ("end", ""),
    ("time(c)", "s"),
    ("time(d)", "s"),
    ("efficiency", "%"),
];

const STATS_ELECTRODE: [(&str, &str); 19] = [
    ("capacity(c)", "mAh/g"),
    ("capacity(d)", "mAh/g"),
    ("capacity(c)", "mAh/cm³"),
    ("capacity(d)", "mAh/cm³"),
    ("energy(c)", "Wh/kg"),
    ("energy(d)", "Wh/kg"),
    ("energy(c)", "Wh/L"),
    ("energy(d)", "Wh/L"),
    ("Vav(c)", "V"),
    ("Vav(d)", "V"),
    ("hysteresis", "V"),
    ("current(c)", "A"),
    ("current(d)", "A"),
    ("density(c)", "mA/g"),
    ("density(d)", "mA/g"),
    ("density(c)", "mA/cm²"),
    ("density(d)", "mA/cm²"),
    ("c-rate(c)", "h"),
    ("c-rate(d)", "h"),
];

pub const DATA_WIDTH: usize = DATA_SHARED.len() + 2 * DATA_ELECTRODE.len();
pub const STATISTICS_WIDTH: usize = STATS_SHARED.len() + 2 * STATS_ELECTRODE.len();

fn columns(shared: &[(&str, &'static str)], block: &[(&str, &'static str)]) -> Vec<(String, &'static str)> {
    let mut out: Vec<(String, &'static str)> =
        shared.iter().map(|(n, u)| ((*n).to_string(), *u)).collect();
    for e in [Electrode::Working, Electrode::Counter] {
        out.extend(
            block
                .iter()
                .map(|(n, u)| (format!("{n}[{}]", e.label()), *u)),
        );
    }
    out
}

/// `(name, unit)` of every per-sample column, in export order.
pub fn data_columns() -> Vec<(String, &'static str)> {
    columns(&DATA_SHARED, &DATA_ELECTRODE)
}

/// `(name, unit)` of every per-cycle column, in export order.
pub fn statistics_columns() -> Vec<(String, &'static str)> {
    columns(&STATS_SHARED, &STATS_ELECTRODE)
}

/// Electrode-specific values of one sample.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ElectrodeSample {
    pub voltage: f64,
    pub capacity: f64,
    pub energy: f64,
    pub dqdv: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DataRow {
    pub point: u64,
    pub cycle: u32,
    pub step: i32,
    pub test_time: f64,
    pub step_time: f64,
    pub timestamp: f64,
    pub temperature: f64,
    pub current: f64,
    pub working: ElectrodeSample,
    pub counter: ElectrodeSample,
}

impl DataRow {
    /// Values in `data_columns()` order.
    pub fn values(&self) -> [f64; DATA_WIDTH] {
        let e = |s: &ElectrodeSample| [s.voltage, s.capacity, s.energy, s.dqdv];
        let [wv, wq, we, wd] = e(&self.working);
        let [cv, cq, ce, cd] = e(&self.counter);
        [
            self.point as f64,
            f64::from(self.cycle),
            f64::from(self.step),
            self.test_time,
            self.step_time,
            self.timestamp,
            self.temperature,
            self.current,
            wv,
            wq,
            we,
            wd,
            cv,
            cq,
            ce,
            cd,
        ]
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StatisticsRow {
    pub cycle: u32,
    pub start: usize,
    pub end: usize,
    pub time: Pair,
    /// Qd / Qc
    pub efficiency: f64,
    pub working: CycleStatistics,
    pub counter: CycleStatistics,
}

impl StatisticsRow {
    /// Values in `statistics_columns()` order; efficiency in percent.
    pub fn values(&self) -> Vec<f64> {
        let mut out = Vec::with_capacity(STATISTICS_WIDTH);
        out.extend([
            f64::from(self.cycle),
            self.start as f64,
            self.end as f64,
            self.time.charge,
            self.time.discharge,
            self.efficiency * 100.0,
        ]);
        for s in [&self.working, &self.counter] {
            let pairs = [
                s.specific_capacity,
                s.volumetric_capacity,
                s.specific_energy,
                s.volumetric_energy,
                s.voltage,
            ];
            for p in pairs {
                out.extend([p.charge, p.discharge]);
            }
            out.push(s.hysteresis);
            for p in [s.current, s.specific_current, s.area_current, s.c_rate] {
                out.extend([p.charge, p.discharge]);
            }
        }
        out
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BatteryReport {
    pub full_cell: bool,
    pub working: ElectrodeStatistics,
    pub counter: ElectrodeStatistics,
    pub data: Vec<DataRow>,
    pub statistics: Vec<StatisticsRow>,
}

/// Combines the electrodes of one cell. Whether the cell is a full cell is
/// decided once, from the whole sample table.
#[derive(Debug, Clone, Copy)]
pub struct BatteryAggregator {
    full_cell: bool,
}

impl BatteryAggregator {
    pub fn new(tables: &CycleTables) -> Self {
        let full_cell = tables.samples().iter().any(|s| s.voltage2 != 0.0);
        tracing::debug!(full_cell, "cell type detected");
        Self { full_cell }
    }

    pub fn is_full_cell(&self) -> bool {
        self.full_cell
    }

    pub fn aggregate(
        &self,
        tables: &CycleTables,
        windows: &Windows,
        working: &ElectrodeProperties,
        counter: &ElectrodeProperties,
    ) -> BatteryReport {
        let we = ElectrodeStatistics::compute(tables, windows, Electrode::Working, working);
        let ce = if self.full_cell {
            ElectrodeStatistics::compute(tables, windows, Electrode::Counter, counter)
        } else {
            ElectrodeStatistics::zeroed(tables, windows, Electrode::Counter)
        };

        let data = tables.samples()[windows.points.clone()]
            .iter()
            .enumerate()
            .map(|(i, s)| DataRow {
                point: s.point,
                cycle: s.full_cycle,
                step: s.step,
                test_time: s.test_time,
                step_time: s.step_time,
                timestamp: s.timestamp,
                temperature: s.aux,
                current: s.current,
                working: electrode_sample(&we, i),
                counter: electrode_sample(&ce, i),
            })
            .collect();

        let statistics = windows
            .full_slice(tables)
            .iter()
            .zip(we.cycles.iter().zip(&ce.cycles))
            .map(|(f, (w, c))| StatisticsRow {
                cycle: f.index,
                start: f.start,
                end: f.end,
                time: f.time,
                efficiency: f.efficiency,
                working: *w,
                counter: *c,
            })
            .collect();

        BatteryReport {
            full_cell: self.full_cell,
            working: we,
            counter: ce,
            data,
            statistics,
        }
    }
}

fn electrode_sample(stats: &ElectrodeStatistics, i: usize) -> ElectrodeSample {
    let s = &stats.samples;
    ElectrodeSample {
        voltage: s.voltage[i],
        capacity: s.capacity[i],
        energy: s.energy[i],
        dqdv: s.dqdv[i],
    }
}
