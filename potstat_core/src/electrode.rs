//! Normalized series and per-cycle statistics for one electrode.
//!
//! The working electrode reads `voltage`, `energy` and `dqdv`; the counter
//! electrode reads `voltage2`, `energy2` and `dqdv2`. Capacity is shared: the
//! same charge passes through both electrodes.
//!
//! The converter only aggregates the working electrode per cycle. For the
//! counter electrode, cycle energy is the largest `|energy2|` reached in each
//! half-cycle and the average voltage is that energy over the cycle capacity.

use crate::model::{Direction, Electrode, ElectrodeProperties, FullCycleRecord, Pair, RawSample};
use crate::range::Windows;
use crate::segment::{CycleTables, classify_step, owned_half_cycles};
use crate::units::{Quantity, c_rate, normalize, normalize_series, ratio};

/// Per-sample series over the selected rows.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SampleSeries {
    /// [V]
    pub voltage: Vec<f64>,
    /// [mAh/g]
    pub capacity: Vec<f64>,
    /// [Wh/kg]
    pub energy: Vec<f64>,
    /// [As/V]
    pub dqdv: Vec<f64>,
}

impl SampleSeries {
    pub fn zeros(rows: usize) -> Self {
        Self {
            voltage: vec![0.0; rows],
            capacity: vec![0.0; rows],
            energy: vec![0.0; rows],
            dqdv: vec![0.0; rows],
        }
    }

    pub fn len(&self) -> usize {
        self.voltage.len()
    }

    pub fn is_empty(&self) -> bool {
        self.voltage.is_empty()
    }
}

/// Intensive statistics of one full cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CycleStatistics {
    pub cycle: u32,
    /// [mAh/g]
    pub specific_capacity: Pair,
    /// [mAh/cm³]
    pub volumetric_capacity: Pair,
    /// [Wh/kg]
    pub specific_energy: Pair,
    /// [Wh/L]
    pub volumetric_energy: Pair,
    /// average voltage [V]
    pub voltage: Pair,
    /// [V]
    pub hysteresis: f64,
    /// average current [A]
    pub current: Pair,
    /// [mA/g]
    pub specific_current: Pair,
    /// [mA/cm²]
    pub area_current: Pair,
    /// [h]
    pub c_rate: Pair,
}

impl CycleStatistics {
    pub fn zeroed(cycle: u32) -> Self {
        Self {
            cycle,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ElectrodeStatistics {
    pub electrode: Electrode,
    pub properties: ElectrodeProperties,
    pub samples: SampleSeries,
    pub cycles: Vec<CycleStatistics>,
}

impl ElectrodeStatistics {
    pub fn compute(
        tables: &CycleTables,
        windows: &Windows,
        electrode: Electrode,
        properties: &ElectrodeProperties,
    ) -> Self {
        let rows = &tables.samples()[windows.points.clone()];
        let samples = sample_series(rows, electrode, properties);
        let cycles = windows
            .full_slice(tables)
            .iter()
            .map(|f| {
                let (energy, voltage, hysteresis) = match electrode {
                    Electrode::Working => (f.energy, f.voltage, f.hysteresis),
                    Electrode::Counter => counter_aggregates(tables, f),
                };
                cycle_statistics(f, energy, voltage, hysteresis, properties)
            })
            .collect();
        Self {
            electrode,
            properties: *properties,
            samples,
            cycles,
        }
    }

    /// Same shape as `compute` would produce, every value zero.
    pub fn zeroed(tables: &CycleTables, windows: &Windows, electrode: Electrode) -> Self {
        Self {
            electrode,
            properties: ElectrodeProperties::default(),
            samples: SampleSeries::zeros(windows.points.len()),
            cycles: windows
                .full_slice(tables)
                .iter()
                .map(|f| CycleStatistics::zeroed(f.index))
                .collect(),
        }
    }
}

fn sample_series(
    rows: &[RawSample],
    electrode: Electrode,
    properties: &ElectrodeProperties,
) -> SampleSeries {
    let pick = |f: fn(&RawSample) -> f64| rows.iter().map(f).collect::<Vec<f64>>();
    let (voltage, energy, dqdv) = match electrode {
        Electrode::Working => (pick(|s| s.voltage), pick(|s| s.energy), pick(|s| s.dqdv)),
        Electrode::Counter => (pick(|s| s.voltage2), pick(|s| s.energy2), pick(|s| s.dqdv2)),
    };
    let capacity = pick(|s| s.capacity);
    SampleSeries {
        voltage,
        capacity: normalize_series(&capacity, properties.mass, Quantity::SpecificCapacity),
        energy: normalize_series(&energy, properties.mass, Quantity::SpecificEnergy),
        dqdv,
    }
}

/// Energy, average voltage and hysteresis of the counter electrode.
fn counter_aggregates(tables: &CycleTables, f: &FullCycleRecord) -> (Pair, Pair, f64) {
    let samples = tables.samples();
    let mut energy = Pair::ZERO;
    for h in owned_half_cycles(tables.half_cycles(), f.index) {
        let peak = samples[h.rows()]
            .iter()
            .map(|s| s.energy2.abs())
            .fold(0.0, f64::max);
        match classify_step(h.step) {
            Some(Direction::Charge) => energy.charge = peak,
            Some(Direction::Discharge) => energy.discharge = peak,
            None => {}
        }
    }
    let voltage = energy.zip_with(f.capacity, ratio);
    let hysteresis = if voltage.charge != 0.0 && voltage.discharge != 0.0 {
        (voltage.charge - voltage.discharge).abs()
    } else {
        0.0
    };
    (energy, voltage, hysteresis)
}

fn cycle_statistics(
    f: &FullCycleRecord,
    energy: Pair,
    voltage: Pair,
    hysteresis: f64,
    p: &ElectrodeProperties,
) -> CycleStatistics {
    let current = f.capacity.zip_with(f.time, ratio);
    CycleStatistics {
        cycle: f.index,
        specific_capacity: f
            .capacity
            .map(|q| normalize(q, p.mass, Quantity::SpecificCapacity)),
        volumetric_capacity: f
            .capacity
            .map(|q| normalize(q, p.volume, Quantity::VolumetricCapacity)),
        specific_energy: energy.map(|e| normalize(e, p.mass, Quantity::SpecificEnergy)),
        volumetric_energy: energy.map(|e| normalize(e, p.volume, Quantity::VolumetricEnergy)),
        voltage,
        hysteresis,
        current,
        specific_current: current.map(|i| normalize(i, p.mass, Quantity::SpecificCurrent)),
        area_current: current.map(|i| normalize(i, p.area, Quantity::AreaCurrent)),
        c_rate: current.map(|i| c_rate(p.mass, p.capacity, i)),
    }
}
