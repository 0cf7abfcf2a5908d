//! Records shared by every stage of the reduction.

use std::ops::Range;

/// Which electrode a series or statistic belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Electrode {
    Working,
    Counter,
}

impl Electrode {
    /// Short label used in column headers ("WE" / "CE").
    pub fn label(self) -> &'static str {
        match self {
            Electrode::Working => "WE",
            Electrode::Counter => "CE",
        }
    }
}

/// Direction of a half-cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Charge,
    Discharge,
}

impl Direction {
    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Charge => "charge",
            Direction::Discharge => "discharge",
        }
    }
}

/// A value measured separately on the charge and the discharge leg.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Pair {
    pub charge: f64,
    pub discharge: f64,
}

impl Pair {
    pub const ZERO: Self = Self {
        charge: 0.0,
        discharge: 0.0,
    };

    pub fn new(charge: f64, discharge: f64) -> Self {
        Self { charge, discharge }
    }

    pub fn get(self, dir: Direction) -> f64 {
        match dir {
            Direction::Charge => self.charge,
            Direction::Discharge => self.discharge,
        }
    }

    /// Apply `f` to both legs.
    #[must_use]
    pub fn map(self, mut f: impl FnMut(f64) -> f64) -> Self {
        Self {
            charge: f(self.charge),
            discharge: f(self.discharge),
        }
    }

    /// Combine leg-wise with another pair.
    #[must_use]
    pub fn zip_with(self, other: Self, mut f: impl FnMut(f64, f64) -> f64) -> Self {
        Self {
            charge: f(self.charge, other.charge),
            discharge: f(self.discharge, other.discharge),
        }
    }
}

/// One measurement tick.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RawSample {
    /// data point index from the source
    pub point: u64,
    /// full cycle (0-based at the source, 1-based after segmentation)
    pub full_cycle: u32,
    /// > 0 charge, < 0 discharge, 0 rest
    pub step: i32,
    /// [s]
    pub test_time: f64,
    /// [s], resets at each step
    pub step_time: f64,
    /// [s since epoch]
    pub timestamp: f64,
    /// [A]
    pub current: f64,
    /// working electrode potential [V]
    pub voltage: f64,
    /// counter electrode potential [V], all zero in a half cell
    pub voltage2: f64,
    /// [As]
    pub capacity: f64,
    /// working electrode energy [VAs]
    pub energy: f64,
    /// counter electrode energy [VAs]
    pub energy2: f64,
    /// [As/V]
    pub dqdv: f64,
    /// [As/V]
    pub dqdv2: f64,
    /// temperature or counter potential, instrument dependent
    pub aux: f64,
}

/// One charge or discharge leg.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HalfCycleRecord {
    pub index: u32,
    /// first row (inclusive)
    pub start: usize,
    /// one past the last row
    pub end: usize,
    pub step: i32,
    /// parent full cycle
    pub full_cycle: u32,
}

impl HalfCycleRecord {
    pub fn rows(&self) -> Range<usize> {
        self.start..self.end
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.end == self.start
    }
}

/// Aggregates of one full cycle in extensive units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FullCycleRecord {
    pub index: u32,
    pub start: usize,
    pub end: usize,
    /// [s]
    pub time: Pair,
    /// [As], never negative
    pub capacity: Pair,
    /// [VAs], never negative
    pub energy: Pair,
    /// [V]
    pub voltage: Pair,
    /// |Vc - Vd| [V]
    pub hysteresis: f64,
    /// Qd / Qc
    pub efficiency: f64,
}

impl FullCycleRecord {
    pub fn rows(&self) -> Range<usize> {
        self.start..self.end
    }
}

/// Physical properties of one electrode; 0 means "not supplied".
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ElectrodeProperties {
    /// [mg]
    pub mass: f64,
    /// theoretical capacity [mAh/g]
    pub capacity: f64,
    /// [cm²]
    pub area: f64,
    /// [µL]
    pub volume: f64,
}

impl ElectrodeProperties {
    /// Mass loading [mg/cm²]; 0 when the area is unknown.
    pub fn loading(&self) -> f64 {
        if self.area == 0.0 {
            0.0
        } else {
            self.mass / self.area
        }
    }
}
