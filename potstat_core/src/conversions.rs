//! `From` implementations bridging `potstat_config` types to `potstat_core` types.

use crate::model::{Electrode, ElectrodeProperties, Pair, RawSample};
use crate::segment::{SourceFullCycle, SourceHalfCycle, SourceTables};

// ── samples ──────────────────────────────────────────────────────────────────

impl From<&potstat_config::SampleRow> for RawSample {
    fn from(r: &potstat_config::SampleRow) -> Self {
        Self {
            point: r.data_point,
            full_cycle: r.full_cycle,
            step: r.step_index,
            test_time: r.test_time,
            step_time: r.step_time,
            timestamp: r.date_time,
            current: r.current,
            voltage: r.voltage,
            voltage2: r.voltage2,
            capacity: r.capacity,
            energy: r.energy,
            energy2: r.energy2,
            dqdv: r.dqdv,
            dqdv2: r.dqdv2,
            aux: r.aux_channel,
        }
    }
}

// ── cycle tables ─────────────────────────────────────────────────────────────

impl From<&potstat_config::FullCycleRow> for SourceFullCycle {
    fn from(r: &potstat_config::FullCycleRow) -> Self {
        Self {
            index: r.full_cycle,
            start: r.cycle_start,
            end: r.cycle_end,
            time: Pair::new(r.charge_time, r.discharge_time),
            capacity: Pair::new(r.charge_capacity, r.discharge_capacity),
            energy: Pair::new(r.charge_energy, r.discharge_energy),
            voltage: Pair::new(r.charge_voltage, r.discharge_voltage),
        }
    }
}

impl From<&potstat_config::HalfCycleRow> for SourceHalfCycle {
    fn from(r: &potstat_config::HalfCycleRow) -> Self {
        Self {
            index: r.half_cycle,
            start: r.cycle_start,
            end: r.cycle_end,
            step: r.step_index,
        }
    }
}

impl From<&potstat_config::RunTables> for SourceTables {
    fn from(t: &potstat_config::RunTables) -> Self {
        Self {
            samples: t.samples.iter().map(RawSample::from).collect(),
            full_cycles: t.full_cycles.iter().map(SourceFullCycle::from).collect(),
            half_cycles: t.half_cycles.iter().map(SourceHalfCycle::from).collect(),
        }
    }
}

// ── electrodes ───────────────────────────────────────────────────────────────

impl From<&potstat_config::ElectrodeCfg> for ElectrodeProperties {
    fn from(c: &potstat_config::ElectrodeCfg) -> Self {
        Self {
            mass: c.mass_mg,
            capacity: c.capacity_mah_g,
            area: c.area_cm2,
            volume: c.volume_ul,
        }
    }
}

impl From<potstat_config::ElectrodeKey> for Electrode {
    fn from(k: potstat_config::ElectrodeKey) -> Self {
        match k {
            potstat_config::ElectrodeKey::Working => Electrode::Working,
            potstat_config::ElectrodeKey::Counter => Electrode::Counter,
        }
    }
}

impl From<Electrode> for potstat_config::ElectrodeKey {
    fn from(e: Electrode) -> Self {
        match e {
            Electrode::Working => potstat_config::ElectrodeKey::Working,
            Electrode::Counter => potstat_config::ElectrodeKey::Counter,
        }
    }
}
