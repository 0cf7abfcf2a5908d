//! Validation and renumbering of the converter's cycle tables.
//!
//! The converter already found the cycle boundaries; this pass checks that
//! they describe a well-formed galvanostatic run, renumbers every cycle index
//! from 0-based to 1-based and makes capacities and energies non-negative.
//!
//! `segment` consumes a [`SourceTables`] and returns [`CycleTables`]. There is
//! no way back, and `segment` refuses tables that are not 0-based, so the
//! sign fix and renumbering can never be applied twice.

use crate::error::StructureError;
use crate::model::{Direction, FullCycleRecord, HalfCycleRecord, Pair, RawSample};
use crate::units::ratio;

/// A half-cycle row exactly as delivered by the converter (0-based index).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceHalfCycle {
    pub index: u32,
    pub start: usize,
    pub end: usize,
    pub step: i32,
}

/// A full-cycle row exactly as delivered by the converter (0-based index,
/// discharge quantities possibly negative).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SourceFullCycle {
    pub index: u32,
    pub start: usize,
    pub end: usize,
    pub time: Pair,
    pub capacity: Pair,
    pub energy: Pair,
    pub voltage: Pair,
}

/// Unvalidated converter output.
#[derive(Debug, Clone, Default)]
pub struct SourceTables {
    pub samples: Vec<RawSample>,
    pub full_cycles: Vec<SourceFullCycle>,
    pub half_cycles: Vec<SourceHalfCycle>,
}

impl SourceTables {
    /// Read the counter-electrode potential from the auxiliary channel.
    ///
    /// Biologic instruments record the counter electrode there instead of in
    /// `voltage2`. The aux channel is cleared since it no longer holds a
    /// temperature. Full-cell detection and the counter voltage series both
    /// follow from the moved values.
    #[must_use]
    pub fn with_aux_counter_potential(mut self) -> Self {
        for s in &mut self.samples {
            s.voltage2 = s.aux;
            s.aux = 0.0;
        }
        self
    }
}

/// Validated, 1-based, sign-corrected tables. Only `segment` builds these.
#[derive(Debug, Clone)]
pub struct CycleTables {
    samples: Vec<RawSample>,
    half_cycles: Vec<HalfCycleRecord>,
    full_cycles: Vec<FullCycleRecord>,
}

impl CycleTables {
    pub fn samples(&self) -> &[RawSample] {
        &self.samples
    }

    pub fn half_cycles(&self) -> &[HalfCycleRecord] {
        &self.half_cycles
    }

    pub fn full_cycles(&self) -> &[FullCycleRecord] {
        &self.full_cycles
    }

    /// Full cycle by 1-based index.
    pub fn full_cycle(&self, index: u32) -> Option<&FullCycleRecord> {
        index
            .checked_sub(1)
            .and_then(|i| self.full_cycles.get(i as usize))
    }

    /// Half-cycle by 1-based index.
    pub fn half_cycle(&self, index: u32) -> Option<&HalfCycleRecord> {
        index
            .checked_sub(1)
            .and_then(|i| self.half_cycles.get(i as usize))
    }
}

/// Direction of a step index; `None` for rest.
#[inline]
pub fn classify_step(step: i32) -> Option<Direction> {
    match step.signum() {
        1 => Some(Direction::Charge),
        -1 => Some(Direction::Discharge),
        _ => None,
    }
}

/// Validate, renumber and sign-correct the converter tables.
pub fn segment(source: SourceTables) -> Result<CycleTables, StructureError> {
    let SourceTables {
        samples,
        full_cycles,
        half_cycles,
    } = source;

    if samples.is_empty() {
        return Err(StructureError::Empty);
    }
    check_zero_based("half-cycle", half_cycles.iter().map(|h| h.index))?;
    check_zero_based("full-cycle", full_cycles.iter().map(|f| f.index))?;
    check_points(&samples)?;
    check_half_cycles(&half_cycles, samples.len())?;
    let owners = assign_half_cycles(&full_cycles, &half_cycles, samples.len())?;

    let samples = fix_sample_signs(renumber_samples(samples));
    let half_cycles = renumber_half_cycles(&half_cycles, &owners);
    let full_cycles = fix_discharge_sign(&full_cycles, &half_cycles);

    tracing::debug!(
        samples = samples.len(),
        half_cycles = half_cycles.len(),
        full_cycles = full_cycles.len(),
        "segmented run"
    );
    Ok(CycleTables {
        samples,
        half_cycles,
        full_cycles,
    })
}

fn check_zero_based(
    table: &'static str,
    mut indices: impl Iterator<Item = u32>,
) -> Result<(), StructureError> {
    let Some(first) = indices.next() else {
        return Ok(());
    };
    if first != 0 {
        return Err(StructureError::NotZeroBased { table, first });
    }
    let mut prev = first;
    for index in indices {
        if index != prev + 1 {
            return Err(StructureError::IndexSequence { table, index });
        }
        prev = index;
    }
    Ok(())
}

fn check_points(samples: &[RawSample]) -> Result<(), StructureError> {
    match samples.windows(2).position(|w| w[1].point <= w[0].point) {
        Some(i) => Err(StructureError::PointOrder { row: i + 1 }),
        None => Ok(()),
    }
}

fn check_half_cycles(halves: &[SourceHalfCycle], rows: usize) -> Result<(), StructureError> {
    let mut expected_start = 0usize;
    let mut prev: Option<(u32, Direction)> = None;
    for h in halves {
        let index = h.index + 1;
        if h.start != expected_start || h.end <= h.start {
            return Err(StructureError::Discontiguous { half_cycle: index });
        }
        let dir = classify_step(h.step).ok_or(StructureError::RestStep { half_cycle: index })?;
        if let Some((prev_index, prev_dir)) = prev
            && prev_dir == dir
        {
            return Err(StructureError::NonAlternating {
                prev: prev_index,
                next: index,
            });
        }
        prev = Some((index, dir));
        expected_start = h.end;
    }
    if expected_start != rows {
        return Err(StructureError::Coverage {
            covered: expected_start,
            rows,
        });
    }
    Ok(())
}

/// For every half-cycle, the position of the full cycle that owns it.
fn assign_half_cycles(
    fulls: &[SourceFullCycle],
    halves: &[SourceHalfCycle],
    rows: usize,
) -> Result<Vec<usize>, StructureError> {
    let mut owners = Vec::with_capacity(halves.len());
    let mut h = 0usize;
    let mut expected_start = 0usize;
    for (pos, f) in fulls.iter().enumerate() {
        let full_cycle = f.index + 1;
        if f.start != expected_start || f.end <= f.start {
            return Err(StructureError::Misaligned { full_cycle });
        }
        let first = h;
        while h < halves.len() && halves[h].end <= f.end {
            owners.push(pos);
            h += 1;
        }
        let count = h - first;
        if count == 0 || count > 2 {
            return Err(StructureError::HalfCycleCount { full_cycle, count });
        }
        if halves[first].start != f.start || halves[h - 1].end != f.end {
            return Err(StructureError::Misaligned { full_cycle });
        }
        expected_start = f.end;
    }
    if h != halves.len() || expected_start != rows {
        let full_cycle = fulls.last().map_or(0, |f| f.index + 1);
        return Err(StructureError::Misaligned { full_cycle });
    }
    Ok(owners)
}

/// 0-based → 1-based full-cycle column.
fn renumber_samples(mut samples: Vec<RawSample>) -> Vec<RawSample> {
    for s in &mut samples {
        s.full_cycle += 1;
    }
    samples
}

fn fix_sample_signs(mut samples: Vec<RawSample>) -> Vec<RawSample> {
    for s in &mut samples {
        s.capacity = s.capacity.abs();
        s.energy = s.energy.abs();
        s.energy2 = s.energy2.abs();
    }
    samples
}

fn renumber_half_cycles(halves: &[SourceHalfCycle], owners: &[usize]) -> Vec<HalfCycleRecord> {
    halves
        .iter()
        .zip(owners)
        .map(|(h, &owner)| HalfCycleRecord {
            index: h.index + 1,
            start: h.start,
            end: h.end,
            step: h.step,
            full_cycle: u32::try_from(owner + 1).unwrap_or(u32::MAX),
        })
        .collect()
}

/// Renumber full cycles, take magnitudes, zero the aggregates of a missing
/// half-cycle and recompute efficiency and hysteresis.
fn fix_discharge_sign(
    fulls: &[SourceFullCycle],
    halves: &[HalfCycleRecord],
) -> Vec<FullCycleRecord> {
    fulls
        .iter()
        .map(|f| {
            let index = f.index + 1;
            let mut has = Pair::ZERO;
            for h in owned_half_cycles(halves, index) {
                match classify_step(h.step) {
                    Some(Direction::Charge) => has.charge = 1.0,
                    Some(Direction::Discharge) => has.discharge = 1.0,
                    None => {}
                }
            }
            let mask = |p: Pair| p.zip_with(has, |v, present| if present > 0.0 { v } else { 0.0 });
            let time = mask(f.time);
            let capacity = mask(f.capacity.map(f64::abs));
            let energy = mask(f.energy.map(f64::abs));
            let voltage = mask(f.voltage);
            let complete = has.charge > 0.0 && has.discharge > 0.0;
            if !complete {
                tracing::warn!(full_cycle = index, "incomplete cycle; missing half zero-filled");
            }
            FullCycleRecord {
                index,
                start: f.start,
                end: f.end,
                time,
                capacity,
                energy,
                voltage,
                hysteresis: if complete {
                    (voltage.charge - voltage.discharge).abs()
                } else {
                    0.0
                },
                efficiency: ratio(capacity.discharge, capacity.charge),
            }
        })
        .collect()
}

/// Half-cycles owned by one full cycle; `halves` is ordered by owner.
pub(crate) fn owned_half_cycles(halves: &[HalfCycleRecord], full_cycle: u32) -> &[HalfCycleRecord] {
    let a = halves.partition_point(|h| h.full_cycle < full_cycle);
    let b = halves.partition_point(|h| h.full_cycle <= full_cycle);
    &halves[a..b]
}
