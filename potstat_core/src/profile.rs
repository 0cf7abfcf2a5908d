//! Splitting normalized series into one named block per half-cycle.

use crate::error::InvariantError;
use crate::model::{Direction, HalfCycleRecord};
use crate::segment::classify_step;

/// One charge or discharge curve, ready to be written as a profile file.
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileBlock {
    /// `"{cycle:03}_{charge|discharge}"`
    pub name: String,
    pub cycle: u32,
    pub direction: Direction,
    /// [mg]
    pub mass: f64,
    /// [mAh/g]
    pub capacity: Vec<f64>,
    /// [V]
    pub voltage: Vec<f64>,
    /// [As/V]
    pub dqdv: Vec<f64>,
}

impl ProfileBlock {
    pub fn len(&self) -> usize {
        self.capacity.len()
    }

    pub fn is_empty(&self) -> bool {
        self.capacity.is_empty()
    }
}

/// Group the selected series by half-cycle.
///
/// `offset` is the sample row of the first series element. The last sample
/// of every half-cycle is dropped; half-cycles left empty are skipped.
pub fn group_half_cycles(
    capacity: &[f64],
    voltage: &[f64],
    dqdv: &[f64],
    half_cycles: &[HalfCycleRecord],
    offset: usize,
    mass: f64,
) -> Result<Vec<ProfileBlock>, InvariantError> {
    if capacity.len() != voltage.len() || capacity.len() != dqdv.len() {
        return Err(InvariantError::SeriesLength {
            capacity: capacity.len(),
            voltage: voltage.len(),
            dqdv: dqdv.len(),
        });
    }
    let selected_end = offset + capacity.len();

    let mut blocks = Vec::with_capacity(half_cycles.len());
    for h in half_cycles {
        // labelled by the owning full cycle, as in the statistics table
        let cycle = h.full_cycle;
        let direction = classify_step(h.step).ok_or(InvariantError::RestInProfile {
            half_cycle: h.index,
        })?;

        let lo = h.start.max(offset);
        let hi = h.end.saturating_sub(1).min(selected_end);
        if hi <= lo {
            tracing::trace!(half_cycle = h.index, "empty profile skipped");
            continue;
        }
        let rows = (lo - offset)..(hi - offset);
        blocks.push(ProfileBlock {
            name: format!("{cycle:03}_{}", direction.as_str()),
            cycle,
            direction,
            mass,
            capacity: capacity[rows.clone()].to_vec(),
            voltage: voltage[rows.clone()].to_vec(),
            dqdv: dqdv[rows].to_vec(),
        });
    }
    Ok(blocks)
}
