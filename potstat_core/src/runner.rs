use crate::battery::{BatteryAggregator, BatteryReport};
use crate::error::{ReduceError, Result as CoreResult};
use crate::model::{Electrode, ElectrodeProperties};
use crate::profile::{ProfileBlock, group_half_cycles};
use crate::range::{Selection, Windows, resolve};
use crate::segment::{CycleTables, SourceTables, segment};

/// Everything one run produces.
#[derive(Debug, Clone)]
pub struct Reduction {
    pub tables: CycleTables,
    pub windows: Windows,
    pub report: BatteryReport,
    /// working-electrode charge/discharge curves
    pub profiles: Vec<ProfileBlock>,
}

/// Segment, select, normalize and group one run.
///
/// Electrode properties must be fully resolved; unknown values are 0.
pub fn reduce(
    source: SourceTables,
    selection: &Selection,
    working: &ElectrodeProperties,
    counter: &ElectrodeProperties,
) -> CoreResult<Reduction> {
    tracing::info!(samples = source.samples.len(), ?selection, "reduce start");
    let tables = segment(source).map_err(|e| {
        tracing::error!(error = %e, "reduce aborted");
        ReduceError::from(e)
    })?;
    let windows = resolve(&tables, selection);
    let aggregator = BatteryAggregator::new(&tables);
    let report = aggregator.aggregate(&tables, &windows, working, counter);

    let we = &report.working;
    debug_assert_eq!(we.electrode, Electrode::Working);
    let profiles = group_half_cycles(
        &we.samples.capacity,
        &we.samples.voltage,
        &we.samples.dqdv,
        windows.half_slice(&tables),
        windows.points.start,
        working.mass,
    )
    .map_err(ReduceError::from)?;

    tracing::info!(
        full_cell = report.full_cell,
        rows = report.data.len(),
        cycles = report.statistics.len(),
        profiles = profiles.len(),
        "reduce complete"
    );
    Ok(Reduction {
        tables,
        windows,
        report,
        profiles,
    })
}
