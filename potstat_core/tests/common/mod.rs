#![allow(dead_code)]

use potstat_core::{Pair, RawSample, SourceFullCycle, SourceHalfCycle, SourceTables};

pub const ROWS_PER_HALF: usize = 4;
pub const SECS_PER_ROW: f64 = 100.0;

/// Converter output for `cycles` identical cycles: charge 10 As, discharge
/// 9 As (reported negative), 4 rows per half-cycle, 100 s per row.
pub fn run(cycles: u32, full_cell: bool) -> SourceTables {
    let mut samples = Vec::new();
    let mut half_cycles = Vec::new();
    let mut full_cycles = Vec::new();
    for c in 0..cycles {
        let cycle_start = samples.len();
        for (leg, (step, q_end, v0)) in [(1, 10.0, 3.0), (-1, -9.0, 4.0)].into_iter().enumerate() {
            let start = samples.len();
            for k in 0..ROWS_PER_HALF {
                let frac = (k + 1) as f64 / ROWS_PER_HALF as f64;
                let row = samples.len();
                let v = if step > 0 { v0 + frac } else { v0 - frac };
                samples.push(RawSample {
                    point: row as u64 + 1,
                    full_cycle: c,
                    step,
                    test_time: row as f64 * SECS_PER_ROW,
                    step_time: k as f64 * SECS_PER_ROW,
                    timestamp: 1_700_000_000.0 + row as f64 * SECS_PER_ROW,
                    current: if step > 0 { 0.025 } else { -0.0225 },
                    voltage: v,
                    voltage2: if full_cell { 3.3 } else { 0.0 },
                    capacity: q_end * frac,
                    energy: q_end * frac * 3.5,
                    energy2: if full_cell { q_end * frac * 3.3 } else { 0.0 },
                    dqdv: 1.0,
                    dqdv2: if full_cell { 2.0 } else { 0.0 },
                    aux: 25.0,
                });
            }
            half_cycles.push(SourceHalfCycle {
                index: 2 * c + leg as u32,
                start,
                end: samples.len(),
                step,
            });
        }
        full_cycles.push(SourceFullCycle {
            index: c,
            start: cycle_start,
            end: samples.len(),
            time: Pair::new(400.0, 400.0),
            capacity: Pair::new(10.0, -9.0),
            energy: Pair::new(35.0, -31.5),
            voltage: Pair::new(3.5, 3.5 - 0.1),
        });
    }
    SourceTables {
        samples,
        full_cycles,
        half_cycles,
    }
}

pub fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9 * b.abs().max(1.0)
}
