#![no_main]
use libfuzzer_sys::fuzz_target;
use potstat_core::{
    Pair, RawSample, Selection, SourceFullCycle, SourceHalfCycle, SourceTables, resolve, segment,
};

// Two cycles, three rows per leg
fn tables() -> Option<potstat_core::CycleTables> {
    let mut t = SourceTables::default();
    for row in 0..12u32 {
        let step = if (row / 3) % 2 == 0 { 1 } else { -1 };
        t.samples.push(RawSample {
            point: u64::from(row),
            full_cycle: row / 6,
            step,
            test_time: f64::from(row) * 60.0,
            ..RawSample::default()
        });
    }
    for h in 0..4u32 {
        t.half_cycles.push(SourceHalfCycle {
            index: h,
            start: (h * 3) as usize,
            end: (h * 3 + 3) as usize,
            step: if h % 2 == 0 { 1 } else { -1 },
        });
    }
    for c in 0..2u32 {
        t.full_cycles.push(SourceFullCycle {
            index: c,
            start: (c * 6) as usize,
            end: (c * 6 + 6) as usize,
            time: Pair::new(180.0, 180.0),
            capacity: Pair::new(1.0, -0.9),
            energy: Pair::ZERO,
            voltage: Pair::ZERO,
        });
    }
    segment(t).ok()
}

fuzz_target!(|data: &str| {
    let Some(tables) = tables() else {
        return;
    };
    for parsed in [
        Selection::parse_cycles(data),
        Selection::parse_time_hours(data),
        Selection::parse_points(data),
    ] {
        if let Ok(sel) = parsed {
            let w = resolve(&tables, &sel);
            assert!(!w.points.is_empty());
            assert!(w.points.end <= tables.samples().len());
        }
    }
});
