mod common;

use common::{approx, run};
use potstat_core::battery::{DATA_WIDTH, data_columns, statistics_columns};
use potstat_core::{
    BatteryAggregator, Direction, ElectrodeProperties, Selection, SourceFullCycle, reduce,
    resolve, segment,
};

fn props(mass: f64) -> ElectrodeProperties {
    ElectrodeProperties {
        mass,
        capacity: 372.0,
        area: 1.0,
        volume: 1.0,
    }
}

#[test]
fn half_cell_counter_block_is_zero_filled() {
    let tables = segment(run(3, false)).unwrap();
    let w = resolve(&tables, &Selection::All);
    let agg = BatteryAggregator::new(&tables);
    assert!(!agg.is_full_cell());

    // counter properties are ignored in a half cell
    let report = agg.aggregate(&tables, &w, &props(2.0), &props(5.0));
    assert_eq!(report.data.len(), 24);
    assert_eq!(report.statistics.len(), 3);
    for row in &report.data {
        let v = row.values();
        assert_eq!(v.len(), DATA_WIDTH);
        assert!(v[12..].iter().all(|&x| x == 0.0));
    }
    for row in &report.statistics {
        let v = row.values();
        assert_eq!(v.len(), statistics_columns().len());
        assert!(v[6 + 19..].iter().all(|&x| x == 0.0));
        assert!(approx(row.efficiency, 0.9));
        assert!(approx(row.working.specific_capacity.discharge, 1250.0));
    }
}

#[test]
fn full_cell_is_detected_from_any_counter_voltage() {
    let mut src = run(2, false);
    // a single non-zero reading outside the selection still counts
    src.samples[0].voltage2 = 0.01;
    let tables = segment(src).unwrap();
    let w = resolve(&tables, &Selection::Cycles { lo: 2, hi: 2 });
    let agg = BatteryAggregator::new(&tables);
    assert!(agg.is_full_cell());

    let report = agg.aggregate(&tables, &w, &props(2.0), &props(4.0));
    assert!(report.full_cell);
    assert_eq!(report.statistics.len(), 1);
    assert_eq!(report.statistics[0].cycle, 2);
    assert!(approx(
        report.statistics[0].counter.specific_capacity.discharge,
        625.0
    ));
}

#[test]
fn data_rows_carry_shared_columns_and_temperature() {
    let tables = segment(run(1, true)).unwrap();
    let w = resolve(&tables, &Selection::All);
    let report = BatteryAggregator::new(&tables).aggregate(&tables, &w, &props(2.0), &props(2.0));
    let first = &report.data[0];
    assert_eq!(first.point, 1);
    assert_eq!(first.cycle, 1);
    assert_eq!(first.step, 1);
    assert!(approx(first.temperature, 25.0));
    assert!(approx(first.counter.voltage, 3.3));
    assert_eq!(data_columns()[6], ("temperature".to_string(), "°C"));
}

#[test]
fn reduce_runs_the_whole_pipeline() {
    let r = reduce(
        run(3, false),
        &Selection::Cycles { lo: 2, hi: 3 },
        &props(2.0),
        &ElectrodeProperties::default(),
    )
    .unwrap();

    assert_eq!(r.windows.full_cycles, 2..=3);
    assert_eq!(r.report.statistics.len(), 2);
    let names: Vec<&str> = r.profiles.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(
        names,
        [
            "002_charge",
            "002_discharge",
            "003_charge",
            "003_discharge"
        ]
    );
    // terminal point dropped from every leg
    assert!(r.profiles.iter().all(|p| p.len() == 3));
    assert_eq!(r.profiles[1].direction, Direction::Discharge);
    assert!(approx(r.profiles[0].mass, 2.0));
}

#[test]
fn reduce_reports_structural_errors_as_typed() {
    let mut src = run(2, false);
    src.half_cycles[0].step = 0;
    let err = reduce(
        src,
        &Selection::All,
        &props(2.0),
        &ElectrodeProperties::default(),
    )
    .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<potstat_core::ReduceError>(),
        Some(potstat_core::ReduceError::Structure(_))
    ));
}

#[test]
fn profiles_after_a_lone_half_cycle_keep_their_parent_cycle() {
    // regroup the six legs as [c,d] [c] [d,c] [d]
    let mut src = run(3, false);
    let template = src.full_cycles[0];
    let bounds = [(0, 8), (8, 12), (12, 20), (20, 24)];
    src.full_cycles = bounds
        .iter()
        .enumerate()
        .map(|(i, &(start, end))| SourceFullCycle {
            index: i as u32,
            start,
            end,
            ..template
        })
        .collect();
    for (row, s) in src.samples.iter_mut().enumerate() {
        s.full_cycle = bounds.iter().position(|&(a, b)| (a..b).contains(&row)).unwrap() as u32;
    }

    let r = reduce(
        src,
        &Selection::All,
        &props(2.0),
        &ElectrodeProperties::default(),
    )
    .unwrap();
    let names: Vec<&str> = r.profiles.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(
        names,
        [
            "001_charge",
            "001_discharge",
            "002_charge",
            "003_discharge",
            "003_charge",
            "004_discharge"
        ]
    );
    let cycles: Vec<u32> = r.report.statistics.iter().map(|s| s.cycle).collect();
    assert_eq!(cycles, [1, 2, 3, 4]);
    // the lone charge of cycle 2 has no discharge to pair with
    let second = &r.report.statistics[1];
    assert_eq!(second.working.specific_capacity.discharge, 0.0);
    assert!(approx(second.working.specific_capacity.charge, 1388.8888888888889));
}

#[test]
fn aux_channel_can_carry_the_counter_potential() {
    let mut src = run(2, false);
    for s in &mut src.samples {
        s.aux = 3.2;
    }
    let tables = segment(src.clone()).unwrap();
    assert!(!BatteryAggregator::new(&tables).is_full_cell());

    let tables = segment(src.with_aux_counter_potential()).unwrap();
    let agg = BatteryAggregator::new(&tables);
    assert!(agg.is_full_cell());
    let w = resolve(&tables, &Selection::All);
    let report = agg.aggregate(&tables, &w, &props(2.0), &props(4.0));
    assert!(report.data.iter().all(|d| approx(d.counter.voltage, 3.2)));
    assert!(report.data.iter().all(|d| d.temperature == 0.0));
}
