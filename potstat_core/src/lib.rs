#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::missing_errors_doc,
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
//! Cycle statistics for galvanostatic battery tests (I/O-free).
//!
//! This crate turns the per-sample and per-cycle tables written by an
//! upstream cycler-data converter into intensive, per-cycle statistics.
//!
//! ## Pipeline
//!
//! - **Segmentation**: validate and renumber the converter tables (`segment`)
//! - **Selection**: resolve cycle/time/point selections into windows (`range`)
//! - **Normalization**: extensive → intensive units (`units`, `electrode`)
//! - **Aggregation**: half/full cell tables in export column order (`battery`)
//! - **Profiles**: one voltage curve per half-cycle (`profile`)
//!
//! `runner::reduce` chains all of them. Loading and writing files is left to
//! the caller; `conversions` maps `potstat_config` rows into core types.
//!
//! ## Units
//!
//! Raw quantities are SI-ish instrument units (A, As, VAs, s). Electrode
//! properties are mg, mAh/g, cm² and µL; a property of 0 means unknown and
//! every column that depends on it is 0.

pub mod battery;
pub mod conversions;
pub mod electrode;
pub mod error;
pub mod model;
pub mod profile;
pub mod range;
pub mod runner;
pub mod segment;
pub mod units;

pub use battery::{BatteryAggregator, BatteryReport, DataRow, StatisticsRow};
pub use electrode::{CycleStatistics, ElectrodeStatistics, SampleSeries};
pub use error::{InvariantError, ReduceError, SelectionError, StructureError};
pub use model::{
    Direction, Electrode, ElectrodeProperties, FullCycleRecord, HalfCycleRecord, Pair, RawSample,
};
pub use profile::{ProfileBlock, group_half_cycles};
pub use range::{Selection, Windows, resolve};
pub use runner::{Reduction, reduce};
pub use segment::{CycleTables, SourceFullCycle, SourceHalfCycle, SourceTables, segment};
