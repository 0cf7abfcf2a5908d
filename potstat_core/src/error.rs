use thiserror::Error;

/// Fatal input errors: the operator must re-run with corrected arguments.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SelectionError {
    #[error("selection {0:?} not recognised (expected \"N\" or \"A,B\")")]
    Malformed(String),
    #[error("selection bound {0:?} is not a number")]
    NotANumber(String),
    #[error("selection bound {0} is negative")]
    Negative(f64),
    #[error("selection range is inverted: {lo} > {hi}")]
    Inverted { lo: f64, hi: f64 },
}

/// Fatal structural errors in the converter tables.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StructureError {
    #[error("sample table is empty")]
    Empty,
    #[error("rest cycles not supported (half-cycle {half_cycle} has step index 0)")]
    RestStep { half_cycle: u32 },
    #[error("half-cycles {prev} and {next} have the same direction")]
    NonAlternating { prev: u32, next: u32 },
    #[error("half-cycle windows are not contiguous at half-cycle {half_cycle}")]
    Discontiguous { half_cycle: u32 },
    #[error("half-cycle windows cover {covered} rows but the sample table has {rows}")]
    Coverage { covered: usize, rows: usize },
    #[error("data points are not strictly increasing at row {row}")]
    PointOrder { row: usize },
    #[error("{table} indices must start at 0, got {first}; tables already renumbered?")]
    NotZeroBased { table: &'static str, first: u32 },
    #[error("{table} index {index} out of sequence")]
    IndexSequence { table: &'static str, index: u32 },
    #[error("full cycle {full_cycle} does not align with half-cycle boundaries")]
    Misaligned { full_cycle: u32 },
    #[error("full cycle {full_cycle} owns {count} half-cycles (expected 1 or 2)")]
    HalfCycleCount { full_cycle: u32, count: usize },
}

/// Conditions that upstream validation should have made impossible.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InvariantError {
    #[error("rest step reached profile grouping at half-cycle {half_cycle}")]
    RestInProfile { half_cycle: u32 },
    #[error("series lengths differ: capacity {capacity}, voltage {voltage}, dQ/dV {dqdv}")]
    SeriesLength {
        capacity: usize,
        voltage: usize,
        dqdv: usize,
    },
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ReduceError {
    #[error("invalid selection: {0}")]
    Selection(#[from] SelectionError),
    #[error("invalid cycle data: {0}")]
    Structure(#[from] StructureError),
    #[error("internal invariant violated: {0}")]
    Invariant(#[from] InvariantError),
}

pub type Result<T> = eyre::Result<T>;
pub use eyre::Report;
