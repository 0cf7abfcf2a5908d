//! Operator selections and their resolution into index windows.
//!
//! The three tables are indexed differently: samples by row, half-cycles and
//! full cycles by their 1-based index. A resolved [`Windows`] always nests:
//! every selected row lies in a selected half-cycle, and every selected
//! half-cycle lies in a selected full cycle.

use std::ops::{Range, RangeInclusive};

use crate::error::SelectionError;
use crate::model::{FullCycleRecord, HalfCycleRecord};
use crate::segment::CycleTables;

/// Seconds per hour; time selections are given in hours.
const SECS_PER_HOUR: f64 = 3600.0;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Selection {
    #[default]
    All,
    /// 1-based full cycles, inclusive
    Cycles { lo: u32, hi: u32 },
    /// test time in seconds, inclusive
    Time { lo: f64, hi: f64 },
    /// values of the sample `point` column, inclusive
    Points { lo: u64, hi: u64 },
}

impl Selection {
    /// `"N"` selects cycles `1..=N`, `"A,B"` selects `A..=B`.
    pub fn parse_cycles(text: &str) -> Result<Self, SelectionError> {
        let (lo, hi) = parse_bounds(text, 1.0, true)?;
        Ok(Self::Cycles {
            lo: lo as u32,
            hi: hi as u32,
        })
    }

    /// Hours: `"N"` selects `0..=N` h, `"A,B"` selects `A..=B` h.
    pub fn parse_time_hours(text: &str) -> Result<Self, SelectionError> {
        let (lo, hi) = parse_bounds(text, 0.0, false)?;
        Ok(Self::Time {
            lo: lo * SECS_PER_HOUR,
            hi: hi * SECS_PER_HOUR,
        })
    }

    /// `"N"` selects point indices `1..=N`, `"A,B"` selects `A..=B`.
    pub fn parse_points(text: &str) -> Result<Self, SelectionError> {
        let (lo, hi) = parse_bounds(text, 1.0, true)?;
        Ok(Self::Points {
            lo: lo as u64,
            hi: hi as u64,
        })
    }
}

fn parse_bound(token: &str, integer: bool) -> Result<f64, SelectionError> {
    let t = token.trim();
    let v: f64 = t
        .parse()
        .map_err(|_| SelectionError::NotANumber(t.to_string()))?;
    if !v.is_finite() || (integer && v.fract() != 0.0) {
        return Err(SelectionError::NotANumber(t.to_string()));
    }
    if v < 0.0 {
        return Err(SelectionError::Negative(v));
    }
    Ok(v)
}

fn parse_bounds(text: &str, implicit_lo: f64, integer: bool) -> Result<(f64, f64), SelectionError> {
    let parts: Vec<&str> = text.split(',').collect();
    let (lo, hi) = match parts.as_slice() {
        [n] => (implicit_lo, parse_bound(n, integer)?),
        [a, b] => (parse_bound(a, integer)?, parse_bound(b, integer)?),
        _ => return Err(SelectionError::Malformed(text.to_string())),
    };
    if lo > hi {
        return Err(SelectionError::Inverted { lo, hi });
    }
    Ok((lo, hi))
}

/// Consistent index windows over the three tables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Windows {
    /// sample rows, half-open
    pub points: Range<usize>,
    /// 1-based half-cycle indices
    pub half_cycles: RangeInclusive<u32>,
    /// 1-based full-cycle indices
    pub full_cycles: RangeInclusive<u32>,
}

impl Windows {
    pub fn half_slice<'a>(&self, tables: &'a CycleTables) -> &'a [HalfCycleRecord] {
        let lo = *self.half_cycles.start() as usize - 1;
        let hi = *self.half_cycles.end() as usize;
        &tables.half_cycles()[lo..hi]
    }

    pub fn full_slice<'a>(&self, tables: &'a CycleTables) -> &'a [FullCycleRecord] {
        let lo = *self.full_cycles.start() as usize - 1;
        let hi = *self.full_cycles.end() as usize;
        &tables.full_cycles()[lo..hi]
    }
}

/// Resolve a selection against segmented tables. Out-of-range bounds are
/// clamped to the first/last record.
pub fn resolve(tables: &CycleTables, selection: &Selection) -> Windows {
    let rows = tables.samples().len();
    let windows = match *selection {
        Selection::All => Windows {
            points: 0..rows,
            half_cycles: 1..=count(tables.half_cycles().len()),
            full_cycles: 1..=count(tables.full_cycles().len()),
        },
        Selection::Cycles { lo, hi } => by_cycles(tables, lo, hi),
        Selection::Time { lo, hi } => {
            let s = tables.samples();
            let a = s.partition_point(|x| x.test_time < lo);
            let b = s.partition_point(|x| x.test_time <= hi);
            by_rows(tables, a, b)
        }
        Selection::Points { lo, hi } => {
            let s = tables.samples();
            let a = s.partition_point(|x| x.point < lo);
            let b = s.partition_point(|x| x.point <= hi);
            by_rows(tables, a, b)
        }
    };
    tracing::debug!(
        ?selection,
        points = ?windows.points,
        half_cycles = ?windows.half_cycles,
        full_cycles = ?windows.full_cycles,
        "resolved selection"
    );
    windows
}

#[inline]
fn count(n: usize) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}

fn by_cycles(tables: &CycleTables, lo: u32, hi: u32) -> Windows {
    let n_full = count(tables.full_cycles().len());
    let lo = lo.clamp(1, n_full);
    let hi = hi.clamp(1, n_full).max(lo);
    let halves = tables.half_cycles();
    // every full cycle owns at least one half-cycle, so neither search comes up empty
    let first = halves.partition_point(|h| h.full_cycle < lo);
    let last = halves.partition_point(|h| h.full_cycle <= hi) - 1;
    Windows {
        points: halves[first].start..halves[last].end,
        half_cycles: halves[first].index..=halves[last].index,
        full_cycles: lo..=hi,
    }
}

/// Windows for the sample rows `a..b`, clamped to the table and never empty.
fn by_rows(tables: &CycleTables, a: usize, b: usize) -> Windows {
    let rows = tables.samples().len();
    let a = a.min(rows - 1);
    let b = b.clamp(a + 1, rows);
    let halves = tables.half_cycles();
    let last_half = halves.len() - 1;
    let first = halves.partition_point(|h| h.end <= a).min(last_half);
    let last = halves.partition_point(|h| h.end < b).min(last_half);
    Windows {
        points: a..b,
        half_cycles: halves[first].index..=halves[last].index,
        full_cycles: halves[first].full_cycle..=halves[last].full_cycle,
    }
}

#[cfg(test)]
mod parse_tests {
    use super::*;

    #[test]
    fn bare_number_is_open_start() {
        assert_eq!(
            Selection::parse_cycles("3"),
            Ok(Selection::Cycles { lo: 1, hi: 3 })
        );
        assert_eq!(
            Selection::parse_time_hours("2"),
            Ok(Selection::Time {
                lo: 0.0,
                hi: 7200.0
            })
        );
        assert_eq!(
            Selection::parse_points("100"),
            Ok(Selection::Points { lo: 1, hi: 100 })
        );
    }

    #[test]
    fn comma_pair_is_literal() {
        assert_eq!(
            Selection::parse_cycles("2, 5"),
            Ok(Selection::Cycles { lo: 2, hi: 5 })
        );
        assert_eq!(
            Selection::parse_time_hours("0.5,1.5"),
            Ok(Selection::Time {
                lo: 1800.0,
                hi: 5400.0
            })
        );
    }

    #[test]
    fn rejects_bad_text() {
        assert!(matches!(
            Selection::parse_cycles("1,2,3"),
            Err(SelectionError::Malformed(_))
        ));
        assert!(matches!(
            Selection::parse_cycles("abc"),
            Err(SelectionError::NotANumber(_))
        ));
        assert!(matches!(
            Selection::parse_cycles("1.5"),
            Err(SelectionError::NotANumber(_))
        ));
        assert!(matches!(
            Selection::parse_points("-4,2"),
            Err(SelectionError::Negative(_))
        ));
        assert!(matches!(
            Selection::parse_cycles("5,2"),
            Err(SelectionError::Inverted { .. })
        ));
        // "0" means 1..=0 for cycles
        assert!(matches!(
            Selection::parse_cycles("0"),
            Err(SelectionError::Inverted { .. })
        ));
        assert!(matches!(
            Selection::parse_time_hours("inf"),
            Err(SelectionError::NotANumber(_))
        ));
    }
}
