//! Layout detection for stacked station sheets
//!
//! Station exports put one row per station-year-period and a block of value
//! columns: either 12 months (the column after the year holds the day of the
//! month) or 31 days (the column after the year holds the month).

use std::fmt;
use std::ops::Range;

use super::raw_sheet::Cell;

pub const MONTH_BLOCK_WIDTH: usize = 12;
pub const DAY_BLOCK_WIDTH: usize = 31;

/// Where the value columns of a sheet are, if anywhere
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueBlock {
    NotFound,
    /// Twelve columns, one per month
    MonthBlock(Range<usize>),
    /// Thirty-one columns, one per day of the month
    DayBlock(Range<usize>),
}

impl ValueBlock {
    pub fn columns(&self) -> Option<Range<usize>> {
        match self {
            ValueBlock::NotFound => None,
            ValueBlock::MonthBlock(range) | ValueBlock::DayBlock(range) => Some(range.clone()),
        }
    }

    pub fn is_found(&self) -> bool {
        !matches!(self, ValueBlock::NotFound)
    }

    /// Calendar (month, day) for a record given the sub-period column value
    /// and the 1-based position of the value column inside the block
    pub fn month_day(&self, period: i32, position: u32) -> Option<(u32, u32)> {
        let period = u32::try_from(period).ok()?;
        match self {
            ValueBlock::NotFound => None,
            ValueBlock::MonthBlock(_) => Some((position, period)),
            ValueBlock::DayBlock(_) => Some((period, position)),
        }
    }
}

impl fmt::Display for ValueBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueBlock::NotFound => write!(f, "no value block"),
            ValueBlock::MonthBlock(r) => write!(f, "month block (columns {}..{})", r.start, r.end),
            ValueBlock::DayBlock(r) => write!(f, "day block (columns {}..{})", r.start, r.end),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BlockKind {
    Month,
    Day,
}

impl BlockKind {
    fn width(self) -> usize {
        match self {
            BlockKind::Month => MONTH_BLOCK_WIDTH,
            BlockKind::Day => DAY_BLOCK_WIDTH,
        }
    }

    /// Which block, if any, a header closes
    fn closed_by(header: &Cell) -> Option<Self> {
        match header {
            Cell::Text(name) => {
                if name.to_lowercase().contains("de") || name.contains("12") {
                    Some(BlockKind::Month)
                } else if name.contains("31") {
                    Some(BlockKind::Day)
                } else {
                    None
                }
            }
            Cell::Number(n) if *n == 12.0 => Some(BlockKind::Month),
            Cell::Number(n) if *n == 31.0 => Some(BlockKind::Day),
            _ => None,
        }
    }
}

/// Scan headers right to left for the last column of a month or day block
///
/// A month block ends at a header containing "12" or "de" (as in "Dec",
/// "December", "Dez") or the number 12; a day block ends at "31" or the
/// number 31. The block spans that column and the 11 (or 30) before it.
/// Candidates without enough columns to their left are skipped.
pub fn detect_value_block(headers: &[Cell]) -> ValueBlock {
    for (idx, header) in headers.iter().enumerate().rev() {
        let Some(kind) = BlockKind::closed_by(header) else {
            continue;
        };
        let end = idx + 1;
        let Some(start) = end.checked_sub(kind.width()) else {
            continue;
        };
        return match kind {
            BlockKind::Month => ValueBlock::MonthBlock(start..end),
            BlockKind::Day => ValueBlock::DayBlock(start..end),
        };
    }
    ValueBlock::NotFound
}

/// First column whose header contains a "y" (case-insensitive)
pub fn find_year_column(headers: &[Cell]) -> Option<usize> {
    headers.iter().position(|header| match header {
        Cell::Text(name) => name.to_lowercase().contains('y'),
        _ => false,
    })
}
