/// Per-station daily series of one meteorological element
///
/// Rows are a contiguous run of calendar days starting at `start`, columns are
/// stations. A cell is `None` when the station has no measurement for that day.
/// Tables produced by the loader always cover whole calendar years
/// (Jan 1 of the first observed year through Dec 31 of the last).
use chrono::{Datelike, Days, NaiveDate};
use std::collections::HashSet;

use super::error::TableError;

#[derive(Debug, Clone, PartialEq)]
pub struct StationSeriesTable {
    element: String,
    start: NaiveDate,
    len: usize,
    stations: Vec<String>,
    columns: Vec<Vec<Option<f64>>>,
}

impl StationSeriesTable {
    /// Create an all-missing table covering `start..=end` (inclusive)
    pub fn new(
        element: impl Into<String>,
        start: NaiveDate,
        end: NaiveDate,
        stations: Vec<String>,
    ) -> Result<Self, TableError> {
        if end < start {
            return Err(TableError::InvertedRange { start, end });
        }
        ensure_unique(&stations)?;

        let len = (end - start).num_days() as usize + 1;
        let columns = vec![vec![None; len]; stations.len()];

        Ok(Self {
            element: element.into(),
            start,
            len,
            stations,
            columns,
        })
    }

    /// Build a table from named columns that all start at `start`
    ///
    /// Every column must have the same length; station names must be unique.
    pub fn from_columns(
        element: impl Into<String>,
        start: NaiveDate,
        columns: Vec<(String, Vec<Option<f64>>)>,
    ) -> Result<Self, TableError> {
        let len = columns.first().map(|(_, values)| values.len()).unwrap_or(0);

        let mut stations = Vec::with_capacity(columns.len());
        let mut values = Vec::with_capacity(columns.len());
        for (station, column) in columns {
            if column.len() != len {
                return Err(TableError::LengthMismatch {
                    station,
                    expected: len,
                    actual: column.len(),
                });
            }
            stations.push(station);
            values.push(column);
        }
        ensure_unique(&stations)?;

        Ok(Self {
            element: element.into(),
            start,
            len,
            stations,
            columns: values,
        })
    }

    /// Name of the measured element (e.g. "Rainfall")
    pub fn element(&self) -> &str {
        &self.element
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    /// Last date of the index, `None` for a table without rows
    pub fn end(&self) -> Option<NaiveDate> {
        self.len
            .checked_sub(1)
            .and_then(|last| self.date_at(last))
    }

    /// Number of days (rows)
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.start.iter_days().take(self.len)
    }

    pub fn date_at(&self, row: usize) -> Option<NaiveDate> {
        if row >= self.len {
            return None;
        }
        self.start.checked_add_days(Days::new(row as u64))
    }

    pub fn date_index(&self, date: NaiveDate) -> Option<usize> {
        let offset = (date - self.start).num_days();
        usize::try_from(offset).ok().filter(|&row| row < self.len)
    }

    pub fn stations(&self) -> &[String] {
        &self.stations
    }

    pub fn station_index(&self, station: &str) -> Option<usize> {
        self.stations.iter().position(|s| s == station)
    }

    pub fn column(&self, station: &str) -> Option<&[Option<f64>]> {
        self.station_index(station)
            .and_then(|idx| self.column_by_index(idx))
    }

    pub fn column_by_index(&self, idx: usize) -> Option<&[Option<f64>]> {
        self.columns.get(idx).map(Vec::as_slice)
    }

    /// Value for a station on a date; `None` if missing or outside the table
    pub fn value(&self, date: NaiveDate, station: &str) -> Option<f64> {
        let row = self.date_index(date)?;
        self.column(station)?.get(row).copied().flatten()
    }

    /// Values of every station on one row, in station order
    pub fn row(&self, row: usize) -> impl Iterator<Item = Option<f64>> + '_ {
        self.columns
            .iter()
            .map(move |column| column.get(row).copied().flatten())
    }

    pub fn missing_count(&self) -> usize {
        self.columns
            .iter()
            .map(|column| column.iter().filter(|v| v.is_none()).count())
            .sum()
    }

    pub fn observed_count(&self) -> usize {
        self.len * self.stations.len() - self.missing_count()
    }

    /// Distinct calendar years covered by the index, ascending
    pub fn years(&self) -> Vec<i32> {
        match self.end() {
            Some(end) => (self.start.year()..=end.year()).collect(),
            None => Vec::new(),
        }
    }

    /// Overwrite a single cell. Out-of-range positions are ignored.
    pub(crate) fn set(&mut self, station: usize, row: usize, value: f64) {
        if let Some(cell) = self
            .columns
            .get_mut(station)
            .and_then(|column| column.get_mut(row))
        {
            *cell = Some(value);
        }
    }
}

fn ensure_unique(stations: &[String]) -> Result<(), TableError> {
    let mut seen = HashSet::with_capacity(stations.len());
    for station in stations {
        if !seen.insert(station.as_str()) {
            return Err(TableError::DuplicateStation(station.clone()));
        }
    }
    Ok(())
}
