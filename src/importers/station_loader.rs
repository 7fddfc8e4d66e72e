/// Station file loader
///
/// Turns a stacked station export (CSV or workbook) into a daily
/// `StationSeriesTable` for one element. The sheet layout is guessed from
/// the headers; see `layout` for the detection rules.
use chrono::{Datelike, NaiveDate};
use std::collections::BTreeMap;
use std::ops::RangeInclusive;
use std::path::Path;
use tracing::{debug, error, info, instrument, warn};

use super::layout::{detect_value_block, find_year_column, ValueBlock};
use super::raw_sheet::RawSheet;
use crate::config::LoadOptions;
use crate::load_error::LoadError;
use crate::table::StationSeriesTable;
use crate::utils::{daily_aggregation, DailyAggregation};

/// Sheets wider than this hold several elements side by side
pub const MULTI_ELEMENT_MIN_COLUMNS: usize = 35;

/// Years that form a calendar date; anything else is treated as a typo
pub const VALID_YEARS: RangeInclusive<i32> = 1677..=2262;

/// Series name used when a single-station file comes without one
pub const UNKNOWN_STATION: &str = "UnknownStation";

/// One observation after reshaping the sheet from wide to long
#[derive(Debug, Clone, PartialEq)]
pub struct DailyRecord {
    pub station: Option<String>,
    pub date: NaiveDate,
    pub value: f64,
}

#[derive(Debug, Default, Clone, Copy)]
struct DailyTotal {
    sum: f64,
    count: usize,
}

/// Load one element from a station file into a daily series
///
/// Structural problems (element, station column, value block or year column
/// not found) come back as the matching `LoadError` variant and are logged.
#[instrument(skip(path, options), fields(path = %path.as_ref().display()))]
pub fn data_load(
    path: impl AsRef<Path>,
    element: &str,
    options: &LoadOptions,
) -> Result<StationSeriesTable, LoadError> {
    let sheet = RawSheet::open(path.as_ref(), &options.sheet, options.header_row).map_err(|e| {
        error!("Failed to read station file: {}", e);
        e
    })?;
    load_from_sheet(sheet, element, options)
}

/// Same as [`data_load`] for a sheet that is already in memory
pub fn load_from_sheet(
    sheet: RawSheet,
    element: &str,
    options: &LoadOptions,
) -> Result<StationSeriesTable, LoadError> {
    build_table(sheet, element, options).map_err(|e| {
        error!("Error: {}", e);
        e
    })
}

fn build_table(
    mut sheet: RawSheet,
    element: &str,
    options: &LoadOptions,
) -> Result<StationSeriesTable, LoadError> {
    select_element(&mut sheet, element)?;

    let station_col = match &options.stations_col {
        Some(name) => Some(
            sheet
                .column_index(name)
                .ok_or_else(|| LoadError::StationColumnMissing(name.clone()))?,
        ),
        None => None,
    };

    let block = detect_value_block(sheet.headers());
    if !block.is_found() {
        return Err(LoadError::ValueBlockNotFound);
    }
    debug!("Detected {}", block);

    let year_col = find_year_column(sheet.headers()).ok_or(LoadError::YearColumnMissing)?;
    debug!("Year column at index {}", year_col);

    let records = melt_rows(&sheet, &block, year_col, station_col);
    debug!("Reshaped sheet into {} dated records", records.len());

    let single_name = match station_col {
        Some(_) => None,
        None => Some(options.station_name.clone().unwrap_or_else(|| {
            warn!(
                "Station name unknown; supply one with the station name option. Using {}",
                UNKNOWN_STATION
            );
            UNKNOWN_STATION.to_string()
        })),
    };

    let aggregated = aggregate_daily(records, daily_aggregation(element), single_name.as_deref());
    let table = pivot(aggregated, element)?;

    let years = table.years();
    let (first_year, last_year) = (
        years.first().copied().unwrap_or_default(),
        years.last().copied().unwrap_or_default(),
    );
    let station_info = match table.stations() {
        [only] => format!("for station {only}"),
        stations => format!("for {} stations", stations.len()),
    };
    info!(
        "Data loaded for element {}, years {}-{}, {}.",
        element, first_year, last_year, station_info
    );

    Ok(table)
}

/// Keep only the rows for `element` when the sheet carries several elements
fn select_element(sheet: &mut RawSheet, element: &str) -> Result<(), LoadError> {
    if sheet.width() < MULTI_ELEMENT_MIN_COLUMNS {
        return Ok(());
    }

    let element_col = (0..sheet.width())
        .find(|&col| sheet.rows().iter().any(|row| row[col].is_text(element)))
        .ok_or_else(|| LoadError::ElementNotFound(element.to_string()))?;

    let before = sheet.height();
    sheet.retain_rows(|row| row[element_col].is_text(element));
    debug!(
        "Element column {} kept {} of {} rows for {}",
        element_col,
        sheet.height(),
        before,
        element
    );
    Ok(())
}

/// Reshape wide rows into one record per value cell
///
/// Years are carried forward from the last row that had one; a missing
/// sub-period becomes 0, which never forms a valid date. Records without a
/// calendar date (including years outside [`VALID_YEARS`]) or a numeric value
/// are dropped.
pub fn melt_rows(
    sheet: &RawSheet,
    block: &ValueBlock,
    year_col: usize,
    station_col: Option<usize>,
) -> Vec<DailyRecord> {
    let Some(value_cols) = block.columns() else {
        return Vec::new();
    };
    let period_col = year_col + 1;

    let mut records = Vec::new();
    let mut last_year: Option<i32> = None;

    for row_idx in 0..sheet.height() {
        if let Some(year) = sheet.cell(row_idx, year_col).as_i32() {
            last_year = Some(year);
        }
        let Some(year) = last_year else {
            debug!("No year yet at row {}, skipping", row_idx);
            continue;
        };

        let station = match station_col {
            Some(col) => match sheet.cell(row_idx, col).label() {
                Some(label) => Some(label),
                None => {
                    debug!("Blank station at row {}, skipping", row_idx);
                    continue;
                }
            },
            None => None,
        };

        if !VALID_YEARS.contains(&year) {
            debug!("Year {} at row {} is out of range, skipping", year, row_idx);
            continue;
        }

        let period = sheet.cell(row_idx, period_col).as_i32().unwrap_or(0);

        for (offset, col) in value_cols.clone().enumerate() {
            let position = offset as u32 + 1;
            let date = block
                .month_day(period, position)
                .and_then(|(month, day)| NaiveDate::from_ymd_opt(year, month, day));
            let (Some(date), Some(value)) = (date, sheet.cell(row_idx, col).as_f64()) else {
                continue;
            };
            records.push(DailyRecord {
                station: station.clone(),
                date,
                value,
            });
        }
    }

    records
}

/// Combine records into one value per station and day
///
/// Records without a station are filed under `single_name`.
fn aggregate_daily(
    records: Vec<DailyRecord>,
    aggregation: DailyAggregation,
    single_name: Option<&str>,
) -> BTreeMap<String, BTreeMap<NaiveDate, f64>> {
    let mut totals: BTreeMap<String, BTreeMap<NaiveDate, DailyTotal>> = BTreeMap::new();
    for record in records {
        let Some(station) = record.station.or_else(|| single_name.map(str::to_string)) else {
            continue;
        };
        let total = totals
            .entry(station)
            .or_default()
            .entry(record.date)
            .or_default();
        total.sum += record.value;
        total.count += 1;
    }

    totals
        .into_iter()
        .map(|(station, days)| {
            let values = days
                .into_iter()
                .filter_map(|(date, total)| {
                    aggregation
                        .finish(total.sum, total.count)
                        .map(|value| (date, value))
                })
                .collect();
            (station, values)
        })
        .collect()
}

/// Lay daily values out over whole calendar years, one column per station
fn pivot(
    daily: BTreeMap<String, BTreeMap<NaiveDate, f64>>,
    element: &str,
) -> Result<StationSeriesTable, LoadError> {
    let dates = daily.values().flat_map(|days| days.keys());
    let (Some(first), Some(last)) = (dates.clone().min(), dates.max()) else {
        return Err(LoadError::NoObservations(element.to_string()));
    };

    let start = NaiveDate::from_ymd_opt(first.year(), 1, 1)
        .ok_or_else(|| LoadError::NoObservations(element.to_string()))?;
    let end = NaiveDate::from_ymd_opt(last.year(), 12, 31)
        .ok_or_else(|| LoadError::NoObservations(element.to_string()))?;

    let stations: Vec<String> = daily.keys().cloned().collect();
    let mut table = StationSeriesTable::new(element, start, end, stations)?;

    for (station_idx, days) in daily.values().enumerate() {
        for (date, value) in days {
            if let Some(row) = table.date_index(*date) {
                table.set(station_idx, row, *value);
            }
        }
    }

    Ok(table)
}
