use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use thiserror::Error;
use tracing::{debug, error, info, instrument};

use super::raw_sheet::Cell;
use crate::config::CoordColumns;
use crate::table::{Coordinate, CoordinateTable};
use crate::utils::parse_number;

#[derive(Error, Debug)]
pub enum CoordLoadError {
    #[error("Failed to read coordinate file: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Column '{0}' not found in coordinate file")]
    MissingColumn(String),

    #[error("Invalid {field} for station {station} at line {line}: '{value}'")]
    InvalidCoordinate {
        station: String,
        field: &'static str,
        line: usize,
        value: String,
    },
}

/// Load a station -> latitude/longitude table from CSV
///
/// The first row of a station wins when it appears more than once.
#[instrument(skip(path, columns), fields(path = %path.as_ref().display()))]
pub fn coord_data_load(
    path: impl AsRef<Path>,
    columns: &CoordColumns,
) -> Result<CoordinateTable, CoordLoadError> {
    let result = File::open(path.as_ref())
        .map_err(CoordLoadError::from)
        .and_then(|file| read_coordinates(BufReader::new(file), columns));

    match &result {
        Ok(table) => info!("Coordinates loaded for {} stations.", table.len()),
        Err(e) => error!("An error occurred: {}", e),
    }
    result
}

/// Parse coordinate CSV from any reader
pub fn read_coordinates<R: Read>(
    reader: R,
    columns: &CoordColumns,
) -> Result<CoordinateTable, CoordLoadError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = csv_reader.headers()?.clone();
    let position = |name: &str| {
        headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| CoordLoadError::MissingColumn(name.to_string()))
    };
    let station_idx = position(columns.station.as_str())?;
    let lat_idx = position(columns.latitude.as_str())?;
    let lon_idx = position(columns.longitude.as_str())?;

    let mut table = CoordinateTable::new();
    let mut duplicates = 0;

    for (row_idx, record) in csv_reader.records().enumerate() {
        let record = record?;
        let line = row_idx + 2; // 1-based, after the header line

        let Some(station) = record
            .get(station_idx)
            .and_then(|s| Cell::from_text(s).label())
        else {
            debug!("Blank station at line {}, skipping", line);
            continue;
        };

        if table.contains(&station) {
            duplicates += 1;
            continue;
        }

        let field = |idx: usize, name: &'static str| {
            let raw = record.get(idx).unwrap_or_default();
            parse_number(raw).ok_or_else(|| CoordLoadError::InvalidCoordinate {
                station: station.clone(),
                field: name,
                line,
                value: raw.to_string(),
            })
        };
        let latitude = field(lat_idx, "latitude")?;
        let longitude = field(lon_idx, "longitude")?;

        table.insert(station, Coordinate::new(latitude, longitude));
    }

    if duplicates > 0 {
        debug!("Dropped {} duplicate station rows", duplicates);
    }

    Ok(table)
}
