//! CSV output for filled tables and coordinate lists

use std::io::Write;
use std::path::Path;
use tracing::info;

use crate::table::{CoordinateTable, StationSeriesTable};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Write `date,<station...>` rows; missing values become empty cells
pub fn write_csv<W: Write>(table: &StationSeriesTable, writer: W) -> Result<(), csv::Error> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    write_table(table, &mut csv_writer)
}

pub fn save_csv(table: &StationSeriesTable, path: impl AsRef<Path>) -> Result<(), csv::Error> {
    let mut csv_writer = csv::Writer::from_path(path.as_ref())?;
    write_table(table, &mut csv_writer)?;
    info!(
        "Wrote {} days x {} stations to {}",
        table.len(),
        table.stations().len(),
        path.as_ref().display()
    );
    Ok(())
}

fn write_table<W: Write>(
    table: &StationSeriesTable,
    csv_writer: &mut csv::Writer<W>,
) -> Result<(), csv::Error> {
    let mut header = Vec::with_capacity(table.stations().len() + 1);
    header.push("date");
    header.extend(table.stations().iter().map(String::as_str));
    csv_writer.write_record(&header)?;

    for (row, date) in table.dates().enumerate() {
        let mut record = Vec::with_capacity(header.len());
        record.push(date.format(DATE_FORMAT).to_string());
        record.extend(
            table
                .row(row)
                .map(|value| value.map(|v| v.to_string()).unwrap_or_default()),
        );
        csv_writer.write_record(&record)?;
    }

    csv_writer.flush()?;
    Ok(())
}

/// Write coordinates with the default `station,latitude,longitude` header
pub fn write_coordinates_csv<W: Write>(
    coords: &CoordinateTable,
    writer: W,
) -> Result<(), csv::Error> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(["station", "latitude", "longitude"])?;
    for (station, coordinate) in coords.iter() {
        csv_writer.write_record([
            station.to_string(),
            coordinate.latitude.to_string(),
            coordinate.longitude.to_string(),
        ])?;
    }
    csv_writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CoordColumns;
    use crate::importers::coord_loader::read_coordinates;
    use crate::table::Coordinate;
    use chrono::NaiveDate;

    #[test]
    fn test_write_csv_layout() {
        let table = StationSeriesTable::from_columns(
            "Rainfall",
            NaiveDate::from_ymd_opt(2021, 12, 31).unwrap(),
            vec![
                ("A".to_string(), vec![Some(1.5), None]),
                ("B".to_string(), vec![None, Some(0.0)]),
            ],
        )
        .unwrap();

        let mut buffer = Vec::new();
        write_csv(&table, &mut buffer).unwrap();

        let text = String::from_utf8(buffer).unwrap();
        assert_eq!(text, "date,A,B\n2021-12-31,1.5,\n2022-01-01,,0\n");
    }

    #[test]
    fn test_coordinates_written_in_loader_layout() {
        let coords: CoordinateTable = vec![
            ("Jinka".to_string(), Coordinate::new(5.78, 36.57)),
            ("Arba Minch".to_string(), Coordinate::new(6.03, 37.55)),
        ]
        .into_iter()
        .collect();

        let mut buffer = Vec::new();
        write_coordinates_csv(&coords, &mut buffer).unwrap();

        let reread = read_coordinates(buffer.as_slice(), &CoordColumns::default()).unwrap();
        assert_eq!(reread, coords);
    }

    #[test]
    fn test_save_csv_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("filled.csv");
        let table = StationSeriesTable::from_columns(
            "Tmin",
            NaiveDate::from_ymd_opt(2020, 2, 29).unwrap(),
            vec![("Jinka".to_string(), vec![Some(12.25)])],
        )
        .unwrap();

        save_csv(&table, &path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text, "date,Jinka\n2020-02-29,12.25\n");
    }
}
