// Loading stacked station exports (CSV and workbooks) into daily series

mod common;

use common::{csv_fixture, date, day_block_header, day_block_row};
use rust_xlsxwriter::Workbook;
use station_gapfill::config::{LoadOptions, SheetSelector};
use station_gapfill::importers::data_load;
use station_gapfill::importers::raw_sheet::sheet_names;
use station_gapfill::importers::station_loader::UNKNOWN_STATION;
use station_gapfill::load_error::LoadError;
use tempfile::NamedTempFile;

const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Three stations, two years, one row per station-year-day with month columns
fn stacked_month_file() -> String {
    let mut lines = vec![format!("Station,Year,Day,{}", MONTHS.join(","))];
    // Stations deliberately out of order
    for (station, base) in [("C", 300.0), ("A", 100.0), ("B", 200.0)] {
        for year in [2021, 2022] {
            for day in 1..=31 {
                let values: Vec<String> = (0..12).map(|_| (base + day as f64).to_string()).collect();
                lines.push(format!("{station},{year},{day},{}", values.join(",")));
            }
        }
    }
    lines.join("\n")
}

#[test]
fn test_stacked_month_layout() {
    let file = csv_fixture(&stacked_month_file());
    let options = LoadOptions::new().with_stations_col("Station");

    let table = data_load(file.path(), "Rainfall", &options).unwrap();

    assert_eq!(table.stations(), ["A", "B", "C"]);
    assert_eq!(table.len(), 730);
    assert_eq!(table.start(), date(2021, 1, 1));
    assert_eq!(table.end(), Some(date(2022, 12, 31)));
    // Feb 29-31 rows are dropped, every real day has a value
    assert_eq!(table.missing_count(), 0);
    assert_eq!(table.value(date(2022, 2, 28), "B"), Some(228.0));
    assert_eq!(table.value(date(2021, 12, 31), "C"), Some(331.0));
    assert_eq!(table.value(date(2021, 7, 4), "A"), Some(104.0));
}

#[test]
fn test_accumulating_element_sums_same_day_records() {
    let text = [
        day_block_header(&[]),
        day_block_row(&[], 2020, 1, &[2.0]),
        day_block_row(&[], 2020, 1, &[3.0]),
    ]
    .join("\n");
    let file = csv_fixture(&text);
    let options = LoadOptions::new().with_station_name("Jinka");

    let rainfall = data_load(file.path(), "Rainfall", &options).unwrap();
    let temperature = data_load(file.path(), "Temperature", &options).unwrap();

    assert_eq!(rainfall.value(date(2020, 1, 1), "Jinka"), Some(5.0));
    assert_eq!(temperature.value(date(2020, 1, 1), "Jinka"), Some(2.5));
    // 2020 is a leap year
    assert_eq!(rainfall.len(), 366);
    assert_eq!(rainfall.element(), "Rainfall");
}

#[test]
fn test_single_station_without_name_uses_fallback() {
    let text = [day_block_header(&[]), day_block_row(&[], 2019, 3, &[1.0, 2.0])].join("\n");
    let file = csv_fixture(&text);

    let table = data_load(file.path(), "Tmax", &LoadOptions::new()).unwrap();

    assert_eq!(table.stations(), [UNKNOWN_STATION]);
    assert_eq!(table.value(date(2019, 3, 2), UNKNOWN_STATION), Some(2.0));
}

#[test]
fn test_multi_element_sheet_filters_rows() {
    let leading = ["Station", "Element"];
    let text = [
        day_block_header(&leading),
        day_block_row(&["A", "Rainfall"], 2020, 1, &[1.0]),
        day_block_row(&["A", "Tmax"], 2020, 1, &[25.0]),
        day_block_row(&["B", "Rainfall"], 2020, 1, &[2.0]),
    ]
    .join("\n");
    let file = csv_fixture(&text);
    let options = LoadOptions::new().with_stations_col("Station");

    let rainfall = data_load(file.path(), "Rainfall", &options).unwrap();
    let tmax = data_load(file.path(), "Tmax", &options).unwrap();

    assert_eq!(rainfall.stations(), ["A", "B"]);
    assert_eq!(rainfall.value(date(2020, 1, 1), "A"), Some(1.0));
    assert_eq!(tmax.stations(), ["A"]);
    assert_eq!(tmax.value(date(2020, 1, 1), "A"), Some(25.0));
}

#[test]
fn test_unknown_element_in_multi_element_sheet() {
    let text = [
        day_block_header(&["Station", "Element"]),
        day_block_row(&["A", "Rainfall"], 2020, 1, &[1.0]),
    ]
    .join("\n");
    let file = csv_fixture(&text);
    let options = LoadOptions::new().with_stations_col("Station");

    let result = data_load(file.path(), "Humidity", &options);

    assert!(matches!(result, Err(LoadError::ElementNotFound(e)) if e == "Humidity"));
}

#[test]
fn test_header_row_offset() {
    let text = format!(
        "Station data export\nGenerated for testing\n{}\n{}",
        day_block_header(&["Station"]),
        day_block_row(&["63001"], 2018, 12, &[0.5]),
    );
    let file = csv_fixture(&text);
    let options = LoadOptions::new()
        .with_stations_col("Station")
        .with_header_row(2);

    let table = data_load(file.path(), "Rainfall", &options).unwrap();

    assert_eq!(table.stations(), ["63001"]);
    assert_eq!(table.value(date(2018, 12, 1), "63001"), Some(0.5));
    assert_eq!(table.start(), date(2018, 1, 1));
}

#[test]
fn test_year_forward_filled_across_rows() {
    let text = [
        day_block_header(&[]),
        day_block_row(&[], 2017, 1, &[1.0]),
        // Year left blank on the following row
        day_block_row(&[], 2017, 2, &[2.0]).replacen("2017", "", 1),
    ]
    .join("\n");
    let file = csv_fixture(&text);

    let table = data_load(file.path(), "Tmin", &LoadOptions::new()).unwrap();

    assert_eq!(table.value(date(2017, 2, 1), UNKNOWN_STATION), Some(2.0));
}

#[test]
fn test_value_block_not_found() {
    let file = csv_fixture("Year,Month,Value\n2020,1,3.0\n");

    let result = data_load(file.path(), "Rainfall", &LoadOptions::new());

    assert!(matches!(result, Err(LoadError::ValueBlockNotFound)));
}

#[test]
fn test_year_column_missing() {
    let days: Vec<String> = (1..=31).map(|d| d.to_string()).collect();
    let text = format!("Station,Month,{}\nA,1,{}\n", days.join(","), days.join(","));
    let file = csv_fixture(&text);

    let result = data_load(file.path(), "Rainfall", &LoadOptions::new());

    assert!(matches!(result, Err(LoadError::YearColumnMissing)));
}

#[test]
fn test_station_column_missing() {
    let text = [day_block_header(&[]), day_block_row(&[], 2020, 1, &[1.0])].join("\n");
    let file = csv_fixture(&text);
    let options = LoadOptions::new().with_stations_col("Gauge");

    let result = data_load(file.path(), "Rainfall", &options);

    assert!(matches!(result, Err(LoadError::StationColumnMissing(c)) if c == "Gauge"));
}

#[test]
fn test_no_observations() {
    let text = [day_block_header(&[]), day_block_row(&[], 2020, 1, &[])].join("\n");
    let file = csv_fixture(&text);

    let result = data_load(file.path(), "Rainfall", &LoadOptions::new());

    assert!(matches!(result, Err(LoadError::NoObservations(_))));
}

#[test]
fn test_header_row_past_end() {
    let file = csv_fixture(&day_block_header(&[]));
    let options = LoadOptions::new().with_header_row(5);

    let result = data_load(file.path(), "Rainfall", &options);

    assert!(matches!(result, Err(LoadError::HeaderRowOutOfRange(5))));
}

#[test]
fn test_missing_file() {
    let result = data_load("/nonexistent/stations.csv", "Rainfall", &LoadOptions::new());

    assert!(matches!(result, Err(LoadError::Io(_))));
}

#[test]
fn test_out_of_range_year_dropped() {
    let text = [
        day_block_header(&[]),
        day_block_row(&[], 2020, 1, &[1.0]),
        // 9020 is a typo for 2020
        day_block_row(&[], 9020, 1, &[2.0]),
    ]
    .join("\n");
    let file = csv_fixture(&text);

    let table = data_load(file.path(), "Rainfall", &LoadOptions::new()).unwrap();

    assert_eq!(table.start(), date(2020, 1, 1));
    assert_eq!(table.end(), Some(date(2020, 12, 31)));
    assert_eq!(table.observed_count(), 1);
}

/// Two-sheet workbook: a notes sheet first, the station data second
fn station_workbook() -> NamedTempFile {
    let file = tempfile::Builder::new()
        .suffix(".xlsx")
        .tempfile()
        .expect("Failed to create workbook fixture");

    let mut workbook = Workbook::new();

    let notes = workbook.add_worksheet();
    notes.set_name("Notes").unwrap();
    notes.write_string(0, 0, "Daily rainfall export").unwrap();

    let data = workbook.add_worksheet();
    data.set_name("Rainfall").unwrap();
    data.write_string(0, 0, "Year").unwrap();
    data.write_string(0, 1, "Month").unwrap();
    for day in 1..=31u16 {
        data.write_number(0, day + 1, day as f64).unwrap();
    }
    data.write_number(1, 0, 2020).unwrap();
    data.write_number(1, 1, 3).unwrap();
    data.write_number(1, 2, 2.5).unwrap();
    data.write_number(1, 3, 4.0).unwrap();

    workbook.save(file.path()).unwrap();
    file
}

#[test]
fn test_workbook_sheet_by_name() {
    let file = station_workbook();
    let options = LoadOptions::new()
        .with_sheet(SheetSelector::Name("Rainfall".to_string()))
        .with_station_name("Jinka");

    let table = data_load(file.path(), "Rainfall", &options).unwrap();

    assert_eq!(table.stations(), ["Jinka"]);
    assert_eq!(table.value(date(2020, 3, 1), "Jinka"), Some(2.5));
    assert_eq!(table.value(date(2020, 3, 2), "Jinka"), Some(4.0));
    assert_eq!(table.len(), 366);
}

#[test]
fn test_workbook_sheet_by_index() {
    let file = station_workbook();
    let options = LoadOptions::new()
        .with_sheet(SheetSelector::Index(1))
        .with_station_name("Jinka");

    let table = data_load(file.path(), "Rainfall", &options).unwrap();

    assert_eq!(table.value(date(2020, 3, 1), "Jinka"), Some(2.5));
}

#[test]
fn test_workbook_default_sheet_is_first() {
    let file = station_workbook();

    // The notes sheet has no day or month columns
    let result = data_load(file.path(), "Rainfall", &LoadOptions::new());

    assert!(matches!(result, Err(LoadError::ValueBlockNotFound)));
}

#[test]
fn test_workbook_sheet_names() {
    let file = station_workbook();

    let names = sheet_names(file.path()).unwrap();

    assert_eq!(names, vec!["Notes".to_string(), "Rainfall".to_string()]);
}

#[test]
fn test_workbook_sheet_not_found() {
    let file = station_workbook();

    let by_name = data_load(
        file.path(),
        "Rainfall",
        &LoadOptions::new().with_sheet(SheetSelector::Name("Tmax".to_string())),
    );
    let by_index = data_load(
        file.path(),
        "Rainfall",
        &LoadOptions::new().with_sheet(SheetSelector::Index(5)),
    );

    assert!(matches!(by_name, Err(LoadError::SheetNotFound(s)) if s == "Tmax"));
    assert!(matches!(by_index, Err(LoadError::SheetNotFound(_))));
}

#[test]
fn test_workbook_not_found() {
    let result = data_load("/nonexistent/stations.xlsx", "Rainfall", &LoadOptions::new());

    assert!(matches!(result, Err(LoadError::WorkbookOpen(_))));
}
