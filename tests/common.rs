#![allow(dead_code)]

use chrono::NaiveDate;
use std::io::Write;
use tempfile::NamedTempFile;

/// Write `contents` to a temporary file with the given extension
pub fn fixture_file(contents: &str, suffix: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(suffix)
        .tempfile()
        .expect("Failed to create fixture file");
    file.write_all(contents.as_bytes())
        .expect("Failed to write fixture file");
    file.flush().expect("Failed to flush fixture file");
    file
}

pub fn csv_fixture(contents: &str) -> NamedTempFile {
    fixture_file(contents, ".csv")
}

pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

/// `Year,Month,1,...,31` header for day-block sheets
pub fn day_block_header(leading: &[&str]) -> String {
    let mut columns: Vec<String> = leading.iter().map(|c| c.to_string()).collect();
    columns.push("Year".to_string());
    columns.push("Month".to_string());
    columns.extend((1..=31).map(|d| d.to_string()));
    columns.join(",")
}

/// Day-block row with `values` placed from day 1 onwards, rest left blank
pub fn day_block_row(leading: &[&str], year: i32, month: u32, values: &[f64]) -> String {
    let mut columns: Vec<String> = leading.iter().map(|c| c.to_string()).collect();
    columns.push(year.to_string());
    columns.push(month.to_string());
    for day in 0..31 {
        columns.push(values.get(day).map(|v| v.to_string()).unwrap_or_default());
    }
    columns.join(",")
}

pub fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {expected}, got {actual}"
    );
}
