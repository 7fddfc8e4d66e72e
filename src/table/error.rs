use chrono::NaiveDate;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TableError {
    #[error("Duplicate station column: {0}")]
    DuplicateStation(String),

    #[error("Column {station} has {actual} rows, expected {expected}")]
    LengthMismatch {
        station: String,
        expected: usize,
        actual: usize,
    },

    #[error("Date range ends before it starts: {start} to {end}")]
    InvertedRange { start: NaiveDate, end: NaiveDate },
}
