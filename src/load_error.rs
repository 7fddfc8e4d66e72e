use crate::table::TableError;

/// Reasons a station file could not be turned into a daily series
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("Element '{0}' not found; give a name present in the column with elements")]
    ElementNotFound(String),

    #[error("Station column '{0}' not found in the headers; check the header row number")]
    StationColumnMissing(String),

    #[error("Day or month columns not found; headers need 1-12, 1-31 or month names")]
    ValueBlockNotFound,

    #[error("No year column found; one of the headers must contain \"year\"")]
    YearColumnMissing,

    #[error("No numeric observations found for element '{0}'")]
    NoObservations(String),

    #[error("Header row {0} is past the end of the sheet")]
    HeaderRowOutOfRange(usize),

    #[error("Failed to open workbook: {0}")]
    WorkbookOpen(String),

    #[error("Sheet not found: {0}")]
    SheetNotFound(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Table error: {0}")]
    Table(#[from] TableError),
}
