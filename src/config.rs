use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

/// Worksheet to read from a workbook input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SheetSelector {
    /// Zero-based sheet position
    Index(usize),
    Name(String),
}

impl Default for SheetSelector {
    fn default() -> Self {
        SheetSelector::Index(0)
    }
}

impl FromStr for SheetSelector {
    type Err = Infallible;

    /// All-digit input selects by position, anything else by name
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        match trimmed.parse::<usize>() {
            Ok(idx) if trimmed.chars().all(|c| c.is_ascii_digit()) => Ok(SheetSelector::Index(idx)),
            _ => Ok(SheetSelector::Name(s.to_string())),
        }
    }
}

impl fmt::Display for SheetSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SheetSelector::Index(idx) => write!(f, "#{idx}"),
            SheetSelector::Name(name) => write!(f, "{name}"),
        }
    }
}

/// Layout hints for reading a station file
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    pub sheet: SheetSelector,
    /// Header of the column naming the station on each row
    pub stations_col: Option<String>,
    /// Name for the series when the file holds a single station
    pub station_name: Option<String>,
    /// Zero-based row holding the column headers
    pub header_row: usize,
}

impl LoadOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sheet(mut self, sheet: SheetSelector) -> Self {
        self.sheet = sheet;
        self
    }

    pub fn with_stations_col(mut self, column: impl Into<String>) -> Self {
        self.stations_col = Some(column.into());
        self
    }

    pub fn with_station_name(mut self, name: impl Into<String>) -> Self {
        self.station_name = Some(name.into());
        self
    }

    pub fn with_header_row(mut self, row: usize) -> Self {
        self.header_row = row;
        self
    }
}

/// Column names used when reading a coordinate table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoordColumns {
    pub station: String,
    pub latitude: String,
    pub longitude: String,
}

impl Default for CoordColumns {
    fn default() -> Self {
        Self {
            station: "station".to_string(),
            latitude: "latitude".to_string(),
            longitude: "longitude".to_string(),
        }
    }
}
