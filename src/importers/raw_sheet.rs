use calamine::{open_workbook_auto, Data, Range, Reader};
use std::fmt;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use tracing::{debug, info};

use crate::config::SheetSelector;
use crate::load_error::LoadError;
use crate::utils::{format_station_id, parse_number};

/// Extensions read through calamine; everything else is treated as CSV
const WORKBOOK_EXTENSIONS: [&str; 5] = ["xlsx", "xlsm", "xlsb", "xls", "ods"];

static EMPTY_CELL: Cell = Cell::Empty;

/// One spreadsheet cell, reduced to what the layout heuristics care about
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Number(f64),
    Text(String),
}

impl Cell {
    /// Interpret a CSV field: blank -> Empty, numeric -> Number, else Text
    pub fn from_text(value: &str) -> Self {
        if value.trim().is_empty() {
            return Cell::Empty;
        }
        match parse_number(value) {
            Some(number) => Cell::Number(number),
            None => Cell::Text(value.to_string()),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Cell::Empty)
    }

    /// Numeric content; text is parsed, unparseable text counts as missing
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Cell::Number(n) if n.is_finite() => Some(*n),
            Cell::Text(s) => parse_number(s),
            _ => None,
        }
    }

    /// Whole-number content (years, months, days), truncated like an int cast
    pub fn as_i32(&self) -> Option<i32> {
        self.as_f64()
            .map(f64::trunc)
            .filter(|v| (i32::MIN as f64..=i32::MAX as f64).contains(v))
            .map(|v| v as i32)
    }

    /// Exact text comparison; numbers and blanks never match
    pub fn is_text(&self, expected: &str) -> bool {
        matches!(self, Cell::Text(s) if s == expected)
    }

    /// Label used for headers and station identifiers, `None` for blanks
    pub fn label(&self) -> Option<String> {
        match self {
            Cell::Empty => None,
            Cell::Number(n) => Some(format_station_id(*n)),
            Cell::Text(s) => Some(s.trim().to_string()),
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.label() {
            Some(label) => write!(f, "{label}"),
            None => write!(f, ""),
        }
    }
}

impl From<&Data> for Cell {
    fn from(data: &Data) -> Self {
        match data {
            Data::Int(i) => Cell::Number(*i as f64),
            Data::Float(f) => Cell::Number(*f),
            Data::String(s) if s.trim().is_empty() => Cell::Empty,
            Data::String(s) => Cell::Text(s.clone()),
            Data::Bool(b) => Cell::Text(b.to_string()),
            Data::DateTime(dt) => Cell::Number(dt.as_f64()),
            Data::DateTimeIso(s) | Data::DurationIso(s) => Cell::Text(s.clone()),
            Data::Error(_) | Data::Empty => Cell::Empty,
        }
    }
}

/// A sheet as read from disk: one header row plus body rows of equal width
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawSheet {
    headers: Vec<Cell>,
    rows: Vec<Vec<Cell>>,
}

impl RawSheet {
    /// Rows are padded or cut to the header width
    pub fn new(headers: Vec<Cell>, rows: Vec<Vec<Cell>>) -> Self {
        let width = headers.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, Cell::Empty);
                row
            })
            .collect();
        Self { headers, rows }
    }

    /// Read a CSV or workbook file, choosing the reader by extension
    pub fn open(
        path: &Path,
        sheet: &SheetSelector,
        header_row: usize,
    ) -> Result<Self, LoadError> {
        if is_workbook_path(path) {
            Self::from_workbook_path(path, sheet, header_row)
        } else {
            Self::from_csv_path(path, header_row)
        }
    }

    pub fn from_csv_path(path: &Path, header_row: usize) -> Result<Self, LoadError> {
        let file = File::open(path)?;
        let sheet = Self::from_csv_reader(BufReader::new(file), header_row)?;
        info!(
            "Read CSV {} ({} columns, {} rows)",
            path.display(),
            sheet.width(),
            sheet.height()
        );
        Ok(sheet)
    }

    /// Parse CSV text; records before `header_row` are skipped
    pub fn from_csv_reader<R: Read>(reader: R, header_row: usize) -> Result<Self, LoadError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(reader);

        let mut records = csv_reader.records().skip(header_row);

        let headers: Vec<Cell> = match records.next() {
            Some(record) => record?
                .iter()
                .map(|field| {
                    if field.trim().is_empty() {
                        Cell::Empty
                    } else {
                        Cell::Text(field.to_string())
                    }
                })
                .collect(),
            None => return Err(LoadError::HeaderRowOutOfRange(header_row)),
        };

        let mut rows = Vec::new();
        for record in records {
            let record = record?;
            rows.push(record.iter().map(Cell::from_text).collect());
        }

        Ok(Self::new(headers, rows))
    }

    pub fn from_workbook_path(
        path: &Path,
        sheet: &SheetSelector,
        header_row: usize,
    ) -> Result<Self, LoadError> {
        let mut workbook =
            open_workbook_auto(path).map_err(|e| LoadError::WorkbookOpen(e.to_string()))?;

        let range = match sheet {
            SheetSelector::Index(idx) => workbook
                .worksheet_range_at(*idx)
                .ok_or_else(|| LoadError::SheetNotFound(sheet.to_string()))?
                .map_err(|e| LoadError::WorkbookOpen(e.to_string()))?,
            SheetSelector::Name(name) => workbook
                .worksheet_range(name)
                .map_err(|_| LoadError::SheetNotFound(name.clone()))?,
        };

        let parsed = Self::from_range(&range, header_row)?;
        info!(
            "Read sheet {} of {} ({} columns, {} rows)",
            sheet,
            path.display(),
            parsed.width(),
            parsed.height()
        );
        Ok(parsed)
    }

    /// Convert a worksheet range; `header_row` counts from the top of the sheet
    pub fn from_range(range: &Range<Data>, header_row: usize) -> Result<Self, LoadError> {
        // calamine trims leading blank rows, keep indices relative to row 0
        let first_row = range.start().map(|(row, _)| row as usize).unwrap_or(0);
        debug!(
            "Worksheet range starts at row {}, size {:?}",
            first_row,
            range.get_size()
        );

        let mut rows = range
            .rows()
            .map(|row| row.iter().map(Cell::from).collect::<Vec<_>>());

        let headers = match header_row.checked_sub(first_row) {
            Some(offset) => rows
                .nth(offset)
                .ok_or(LoadError::HeaderRowOutOfRange(header_row))?,
            // Header row sits in the blank area above the data
            None => {
                let width = range.get_size().1;
                let skipped = first_row - header_row - 1;
                let mut body: Vec<Vec<Cell>> = vec![vec![Cell::Empty; width]; skipped];
                body.extend(rows);
                return Ok(Self::new(vec![Cell::Empty; width], body));
            }
        };

        Ok(Self::new(headers, rows.collect()))
    }

    pub fn headers(&self) -> &[Cell] {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    pub fn width(&self) -> usize {
        self.headers.len()
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    pub fn cell(&self, row: usize, col: usize) -> &Cell {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .unwrap_or(&EMPTY_CELL)
    }

    /// Position of the first header whose label equals `name`
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers
            .iter()
            .position(|header| header.label().as_deref() == Some(name))
    }

    pub fn retain_rows<F>(&mut self, keep: F)
    where
        F: FnMut(&Vec<Cell>) -> bool,
    {
        self.rows.retain(keep);
    }
}

pub fn is_workbook_path(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            WORKBOOK_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
        .unwrap_or(false)
}

/// Names of the sheets in a workbook, in file order
pub fn sheet_names(path: &Path) -> Result<Vec<String>, LoadError> {
    let workbook =
        open_workbook_auto(path).map_err(|e| LoadError::WorkbookOpen(e.to_string()))?;
    Ok(workbook.sheet_names())
}
