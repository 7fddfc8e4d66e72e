use clap::{Parser, ValueEnum};
use serde::Serialize;
use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;
use tracing::{info, instrument, warn};
use tracing_subscriber::EnvFilter;

use station_gapfill::config::{CoordColumns, LoadOptions, SheetSelector};
use station_gapfill::export;
use station_gapfill::fill::{
    fill_arithmetic_mean, fill_inverse_distance, fill_normal_ratio, StationReport, DEFAULT_POWER,
};
use station_gapfill::importers::{coord_data_load, data_load};
use station_gapfill::table::StationSeriesTable;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize)]
#[serde(rename_all = "kebab-case")]
enum FillMethod {
    /// Mean of the stations reporting on the same day
    Mean,
    /// Scale other stations by the ratio of annual normals
    NormalRatio,
    /// Inverse-distance weighted mean (needs --coords)
    Idw,
}

#[derive(Parser, Debug)]
#[command(name = "station-gapfill")]
#[command(about = "Load daily station records and fill missing days", long_about = None)]
struct Cli {
    /// Station file (CSV, xlsx, xlsm, xlsb, xls or ods)
    #[arg(long, env = "GAPFILL_FILE")]
    file: PathBuf,

    /// Element to load, e.g. "Rainfall" or "Tmax"
    #[arg(long, env = "GAPFILL_ELEMENT")]
    element: String,

    /// Worksheet name or zero-based position (workbooks only)
    #[arg(long, default_value = "0")]
    sheet: SheetSelector,

    /// Header of the column holding station names
    #[arg(long, env = "GAPFILL_STATIONS_COL")]
    stations_col: Option<String>,

    /// Name for the series of a single-station file
    #[arg(long)]
    station_name: Option<String>,

    /// Zero-based row holding the headers
    #[arg(long, default_value = "0")]
    header_row: usize,

    /// Gap filling method
    #[arg(long, value_enum, default_value = "mean")]
    method: FillMethod,

    /// Coordinate CSV for the idw method
    #[arg(long, env = "GAPFILL_COORDS")]
    coords: Option<PathBuf>,

    #[arg(long, default_value = "station")]
    coord_station_col: String,

    #[arg(long, default_value = "latitude")]
    coord_lat_col: String,

    #[arg(long, default_value = "longitude")]
    coord_lon_col: String,

    /// Distance exponent for the idw method
    #[arg(long, default_value_t = DEFAULT_POWER)]
    power: f64,

    /// Output CSV (stdout when omitted)
    #[arg(long)]
    output: Option<PathBuf>,

    /// Write a JSON summary of the fill to this path
    #[arg(long)]
    report: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct FillReport {
    element: String,
    method: FillMethod,
    stations: Vec<String>,
    days: usize,
    missing_before: usize,
    missing_after: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    station_outcomes: Option<Vec<StationReport>>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Logs go to stderr so CSV on stdout stays clean
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    run(cli)
}

#[instrument(skip(cli), fields(file = %cli.file.display(), method = ?cli.method))]
fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let mut options = LoadOptions::new()
        .with_sheet(cli.sheet.clone())
        .with_header_row(cli.header_row);
    if let Some(column) = &cli.stations_col {
        options = options.with_stations_col(column);
    }
    if let Some(name) = &cli.station_name {
        options = options.with_station_name(name);
    }

    let table = data_load(&cli.file, &cli.element, &options)?;
    let missing_before = table.missing_count();
    info!(
        "Loaded {} stations over {} days, {} missing values",
        table.stations().len(),
        table.len(),
        missing_before
    );

    let (filled, station_outcomes) = fill(&cli, &table)?;
    let missing_after = filled.missing_count();
    info!(
        "Filled {} of {} missing values",
        missing_before - missing_after,
        missing_before
    );

    match &cli.output {
        Some(path) => export::save_csv(&filled, path)?,
        None => export::write_csv(&filled, std::io::stdout().lock())?,
    }

    if let Some(path) = &cli.report {
        let report = FillReport {
            element: filled.element().to_string(),
            method: cli.method,
            stations: filled.stations().to_vec(),
            days: filled.len(),
            missing_before,
            missing_after,
            station_outcomes,
        };
        let writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(writer, &report)?;
        info!("Fill report written to {}", path.display());
    }

    Ok(())
}

fn fill(
    cli: &Cli,
    table: &StationSeriesTable,
) -> Result<(StationSeriesTable, Option<Vec<StationReport>>), Box<dyn std::error::Error>> {
    match cli.method {
        FillMethod::Mean => Ok((fill_arithmetic_mean(table), None)),
        FillMethod::NormalRatio => {
            let result = fill_normal_ratio(table);
            result.log_outcomes();
            let failed: Vec<&str> = result.failures().map(|(station, _)| station).collect();
            if !failed.is_empty() {
                warn!(
                    "{} stations left unfilled: {}",
                    failed.len(),
                    failed.join(", ")
                );
            }
            Ok((result.table, Some(result.stations)))
        }
        FillMethod::Idw => {
            let coords_path = cli
                .coords
                .as_ref()
                .ok_or("--coords is required for the idw method")?;
            let columns = CoordColumns {
                station: cli.coord_station_col.clone(),
                latitude: cli.coord_lat_col.clone(),
                longitude: cli.coord_lon_col.clone(),
            };
            let coords = coord_data_load(coords_path, &columns)?;
            Ok((fill_inverse_distance(table, &coords, cli.power)?, None))
        }
    }
}
