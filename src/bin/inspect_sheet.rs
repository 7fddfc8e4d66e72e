use clap::Parser;
use std::path::PathBuf;

use station_gapfill::config::SheetSelector;
use station_gapfill::importers::layout::find_year_column;
use station_gapfill::importers::raw_sheet::{is_workbook_path, sheet_names};
use station_gapfill::importers::{detect_value_block, RawSheet};

#[derive(Parser)]
#[command(name = "inspect-sheet")]
#[command(about = "Show the headers and detected layout of a station file", long_about = None)]
struct Cli {
    /// Station file (CSV or workbook)
    file: PathBuf,

    /// Worksheet name or zero-based position
    #[arg(long, default_value = "0")]
    sheet: SheetSelector,

    /// Zero-based row holding the headers
    #[arg(long, default_value = "0")]
    header_row: usize,

    /// Number of data rows to print
    #[arg(long, default_value = "5")]
    rows: usize,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    println!("Opening station file: {}", cli.file.display());

    if is_workbook_path(&cli.file) {
        println!("\nSheet names:");
        for (i, name) in sheet_names(&cli.file)?.iter().enumerate() {
            println!("  {i}: {name}");
        }
        println!("\nExamining sheet: {}", cli.sheet);
    }

    let sheet = RawSheet::open(&cli.file, &cli.sheet, cli.header_row)?;
    println!("Dimensions: {} columns x {} rows", sheet.width(), sheet.height());

    println!("\n{}", "=".repeat(80));
    println!("Headers (row {}):", cli.header_row);
    println!("{}", "=".repeat(80));
    for (col_idx, header) in sheet.headers().iter().enumerate() {
        if header.is_empty() {
            println!("Col {col_idx:3}: [empty]");
        } else {
            println!("Col {col_idx:3}: {header}");
        }
    }

    println!("\n{}", "=".repeat(80));
    println!("Layout");
    println!("{}", "=".repeat(80));
    println!("Value block: {}", detect_value_block(sheet.headers()));
    match find_year_column(sheet.headers()) {
        Some(col) => println!("Year column: {col}"),
        None => println!("Year column: not found"),
    }

    println!("\nFirst {} rows:", cli.rows);
    for (row_idx, row) in sheet.rows().iter().enumerate().take(cli.rows) {
        print!("Row {row_idx:3}: ");
        for cell in row.iter().take(12) {
            if cell.is_empty() {
                print!("[empty] ");
            } else {
                print!("[{cell}] ");
            }
        }
        println!();
    }

    Ok(())
}
