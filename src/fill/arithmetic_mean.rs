use tracing::{debug, instrument};

use crate::table::StationSeriesTable;

/// Fill each missing cell with the mean of the stations reporting that day
///
/// Days on which no station reports stay missing. Running the fill on its
/// own output changes nothing.
#[instrument(skip(table), fields(element = table.element(), stations = table.stations().len()))]
pub fn fill_arithmetic_mean(table: &StationSeriesTable) -> StationSeriesTable {
    let mut filled = table.clone();
    let mut filled_cells = 0;

    for row in 0..table.len() {
        let (sum, count) = table
            .row(row)
            .flatten()
            .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
        if count == 0 {
            continue;
        }
        let mean = sum / count as f64;

        for (station, value) in table.row(row).enumerate() {
            if value.is_none() {
                filled.set(station, row, mean);
                filled_cells += 1;
            }
        }
    }

    debug!(
        "Arithmetic mean filled {} cells, {} still missing",
        filled_cells,
        filled.missing_count()
    );
    filled
}
