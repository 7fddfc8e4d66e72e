use thiserror::Error;
use tracing::{debug, instrument};

use crate::table::{CoordinateTable, StationSeriesTable};

/// Distance exponent used when none is given
pub const DEFAULT_POWER: f64 = 2.0;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum IdwError {
    #[error("No coordinates for station {0}")]
    MissingCoordinates(String),

    #[error("Stations {0} and {1} have the same coordinates")]
    CoincidentStations(String, String),

    #[error("Distance exponent must be a finite number, got {0}")]
    InvalidPower(f64),
}

/// Fill gaps with an inverse-distance weighted average of the other stations
///
/// Each donor is weighted by `1 / distance^power`, distance being planar in
/// latitude/longitude degrees. Only donors reporting on the day count, in
/// both the weighted sum and the sum of weights; a day with no reporting
/// donor stays missing.
///
/// Every station of the table must have coordinates, and no two stations may
/// share a position.
#[instrument(skip(table, coords), fields(element = table.element(), stations = table.stations().len()))]
pub fn fill_inverse_distance(
    table: &StationSeriesTable,
    coords: &CoordinateTable,
    power: f64,
) -> Result<StationSeriesTable, IdwError> {
    if !power.is_finite() {
        return Err(IdwError::InvalidPower(power));
    }

    if let Some(station) = table.stations().iter().find(|s| !coords.contains(s)) {
        return Err(IdwError::MissingCoordinates(station.clone()));
    }
    let weights = weight_matrix(table.stations(), coords, power)?;

    let mut filled = table.clone();
    let mut filled_cells = 0;

    for (target, target_weights) in weights.iter().enumerate() {
        let Some(column) = table.column_by_index(target) else {
            continue;
        };

        for (row, value) in column.iter().enumerate() {
            if value.is_some() {
                continue;
            }

            let (weighted_sum, weight_sum) = table
                .row(row)
                .zip(target_weights)
                .enumerate()
                .filter(|(donor, _)| *donor != target)
                .filter_map(|(_, (value, weight))| value.map(|v| (v, *weight)))
                .fold((0.0, 0.0), |(ws, w), (v, weight)| (ws + v * weight, w + weight));

            if weight_sum > 0.0 {
                let estimate = weighted_sum / weight_sum;
                if estimate.is_finite() {
                    filled.set(target, row, estimate);
                    filled_cells += 1;
                }
            }
        }
    }

    debug!(
        "Inverse distance filled {} cells, {} still missing",
        filled_cells,
        filled.missing_count()
    );
    Ok(filled)
}

/// `weights[target][donor]`; the diagonal is zero and never used
fn weight_matrix(
    stations: &[String],
    coords: &CoordinateTable,
    power: f64,
) -> Result<Vec<Vec<f64>>, IdwError> {
    let mut weights = vec![vec![0.0; stations.len()]; stations.len()];

    for (target, target_station) in stations.iter().enumerate() {
        for (donor, donor_station) in stations.iter().enumerate() {
            if donor == target {
                continue;
            }
            let distance = coords
                .distance(target_station, donor_station)
                .ok_or_else(|| IdwError::MissingCoordinates(donor_station.clone()))?;
            if distance == 0.0 {
                return Err(IdwError::CoincidentStations(
                    target_station.clone(),
                    donor_station.clone(),
                ));
            }
            weights[target][donor] = 1.0 / distance.powf(power);
        }
    }

    Ok(weights)
}
