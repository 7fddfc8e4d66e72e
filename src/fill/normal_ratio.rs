/// Normal-ratio gap filling
///
/// A station's normal is its long-run mean annual total. The estimate for a
/// missing day at station `a` is `(Na / n) * sum(Pi / Ni)` over the `n` other
/// stations reporting that day, where `Pi` is their value and `Ni` their
/// normal. Normals come from the input table, so the result does not depend
/// on the order stations are processed in.
use chrono::Datelike;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{debug, info, instrument, warn};

use crate::table::StationSeriesTable;

/// Why a station could not be filled at all
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(rename_all = "snake_case")]
pub enum StationFillError {
    #[error("no other stations to take ratios from")]
    NoDonors,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StationOutcome {
    /// `unresolved` counts missing days with no usable donor
    Filled { filled: usize, unresolved: usize },
    Failed { reason: StationFillError },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StationReport {
    pub station: String,
    /// Mean annual total
    pub normal: f64,
    pub outcome: StationOutcome,
}

/// Filled table plus what happened at each station
#[derive(Debug, Clone)]
pub struct NormalRatioFill {
    pub table: StationSeriesTable,
    pub stations: Vec<StationReport>,
}

impl NormalRatioFill {
    pub fn outcome(&self, station: &str) -> Option<&StationOutcome> {
        self.stations
            .iter()
            .find(|report| report.station == station)
            .map(|report| &report.outcome)
    }

    pub fn failures(&self) -> impl Iterator<Item = (&str, &StationFillError)> + '_ {
        self.stations.iter().filter_map(|report| match &report.outcome {
            StationOutcome::Failed { reason } => Some((report.station.as_str(), reason)),
            StationOutcome::Filled { .. } => None,
        })
    }

    /// Report per-station results through tracing
    pub fn log_outcomes(&self) {
        for report in &self.stations {
            match &report.outcome {
                StationOutcome::Failed { reason } => {
                    warn!("Error for {}: {}", report.station, reason);
                }
                StationOutcome::Filled { filled, unresolved } if *unresolved > 0 => {
                    warn!(
                        "Station {}: filled {} days, {} days had no donor data",
                        report.station, filled, unresolved
                    );
                }
                StationOutcome::Filled { filled, .. } => {
                    info!("Station {}: filled {} days", report.station, filled);
                }
            }
        }
    }

    pub fn into_table(self) -> StationSeriesTable {
        self.table
    }
}

/// Mean annual total per station, in station order
///
/// Every calendar year of the index counts; a year without data adds a zero
/// total, so a station without any observation has a normal of 0.
pub fn annual_normals(table: &StationSeriesTable) -> Vec<f64> {
    let years = table.years();
    if years.is_empty() {
        return vec![0.0; table.stations().len()];
    }

    (0..table.stations().len())
        .map(|station| {
            let column = table.column_by_index(station).unwrap_or_default();
            let mut totals: BTreeMap<i32, f64> = years.iter().map(|&y| (y, 0.0)).collect();

            for (date, value) in table.dates().zip(column) {
                if let Some(v) = value {
                    *totals.entry(date.year()).or_default() += v;
                }
            }

            totals.values().sum::<f64>() / totals.len() as f64
        })
        .collect()
}

#[instrument(skip(table), fields(element = table.element(), stations = table.stations().len()))]
pub fn fill_normal_ratio(table: &StationSeriesTable) -> NormalRatioFill {
    let normals = annual_normals(table);
    let mut filled = table.clone();
    let mut reports = Vec::with_capacity(table.stations().len());

    for (target, station) in table.stations().iter().enumerate() {
        let outcome = match fill_station(table, &normals, target, &mut filled) {
            Ok((filled_days, unresolved)) => StationOutcome::Filled {
                filled: filled_days,
                unresolved,
            },
            Err(reason) => StationOutcome::Failed { reason },
        };
        debug!("Station {}: {:?}", station, outcome);

        reports.push(StationReport {
            station: station.clone(),
            normal: normals[target],
            outcome,
        });
    }

    NormalRatioFill {
        table: filled,
        stations: reports,
    }
}

/// Fill one station's gaps, returning (filled, unresolved) day counts
fn fill_station(
    table: &StationSeriesTable,
    normals: &[f64],
    target: usize,
    filled: &mut StationSeriesTable,
) -> Result<(usize, usize), StationFillError> {
    if table.stations().len() < 2 {
        return Err(StationFillError::NoDonors);
    }
    let target_normal = normals[target];
    let column = table.column_by_index(target).unwrap_or_default();
    if column.iter().all(Option::is_none) {
        debug!(
            "Station {} has no observations, its normal is 0",
            table.stations()[target]
        );
    }

    let mut filled_days = 0;
    let mut unresolved = 0;

    for (row, value) in column.iter().enumerate() {
        if value.is_some() {
            continue;
        }

        let mut donors = 0usize;
        let mut ratio_sum = 0.0;
        for (donor, donor_value) in table.row(row).enumerate() {
            if donor == target {
                continue;
            }
            let Some(v) = donor_value else {
                continue;
            };
            donors += 1;
            // A zero normal gives no usable ratio but the donor still counts
            let ratio = v / normals[donor];
            if ratio.is_finite() {
                ratio_sum += ratio;
            }
        }

        if donors == 0 {
            unresolved += 1;
            continue;
        }

        let estimate = target_normal / donors as f64 * ratio_sum;
        if estimate.is_finite() {
            filled.set(target, row, estimate);
            filled_days += 1;
        } else {
            unresolved += 1;
        }
    }

    Ok((filled_days, unresolved))
}
