//! Gap fillers for station series
//!
//! Each filler takes a table by reference and returns a new one with the same
//! stations, dates and element; cells that already hold a value never change.

pub mod arithmetic_mean;
pub mod inverse_distance;
pub mod normal_ratio;

pub use arithmetic_mean::fill_arithmetic_mean;
pub use inverse_distance::{fill_inverse_distance, IdwError, DEFAULT_POWER};
pub use normal_ratio::{
    annual_normals, fill_normal_ratio, NormalRatioFill, StationFillError, StationOutcome,
    StationReport,
};
