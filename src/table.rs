pub mod coordinates;
pub mod error;
pub mod station_series;

pub use coordinates::{Coordinate, CoordinateTable};
pub use error::TableError;
pub use station_series::StationSeriesTable;
