//! Station file importers (CSV and workbook exports, coordinate tables)

pub mod coord_loader;
pub mod layout;
pub mod raw_sheet;
pub mod station_loader;

// Re-export commonly used items
pub use coord_loader::{coord_data_load, CoordLoadError};
pub use layout::{detect_value_block, ValueBlock};
pub use raw_sheet::{Cell, RawSheet};
pub use station_loader::{data_load, load_from_sheet};
