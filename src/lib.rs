pub mod config;
pub mod export;
pub mod fill;
pub mod importers;
pub mod load_error;
pub mod table;
pub mod utils;
