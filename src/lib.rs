//! Loads a spreadsheet of mountain-peak records into a DuckDB store.
//!
//! One linear pipeline: read the workbook, rename and keep the six peak
//! columns, replace the `peaks` table in the destination database, and make
//! sure the coordinate index exists.

pub mod loader;

pub use loader::{load_peaks, LoaderError, PeakLoader};
