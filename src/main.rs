use std::path::Path;
use std::process::ExitCode;

use log::{error, info};

// Fixed inputs: the peaks workbook and the DuckDB store it feeds.
const SOURCE_PATH: &str = "peaks.xlsx";
const STORE_PATH: &str = "peaks.duckdb";

fn main() -> ExitCode {
    env_logger::init();

    match peaks_loader::load_peaks(Path::new(SOURCE_PATH), Path::new(STORE_PATH)) {
        Ok(()) => {
            info!("peaks store is up to date");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("peaks load failed: {e}");
            ExitCode::FAILURE
        }
    }
}
