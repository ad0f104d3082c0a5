//! Input/Output for average-atom calculations
//!
//! This module handles logging setup, the text report and CSV export.

mod export;
mod output;
pub mod report;

pub use export::{density_to_csv, potential_to_csv, write_fields, DENSITY_FILE, POTENTIAL_FILE};
pub use output::setup_output;
