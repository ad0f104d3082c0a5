//! Logging setup

use crate::error::{AvAtomError, Result};
use std::fmt;
use std::fs::File;
use std::path::PathBuf;
use std::time::SystemTime as StdSystemTime;
use tracing::info;
use tracing_subscriber::{
    filter::LevelFilter, fmt::format::Writer, fmt::layer, fmt::time::FormatTime,
    layer::SubscriberExt, util::SubscriberInitExt, Layer, Registry,
};

/// Custom time formatter that shows only seconds
struct SecondPrecisionTimer;

impl FormatTime for SecondPrecisionTimer {
    fn format_time(&self, w: &mut Writer<'_>) -> fmt::Result {
        let now = StdSystemTime::now();
        let duration = now
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default();

        // HH:MM:SS
        let total_seconds = duration.as_secs();
        let hours = (total_seconds / 3600) % 24;
        let minutes = (total_seconds / 60) % 60;
        let seconds = total_seconds % 60;

        write!(w, "{:02}:{:02}:{:02}", hours, minutes, seconds)
    }
}

/// Route log output to `output_path`, or to stdout when `None`.
///
/// Only the first call installs a subscriber; later calls are ignored so that
/// several runs can share one process.
pub fn setup_output(output_path: Option<&str>, verbose: bool) -> Result<()> {
    let level = if verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    };

    match output_path {
        Some(path) => {
            let log = File::create(path).map_err(|source| AvAtomError::Io {
                path: PathBuf::from(path),
                source,
            })?;
            let file_layer = layer()
                .with_writer(log)
                .with_timer(SecondPrecisionTimer)
                .with_ansi(false)
                .with_target(false)
                .with_filter(level);
            if Registry::default().with(file_layer).try_init().is_ok() {
                info!("Output will be written to: {}", path);
            }
        }
        None => {
            let stdout_layer = layer()
                .with_writer(std::io::stdout)
                .with_timer(SecondPrecisionTimer)
                .with_ansi(true)
                .with_target(false)
                .with_filter(level);
            if Registry::default().with(stdout_layer).try_init().is_ok() {
                info!("Output will be printed to stdout");
            }
        }
    }
    Ok(())
}
