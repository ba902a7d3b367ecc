//! File-based logging for the CLI.
//!
//! Logs land under the data directory next to the database. Initialization
//! failures are reported on stderr and the CLI keeps running without logs.

use flexi_logger::{Cleanup, Criterion, FileSpec, Logger, LoggerHandle, Naming};
use momentum_core::storage::data_dir;

const MAX_LOG_FILE_SIZE_BYTES: u64 = 10 * 1024 * 1024;
const MAX_LOG_FILES: usize = 5;

/// The handle must stay alive for the lifetime of the process.
pub fn init() -> Option<LoggerHandle> {
    let dir = match data_dir() {
        Ok(dir) => dir.join("logs"),
        Err(e) => {
            eprintln!("warning: no data directory for logs: {e}");
            return None;
        }
    };
    let spec = std::env::var("MOMENTUM_LOG").unwrap_or_else(|_| "info".to_string());
    let result = Logger::try_with_str(&spec).and_then(|logger| {
        logger
            .log_to_file(FileSpec::default().directory(&dir).basename("momentum"))
            .rotate(
                Criterion::Size(MAX_LOG_FILE_SIZE_BYTES),
                Naming::Numbers,
                Cleanup::KeepLogFiles(MAX_LOG_FILES),
            )
            .start()
    });
    match result {
        Ok(handle) => {
            log::debug!("logging to {}", dir.display());
            Some(handle)
        }
        Err(e) => {
            eprintln!("warning: logging disabled: {e}");
            None
        }
    }
}
