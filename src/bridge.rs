//! Routes `log` records into the process-wide stderr target, so that records
//! emitted while a [`Logger`](crate::Logger) is active end up in its file.
//!
//! ```rust,no_run
//! transcript::bridge::init(log::LevelFilter::Info).unwrap();
//! log::info!("goes to stderr, and to the transcript when one is active");
//! ```

use log::{LevelFilter, Log, Metadata, Record, SetLoggerError};
use transcript_core::{Target, format_log};

use crate::streams;

struct TranscriptLog;

impl Log for TranscriptLog {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let target = streams::stderr();
        // escape codes only ever reach the bare console, never a log file
        let colorize = target.ptr_eq(&Target::stderr());
        let line = format_log(&record.args().to_string(), record.level(), colorize);
        target.write_message(&format!("{line}\n")).ok();
    }

    fn flush(&self) {}
}

/// Installs the bridge as the global `log` logger with the given max level.
///
/// Fails if a global logger was already set.
pub fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
    log::set_boxed_logger(Box::new(TranscriptLog))?;
    log::set_max_level(level);
    Ok(())
}
