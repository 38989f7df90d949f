//! # transcript-core
//! Core utilities for transcript - output targets, the log file writer,
//! the tee writer used during redirection and status banner formatting.
//!
//! Nothing in this crate touches process-wide state; the `transcript` crate
//! owns the redirection slot and builds on these pieces.

mod log_writer;
mod target;
mod tee;
mod utils;

pub use log_writer::{LogFile, LogFileHandle};
pub use target::{SharedBuffer, Target};
pub use tee::Tee;
pub use utils::{
    Action, BANNER_TIME_FORMAT, RULE_WIDTH, STAMP_FORMAT, format_log, stamp_message,
    status_banner,
};
