//! # transcript
//! Console transcripts written to a log file, with pause/resume, and a script
//! runner that keeps a script's own path in its errors.
//!
//! ## Usage
//! ```toml
//! // Cargo.toml
//! ...
//! [dependencies]
//! transcript = "0.1.0"
//! ```
//!
//! Output written with the `tprint*!` macros goes through the process-wide
//! streams. While a [`Logger`] is active, everything also lands in its file.
//!
//! ```rust
//! use transcript::{Logger, tprintln};
//!
//! let path = std::env::temp_dir().join("transcript_doc_usage.log");
//! let mut session = Logger::new(&path, false);
//! session.init().expect("Unable to open log file");
//! tprintln!("kept in the transcript");
//! session.off().unwrap();
//! tprintln!("console only");
//! session.on().unwrap();
//! tprintln!("kept again");
//! session.close().unwrap();
//! assert_eq!(
//!     std::fs::read_to_string(&path).unwrap(),
//!     "kept in the transcript\nkept again\n"
//! );
//! ```
//!
//! ## Single active logger
//! Only one logger may own the streams at a time; a second `init()` fails
//! until the first one is closed.
//!
//! ```rust,no_run
//! use transcript::{Logger, LoggerError};
//!
//! let dir = std::env::temp_dir();
//! let mut first = Logger::new(dir.join("transcript_doc_first.log"), false);
//! let mut second = Logger::new(dir.join("transcript_doc_second.log"), false);
//! first.init().unwrap();
//! assert!(matches!(second.init(), Err(LoggerError::Conflict { .. })));
//! first.close().unwrap();
//! second.init().unwrap();
//! second.close().unwrap();
//! ```
//!
//! ## Running scripts
//! Scripts are [Rhai](https://rhai.rs) source files. They see their own
//! absolute path as `__file__`, and errors point back to the script file.
//!
//! ```rust,no_run
//! transcript::run_script("analysis/01_clean.rhai").unwrap();
//! ```

pub mod bridge;
mod error;
mod logger;
mod runner;
pub mod streams;

pub use error::{LoggerError, ScriptError};
pub use logger::{Logger, Status};
pub use runner::{ScriptRunner, run_script};
pub use transcript_core::{SharedBuffer, Target};

/// Prints to the process-wide stdout target.
///
/// Panics if writing fails, like `print!`; use
/// [`streams::write_stdout`] to handle the error instead.
#[macro_export]
macro_rules! tprint {
    ($($arg:tt)*) => {{
        $crate::streams::print_stdout(&::std::format!($($arg)*));
    }};
}

/// Prints to the process-wide stdout target, with a newline.
#[macro_export]
macro_rules! tprintln {
    () => {
        $crate::tprint!("\n")
    };
    ($($arg:tt)*) => {{
        $crate::streams::print_stdout(
            &::std::format!("{}\n", ::std::format_args!($($arg)*)),
        );
    }};
}

/// Prints to the process-wide stderr target.
///
/// Panics if writing fails, like `eprint!`.
#[macro_export]
macro_rules! teprint {
    ($($arg:tt)*) => {{
        $crate::streams::print_stderr(&::std::format!($($arg)*));
    }};
}

/// Prints to the process-wide stderr target, with a newline.
#[macro_export]
macro_rules! teprintln {
    () => {
        $crate::teprint!("\n")
    };
    ($($arg:tt)*) => {{
        $crate::streams::print_stderr(
            &::std::format!("{}\n", ::std::format_args!($($arg)*)),
        );
    }};
}
