use std::{
    fmt,
    path::{Path, PathBuf},
};

use chrono::Local;
use transcript_core::{Action, LogFile, LogFileHandle, Tee, status_banner};
use uuid::Uuid;

use crate::{
    LoggerError,
    streams::{self, StreamPair},
};

/// Lifecycle status of a [`Logger`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// Constructed, no file opened yet.
    Uninitialized,
    /// Output is written to the console and the log file.
    Active,
    /// Output is written to the console only; the log file stays open.
    Paused,
    /// File closed and streams restored. The logger cannot be reused.
    Closed,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let status = match self {
            Status::Uninitialized => "uninitialized",
            Status::Active => "active",
            Status::Paused => "paused",
            Status::Closed => "closed",
        };
        f.write_str(status)
    }
}

/// An open logging session.
struct Session {
    /// Absolute path of the log file, as shown in banners.
    path: PathBuf,
    file: LogFileHandle,
    /// Targets that were current before `init()`.
    saved: StreamPair,
    /// Tee targets installed while active.
    tees: StreamPair,
    paused: bool,
}

impl Session {
    /// Writes a status banner to the console saved at `init()`, and to the
    /// file as well when `to_file` is set.
    fn announce(&self, action: Action, to_file: bool) {
        let banner = status_banner(action, &self.path, Local::now());
        if to_file {
            if let Err(err) = self.file.write_bytes(banner.as_bytes(), false) {
                log::warn!("unable to write status to {}: {err}", self.path.display());
            }
        }
        if let Err(err) = self.saved.stdout.write_message(&banner) {
            log::warn!("unable to write status to the console: {err}");
        }
        log::debug!("log {action}: {}", self.path.display());
    }
}

enum Phase {
    Uninitialized,
    Live(Session),
    Closed,
}

/// Redirects the process-wide stdout and stderr to a log file.
///
/// Only one logger may be active or paused at a time across the process.
/// A logger goes through `new` → `init` → (`off` / `on`)* → `close`; once
/// closed it cannot be initialized again. Dropping a live logger closes it.
///
/// ```rust,no_run
/// use transcript::{Logger, Status, tprintln};
///
/// let path = std::env::temp_dir().join("transcript_doc_logger.log");
/// let mut logger = Logger::new(&path, false).with_timestamps(false);
/// assert_eq!(logger.status(), Status::Uninitialized);
/// logger.init().unwrap();
/// tprintln!("hello");
/// logger.close().unwrap();
/// assert_eq!(std::fs::read_to_string(&path).unwrap(), "hello\n");
/// ```
pub struct Logger {
    id: Uuid,
    log_file: PathBuf,
    append: bool,
    timestamps: bool,
    file_banners: bool,
    phase: Phase,
}

impl Logger {
    /// Prepares a logger for `log_file`. No file is opened until [`Logger::init`].
    pub fn new<P: AsRef<Path>>(log_file: P, append: bool) -> Self {
        Self {
            id: Uuid::new_v4(),
            log_file: log_file.as_ref().to_path_buf(),
            append,
            timestamps: false,
            file_banners: false,
            phase: Phase::Uninitialized,
        }
    }

    /// Follow every non-blank stdout message in the file with a `[timestamp]` line.
    pub fn with_timestamps(mut self, yes: bool) -> Self {
        self.timestamps = yes;
        self
    }

    /// Also write the opened/paused/resumed/closed banners to the file.
    pub fn with_file_banners(mut self, yes: bool) -> Self {
        self.file_banners = yes;
        self
    }

    pub fn path(&self) -> &Path {
        &self.log_file
    }

    pub fn status(&self) -> Status {
        match &self.phase {
            Phase::Uninitialized => Status::Uninitialized,
            Phase::Live(session) if session.paused => Status::Paused,
            Phase::Live(_) => Status::Active,
            Phase::Closed => Status::Closed,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status() == Status::Active
    }

    /// Opens the log file and redirects stdout and stderr to it.
    ///
    /// Fails with [`LoggerError::Conflict`] while another logger is active or
    /// paused, leaving that session untouched and this logger uninitialized.
    pub fn init(&mut self) -> Result<(), LoggerError> {
        let status = self.status();
        if status != Status::Uninitialized {
            return Err(LoggerError::State {
                operation: "init",
                status,
            });
        }
        let path =
            std::path::absolute(&self.log_file).unwrap_or_else(|_| self.log_file.clone());
        let (saved, (file, tees)) = streams::claim(self.id, &path, |saved| {
            let file = LogFile::open(&self.log_file, self.append).map_err(|source| {
                LoggerError::Io {
                    path: path.clone(),
                    source,
                }
            })?;
            let file = LogFileHandle::new(file);
            let tees = StreamPair {
                stdout: Tee::new(saved.stdout.clone(), file.clone(), self.timestamps)
                    .into_target("stdout tee"),
                stderr: Tee::new(saved.stderr.clone(), file.clone(), false)
                    .into_target("stderr tee"),
            };
            Ok((tees.clone(), (file, tees)))
        })?;
        let session = Session {
            path,
            file,
            saved,
            tees,
            paused: false,
        };
        session.announce(Action::Opened, self.file_banners);
        self.phase = Phase::Live(session);
        Ok(())
    }

    /// Resumes writing to the log file after [`Logger::off`].
    pub fn on(&mut self) -> Result<(), LoggerError> {
        let status = self.status();
        let Phase::Live(session) = &mut self.phase else {
            return Err(LoggerError::State {
                operation: "on",
                status,
            });
        };
        if !session.paused {
            log::warn!("log file already on");
            return Ok(());
        }
        streams::install(self.id, &session.tees);
        session.paused = false;
        session.announce(Action::Resumed, self.file_banners);
        Ok(())
    }

    /// Restores console-only output. The file stays open and receives nothing
    /// until [`Logger::on`].
    pub fn off(&mut self) -> Result<(), LoggerError> {
        let status = self.status();
        let Phase::Live(session) = &mut self.phase else {
            return Err(LoggerError::State {
                operation: "off",
                status,
            });
        };
        if session.paused {
            log::warn!("log file already off");
            return Ok(());
        }
        session.announce(Action::Paused, self.file_banners);
        streams::install(self.id, &session.saved);
        session.paused = true;
        Ok(())
    }

    /// Restores the streams saved at `init()`, closes the file and frees the
    /// slot for another logger.
    pub fn close(&mut self) -> Result<(), LoggerError> {
        let session = match std::mem::replace(&mut self.phase, Phase::Closed) {
            Phase::Live(session) => session,
            phase => {
                self.phase = phase;
                log::warn!("log file is not open");
                return Ok(());
            }
        };
        session.announce(Action::Closed, self.file_banners);
        streams::release(self.id, &session.saved);
        session.file.close().map_err(|source| LoggerError::Io {
            path: session.path.clone(),
            source,
        })
    }
}

impl Drop for Logger {
    fn drop(&mut self) {
        if matches!(self.phase, Phase::Live(_)) {
            if let Err(err) = self.close() {
                log::warn!("{err}");
            }
        }
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("log_file", &self.log_file)
            .field("append", &self.append)
            .field("status", &self.status())
            .finish()
    }
}
