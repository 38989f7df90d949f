use std::{
    io,
    path::{Path, PathBuf},
};

use thiserror::Error;

use crate::Status;

/// Errors raised by [`Logger`](crate::Logger) lifecycle calls.
#[derive(Debug, Error)]
pub enum LoggerError {
    /// A lifecycle method was called in a status that does not allow it.
    #[error("cannot call {operation}() on a logger that is {status}")]
    State {
        operation: &'static str,
        status: Status,
    },
    /// Another logger already owns the process streams.
    #[error(
        "log '{}' currently active. Close it before initializing a new one",
        .active.display()
    )]
    Conflict { active: PathBuf },
    #[error("cannot open log file '{}'", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Errors raised while reading, compiling or running a script.
#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("cannot read script '{}'", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("syntax error in {}: {source}", location(.path, *.line))]
    Parse {
        path: PathBuf,
        line: Option<usize>,
        column: Option<usize>,
        #[source]
        source: rhai::ParseError,
    },
    /// The script raised an error; `source` is the engine's error as raised.
    #[error("error in {}: {source}", location(.path, *.line))]
    Runtime {
        path: PathBuf,
        line: Option<usize>,
        column: Option<usize>,
        #[source]
        source: Box<rhai::EvalAltResult>,
    },
}

impl ScriptError {
    /// The script the error comes from.
    pub fn path(&self) -> &Path {
        match self {
            ScriptError::Io { path, .. }
            | ScriptError::Parse { path, .. }
            | ScriptError::Runtime { path, .. } => path,
        }
    }

    /// Line in the script, when the error has a position.
    pub fn line(&self) -> Option<usize> {
        match self {
            ScriptError::Io { .. } => None,
            ScriptError::Parse { line, .. } | ScriptError::Runtime { line, .. } => *line,
        }
    }
}

fn location(path: &Path, line: Option<usize>) -> String {
    match line {
        Some(line) => format!("{}, line {line}", path.display()),
        None => path.display().to_string(),
    }
}
