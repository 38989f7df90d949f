//! Process-wide output streams.
//!
//! The process owns one current stdout target and one current stderr target,
//! both starting as the console. Writes made through [`write_stdout`],
//! [`write_stderr`] or the `tprint*!` macros go to whatever target is current.
//!
//! A [`Logger`](crate::Logger) redirects the streams by claiming the slot held
//! here; at most one logger holds it at a time.

use std::{
    io,
    path::{Path, PathBuf},
    sync::{LazyLock, Mutex, MutexGuard, PoisonError},
};

use transcript_core::Target;
use uuid::Uuid;

use crate::LoggerError;

struct Streams {
    stdout: Target,
    stderr: Target,
    owner: Option<Owner>,
}

/// The logger currently holding the redirection slot.
struct Owner {
    id: Uuid,
    path: PathBuf,
}

static STREAMS: LazyLock<Mutex<Streams>> = LazyLock::new(|| {
    Mutex::new(Streams {
        stdout: Target::stdout(),
        stderr: Target::stderr(),
        owner: None,
    })
});

fn streams() -> MutexGuard<'static, Streams> {
    STREAMS.lock().unwrap_or_else(PoisonError::into_inner)
}

/// A stdout/stderr pair of targets.
#[derive(Debug, Clone)]
pub(crate) struct StreamPair {
    pub stdout: Target,
    pub stderr: Target,
}

/// The current stdout target.
pub fn stdout() -> Target {
    streams().stdout.clone()
}

/// The current stderr target.
pub fn stderr() -> Target {
    streams().stderr.clone()
}

/// Installs `target` as the current stdout and returns the previous one.
///
/// A live logger restores the targets it saved at `init()` when it is paused
/// or closed, so a target swapped in meanwhile does not survive that.
pub fn set_stdout(target: Target) -> Target {
    std::mem::replace(&mut streams().stdout, target)
}

/// Installs `target` as the current stderr and returns the previous one.
pub fn set_stderr(target: Target) -> Target {
    std::mem::replace(&mut streams().stderr, target)
}

/// Writes a whole message to the current stdout target and flushes it.
pub fn write_stdout(message: &str) -> io::Result<()> {
    stdout().write_message(message)
}

/// Writes a whole message to the current stderr target and flushes it.
pub fn write_stderr(message: &str) -> io::Result<()> {
    stderr().write_message(message)
}

#[doc(hidden)]
pub fn print_stdout(message: &str) {
    if let Err(err) = write_stdout(message) {
        panic!("failed printing to stdout: {err}");
    }
}

#[doc(hidden)]
pub fn print_stderr(message: &str) {
    if let Err(err) = write_stderr(message) {
        panic!("failed printing to stderr: {err}");
    }
}

/// Whether a logger currently holds the redirection slot.
pub fn is_redirected() -> bool {
    streams().owner.is_some()
}

/// Absolute path of the log file of the logger holding the slot.
pub fn active_log_path() -> Option<PathBuf> {
    streams().owner.as_ref().map(|owner| owner.path.clone())
}

/// Claims the slot for logger `id` and installs the pair built by `redirect`
/// from the current targets. Returns the targets that were current before,
/// together with whatever `redirect` produced.
///
/// Nothing changes when the slot is taken or `redirect` fails.
pub(crate) fn claim<T, F>(
    id: Uuid,
    path: &Path,
    redirect: F,
) -> Result<(StreamPair, T), LoggerError>
where
    F: FnOnce(&StreamPair) -> Result<(StreamPair, T), LoggerError>,
{
    let mut streams = streams();
    if let Some(owner) = &streams.owner {
        return Err(LoggerError::Conflict {
            active: owner.path.clone(),
        });
    }
    let saved = StreamPair {
        stdout: streams.stdout.clone(),
        stderr: streams.stderr.clone(),
    };
    let (installed, extra) = redirect(&saved)?;
    streams.stdout = installed.stdout;
    streams.stderr = installed.stderr;
    streams.owner = Some(Owner {
        id,
        path: path.to_path_buf(),
    });
    Ok((saved, extra))
}

/// Installs `pair` on behalf of the slot owner `id`.
pub(crate) fn install(id: Uuid, pair: &StreamPair) {
    if !switch(id, pair, false) {
        log::warn!("ignoring stream switch from a logger that does not own the streams");
    }
}

/// Restores `saved` and frees the slot held by `id`.
pub(crate) fn release(id: Uuid, saved: &StreamPair) {
    if !switch(id, saved, true) {
        log::warn!("ignoring release from a logger that does not own the streams");
    }
}

// Must not log while the lock is held: the `log` bridge writes through it.
fn switch(id: Uuid, pair: &StreamPair, release: bool) -> bool {
    let mut streams = streams();
    if !streams.owner.as_ref().is_some_and(|owner| owner.id == id) {
        return false;
    }
    streams.stdout = pair.stdout.clone();
    streams.stderr = pair.stderr.clone();
    if release {
        streams.owner = None;
    }
    true
}
