use std::{fmt, path::Path};

use chrono::{DateTime, Local};
use colored::Colorize;
use log::Level;

/// Width of the dashed rules framing a status banner.
pub const RULE_WIDTH: usize = 130;
/// Time format used in status banners, e.g. `16 Oct 2026, 09:15:02`.
pub const BANNER_TIME_FORMAT: &str = "%d %b %Y, %H:%M:%S";
/// Time format of the line appended after stamped messages.
pub const STAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A logging session transition announced with a status banner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Opened,
    Resumed,
    Paused,
    Closed,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Opened => "opened",
            Action::Resumed => "resumed",
            Action::Paused => "paused",
            Action::Closed => "closed",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Builds the banner written when a session is opened, resumed, paused or closed.
///
/// ```text
/// ----------------...
///        log:  /abs/path/session.log
///  opened on:  16 Oct 2026, 09:15:02
/// ----------------...
/// ```
pub fn status_banner(action: Action, log_path: &Path, now: DateTime<Local>) -> String {
    let rule = "-".repeat(RULE_WIDTH);
    // keeps the "log:" and "<action> on:" colons aligned
    let indent = " ".repeat(action.as_str().len() + 1);
    format!(
        "\n{rule}\n{indent}log:  {}\n {action} on:  {}\n{rule}\n\n",
        log_path.display(),
        now.format(BANNER_TIME_FORMAT)
    )
}

/// Appends a `[timestamp]` line after `message`.
///
/// A message that already ends with a newline gets no extra blank line before
/// the stamp: `"x\n"` becomes `"x\n[ts]\n"`, not `"x\n\n[ts]\n"`. The
/// `tprint*!` macros write each message in one piece, so always inserting a
/// newline would leave a blank line after every `tprintln!`.
pub fn stamp_message(message: &str, now: DateTime<Local>) -> String {
    let separator = if message.ends_with('\n') { "" } else { "\n" };
    format!("{message}{separator}[{}]\n", now.format(STAMP_FORMAT))
}

/// Formats a `log` record line; levels are colored only when `colorize` is set.
pub fn format_log(message: &str, level: Level, colorize: bool) -> String {
    let time = Local::now().format("%Y-%m-%dT%H:%M:%S%.3f");
    let label = level.as_str();
    let label = if colorize {
        match level {
            Level::Error => label.red(),
            Level::Warn => label.yellow(),
            Level::Info => label.green(),
            Level::Debug => label.blue(),
            Level::Trace => label.purple(),
        }
        .to_string()
    } else {
        label.to_string()
    };
    format!("[{time} {label}] {message}")
}
