use std::io::{self, Write};

use crate::{LogFileHandle, Target};

/// Duplicates everything written to it: the console target receives the bytes
/// verbatim, the log file receives them (optionally timestamped).
#[derive(Debug)]
pub struct Tee {
    console: Target,
    file: LogFileHandle,
    stamp: bool,
}

impl Tee {
    pub fn new(console: Target, file: LogFileHandle, stamp: bool) -> Self {
        Self {
            console,
            file,
            stamp,
        }
    }

    /// Wraps the tee into a target ready to be installed as a process stream.
    pub fn into_target(self, label: &str) -> Target {
        Target::from_writer(label, self)
    }
}

impl Write for Tee {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.console.write_all(buf)?;
        self.file.write_bytes(buf, self.stamp)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.console.flush()?;
        self.file.flush()
    }
}
