use std::{
    fs::File,
    io::{self, BufWriter, Write},
    path::{Path, PathBuf},
    sync::{Arc, Mutex, PoisonError},
};

use chrono::Local;

use crate::utils::stamp_message;

/// A transcript file. Every write is flushed straight away so the file on disk
/// always mirrors what the console has shown.
#[derive(Debug)]
pub struct LogFile {
    path: PathBuf,
    file: BufWriter<File>,
}

impl LogFile {
    /// Opens `path` for writing, truncating it unless `append` is set.
    pub fn open<P: AsRef<Path>>(path: P, append: bool) -> Result<Self, io::Error> {
        let path = path.as_ref().to_path_buf();
        let file = File::options()
            .create(true)
            .write(true)
            .append(append)
            .truncate(!append)
            .open(&path)?;
        Ok(Self {
            path,
            file: BufWriter::new(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.file.write_all(bytes)?;
        self.file.flush()
    }

    /// Writes `text`, followed by a timestamp line when it is not blank.
    pub fn write_stamped(&mut self, text: &str) -> io::Result<()> {
        if text.trim().is_empty() {
            self.write_bytes(text.as_bytes())
        } else {
            self.write_bytes(stamp_message(text, Local::now()).as_bytes())
        }
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.file.flush()
    }
}

/// Shared ownership of a [`LogFile`] that can be closed while other handles
/// (held by tee writers) are still alive. Writes after [`LogFileHandle::close`]
/// are dropped.
#[derive(Debug, Clone)]
pub struct LogFileHandle {
    inner: Arc<Mutex<Option<LogFile>>>,
}

impl LogFileHandle {
    pub fn new(file: LogFile) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Some(file))),
        }
    }

    pub fn is_open(&self) -> bool {
        self.lock().is_some()
    }

    pub fn write_bytes(&self, bytes: &[u8], stamp: bool) -> io::Result<()> {
        match self.lock().as_mut() {
            Some(file) if stamp => file.write_stamped(&String::from_utf8_lossy(bytes)),
            Some(file) => file.write_bytes(bytes),
            None => Ok(()),
        }
    }

    pub fn flush(&self) -> io::Result<()> {
        match self.lock().as_mut() {
            Some(file) => file.flush(),
            None => Ok(()),
        }
    }

    /// Flushes and closes the file. Closing twice is a no-op.
    pub fn close(&self) -> io::Result<()> {
        match self.lock().take() {
            Some(mut file) => file.flush(),
            None => Ok(()),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<LogFile>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
