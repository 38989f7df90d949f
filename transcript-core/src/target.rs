use std::{
    fmt,
    io::{self, Write},
    sync::{Arc, LazyLock, Mutex, MutexGuard, PoisonError},
};

static STDOUT: LazyLock<Target> = LazyLock::new(|| Target::from_writer("stdout", io::stdout()));
static STDERR: LazyLock<Target> = LazyLock::new(|| Target::from_writer("stderr", io::stderr()));

/// A shared destination for process output.
///
/// Cloning a `Target` yields a handle to the same writer; two handles are the
/// same target when [`Target::ptr_eq`] holds.
#[derive(Clone)]
pub struct Target {
    label: Arc<str>,
    inner: Arc<Mutex<dyn Write + Send>>,
}

impl Target {
    /// Wraps any writer into a shareable target.
    pub fn from_writer<W: Write + Send + 'static>(label: &str, writer: W) -> Self {
        Self {
            label: label.into(),
            inner: Arc::new(Mutex::new(writer)),
        }
    }

    /// The console standard output. Every call returns the same target.
    pub fn stdout() -> Self {
        STDOUT.clone()
    }

    /// The console standard error. Every call returns the same target.
    pub fn stderr() -> Self {
        STDERR.clone()
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Returns true when both handles point to the same writer.
    pub fn ptr_eq(&self, other: &Target) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Writes a whole message under a single lock and flushes it.
    pub fn write_message(&self, message: &str) -> io::Result<()> {
        let mut writer = self.lock();
        writer.write_all(message.as_bytes())?;
        writer.flush()
    }

    fn lock(&self) -> MutexGuard<'_, dyn Write + Send + 'static> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Write for Target {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.lock().write(buf)
    }

    fn write_all(&mut self, buf: &[u8]) -> io::Result<()> {
        self.lock().write_all(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.lock().flush()
    }
}

impl fmt::Debug for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Target").field(&self.label).finish()
    }
}

/// In-memory writer, mostly useful to capture the console in tests.
#[derive(Debug, Clone, Default)]
pub struct SharedBuffer {
    buf: Arc<Mutex<Vec<u8>>>,
}

impl SharedBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// A target writing into this buffer.
    pub fn target(&self) -> Target {
        Target::from_writer("buffer", self.clone())
    }

    pub fn contents(&self) -> Vec<u8> {
        self.buf.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn contents_string(&self) -> String {
        String::from_utf8_lossy(&self.contents()).into_owned()
    }

    pub fn clear(&self) {
        self.buf.lock().unwrap_or_else(PoisonError::into_inner).clear();
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buf
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_console_targets_are_singletons() {
        assert!(Target::stdout().ptr_eq(&Target::stdout()));
        assert!(Target::stderr().ptr_eq(&Target::stderr()));
        assert!(!Target::stdout().ptr_eq(&Target::stderr()));
    }

    #[test]
    fn test_buffer_target_shares_contents() {
        let buffer = SharedBuffer::new();
        let target = buffer.target();
        let mut clone = target.clone();
        target.write_message("hello ").unwrap();
        write!(clone, "world").unwrap();
        assert!(target.ptr_eq(&clone));
        assert_eq!(buffer.contents_string(), "hello world");
        buffer.clear();
        assert!(buffer.contents().is_empty());
    }

    #[test]
    fn test_distinct_buffers_are_distinct_targets() {
        let a = SharedBuffer::new().target();
        let b = SharedBuffer::new().target();
        assert!(!a.ptr_eq(&b));
        assert_eq!(format!("{a:?}"), "Target(\"buffer\")");
    }
}
