use parking_lot::Mutex;
use std::io::{self, Write};
use std::sync::Arc;

/// Destination for rendered log lines.
///
/// A sink is not required to write a line atomically: concurrent calls may
/// interleave their bytes. Loggers in exclusive mode serialize calls to
/// `write_line` so that each line lands whole.
pub trait LogSink: Send + Sync {
    /// Write one line. `line` carries no trailing newline; the sink adds it.
    fn write_line(&self, line: &str) -> io::Result<()>;

    /// Flush buffered output, if any. Default implementation is a no-op.
    fn flush(&self) -> io::Result<()> {
        Ok(())
    }
}

/// Writes lines to the process standard output.
#[derive(Clone, Copy, Default, Debug)]
pub struct StdoutSink;

impl LogSink for StdoutSink {
    fn write_line(&self, line: &str) -> io::Result<()> {
        let mut out = io::stdout();
        out.write_all(line.as_bytes())?;
        out.write_all(b"\n")
    }

    fn flush(&self) -> io::Result<()> {
        io::stdout().flush()
    }
}

/// Collects lines in memory. Clones share the same buffer.
#[derive(Clone, Default, Debug)]
pub struct BufferSink {
    buffer: Arc<Mutex<Vec<u8>>>,
}

impl BufferSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything written so far.
    pub fn contents(&self) -> Vec<u8> {
        self.buffer.lock().clone()
    }

    pub fn contents_string(&self) -> String {
        String::from_utf8_lossy(&self.buffer.lock()).into_owned()
    }

    pub fn lines(&self) -> Vec<String> {
        self.contents_string().lines().map(str::to_string).collect()
    }

    pub fn clear(&self) {
        self.buffer.lock().clear();
    }
}

impl LogSink for BufferSink {
    fn write_line(&self, line: &str) -> io::Result<()> {
        let mut buffer = self.buffer.lock();
        buffer.extend_from_slice(line.as_bytes());
        buffer.push(b'\n');
        Ok(())
    }
}
