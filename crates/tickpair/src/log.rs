use crate::CombinedRecord;
use std::{
    fs::{File, OpenOptions},
    io::{self, BufWriter, Write},
    path::Path,
};

/// Append-only sink for combined records.
///
/// Each appended line carries, at minimum: the sequence number, the
/// token's generation timestamp, the token string, the capture timestamp,
/// and the captured value. The exact column layout is for human
/// inspection only and is not load-bearing.
///
/// The caller owns sequence assignment; the log just writes what it is
/// given. Appends happen inside the capture critical section, so
/// implementations do not need their own locking.
pub trait DurableLog {
    /// Appends one record under the given sequence number.
    fn append(&mut self, sequence: u64, record: &CombinedRecord) -> io::Result<()>;
}

/// A [`DurableLog`] writing one line per record to a file.
///
/// Writes are buffered but flushed per append, so a record either made it
/// to the OS or the append reports an error.
#[derive(Debug)]
pub struct FileLog {
    writer: BufWriter<File>,
}

impl FileLog {
    /// Opens `path` for a fresh run, truncating any stale file from a
    /// previous session. Sequence numbers restart at zero, so appending
    /// to old contents would interleave two numbering runs.
    pub fn create<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(path)?;
        Ok(Self {
            writer: BufWriter::new(file),
        })
    }
}

impl DurableLog for FileLog {
    fn append(&mut self, sequence: u64, record: &CombinedRecord) -> io::Result<()> {
        writeln!(self.writer, "Line {sequence}: {record}")?;
        self.writer.flush()
    }
}

/// A [`DurableLog`] collecting lines in memory, for tests.
#[derive(Debug, Default)]
pub struct MemoryLog {
    lines: Vec<String>,
}

impl MemoryLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// The appended lines, in append order.
    pub fn lines(&self) -> &[String] {
        &self.lines
    }
}

impl DurableLog for MemoryLog {
    fn append(&mut self, sequence: u64, record: &CombinedRecord) -> io::Result<()> {
        self.lines.push(format!("Line {sequence}: {record}"));
        Ok(())
    }
}

/// A [`DurableLog`] that rejects every append, for exercising the
/// append-failure path in tests.
#[derive(Debug, Default)]
pub struct FailingLog;

impl DurableLog for FailingLog {
    fn append(&mut self, _sequence: u64, _record: &CombinedRecord) -> io::Result<()> {
        Err(io::Error::other("append rejected"))
    }
}
