//! The observation report stream.
//!
//! One line per emitted observation, in a stable textual format:
//!
//! ```text
//! YYYY-MM-DD HH:MM:SS.mmm - LEVEL - Status: <STATUS>, Game: <name>, Speed: <speed> MB/s
//! ```
//!
//! The stream goes to stdout by default, or to a file with size-based
//! rotation. Diagnostics never appear here; they go to stderr via
//! [`crate::logging`]. Consumers parse these lines, so the format only
//! changes deliberately.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

use crate::diff::Throughput;
use crate::status::StatusClass;

/// Rotate the report file once an append would push it past this size.
pub const ROTATE_AT_BYTES: u64 = 10 * 1024 * 1024;
/// Backups kept as `<file>.1` (newest) through `<file>.5` (oldest).
pub const ROTATE_BACKUPS: u32 = 5;

/// Severity of a report line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Info,
    Warning,
    Error,
}

impl Level {
    pub fn as_str(self) -> &'static str {
        match self {
            Level::Info => "INFO",
            Level::Warning => "WARNING",
            Level::Error => "ERROR",
        }
    }
}

/// One per-title measurement, ready to emit. Built fresh each tick and
/// never mutated afterwards.
#[derive(Debug, Clone)]
pub struct Observation {
    pub timestamp: DateTime<Utc>,
    pub name: String,
    pub status: StatusClass,
    pub speed: Throughput,
}

impl Observation {
    /// The observation emitted when no title is mid-transfer.
    pub fn idle(timestamp: DateTime<Utc>) -> Self {
        Self {
            timestamp,
            name: "None".to_string(),
            status: StatusClass::Idle,
            speed: Throughput::ZERO,
        }
    }

    /// Message part of the report line.
    pub fn message(&self) -> String {
        format!(
            "Status: {}, Game: {}, Speed: {:.2} MB/s",
            self.status,
            self.name,
            self.speed.mb_per_sec()
        )
    }
}

enum Sink {
    Stdout,
    File(RotatingFile),
    Writer(Box<dyn Write + Send>),
}

/// Writer for the report stream. Owns the sink for the life of the run.
pub struct Reporter {
    sink: Sink,
}

impl Reporter {
    pub fn stdout() -> Self {
        Self { sink: Sink::Stdout }
    }

    /// Report to `path` with rotation. The file (and its parent directory)
    /// is created now so permission problems surface at startup.
    pub fn to_file(path: impl Into<PathBuf>) -> io::Result<Self> {
        Ok(Self {
            sink: Sink::File(RotatingFile::open(path.into())?),
        })
    }

    /// Report into an arbitrary writer. Used by tests to capture the stream.
    pub fn to_writer(writer: Box<dyn Write + Send>) -> Self {
        Self {
            sink: Sink::Writer(writer),
        }
    }

    /// Emits one observation at INFO level.
    pub fn observe(&mut self, observation: &Observation) -> io::Result<()> {
        self.emit(observation.timestamp, Level::Info, &observation.message())
    }

    /// Emits an arbitrary report line.
    pub fn emit(
        &mut self,
        timestamp: DateTime<Utc>,
        level: Level,
        message: &str,
    ) -> io::Result<()> {
        let line = format!(
            "{} - {} - {}\n",
            timestamp.format("%Y-%m-%d %H:%M:%S%.3f"),
            level.as_str(),
            message
        );
        match &mut self.sink {
            Sink::Stdout => {
                let mut out = io::stdout().lock();
                out.write_all(line.as_bytes())?;
                out.flush()
            }
            Sink::File(file) => file.append(&line),
            Sink::Writer(writer) => {
                writer.write_all(line.as_bytes())?;
                writer.flush()
            }
        }
    }
}

/// Append-only report file with size-based rotation. The file is opened per
/// append, so no handle is held across the backup renames.
struct RotatingFile {
    path: PathBuf,
    rotate_at: u64,
}

impl RotatingFile {
    fn open(path: PathBuf) -> io::Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        OpenOptions::new().create(true).append(true).open(&path)?;
        Ok(Self {
            path,
            rotate_at: ROTATE_AT_BYTES,
        })
    }

    fn append(&self, line: &str) -> io::Result<()> {
        let size = fs::metadata(&self.path).map(|m| m.len()).unwrap_or(0);
        if size > 0 && size + line.len() as u64 > self.rotate_at {
            self.rotate()?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.write_all(line.as_bytes())
    }

    /// Shifts `file -> file.1 -> ... -> file.5`, dropping the oldest.
    fn rotate(&self) -> io::Result<()> {
        let oldest = backup_path(&self.path, ROTATE_BACKUPS);
        if oldest.exists() {
            fs::remove_file(&oldest)?;
        }
        for index in (1..ROTATE_BACKUPS).rev() {
            let from = backup_path(&self.path, index);
            if from.exists() {
                fs::rename(&from, backup_path(&self.path, index + 1))?;
            }
        }
        fs::rename(&self.path, backup_path(&self.path, 1))
    }
}

fn backup_path(path: &Path, index: u32) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(format!(".{index}"));
    PathBuf::from(name)
}
