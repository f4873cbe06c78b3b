//! Telemetry: buffered, size-rotated heating log.
//!
//! One line per active tick:
//!
//! ```text
//! 2025-06-01T14:03:22.481203\t61.25\t1\n
//! └──── local timestamp ────┘ └ °C ┘ └ heating
//! ```
//!
//! Records are buffered in memory and appended in batches.  The buffer is
//! written automatically when it reaches capacity; an explicit
//! [`TelemetryLogger::flush`] additionally checks the file size and rotates
//! `heating_log.tsv` → `.1` → … → `.K` before writing.  File errors are
//! logged as warnings and the buffer is dropped regardless, so a full disk
//! can never grow memory or stop the control loop.

pub mod record;

pub use record::LogRecord;

use std::ffi::OsString;
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use log::{debug, info, warn};

use crate::config::TelemetryConfig;
use crate::error::LogIoError;

pub struct TelemetryLogger {
    path: PathBuf,
    buffer: Vec<LogRecord>,
    capacity: usize,
    max_bytes: u64,
    backup_count: u32,
}

impl TelemetryLogger {
    /// Create the logger and its parent directory.  A directory that cannot
    /// be created is reported once here and again on every failed write.
    pub fn new(config: &TelemetryConfig) -> Self {
        if let Some(dir) = config.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            if let Err(e) = fs::create_dir_all(dir) {
                warn!("telemetry: cannot create {}: {}", dir.display(), e);
            }
        }
        Self {
            path: config.path.clone(),
            buffer: Vec::with_capacity(config.buffer_size),
            capacity: config.buffer_size.max(1),
            max_bytes: config.max_bytes,
            backup_count: config.backup_count,
        }
    }

    /// Record one sample stamped with the current local time.
    pub fn log(&mut self, temperature: f32, heating: bool) {
        self.push(LogRecord::now(temperature, heating));
    }

    /// Buffer a record, writing the batch out once the buffer is full.
    pub fn push(&mut self, record: LogRecord) {
        self.buffer.push(record);
        if self.buffer.len() >= self.capacity {
            self.write_buffer();
        }
    }

    /// Rotate if the file has outgrown `max_bytes`, then write whatever is
    /// buffered.  Never fails; the buffer is always empty afterwards.
    pub fn flush(&mut self) {
        match self.rotate_if_needed() {
            Ok(true) => info!("telemetry: rotated {}", self.path.display()),
            Ok(false) => {}
            Err(e) => warn!("{}", e),
        }
        if !self.buffer.is_empty() {
            self.write_buffer();
        }
    }

    /// Records waiting to be written.
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Path of the `n`-th backup (`heating_log.tsv.n`).
    pub fn backup_path(&self, n: u32) -> PathBuf {
        let mut name = OsString::from(self.path.as_os_str());
        name.push(format!(".{}", n));
        PathBuf::from(name)
    }

    fn write_buffer(&mut self) {
        match self.append_buffer() {
            Ok(()) => debug!("telemetry: wrote {} records", self.buffer.len()),
            Err(e) => warn!("{}; dropping {} records", e, self.buffer.len()),
        }
        self.buffer.clear();
    }

    fn append_buffer(&self) -> Result<(), LogIoError> {
        let write = || -> io::Result<()> {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&self.path)?;
            let mut out = BufWriter::new(file);
            for record in &self.buffer {
                out.write_all(record.to_line().as_bytes())?;
            }
            out.flush()
        };
        write().map_err(|source| LogIoError::Write {
            path: self.path.clone(),
            source,
        })
    }

    fn rotate_if_needed(&self) -> Result<bool, LogIoError> {
        let rotate_err = |source| LogIoError::Rotate {
            path: self.path.clone(),
            source,
        };

        let size = match fs::metadata(&self.path) {
            Ok(meta) => meta.len(),
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(false),
            Err(e) => return Err(rotate_err(e)),
        };
        if size <= self.max_bytes {
            return Ok(false);
        }

        // .K-1 → .K first so nothing is overwritten before it has moved.
        for n in (1..self.backup_count).rev() {
            let src = self.backup_path(n);
            if src.exists() {
                fs::rename(&src, self.backup_path(n + 1)).map_err(rotate_err)?;
            }
        }
        fs::rename(&self.path, self.backup_path(1)).map_err(rotate_err)?;
        File::create(&self.path).map_err(rotate_err)?;
        Ok(true)
    }
}
