//! Splitting large record files into bounded shards.
//!
//! Shards are named `<stem>-shard-<start>-<end>.mrc`, where `start` is the
//! number of records written before the shard and `end` is `start` plus the
//! shard size. Suppressed records are copied like any other but counted, so
//! the summary shows how many will be dropped at indexing time.

use crate::batch::{progress_tick, ErrorLog};
use crate::error::{Error, Result};
use crate::extract::is_suppressed;
use crate::formats::{Compression, FormatReader};
use crate::record::Record;
use crate::tables::IdentifierRules;
use crate::writer::MarcWriter;
use std::fmt;
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

/// Default records per shard.
pub const DEFAULT_SHARD_SIZE: usize = 100_000;

/// Counters for one sharding run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShardStats {
    /// Records read, including ones that failed
    pub records: usize,
    /// Records carrying the suppression marker
    pub suppressed: usize,
    /// Records that could not be read or written
    pub errors: usize,
    /// Shard files created, in order
    pub shards: Vec<PathBuf>,
}

impl fmt::Display for ShardStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Finished sharding: {} records, {} suppressed, {} errors, {} shards",
            self.records,
            self.suppressed,
            self.errors,
            self.shards.len()
        )
    }
}

/// File stem of an input path, ignoring a `.gz` suffix.
///
/// ```
/// assert_eq!(bibindex::shard::input_stem("dumps/catalog.mrc.gz"), "catalog");
/// assert_eq!(bibindex::shard::input_stem("catalog.mrc"), "catalog");
/// ```
#[must_use]
pub fn input_stem(path: impl AsRef<Path>) -> String {
    let path = path.as_ref();
    let mut stem = PathBuf::from(path.file_stem().unwrap_or_default());
    if Compression::from_path(path) == Compression::Gzip {
        stem = PathBuf::from(stem.file_stem().unwrap_or_default());
    }
    stem.to_string_lossy().into_owned()
}

/// Writes records into consecutive shard files.
#[derive(Debug)]
pub struct Sharder<'a> {
    out_dir: PathBuf,
    stem: String,
    shard_size: usize,
    rules: &'a IdentifierRules,
    error_log: Option<ErrorLog>,
    progress: bool,
}

impl<'a> Sharder<'a> {
    /// Sharder writing `<stem>-shard-*.mrc` files into `out_dir`.
    pub fn new(out_dir: impl Into<PathBuf>, stem: impl Into<String>, shard_size: usize, rules: &'a IdentifierRules) -> Self {
        Sharder {
            out_dir: out_dir.into(),
            stem: stem.into(),
            shard_size: shard_size.max(1),
            rules,
            error_log: None,
            progress: false,
        }
    }

    /// Log failed records.
    #[must_use]
    pub fn with_error_log(mut self, log: ErrorLog) -> Self {
        self.error_log = Some(log);
        self
    }

    /// Print progress dots and counts to standard error.
    #[must_use]
    pub fn with_progress(mut self, progress: bool) -> Self {
        self.progress = progress;
        self
    }

    /// Path of the shard starting after `start` records.
    #[must_use]
    pub fn shard_path(&self, start: usize) -> PathBuf {
        self.out_dir.join(format!(
            "{}-shard-{start}-{}.mrc",
            self.stem,
            start + self.shard_size
        ))
    }

    /// Shard every record from `reader`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the output directory or a shard file cannot
    /// be created or flushed.
    pub fn run<R: FormatReader>(&mut self, reader: &mut R) -> Result<ShardStats> {
        fs::create_dir_all(&self.out_dir)?;
        let mut stats = ShardStats::default();
        let mut writer: Option<MarcWriter<BufWriter<File>>> = None;
        let mut written = 0;

        loop {
            let record = match reader.read_record() {
                Ok(Some(record)) => record,
                Ok(None) => break,
                Err(e) => {
                    stats.records += 1;
                    stats.errors += 1;
                    self.log_failure(reader.position(), &e);
                    if e.is_stream_fatal() {
                        error!(position = reader.position(), error = %e, "cannot continue reading records");
                        break;
                    }
                    continue;
                },
            };
            stats.records += 1;

            if is_suppressed(&record, self.rules) {
                stats.suppressed += 1;
            }

            if written % self.shard_size == 0 && writer.as_ref().map_or(true, |w| w.records_written() > 0) {
                if let Some(mut full) = writer.take() {
                    full.finish()?;
                }
                let path = self.shard_path(written);
                info!(path = %path.display(), "starting new shard");
                writer = Some(MarcWriter::new(BufWriter::new(File::create(&path)?)));
                stats.shards.push(path);
            }

            match self.write(writer.as_mut(), &record) {
                Ok(()) => written += 1,
                Err(e) => {
                    stats.errors += 1;
                    self.log_failure(reader.position(), &e);
                },
            }

            if self.progress {
                progress_tick(stats.records);
            }
        }

        if let Some(mut last) = writer {
            last.finish()?;
        }
        if self.progress {
            eprintln!();
        }
        info!(
            records = stats.records,
            suppressed = stats.suppressed,
            errors = stats.errors,
            shards = stats.shards.len(),
            "sharding finished"
        );
        Ok(stats)
    }

    fn write(&self, writer: Option<&mut MarcWriter<BufWriter<File>>>, record: &Record) -> Result<()> {
        match writer {
            Some(writer) => writer.write_record(record),
            None => Err(Error::InvalidRecord("no shard open".to_string())),
        }
    }

    fn log_failure(&mut self, position: usize, e: &Error) {
        warn!(position, error = %e, "failed to shard record");
        if let Some(log) = self.error_log.as_mut() {
            if let Err(log_err) = log.record(position, e) {
                error!(error = %log_err, "cannot write error log");
            }
        }
    }
}
