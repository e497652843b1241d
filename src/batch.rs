//! Batch driver: read records, extract documents, write them out.
//!
//! The driver owns every side effect of a run. Per-record problems (a
//! malformed record, a CSV row that cannot be written, an index flush that
//! fails) are logged with the record position, counted and skipped. Only a
//! stream-fatal read error ends the loop early, and only a failed final
//! flush fails the run.

use crate::document::{NormalizedDocument, OutputField};
use crate::error::{Error, Result};
use crate::extract::{Extraction, Extractor};
use crate::formats::FormatReader;
use crate::index::{IndexBatcher, SearchIndex};
use std::fmt;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

/// Records between progress counts; a dot is printed for every other record.
pub const PROGRESS_INTERVAL: usize = 1000;

/// Print a dot for a processed record, or the count every
/// [`PROGRESS_INTERVAL`] records.
pub(crate) fn progress_tick(records: usize) {
    if records % PROGRESS_INTERVAL == 0 {
        info!(records, "records processed");
        eprint!("{records}");
    } else {
        eprint!(".");
    }
}

/// Append-only log of `position<TAB>error` lines.
#[derive(Debug)]
pub struct ErrorLog {
    out: Box<dyn WriteDebug>,
    entries: usize,
}

/// [`Write`] sinks the error log and CSV output accept.
pub trait WriteDebug: Write + fmt::Debug {}
impl<T: Write + fmt::Debug> WriteDebug for T {}

impl ErrorLog {
    /// Open (or create) a log file for appending.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the file cannot be opened.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self::from_writer(file))
    }

    /// Log to any writer.
    pub fn from_writer(out: impl WriteDebug + 'static) -> Self {
        ErrorLog {
            out: Box::new(out),
            entries: 0,
        }
    }

    /// Append one entry.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the log cannot be written.
    pub fn record(&mut self, position: usize, error: &dyn fmt::Display) -> Result<()> {
        let message = error.to_string().replace(['\n', '\t'], " ");
        writeln!(self.out, "{position}\t{message}")?;
        self.out.flush()?;
        self.entries += 1;
        Ok(())
    }

    /// Entries written by this handle.
    #[must_use]
    pub fn entries(&self) -> usize {
        self.entries
    }
}

/// Counters for one run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchStats {
    /// Records read, including ones that failed to parse
    pub records: usize,
    /// Documents produced
    pub documents: usize,
    /// Records dropped as suppressed
    pub suppressed: usize,
    /// Records dropped for lack of an ID
    pub unidentified: usize,
    /// Records that failed to read or write
    pub errors: usize,
    /// Field-level extraction issues across all documents
    pub field_issues: usize,
    /// Documents committed to the index
    pub committed: usize,
    /// Wall time of the run
    pub elapsed: Duration,
}

impl BatchStats {
    /// Throughput over the whole run.
    #[must_use]
    pub fn records_per_minute(&self) -> f64 {
        let minutes = self.elapsed.as_secs_f64() / 60.0;
        if minutes > 0.0 {
            self.records as f64 / minutes
        } else {
            0.0
        }
    }
}

impl fmt::Display for BatchStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Processed {} records: {} documents, {} suppressed, {} without ID, {} errors \
             in {:.1}s ({:.0} records/minute)",
            self.records,
            self.documents,
            self.suppressed,
            self.unidentified,
            self.errors,
            self.elapsed.as_secs_f64(),
            self.records_per_minute()
        )
    }
}

/// Runs extraction over a record stream.
#[derive(Debug)]
pub struct BatchDriver<'a, I: SearchIndex> {
    extractor: Extractor<'a>,
    index: Option<IndexBatcher<I>>,
    csv: Option<csv::Writer<Box<dyn WriteDebug>>>,
    error_log: Option<ErrorLog>,
    collections: Vec<String>,
    progress: bool,
}

impl<'a, I: SearchIndex> BatchDriver<'a, I> {
    /// Driver with no outputs; add them with the `with_*` methods.
    #[must_use]
    pub fn new(extractor: Extractor<'a>) -> Self {
        BatchDriver {
            extractor,
            index: None,
            csv: None,
            error_log: None,
            collections: Vec::new(),
            progress: false,
        }
    }

    /// Submit documents to an index.
    #[must_use]
    pub fn with_index(mut self, batcher: IndexBatcher<I>) -> Self {
        self.index = Some(batcher);
        self
    }

    /// Write documents as CSV rows. The header is written immediately.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Csv`] if the header cannot be written.
    pub fn with_csv(mut self, out: impl WriteDebug + 'static) -> Result<Self> {
        let mut writer = csv::Writer::from_writer(Box::new(out) as Box<dyn WriteDebug>);
        writer.write_record(NormalizedDocument::header())?;
        self.csv = Some(writer);
        Ok(self)
    }

    /// Write CSV rows to a file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the file cannot be created.
    pub fn with_csv_path(self, path: impl AsRef<Path>) -> Result<Self> {
        let file = File::create(path)?;
        self.with_csv(io::BufWriter::new(file))
    }

    /// Log failed records.
    #[must_use]
    pub fn with_error_log(mut self, log: ErrorLog) -> Self {
        self.error_log = Some(log);
        self
    }

    /// Add these collection names to every document, together with the
    /// collections the index already holds for it.
    #[must_use]
    pub fn with_collections(mut self, collections: Vec<String>) -> Self {
        self.collections = collections;
        self
    }

    /// Print progress dots and counts to standard error.
    #[must_use]
    pub fn with_progress(mut self, progress: bool) -> Self {
        self.progress = progress;
        self
    }

    /// The index batcher, if any.
    pub fn index(&self) -> Option<&IndexBatcher<I>> {
        self.index.as_ref()
    }

    /// Process every record from `reader`.
    ///
    /// # Errors
    ///
    /// Returns an error only if the final CSV flush or index flush fails.
    pub fn run<R: FormatReader>(&mut self, reader: &mut R) -> Result<BatchStats> {
        let started = Instant::now();
        let mut stats = BatchStats::default();
        info!("batch run started");

        loop {
            let record = match reader.read_record() {
                Ok(Some(record)) => record,
                Ok(None) => break,
                Err(e) => {
                    stats.records += 1;
                    stats.errors += 1;
                    let position = reader.position();
                    self.log_failure(position, &e);
                    if e.is_stream_fatal() {
                        error!(position, error = %e, "cannot continue reading records");
                        break;
                    }
                    continue;
                },
            };
            stats.records += 1;
            let position = reader.position();

            match self.extractor.extract(&record) {
                Extraction::Document { mut document, issues } => {
                    stats.field_issues += issues.len();
                    self.merge_collections(&mut document);
                    match self.emit(&document) {
                        Ok(()) => stats.documents += 1,
                        Err(e) => {
                            stats.errors += 1;
                            self.log_failure(position, &e);
                        },
                    }
                },
                Extraction::Suppressed { id } => {
                    debug!(position, id = %id, "suppressed record skipped");
                    stats.suppressed += 1;
                },
                Extraction::Unidentified => {
                    debug!(position, "record without ID skipped");
                    stats.unidentified += 1;
                },
            }

            self.tick(stats.records);
        }

        if let Some(csv) = self.csv.as_mut() {
            csv.flush()?;
        }
        if let Some(batcher) = self.index.as_mut() {
            stats.committed = batcher.finish()?;
        }
        if self.progress {
            eprintln!();
        }

        stats.elapsed = started.elapsed();
        info!(
            records = stats.records,
            documents = stats.documents,
            suppressed = stats.suppressed,
            unidentified = stats.unidentified,
            errors = stats.errors,
            "batch run finished"
        );
        Ok(stats)
    }

    fn emit(&mut self, document: &NormalizedDocument) -> Result<()> {
        if let Some(csv) = self.csv.as_mut() {
            csv.write_record(document.to_row())?;
        }
        if let Some(batcher) = self.index.as_mut() {
            if let Err(e) = batcher.push(document) {
                // The document is queued; the next flush retries it.
                warn!(error = %e, "index flush failed");
            }
        }
        Ok(())
    }

    fn merge_collections(&self, document: &mut NormalizedDocument) {
        if self.collections.is_empty() {
            return;
        }
        let id = document.text(OutputField::Id).map(str::to_string);
        if let (Some(batcher), Some(id)) = (&self.index, id) {
            match batcher.index().existing_collections(&id) {
                Ok(existing) => document.extend(OutputField::Collection, existing),
                Err(e) => warn!(id = %id, error = %e, "could not look up stored collections"),
            }
        }
        document.extend(OutputField::Collection, self.collections.iter().cloned());
    }

    fn log_failure(&mut self, position: usize, e: &Error) {
        warn!(position, error = %e, "record failed");
        if let Some(log) = self.error_log.as_mut() {
            if let Err(log_err) = log.record(position, e) {
                error!(error = %log_err, "cannot write error log");
            }
        }
    }

    fn tick(&self, records: usize) {
        if self.progress {
            progress_tick(records);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::leader::Leader;
    use crate::record::{Field, Record};
    use crate::tables::LookupTables;
    use serde_json::Value;
    use std::cell::RefCell;
    use std::collections::HashSet;
    use std::rc::Rc;

    #[derive(Debug)]
    struct ScriptedReader {
        items: Vec<Result<Option<Record>>>,
        position: usize,
    }

    impl ScriptedReader {
        fn new(mut items: Vec<Result<Record>>) -> Self {
            items.reverse();
            ScriptedReader {
                items: items.into_iter().map(|r| r.map(Some)).collect(),
                position: 0,
            }
        }
    }

    impl FormatReader for ScriptedReader {
        fn read_record(&mut self) -> Result<Option<Record>> {
            match self.items.pop() {
                Some(item) => {
                    self.position += 1;
                    item
                },
                None => Ok(None),
            }
        }

        fn position(&self) -> usize {
            self.position
        }
    }

    #[derive(Debug, Default)]
    struct NullIndex {
        collections: Vec<String>,
    }

    impl SearchIndex for NullIndex {
        fn multi_valued_fields(&self) -> Result<HashSet<String>> {
            Ok(HashSet::new())
        }
        fn add(&mut self, _documents: &[Value]) -> Result<()> {
            Ok(())
        }
        fn commit(&mut self) -> Result<()> {
            Ok(())
        }
        fn existing_collections(&self, _id: &str) -> Result<Vec<String>> {
            Ok(self.collections.clone())
        }
    }

    #[derive(Debug, Clone, Default)]
    struct SharedBuf(Rc<RefCell<Vec<u8>>>);

    impl Write for SharedBuf {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.borrow_mut().write(buf)
        }
        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl SharedBuf {
        fn text(&self) -> String {
            String::from_utf8(self.0.borrow().clone()).unwrap()
        }
    }

    fn record(id: &str, suppressed: bool) -> Record {
        let mut record = Record::new(Leader::default());
        let mut f907 = Field::new("907".to_string(), ' ', ' ');
        f907.add_subfield_str('a', id);
        record.add_field(f907);
        if suppressed {
            let mut f999 = Field::new("999".to_string(), ' ', ' ');
            f999.add_subfield_str('f', "n");
            record.add_field(f999);
        }
        record
    }

    #[test]
    fn test_counts_and_error_log() {
        let tables = LookupTables::default();
        let log = SharedBuf::default();
        let mut reader = ScriptedReader::new(vec![
            Ok(record(".b11111111", false)),
            Err(Error::InvalidField("bad directory entry".to_string())),
            Ok(record(".b22222222", true)),
            Ok(Record::new(Leader::default())),
            Ok(record(".b33333333", false)),
        ]);

        let mut driver: BatchDriver<'_, NullIndex> = BatchDriver::new(Extractor::new(&tables))
            .with_error_log(ErrorLog::from_writer(log.clone()));
        let stats = driver.run(&mut reader).unwrap();

        assert_eq!(stats.records, 5);
        assert_eq!(stats.documents, 2);
        assert_eq!(stats.suppressed, 1);
        assert_eq!(stats.unidentified, 1);
        assert_eq!(stats.errors, 1);
        assert!(log.text().starts_with("2\t"));
        assert_eq!(log.text().lines().count(), 1);
    }

    #[test]
    fn test_stream_fatal_error_stops_reading() {
        let tables = LookupTables::default();
        let mut reader = ScriptedReader::new(vec![
            Ok(record(".b11111111", false)),
            Err(Error::TruncatedRecord("unexpected end of input".to_string())),
            Ok(record(".b22222222", false)),
        ]);
        let mut driver: BatchDriver<'_, NullIndex> = BatchDriver::new(Extractor::new(&tables));
        let stats = driver.run(&mut reader).unwrap();
        assert_eq!(stats.records, 2);
        assert_eq!(stats.documents, 1);
        assert_eq!(stats.errors, 1);
    }

    #[test]
    fn test_csv_rows_and_collections() {
        let tables = LookupTables::default();
        let out = SharedBuf::default();
        let index = NullIndex {
            collections: vec!["Archive".to_string()],
        };
        let mut reader = ScriptedReader::new(vec![Ok(record(".b11111111", false))]);

        let mut driver = BatchDriver::new(Extractor::new(&tables))
            .with_index(IndexBatcher::new(index, 10).unwrap())
            .with_collections(vec!["Music".to_string()])
            .with_csv(out.clone())
            .unwrap();
        let stats = driver.run(&mut reader).unwrap();
        assert_eq!(stats.committed, 1);

        let text = out.text();
        let mut rows = csv::Reader::from_reader(text.as_bytes());
        let header = rows.headers().unwrap().clone();
        assert_eq!(header.len(), OutputField::ALL.len());
        let row = rows.records().next().unwrap().unwrap();
        let column = |name: &str| header.iter().position(|h| h == name).unwrap();
        assert_eq!(&row[column("id")], "b1111111");
        assert_eq!(&row[column("collection")], "Archive|Music");
    }

    #[test]
    fn test_records_per_minute() {
        let stats = BatchStats {
            records: 600,
            elapsed: Duration::from_secs(30),
            ..BatchStats::default()
        };
        assert!((stats.records_per_minute() - 1200.0).abs() < f64::EPSILON);
        assert!(stats.to_string().starts_with("Processed 600 records"));
        assert_eq!(BatchStats::default().records_per_minute(), 0.0);
    }

    #[test]
    fn test_error_log_file_appends() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("errors.log");
        {
            let mut log = ErrorLog::open(&path).unwrap();
            log.record(3, &"first\tproblem").unwrap();
        }
        let mut log = ErrorLog::open(&path).unwrap();
        log.record(9, &"second").unwrap();
        assert_eq!(log.entries(), 1);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "3\tfirst problem\n9\tsecond\n");
    }
}
