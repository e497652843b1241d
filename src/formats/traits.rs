//! Record reader and writer traits.
//!
//! The batch driver, the sharder and the sampler are written against these
//! traits, so tests can feed them in-memory records instead of binary files.

use crate::error::Result;
use crate::record::Record;

/// A source of records.
pub trait FormatReader: std::fmt::Debug {
    /// Read the next record.
    ///
    /// Returns `Ok(None)` when the source is exhausted.
    ///
    /// # Errors
    ///
    /// Returns an error if the next record is malformed or I/O fails. Use
    /// [`Error::is_stream_fatal`](crate::Error::is_stream_fatal) to decide
    /// whether to keep reading.
    fn read_record(&mut self) -> Result<Option<Record>>;

    /// Read all remaining records into memory.
    ///
    /// # Errors
    ///
    /// Returns the first read error; records read before it are discarded.
    fn read_all(&mut self) -> Result<Vec<Record>> {
        let mut records = Vec::new();
        while let Some(record) = self.read_record()? {
            records.push(record);
        }
        Ok(records)
    }

    /// Records successfully read so far, if tracked.
    fn records_read(&self) -> Option<usize> {
        None
    }

    /// 1-based position of the record most recently returned or rejected.
    ///
    /// Used to key error-log entries. Defaults to the successful read count.
    fn position(&self) -> usize {
        self.records_read().unwrap_or(0)
    }
}

/// A sink for records.
///
/// Call [`finish`](Self::finish) before dropping or buffered output may be
/// lost.
pub trait FormatWriter: std::fmt::Debug {
    /// Write one record.
    ///
    /// # Errors
    ///
    /// Returns an error if the record cannot be serialized or the sink fails.
    fn write_record(&mut self, record: &Record) -> Result<()>;

    /// Write several records.
    ///
    /// # Errors
    ///
    /// Returns the first write error.
    fn write_batch(&mut self, records: &[Record]) -> Result<()> {
        for record in records {
            self.write_record(record)?;
        }
        Ok(())
    }

    /// Flush and close the sink.
    ///
    /// # Errors
    ///
    /// Returns an error if flushing fails.
    fn finish(&mut self) -> Result<()>;

    /// Records written so far, if tracked.
    fn records_written(&self) -> Option<usize> {
        None
    }
}

/// Iterator access for any [`FormatReader`].
pub trait FormatReaderExt: FormatReader {
    /// Iterate over `Result<Record>` until the source is exhausted.
    ///
    /// A stream-fatal error is yielded once and ends the iteration.
    fn records(&mut self) -> RecordIterator<'_, Self>
    where
        Self: Sized,
    {
        RecordIterator {
            reader: self,
            done: false,
        }
    }
}

impl<T: FormatReader> FormatReaderExt for T {}

/// Iterator adapter returned by [`FormatReaderExt::records`].
#[derive(Debug)]
pub struct RecordIterator<'a, R: FormatReader> {
    reader: &'a mut R,
    done: bool,
}

impl<R: FormatReader> Iterator for RecordIterator<'_, R> {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.reader.read_record() {
            Ok(Some(record)) => Some(Ok(record)),
            Ok(None) => {
                self.done = true;
                None
            },
            Err(e) => {
                self.done = e.is_stream_fatal();
                Some(Err(e))
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Error, Leader};

    /// Replays a script of read outcomes.
    #[derive(Debug)]
    struct ScriptedReader {
        script: Vec<Result<Option<Record>>>,
        reads: usize,
    }

    impl FormatReader for ScriptedReader {
        fn read_record(&mut self) -> Result<Option<Record>> {
            if self.script.is_empty() {
                return Ok(None);
            }
            self.reads += 1;
            self.script.remove(0)
        }

        fn records_read(&self) -> Option<usize> {
            Some(self.reads)
        }
    }

    fn ok() -> Result<Option<Record>> {
        Ok(Some(Record::new(Leader::default())))
    }

    #[test]
    fn test_iterator_continues_after_record_error() {
        let mut reader = ScriptedReader {
            script: vec![ok(), Err(Error::InvalidField("245".into())), ok()],
            reads: 0,
        };
        let outcomes: Vec<bool> = reader.records().map(|r| r.is_ok()).collect();
        assert_eq!(outcomes, vec![true, false, true]);
        assert_eq!(reader.position(), 3);
    }

    #[test]
    fn test_iterator_stops_after_fatal_error() {
        let mut reader = ScriptedReader {
            script: vec![ok(), Err(Error::TruncatedRecord("eof".into())), ok()],
            reads: 0,
        };
        assert_eq!(reader.records().count(), 2);
    }

    #[test]
    fn test_read_all_propagates_errors() {
        let mut reader = ScriptedReader {
            script: vec![ok(), Err(Error::InvalidRecord("dir".into()))],
            reads: 0,
        };
        assert!(reader.read_all().is_err());
    }
}
