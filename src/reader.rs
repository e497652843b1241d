//! Reading records from ISO 2709 binary streams.
//!
//! [`MarcReader`] reads one record at a time. It always consumes the full
//! record length announced by the leader before looking at the directory,
//! so a record with a broken directory or field yields an error while the
//! stream stays positioned at the start of the next record. A leader with a
//! bad count or address is skipped the same way when its record length is
//! still readable. Callers that want to skip bad records check
//! [`Error::is_stream_fatal`] and keep reading.
//!
//! ```no_run
//! use bibindex::MarcReader;
//! use std::fs::File;
//!
//! let mut reader = MarcReader::new(File::open("catalog.mrc")?);
//! while let Some(record) = reader.read_record()? {
//!     println!("{:?}", record.get_control_field("001"));
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use crate::error::{Error, Result};
use crate::formats::FormatReader;
use crate::leader::{Leader, LEADER_LEN};
use crate::record::{Field, Record};
use std::io::{ErrorKind, Read};

/// Ends the directory and each field.
pub const FIELD_TERMINATOR: u8 = 0x1E;
/// Introduces a subfield code.
pub const SUBFIELD_DELIMITER: u8 = 0x1F;
/// Ends a record.
pub const RECORD_TERMINATOR: u8 = 0x1D;

const DIRECTORY_ENTRY_LEN: usize = 12;

/// Reader for ISO 2709 binary records.
#[derive(Debug)]
pub struct MarcReader<R: Read> {
    reader: R,
    records_read: usize,
    position: usize,
}

impl<R: Read> MarcReader<R> {
    /// Wrap a byte source.
    pub fn new(reader: R) -> Self {
        MarcReader {
            reader,
            records_read: 0,
            position: 0,
        }
    }

    /// Number of records consumed from the stream so far, including ones
    /// that failed to parse. The record returned (or failed) most recently
    /// is at this 1-based position.
    #[must_use]
    pub fn position(&self) -> usize {
        self.position
    }

    /// Read the next record.
    ///
    /// Returns `Ok(None)` at a clean end of stream.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidLeader`] or [`Error::TruncatedRecord`] when the
    ///   stream cannot be resynchronised
    /// - [`Error::InvalidRecord`] or [`Error::InvalidField`] when this record
    ///   (leader included) is malformed but the stream is still aligned
    /// - [`Error::Io`] for read failures
    pub fn read_record(&mut self) -> Result<Option<Record>> {
        let mut leader_bytes = [0u8; LEADER_LEN];
        match self.reader.read_exact(&mut leader_bytes) {
            Ok(()) => {},
            Err(e) if e.kind() == ErrorKind::UnexpectedEof => return Ok(None),
            Err(e) => return Err(Error::Io(e)),
        }
        self.position += 1;

        let leader = match Leader::from_bytes(&leader_bytes)
            .and_then(|leader| leader.validate_for_reading().map(|()| leader))
        {
            Ok(leader) => leader,
            Err(e) => return Err(self.skip_bad_leader(&leader_bytes, e)),
        };

        let mut body = vec![0u8; leader.record_length as usize - LEADER_LEN];
        match self.reader.read_exact(&mut body) {
            Ok(()) => {},
            Err(e) if e.kind() == ErrorKind::UnexpectedEof => {
                return Err(Error::TruncatedRecord(format!(
                    "record {} ends before its declared length {}",
                    self.position, leader.record_length
                )));
            },
            Err(e) => return Err(Error::Io(e)),
        }

        let record = parse_body(leader, &body)?;
        self.records_read += 1;
        Ok(Some(record))
    }
}

impl<R: Read> MarcReader<R> {
    /// Recover from a bad leader whose record length is still readable.
    ///
    /// The rest of the record is consumed and the leader error comes back as
    /// a per-record [`Error::InvalidRecord`]. When the length is unusable or
    /// the announced span does not end in a record terminator, the leader
    /// error is returned unchanged and stays stream-fatal.
    fn skip_bad_leader(&mut self, leader_bytes: &[u8], error: Error) -> Error {
        let Ok(length) = parse_number(&leader_bytes[0..5]) else {
            return error;
        };
        if length <= LEADER_LEN {
            return error;
        }
        let mut body = vec![0u8; length - LEADER_LEN];
        if self.reader.read_exact(&mut body).is_err() || body.last() != Some(&RECORD_TERMINATOR) {
            return error;
        }
        Error::InvalidRecord(format!("record {} skipped: {error}", self.position))
    }
}

impl<R: Read + std::fmt::Debug> FormatReader for MarcReader<R> {
    fn read_record(&mut self) -> Result<Option<Record>> {
        MarcReader::read_record(self)
    }

    fn records_read(&self) -> Option<usize> {
        Some(self.records_read)
    }

    fn position(&self) -> usize {
        self.position
    }
}

/// Parse the directory and data area following the leader.
fn parse_body(leader: Leader, body: &[u8]) -> Result<Record> {
    let base = leader.data_base_address as usize - LEADER_LEN;
    let directory = &body[..base];
    let data = &body[base..];
    let mut record = Record::new(leader);

    for entry in directory.chunks(DIRECTORY_ENTRY_LEN) {
        if entry[0] == FIELD_TERMINATOR {
            break;
        }
        if entry.len() < DIRECTORY_ENTRY_LEN {
            return Err(Error::InvalidRecord(
                "Incomplete directory entry".to_string(),
            ));
        }

        let tag = String::from_utf8_lossy(&entry[0..3]).into_owned();
        let length = parse_number(&entry[3..7])?;
        let start = parse_number(&entry[7..12])?;
        let end = start + length;
        if end > data.len() {
            return Err(Error::InvalidRecord(format!(
                "Field {tag} exceeds data area"
            )));
        }
        let field_data = &data[start..end];

        if is_control_tag(&tag) {
            let value = field_data
                .strip_suffix(&[FIELD_TERMINATOR])
                .unwrap_or(field_data);
            record.add_control_field(tag, String::from_utf8_lossy(value).into_owned());
        } else {
            let field = parse_data_field(field_data, &tag)
                .map_err(|e| Error::InvalidField(format!("Tag {tag}: {e}")))?;
            record.add_field(field);
        }
    }

    Ok(record)
}

fn is_control_tag(tag: &str) -> bool {
    tag.len() == 3 && tag.starts_with("00") && tag.bytes().all(|b| b.is_ascii_digit())
}

/// Parse a data field: two indicators, then delimited subfields.
fn parse_data_field(data: &[u8], tag: &str) -> Result<Field> {
    if data.len() < 2 {
        return Err(Error::InvalidField(
            "Data field too short (needs indicators)".to_string(),
        ));
    }

    let mut field = Field::new(tag.to_string(), data[0] as char, data[1] as char);
    let content = match data[2..].iter().position(|&b| b == FIELD_TERMINATOR) {
        Some(end) => &data[2..2 + end],
        None => &data[2..],
    };
    if content.is_empty() {
        return Ok(field);
    }
    if content[0] != SUBFIELD_DELIMITER {
        return Err(Error::InvalidField(
            "Expected subfield delimiter".to_string(),
        ));
    }

    for chunk in content[1..].split(|&b| b == SUBFIELD_DELIMITER) {
        let Some((&code, value)) = chunk.split_first() else {
            continue;
        };
        field.add_subfield(code as char, String::from_utf8_lossy(value).into_owned());
    }

    Ok(field)
}

/// Parse an ASCII decimal directory number.
fn parse_number(bytes: &[u8]) -> Result<usize> {
    bytes.iter().try_fold(0usize, |acc, &b| {
        if b.is_ascii_digit() {
            Ok(acc * 10 + usize::from(b - b'0'))
        } else {
            Err(Error::InvalidRecord(format!(
                "Invalid directory number: expected digits, got {:?}",
                b as char
            )))
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formats::FormatReaderExt;
    use std::io::Cursor;

    /// Build a binary record with one 245 field whose content is `body`.
    fn raw_record(body: &[u8]) -> Vec<u8> {
        let mut field = b"10".to_vec();
        field.extend_from_slice(body);
        field.push(FIELD_TERMINATOR);

        let mut directory = b"245".to_vec();
        directory.extend_from_slice(format!("{:04}00000", field.len()).as_bytes());
        directory.push(FIELD_TERMINATOR);

        let base = LEADER_LEN + directory.len();
        let length = base + field.len() + 1;
        let mut bytes = format!("{length:05}nam a22{base:05}   4500").into_bytes();
        bytes.extend_from_slice(&directory);
        bytes.extend_from_slice(&field);
        bytes.push(RECORD_TERMINATOR);
        bytes
    }

    fn title_body(title: &str) -> Vec<u8> {
        let mut body = vec![SUBFIELD_DELIMITER, b'a'];
        body.extend_from_slice(title.as_bytes());
        body
    }

    #[test]
    fn test_read_simple_record() {
        let mut reader = MarcReader::new(Cursor::new(raw_record(&title_body("Test title"))));

        let record = reader.read_record().unwrap().unwrap();
        let field = record.get_field("245").unwrap();
        assert_eq!(record.leader.record_type, 'a');
        assert_eq!(field.indicator1, '1');
        assert_eq!(field.get_subfield('a'), Some("Test title"));
        assert!(reader.read_record().unwrap().is_none());
    }

    #[test]
    fn test_bad_field_keeps_stream_aligned() {
        let mut bytes = raw_record(b"no delimiter here");
        bytes.extend(raw_record(&title_body("Second")));
        let mut reader = MarcReader::new(Cursor::new(bytes));

        let err = reader.read_record().unwrap_err();
        assert!(matches!(err, Error::InvalidField(_)));
        assert!(!err.is_stream_fatal());
        assert_eq!(reader.position(), 1);

        let record = reader.read_record().unwrap().unwrap();
        assert_eq!(record.first_subfield("245", 'a'), Some("Second"));
        assert_eq!(reader.position(), 2);
        assert_eq!(FormatReader::records_read(&reader), Some(1));
    }

    #[test]
    fn test_truncated_record_is_fatal() {
        let mut bytes = raw_record(&title_body("Cut short"));
        bytes.truncate(bytes.len() - 5);
        let err = MarcReader::new(Cursor::new(bytes)).read_record().unwrap_err();
        assert!(err.is_stream_fatal());
    }

    #[test]
    fn test_iterator_reads_all() {
        let mut bytes = Vec::new();
        for title in ["One", "Two", "Three"] {
            bytes.extend(raw_record(&title_body(title)));
        }
        let mut reader = MarcReader::new(Cursor::new(bytes));
        assert_eq!(reader.records().filter_map(Result::ok).count(), 3);
    }

    #[test]
    fn test_blank_indicator_count_skips_only_that_record() {
        let mut bytes = raw_record(&title_body("First"));
        bytes[10] = b' ';
        bytes.extend(raw_record(&title_body("Second")));
        let mut reader = MarcReader::new(Cursor::new(bytes));

        let err = reader.read_record().unwrap_err();
        assert!(matches!(err, Error::InvalidRecord(_)), "got: {err}");
        assert!(err.to_string().contains("indicator count"));
        assert!(!err.is_stream_fatal());

        let record = reader.read_record().unwrap().unwrap();
        assert_eq!(record.first_subfield("245", 'a'), Some("Second"));
        assert_eq!(reader.position(), 2);
        assert!(reader.read_record().unwrap().is_none());
    }

    #[test]
    fn test_bad_leader_with_unreadable_length_is_fatal() {
        let mut bytes = raw_record(&title_body("First"));
        bytes[0] = b'x';
        bytes[10] = b' ';
        let err = MarcReader::new(Cursor::new(bytes)).read_record().unwrap_err();
        assert!(matches!(err, Error::InvalidLeader(_)));
        assert!(err.is_stream_fatal());
    }

    #[test]
    fn test_malformed_leader_record_length_too_small() {
        let mut reader = MarcReader::new(Cursor::new(b"00010nam a2200025 i 4500".to_vec()));
        let err = reader.read_record().unwrap_err().to_string();
        assert!(err.contains("Record length must be at least 24"), "got: {err}");
    }
}
