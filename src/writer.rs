//! Writing records to ISO 2709 binary streams.
//!
//! Used by the sharder and the sampler to copy records out unchanged. The
//! leader's record length and base address are recomputed; everything else
//! is written as read.

use crate::error::{Error, Result};
use crate::formats::FormatWriter;
use crate::leader::LEADER_LEN;
use crate::reader::{FIELD_TERMINATOR, RECORD_TERMINATOR, SUBFIELD_DELIMITER};
use crate::record::Record;
use std::io::Write;

/// Writer for ISO 2709 binary records.
#[derive(Debug)]
pub struct MarcWriter<W: Write> {
    writer: W,
    records_written: usize,
    finished: bool,
}

impl<W: Write> MarcWriter<W> {
    /// Wrap a byte sink.
    pub fn new(writer: W) -> Self {
        MarcWriter {
            writer,
            records_written: 0,
            finished: false,
        }
    }

    /// Serialize and write one record.
    ///
    /// # Errors
    ///
    /// Returns an error if the writer is finished, the record does not fit
    /// the binary format's length limits, or the sink fails.
    pub fn write_record(&mut self, record: &Record) -> Result<()> {
        if self.finished {
            return Err(Error::InvalidRecord(
                "Cannot write to a finished writer".to_string(),
            ));
        }
        let bytes = encode_record(record)?;
        self.writer.write_all(&bytes)?;
        self.records_written += 1;
        Ok(())
    }

    /// Flush the sink. No more records can be written afterwards.
    ///
    /// # Errors
    ///
    /// Returns an error if flushing fails.
    pub fn finish(&mut self) -> Result<()> {
        self.writer.flush()?;
        self.finished = true;
        Ok(())
    }

    /// Records written so far.
    #[must_use]
    pub fn records_written(&self) -> usize {
        self.records_written
    }
}

impl<W: Write + std::fmt::Debug> FormatWriter for MarcWriter<W> {
    fn write_record(&mut self, record: &Record) -> Result<()> {
        MarcWriter::write_record(self, record)
    }

    fn finish(&mut self) -> Result<()> {
        MarcWriter::finish(self)
    }

    fn records_written(&self) -> Option<usize> {
        Some(self.records_written)
    }
}

/// Serialize a record to its binary form.
///
/// # Errors
///
/// Returns [`Error::InvalidRecord`] if a field is longer than 9999 bytes or
/// the record is longer than 99999 bytes.
pub fn encode_record(record: &Record) -> Result<Vec<u8>> {
    let mut directory = Vec::new();
    let mut data = Vec::new();

    for (tag, value) in record.control_fields_iter() {
        let start = data.len();
        data.extend_from_slice(value.as_bytes());
        data.push(FIELD_TERMINATOR);
        push_entry(&mut directory, tag, data.len() - start, start)?;
    }

    for field in record.fields() {
        let start = data.len();
        data.push(ascii_or_blank(field.indicator1));
        data.push(ascii_or_blank(field.indicator2));
        for subfield in &field.subfields {
            data.push(SUBFIELD_DELIMITER);
            let mut code = [0u8; 4];
            data.extend_from_slice(subfield.code.encode_utf8(&mut code).as_bytes());
            data.extend_from_slice(subfield.value.as_bytes());
        }
        data.push(FIELD_TERMINATOR);
        push_entry(&mut directory, &field.tag, data.len() - start, start)?;
    }
    directory.push(FIELD_TERMINATOR);

    let base_address = LEADER_LEN + directory.len();
    let record_length = base_address + data.len() + 1;
    let mut leader = record.leader.clone();
    leader.record_length = u32::try_from(record_length)
        .map_err(|_| Error::InvalidRecord("Record length overflow".to_string()))?;
    leader.data_base_address = u32::try_from(base_address)
        .map_err(|_| Error::InvalidRecord("Base address overflow".to_string()))?;

    let mut bytes = leader
        .as_bytes()
        .map_err(|e| Error::InvalidRecord(format!("Record too large to encode: {e}")))?;
    bytes.extend_from_slice(&directory);
    bytes.extend_from_slice(&data);
    bytes.push(RECORD_TERMINATOR);
    Ok(bytes)
}

fn push_entry(directory: &mut Vec<u8>, tag: &str, length: usize, start: usize) -> Result<()> {
    if tag.len() != 3 {
        return Err(Error::InvalidRecord(format!("Tag {tag:?} is not 3 bytes")));
    }
    if length > 9999 || start > 99_999 {
        return Err(Error::InvalidRecord(format!(
            "Field {tag} does not fit the directory (length {length}, start {start})"
        )));
    }
    directory.extend_from_slice(tag.as_bytes());
    directory.extend_from_slice(format!("{length:04}{start:05}").as_bytes());
    Ok(())
}

fn ascii_or_blank(c: char) -> u8 {
    if c.is_ascii() {
        c as u8
    } else {
        b' '
    }
}
