//! Record stream traits and input file handling.
//!
//! Input files may be plain binary record files or gzip-compressed ones
//! (`.gz`); [`open_input`] picks the right decoder from the extension.
//!
//! ```no_run
//! use bibindex::formats::{open_input, FormatReaderExt};
//!
//! let mut reader = open_input("catalog.mrc.gz")?;
//! for record in reader.records() {
//!     let record = record?;
//!     println!("{:?}", record.get_control_field("001"));
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod traits;

pub use traits::{FormatReader, FormatReaderExt, FormatWriter, RecordIterator};

use crate::error::Result;
use crate::reader::MarcReader;
use flate2::read::MultiGzDecoder;
use std::fmt;
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;

/// Compression of an input file, detected from its extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Compression {
    /// Plain binary records (`.mrc`, `.marc`, anything else)
    None,
    /// Gzip-compressed records (`.gz`)
    Gzip,
}

impl Compression {
    /// Detect compression from a path's extension.
    ///
    /// ```
    /// use bibindex::formats::Compression;
    ///
    /// assert_eq!(Compression::from_path("a/b.mrc.gz"), Compression::Gzip);
    /// assert_eq!(Compression::from_path("b.mrc"), Compression::None);
    /// ```
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        match path.as_ref().extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("gz") => Compression::Gzip,
            _ => Compression::None,
        }
    }
}

/// A byte source that may be gzip-decoded.
pub enum InputSource {
    /// Uncompressed file
    Plain(BufReader<File>),
    /// Gzip file; concatenated gzip members are read as one stream
    Gzip(MultiGzDecoder<BufReader<File>>),
}

impl fmt::Debug for InputSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputSource::Plain(_) => f.write_str("InputSource::Plain"),
            InputSource::Gzip(_) => f.write_str("InputSource::Gzip"),
        }
    }
}

impl Read for InputSource {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            InputSource::Plain(r) => r.read(buf),
            InputSource::Gzip(r) => r.read(buf),
        }
    }
}

/// Open a record file for reading, decompressing `.gz` files.
///
/// # Errors
///
/// Returns [`Error::Io`](crate::Error::Io) if the file cannot be opened.
pub fn open_input(path: impl AsRef<Path>) -> Result<MarcReader<InputSource>> {
    let path = path.as_ref();
    let file = BufReader::new(File::open(path)?);
    let source = match Compression::from_path(path) {
        Compression::None => InputSource::Plain(file),
        Compression::Gzip => InputSource::Gzip(MultiGzDecoder::new(file)),
    };
    Ok(MarcReader::new(source))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::writer::encode_record;
    use crate::{Leader, Record};
    use flate2::write::GzEncoder;
    use std::io::Write;

    fn sample_bytes() -> Vec<u8> {
        let mut record = Record::new(Leader::default());
        record.add_control_field_str("001", "ocm0001");
        encode_record(&record).unwrap()
    }

    #[test]
    fn test_compression_detection() {
        assert_eq!(Compression::from_path("x.GZ"), Compression::Gzip);
        assert_eq!(Compression::from_path("x"), Compression::None);
    }

    #[test]
    fn test_open_plain_and_gzip() {
        let dir = tempfile::tempdir().unwrap();
        let plain = dir.path().join("records.mrc");
        std::fs::write(&plain, sample_bytes()).unwrap();

        let gz = dir.path().join("records.mrc.gz");
        let mut encoder = GzEncoder::new(File::create(&gz).unwrap(), flate2::Compression::default());
        encoder.write_all(&sample_bytes()).unwrap();
        encoder.finish().unwrap();

        for path in [plain, gz] {
            let mut reader = open_input(&path).unwrap();
            let record = reader.read_record().unwrap().unwrap();
            assert_eq!(record.get_control_field("001"), Some("ocm0001"));
        }
    }

    #[test]
    fn test_open_missing_file() {
        assert!(open_input("/nonexistent/records.mrc").is_err());
    }
}
