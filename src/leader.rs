//! The 24-byte record leader.
//!
//! Only two leader positions matter to classification: position 6 (type of
//! record) and position 7 (bibliographic level). The remaining positions are
//! carried so records can be written back out unchanged when sharding or
//! sampling.
//!
//! | Positions | Meaning |
//! |---|---|
//! | 0-4 | record length |
//! | 5 | record status |
//! | 6 | type of record |
//! | 7 | bibliographic level |
//! | 8-9 | control type, character coding |
//! | 10-11 | indicator and subfield code counts |
//! | 12-16 | base address of data |
//! | 17-19 | encoding level, cataloging form, multipart level |
//! | 20-23 | entry map (usually `4500`) |

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Length of a leader in bytes.
pub const LEADER_LEN: usize = 24;

/// Record leader.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Leader {
    /// Record length (positions 0-4)
    pub record_length: u32,
    /// Record status (position 5)
    pub record_status: char,
    /// Type of record (position 6)
    pub record_type: char,
    /// Bibliographic level (position 7)
    pub bibliographic_level: char,
    /// Type of control (position 8)
    pub control_record_type: char,
    /// Character coding scheme (position 9)
    pub character_coding: char,
    /// Indicator count (position 10)
    pub indicator_count: u8,
    /// Subfield code count (position 11)
    pub subfield_code_count: u8,
    /// Base address of data (positions 12-16)
    pub data_base_address: u32,
    /// Encoding level (position 17)
    pub encoding_level: char,
    /// Descriptive cataloging form (position 18)
    pub cataloging_form: char,
    /// Multipart resource record level (position 19)
    pub multipart_level: char,
    /// Entry map (positions 20-23)
    pub reserved: String,
}

impl Default for Leader {
    /// A new UTF-8 language-material monograph leader with zero lengths.
    fn default() -> Self {
        Leader {
            record_length: 0,
            record_status: 'n',
            record_type: 'a',
            bibliographic_level: 'm',
            control_record_type: ' ',
            character_coding: 'a',
            indicator_count: 2,
            subfield_code_count: 2,
            data_base_address: 0,
            encoding_level: ' ',
            cataloging_form: 'a',
            multipart_level: ' ',
            reserved: "4500".to_string(),
        }
    }
}

impl Leader {
    /// Default leader with the given type of record and bibliographic level.
    #[must_use]
    pub fn with_type(record_type: char, bibliographic_level: char) -> Self {
        Leader {
            record_type,
            bibliographic_level,
            ..Leader::default()
        }
    }

    /// Parse a leader from the first 24 bytes of `bytes`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidLeader`] if fewer than 24 bytes are given or a
    /// numeric position holds something other than digits.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < LEADER_LEN {
            return Err(Error::InvalidLeader(format!(
                "Leader must be at least {LEADER_LEN} bytes, got {}",
                bytes.len()
            )));
        }

        Ok(Leader {
            record_length: parse_digits(&bytes[0..5])?,
            record_status: bytes[5] as char,
            record_type: bytes[6] as char,
            bibliographic_level: bytes[7] as char,
            control_record_type: bytes[8] as char,
            character_coding: bytes[9] as char,
            indicator_count: single_digit(bytes[10], "indicator count")?,
            subfield_code_count: single_digit(bytes[11], "subfield code count")?,
            data_base_address: parse_digits(&bytes[12..17])?,
            encoding_level: bytes[17] as char,
            cataloging_form: bytes[18] as char,
            multipart_level: bytes[19] as char,
            reserved: String::from_utf8_lossy(&bytes[20..24]).into_owned(),
        })
    }

    /// Check the lengths the binary reader does arithmetic with.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidLeader`] if the record length or base address
    /// is shorter than the leader itself, or the base address lies past the
    /// end of the record.
    pub fn validate_for_reading(&self) -> Result<()> {
        if (self.record_length as usize) < LEADER_LEN {
            return Err(Error::InvalidLeader(format!(
                "Record length must be at least {LEADER_LEN}, got {}",
                self.record_length
            )));
        }
        if (self.data_base_address as usize) < LEADER_LEN {
            return Err(Error::InvalidLeader(format!(
                "Base address of data must be at least {LEADER_LEN}, got {}",
                self.data_base_address
            )));
        }
        if self.data_base_address > self.record_length {
            return Err(Error::InvalidLeader(format!(
                "Base address {} lies beyond record length {}",
                self.data_base_address, self.record_length
            )));
        }
        Ok(())
    }

    /// Serialize to exactly 24 bytes.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidLeader`] if a length does not fit in five
    /// digits or the entry map is not four bytes.
    pub fn as_bytes(&self) -> Result<Vec<u8>> {
        if self.record_length > 99_999 || self.data_base_address > 99_999 {
            return Err(Error::InvalidLeader(format!(
                "Lengths exceed five digits: record {}, base {}",
                self.record_length, self.data_base_address
            )));
        }
        let reserved = self.reserved.as_bytes();
        if reserved.len() != 4 {
            return Err(Error::InvalidLeader(format!(
                "Entry map must be 4 bytes, got {}",
                reserved.len()
            )));
        }

        let mut bytes = Vec::with_capacity(LEADER_LEN);
        bytes.extend_from_slice(format!("{:05}", self.record_length).as_bytes());
        for c in [
            self.record_status,
            self.record_type,
            self.bibliographic_level,
            self.control_record_type,
            self.character_coding,
        ] {
            bytes.push(ascii_byte(c));
        }
        bytes.push(b'0' + self.indicator_count.min(9));
        bytes.push(b'0' + self.subfield_code_count.min(9));
        bytes.extend_from_slice(format!("{:05}", self.data_base_address).as_bytes());
        for c in [
            self.encoding_level,
            self.cataloging_form,
            self.multipart_level,
        ] {
            bytes.push(ascii_byte(c));
        }
        bytes.extend_from_slice(reserved);
        Ok(bytes)
    }
}

impl fmt::Display for Leader {
    /// Renders the leader as its 24-character text form.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:05}{}{}{}{}{}{}{}{:05}{}{}{}{}",
            self.record_length,
            self.record_status,
            self.record_type,
            self.bibliographic_level,
            self.control_record_type,
            self.character_coding,
            self.indicator_count,
            self.subfield_code_count,
            self.data_base_address,
            self.encoding_level,
            self.cataloging_form,
            self.multipart_level,
            self.reserved
        )
    }
}

fn ascii_byte(c: char) -> u8 {
    if c.is_ascii() {
        c as u8
    } else {
        b' '
    }
}

fn single_digit(byte: u8, what: &str) -> Result<u8> {
    (byte as char)
        .to_digit(10)
        .and_then(|d| u8::try_from(d).ok())
        .ok_or_else(|| Error::InvalidLeader(format!("Invalid {what}: {:?}", byte as char)))
}

/// Parse a 5-digit ASCII number.
fn parse_digits(bytes: &[u8]) -> Result<u32> {
    let s = String::from_utf8_lossy(bytes);
    s.parse::<u32>()
        .map_err(|_| Error::InvalidLeader(format!("Invalid numeric field: '{s}'")))
}
