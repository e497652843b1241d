//! MARC breaker text, the line-oriented mnemonic form of a record.
//!
//! ```text
//! =LDR  00000nam a2200000 a 4500
//! =001  ocm12345
//! =245  10$aTitle :$bsubtitle.
//! ```
//!
//! Blank indicators are written as `\` and literal `$` in data as `{dollar}`.
//! See <https://www.loc.gov/marc/makrbrkr.html>.

use crate::record::{Field, Record, Subfield};

const DELIMITER: &str = "$";
const DELIMITER_ESCAPE: &str = "{dollar}";

/// Escape subfield delimiters in data.
#[must_use]
pub fn escape(value: &str) -> String {
    value.replace(DELIMITER, DELIMITER_ESCAPE)
}

fn indicator(c: char) -> char {
    if c == ' ' {
        '\\'
    } else {
        c
    }
}

impl Subfield {
    /// Breaker text for one subfield, e.g. `$aTitle`.
    #[must_use]
    pub fn to_breaker(&self) -> String {
        format!("${}{}", self.code, escape(&self.value))
    }
}

impl Field {
    /// Breaker text for a data field, without the trailing newline.
    #[must_use]
    pub fn to_breaker(&self) -> String {
        let mut s = format!(
            "={}  {}{}",
            self.tag,
            indicator(self.indicator1),
            indicator(self.indicator2)
        );
        for subfield in &self.subfields {
            s.push_str(&subfield.to_breaker());
        }
        s
    }
}

impl Record {
    /// Breaker text for the whole record, one field per line.
    #[must_use]
    pub fn to_breaker(&self) -> String {
        let mut s = format!("=LDR  {}", self.leader);
        for (tag, value) in self.control_fields_iter() {
            s.push_str(&format!("\n={tag}  {}", escape(value)));
        }
        for field in self.fields() {
            s.push('\n');
            s.push_str(&field.to_breaker());
        }
        s
    }
}
