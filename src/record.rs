//! Bibliographic record structures.
//!
//! - [`Record`]: leader, control fields (`001`-`009`) and data fields
//! - [`Field`]: a tagged data field with two indicators
//! - [`Subfield`]: a coded value inside a data field
//!
//! Control fields such as `007` and `008` are positional code strings. They
//! are routinely shorter than the standard says they should be, so every
//! positional read goes through [`Record::control_char`] or
//! [`Record::control_slice`], which answer `None` instead of indexing past
//! the end.
//!
//! # Examples
//!
//! ```
//! use bibindex::{Field, Leader, Record};
//!
//! let record = Record::builder(Leader::default())
//!     .control_field_str("001", "ocm12345")
//!     .control_field_str("007", "vd")
//!     .field(
//!         Field::builder("650".to_string(), ' ', '0')
//!             .subfield_str('a', "Whales")
//!             .subfield_str('z', "Pacific Ocean.")
//!             .build(),
//!     )
//!     .build();
//!
//! assert_eq!(record.control_char("007", 1), Some('d'));
//! assert_eq!(record.control_char("007", 4), None);
//! assert_eq!(record.get_field("650").unwrap().format_field(), "Whales -- Pacific Ocean.");
//! ```

use crate::leader::Leader;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// A bibliographic record.
///
/// Fields are grouped by tag in first-seen tag order, which keeps the tag
/// order of well-formed records when they are written back out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// Record leader (24 bytes)
    pub leader: Leader,
    /// Control fields (`001`-`009`), tag -> values in record order
    pub control_fields: IndexMap<String, Vec<String>>,
    /// Data fields (`010`+), tag -> fields
    pub fields: IndexMap<String, Vec<Field>>,
}

/// A data field (tags `010` and higher).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    /// Field tag (3 characters)
    pub tag: String,
    /// First indicator
    pub indicator1: char,
    /// Second indicator
    pub indicator2: char,
    /// Subfields; most fields have four or fewer
    pub subfields: SmallVec<[Subfield; 4]>,
}

/// A subfield within a data field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subfield {
    /// Subfield code
    pub code: char,
    /// Subfield value
    pub value: String,
}

impl Record {
    /// Create an empty record with the given leader.
    #[must_use]
    pub fn new(leader: Leader) -> Self {
        Record {
            leader,
            control_fields: IndexMap::new(),
            fields: IndexMap::new(),
        }
    }

    /// Start building a record.
    #[must_use]
    pub fn builder(leader: Leader) -> RecordBuilder {
        RecordBuilder {
            record: Record::new(leader),
        }
    }

    /// Append a control field. Repeated tags such as `006` and `007` keep
    /// every occurrence.
    pub fn add_control_field(&mut self, tag: String, value: String) {
        self.control_fields.entry(tag).or_default().push(value);
    }

    /// Append a control field from string slices.
    pub fn add_control_field_str(&mut self, tag: &str, value: &str) {
        self.add_control_field(tag.to_string(), value.to_string());
    }

    /// First value of a control field.
    #[must_use]
    pub fn get_control_field(&self, tag: &str) -> Option<&str> {
        self.control_fields
            .get(tag)
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    /// Every value of a repeated control field, in record order.
    #[must_use]
    pub fn get_control_fields(&self, tag: &str) -> &[String] {
        self.control_fields.get(tag).map_or(&[], Vec::as_slice)
    }

    /// Character at `pos` of the first occurrence of a control field, or
    /// `None` when the field is absent or too short.
    #[must_use]
    pub fn control_char(&self, tag: &str, pos: usize) -> Option<char> {
        self.get_control_field(tag)
            .and_then(|value| value.chars().nth(pos))
    }

    /// Characters `start..end` of a control field, or `None` when the field
    /// is absent or shorter than `end`.
    #[must_use]
    pub fn control_slice(&self, tag: &str, start: usize, end: usize) -> Option<String> {
        let value = self.get_control_field(tag)?;
        if value.chars().count() < end {
            return None;
        }
        Some(value.chars().skip(start).take(end - start).collect())
    }

    /// Append a data field.
    pub fn add_field(&mut self, field: Field) {
        self.fields.entry(field.tag.clone()).or_default().push(field);
    }

    /// All fields with a given tag.
    #[must_use]
    pub fn get_fields(&self, tag: &str) -> Option<&[Field]> {
        self.fields.get(tag).map(Vec::as_slice)
    }

    /// First field with a given tag.
    #[must_use]
    pub fn get_field(&self, tag: &str) -> Option<&Field> {
        self.fields.get(tag).and_then(|v| v.first())
    }

    /// Iterate over all data fields.
    pub fn fields(&self) -> impl Iterator<Item = &Field> {
        self.fields.values().flat_map(|v| v.iter())
    }

    /// Iterate over the fields with a given tag.
    pub fn fields_by_tag(&self, tag: &str) -> impl Iterator<Item = &Field> {
        self.fields.get(tag).map(|v| v.iter()).into_iter().flatten()
    }

    /// Iterate over the fields whose tag is in `tags`, visiting tags in the
    /// order given.
    pub fn fields_by_tags<'a>(&'a self, tags: &'a [&'a str]) -> impl Iterator<Item = &'a Field> {
        tags.iter().flat_map(move |tag| self.fields_by_tag(tag))
    }

    /// Every value of subfield `code` across all `tag` fields.
    pub fn subfield_values<'a>(&'a self, tag: &str, code: char) -> impl Iterator<Item = &'a str> + 'a {
        self.fields_by_tag(tag)
            .flat_map(move |field| field.subfields_by_code(code))
    }

    /// First value of subfield `code` in the first `tag` field that has one.
    #[must_use]
    pub fn first_subfield(&self, tag: &str, code: char) -> Option<&str> {
        self.subfield_values(tag, code).next()
    }

    /// Iterate over all control fields as `(tag, value)`, repeated tags
    /// included.
    pub fn control_fields_iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.control_fields.iter().flat_map(|(tag, values)| {
            values.iter().map(move |value| (tag.as_str(), value.as_str()))
        })
    }
}

/// Fluent [`Record`] construction.
#[derive(Debug)]
pub struct RecordBuilder {
    record: Record,
}

impl RecordBuilder {
    /// Add a control field.
    #[must_use]
    pub fn control_field(mut self, tag: String, value: String) -> Self {
        self.record.add_control_field(tag, value);
        self
    }

    /// Add a control field from string slices.
    #[must_use]
    pub fn control_field_str(mut self, tag: &str, value: &str) -> Self {
        self.record.add_control_field_str(tag, value);
        self
    }

    /// Add a data field.
    #[must_use]
    pub fn field(mut self, field: Field) -> Self {
        self.record.add_field(field);
        self
    }

    /// Finish the record.
    #[must_use]
    pub fn build(self) -> Record {
        self.record
    }
}

impl Field {
    /// Create a data field with no subfields.
    #[must_use]
    pub fn new(tag: String, indicator1: char, indicator2: char) -> Self {
        Field {
            tag,
            indicator1,
            indicator2,
            subfields: SmallVec::new(),
        }
    }

    /// Start building a field.
    ///
    /// ```
    /// use bibindex::Field;
    ///
    /// let field = Field::builder("245".to_string(), '1', '4')
    ///     .subfield_str('a', "The sound and the fury /")
    ///     .subfield_str('c', "William Faulkner.")
    ///     .build();
    /// assert_eq!(field.value(), "The sound and the fury / William Faulkner.");
    /// ```
    #[must_use]
    pub fn builder(tag: String, indicator1: char, indicator2: char) -> FieldBuilder {
        FieldBuilder {
            field: Field::new(tag, indicator1, indicator2),
        }
    }

    /// Append a subfield.
    pub fn add_subfield(&mut self, code: char, value: String) {
        self.subfields.push(Subfield { code, value });
    }

    /// Append a subfield from a string slice.
    pub fn add_subfield_str(&mut self, code: char, value: &str) {
        self.add_subfield(code, value.to_string());
    }

    /// All values for a subfield code.
    #[must_use]
    pub fn get_subfield_values(&self, code: char) -> Vec<&str> {
        self.subfields_by_code(code).collect()
    }

    /// First value for a subfield code.
    #[must_use]
    pub fn get_subfield(&self, code: char) -> Option<&str> {
        self.subfields_by_code(code).next()
    }

    /// Iterate over all subfields.
    pub fn subfields(&self) -> impl Iterator<Item = &Subfield> {
        self.subfields.iter()
    }

    /// Iterate over the values of subfields with `code`.
    pub fn subfields_by_code(&self, code: char) -> impl Iterator<Item = &str> {
        self.subfields
            .iter()
            .filter(move |sf| sf.code == code)
            .map(|sf| sf.value.as_str())
    }

    /// Values of all subfields whose code is in `codes`, in field order.
    #[must_use]
    pub fn get_subfields(&self, codes: &[char]) -> Vec<&str> {
        self.subfields
            .iter()
            .filter(|sf| codes.contains(&sf.code))
            .map(|sf| sf.value.as_str())
            .collect()
    }

    /// All subfield values joined with a space.
    #[must_use]
    pub fn value(&self) -> String {
        self.subfields
            .iter()
            .map(|sf| sf.value.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Display form of the field.
    ///
    /// Subfield values are joined with a space, skipping the `$6` linkage.
    /// Subject fields (`6XX`) put ` -- ` before `v`, `x`, `y` and `z`
    /// subdivisions.
    #[must_use]
    pub fn format_field(&self) -> String {
        let is_subject = self.tag.starts_with('6');
        let mut out = String::new();

        for subfield in self.subfields.iter().filter(|sf| sf.code != '6') {
            if is_subject && matches!(subfield.code, 'v' | 'x' | 'y' | 'z') {
                out.push_str(" -- ");
            } else {
                out.push(' ');
            }
            out.push_str(&subfield.value);
        }

        out.trim().to_string()
    }
}

/// Fluent [`Field`] construction.
#[derive(Debug)]
pub struct FieldBuilder {
    field: Field,
}

impl FieldBuilder {
    /// Add a subfield.
    #[must_use]
    pub fn subfield(mut self, code: char, value: String) -> Self {
        self.field.add_subfield(code, value);
        self
    }

    /// Add a subfield from a string slice.
    #[must_use]
    pub fn subfield_str(mut self, code: char, value: &str) -> Self {
        self.field.add_subfield_str(code, value);
        self
    }

    /// Finish the field.
    #[must_use]
    pub fn build(self) -> Field {
        self.field
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn subject(tag: &str, subs: &[(char, &str)]) -> Field {
        let mut field = Field::new(tag.to_string(), ' ', '0');
        for (code, value) in subs {
            field.add_subfield_str(*code, value);
        }
        field
    }

    #[test]
    fn test_control_char_is_bounds_safe() {
        let mut record = Record::new(Leader::default());
        record.add_control_field_str("007", "sd f");

        assert_eq!(record.control_char("007", 0), Some('s'));
        assert_eq!(record.control_char("007", 3), Some('f'));
        assert_eq!(record.control_char("007", 4), None);
        assert_eq!(record.control_char("008", 0), None);
    }

    #[test]
    fn test_control_slice_requires_full_span() {
        let mut record = Record::new(Leader::default());
        record.add_control_field_str("008", "850101s1984    nyu");

        assert_eq!(record.control_slice("008", 7, 11).as_deref(), Some("1984"));
        assert_eq!(record.control_slice("008", 35, 38), None);
    }

    #[test]
    fn test_repeated_control_fields_kept_in_order() {
        let mut record = Record::new(Leader::default());
        record.add_control_field_str("007", "vd cvaizq");
        record.add_control_field_str("001", "ocm1");
        record.add_control_field_str("007", "cr unu");

        assert_eq!(record.get_control_field("007"), Some("vd cvaizq"));
        assert_eq!(record.control_char("007", 0), Some('v'));
        assert_eq!(record.get_control_fields("007"), ["vd cvaizq", "cr unu"]);
        assert!(record.get_control_fields("006").is_empty());
        let all: Vec<_> = record.control_fields_iter().collect();
        assert_eq!(all, vec![("007", "vd cvaizq"), ("007", "cr unu"), ("001", "ocm1")]);
    }

    #[test]
    fn test_subfield_lookup_with_borrowed_tag() {
        let mut record = Record::new(Leader::default());
        record.add_field(subject("650", &[('a', "Whales")]));

        let first = {
            let tag = String::from("650");
            record.first_subfield(&tag, 'a')
        };
        assert_eq!(first, Some("Whales"));
    }

    #[test]
    fn test_multiple_fields_same_tag() {
        let mut record = Record::new(Leader::default());
        for i in 0..3 {
            record.add_field(subject("650", &[('a', &format!("Subject {i}"))]));
        }

        assert_eq!(record.get_fields("650").unwrap().len(), 3);
        assert_eq!(record.subfield_values("650", 'a').count(), 3);
        assert_eq!(record.first_subfield("650", 'a'), Some("Subject 0"));
    }

    #[test]
    fn test_fields_by_tags_follows_tag_order() {
        let mut record = Record::new(Leader::default());
        record.add_field(subject("490", &[('a', "Second")]));
        record.add_field(subject("440", &[('a', "First")]));

        let values: Vec<_> = record
            .fields_by_tags(&["440", "490"])
            .filter_map(|f| f.get_subfield('a'))
            .collect();
        assert_eq!(values, vec!["First", "Second"]);
    }

    #[test]
    fn test_get_subfields_keeps_field_order() {
        let field = subject("700", &[('d', "1900-"), ('a', "Smith, J."), ('q', "x")]);
        assert_eq!(field.get_subfields(&['a', 'd']), vec!["1900-", "Smith, J."]);
    }

    #[test]
    fn test_format_field_subject_subdivisions() {
        let field = subject(
            "650",
            &[('a', "Dogs"), ('x', "Training"), ('6', "880-01"), ('z', "Ohio.")],
        );
        assert_eq!(field.format_field(), "Dogs -- Training -- Ohio.");
    }

    #[test]
    fn test_format_field_non_subject() {
        let field = subject("260", &[('a', "New York :"), ('b', "Knopf,"), ('c', "1999.")]);
        assert_eq!(field.format_field(), "New York : Knopf, 1999.");
        assert_eq!(Field::new("260".to_string(), ' ', ' ').format_field(), "");
    }
}
