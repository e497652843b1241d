//! Field extraction: one bibliographic record in, one normalized document out.
//!
//! [`Extractor::extract`] resolves the record's ID, honours suppression,
//! merges check-in holdings and then fills the document section by section.
//! Problems confined to one output field never fail the record; they are
//! reported as [`FieldIssue`]s next to the document and the field is left
//! empty.
//!
//! # Examples
//!
//! ```
//! use bibindex::extract::{Extraction, Extractor};
//! use bibindex::{Field, Leader, LookupTables, Record};
//! use bibindex::document::OutputField;
//!
//! let record = Record::builder(Leader::default())
//!     .field(Field::builder("907".to_string(), ' ', ' ').subfield_str('a', ".b12345678").build())
//!     .field(
//!         Field::builder("245".to_string(), '1', '4')
//!             .subfield_str('a', "The whale /")
//!             .subfield_str('c', "Herman Melville.")
//!             .build(),
//!     )
//!     .build();
//!
//! let tables = LookupTables::default();
//! let extractor = Extractor::new(&tables);
//! let Extraction::Document { document, .. } = extractor.extract(&record) else {
//!     panic!("record has an ID");
//! };
//! assert_eq!(document.text(OutputField::Id), Some("b1234567"));
//! assert_eq!(document.text(OutputField::Title), Some("The whale"));
//! assert_eq!(document.text(OutputField::TitleSort), Some("whale / Herman Melville."));
//! ```

mod fixed;
mod identifiers;
pub mod rules;
mod subjects;

pub use fixed::publication_year;
pub use identifiers::{is_suppressed, resolve_id};
pub use rules::{Render, TagRule, RULES};
pub use subjects::{full_heading, SUBJECT_TAGS};

use crate::classify::FormatClassifier;
use crate::document::{NormalizedDocument, OutputField};
use crate::holdings::HoldingsTable;
use crate::record::Record;
use crate::tables::{LocationTable, LookupTables, UNKNOWN_LOCATION};
use std::fmt;
use tracing::debug;

/// Characters trimmed from both ends of facet values.
const TRIM_CHARS: &[char] = &[',', ':', '/', ';', ' '];

/// Facet normalization: periods removed, then `,:/; ` trimmed from both ends.
///
/// ```
/// assert_eq!(bibindex::extract::normalize("New York, N.Y. :"), "New York, NY");
/// ```
#[must_use]
pub fn normalize(value: &str) -> String {
    value.replace('.', "").trim_matches(TRIM_CHARS).to_string()
}

/// Library system that produced the records.
///
/// Decides where the bibliographic ID lives and how item IDs are written.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum IlsVariant {
    /// Innovative Interfaces (Millennium / Sierra): ID in `907$a`
    #[default]
    Iii,
    /// Any other system: ID in `001`
    Generic,
}

/// A recoverable problem with one output field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldIssue {
    /// Field left empty or incomplete
    pub field: OutputField,
    /// What was wrong with the source data
    pub reason: String,
}

impl FieldIssue {
    /// New issue for `field`.
    pub fn new(field: OutputField, reason: impl Into<String>) -> Self {
        FieldIssue {
            field,
            reason: reason.into(),
        }
    }
}

impl fmt::Display for FieldIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.reason)
    }
}

/// Outcome of extracting one record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extraction {
    /// A document ready for indexing
    Document {
        /// The document
        document: NormalizedDocument,
        /// Fields that could not be extracted
        issues: Vec<FieldIssue>,
    },
    /// The record is marked suppressed and must not be indexed
    Suppressed {
        /// Resolved ID of the suppressed record
        id: String,
    },
    /// No bibliographic ID could be resolved
    Unidentified,
}

impl Extraction {
    /// The document, if one was produced.
    #[must_use]
    pub fn document(&self) -> Option<&NormalizedDocument> {
        match self {
            Extraction::Document { document, .. } => Some(document),
            _ => None,
        }
    }
}

/// Turns records into normalized documents.
///
/// Holds only shared references to read-only configuration, so one
/// extractor serves a whole run.
#[derive(Debug, Clone, Copy)]
pub struct Extractor<'a> {
    tables: &'a LookupTables,
    holdings: Option<&'a HoldingsTable>,
    ils: IlsVariant,
    classifier: FormatClassifier<'a>,
}

impl<'a> Extractor<'a> {
    /// Extractor for III records with no check-in holdings.
    #[must_use]
    pub fn new(tables: &'a LookupTables) -> Self {
        Extractor {
            tables,
            holdings: None,
            ils: IlsVariant::default(),
            classifier: FormatClassifier::new(tables),
        }
    }

    /// Merge rows from a check-in holdings table.
    #[must_use]
    pub fn with_holdings(mut self, holdings: &'a HoldingsTable) -> Self {
        self.holdings = Some(holdings);
        self
    }

    /// Select the library system variant.
    #[must_use]
    pub fn with_ils(mut self, ils: IlsVariant) -> Self {
        self.ils = ils;
        self
    }

    /// Extract one record.
    #[must_use]
    pub fn extract(&self, record: &Record) -> Extraction {
        let Some(id) = resolve_id(record, self.ils, &self.tables.identifiers) else {
            debug!(
                ctrl_num = record.get_control_field("001").unwrap_or(""),
                "record has no resolvable ID"
            );
            return Extraction::Unidentified;
        };

        if is_suppressed(record, &self.tables.identifiers) {
            debug!(id = %id, "record suppressed");
            return Extraction::Suppressed { id };
        }

        let mut document = NormalizedDocument::new();
        let mut issues = Vec::new();

        document.set_text(OutputField::Id, id.as_str());
        document.set_text(OutputField::BibNum, id.as_str());
        self.merge_holdings(&id, &mut document);

        document.set_text(OutputField::Format, self.classifier.classify(record).as_str());
        if let Some(ctrl_num) = record.get_control_field("001") {
            document.set_text(OutputField::CtrlNum, ctrl_num);
            document.set_text(OutputField::OclcNum, ctrl_num.replace("|a", ""));
        }

        fixed::apply(record, self.tables, &mut document, &mut issues);
        self.languages(record, &mut document);
        identifiers::apply(record, self.tables, self.ils, &mut document, &mut issues);
        self.locations(record, &mut document);
        holdings_fields(record, &mut document);

        rules::apply_rules(RULES, record, &mut document, &mut issues);
        titles(record, &mut document, &mut issues);
        publication(record, &mut document);
        subjects::apply(record, &mut document, &mut issues);

        document.set_text(OutputField::MarcRecord, record.to_breaker());

        for issue in &issues {
            debug!(id = %id, field = %issue.field, reason = %issue.reason, "field not extracted");
        }
        Extraction::Document { document, issues }
    }

    fn merge_holdings(&self, id: &str, doc: &mut NormalizedDocument) {
        let Some(row) = self.holdings.and_then(|table| table.get(id)) else {
            return;
        };
        if let Some(issn) = &row.issn {
            doc.set_text(OutputField::Issn, issn.as_str());
        }
        doc.extend(OutputField::Url, row.urls.iter().cloned());
        doc.extend_aligned(OutputField::Holdings, row.holdings.iter().cloned());
    }

    /// Dubbed (`041$a`) and subtitle (`041$b`) languages.
    fn languages(&self, record: &Record, doc: &mut NormalizedDocument) {
        let primary: Vec<String> = doc
            .values(OutputField::Language)
            .into_iter()
            .map(str::to_string)
            .collect();

        let dubbed: Vec<String> = self
            .language_names(record, 'a')
            .into_iter()
            .filter(|name| !primary.contains(name))
            .collect();
        doc.extend(OutputField::LanguageDubbed, dubbed);
        doc.extend(OutputField::LanguageSubtitles, self.language_names(record, 'b'));
    }

    /// Names for the `041` codes in subfield `code`. Runs of codes such as
    /// `engfre` are split into three-letter chunks.
    fn language_names(&self, record: &Record, code: char) -> Vec<String> {
        record
            .subfield_values("041", code)
            .flat_map(|value| {
                let chars: Vec<char> = value.trim().chars().collect();
                chars
                    .chunks(3)
                    .map(|chunk| chunk.iter().collect::<String>())
                    .collect::<Vec<_>>()
            })
            .filter_map(|chunk| self.tables.language(&chunk).map(str::to_string))
            .collect()
    }

    /// `access` and `location` from the `994$a` location codes.
    fn locations(&self, record: &Record, doc: &mut NormalizedDocument) {
        let rules = &self.tables.location_rules;
        let mut online = false;

        for raw in record.subfield_values("994", 'a') {
            let code = LocationTable::clean_code(raw);
            online |= rules.is_online(&code);
            let labels = self.tables.locations.labels(&code);
            if labels == [UNKNOWN_LOCATION] {
                debug!(code = %code, "unknown location code");
            }
            doc.extend(OutputField::Location, labels);
        }

        doc.set_text(
            OutputField::Access,
            if online { "Online" } else { "In the Library" },
        );
    }
}

/// Item-level holdings: `945$c`, then `850$a` values not already present.
fn holdings_fields(record: &Record, doc: &mut NormalizedDocument) {
    doc.extend(
        OutputField::Holdings,
        record.subfield_values("945", 'c').map(str::trim),
    );
    for value in record.subfield_values("850", 'a').map(str::trim) {
        if !doc.values(OutputField::Holdings).contains(&value) {
            doc.push(OutputField::Holdings, value);
        }
    }
}

/// `title` and `title_sort` from the `245`.
///
/// The sort title skips as many characters of the full title as the second
/// indicator says are non-filing.
fn titles(record: &Record, doc: &mut NormalizedDocument, issues: &mut Vec<FieldIssue>) {
    let Some(field) = record.get_field("245") else {
        return;
    };

    let full_title = field.format_field();
    let nonfiling = field.indicator2.to_digit(10).unwrap_or(0) as usize;
    let title_sort: String = full_title.chars().skip(nonfiling).collect();
    doc.set_text(OutputField::TitleSort, title_sort.trim());

    match field.get_subfield('a') {
        Some(title) => doc.set_text(OutputField::Title, title.trim_matches(&[' ', '/', ':', ';'][..])),
        None => issues.push(FieldIssue::new(OutputField::Title, "245 has no $a")),
    }
}

/// `publisher` and `publisher_location`: the first `260`, else the first
/// `264` with second indicator `1` (publication).
fn publication(record: &Record, doc: &mut NormalizedDocument) {
    let field = record.get_field("260").or_else(|| {
        record
            .fields_by_tag("264")
            .find(|field| field.indicator2 == '1')
    });
    let Some(field) = field else {
        return;
    };
    if let Some(place) = field.get_subfield('a') {
        doc.set_text(OutputField::PublisherLocation, normalize(place));
    }
    if let Some(publisher) = field.get_subfield('b') {
        doc.set_text(OutputField::Publisher, normalize(publisher));
    }
}
