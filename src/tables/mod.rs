//! Immutable lookup tables and site rules.
//!
//! A [`LookupTables`] value is built once before a run and then shared by
//! reference with the [`Extractor`](crate::extract::Extractor) and the
//! [`FormatClassifier`](crate::classify::FormatClassifier). Nothing here is
//! global, so tests and parallel runs can use different tables side by side.
//!
//! The built-in tables cover the standard language, audience and LC class
//! codes and a default set of location codes. Sites replace or extend any
//! section with a JSON file:
//!
//! ```json
//! {
//!   "locations": { "names": { "tstk": "Book Stacks" }, "special_collections": ["tspc"] },
//!   "location_rules": { "reference": "tarf*", "excluded_reference": "tarfc" },
//!   "identifiers": { "alternate_prefix": "b", "alternate_len": 8 }
//! }
//! ```
//!
//! Sections missing from the file keep their built-in values. Map sections
//! (`languages`, `audiences`, `lc_classes`) are merged over the built-in
//! entries.

mod audience;
mod language;
mod lc;
mod location;

pub use location::{
    LocationRules, LocationTable, GOVERNMENT_DOCUMENTS, SPECIAL_COLLECTIONS, UNKNOWN_LOCATION,
};

use crate::error::{Error, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tracing::debug;

/// Every table and rule the extraction and classification steps consult.
#[derive(Debug, Clone)]
pub struct LookupTables {
    /// MARC language code -> language name
    pub languages: HashMap<String, String>,
    /// 008/22 target audience code -> description
    pub audiences: HashMap<char, String>,
    /// LC class letters -> class description
    pub lc_classes: HashMap<String, String>,
    /// Location codes, names and collection groups
    pub locations: LocationTable,
    /// Location code patterns used for access and format override
    pub location_rules: LocationRules,
    /// Identifier resolution and suppression rules
    pub identifiers: IdentifierRules,
}

impl Default for LookupTables {
    fn default() -> Self {
        LookupTables {
            languages: language::builtin(),
            audiences: audience::builtin(),
            lc_classes: lc::builtin(),
            locations: LocationTable::default(),
            location_rules: LocationRules::default(),
            identifiers: IdentifierRules::default(),
        }
    }
}

impl LookupTables {
    /// Language name for a MARC language code, case-insensitive.
    #[must_use]
    pub fn language(&self, code: &str) -> Option<&str> {
        self.languages
            .get(&code.trim().to_lowercase())
            .map(String::as_str)
    }

    /// Audience description for an 008/22 code.
    #[must_use]
    pub fn audience(&self, code: char) -> Option<&str> {
        self.audiences.get(&code).map(String::as_str)
    }

    /// LC class description for the leading letters of a call number.
    ///
    /// The whole letter run is tried first (`QA`), then its first letter
    /// (`Q`).
    #[must_use]
    pub fn lc_class(&self, letters: &str) -> Option<&str> {
        self.lc_classes
            .get(letters)
            .or_else(|| {
                letters
                    .get(..1)
                    .and_then(|first| self.lc_classes.get(first))
            })
            .map(String::as_str)
    }

    /// Load tables from a JSON override file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the file cannot be read, [`Error::Json`] if
    /// it is not valid JSON for this layout, or [`Error::Config`] if a
    /// location pattern does not compile.
    pub fn from_json_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        debug!(path = %path.display(), "loading lookup table overrides");
        Self::from_json_str(&text)
    }

    /// Load tables from JSON text. See [`from_json_path`](Self::from_json_path).
    ///
    /// # Errors
    ///
    /// Same as [`from_json_path`](Self::from_json_path), minus I/O.
    pub fn from_json_str(text: &str) -> Result<Self> {
        let overrides: TablesFile = serde_json::from_str(text)?;
        let mut tables = LookupTables::default();

        if let Some(languages) = overrides.languages {
            tables
                .languages
                .extend(languages.into_iter().map(|(k, v)| (k.to_lowercase(), v)));
        }
        if let Some(audiences) = overrides.audiences {
            for (code, name) in audiences {
                let mut chars = code.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => {
                        tables.audiences.insert(c, name);
                    },
                    _ => {
                        return Err(Error::Config(format!(
                            "audience code {code:?} must be a single character"
                        )))
                    },
                }
            }
        }
        if let Some(lc_classes) = overrides.lc_classes {
            tables.lc_classes.extend(lc_classes);
        }
        if let Some(locations) = overrides.locations {
            tables.locations = locations;
        }
        if let Some(rules) = overrides.location_rules {
            tables.location_rules = LocationRules::compile(&rules)?;
        }
        if let Some(identifiers) = overrides.identifiers {
            tables.identifiers = identifiers;
        }
        Ok(tables)
    }
}

/// How bibliographic IDs are resolved and suppressed records recognised.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct IdentifierRules {
    /// Minimum length of the primary ID before stripping
    pub min_primary_len: usize,
    /// Prefix an alternate (`035`) ID must start with after stripping
    pub alternate_prefix: String,
    /// Exact length of an alternate ID after stripping
    pub alternate_len: usize,
    /// `999$f` value marking a suppressed record
    pub suppression_code: String,
}

impl Default for IdentifierRules {
    fn default() -> Self {
        IdentifierRules {
            min_primary_len: 10,
            alternate_prefix: "b".to_string(),
            alternate_len: 8,
            suppression_code: "n".to_string(),
        }
    }
}

impl IdentifierRules {
    /// Accept a stripped `035` value as an alternate ID.
    #[must_use]
    pub fn accepts_alternate(&self, id: &str) -> bool {
        id.starts_with(&self.alternate_prefix) && id.chars().count() == self.alternate_len
    }
}

/// On-disk layout of a table override file.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct TablesFile {
    languages: Option<HashMap<String, String>>,
    audiences: Option<HashMap<String, String>>,
    lc_classes: Option<HashMap<String, String>>,
    locations: Option<LocationTable>,
    location_rules: Option<location::LocationRulesConfig>,
    identifiers: Option<IdentifierRules>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_lookups() {
        let tables = LookupTables::default();
        assert_eq!(tables.language("eng"), Some("English"));
        assert_eq!(tables.language("FRE"), Some("French"));
        assert_eq!(tables.language("zzz"), None);
        assert_eq!(tables.audience('j'), Some("Juvenile"));
        assert_eq!(tables.audience('x'), None);
    }

    #[test]
    fn test_lc_class_falls_back_to_first_letter() {
        let tables = LookupTables::default();
        assert_eq!(tables.lc_class("Q"), Some("Q - Science"));
        assert_eq!(tables.lc_class("QA"), Some("Q - Science"));
        assert_eq!(tables.lc_class(""), None);
    }

    #[test]
    fn test_overrides_merge_and_replace() {
        let tables = LookupTables::from_json_str(
            r#"{
                "languages": {"TLH": "Klingon"},
                "lc_classes": {"QA": "QA - Mathematics"},
                "identifiers": {"alternate_prefix": "x"}
            }"#,
        )
        .unwrap();

        assert_eq!(tables.language("tlh"), Some("Klingon"));
        assert_eq!(tables.language("eng"), Some("English"));
        assert_eq!(tables.lc_class("QA"), Some("QA - Mathematics"));
        assert_eq!(tables.identifiers.alternate_prefix, "x");
        assert_eq!(tables.identifiers.alternate_len, 8);
    }

    #[test]
    fn test_bad_override_is_config_error() {
        let err = LookupTables::from_json_str(r#"{"audiences": {"ab": "Two"}}"#).unwrap_err();
        assert!(matches!(err, Error::Config(_)));

        let err = LookupTables::from_json_str(r#"{"location_rules": {"reference": "("}}"#)
            .unwrap_err();
        assert!(matches!(err, Error::Config(_)));

        assert!(matches!(
            LookupTables::from_json_str(r#"{"colours": {}}"#),
            Err(Error::Json(_))
        ));
    }

    #[test]
    fn test_from_json_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tables.json");
        std::fs::write(&path, r#"{"audiences": {"q": "Quiz"}}"#).unwrap();
        let tables = LookupTables::from_json_path(&path).unwrap();
        assert_eq!(tables.audience('q'), Some("Quiz"));
    }

    #[test]
    fn test_alternate_id_rule() {
        let rules = IdentifierRules::default();
        assert!(rules.accepts_alternate("b1234567"));
        assert!(!rules.accepts_alternate("b123456"));
        assert!(!rules.accepts_alternate("o1234567"));
    }
}
