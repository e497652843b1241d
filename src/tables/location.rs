use crate::error::{Error, Result};
use lazy_static::lazy_static;
use regex::Regex;
use serde::Deserialize;
use std::collections::{HashMap, HashSet};

lazy_static! {
    static ref ITEM_COUNT: Regex = Regex::new(r"\(\d+\)").unwrap();
}

/// Display label added for codes in the special collections group.
pub const SPECIAL_COLLECTIONS: &str = "Special Collections";
/// Display label added for codes in the government documents group.
pub const GOVERNMENT_DOCUMENTS: &str = "Government Documents";
/// Display label for a code missing from the table.
pub const UNKNOWN_LOCATION: &str = "Unknown";

/// Location codes and the collection groups they belong to.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LocationTable {
    /// Location code -> display name
    pub names: HashMap<String, String>,
    /// Codes that also appear under "Special Collections"
    pub special_collections: HashSet<String>,
    /// Codes that also appear under "Government Documents"
    pub government_documents: HashSet<String>,
}

impl Default for LocationTable {
    fn default() -> Self {
        let names = [
            ("tarf", "Reference"),
            ("tarfc", "Reference Periodicals"),
            ("tarfi", "Reference Index Tables"),
            ("tarfo", "Reference Oversize"),
            ("tper", "Periodicals"),
            ("tperb", "Bound Periodicals"),
            ("tperm", "Periodicals Microforms"),
            ("tstk", "Book Stacks"),
            ("tstko", "Oversize Stacks"),
            ("tcur", "Curriculum Collection"),
            ("tav", "Audio Visual"),
            ("tmus", "Music Library"),
            ("tres", "Reserves"),
            ("tspc", "Special Collections Reading Room"),
            ("tcca", "College Archives"),
            ("trare", "Rare Books"),
            ("tgov", "Government Documents Stacks"),
            ("tgovm", "Government Documents Microfiche"),
            ("tgovr", "Government Documents Reference"),
            ("ewww", "Online"),
        ];
        LocationTable {
            names: names
                .iter()
                .map(|(code, name)| ((*code).to_string(), (*name).to_string()))
                .collect(),
            special_collections: ["tspc", "tcca", "trare"]
                .iter()
                .map(|c| (*c).to_string())
                .collect(),
            government_documents: ["tgov", "tgovm", "tgovr"]
                .iter()
                .map(|c| (*c).to_string())
                .collect(),
        }
    }
}

impl LocationTable {
    /// Strip item counts like `(3)` from a raw location code.
    #[must_use]
    pub fn clean_code(raw: &str) -> String {
        ITEM_COUNT.replace_all(raw, "").trim().to_string()
    }

    /// Display labels for a cleaned location code.
    ///
    /// A known code yields its name followed by any collection group labels.
    /// An unknown code yields only [`UNKNOWN_LOCATION`].
    #[must_use]
    pub fn labels(&self, code: &str) -> Vec<&str> {
        let Some(name) = self.names.get(code) else {
            return vec![UNKNOWN_LOCATION];
        };
        let mut labels = vec![name.as_str()];
        if self.special_collections.contains(code) {
            labels.push(SPECIAL_COLLECTIONS);
        }
        if self.government_documents.contains(code) {
            labels.push(GOVERNMENT_DOCUMENTS);
        }
        labels
    }
}

/// Location code patterns with site-specific meaning.
///
/// A pattern matches anywhere in the code; an override can anchor it with
/// `^`.
#[derive(Debug, Clone)]
pub struct LocationRules {
    /// Reference shelving; forces a "Book" format
    pub reference: Regex,
    /// Reference code exempt from the reference rule
    pub excluded_reference: String,
    /// Periodicals shelving; forces a "Journal" format
    pub periodicals: Regex,
    /// Online resources; sets access to "Online"
    pub online: Regex,
}

impl Default for LocationRules {
    fn default() -> Self {
        LocationRules {
            reference: Regex::new("tarf*").unwrap(),
            excluded_reference: "tarfc".to_string(),
            periodicals: Regex::new("tper*").unwrap(),
            online: Regex::new("ewww").unwrap(),
        }
    }
}

impl LocationRules {
    pub(crate) fn compile(config: &LocationRulesConfig) -> Result<Self> {
        let compile = |name: &str, pattern: &str| {
            Regex::new(pattern)
                .map_err(|e| Error::Config(format!("location rule {name} {pattern:?}: {e}")))
        };
        Ok(LocationRules {
            reference: compile("reference", &config.reference)?,
            excluded_reference: config.excluded_reference.clone(),
            periodicals: compile("periodicals", &config.periodicals)?,
            online: compile("online", &config.online)?,
        })
    }

    /// Whether a cleaned code is reference shelving other than the excluded code.
    #[must_use]
    pub fn is_reference(&self, code: &str) -> bool {
        self.reference.is_match(code) && code != self.excluded_reference
    }

    /// Whether a cleaned code is periodicals shelving.
    #[must_use]
    pub fn is_periodicals(&self, code: &str) -> bool {
        self.periodicals.is_match(code)
    }

    /// Whether a code denotes an online resource.
    #[must_use]
    pub fn is_online(&self, code: &str) -> bool {
        self.online.is_match(code)
    }
}

/// Uncompiled [`LocationRules`] as written in an override file.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub(crate) struct LocationRulesConfig {
    reference: String,
    excluded_reference: String,
    periodicals: String,
    online: String,
}

impl Default for LocationRulesConfig {
    fn default() -> Self {
        LocationRulesConfig {
            reference: "tarf*".to_string(),
            excluded_reference: "tarfc".to_string(),
            periodicals: "tper*".to_string(),
            online: "ewww".to_string(),
        }
    }
}
