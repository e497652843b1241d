//! The normalized output document.
//!
//! [`OutputField`] is the closed schema, in output column order. Each field
//! has a fixed [`ValueKind`]: a single string, an unordered set, or an
//! ordered list. [`NormalizedDocument`] only stores non-empty values, so an
//! absent key and an empty value mean the same thing.

use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::fmt;

/// Separator for multi-valued fields in flat rows.
pub const MULTI_VALUE_SEPARATOR: &str = "|";

/// How a field holds its values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    /// One string
    Scalar,
    /// Unordered, duplicate-free strings
    Set,
    /// Ordered strings
    List,
}

macro_rules! output_fields {
    ($($variant:ident => $name:literal, $kind:ident;)+) => {
        /// A field of the output schema.
        #[allow(missing_docs)]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum OutputField {
            $($variant,)+
        }

        impl OutputField {
            /// Every field, in output column order.
            pub const ALL: &'static [OutputField] = &[$(OutputField::$variant,)+];

            /// Column / index field name.
            #[must_use]
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(OutputField::$variant => $name,)+
                }
            }

            /// How the field holds its values.
            #[must_use]
            pub const fn kind(self) -> ValueKind {
                match self {
                    $(OutputField::$variant => ValueKind::$kind,)+
                }
            }

            /// Look a field up by name.
            #[must_use]
            pub fn from_name(name: &str) -> Option<Self> {
                match name {
                    $($name => Some(OutputField::$variant),)+
                    _ => None,
                }
            }
        }
    };
}

output_fields! {
    Id => "id", Scalar;
    Access => "access", Scalar;
    Audience => "audience", Scalar;
    Author => "author", Scalar;
    BibNum => "bib_num", Scalar;
    Callnum => "callnum", Scalar;
    CallnumLayerOne => "callnumlayerone", Scalar;
    Collection => "collection", Set;
    Contents => "contents", List;
    CorporateName => "corporate_name", List;
    CtrlNum => "ctrl_num", Scalar;
    Description => "description", List;
    Era => "era", Set;
    Format => "format", Scalar;
    FullTitle => "full_title", Scalar;
    FullLcSubject => "full_lc_subject", Set;
    Genre => "genre", Set;
    Holdings => "holdings", List;
    Imprint => "imprint", Scalar;
    Isbn => "isbn", List;
    Issn => "issn", Scalar;
    ItemIds => "item_ids", List;
    Language => "language", Set;
    LanguageDubbed => "language_dubbed", Set;
    LanguageSubtitles => "language_subtitles", Set;
    LcFirstLetter => "lc_firstletter", Scalar;
    Location => "location", Set;
    MarcRecord => "marc_record", Scalar;
    OclcNum => "oclc_num", Scalar;
    Notes => "notes", List;
    PersonalName => "personal_name", List;
    Place => "place", Set;
    Publisher => "publisher", Scalar;
    PublisherLocation => "publisher_location", Scalar;
    Pubyear => "pubyear", Scalar;
    Series => "series", List;
    Summary => "summary", List;
    Title => "title", Scalar;
    TitleSort => "title_sort", Scalar;
    Topic => "topic", Set;
    Upc => "upc", List;
    Url => "url", List;
}

impl fmt::Display for OutputField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A stored field value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    /// Single string
    Text(String),
    /// Unordered strings
    Set(BTreeSet<String>),
    /// Ordered strings
    List(Vec<String>),
}

impl FieldValue {
    /// The values in output order.
    #[must_use]
    pub fn values(&self) -> Vec<&str> {
        match self {
            FieldValue::Text(s) => vec![s.as_str()],
            FieldValue::Set(set) => set.iter().map(String::as_str).collect(),
            FieldValue::List(list) => list.iter().map(String::as_str).collect(),
        }
    }

    /// Values joined for a flat row.
    #[must_use]
    pub fn joined(&self) -> String {
        self.values().join(MULTI_VALUE_SEPARATOR)
    }

    fn to_json(&self, as_array: bool) -> Value {
        match self {
            FieldValue::Text(s) => Value::String(s.clone()),
            _ if as_array => Value::Array(
                self.values()
                    .into_iter()
                    .map(|v| Value::String(v.to_string()))
                    .collect(),
            ),
            _ => Value::String(self.joined()),
        }
    }
}

/// A normalized, search-ready document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NormalizedDocument {
    fields: BTreeMap<OutputField, FieldValue>,
}

impl NormalizedDocument {
    /// An empty document.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a field to a single string, replacing any value. Empty strings
    /// are not stored.
    ///
    /// Multi-valued fields receive the string as their only value.
    pub fn set_text(&mut self, field: OutputField, value: impl Into<String>) {
        let value = value.into();
        self.fields.remove(&field);
        if field.kind() == ValueKind::Scalar {
            if !value.is_empty() {
                self.fields.insert(field, FieldValue::Text(value));
            }
        } else {
            self.push(field, value);
        }
    }

    /// Add one value to a multi-valued field, or set a scalar field that
    /// has no value yet. Empty strings are ignored.
    pub fn push(&mut self, field: OutputField, value: impl Into<String>) {
        let value = value.into();
        if value.is_empty() {
            return;
        }
        match field.kind() {
            ValueKind::Scalar => {
                self.fields.entry(field).or_insert(FieldValue::Text(value));
            },
            ValueKind::Set => {
                if let FieldValue::Set(set) = self
                    .fields
                    .entry(field)
                    .or_insert_with(|| FieldValue::Set(BTreeSet::new()))
                {
                    set.insert(value);
                }
            },
            ValueKind::List => {
                if let FieldValue::List(list) = self
                    .fields
                    .entry(field)
                    .or_insert_with(|| FieldValue::List(Vec::new()))
                {
                    list.push(value);
                }
            },
        }
    }

    /// Add several values; see [`push`](Self::push).
    pub fn extend<I, S>(&mut self, field: OutputField, values: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for value in values {
            self.push(field, value);
        }
    }

    /// Append values to a list field, keeping empty entries so the list
    /// stays position-aligned with a parallel field. Other field kinds
    /// behave like [`extend`](Self::extend).
    pub fn extend_aligned<I, S>(&mut self, field: OutputField, values: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if field.kind() != ValueKind::List {
            self.extend(field, values);
            return;
        }
        let mut values = values.into_iter().map(Into::into).peekable();
        if values.peek().is_none() {
            return;
        }
        if let FieldValue::List(list) = self
            .fields
            .entry(field)
            .or_insert_with(|| FieldValue::List(Vec::new()))
        {
            list.extend(values);
        }
    }

    /// Stored value of a field.
    #[must_use]
    pub fn get(&self, field: OutputField) -> Option<&FieldValue> {
        self.fields.get(&field)
    }

    /// Scalar value of a field.
    #[must_use]
    pub fn text(&self, field: OutputField) -> Option<&str> {
        match self.fields.get(&field)? {
            FieldValue::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// All values of a field, empty when absent.
    #[must_use]
    pub fn values(&self, field: OutputField) -> Vec<&str> {
        self.fields
            .get(&field)
            .map(FieldValue::values)
            .unwrap_or_default()
    }

    /// Whether a field has a value.
    #[must_use]
    pub fn contains(&self, field: OutputField) -> bool {
        self.fields.contains_key(&field)
    }

    /// Stored fields in schema order.
    pub fn iter(&self) -> impl Iterator<Item = (OutputField, &FieldValue)> {
        self.fields.iter().map(|(k, v)| (*k, v))
    }

    /// Flat row in [`OutputField::ALL`] order, multi-valued fields joined
    /// with [`MULTI_VALUE_SEPARATOR`].
    #[must_use]
    pub fn to_row(&self) -> Vec<String> {
        OutputField::ALL
            .iter()
            .map(|f| self.fields.get(f).map(FieldValue::joined).unwrap_or_default())
            .collect()
    }

    /// Header matching [`to_row`](Self::to_row).
    #[must_use]
    pub fn header() -> Vec<&'static str> {
        OutputField::ALL.iter().map(|f| f.as_str()).collect()
    }

    /// JSON object for index submission.
    ///
    /// Fields named in `multi_valued` (the index's multi-valued fields) are
    /// sent as arrays; other multi-valued fields are joined into one string
    /// the way flat rows are.
    #[must_use]
    pub fn to_index_json(&self, multi_valued: &HashSet<String>) -> Value {
        let mut map = Map::new();
        for (field, value) in &self.fields {
            let as_array = multi_valued.contains(field.as_str());
            map.insert(field.as_str().to_string(), value.to_json(as_array));
        }
        Value::Object(map)
    }
}

impl Serialize for NormalizedDocument {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (field, value) in &self.fields {
            match value {
                FieldValue::Text(s) => map.serialize_entry(field.as_str(), s)?,
                _ => map.serialize_entry(field.as_str(), &value.values())?,
            }
        }
        map.end()
    }
}
