//! Declarative tag rules for descriptive fields.
//!
//! Each [`TagRule`] names the source tags, the output field and how a source
//! field is rendered. Rules run in table order and every occurrence of every
//! listed tag is visited; scalar outputs keep the first value produced.

use crate::document::{NormalizedDocument, OutputField};
use crate::extract::FieldIssue;
use crate::record::{Field, Record};

/// How a source field becomes output values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Render {
    /// [`Field::format_field`]
    Formatted,
    /// [`Field::value`]
    Value,
    /// Each value of one subfield
    EachSubfield(char),
    /// Listed subfields, trimmed and joined with a space, one value per field
    Joined(&'static [char]),
}

impl Render {
    /// Render one field. A field that lacks every subfield the rendering
    /// needs is an error; the reason names the missing codes.
    pub fn apply(self, field: &Field) -> Result<Vec<String>, String> {
        match self {
            Render::Formatted => Ok(vec![field.format_field()]),
            Render::Value => Ok(vec![field.value()]),
            Render::EachSubfield(code) => {
                let values: Vec<String> = field
                    .subfields_by_code(code)
                    .map(|v| v.trim().to_string())
                    .collect();
                if values.is_empty() {
                    Err(format!("{} has no ${code}", field.tag))
                } else {
                    Ok(values)
                }
            },
            Render::Joined(codes) => {
                let parts: Vec<&str> = field
                    .get_subfields(codes)
                    .into_iter()
                    .map(str::trim)
                    .filter(|p| !p.is_empty())
                    .collect();
                if parts.is_empty() {
                    let codes: String = codes.iter().collect();
                    Err(format!("{} has none of ${codes}", field.tag))
                } else {
                    Ok(vec![parts.join(" ")])
                }
            },
        }
    }
}

/// One source-to-output mapping.
#[derive(Debug, Clone, Copy)]
pub struct TagRule {
    /// Source tags, visited in this order
    pub tags: &'static [&'static str],
    /// Output field
    pub target: OutputField,
    /// Rendering of each source field
    pub render: Render,
}

/// Note fields merged into `notes`.
pub const NOTE_TAGS: &[&str] = &[
    "500", "501", "502", "503", "504", "505", "506", "507", "509", "510", "512", "513", "514",
    "515", "516", "517", "518", "519", "521", "545", "547", "590",
];

/// Descriptive field rules.
pub const RULES: &[TagRule] = &[
    TagRule { tags: &["100", "110", "111"], target: OutputField::Author, render: Render::Formatted },
    TagRule { tags: &["245"], target: OutputField::FullTitle, render: Render::Formatted },
    TagRule { tags: &["260"], target: OutputField::Imprint, render: Render::Formatted },
    TagRule { tags: &["300"], target: OutputField::Description, render: Render::Value },
    TagRule { tags: &["440", "490"], target: OutputField::Series, render: Render::Joined(&['a', 'v']) },
    TagRule { tags: NOTE_TAGS, target: OutputField::Notes, render: Render::Value },
    TagRule { tags: &["505"], target: OutputField::Contents, render: Render::EachSubfield('a') },
    TagRule { tags: &["520"], target: OutputField::Summary, render: Render::Value },
    TagRule {
        tags: &["700"],
        target: OutputField::PersonalName,
        render: Render::Joined(&['a', 'b', 'c', 'd']),
    },
    TagRule { tags: &["710"], target: OutputField::CorporateName, render: Render::Joined(&['a', 'b']) },
    TagRule { tags: &["856"], target: OutputField::Url, render: Render::EachSubfield('u') },
];

/// Run `rules` over a record.
pub fn apply_rules(
    rules: &[TagRule],
    record: &Record,
    doc: &mut NormalizedDocument,
    issues: &mut Vec<FieldIssue>,
) {
    for rule in rules {
        for field in record.fields_by_tags(rule.tags) {
            match rule.render.apply(field) {
                Ok(values) => doc.extend(rule.target, values),
                Err(reason) => issues.push(FieldIssue::new(rule.target, reason)),
            }
        }
    }
}
