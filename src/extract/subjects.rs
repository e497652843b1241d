//! Subject facets: genre, topic, era, place and full headings.

use crate::document::{NormalizedDocument, OutputField};
use crate::extract::{normalize, FieldIssue};
use crate::record::{Field, Record};

/// Subject access fields.
pub const SUBJECT_TAGS: [&str; 20] = [
    "600", "610", "611", "630", "648", "650", "651", "653", "654", "655", "656", "657", "658",
    "662", "690", "691", "696", "697", "698", "699",
];

/// Heading used for captioned video, never useful as a facet.
const EXCLUDED_HEADING: &str = "Video recordings for the hearing impaired.";

/// Subfields of a full heading, in output order.
const HEADING_ORDER: [char; 5] = ['a', 'v', 'x', 'y', 'z'];

/// Facet fed by each subdivision code.
fn subdivision_facet(code: char) -> Option<OutputField> {
    match code {
        'v' => Some(OutputField::Genre),
        'x' => Some(OutputField::Topic),
        'y' => Some(OutputField::Era),
        'z' => Some(OutputField::Place),
        _ => None,
    }
}

/// Facet fed directly by the `$a` of a few subject tags.
fn main_entry_facet(tag: &str) -> Option<OutputField> {
    match tag {
        "650" => Some(OutputField::Topic),
        "651" => Some(OutputField::Place),
        "655" => Some(OutputField::Genre),
        _ => None,
    }
}

/// Full heading: `a`, then `v`, `x`, `y`, `z` values, joined by ` -- `.
#[must_use]
pub fn full_heading(field: &Field) -> String {
    HEADING_ORDER
        .iter()
        .flat_map(|code| field.subfields_by_code(*code))
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .collect::<Vec<_>>()
        .join(" -- ")
}

/// Personal name from a `600`: titles, name, numeration, dates.
fn subject_name(field: &Field) -> Option<String> {
    let name = field.get_subfield('a')?;
    let parts: Vec<&str> = field
        .subfields_by_code('c')
        .chain(std::iter::once(name))
        .chain(field.subfields_by_code('b'))
        .chain(field.subfields_by_code('d'))
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect();
    Some(parts.join(" "))
}

pub(crate) fn apply(record: &Record, doc: &mut NormalizedDocument, issues: &mut Vec<FieldIssue>) {
    for field in record.fields_by_tags(&SUBJECT_TAGS) {
        for subfield in field.subfields() {
            if let Some(facet) = subdivision_facet(subfield.code) {
                doc.push(facet, normalize(&subfield.value));
            }
        }

        if let Some(facet) = main_entry_facet(&field.tag) {
            match field.get_subfield('a') {
                Some(EXCLUDED_HEADING) => {},
                Some(heading) => doc.push(facet, normalize(heading)),
                None => issues.push(FieldIssue::new(facet, format!("{} has no $a", field.tag))),
            }
        }

        doc.push(OutputField::FullLcSubject, full_heading(field));
    }

    for field in record.fields_by_tag("600") {
        match subject_name(field) {
            Some(name) => doc.push(OutputField::Topic, name),
            None => issues.push(FieldIssue::new(OutputField::Topic, "600 has no $a")),
        }
    }
}
