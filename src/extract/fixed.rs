//! Fixed-length data elements (`008`): publication year, audience, language.

use crate::document::{NormalizedDocument, OutputField};
use crate::extract::FieldIssue;
use crate::record::Record;
use crate::tables::LookupTables;

/// Pick a publication year from the two `008` date slots (positions 7-10
/// and 11-14).
///
/// The more specific date wins, judged by how many leading digits it has
/// (`196u` beats `19uu`). Two complete years resolve to the earlier one, and
/// an open end date (`9999`) always defers to the start date. Unknown digits
/// are rendered as `-`; a date with no leading digit yields an empty string.
///
/// ```
/// use bibindex::extract::publication_year;
///
/// assert_eq!(publication_year("1983", "    "), "1983");
/// assert_eq!(publication_year("1998", "1996"), "1996");
/// assert_eq!(publication_year("19uu", "196u"), "196-");
/// assert_eq!(publication_year("2001", "9999"), "2001");
/// assert_eq!(publication_year("uuuu", "uuuu"), "");
/// ```
#[must_use]
pub fn publication_year(date1: &str, date2: &str) -> String {
    let start = leading_digits(date1);
    let end = leading_digits(date2);

    let date = if start == 4 && end == 4 {
        date1.min(date2)
    } else if date2.starts_with("9999") || start >= end {
        date1
    } else {
        date2
    };

    if !date.starts_with(|c: char| c.is_ascii_digit()) {
        return String::new();
    }
    date.chars()
        .take(4)
        .map(|c| if c.is_ascii_digit() { c } else { '-' })
        .collect()
}

fn leading_digits(date: &str) -> usize {
    date.chars().take(4).take_while(char::is_ascii_digit).count()
}

/// Fill `pubyear`, `audience` and `language` from the `008`.
///
/// Positions beyond the end of a short `008` are treated as absent.
pub(crate) fn apply(
    record: &Record,
    tables: &LookupTables,
    doc: &mut NormalizedDocument,
    issues: &mut Vec<FieldIssue>,
) {
    let Some(f008) = record.get_control_field("008") else {
        return;
    };

    match (record.control_slice("008", 7, 11), record.control_slice("008", 11, 15)) {
        (Some(date1), Some(date2)) => {
            doc.set_text(OutputField::Pubyear, publication_year(&date1, &date2));
        },
        _ => issues.push(FieldIssue::new(
            OutputField::Pubyear,
            format!("008 too short for dates ({} characters)", f008.chars().count()),
        )),
    }

    if let Some(code) = record.control_char("008", 22).filter(|c| *c != ' ') {
        match tables.audience(code) {
            Some(audience) => doc.set_text(OutputField::Audience, audience),
            None => issues.push(FieldIssue::new(
                OutputField::Audience,
                format!("unknown audience code {code:?}"),
            )),
        }
    }

    if let Some(code) = record.control_slice("008", 35, 38) {
        if let Some(language) = tables.language(&code) {
            doc.set_text(OutputField::Language, language);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::leader::Leader;

    fn record_with_008(f008: &str) -> Record {
        Record::builder(Leader::default())
            .control_field_str("008", f008)
            .build()
    }

    fn run(f008: &str) -> (NormalizedDocument, Vec<FieldIssue>) {
        let tables = LookupTables::default();
        let mut doc = NormalizedDocument::new();
        let mut issues = Vec::new();
        apply(&record_with_008(f008), &tables, &mut doc, &mut issues);
        (doc, issues)
    }

    #[test]
    fn test_year_selection() {
        assert_eq!(publication_year("1983", "1990"), "1983");
        assert_eq!(publication_year("19uu", "1995"), "1995");
        assert_eq!(publication_year("199u", "19uu"), "199-");
        assert_eq!(publication_year("19uu", "9999"), "19--");
        assert_eq!(publication_year("    ", "    "), "");
        assert_eq!(publication_year("u995", "    "), "");
    }

    #[test]
    fn test_full_008() {
        let (doc, issues) = run("830101s1983    nyu    j      000 0 eng d");
        assert!(issues.is_empty());
        assert_eq!(doc.text(OutputField::Pubyear), Some("1983"));
        assert_eq!(doc.text(OutputField::Audience), Some("Juvenile"));
        assert_eq!(doc.values(OutputField::Language), vec!["English"]);
    }

    #[test]
    fn test_blank_audience_and_unknown_language() {
        let (doc, issues) = run("830101s1983    nyu           000 0 zzz d");
        assert!(issues.is_empty());
        assert!(!doc.contains(OutputField::Audience));
        assert!(!doc.contains(OutputField::Language));
    }

    #[test]
    fn test_unknown_audience_is_an_issue() {
        let (doc, issues) = run("830101s1983    nyu    q      000 0 eng d");
        assert!(!doc.contains(OutputField::Audience));
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].field, OutputField::Audience);
    }

    #[test]
    fn test_short_008() {
        let (doc, issues) = run("830101s19");
        assert!(doc.iter().next().is_none());
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].field, OutputField::Pubyear);

        let (doc, issues) = run("830101s1983    nyu");
        assert!(issues.is_empty());
        assert_eq!(doc.text(OutputField::Pubyear), Some("1983"));
        assert!(!doc.contains(OutputField::Language));
    }
}
