//! Record IDs, suppression, standard numbers and call numbers.

use crate::document::{NormalizedDocument, OutputField};
use crate::extract::{normalize, FieldIssue, IlsVariant};
use crate::record::Record;
use crate::tables::{IdentifierRules, LookupTables};
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref ISBN: Regex = Regex::new(r"^(?:\b\d{10}\b|\b\d{13}\b)").unwrap();
    static ref UPC: Regex = Regex::new(r"^\b\d{12}\b").unwrap();
    static ref LC_LETTERS: Regex = Regex::new(r"[A-Z]+").unwrap();
}

/// Call number sources, most preferred first: SuDoc, local, local LC, LC.
const CALL_NUMBER_TAGS: [&str; 4] = ["086", "099", "090", "050"];

/// Drop the first and last character.
fn strip_ends(s: &str) -> &str {
    let mut chars = s.chars();
    chars.next();
    chars.next_back();
    chars.as_str()
}

/// Resolve the record's bibliographic ID.
///
/// The primary source is `907$a` for III exports and `001` otherwise. When
/// it is missing or too short, the first `035$a` that looks like a system
/// number (after stripping its first and last character) is used.
#[must_use]
pub fn resolve_id(record: &Record, ils: IlsVariant, rules: &IdentifierRules) -> Option<String> {
    let primary = match ils {
        IlsVariant::Iii => record
            .first_subfield("907", 'a')
            .map(str::trim)
            .filter(|id| id.chars().count() >= rules.min_primary_len)
            .map(strip_ends),
        IlsVariant::Generic => record
            .get_control_field("001")
            .map(str::trim)
            .filter(|id| !id.is_empty()),
    };

    primary
        .or_else(|| {
            record
                .fields_by_tag("035")
                .filter_map(|field| field.get_subfield('a'))
                .map(|value| strip_ends(value.trim()))
                .find(|id| rules.accepts_alternate(id))
        })
        .map(str::to_string)
}

/// Whether any `999$f` carries the suppression code.
#[must_use]
pub fn is_suppressed(record: &Record, rules: &IdentifierRules) -> bool {
    record
        .subfield_values("999", 'f')
        .any(|code| code.trim() == rules.suppression_code)
}

/// Standard numbers matching `pattern` at the start of each normalized `$a`.
fn standard_numbers(record: &Record, tag: &str, pattern: &Regex) -> Vec<String> {
    record
        .subfield_values(tag, 'a')
        .filter_map(|value| {
            let value = normalize(value);
            pattern.find(&value).map(|m| m.as_str().to_string())
        })
        .collect()
}

/// Fill `isbn`, `upc`, `callnum`, `callnumlayerone`, `lc_firstletter` and
/// `item_ids`.
pub(crate) fn apply(
    record: &Record,
    tables: &LookupTables,
    ils: IlsVariant,
    doc: &mut NormalizedDocument,
    issues: &mut Vec<FieldIssue>,
) {
    doc.extend(OutputField::Isbn, standard_numbers(record, "020", &ISBN));
    doc.extend(OutputField::Upc, standard_numbers(record, "024", &UPC));

    if let Some(field) = CALL_NUMBER_TAGS.iter().find_map(|tag| record.get_field(tag)) {
        match field.get_subfield('a') {
            Some(callnum) => {
                doc.set_text(OutputField::Callnum, callnum);
                doc.set_text(OutputField::CallnumLayerOne, callnum);
            },
            None => issues.push(FieldIssue::new(
                OutputField::Callnum,
                format!("{} has no $a", field.tag),
            )),
        }
    }

    match lc_call_number(record) {
        Ok(Some(callnum)) => {
            let class = LC_LETTERS
                .find(&callnum)
                .and_then(|letters| tables.lc_class(letters.as_str()));
            if let Some(class) = class {
                doc.set_text(OutputField::LcFirstLetter, class);
            }
        },
        Ok(None) => {},
        Err(reason) => issues.push(FieldIssue::new(OutputField::LcFirstLetter, reason)),
    }

    for item in record.subfield_values("945", 'y') {
        let item = match ils {
            IlsVariant::Iii => strip_ends(item.trim()),
            IlsVariant::Generic => item.trim(),
        };
        doc.push(OutputField::ItemIds, item);
    }
}

/// LC call number: `050` `$a` and `$b`, else `090$a`.
fn lc_call_number(record: &Record) -> Result<Option<String>, String> {
    if let Some(field) = record.get_field("050") {
        let Some(class) = field.get_subfield('a') else {
            return Err("050 has no $a".to_string());
        };
        let item = field.get_subfield('b').unwrap_or("");
        return Ok(Some(format!("{class}{item}")));
    }
    Ok(record.first_subfield("090", 'a').map(str::to_string))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::leader::Leader;
    use crate::record::Field;

    fn field(tag: &str, subfields: &[(char, &str)]) -> Field {
        let mut field = Field::new(tag.to_string(), ' ', ' ');
        for (code, value) in subfields {
            field.add_subfield_str(*code, value);
        }
        field
    }

    fn record(fields: Vec<Field>) -> Record {
        let mut record = Record::new(Leader::default());
        for f in fields {
            record.add_field(f);
        }
        record
    }

    fn run(record: &Record, ils: IlsVariant) -> (NormalizedDocument, Vec<FieldIssue>) {
        let tables = LookupTables::default();
        let mut doc = NormalizedDocument::new();
        let mut issues = Vec::new();
        apply(record, &tables, ils, &mut doc, &mut issues);
        (doc, issues)
    }

    #[test]
    fn test_primary_id() {
        let rules = IdentifierRules::default();
        let rec = record(vec![field("907", &[('a', ".b12345678")])]);
        assert_eq!(resolve_id(&rec, IlsVariant::Iii, &rules).as_deref(), Some("b1234567"));
    }

    #[test]
    fn test_short_primary_falls_back_to_035() {
        let rules = IdentifierRules::default();
        let rec = record(vec![
            field("907", &[('a', ".b123")]),
            field("035", &[('a', "(OCoLC)12345678")]),
            field("035", &[('a', ".b7654321x")]),
        ]);
        assert_eq!(resolve_id(&rec, IlsVariant::Iii, &rules).as_deref(), Some("b7654321"));
    }

    #[test]
    fn test_missing_id() {
        let rules = IdentifierRules::default();
        let rec = record(vec![field("035", &[('a', "(OCoLC)12345678")])]);
        assert_eq!(resolve_id(&rec, IlsVariant::Iii, &rules), None);
        assert_eq!(resolve_id(&rec, IlsVariant::Generic, &rules), None);
    }

    #[test]
    fn test_generic_id_from_001() {
        let rules = IdentifierRules::default();
        let mut rec = record(vec![]);
        rec.add_control_field_str("001", " ocm000123 ");
        assert_eq!(resolve_id(&rec, IlsVariant::Generic, &rules).as_deref(), Some("ocm000123"));
        assert_eq!(resolve_id(&rec, IlsVariant::Iii, &rules), None);
    }

    #[test]
    fn test_suppression() {
        let rules = IdentifierRules::default();
        let rec = record(vec![field("999", &[('f', "a"), ('f', "n")])]);
        assert!(is_suppressed(&rec, &rules));
        let rec = record(vec![field("999", &[('f', "a")])]);
        assert!(!is_suppressed(&rec, &rules));
    }

    #[test]
    fn test_standard_numbers() {
        let rec = record(vec![
            field("020", &[('a', "0316769487 (pbk.)")]),
            field("020", &[('a', "9780316769488")]),
            field("020", &[('a', "pbk. 0316769487")]),
            field("024", &[('a', "025192099125")]),
            field("024", &[('a', "12345")]),
        ]);
        let (doc, issues) = run(&rec, IlsVariant::Iii);
        assert!(issues.is_empty());
        assert_eq!(doc.values(OutputField::Isbn), vec!["0316769487", "9780316769488"]);
        assert_eq!(doc.values(OutputField::Upc), vec!["025192099125"]);
    }

    #[test]
    fn test_call_number_priority() {
        let rec = record(vec![
            field("050", &[('a', "PS3545"), ('b', ".A1")]),
            field("090", &[('a', "QA76 .B5")]),
        ]);
        let (doc, _) = run(&rec, IlsVariant::Iii);
        assert_eq!(doc.text(OutputField::Callnum), Some("QA76 .B5"));
        assert_eq!(doc.text(OutputField::CallnumLayerOne), Some("QA76 .B5"));
        assert_eq!(doc.text(OutputField::LcFirstLetter), Some("P - Language and Literature"));

        let rec = record(vec![
            field("086", &[('a', "Y 4.G 74/7")]),
            field("050", &[('a', "JK1")]),
        ]);
        let (doc, _) = run(&rec, IlsVariant::Iii);
        assert_eq!(doc.text(OutputField::Callnum), Some("Y 4.G 74/7"));
    }

    #[test]
    fn test_call_number_without_subfield_a() {
        let rec = record(vec![field("099", &[('b', "x")])]);
        let (doc, issues) = run(&rec, IlsVariant::Iii);
        assert!(!doc.contains(OutputField::Callnum));
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].field, OutputField::Callnum);
    }

    #[test]
    fn test_item_ids() {
        let rec = record(vec![field("945", &[('y', ".i10293847"), ('y', ".i20394857")])]);
        let (doc, _) = run(&rec, IlsVariant::Iii);
        assert_eq!(doc.values(OutputField::ItemIds), vec!["i1029384", "i2039485"]);
        let (doc, _) = run(&rec, IlsVariant::Generic);
        assert_eq!(doc.values(OutputField::ItemIds), vec![".i10293847", ".i20394857"]);
    }
}
