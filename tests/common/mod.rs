//! Common test helpers shared across the integration suite.

#![allow(dead_code)]

use bibindex::writer::encode_record;
use bibindex::{Field, Leader, Record};

/// `008` for a 1983 English-language book with no audience code.
pub const BOOK_008: &str = "830101s1983    nyu           000 1 eng d";

/// Creates a leader for the given record type and bibliographic level.
pub fn create_test_leader(record_type: char, bibliographic_level: char) -> Leader {
    Leader {
        record_length: 0,
        record_status: 'n',
        record_type,
        bibliographic_level,
        control_record_type: ' ',
        character_coding: 'a',
        indicator_count: 2,
        subfield_code_count: 2,
        data_base_address: 0,
        encoding_level: ' ',
        cataloging_form: 'a',
        multipart_level: ' ',
        reserved: "4500".to_string(),
    }
}

/// Builds a data field from `(code, value)` pairs.
pub fn field(tag: &str, ind1: char, ind2: char, subfields: &[(char, &str)]) -> Field {
    let mut field = Field::new(tag.to_string(), ind1, ind2);
    for (code, value) in subfields {
        field.add_subfield_str(*code, value);
    }
    field
}

/// Creates a bare record with a III bibliographic ID in `907$a`.
///
/// `bib` is the ID as the catalogue shows it; the stored value gets the
/// leading period and trailing check character the export adds.
pub fn create_test_record(bib: &str) -> Record {
    let mut record = Record::new(create_test_leader('a', 'm'));
    record.add_control_field_str("001", "ocm00012345");
    record.add_control_field_str("008", BOOK_008);
    record.add_field(field("907", ' ', ' ', &[('a', &format!(".{bib}x"))]));
    record
}

/// Creates a realistic monograph record.
///
/// Includes title, imprint, physical description, notes, subjects, added
/// entries, a URL and a location code.
pub fn create_realistic_record(bib: &str) -> Record {
    let mut record = create_test_record(bib);

    record.add_field(field("020", ' ', ' ', &[('a', "0743273567 (pbk.)")]));
    record.add_field(field("050", ' ', '0', &[('a', "PS3511.I9"), ('b', "G7 2004")]));
    record.add_field(field("100", '1', ' ', &[('a', "Fitzgerald, F. Scott"), ('q', "(Francis Scott),"), ('d', "1896-1940.")]));
    record.add_field(field("245", '1', '4', &[('a', "The great Gatsby /"), ('c', "F. Scott Fitzgerald.")]));
    record.add_field(field("260", ' ', ' ', &[('a', "New York :"), ('b', "Scribner,"), ('c', "2004.")]));
    record.add_field(field("300", ' ', ' ', &[('a', "180 p. ;"), ('c', "21 cm.")]));
    record.add_field(field("490", '1', ' ', &[('a', "Scribner classics ;"), ('v', "3")]));
    record.add_field(field("500", ' ', ' ', &[('a', "Originally published: 1925.")]));
    record.add_field(field("520", ' ', ' ', &[('a', "A portrait of the Jazz Age.")]));
    record.add_field(field("650", ' ', '0', &[('a', "Rich people"), ('z', "New York (State)"), ('v', "Fiction.")]));
    record.add_field(field("651", ' ', '0', &[('a', "Long Island (N.Y.)"), ('v', "Fiction.")]));
    record.add_field(field("700", '1', ' ', &[('a', "Bruccoli, Matthew J.,"), ('d', "1931-2008.")]));
    record.add_field(field("856", '4', '1', &[('u', "http://example.org/gatsby")]));
    record.add_field(field("994", ' ', ' ', &[('a', "tstk(2)")]));

    record
}

/// Concatenated binary encoding of `records`.
pub fn encode_all(records: &[Record]) -> Vec<u8> {
    records
        .iter()
        .flat_map(|r| encode_record(r).expect("test record encodes"))
        .collect()
}
