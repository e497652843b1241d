//! Serial check-in table loading.
//!
//! Each row of the check-in export is `[id+check, <unused>, issn, tokens...]`.
//! Tokens are read right to left. A URL token (`http...`, optionally followed
//! by a space and a label) opens a slot; a holdings token (starting with a
//! digit) fills the next unfilled slot with a link to that slot's URL and the
//! formatted statement. Anything else is ignored.
//!
//! Loading is best-effort. Unreadable rows and tokens that cannot be paired
//! are logged and skipped; slots that never receive a holdings token end up
//! as empty strings, so every row has one holdings entry per URL.

use crate::error::Result;
use crate::holdings::statement::format_statement;
use csv::{ByteRecord, ReaderBuilder};
use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info, warn};

/// Check-in data for one bibliographic record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HoldingsRow {
    /// ISSN, when the row carries one
    pub issn: Option<String>,
    /// Access URLs, most recent first
    pub urls: Vec<String>,
    /// Holdings display strings, one per URL
    pub holdings: Vec<String>,
}

impl HoldingsRow {
    /// Build a row from its token columns (index 3 onward).
    #[must_use]
    pub fn from_tokens<'a>(issn: Option<String>, tokens: impl DoubleEndedIterator<Item = &'a str>) -> Self {
        let mut urls: Vec<String> = Vec::new();
        let mut slots: Vec<Slot> = Vec::new();
        let mut next = 0;

        for token in tokens.rev() {
            let token = token.trim();
            if token.get(..4).is_some_and(|p| p.eq_ignore_ascii_case("http")) {
                let (url, label) = token.split_once(' ').unwrap_or((token, ""));
                urls.push(url.to_string());
                slots.push(Slot::Label(format!("{label} ")));
            } else if token.starts_with(|c: char| c.is_ascii_digit()) {
                let Some(url) = urls.get(next) else {
                    debug!(token, "holdings token has no URL to pair with, dropped");
                    continue;
                };
                let pretty = match format_statement(token) {
                    s if s.is_empty() => token.to_string(),
                    s => s,
                };
                let label = match &slots[next] {
                    Slot::Label(label) => label.as_str(),
                    Slot::Paired(_) => "",
                };
                slots[next] = Slot::Paired(format!("<a href=\"{url}\">{label}</a> {pretty}"));
                next += 1;
            }
        }

        HoldingsRow {
            issn,
            urls,
            holdings: slots
                .into_iter()
                .map(|slot| match slot {
                    Slot::Paired(html) => html,
                    Slot::Label(_) => String::new(),
                })
                .collect(),
        }
    }
}

enum Slot {
    Label(String),
    Paired(String),
}

/// Check-in rows keyed by bibliographic ID.
///
/// Built once before a run and read-only afterwards.
#[derive(Debug, Clone, Default)]
pub struct HoldingsTable {
    rows: HashMap<String, HoldingsRow>,
}

impl HoldingsTable {
    /// Load a check-in export from disk.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`](crate::Error::Io) if the file cannot be opened.
    /// Problems inside the file never fail the load.
    pub fn load_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let table = Self::load_reader(File::open(path)?);
        info!(path = %path.display(), rows = table.len(), "loaded holdings table");
        Ok(table)
    }

    /// Load a check-in export from any reader.
    pub fn load_reader<R: Read>(reader: R) -> Self {
        let mut csv = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(reader);
        let mut rows = HashMap::new();
        let mut record = ByteRecord::new();

        loop {
            match csv.read_byte_record(&mut record) {
                Ok(true) => {},
                Ok(false) => break,
                Err(e) => {
                    if e.is_io_error() {
                        warn!(error = %e, "holdings table read aborted");
                        break;
                    }
                    warn!(error = %e, "skipping unreadable holdings row");
                    continue;
                },
            }
            let columns: Vec<String> = record
                .iter()
                .map(|c| String::from_utf8_lossy(c).into_owned())
                .collect();
            if let Some((id, row)) = parse_row(&columns) {
                rows.insert(id, row);
            }
        }

        HoldingsTable { rows }
    }

    /// Build a table from already-parsed rows.
    #[must_use]
    pub fn from_rows(rows: impl IntoIterator<Item = (String, HoldingsRow)>) -> Self {
        HoldingsTable {
            rows: rows.into_iter().collect(),
        }
    }

    /// Row for a bibliographic ID.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&HoldingsRow> {
        self.rows.get(id)
    }

    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Parse one row; rows without an ID are skipped.
fn parse_row(columns: &[String]) -> Option<(String, HoldingsRow)> {
    let raw_id = columns.first()?.trim();
    let mut id = raw_id.to_string();
    id.pop();
    if id.is_empty() {
        debug!(raw_id, "holdings row without usable ID skipped");
        return None;
    }

    let issn = columns
        .get(2)
        .map(|c| c.trim())
        .filter(|c| c.chars().count() > 1)
        .map(str::to_string);
    let tokens = columns.get(3..).unwrap_or_default();

    Some((id, HoldingsRow::from_tokens(issn, tokens.iter().map(String::as_str))))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn load(text: &str) -> HoldingsTable {
        HoldingsTable::load_reader(text.as_bytes())
    }

    #[test]
    fn test_pairs_url_and_holdings() {
        let table = load("b12345678,x,1234-5678,1.1 2002- 01- 01-,http://example.org/j JSTOR\n");
        let row = table.get("b1234567").unwrap();

        assert_eq!(row.issn.as_deref(), Some("1234-5678"));
        assert_eq!(row.urls, vec!["http://example.org/j"]);
        assert_eq!(
            row.holdings,
            vec![r#"<a href="http://example.org/j">JSTOR </a> (Jan. 01, 2002)-"#]
        );
    }

    #[test]
    fn test_url_without_holdings_gets_empty_slot() {
        let table = load(
            "b11111111,,,1.1 2002- 01- 01-,http://a.example HeinOnline,http://b.example\n",
        );
        let row = table.get("b1111111").unwrap();

        assert_eq!(row.issn, None);
        assert_eq!(row.urls, vec!["http://b.example", "http://a.example"]);
        assert_eq!(row.holdings.len(), 2);
        assert_eq!(row.holdings[0], r#"<a href="http://b.example"> </a> (Jan. 01, 2002)-"#);
        assert_eq!(row.holdings[1], "");
    }

    #[test]
    fn test_holdings_without_url_dropped() {
        let table = load("b22222222,,,http://a.example Ebsco,1.1 2002- 01- 01-\n");
        let row = table.get("b2222222").unwrap();

        assert_eq!(row.urls, vec!["http://a.example"]);
        assert_eq!(row.holdings, vec![String::new()]);
    }

    #[test]
    fn test_other_tokens_ignored_and_case_insensitive_url() {
        let table = load("b33333333,,x,see note,HTTPS://c.example Gale\n");
        let row = table.get("b3333333").unwrap();

        assert_eq!(row.issn, None);
        assert_eq!(row.urls, vec!["HTTPS://c.example"]);
        assert_eq!(row.holdings, vec![String::new()]);
    }

    #[test]
    fn test_unformattable_holdings_kept_raw() {
        let row = HoldingsRow::from_tokens(None, ["2 issues on order", "http://d.example"].into_iter());
        assert_eq!(row.holdings, vec![r#"<a href="http://d.example"> </a> 2 issues on order"#]);
    }

    #[test]
    fn test_short_and_blank_rows() {
        let table = load("b\n,,\nb44444444\n");
        assert_eq!(table.len(), 1);
        let row = table.get("b4444444").unwrap();
        assert!(row.urls.is_empty());
        assert!(row.holdings.is_empty());
    }

    #[test]
    fn test_load_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("checkin.csv");
        std::fs::write(&path, "b55555555,,,http://e.example\n").unwrap();
        let table = HoldingsTable::load_path(&path).unwrap();
        assert_eq!(table.get("b5555555").unwrap().urls.len(), 1);
        assert!(HoldingsTable::load_path(dir.path().join("missing.csv")).is_err());
    }
}
