//! Holdings statement formatting.
//!
//! Check-in systems export serial holdings as a caption code followed by
//! dash-joined ranges: `1.1 58- 1- 2004- 01- 01-` reads as volume 58,
//! issue 1, starting January 1, 2004, still open. The parser recognises
//! three independent pieces of that layout and drops any piece that is
//! only half present:
//!
//! - volume and issue, when the caption is followed by exactly five ranges
//! - start and end month/day, from the last two ranges
//! - start and end year, from the range before the month and day
//!
//! ```
//! use bibindex::holdings::format_statement;
//!
//! assert_eq!(format_statement("1.1 2002-2006 01-12 01-31"), "(Jan. 01, 2002)-(Dec. 31, 2006)");
//! assert_eq!(format_statement("1.1 58- 1- 2004- 01- 01-"), "v.58:no.1 (Jan. 01, 2004)-");
//! assert_eq!(format_statement("see current issues"), "");
//! ```

use chrono::NaiveDate;
use lazy_static::lazy_static;
use regex::Regex;
use std::fmt;

lazy_static! {
    static ref VOLUME_ISSUE: Regex =
        Regex::new(r"^\d+\.\d+\s+(\d*-\d*)\s+(\d*-\d*)\s+\d*-\d*\s+\d*-\d*\s+\d*-\d*\s*$").unwrap();
    static ref MONTH_DAY: Regex = Regex::new(r"(\d*)-(\d*)\s+(\d*)-(\d*)\s*$").unwrap();
    static ref YEARS: Regex = Regex::new(r"(\d*)-(\d*)\s+\d*-\d*\s+\d*-\d*\s*$").unwrap();
}

/// Any year works for rendering a month and day; a leap year keeps Feb. 29.
const RENDER_YEAR: i32 = 2000;

/// One end of a holdings range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    /// Rendered month and day, e.g. `Jan. 01`
    pub month_day: String,
    /// Four-digit year as written
    pub year: String,
}

/// A parsed holdings statement.
///
/// `Display` renders the human-readable form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HoldingsStatement {
    /// Volume designation
    pub volume: Option<String>,
    /// Issue number
    pub issue: Option<String>,
    /// First issue held
    pub start: Option<Endpoint>,
    /// Last issue held; `None` for open ranges
    pub end: Option<Endpoint>,
}

impl HoldingsStatement {
    /// Parse a raw holdings token. Never fails; unrecognised input parses to
    /// an empty statement.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let mut statement = HoldingsStatement::default();

        if let Some(caps) = VOLUME_ISSUE.captures(raw) {
            statement.volume = range_member(&caps[1]);
            statement.issue = range_member(&caps[2]);
        }

        let month_days = MONTH_DAY
            .captures(raw)
            .map(|caps| (month_day(&caps[1], &caps[3]), month_day(&caps[2], &caps[4])));
        let years = YEARS
            .captures(raw)
            .map(|caps| (non_empty(&caps[1]), non_empty(&caps[2])));

        if let (Some((start_md, end_md)), Some((start_year, end_year))) = (month_days, years) {
            statement.start = endpoint(start_md, start_year);
            statement.end = endpoint(end_md, end_year);
        }

        statement
    }

    /// Whether nothing was recognised.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.volume.is_none() && self.issue.is_none() && self.start.is_none() && self.end.is_none()
    }
}

impl fmt::Display for HoldingsStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = String::new();
        match (&self.volume, &self.issue) {
            (Some(v), Some(n)) => out.push_str(&format!("v.{v}:no.{n} ")),
            (Some(v), None) => out.push_str(&format!("v.{v} ")),
            (None, Some(n)) => out.push_str(&format!("no.{n} ")),
            (None, None) => {},
        }
        if let Some(start) = &self.start {
            out.push_str(&format!("({}, {})-", start.month_day, start.year));
        }
        if let Some(end) = &self.end {
            out.push_str(&format!("({}, {}) ", end.month_day, end.year));
        }
        f.write_str(out.trim_end())
    }
}

/// Format a raw holdings token for display.
#[must_use]
pub fn format_statement(raw: &str) -> String {
    HoldingsStatement::parse(raw).to_string()
}

/// Volume or issue from a range token: `58-` -> `58`, `58-60` kept, `-` dropped.
fn range_member(token: &str) -> Option<String> {
    if token.len() <= 1 {
        return None;
    }
    let member = token.strip_suffix('-').unwrap_or(token);
    non_empty(member)
}

fn non_empty(s: &str) -> Option<String> {
    (!s.is_empty()).then(|| s.to_string())
}

/// Render a month and day as `Jan. 01`; empty or impossible values yield `None`.
fn month_day(month: &str, day: &str) -> Option<String> {
    let month: u32 = month.parse().ok()?;
    let day: u32 = day.parse().ok()?;
    NaiveDate::from_ymd_opt(RENDER_YEAR, month, day).map(|d| d.format("%b. %d").to_string())
}

fn endpoint(month_day: Option<String>, year: Option<String>) -> Option<Endpoint> {
    Some(Endpoint {
        month_day: month_day?,
        year: year?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_range_without_volume() {
        assert_eq!(format_statement("1.1 2002- 01- 01-"), "(Jan. 01, 2002)-");
    }

    #[test]
    fn test_closed_range() {
        assert_eq!(
            format_statement("1.1 2002-2006 01-12 01-31"),
            "(Jan. 01, 2002)-(Dec. 31, 2006)"
        );
    }

    #[test]
    fn test_volume_and_issue() {
        assert_eq!(
            format_statement("1.1 58- 1- 2004- 01- 01-"),
            "v.58:no.1 (Jan. 01, 2004)-"
        );
    }

    #[test]
    fn test_volume_range_kept() {
        let statement = HoldingsStatement::parse("1.1 58-60 - 2004-2006 01-12 01-31");
        assert_eq!(statement.volume.as_deref(), Some("58-60"));
        assert_eq!(statement.issue, None);
        assert_eq!(
            statement.to_string(),
            "v.58-60 (Jan. 01, 2004)-(Dec. 31, 2006)"
        );
    }

    #[test]
    fn test_issue_without_volume() {
        assert_eq!(
            format_statement("1.1 - 3- 1999- 05- 15-"),
            "no.3 (May. 15, 1999)-"
        );
    }

    #[test]
    fn test_date_without_year_is_dropped() {
        assert_eq!(format_statement("1.1 01-12 01-31"), "");
    }

    #[test]
    fn test_impossible_date_is_dropped() {
        assert_eq!(format_statement("1.1 2002-2006 13-12 01-31"), "(Dec. 31, 2006)");
    }

    #[test]
    fn test_leap_day() {
        assert_eq!(format_statement("1.1 2004- 02- 29-"), "(Feb. 29, 2004)-");
    }

    #[test]
    fn test_unrecognised_input() {
        let statement = HoldingsStatement::parse("Library keeps current year only");
        assert!(statement.is_empty());
        assert_eq!(statement.to_string(), "");
        assert_eq!(format_statement(""), "");
    }
}
