//! Serial holdings from the check-in export.
//!
//! - [`statement`]: turns raw holdings tokens into display text
//! - [`table`]: loads the check-in export into a [`HoldingsTable`]

pub mod statement;
pub mod table;

pub use statement::{format_statement, HoldingsStatement};
pub use table::{HoldingsRow, HoldingsTable};
