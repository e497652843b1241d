#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

//! # bibindex
//!
//! Turns MARC 21 bibliographic records into flat, search-ready documents.
//!
//! ## Quick Start
//!
//! ```no_run
//! use bibindex::extract::{Extraction, Extractor};
//! use bibindex::formats::open_input;
//! use bibindex::holdings::HoldingsTable;
//! use bibindex::LookupTables;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let tables = LookupTables::default();
//! let holdings = HoldingsTable::load_path("checkin.csv")?;
//! let extractor = Extractor::new(&tables).with_holdings(&holdings);
//!
//! let mut reader = open_input("catalog.mrc")?;
//! while let Some(record) = reader.read_record()? {
//!     if let Extraction::Document { document, .. } = extractor.extract(&record) {
//!         println!("{}", serde_json::to_string(&document)?);
//!     }
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`record`], [`leader`]: record structures
//! - [`reader`], [`writer`], [`formats`]: binary record streams
//! - [`tables`]: lookup tables and site rules
//! - [`holdings`]: serial check-in holdings
//! - [`classify`]: format labels
//! - [`extract`]: record to [`NormalizedDocument`]
//! - [`index`], [`batch`]: index submission and batch runs
//! - [`shard`], [`sample`]: file splitting and sampling

pub mod batch;
pub mod breaker;
pub mod classify;
pub mod document;
pub mod error;
pub mod extract;
/// Record stream traits and input file handling.
pub mod formats;
pub mod holdings;
pub mod index;
pub mod leader;
pub mod reader;
/// Core record structures (`Record`, `Field`, `Subfield`)
pub mod record;
pub mod sample;
pub mod shard;
pub mod tables;
pub mod writer;

pub use classify::{FormatClassifier, FormatLabel};
pub use document::{FieldValue, NormalizedDocument, OutputField};
pub use error::{Error, Result};
pub use extract::{Extraction, Extractor, FieldIssue, IlsVariant};
pub use leader::Leader;
pub use reader::MarcReader;
pub use record::{Field, FieldBuilder, Record, RecordBuilder, Subfield};
pub use tables::LookupTables;
pub use writer::MarcWriter;
