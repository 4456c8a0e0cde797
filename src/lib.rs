#![warn(missing_docs)]

//! # marclink
//!
//! Enrich MARC bibliographic records with authority-control identifiers.
//!
//! marclink reads ISO 2709 binary MARC records, looks up each record's 001
//! control number against the VIAF `sourceID` endpoint, and splices the
//! identifiers the service knows about (ISNI, VIAF, Wikidata) into the
//! record as `024` fields before writing it back out.
//!
//! ## Quick Start
//!
//! ```no_run
//! use marclink::{MarcReader, MarcWriter, ViafClient};
//! use marclink::pipeline::{process, ProcessOptions};
//! use std::fs::File;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut reader = MarcReader::new(File::open("records.mrc")?);
//! let mut writer = MarcWriter::new(File::create("enriched.mrc")?);
//! let resolver = ViafClient::new()?;
//!
//! let summary = process(
//!     &mut reader,
//!     &mut writer,
//!     &resolver,
//!     &ProcessOptions::default(),
//! )?;
//! println!("{} records enriched", summary.records_written);
//! # Ok(())
//! # }
//! ```
//!
//! Splicing alone, without the pipeline:
//!
//! ```
//! use marclink::{splice, IdentifierCodes, Leader, Record};
//!
//! let record = Record::builder(Leader::default())
//!     .control_field_str("001", "12345")
//!     .build();
//! let codes = IdentifierCodes {
//!     viaf: Some("12345".to_string()),
//!     ..IdentifierCodes::default()
//! };
//!
//! let enriched = splice(&record, &codes);
//! assert_eq!(enriched.get_fields("024").len(), 1);
//! ```
//!
//! ## Modules
//!
//! - [`record`] — Core MARC record structures (`Record`, `FieldEntry`, `Field`, `Subfield`)
//! - [`reader`] — Reading MARC records from binary data streams
//! - [`writer`] — Writing MARC records to binary format
//! - [`leader`] — MARC record leader (24-byte header)
//! - [`resolver`] — VIAF identifier lookups
//! - [`splice`] — Inserting identifier fields after the control field run
//! - [`pipeline`] — The sequential read/resolve/splice/write driver
//! - [`error`] — Error types and result type

pub mod error;
pub mod leader;
pub mod pipeline;
pub mod reader;
/// Core MARC record structures (`Record`, `FieldEntry`, `Field`, `Subfield`)
pub mod record;
pub mod resolver;
pub mod splice;
pub mod writer;

pub use error::{MarclinkError, Result};
pub use leader::Leader;
pub use pipeline::{ProcessOptions, ProcessSummary};
pub use reader::MarcReader;
pub use record::{ControlField, Field, FieldBuilder, FieldEntry, Record, RecordBuilder, Subfield};
pub use resolver::{IdentifierCodes, IdentifierResolver, ViafClient};
pub use splice::{authority_fields, splice, splice_index};
pub use writer::MarcWriter;
