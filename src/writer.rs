//! Writing MARC records to binary format.
//!
//! This module provides [`MarcWriter`] for serializing [`Record`] instances
//! to ISO 2709 binary format that can be written to any destination
//! implementing [`std::io::Write`].
//!
//! # Examples
//!
//! ```
//! use marclink::{MarcWriter, Record, Field, Leader};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut buffer = Vec::new();
//! {
//!     let mut writer = MarcWriter::new(&mut buffer);
//!     let mut record = Record::new(Leader::default());
//!     let mut field = Field::new("245".to_string(), '1', '0');
//!     field.add_subfield('a', "Title".to_string());
//!     record.add_field(field);
//!     writer.write_record(&record)?;
//! }
//! # Ok(())
//! # }
//! ```

use crate::error::{MarclinkError, Result};
use crate::record::{FieldEntry, Record};
use std::io::Write;

const FIELD_TERMINATOR: u8 = 0x1E;
const SUBFIELD_DELIMITER: u8 = 0x1F;
const RECORD_TERMINATOR: u8 = 0x1D;

/// Writer for ISO 2709 binary MARC format.
///
/// `MarcWriter` serializes [`Record`] instances to ISO 2709 binary format,
/// writing fields in record order. Record length and base address in the
/// leader are recomputed for every record.
#[derive(Debug)]
pub struct MarcWriter<W: Write> {
    writer: W,
    records_written: usize,
    finished: bool,
}

impl<W: Write> MarcWriter<W> {
    /// Create a new MARC writer.
    ///
    /// # Arguments
    ///
    /// * `writer` - Any destination implementing [`std::io::Write`]
    pub fn new(writer: W) -> Self {
        MarcWriter {
            writer,
            records_written: 0,
            finished: false,
        }
    }

    /// Write a single MARC record.
    ///
    /// Serializes the record to ISO 2709 binary format and writes it to the
    /// underlying writer. Fields are emitted in the order they appear in the
    /// record's field sequence.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The record structure is invalid
    /// - An I/O error occurs during writing
    pub fn write_record(&mut self, record: &Record) -> Result<()> {
        if self.finished {
            return Err(MarclinkError::InvalidRecord(
                "Cannot write to a finished writer".to_string(),
            ));
        }

        // Build the data area first
        let mut data_area = Vec::new();
        let mut directory = Vec::new();
        let mut current_position = 0;

        for entry in record.entries() {
            let field_data = match entry {
                FieldEntry::Control(cf) => {
                    let mut bytes = cf.value.as_bytes().to_vec();
                    bytes.push(FIELD_TERMINATOR);
                    bytes
                },
                FieldEntry::Data(field) => {
                    let mut bytes = Vec::new();
                    bytes.push(field.indicator1 as u8);
                    bytes.push(field.indicator2 as u8);

                    for subfield in field.subfields() {
                        bytes.push(SUBFIELD_DELIMITER);
                        bytes.push(subfield.code as u8);
                        bytes.extend_from_slice(subfield.value.as_bytes());
                    }

                    bytes.push(FIELD_TERMINATOR);
                    bytes
                },
            };

            let field_length = field_data.len();

            // Add directory entry (tag(3) + length(4) + start position(5))
            directory.extend_from_slice(entry.tag().as_bytes());
            directory.extend_from_slice(format!("{field_length:04}").as_bytes());
            directory.extend_from_slice(format!("{current_position:05}").as_bytes());

            data_area.extend_from_slice(&field_data);
            current_position += field_length;
        }

        // Finalize directory
        directory.push(FIELD_TERMINATOR);

        // Calculate addresses and lengths
        let base_address = 24 + directory.len();
        let record_length = base_address + data_area.len() + 1; // +1 for record terminator

        // Update leader with correct values
        let mut leader = record.leader.clone();
        leader.record_length = u32::try_from(record_length).map_err(|_| {
            MarclinkError::InvalidRecord("Record length exceeds 4GB limit".to_string())
        })?;
        leader.data_base_address = u32::try_from(base_address).map_err(|_| {
            MarclinkError::InvalidRecord("Base address exceeds 4GB limit".to_string())
        })?;

        let leader_bytes = leader.as_bytes()?;
        self.writer.write_all(&leader_bytes)?;
        self.writer.write_all(&directory)?;
        self.writer.write_all(&data_area)?;
        self.writer.write_all(&[RECORD_TERMINATOR])?;

        self.records_written += 1;
        Ok(())
    }

    /// Flush the writer and mark it as finished.
    ///
    /// After calling `finish`, no more records can be written.
    ///
    /// # Errors
    ///
    /// Returns an error if flushing the underlying writer fails.
    pub fn finish(&mut self) -> Result<()> {
        self.writer.flush()?;
        self.finished = true;
        Ok(())
    }

    /// Returns the number of records written so far.
    #[must_use]
    pub fn records_written(&self) -> usize {
        self.records_written
    }
}
