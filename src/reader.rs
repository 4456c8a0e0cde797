//! Reading MARC records from binary streams.
//!
//! This module provides [`MarcReader`] for reading ISO 2709 formatted MARC
//! records from any source that implements [`std::io::Read`].
//!
//! # Examples
//!
//! Reading records from a file:
//!
//! ```no_run
//! use marclink::MarcReader;
//! use std::fs::File;
//!
//! let file = File::open("records.mrc")?;
//! let mut reader = MarcReader::new(file);
//!
//! while let Some(record) = reader.read_record()? {
//!     println!("Record type: {}", record.leader.record_type);
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use crate::error::{MarclinkError, Result};
use crate::leader::Leader;
use crate::record::{is_control_tag, ControlField, Field, FieldEntry, Record};
use std::io::Read;

const FIELD_TERMINATOR: u8 = 0x1E;
const SUBFIELD_DELIMITER: u8 = 0x1F;

/// Reader for ISO 2709 binary MARC format.
///
/// `MarcReader` reads one MARC record at a time from any source implementing
/// [`std::io::Read`]. Records are fully parsed and returned as [`Record`]
/// instances with fields in directory order.
#[derive(Debug)]
pub struct MarcReader<R: Read> {
    reader: R,
    records_read: usize,
}

impl<R: Read> MarcReader<R> {
    /// Create a new MARC reader.
    ///
    /// # Arguments
    ///
    /// * `reader` - Any source implementing [`std::io::Read`]
    pub fn new(reader: R) -> Self {
        MarcReader {
            reader,
            records_read: 0,
        }
    }

    /// Returns the number of records read so far.
    #[must_use]
    pub fn records_read(&self) -> usize {
        self.records_read
    }

    /// Read a single MARC record.
    ///
    /// Returns `Ok(Some(record))` if a record was successfully read,
    /// `Ok(None)` if EOF was reached, or `Err` if a parsing error occurred.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The binary data is malformed
    /// - The record structure is invalid
    /// - An I/O error occurs
    pub fn read_record(&mut self) -> Result<Option<Record>> {
        // Read the leader (24 bytes)
        let mut leader_bytes = vec![0u8; 24];
        match self.reader.read_exact(&mut leader_bytes) {
            Ok(()) => {},
            Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                // End of file
                return Ok(None);
            },
            Err(e) => return Err(MarclinkError::Io(e)),
        }

        let leader = Leader::from_bytes(&leader_bytes)?;
        leader.validate_for_reading()?;

        let record_length = leader.record_length as usize;
        let base_address = leader.data_base_address as usize;

        // Directory starts after leader, ends at base_address
        let directory_size = base_address - 24;

        let mut record_data = vec![0u8; record_length - 24];
        match self.reader.read_exact(&mut record_data) {
            Ok(()) => {},
            Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                return Err(MarclinkError::TruncatedRecord(
                    "Unexpected end of file while reading record data".to_string(),
                ));
            },
            Err(e) => return Err(MarclinkError::Io(e)),
        }

        if directory_size > record_data.len() {
            return Err(MarclinkError::InvalidRecord(
                "Base address exceeds record length".to_string(),
            ));
        }
        let directory = &record_data[..directory_size];
        let data = &record_data[directory_size..];

        let mut record = Record::new(leader);

        // Parse directory entries (12 bytes each: tag(3) + length(4) + start position(5)).
        // The directory is terminated with FIELD_TERMINATOR.
        let mut pos = 0;
        while pos < directory.len() {
            if directory[pos] == FIELD_TERMINATOR {
                // End of directory
                break;
            }

            if pos + 12 > directory.len() {
                return Err(MarclinkError::InvalidRecord(
                    "Incomplete directory entry".to_string(),
                ));
            }

            let entry_chunk = &directory[pos..pos + 12];
            let tag = String::from_utf8_lossy(&entry_chunk[0..3]).to_string();
            let field_length = parse_entry_digits(&entry_chunk[3..7])?;
            let start_position = parse_entry_digits(&entry_chunk[7..12])?;
            pos += 12;

            let end_position = start_position + field_length;
            if end_position > data.len() {
                return Err(MarclinkError::InvalidRecord(format!(
                    "Field {tag} exceeds data area"
                )));
            }

            let field_data = &data[start_position..end_position];

            // Fields are pushed in directory order so the record keeps the
            // control-then-data run exactly as stored.
            if is_control_tag(&tag) {
                let value = String::from_utf8_lossy(
                    &field_data[..field_data.len().saturating_sub(1)], // Remove field terminator
                )
                .to_string();
                record
                    .fields
                    .push(FieldEntry::Control(ControlField { tag, value }));
            } else {
                let field = parse_data_field(field_data, &tag)
                    .map_err(|e| MarclinkError::InvalidField(format!("Tag {tag}: {e}")))?;
                record.fields.push(FieldEntry::Data(field));
            }
        }

        self.records_read += 1;
        Ok(Some(record))
    }
}

/// Parse a data field from raw bytes
fn parse_data_field(data: &[u8], tag: &str) -> Result<Field> {
    if data.len() < 2 {
        return Err(MarclinkError::InvalidField(
            "Data field too short (needs indicators)".to_string(),
        ));
    }

    let indicator1 = data[0] as char;
    let indicator2 = data[1] as char;
    let mut field = Field::new(tag.to_string(), indicator1, indicator2);

    // Parse subfields
    let subfield_data = &data[2..];
    let mut current_position = 0;

    while current_position < subfield_data.len() {
        if subfield_data[current_position] == FIELD_TERMINATOR {
            // End of field
            break;
        }

        if subfield_data[current_position] == SUBFIELD_DELIMITER {
            current_position += 1;
            if current_position >= subfield_data.len() {
                break;
            }

            let code = subfield_data[current_position] as char;
            current_position += 1;

            // Find next subfield or field terminator
            let mut end = current_position;
            while end < subfield_data.len()
                && subfield_data[end] != SUBFIELD_DELIMITER
                && subfield_data[end] != FIELD_TERMINATOR
            {
                end += 1;
            }

            let value = String::from_utf8_lossy(&subfield_data[current_position..end]).to_string();
            field.add_subfield(code, value);
            current_position = end;
        } else {
            return Err(MarclinkError::InvalidField(
                "Expected subfield delimiter".to_string(),
            ));
        }
    }

    Ok(field)
}

/// Parse an ASCII-digit directory entry number (4 or 5 bytes)
fn parse_entry_digits(bytes: &[u8]) -> Result<usize> {
    let mut result = 0usize;
    for &byte in bytes {
        if byte.is_ascii_digit() {
            result = result * 10 + (byte - b'0') as usize;
        } else {
            return Err(MarclinkError::InvalidRecord(format!(
                "Invalid numeric field: expected digits, got byte {}",
                byte as char
            )));
        }
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const RECORD_TERMINATOR: u8 = 0x1D;

    /// Hand-assemble a minimal single-record MARC stream.
    fn build_record_bytes(with_control: bool) -> Vec<u8> {
        let mut directory = Vec::new();
        let mut data_area = Vec::new();

        if with_control {
            let mut field_001 = Vec::new();
            field_001.extend_from_slice(b"12345");
            field_001.push(FIELD_TERMINATOR);
            directory.extend_from_slice(b"001");
            directory.extend_from_slice(format!("{:04}", field_001.len()).as_bytes());
            directory.extend_from_slice(format!("{:05}", data_area.len()).as_bytes());
            data_area.extend_from_slice(&field_001);
        }

        let mut field_245 = Vec::new();
        field_245.extend_from_slice(b"10"); // Indicators
        field_245.push(SUBFIELD_DELIMITER);
        field_245.push(b'a');
        field_245.extend_from_slice(b"Test title");
        field_245.push(FIELD_TERMINATOR);
        directory.extend_from_slice(b"245");
        directory.extend_from_slice(format!("{:04}", field_245.len()).as_bytes());
        directory.extend_from_slice(format!("{:05}", data_area.len()).as_bytes());
        data_area.extend_from_slice(&field_245);

        let base_address = 24 + directory.len() + 1; // +1 for directory terminator
        directory.push(FIELD_TERMINATOR);
        let record_length = base_address + data_area.len() + 1;

        let mut record_bytes = Vec::new();
        record_bytes.extend_from_slice(format!("{record_length:05}").as_bytes());
        record_bytes.extend_from_slice(b"nam a22");
        record_bytes.extend_from_slice(format!("{base_address:05}").as_bytes());
        record_bytes.extend_from_slice(b"   4500");
        record_bytes.extend_from_slice(&directory);
        record_bytes.extend_from_slice(&data_area);
        record_bytes.push(RECORD_TERMINATOR);
        record_bytes
    }

    #[test]
    fn test_read_simple_record() {
        let cursor = Cursor::new(build_record_bytes(false));
        let mut reader = MarcReader::new(cursor);

        let record = reader.read_record().unwrap().unwrap();

        assert_eq!(record.leader.record_type, 'a');
        let field = record.get_field("245").unwrap();
        assert_eq!(field.indicator1, '1');
        assert_eq!(field.indicator2, '0');
        assert_eq!(field.get_subfield('a'), Some("Test title"));
    }

    #[test]
    fn test_read_preserves_field_order() {
        let cursor = Cursor::new(build_record_bytes(true));
        let mut reader = MarcReader::new(cursor);

        let record = reader.read_record().unwrap().unwrap();
        let tags: Vec<&str> = record.entries().map(FieldEntry::tag).collect();
        assert_eq!(tags, vec!["001", "245"]);
        assert!(record.has_ordered_fields());
        assert_eq!(record.control_number(), Some("12345"));
    }

    #[test]
    fn test_eof_returns_none() {
        let cursor = Cursor::new(Vec::new());
        let mut reader = MarcReader::new(cursor);

        let result = reader.read_record().unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_read_multiple_records() {
        let mut all_bytes = build_record_bytes(true);
        all_bytes.extend_from_slice(&build_record_bytes(true));

        let cursor = Cursor::new(all_bytes);
        let mut reader = MarcReader::new(cursor);

        assert!(reader.read_record().unwrap().is_some());
        assert!(reader.read_record().unwrap().is_some());
        assert!(reader.read_record().unwrap().is_none());
        assert_eq!(reader.records_read(), 2);
    }

    #[test]
    fn test_truncated_record_is_error() {
        let mut bytes = build_record_bytes(true);
        bytes.truncate(bytes.len() - 10);

        let cursor = Cursor::new(bytes);
        let mut reader = MarcReader::new(cursor);
        let result = reader.read_record();
        assert!(matches!(result, Err(MarclinkError::TruncatedRecord(_))));
    }

    #[test]
    fn test_malformed_leader_record_length_too_small() {
        let leader = b"00010nam a2200025 i 4500";
        let cursor = Cursor::new(leader.to_vec());
        let mut reader = MarcReader::new(cursor);
        let result = reader.read_record();
        assert!(result.is_err(), "expected Err for record_length < 24");
        let err = result.unwrap_err().to_string();
        assert!(
            err.contains("Record length must be at least 24"),
            "got: {err}"
        );
    }

    #[test]
    fn test_malformed_leader_base_address_too_small() {
        let leader = b"00050nam a2200010 i 4500";
        let cursor = Cursor::new(leader.to_vec());
        let mut reader = MarcReader::new(cursor);
        let result = reader.read_record();
        assert!(result.is_err(), "expected Err for base_address < 24");
        let err = result.unwrap_err().to_string();
        assert!(
            err.contains("Base address of data must be at least 24"),
            "got: {err}"
        );
    }
}
