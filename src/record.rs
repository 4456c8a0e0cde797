//! MARC bibliographic record structures and operations.
//!
//! This module provides the core record types:
//! - [`Record`] — Main bibliographic record structure
//! - [`FieldEntry`] — A positioned field, either control or data
//! - [`Field`] — Variable data fields (010+)
//! - [`Subfield`] — Named data elements within fields
//!
//! Fields are stored in a single ordered sequence, exactly as they appear in
//! the record's directory. A well-formed record keeps all control fields
//! (001-009) in a contiguous run at the front, followed by the variable data
//! fields; [`crate::splice`] relies on that ordering when inserting new
//! fields.
//!
//! # Examples
//!
//! Create a record with the builder API:
//!
//! ```
//! use marclink::{Record, Field, Leader};
//!
//! let record = Record::builder(Leader::default())
//!     .control_field_str("001", "12345")
//!     .field(
//!         Field::builder("245".to_string(), '1', '0')
//!             .subfield_str('a', "Title")
//!             .build(),
//!     )
//!     .build();
//!
//! assert_eq!(record.control_number(), Some("12345"));
//! ```

use crate::leader::Leader;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Returns true for control field tags (001-009).
///
/// Control fields carry a raw value without indicators or subfields.
#[must_use]
pub fn is_control_tag(tag: &str) -> bool {
    tag.len() == 3 && tag.starts_with('0') && tag.chars().all(char::is_numeric) && tag < "010"
}

/// A MARC bibliographic record.
///
/// Fields are stored in record order in a flat `Vec`, preserving the order
/// read from the directory. This ensures round-trip fidelity and makes
/// positional operations (such as splicing new fields after the control
/// field run) well defined.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Record {
    /// Record leader (24 bytes)
    pub leader: Leader,
    /// All fields in record order
    pub fields: Vec<FieldEntry>,
}

/// One positioned field within a record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldEntry {
    /// A control field (001-009): tag plus raw value.
    Control(ControlField),
    /// A variable data field (010+).
    Data(Field),
}

impl FieldEntry {
    /// The field's 3-character tag.
    #[must_use]
    pub fn tag(&self) -> &str {
        match self {
            FieldEntry::Control(cf) => &cf.tag,
            FieldEntry::Data(f) => &f.tag,
        }
    }

    /// Whether this entry is a control field.
    #[must_use]
    pub fn is_control(&self) -> bool {
        matches!(self, FieldEntry::Control(_))
    }
}

/// A control field (001-009): fixed structure, raw value, no subfields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlField {
    /// Field tag (3 digits)
    pub tag: String,
    /// Raw field value
    pub value: String,
}

/// A data field in a MARC record (fields 010 and higher)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    /// Field tag (3 digits)
    pub tag: String,
    /// First indicator
    pub indicator1: char,
    /// Second indicator
    pub indicator2: char,
    /// Subfields (stored in `SmallVec` to avoid allocation for typical fields with 4 or fewer subfields)
    pub subfields: SmallVec<[Subfield; 4]>,
}

/// A subfield within a field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subfield {
    /// Subfield code (single character)
    pub code: char,
    /// Subfield value
    pub value: String,
}

impl Record {
    /// Create a new MARC record with the given leader
    #[must_use]
    pub fn new(leader: Leader) -> Self {
        Record {
            leader,
            fields: Vec::new(),
        }
    }

    /// Create a builder for fluently constructing MARC records
    #[must_use]
    pub fn builder(leader: Leader) -> RecordBuilder {
        RecordBuilder {
            record: Record::new(leader),
        }
    }

    /// Add a control field (001-009).
    ///
    /// The field is inserted at the end of the leading control-field run so
    /// that the control-before-data ordering holds regardless of the order
    /// fields were added in.
    pub fn add_control_field(&mut self, tag: String, value: String) {
        let index = self
            .fields
            .iter()
            .rposition(FieldEntry::is_control)
            .map_or(0, |i| i + 1);
        self.fields
            .insert(index, FieldEntry::Control(ControlField { tag, value }));
    }

    /// Add a control field using string slices
    ///
    /// Convenience method that converts &str arguments to String automatically.
    pub fn add_control_field_str(&mut self, tag: &str, value: &str) {
        self.add_control_field(tag.to_string(), value.to_string());
    }

    /// Get a control field value
    #[must_use]
    pub fn get_control_field(&self, tag: &str) -> Option<&str> {
        self.fields.iter().find_map(|entry| match entry {
            FieldEntry::Control(cf) if cf.tag == tag => Some(cf.value.as_str()),
            _ => None,
        })
    }

    /// Get the control number (system number) from field 001
    #[must_use]
    pub fn control_number(&self) -> Option<&str> {
        self.get_control_field("001")
    }

    /// Add a data field at the end of the record
    pub fn add_field(&mut self, field: Field) {
        self.fields.push(FieldEntry::Data(field));
    }

    /// Get first data field with a given tag
    #[must_use]
    pub fn get_field(&self, tag: &str) -> Option<&Field> {
        self.data_fields().find(|f| f.tag == tag)
    }

    /// Get all data fields with a given tag, in record order
    #[must_use]
    pub fn get_fields(&self, tag: &str) -> Vec<&Field> {
        self.data_fields().filter(|f| f.tag == tag).collect()
    }

    /// Iterate over all field entries in record order
    pub fn entries(&self) -> impl Iterator<Item = &FieldEntry> {
        self.fields.iter()
    }

    /// Iterate over all data fields in record order
    pub fn data_fields(&self) -> impl Iterator<Item = &Field> {
        self.fields.iter().filter_map(|entry| match entry {
            FieldEntry::Data(f) => Some(f),
            FieldEntry::Control(_) => None,
        })
    }

    /// Iterate over all control fields as (tag, value) tuples
    pub fn control_fields(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().filter_map(|entry| match entry {
            FieldEntry::Control(cf) => Some((cf.tag.as_str(), cf.value.as_str())),
            FieldEntry::Data(_) => None,
        })
    }

    /// Iterate over data fields matching a specific tag
    pub fn fields_by_tag<'a>(&'a self, tag: &'a str) -> impl Iterator<Item = &'a Field> + 'a {
        self.data_fields().filter(move |f| f.tag == tag)
    }

    /// Check that all control fields form a contiguous run at the front.
    ///
    /// Reader output always satisfies this for records whose directory is
    /// conventionally ordered; splicing preserves it.
    #[must_use]
    pub fn has_ordered_fields(&self) -> bool {
        let first_data = self.fields.iter().position(|e| !e.is_control());
        match first_data {
            Some(i) => self.fields[i..].iter().all(|e| !e.is_control()),
            None => true,
        }
    }
}

/// Builder for fluently constructing MARC records
#[derive(Debug)]
pub struct RecordBuilder {
    record: Record,
}

impl RecordBuilder {
    /// Add a control field to the record being built
    #[must_use]
    pub fn control_field(mut self, tag: String, value: String) -> Self {
        self.record.add_control_field(tag, value);
        self
    }

    /// Add a control field using string slices
    #[must_use]
    pub fn control_field_str(mut self, tag: &str, value: &str) -> Self {
        self.record.add_control_field_str(tag, value);
        self
    }

    /// Add a data field to the record being built
    #[must_use]
    pub fn field(mut self, field: Field) -> Self {
        self.record.add_field(field);
        self
    }

    /// Build the record
    #[must_use]
    pub fn build(self) -> Record {
        self.record
    }
}

impl Field {
    /// Create a new data field
    #[must_use]
    pub fn new(tag: String, indicator1: char, indicator2: char) -> Self {
        Field {
            tag,
            indicator1,
            indicator2,
            subfields: SmallVec::new(),
        }
    }

    /// Create a builder for constructing fields fluently
    ///
    /// # Examples
    ///
    /// ```
    /// use marclink::Field;
    ///
    /// let field = Field::builder("245".to_string(), '1', '0')
    ///     .subfield('a', "The Great Gatsby".to_string())
    ///     .subfield('c', "F. Scott Fitzgerald".to_string())
    ///     .build();
    /// ```
    #[must_use]
    pub fn builder(tag: String, indicator1: char, indicator2: char) -> FieldBuilder {
        FieldBuilder {
            field: Field::new(tag, indicator1, indicator2),
        }
    }

    /// Add a subfield
    pub fn add_subfield(&mut self, code: char, value: String) {
        self.subfields.push(Subfield { code, value });
    }

    /// Add a subfield using a string slice
    ///
    /// Convenience method that converts &str to String automatically.
    pub fn add_subfield_str(&mut self, code: char, value: &str) {
        self.add_subfield(code, value.to_string());
    }

    /// Get first value for a subfield code
    #[must_use]
    pub fn get_subfield(&self, code: char) -> Option<&str> {
        self.subfields
            .iter()
            .find(|sf| sf.code == code)
            .map(|sf| sf.value.as_str())
    }

    /// Get all values for a subfield code
    #[must_use]
    pub fn get_subfield_values(&self, code: char) -> Vec<&str> {
        self.subfields
            .iter()
            .filter(|sf| sf.code == code)
            .map(|sf| sf.value.as_str())
            .collect()
    }

    /// Iterate over all subfields
    pub fn subfields(&self) -> impl Iterator<Item = &Subfield> {
        self.subfields.iter()
    }

    /// Get the field's content as a formatted string
    ///
    /// Concatenates all subfield values with spaces.
    #[must_use]
    pub fn value(&self) -> String {
        self.subfields
            .iter()
            .map(|sf| sf.value.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Builder for fluently constructing MARC fields
#[derive(Debug)]
pub struct FieldBuilder {
    field: Field,
}

impl FieldBuilder {
    /// Add a subfield to the field being built
    #[must_use]
    pub fn subfield(mut self, code: char, value: String) -> Self {
        self.field.add_subfield(code, value);
        self
    }

    /// Add a subfield using a string slice
    #[must_use]
    pub fn subfield_str(mut self, code: char, value: &str) -> Self {
        self.field.add_subfield_str(code, value);
        self
    }

    /// Build the field
    #[must_use]
    pub fn build(self) -> Field {
        self.field
    }
}
