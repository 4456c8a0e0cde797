//! Splicing authority identifier fields into records.
//!
//! A well-formed MARC record keeps its control fields (001-009) in a
//! contiguous run before any variable field. New `024` identifier fields
//! therefore cannot simply be appended; they are inserted at the splice
//! index, the position immediately after the last control field. This
//! module implements that positional query and the insertion around it.
//!
//! Splicing is not idempotent: re-splicing an already-spliced record with
//! the same codes duplicates the inserted `024` fields. There is
//! deliberately no de-duplication guard.

use crate::record::{Field, FieldEntry, Record};
use crate::resolver::IdentifierCodes;

/// URI prefix for VIAF identifiers in `024 $a`.
pub const VIAF_URI_PREFIX: &str = "http://viaf.org/viaf/";

/// URI prefix for Wikidata entities in `024 $a`.
pub const WIKIDATA_URI_PREFIX: &str = "https://www.wikidata.org/wiki/";

/// Position immediately after the last control field.
///
/// Returns 0 for a record with no control fields. Stateless: re-derived
/// per record from the field sequence alone.
#[must_use]
pub fn splice_index(record: &Record) -> usize {
    record
        .fields
        .iter()
        .rposition(FieldEntry::is_control)
        .map_or(0, |i| i + 1)
}

/// Build the `024` identifier fields for the given codes.
///
/// Fields are produced in a fixed order (ISNI, VIAF, Wikidata), each only
/// when its code is present and non-empty.
#[must_use]
pub fn authority_fields(codes: &IdentifierCodes) -> Vec<Field> {
    let mut fields = Vec::new();

    if let Some(isni) = non_empty(codes.isni.as_deref()) {
        fields.push(
            Field::builder("024".to_string(), '7', ' ')
                .subfield_str('a', isni)
                .subfield_str('2', "isni")
                .build(),
        );
    }

    if let Some(viaf) = non_empty(codes.viaf.as_deref()) {
        fields.push(
            Field::builder("024".to_string(), '7', ' ')
                .subfield('a', format!("{VIAF_URI_PREFIX}{viaf}"))
                .subfield_str('2', "uri")
                .build(),
        );
    }

    if let Some(wikidata) = non_empty(codes.wikidata.as_deref()) {
        fields.push(
            Field::builder("024".to_string(), '8', ' ')
                .subfield('a', format!("{WIKIDATA_URI_PREFIX}{wikidata}"))
                .build(),
        );
    }

    fields
}

/// Return a new record with the identifier fields spliced in.
///
/// The result's field sequence is the original fields up to the splice
/// index, then the new `024` fields in fixed order, then the remaining
/// original fields. Pre-existing fields are never reordered or modified.
/// With all codes absent the field sequence is returned unchanged.
#[must_use]
pub fn splice(record: &Record, codes: &IdentifierCodes) -> Record {
    let new_fields = authority_fields(codes);
    if new_fields.is_empty() {
        return record.clone();
    }

    let index = splice_index(record);
    let mut fields = Vec::with_capacity(record.fields.len() + new_fields.len());
    fields.extend_from_slice(&record.fields[..index]);
    fields.extend(new_fields.into_iter().map(FieldEntry::Data));
    fields.extend_from_slice(&record.fields[index..]);

    Record {
        leader: record.leader.clone(),
        fields,
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|s| !s.is_empty())
}
