//! Sequential record enrichment pipeline.
//!
//! The driver reads ISO 2709 records one at a time, resolves each record's
//! 001 control number against an [`IdentifierResolver`], splices the
//! returned codes into the record, and writes it out. One record is in
//! flight at a time; the blocking lookup stalls the pipeline for its
//! duration, which is an accepted simplicity trade-off.
//!
//! Resolution failures degrade the affected record to "no codes available"
//! and are logged; they never abort the batch. Only I/O and structural
//! errors propagate.

use std::io::{Read, Write};

use tracing::{debug, warn};

use crate::error::{MarclinkError, Result};
use crate::reader::MarcReader;
use crate::record::Record;
use crate::resolver::{IdentifierCodes, IdentifierResolver};
use crate::splice::splice;
use crate::writer::MarcWriter;

/// Control field tag the lookup identifier is read from.
const IDENTIFIER_TAG: &str = "001";

/// Options for a pipeline run.
#[derive(Debug, Clone)]
pub struct ProcessOptions {
    /// Stop after this many records have been fully processed.
    pub max_records: Option<usize>,
    /// Write the spliced record rather than the unmodified input.
    ///
    /// With `false`, lookups and splicing still run but the input record
    /// is written back unchanged.
    pub write_enriched: bool,
}

impl Default for ProcessOptions {
    fn default() -> Self {
        ProcessOptions {
            max_records: None,
            write_enriched: true,
        }
    }
}

/// Counters for one pipeline run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProcessSummary {
    /// Records read from the input stream.
    pub records_read: usize,
    /// Records written to the output stream.
    pub records_written: usize,
    /// Lookups issued against the authority service.
    pub lookups: usize,
    /// Lookups that failed and degraded to empty codes.
    pub lookup_failures: usize,
    /// Records lacking the 001 identifier field.
    pub missing_identifier: usize,
}

/// Extract the lookup identifier from a record.
///
/// # Errors
///
/// Returns `MissingIdentifierField` when the record has no 001 control
/// field.
pub fn lookup_identifier(record: &Record) -> Result<&str> {
    record
        .get_control_field(IDENTIFIER_TAG)
        .ok_or_else(|| MarclinkError::MissingIdentifierField(IDENTIFIER_TAG.to_string()))
}

/// Run the enrichment pipeline from `reader` to `writer`.
///
/// # Errors
///
/// Returns an error on I/O failure or a structurally invalid record.
/// Per-record resolution failures are counted and logged, not returned.
pub fn process<R: Read, W: Write>(
    reader: &mut MarcReader<R>,
    writer: &mut MarcWriter<W>,
    resolver: &dyn IdentifierResolver,
    options: &ProcessOptions,
) -> Result<ProcessSummary> {
    process_with(reader, writer, resolver, options, |_| {})
}

/// Run the pipeline, invoking `on_record` after each record is written.
///
/// The callback receives the running summary; the CLI uses it to advance
/// its progress bar.
///
/// # Errors
///
/// Returns an error on I/O failure or a structurally invalid record.
pub fn process_with<R, W, F>(
    reader: &mut MarcReader<R>,
    writer: &mut MarcWriter<W>,
    resolver: &dyn IdentifierResolver,
    options: &ProcessOptions,
    mut on_record: F,
) -> Result<ProcessSummary>
where
    R: Read,
    W: Write,
    F: FnMut(&ProcessSummary),
{
    let mut summary = ProcessSummary::default();

    while let Some(record) = reader.read_record()? {
        summary.records_read += 1;

        let codes = match lookup_identifier(&record) {
            Ok(identifier) => {
                summary.lookups += 1;
                match resolver.resolve(identifier) {
                    Ok(codes) => {
                        debug!(identifier, ?codes, "resolved identifier codes");
                        codes
                    },
                    Err(e) if e.is_resolution_failure() => {
                        warn!(identifier, error = %e, "lookup failed, record passes through unenriched");
                        summary.lookup_failures += 1;
                        IdentifierCodes::default()
                    },
                    Err(e) => return Err(e),
                }
            },
            Err(e) => {
                warn!(record = summary.records_read, error = %e, "skipping lookup");
                summary.missing_identifier += 1;
                IdentifierCodes::default()
            },
        };

        let enriched = splice(&record, &codes);
        let output = if options.write_enriched {
            &enriched
        } else {
            &record
        };
        writer.write_record(output)?;
        summary.records_written += 1;
        on_record(&summary);

        // Cutoff is checked only after a record is fully processed.
        if let Some(max) = options.max_records {
            if summary.records_written >= max {
                break;
            }
        }
    }

    writer.finish()?;
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::leader::Leader;
    use crate::record::Field;
    use std::cell::RefCell;
    use std::io::Cursor;

    /// Stub resolver that counts calls and returns fixed codes.
    struct StubResolver {
        codes: IdentifierCodes,
        calls: RefCell<Vec<String>>,
    }

    impl StubResolver {
        fn returning(codes: IdentifierCodes) -> Self {
            StubResolver {
                codes,
                calls: RefCell::new(Vec::new()),
            }
        }
    }

    impl IdentifierResolver for StubResolver {
        fn resolve(&self, identifier: &str) -> Result<IdentifierCodes> {
            self.calls.borrow_mut().push(identifier.to_string());
            Ok(self.codes.clone())
        }
    }

    /// Resolver that always fails with a service error.
    struct FailingResolver;

    impl IdentifierResolver for FailingResolver {
        fn resolve(&self, _identifier: &str) -> Result<IdentifierCodes> {
            Err(MarclinkError::ServiceUnavailable { status: 503 })
        }
    }

    fn record_stream(count: usize, with_identifier: bool) -> Vec<u8> {
        let mut buffer = Vec::new();
        let mut writer = MarcWriter::new(&mut buffer);
        for i in 0..count {
            let mut record = Record::new(Leader::default());
            if with_identifier {
                record.add_control_field_str("001", &format!("id-{i}"));
            }
            let mut field = Field::new("245".to_string(), '1', '0');
            field.add_subfield('a', format!("Title {i}"));
            record.add_field(field);
            writer.write_record(&record).unwrap();
        }
        writer.finish().unwrap();
        buffer
    }

    fn read_all(bytes: Vec<u8>) -> Vec<Record> {
        let mut reader = MarcReader::new(Cursor::new(bytes));
        let mut records = Vec::new();
        while let Some(record) = reader.read_record().unwrap() {
            records.push(record);
        }
        records
    }

    #[test]
    fn test_lookup_identifier_missing() {
        let record = Record::new(Leader::default());
        let result = lookup_identifier(&record);
        assert!(matches!(
            result,
            Err(MarclinkError::MissingIdentifierField(_))
        ));
    }

    #[test]
    fn test_max_records_caps_output_and_lookups() {
        let input = record_stream(5, true);
        let resolver = StubResolver::returning(IdentifierCodes {
            viaf: Some("42".to_string()),
            ..IdentifierCodes::default()
        });
        let mut output = Vec::new();

        let summary = {
            let mut reader = MarcReader::new(Cursor::new(input));
            let mut writer = MarcWriter::new(&mut output);
            let options = ProcessOptions {
                max_records: Some(2),
                ..ProcessOptions::default()
            };
            process(&mut reader, &mut writer, &resolver, &options).unwrap()
        };

        assert_eq!(summary.records_written, 2);
        assert_eq!(summary.lookups, 2);
        assert_eq!(resolver.calls.borrow().len(), 2);
        assert_eq!(resolver.calls.borrow()[0], "id-0");
        assert_eq!(read_all(output).len(), 2);
    }

    #[test]
    fn test_enriched_records_carry_024_fields() {
        let input = record_stream(1, true);
        let resolver = StubResolver::returning(IdentifierCodes {
            isni: Some("0000000123456789".to_string()),
            viaf: Some("12345".to_string()),
            wikidata: Some("Q42".to_string()),
        });
        let mut output = Vec::new();

        {
            let mut reader = MarcReader::new(Cursor::new(input));
            let mut writer = MarcWriter::new(&mut output);
            process(
                &mut reader,
                &mut writer,
                &resolver,
                &ProcessOptions::default(),
            )
            .unwrap();
        }

        let records = read_all(output);
        assert_eq!(records[0].get_fields("024").len(), 3);
    }

    #[test]
    fn test_write_enriched_false_writes_input_unchanged() {
        let input = record_stream(1, true);
        let resolver = StubResolver::returning(IdentifierCodes {
            viaf: Some("12345".to_string()),
            ..IdentifierCodes::default()
        });
        let mut output = Vec::new();

        {
            let mut reader = MarcReader::new(Cursor::new(input));
            let mut writer = MarcWriter::new(&mut output);
            let options = ProcessOptions {
                write_enriched: false,
                ..ProcessOptions::default()
            };
            process(&mut reader, &mut writer, &resolver, &options).unwrap();
        }

        let records = read_all(output);
        assert_eq!(resolver.calls.borrow().len(), 1);
        assert!(records[0].get_fields("024").is_empty());
    }

    #[test]
    fn test_lookup_failure_degrades_not_aborts() {
        let input = record_stream(3, true);
        let mut output = Vec::new();

        let summary = {
            let mut reader = MarcReader::new(Cursor::new(input));
            let mut writer = MarcWriter::new(&mut output);
            process(
                &mut reader,
                &mut writer,
                &FailingResolver,
                &ProcessOptions::default(),
            )
            .unwrap()
        };

        assert_eq!(summary.records_written, 3);
        assert_eq!(summary.lookup_failures, 3);
        let records = read_all(output);
        assert!(records.iter().all(|r| r.get_fields("024").is_empty()));
    }

    #[test]
    fn test_missing_identifier_passes_record_through() {
        let input = record_stream(2, false);
        let resolver = StubResolver::returning(IdentifierCodes::default());
        let mut output = Vec::new();

        let summary = {
            let mut reader = MarcReader::new(Cursor::new(input));
            let mut writer = MarcWriter::new(&mut output);
            process(
                &mut reader,
                &mut writer,
                &resolver,
                &ProcessOptions::default(),
            )
            .unwrap()
        };

        assert_eq!(summary.missing_identifier, 2);
        assert_eq!(summary.lookups, 0);
        assert!(resolver.calls.borrow().is_empty());
        assert_eq!(summary.records_written, 2);
    }

    #[test]
    fn test_on_record_callback_sees_running_counts() {
        let input = record_stream(3, true);
        let resolver = StubResolver::returning(IdentifierCodes::default());
        let mut output = Vec::new();
        let mut seen = Vec::new();

        {
            let mut reader = MarcReader::new(Cursor::new(input));
            let mut writer = MarcWriter::new(&mut output);
            process_with(
                &mut reader,
                &mut writer,
                &resolver,
                &ProcessOptions::default(),
                |summary| seen.push(summary.records_written),
            )
            .unwrap();
        }

        assert_eq!(seen, vec![1, 2, 3]);
    }
}
