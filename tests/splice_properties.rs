//! Property tests for the field splicer.

use marclink::{splice, splice_index, Field, FieldEntry, IdentifierCodes, Leader, Record};
use proptest::prelude::*;

fn control_tag() -> impl Strategy<Value = String> {
    prop::sample::select(vec!["001", "003", "005", "006", "007", "008"])
        .prop_map(ToString::to_string)
}

fn data_tag() -> impl Strategy<Value = String> {
    (100u32..=899).prop_map(|n| format!("{n:03}"))
}

fn code_value() -> impl Strategy<Value = Option<String>> {
    prop::option::of("[a-zA-Z0-9]{1,16}")
}

prop_compose! {
    fn arb_record()(
        control_tags in prop::collection::vec(control_tag(), 0..4),
        data_tags in prop::collection::vec(data_tag(), 0..6),
    ) -> Record {
        let mut record = Record::new(Leader::default());
        for (i, tag) in control_tags.into_iter().enumerate() {
            record.add_control_field(tag, format!("value-{i}"));
        }
        for tag in data_tags {
            let mut field = Field::new(tag, ' ', ' ');
            field.add_subfield('a', "data".to_string());
            record.add_field(field);
        }
        record
    }
}

prop_compose! {
    fn arb_codes()(
        isni in code_value(),
        viaf in code_value(),
        wikidata in code_value(),
    ) -> IdentifierCodes {
        IdentifierCodes { isni, viaf, wikidata }
    }
}

proptest! {
    #[test]
    fn splice_preserves_control_contiguity(record in arb_record(), codes in arb_codes()) {
        prop_assert!(record.has_ordered_fields());
        let spliced = splice(&record, &codes);
        prop_assert!(spliced.has_ordered_fields());
    }

    #[test]
    fn splice_keeps_preexisting_order(record in arb_record(), codes in arb_codes()) {
        let index = splice_index(&record);
        let spliced = splice(&record, &codes);
        let inserted = spliced.fields.len() - record.fields.len();

        prop_assert_eq!(&spliced.fields[..index], &record.fields[..index]);
        prop_assert_eq!(&spliced.fields[index + inserted..], &record.fields[index..]);
    }

    #[test]
    fn inserted_count_matches_present_codes(record in arb_record(), codes in arb_codes()) {
        let expected = [&codes.isni, &codes.viaf, &codes.wikidata]
            .iter()
            .filter(|c| c.is_some())
            .count();
        let spliced = splice(&record, &codes);
        prop_assert_eq!(spliced.fields.len(), record.fields.len() + expected);
    }

    #[test]
    fn all_inserted_fields_are_024(record in arb_record(), codes in arb_codes()) {
        let index = splice_index(&record);
        let spliced = splice(&record, &codes);
        let inserted = spliced.fields.len() - record.fields.len();
        for entry in &spliced.fields[index..index + inserted] {
            prop_assert_eq!(entry.tag(), "024");
            prop_assert!(matches!(entry, FieldEntry::Data(_)));
        }
    }
}
