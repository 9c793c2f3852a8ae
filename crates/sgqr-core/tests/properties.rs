//! Property tests for the TLV codec

use proptest::prelude::*;
use sgqr_core::{decode, Context, Description, Interpretation, ParseError, QrData, Tag};
use std::collections::BTreeMap;

fn fields() -> impl Strategy<Value = BTreeMap<u8, String>> {
    prop::collection::btree_map(0u8..=99, "[A-Za-z0-9 .+-]{0,99}", 0..10)
}

fn to_qr_data<'a>(entries: impl IntoIterator<Item = (&'a u8, &'a String)>) -> QrData {
    let mut data = QrData::new();
    for (n, value) in entries {
        data.set(Tag::new(*n), value.as_str());
    }
    data
}

proptest! {
    #[test]
    fn round_trip_recovers_raw_values(fields in fields()) {
        let encoded = to_qr_data(&fields).encode().unwrap();
        let result = decode(Context::EmvcoMpm, &encoded);

        prop_assert!(result.is_complete());
        let decoded: Vec<(String, String)> = result
            .elements
            .iter()
            .map(|e| (e.element_id.clone(), e.raw_value.clone()))
            .collect();
        let expected: Vec<(String, String)> = fields
            .iter()
            .map(|(n, v)| (format!("{:02}", n), v.clone()))
            .collect();
        prop_assert_eq!(decoded, expected);
    }

    #[test]
    fn checksum_ignores_insertion_order(
        (entries, shuffled) in fields()
            .prop_map(|m| m.into_iter().collect::<Vec<_>>())
            .prop_flat_map(|v| (Just(v.clone()), Just(v).prop_shuffle()))
    ) {
        let a = to_qr_data(entries.iter().map(|(n, v)| (n, v)));
        let b = to_qr_data(shuffled.iter().map(|(n, v)| (n, v)));
        let first = a.encode_with_checksum().unwrap();
        prop_assert_eq!(&first, &b.encode_with_checksum().unwrap());
        prop_assert_eq!(&first, &a.encode_with_checksum().unwrap());
    }

    #[test]
    fn truncation_keeps_only_whole_elements(
        (fields, cut) in fields()
            .prop_filter("need some output", |m| !m.is_empty())
            .prop_flat_map(|m| {
                let len = to_qr_data(&m).encode().unwrap().len();
                (Just(m), 1..len)
            })
    ) {
        let encoded = to_qr_data(&fields).encode().unwrap();
        let result = decode(Context::MerchantAccountInformation, &encoded[..cut]);

        let mut end = 0;
        let mut whole = 0;
        let mut next_len = None;
        for value in fields.values() {
            let element_end = end + 4 + value.len();
            if element_end > cut {
                next_len = Some(value.len());
                break;
            }
            end = element_end;
            whole += 1;
        }

        prop_assert_eq!(result.elements.len(), whole);
        let remainder = cut - end;
        match (remainder, next_len) {
            (0, _) => prop_assert!(result.is_complete()),
            (r, _) if r < 4 => prop_assert_eq!(
                result.error,
                Some(ParseError::InvalidElement {
                    raw_tag_and_length: encoded[end..cut].to_string()
                })
            ),
            (r, Some(requested)) => prop_assert_eq!(
                result.error,
                Some(ParseError::InvalidLength {
                    requested,
                    available: r - 4
                })
            ),
            (_, None) => prop_assert!(false, "cut is inside the payload"),
        }
    }

    #[test]
    fn unknown_tags_pass_through(value in "[A-Za-z0-9]{0,99}", n in 64u8..=99) {
        let encoded = QrData::new().with(Tag::new(n), value.as_str()).encode().unwrap();
        let result = decode(Context::EmvcoMpm, &encoded);

        prop_assert_eq!(result.elements.len(), 1);
        let element = &result.elements[0];
        prop_assert_eq!(element.description, Description::Unknown);
        prop_assert_eq!(&element.interpretation, &Interpretation::Absent);
        prop_assert_eq!(&element.raw_value, &value);

        let reencoded = QrData::new()
            .with(element.tag().unwrap(), element.raw_value.as_str())
            .encode()
            .unwrap();
        prop_assert_eq!(reencoded, encoded);
    }

    #[test]
    fn decode_never_reads_past_input(input in "\\PC{0,120}") {
        let result = decode(Context::EmvcoMpm, &input);
        let consumed: usize = result.elements.iter().map(|e| 4 + e.length).sum();
        let total = input.chars().count();

        prop_assert!(consumed <= total);
        for element in &result.elements {
            prop_assert_eq!(element.raw_value.chars().count(), element.length);
        }
        if result.is_complete() {
            prop_assert_eq!(consumed, total);
        }
    }
}
