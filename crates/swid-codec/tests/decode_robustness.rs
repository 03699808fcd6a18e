// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
#![allow(missing_docs, clippy::expect_used, clippy::unwrap_used)]
//! Decoders reject damaged input without panicking.

use proptest::prelude::*;
use swid_codec::{decode, decode_cbor, decode_json, encode_to_vec, DecodeError, EncodeOptions, Format};
use swid_core::Vocabularies;
use swid_dry_tests::{evidence_tag, full_payload_tag, minimal_tag};

fn cbor_fixture() -> Vec<u8> {
    encode_to_vec(&evidence_tag(), Format::Cbor, &EncodeOptions::default()).unwrap()
}

#[test]
fn drill_truncated_cbor() {
    let full = cbor_fixture();
    let vocab = Vocabularies::new();
    for len in 0..full.len() {
        assert!(
            decode_cbor(&full[..len], &vocab).is_err(),
            "decoding should fail for truncated input of length {len}"
        );
    }
    assert!(decode_cbor(&full, &vocab).is_ok());
}

#[test]
fn reject_trailing_garbage() {
    let mut bytes = cbor_fixture();
    bytes.push(0xFF);
    let err = decode_cbor(&bytes, &Vocabularies::new()).unwrap_err();
    assert!(matches!(err, DecodeError::Malformed(msg) if msg.contains("trailing")));
}

#[test]
fn truncated_text_formats_fail() {
    let vocab = Vocabularies::new();
    for format in [Format::Xml, Format::Json] {
        let full = encode_to_vec(&full_payload_tag(), format, &EncodeOptions::default()).unwrap();
        for len in [0, 1, full.len() / 2, full.len() - 1] {
            assert!(decode(format, &full[..len], &vocab).is_err(), "{format} at {len}");
        }
    }
}

#[test]
fn unknown_fields_are_skipped() {
    let vocab = Vocabularies::new();
    let mut value: serde_json::Value = serde_json::from_slice(
        &encode_to_vec(&minimal_tag(), Format::Json, &EncodeOptions::default()).unwrap(),
    )
    .unwrap();
    value["future-field"] = serde_json::json!({ "nested": [1, 2, 3] });
    value["entity"]["shoe-size"] = serde_json::json!(44);
    let tag = decode_json(&serde_json::to_vec(&value).unwrap(), &vocab).unwrap();
    assert_eq!(tag, minimal_tag());

    // Map header of the minimal tag grows by one entry keyed 999.
    let mut cbor = encode_to_vec(&minimal_tag(), Format::Cbor, &EncodeOptions::default()).unwrap();
    assert_eq!(cbor[0], 0xA4);
    cbor[0] = 0xA5;
    cbor.extend_from_slice(&[0x19, 0x03, 0xE7, 0xF5]);
    assert_eq!(decode_cbor(&cbor, &vocab).unwrap(), minimal_tag());
}

#[test]
fn decoded_tags_are_not_validated() {
    let doc = br#"{"tag-id": "t", "swid-name": "n", "entity": {"entity-name": "e", "role": 2}}"#;
    let tag = decode_json(doc, &Vocabularies::new()).unwrap();
    assert!(tag.validate().is_err());
}

#[test]
fn role_names_with_whitespace_are_rejected() {
    let doc = br#"{"tag-id": "t", "swid-name": "n",
        "entity": {"entity-name": "e", "role": [1, "release manager"]}}"#;
    let err = decode_json(doc, &Vocabularies::new()).unwrap_err();
    assert!(matches!(err, DecodeError::Model(_)), "{err}");
}

#[test]
fn missing_required_fields_are_malformed() {
    let doc = br#"{"tag-id": "t"}"#;
    let err = decode_json(doc, &Vocabularies::new()).unwrap_err();
    assert!(matches!(err, DecodeError::Malformed(_)));
}

proptest! {
    #[test]
    fn fuzz_decoders_no_panics(bytes in prop::collection::vec(any::<u8>(), 0..512)) {
        let vocab = Vocabularies::new();
        for format in Format::ALL {
            let _ = decode(format, &bytes, &vocab);
        }
    }

    #[test]
    fn fuzz_flipped_cbor_bytes_no_panics(index in any::<prop::sample::Index>(), mask in 1u8..=255) {
        let mut bytes = cbor_fixture();
        let i = index.index(bytes.len());
        bytes[i] ^= mask;
        let _ = decode_cbor(&bytes, &Vocabularies::new());
    }
}
