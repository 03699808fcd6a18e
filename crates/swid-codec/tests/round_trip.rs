// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
#![allow(missing_docs, clippy::expect_used, clippy::unwrap_used, clippy::panic)]
//! Every fixture survives encode then decode in every format.

use std::fs;

use swid_codec::{decode, encode, encode_to_vec, EncodeOptions, Format};
use swid_core::{Tag, Vocabularies};
use swid_dry_tests::{
    evidence_tag, full_payload_tag, init_test_tracing, minimal_tag, private_terms_tag,
    private_vocabularies,
};

fn round_trip(tag: &Tag, vocab: &Vocabularies) {
    for format in Format::ALL {
        for pretty in [false, true] {
            let bytes = encode_to_vec(tag, format, &EncodeOptions { pretty }).unwrap();
            let back = decode(format, &bytes, vocab)
                .unwrap_or_else(|err| panic!("{format} (pretty: {pretty}): {err}"));
            assert_eq!(&back, tag, "{format} (pretty: {pretty})");
            back.validate().unwrap();
        }
    }
}

#[test]
fn minimal_tag_round_trips() {
    init_test_tracing();
    round_trip(&minimal_tag(), &Vocabularies::new());
}

#[test]
fn payload_tree_round_trips() {
    init_test_tracing();
    round_trip(&full_payload_tag(), &Vocabularies::new());
}

#[test]
fn evidence_with_firmware_round_trips() {
    init_test_tracing();
    round_trip(&evidence_tag(), &Vocabularies::new());
}

#[test]
fn private_terms_round_trip_through_their_registry() {
    let vocab = private_vocabularies();
    round_trip(&private_terms_tag(&vocab), &vocab);
}

#[test]
fn unregistered_indices_decode_as_numbered_private_terms() {
    let vocab = private_vocabularies();
    let tag = private_terms_tag(&vocab);
    let bytes = encode_to_vec(&tag, Format::Cbor, &EncodeOptions::default()).unwrap();

    let back = decode(Format::Cbor, &bytes, &Vocabularies::new()).unwrap();
    let roles: Vec<_> = back.entities()[0]
        .roles()
        .iter()
        .map(|r| (r.name().to_owned(), r.index()))
        .collect();
    assert_eq!(
        roles,
        [
            ("tagCreator".to_owned(), Some(1)),
            ("softwareCreator".to_owned(), Some(2)),
            ("40".to_owned(), Some(40)),
            ("reviewer".to_owned(), None),
        ]
    );
    assert_eq!(back.version_scheme().name(), "65000");

    let file = &back.payload().unwrap().collection().files()[0];
    assert_eq!(file.hashes()[0].0.name(), "90");
}

#[test]
fn xml_resolves_private_terms_by_name() {
    let vocab = private_vocabularies();
    let tag = private_terms_tag(&vocab);
    let bytes = encode_to_vec(&tag, Format::Xml, &EncodeOptions::default()).unwrap();

    let back = decode(Format::Xml, &bytes, &vocab).unwrap();
    let auditor = &back.entities()[0].roles()[2];
    assert_eq!((auditor.name(), auditor.index()), ("auditor", Some(40)));
    assert_eq!(back.version_scheme().index(), Some(65_000));
}

#[test]
fn tag_files_round_trip_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let tag = full_payload_tag();
    for format in Format::ALL {
        let path = dir.path().join(format!("{}.{}", tag.tag_id(), format.extension()));
        encode(&tag, format, &EncodeOptions::default(), fs::File::create(&path).unwrap()).unwrap();
        let back = decode(format, &fs::read(&path).unwrap(), &Vocabularies::new()).unwrap();
        assert_eq!(back, tag, "{}", path.display());
    }
    let mut names: Vec<_> = fs::read_dir(dir.path())
        .unwrap()
        .map(|entry| entry.unwrap().file_name().into_string().unwrap())
        .collect();
    names.sort();
    assert_eq!(
        names,
        [
            "com.example.app-2.4.1.coswid",
            "com.example.app-2.4.1.json",
            "com.example.app-2.4.1.swidtag",
        ]
    );
}
