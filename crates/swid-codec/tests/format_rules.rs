// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
#![allow(missing_docs, clippy::expect_used, clippy::unwrap_used, clippy::panic)]
//! Output shape rules shared by the three formats.

use minicbor::data::Type;
use minicbor::Decoder;
use serde_json::{json, Map, Value};
use swid_codec::{
    encode, encode_to_vec, field, CborEncoder, EncodeError, EncodeOptions, Format, JsonEncoder,
    TagEncoder, XmlEncoder,
};
use swid_core::{Entity, Link, Tag, WellKnownRole, SWID_NAMESPACE, UNKNOWN_REGID};
use swid_dry_tests::{full_payload_tag, minimal_tag, FailingWriter, ABC_SHA256, CREATOR_REGID};

fn json_of(tag: &Tag) -> Value {
    serde_json::from_slice(&encode_to_vec(tag, Format::Json, &EncodeOptions::default()).unwrap())
        .unwrap()
}

fn xml_of(tag: &Tag) -> String {
    String::from_utf8(encode_to_vec(tag, Format::Xml, &EncodeOptions::default()).unwrap()).unwrap()
}

/// Re-keys a CBOR document by field name so it can be compared with JSON.
fn cbor_as_json(d: &mut Decoder<'_>) -> Value {
    match d.datatype().unwrap() {
        Type::U8 | Type::U16 | Type::U32 | Type::U64 => json!(d.u64().unwrap()),
        Type::I8 | Type::I16 | Type::I32 | Type::I64 => json!(d.i64().unwrap()),
        Type::String => json!(d.str().unwrap()),
        Type::Bytes => json!(hex::encode(d.bytes().unwrap())),
        Type::Bool => json!(d.bool().unwrap()),
        Type::Array => {
            let len = d.array().unwrap().unwrap();
            Value::Array((0..len).map(|_| cbor_as_json(d)).collect())
        }
        Type::Map => {
            let len = d.map().unwrap().unwrap();
            let mut map = Map::new();
            for _ in 0..len {
                let id = d.u32().unwrap();
                let name = field::name_of(id).unwrap();
                map.insert(name.to_owned(), cbor_as_json(d));
            }
            Value::Object(map)
        }
        other => panic!("unexpected {other}"),
    }
}

#[test]
fn minimal_tag_writes_defaults() {
    assert_eq!(
        json_of(&minimal_tag()),
        json!({
            "tag-id": "com.example.app-1.0.0",
            "swid-name": "Example App",
            "tag-version": 0,
            "entity": {
                "entity-name": "Example Corp",
                "reg-id": CREATOR_REGID,
                "role": [1, 2],
            },
        })
    );
}

#[test]
fn missing_regid_is_written_as_the_sentinel() {
    let mut tag = Tag::new("App", "app-1").unwrap();
    tag.add_entity(Entity::new("Solo", WellKnownRole::TagCreator).unwrap());
    let value = json_of(&tag);
    assert_eq!(value["entity"]["reg-id"], UNKNOWN_REGID);
    assert_eq!(value["entity"]["role"], 1);
    assert!(value.get("software-version").is_none());
    assert!(value.get("version-scheme").is_none());
}

#[test]
fn one_value_is_bare_and_two_are_an_array() {
    let mut tag = minimal_tag();
    tag.add_link(Link::new("https://example.com/a", "related").unwrap());
    assert!(json_of(&tag)["link"].is_object());

    tag.add_link(Link::new("https://example.com/b", "related").unwrap());
    let links = json_of(&tag)["link"].clone();
    assert_eq!(links.as_array().map(Vec::len), Some(2));
    assert_eq!(links[1]["href"], "https://example.com/b");
}

#[test]
fn cbor_and_json_carry_the_same_tree() {
    let tag = full_payload_tag();
    let cbor = encode_to_vec(&tag, Format::Cbor, &EncodeOptions::default()).unwrap();
    let mut decoder = Decoder::new(&cbor);
    let from_cbor = cbor_as_json(&mut decoder);
    assert_eq!(decoder.position(), cbor.len());
    assert_eq!(from_cbor, json_of(&tag));
}

#[test]
fn payload_shape_in_json() {
    let value = json_of(&full_payload_tag());
    assert_eq!(value["version-scheme"], 16384);
    assert_eq!(value["software-version"], "2.4.1");
    let dirs = &value["payload"]["directory"];
    assert_eq!(dirs[0]["fs-name"], "bin");
    assert_eq!(dirs[0]["file"]["hash"][0][0], 1);
    assert_eq!(dirs[0]["file"]["hash"][0][1], ABC_SHA256);
    assert_eq!(dirs[0]["file"]["hash"][1], json!([6, "ba7816bf"]));
    assert_eq!(dirs[1]["directory"]["fs-name"], "plugins");
    assert_eq!(value["software-meta"]["entitlement-data-required"], false);
}

#[test]
fn xml_uses_attributes_names_and_namespaces() {
    let doc = xml_of(&full_payload_tag());
    assert!(doc.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
    assert!(doc.contains(&format!("<SoftwareIdentity xmlns=\"{SWID_NAMESPACE}\"")));
    assert!(doc.contains("versionScheme=\"semver\""));
    assert!(doc.contains("xml:lang=\"en-US\""));
    assert!(doc.contains("role=\"tagCreator softwareCreator\""));
    assert!(doc.contains("xmlns:sha256=\"http://www.w3.org/2001/04/xmlenc#sha256\""));
    assert!(doc.contains(&format!("sha256:hash=\"{ABC_SHA256}\"")));
    assert!(doc.contains("sha256-32:hash=\"ba7816bf\""));
    assert!(doc.contains("<Directory name=\"plugins\">"));
    assert!(doc.contains("ownership=\"shared\""));
    assert!(doc.trim_end().ends_with("</SoftwareIdentity>"));
}

#[test]
fn xml_escapes_attribute_text() {
    let mut tag = Tag::new("Fish & \"Chips\" <1>", "fish-1").unwrap();
    tag.add_entity(Entity::new("A&B", WellKnownRole::TagCreator).unwrap());
    let doc = xml_of(&tag);
    assert!(doc.contains("name=\"Fish &amp; &quot;Chips&quot; &lt;1&gt;\""));
    let back = swid_codec::decode_xml(doc.as_bytes(), &swid_core::Vocabularies::new()).unwrap();
    assert_eq!(back, tag);
}

#[test]
fn invalid_tags_write_nothing() {
    let tag = Tag::new("App", "app-1").unwrap();
    for format in Format::ALL {
        let mut out = FailingWriter::always();
        let err = encode(&tag, format, &EncodeOptions::default(), &mut out).unwrap_err();
        assert!(matches!(&err, EncodeError::Validation(e) if e.field() == Some("entity")));
        assert_eq!(out.attempts(), 0);
    }
}

fn encode_with(format: Format, tag: &Tag, dest: &mut FailingWriter) -> Result<(), EncodeError> {
    match format {
        Format::Xml => XmlEncoder { pretty: true }.encode(tag, dest),
        Format::Json => JsonEncoder::default().encode(tag, dest),
        Format::Cbor => CborEncoder.encode(tag, dest),
    }
}

#[test]
fn write_errors_surface_as_io() {
    let tag = minimal_tag();
    for format in Format::ALL {
        let mut out = FailingWriter::after(10);
        let err = encode_with(format, &tag, &mut out).unwrap_err();
        assert!(matches!(err, EncodeError::Io(_)), "{format}: {err}");
        assert_eq!(out.written().len(), 10, "{format}");
    }
}

#[test]
fn encoders_agree_with_encode_to_vec() {
    let tag = full_payload_tag();
    let mut xml = Vec::new();
    XmlEncoder::default().encode(&tag, &mut xml).unwrap();
    assert_eq!(xml, encode_to_vec(&tag, Format::Xml, &EncodeOptions::default()).unwrap());
    let mut cbor = Vec::new();
    CborEncoder.encode(&tag, &mut cbor).unwrap();
    assert_eq!(cbor, encode_to_vec(&tag, Format::Cbor, &EncodeOptions::default()).unwrap());
}
