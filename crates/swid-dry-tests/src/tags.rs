// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Canonical fixture tags.
//!
//! Each builder returns a tag that passes [`Tag::validate`]. Together they touch
//! every field of the model at least once.

use swid_core::{
    Entity, Evidence, File, Firmware, FirmwarePayload, HashAlgorithm, Link, Meta, Ownership,
    Payload, Process, ResourceItem, Role, Tag, Use, Vocabularies, WellKnownHash, WellKnownRole,
    WellKnownScheme,
};
use time::OffsetDateTime;

/// Name of the fixture tag creator.
pub const CREATOR: &str = "Example Corp";

/// Registration id of the fixture tag creator.
pub const CREATOR_REGID: &str = "example.com";

/// SHA-256 of `b"abc"`, hex encoded.
pub const ABC_SHA256: &str = "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad";

/// Evidence and firmware timestamp, seconds since the epoch (2023-11-14T22:13:20Z).
pub const FIXTURE_EPOCH: i64 = 1_700_000_000;

/// [`FIXTURE_EPOCH`] as a timestamp.
#[must_use]
#[allow(clippy::expect_used)]
pub fn fixture_date() -> OffsetDateTime {
    OffsetDateTime::from_unix_timestamp(FIXTURE_EPOCH).expect("fixture epoch is in range")
}

fn sha256() -> HashAlgorithm {
    HashAlgorithm::from(WellKnownHash::Sha256)
}

/// Tag creator and software creator with a registration id.
#[must_use]
#[allow(clippy::expect_used)]
pub fn creator() -> Entity {
    let mut entity = Entity::new(CREATOR, WellKnownRole::TagCreator).expect("creator entity");
    entity
        .set_regid(CREATOR_REGID)
        .and_then(|e| e.add_role(WellKnownRole::SoftwareCreator))
        .expect("creator regid and role");
    entity
}

/// The smallest valid tag: name, id and a tag creator.
#[must_use]
#[allow(clippy::expect_used)]
pub fn minimal_tag() -> Tag {
    let mut tag = Tag::new("Example App", "com.example.app-1.0.0").expect("minimal tag");
    tag.add_entity(creator());
    tag
}

/// Primary tag with explicit version fields, two entities, two links, meta and a
/// nested payload tree.
#[must_use]
#[allow(clippy::expect_used)]
pub fn full_payload_tag() -> Tag {
    let mut tag = Tag::new("Example App", "com.example.app-2.4.1").expect("tag");
    tag.set_tag_version(3);
    tag.set_software_version("2.4.1").expect("version");
    tag.set_version_scheme(WellKnownScheme::Semver).expect("scheme");
    tag.set_lang("en-US").expect("lang");
    tag.set_media("(OS:linux)").expect("media");

    tag.add_entity(creator());
    let mut licensor = Entity::new("Example Licensing", WellKnownRole::Licensor).expect("entity");
    licensor
        .set_regid("licensing.example.com")
        .and_then(|e| e.set_thumbprint("a1b2c3d4"))
        .expect("licensor fields");
    tag.add_entity(licensor);

    let mut payload = Payload::new();
    let collection = payload.collection_mut();
    collection
        .insert_file(&["bin", "example"])
        .expect("bin/example")
        .set_size(3)
        .compute_hash(sha256(), &b"abc"[..])
        .and_then(|f| f.compute_hash(WellKnownHash::Sha256_32.into(), &b"abc"[..]))
        .expect("bin/example hashes");
    collection
        .insert_file(&["lib", "libexample.so"])
        .and_then(|f| f.set_version("2.4.1"))
        .expect("lib/libexample.so");
    collection
        .insert_file(&["lib", "plugins", "codec.so"])
        .expect("lib/plugins/codec.so")
        .set_size(8192);
    let mut readme = File::new("README").expect("README");
    readme
        .set_root("%{install}")
        .and_then(|f| f.set_location("share/doc"))
        .expect("README location");
    collection.add_file(readme);
    collection.add_resource(ResourceItem::new("registry-key").expect("resource"));
    tag.set_payload(payload);

    let mut license = Link::new("https://example.com/license", "license").expect("link");
    license
        .set_media_type("text/html")
        .expect("media type")
        .set_ownership(Ownership::Shared)
        .set_usage(Use::Optional);
    tag.add_link(license);
    let mut runtime = Link::new("swid:com.example.runtime-1.0.0", "requires").expect("link");
    runtime
        .set_artifact("runtime")
        .expect("artifact")
        .set_usage(Use::Required);
    tag.add_link(runtime);

    tag.add_meta(Meta {
        product: Some("Example App".to_owned()),
        colloquial_version: Some("2026".to_owned()),
        edition: Some("Professional".to_owned()),
        entitlement_data_required: Some(false),
        generator: Some("swid-dry-tests".to_owned()),
        revision: Some("r1042".to_owned()),
        summary: Some("Fixture application".to_owned()),
        ..Meta::default()
    });
    tag
}

/// Supplemental tag carrying evidence: a process, a file and firmware.
#[must_use]
#[allow(clippy::expect_used)]
pub fn evidence_tag() -> Tag {
    let mut tag = Tag::new("Example App", "com.example.app-evidence").expect("tag");
    tag.set_usage(swid_core::TagUsage::Supplemental);
    tag.add_entity(creator());

    let mut evidence = Evidence::new();
    evidence.set_date(fixture_date());
    evidence.set_device_id("host-01").expect("device id");
    let collection = evidence.collection_mut();
    let mut daemon = Process::new("exampled").expect("process");
    daemon.set_pid(4242);
    collection.add_process(daemon);
    collection
        .insert_file(&["etc", "example.conf"])
        .expect("etc/example.conf")
        .set_size(12);

    let mut image = FirmwarePayload::new(1, 4096);
    image
        .set_storage_id("slot-a")
        .expect("storage id")
        .set_package(vec![0xca, 0xfe]);
    let digest = sha256().digest(&b"abc"[..]).expect("sha-256");
    image.add_digest(sha256(), digest).expect("digest");
    let mut firmware = Firmware::new("fw-1", fixture_date(), 7).expect("firmware");
    firmware
        .set_nonce(vec![1, 2, 3, 4])
        .and_then(|f| f.set_target_device_id("board-7"))
        .expect("firmware fields");
    firmware.add_payload(image);
    collection.add_firmware(firmware);

    tag.set_evidence(evidence);
    tag
}

/// Registries with one private role, version scheme and hash algorithm.
#[must_use]
#[allow(clippy::expect_used)]
pub fn private_vocabularies() -> Vocabularies {
    let mut vocab = Vocabularies::new();
    vocab.roles.register(40, "auditor").expect("role");
    vocab
        .version_schemes
        .register(65_000, "calver")
        .expect("scheme");
    vocab
        .hash_algorithms
        .register(90, "blake3")
        .expect("hash algorithm");
    vocab
}

/// Tag using terms from [`private_vocabularies`] plus one unregistered role.
#[must_use]
#[allow(clippy::expect_used)]
pub fn private_terms_tag(vocab: &Vocabularies) -> Tag {
    let mut tag = Tag::new("Example Tool", "com.example.tool-2026.10").expect("tag");
    tag.set_software_version("2026.10")
        .and_then(|t| t.set_version_scheme(vocab.version_schemes.by_name("calver")))
        .expect("version");

    let mut entity = creator();
    entity
        .add_role(vocab.roles.by_name("auditor"))
        .and_then(|e| e.add_role(Role::named("reviewer")))
        .expect("private roles");
    tag.add_entity(entity);

    let mut payload = Payload::new();
    payload
        .collection_mut()
        .insert_file(&["data.bin"])
        .and_then(|f| f.set_hash(vocab.hash_algorithms.by_name("blake3"), vec![0x11; 32]))
        .expect("data.bin");
    tag.set_payload(payload);
    tag
}
