// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Software identification tag model.
//!
//! This crate defines the in-memory tag tree and everything needed to build it.
//! It contains NO wire-format logic; that lives in swid-codec.
//!
//! # Modules
//!
//! - [`tag`] - the root [`Tag`] plus [`Entity`], [`Link`] and [`Meta`]
//! - [`resource`] - evidence/payload resource trees (directories, files, firmware)
//! - [`path`] - resource path resolver ([`relativize`])
//! - [`digest`] - content digests with per-algorithm truncation
//! - [`vocab`] - open vocabularies and their registries
//! - [`manifest`] - JSON build manifest consumed by packaging tools
//!
//! # Lifecycle
//!
//! Tags are assembled incrementally through fail-fast setters, validated once as a
//! whole with [`Tag::validate`], and then handed read-only to an encoder. Encoders
//! re-validate on every call; nothing caches a previous validation result.

mod error;

pub mod digest;
pub mod manifest;
pub mod path;
pub mod resource;
pub mod tag;
pub mod vocab;

pub use digest::{
    digest_from_decimal_list, digest_from_hex, digest_to_decimal_list, digest_to_hex,
    DigestParseError, HashAlgorithm, WellKnownHash,
};
pub use error::{RegistryError, TagError};
pub use manifest::{CollectionKind, EntityManifest, LinkManifest, ResourceDescriptor, TagManifest};
pub use path::{relativize, segments, SEPARATOR};
pub use resource::{
    Directory, Evidence, File, Firmware, FirmwarePayload, Payload, Process, ResourceCollection,
    ResourceItem,
};
pub use tag::{Entity, Link, Meta, Tag, TagUsage};
pub use vocab::{
    Ownership, Registry, Role, Term, Use, VersionScheme, Vocabularies, Vocabulary, WellKnownRole,
    WellKnownScheme,
};

/// XML namespace of the structured-text format.
pub const SWID_NAMESPACE: &str = "http://standards.iso.org/iso/19770/-2/2015/schema.xsd";

/// Registration id reported for entities that never had one set.
pub const UNKNOWN_REGID: &str = "http://invalid.unavailable";

/// Software version reported for tags that never had one set.
pub const UNKNOWN_VERSION: &str = "0.0";
