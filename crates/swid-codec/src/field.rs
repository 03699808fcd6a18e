// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Canonical field table shared by every encoder.
//!
//! The compact formats key maps by [`Field::id`] (binary) or [`Field::name`]
//! (text); the structured-text format uses [`Field::xml`]. Ids 0-57 follow the
//! CoSWID assignment; firmware lives in the private range 60-69.
//!
//! Names such as `version` or `type` mean different things on different elements,
//! so lookups are always scoped to a [`Shape`].

/// Value kind carried by a field.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Kind {
    /// UTF-8 text.
    Text,
    /// Unsigned integer.
    Uint,
    /// Boolean.
    Bool,
    /// Opaque bytes.
    Bytes,
    /// Vocabulary term: integer index when known, else its name.
    Term,
    /// Point in time, second precision.
    Timestamp,
    /// `(hash algorithm, digest bytes)` pair.
    Digest,
    /// Nested object.
    Object(Shape),
}

/// How a field appears in the structured-text format.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Xml {
    /// Attribute on the owning element.
    Attribute(&'static str),
    /// Child element.
    Element(&'static str),
    /// Not rendered.
    Absent,
}

/// One entry of the canonical table.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Field {
    /// Integer key in the compact-binary format.
    pub id: u32,
    /// Key in the compact-text format.
    pub name: &'static str,
    /// Structured-text rendering.
    pub xml: Xml,
    /// Value kind.
    pub kind: Kind,
}

const fn attr(id: u32, name: &'static str, xml: &'static str, kind: Kind) -> Field {
    Field {
        id,
        name,
        xml: Xml::Attribute(xml),
        kind,
    }
}

const fn child(id: u32, name: &'static str, element: &'static str, shape: Shape) -> Field {
    Field {
        id,
        name,
        xml: Xml::Element(element),
        kind: Kind::Object(shape),
    }
}

const fn compact(id: u32, name: &'static str, kind: Kind) -> Field {
    Field {
        id,
        name,
        xml: Xml::Absent,
        kind,
    }
}

#[allow(missing_docs)]
pub mod ids {
    //! Field constants, one per table row.
    use super::{attr, child, compact, Field, Kind, Shape};

    pub const TAG_ID: Field = attr(0, "tag-id", "tagId", Kind::Text);
    pub const SWID_NAME: Field = attr(1, "swid-name", "name", Kind::Text);
    pub const ENTITY: Field = child(2, "entity", "Entity", Shape::Entity);
    pub const EVIDENCE: Field = child(3, "evidence", "Evidence", Shape::Evidence);
    pub const LINK: Field = child(4, "link", "Link", Shape::Link);
    pub const SOFTWARE_META: Field = child(5, "software-meta", "Meta", Shape::Meta);
    pub const PAYLOAD: Field = child(6, "payload", "Payload", Shape::Payload);
    pub const HASH: Field = attr(7, "hash", "hash", Kind::Digest);
    pub const CORPUS: Field = attr(8, "corpus", "corpus", Kind::Bool);
    pub const PATCH: Field = attr(9, "patch", "patch", Kind::Bool);
    pub const MEDIA: Field = attr(10, "media", "media", Kind::Text);
    pub const SUPPLEMENTAL: Field = attr(11, "supplemental", "supplemental", Kind::Bool);
    pub const TAG_VERSION: Field = attr(12, "tag-version", "tagVersion", Kind::Uint);
    pub const SOFTWARE_VERSION: Field = attr(13, "software-version", "version", Kind::Text);
    pub const VERSION_SCHEME: Field = attr(14, "version-scheme", "versionScheme", Kind::Term);
    pub const LANG: Field = attr(15, "lang", "xml:lang", Kind::Text);
    pub const DIRECTORY: Field = child(16, "directory", "Directory", Shape::Directory);
    pub const FILE: Field = child(17, "file", "File", Shape::File);
    pub const PROCESS: Field = child(18, "process", "Process", Shape::Process);
    pub const RESOURCE: Field = child(19, "resource", "Resource", Shape::Resource);
    pub const SIZE: Field = attr(20, "size", "size", Kind::Uint);
    pub const FILE_VERSION: Field = attr(21, "file-version", "version", Kind::Text);
    pub const KEY: Field = compact(22, "key", Kind::Bool);
    pub const LOCATION: Field = attr(23, "location", "location", Kind::Text);
    pub const FS_NAME: Field = attr(24, "fs-name", "name", Kind::Text);
    pub const ROOT: Field = attr(25, "root", "root", Kind::Text);
    pub const PATH_ELEMENTS: Field = compact(26, "path-elements", Kind::Object(Shape::Directory));
    pub const PROCESS_NAME: Field = attr(27, "process-name", "name", Kind::Text);
    pub const PID: Field = attr(28, "pid", "pid", Kind::Uint);
    pub const TYPE: Field = attr(29, "type", "type", Kind::Text);
    pub const ENTITY_NAME: Field = attr(31, "entity-name", "name", Kind::Text);
    pub const REG_ID: Field = attr(32, "reg-id", "regid", Kind::Text);
    pub const ROLE: Field = attr(33, "role", "role", Kind::Term);
    pub const THUMBPRINT: Field = attr(34, "thumbprint", "thumbprint", Kind::Text);
    pub const DATE: Field = attr(35, "date", "date", Kind::Timestamp);
    pub const DEVICE_ID: Field = attr(36, "device-id", "deviceId", Kind::Text);
    pub const ARTIFACT: Field = attr(37, "artifact", "artifact", Kind::Text);
    pub const HREF: Field = attr(38, "href", "href", Kind::Text);
    pub const OWNERSHIP: Field = attr(39, "ownership", "ownership", Kind::Term);
    pub const REL: Field = attr(40, "rel", "rel", Kind::Text);
    pub const MEDIA_TYPE: Field = attr(41, "media-type", "type", Kind::Text);
    pub const USE: Field = attr(42, "use", "use", Kind::Term);
    pub const ACTIVATION_STATUS: Field = attr(43, "activation-status", "activationStatus", Kind::Text);
    pub const CHANNEL_TYPE: Field = attr(44, "channel-type", "channelType", Kind::Text);
    pub const COLLOQUIAL_VERSION: Field =
        attr(45, "colloquial-version", "colloquialVersion", Kind::Text);
    pub const DESCRIPTION: Field = attr(46, "description", "description", Kind::Text);
    pub const EDITION: Field = attr(47, "edition", "edition", Kind::Text);
    pub const ENTITLEMENT_DATA_REQUIRED: Field =
        attr(48, "entitlement-data-required", "entitlementDataRequired", Kind::Bool);
    pub const ENTITLEMENT_KEY: Field = attr(49, "entitlement-key", "entitlementKey", Kind::Text);
    pub const GENERATOR: Field = attr(50, "generator", "generator", Kind::Text);
    pub const PERSISTENT_ID: Field = attr(51, "persistent-id", "persistentId", Kind::Text);
    pub const PRODUCT: Field = attr(52, "product", "product", Kind::Text);
    pub const PRODUCT_FAMILY: Field = attr(53, "product-family", "productFamily", Kind::Text);
    pub const REVISION: Field = attr(54, "revision", "revision", Kind::Text);
    pub const SUMMARY: Field = attr(55, "summary", "summary", Kind::Text);
    pub const UNSPSC_CODE: Field = attr(56, "unspsc-code", "unspscCode", Kind::Text);
    pub const UNSPSC_VERSION: Field = attr(57, "unspsc-version", "unspscVersion", Kind::Text);
    pub const FIRMWARE: Field = child(60, "firmware", "Firmware", Shape::Firmware);
    pub const MANIFEST_ID: Field = attr(61, "manifest-id", "manifestId", Kind::Text);
    pub const CREATION_TIMESTAMP: Field =
        attr(62, "creation-timestamp", "creationTimestamp", Kind::Timestamp);
    pub const FIRMWARE_VERSION: Field = attr(63, "firmware-version", "version", Kind::Uint);
    pub const NONCE: Field = attr(64, "nonce", "nonce", Kind::Bytes);
    pub const TARGET_DEVICE_ID: Field = attr(65, "target-device-id", "targetDeviceId", Kind::Text);
    pub const FIRMWARE_PAYLOAD: Field =
        child(66, "firmware-payload", "FirmwarePayload", Shape::FirmwarePayload);
    pub const FORMAT_TYPE: Field = attr(67, "format-type", "formatType", Kind::Uint);
    pub const STORAGE_ID: Field = attr(68, "storage-id", "storageId", Kind::Text);
    pub const PACKAGE: Field = attr(69, "package", "package", Kind::Bytes);
}

use ids::{
    ACTIVATION_STATUS, ARTIFACT, CHANNEL_TYPE, COLLOQUIAL_VERSION, CORPUS, CREATION_TIMESTAMP,
    DATE, DESCRIPTION, DEVICE_ID, DIRECTORY, EDITION, ENTITLEMENT_DATA_REQUIRED,
    ENTITLEMENT_KEY, ENTITY, ENTITY_NAME, EVIDENCE, FILE, FILE_VERSION, FIRMWARE,
    FIRMWARE_PAYLOAD, FIRMWARE_VERSION, FORMAT_TYPE, FS_NAME, GENERATOR, HASH, HREF, KEY, LANG,
    LINK, LOCATION, MANIFEST_ID, MEDIA, MEDIA_TYPE, NONCE, OWNERSHIP, PACKAGE, PATCH,
    PATH_ELEMENTS, PAYLOAD, PERSISTENT_ID, PID, PROCESS, PROCESS_NAME, PRODUCT, PRODUCT_FAMILY,
    REG_ID, REL, RESOURCE, REVISION, ROLE, ROOT, SIZE, SOFTWARE_META, SOFTWARE_VERSION,
    STORAGE_ID, SUMMARY, SUPPLEMENTAL, SWID_NAME, TAG_ID, TAG_VERSION, TARGET_DEVICE_ID,
    THUMBPRINT, TYPE, UNSPSC_CODE, UNSPSC_VERSION, USE, VERSION_SCHEME
};

/// Every field, in id order.
pub const ALL: &[Field] = &[
    TAG_ID,
    SWID_NAME,
    ENTITY,
    EVIDENCE,
    LINK,
    SOFTWARE_META,
    PAYLOAD,
    HASH,
    CORPUS,
    PATCH,
    MEDIA,
    SUPPLEMENTAL,
    TAG_VERSION,
    SOFTWARE_VERSION,
    VERSION_SCHEME,
    LANG,
    DIRECTORY,
    FILE,
    PROCESS,
    RESOURCE,
    SIZE,
    FILE_VERSION,
    KEY,
    LOCATION,
    FS_NAME,
    ROOT,
    PATH_ELEMENTS,
    PROCESS_NAME,
    PID,
    TYPE,
    ENTITY_NAME,
    REG_ID,
    ROLE,
    THUMBPRINT,
    DATE,
    DEVICE_ID,
    ARTIFACT,
    HREF,
    OWNERSHIP,
    REL,
    MEDIA_TYPE,
    USE,
    ACTIVATION_STATUS,
    CHANNEL_TYPE,
    COLLOQUIAL_VERSION,
    DESCRIPTION,
    EDITION,
    ENTITLEMENT_DATA_REQUIRED,
    ENTITLEMENT_KEY,
    GENERATOR,
    PERSISTENT_ID,
    PRODUCT,
    PRODUCT_FAMILY,
    REVISION,
    SUMMARY,
    UNSPSC_CODE,
    UNSPSC_VERSION,
    FIRMWARE,
    MANIFEST_ID,
    CREATION_TIMESTAMP,
    FIRMWARE_VERSION,
    NONCE,
    TARGET_DEVICE_ID,
    FIRMWARE_PAYLOAD,
    FORMAT_TYPE,
    STORAGE_ID,
    PACKAGE,
];

/// Looks up a field by id.
pub fn by_id(id: u32) -> Option<Field> {
    ALL.iter().copied().find(|f| f.id == id)
}

/// Display name for a field id, as used by the compact-text format.
pub fn name_of(id: u32) -> Option<&'static str> {
    by_id(id).map(|f| f.name)
}

/// The object types of the tag tree.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Shape {
    /// Root tag.
    Tag,
    /// Entity.
    Entity,
    /// Evidence collection.
    Evidence,
    /// Link.
    Link,
    /// Meta block.
    Meta,
    /// Payload collection.
    Payload,
    /// Directory.
    Directory,
    /// File.
    File,
    /// Process.
    Process,
    /// Generic resource.
    Resource,
    /// Firmware descriptor.
    Firmware,
    /// Firmware payload image.
    FirmwarePayload,
}

const COLLECTION: [Field; 5] = [DIRECTORY, FILE, PROCESS, RESOURCE, FIRMWARE];

impl Shape {
    /// Structured-text element name.
    pub fn element(self) -> &'static str {
        match self {
            Self::Tag => "SoftwareIdentity",
            Self::Entity => "Entity",
            Self::Evidence => "Evidence",
            Self::Link => "Link",
            Self::Meta => "Meta",
            Self::Payload => "Payload",
            Self::Directory => "Directory",
            Self::File => "File",
            Self::Process => "Process",
            Self::Resource => "Resource",
            Self::Firmware => "Firmware",
            Self::FirmwarePayload => "FirmwarePayload",
        }
    }

    /// Fields an object of this shape may carry.
    pub fn members(self) -> &'static [Field] {
        match self {
            Self::Tag => &[
                TAG_ID,
                SWID_NAME,
                TAG_VERSION,
                SOFTWARE_VERSION,
                VERSION_SCHEME,
                CORPUS,
                PATCH,
                SUPPLEMENTAL,
                LANG,
                MEDIA,
                ENTITY,
                EVIDENCE,
                PAYLOAD,
                LINK,
                SOFTWARE_META,
            ],
            Self::Entity => &[ENTITY_NAME, REG_ID, ROLE, THUMBPRINT],
            Self::Evidence => &[
                DATE, DEVICE_ID, DIRECTORY, FILE, PROCESS, RESOURCE, FIRMWARE,
            ],
            Self::Payload => &COLLECTION,
            Self::Link => &[HREF, REL, ARTIFACT, MEDIA, OWNERSHIP, MEDIA_TYPE, USE],
            Self::Meta => &[
                ACTIVATION_STATUS,
                CHANNEL_TYPE,
                COLLOQUIAL_VERSION,
                DESCRIPTION,
                EDITION,
                ENTITLEMENT_DATA_REQUIRED,
                ENTITLEMENT_KEY,
                GENERATOR,
                PERSISTENT_ID,
                PRODUCT,
                PRODUCT_FAMILY,
                REVISION,
                SUMMARY,
                UNSPSC_CODE,
                UNSPSC_VERSION,
            ],
            Self::Directory => &[FS_NAME, ROOT, LOCATION, DIRECTORY, FILE],
            Self::File => &[FS_NAME, SIZE, FILE_VERSION, ROOT, LOCATION, HASH],
            Self::Process => &[PROCESS_NAME, PID],
            Self::Resource => &[TYPE],
            Self::Firmware => &[
                MANIFEST_ID,
                CREATION_TIMESTAMP,
                FIRMWARE_VERSION,
                NONCE,
                TARGET_DEVICE_ID,
                FIRMWARE_PAYLOAD,
            ],
            Self::FirmwarePayload => &[FORMAT_TYPE, SIZE, STORAGE_ID, PACKAGE, HASH],
        }
    }

    /// Member with the given id.
    pub fn member_by_id(self, id: u32) -> Option<Field> {
        self.members().iter().copied().find(|f| f.id == id)
    }

    /// Member with the given compact-text name.
    pub fn member_by_name(self, name: &str) -> Option<Field> {
        self.members().iter().copied().find(|f| f.name == name)
    }

    /// Member rendered as the given XML attribute.
    pub fn member_by_attribute(self, attribute: &str) -> Option<Field> {
        self.members()
            .iter()
            .copied()
            .find(|f| matches!(f.xml, Xml::Attribute(name) if name == attribute))
    }

    /// Member rendered as the given XML child element.
    pub fn member_by_element(self, element: &str) -> Option<Field> {
        self.members()
            .iter()
            .copied()
            .find(|f| matches!(f.xml, Xml::Element(name) if name == element))
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn xml_lookups_take_borrowed_names() {
        let attribute = String::from("regid");
        let element = String::from("Directory");
        assert_eq!(Shape::Entity.member_by_attribute(&attribute), Some(ids::REG_ID));
        assert_eq!(Shape::Payload.member_by_element(&element), Some(ids::DIRECTORY));
        assert_eq!(Shape::Entity.member_by_attribute("Directory"), None);
        assert_eq!(Shape::Payload.member_by_element("regid"), None);
    }

    #[test]
    fn ids_and_names_are_unique() {
        for (i, a) in ALL.iter().enumerate() {
            for b in &ALL[i + 1..] {
                assert_ne!(a.id, b.id, "{} / {}", a.name, b.name);
                assert_ne!(a.name, b.name);
            }
        }
    }

    #[test]
    fn well_known_assignments() {
        assert_eq!(name_of(0), Some("tag-id"));
        assert_eq!(name_of(1), Some("swid-name"));
        assert_eq!(name_of(12), Some("tag-version"));
        assert_eq!(name_of(33), Some("role"));
        assert_eq!(name_of(38), Some("href"));
        assert_eq!(name_of(57), Some("unspsc-version"));
        assert_eq!(name_of(30), None);
    }

    #[test]
    fn member_lookups_are_scoped_to_shape() {
        assert_eq!(Shape::Tag.member_by_attribute("version"), Some(SOFTWARE_VERSION));
        assert_eq!(Shape::File.member_by_attribute("version"), Some(FILE_VERSION));
        assert_eq!(Shape::Firmware.member_by_attribute("version"), Some(FIRMWARE_VERSION));
        assert_eq!(Shape::Link.member_by_attribute("type"), Some(MEDIA_TYPE));
        assert_eq!(Shape::Resource.member_by_attribute("type"), Some(TYPE));
        assert_eq!(Shape::Payload.member_by_element("File"), Some(FILE));
        assert_eq!(Shape::Entity.member_by_name("role"), Some(ROLE));
        assert!(Shape::Entity.member_by_id(0).is_none());
    }

    #[test]
    fn no_shape_repeats_an_xml_name() {
        for shape in [
            Shape::Tag,
            Shape::Entity,
            Shape::Evidence,
            Shape::Link,
            Shape::Meta,
            Shape::Payload,
            Shape::Directory,
            Shape::File,
            Shape::Process,
            Shape::Resource,
            Shape::Firmware,
            Shape::FirmwarePayload,
        ] {
            let members = shape.members();
            for (i, a) in members.iter().enumerate() {
                for b in &members[i + 1..] {
                    assert!(a.xml == Xml::Absent || a.xml != b.xml, "{shape:?}: {}", a.name);
                }
            }
        }
    }
}
