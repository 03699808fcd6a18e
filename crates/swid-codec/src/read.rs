// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Rebuilds a [`Tag`] from a format-neutral [`Item`] tree.
//!
//! Each decoder first turns its input into `Item`s keyed by canonical field id;
//! this module then drives the public model API, so decoded tags obey the same
//! fail-fast setter rules as hand-built ones. The result is not validated.

use swid_core::{
    Directory, Entity, Evidence, File, Firmware, FirmwarePayload, HashAlgorithm, Link, Meta,
    Ownership, Payload, Process, Registry, ResourceCollection, ResourceItem, Tag, TagUsage, Term,
    Use, Vocabularies, Vocabulary, WellKnownHash,
};
use time::OffsetDateTime;
use tracing::warn;

use crate::error::DecodeError;
use crate::field::{self, ids, Field, Kind, Shape};

/// Format-neutral decoded value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Item {
    /// Non-negative integer.
    Uint(u64),
    /// Negative integer.
    Int(i64),
    /// Text.
    Text(String),
    /// Bytes.
    Bytes(Vec<u8>),
    /// Boolean.
    Bool(bool),
    /// Point in time.
    Timestamp(OffsetDateTime),
    /// Array; either a repeated field or a digest pair.
    Array(Vec<Item>),
    /// Object keyed by field id. Keys may repeat.
    Map(Vec<(u32, Item)>),
}

impl Item {
    fn describe(&self) -> &'static str {
        match self {
            Self::Uint(_) | Self::Int(_) => "integer",
            Self::Text(_) => "text",
            Self::Bytes(_) => "bytes",
            Self::Bool(_) => "bool",
            Self::Timestamp(_) => "timestamp",
            Self::Array(_) => "array",
            Self::Map(_) => "map",
        }
    }
}

/// Splits a field value into its occurrences.
///
/// Arrays hold repeats, except a lone digest which is itself a two-element array.
pub(crate) fn spread(field: Field, item: Item) -> Vec<Item> {
    match item {
        Item::Array(items) if field.kind != Kind::Digest => items,
        Item::Array(items) if matches!(items.first(), Some(Item::Array(_))) => items,
        other => vec![other],
    }
}

fn mismatch(field: Field, expected: &str, found: &Item) -> DecodeError {
    DecodeError::malformed(format!(
        "`{}` must be {expected}, found {}",
        field.name,
        found.describe()
    ))
}

/// Field values of one object, grouped by field.
struct Fields {
    shape: Shape,
    values: Vec<(Field, Item)>,
}

impl Fields {
    fn new(item: Item, shape: Shape) -> Result<Self, DecodeError> {
        let Item::Map(entries) = item else {
            return Err(DecodeError::malformed(format!(
                "{} must be a map, found {}",
                shape.element(),
                item.describe()
            )));
        };
        let mut values = Vec::with_capacity(entries.len());
        for (id, value) in entries {
            let Some(field) = shape.member_by_id(id) else {
                warn!(
                    id,
                    name = field::name_of(id).unwrap_or("unassigned"),
                    shape = shape.element(),
                    "skipping unknown field"
                );
                continue;
            };
            values.extend(spread(field, value).into_iter().map(|v| (field, v)));
        }
        Ok(Self { shape, values })
    }

    fn take(&mut self, field: Field) -> Vec<Item> {
        let (taken, rest): (Vec<_>, Vec<_>) = std::mem::take(&mut self.values)
            .into_iter()
            .partition(|(f, _)| f.id == field.id);
        self.values = rest;
        taken.into_iter().map(|(_, item)| item).collect()
    }

    fn one(&mut self, field: Field) -> Result<Option<Item>, DecodeError> {
        let mut items = self.take(field);
        match items.len() {
            0 | 1 => Ok(items.pop()),
            n => Err(DecodeError::malformed(format!(
                "`{}` appears {n} times in {}",
                field.name,
                self.shape.element()
            ))),
        }
    }

    fn missing(&self, field: Field) -> DecodeError {
        DecodeError::malformed(format!(
            "{} is missing `{}`",
            self.shape.element(),
            field.name
        ))
    }

    fn text(&mut self, field: Field) -> Result<Option<String>, DecodeError> {
        match self.one(field)? {
            None => Ok(None),
            Some(Item::Text(text)) => Ok(Some(text)),
            Some(other) => Err(mismatch(field, "text", &other)),
        }
    }

    fn required_text(&mut self, field: Field) -> Result<String, DecodeError> {
        self.text(field)?.ok_or_else(|| self.missing(field))
    }

    fn uint(&mut self, field: Field) -> Result<Option<u64>, DecodeError> {
        match self.one(field)? {
            None => Ok(None),
            Some(Item::Uint(value)) => Ok(Some(value)),
            Some(other) => Err(mismatch(field, "an unsigned integer", &other)),
        }
    }

    fn required_uint(&mut self, field: Field) -> Result<u64, DecodeError> {
        self.uint(field)?.ok_or_else(|| self.missing(field))
    }

    fn bool(&mut self, field: Field) -> Result<Option<bool>, DecodeError> {
        match self.one(field)? {
            None => Ok(None),
            Some(Item::Bool(value)) => Ok(Some(value)),
            Some(other) => Err(mismatch(field, "a bool", &other)),
        }
    }

    fn bytes(&mut self, field: Field) -> Result<Option<Vec<u8>>, DecodeError> {
        match self.one(field)? {
            None => Ok(None),
            Some(Item::Bytes(value)) => Ok(Some(value)),
            Some(other) => Err(mismatch(field, "bytes", &other)),
        }
    }

    fn timestamp(&mut self, field: Field) -> Result<Option<OffsetDateTime>, DecodeError> {
        match self.one(field)? {
            None => Ok(None),
            Some(Item::Timestamp(value)) => Ok(Some(value)),
            Some(other) => Err(mismatch(field, "a timestamp", &other)),
        }
    }

    fn digests(
        &mut self,
        field: Field,
        registry: &Registry<WellKnownHash>,
    ) -> Result<Vec<(HashAlgorithm, Vec<u8>)>, DecodeError> {
        self.take(field)
            .into_iter()
            .map(|item| match item {
                Item::Array(pair) => match <[Item; 2]>::try_from(pair) {
                    Ok([algorithm, Item::Bytes(value)]) => {
                        Ok((registry_term(registry, field, algorithm)?, value))
                    }
                    _ => Err(DecodeError::malformed(format!(
                        "`{}` must be an [algorithm, bytes] pair",
                        field.name
                    ))),
                },
                other => Err(mismatch(field, "an [algorithm, bytes] pair", &other)),
            })
            .collect()
    }
}

fn index_term<V: Vocabulary>(registry: &Registry<V>, index: i64) -> Term<V> {
    registry.by_index(index).unwrap_or_else(|| Term::Private {
        name: index.to_string(),
        index: Some(index),
    })
}

fn registry_term<V: Vocabulary>(
    registry: &Registry<V>,
    field: Field,
    item: Item,
) -> Result<Term<V>, DecodeError> {
    match item {
        Item::Text(name) => Ok(registry.by_name(&name)),
        Item::Int(index) => Ok(index_term(registry, index)),
        Item::Uint(index) => i64::try_from(index)
            .map(|index| index_term(registry, index))
            .map_err(|_| DecodeError::malformed(format!("`{}` index {index} is out of range", field.name))),
        other => Err(mismatch(field, "a term", &other)),
    }
}

fn closed_term<V: Vocabulary>(field: Field, item: &Item) -> Result<V, DecodeError> {
    let found = match item {
        Item::Text(name) => V::from_name(name),
        Item::Uint(index) => i64::try_from(*index).ok().and_then(V::from_index),
        Item::Int(index) => V::from_index(*index),
        _ => None,
    };
    found.ok_or_else(|| {
        DecodeError::malformed(format!("`{}` is not a valid {}: {item:?}", field.name, V::LABEL))
    })
}

/// Builds a tag from its decoded root map.
pub(crate) fn tag_from_item(item: Item, vocab: &Vocabularies) -> Result<Tag, DecodeError> {
    let mut f = Fields::new(item, Shape::Tag)?;
    let name = f.required_text(ids::SWID_NAME)?;
    let tag_id = f.required_text(ids::TAG_ID)?;
    let mut tag = Tag::new(name, tag_id)?;

    if let Some(version) = f.uint(ids::TAG_VERSION)? {
        tag.set_tag_version(version);
    }
    if let Some(version) = f.text(ids::SOFTWARE_VERSION)? {
        tag.set_software_version(version)?;
    }
    if let Some(scheme) = f.one(ids::VERSION_SCHEME)? {
        tag.set_version_scheme(registry_term(
            &vocab.version_schemes,
            ids::VERSION_SCHEME,
            scheme,
        )?)?;
    }

    let mut usage = None;
    for (flag, kind) in [
        (ids::CORPUS, TagUsage::Corpus),
        (ids::PATCH, TagUsage::Patch),
        (ids::SUPPLEMENTAL, TagUsage::Supplemental),
    ] {
        if f.bool(flag)? == Some(true) && usage.replace(kind).is_some() {
            return Err(DecodeError::malformed(
                "at most one of corpus, patch and supplemental may be set",
            ));
        }
    }
    tag.set_usage(usage.unwrap_or_default());

    if let Some(lang) = f.text(ids::LANG)? {
        tag.set_lang(lang)?;
    }
    if let Some(media) = f.text(ids::MEDIA)? {
        tag.set_media(media)?;
    }

    for item in f.take(ids::ENTITY) {
        tag.add_entity(read_entity(item, vocab)?);
    }
    if let Some(item) = f.one(ids::EVIDENCE)? {
        tag.set_evidence(read_evidence(item, vocab)?);
    }
    if let Some(item) = f.one(ids::PAYLOAD)? {
        tag.set_payload(read_payload(item, vocab)?);
    }
    for item in f.take(ids::LINK) {
        tag.add_link(read_link(item)?);
    }
    for item in f.take(ids::SOFTWARE_META) {
        tag.add_meta(read_meta(item)?);
    }
    Ok(tag)
}

fn read_entity(item: Item, vocab: &Vocabularies) -> Result<Entity, DecodeError> {
    let mut f = Fields::new(item, Shape::Entity)?;
    let name = f.required_text(ids::ENTITY_NAME)?;
    let mut roles = f
        .take(ids::ROLE)
        .into_iter()
        .map(|item| registry_term(&vocab.roles, ids::ROLE, item));
    let first = roles.next().ok_or_else(|| f.missing(ids::ROLE))??;
    let mut entity = Entity::new(name, first)?;
    for role in roles {
        entity.add_role(role?)?;
    }
    if let Some(regid) = f.text(ids::REG_ID)? {
        entity.set_regid(regid)?;
    }
    if let Some(thumbprint) = f.text(ids::THUMBPRINT)? {
        entity.set_thumbprint(thumbprint)?;
    }
    Ok(entity)
}

fn read_link(item: Item) -> Result<Link, DecodeError> {
    let mut f = Fields::new(item, Shape::Link)?;
    let mut link = Link::new(f.required_text(ids::HREF)?, f.required_text(ids::REL)?)?;
    if let Some(artifact) = f.text(ids::ARTIFACT)? {
        link.set_artifact(artifact)?;
    }
    if let Some(media) = f.text(ids::MEDIA)? {
        link.set_media(media)?;
    }
    if let Some(item) = f.one(ids::OWNERSHIP)? {
        link.set_ownership(closed_term::<Ownership>(ids::OWNERSHIP, &item)?);
    }
    if let Some(media_type) = f.text(ids::MEDIA_TYPE)? {
        link.set_media_type(media_type)?;
    }
    if let Some(item) = f.one(ids::USE)? {
        link.set_usage(closed_term::<Use>(ids::USE, &item)?);
    }
    Ok(link)
}

fn read_meta(item: Item) -> Result<Meta, DecodeError> {
    let mut f = Fields::new(item, Shape::Meta)?;
    Ok(Meta {
        activation_status: f.text(ids::ACTIVATION_STATUS)?,
        channel_type: f.text(ids::CHANNEL_TYPE)?,
        colloquial_version: f.text(ids::COLLOQUIAL_VERSION)?,
        description: f.text(ids::DESCRIPTION)?,
        edition: f.text(ids::EDITION)?,
        entitlement_data_required: f.bool(ids::ENTITLEMENT_DATA_REQUIRED)?,
        entitlement_key: f.text(ids::ENTITLEMENT_KEY)?,
        generator: f.text(ids::GENERATOR)?,
        persistent_id: f.text(ids::PERSISTENT_ID)?,
        product: f.text(ids::PRODUCT)?,
        product_family: f.text(ids::PRODUCT_FAMILY)?,
        revision: f.text(ids::REVISION)?,
        summary: f.text(ids::SUMMARY)?,
        unspsc_code: f.text(ids::UNSPSC_CODE)?,
        unspsc_version: f.text(ids::UNSPSC_VERSION)?,
    })
}

fn read_evidence(item: Item, vocab: &Vocabularies) -> Result<Evidence, DecodeError> {
    let mut f = Fields::new(item, Shape::Evidence)?;
    let mut evidence = Evidence::new();
    if let Some(date) = f.timestamp(ids::DATE)? {
        evidence.set_date(date);
    }
    if let Some(device_id) = f.text(ids::DEVICE_ID)? {
        evidence.set_device_id(device_id)?;
    }
    read_collection(&mut f, evidence.collection_mut(), vocab)?;
    Ok(evidence)
}

fn read_payload(item: Item, vocab: &Vocabularies) -> Result<Payload, DecodeError> {
    let mut f = Fields::new(item, Shape::Payload)?;
    let mut payload = Payload::new();
    read_collection(&mut f, payload.collection_mut(), vocab)?;
    Ok(payload)
}

fn read_collection(
    f: &mut Fields,
    collection: &mut ResourceCollection,
    vocab: &Vocabularies,
) -> Result<(), DecodeError> {
    for item in f.take(ids::DIRECTORY) {
        collection.add_directory(read_directory(item, vocab)?)?;
    }
    for item in f.take(ids::FILE) {
        collection.add_file(read_file(item, vocab)?);
    }
    for item in f.take(ids::PROCESS) {
        let mut p = Fields::new(item, Shape::Process)?;
        let mut process = Process::new(p.required_text(ids::PROCESS_NAME)?)?;
        if let Some(pid) = p.uint(ids::PID)? {
            process.set_pid(pid);
        }
        collection.add_process(process);
    }
    for item in f.take(ids::RESOURCE) {
        let mut r = Fields::new(item, Shape::Resource)?;
        collection.add_resource(ResourceItem::new(r.required_text(ids::TYPE)?)?);
    }
    for item in f.take(ids::FIRMWARE) {
        collection.add_firmware(read_firmware(item, vocab)?);
    }
    Ok(())
}

fn read_directory(item: Item, vocab: &Vocabularies) -> Result<Directory, DecodeError> {
    let mut f = Fields::new(item, Shape::Directory)?;
    let mut dir = Directory::new(f.required_text(ids::FS_NAME)?)?;
    if let Some(root) = f.text(ids::ROOT)? {
        dir.set_root(root)?;
    }
    if let Some(location) = f.text(ids::LOCATION)? {
        dir.set_location(location)?;
    }
    for child in f.take(ids::DIRECTORY) {
        dir.add_directory(read_directory(child, vocab)?)?;
    }
    for file in f.take(ids::FILE) {
        dir.add_file(read_file(file, vocab)?);
    }
    Ok(dir)
}

fn read_file(item: Item, vocab: &Vocabularies) -> Result<File, DecodeError> {
    let mut f = Fields::new(item, Shape::File)?;
    let mut file = File::new(f.required_text(ids::FS_NAME)?)?;
    if let Some(size) = f.uint(ids::SIZE)? {
        file.set_size(size);
    }
    if let Some(version) = f.text(ids::FILE_VERSION)? {
        file.set_version(version)?;
    }
    if let Some(root) = f.text(ids::ROOT)? {
        file.set_root(root)?;
    }
    if let Some(location) = f.text(ids::LOCATION)? {
        file.set_location(location)?;
    }
    for (algorithm, digest) in f.digests(ids::HASH, &vocab.hash_algorithms)? {
        file.set_hash(algorithm, digest)?;
    }
    Ok(file)
}

fn read_firmware(item: Item, vocab: &Vocabularies) -> Result<Firmware, DecodeError> {
    let mut f = Fields::new(item, Shape::Firmware)?;
    let manifest_id = f.required_text(ids::MANIFEST_ID)?;
    let created = f
        .timestamp(ids::CREATION_TIMESTAMP)?
        .ok_or_else(|| f.missing(ids::CREATION_TIMESTAMP))?;
    let version = f.required_uint(ids::FIRMWARE_VERSION)?;
    let mut firmware = Firmware::new(manifest_id, created, version)?;
    if let Some(nonce) = f.bytes(ids::NONCE)? {
        firmware.set_nonce(nonce)?;
    }
    if let Some(id) = f.text(ids::TARGET_DEVICE_ID)? {
        firmware.set_target_device_id(id)?;
    }
    for item in f.take(ids::FIRMWARE_PAYLOAD) {
        let mut p = Fields::new(item, Shape::FirmwarePayload)?;
        let mut payload = FirmwarePayload::new(
            p.required_uint(ids::FORMAT_TYPE)?,
            p.required_uint(ids::SIZE)?,
        );
        if let Some(storage_id) = p.text(ids::STORAGE_ID)? {
            payload.set_storage_id(storage_id)?;
        }
        if let Some(package) = p.bytes(ids::PACKAGE)? {
            payload.set_package(package);
        }
        for (algorithm, digest) in p.digests(ids::HASH, &vocab.hash_algorithms)? {
            payload.add_digest(algorithm, digest)?;
        }
        firmware.add_payload(payload);
    }
    Ok(firmware)
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    fn text(s: &str) -> Item {
        Item::Text(s.to_owned())
    }

    fn minimal(extra: Vec<(u32, Item)>) -> Item {
        let entity = Item::Map(vec![(31, text("Example")), (33, Item::Uint(1))]);
        let mut root = vec![(0, text("demo-1.0")), (1, text("demo")), (2, entity)];
        root.extend(extra);
        Item::Map(root)
    }

    #[test]
    fn minimal_map_builds_a_valid_tag() {
        let tag = tag_from_item(minimal(Vec::new()), &Vocabularies::new()).unwrap();
        tag.validate().unwrap();
        assert_eq!(tag.tag_id(), "demo-1.0");
        assert_eq!(tag.entities()[0].roles()[0].name(), "tagCreator");
    }

    #[test]
    fn unknown_fields_are_skipped() {
        let tag = tag_from_item(minimal(vec![(999, Item::Bool(true))]), &Vocabularies::new());
        assert!(tag.is_ok());
    }

    #[test]
    fn missing_required_field_is_malformed() {
        let item = Item::Map(vec![(0, text("id"))]);
        let err = tag_from_item(item, &Vocabularies::new()).unwrap_err();
        assert!(matches!(err, DecodeError::Malformed(msg) if msg.contains("swid-name")));
    }

    #[test]
    fn conflicting_usage_flags_are_malformed() {
        let item = minimal(vec![(8, Item::Bool(true)), (9, Item::Bool(true))]);
        assert!(matches!(
            tag_from_item(item, &Vocabularies::new()),
            Err(DecodeError::Malformed(_))
        ));
    }

    #[test]
    fn unregistered_indices_become_private_terms() {
        let mut vocab = Vocabularies::new();
        vocab.roles.register(40, "auditor").unwrap();
        let entity = Item::Map(vec![
            (31, text("Example")),
            (33, Item::Array(vec![Item::Uint(1), Item::Uint(40), Item::Uint(41)])),
        ]);
        let item = Item::Map(vec![(0, text("id")), (1, text("n")), (2, entity)]);
        let tag = tag_from_item(item, &vocab).unwrap();
        let roles: Vec<_> = tag.entities()[0].roles().iter().map(|r| (r.name(), r.index())).collect();
        assert_eq!(roles, [("tagCreator", Some(1)), ("auditor", Some(40)), ("41", Some(41))]);
    }

    #[test]
    fn single_digest_is_not_spread() {
        let pair = Item::Array(vec![Item::Uint(1), Item::Bytes(vec![1, 2])]);
        assert_eq!(spread(ids::HASH, pair.clone()).len(), 1);
        let many = Item::Array(vec![pair.clone(), pair]);
        assert_eq!(spread(ids::HASH, many).len(), 2);
        let roles = Item::Array(vec![Item::Uint(1), Item::Uint(2)]);
        assert_eq!(spread(ids::ROLE, roles).len(), 2);
    }

    #[test]
    fn closed_vocabularies_reject_unknown_values() {
        let link = Item::Map(vec![
            (38, text("https://example.com")),
            (40, text("license")),
            (39, Item::Uint(9)),
        ]);
        assert!(read_link(link).is_err());
    }
}
