// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Flattens a [`Tag`] into the [`Object`] tree every encoder replays.
//!
//! Order: tag scalars, entities, evidence or payload, links, meta blocks. Inside
//! every object, scalar fields precede nested objects.

use swid_core::{
    Directory, Entity, Evidence, File, Firmware, FirmwarePayload, HashAlgorithm, Link, Meta,
    Payload, Process, ResourceCollection, ResourceItem, Tag, TagUsage, Term, Vocabulary,
};

use crate::emit::{Node, Object, Scalar};
use crate::error::EncodeError;
use crate::field::{ids, Field, Shape};

/// Builds the object tree for `tag`.
pub fn tag_object(tag: &Tag) -> Result<Object<'_>, EncodeError> {
    let mut obj = Object::new(Shape::Tag);
    obj.required_text(ids::TAG_ID, tag.tag_id())?;
    obj.required_text(ids::SWID_NAME, tag.name())?;
    obj.scalar(ids::TAG_VERSION, Scalar::Uint(tag.tag_version()));
    obj.text(ids::SOFTWARE_VERSION, tag.explicit_software_version());
    if let Some(scheme) = tag.explicit_version_scheme() {
        obj.scalar(ids::VERSION_SCHEME, term(scheme));
    }
    match tag.usage() {
        TagUsage::Primary => {}
        TagUsage::Corpus => obj.scalar(ids::CORPUS, Scalar::Bool(true)),
        TagUsage::Patch => obj.scalar(ids::PATCH, Scalar::Bool(true)),
        TagUsage::Supplemental => obj.scalar(ids::SUPPLEMENTAL, Scalar::Bool(true)),
    }
    obj.text(ids::LANG, tag.lang());
    obj.text(ids::MEDIA, tag.media());

    let entities = tag
        .entities()
        .iter()
        .map(entity_object)
        .collect::<Result<Vec<_>, _>>()?;
    if entities.is_empty() {
        return Err(EncodeError::InvariantViolation {
            field: ids::ENTITY.name,
        });
    }
    obj.objects(ids::ENTITY, entities);

    if let Some(evidence) = tag.evidence() {
        obj.objects(ids::EVIDENCE, vec![evidence_object(evidence)?]);
    }
    if let Some(payload) = tag.payload() {
        obj.objects(ids::PAYLOAD, vec![payload_object(payload)?]);
    }

    let links = tag
        .links()
        .iter()
        .map(link_object)
        .collect::<Result<Vec<_>, _>>()?;
    obj.objects(ids::LINK, links);
    obj.objects(ids::SOFTWARE_META, tag.metas().iter().map(meta_object).collect());
    Ok(obj)
}

fn term<V: Vocabulary>(value: &Term<V>) -> Scalar<'_> {
    Scalar::Term {
        index: value.index(),
        name: value.name(),
    }
}

fn known<V: Vocabulary>(value: V) -> Scalar<'static> {
    Scalar::Term {
        index: Some(value.index()),
        name: value.name(),
    }
}

fn digests<'a>(obj: &mut Object<'a>, field: Field, hashes: &'a [(HashAlgorithm, Vec<u8>)]) {
    obj.repeated(
        field,
        hashes
            .iter()
            .map(|(algorithm, value)| {
                Node::Scalar(Scalar::Digest {
                    algorithm,
                    value: value.as_slice(),
                })
            })
            .collect(),
    );
}

fn entity_object(entity: &Entity) -> Result<Object<'_>, EncodeError> {
    let mut obj = Object::new(Shape::Entity);
    obj.required_text(ids::ENTITY_NAME, entity.name())?;
    obj.scalar(ids::REG_ID, Scalar::Text(entity.regid()));
    let roles: Vec<_> = entity
        .roles()
        .iter()
        .map(|role| Node::Scalar(term(role)))
        .collect();
    if roles.is_empty() {
        return Err(EncodeError::InvariantViolation {
            field: ids::ROLE.name,
        });
    }
    obj.repeated(ids::ROLE, roles);
    obj.text(ids::THUMBPRINT, entity.thumbprint());
    Ok(obj)
}

fn link_object(link: &Link) -> Result<Object<'_>, EncodeError> {
    let mut obj = Object::new(Shape::Link);
    obj.required_text(ids::HREF, link.href())?;
    obj.required_text(ids::REL, link.rel())?;
    obj.text(ids::ARTIFACT, link.artifact());
    obj.text(ids::MEDIA, link.media());
    if let Some(ownership) = link.ownership() {
        obj.scalar(ids::OWNERSHIP, known(ownership));
    }
    obj.text(ids::MEDIA_TYPE, link.media_type());
    if let Some(usage) = link.usage() {
        obj.scalar(ids::USE, known(usage));
    }
    Ok(obj)
}

fn meta_object(meta: &Meta) -> Object<'_> {
    let mut obj = Object::new(Shape::Meta);
    obj.text(ids::ACTIVATION_STATUS, meta.activation_status.as_deref());
    obj.text(ids::CHANNEL_TYPE, meta.channel_type.as_deref());
    obj.text(ids::COLLOQUIAL_VERSION, meta.colloquial_version.as_deref());
    obj.text(ids::DESCRIPTION, meta.description.as_deref());
    obj.text(ids::EDITION, meta.edition.as_deref());
    if let Some(required) = meta.entitlement_data_required {
        obj.scalar(ids::ENTITLEMENT_DATA_REQUIRED, Scalar::Bool(required));
    }
    obj.text(ids::ENTITLEMENT_KEY, meta.entitlement_key.as_deref());
    obj.text(ids::GENERATOR, meta.generator.as_deref());
    obj.text(ids::PERSISTENT_ID, meta.persistent_id.as_deref());
    obj.text(ids::PRODUCT, meta.product.as_deref());
    obj.text(ids::PRODUCT_FAMILY, meta.product_family.as_deref());
    obj.text(ids::REVISION, meta.revision.as_deref());
    obj.text(ids::SUMMARY, meta.summary.as_deref());
    obj.text(ids::UNSPSC_CODE, meta.unspsc_code.as_deref());
    obj.text(ids::UNSPSC_VERSION, meta.unspsc_version.as_deref());
    obj
}

fn evidence_object(evidence: &Evidence) -> Result<Object<'_>, EncodeError> {
    let mut obj = Object::new(Shape::Evidence);
    if let Some(date) = evidence.date() {
        obj.scalar(ids::DATE, Scalar::Timestamp(date));
    }
    obj.text(ids::DEVICE_ID, evidence.device_id());
    collection_entries(&mut obj, evidence.collection())?;
    Ok(obj)
}

fn payload_object(payload: &Payload) -> Result<Object<'_>, EncodeError> {
    let mut obj = Object::new(Shape::Payload);
    collection_entries(&mut obj, payload.collection())?;
    Ok(obj)
}

fn collection_entries<'a>(
    obj: &mut Object<'a>,
    collection: &'a ResourceCollection,
) -> Result<(), EncodeError> {
    directories(obj, collection.directories())?;
    files(obj, collection.files())?;
    let processes = collection
        .processes()
        .iter()
        .map(process_object)
        .collect::<Result<Vec<_>, _>>()?;
    obj.objects(ids::PROCESS, processes);
    let resources = collection
        .resources()
        .iter()
        .map(resource_object)
        .collect::<Result<Vec<_>, _>>()?;
    obj.objects(ids::RESOURCE, resources);
    let firmware = collection
        .firmware()
        .iter()
        .map(firmware_object)
        .collect::<Result<Vec<_>, _>>()?;
    obj.objects(ids::FIRMWARE, firmware);
    Ok(())
}

fn directories<'a>(obj: &mut Object<'a>, dirs: &'a [Directory]) -> Result<(), EncodeError> {
    let dirs = dirs
        .iter()
        .map(directory_object)
        .collect::<Result<Vec<_>, _>>()?;
    obj.objects(ids::DIRECTORY, dirs);
    Ok(())
}

fn files<'a>(obj: &mut Object<'a>, files: &'a [File]) -> Result<(), EncodeError> {
    let files = files.iter().map(file_object).collect::<Result<Vec<_>, _>>()?;
    obj.objects(ids::FILE, files);
    Ok(())
}

fn directory_object(dir: &Directory) -> Result<Object<'_>, EncodeError> {
    let mut obj = Object::new(Shape::Directory);
    obj.required_text(ids::FS_NAME, dir.name())?;
    obj.text(ids::ROOT, dir.root());
    obj.text(ids::LOCATION, dir.location());
    directories(&mut obj, dir.directories())?;
    files(&mut obj, dir.files())?;
    Ok(obj)
}

fn file_object(file: &File) -> Result<Object<'_>, EncodeError> {
    let mut obj = Object::new(Shape::File);
    obj.required_text(ids::FS_NAME, file.name())?;
    if let Some(size) = file.size() {
        obj.scalar(ids::SIZE, Scalar::Uint(size));
    }
    obj.text(ids::FILE_VERSION, file.version());
    obj.text(ids::ROOT, file.root());
    obj.text(ids::LOCATION, file.location());
    digests(&mut obj, ids::HASH, file.hashes());
    Ok(obj)
}

fn process_object(process: &Process) -> Result<Object<'_>, EncodeError> {
    let mut obj = Object::new(Shape::Process);
    obj.required_text(ids::PROCESS_NAME, process.name())?;
    if let Some(pid) = process.pid() {
        obj.scalar(ids::PID, Scalar::Uint(pid));
    }
    Ok(obj)
}

fn resource_object(resource: &ResourceItem) -> Result<Object<'_>, EncodeError> {
    let mut obj = Object::new(Shape::Resource);
    obj.required_text(ids::TYPE, resource.kind())?;
    Ok(obj)
}

fn firmware_object(firmware: &Firmware) -> Result<Object<'_>, EncodeError> {
    let mut obj = Object::new(Shape::Firmware);
    obj.required_text(ids::MANIFEST_ID, firmware.manifest_id())?;
    obj.scalar(
        ids::CREATION_TIMESTAMP,
        Scalar::Timestamp(firmware.creation_timestamp()),
    );
    obj.scalar(ids::FIRMWARE_VERSION, Scalar::Uint(firmware.version()));
    if let Some(nonce) = firmware.nonce() {
        obj.scalar(ids::NONCE, Scalar::Bytes(nonce));
    }
    obj.text(ids::TARGET_DEVICE_ID, firmware.target_device_id());
    obj.objects(
        ids::FIRMWARE_PAYLOAD,
        firmware.payloads().iter().map(firmware_payload_object).collect(),
    );
    Ok(obj)
}

fn firmware_payload_object(payload: &FirmwarePayload) -> Object<'_> {
    let mut obj = Object::new(Shape::FirmwarePayload);
    obj.scalar(ids::FORMAT_TYPE, Scalar::Uint(payload.format_type()));
    obj.scalar(ids::SIZE, Scalar::Uint(payload.size()));
    obj.text(ids::STORAGE_ID, payload.storage_id());
    if let Some(package) = payload.package() {
        obj.scalar(ids::PACKAGE, Scalar::Bytes(package));
    }
    digests(&mut obj, ids::HASH, payload.digests());
    obj
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use swid_core::{WellKnownRole, UNKNOWN_REGID};

    fn minimal() -> Tag {
        let mut tag = Tag::new("demo", "demo-1.0").unwrap();
        tag.add_entity(Entity::new("Example", WellKnownRole::TagCreator).unwrap());
        tag
    }

    fn names(obj: &Object<'_>) -> Vec<&'static str> {
        obj.entries.iter().map(|e| e.field.name).collect()
    }

    #[test]
    fn defaults_follow_the_write_rules() {
        let tag = minimal();
        let obj = tag_object(&tag).unwrap();
        assert_eq!(names(&obj), ["tag-id", "swid-name", "tag-version", "entity"]);

        let Node::Object(entity) = &obj.entries[3].values[0] else {
            panic!("entity is an object");
        };
        assert!(matches!(
            entity.entries[1].values[0],
            Node::Scalar(Scalar::Text(UNKNOWN_REGID))
        ));
    }

    #[test]
    fn meta_is_emitted_without_links() {
        let mut tag = minimal();
        tag.add_meta(Meta {
            product: Some("Demo".into()),
            ..Meta::default()
        });
        let obj = tag_object(&tag).unwrap();
        assert_eq!(names(&obj).last(), Some(&"software-meta"));
    }

    #[test]
    fn usage_flags_are_written_only_when_set() {
        let mut tag = minimal();
        tag.set_usage(TagUsage::Patch);
        let obj = tag_object(&tag).unwrap();
        assert!(names(&obj).contains(&"patch"));
        assert!(!names(&obj).contains(&"corpus"));
    }

    #[test]
    fn collection_order_is_directories_then_files() {
        let mut payload = Payload::new();
        payload.collection_mut().insert_file(&["top.txt"]).unwrap();
        payload.collection_mut().insert_file(&["lib", "a.jar"]).unwrap();
        let mut tag = minimal();
        tag.set_payload(payload);
        let obj = tag_object(&tag).unwrap();
        let Node::Object(payload) = &obj.entries[4].values[0] else {
            panic!("payload is an object");
        };
        assert_eq!(names(payload), ["directory", "file"]);
    }
}
