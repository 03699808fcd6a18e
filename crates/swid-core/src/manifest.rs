// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! JSON build manifest.
//!
//! Packaging tools describe the tag they want as a [`TagManifest`]: identity,
//! entities, links, meta blocks, where the tag will be stored inside the archive,
//! and the resources to list. [`TagManifest::build`] turns it into a [`Tag`],
//! relativizing every resource against the tag's archive path and optionally
//! hashing the files found under a content root.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::TagError;
use crate::resource::{Evidence, Payload, ResourceCollection};
use crate::tag::{Entity, Link, Meta, Tag, TagUsage};
use crate::vocab::{Ownership, Use, Vocabularies, Vocabulary};

/// Which resource collection the manifest's resources go into.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CollectionKind {
    /// Installed resources.
    #[default]
    Payload,
    /// Observed resources.
    Evidence,
}

/// An entity entry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct EntityManifest {
    /// Entity name.
    pub name: String,
    /// Registration id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub regid: Option<String>,
    /// Certificate thumbprint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbprint: Option<String>,
    /// Role names; at least one.
    pub roles: Vec<String>,
}

/// A link entry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct LinkManifest {
    /// Target URI.
    pub href: String,
    /// Relationship name.
    pub rel: String,
    /// Artifact name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artifact: Option<String>,
    /// Media query.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media: Option<String>,
    /// Ownership name (`abandon`, `private`, `shared`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ownership: Option<String>,
    /// MIME type.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media_type: Option<String>,
    /// Use name (`optional`, `required`, `recommended`).
    #[serde(default, rename = "use", skip_serializing_if = "Option::is_none")]
    pub usage: Option<String>,
}

/// A resource supplied by the build tool.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ResourceDescriptor {
    /// Archive path of the resource, `/`-separated.
    pub path: String,
    /// Size in bytes. Filled from the content root when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    /// File version.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Build-tool artifact coordinates. Informational only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artifact: Option<String>,
}

/// Everything a packaging tool supplies to produce a tag.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct TagManifest {
    /// Software name.
    pub name: String,
    /// Tag identifier.
    pub tag_id: String,
    /// Tag revision.
    #[serde(default)]
    pub tag_version: u64,
    /// Software version.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub software_version: Option<String>,
    /// Version scheme name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version_scheme: Option<String>,
    /// Tag usage kind.
    #[serde(default)]
    pub usage: TagUsage,
    /// Language tag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lang: Option<String>,
    /// Media query.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media: Option<String>,
    /// Entities.
    pub entities: Vec<EntityManifest>,
    /// Links.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub links: Vec<LinkManifest>,
    /// Meta blocks.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub meta: Vec<Meta>,
    /// Where the tag file will live inside the archive.
    pub tag_path: String,
    /// Digest algorithm names applied to every resource.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub hash_algorithms: Vec<String>,
    /// Collection the resources go into.
    #[serde(default)]
    pub collection: CollectionKind,
    /// Resources to list.
    #[serde(default)]
    pub resources: Vec<ResourceDescriptor>,
}

impl TagManifest {
    /// Parses a manifest from JSON bytes.
    pub fn from_json_slice(bytes: &[u8]) -> Result<Self, TagError> {
        Ok(serde_json::from_slice(bytes)?)
    }

    /// Reads and parses a manifest file.
    pub fn load(path: &Path) -> Result<Self, TagError> {
        let bytes = std::fs::read(path)?;
        Self::from_json_slice(&bytes)
    }

    /// Serializes the manifest as pretty-printed JSON.
    pub fn to_json_vec(&self) -> Result<Vec<u8>, TagError> {
        Ok(serde_json::to_vec_pretty(self)?)
    }

    /// Builds the described tag.
    ///
    /// Names are resolved through `vocab`. When `content_root` is given, each
    /// resource is read from `content_root/<path>` to fill in a missing size and to
    /// compute every configured digest.
    pub fn build(&self, vocab: &Vocabularies, content_root: Option<&Path>) -> Result<Tag, TagError> {
        let mut tag = Tag::new(self.name.as_str(), self.tag_id.as_str())?;
        tag.set_tag_version(self.tag_version).set_usage(self.usage);
        if let Some(version) = &self.software_version {
            tag.set_software_version(version.as_str())?;
        }
        if let Some(scheme) = &self.version_scheme {
            tag.set_version_scheme(vocab.version_schemes.by_name(scheme))?;
        }
        if let Some(lang) = &self.lang {
            tag.set_lang(lang.as_str())?;
        }
        if let Some(media) = &self.media {
            tag.set_media(media.as_str())?;
        }

        for (i, entry) in self.entities.iter().enumerate() {
            tag.add_entity(build_entity(entry, vocab, i)?);
        }
        for link in &self.links {
            tag.add_link(build_link(link)?);
        }
        for meta in &self.meta {
            tag.add_meta(meta.clone());
        }

        let mut collection = ResourceCollection::new();
        self.fill_collection(&mut collection, vocab, content_root)?;
        match self.collection {
            CollectionKind::Payload if !collection.is_empty() => {
                let mut payload = Payload::new();
                *payload.collection_mut() = collection;
                tag.set_payload(payload);
            }
            CollectionKind::Evidence if !collection.is_empty() => {
                let mut evidence = Evidence::new();
                *evidence.collection_mut() = collection;
                tag.set_evidence(evidence);
            }
            _ => {}
        }

        debug!(
            tag_id = %self.tag_id,
            resources = self.resources.len(),
            hashed = content_root.is_some(),
            "built tag from manifest"
        );
        Ok(tag)
    }

    fn fill_collection(
        &self,
        collection: &mut ResourceCollection,
        vocab: &Vocabularies,
        content_root: Option<&Path>,
    ) -> Result<(), TagError> {
        let algorithms: Vec<_> = self
            .hash_algorithms
            .iter()
            .map(|name| vocab.hash_algorithms.by_name(name))
            .collect();

        for resource in &self.resources {
            let file = collection.add_relative_file(&self.tag_path, &resource.path)?;
            if let Some(size) = resource.size {
                file.set_size(size);
            }
            if let Some(version) = &resource.version {
                file.set_version(version.as_str())?;
            }
            let Some(root) = content_root else {
                continue;
            };
            let source = root.join(&resource.path);
            if resource.size.is_none() {
                file.set_size(std::fs::metadata(&source)?.len());
            }
            for algorithm in &algorithms {
                let digest = algorithm.digest_file(&source)?;
                file.set_hash(algorithm.clone(), digest)?;
            }
        }
        Ok(())
    }
}

fn build_entity(entry: &EntityManifest, vocab: &Vocabularies, at: usize) -> Result<Entity, TagError> {
    let Some((first, rest)) = entry.roles.split_first() else {
        return Err(TagError::validation(
            format!("entity[{at}].role"),
            "at least one role is required",
        ));
    };
    let mut entity = Entity::new(entry.name.as_str(), vocab.roles.by_name(first))?;
    for role in rest {
        entity.add_role(vocab.roles.by_name(role))?;
    }
    if let Some(regid) = &entry.regid {
        entity.set_regid(regid.as_str())?;
    }
    if let Some(thumbprint) = &entry.thumbprint {
        entity.set_thumbprint(thumbprint.as_str())?;
    }
    Ok(entity)
}

fn build_link(entry: &LinkManifest) -> Result<Link, TagError> {
    let mut link = Link::new(entry.href.as_str(), entry.rel.as_str())?;
    if let Some(artifact) = &entry.artifact {
        link.set_artifact(artifact.as_str())?;
    }
    if let Some(media) = &entry.media {
        link.set_media(media.as_str())?;
    }
    if let Some(name) = &entry.ownership {
        let ownership = Ownership::from_name(name)
            .ok_or_else(|| TagError::validation("link.ownership", format!("unknown ownership `{name}`")))?;
        link.set_ownership(ownership);
    }
    if let Some(media_type) = &entry.media_type {
        link.set_media_type(media_type.as_str())?;
    }
    if let Some(name) = &entry.usage {
        let usage = Use::from_name(name)
            .ok_or_else(|| TagError::validation("link.use", format!("unknown use `{name}`")))?;
        link.set_usage(usage);
    }
    Ok(link)
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    const MANIFEST: &str = r#"{
        "name": "demo",
        "tag-id": "demo-1.0",
        "software-version": "1.0",
        "version-scheme": "semver",
        "entities": [{ "name": "Example Corp", "regid": "example.com", "roles": ["tagCreator", "softwareCreator"] }],
        "links": [{ "href": "https://example.com/license", "rel": "license", "use": "required" }],
        "tag-path": "META-INF/swid/demo.swidtag",
        "resources": [{ "path": "lib/a.jar", "size": 3 }, { "path": "lib/b.jar", "version": "2" }]
    }"#;

    #[test]
    fn builds_tag_from_manifest() {
        let manifest = TagManifest::from_json_slice(MANIFEST.as_bytes()).unwrap();
        let tag = manifest.build(&Vocabularies::new(), None).unwrap();
        assert!(tag.validate().is_ok());
        assert_eq!(tag.entities()[0].roles().len(), 2);
        assert_eq!(tag.links()[0].usage(), Some(Use::Required));

        let collection = tag.payload().unwrap().collection();
        let lib = collection.directory(&["..", "..", "lib"]).unwrap();
        assert_eq!(lib.files().len(), 2);
        assert_eq!(lib.files()[0].size(), Some(3));
        assert_eq!(lib.files()[1].version(), Some("2"));
    }

    #[test]
    fn entity_without_roles_is_rejected() {
        let json = r#"{"name":"n","tag-id":"i","entities":[{"name":"e","roles":[]}],"tag-path":"t"}"#;
        let manifest = TagManifest::from_json_slice(json.as_bytes()).unwrap();
        let err = manifest.build(&Vocabularies::new(), None).unwrap_err();
        assert_eq!(err.field(), Some("entity[0].role"));
    }

    #[test]
    fn unknown_link_vocabulary_is_rejected() {
        let mut manifest = TagManifest::from_json_slice(MANIFEST.as_bytes()).unwrap();
        manifest.links[0].ownership = Some("borrowed".into());
        assert!(manifest.build(&Vocabularies::new(), None).is_err());
    }

    #[test]
    fn manifest_json_round_trips() {
        let manifest = TagManifest::from_json_slice(MANIFEST.as_bytes()).unwrap();
        let bytes = manifest.to_json_vec().unwrap();
        assert_eq!(TagManifest::from_json_slice(&bytes).unwrap(), manifest);
    }

    #[test]
    fn malformed_json_is_a_manifest_error() {
        let err = TagManifest::from_json_slice(b"{").unwrap_err();
        assert!(matches!(err, TagError::Manifest(_)));
    }
}
