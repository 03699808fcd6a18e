// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! The root [`Tag`] and its entity, link and meta children.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::TagError;
use crate::resource::{Evidence, Payload};
use crate::vocab::{
    check_term, Bindings, Ownership, Role, Use, VersionScheme, WellKnownRole, WellKnownScheme,
};
use crate::{UNKNOWN_REGID, UNKNOWN_VERSION};

fn require_text(field: &str, value: String) -> Result<String, TagError> {
    if value.is_empty() {
        return Err(TagError::validation(field, "must not be empty"));
    }
    Ok(value)
}

/// What kind of tag this is.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TagUsage {
    /// Describes an installed product.
    #[default]
    Primary,
    /// Describes an installation package before installation.
    Corpus,
    /// Describes a patch to another product.
    Patch,
    /// Adds information to another tag.
    Supplemental,
}

/// A party associated with the tag.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Entity {
    name: String,
    regid: Option<String>,
    thumbprint: Option<String>,
    roles: Vec<Role>,
}

impl Entity {
    /// Creates an entity holding one role.
    pub fn new(name: impl Into<String>, role: impl Into<Role>) -> Result<Self, TagError> {
        let name = require_text("entity.name", name.into())?;
        let mut entity = Self {
            name,
            regid: None,
            thumbprint: None,
            roles: Vec::new(),
        };
        entity.add_role(role)?;
        Ok(entity)
    }

    /// Entity name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Registration id; [`UNKNOWN_REGID`] when never set.
    pub fn regid(&self) -> &str {
        self.regid.as_deref().unwrap_or(UNKNOWN_REGID)
    }

    /// Returns `true` if a registration id other than the sentinel was set.
    pub fn has_regid(&self) -> bool {
        self.regid.is_some()
    }

    /// Sets the registration id. Setting the sentinel clears it.
    pub fn set_regid(&mut self, regid: impl Into<String>) -> Result<&mut Self, TagError> {
        let regid = require_text("entity.regid", regid.into())?;
        self.regid = (regid != UNKNOWN_REGID).then_some(regid);
        Ok(self)
    }

    /// Signing certificate thumbprint.
    pub fn thumbprint(&self) -> Option<&str> {
        self.thumbprint.as_deref()
    }

    /// Sets the thumbprint.
    pub fn set_thumbprint(&mut self, thumbprint: impl Into<String>) -> Result<&mut Self, TagError> {
        self.thumbprint = Some(require_text("entity.thumbprint", thumbprint.into())?);
        Ok(self)
    }

    /// Roles, in insertion order.
    pub fn roles(&self) -> &[Role] {
        &self.roles
    }

    /// Adds a role; adding a role already held is a no-op.
    ///
    /// Private roles must not reuse a well-known name or index, and their names
    /// may not contain whitespace.
    pub fn add_role(&mut self, role: impl Into<Role>) -> Result<&mut Self, TagError> {
        let role = role.into();
        check_term("entity.role", &role)?;
        if !self.roles.contains(&role) {
            self.roles.push(role);
        }
        Ok(self)
    }

    /// Returns `true` if the entity holds `role`.
    pub fn has_role(&self, role: WellKnownRole) -> bool {
        self.roles.iter().any(|r| r.is(role))
    }

    fn validate(&self, at: &str) -> Result<(), TagError> {
        if self.name.is_empty() {
            return Err(TagError::validation(format!("{at}.name"), "must not be empty"));
        }
        if self.roles.is_empty() {
            return Err(TagError::validation(format!("{at}.role"), "at least one role is required"));
        }
        Ok(())
    }
}

/// A typed reference from the tag to another resource.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Link {
    href: String,
    rel: String,
    artifact: Option<String>,
    media: Option<String>,
    ownership: Option<Ownership>,
    media_type: Option<String>,
    usage: Option<Use>,
}

impl Link {
    /// Creates a link. `href` must be a URI without whitespace.
    pub fn new(href: impl Into<String>, rel: impl Into<String>) -> Result<Self, TagError> {
        let href = require_text("link.href", href.into())?;
        if href.chars().any(char::is_whitespace) {
            return Err(TagError::validation("link.href", "must not contain whitespace"));
        }
        let rel = require_text("link.rel", rel.into())?;
        Ok(Self {
            href,
            rel,
            artifact: None,
            media: None,
            ownership: None,
            media_type: None,
            usage: None,
        })
    }

    /// Target URI.
    pub fn href(&self) -> &str {
        &self.href
    }

    /// Relationship of the target to the tag (e.g. `license`, `requires`).
    pub fn rel(&self) -> &str {
        &self.rel
    }

    /// Artifact name.
    pub fn artifact(&self) -> Option<&str> {
        self.artifact.as_deref()
    }

    /// Sets the artifact name.
    pub fn set_artifact(&mut self, artifact: impl Into<String>) -> Result<&mut Self, TagError> {
        self.artifact = Some(require_text("link.artifact", artifact.into())?);
        Ok(self)
    }

    /// Media query the link applies to.
    pub fn media(&self) -> Option<&str> {
        self.media.as_deref()
    }

    /// Sets the media query.
    pub fn set_media(&mut self, media: impl Into<String>) -> Result<&mut Self, TagError> {
        self.media = Some(require_text("link.media", media.into())?);
        Ok(self)
    }

    /// Ownership of the target.
    pub fn ownership(&self) -> Option<Ownership> {
        self.ownership
    }

    /// Sets the ownership.
    pub fn set_ownership(&mut self, ownership: Ownership) -> &mut Self {
        self.ownership = Some(ownership);
        self
    }

    /// MIME type of the target.
    pub fn media_type(&self) -> Option<&str> {
        self.media_type.as_deref()
    }

    /// Sets the MIME type.
    pub fn set_media_type(&mut self, media_type: impl Into<String>) -> Result<&mut Self, TagError> {
        self.media_type = Some(require_text("link.media-type", media_type.into())?);
        Ok(self)
    }

    /// How strongly the software depends on the target.
    pub fn usage(&self) -> Option<Use> {
        self.usage
    }

    /// Sets the use.
    pub fn set_usage(&mut self, usage: Use) -> &mut Self {
        self.usage = Some(usage);
        self
    }

    fn validate(&self, at: &str) -> Result<(), TagError> {
        if self.href.is_empty() {
            return Err(TagError::validation(format!("{at}.href"), "must not be empty"));
        }
        if self.rel.is_empty() {
            return Err(TagError::validation(format!("{at}.rel"), "must not be empty"));
        }
        Ok(())
    }
}

/// Descriptive product attributes. Every field is optional.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct Meta {
    /// Licensing state, e.g. `Trial` or `Serialized`.
    pub activation_status: Option<String>,
    /// Sales channel, e.g. `Volume` or `Retail`.
    pub channel_type: Option<String>,
    /// Marketing version, e.g. `2024`.
    pub colloquial_version: Option<String>,
    /// Free-form description.
    pub description: Option<String>,
    /// Product edition.
    pub edition: Option<String>,
    /// Whether an entitlement is needed to run the software.
    pub entitlement_data_required: Option<bool>,
    /// Entitlement lookup key.
    pub entitlement_key: Option<String>,
    /// Tool that generated the tag.
    pub generator: Option<String>,
    /// Identifier that survives version changes.
    pub persistent_id: Option<String>,
    /// Base product name.
    pub product: Option<String>,
    /// Product family.
    pub product_family: Option<String>,
    /// Build or revision label.
    pub revision: Option<String>,
    /// Short summary.
    pub summary: Option<String>,
    /// UNSPSC classification code.
    pub unspsc_code: Option<String>,
    /// UNSPSC version.
    pub unspsc_version: Option<String>,
}

impl Meta {
    /// Returns `true` when no attribute is set.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    fn validate(&self, at: &str) -> Result<(), TagError> {
        let texts = [
            ("activation-status", &self.activation_status),
            ("channel-type", &self.channel_type),
            ("colloquial-version", &self.colloquial_version),
            ("description", &self.description),
            ("edition", &self.edition),
            ("entitlement-key", &self.entitlement_key),
            ("generator", &self.generator),
            ("persistent-id", &self.persistent_id),
            ("product", &self.product),
            ("product-family", &self.product_family),
            ("revision", &self.revision),
            ("summary", &self.summary),
            ("unspsc-code", &self.unspsc_code),
            ("unspsc-version", &self.unspsc_version),
        ];
        for (name, value) in texts {
            if value.as_deref() == Some("") {
                return Err(TagError::validation(format!("{at}.{name}"), "must not be empty"));
            }
        }
        Ok(())
    }
}

/// Root software identification record.
///
/// Built incrementally through fail-fast setters, then checked as a whole with
/// [`Tag::validate`] before encoding.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Tag {
    name: String,
    tag_id: String,
    tag_version: u64,
    software_version: Option<String>,
    version_scheme: Option<VersionScheme>,
    usage: TagUsage,
    lang: Option<String>,
    media: Option<String>,
    entities: Vec<Entity>,
    evidence: Option<Evidence>,
    payload: Option<Payload>,
    links: Vec<Link>,
    metas: Vec<Meta>,
}

impl Tag {
    /// Creates a tag with the given software name and caller-assigned tag id.
    pub fn new(name: impl Into<String>, tag_id: impl Into<String>) -> Result<Self, TagError> {
        Ok(Self {
            name: require_text("name", name.into())?,
            tag_id: require_text("tag-id", tag_id.into())?,
            tag_version: 0,
            software_version: None,
            version_scheme: None,
            usage: TagUsage::Primary,
            lang: None,
            media: None,
            entities: Vec::new(),
            evidence: None,
            payload: None,
            links: Vec::new(),
            metas: Vec::new(),
        })
    }

    /// Software name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Tag identifier.
    pub fn tag_id(&self) -> &str {
        &self.tag_id
    }

    /// Tag revision; bumped when the tag changes but the software does not.
    pub fn tag_version(&self) -> u64 {
        self.tag_version
    }

    /// Sets the tag revision.
    pub fn set_tag_version(&mut self, version: u64) -> &mut Self {
        self.tag_version = version;
        self
    }

    /// Software version; [`UNKNOWN_VERSION`] when never set.
    pub fn software_version(&self) -> &str {
        self.software_version.as_deref().unwrap_or(UNKNOWN_VERSION)
    }

    /// Software version exactly as set.
    pub fn explicit_software_version(&self) -> Option<&str> {
        self.software_version.as_deref()
    }

    /// Sets the software version.
    pub fn set_software_version(&mut self, version: impl Into<String>) -> Result<&mut Self, TagError> {
        self.software_version = Some(require_text("software-version", version.into())?);
        Ok(self)
    }

    /// Version scheme; `multipartnumeric` when never set.
    pub fn version_scheme(&self) -> VersionScheme {
        self.version_scheme
            .clone()
            .unwrap_or(VersionScheme::Known(WellKnownScheme::MultipartNumeric))
    }

    /// Version scheme exactly as set.
    pub fn explicit_version_scheme(&self) -> Option<&VersionScheme> {
        self.version_scheme.as_ref()
    }

    /// Sets the version scheme.
    pub fn set_version_scheme(&mut self, scheme: impl Into<VersionScheme>) -> Result<&mut Self, TagError> {
        let scheme = scheme.into();
        check_term("version-scheme", &scheme)?;
        self.version_scheme = Some(scheme);
        Ok(self)
    }

    /// Tag usage kind.
    pub fn usage(&self) -> TagUsage {
        self.usage
    }

    /// Sets the tag usage kind.
    pub fn set_usage(&mut self, usage: TagUsage) -> &mut Self {
        self.usage = usage;
        self
    }

    /// Language tag (BCP 47).
    pub fn lang(&self) -> Option<&str> {
        self.lang.as_deref()
    }

    /// Sets the language tag.
    pub fn set_lang(&mut self, lang: impl Into<String>) -> Result<&mut Self, TagError> {
        self.lang = Some(require_text("lang", lang.into())?);
        Ok(self)
    }

    /// Media query the tag applies to.
    pub fn media(&self) -> Option<&str> {
        self.media.as_deref()
    }

    /// Sets the media query.
    pub fn set_media(&mut self, media: impl Into<String>) -> Result<&mut Self, TagError> {
        self.media = Some(require_text("media", media.into())?);
        Ok(self)
    }

    /// Entities, in insertion order.
    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    /// Attaches an entity.
    pub fn add_entity(&mut self, entity: Entity) -> &mut Self {
        self.entities.push(entity);
        self
    }

    /// Evidence, if attached.
    pub fn evidence(&self) -> Option<&Evidence> {
        self.evidence.as_ref()
    }

    /// Attaches evidence. Evidence and payload are mutually exclusive at validation.
    pub fn set_evidence(&mut self, evidence: Evidence) -> &mut Self {
        self.evidence = Some(evidence);
        self
    }

    /// Evidence, mutably, if attached.
    pub fn evidence_mut(&mut self) -> Option<&mut Evidence> {
        self.evidence.as_mut()
    }

    /// Payload, if attached.
    pub fn payload(&self) -> Option<&Payload> {
        self.payload.as_ref()
    }

    /// Attaches a payload.
    pub fn set_payload(&mut self, payload: Payload) -> &mut Self {
        self.payload = Some(payload);
        self
    }

    /// Payload, mutably, if attached.
    pub fn payload_mut(&mut self) -> Option<&mut Payload> {
        self.payload.as_mut()
    }

    /// Links, in insertion order.
    pub fn links(&self) -> &[Link] {
        &self.links
    }

    /// Attaches a link.
    pub fn add_link(&mut self, link: Link) -> &mut Self {
        self.links.push(link);
        self
    }

    /// Meta blocks, in insertion order.
    pub fn metas(&self) -> &[Meta] {
        &self.metas
    }

    /// Attaches a meta block.
    pub fn add_meta(&mut self, meta: Meta) -> &mut Self {
        self.metas.push(meta);
        self
    }

    /// Checks every structural invariant of the tag and its children.
    ///
    /// Stops at the first violation; the error names the offending field. Calling
    /// this has no side effects and can be repeated after further mutation.
    pub fn validate(&self) -> Result<(), TagError> {
        if self.name.is_empty() {
            return Err(TagError::validation("name", "must not be empty"));
        }
        if self.tag_id.is_empty() {
            return Err(TagError::validation("tag-id", "must not be empty"));
        }
        if self.entities.is_empty() {
            return Err(TagError::validation("entity", "at least one entity is required"));
        }
        let mut roles = Bindings::new();
        for (i, entity) in self.entities.iter().enumerate() {
            let at = format!("entity[{i}]");
            entity.validate(&at)?;
            for role in &entity.roles {
                roles
                    .bind(role)
                    .map_err(|err| TagError::validation(format!("{at}.role"), err.to_string()))?;
            }
        }
        if let Some(scheme) = &self.version_scheme {
            check_term("version-scheme", scheme)?;
        }
        if !self
            .entities
            .iter()
            .any(|e| e.has_role(WellKnownRole::TagCreator))
        {
            return Err(TagError::validation(
                "entity.role",
                "an entity with the tagCreator role is required",
            ));
        }
        match (&self.evidence, &self.payload) {
            (Some(_), Some(_)) => {
                return Err(TagError::validation(
                    "payload",
                    "evidence and payload are mutually exclusive",
                ));
            }
            (Some(evidence), None) => evidence.validate()?,
            (None, Some(payload)) => payload.validate()?,
            (None, None) => {}
        }
        for (i, link) in self.links.iter().enumerate() {
            link.validate(&format!("link[{i}]"))?;
        }
        for (i, meta) in self.metas.iter().enumerate() {
            meta.validate(&format!("software-meta[{i}]"))?;
        }
        debug!(tag_id = %self.tag_id, entities = self.entities.len(), "tag validated");
        Ok(())
    }
}
