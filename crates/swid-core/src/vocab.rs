// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Open vocabularies (roles, version schemes, hash algorithms).
//!
//! Each vocabulary is a fixed set of `(index, name)` pairs known at compile time
//! plus caller-defined private terms. A [`Term`] is either one of the well-known
//! values or a private `(name, index?)` pair; term identity is name-based.
//!
//! Private terms that need an integer index on the wire are bound through an
//! explicit [`Registry`]. There is no process-global registry: callers own a
//! [`Vocabularies`] bundle and pass it to whatever resolves names or indices.
//! Distinct bundles can be used from different threads; mutating one bundle must
//! be serialized by its owner.

use std::collections::BTreeMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

use tracing::debug;

use crate::digest::WellKnownHash;
use crate::error::{RegistryError, TagError};

/// A closed set of well-known `(index, name)` pairs.
pub trait Vocabulary: Copy + Eq + fmt::Debug + Send + Sync + 'static {
    /// Vocabulary label used in diagnostics.
    const LABEL: &'static str;
    /// Every well-known term, in index order.
    const ALL: &'static [Self];

    /// Integer index of this term.
    fn index(self) -> i64;

    /// Registered name of this term.
    fn name(self) -> &'static str;

    /// Looks up a well-known term by name.
    fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|term| term.name() == name)
    }

    /// Looks up a well-known term by index.
    fn from_index(index: i64) -> Option<Self> {
        Self::ALL.iter().copied().find(|term| term.index() == index)
    }
}

macro_rules! vocabulary {
    (
        $(#[$meta:meta])*
        $vis:vis enum $ty:ident ($label:literal) {
            $(
                $(#[$vmeta:meta])*
                $variant:ident = ($index:expr, $name:literal),
            )+
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
        $vis enum $ty {
            $(
                $(#[$vmeta])*
                $variant,
            )+
        }

        impl $crate::vocab::Vocabulary for $ty {
            const LABEL: &'static str = $label;
            const ALL: &'static [Self] = &[$(Self::$variant),+];

            fn index(self) -> i64 {
                match self {
                    $(Self::$variant => $index,)+
                }
            }

            fn name(self) -> &'static str {
                match self {
                    $(Self::$variant => $name,)+
                }
            }
        }

        impl ::std::fmt::Display for $ty {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str($crate::vocab::Vocabulary::name(*self))
            }
        }
    };
}

pub(crate) use vocabulary;

vocabulary! {
    /// Well-known entity roles.
    pub enum WellKnownRole ("role") {
        /// The entity that created the tag. Every tag needs at least one.
        TagCreator = (1, "tagCreator"),
        /// The entity that created the software.
        SoftwareCreator = (2, "softwareCreator"),
        /// An entity that aggregates software from several creators.
        Aggregator = (3, "aggregator"),
        /// An entity that distributes the software.
        Distributor = (4, "distributor"),
        /// The licensor of the software.
        Licensor = (5, "licensor"),
        /// The entity that maintains the software.
        Maintainer = (6, "maintainer"),
    }
}

vocabulary! {
    /// Well-known software version schemes.
    pub enum WellKnownScheme ("version scheme") {
        /// Dot-separated numeric parts, e.g. `1.2.3`.
        MultipartNumeric = (1, "multipartnumeric"),
        /// Numeric parts followed by a free-form suffix, e.g. `1.2.3a`.
        MultipartNumericSuffix = (2, "multipartnumeric+suffix"),
        /// Opaque alphanumeric string, compared lexically.
        Alphanumeric = (3, "alphanumeric"),
        /// A single decimal number.
        Decimal = (4, "decimal"),
        /// Semantic Versioning 2.0.0.
        Semver = (16384, "semver"),
    }
}

vocabulary! {
    /// Ownership of a linked resource relative to the tagged software.
    pub enum Ownership ("ownership") {
        /// The link target may be removed once the software is uninstalled.
        Abandon = (1, "abandon"),
        /// The link target is owned exclusively by the software.
        Private = (2, "private"),
        /// The link target is shared with other software.
        Shared = (3, "shared"),
    }
}

vocabulary! {
    /// How strongly the tagged software depends on a linked resource.
    pub enum Use ("use") {
        /// Not needed for operation.
        Optional = (1, "optional"),
        /// Needed for operation.
        Required = (2, "required"),
        /// Not needed, but recommended.
        Recommended = (3, "recommended"),
    }
}

/// A vocabulary value: either well-known or caller-defined.
#[derive(Clone, Debug)]
pub enum Term<V> {
    /// One of the compile-time values.
    Known(V),
    /// A caller-defined value.
    Private {
        /// Term name.
        name: String,
        /// Integer index, when registered.
        index: Option<i64>,
    },
}

/// Entity role.
pub type Role = Term<WellKnownRole>;

/// Software version scheme.
pub type VersionScheme = Term<WellKnownScheme>;

impl<V: Vocabulary> Term<V> {
    /// Resolves `name` to a well-known term, or an unregistered private one.
    pub fn named(name: impl Into<String>) -> Self {
        let name = name.into();
        match V::from_name(&name) {
            Some(known) => Self::Known(known),
            None => Self::Private { name, index: None },
        }
    }

    /// Name of this term.
    pub fn name(&self) -> &str {
        match self {
            Self::Known(known) => known.name(),
            Self::Private { name, .. } => name,
        }
    }

    /// Integer index, if the term is well-known or registered.
    pub fn index(&self) -> Option<i64> {
        match self {
            Self::Known(known) => Some(known.index()),
            Self::Private { index, .. } => *index,
        }
    }

    /// Returns the well-known value, if any.
    pub fn known(&self) -> Option<V> {
        match self {
            Self::Known(known) => Some(*known),
            Self::Private { .. } => None,
        }
    }

    /// Returns `true` if this term is the given well-known value.
    pub fn is(&self, known: V) -> bool {
        self.name() == known.name()
    }

    /// Checks that a private term does not collide with a well-known binding.
    ///
    /// Private names must be non-empty and free of whitespace. A private term
    /// may not carry a well-known name under another index, nor a well-known
    /// index under another name.
    pub fn check(&self) -> Result<(), RegistryError> {
        let Self::Private { name, index } = self else {
            return Ok(());
        };
        check_name::<V>(name)?;
        let Some(index) = *index else {
            return Ok(());
        };
        if let Some(known) = V::from_name(name) {
            if known.index() != index {
                return Err(RegistryError::NameConflict {
                    vocabulary: V::LABEL,
                    name: name.clone(),
                    existing: known.index(),
                    requested: index,
                });
            }
        } else if let Some(known) = V::from_index(index) {
            return Err(RegistryError::IndexConflict {
                vocabulary: V::LABEL,
                index,
                existing: known.name().to_owned(),
                requested: name.clone(),
            });
        }
        Ok(())
    }
}

/// [`Term::check`], reported as a validation error on `field`.
pub(crate) fn check_term<V: Vocabulary>(field: &str, term: &Term<V>) -> Result<(), TagError> {
    term.check()
        .map_err(|err| TagError::validation(field, err.to_string()))
}

fn check_name<V: Vocabulary>(name: &str) -> Result<(), RegistryError> {
    if name.is_empty() {
        return Err(RegistryError::EmptyName {
            vocabulary: V::LABEL,
        });
    }
    if name.chars().any(char::is_whitespace) {
        return Err(RegistryError::Whitespace {
            vocabulary: V::LABEL,
            name: name.to_owned(),
        });
    }
    Ok(())
}

impl<V: Vocabulary> PartialEq for Term<V> {
    fn eq(&self, other: &Self) -> bool {
        self.name() == other.name()
    }
}

impl<V: Vocabulary> Eq for Term<V> {}

impl<V: Vocabulary> Hash for Term<V> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name().hash(state);
    }
}

impl<V: Vocabulary> From<V> for Term<V> {
    fn from(known: V) -> Self {
        Self::Known(known)
    }
}

impl<V: Vocabulary> fmt::Display for Term<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Private term bindings for one vocabulary.
///
/// # Invariants
///
/// - A well-known name is never bound to a different index.
/// - A well-known index is never bound to a different name.
/// - Each private index maps to exactly one name and vice versa.
#[derive(Clone, Debug)]
pub struct Registry<V> {
    by_index: BTreeMap<i64, String>,
    vocabulary: PhantomData<V>,
}

impl<V> Default for Registry<V> {
    fn default() -> Self {
        Self {
            by_index: BTreeMap::new(),
            vocabulary: PhantomData,
        }
    }
}

impl<V: Vocabulary> Registry<V> {
    /// Creates a registry holding only the well-known terms.
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds a private `name` to `index`.
    ///
    /// Re-registering an identical binding (including a well-known one) is a no-op.
    pub fn register(&mut self, index: i64, name: &str) -> Result<Term<V>, RegistryError> {
        check_name::<V>(name)?;
        if let Some(known) = V::from_name(name) {
            if known.index() == index {
                return Ok(Term::Known(known));
            }
            return Err(RegistryError::NameConflict {
                vocabulary: V::LABEL,
                name: name.to_owned(),
                existing: known.index(),
                requested: index,
            });
        }
        if let Some(known) = V::from_index(index) {
            return Err(RegistryError::IndexConflict {
                vocabulary: V::LABEL,
                index,
                existing: known.name().to_owned(),
                requested: name.to_owned(),
            });
        }
        match self.by_index.get(&index) {
            Some(existing) if existing == name => {
                return Ok(Term::Private {
                    name: name.to_owned(),
                    index: Some(index),
                })
            }
            Some(existing) => {
                return Err(RegistryError::IndexConflict {
                    vocabulary: V::LABEL,
                    index,
                    existing: existing.clone(),
                    requested: name.to_owned(),
                })
            }
            None => {}
        }
        if let Some(existing) = self.index_of(name) {
            return Err(RegistryError::NameConflict {
                vocabulary: V::LABEL,
                name: name.to_owned(),
                existing,
                requested: index,
            });
        }
        self.by_index.insert(index, name.to_owned());
        debug!(vocabulary = V::LABEL, index, name, "registered private term");
        Ok(Term::Private {
            name: name.to_owned(),
            index: Some(index),
        })
    }

    /// Resolves a name to a well-known, registered, or unregistered private term.
    pub fn by_name(&self, name: &str) -> Term<V> {
        if let Some(known) = V::from_name(name) {
            return Term::Known(known);
        }
        Term::Private {
            name: name.to_owned(),
            index: self.index_of(name),
        }
    }

    /// Resolves an index to a well-known or registered term.
    pub fn by_index(&self, index: i64) -> Option<Term<V>> {
        if let Some(known) = V::from_index(index) {
            return Some(Term::Known(known));
        }
        self.by_index.get(&index).map(|name| Term::Private {
            name: name.clone(),
            index: Some(index),
        })
    }

    /// Number of private registrations.
    pub fn len(&self) -> usize {
        self.by_index.len()
    }

    /// Returns `true` if nothing beyond the well-known terms is registered.
    pub fn is_empty(&self) -> bool {
        self.by_index.is_empty()
    }

    fn index_of(&self, name: &str) -> Option<i64> {
        self.by_index
            .iter()
            .find(|(_, bound)| bound.as_str() == name)
            .map(|(index, _)| *index)
    }
}

/// Index bindings seen across one tag.
///
/// Private terms carry their own index, so two terms in the same tag can claim
/// one index under different names. Binding every term of a vocabulary through
/// one `Bindings` rejects that.
#[derive(Debug)]
pub(crate) struct Bindings<V> {
    by_index: BTreeMap<i64, String>,
    by_name: BTreeMap<String, i64>,
    vocabulary: PhantomData<V>,
}

impl<V: Vocabulary> Bindings<V> {
    pub(crate) fn new() -> Self {
        Self {
            by_index: BTreeMap::new(),
            by_name: BTreeMap::new(),
            vocabulary: PhantomData,
        }
    }

    pub(crate) fn bind(&mut self, term: &Term<V>) -> Result<(), RegistryError> {
        term.check()?;
        let Term::Private {
            name,
            index: Some(index),
        } = term
        else {
            return Ok(());
        };
        if let Some(existing) = self.by_index.get(index).filter(|bound| *bound != name) {
            return Err(RegistryError::IndexConflict {
                vocabulary: V::LABEL,
                index: *index,
                existing: existing.clone(),
                requested: name.clone(),
            });
        }
        if let Some(&existing) = self.by_name.get(name).filter(|bound| **bound != *index) {
            return Err(RegistryError::NameConflict {
                vocabulary: V::LABEL,
                name: name.clone(),
                existing,
                requested: *index,
            });
        }
        self.by_index.insert(*index, name.clone());
        self.by_name.insert(name.clone(), *index);
        Ok(())
    }
}

/// The registries a caller passes wherever names or indices are resolved.
#[derive(Clone, Debug, Default)]
pub struct Vocabularies {
    /// Entity roles.
    pub roles: Registry<WellKnownRole>,
    /// Version schemes.
    pub version_schemes: Registry<WellKnownScheme>,
    /// Hash algorithms.
    pub hash_algorithms: Registry<WellKnownHash>,
}

impl Vocabularies {
    /// Creates a bundle holding only the well-known terms.
    pub fn new() -> Self {
        Self::default()
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn named_resolves_well_known_terms() {
        let role = Role::named("tagCreator");
        assert_eq!(role.known(), Some(WellKnownRole::TagCreator));
        assert_eq!(role.index(), Some(1));

        let private = Role::named("auditor");
        assert_eq!(private.known(), None);
        assert_eq!(private.index(), None);
        assert_eq!(private.name(), "auditor");
    }

    #[test]
    fn term_identity_is_name_based() {
        let registered = Role::Private {
            name: "auditor".into(),
            index: Some(40),
        };
        assert_eq!(registered, Role::named("auditor"));
        assert_eq!(Role::from(WellKnownRole::Licensor), Role::named("licensor"));
    }

    #[test]
    fn registering_known_binding_is_a_no_op() {
        let mut registry = Registry::<WellKnownRole>::new();
        let term = registry.register(4, "distributor").unwrap();
        assert_eq!(term.known(), Some(WellKnownRole::Distributor));
        assert!(registry.is_empty());
    }

    #[test]
    fn registering_known_name_under_other_index_is_rejected() {
        let mut registry = Registry::<WellKnownRole>::new();
        let err = registry.register(99, "tagCreator").unwrap_err();
        assert_eq!(
            err,
            RegistryError::NameConflict {
                vocabulary: "role",
                name: "tagCreator".into(),
                existing: 1,
                requested: 99,
            }
        );
    }

    #[test]
    fn registering_other_name_under_known_index_is_rejected() {
        let mut registry = Registry::<WellKnownScheme>::new();
        let err = registry.register(16384, "calver").unwrap_err();
        match err {
            RegistryError::IndexConflict {
                existing, requested, ..
            } => {
                assert_eq!(existing, "semver");
                assert_eq!(requested, "calver");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn private_bindings_are_exclusive() {
        let mut registry = Registry::<WellKnownRole>::new();
        registry.register(40, "auditor").unwrap();
        assert!(registry.register(40, "auditor").is_ok());
        assert!(matches!(
            registry.register(40, "reviewer"),
            Err(RegistryError::IndexConflict { .. })
        ));
        assert!(matches!(
            registry.register(41, "auditor"),
            Err(RegistryError::NameConflict { existing: 40, .. })
        ));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn lookups_cover_known_registered_and_unregistered_terms() {
        let mut registry = Registry::<WellKnownRole>::new();
        registry.register(40, "auditor").unwrap();

        assert_eq!(registry.by_name("auditor").index(), Some(40));
        assert_eq!(registry.by_name("reviewer").index(), None);
        assert_eq!(registry.by_index(6).map(|t| t.name().to_owned()), Some("maintainer".into()));
        assert_eq!(registry.by_index(40).map(|t| t.name().to_owned()), Some("auditor".into()));
        assert!(registry.by_index(41).is_none());
    }

    #[test]
    fn private_terms_may_not_shadow_well_known_bindings() {
        let shadow = Role::Private {
            name: "auditor".into(),
            index: Some(1),
        };
        assert!(matches!(
            shadow.check(),
            Err(RegistryError::IndexConflict { index: 1, .. })
        ));
        let renumbered = Role::Private {
            name: "tagCreator".into(),
            index: Some(9),
        };
        assert!(matches!(
            renumbered.check(),
            Err(RegistryError::NameConflict { existing: 1, .. })
        ));
        assert!(Role::Private {
            name: "auditor".into(),
            index: Some(40),
        }
        .check()
        .is_ok());
        assert!(Role::named("auditor").check().is_ok());
    }

    #[test]
    fn bindings_reject_two_names_on_one_index() {
        let mut bindings = Bindings::<WellKnownRole>::new();
        let auditor = Role::Private {
            name: "auditor".into(),
            index: Some(40),
        };
        bindings.bind(&auditor).unwrap();
        bindings.bind(&auditor).unwrap();
        bindings.bind(&Role::from(WellKnownRole::Maintainer)).unwrap();
        let reviewer = Role::Private {
            name: "reviewer".into(),
            index: Some(40),
        };
        assert!(matches!(
            bindings.bind(&reviewer),
            Err(RegistryError::IndexConflict { index: 40, .. })
        ));
        let moved = Role::Private {
            name: "auditor".into(),
            index: Some(41),
        };
        assert!(matches!(
            bindings.bind(&moved),
            Err(RegistryError::NameConflict { existing: 40, .. })
        ));
    }

    #[test]
    fn names_with_whitespace_are_rejected() {
        let mut registry = Registry::<WellKnownRole>::new();
        assert!(matches!(
            registry.register(50, "release manager"),
            Err(RegistryError::Whitespace { .. })
        ));
        assert!(Role::named("release\tmanager").check().is_err());
    }

    #[test]
    fn empty_names_are_rejected() {
        let mut registry = Registry::<WellKnownRole>::new();
        assert_eq!(
            registry.register(50, ""),
            Err(RegistryError::EmptyName { vocabulary: "role" })
        );
    }
}
