// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Error types shared by the tag model, digests and registries.

use thiserror::Error;

use crate::digest::DigestParseError;

/// Errors raised while building, validating or hashing a tag.
#[derive(Debug, Error)]
pub enum TagError {
    /// A required field is absent or empty, or a tag-level invariant is violated.
    ///
    /// `field` is a dotted path naming the offending field (e.g. `entity[0].name`).
    #[error("invalid {field}: {reason}")]
    Validation {
        /// Path of the offending field.
        field: String,
        /// Human-readable explanation.
        reason: String,
    },
    /// The hash algorithm has no backing hash function.
    #[error("unsupported hash algorithm: {0}")]
    UnsupportedAlgorithm(String),
    /// A private vocabulary registration conflicted with an existing binding.
    #[error(transparent)]
    Registry(#[from] RegistryError),
    /// A textual digest could not be parsed.
    #[error(transparent)]
    Digest(#[from] DigestParseError),
    /// Reading source bytes failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    /// A build manifest could not be parsed.
    #[error("manifest error: {0}")]
    Manifest(#[from] serde_json::Error),
}

impl TagError {
    pub(crate) fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Returns the offending field path for validation errors.
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::Validation { field, .. } => Some(field),
            _ => None,
        }
    }
}

/// Conflicts detected when registering a private vocabulary term.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// Private terms must have a non-empty name.
    #[error("{vocabulary} names must not be empty")]
    EmptyName {
        /// Vocabulary the registration targeted.
        vocabulary: &'static str,
    },
    /// Private names are written into space-separated lists and may not contain
    /// whitespace.
    #[error("{vocabulary} `{name}` must not contain whitespace")]
    Whitespace {
        /// Vocabulary the name belongs to.
        vocabulary: &'static str,
        /// Offending name.
        name: String,
    },
    /// The name is already bound to a different index.
    #[error("{vocabulary} `{name}` is already registered under index {existing}, not {requested}")]
    NameConflict {
        /// Vocabulary the conflict occurred in.
        vocabulary: &'static str,
        /// Name being registered.
        name: String,
        /// Index the name is already bound to.
        existing: i64,
        /// Index that was requested.
        requested: i64,
    },
    /// The index is already bound to a different name.
    #[error("{vocabulary} index {index} is already bound to `{existing}`, not `{requested}`")]
    IndexConflict {
        /// Vocabulary the conflict occurred in.
        vocabulary: &'static str,
        /// Index being registered.
        index: i64,
        /// Name the index is already bound to.
        existing: String,
        /// Name that was requested.
        requested: String,
    },
}
