// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Codec error types.

use swid_core::TagError;
use thiserror::Error;

/// Errors raised while encoding a tag.
#[derive(Debug, Error)]
pub enum EncodeError {
    /// The tag failed validation; nothing was written.
    #[error("tag failed validation: {0}")]
    Validation(#[from] TagError),
    /// A required value was missing during traversal.
    ///
    /// Unreachable for tags that passed validation.
    #[error("encoding invariant violated at `{field}`")]
    InvariantViolation {
        /// Field that could not be written.
        field: &'static str,
    },
    /// Writing the destination failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    /// The XML writer rejected an event.
    #[error("xml error: {0}")]
    Xml(String),
    /// The CBOR encoder failed.
    #[error("cbor error: {0}")]
    Cbor(String),
    /// JSON serialization failed.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    /// A timestamp could not be rendered as RFC 3339.
    #[error("timestamp error: {0}")]
    Timestamp(#[from] time::error::Format),
}

/// Errors raised while decoding a tag.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The input is well-formed for its format but does not describe a tag.
    #[error("malformed tag: {0}")]
    Malformed(String),
    /// A decoded value was rejected by the tag model.
    #[error("invalid tag content: {0}")]
    Model(#[from] TagError),
    /// The XML reader failed.
    #[error("xml error: {0}")]
    Xml(String),
    /// The CBOR decoder failed.
    #[error("cbor error: {0}")]
    Cbor(#[from] minicbor::decode::Error),
    /// The JSON parser failed.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    /// A timestamp was not valid RFC 3339.
    #[error("timestamp error: {0}")]
    Timestamp(#[from] time::error::Parse),
}

impl DecodeError {
    pub(crate) fn malformed(message: impl Into<String>) -> Self {
        Self::Malformed(message.into())
    }
}
