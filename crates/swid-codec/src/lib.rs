// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! XML, JSON and CBOR encoders for SWID/CoSWID tags.
//!
//! All three formats are driven by one traversal ([`walk::tag_object`]) over one
//! canonical field table ([`field`]). The compact formats key fields by id (CBOR)
//! or name (JSON) and write terms by index; XML uses attribute and element names
//! and writes terms by name.
//!
//! Encoding validates the tag first and writes nothing when validation fails.
//! Decoding never validates; call [`Tag::validate`] on the result if needed.
//!
//! ```
//! use swid_codec::{decode, encode_to_vec, EncodeOptions, Format};
//! use swid_core::{Entity, Tag, Vocabularies, WellKnownRole};
//!
//! let mut tag = Tag::new("Example App", "example-app-1.0").unwrap();
//! tag.add_entity(Entity::new("Example Corp", WellKnownRole::TagCreator).unwrap());
//!
//! let bytes = encode_to_vec(&tag, Format::Cbor, &EncodeOptions::default()).unwrap();
//! let back = decode(Format::Cbor, &bytes, &Vocabularies::new()).unwrap();
//! assert_eq!(back.tag_id(), "example-app-1.0");
//! ```
#![forbid(unsafe_code)]

pub mod emit;
mod error;
pub mod field;
pub mod read;
pub mod walk;

mod cbor;
mod json;
mod xml;

use std::fmt;
use std::io::Write;

use swid_core::{Tag, Vocabularies};
use tracing::debug;

pub use emit::{Emitter, Object, Scalar};
pub use error::{DecodeError, EncodeError};
pub use field::{Field, Kind, Shape};

/// Output format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Format {
    /// Structured text (SWID XML).
    Xml,
    /// Compact text (CoSWID JSON).
    Json,
    /// Compact binary (CoSWID CBOR).
    Cbor,
}

impl Format {
    /// Every format.
    pub const ALL: [Self; 3] = [Self::Xml, Self::Json, Self::Cbor];

    /// Conventional file extension.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Xml => "swidtag",
            Self::Json => "json",
            Self::Cbor => "coswid",
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Xml => "xml",
            Self::Json => "json",
            Self::Cbor => "cbor",
        })
    }
}

/// Encoder settings.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EncodeOptions {
    /// Indent text formats. Ignored for CBOR.
    pub pretty: bool,
}

/// Writes a tag in one format.
pub trait TagEncoder {
    /// Validates `tag` and writes its encoding to `dest`.
    ///
    /// Nothing is written when validation fails.
    fn encode<W: Write>(&self, tag: &Tag, dest: W) -> Result<(), EncodeError>;
}

/// XML encoder.
#[derive(Clone, Copy, Debug, Default)]
pub struct XmlEncoder {
    /// Indent output.
    pub pretty: bool,
}

/// JSON encoder.
#[derive(Clone, Copy, Debug, Default)]
pub struct JsonEncoder {
    /// Indent output.
    pub pretty: bool,
}

/// CBOR encoder.
#[derive(Clone, Copy, Debug, Default)]
pub struct CborEncoder;

impl TagEncoder for XmlEncoder {
    fn encode<W: Write>(&self, tag: &Tag, dest: W) -> Result<(), EncodeError> {
        encode(tag, Format::Xml, &EncodeOptions { pretty: self.pretty }, dest)
    }
}

impl TagEncoder for JsonEncoder {
    fn encode<W: Write>(&self, tag: &Tag, dest: W) -> Result<(), EncodeError> {
        encode(tag, Format::Json, &EncodeOptions { pretty: self.pretty }, dest)
    }
}

impl TagEncoder for CborEncoder {
    fn encode<W: Write>(&self, tag: &Tag, dest: W) -> Result<(), EncodeError> {
        encode(tag, Format::Cbor, &EncodeOptions::default(), dest)
    }
}

/// Validates `tag` and writes it to `dest` in `format`.
///
/// The document is rendered in memory first, so a failing tag or renderer never
/// leaves partial output behind. Write errors from `dest` surface as
/// [`EncodeError::Io`].
pub fn encode<W: Write>(
    tag: &Tag,
    format: Format,
    options: &EncodeOptions,
    mut dest: W,
) -> Result<(), EncodeError> {
    let bytes = encode_to_vec(tag, format, options)?;
    dest.write_all(&bytes)?;
    dest.flush()?;
    Ok(())
}

/// Validates `tag` and returns its encoding.
pub fn encode_to_vec(
    tag: &Tag,
    format: Format,
    options: &EncodeOptions,
) -> Result<Vec<u8>, EncodeError> {
    tag.validate()?;
    let root = walk::tag_object(tag)?;
    let bytes = match format {
        Format::Xml => {
            let mut out = xml::XmlEmitter::new(&root, options.pretty)?;
            emit::emit(&root, &mut out)?;
            out.finish()
        }
        Format::Json => {
            let mut out = json::JsonEmitter::default();
            emit::emit(&root, &mut out)?;
            out.finish(options.pretty)?
        }
        Format::Cbor => {
            let mut out = cbor::CborEmitter::new();
            emit::emit(&root, &mut out)?;
            out.finish()
        }
    };
    debug!(tag_id = tag.tag_id(), %format, bytes = bytes.len(), "encoded tag");
    Ok(bytes)
}

/// Decodes a tag written in `format`.
///
/// Term indices resolve through `vocab`; indices it does not know become private
/// terms named by their decimal index. Unknown fields are skipped.
pub fn decode(format: Format, bytes: &[u8], vocab: &Vocabularies) -> Result<Tag, DecodeError> {
    let item = match format {
        Format::Xml => xml::parse(bytes)?,
        Format::Json => json::parse(bytes)?,
        Format::Cbor => cbor::parse(bytes)?,
    };
    let tag = read::tag_from_item(item, vocab)?;
    debug!(tag_id = tag.tag_id(), %format, "decoded tag");
    Ok(tag)
}

/// Decodes an XML tag.
pub fn decode_xml(bytes: &[u8], vocab: &Vocabularies) -> Result<Tag, DecodeError> {
    decode(Format::Xml, bytes, vocab)
}

/// Decodes a JSON tag.
pub fn decode_json(bytes: &[u8], vocab: &Vocabularies) -> Result<Tag, DecodeError> {
    decode(Format::Json, bytes, vocab)
}

/// Decodes a CBOR tag.
pub fn decode_cbor(bytes: &[u8], vocab: &Vocabularies) -> Result<Tag, DecodeError> {
    decode(Format::Cbor, bytes, vocab)
}
