// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Compact-binary (CBOR) rendering.
//!
//! Maps are keyed by the integer field id. Terms are written as their index
//! when they have one and as text otherwise; timestamps use tag 1 (epoch
//! seconds). Decoding accepts definite-length items only.

use minicbor::data::{Tag, Type};
use minicbor::{Decoder, Encoder};
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

use crate::emit::{Emitter, Scalar};
use crate::error::{DecodeError, EncodeError};
use crate::field::{Field, Shape};
use crate::read::Item;

/// Nesting limit for decoded input.
const MAX_DEPTH: usize = 32;
/// Upper bound on speculative allocation for a declared length.
const MAX_PREALLOC: u64 = 64;

const EPOCH_TAG: u64 = 1;
const DATETIME_TAG: u64 = 0;

fn cbor_err(err: impl std::fmt::Display) -> EncodeError {
    EncodeError::Cbor(err.to_string())
}

/// Emitter writing CBOR into a buffer.
pub(crate) struct CborEmitter {
    encoder: Encoder<Vec<u8>>,
}

impl CborEmitter {
    pub(crate) fn new() -> Self {
        Self {
            encoder: Encoder::new(Vec::new()),
        }
    }

    pub(crate) fn finish(self) -> Vec<u8> {
        self.encoder.into_writer()
    }

    fn term(&mut self, index: Option<i64>, name: &str) -> Result<(), EncodeError> {
        match index {
            Some(index) => self.encoder.i64(index).map_err(cbor_err)?,
            None => self.encoder.str(name).map_err(cbor_err)?,
        };
        Ok(())
    }
}

fn len_u64(len: usize) -> Result<u64, EncodeError> {
    u64::try_from(len).map_err(cbor_err)
}

impl Emitter for CborEmitter {
    fn start_object(&mut self, _shape: Shape, len: usize) -> Result<(), EncodeError> {
        self.encoder.map(len_u64(len)?).map_err(cbor_err)?;
        Ok(())
    }

    fn field(&mut self, field: Field) -> Result<(), EncodeError> {
        self.encoder.u32(field.id).map_err(cbor_err)?;
        Ok(())
    }

    fn start_array(&mut self, len: usize) -> Result<(), EncodeError> {
        self.encoder.array(len_u64(len)?).map_err(cbor_err)?;
        Ok(())
    }

    fn end_array(&mut self) -> Result<(), EncodeError> {
        Ok(())
    }

    fn scalar(&mut self, value: Scalar<'_>) -> Result<(), EncodeError> {
        match value {
            Scalar::Text(text) => {
                self.encoder.str(text).map_err(cbor_err)?;
            }
            Scalar::Uint(n) => {
                self.encoder.u64(n).map_err(cbor_err)?;
            }
            Scalar::Bool(b) => {
                self.encoder.bool(b).map_err(cbor_err)?;
            }
            Scalar::Bytes(bytes) => {
                self.encoder.bytes(bytes).map_err(cbor_err)?;
            }
            Scalar::Term { index, name } => self.term(index, name)?,
            Scalar::Timestamp(ts) => {
                self.encoder
                    .tag(Tag::new(EPOCH_TAG))
                    .and_then(|e| e.i64(ts.unix_timestamp()))
                    .map_err(cbor_err)?;
            }
            Scalar::Digest { algorithm, value } => {
                self.encoder.array(2).map_err(cbor_err)?;
                self.term(algorithm.index(), algorithm.name())?;
                self.encoder.bytes(value).map_err(cbor_err)?;
            }
        }
        Ok(())
    }

    fn end_object(&mut self) -> Result<(), EncodeError> {
        Ok(())
    }
}

/// Parses one CBOR item spanning all of `bytes`.
pub(crate) fn parse(bytes: &[u8]) -> Result<Item, DecodeError> {
    let mut decoder = Decoder::new(bytes);
    let item = decode_item(&mut decoder, 0)?;
    if decoder.position() < bytes.len() {
        return Err(DecodeError::malformed("trailing bytes after tag"));
    }
    Ok(item)
}

fn capacity(len: u64) -> usize {
    usize::try_from(len.min(MAX_PREALLOC)).unwrap_or(0)
}

fn decode_item(d: &mut Decoder<'_>, depth: usize) -> Result<Item, DecodeError> {
    if depth > MAX_DEPTH {
        return Err(DecodeError::malformed(format!(
            "nesting deeper than {MAX_DEPTH}"
        )));
    }
    let item = match d.datatype()? {
        Type::U8 | Type::U16 | Type::U32 | Type::U64 => Item::Uint(d.u64()?),
        Type::I8 | Type::I16 | Type::I32 | Type::I64 => Item::Int(d.i64()?),
        Type::String => Item::Text(d.str()?.to_owned()),
        Type::Bytes => Item::Bytes(d.bytes()?.to_vec()),
        Type::Bool => Item::Bool(d.bool()?),
        Type::Tag => decode_timestamp(d)?,
        Type::Array => {
            let len = d
                .array()?
                .ok_or_else(|| DecodeError::malformed("expected definite array"))?;
            let mut items = Vec::with_capacity(capacity(len));
            for _ in 0..len {
                items.push(decode_item(d, depth + 1)?);
            }
            Item::Array(items)
        }
        Type::Map => {
            let len = d
                .map()?
                .ok_or_else(|| DecodeError::malformed("expected definite map"))?;
            let mut entries = Vec::with_capacity(capacity(len));
            for _ in 0..len {
                let key = match d.datatype()? {
                    Type::U8 | Type::U16 | Type::U32 => d.u32()?,
                    other => {
                        return Err(DecodeError::malformed(format!(
                            "map keys must be field ids, found {other}"
                        )))
                    }
                };
                entries.push((key, decode_item(d, depth + 1)?));
            }
            Item::Map(entries)
        }
        other => {
            return Err(DecodeError::malformed(format!(
                "unsupported cbor type {other}"
            )))
        }
    };
    Ok(item)
}

fn decode_timestamp(d: &mut Decoder<'_>) -> Result<Item, DecodeError> {
    let tag = d.tag()?.as_u64();
    let ts = match tag {
        EPOCH_TAG => {
            let secs = match d.datatype()? {
                Type::U8 | Type::U16 | Type::U32 | Type::U64 => i64::try_from(d.u64()?)
                    .map_err(|_| DecodeError::malformed("timestamp out of range"))?,
                Type::I8 | Type::I16 | Type::I32 | Type::I64 => d.i64()?,
                other => {
                    return Err(DecodeError::malformed(format!(
                        "epoch timestamp must be an integer, found {other}"
                    )))
                }
            };
            OffsetDateTime::from_unix_timestamp(secs)
                .map_err(|err| DecodeError::malformed(err.to_string()))?
        }
        DATETIME_TAG => OffsetDateTime::parse(d.str()?, &Rfc3339)?,
        other => {
            return Err(DecodeError::malformed(format!(
                "unsupported cbor tag {other}"
            )))
        }
    };
    Ok(Item::Timestamp(ts))
}
