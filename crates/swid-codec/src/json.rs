// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Compact-text (JSON) rendering.
//!
//! Objects are keyed by [`Field::name`]. Terms render as their index when they
//! have one and as text otherwise. Bytes are lowercase hex and timestamps are
//! RFC 3339. A digest is the pair `[algorithm, hex]`.

use serde_json::{Map, Number, Value};
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;
use tracing::warn;

use crate::emit::{Emitter, Scalar};
use crate::error::{DecodeError, EncodeError};
use crate::field::{Field, Kind, Shape};
use crate::read::Item;

enum Frame {
    Object {
        map: Map<String, Value>,
        key: Option<Field>,
    },
    Array(Vec<Value>),
}

/// Emitter building a JSON value tree.
#[derive(Default)]
pub(crate) struct JsonEmitter {
    stack: Vec<Frame>,
    root: Option<Value>,
}

fn term_value(index: Option<i64>, name: &str) -> Value {
    index.map_or_else(|| Value::String(name.to_owned()), |i| Value::Number(i.into()))
}

impl JsonEmitter {
    pub(crate) fn finish(self, pretty: bool) -> Result<Vec<u8>, EncodeError> {
        let root = self.root.ok_or(EncodeError::InvariantViolation { field: "root" })?;
        let bytes = if pretty {
            serde_json::to_vec_pretty(&root)?
        } else {
            serde_json::to_vec(&root)?
        };
        Ok(bytes)
    }

    fn push(&mut self, value: Value) -> Result<(), EncodeError> {
        match self.stack.last_mut() {
            Some(Frame::Array(items)) => items.push(value),
            Some(Frame::Object { map, key }) => {
                let field = key
                    .take()
                    .ok_or(EncodeError::InvariantViolation { field: "object key" })?;
                map.insert(field.name.to_owned(), value);
            }
            None => self.root = Some(value),
        }
        Ok(())
    }
}

impl Emitter for JsonEmitter {
    fn start_object(&mut self, _shape: Shape, len: usize) -> Result<(), EncodeError> {
        self.stack.push(Frame::Object {
            map: Map::with_capacity(len),
            key: None,
        });
        Ok(())
    }

    fn field(&mut self, field: Field) -> Result<(), EncodeError> {
        match self.stack.last_mut() {
            Some(Frame::Object { key, .. }) => {
                *key = Some(field);
                Ok(())
            }
            _ => Err(EncodeError::InvariantViolation { field: field.name }),
        }
    }

    fn start_array(&mut self, len: usize) -> Result<(), EncodeError> {
        self.stack.push(Frame::Array(Vec::with_capacity(len)));
        Ok(())
    }

    fn end_array(&mut self) -> Result<(), EncodeError> {
        match self.stack.pop() {
            Some(Frame::Array(items)) => self.push(Value::Array(items)),
            _ => Err(EncodeError::InvariantViolation { field: "array" }),
        }
    }

    fn scalar(&mut self, value: Scalar<'_>) -> Result<(), EncodeError> {
        let value = match value {
            Scalar::Text(text) => Value::String(text.to_owned()),
            Scalar::Uint(n) => Value::Number(n.into()),
            Scalar::Bool(b) => Value::Bool(b),
            Scalar::Bytes(bytes) => Value::String(hex::encode(bytes)),
            Scalar::Term { index, name } => term_value(index, name),
            Scalar::Timestamp(ts) => Value::String(ts.format(&Rfc3339)?),
            Scalar::Digest { algorithm, value } => Value::Array(vec![
                term_value(algorithm.index(), algorithm.name()),
                Value::String(hex::encode(value)),
            ]),
        };
        self.push(value)
    }

    fn end_object(&mut self) -> Result<(), EncodeError> {
        match self.stack.pop() {
            Some(Frame::Object { map, .. }) => self.push(Value::Object(map)),
            _ => Err(EncodeError::InvariantViolation { field: "object" }),
        }
    }
}

/// Parses a JSON document into an item tree rooted at the tag map.
pub(crate) fn parse(bytes: &[u8]) -> Result<Item, DecodeError> {
    let value: Value = serde_json::from_slice(bytes)?;
    object_item(Shape::Tag, value)
}

fn expected(field: Field, what: &str, found: &Value) -> DecodeError {
    DecodeError::malformed(format!("`{}` must be {what}, found {found}", field.name))
}

fn object_item(shape: Shape, value: Value) -> Result<Item, DecodeError> {
    let Value::Object(map) = value else {
        return Err(DecodeError::malformed(format!(
            "{} must be a JSON object",
            shape.element()
        )));
    };
    let mut entries = Vec::with_capacity(map.len());
    for (key, value) in map {
        let Some(field) = shape.member_by_name(&key) else {
            warn!(key, shape = shape.element(), "skipping unknown field");
            continue;
        };
        entries.push((field.id, field_item(field, value)?));
    }
    Ok(Item::Map(entries))
}

fn field_item(field: Field, value: Value) -> Result<Item, DecodeError> {
    match value {
        Value::Array(values)
            if field.kind != Kind::Digest || matches!(values.first(), Some(Value::Array(_))) =>
        {
            values
                .into_iter()
                .map(|v| value_item(field, v))
                .collect::<Result<_, _>>()
                .map(Item::Array)
        }
        other => value_item(field, other),
    }
}

fn number_item(field: Field, n: &Number) -> Result<Item, DecodeError> {
    n.as_u64()
        .map(Item::Uint)
        .or_else(|| n.as_i64().map(Item::Int))
        .ok_or_else(|| DecodeError::malformed(format!("`{}` must be an integer", field.name)))
}

fn hex_item(field: Field, text: &str) -> Result<Item, DecodeError> {
    hex::decode(text)
        .map(Item::Bytes)
        .map_err(|err| DecodeError::malformed(format!("`{}` is not hex: {err}", field.name)))
}

fn value_item(field: Field, value: Value) -> Result<Item, DecodeError> {
    match (field.kind, value) {
        (Kind::Text, Value::String(text)) => Ok(Item::Text(text)),
        (Kind::Uint, Value::Number(n)) => match number_item(field, &n)? {
            item @ Item::Uint(_) => Ok(item),
            _ => Err(expected(field, "an unsigned integer", &Value::Number(n))),
        },
        (Kind::Bool, Value::Bool(b)) => Ok(Item::Bool(b)),
        (Kind::Bytes, Value::String(text)) => hex_item(field, &text),
        (Kind::Term, Value::Number(n)) => number_item(field, &n),
        (Kind::Term, Value::String(name)) => Ok(Item::Text(name)),
        (Kind::Timestamp, Value::String(text)) => {
            Ok(Item::Timestamp(OffsetDateTime::parse(&text, &Rfc3339)?))
        }
        (Kind::Digest, Value::Array(pair)) => match <[Value; 2]>::try_from(pair) {
            Ok([algorithm, Value::String(digest)]) => {
                let algorithm = match algorithm {
                    Value::Number(n) => number_item(field, &n)?,
                    Value::String(name) => Item::Text(name),
                    other => return Err(expected(field, "an algorithm index or name", &other)),
                };
                Ok(Item::Array(vec![algorithm, hex_item(field, &digest)?]))
            }
            _ => Err(DecodeError::malformed(format!(
                "`{}` must be an [algorithm, hex] pair",
                field.name
            ))),
        },
        (Kind::Object(shape), value) => object_item(shape, value),
        (kind, other) => Err(expected(field, &format!("{kind:?}").to_lowercase(), &other)),
    }
}
