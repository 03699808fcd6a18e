// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Emitter contract and the shared traversal driving it.
//!
//! [`crate::walk`] flattens a tag into an [`Object`] tree once; [`emit`] then
//! replays that tree against any [`Emitter`]. Every format sees the same pre-order
//! sequence of calls and only decides how to render them.

use swid_core::HashAlgorithm;
use time::OffsetDateTime;

use crate::error::EncodeError;
use crate::field::{Field, Shape};

/// A leaf value.
#[derive(Clone, Copy, Debug)]
pub enum Scalar<'a> {
    /// Text.
    Text(&'a str),
    /// Unsigned integer.
    Uint(u64),
    /// Boolean.
    Bool(bool),
    /// Opaque bytes.
    Bytes(&'a [u8]),
    /// Vocabulary term.
    Term {
        /// Integer index, when the term has one.
        index: Option<i64>,
        /// Term name.
        name: &'a str,
    },
    /// Point in time.
    Timestamp(OffsetDateTime),
    /// Content digest.
    Digest {
        /// Algorithm that produced the digest.
        algorithm: &'a HashAlgorithm,
        /// Digest bytes.
        value: &'a [u8],
    },
}

/// A field value: leaf or nested object.
#[derive(Clone, Debug)]
pub enum Node<'a> {
    /// Leaf value.
    Scalar(Scalar<'a>),
    /// Nested object.
    Object(Object<'a>),
}

/// One field of an object with every value it carries.
#[derive(Clone, Debug)]
pub struct Entry<'a> {
    /// The field.
    pub field: Field,
    /// Values, in order. Never empty once built by the walker.
    pub values: Vec<Node<'a>>,
}

/// An object of a given shape, fields in emission order.
#[derive(Clone, Debug)]
pub struct Object<'a> {
    /// Object type.
    pub shape: Shape,
    /// Fields; scalars precede nested objects.
    pub entries: Vec<Entry<'a>>,
}

impl<'a> Object<'a> {
    pub(crate) fn new(shape: Shape) -> Self {
        Self {
            shape,
            entries: Vec::new(),
        }
    }

    pub(crate) fn scalar(&mut self, field: Field, value: Scalar<'a>) {
        self.entries.push(Entry {
            field,
            values: vec![Node::Scalar(value)],
        });
    }

    pub(crate) fn text(&mut self, field: Field, value: Option<&'a str>) {
        if let Some(value) = value {
            self.scalar(field, Scalar::Text(value));
        }
    }

    pub(crate) fn required_text(&mut self, field: Field, value: &'a str) -> Result<(), EncodeError> {
        if value.is_empty() {
            return Err(EncodeError::InvariantViolation { field: field.name });
        }
        self.scalar(field, Scalar::Text(value));
        Ok(())
    }

    /// Adds a repeated field; nothing is added when `values` is empty.
    pub(crate) fn repeated(&mut self, field: Field, values: Vec<Node<'a>>) {
        if !values.is_empty() {
            self.entries.push(Entry { field, values });
        }
    }

    pub(crate) fn objects(&mut self, field: Field, objects: Vec<Object<'a>>) {
        self.repeated(field, objects.into_iter().map(Node::Object).collect());
    }

    /// Every digest algorithm used anywhere below this object, first use first.
    pub fn digest_algorithms(&self) -> Vec<&'a HashAlgorithm> {
        let mut found = Vec::new();
        self.collect_algorithms(&mut found);
        found
    }

    fn collect_algorithms(&self, found: &mut Vec<&'a HashAlgorithm>) {
        for node in self.entries.iter().flat_map(|e| &e.values) {
            match node {
                Node::Scalar(Scalar::Digest { algorithm, .. }) => {
                    if !found.contains(algorithm) {
                        found.push(*algorithm);
                    }
                }
                Node::Object(child) => child.collect_algorithms(found),
                Node::Scalar(_) => {}
            }
        }
    }
}

/// Rendering capability supplied by each format.
///
/// Calls arrive in pre-order: `start_object`, then per field `field` followed by
/// either one value or `start_array` .. values .. `end_array`, then `end_object`.
pub trait Emitter {
    /// Opens an object with `len` fields.
    fn start_object(&mut self, shape: Shape, len: usize) -> Result<(), EncodeError>;
    /// Names the field whose value(s) follow.
    fn field(&mut self, field: Field) -> Result<(), EncodeError>;
    /// Opens an array of `len` values for the current field.
    fn start_array(&mut self, len: usize) -> Result<(), EncodeError>;
    /// Closes the current array.
    fn end_array(&mut self) -> Result<(), EncodeError>;
    /// Writes a leaf value.
    fn scalar(&mut self, value: Scalar<'_>) -> Result<(), EncodeError>;
    /// Closes the current object.
    fn end_object(&mut self) -> Result<(), EncodeError>;
}

/// Replays `object` against `out`.
///
/// A field with one value is written bare; more than one goes inside an array.
pub fn emit<E: Emitter>(object: &Object<'_>, out: &mut E) -> Result<(), EncodeError> {
    out.start_object(object.shape, object.entries.len())?;
    for entry in &object.entries {
        out.field(entry.field)?;
        match entry.values.as_slice() {
            [] => {
                return Err(EncodeError::InvariantViolation {
                    field: entry.field.name,
                })
            }
            [single] => emit_node(single, out)?,
            many => {
                out.start_array(many.len())?;
                for node in many {
                    emit_node(node, out)?;
                }
                out.end_array()?;
            }
        }
    }
    out.end_object()
}

fn emit_node<E: Emitter>(node: &Node<'_>, out: &mut E) -> Result<(), EncodeError> {
    match node {
        Node::Scalar(value) => out.scalar(*value),
        Node::Object(object) => emit(object, out),
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::field::ids;

    /// Records the call sequence as text.
    #[derive(Default)]
    struct Trace(Vec<String>);

    impl Emitter for Trace {
        fn start_object(&mut self, shape: Shape, len: usize) -> Result<(), EncodeError> {
            self.0.push(format!("{{{shape:?}:{len}"));
            Ok(())
        }
        fn field(&mut self, field: Field) -> Result<(), EncodeError> {
            self.0.push(field.name.to_owned());
            Ok(())
        }
        fn start_array(&mut self, len: usize) -> Result<(), EncodeError> {
            self.0.push(format!("[{len}"));
            Ok(())
        }
        fn end_array(&mut self) -> Result<(), EncodeError> {
            self.0.push("]".to_owned());
            Ok(())
        }
        fn scalar(&mut self, value: Scalar<'_>) -> Result<(), EncodeError> {
            self.0.push(match value {
                Scalar::Text(t) => t.to_owned(),
                other => format!("{other:?}"),
            });
            Ok(())
        }
        fn end_object(&mut self) -> Result<(), EncodeError> {
            self.0.push("}".to_owned());
            Ok(())
        }
    }

    #[test]
    fn single_values_are_bare_and_repeats_are_wrapped() {
        let mut link = Object::new(Shape::Link);
        link.scalar(ids::HREF, Scalar::Text("https://a"));
        let mut tag = Object::new(Shape::Tag);
        tag.scalar(ids::TAG_ID, Scalar::Text("t"));
        tag.objects(ids::LINK, vec![link.clone()]);

        let mut trace = Trace::default();
        emit(&tag, &mut trace).unwrap();
        assert_eq!(
            trace.0,
            ["{Tag:2", "tag-id", "t", "link", "{Link:1", "href", "https://a", "}", "}"]
        );

        let mut tag = Object::new(Shape::Tag);
        tag.objects(ids::LINK, vec![link.clone(), link]);
        let mut trace = Trace::default();
        emit(&tag, &mut trace).unwrap();
        assert_eq!(&trace.0[..3], ["{Tag:1", "link", "[2"]);
        assert_eq!(trace.0[trace.0.len() - 2], "]");
    }

    #[test]
    fn empty_repeats_are_skipped() {
        let mut tag = Object::new(Shape::Tag);
        tag.objects(ids::LINK, Vec::new());
        tag.text(ids::LANG, None);
        assert!(tag.entries.is_empty());
    }

    #[test]
    fn empty_entry_is_an_invariant_violation() {
        let mut tag = Object::new(Shape::Tag);
        tag.entries.push(Entry {
            field: ids::ENTITY,
            values: Vec::new(),
        });
        let err = emit(&tag, &mut Trace::default()).unwrap_err();
        assert!(matches!(err, EncodeError::InvariantViolation { field: "entity" }));
    }

    #[test]
    fn required_text_rejects_empty() {
        let mut tag = Object::new(Shape::Tag);
        let err = tag.required_text(ids::TAG_ID, "").unwrap_err();
        assert!(matches!(err, EncodeError::InvariantViolation { field: "tag-id" }));
    }
}
