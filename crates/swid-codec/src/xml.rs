// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Structured-text (XML) rendering.
//!
//! Scalars become attributes and nested objects become child elements, both
//! named by [`Field::xml`]. Repeated scalars share one space-separated attribute.
//! A digest is written as `prefix:hash="hex"`, where `prefix` is bound to the
//! algorithm's namespace URI. Namespaces are declared on the root element when
//! their preferred prefix is free and on the owning element otherwise.

use std::borrow::Cow;

use quick_xml::escape::escape;
use quick_xml::events::attributes::Attribute;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, Event};
use quick_xml::name::QName;
use quick_xml::{Reader, Writer};
use swid_core::{HashAlgorithm, SWID_NAMESPACE};
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;
use tracing::{trace, warn};

use crate::emit::{Emitter, Object, Scalar};
use crate::error::{DecodeError, EncodeError};
use crate::field::{Field, Kind, Shape, Xml};
use crate::read::Item;

/// Nesting limit for decoded input.
const MAX_DEPTH: usize = 32;

fn xml_err(err: impl std::fmt::Display) -> EncodeError {
    EncodeError::Xml(err.to_string())
}

fn xml_decode_err(err: impl std::fmt::Display) -> DecodeError {
    DecodeError::Xml(err.to_string())
}

/// Escapes an attribute value, including the whitespace a reader would
/// otherwise normalize to spaces.
fn attribute_value(text: &str) -> String {
    let escaped = escape(text);
    if !escaped.contains(['\n', '\r', '\t']) {
        return escaped.into_owned();
    }
    escaped
        .replace('\n', "&#10;")
        .replace('\r', "&#13;")
        .replace('\t', "&#9;")
}

fn push_text_attribute(start: &mut BytesStart<'_>, name: &str, text: &str) {
    start.push_attribute(Attribute {
        key: QName(name.as_bytes()),
        value: Cow::Owned(attribute_value(text).into_bytes()),
    });
}

struct Frame {
    element: &'static str,
    start: Option<BytesStart<'static>>,
    field: Option<Field>,
    array: Option<Vec<String>>,
    /// `(prefix, uri)` bindings declared on this element.
    scope: Vec<(String, String)>,
}

/// Emitter writing an XML document into a buffer.
pub(crate) struct XmlEmitter {
    writer: Writer<Vec<u8>>,
    frames: Vec<Frame>,
    root_scope: Vec<(String, String)>,
}

impl XmlEmitter {
    /// Writes the declaration and plans root namespace bindings for `root`.
    pub(crate) fn new(root: &Object<'_>, pretty: bool) -> Result<Self, EncodeError> {
        let mut writer = if pretty {
            Writer::new_with_indent(Vec::new(), b' ', 2)
        } else {
            Writer::new(Vec::new())
        };
        writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
            .map_err(xml_err)?;

        let mut root_scope: Vec<(String, String)> = Vec::new();
        for algorithm in root.digest_algorithms() {
            let prefix = algorithm.xml_prefix();
            let uri = algorithm.xml_namespace();
            if root_scope.iter().any(|(p, u)| *p == prefix || *u == uri) {
                // Declared locally on first use instead.
                continue;
            }
            root_scope.push((prefix.into_owned(), uri.into_owned()));
        }
        Ok(Self {
            writer,
            frames: Vec::new(),
            root_scope,
        })
    }

    pub(crate) fn finish(self) -> Vec<u8> {
        self.writer.into_inner()
    }

    fn frame(&mut self) -> Result<&mut Frame, EncodeError> {
        self.frames
            .last_mut()
            .ok_or(EncodeError::InvariantViolation { field: "element" })
    }

    fn is_bound(&self, prefix: &str) -> bool {
        self.frames
            .iter()
            .flat_map(|f| &f.scope)
            .any(|(p, _)| p == prefix)
    }

    /// Prefix bound to the algorithm's namespace, declaring it when needed.
    fn digest_prefix(&mut self, algorithm: &HashAlgorithm) -> Result<String, EncodeError> {
        let uri = algorithm.xml_namespace();
        let found = self
            .frames
            .iter()
            .rev()
            .flat_map(|f| &f.scope)
            .find(|(_, u)| *u == uri)
            .map(|(p, _)| p.clone());
        if let Some(prefix) = found {
            return Ok(prefix);
        }

        let base = algorithm.xml_prefix();
        let mut prefix = base.to_string();
        let mut n = 2;
        while self.is_bound(&prefix) {
            prefix = format!("{base}{n}");
            n += 1;
        }
        trace!(%prefix, %uri, "declaring digest namespace locally");
        let frame = self.frame()?;
        let start = frame
            .start
            .as_mut()
            .ok_or(EncodeError::InvariantViolation { field: "hash" })?;
        start.push_attribute((format!("xmlns:{prefix}").as_str(), &*uri));
        frame.scope.push((prefix.clone(), uri.into_owned()));
        Ok(prefix)
    }
}

fn scalar_text(value: Scalar<'_>) -> Result<String, EncodeError> {
    Ok(match value {
        Scalar::Text(text) => text.to_owned(),
        Scalar::Uint(n) => n.to_string(),
        Scalar::Bool(b) => b.to_string(),
        Scalar::Bytes(bytes) => hex::encode(bytes),
        Scalar::Term { name, .. } => name.to_owned(),
        Scalar::Timestamp(ts) => ts.format(&Rfc3339)?,
        Scalar::Digest { value, .. } => hex::encode(value),
    })
}

impl Emitter for XmlEmitter {
    fn start_object(&mut self, shape: Shape, _len: usize) -> Result<(), EncodeError> {
        let element = match self.frames.last_mut() {
            Some(parent) => {
                if let Some(start) = parent.start.take() {
                    self.writer
                        .write_event(Event::Start(start))
                        .map_err(xml_err)?;
                }
                match parent.field.map(|f| f.xml) {
                    Some(Xml::Element(name)) => name,
                    _ => shape.element(),
                }
            }
            None => shape.element(),
        };

        let mut start = BytesStart::new(element);
        let mut scope = Vec::new();
        if self.frames.is_empty() {
            start.push_attribute(("xmlns", SWID_NAMESPACE));
            for (prefix, uri) in &self.root_scope {
                start.push_attribute((format!("xmlns:{prefix}").as_str(), uri.as_str()));
            }
            scope.clone_from(&self.root_scope);
        }
        self.frames.push(Frame {
            element,
            start: Some(start),
            field: None,
            array: None,
            scope,
        });
        Ok(())
    }

    fn field(&mut self, field: Field) -> Result<(), EncodeError> {
        self.frame()?.field = Some(field);
        Ok(())
    }

    fn start_array(&mut self, len: usize) -> Result<(), EncodeError> {
        self.frame()?.array = Some(Vec::with_capacity(len));
        Ok(())
    }

    fn end_array(&mut self) -> Result<(), EncodeError> {
        let frame = self.frame()?;
        let values = frame.array.take().unwrap_or_default();
        if values.is_empty() {
            return Ok(());
        }
        let Some(Field {
            xml: Xml::Attribute(name),
            ..
        }) = frame.field
        else {
            return Err(EncodeError::InvariantViolation { field: "attribute" });
        };
        let start = frame
            .start
            .as_mut()
            .ok_or(EncodeError::InvariantViolation { field: name })?;
        push_text_attribute(start, name, &values.join(" "));
        Ok(())
    }

    fn scalar(&mut self, value: Scalar<'_>) -> Result<(), EncodeError> {
        let field = self
            .frame()?
            .field
            .ok_or(EncodeError::InvariantViolation { field: "attribute" })?;
        let Xml::Attribute(name) = field.xml else {
            return Err(EncodeError::InvariantViolation { field: field.name });
        };

        if let Scalar::Digest { algorithm, value } = value {
            let prefix = self.digest_prefix(algorithm)?;
            let key = format!("{prefix}:{name}");
            let start = self
                .frame()?
                .start
                .as_mut()
                .ok_or(EncodeError::InvariantViolation { field: field.name })?;
            start.push_attribute((key.as_str(), hex::encode(value).as_str()));
            return Ok(());
        }

        let text = scalar_text(value)?;
        let frame = self.frame()?;
        if let Some(values) = frame.array.as_mut() {
            values.push(text);
            return Ok(());
        }
        let start = frame
            .start
            .as_mut()
            .ok_or(EncodeError::InvariantViolation { field: field.name })?;
        push_text_attribute(start, name, &text);
        Ok(())
    }

    fn end_object(&mut self) -> Result<(), EncodeError> {
        let frame = self
            .frames
            .pop()
            .ok_or(EncodeError::InvariantViolation { field: "element" })?;
        match frame.start {
            Some(start) => self.writer.write_event(Event::Empty(start)),
            None => self
                .writer
                .write_event(Event::End(BytesEnd::new(frame.element))),
        }
        .map_err(xml_err)
    }
}

/// Parses an XML document into an item tree rooted at the tag map.
pub(crate) fn parse(bytes: &[u8]) -> Result<Item, DecodeError> {
    let text = std::str::from_utf8(bytes)
        .map_err(|err| DecodeError::malformed(format!("document is not UTF-8: {err}")))?;
    let mut reader = Reader::from_str(text);
    reader.config_mut().trim_text(true);
    let mut scopes = Vec::new();

    let root = loop {
        match reader.read_event().map_err(xml_decode_err)? {
            Event::Start(start) => {
                expect_root(&start)?;
                break element(&mut reader, &start, Shape::Tag, false, &mut scopes, 0)?;
            }
            Event::Empty(start) => {
                expect_root(&start)?;
                break element(&mut reader, &start, Shape::Tag, true, &mut scopes, 0)?;
            }
            Event::Decl(_) | Event::Comment(_) | Event::PI(_) | Event::DocType(_) => {}
            Event::Eof => return Err(DecodeError::malformed("document has no root element")),
            _ => return Err(DecodeError::malformed("content before the root element")),
        }
    };

    loop {
        match reader.read_event().map_err(xml_decode_err)? {
            Event::Eof => return Ok(root),
            Event::Comment(_) | Event::PI(_) => {}
            _ => return Err(DecodeError::malformed("content after the root element")),
        }
    }
}

fn expect_root(start: &BytesStart<'_>) -> Result<(), DecodeError> {
    let name = start.name();
    if start.local_name().as_ref() != Shape::Tag.element().as_bytes() {
        return Err(DecodeError::malformed(format!(
            "root element must be {}, found {}",
            Shape::Tag.element(),
            String::from_utf8_lossy(name.as_ref())
        )));
    }
    let declaration = match name.prefix() {
        Some(prefix) => format!("xmlns:{}", String::from_utf8_lossy(prefix.as_ref())),
        None => "xmlns".to_owned(),
    };
    let namespace = start
        .attributes()
        .flatten()
        .find(|attr| attr.key.as_ref() == declaration.as_bytes())
        .map(|attr| attr.value.into_owned());
    match namespace {
        Some(uri) if uri == SWID_NAMESPACE.as_bytes() => Ok(()),
        Some(uri) => Err(DecodeError::malformed(format!(
            "root element is in namespace `{}`, expected `{SWID_NAMESPACE}`",
            String::from_utf8_lossy(&uri)
        ))),
        None => Err(DecodeError::malformed(format!(
            "root element must declare the namespace `{SWID_NAMESPACE}`"
        ))),
    }
}

type Scope = Vec<(String, String)>;

fn element(
    reader: &mut Reader<&[u8]>,
    start: &BytesStart<'_>,
    shape: Shape,
    empty: bool,
    scopes: &mut Vec<Scope>,
    depth: usize,
) -> Result<Item, DecodeError> {
    if depth > MAX_DEPTH {
        return Err(DecodeError::malformed(format!(
            "nesting deeper than {MAX_DEPTH}"
        )));
    }

    let mut declared = Scope::new();
    let mut attributes = Vec::new();
    for attr in start.attributes() {
        let attr = attr.map_err(xml_decode_err)?;
        let key = std::str::from_utf8(attr.key.as_ref())
            .map_err(xml_decode_err)?
            .to_owned();
        let value = attr.unescape_value().map_err(xml_decode_err)?.into_owned();
        if key == "xmlns" {
            continue;
        }
        if let Some(prefix) = key.strip_prefix("xmlns:") {
            declared.push((prefix.to_owned(), value));
        } else {
            attributes.push((key, value));
        }
    }
    scopes.push(declared);

    let mut entries = Vec::new();
    for (key, value) in attributes {
        if let Some(entry) = attribute_entry(shape, &key, &value, scopes)? {
            entries.push(entry);
        }
    }

    if !empty {
        loop {
            match reader.read_event().map_err(xml_decode_err)? {
                Event::Start(child) => {
                    if let Some(entry) = child_entry(reader, &child, shape, false, scopes, depth)? {
                        entries.push(entry);
                    }
                }
                Event::Empty(child) => {
                    if let Some(entry) = child_entry(reader, &child, shape, true, scopes, depth)? {
                        entries.push(entry);
                    }
                }
                Event::End(_) => break,
                Event::Text(_) | Event::CData(_) => {
                    warn!(element = shape.element(), "ignoring character data");
                }
                Event::Comment(_) | Event::PI(_) => {}
                Event::Eof => return Err(DecodeError::malformed("unexpected end of document")),
                Event::Decl(_) | Event::DocType(_) => {
                    return Err(DecodeError::malformed("unexpected declaration"))
                }
            }
        }
    }

    scopes.pop();
    Ok(Item::Map(entries))
}

fn child_entry(
    reader: &mut Reader<&[u8]>,
    child: &BytesStart<'_>,
    shape: Shape,
    empty: bool,
    scopes: &mut Vec<Scope>,
    depth: usize,
) -> Result<Option<(u32, Item)>, DecodeError> {
    let local = child.local_name();
    let name = std::str::from_utf8(local.as_ref()).map_err(xml_decode_err)?;
    match shape.member_by_element(name) {
        Some(field @ Field {
            kind: Kind::Object(child_shape),
            ..
        }) => {
            let item = element(reader, child, child_shape, empty, scopes, depth + 1)?;
            Ok(Some((field.id, item)))
        }
        _ => {
            warn!(element = name, parent = shape.element(), "skipping unknown element");
            if !empty {
                let end = child.to_end().into_owned();
                reader.read_to_end(end.name()).map_err(xml_decode_err)?;
            }
            Ok(None)
        }
    }
}

fn resolve_prefix<'s>(scopes: &'s [Scope], prefix: &str) -> Option<&'s str> {
    scopes
        .iter()
        .rev()
        .flat_map(|scope| scope.iter().rev())
        .find(|(p, _)| p == prefix)
        .map(|(_, uri)| uri.as_str())
}

fn attribute_entry(
    shape: Shape,
    key: &str,
    value: &str,
    scopes: &[Scope],
) -> Result<Option<(u32, Item)>, DecodeError> {
    if let Some((prefix, local)) = key.split_once(':').filter(|(p, _)| *p != "xml") {
        let field = shape.member_by_attribute(local).filter(|f| f.kind == Kind::Digest);
        let Some(field) = field else {
            warn!(attribute = key, element = shape.element(), "skipping unknown attribute");
            return Ok(None);
        };
        let Some(uri) = resolve_prefix(scopes, prefix) else {
            return Err(DecodeError::malformed(format!(
                "undeclared namespace prefix `{prefix}`"
            )));
        };
        let Some(algorithm) = HashAlgorithm::name_for_xml_namespace(uri) else {
            warn!(uri, element = shape.element(), "skipping digest with unknown namespace");
            return Ok(None);
        };
        let digest = hex::decode(value).map_err(|err| {
            DecodeError::malformed(format!("`{key}` is not hex: {err}"))
        })?;
        let pair = vec![Item::Text(algorithm.into_owned()), Item::Bytes(digest)];
        return Ok(Some((field.id, Item::Array(pair))));
    }

    let Some(field) = shape.member_by_attribute(key).filter(|f| f.kind != Kind::Digest) else {
        warn!(attribute = key, element = shape.element(), "skipping unknown attribute");
        return Ok(None);
    };
    Ok(Some((field.id, text_item(field, value)?)))
}

fn text_item(field: Field, text: &str) -> Result<Item, DecodeError> {
    let item = match field.kind {
        Kind::Text => Item::Text(text.to_owned()),
        Kind::Uint => Item::Uint(text.trim().parse().map_err(|err| {
            DecodeError::malformed(format!("`{}` must be an unsigned integer: {err}", field.name))
        })?),
        Kind::Bool => match text.trim() {
            "true" | "1" => Item::Bool(true),
            "false" | "0" => Item::Bool(false),
            other => {
                return Err(DecodeError::malformed(format!(
                    "`{}` must be a boolean, found `{other}`",
                    field.name
                )))
            }
        },
        Kind::Bytes => Item::Bytes(hex::decode(text.trim()).map_err(|err| {
            DecodeError::malformed(format!("`{}` is not hex: {err}", field.name))
        })?),
        Kind::Term => {
            let mut terms: Vec<Item> = text
                .split_whitespace()
                .map(|t| Item::Text(t.to_owned()))
                .collect();
            match terms.len() {
                0 => return Err(DecodeError::malformed(format!("`{}` is empty", field.name))),
                1 => terms.remove(0),
                _ => Item::Array(terms),
            }
        }
        Kind::Timestamp => Item::Timestamp(OffsetDateTime::parse(text.trim(), &Rfc3339)?),
        Kind::Digest | Kind::Object(_) => {
            return Err(DecodeError::malformed(format!(
                "`{}` cannot be an attribute",
                field.name
            )))
        }
    };
    Ok(item)
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::emit::emit;
    use crate::field::ids;
    use swid_core::{Term, WellKnownHash};

    fn file_with(algorithms: &[HashAlgorithm]) -> Object<'_> {
        let mut file = Object::new(Shape::File);
        file.scalar(ids::FS_NAME, Scalar::Text("a.bin"));
        file.repeated(
            ids::HASH,
            algorithms
                .iter()
                .map(|algorithm| {
                    crate::emit::Node::Scalar(Scalar::Digest {
                        algorithm,
                        value: &[0xde, 0xad],
                    })
                })
                .collect(),
        );
        let mut payload = Object::new(Shape::Payload);
        payload.objects(ids::FILE, vec![file]);
        let mut root = Object::new(Shape::Tag);
        root.scalar(ids::TAG_ID, Scalar::Text("t"));
        root.objects(ids::PAYLOAD, vec![payload]);
        root
    }

    fn prefixes(doc: &str) -> Vec<&str> {
        doc.match_indices("xmlns:")
            .map(|(at, _)| {
                let rest = &doc[at + 6..];
                &rest[..rest.find('=').unwrap_or(rest.len())]
            })
            .collect()
    }

    fn render(root: &Object<'_>) -> String {
        let mut out = XmlEmitter::new(root, false).unwrap();
        emit(root, &mut out).unwrap();
        String::from_utf8(out.finish()).unwrap()
    }

    #[test]
    fn digest_namespaces_are_declared_on_the_root() {
        let algorithms = [HashAlgorithm::from(WellKnownHash::Sha256)];
        let doc = render(&file_with(&algorithms));
        assert!(doc.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
        assert!(doc.contains(&format!("<SoftwareIdentity xmlns=\"{SWID_NAMESPACE}\"")));
        assert!(doc.contains("xmlns:sha256=\"http://www.w3.org/2001/04/xmlenc#sha256\""));
        assert!(doc.contains("<File name=\"a.bin\" sha256:hash=\"dead\"/>"));
    }

    #[test]
    fn clashing_prefixes_are_declared_locally_with_a_suffix() {
        let algorithms = [Term::named("blake3"), Term::named("blake_3")];
        let doc = render(&file_with(&algorithms));
        assert_eq!(prefixes(&doc), ["ni-blake3", "ni-blake32"]);
        assert!(doc.contains("ni-blake3:hash=\"dead\""));
        assert!(doc.contains("ni-blake32:hash=\"dead\""));

        let Item::Map(root) = parse(doc.as_bytes()).unwrap() else {
            panic!("expected map")
        };
        let Item::Map(payload) = &root[1].1 else {
            panic!("expected payload")
        };
        let Item::Map(file) = &payload[0].1 else {
            panic!("expected file")
        };
        let names: Vec<_> = file
            .iter()
            .filter_map(|(_, item)| match item {
                Item::Array(pair) => Some(pair[0].clone()),
                _ => None,
            })
            .collect();
        assert_eq!(
            names,
            [Item::Text("blake3".to_owned()), Item::Text("blake_3".to_owned())]
        );
    }

    #[test]
    fn repeated_terms_share_one_attribute() {
        let mut entity = Object::new(Shape::Entity);
        entity.scalar(ids::ENTITY_NAME, Scalar::Text("Example"));
        entity.repeated(
            ids::ROLE,
            vec![
                crate::emit::Node::Scalar(Scalar::Term { index: Some(1), name: "tagCreator" }),
                crate::emit::Node::Scalar(Scalar::Term { index: Some(2), name: "softwareCreator" }),
            ],
        );
        let mut root = Object::new(Shape::Tag);
        root.objects(ids::ENTITY, vec![entity]);
        let doc = render(&root);
        assert!(doc.contains("role=\"tagCreator softwareCreator\""));

        let Item::Map(root) = parse(doc.as_bytes()).unwrap() else {
            panic!("expected map")
        };
        let Item::Map(entity) = &root[0].1 else {
            panic!("expected entity")
        };
        assert!(matches!(&entity[1], (33, Item::Array(roles)) if roles.len() == 2));
    }

    #[test]
    fn unknown_elements_and_attributes_are_skipped() {
        let doc = format!(
            "<SoftwareIdentity xmlns=\"{SWID_NAMESPACE}\" tagId=\"t\" color=\"red\">\
             <Widget><Entity name=\"nested\"/></Widget>\
             <Link href=\"https://a\" rel=\"related\"/>\
             </SoftwareIdentity>"
        );
        let Item::Map(root) = parse(doc.as_bytes()).unwrap() else {
            panic!("expected map")
        };
        assert_eq!(root.len(), 2);
        assert_eq!(root[0].0, ids::TAG_ID.id);
        assert_eq!(root[1].0, ids::LINK.id);
    }

    #[test]
    fn rejects_wrong_root_and_undeclared_prefixes() {
        assert!(parse(b"<Other/>").is_err());
        assert!(parse(b"").is_err());
        let doc = format!(
            "<SoftwareIdentity xmlns=\"{SWID_NAMESPACE}\">\
             <Payload><File name=\"a\" x:hash=\"00\"/></Payload></SoftwareIdentity>"
        );
        let err = parse(doc.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("undeclared namespace prefix"));
        let twice = format!(
            "<SoftwareIdentity xmlns=\"{SWID_NAMESPACE}\"/><SoftwareIdentity xmlns=\"{SWID_NAMESPACE}\"/>"
        );
        assert!(parse(twice.as_bytes()).is_err());
    }

    #[test]
    fn root_must_be_in_the_swid_namespace() {
        let bare = parse(b"<SoftwareIdentity tagId=\"t\"/>").unwrap_err();
        assert!(matches!(bare, DecodeError::Malformed(msg) if msg.contains("declare")));
        let other = parse(b"<SoftwareIdentity xmlns=\"urn:example\" tagId=\"t\"/>").unwrap_err();
        assert!(matches!(other, DecodeError::Malformed(msg) if msg.contains("urn:example")));

        let prefixed = format!(
            "<swid:SoftwareIdentity xmlns:swid=\"{SWID_NAMESPACE}\" tagId=\"t\"/>"
        );
        let Item::Map(root) = parse(prefixed.as_bytes()).unwrap() else {
            panic!("expected map")
        };
        assert_eq!(root, vec![(ids::TAG_ID.id, Item::Text("t".to_owned()))]);
    }

    #[test]
    fn attribute_whitespace_survives_as_character_references() {
        let mut entity = Object::new(Shape::Entity);
        entity.scalar(ids::ENTITY_NAME, Scalar::Text("Example\n\tCorp\r"));
        let mut root = Object::new(Shape::Tag);
        root.objects(ids::ENTITY, vec![entity]);
        let doc = render(&root);
        assert!(doc.contains("name=\"Example&#10;&#9;Corp&#13;\""));
        assert!(!doc.contains('\n'));

        let Item::Map(root) = parse(doc.as_bytes()).unwrap() else {
            panic!("expected map")
        };
        let Item::Map(entity) = &root[0].1 else {
            panic!("expected entity")
        };
        assert_eq!(entity[0].1, Item::Text("Example\n\tCorp\r".to_owned()));
    }
}
