//! # Exclusive Canonicalization
//!
//! Exclusive XML Canonicalization 1.0 (without comments) over the owned
//! infoset in [`shared_types::xml`].
//!
//! - A namespace declaration is rendered on an element only when the element
//!   or one of its attributes visibly uses the prefix and no output ancestor
//!   already rendered the same binding.
//! - Declarations are sorted by prefix (the default namespace first).
//! - Attributes are sorted by namespace URI, then local name. Unqualified
//!   attributes sort first.
//! - Empty elements are written as start/end tag pairs.
//!
//! The canonical character sequence is handed to [`CanonicalFormWriter`]
//! piece by piece, so the bytes reach the stream as UTF-8 without a BOM.

use crate::canonical_form::CanonicalFormWriter;
use shared_types::xml::{
    escape_attribute, escape_text, required_declarations, NamespaceScope, XmlAttribute,
    XmlElement, XmlNode,
};
use std::io::{self, Write};

/// Exclusive C14N serializer. Holds reusable buffers; not shared between
/// threads.
#[derive(Debug, Default)]
pub struct ExclusiveCanonicalizer {
    writer: CanonicalFormWriter,
    scratch: String,
}

impl ExclusiveCanonicalizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Canonicalize `element` (treated as an apex node) into `stream`.
    pub fn canonicalize_to<W: Write + ?Sized>(
        &mut self,
        element: &XmlElement,
        stream: &mut W,
    ) -> io::Result<()> {
        let mut scope = NamespaceScope::new();
        self.write_element(element, &mut scope, stream)
    }

    /// Canonical character sequence of `element`.
    pub fn canonicalize(&mut self, element: &XmlElement) -> String {
        let mut out = String::new();
        render_element(element, &mut NamespaceScope::new(), &mut out);
        out
    }

    fn write_element<W: Write + ?Sized>(
        &mut self,
        element: &XmlElement,
        scope: &mut NamespaceScope,
        stream: &mut W,
    ) -> io::Result<()> {
        self.scratch.clear();
        render_start_tag(element, scope, &mut self.scratch);
        self.writer.encode_and_write(stream, &self.scratch)?;

        for child in &element.children {
            match child {
                XmlNode::Element(e) => self.write_element(e, scope, stream)?,
                XmlNode::Text(t) => {
                    self.scratch.clear();
                    escape_text(t, &mut self.scratch);
                    self.writer.encode_and_write(stream, &self.scratch)?;
                }
            }
        }

        self.scratch.clear();
        render_end_tag(element, scope, &mut self.scratch);
        self.writer.encode_and_write(stream, &self.scratch)
    }
}

/// Canonical UTF-8 bytes of `element`.
pub fn canonical_bytes(element: &XmlElement) -> Vec<u8> {
    ExclusiveCanonicalizer::new()
        .canonicalize(element)
        .into_bytes()
}

fn render_element(element: &XmlElement, scope: &mut NamespaceScope, out: &mut String) {
    render_start_tag(element, scope, out);
    for child in &element.children {
        match child {
            XmlNode::Element(e) => render_element(e, scope, out),
            XmlNode::Text(t) => escape_text(t, out),
        }
    }
    render_end_tag(element, scope, out);
}

/// Opens a namespace frame that [`render_end_tag`] closes.
fn render_start_tag(element: &XmlElement, scope: &mut NamespaceScope, out: &mut String) {
    let mut declarations = required_declarations(element, scope);
    declarations.sort_by(|a, b| a.0.cmp(&b.0));

    scope.push_frame();
    out.push('<');
    out.push_str(&element.qualified_name());

    for (prefix, uri) in &declarations {
        if prefix.is_empty() {
            out.push_str(" xmlns=\"");
        } else {
            out.push_str(" xmlns:");
            out.push_str(prefix);
            out.push_str("=\"");
        }
        escape_attribute(uri, out);
        out.push('"');
        scope.declare(prefix, uri);
    }

    let mut attributes: Vec<&XmlAttribute> = element.attributes.iter().collect();
    attributes.sort_by(|a, b| {
        (a.namespace.as_str(), a.local_name.as_str())
            .cmp(&(b.namespace.as_str(), b.local_name.as_str()))
    });
    for attr in attributes {
        out.push(' ');
        if let Some(prefix) = attr.prefix.as_deref().filter(|p| !p.is_empty()) {
            out.push_str(prefix);
            out.push(':');
        }
        out.push_str(&attr.local_name);
        out.push_str("=\"");
        escape_attribute(&attr.value, out);
        out.push('"');
    }
    out.push('>');
}

fn render_end_tag(element: &XmlElement, scope: &mut NamespaceScope, out: &mut String) {
    out.push_str("</");
    out.push_str(&element.qualified_name());
    out.push('>');
    scope.pop_frame();
}
