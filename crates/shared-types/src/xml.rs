//! # XML Infoset Model
//!
//! An owned, namespace-resolved subset of the XML infoset: elements,
//! attributes and text. Comments and processing instructions are dropped on
//! parse because nothing in the signed subset depends on them.
//!
//! Every element carries its own namespace URI, so any subtree can be
//! serialized or canonicalized without the context of its ancestors.

use crate::errors::SecurityError;
use crate::namespaces::{name, ns};

/// An attribute with a resolved namespace (empty for unqualified).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlAttribute {
    pub prefix: Option<String>,
    pub local_name: String,
    pub namespace: String,
    pub value: String,
}

impl XmlAttribute {
    /// Unqualified attribute.
    pub fn new(local_name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            prefix: None,
            local_name: local_name.into(),
            namespace: String::new(),
            value: value.into(),
        }
    }

    /// Namespace-qualified attribute.
    pub fn qualified(
        prefix: impl Into<String>,
        local_name: impl Into<String>,
        namespace: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            prefix: Some(prefix.into()),
            local_name: local_name.into(),
            namespace: namespace.into(),
            value: value.into(),
        }
    }
}

/// Element content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XmlNode {
    Element(XmlElement),
    Text(String),
}

/// An element and its subtree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlElement {
    pub prefix: Option<String>,
    pub local_name: String,
    pub namespace: String,
    pub attributes: Vec<XmlAttribute>,
    pub children: Vec<XmlNode>,
}

impl XmlElement {
    pub fn new(prefix: Option<&str>, local_name: &str, namespace: &str) -> Self {
        Self {
            prefix: prefix.map(str::to_owned),
            local_name: local_name.to_owned(),
            namespace: namespace.to_owned(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn with_attribute(mut self, attribute: XmlAttribute) -> Self {
        self.attributes.push(attribute);
        self
    }

    pub fn with_child(mut self, child: XmlElement) -> Self {
        self.children.push(XmlNode::Element(child));
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.children.push(XmlNode::Text(text.into()));
        self
    }

    pub fn push_child(&mut self, child: XmlElement) {
        self.children.push(XmlNode::Element(child));
    }

    /// True if this element has the given expanded name.
    pub fn is(&self, local_name: &str, namespace: &str) -> bool {
        self.local_name == local_name && self.namespace == namespace
    }

    /// `prefix:local` or `local`.
    pub fn qualified_name(&self) -> String {
        match &self.prefix {
            Some(p) if !p.is_empty() => format!("{p}:{}", self.local_name),
            _ => self.local_name.clone(),
        }
    }

    /// Value of an unqualified attribute.
    pub fn attribute(&self, local_name: &str) -> Option<&str> {
        self.attribute_ns(local_name, "")
    }

    /// Value of a namespace-qualified attribute.
    pub fn attribute_ns(&self, local_name: &str, namespace: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.local_name == local_name && a.namespace == namespace)
            .map(|a| a.value.as_str())
    }

    /// The reference id of this element: `wsu:Id`, falling back to `Id`.
    pub fn id(&self) -> Option<&str> {
        self.attribute_ns(name::ID, ns::WSU)
            .or_else(|| self.attribute(name::ID))
    }

    pub fn child_elements(&self) -> impl Iterator<Item = &XmlElement> + '_ {
        self.children.iter().filter_map(|c| match c {
            XmlNode::Element(e) => Some(e),
            XmlNode::Text(_) => None,
        })
    }

    /// First child element with the given expanded name.
    pub fn child(&self, local_name: &str, namespace: &str) -> Option<&XmlElement> {
        self.child_elements().find(|e| e.is(local_name, namespace))
    }

    pub fn child_mut(&mut self, local_name: &str, namespace: &str) -> Option<&mut XmlElement> {
        self.children.iter_mut().find_map(|c| match c {
            XmlNode::Element(e) if e.is(local_name, namespace) => Some(e),
            _ => None,
        })
    }

    /// Concatenated direct text content.
    pub fn text(&self) -> String {
        self.children
            .iter()
            .filter_map(|c| match c {
                XmlNode::Text(t) => Some(t.as_str()),
                XmlNode::Element(_) => None,
            })
            .collect()
    }

    /// True if any direct text child contains non-whitespace.
    pub fn has_significant_text(&self) -> bool {
        self.children.iter().any(|c| match c {
            XmlNode::Text(t) => !t.trim().is_empty(),
            XmlNode::Element(_) => false,
        })
    }

    /// Pre-order walk over this element and every element below it.
    pub fn descendants(&self) -> Descendants<'_> {
        Descendants { stack: vec![self] }
    }

    /// Parse a document and return its root element.
    ///
    /// DTDs are rejected, which shuts out entity expansion attacks.
    pub fn parse(xml: &str) -> Result<Self, SecurityError> {
        let doc = roxmltree::Document::parse(xml)
            .map_err(|e| SecurityError::malformed("#document", "", e.to_string()))?;
        Ok(from_node(doc.root_element()))
    }

    /// Parse UTF-8 bytes. A leading byte-order mark is tolerated.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, SecurityError> {
        let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
        let text = std::str::from_utf8(bytes)
            .map_err(|e| SecurityError::malformed("#document", "", e.to_string()))?;
        Self::parse(text)
    }

    /// Serialize to XML text with the namespace declarations it needs.
    pub fn to_xml_string(&self) -> String {
        let mut out = String::new();
        let mut scope = NamespaceScope::new();
        write_element(self, &mut scope, &mut out);
        out
    }
}

/// Iterator returned by [`XmlElement::descendants`].
pub struct Descendants<'a> {
    stack: Vec<&'a XmlElement>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a XmlElement;

    fn next(&mut self) -> Option<Self::Item> {
        let element = self.stack.pop()?;
        let start = self.stack.len();
        self.stack.extend(element.child_elements());
        self.stack[start..].reverse();
        Some(element)
    }
}

fn from_node(node: roxmltree::Node<'_, '_>) -> XmlElement {
    let tag = node.tag_name();
    let namespace = tag.namespace().unwrap_or("");
    let mut element = XmlElement::new(
        prefix_for(node, namespace),
        tag.name(),
        namespace,
    );

    for attr in node.attributes() {
        let attr_ns = attr.namespace().unwrap_or("");
        element.attributes.push(XmlAttribute {
            prefix: if attr_ns.is_empty() {
                None
            } else {
                prefix_for(node, attr_ns).map(str::to_owned)
            },
            local_name: attr.name().to_owned(),
            namespace: attr_ns.to_owned(),
            value: attr.value().to_owned(),
        });
    }

    for child in node.children() {
        if child.is_element() {
            element.children.push(XmlNode::Element(from_node(child)));
        } else if child.is_text() {
            if let Some(text) = child.text() {
                element.children.push(XmlNode::Text(text.to_owned()));
            }
        }
    }
    element
}

fn prefix_for<'a>(node: roxmltree::Node<'a, '_>, namespace: &str) -> Option<&'a str> {
    if namespace.is_empty() {
        None
    } else {
        node.lookup_prefix(namespace)
    }
}

// =============================================================================
// NAMESPACE SCOPE
// =============================================================================

/// Prefix bindings in effect at a point of an output document.
///
/// The empty prefix is the default namespace. Only bindings this writer has
/// actually emitted are tracked, which is exactly what exclusive
/// canonicalization needs.
#[derive(Debug, Default)]
pub struct NamespaceScope {
    frames: Vec<Vec<(String, String)>>,
}

impl NamespaceScope {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_frame(&mut self) {
        self.frames.push(Vec::new());
    }

    pub fn pop_frame(&mut self) {
        self.frames.pop();
    }

    /// Namespace bound to `prefix`, innermost first.
    pub fn lookup(&self, prefix: &str) -> Option<&str> {
        self.frames
            .iter()
            .rev()
            .flat_map(|f| f.iter().rev())
            .find(|(p, _)| p == prefix)
            .map(|(_, uri)| uri.as_str())
    }

    /// True if rendering `prefix -> uri` here would be redundant.
    pub fn is_bound(&self, prefix: &str, uri: &str) -> bool {
        match self.lookup(prefix) {
            Some(bound) => bound == uri,
            // An unbound default namespace is the empty namespace.
            None => prefix.is_empty() && uri.is_empty(),
        }
    }

    pub fn declare(&mut self, prefix: &str, uri: &str) {
        if self.frames.is_empty() {
            self.push_frame();
        }
        if let Some(frame) = self.frames.last_mut() {
            frame.push((prefix.to_owned(), uri.to_owned()));
        }
    }
}

/// Namespace declarations an element must carry at this point of the
/// output, as `(prefix, uri)` pairs in first-use order.
pub fn required_declarations(element: &XmlElement, scope: &NamespaceScope) -> Vec<(String, String)> {
    let mut needed: Vec<(String, String)> = Vec::new();
    let mut want = |prefix: &str, uri: &str| {
        if prefix == "xml" || needed.iter().any(|(p, _)| p == prefix) {
            return;
        }
        if !scope.is_bound(prefix, uri) {
            needed.push((prefix.to_owned(), uri.to_owned()));
        }
    };

    want(element.prefix.as_deref().unwrap_or(""), &element.namespace);
    for attr in &element.attributes {
        if let Some(prefix) = attr.prefix.as_deref().filter(|p| !p.is_empty()) {
            want(prefix, &attr.namespace);
        }
    }
    needed
}

// =============================================================================
// ESCAPING
// =============================================================================

/// Escape character data.
pub fn escape_text(text: &str, out: &mut String) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\r' => out.push_str("&#xD;"),
            _ => out.push(c),
        }
    }
}

/// Escape an attribute value for a double-quoted attribute.
pub fn escape_attribute(value: &str, out: &mut String) {
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '"' => out.push_str("&quot;"),
            '\t' => out.push_str("&#x9;"),
            '\n' => out.push_str("&#xA;"),
            '\r' => out.push_str("&#xD;"),
            _ => out.push(c),
        }
    }
}

fn attribute_qname(attr: &XmlAttribute) -> String {
    match attr.prefix.as_deref() {
        Some(p) if !p.is_empty() => format!("{p}:{}", attr.local_name),
        _ => attr.local_name.clone(),
    }
}

fn write_element(element: &XmlElement, scope: &mut NamespaceScope, out: &mut String) {
    let declarations = required_declarations(element, scope);
    scope.push_frame();

    let qname = element.qualified_name();
    out.push('<');
    out.push_str(&qname);
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
    for attr in &element.attributes {
        out.push(' ');
        out.push_str(&attribute_qname(attr));
        out.push_str("=\"");
        escape_attribute(&attr.value, out);
        out.push('"');
    }

    if element.children.is_empty() {
        out.push_str("/>");
    } else {
        out.push('>');
        for child in &element.children {
            match child {
                XmlNode::Element(e) => write_element(e, scope, out),
                XmlNode::Text(t) => escape_text(t, out),
            }
        }
        out.push_str("</");
        out.push_str(&qname);
        out.push('>');
    }
    scope.pop_frame();
}
