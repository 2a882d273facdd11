//! # Dictionary Manager
//!
//! A shared table mapping frequent qualified-name parts and algorithm URIs
//! to compact integer codes, plus the binary record codec that uses it.
//!
//! ## Wire Format
//!
//! ```text
//! document  := VERSION element
//! element   := 0x01 string(prefix) string(local) string(ns)
//!              varint(n_attrs) attr*  varint(n_children) node*
//! attr      := string(prefix) string(local) string(ns) string(value)
//! node      := element | 0x02 string(text)
//! string    := 0x00 varint(dictionary_id) | 0x01 varint(len) utf8
//! ```
//!
//! An absent prefix is written as the empty string. Dictionary compression
//! is purely a size optimization: `decode(encode(e)) == e` for every
//! element whose prefixes are non-empty or absent.

use crate::errors::SecurityError;
use crate::namespaces::{algorithm, name, ns, prefix};
use crate::xml::{XmlAttribute, XmlElement, XmlNode};
use std::collections::HashMap;

/// Version byte at the start of every encoded document.
pub const FORMAT_VERSION: u8 = 1;

/// Maximum element nesting accepted by [`DictionaryManager::decode`].
pub const MAX_DECODE_DEPTH: usize = 64;

const RECORD_ELEMENT: u8 = 0x01;
const RECORD_TEXT: u8 = 0x02;
const STRING_DICTIONARY: u8 = 0x00;
const STRING_INLINE: u8 = 0x01;

/// Bidirectional string <-> code table.
#[derive(Debug, Clone, Default)]
pub struct DictionaryManager {
    strings: Vec<String>,
    index: HashMap<String, u32>,
}

impl DictionaryManager {
    /// Empty dictionary: every string is written inline.
    pub fn new() -> Self {
        Self::default()
    }

    /// Dictionary seeded with the XML-DSig, WS-Security, SOAP and identity
    /// vocabulary.
    pub fn ws_security() -> Self {
        let mut dictionary = Self::new();
        for s in [
            ns::DSIG,
            ns::WSSE,
            ns::WSU,
            ns::SOAP12,
            ns::SOAP11,
            ns::IDENTITY,
            prefix::DSIG,
            prefix::WSSE,
            prefix::WSU,
            prefix::SOAP,
            name::IDENTITY,
            name::DNS,
            name::UPN,
            name::SPN,
            name::SIGNATURE,
            name::SIGNED_INFO,
            name::CANONICALIZATION_METHOD,
            name::SIGNATURE_METHOD,
            name::REFERENCE,
            name::TRANSFORMS,
            name::TRANSFORM,
            name::DIGEST_METHOD,
            name::DIGEST_VALUE,
            name::SIGNATURE_VALUE,
            name::KEY_INFO,
            name::KEY_NAME,
            name::X509_DATA,
            name::X509_CERTIFICATE,
            name::ENVELOPE,
            name::HEADER,
            name::BODY,
            name::SECURITY,
            name::TIMESTAMP,
            name::ID,
            name::URI,
            name::ALGORITHM,
            algorithm::EXC_C14N,
            algorithm::SHA1,
            algorithm::SHA256,
            algorithm::SHA512,
            algorithm::HMAC_SHA1,
            algorithm::HMAC_SHA256,
            algorithm::ECDSA_SHA256,
            algorithm::ED25519,
        ] {
            dictionary.add(s);
        }
        dictionary
    }

    /// Add a string, returning its code. Existing strings keep their code.
    pub fn add(&mut self, value: &str) -> u32 {
        if let Some(&id) = self.index.get(value) {
            return id;
        }
        let id = self.strings.len() as u32;
        self.strings.push(value.to_owned());
        self.index.insert(value.to_owned(), id);
        id
    }

    pub fn lookup(&self, value: &str) -> Option<u32> {
        self.index.get(value).copied()
    }

    pub fn resolve(&self, id: u32) -> Option<&str> {
        self.strings.get(id as usize).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.strings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }

    /// Encode an element tree into dictionary-compressed records.
    pub fn encode(&self, element: &XmlElement) -> Vec<u8> {
        let mut out = vec![FORMAT_VERSION];
        self.encode_element(element, &mut out);
        out
    }

    /// Decode records produced by [`DictionaryManager::encode`].
    pub fn decode(&self, bytes: &[u8]) -> Result<XmlElement, SecurityError> {
        let mut reader = RecordReader {
            bytes,
            pos: 0,
            dictionary: self,
        };
        let version = reader.byte()?;
        if version != FORMAT_VERSION {
            return Err(malformed(format!("unsupported format version {version}")));
        }
        if reader.byte()? != RECORD_ELEMENT {
            return Err(malformed("document must start with an element record"));
        }
        let root = reader.element(1)?;
        if reader.pos != bytes.len() {
            return Err(malformed("trailing bytes after root element"));
        }
        Ok(root)
    }

    fn encode_element(&self, element: &XmlElement, out: &mut Vec<u8>) {
        out.push(RECORD_ELEMENT);
        self.encode_string(element.prefix.as_deref().unwrap_or(""), out);
        self.encode_string(&element.local_name, out);
        self.encode_string(&element.namespace, out);

        write_varint(element.attributes.len() as u32, out);
        for attr in &element.attributes {
            self.encode_string(attr.prefix.as_deref().unwrap_or(""), out);
            self.encode_string(&attr.local_name, out);
            self.encode_string(&attr.namespace, out);
            self.encode_string(&attr.value, out);
        }

        write_varint(element.children.len() as u32, out);
        for child in &element.children {
            match child {
                XmlNode::Element(e) => self.encode_element(e, out),
                XmlNode::Text(t) => {
                    out.push(RECORD_TEXT);
                    self.encode_string(t, out);
                }
            }
        }
    }

    fn encode_string(&self, value: &str, out: &mut Vec<u8>) {
        match self.lookup(value) {
            Some(id) => {
                out.push(STRING_DICTIONARY);
                write_varint(id, out);
            }
            None => {
                out.push(STRING_INLINE);
                write_varint(value.len() as u32, out);
                out.extend_from_slice(value.as_bytes());
            }
        }
    }
}

fn malformed(reason: impl Into<String>) -> SecurityError {
    SecurityError::malformed("#binary", "", reason)
}

fn write_varint(mut value: u32, out: &mut Vec<u8>) {
    loop {
        let byte = (value & 0x7F) as u8;
        value >>= 7;
        if value == 0 {
            out.push(byte);
            return;
        }
        out.push(byte | 0x80);
    }
}

struct RecordReader<'a> {
    bytes: &'a [u8],
    pos: usize,
    dictionary: &'a DictionaryManager,
}

impl RecordReader<'_> {
    fn byte(&mut self) -> Result<u8, SecurityError> {
        let b = *self
            .bytes
            .get(self.pos)
            .ok_or_else(|| malformed("unexpected end of data"))?;
        self.pos += 1;
        Ok(b)
    }

    fn varint(&mut self) -> Result<u32, SecurityError> {
        let mut value: u32 = 0;
        for shift in (0..35).step_by(7) {
            let b = self.byte()?;
            let bits = u32::from(b & 0x7F);
            if shift == 28 && bits > 0x0F {
                return Err(malformed("varint overflow"));
            }
            value |= bits << shift;
            if b & 0x80 == 0 {
                return Ok(value);
            }
        }
        Err(malformed("varint too long"))
    }

    fn string(&mut self) -> Result<String, SecurityError> {
        match self.byte()? {
            STRING_DICTIONARY => {
                let id = self.varint()?;
                self.dictionary
                    .resolve(id)
                    .map(str::to_owned)
                    .ok_or_else(|| malformed(format!("unknown dictionary id {id}")))
            }
            STRING_INLINE => {
                let len = self.varint()? as usize;
                let end = self
                    .pos
                    .checked_add(len)
                    .filter(|&end| end <= self.bytes.len())
                    .ok_or_else(|| malformed("string runs past end of data"))?;
                let s = std::str::from_utf8(&self.bytes[self.pos..end])
                    .map_err(|e| malformed(e.to_string()))?
                    .to_owned();
                self.pos = end;
                Ok(s)
            }
            other => Err(malformed(format!("unknown string marker 0x{other:02x}"))),
        }
    }

    fn element(&mut self, depth: usize) -> Result<XmlElement, SecurityError> {
        if depth > MAX_DECODE_DEPTH {
            return Err(malformed(format!("nesting deeper than {MAX_DECODE_DEPTH}")));
        }
        let prefix = self.string()?;
        let local_name = self.string()?;
        let namespace = self.string()?;
        if local_name.is_empty() {
            return Err(malformed("element with empty local name"));
        }
        let mut element = XmlElement::new(
            Some(prefix.as_str()).filter(|p| !p.is_empty()),
            &local_name,
            &namespace,
        );

        let attr_count = self.varint()?;
        for _ in 0..attr_count {
            let prefix = self.string()?;
            let local_name = self.string()?;
            let namespace = self.string()?;
            let value = self.string()?;
            element.attributes.push(XmlAttribute {
                prefix: Some(prefix).filter(|p| !p.is_empty()),
                local_name,
                namespace,
                value,
            });
        }

        let child_count = self.varint()?;
        for _ in 0..child_count {
            match self.byte()? {
                RECORD_ELEMENT => {
                    let child = self.element(depth + 1)?;
                    element.children.push(XmlNode::Element(child));
                }
                RECORD_TEXT => element.children.push(XmlNode::Text(self.string()?)),
                other => return Err(malformed(format!("unknown record 0x{other:02x}"))),
            }
        }
        Ok(element)
    }
}
