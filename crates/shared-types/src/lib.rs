//! # Shared Types Crate
//!
//! Types shared by every crate of the message security core:
//!
//! - [`errors`]: the `SecurityError` taxonomy
//! - [`xml`]: the owned XML infoset model the signed subset is expressed in
//! - [`dictionary`]: the dictionary manager and binary record codec
//! - [`namespaces`]: namespace URIs, element names and algorithm identifiers
//! - [`security`]: buffer, unique-id and certificate-id helpers

pub mod dictionary;
pub mod errors;
pub mod namespaces;
pub mod security;
pub mod xml;

pub use dictionary::DictionaryManager;
pub use errors::SecurityError;
pub use xml::{XmlAttribute, XmlElement, XmlNode};
