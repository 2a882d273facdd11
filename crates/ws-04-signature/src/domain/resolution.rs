//! # Reference Resolution
//!
//! Same-document references are resolved through an index of every
//! `wsu:Id`/`Id` in the document. Building the index fails on the first
//! duplicate, so a reference always has exactly one candidate target.

use shared_types::namespaces::{name, ns};
use shared_types::{SecurityError, XmlElement};
use std::collections::HashMap;

/// Id → element index over one document.
#[derive(Debug)]
pub struct IdIndex<'a> {
    ids: HashMap<&'a str, &'a XmlElement>,
}

impl<'a> IdIndex<'a> {
    /// Index `root` and every element below it.
    pub fn build(root: &'a XmlElement) -> Result<Self, SecurityError> {
        let mut ids = HashMap::new();
        for element in root.descendants() {
            let wsu_id = element.attribute_ns(name::ID, ns::WSU);
            let plain_id = element.attribute(name::ID).filter(|id| Some(*id) != wsu_id);
            for id in wsu_id.into_iter().chain(plain_id) {
                if ids.insert(id, element).is_some() {
                    return Err(SecurityError::malformed(
                        &element.local_name,
                        &element.namespace,
                        format!("duplicate Id '{id}'"),
                    ));
                }
            }
        }
        Ok(Self { ids })
    }

    pub fn get(&self, id: &str) -> Option<&'a XmlElement> {
        self.ids.get(id).copied()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// Header and Body of a SOAP 1.1 or 1.2 envelope.
///
/// The envelope holds exactly one Body and at most one Header, both in the
/// envelope's own SOAP namespace. Anything else is malformed, so the Body a
/// caller checks is the only Body a dispatcher can see.
pub fn soap_parts(
    envelope: &XmlElement,
) -> Result<(Option<&XmlElement>, &XmlElement), SecurityError> {
    if !(envelope.is(name::ENVELOPE, ns::SOAP12) || envelope.is(name::ENVELOPE, ns::SOAP11)) {
        return Err(SecurityError::malformed(
            &envelope.local_name,
            &envelope.namespace,
            "expected a SOAP Envelope",
        ));
    }
    let soap = envelope.namespace.as_str();

    let mut header = None;
    let mut body = None;
    for child in envelope.child_elements() {
        let slot = match child.local_name.as_str() {
            name::HEADER => &mut header,
            name::BODY => &mut body,
            _ => continue,
        };
        if child.namespace != ns::SOAP12 && child.namespace != ns::SOAP11 {
            continue;
        }
        if child.namespace != soap {
            return Err(SecurityError::malformed(
                &child.local_name,
                &child.namespace,
                "SOAP version differs from the Envelope",
            ));
        }
        if slot.replace(child).is_some() {
            return Err(SecurityError::malformed(
                &child.local_name,
                soap,
                format!("more than one {}", child.local_name),
            ));
        }
    }

    let body = body.ok_or_else(|| SecurityError::malformed(name::ENVELOPE, soap, "missing Body"))?;
    Ok((header, body))
}

/// The SOAP `Header` element of a well-formed envelope, if present.
pub fn soap_header(envelope: &XmlElement) -> Result<Option<&XmlElement>, SecurityError> {
    soap_parts(envelope).map(|(header, _)| header)
}

/// The single SOAP `Body` element of a well-formed envelope.
pub fn soap_body(envelope: &XmlElement) -> Result<&XmlElement, SecurityError> {
    soap_parts(envelope).map(|(_, body)| body)
}

/// The `ds:Signature` inside `Header/wsse:Security`. Exactly one is
/// accepted.
pub fn find_security_signature(envelope: &XmlElement) -> Result<&XmlElement, SecurityError> {
    let header = soap_header(envelope)?.ok_or_else(|| {
        SecurityError::malformed(&envelope.local_name, &envelope.namespace, "missing Header")
    })?;
    let security = header.child(name::SECURITY, ns::WSSE).ok_or_else(|| {
        SecurityError::malformed(name::HEADER, &header.namespace, "missing wsse:Security")
    })?;

    let mut signatures = security
        .child_elements()
        .filter(|c| c.is(name::SIGNATURE, ns::DSIG));
    let signature = signatures
        .next()
        .ok_or_else(|| SecurityError::malformed(name::SECURITY, ns::WSSE, "missing ds:Signature"))?;
    if signatures.next().is_some() {
        return Err(SecurityError::malformed(
            name::SECURITY,
            ns::WSSE,
            "more than one ds:Signature",
        ));
    }
    Ok(signature)
}
