//! Endpoint identities and the identity extension wire form.

use crate::certificate::{X509Certificate, X509CertificateChain};
use shared_types::namespaces::{name, ns};
use shared_types::security::format_certificate_id;
use shared_types::{SecurityError, XmlElement};
use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};
use tracing::debug;
use ws_02_claims::{claim_types, Claim};

/// The value an identity is keyed on.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum IdentityIdentifier {
    /// A DNS name or principal name.
    Name(String),
    /// SHA-1 thumbprint of a primary certificate.
    CertificateHash([u8; 20]),
}

impl fmt::Display for IdentityIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Name(name) => f.write_str(name),
            Self::CertificateHash(hash) => f.write_str(&format_certificate_id(hash)),
        }
    }
}

/// Who an endpoint claims to be.
#[derive(Debug, Clone)]
pub enum EndpointIdentity {
    Dns(String),
    Upn(String),
    Spn(String),
    X509(X509CertificateChain),
}

impl EndpointIdentity {
    pub fn dns(name: impl Into<String>) -> Self {
        Self::Dns(name.into())
    }

    pub fn upn(name: impl Into<String>) -> Self {
        Self::Upn(name.into())
    }

    pub fn spn(name: impl Into<String>) -> Self {
        Self::Spn(name.into())
    }

    pub fn x509(chain: X509CertificateChain) -> Self {
        Self::X509(chain)
    }

    /// Identity asserted by a claim. Only name-valued claim types map to an
    /// identity; a thumbprint alone cannot rebuild a certificate chain.
    pub fn from_claim(claim: &Claim) -> Result<Self, SecurityError> {
        let text = || {
            claim.resource().as_text().map(str::to_owned).ok_or_else(|| {
                SecurityError::Unsupported(format!(
                    "identity from non-text {} claim",
                    claim.claim_type()
                ))
            })
        };
        match claim.claim_type() {
            claim_types::DNS => Ok(Self::Dns(text()?)),
            claim_types::UPN => Ok(Self::Upn(text()?)),
            claim_types::SPN => Ok(Self::Spn(text()?)),
            other => Err(SecurityError::Unsupported(format!("identity from {other} claim"))),
        }
    }

    fn tag(&self) -> u64 {
        match self {
            Self::Dns(_) => 1,
            Self::Upn(_) => 2,
            Self::Spn(_) => 3,
            Self::X509(_) => 4,
        }
    }

    pub fn identifier(&self) -> IdentityIdentifier {
        match self {
            Self::Dns(s) | Self::Upn(s) | Self::Spn(s) => IdentityIdentifier::Name(s.clone()),
            Self::X509(chain) => IdentityIdentifier::CertificateHash(*chain.thumbprint()),
        }
    }

    /// The claim this identity stands for.
    pub fn identity_claim(&self) -> Claim {
        match self {
            Self::Dns(s) => Claim::create_dns_claim(s.as_str()),
            Self::Upn(s) => Claim::create_upn_claim(s.as_str()),
            Self::Spn(s) => Claim::create_spn_claim(s.as_str()),
            Self::X509(chain) => Claim::create_thumbprint_claim(chain.thumbprint().to_vec()),
        }
    }

    /// Variant tag XOR identifier hash.
    pub fn hash_code(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.identifier().hash(&mut hasher);
        self.tag() ^ hasher.finish()
    }

    /// `<Identity>` element wrapping [`write_contents_to`](Self::write_contents_to).
    pub fn write_to(&self) -> XmlElement {
        let mut identity = XmlElement::new(None, name::IDENTITY, ns::IDENTITY);
        self.write_contents_to(&mut identity);
        identity
    }

    /// Append this identity's child element to `parent`.
    pub fn write_contents_to(&self, parent: &mut XmlElement) {
        let principal = |local: &str, value: &str| {
            XmlElement::new(None, local, ns::IDENTITY).with_text(value)
        };
        let child = match self {
            Self::Dns(s) => principal(name::DNS, s.as_str()),
            Self::Upn(s) => principal(name::UPN, s.as_str()),
            Self::Spn(s) => principal(name::SPN, s.as_str()),
            Self::X509(chain) => {
                let mut data = XmlElement::new(None, name::X509_DATA, ns::DSIG);
                for certificate in chain.iter() {
                    data.push_child(
                        XmlElement::new(None, name::X509_CERTIFICATE, ns::DSIG)
                            .with_text(certificate.to_base64()),
                    );
                }
                XmlElement::new(None, name::KEY_INFO, ns::DSIG).with_child(data)
            }
        };
        parent.push_child(child);
    }
}

impl PartialEq for EndpointIdentity {
    fn eq(&self, other: &Self) -> bool {
        self.tag() == other.tag() && self.identifier() == other.identifier()
    }
}

impl Eq for EndpointIdentity {}

impl Hash for EndpointIdentity {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.hash_code());
    }
}

impl fmt::Display for EndpointIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.identifier().fmt(f)
    }
}

// =============================================================================
// READING
// =============================================================================

/// Parse an `<Identity>` element holding exactly one recognized child.
pub fn read_identity(element: &XmlElement) -> Result<EndpointIdentity, SecurityError> {
    if !element.is(name::IDENTITY, ns::IDENTITY) {
        return Err(SecurityError::malformed(
            &element.local_name,
            &element.namespace,
            "expected Identity element",
        ));
    }
    if element.has_significant_text() {
        return Err(identity_error("unexpected text content"));
    }

    let mut children = element.child_elements();
    let child = children.next().ok_or_else(|| identity_error("empty Identity element"))?;
    if children.next().is_some() {
        return Err(identity_error("more than one identity child"));
    }

    let identity = match (child.namespace.as_str(), child.local_name.as_str()) {
        (ns::IDENTITY, name::DNS) => EndpointIdentity::Dns(read_principal(child)?),
        (ns::IDENTITY, name::UPN) => EndpointIdentity::Upn(read_principal(child)?),
        (ns::IDENTITY, name::SPN) => EndpointIdentity::Spn(read_principal(child)?),
        (ns::DSIG, name::KEY_INFO) => EndpointIdentity::X509(read_key_info(child)?),
        _ => return Err(unrecognized(child)),
    };
    debug!(kind = %child.local_name, identifier = %identity, "read endpoint identity");
    Ok(identity)
}

fn identity_error(reason: &str) -> SecurityError {
    SecurityError::malformed(name::IDENTITY, ns::IDENTITY, reason)
}

fn unrecognized(element: &XmlElement) -> SecurityError {
    SecurityError::UnrecognizedIdentityKind {
        element: element.local_name.clone(),
        namespace: element.namespace.clone(),
    }
}

fn read_principal(element: &XmlElement) -> Result<String, SecurityError> {
    if element.child_elements().next().is_some() {
        return Err(SecurityError::malformed(
            &element.local_name,
            &element.namespace,
            "unexpected child element",
        ));
    }
    let text = element.text();
    let text = text.trim();
    if text.is_empty() {
        return Err(SecurityError::malformed(
            &element.local_name,
            &element.namespace,
            "empty principal name",
        ));
    }
    Ok(text.to_owned())
}

/// `KeyInfo/X509Data/X509Certificate+`. Any other key form, including RSA
/// key values, is not a recognized identity.
fn read_key_info(key_info: &XmlElement) -> Result<X509CertificateChain, SecurityError> {
    let mut children = key_info.child_elements();
    let data = children
        .next()
        .ok_or_else(|| SecurityError::malformed(name::KEY_INFO, ns::DSIG, "empty KeyInfo"))?;
    if !data.is(name::X509_DATA, ns::DSIG) {
        return Err(unrecognized(data));
    }
    if let Some(extra) = children.next() {
        return Err(unrecognized(extra));
    }

    let mut certificates = Vec::new();
    for child in data.child_elements() {
        if !child.is(name::X509_CERTIFICATE, ns::DSIG) {
            return Err(unrecognized(child));
        }
        certificates.push(X509Certificate::from_base64(&child.text())?);
    }
    X509CertificateChain::from_certificates(certificates)
}
