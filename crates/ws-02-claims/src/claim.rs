//! Claims and their resources.

use crate::comparer::ComparerKind;
use shared_types::SecurityError;
use std::fmt;

/// Claim type URIs.
pub mod claim_types {
    const BASE: &str = "http://schemas.xmlsoap.org/ws/2005/05/identity/claims";

    pub const ANONYMOUS: &str = "http://schemas.xmlsoap.org/ws/2005/05/identity/claims/anonymous";
    pub const DNS: &str = "http://schemas.xmlsoap.org/ws/2005/05/identity/claims/dns";
    pub const HASH: &str = "http://schemas.xmlsoap.org/ws/2005/05/identity/claims/hash";
    pub const NAME: &str = "http://schemas.xmlsoap.org/ws/2005/05/identity/claims/name";
    pub const RSA: &str = "http://schemas.xmlsoap.org/ws/2005/05/identity/claims/rsa";
    pub const SID: &str = "http://schemas.xmlsoap.org/ws/2005/05/identity/claims/sid";
    pub const SPN: &str = "http://schemas.xmlsoap.org/ws/2005/05/identity/claims/spn";
    pub const SYSTEM: &str = "http://schemas.xmlsoap.org/ws/2005/05/identity/claims/system";
    pub const THUMBPRINT: &str = "http://schemas.xmlsoap.org/ws/2005/05/identity/claims/thumbprint";
    pub const UPN: &str = "http://schemas.xmlsoap.org/ws/2005/05/identity/claims/upn";
    pub const X500_DISTINGUISHED_NAME: &str =
        "http://schemas.xmlsoap.org/ws/2005/05/identity/claims/x500distinguishedname";

    /// True for types under the standard identity claims namespace.
    pub fn is_standard(claim_type: &str) -> bool {
        claim_type
            .strip_prefix(BASE)
            .is_some_and(|rest| rest.starts_with('/'))
    }
}

/// Claim right URIs.
pub mod rights {
    /// The claim identifies the subject.
    pub const IDENTITY: &str = "http://schemas.xmlsoap.org/ws/2005/05/identity/right/identity";
    /// The subject possesses the resource.
    pub const POSSESS_PROPERTY: &str =
        "http://schemas.xmlsoap.org/ws/2005/05/identity/right/possessproperty";
}

/// What a claim is about.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ClaimResource {
    /// A principal name, SID or other string.
    Text(String),
    /// Raw bytes: a certificate hash or thumbprint.
    Binary(Vec<u8>),
    /// An X.500 distinguished name.
    DistinguishedName(String),
    /// An RSA public key.
    RsaKey { modulus: Vec<u8>, exponent: Vec<u8> },
}

impl ClaimResource {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) | Self::DistinguishedName(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Binary(b) => Some(b),
            _ => None,
        }
    }
}

impl fmt::Display for ClaimResource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) | Self::DistinguishedName(s) => f.write_str(s),
            Self::Binary(b) => f.write_str(&hex::encode_upper(b)),
            Self::RsaKey { modulus, .. } => write!(f, "RSA({} bit)", modulus.len() * 8),
        }
    }
}

/// An immutable `(claim_type, right, resource)` assertion.
///
/// `PartialEq` is structural. Type-aware equivalence goes through
/// [`Claim::equals`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Claim {
    claim_type: String,
    right: String,
    resource: ClaimResource,
    comparer: ComparerKind,
}

impl Claim {
    pub fn new(
        claim_type: impl Into<String>,
        resource: ClaimResource,
        right: impl Into<String>,
    ) -> Self {
        let claim_type = claim_type.into();
        Self {
            comparer: ComparerKind::for_claim_type(&claim_type),
            claim_type,
            right: right.into(),
            resource,
        }
    }

    pub fn create_dns_claim(dns: impl Into<String>) -> Self {
        Self::new(claim_types::DNS, ClaimResource::Text(dns.into()), rights::POSSESS_PROPERTY)
    }

    pub fn create_upn_claim(upn: impl Into<String>) -> Self {
        Self::new(claim_types::UPN, ClaimResource::Text(upn.into()), rights::POSSESS_PROPERTY)
    }

    pub fn create_spn_claim(spn: impl Into<String>) -> Self {
        Self::new(claim_types::SPN, ClaimResource::Text(spn.into()), rights::POSSESS_PROPERTY)
    }

    pub fn create_name_claim(name: impl Into<String>) -> Self {
        Self::new(claim_types::NAME, ClaimResource::Text(name.into()), rights::POSSESS_PROPERTY)
    }

    pub fn create_hash_claim(hash: impl Into<Vec<u8>>) -> Self {
        Self::new(claim_types::HASH, ClaimResource::Binary(hash.into()), rights::POSSESS_PROPERTY)
    }

    pub fn create_thumbprint_claim(thumbprint: impl Into<Vec<u8>>) -> Self {
        Self::new(
            claim_types::THUMBPRINT,
            ClaimResource::Binary(thumbprint.into()),
            rights::POSSESS_PROPERTY,
        )
    }

    pub fn create_x500_distinguished_name_claim(name: impl Into<String>) -> Self {
        Self::new(
            claim_types::X500_DISTINGUISHED_NAME,
            ClaimResource::DistinguishedName(name.into()),
            rights::POSSESS_PROPERTY,
        )
    }

    pub fn create_rsa_claim(modulus: Vec<u8>, exponent: Vec<u8>) -> Self {
        Self::new(
            claim_types::RSA,
            ClaimResource::RsaKey { modulus, exponent },
            rights::POSSESS_PROPERTY,
        )
    }

    /// Same claim with a different right.
    pub fn with_right(mut self, right: impl Into<String>) -> Self {
        self.right = right.into();
        self
    }

    pub fn claim_type(&self) -> &str {
        &self.claim_type
    }

    pub fn right(&self) -> &str {
        &self.right
    }

    pub fn resource(&self) -> &ClaimResource {
        &self.resource
    }

    /// Comparer resolved from the claim type at construction.
    pub fn comparer(&self) -> ComparerKind {
        self.comparer
    }

    /// Equivalence under this claim's comparer.
    pub fn equals(&self, other: &Claim) -> Result<bool, SecurityError> {
        self.comparer.equals(self, other)
    }
}

impl fmt::Display for Claim {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.right, self.claim_type)
    }
}
