//! Opaque X.509 certificates and their claim sets.
//!
//! Certificates are carried as DER bytes. Nothing here parses ASN.1; the
//! SHA-1 thumbprint of the DER is the only derived value.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use shared_types::namespaces::{name, ns};
use shared_types::security::format_certificate_id;
use shared_types::SecurityError;
use std::fmt;
use std::sync::Arc;
use ws_02_claims::{rights, Claim, ClaimSet};

/// A DER-encoded certificate.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct X509Certificate {
    der: Arc<[u8]>,
    thumbprint: [u8; 20],
}

impl X509Certificate {
    pub fn from_der(der: impl Into<Vec<u8>>) -> Result<Self, SecurityError> {
        let der: Vec<u8> = der.into();
        if der.is_empty() {
            return Err(SecurityError::malformed(
                name::X509_CERTIFICATE,
                ns::DSIG,
                "empty certificate",
            ));
        }
        Ok(Self {
            thumbprint: shared_crypto::thumbprint(&der),
            der: der.into(),
        })
    }

    /// Decode the content of an `X509Certificate` element. Whitespace
    /// inside the base64 text is ignored.
    pub fn from_base64(text: &str) -> Result<Self, SecurityError> {
        let compact: String = text.chars().filter(|c| !c.is_ascii_whitespace()).collect();
        let der = STANDARD.decode(compact.as_bytes()).map_err(|e| {
            SecurityError::malformed(name::X509_CERTIFICATE, ns::DSIG, format!("invalid base64: {e}"))
        })?;
        Self::from_der(der)
    }

    pub fn to_base64(&self) -> String {
        STANDARD.encode(&self.der)
    }

    pub fn der(&self) -> &[u8] {
        &self.der
    }

    /// SHA-1 of the DER encoding.
    pub fn thumbprint(&self) -> &[u8; 20] {
        &self.thumbprint
    }
}

impl fmt::Debug for X509Certificate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("X509Certificate")
            .field("thumbprint", &format_certificate_id(&self.thumbprint))
            .field("der_len", &self.der.len())
            .finish()
    }
}

/// A primary certificate followed by its supporting certificates, leaf
/// first.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct X509CertificateChain {
    primary: X509Certificate,
    supporting: Vec<X509Certificate>,
}

impl X509CertificateChain {
    pub fn new(primary: X509Certificate) -> Self {
        Self {
            primary,
            supporting: Vec::new(),
        }
    }

    pub fn with_supporting(primary: X509Certificate, supporting: Vec<X509Certificate>) -> Self {
        Self { primary, supporting }
    }

    /// Build from certificates in wire order; the first is the primary.
    pub fn from_certificates(mut certificates: Vec<X509Certificate>) -> Result<Self, SecurityError> {
        if certificates.is_empty() {
            return Err(SecurityError::malformed(
                name::X509_DATA,
                ns::DSIG,
                "no X509Certificate elements",
            ));
        }
        let primary = certificates.remove(0);
        Ok(Self::with_supporting(primary, certificates))
    }

    pub fn primary(&self) -> &X509Certificate {
        &self.primary
    }

    pub fn supporting(&self) -> &[X509Certificate] {
        &self.supporting
    }

    /// All certificates, primary first.
    pub fn iter(&self) -> impl Iterator<Item = &X509Certificate> {
        std::iter::once(&self.primary).chain(self.supporting.iter())
    }

    /// Thumbprint of the primary certificate.
    pub fn thumbprint(&self) -> &[u8; 20] {
        self.primary.thumbprint()
    }
}

fn certificate_claims(certificate: &X509Certificate) -> Vec<Claim> {
    let identity = Claim::create_thumbprint_claim(certificate.thumbprint().to_vec())
        .with_right(rights::IDENTITY);
    let property = Claim::create_thumbprint_claim(certificate.thumbprint().to_vec());
    let hash = Claim::create_hash_claim(certificate.thumbprint().to_vec());
    vec![identity, property, hash]
}

/// Claim set for the primary certificate. Each supporting certificate is
/// the issuer of the one before it; the last one is self-issued.
pub fn x509_claim_set(chain: &X509CertificateChain) -> Result<ClaimSet, SecurityError> {
    let mut issuer: Option<ClaimSet> = None;
    for certificate in chain.iter().collect::<Vec<_>>().into_iter().rev() {
        let claims = certificate_claims(certificate);
        issuer = Some(match issuer {
            None => ClaimSet::self_issued(claims),
            Some(parent) => ClaimSet::issued_by(claims, &parent)?,
        });
    }
    // The chain always holds the primary.
    Ok(issuer.unwrap_or_else(|| ClaimSet::self_issued(certificate_claims(chain.primary()))))
}
