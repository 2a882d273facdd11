//! # Domain Entities
//!
//! The XML-DSig structures this engine produces and consumes, with their
//! element mappings.
//!
//! ```xml
//! <ds:Signature Id="...">
//!   <ds:SignedInfo>
//!     <ds:CanonicalizationMethod Algorithm="exc-c14n"/>
//!     <ds:SignatureMethod Algorithm="..."/>
//!     <ds:Reference URI="#body">
//!       <ds:Transforms><ds:Transform Algorithm="exc-c14n"/></ds:Transforms>
//!       <ds:DigestMethod Algorithm="..."/>
//!       <ds:DigestValue>base64</ds:DigestValue>
//!     </ds:Reference>
//!   </ds:SignedInfo>
//!   <ds:SignatureValue>base64</ds:SignatureValue>
//!   <ds:KeyInfo>...</ds:KeyInfo>
//! </ds:Signature>
//! ```

use base64::{engine::general_purpose::STANDARD, Engine as _};
use shared_crypto::{DigestAlgorithm, SignatureAlgorithm};
use shared_types::namespaces::{algorithm, name, ns, prefix};
use shared_types::{DictionaryManager, SecurityError, XmlAttribute, XmlElement};
use ws_03_endpoint_identity::{X509Certificate, X509CertificateChain};

// =============================================================================
// HELPERS
// =============================================================================

fn ds(local: &str) -> XmlElement {
    XmlElement::new(Some(prefix::DSIG), local, ns::DSIG)
}

fn ds_with_algorithm(local: &str, uri: &str) -> XmlElement {
    ds(local).with_attribute(XmlAttribute::new(name::ALGORITHM, uri))
}

fn missing(parent: &XmlElement, local: &str) -> SecurityError {
    SecurityError::malformed(
        &parent.local_name,
        &parent.namespace,
        format!("missing {local}"),
    )
}

fn required<'a>(parent: &'a XmlElement, local: &str) -> Result<&'a XmlElement, SecurityError> {
    parent
        .child(local, ns::DSIG)
        .ok_or_else(|| missing(parent, local))
}

fn algorithm_of(element: &XmlElement) -> Result<&str, SecurityError> {
    element
        .attribute(name::ALGORITHM)
        .ok_or_else(|| missing(element, name::ALGORITHM))
}

fn expect_element(element: &XmlElement, local: &str) -> Result<(), SecurityError> {
    if element.is(local, ns::DSIG) {
        Ok(())
    } else {
        Err(SecurityError::malformed(
            &element.local_name,
            &element.namespace,
            format!("expected ds:{local}"),
        ))
    }
}

fn decode_base64(element: &XmlElement) -> Result<Vec<u8>, SecurityError> {
    let compact: String = element
        .text()
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect();
    STANDARD.decode(compact.as_bytes()).map_err(|e| {
        SecurityError::malformed(&element.local_name, &element.namespace, format!("invalid base64: {e}"))
    })
}

fn unsupported_algorithm(element: &XmlElement, uri: &str) -> SecurityError {
    SecurityError::Unsupported(format!("{} algorithm {uri}", element.local_name))
}

// =============================================================================
// REFERENCE
// =============================================================================

/// A digest over one same-document element.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Reference {
    uri: String,
    transforms: Vec<String>,
    digest_algorithm: DigestAlgorithm,
    digest_value: Vec<u8>,
}

impl Reference {
    /// Reference to the element with `id`, canonicalized with exclusive
    /// C14N.
    pub fn new(id: &str, digest_algorithm: DigestAlgorithm, digest_value: Vec<u8>) -> Self {
        Self {
            uri: format!("#{id}"),
            transforms: vec![algorithm::EXC_C14N.to_owned()],
            digest_algorithm,
            digest_value,
        }
    }

    pub fn uri(&self) -> &str {
        &self.uri
    }

    /// Target id, or `None` for anything but a same-document reference.
    pub fn target_id(&self) -> Option<&str> {
        self.uri.strip_prefix('#').filter(|id| !id.is_empty())
    }

    pub fn transforms(&self) -> &[String] {
        &self.transforms
    }

    pub fn digest_algorithm(&self) -> DigestAlgorithm {
        self.digest_algorithm
    }

    pub fn digest_value(&self) -> &[u8] {
        &self.digest_value
    }

    /// The canonical form is exclusive C14N; an absent transform list means
    /// the same thing for an element reference.
    pub fn uses_exclusive_c14n(&self) -> bool {
        self.transforms.iter().all(|t| t == algorithm::EXC_C14N)
    }

    pub fn to_element(&self) -> XmlElement {
        let mut reference = ds(name::REFERENCE).with_attribute(XmlAttribute::new(name::URI, &self.uri));
        if !self.transforms.is_empty() {
            let mut transforms = ds(name::TRANSFORMS);
            for uri in &self.transforms {
                transforms.push_child(ds_with_algorithm(name::TRANSFORM, uri));
            }
            reference.push_child(transforms);
        }
        reference
            .with_child(ds_with_algorithm(name::DIGEST_METHOD, self.digest_algorithm.uri()))
            .with_child(ds(name::DIGEST_VALUE).with_text(STANDARD.encode(&self.digest_value)))
    }

    pub fn from_element(element: &XmlElement) -> Result<Self, SecurityError> {
        expect_element(element, name::REFERENCE)?;
        let uri = element
            .attribute(name::URI)
            .ok_or_else(|| missing(element, name::URI))?
            .to_owned();

        let transforms = match element.child(name::TRANSFORMS, ns::DSIG) {
            Some(list) => list
                .child_elements()
                .map(|t| {
                    expect_element(t, name::TRANSFORM)?;
                    algorithm_of(t).map(str::to_owned)
                })
                .collect::<Result<Vec<_>, _>>()?,
            None => Vec::new(),
        };

        let method = required(element, name::DIGEST_METHOD)?;
        let method_uri = algorithm_of(method)?;
        let digest_algorithm = DigestAlgorithm::from_uri(method_uri)
            .map_err(|_| unsupported_algorithm(method, method_uri))?;
        let digest_value = decode_base64(required(element, name::DIGEST_VALUE)?)?;

        Ok(Self {
            uri,
            transforms,
            digest_algorithm,
            digest_value,
        })
    }
}

// =============================================================================
// SIGNED INFO
// =============================================================================

/// The signed part of a signature.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SignedInfo {
    canonicalization_method: String,
    signature_algorithm: SignatureAlgorithm,
    references: Vec<Reference>,
}

impl SignedInfo {
    pub fn new(signature_algorithm: SignatureAlgorithm, references: Vec<Reference>) -> Self {
        Self {
            canonicalization_method: algorithm::EXC_C14N.to_owned(),
            signature_algorithm,
            references,
        }
    }

    pub fn canonicalization_method(&self) -> &str {
        &self.canonicalization_method
    }

    pub fn signature_algorithm(&self) -> SignatureAlgorithm {
        self.signature_algorithm
    }

    pub fn references(&self) -> &[Reference] {
        &self.references
    }

    pub fn to_element(&self) -> XmlElement {
        let mut signed_info = ds(name::SIGNED_INFO)
            .with_child(ds_with_algorithm(
                name::CANONICALIZATION_METHOD,
                &self.canonicalization_method,
            ))
            .with_child(ds_with_algorithm(
                name::SIGNATURE_METHOD,
                self.signature_algorithm.uri(),
            ));
        for reference in &self.references {
            signed_info.push_child(reference.to_element());
        }
        signed_info
    }

    pub fn from_element(element: &XmlElement) -> Result<Self, SecurityError> {
        expect_element(element, name::SIGNED_INFO)?;
        let canonicalization_method =
            algorithm_of(required(element, name::CANONICALIZATION_METHOD)?)?.to_owned();

        let method = required(element, name::SIGNATURE_METHOD)?;
        let method_uri = algorithm_of(method)?;
        let signature_algorithm = SignatureAlgorithm::from_uri(method_uri)
            .map_err(|_| unsupported_algorithm(method, method_uri))?;

        let references = element
            .child_elements()
            .filter(|c| c.is(name::REFERENCE, ns::DSIG))
            .map(Reference::from_element)
            .collect::<Result<Vec<_>, _>>()?;
        if references.is_empty() {
            return Err(missing(element, name::REFERENCE));
        }

        Ok(Self {
            canonicalization_method,
            signature_algorithm,
            references,
        })
    }
}

// =============================================================================
// KEY INFO
// =============================================================================

/// How a signature names its verification key.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum KeyIdentifier {
    /// `ds:KeyName`
    KeyName(String),
    /// `ds:X509Data`, primary certificate first.
    X509(X509CertificateChain),
}

impl KeyIdentifier {
    pub fn to_element(&self) -> XmlElement {
        let child = match self {
            Self::KeyName(key_name) => ds(name::KEY_NAME).with_text(key_name.as_str()),
            Self::X509(chain) => {
                let mut data = ds(name::X509_DATA);
                for certificate in chain.iter() {
                    data.push_child(ds(name::X509_CERTIFICATE).with_text(certificate.to_base64()));
                }
                data
            }
        };
        ds(name::KEY_INFO).with_child(child)
    }

    pub fn from_element(element: &XmlElement) -> Result<Self, SecurityError> {
        expect_element(element, name::KEY_INFO)?;
        let child = element
            .child_elements()
            .next()
            .ok_or_else(|| missing(element, "key identifier"))?;

        if child.is(name::KEY_NAME, ns::DSIG) {
            let key_name = child.text().trim().to_owned();
            if key_name.is_empty() {
                return Err(SecurityError::malformed(name::KEY_NAME, ns::DSIG, "empty key name"));
            }
            Ok(Self::KeyName(key_name))
        } else if child.is(name::X509_DATA, ns::DSIG) {
            let certificates = child
                .child_elements()
                .filter(|c| c.is(name::X509_CERTIFICATE, ns::DSIG))
                .map(|c| X509Certificate::from_base64(&c.text()))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Self::X509(X509CertificateChain::from_certificates(certificates)?))
        } else {
            Err(SecurityError::Unsupported(format!(
                "KeyInfo child {}",
                child.qualified_name()
            )))
        }
    }
}

// =============================================================================
// SIGNATURE
// =============================================================================

/// The signature-value capability: an optional id, the raw value, and a
/// dictionary-compressed binary form.
pub trait SignatureValueElement {
    fn has_id(&self) -> bool {
        self.id().is_some()
    }

    fn id(&self) -> Option<&str>;

    /// Binary record form, with names and URIs from `dictionary` written as
    /// integer codes.
    fn write_to(&self, dictionary: &DictionaryManager) -> Vec<u8>;

    fn signature_value(&self) -> &[u8];
}

/// A complete `ds:Signature`.
///
/// A parsed signature keeps its `SignedInfo` element exactly as received;
/// that element, not a re-serialization of [`SignedInfo`], is what the
/// signature value is checked against.
#[derive(Clone, Debug, PartialEq)]
pub struct Signature {
    id: Option<String>,
    signed_info: SignedInfo,
    signed_info_element: XmlElement,
    signature_value: Vec<u8>,
    key_info: Option<KeyIdentifier>,
}

impl Signature {
    pub fn new(
        id: Option<String>,
        signed_info: SignedInfo,
        signature_value: Vec<u8>,
        key_info: Option<KeyIdentifier>,
    ) -> Self {
        Self {
            id,
            signed_info_element: signed_info.to_element(),
            signed_info,
            signature_value,
            key_info,
        }
    }

    pub fn signed_info(&self) -> &SignedInfo {
        &self.signed_info
    }

    pub fn signed_info_element(&self) -> &XmlElement {
        &self.signed_info_element
    }

    pub fn key_info(&self) -> Option<&KeyIdentifier> {
        self.key_info.as_ref()
    }

    pub fn to_element(&self) -> XmlElement {
        let mut signature = ds(name::SIGNATURE);
        if let Some(id) = &self.id {
            signature = signature.with_attribute(XmlAttribute::new(name::ID, id));
        }
        signature.push_child(self.signed_info_element.clone());
        signature.push_child(
            ds(name::SIGNATURE_VALUE).with_text(STANDARD.encode(&self.signature_value)),
        );
        if let Some(key_info) = &self.key_info {
            signature.push_child(key_info.to_element());
        }
        signature
    }

    pub fn read_from(element: &XmlElement) -> Result<Self, SecurityError> {
        expect_element(element, name::SIGNATURE)?;
        let signed_info_element = required(element, name::SIGNED_INFO)?;
        let signed_info = SignedInfo::from_element(signed_info_element)?;
        let signature_value = decode_base64(required(element, name::SIGNATURE_VALUE)?)?;
        if signature_value.is_empty() {
            return Err(SecurityError::malformed(
                name::SIGNATURE_VALUE,
                ns::DSIG,
                "empty signature value",
            ));
        }
        let key_info = element
            .child(name::KEY_INFO, ns::DSIG)
            .map(KeyIdentifier::from_element)
            .transpose()?;

        Ok(Self {
            id: element.attribute(name::ID).map(str::to_owned),
            signed_info,
            signed_info_element: signed_info_element.clone(),
            signature_value,
            key_info,
        })
    }

    /// Decode the binary record form written by
    /// [`SignatureValueElement::write_to`].
    pub fn read_binary(bytes: &[u8], dictionary: &DictionaryManager) -> Result<Self, SecurityError> {
        Self::read_from(&dictionary.decode(bytes)?)
    }
}

impl SignatureValueElement for Signature {
    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn write_to(&self, dictionary: &DictionaryManager) -> Vec<u8> {
        dictionary.encode(&self.to_element())
    }

    fn signature_value(&self) -> &[u8] {
        &self.signature_value
    }
}

// =============================================================================
// VERIFICATION RESULTS
// =============================================================================

/// What a successful verification established.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VerifiedSignature {
    pub signature_algorithm: SignatureAlgorithm,
    /// Ids of the verified references, in signature order.
    pub referenced_ids: Vec<String>,
    pub key_info: Option<KeyIdentifier>,
}

impl VerifiedSignature {
    pub fn covers(&self, id: &str) -> bool {
        self.referenced_ids.iter().any(|r| r == id)
    }
}

/// Result of verifying independent messages.
#[derive(Debug)]
pub struct BatchVerificationResult {
    /// Individual results, in request order
    pub results: Vec<Result<VerifiedSignature, SecurityError>>,
    /// Whether all verifications passed
    pub all_valid: bool,
    /// Count of valid signatures
    pub valid_count: usize,
    /// Count of invalid signatures
    pub invalid_count: usize,
}

impl BatchVerificationResult {
    /// Create a batch result from individual results.
    pub fn from_results(results: Vec<Result<VerifiedSignature, SecurityError>>) -> Self {
        let valid_count = results.iter().filter(|r| r.is_ok()).count();
        let invalid_count = results.len() - valid_count;
        Self {
            results,
            all_valid: invalid_count == 0,
            valid_count,
            invalid_count,
        }
    }
}
