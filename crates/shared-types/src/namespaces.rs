//! # Namespaces and Algorithm Identifiers
//!
//! Well-known XML namespaces, element names and XML-DSig algorithm URIs.
//! The dictionary manager is seeded from these tables, so anything added
//! here becomes dictionary-compressible on the binary wire form.

/// XML namespace URIs.
pub mod ns {
    /// XML Digital Signature.
    pub const DSIG: &str = "http://www.w3.org/2000/09/xmldsig#";
    /// WS-Security 1.0 secext.
    pub const WSSE: &str =
        "http://docs.oasis-open.org/wss/2004/01/oasis-200401-wss-wssecurity-secext-1.0.xsd";
    /// WS-Security utility (`wsu:Id`, `wsu:Timestamp`).
    pub const WSU: &str =
        "http://docs.oasis-open.org/wss/2004/01/oasis-200401-wss-wssecurity-utility-1.0.xsd";
    /// SOAP 1.2 envelope.
    pub const SOAP12: &str = "http://www.w3.org/2003/05/soap-envelope";
    /// SOAP 1.1 envelope.
    pub const SOAP11: &str = "http://schemas.xmlsoap.org/soap/envelope/";
    /// WS-Addressing identity extension.
    pub const IDENTITY: &str = "http://schemas.xmlsoap.org/ws/2006/02/addressingidentity";
    /// The reserved `xml:` prefix namespace.
    pub const XML: &str = "http://www.w3.org/XML/1998/namespace";
}

/// Conventional prefixes used when this crate writes XML.
pub mod prefix {
    pub const DSIG: &str = "ds";
    pub const WSSE: &str = "wsse";
    pub const WSU: &str = "wsu";
    pub const SOAP: &str = "s";
}

/// Element and attribute local names.
pub mod name {
    pub const IDENTITY: &str = "Identity";
    pub const DNS: &str = "Dns";
    pub const UPN: &str = "Upn";
    pub const SPN: &str = "Spn";
    pub const RSA: &str = "Rsa";

    pub const SIGNATURE: &str = "Signature";
    pub const SIGNED_INFO: &str = "SignedInfo";
    pub const CANONICALIZATION_METHOD: &str = "CanonicalizationMethod";
    pub const SIGNATURE_METHOD: &str = "SignatureMethod";
    pub const REFERENCE: &str = "Reference";
    pub const TRANSFORMS: &str = "Transforms";
    pub const TRANSFORM: &str = "Transform";
    pub const DIGEST_METHOD: &str = "DigestMethod";
    pub const DIGEST_VALUE: &str = "DigestValue";
    pub const SIGNATURE_VALUE: &str = "SignatureValue";
    pub const KEY_INFO: &str = "KeyInfo";
    pub const KEY_NAME: &str = "KeyName";
    pub const KEY_VALUE: &str = "KeyValue";
    pub const RSA_KEY_VALUE: &str = "RSAKeyValue";
    pub const X509_DATA: &str = "X509Data";
    pub const X509_CERTIFICATE: &str = "X509Certificate";

    pub const ENVELOPE: &str = "Envelope";
    pub const HEADER: &str = "Header";
    pub const BODY: &str = "Body";
    pub const SECURITY: &str = "Security";
    pub const TIMESTAMP: &str = "Timestamp";
    pub const CREATED: &str = "Created";
    pub const EXPIRES: &str = "Expires";

    pub const ID: &str = "Id";
    pub const URI: &str = "URI";
    pub const ALGORITHM: &str = "Algorithm";
}

/// XML-DSig algorithm URIs.
pub mod algorithm {
    pub const EXC_C14N: &str = "http://www.w3.org/2001/10/xml-exc-c14n#";

    pub const SHA1: &str = "http://www.w3.org/2000/09/xmldsig#sha1";
    pub const SHA256: &str = "http://www.w3.org/2001/04/xmlenc#sha256";
    pub const SHA512: &str = "http://www.w3.org/2001/04/xmlenc#sha512";

    pub const HMAC_SHA1: &str = "http://www.w3.org/2000/09/xmldsig#hmac-sha1";
    pub const HMAC_SHA256: &str = "http://www.w3.org/2001/04/xmldsig-more#hmac-sha256";
    pub const ECDSA_SHA256: &str = "http://www.w3.org/2001/04/xmldsig-more#ecdsa-sha256";
    pub const ED25519: &str = "http://www.w3.org/2021/04/xmldsig-more#eddsa-ed25519";
    pub const RSA_SHA256: &str = "http://www.w3.org/2001/04/xmldsig-more#rsa-sha256";
}
