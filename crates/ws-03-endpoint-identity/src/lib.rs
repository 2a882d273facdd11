//! # WS-03 Endpoint Identity
//!
//! Who an endpoint claims to be: a DNS name, UPN, SPN or X.509 certificate
//! chain, with structural equality and the WS-Addressing identity
//! extension wire form.
//!
//! ```xml
//! <Identity xmlns="http://schemas.xmlsoap.org/ws/2006/02/addressingidentity">
//!   <Dns>service.example.com</Dns>
//! </Identity>
//! ```
//!
//! Certificate chains also produce claim sets ([`x509_claim_set`]) where each
//! supporting certificate issues the one before it. [`IdentityCache`] keeps
//! those per thumbprint.

pub mod cache;
pub mod certificate;
pub mod identity;

pub use cache::{CachedIdentity, IdentityCache};
pub use certificate::{x509_claim_set, X509Certificate, X509CertificateChain};
pub use identity::{read_identity, EndpointIdentity, IdentityIdentifier};
