//! Security tokens presented with inbound messages.
//!
//! A token binds the claimed identity to the key that must have produced
//! the message signature. Key stores are out of scope; the caller supplies
//! the verifier.

use shared_crypto::MessageVerifier;
use std::fmt;
use std::sync::Arc;
use ws_03_endpoint_identity::{EndpointIdentity, X509CertificateChain};
use ws_04_signature::KeyIdentifier;

#[derive(Clone)]
pub enum SecurityToken {
    /// A certificate chain and the key of its primary certificate.
    X509 {
        chain: X509CertificateChain,
        verifier: Arc<dyn MessageVerifier>,
    },
    /// A DNS, UPN or SPN principal with a named key. Without a key name
    /// any `KeyName` in the signature is accepted.
    Principal {
        identity: EndpointIdentity,
        key_name: Option<String>,
        verifier: Arc<dyn MessageVerifier>,
    },
}

impl SecurityToken {
    pub fn x509(chain: X509CertificateChain, verifier: Arc<dyn MessageVerifier>) -> Self {
        Self::X509 { chain, verifier }
    }

    pub fn principal(
        identity: EndpointIdentity,
        key_name: Option<String>,
        verifier: Arc<dyn MessageVerifier>,
    ) -> Self {
        Self::Principal {
            identity,
            key_name,
            verifier,
        }
    }

    pub fn identity(&self) -> EndpointIdentity {
        match self {
            Self::X509 { chain, .. } => EndpointIdentity::x509(chain.clone()),
            Self::Principal { identity, .. } => identity.clone(),
        }
    }

    pub fn verifier(&self) -> &dyn MessageVerifier {
        match self {
            Self::X509 { verifier, .. } | Self::Principal { verifier, .. } => verifier.as_ref(),
        }
    }

    /// Whether a signature naming `key` may have been made with this
    /// token's key.
    pub fn matches(&self, key: Option<&KeyIdentifier>) -> bool {
        match (self, key) {
            (_, None) => true,
            (Self::X509 { chain, .. }, Some(KeyIdentifier::X509(signed))) => {
                chain.thumbprint() == signed.thumbprint()
            }
            (Self::Principal { key_name, .. }, Some(KeyIdentifier::KeyName(signed))) => {
                key_name.as_deref().map_or(true, |name| name == signed)
            }
            _ => false,
        }
    }
}

impl fmt::Debug for SecurityToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::X509 { chain, verifier } => f
                .debug_struct("X509")
                .field("chain", chain)
                .field("algorithm", &verifier.algorithm())
                .finish(),
            Self::Principal {
                identity,
                key_name,
                verifier,
            } => f
                .debug_struct("Principal")
                .field("identity", identity)
                .field("key_name", key_name)
                .field("algorithm", &verifier.algorithm())
                .finish(),
        }
    }
}
