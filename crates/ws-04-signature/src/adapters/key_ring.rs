//! In-memory key resolver.
//!
//! Keys are registered by `KeyName`, by certificate thumbprint, or as the
//! default for signatures without `KeyInfo`.

use crate::domain::entities::KeyIdentifier;
use crate::ports::outbound::KeyResolver;
use parking_lot::RwLock;
use shared_crypto::{MessageVerifier, SignatureAlgorithm};
use shared_types::security::format_certificate_id;
use shared_types::SecurityError;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

#[derive(Default)]
struct Keys {
    named: HashMap<String, Arc<dyn MessageVerifier>>,
    certificates: HashMap<[u8; 20], Arc<dyn MessageVerifier>>,
    default: Option<Arc<dyn MessageVerifier>>,
}

#[derive(Default)]
pub struct KeyRing {
    keys: RwLock<Keys>,
}

impl KeyRing {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_named(&self, key_name: impl Into<String>, verifier: Arc<dyn MessageVerifier>) {
        self.keys.write().named.insert(key_name.into(), verifier);
    }

    /// Register the verifier for the certificate with this SHA-1 thumbprint.
    pub fn insert_certificate(&self, thumbprint: [u8; 20], verifier: Arc<dyn MessageVerifier>) {
        self.keys.write().certificates.insert(thumbprint, verifier);
    }

    pub fn set_default(&self, verifier: Arc<dyn MessageVerifier>) {
        self.keys.write().default = Some(verifier);
    }

    pub fn remove_named(&self, key_name: &str) -> bool {
        self.keys.write().named.remove(key_name).is_some()
    }

    /// Registered keys, excluding the default.
    pub fn len(&self) -> usize {
        let keys = self.keys.read();
        keys.named.len() + keys.certificates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Debug for KeyRing {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let keys = self.keys.read();
        f.debug_struct("KeyRing")
            .field("named", &keys.named.keys().collect::<Vec<_>>())
            .field("certificates", &keys.certificates.len())
            .field("has_default", &keys.default.is_some())
            .finish()
    }
}

impl KeyResolver for KeyRing {
    fn resolve_verifier(
        &self,
        key: Option<&KeyIdentifier>,
        algorithm: SignatureAlgorithm,
    ) -> Result<Arc<dyn MessageVerifier>, SecurityError> {
        let keys = self.keys.read();
        let (found, described) = match key {
            Some(KeyIdentifier::KeyName(key_name)) => {
                (keys.named.get(key_name), format!("key name '{key_name}'"))
            }
            Some(KeyIdentifier::X509(chain)) => (
                keys.certificates.get(chain.thumbprint()),
                format!("certificate {}", format_certificate_id(chain.thumbprint())),
            ),
            None => (keys.default.as_ref(), "default key".to_owned()),
        };

        match found {
            Some(verifier) => {
                debug!(key = %described, algorithm = algorithm.uri(), "verification key resolved");
                Ok(Arc::clone(verifier))
            }
            None => Err(SecurityError::signature_invalid(format!(
                "no verification key for {described}"
            ))),
        }
    }
}
