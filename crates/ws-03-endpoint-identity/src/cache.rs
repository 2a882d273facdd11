//! Certificate identity cache.
//!
//! Maps a primary certificate thumbprint to its endpoint identity and
//! claim set so repeated messages from one signer skip rebuilding them.
//! Lookup-or-insert runs under one lock so concurrent first use builds
//! each entry once.

use crate::certificate::{x509_claim_set, X509CertificateChain};
use crate::identity::EndpointIdentity;
use parking_lot::Mutex;
use shared_types::security::format_certificate_id;
use shared_types::SecurityError;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;
use ws_02_claims::ClaimSet;

/// Default entry limit.
pub const DEFAULT_CAPACITY: usize = 1024;

/// A cached identity and claim set.
#[derive(Debug, Clone)]
pub struct CachedIdentity {
    pub identity: EndpointIdentity,
    pub claim_set: ClaimSet,
}

#[derive(Debug)]
pub struct IdentityCache {
    entries: Mutex<HashMap<[u8; 20], Arc<CachedIdentity>>>,
    capacity: usize,
}

impl Default for IdentityCache {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl IdentityCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            capacity: capacity.max(1),
        }
    }

    /// Cached entry for the chain's primary certificate, building it on
    /// first use. A full cache is cleared before inserting.
    pub fn get_or_insert(
        &self,
        chain: &X509CertificateChain,
    ) -> Result<Arc<CachedIdentity>, SecurityError> {
        let thumbprint = *chain.thumbprint();
        let mut entries = self.entries.lock();
        if let Some(entry) = entries.get(&thumbprint) {
            return Ok(Arc::clone(entry));
        }

        let entry = Arc::new(CachedIdentity {
            identity: EndpointIdentity::x509(chain.clone()),
            claim_set: x509_claim_set(chain)?,
        });
        if entries.len() >= self.capacity {
            debug!(evicted = entries.len(), "identity cache full, clearing");
            entries.clear();
        }
        entries.insert(thumbprint, Arc::clone(&entry));
        debug!(thumbprint = %format_certificate_id(&thumbprint), "identity cache insert");
        Ok(entry)
    }

    pub fn get(&self, thumbprint: &[u8; 20]) -> Option<Arc<CachedIdentity>> {
        self.entries.lock().get(thumbprint).cloned()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    pub fn clear(&self) {
        self.entries.lock().clear();
    }
}
