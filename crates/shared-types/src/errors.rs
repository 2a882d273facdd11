//! # Error Types
//!
//! The security failure taxonomy shared by every crate in the workspace.
//!
//! Security failures are never downgraded: callers see exactly one
//! structured error carrying enough detail (claim type, element name and
//! namespace) to diagnose the problem without exposing key material.

use thiserror::Error;

/// Errors surfaced by the message security core.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SecurityError {
    /// XML or binary wire data is structurally invalid.
    #[error("Malformed wire data in <{element}> ({namespace}): {reason}")]
    MalformedWireData {
        element: String,
        namespace: String,
        reason: String,
    },

    /// An `<Identity>` child that is not one of the recognized kinds.
    #[error("Unrecognized identity kind <{element}> ({namespace})")]
    UnrecognizedIdentityKind { element: String, namespace: String },

    /// Digest or signature value mismatch.
    #[error("Signature invalid: {reason}")]
    SignatureInvalid { reason: String },

    /// A claim comparer that needs platform services was invoked.
    #[error("Claim comparison not supported for claim type {claim_type}")]
    UnsupportedClaimComparison { claim_type: String },

    /// A capability that is not available in this build.
    #[error("Unsupported: {0}")]
    Unsupported(String),

    /// Raised by a caller-supplied authorization policy.
    #[error("Policy {policy_id} failed: {message}")]
    PolicyEvaluationFault { policy_id: String, message: String },

    /// An issuer chain walk exceeded the traversal bound.
    #[error("Issuer chain exceeds maximum depth of {max_depth}")]
    IssuerChainTooDeep { max_depth: usize },

    /// Policy evaluation hit the configured pass limit.
    #[error("Authorization policies did not converge after {passes} passes")]
    EvaluationDidNotConverge { passes: usize },

    /// The output stream rejected a write.
    #[error("I/O error: {0}")]
    Io(String),
}

impl SecurityError {
    /// Shorthand for a [`SecurityError::MalformedWireData`].
    pub fn malformed(
        element: impl Into<String>,
        namespace: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::MalformedWireData {
            element: element.into(),
            namespace: namespace.into(),
            reason: reason.into(),
        }
    }

    /// Shorthand for a [`SecurityError::SignatureInvalid`].
    pub fn signature_invalid(reason: impl Into<String>) -> Self {
        Self::SignatureInvalid {
            reason: reason.into(),
        }
    }

    /// Returns true for failures that mean the message must be rejected
    /// as forged or tampered, as opposed to unparseable or unsupported.
    pub fn is_integrity_failure(&self) -> bool {
        matches!(self, Self::SignatureInvalid { .. })
    }
}

impl From<std::io::Error> for SecurityError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_message_names_element() {
        let err = SecurityError::malformed("Identity", "urn:ns", "empty element");
        let text = err.to_string();
        assert!(text.contains("<Identity>"));
        assert!(text.contains("urn:ns"));
    }

    #[test]
    fn test_integrity_failure_classification() {
        assert!(SecurityError::signature_invalid("digest").is_integrity_failure());
        assert!(!SecurityError::Unsupported("rsa".into()).is_integrity_failure());
    }

    #[test]
    fn test_io_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "closed");
        assert!(matches!(SecurityError::from(io), SecurityError::Io(_)));
    }
}
