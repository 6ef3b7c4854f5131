//! Detached signature verification.
//!
//! The signature lives in a separate archive entry from the payload it
//! authenticates; verification needs both byte buffers plus the trusted key
//! set. Every internal failure of the cryptographic primitive maps to a
//! negative result, never to an error or panic (fail closed).

use ed25519_dalek::{Signature, Verifier};
use tracing::debug;

use crate::trust::TrustStore;

/// Outcome of checking a detached signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verification {
    /// The signature validates against a trusted key.
    Verified {
        /// Fingerprint of the key that validated.
        key_fingerprint: String,
    },

    /// The signature does not validate. Expected for tampered or foreign
    /// input; a valid negative result, not an error.
    Rejected {
        /// Why the signature was rejected.
        reason: String,
    },
}

impl Verification {
    /// Whether the payload is authentic.
    pub fn is_verified(&self) -> bool {
        matches!(self, Self::Verified { .. })
    }
}

/// Verifies detached signatures against the trusted key set.
///
/// Pure apart from the immutable key set; safe to share across concurrent
/// fetches.
#[derive(Debug, Clone)]
pub struct SignatureVerifier {
    trust: TrustStore,
}

impl SignatureVerifier {
    /// Create a verifier over a trust store.
    pub fn new(trust: TrustStore) -> Self {
        Self { trust }
    }

    /// Boolean form of [`check`](Self::check): true only when some trusted
    /// key validates the signature.
    pub fn verify(&self, payload: &[u8], signature: &[u8]) -> bool {
        self.check(payload, signature).is_verified()
    }

    /// Check a detached signature against every trusted key.
    ///
    /// One success suffices. Malformed signature encodings map to
    /// `Rejected`, as does an empty trust store.
    pub fn check(&self, payload: &[u8], signature: &[u8]) -> Verification {
        if self.trust.is_empty() {
            return Verification::Rejected {
                reason: "no trusted keys configured".to_string(),
            };
        }

        let signature = match Signature::from_slice(signature) {
            Ok(sig) => sig,
            Err(e) => {
                return Verification::Rejected {
                    reason: format!("malformed signature: {}", e),
                };
            }
        };

        for trusted in self.trust.keys() {
            if trusted.key.verify(payload, &signature).is_ok() {
                debug!(key = %trusted.fingerprint, "detached signature verified");
                return Verification::Verified {
                    key_fingerprint: trusted.fingerprint.clone(),
                };
            }
        }

        Verification::Rejected {
            reason: "no trusted key validates the signature".to_string(),
        }
    }
}
