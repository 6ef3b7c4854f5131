//! Trusted verification keys.
//!
//! Keys are supplied out-of-band by configuration as Base64-encoded SPKI
//! DER and are fixed for the lifetime of the store. Rotation and remote key
//! manifests are out of scope.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use ed25519_dalek::VerifyingKey;
use sha2::{Digest, Sha256};

use crate::error::{FetchError, FetchResult};

/// A trusted key with its fingerprint (used for log attribution).
#[derive(Debug, Clone)]
pub struct TrustedKey {
    /// SHA-256 fingerprint of the SPKI DER (`sha256:...`).
    pub fingerprint: String,

    /// The verification key itself.
    pub key: VerifyingKey,
}

/// Immutable set of trusted signing keys.
#[derive(Debug, Clone, Default)]
pub struct TrustStore {
    keys: Vec<TrustedKey>,
}

impl TrustStore {
    /// Build a store from Base64 SPKI-DER encoded public keys.
    pub fn from_encoded_keys(encoded: &[String]) -> FetchResult<Self> {
        let mut keys = Vec::with_capacity(encoded.len());
        for b64 in encoded {
            keys.push(decode_trusted_key(b64)?);
        }
        Ok(Self { keys })
    }

    /// Build a store from already decoded keys.
    pub fn from_keys(keys: impl IntoIterator<Item = VerifyingKey>) -> FetchResult<Self> {
        use pkcs8::EncodePublicKey;

        let mut out = Vec::new();
        for key in keys {
            let der = key
                .to_public_key_der()
                .map_err(|e| FetchError::Config {
                    message: format!("cannot encode public key: {}", e),
                })?;
            out.push(TrustedKey {
                fingerprint: fingerprint(der.as_bytes()),
                key,
            });
        }
        Ok(Self { keys: out })
    }

    /// All trusted keys.
    pub fn keys(&self) -> &[TrustedKey] {
        &self.keys
    }

    /// Whether no keys are configured.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Number of trusted keys.
    pub fn len(&self) -> usize {
        self.keys.len()
    }
}

/// Decode a Base64-encoded SPKI public key.
fn decode_trusted_key(b64: &str) -> FetchResult<TrustedKey> {
    use pkcs8::DecodePublicKey;

    let der = BASE64.decode(b64).map_err(|e| FetchError::Config {
        message: format!("invalid base64 public key: {}", e),
    })?;

    let key = VerifyingKey::from_public_key_der(&der).map_err(|e| FetchError::Config {
        message: format!("invalid SPKI public key: {}", e),
    })?;

    Ok(TrustedKey {
        fingerprint: fingerprint(&der),
        key,
    })
}

/// SHA-256 fingerprint of SPKI DER bytes.
fn fingerprint(spki_der: &[u8]) -> String {
    format!("sha256:{}", hex::encode(Sha256::digest(spki_der)))
}
