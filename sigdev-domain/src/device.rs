//! The signature device entity and its external view.

use base64::Engine;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::algorithm::Algorithm;
use crate::error::Error;
use crate::BASE64;

/// A signature device: a stored key pair plus chaining state.
///
/// `signature_counter` and `last_signature` always change together, under the
/// store's per-device lock, once a signing operation has succeeded.
#[derive(Clone)]
pub struct SignatureDevice {
    pub id: Uuid,
    pub label: String,
    pub algorithm: Algorithm,
    /// Private key in the algorithm's DER encoding. Never exposed in views.
    pub private_key: Vec<u8>,
    /// Public key in the algorithm's DER encoding.
    pub public_key: Vec<u8>,
    /// Number of successful signing operations, starting at 0.
    pub signature_counter: u64,
    /// The most recent signature, or the chain seed for a fresh device.
    pub last_signature: Vec<u8>,
}

impl SignatureDevice {
    /// Create a device with a fresh id, a fresh key pair and the chain seed
    /// as its initial last signature.
    pub fn new(algorithm: Algorithm, label: impl Into<String>) -> Result<Self, Error> {
        let keys = algorithm.generate_key_pair()?;
        let id = Uuid::new_v4();
        Ok(Self {
            id,
            label: label.into(),
            algorithm,
            private_key: keys.private_key,
            public_key: keys.public_key,
            signature_counter: 0,
            last_signature: chain_seed(&id),
        })
    }
}

impl std::fmt::Debug for SignatureDevice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignatureDevice")
            .field("id", &self.id)
            .field("label", &self.label)
            .field("algorithm", &self.algorithm)
            .field("signature_counter", &self.signature_counter)
            .finish_non_exhaustive()
    }
}

/// The very first signature's predecessor: the base64-encoded device id.
///
/// Deterministic and device-identifying, so signature 0 of every device has a
/// well-defined, distinct chain input.
pub(crate) fn chain_seed(id: &Uuid) -> Vec<u8> {
    BASE64.encode(id.to_string()).into_bytes()
}

/// External view of a device.
///
/// Excludes the private key and the last signature; only data a client may
/// see crosses this boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceView {
    pub id: Uuid,
    pub label: String,
    pub algorithm: Algorithm,
    pub public_key: Vec<u8>,
    pub signature_counter: u64,
}

impl From<&SignatureDevice> for DeviceView {
    fn from(device: &SignatureDevice) -> Self {
        Self {
            id: device.id,
            label: device.label.clone(),
            algorithm: device.algorithm,
            public_key: device.public_key.clone(),
            signature_counter: device.signature_counter,
        }
    }
}
