//! ECC signature devices: NIST P-256 key pairs with ECDSA/SHA-256 signing.
//!
//! Key material round-trips through standard DER encodings (PKCS#8 for the
//! private half, SPKI for the public half) so it can be stored as opaque
//! bytes. Signatures are ASN.1/DER encoded and use a random nonce, so signing
//! the same payload twice yields different bytes.

use p256::ecdsa::signature::{RandomizedSigner, Verifier};
use p256::ecdsa::{Signature, SigningKey, VerifyingKey};
use p256::pkcs8::{DecodePrivateKey, DecodePublicKey, EncodePrivateKey, EncodePublicKey};
use rand::rngs::OsRng;
use thiserror::Error;

/// Errors from P-256 key handling and signing.
#[derive(Debug, Error)]
pub enum Error {
    #[error("ECC key pair generation failed: {0}")]
    KeyGeneration(String),

    #[error("ECC key material decoding failed: {0}")]
    KeyDecoding(String),

    #[error("ECDSA signing failed: {0}")]
    Signing(String),

    #[error("ECDSA signature verification failed: {0}")]
    Verification(String),
}

/// A P-256 key pair.
pub struct KeyPair {
    signing_key: SigningKey,
}

impl KeyPair {
    /// Generate a fresh key pair from the system randomness source.
    pub fn generate() -> Self {
        Self {
            signing_key: SigningKey::random(&mut OsRng),
        }
    }

    /// Decode a key pair from PKCS#8 DER private-key bytes.
    pub fn from_pkcs8_der(der: &[u8]) -> Result<Self, Error> {
        let signing_key =
            SigningKey::from_pkcs8_der(der).map_err(|e| Error::KeyDecoding(e.to_string()))?;
        Ok(Self { signing_key })
    }

    /// Encode the private half as PKCS#8 DER.
    pub fn private_key_der(&self) -> Result<Vec<u8>, Error> {
        let doc = self
            .signing_key
            .to_pkcs8_der()
            .map_err(|e| Error::KeyGeneration(e.to_string()))?;
        Ok(doc.as_bytes().to_vec())
    }

    /// Encode the public half as SPKI DER.
    pub fn public_key_der(&self) -> Result<Vec<u8>, Error> {
        let doc = self
            .signing_key
            .verifying_key()
            .to_public_key_der()
            .map_err(|e| Error::KeyGeneration(e.to_string()))?;
        Ok(doc.into_vec())
    }

    /// Sign a payload: SHA-256 digest, ECDSA with a random nonce, DER output.
    pub fn sign(&self, payload: &[u8]) -> Result<Vec<u8>, Error> {
        let signature: Signature = self
            .signing_key
            .try_sign_with_rng(&mut OsRng, payload)
            .map_err(|e| Error::Signing(e.to_string()))?;
        Ok(signature.to_der().as_bytes().to_vec())
    }

    /// The verifying (public) key.
    pub fn verifying_key(&self) -> VerifyingKey {
        *self.signing_key.verifying_key()
    }
}

impl std::fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyPair")
            .field("verifying_key", &self.signing_key.verifying_key())
            .finish_non_exhaustive()
    }
}

/// Verify a DER-encoded ECDSA signature against SPKI DER public-key bytes.
pub fn verify(public_key_der: &[u8], payload: &[u8], signature_der: &[u8]) -> Result<(), Error> {
    let verifying_key = VerifyingKey::from_public_key_der(public_key_der)
        .map_err(|e| Error::KeyDecoding(e.to_string()))?;
    let signature =
        Signature::from_der(signature_der).map_err(|e| Error::Verification(e.to_string()))?;
    verifying_key
        .verify(payload, &signature)
        .map_err(|e| Error::Verification(e.to_string()))
}
