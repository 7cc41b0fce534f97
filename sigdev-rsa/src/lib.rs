//! RSA signature devices: 2048-bit key pairs with PKCS#1 v1.5/SHA-256 signing.
//!
//! Key material round-trips through standard DER encodings (PKCS#8 for the
//! private half, SPKI for the public half). PKCS#1 v1.5 signing is
//! deterministic: the same key and payload always produce the same bytes.

use rand::rngs::OsRng;
use rsa::pkcs1v15::{Signature, SigningKey, VerifyingKey};
use rsa::pkcs8::{DecodePrivateKey, DecodePublicKey, EncodePrivateKey, EncodePublicKey};
use rsa::sha2::Sha256;
use rsa::signature::{SignatureEncoding, Signer, Verifier};
use rsa::{RsaPrivateKey, RsaPublicKey};
use thiserror::Error;

/// Modulus size for generated keys.
pub const KEY_BITS: usize = 2048;

/// Errors from RSA key handling and signing.
#[derive(Debug, Error)]
pub enum Error {
    #[error("RSA key pair generation failed: {0}")]
    KeyGeneration(String),

    #[error("RSA key material decoding failed: {0}")]
    KeyDecoding(String),

    #[error("RSA signing failed: {0}")]
    Signing(String),

    #[error("RSA signature verification failed: {0}")]
    Verification(String),
}

/// An RSA-2048 key pair.
pub struct KeyPair {
    private_key: RsaPrivateKey,
}

impl KeyPair {
    /// Generate a fresh key pair from the system randomness source.
    pub fn generate() -> Result<Self, Error> {
        let private_key = RsaPrivateKey::new(&mut OsRng, KEY_BITS)
            .map_err(|e| Error::KeyGeneration(e.to_string()))?;
        Ok(Self { private_key })
    }

    /// Decode a key pair from PKCS#8 DER private-key bytes.
    pub fn from_pkcs8_der(der: &[u8]) -> Result<Self, Error> {
        let private_key =
            RsaPrivateKey::from_pkcs8_der(der).map_err(|e| Error::KeyDecoding(e.to_string()))?;
        Ok(Self { private_key })
    }

    /// Encode the private half as PKCS#8 DER.
    pub fn private_key_der(&self) -> Result<Vec<u8>, Error> {
        let doc = self
            .private_key
            .to_pkcs8_der()
            .map_err(|e| Error::KeyGeneration(e.to_string()))?;
        Ok(doc.as_bytes().to_vec())
    }

    /// Encode the public half as SPKI DER.
    pub fn public_key_der(&self) -> Result<Vec<u8>, Error> {
        let doc = self
            .private_key
            .to_public_key()
            .to_public_key_der()
            .map_err(|e| Error::KeyGeneration(e.to_string()))?;
        Ok(doc.into_vec())
    }

    /// Sign a payload: SHA-256 digest, PKCS#1 v1.5 padding.
    pub fn sign(&self, payload: &[u8]) -> Result<Vec<u8>, Error> {
        let signing_key = SigningKey::<Sha256>::new(self.private_key.clone());
        let signature = signing_key
            .try_sign(payload)
            .map_err(|e| Error::Signing(e.to_string()))?;
        Ok(signature.to_vec())
    }

    /// The public key.
    pub fn public_key(&self) -> RsaPublicKey {
        self.private_key.to_public_key()
    }
}

impl std::fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyPair")
            .field("public_key", &self.private_key.to_public_key())
            .finish_non_exhaustive()
    }
}

/// Verify a PKCS#1 v1.5 signature against SPKI DER public-key bytes.
pub fn verify(public_key_der: &[u8], payload: &[u8], signature: &[u8]) -> Result<(), Error> {
    let public_key = RsaPublicKey::from_public_key_der(public_key_der)
        .map_err(|e| Error::KeyDecoding(e.to_string()))?;
    let verifying_key = VerifyingKey::<Sha256>::new(public_key);
    let signature =
        Signature::try_from(signature).map_err(|e| Error::Verification(e.to_string()))?;
    verifying_key
        .verify(payload, &signature)
        .map_err(|e| Error::Verification(e.to_string()))
}
