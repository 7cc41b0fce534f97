//! Algorithm registry: the closed set of supported signature algorithms.
//!
//! Each algorithm maps to exactly one key-pair generator, one key codec and
//! one signer constructor; all three are dispatched by pattern match, so
//! adding an algorithm means adding one variant and one arm per match below.

use std::fmt;
use std::str::FromStr;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::Error;

/// Supported signature algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Algorithm {
    /// ECDSA over NIST P-256 with SHA-256, DER-encoded signatures.
    Ecc,
    /// RSA-2048 with PKCS#1 v1.5 padding and SHA-256.
    Rsa,
}

/// A freshly generated key pair in its storable DER encoding.
#[derive(Debug, Clone)]
pub struct KeyPairBytes {
    pub private_key: Vec<u8>,
    pub public_key: Vec<u8>,
}

impl Algorithm {
    /// Generate a key pair and encode both halves for storage.
    pub fn generate_key_pair(&self) -> Result<KeyPairBytes, Error> {
        match self {
            Algorithm::Ecc => {
                let keypair = sigdev_ecdsa::KeyPair::generate();
                Ok(KeyPairBytes {
                    private_key: keypair.private_key_der()?,
                    public_key: keypair.public_key_der()?,
                })
            }
            Algorithm::Rsa => {
                let keypair = sigdev_rsa::KeyPair::generate()?;
                Ok(KeyPairBytes {
                    private_key: keypair.private_key_der()?,
                    public_key: keypair.public_key_der()?,
                })
            }
        }
    }

    /// Decode stored private-key bytes and bind a signer to them.
    pub fn signer(&self, private_key: &[u8]) -> Result<DeviceSigner, Error> {
        match self {
            Algorithm::Ecc => Ok(DeviceSigner::Ecc(sigdev_ecdsa::KeyPair::from_pkcs8_der(
                private_key,
            )?)),
            Algorithm::Rsa => Ok(DeviceSigner::Rsa(sigdev_rsa::KeyPair::from_pkcs8_der(
                private_key,
            )?)),
        }
    }

    /// Verify a signature against stored public-key bytes.
    pub fn verify(
        &self,
        public_key: &[u8],
        payload: &[u8],
        signature: &[u8],
    ) -> Result<(), Error> {
        match self {
            Algorithm::Ecc => sigdev_ecdsa::verify(public_key, payload, signature)?,
            Algorithm::Rsa => sigdev_rsa::verify(public_key, payload, signature)?,
        }
        Ok(())
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Algorithm::Ecc => write!(f, "ECC"),
            Algorithm::Rsa => write!(f, "RSA"),
        }
    }
}

impl FromStr for Algorithm {
    type Err = Error;

    /// Parse a textual algorithm name, case-insensitively and ignoring
    /// surrounding whitespace.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ecc" => Ok(Algorithm::Ecc),
            "rsa" => Ok(Algorithm::Rsa),
            _ => Err(Error::UnknownAlgorithm(s.trim().to_string())),
        }
    }
}

impl Serialize for Algorithm {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Algorithm {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        name.parse().map_err(D::Error::custom)
    }
}

/// A signer bound to one device's decoded private key.
///
/// One variant per algorithm, each carrying its own typed key material.
#[derive(Debug)]
pub enum DeviceSigner {
    Ecc(sigdev_ecdsa::KeyPair),
    Rsa(sigdev_rsa::KeyPair),
}

impl DeviceSigner {
    /// Produce a signature over an arbitrary byte payload.
    pub fn sign(&self, payload: &[u8]) -> Result<Vec<u8>, Error> {
        let signature = match self {
            DeviceSigner::Ecc(keypair) => keypair.sign(payload)?,
            DeviceSigner::Rsa(keypair) => keypair.sign(payload)?,
        };
        Ok(signature)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_is_case_insensitive_and_trims() {
        assert_eq!("ECC".parse::<Algorithm>().unwrap(), Algorithm::Ecc);
        assert_eq!("ecc".parse::<Algorithm>().unwrap(), Algorithm::Ecc);
        assert_eq!("  Rsa ".parse::<Algorithm>().unwrap(), Algorithm::Rsa);
        assert_eq!("rSa".parse::<Algorithm>().unwrap(), Algorithm::Rsa);
    }

    #[test]
    fn test_parse_rejects_unknown_names() {
        let err = "ed25519".parse::<Algorithm>().unwrap_err();
        assert!(matches!(err, Error::UnknownAlgorithm(name) if name == "ed25519"));

        assert!("".parse::<Algorithm>().is_err());
    }

    #[test]
    fn test_display_roundtrip() {
        for algorithm in [Algorithm::Ecc, Algorithm::Rsa] {
            let parsed: Algorithm = algorithm.to_string().parse().unwrap();
            assert_eq!(parsed, algorithm);
        }
    }

    #[test]
    fn test_serde_uses_algorithm_names() {
        let json = serde_json::to_string(&Algorithm::Ecc).unwrap();
        assert_eq!(json, "\"ECC\"");

        let parsed: Algorithm = serde_json::from_str("\"rsa\"").unwrap();
        assert_eq!(parsed, Algorithm::Rsa);

        assert!(serde_json::from_str::<Algorithm>("\"dsa\"").is_err());
    }

    #[test]
    fn test_generate_bind_sign_verify_ecc() {
        let keys = Algorithm::Ecc.generate_key_pair().unwrap();
        let signer = Algorithm::Ecc.signer(&keys.private_key).unwrap();

        let signature = signer.sign(b"payload").unwrap();
        assert!(Algorithm::Ecc
            .verify(&keys.public_key, b"payload", &signature)
            .is_ok());
    }

    #[test]
    fn test_generate_bind_sign_verify_rsa() {
        let keys = Algorithm::Rsa.generate_key_pair().unwrap();
        let signer = Algorithm::Rsa.signer(&keys.private_key).unwrap();

        let signature = signer.sign(b"payload").unwrap();
        assert!(Algorithm::Rsa
            .verify(&keys.public_key, b"payload", &signature)
            .is_ok());
    }

    #[test]
    fn test_binding_signer_with_mismatched_codec_fails() {
        // An ECC private key must not decode under the RSA codec and vice
        // versa.
        let ecc_keys = Algorithm::Ecc.generate_key_pair().unwrap();
        let err = Algorithm::Rsa.signer(&ecc_keys.private_key).unwrap_err();
        assert!(matches!(err, Error::KeyDecoding(_)));
    }

    #[test]
    fn test_binding_signer_with_garbage_fails() {
        let err = Algorithm::Ecc.signer(b"truncated der").unwrap_err();
        assert!(matches!(err, Error::KeyDecoding(_)));
    }
}
