//! Error taxonomy for the signing domain.

use thiserror::Error;
use uuid::Uuid;

/// Errors surfaced by the signing domain.
///
/// Crypto failures keep their category (generation, decoding, signing) so the
/// boundary layer can tell caller mistakes from corrupted stored state: a
/// `KeyDecoding` error on a stored key points at a store or codec bug, not at
/// the request.
#[derive(Debug, Error)]
pub enum Error {
    #[error("{0:?} is not a valid algorithm")]
    UnknownAlgorithm(String),

    #[error("key pair generation failed: {0}")]
    KeyGeneration(String),

    #[error("stored key material is invalid: {0}")]
    KeyDecoding(String),

    #[error("signing failed: {0}")]
    Signing(String),

    #[error("signature verification failed: {0}")]
    Verification(String),

    #[error("signature device {0} not found")]
    DeviceNotFound(Uuid),

    #[error("signature device {0} already exists")]
    DuplicateId(Uuid),

    #[error("device store consistency violated: {0}")]
    StoreConsistency(String),
}

impl From<sigdev_ecdsa::Error> for Error {
    fn from(e: sigdev_ecdsa::Error) -> Self {
        match e {
            sigdev_ecdsa::Error::KeyGeneration(msg) => Error::KeyGeneration(msg),
            sigdev_ecdsa::Error::KeyDecoding(msg) => Error::KeyDecoding(msg),
            sigdev_ecdsa::Error::Signing(msg) => Error::Signing(msg),
            sigdev_ecdsa::Error::Verification(msg) => Error::Verification(msg),
        }
    }
}

impl From<sigdev_rsa::Error> for Error {
    fn from(e: sigdev_rsa::Error) -> Self {
        match e {
            sigdev_rsa::Error::KeyGeneration(msg) => Error::KeyGeneration(msg),
            sigdev_rsa::Error::KeyDecoding(msg) => Error::KeyDecoding(msg),
            sigdev_rsa::Error::Signing(msg) => Error::Signing(msg),
            sigdev_rsa::Error::Verification(msg) => Error::Verification(msg),
        }
    }
}
