//! Signing domain for signature devices.
//!
//! A signature device is a key pair bound to one algorithm (ECC or RSA) plus
//! chaining state: a monotonically increasing signature counter and the last
//! produced signature. Every signature covers the current counter, the
//! caller's data and the previous signature, so the signatures of a device
//! form a tamper-evident hash chain.
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────┐   create/sign    ┌───────────────┐   lock + commit   ┌─────────────┐
//! │ DeviceService │ ───────────────► │   Algorithm   │                   │ DeviceStore │
//! │  (facade)     │                  │ (enum dispatch│ ────────────────► │ (in-memory, │
//! └───────────────┘                  │  to signers)  │                   │  per-device │
//!                                    └───────────────┘                   │  locking)   │
//!                                                                        └─────────────┘
//! ```
//!
//! The counter and last signature of a device are only ever updated together,
//! under that device's lock, after signing has succeeded.

pub mod algorithm;
pub mod device;
pub mod error;
pub mod service;
pub mod signing;
pub mod store;

pub use algorithm::{Algorithm, DeviceSigner, KeyPairBytes};
pub use device::{DeviceView, SignatureDevice};
pub use error::Error;
pub use service::{DeviceService, SignatureResponse};
pub use store::DeviceStore;

/// Base64 alphabet used for signatures and the chain seed (URL-safe, padded).
pub(crate) const BASE64: base64::engine::general_purpose::GeneralPurpose =
    base64::engine::general_purpose::URL_SAFE;
