//! Service facade over the device store and the chained-signing protocol.

use base64::Engine;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use crate::device::{DeviceView, SignatureDevice};
use crate::error::Error;
use crate::signing::secured_payload;
use crate::store::DeviceStore;
use crate::BASE64;

/// Result of one signing operation.
///
/// `signed_data` is returned verbatim because it embeds internal-only state
/// (the counter and the previous signature): a verifier checks `signature`
/// against exactly these bytes without re-deriving them from the device.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignatureResponse {
    /// Base64 (URL-safe) encoding of the raw signature.
    pub signature: String,
    /// The exact byte string that was signed.
    pub signed_data: Vec<u8>,
}

/// Entry point for all device operations.
///
/// Owns the store; callers hold the service by reference or behind an `Arc`.
#[derive(Debug, Default)]
pub struct DeviceService {
    store: DeviceStore,
}

impl DeviceService {
    pub fn new(store: DeviceStore) -> Self {
        Self { store }
    }

    /// Create a device for the named algorithm and persist it.
    ///
    /// The returned view never contains the private key.
    pub fn create_device(&self, algorithm: &str, label: &str) -> Result<DeviceView, Error> {
        let algorithm = algorithm.parse()?;
        let device = SignatureDevice::new(algorithm, label)?;
        let view = DeviceView::from(&device);
        self.store.create(device)?;
        info!(id = %view.id, %algorithm, label, "created signature device");
        Ok(view)
    }

    /// Fetch a single device view.
    pub fn get_device(&self, id: Uuid) -> Result<DeviceView, Error> {
        let device = self.store.get(id)?.ok_or(Error::DeviceNotFound(id))?;
        Ok(DeviceView::from(&device))
    }

    /// List all device views. Order is not significant.
    pub fn list_devices(&self) -> Result<Vec<DeviceView>, Error> {
        let devices = self.store.get_all()?;
        Ok(devices.iter().map(DeviceView::from).collect())
    }

    /// Change a device's label. Labels are free-form and not unique.
    pub fn rename_device(&self, id: Uuid, label: &str) -> Result<(), Error> {
        self.store.with_device(id, |device| {
            device.label = label.to_string();
            Ok(())
        })
    }

    /// Sign `data` with the device's key, extending its signature chain.
    ///
    /// The whole read-modify-write runs under the device's lock: the payload
    /// is built from the current counter and last signature, signed, and only
    /// then are counter and last signature advanced together. Any failure
    /// before the commit leaves the device unchanged.
    pub fn sign_data(&self, id: Uuid, data: &str) -> Result<SignatureResponse, Error> {
        self.store.with_device(id, |device| {
            let signer = device.algorithm.signer(&device.private_key)?;
            let payload =
                secured_payload(device.signature_counter, data.as_bytes(), &device.last_signature);
            let signature = signer.sign(&payload)?;

            debug!(
                id = %device.id,
                counter = device.signature_counter,
                signature_len = signature.len(),
                "signed data"
            );

            device.signature_counter += 1;
            device.last_signature = signature.clone();
            Ok(SignatureResponse {
                signature: BASE64.encode(&signature),
                signed_data: payload,
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::algorithm::Algorithm;

    fn service() -> DeviceService {
        DeviceService::new(DeviceStore::new())
    }

    #[test]
    fn test_create_device_rejects_unknown_algorithm() {
        let err = service().create_device("dsa", "bad").unwrap_err();
        assert!(matches!(err, Error::UnknownAlgorithm(_)));
    }

    #[test]
    fn test_get_unknown_device_fails() {
        let id = Uuid::new_v4();
        let err = service().get_device(id).unwrap_err();
        assert!(matches!(err, Error::DeviceNotFound(missing) if missing == id));
    }

    #[test]
    fn test_sign_unknown_device_fails() {
        let err = service().sign_data(Uuid::new_v4(), "data").unwrap_err();
        assert!(matches!(err, Error::DeviceNotFound(_)));
    }

    #[test]
    fn test_list_devices() {
        let service = service();
        let first = service.create_device("ecc", "one").unwrap();
        let second = service.create_device("ecc", "two").unwrap();

        let listed = service.list_devices().unwrap();
        assert_eq!(listed.len(), 2);
        for id in [first.id, second.id] {
            assert!(listed.iter().any(|view| view.id == id));
        }
    }

    #[test]
    fn test_rename_device_keeps_chain_state() {
        let service = service();
        let view = service.create_device("ecc", "before").unwrap();
        service.sign_data(view.id, "data").unwrap();

        service.rename_device(view.id, "after").unwrap();

        let renamed = service.get_device(view.id).unwrap();
        assert_eq!(renamed.label, "after");
        assert_eq!(renamed.signature_counter, 1);
    }

    #[test]
    fn test_chain_monotonicity_and_embedding() {
        let service = service();
        let view = service.create_device("ecc", "chain").unwrap();

        let mut previous_signature: Option<Vec<u8>> = None;
        for counter in 0..5u64 {
            let response = service.sign_data(view.id, "entry").unwrap();

            // The payload starts with the counter active at this call.
            let prefix = format!("{counter}_entry_");
            assert!(response.signed_data.starts_with(prefix.as_bytes()));

            // And ends with the previous call's raw signature bytes.
            if let Some(previous) = &previous_signature {
                assert!(response.signed_data.ends_with(previous));
            }

            previous_signature = Some(BASE64.decode(&response.signature).unwrap());
        }

        assert_eq!(service.get_device(view.id).unwrap().signature_counter, 5);
    }

    #[test]
    fn test_signatures_verify_against_device_public_key() {
        let service = service();
        let view = service.create_device("ecc", "verify").unwrap();

        let response = service.sign_data(view.id, "hello").unwrap();
        let signature = BASE64.decode(&response.signature).unwrap();

        assert!(Algorithm::Ecc
            .verify(&view.public_key, &response.signed_data, &signature)
            .is_ok());
    }

    #[test]
    fn test_signing_isolation_between_devices() {
        let service = service();
        let signer = service.create_device("ecc", "signer").unwrap();
        let bystander = service.create_device("ecc", "bystander").unwrap();

        service.sign_data(signer.id, "data").unwrap();

        let untouched = service.get_device(bystander.id).unwrap();
        assert_eq!(untouched.signature_counter, 0);
        assert_eq!(untouched.label, "bystander");
    }

    #[test]
    fn test_concurrent_signs_yield_distinct_counters() {
        const WORKERS: usize = 8;

        let service = Arc::new(service());
        let view = service.create_device("ecc", "concurrent").unwrap();

        let mut handles = Vec::with_capacity(WORKERS);
        for _ in 0..WORKERS {
            let service = Arc::clone(&service);
            let id = view.id;
            handles.push(std::thread::spawn(move || {
                service.sign_data(id, "concurrent").unwrap()
            }));
        }
        let mut responses: Vec<SignatureResponse> = handles
            .into_iter()
            .map(|handle| handle.join().unwrap())
            .collect();

        // Each call observed a distinct counter value, with no gaps.
        let mut counters: Vec<u64> = responses
            .iter()
            .map(|response| {
                let payload = &response.signed_data;
                let end = payload.iter().position(|&b| b == b'_').unwrap();
                std::str::from_utf8(&payload[..end]).unwrap().parse().unwrap()
            })
            .collect();
        counters.sort_unstable();
        assert_eq!(counters, (0..WORKERS as u64).collect::<Vec<_>>());

        assert_eq!(
            service.get_device(view.id).unwrap().signature_counter,
            WORKERS as u64
        );

        // The stored last signature is the highest-counter call's output.
        responses.sort_by_key(|response| {
            let end = response.signed_data.iter().position(|&b| b == b'_').unwrap();
            std::str::from_utf8(&response.signed_data[..end])
                .unwrap()
                .parse::<u64>()
                .unwrap()
        });
        let last = responses.last().unwrap();
        let next = service.sign_data(view.id, "tail").unwrap();
        assert!(next
            .signed_data
            .ends_with(&BASE64.decode(&last.signature).unwrap()));
    }

    #[test]
    fn test_rsa_end_to_end_scenario() {
        let service = service();

        let view = service.create_device("RSA", "test").unwrap();
        assert_eq!(view.signature_counter, 0);
        assert_eq!(view.label, "test");
        assert!(!view.public_key.is_empty());

        // First signature covers counter 0, "hello" and the device seed.
        let first = service.sign_data(view.id, "hello").unwrap();
        let seed = BASE64.encode(view.id.to_string());
        let expected = format!("0_hello_{seed}");
        assert_eq!(first.signed_data, expected.as_bytes());
        assert_eq!(service.get_device(view.id).unwrap().signature_counter, 1);

        // Second signature embeds the first call's raw signature bytes.
        let second = service.sign_data(view.id, "world").unwrap();
        let first_raw = BASE64.decode(&first.signature).unwrap();
        assert!(second.signed_data.starts_with(b"1_world_"));
        assert!(second.signed_data.ends_with(&first_raw));
        assert_eq!(service.get_device(view.id).unwrap().signature_counter, 2);

        // Both signatures verify under the device's public key.
        let second_raw = BASE64.decode(&second.signature).unwrap();
        assert!(Algorithm::Rsa
            .verify(&view.public_key, &first.signed_data, &first_raw)
            .is_ok());
        assert!(Algorithm::Rsa
            .verify(&view.public_key, &second.signed_data, &second_raw)
            .is_ok());
    }

    #[test]
    fn test_duplicate_id_rejected_by_store() {
        let service = service();
        let device = SignatureDevice::new(Algorithm::Ecc, "dup").unwrap();
        let clone = device.clone();

        service.store.create(device).unwrap();
        let err = service.store.create(clone).unwrap_err();
        assert!(matches!(err, Error::DuplicateId(_)));
    }
}
