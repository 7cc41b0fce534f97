//! In-memory device store with per-device locking.
//!
//! The map itself is guarded by an `RwLock`; every device sits behind its own
//! `Mutex`. Operations on distinct devices run in parallel, while operations
//! on one device serialize. [`DeviceStore::with_device`] runs a whole
//! read-modify-write under the device's lock and commits only on success, so
//! the counter and last signature can never be observed half-updated and a
//! result returned to the caller is always recorded.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use uuid::Uuid;

use crate::device::SignatureDevice;
use crate::error::Error;

type DeviceSlot = Arc<Mutex<SignatureDevice>>;

/// In-memory store for signature devices.
#[derive(Debug, Default)]
pub struct DeviceStore {
    devices: RwLock<HashMap<Uuid, DeviceSlot>>,
}

impl DeviceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch a snapshot of a device, or `None` if absent.
    pub fn get(&self, id: Uuid) -> Result<Option<SignatureDevice>, Error> {
        let devices = self.devices.read().map_err(poisoned)?;
        match devices.get(&id) {
            Some(slot) => Ok(Some(slot.lock().map_err(poisoned)?.clone())),
            None => Ok(None),
        }
    }

    /// Snapshot all devices. Order is not significant.
    pub fn get_all(&self) -> Result<Vec<SignatureDevice>, Error> {
        let devices = self.devices.read().map_err(poisoned)?;
        let mut snapshot = Vec::with_capacity(devices.len());
        for slot in devices.values() {
            snapshot.push(slot.lock().map_err(poisoned)?.clone());
        }
        Ok(snapshot)
    }

    /// Insert a new device. Fails if the id is already present.
    pub fn create(&self, device: SignatureDevice) -> Result<(), Error> {
        let mut devices = self.devices.write().map_err(poisoned)?;
        match devices.entry(device.id) {
            Entry::Occupied(_) => Err(Error::DuplicateId(device.id)),
            Entry::Vacant(entry) => {
                entry.insert(Arc::new(Mutex::new(device)));
                Ok(())
            }
        }
    }

    /// Replace an existing device. Fails if the id is absent.
    pub fn update(&self, device: SignatureDevice) -> Result<(), Error> {
        let slot = self.slot(device.id)?;
        let mut guard = slot.lock().map_err(poisoned)?;
        *guard = device;
        Ok(())
    }

    /// Run a read-modify-write transaction on one device.
    ///
    /// `f` operates on a staged copy under the device's lock; the copy is
    /// committed in a single assignment only if `f` returns `Ok`, so a failed
    /// transaction leaves the device untouched and a committed one can no
    /// longer fail.
    pub fn with_device<T>(
        &self,
        id: Uuid,
        f: impl FnOnce(&mut SignatureDevice) -> Result<T, Error>,
    ) -> Result<T, Error> {
        let slot = self.slot(id)?;
        let mut guard = slot.lock().map_err(poisoned)?;
        let mut staged = guard.clone();
        let out = f(&mut staged)?;
        *guard = staged;
        Ok(out)
    }

    fn slot(&self, id: Uuid) -> Result<DeviceSlot, Error> {
        let devices = self.devices.read().map_err(poisoned)?;
        devices.get(&id).cloned().ok_or(Error::DeviceNotFound(id))
    }
}

fn poisoned<T>(_: PoisonError<T>) -> Error {
    Error::StoreConsistency("a writer panicked while holding a store lock".to_string())
}
