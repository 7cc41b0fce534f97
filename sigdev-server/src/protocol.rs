//! Wire protocol for the signature device daemon.
//!
//! Uses a simple length-prefixed binary format over Unix sockets.

use serde::{Deserialize, Serialize};
use sigdev_domain::{DeviceView, SignatureResponse};
use uuid::Uuid;

/// Request to create a signature device.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateDeviceRequest {
    /// Algorithm name, parsed case-insensitively ("ECC" or "RSA")
    pub algorithm: String,
    /// Free-form display label
    pub label: String,
}

/// Request to sign data with a device.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignDataRequest {
    /// Device identifier
    pub id: Uuid,
    /// Data to embed in the signed payload
    pub data: String,
}

/// All possible messages from client to server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Request {
    CreateDevice(CreateDeviceRequest),
    GetDevice { id: Uuid },
    ListDevices,
    SignData(SignDataRequest),
    Ping,
}

/// All possible messages from server to client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Response {
    Device(DeviceView),
    Devices(Vec<DeviceView>),
    Signature(SignatureResponse),
    /// Domain or protocol failure, as a displayable message
    Error { message: String },
    Pong,
}
