//! Unix-socket daemon surface for signature devices.
//!
//! This crate exposes the signing domain over a Unix socket: clients create
//! devices, inspect them and sign data; all key material stays inside the
//! daemon process.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────┐     Unix Socket     ┌──────────────────┐
//! │     Client      │ ◄─────────────────► │  Device Daemon   │
//! │ (DeviceClient)  │   Request/Response  │   (this crate)   │
//! └─────────────────┘                     └──────────────────┘
//! ```
//!
//! ## Usage
//!
//! Start the daemon:
//! ```bash
//! sigdev-daemon --socket /var/run/sigdev.sock
//! ```
//!
//! Then connect with [`DeviceClient`] from any process on the same host.

pub mod protocol;
pub mod server;

pub use protocol::{CreateDeviceRequest, Request, Response, SignDataRequest};
pub use server::{DeviceClient, DeviceServer, ServerConfig, ServerError};
