//! Signature device server implementation.
//!
//! Listens on a Unix socket and serves device and signing requests, one
//! worker thread per connection.

use crate::protocol::{Request, Response};
use sigdev_domain::DeviceService;
use std::io::{Read, Write};
use std::os::unix::net::{UnixListener, UnixStream};
use std::path::Path;
use std::sync::Arc;
use std::thread;
use thiserror::Error;
use tracing::{debug, error, info, warn};

/// Maximum accepted frame size.
const MAX_FRAME_LEN: usize = 1024 * 1024;

/// Server configuration.
pub struct ServerConfig {
    /// Path to Unix socket
    pub socket_path: std::path::PathBuf,
}

/// Errors from the device server and client.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("Request failed: {0}")]
    Request(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] bincode::Error),
}

/// Signature device server.
pub struct DeviceServer {
    listener: UnixListener,
    service: Arc<DeviceService>,
}

impl DeviceServer {
    /// Create a new device server.
    pub fn new(config: ServerConfig, service: Arc<DeviceService>) -> Result<Self, ServerError> {
        // Remove existing socket file if it exists
        if config.socket_path.exists() {
            std::fs::remove_file(&config.socket_path)?;
        }

        // Ensure parent directory exists
        if let Some(parent) = config.socket_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let listener = UnixListener::bind(&config.socket_path)?;
        info!("Device server listening on {:?}", config.socket_path);

        // Set socket permissions (owner only)
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let perms = std::fs::Permissions::from_mode(0o600);
            std::fs::set_permissions(&config.socket_path, perms)?;
        }

        Ok(Self { listener, service })
    }

    /// Run the server (blocking). Each connection is served on its own
    /// thread; cross-device requests proceed in parallel.
    pub fn run(&self) -> Result<(), ServerError> {
        info!("Device server starting...");

        for stream in self.listener.incoming() {
            match stream {
                Ok(stream) => {
                    debug!("New connection");
                    let service = Arc::clone(&self.service);
                    thread::spawn(move || {
                        if let Err(e) = Self::handle_connection(stream, &service) {
                            error!("Error handling connection: {}", e);
                        }
                    });
                }
                Err(e) => {
                    error!("Error accepting connection: {}", e);
                }
            }
        }

        Ok(())
    }

    /// Handle a single connection (one request, one response).
    fn handle_connection(
        mut stream: UnixStream,
        service: &DeviceService,
    ) -> Result<(), ServerError> {
        let request: Request = bincode::deserialize(&read_frame(&mut stream)?)?;
        let response = Self::dispatch(service, request);
        write_frame(&mut stream, &bincode::serialize(&response)?)?;
        Ok(())
    }

    /// Map a request to the corresponding domain call.
    fn dispatch(service: &DeviceService, request: Request) -> Response {
        let result = match request {
            Request::CreateDevice(req) => {
                debug!(algorithm = %req.algorithm, label = %req.label, "create device request");
                service
                    .create_device(&req.algorithm, &req.label)
                    .map(Response::Device)
            }
            Request::GetDevice { id } => service.get_device(id).map(Response::Device),
            Request::ListDevices => service.list_devices().map(Response::Devices),
            Request::SignData(req) => {
                debug!(id = %req.id, data_len = req.data.len(), "sign request");
                service.sign_data(req.id, &req.data).map(Response::Signature)
            }
            Request::Ping => return Response::Pong,
        };

        match result {
            Ok(response) => response,
            Err(e) => {
                warn!("Request rejected: {}", e);
                Response::Error {
                    message: e.to_string(),
                }
            }
        }
    }
}

/// Read one length-prefixed frame.
fn read_frame(stream: &mut UnixStream) -> Result<Vec<u8>, ServerError> {
    let mut len_buf = [0u8; 4];
    stream.read_exact(&mut len_buf)?;
    let msg_len = u32::from_le_bytes(len_buf) as usize;

    if msg_len > MAX_FRAME_LEN {
        return Err(ServerError::Protocol("Message too large".to_string()));
    }

    let mut msg_buf = vec![0u8; msg_len];
    stream.read_exact(&mut msg_buf)?;
    Ok(msg_buf)
}

/// Write one length-prefixed frame.
fn write_frame(stream: &mut UnixStream, frame: &[u8]) -> Result<(), ServerError> {
    let len_bytes = (frame.len() as u32).to_le_bytes();
    stream.write_all(&len_bytes)?;
    stream.write_all(frame)?;
    stream.flush()?;
    Ok(())
}

/// Client for connecting to the device daemon.
pub struct DeviceClient {
    socket_path: std::path::PathBuf,
}

impl DeviceClient {
    /// Create a new client.
    pub fn new(socket_path: impl AsRef<Path>) -> Self {
        Self {
            socket_path: socket_path.as_ref().to_path_buf(),
        }
    }

    /// Connect to the server and send a request.
    fn send_request(&self, request: &Request) -> Result<Response, ServerError> {
        let mut stream = UnixStream::connect(&self.socket_path)?;
        write_frame(&mut stream, &bincode::serialize(request)?)?;
        let response: Response = bincode::deserialize(&read_frame(&mut stream)?)?;
        Ok(response)
    }

    /// Create a signature device.
    pub fn create_device(
        &self,
        algorithm: &str,
        label: &str,
    ) -> Result<sigdev_domain::DeviceView, ServerError> {
        let response = self.send_request(&Request::CreateDevice(
            crate::protocol::CreateDeviceRequest {
                algorithm: algorithm.to_string(),
                label: label.to_string(),
            },
        ))?;

        match response {
            Response::Device(view) => Ok(view),
            Response::Error { message } => Err(ServerError::Request(message)),
            _ => Err(ServerError::Protocol("Unexpected response".to_string())),
        }
    }

    /// Fetch one device view.
    pub fn get_device(&self, id: uuid::Uuid) -> Result<sigdev_domain::DeviceView, ServerError> {
        let response = self.send_request(&Request::GetDevice { id })?;

        match response {
            Response::Device(view) => Ok(view),
            Response::Error { message } => Err(ServerError::Request(message)),
            _ => Err(ServerError::Protocol("Unexpected response".to_string())),
        }
    }

    /// List all device views.
    pub fn list_devices(&self) -> Result<Vec<sigdev_domain::DeviceView>, ServerError> {
        let response = self.send_request(&Request::ListDevices)?;

        match response {
            Response::Devices(views) => Ok(views),
            Response::Error { message } => Err(ServerError::Request(message)),
            _ => Err(ServerError::Protocol("Unexpected response".to_string())),
        }
    }

    /// Sign data with a device.
    pub fn sign_data(
        &self,
        id: uuid::Uuid,
        data: &str,
    ) -> Result<sigdev_domain::SignatureResponse, ServerError> {
        let response = self.send_request(&Request::SignData(crate::protocol::SignDataRequest {
            id,
            data: data.to_string(),
        }))?;

        match response {
            Response::Signature(signature) => Ok(signature),
            Response::Error { message } => Err(ServerError::Request(message)),
            _ => Err(ServerError::Protocol("Unexpected response".to_string())),
        }
    }

    /// Ping the server.
    pub fn ping(&self) -> Result<(), ServerError> {
        let response = self.send_request(&Request::Ping)?;

        match response {
            Response::Pong => Ok(()),
            _ => Err(ServerError::Protocol("Unexpected response".to_string())),
        }
    }
}
