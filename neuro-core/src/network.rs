//! NetworkBridge - pass-through to the external transport
//!
//! The core does not retry, buffer, or inspect payloads. Whatever the
//! transport returns is handed back to the caller.

use std::sync::Arc;

use neuro_plugin_api::{NetworkMessage, NetworkRequest, NetworkResponse};

use crate::error::NetworkError;

/// The network collaborator
pub trait Transport: Send + Sync {
    /// Send a request and block until the response arrives
    fn send_request(&self, request: NetworkRequest) -> Result<NetworkResponse, NetworkError>;

    /// Send a message without waiting for an answer
    fn send_message(&self, message: NetworkMessage) -> Result<(), NetworkError>;
}

#[derive(Clone, Default)]
pub struct NetworkBridge {
    transport: Option<Arc<dyn Transport>>,
}

impl NetworkBridge {
    /// A bridge with no transport; every call fails with `NotConnected`
    pub fn disconnected() -> Self {
        Self::default()
    }

    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport: Some(transport),
        }
    }

    pub fn is_connected(&self) -> bool {
        self.transport.is_some()
    }

    fn transport(&self) -> Result<&Arc<dyn Transport>, NetworkError> {
        self.transport.as_ref().ok_or(NetworkError::NotConnected)
    }

    pub fn send_request(&self, request: NetworkRequest) -> Result<NetworkResponse, NetworkError> {
        tracing::debug!(target_addr = %request.target, bytes = request.body.len(), "Sending request");
        self.transport()?.send_request(request)
    }

    pub fn send_message(&self, message: NetworkMessage) -> Result<(), NetworkError> {
        tracing::debug!(topic = %message.topic, bytes = message.body.len(), "Sending message");
        self.transport()?.send_message(message)
    }
}
