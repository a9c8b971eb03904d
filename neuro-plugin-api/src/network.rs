//! Envelopes handed to the network collaborator.
//!
//! The core forwards these untouched; their bodies are opaque bytes and the
//! wire format is the transport's business.

use std::collections::HashMap;

use serde::Serialize;

use crate::error::PluginError;

/// A request expecting a response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkRequest {
    /// Transport-specific address (endpoint, command name, ...)
    pub target: String,
    /// Request headers
    pub headers: HashMap<String, String>,
    /// Request body as bytes
    pub body: Vec<u8>,
}

impl NetworkRequest {
    pub fn new(target: impl Into<String>, body: impl Into<Vec<u8>>) -> Self {
        Self {
            target: target.into(),
            headers: HashMap::new(),
            body: body.into(),
        }
    }

    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }
}

/// Response returned by the transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkResponse {
    /// Status code as reported by the transport
    pub status: u16,
    /// Response body
    pub body: Vec<u8>,
}

impl NetworkResponse {
    /// Create a JSON response
    pub fn json<T: Serialize>(status: u16, data: &T) -> Result<Self, PluginError> {
        Ok(Self {
            status,
            body: serde_json::to_vec(data).map_err(|e| PluginError::Serialization(e.to_string()))?,
        })
    }

    /// Create an empty response with status code
    pub fn empty(status: u16) -> Self {
        Self {
            status,
            body: vec![],
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// A fire-and-forget message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkMessage {
    /// Transport-specific topic or channel
    pub topic: String,
    /// Message body
    pub body: Vec<u8>,
}

impl NetworkMessage {
    pub fn new(topic: impl Into<String>, body: impl Into<Vec<u8>>) -> Self {
        Self {
            topic: topic.into(),
            body: body.into(),
        }
    }
}
