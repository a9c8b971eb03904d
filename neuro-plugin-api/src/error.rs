//! Error types for plugin authors

use thiserror::Error;

use crate::event::EventKind;

/// Errors that plugins can return, and that the core reports back to plugins
#[derive(Error, Debug)]
pub enum PluginError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Custom error with message
    #[error("{0}")]
    Custom(String),

    /// The same kind was subscribed twice during one `init`
    #[error("Duplicate subscription: {0}")]
    DuplicateSubscription(EventKind),

    /// The core behind a `CoreHandle` has been dropped
    #[error("Core is no longer available")]
    CoreUnavailable,

    /// A dispatch requested by the plugin failed in another listener
    #[error("Dispatch failed: {0}")]
    Dispatch(String),

    /// The network collaborator rejected a request or message
    #[error("Network error: {0}")]
    Network(String),
}

impl PluginError {
    /// Create a custom error with a message
    pub fn custom(message: impl Into<String>) -> Self {
        Self::Custom(message.into())
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }
}
