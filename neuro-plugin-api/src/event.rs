//! Event types carried by the bus.
//!
//! Every event has a discriminant ([`EventKind`]) that the core uses as the
//! key of its dispatch table, and a payload specific to that kind. Events are
//! handed to listeners by shared reference and are never mutated after
//! creation.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Discriminant of a [`NeuroEvent`], used as the dispatch-table key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// Diagnostic events (see [`DebugEvent`])
    Debug,
    /// Terminal shutdown signal
    Quit,
}

impl EventKind {
    /// Every kind the bus knows about
    pub const ALL: [EventKind; 2] = [EventKind::Debug, EventKind::Quit];

    /// Stable lowercase name of the kind
    pub fn as_str(self) -> &'static str {
        match self {
            EventKind::Debug => "debug",
            EventKind::Quit => "quit",
        }
    }

    /// Whether dispatching this kind starts the shutdown cascade
    pub fn is_terminal(self) -> bool {
        matches!(self, EventKind::Quit)
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Severity of a diagnostic event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DebugLevel {
    Debug,
    Error,
}

impl fmt::Display for DebugLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DebugLevel::Debug => f.write_str("DEBUG"),
            DebugLevel::Error => f.write_str("ERROR"),
        }
    }
}

/// Diagnostic payload: who reported it, how severe, and what happened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DebugEvent {
    /// Name of the component that produced the diagnostic ("core" or a plugin name)
    pub source: String,
    /// Severity
    pub level: DebugLevel,
    /// Human-readable message
    pub message: String,
}

impl DebugEvent {
    #[must_use]
    pub fn new(source: impl Into<String>, level: DebugLevel, message: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            level,
            message: message.into(),
        }
    }

    /// Debug-severity diagnostic
    #[must_use]
    pub fn debug(source: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(source, DebugLevel::Debug, message)
    }

    /// Error-severity diagnostic
    #[must_use]
    pub fn error(source: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(source, DebugLevel::Error, message)
    }

    pub fn is_error(&self) -> bool {
        self.level == DebugLevel::Error
    }
}

/// An event dispatched through the bus
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NeuroEvent {
    /// Diagnostic (log-carrying) event
    Debug(DebugEvent),
    /// Shutdown signal: stops every plugin and terminates the host
    Quit,
}

impl NeuroEvent {
    /// The discriminant used to look up listeners
    pub fn kind(&self) -> EventKind {
        match self {
            NeuroEvent::Debug(_) => EventKind::Debug,
            NeuroEvent::Quit => EventKind::Quit,
        }
    }

    /// Shorthand for a debug-severity diagnostic event
    #[must_use]
    pub fn debug(source: impl Into<String>, message: impl Into<String>) -> Self {
        NeuroEvent::Debug(DebugEvent::debug(source, message))
    }

    /// Shorthand for an error-severity diagnostic event
    #[must_use]
    pub fn error(source: impl Into<String>, message: impl Into<String>) -> Self {
        NeuroEvent::Debug(DebugEvent::error(source, message))
    }
}

impl From<DebugEvent> for NeuroEvent {
    fn from(event: DebugEvent) -> Self {
        NeuroEvent::Debug(event)
    }
}
