//! Transport capability seams.
//!
//! The engine never owns an HTTP or WebSocket stack. It is handed a
//! [`CommandChannel`], one logical, strictly sequential command channel per
//! session, and everything in-page goes through [`ScriptExecutor`], which
//! keeps the accessibility and shadow expansion paths unit-testable with a
//! fake executor.

use async_trait::async_trait;
use serde_json::Value;
use std::fmt;
use thiserror::Error;

/// HTTP verb of a protocol command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors coming back from the transport collaborator.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    /// The remote end answered with a protocol-level error.
    #[error("{error}: {message}")]
    Wire { error: String, message: String },

    /// The exchange itself failed (connection refused, timeout, …).
    #[error("transport failure: {0}")]
    Connection(String),
}

impl TransportError {
    pub fn wire(error: impl Into<String>, message: impl Into<String>) -> Self {
        TransportError::Wire {
            error: error.into(),
            message: message.into(),
        }
    }

    /// True when the remote signalled that a held element reference is no
    /// longer valid (navigation, DOM replacement).
    pub fn is_stale(&self) -> bool {
        match self {
            TransportError::Wire { error, message } => {
                matches!(
                    error.as_str(),
                    "stale element reference"
                        | "stale element not found in the current frame"
                        | "StaleElementReference"
                ) || message.contains("stale element")
                    || message.contains("is obsolete")
                    || message.contains("not attached to the page document")
            }
            TransportError::Connection(_) => false,
        }
    }

    /// True for the "nothing matched" answer of a find command.
    pub fn is_no_such_element(&self) -> bool {
        match self {
            TransportError::Wire { error, message } => {
                matches!(error.as_str(), "no such element" | "NoSuchElement")
                    || message.contains("no such element")
                    || message.contains("Unable to locate element")
            }
            TransportError::Connection(_) => false,
        }
    }

    /// The stale class for non-find commands: an obsolete handle may surface
    /// as either a stale or a not-found answer depending on the remote end.
    pub fn is_stale_class(&self) -> bool {
        self.is_stale() || self.is_no_such_element()
    }
}

/// One logical protocol command channel.
///
/// Implementations serialize the request however they like; the engine only
/// issues one exchange at a time per session.
#[async_trait]
pub trait CommandChannel: Send + Sync {
    async fn send(&self, method: Method, path: &str, body: Value) -> Result<Value, TransportError>;
}

/// In-page script execution as an explicit capability.
#[async_trait]
pub trait ScriptExecutor: Send + Sync {
    async fn execute(&self, script: &str, args: Vec<Value>) -> Result<Value, TransportError>;
}
