//! Layered error definitions
//!
//! Categorized by phase: address / resolution / open / send / encode

use thiserror::Error;

/// Unified error type
#[derive(Debug, Error)]
pub enum RelayError {
    // ===== Construction Errors =====
    /// Destination address did not parse
    #[error("invalid address '{address}': {message}")]
    InvalidAddress { address: String, message: String },

    /// No sender or transport registered for the scheme
    #[error("unknown scheme '{scheme}': no sender or transport registered")]
    UnknownScheme { scheme: String },

    /// Transport or sender could not be opened
    #[error("destination '{name}' open error: {message}")]
    Open { name: String, message: String },

    // ===== Delivery Errors =====
    /// Record delivery to a destination failed
    #[error("destination '{name}' send error: {message}")]
    Send { name: String, message: String },

    /// Record could not be rendered to bytes
    #[error("encode error: {message}")]
    Encode { message: String },

    // ===== General Errors =====
    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl RelayError {
    /// Create an invalid-address error
    pub fn invalid_address(address: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidAddress {
            address: address.into(),
            message: message.into(),
        }
    }

    /// Create an unknown-scheme error
    pub fn unknown_scheme(scheme: impl Into<String>) -> Self {
        Self::UnknownScheme {
            scheme: scheme.into(),
        }
    }

    /// Create a destination open error
    pub fn open(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Open {
            name: name.into(),
            message: message.into(),
        }
    }

    /// Create a destination send error
    pub fn send(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Send {
            name: name.into(),
            message: message.into(),
        }
    }

    /// Create an encode error
    pub fn encode(message: impl Into<String>) -> Self {
        Self::Encode {
            message: message.into(),
        }
    }
}
