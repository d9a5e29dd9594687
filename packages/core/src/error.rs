//! Error types shared across the monitor.
//!
//! Provider and delivery failures are expected at runtime and are handled
//! where they occur (logged, then treated as "nothing this cycle").
//! `AppError` only surfaces at startup.

use thiserror::Error;

/// Unified startup error.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Server error: {0}")]
    Server(String),
}

/// Errors from the availability providers.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Network error: {message}")]
    Network { message: String },

    #[error("Provider returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Data format error: {message}")]
    Format { message: String },
}

/// Errors from the notification delivery collaborator.
#[derive(Error, Debug)]
pub enum DeliveryError {
    #[error("Network error: {message}")]
    Network { message: String },

    #[error("Slack rejected the message: {error}")]
    Rejected { error: String },

    #[error("Data format error: {message}")]
    Format { message: String },
}

impl ProviderError {
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network { message: message.into() }
    }

    pub fn format(message: impl Into<String>) -> Self {
        Self::Format { message: message.into() }
    }
}

impl DeliveryError {
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network { message: message.into() }
    }

    pub fn format(message: impl Into<String>) -> Self {
        Self::Format { message: message.into() }
    }
}
