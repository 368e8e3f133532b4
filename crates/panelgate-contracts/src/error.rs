//! Error types for the panelgate overlay.
//!
//! Fallible internals return `GateResult<T>`. The engine's public boundaries
//! (role resolution, status reads, traversal) degrade to a restrictive
//! default instead of propagating these, so none of them is fatal to the host.

use thiserror::Error;

/// The unified error type for panelgate.
#[derive(Debug, Error)]
pub enum GateError {
    /// A required configuration value is missing or invalid.
    #[error("configuration error: {reason}")]
    Config { reason: String },

    /// The key-value store backing the approval workflow could not be read or written.
    #[error("store error: {reason}")]
    Store { reason: String },

    /// The role directory could not be fetched or its table could not be parsed.
    #[error("directory error: {reason}")]
    Directory { reason: String },

    /// A selector string could not be parsed.
    #[error("invalid selector '{selector}': {reason}")]
    Selector { selector: String, reason: String },

    /// A value could not be encoded to or decoded from its persisted form.
    #[error("serialization error: {reason}")]
    Serialization { reason: String },
}

/// Convenience alias used throughout the panelgate crates.
pub type GateResult<T> = Result<T, GateError>;
