//! Error Types
//!
//! Two classes of failure: markup errors reported by the tokenizer
//! (forwarded verbatim) and structural violations raised by the tree builder
//! itself. Every error is terminal for the conversion that raised it; a
//! caller needing resilience re-runs the conversion on a fresh stream.

use thiserror::Error;

/// Errors raised during a conversion
#[derive(Debug, Error)]
pub enum FlowError {
    /// Malformed markup reported by the tokenizer
    #[error("malformed markup: {0}")]
    Parse(String),
    /// Close event arrived with no element open
    #[error("close tag with no open element")]
    UnbalancedClose,
    /// Input ended while elements were still open
    #[error("input ended with {depth} unclosed element(s), innermost <{innermost}>")]
    UnclosedElements { depth: usize, innermost: String },
    /// Entity reference that could not be resolved
    #[error("unresolvable entity reference: &{0};")]
    InvalidEntity(String),
}

/// Result alias for conversion operations
pub type Result<T> = std::result::Result<T, FlowError>;
