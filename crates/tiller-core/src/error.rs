//! Selector-level error taxonomy.
//!
//! These errors are static: a selector that fails classification today fails
//! it tomorrow, so nothing in here is ever retried.

use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SelectorError {
    /// The named strategy is not legal for the active session mode.
    #[error("invalid selector strategy \"{strategy}\" for this session (selector: \"{selector}\")")]
    InvalidStrategy { strategy: String, selector: String },

    /// A prefix rule matched but the detailed grammar did not.
    #[error("invalid selector syntax: \"{0}\"")]
    InvalidSyntax(String),

    /// An `-image` selector named a file that could not be read.
    #[error("failed to read image template \"{path}\": {message}")]
    ImageRead { path: String, message: String },
}
