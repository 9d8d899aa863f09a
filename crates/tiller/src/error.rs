//! Engine error taxonomy.
//!
//! Selector errors are static and never retried; stale references are retried
//! exactly once through chain replay; every other remote failure surfaces
//! unmodified; the engine performs no generic network retry.

use crate::transport::TransportError;
use std::fmt;
use thiserror::Error;
use tiller_core::{Relation, SelectorError};

/// A failed existence wait, carrying everything needed to point at the
/// offending selector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotFound {
    /// Selector of the hop that never appeared.
    pub selector: String,
    /// Set when the hop was a synthesized parent/sibling lookup; `selector`
    /// then names the element the relation was taken from.
    pub relation: Option<Relation>,
    /// The command that needed the element.
    pub command: String,
    pub timeout_ms: u64,
    /// Last underlying error observed while polling, if any.
    pub last_error: Option<String>,
}

impl fmt::Display for NotFound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.relation {
            Some(relation) => write!(
                f,
                "can't call \"{}\" on the {} element of element (\"{}\"): element wasn't found after {}ms",
                self.command,
                relation.describe(),
                self.selector,
                self.timeout_ms,
            )?,
            None => write!(
                f,
                "can't call \"{}\" on element (\"{}\"): element wasn't found after {}ms",
                self.command, self.selector, self.timeout_ms,
            )?,
        }
        if let Some(last) = &self.last_error {
            write!(f, " (last error: {last})")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum EngineError {
    #[error(transparent)]
    Selector(#[from] SelectorError),

    /// Implicit wait expired without the element appearing.
    #[error("{0}")]
    NotFound(NotFound),

    /// A recovered handle went stale again within the same logical call.
    #[error("element (\"{selector}\") went stale again while retrying \"{command}\"")]
    Stale { selector: String, command: String },

    /// Strict accessibility resolution found more than one match.
    #[error("strict accessibility selector \"{name}\" matched {matches} elements; candidates: {}", .descriptors.join(", "))]
    StrictSelector {
        name: String,
        matches: usize,
        descriptors: Vec<String>,
    },

    #[error("custom strategy \"{0}\" is already registered")]
    DuplicateStrategy(String),

    #[error("unknown custom strategy \"{0}\"")]
    UnknownStrategy(String),

    /// The remote end answered with something the engine could not interpret.
    #[error("unexpected remote response: {0}")]
    Response(String),

    /// Any other remote failure, surfaced unmodified.
    #[error(transparent)]
    Wire(#[from] TransportError),
}

impl EngineError {
    pub(crate) fn not_found(
        selector: impl Into<String>,
        relation: Option<Relation>,
        command: impl Into<String>,
        timeout_ms: u64,
        last_error: Option<String>,
    ) -> Self {
        EngineError::NotFound(NotFound {
            selector: selector.into(),
            relation,
            command: command.into(),
            timeout_ms,
            last_error,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_message_names_the_selector() {
        let err = EngineError::not_found(".item", None, "getText", 500, None);
        assert_eq!(
            err.to_string(),
            "can't call \"getText\" on element (\".item\"): element wasn't found after 500ms"
        );
    }

    #[test]
    fn not_found_message_names_the_relation() {
        let err = EngineError::not_found("div.card", Some(Relation::Parent), "click", 500, None);
        assert_eq!(
            err.to_string(),
            "can't call \"click\" on the parent element of element (\"div.card\"): element wasn't found after 500ms"
        );
    }

    #[test]
    fn strict_selector_message_lists_candidates() {
        let err = EngineError::StrictSelector {
            name: "Submit".into(),
            matches: 2,
            descriptors: vec!["<button>".into(), "<input>".into()],
        };
        let text = err.to_string();
        assert!(text.contains("matched 2 elements"));
        assert!(text.contains("<button>, <input>"));
    }
}
