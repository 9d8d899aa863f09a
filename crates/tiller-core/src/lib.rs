//! Selector model and strategy classification for remote automation clients.
//!
//! This crate is the pure half of the engine: it turns the permissive,
//! polymorphic selector surface (CSS, raw XPath, extended shorthand,
//! accessibility descriptors, mobile strategies, in-page predicates) into
//! canonical `{using, value}` locators, without touching a transport.

pub mod classifier;
pub mod error;
pub mod reference;
pub mod roles;
pub mod selector;
pub mod strategy;
pub mod xpath;

pub use classifier::{classify, classify_matcher};
pub use error::SelectorError;
pub use reference::{ElementRef, LEGACY_ELEMENT_KEY, W3C_ELEMENT_KEY};
pub use selector::{
    AriaSelector, Relation, ScriptSelector, Selector, Strictness, ARIA_MARKER,
    DEEP_MARKER, DEFAULT_CANDIDATE_CAP,
};
pub use strategy::{Locator, SessionMode, Strategy};
