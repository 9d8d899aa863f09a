//! In-page script sources.
//!
//! These are injected through the session's script channel; DOM nodes in the
//! return value come back as element references.

/// Accessible-name lookup. Called with `(name, role|null, options)`.
pub const ACCESSIBLE_NAME_JS: &str = include_str!("scripts/accname.js");

/// Shadow-piercing CSS query. Called with `(selector, all, scope|null)`.
pub const DEEP_QUERY_JS: &str = include_str!("scripts/deep.js");

/// Structural relation hop. Called with `(relation, scope)`.
pub const RELATION_JS: &str = include_str!("scripts/relation.js");
