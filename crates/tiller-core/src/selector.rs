//! The polymorphic selector union accepted at the API surface.
//!
//! Callers hand the engine anything from a plain CSS string to an in-page
//! predicate; the classifier and the object model narrow every variant down
//! to a canonical locator or a remote reference.

use crate::reference::ElementRef;
use crate::strategy::Locator;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Marker prefix for shadow-piercing queries (`">>>.panel .btn"`).
pub const DEEP_MARKER: &str = ">>>";

/// Marker prefix for accessible-name queries (`"aria/Submit"`).
pub const ARIA_MARKER: &str = "aria/";

/// Default upper bound on accessibility candidates gathered in-page.
pub const DEFAULT_CANDIDATE_CAP: usize = 25;

/// How the accessibility resolver reacts to more than one match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strictness {
    /// Return the first match in document order, like `querySelector`.
    #[default]
    First,
    /// Return the first match but log a warning.
    Warn,
    /// Fail when more than one element matches.
    Strict,
}

/// An accessible-name descriptor with its match policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AriaSelector {
    pub name: String,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub strictness: Strictness,
    #[serde(default = "default_candidate_cap")]
    pub candidate_cap: usize,
    #[serde(default)]
    pub include_hidden: bool,
}

fn default_candidate_cap() -> usize {
    DEFAULT_CANDIDATE_CAP
}

impl AriaSelector {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            role: None,
            strictness: Strictness::First,
            candidate_cap: DEFAULT_CANDIDATE_CAP,
            include_hidden: false,
        }
    }

    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.role = Some(role.into());
        self
    }

    pub fn with_strictness(mut self, strictness: Strictness) -> Self {
        self.strictness = strictness;
        self
    }

    pub fn with_candidate_cap(mut self, cap: usize) -> Self {
        self.candidate_cap = cap;
        self
    }

    pub fn with_hidden(mut self, include_hidden: bool) -> Self {
        self.include_hidden = include_hidden;
        self
    }
}

/// A structural relation synthesized by the object model (parent/sibling
/// hops). Carried on script selectors so not-found errors can name the
/// relation instead of an opaque script.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Relation {
    Parent,
    NextSibling,
    PreviousSibling,
}

impl Relation {
    pub fn describe(&self) -> &'static str {
        match self {
            Relation::Parent => "parent",
            Relation::NextSibling => "next sibling",
            Relation::PreviousSibling => "previous sibling",
        }
    }

    /// The relation tag the in-page relation script expects.
    pub fn script_tag(&self) -> &'static str {
        match self {
            Relation::Parent => "parent",
            Relation::NextSibling => "nextSibling",
            Relation::PreviousSibling => "previousSibling",
        }
    }
}

/// An executable in-page predicate selector.
#[derive(Debug, Clone, PartialEq)]
pub struct ScriptSelector {
    /// JavaScript source executed through the session's script channel. The
    /// scope element (or null) is appended as the final argument.
    pub source: String,
    pub args: Vec<Value>,
    /// Set when this script was synthesized for a structural hop.
    pub relation: Option<Relation>,
}

impl ScriptSelector {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            args: Vec::new(),
            relation: None,
        }
    }

    pub fn with_args(mut self, args: Vec<Value>) -> Self {
        self.args = args;
        self
    }

    pub fn for_relation(relation: Relation, source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            args: vec![Value::String(relation.script_tag().to_string())],
            relation: Some(relation),
        }
    }
}

/// Everything a caller may bind an element with.
#[derive(Debug, Clone, PartialEq)]
pub enum Selector {
    /// Raw selector text, sub-classified by the strategy classifier.
    Raw(String),
    /// A pre-classified locator, used verbatim (after a legality check).
    Locator(Locator),
    /// An Appium matcher object (Espresso view/data matchers).
    Matcher(Value),
    /// An in-page predicate.
    Script(ScriptSelector),
    /// A caller-registered custom strategy, resolved against the session
    /// registry at bind time.
    Custom { name: String, args: Vec<Value> },
    /// An already-resolved remote reference.
    Existing(ElementRef),
    /// An accessible-name descriptor.
    Aria(AriaSelector),
}

impl Selector {
    /// Human-readable form used in error messages and logs.
    pub fn describe(&self) -> String {
        match self {
            Selector::Raw(s) => s.clone(),
            Selector::Locator(l) => l.to_string(),
            Selector::Matcher(v) => v.to_string(),
            Selector::Script(s) => match s.relation {
                Some(relation) => format!("<{} element>", relation.describe()),
                None => "<script selector>".to_string(),
            },
            Selector::Custom { name, .. } => format!("custom strategy \"{name}\""),
            Selector::Existing(r) => format!("<element {r}>"),
            Selector::Aria(a) => format!("{}{}", ARIA_MARKER, a.name),
        }
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.describe())
    }
}

impl From<&str> for Selector {
    fn from(s: &str) -> Self {
        Selector::Raw(s.to_string())
    }
}

impl From<String> for Selector {
    fn from(s: String) -> Self {
        Selector::Raw(s)
    }
}

impl From<Locator> for Selector {
    fn from(l: Locator) -> Self {
        Selector::Locator(l)
    }
}

impl From<AriaSelector> for Selector {
    fn from(a: AriaSelector) -> Self {
        Selector::Aria(a)
    }
}

impl From<ElementRef> for Selector {
    fn from(r: ElementRef) -> Self {
        Selector::Existing(r)
    }
}

impl From<ScriptSelector> for Selector {
    fn from(s: ScriptSelector) -> Self {
        Selector::Script(s)
    }
}
