//! Locator strategies and the canonical `{using, value}` wire form.
//!
//! Remote automation engines only understand a small fixed set of locator
//! strategies. Everything the classifier accepts is eventually narrowed down
//! to a [`Locator`] carrying one of these strategies.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A locator strategy understood by the remote end.
///
/// `Shadow` and `Aria` are internal pseudo-strategies: the object model
/// expands them into in-page queries before anything is transmitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Strategy {
    #[serde(rename = "css selector")]
    CssSelector,
    #[serde(rename = "xpath")]
    XPath,
    #[serde(rename = "id")]
    Id,
    #[serde(rename = "name")]
    Name,
    #[serde(rename = "link text")]
    LinkText,
    #[serde(rename = "partial link text")]
    PartialLinkText,
    #[serde(rename = "tag name")]
    TagName,
    #[serde(rename = "class name")]
    ClassName,
    #[serde(rename = "accessibility id")]
    AccessibilityId,
    #[serde(rename = "-android uiautomator")]
    AndroidUiAutomator,
    #[serde(rename = "-android datamatcher")]
    AndroidDataMatcher,
    #[serde(rename = "-android viewmatcher")]
    AndroidViewMatcher,
    #[serde(rename = "-android viewtag")]
    AndroidViewTag,
    #[serde(rename = "-ios uiautomation")]
    IosUiAutomation,
    #[serde(rename = "-ios predicate string")]
    IosPredicateString,
    #[serde(rename = "-ios class chain")]
    IosClassChain,
    #[serde(rename = "-image")]
    Image,
    /// Internal: shadow-piercing query, expanded before transmission.
    #[serde(rename = "shadow")]
    Shadow,
    /// Internal: accessible-name query, expanded before transmission.
    #[serde(rename = "aria")]
    Aria,
}

/// Strategies a strict W3C session accepts in a direct `strategy:value`
/// selector. Everything else must come in through a mobile session or a
/// legacy JSONWireProtocol session.
const W3C_STRATEGIES: &[Strategy] = &[
    Strategy::CssSelector,
    Strategy::XPath,
    Strategy::LinkText,
    Strategy::PartialLinkText,
];

impl Strategy {
    /// The wire name of this strategy.
    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::CssSelector => "css selector",
            Strategy::XPath => "xpath",
            Strategy::Id => "id",
            Strategy::Name => "name",
            Strategy::LinkText => "link text",
            Strategy::PartialLinkText => "partial link text",
            Strategy::TagName => "tag name",
            Strategy::ClassName => "class name",
            Strategy::AccessibilityId => "accessibility id",
            Strategy::AndroidUiAutomator => "-android uiautomator",
            Strategy::AndroidDataMatcher => "-android datamatcher",
            Strategy::AndroidViewMatcher => "-android viewmatcher",
            Strategy::AndroidViewTag => "-android viewtag",
            Strategy::IosUiAutomation => "-ios uiautomation",
            Strategy::IosPredicateString => "-ios predicate string",
            Strategy::IosClassChain => "-ios class chain",
            Strategy::Image => "-image",
            Strategy::Shadow => "shadow",
            Strategy::Aria => "aria",
        }
    }

    /// Look up a strategy by its wire name.
    pub fn from_name(name: &str) -> Option<Strategy> {
        Some(match name {
            "css selector" => Strategy::CssSelector,
            "xpath" => Strategy::XPath,
            "id" => Strategy::Id,
            "name" => Strategy::Name,
            "link text" => Strategy::LinkText,
            "partial link text" => Strategy::PartialLinkText,
            "tag name" => Strategy::TagName,
            "class name" => Strategy::ClassName,
            "accessibility id" => Strategy::AccessibilityId,
            "-android uiautomator" => Strategy::AndroidUiAutomator,
            "-android datamatcher" => Strategy::AndroidDataMatcher,
            "-android viewmatcher" => Strategy::AndroidViewMatcher,
            "-android viewtag" => Strategy::AndroidViewTag,
            "-ios uiautomation" => Strategy::IosUiAutomation,
            "-ios predicate string" => Strategy::IosPredicateString,
            "-ios class chain" => Strategy::IosClassChain,
            "-image" => Strategy::Image,
            _ => return None,
        })
    }

    /// Mobile vendor extensions are prefixed with `-` on the wire.
    pub fn is_mobile_extension(&self) -> bool {
        self.as_str().starts_with('-')
    }

    /// Internal pseudo-strategies never appear in a wire payload.
    pub fn is_internal(&self) -> bool {
        matches!(self, Strategy::Shadow | Strategy::Aria)
    }

    /// Whether this strategy may be named directly (a `strategy:value`
    /// selector or a caller-built locator) in the given session mode.
    /// Shorthand-derived locators are not gated here; the remote end is the
    /// authority on what it serves.
    pub fn allowed_in(&self, mode: SessionMode) -> bool {
        if self.is_internal() {
            return false;
        }
        if mode.strict_w3c() {
            return W3C_STRATEGIES.contains(self);
        }
        true
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Protocol dialect of the active session.
///
/// The classifier gates a handful of rules on this: direct selectors are
/// strategy-checked under strict W3C, and the `[name=…]` shorthand only maps
/// to the `name` strategy where the remote end still supports it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionMode {
    /// Session speaks the W3C dialect (as opposed to legacy JSONWP).
    pub w3c: bool,
    /// Session drives a mobile automation engine (Appium-style).
    pub mobile: bool,
}

impl SessionMode {
    /// A desktop W3C session.
    pub fn w3c() -> Self {
        Self {
            w3c: true,
            mobile: false,
        }
    }

    /// A legacy JSONWireProtocol session.
    pub fn jsonwp() -> Self {
        Self {
            w3c: false,
            mobile: false,
        }
    }

    /// A mobile session; mobile engines accept every strategy regardless of
    /// the dialect they speak.
    pub fn mobile(w3c: bool) -> Self {
        Self { w3c, mobile: true }
    }

    /// Strict W3C means the reduced strategy set applies.
    pub fn strict_w3c(&self) -> bool {
        self.w3c && !self.mobile
    }
}

impl Default for SessionMode {
    fn default() -> Self {
        Self::w3c()
    }
}

/// The canonical locator: the only form ever sent over the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Locator {
    pub using: Strategy,
    pub value: String,
}

impl Locator {
    pub fn new(using: Strategy, value: impl Into<String>) -> Self {
        Self {
            using,
            value: value.into(),
        }
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.using, self.value)
    }
}
