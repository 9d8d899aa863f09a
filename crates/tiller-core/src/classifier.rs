//! The strategy classifier: raw selector text → canonical locator.
//!
//! Classification is a first-match-wins cascade. The order is load-bearing
//! because several patterns overlap (`*=text` is a partial link text, but
//! `#content*=Intro` is an extended XPath selector), so new rules must slot
//! into the existing order deliberately.

use crate::error::SelectorError;
use crate::roles::expand_role;
use crate::selector::{ARIA_MARKER, DEEP_MARKER};
use crate::strategy::{Locator, SessionMode, Strategy};
use crate::xpath;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use regex::Regex;
use std::sync::LazyLock;

/// Selector prefixes that are taken as raw XPath.
const XPATH_STARTS: &[&str] = &["/", "(", "../", "./", "*/"];

/// Mobile widget class prefixes mapped to the `class name` strategy.
const MOBILE_CLASS_PREFIXES: &[&str] =
    &["uia", "xcuielementtype", "android.widget", "android.view", "cyi"];

/// File extensions recognized as image templates.
const IMAGE_EXTENSIONS: &[&str] = &[".jpg", ".jpeg", ".gif", ".png", ".bmp", ".svg"];

static DIRECT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        "(?s)^(css selector|xpath|id|name|partial link text|link text|tag name|class name\
         |accessibility id|-android uiautomator|-android datamatcher|-android viewmatcher\
         |-ios uiautomation|-ios predicate string|-ios class chain):(.+)$",
    )
    .unwrap()
});

static TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^<([a-zA-Z0-9-]+)( */)?>$").unwrap());

static NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"^\[name=(?:"([^"]*)"|'([^']*)')\]$"#).unwrap());

static ROLE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\[role=([A-Za-z]+)\]$").unwrap());

/// Classify raw selector text into the canonical locator for the given
/// session mode.
///
/// Total and side-effect free, with two exceptions: image-template selectors
/// read the referenced file, and malformed input is an error.
pub fn classify(selector: &str, mode: SessionMode) -> Result<Locator, SelectorError> {
    // 1. direct strategy:value
    if let Some(caps) = DIRECT_RE.captures(selector) {
        let name = caps.get(1).unwrap().as_str();
        let strategy = Strategy::from_name(name)
            .expect("direct-selector alternation only matches known strategies");
        if !strategy.allowed_in(mode) {
            return Err(SelectorError::InvalidStrategy {
                strategy: name.to_string(),
                selector: selector.to_string(),
            });
        }
        return Ok(Locator::new(strategy, caps.get(2).unwrap().as_str()));
    }

    // 2. image template path (the extension alone is not a path)
    let lower = selector.to_ascii_lowercase();
    if let Some(ext) = IMAGE_EXTENSIONS.iter().find(|e| lower.ends_with(*e)) {
        if selector.len() > ext.len() {
            let bytes =
                std::fs::read(selector).map_err(|e| SelectorError::ImageRead {
                    path: selector.to_string(),
                    message: e.to_string(),
                })?;
            return Ok(Locator::new(Strategy::Image, BASE64.encode(bytes)));
        }
    }

    // 3. raw XPath
    if XPATH_STARTS.iter().any(|p| selector.starts_with(p)) {
        return Ok(Locator::new(Strategy::XPath, selector));
    }

    // 4. link text (exact / partial)
    if let Some(rest) = selector.strip_prefix("*=") {
        return Ok(Locator::new(Strategy::PartialLinkText, rest));
    }
    if let Some(rest) = selector.strip_prefix('=') {
        return Ok(Locator::new(Strategy::LinkText, rest));
    }

    // 5. id shorthand
    if let Some(rest) = selector.strip_prefix("id=") {
        return Ok(Locator::new(Strategy::Id, rest));
    }

    // 6. shadow-piercing marker (expanded by the object model)
    if let Some(rest) = selector.strip_prefix(DEEP_MARKER) {
        return Ok(Locator::new(Strategy::Shadow, rest));
    }

    // 7. accessible-name marker (expanded by the object model)
    if let Some(rest) = selector.strip_prefix(ARIA_MARKER) {
        return Ok(Locator::new(Strategy::Aria, rest));
    }

    // 8. mobile automation shorthands
    if let Some(rest) = selector.strip_prefix("android=") {
        return Ok(Locator::new(Strategy::AndroidUiAutomator, rest));
    }
    if let Some(rest) = selector.strip_prefix("ios=") {
        return Ok(Locator::new(Strategy::IosUiAutomation, rest));
    }
    if let Some(rest) = selector.strip_prefix('~') {
        return Ok(Locator::new(Strategy::AccessibilityId, rest));
    }

    // 9. mobile widget class names
    if MOBILE_CLASS_PREFIXES.iter().any(|p| lower.starts_with(p)) {
        return Ok(Locator::new(Strategy::ClassName, selector));
    }

    // 10. tag form: "<tag>" or "<tag />"
    if TAG_RE.is_match(selector) {
        let value: String = selector
            .chars()
            .filter(|c| !matches!(c, '<' | '>' | '/') && !c.is_whitespace())
            .collect();
        return Ok(Locator::new(Strategy::TagName, value));
    }

    // 11. [name=…] shorthand, only where the remote end still supports the
    // name strategy; under strict W3C this falls through to CSS
    if !mode.strict_w3c() && selector.starts_with("[name=") {
        return match NAME_RE.captures(selector) {
            Some(caps) => {
                let value = caps.get(1).or_else(|| caps.get(2)).unwrap().as_str();
                Ok(Locator::new(Strategy::Name, value))
            }
            None => Err(SelectorError::InvalidSyntax(selector.to_string())),
        };
    }

    // 12. current / parent node
    if selector == "." || selector == ".." {
        return Ok(Locator::new(Strategy::XPath, selector));
    }

    // 13. extended selector grammar
    if let Some(compiled) = xpath::compile(selector) {
        return Ok(Locator::new(Strategy::XPath, compiled));
    }

    // 14. role expansion
    if let Some(caps) = ROLE_RE.captures(selector) {
        let css = expand_role(caps.get(1).unwrap().as_str());
        return Ok(Locator::new(Strategy::CssSelector, css));
    }

    // 15. anything else is CSS
    Ok(Locator::new(Strategy::CssSelector, selector))
}

/// Classify an Appium matcher object. The strategy depends on whether the
/// serialized matcher names the Espresso `ViewMatchers` class.
pub fn classify_matcher(matcher: &serde_json::Value) -> Locator {
    let value = matcher.to_string();
    let using = if value.contains("test.espresso.matcher.ViewMatchers") {
        Strategy::AndroidViewMatcher
    } else {
        Strategy::AndroidDataMatcher
    };
    Locator::new(using, value)
}
