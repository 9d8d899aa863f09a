//! Extended selector grammar → XPath compilation.
//!
//! The grammar accepts an optional tag name, an optional `.class` or `#id`
//! qualifier, an optional `[attr]` / `[attr="val"]` qualifier, an optional
//! trailing `.` (case-insensitive flag), then either `=text` (exact) or
//! `*=text` (substring). Examples:
//!
//! - `h1.header=Welcome`: `<h1>` with the `header` class token and exact
//!   normalized text `Welcome`.
//! - `#content*=Intro`: any element whose id contains `content` and whose
//!   text contains `Intro`.
//!
//! Exact matches exclude nodes whose subtree already holds a qualifying
//! contains-match (innermost wins) and, when no tag/class/attr qualifier
//! was given, union a bare normalized-text clause as a fallback. The two
//! union branches keep their textual order: the qualified clause first, the
//! bare-text fallback second.

use regex::Regex;
use std::sync::LazyLock;

const UPPER: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const LOWER: &str = "abcdefghijklmnopqrstuvwxyz";

static EXTENDED_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?s)^([a-zA-Z][a-zA-Z0-9-]*)?(?:([.#])([\w-]+))?(?:\[([\w-]+)(?:=(?:"([^"]*)"|'([^']*)'))?\])?(\.)?(\*?=)(.+)$"#,
    )
    .unwrap()
});

/// Compile an extended selector into an XPath expression, or `None` when the
/// text does not match the grammar.
pub fn compile(selector: &str) -> Option<String> {
    let caps = EXTENDED_RE.captures(selector)?;

    let tag = caps.get(1).map(|m| m.as_str()).unwrap_or("");
    let prefix = caps.get(2).map(|m| m.as_str());
    let name = caps.get(3).map(|m| m.as_str()).unwrap_or("");
    let attr_name = caps.get(4).map(|m| m.as_str());
    let attr_value = caps.get(5).or_else(|| caps.get(6)).map(|m| m.as_str());
    let insensitive = caps.get(7).is_some();
    let partial = &caps[8] == "*=";
    let query = &caps[9];

    let node = if tag.is_empty() { "*" } else { tag };

    let mut conditions: Vec<String> = Vec::new();
    match prefix {
        Some(".") => conditions.push(format!(
            r#"contains(concat(" ",@class," ")," {name} ")"#
        )),
        Some("#") => conditions.push(format!(r#"contains(@id,"{name}")"#)),
        _ => {}
    }
    if let Some(attr) = attr_name {
        match attr_value {
            Some(value) => {
                conditions.push(format!("contains(@{attr},{})", xpath_literal(value)))
            }
            None => conditions.push(format!("@{attr}")),
        }
    }
    let unqualified = tag.is_empty() && conditions.is_empty();

    let query = if insensitive {
        query.to_lowercase()
    } else {
        query.to_string()
    };
    let literal = xpath_literal(&query);

    let exact_subject = if insensitive {
        format!(r#"translate(normalize-space(),"{UPPER}","{LOWER}")"#)
    } else {
        "normalize-space()".to_string()
    };
    let contains_subject = if insensitive {
        format!(r#"translate(.,"{UPPER}","{LOWER}")"#)
    } else {
        ".".to_string()
    };

    let base = conditions.join(" and ");
    let with_base = |extra: String| {
        if base.is_empty() {
            extra
        } else {
            format!("{base} and {extra}")
        }
    };

    // Innermost-match guard shared by both match kinds: drop any node whose
    // subtree already satisfies the same qualifiers with a contains-match.
    let contains_cond = with_base(format!("contains({contains_subject}, {literal})"));
    let dedup = format!("not(.//{node}[{contains_cond}])");

    let value = if partial {
        format!(".//{node}[{contains_cond} and {dedup}]")
    } else {
        let exact_cond = with_base(format!("{exact_subject} = {literal}"));
        let qualified = format!(".//{node}[{exact_cond} and {dedup}]");
        if unqualified {
            format!("{qualified} | .//*[{exact_subject} = {literal}]")
        } else {
            qualified
        }
    };

    Some(value)
}

/// Render a string as an XPath literal, falling back to `concat()` when the
/// text mixes quote characters.
fn xpath_literal(text: &str) -> String {
    if !text.contains('"') {
        return format!("\"{text}\"");
    }
    if !text.contains('\'') {
        return format!("'{text}'");
    }
    let parts: Vec<String> = text.split('"').map(|p| format!("\"{p}\"")).collect();
    format!("concat({})", parts.join(",'\"',"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_css_does_not_match() {
        assert!(compile("div.foo").is_none());
        assert!(compile("#content").is_none());
        assert!(compile("input[type=\"text\"]").is_none());
        assert!(compile("div .nested").is_none());
    }

    #[test]
    fn literal_quoting() {
        assert_eq!(xpath_literal("plain"), "\"plain\"");
        assert_eq!(xpath_literal("say \"hi\""), "'say \"hi\"'");
        assert_eq!(
            xpath_literal("it's \"both\""),
            "concat(\"it's \",'\"',\"both\",'\"',\"\")"
        );
    }
}
