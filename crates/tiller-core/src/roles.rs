//! ARIA role expansion into native HTML equivalents.
//!
//! `[role=button]` should find `<div role="button">` but also the native
//! elements that imply the role without declaring it. The relation table
//! below covers the implicit role mappings of everyday HTML.

/// role → native element/attribute combinations implying that role.
const ROLE_ELEMENTS: &[(&str, &[&str])] = &[
    (
        "button",
        &[
            "button",
            "input[type=\"button\"]",
            "input[type=\"submit\"]",
            "input[type=\"reset\"]",
            "input[type=\"image\"]",
            "summary",
        ],
    ),
    ("checkbox", &["input[type=\"checkbox\"]"]),
    ("radio", &["input[type=\"radio\"]"]),
    ("link", &["a[href]", "area[href]"]),
    ("heading", &["h1", "h2", "h3", "h4", "h5", "h6"]),
    (
        "textbox",
        &["textarea", "input[type=\"text\"]", "input:not([type])"],
    ),
    ("searchbox", &["input[type=\"search\"]"]),
    ("spinbutton", &["input[type=\"number\"]"]),
    ("slider", &["input[type=\"range\"]"]),
    ("combobox", &["select"]),
    ("option", &["option"]),
    ("list", &["ul", "ol", "menu"]),
    ("listitem", &["li"]),
    ("img", &["img"]),
    ("progressbar", &["progress"]),
    ("table", &["table"]),
    ("row", &["tr"]),
    ("rowgroup", &["tbody", "thead", "tfoot"]),
    ("cell", &["td"]),
    ("columnheader", &["th[scope=\"col\"]"]),
    ("rowheader", &["th[scope=\"row\"]"]),
    ("separator", &["hr"]),
    ("banner", &["header"]),
    ("navigation", &["nav"]),
    ("main", &["main"]),
    ("contentinfo", &["footer"]),
    ("complementary", &["aside"]),
    ("article", &["article"]),
    ("form", &["form"]),
    ("figure", &["figure"]),
    ("dialog", &["dialog"]),
    ("group", &["fieldset", "optgroup", "details"]),
    ("term", &["dt", "dfn"]),
    ("definition", &["dd"]),
];

/// Expand a role name into a CSS union of the explicit `[role=…]` attribute
/// form and every native equivalent. Unknown roles still match the explicit
/// attribute form.
pub fn expand_role(role: &str) -> String {
    let lower = role.to_ascii_lowercase();
    let mut parts = vec![format!("[role=\"{role}\"]")];
    if let Some((_, selectors)) = ROLE_ELEMENTS.iter().find(|(name, _)| *name == lower) {
        parts.extend(selectors.iter().map(|s| s.to_string()));
    }
    parts.join(", ")
}
