//! Wire command construction for the find/element surface.
//!
//! Every locator leaves the engine as `{using, value}` inside one of the four
//! find commands; element commands address the remote reference in the path.
//! Paths and bodies follow the W3C endpoints with the JSONWP fallbacks the
//! legacy dialect still expects.

use crate::transport::Method;
use serde::Deserialize;
use serde_json::{json, Value};
use tiller_core::{ElementRef, Locator, SessionMode};

/// A fully-built protocol command, ready for the channel.
#[derive(Debug, Clone)]
pub struct Command {
    /// Logical command name, used for error attribution and wait gating.
    pub name: &'static str,
    pub method: Method,
    pub path: String,
    pub body: Value,
}

impl Command {
    fn new(name: &'static str, method: Method, path: String, body: Value) -> Self {
        Self {
            name,
            method,
            path,
            body,
        }
    }
}

/// Element geometry as reported by the remote end.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

fn locator_body(locator: &Locator) -> Value {
    json!({ "using": locator.using.as_str(), "value": locator.value })
}

pub fn find_element(session_id: &str, locator: &Locator) -> Command {
    Command::new(
        "findElement",
        Method::Post,
        format!("/session/{session_id}/element"),
        locator_body(locator),
    )
}

pub fn find_elements(session_id: &str, locator: &Locator) -> Command {
    Command::new(
        "findElements",
        Method::Post,
        format!("/session/{session_id}/elements"),
        locator_body(locator),
    )
}

pub fn find_element_from_element(
    session_id: &str,
    scope: &ElementRef,
    locator: &Locator,
) -> Command {
    Command::new(
        "findElementFromElement",
        Method::Post,
        format!("/session/{session_id}/element/{scope}/element"),
        locator_body(locator),
    )
}

pub fn find_elements_from_element(
    session_id: &str,
    scope: &ElementRef,
    locator: &Locator,
) -> Command {
    Command::new(
        "findElementsFromElement",
        Method::Post,
        format!("/session/{session_id}/element/{scope}/elements"),
        locator_body(locator),
    )
}

pub fn execute_sync(session_id: &str, mode: SessionMode, script: &str, args: Vec<Value>) -> Command {
    let path = if mode.w3c {
        format!("/session/{session_id}/execute/sync")
    } else {
        format!("/session/{session_id}/execute")
    };
    Command::new(
        "executeScript",
        Method::Post,
        path,
        json!({ "script": script, "args": args }),
    )
}

/// An element-scoped command; the element reference is substituted into the
/// path at dispatch time so stale recovery can re-issue it unchanged.
#[derive(Debug, Clone)]
pub struct ElementCommand {
    pub name: &'static str,
    pub method: Method,
    /// Path below `/session/{id}/element/{element}`.
    pub tail: String,
    pub body: Value,
}

impl ElementCommand {
    pub fn new(name: &'static str, method: Method, tail: impl Into<String>, body: Value) -> Self {
        Self {
            name,
            method,
            tail: tail.into(),
            body,
        }
    }

    pub fn click() -> Self {
        Self::new("click", Method::Post, "/click", json!({}))
    }

    pub fn clear() -> Self {
        Self::new("clearValue", Method::Post, "/clear", json!({}))
    }

    /// Keystroke body differs between dialects: W3C takes `text`, JSONWP a
    /// `value` array.
    pub fn send_keys(mode: SessionMode, text: &str) -> Self {
        let body = if mode.w3c {
            json!({ "text": text })
        } else {
            json!({ "value": [text] })
        };
        Self::new("setValue", Method::Post, "/value", body)
    }

    pub fn text() -> Self {
        Self::new("getText", Method::Get, "/text", Value::Null)
    }

    pub fn tag_name() -> Self {
        Self::new("getTagName", Method::Get, "/name", Value::Null)
    }

    pub fn attribute(name: &str) -> Self {
        Self::new(
            "getAttribute",
            Method::Get,
            format!("/attribute/{name}"),
            Value::Null,
        )
    }

    pub fn property(name: &str) -> Self {
        Self::new(
            "getProperty",
            Method::Get,
            format!("/property/{name}"),
            Value::Null,
        )
    }

    pub fn css_value(property: &str) -> Self {
        Self::new(
            "getCssValue",
            Method::Get,
            format!("/css/{property}"),
            Value::Null,
        )
    }

    pub fn rect() -> Self {
        Self::new("getRect", Method::Get, "/rect", Value::Null)
    }

    pub fn is_selected() -> Self {
        Self::new("isSelected", Method::Get, "/selected", Value::Null)
    }

    pub fn is_enabled() -> Self {
        Self::new("isEnabled", Method::Get, "/enabled", Value::Null)
    }

    pub fn is_displayed() -> Self {
        Self::new("isDisplayed", Method::Get, "/displayed", Value::Null)
    }

    /// Render against a concrete session and element reference.
    pub fn to_command(&self, session_id: &str, element: &ElementRef) -> Command {
        Command::new(
            self.name,
            self.method,
            format!("/session/{session_id}/element/{element}{}", self.tail),
            self.body.clone(),
        )
    }
}

/// Peel the W3C `{"value": …}` envelope off a response; legacy responses
/// that carry no envelope pass through unchanged.
pub fn unwrap_value(response: Value) -> Value {
    match response {
        Value::Object(mut obj) => match obj.remove("value") {
            Some(value) => value,
            None => Value::Object(obj),
        },
        other => other,
    }
}
