mod common;

use common::{session_with, FakeChannel};
use serde_json::json;
use tiller::{
    AriaSelector, EngineError, Method, Selector, SelectorError, Strictness, LEGACY_ELEMENT_KEY,
    W3C_ELEMENT_KEY,
};

#[tokio::test]
async fn selector_errors_surface_before_any_exchange() {
    let channel = FakeChannel::new();
    let session = session_with(channel.clone());

    let err = session.find("tag name:div").await.unwrap_err();
    assert!(matches!(
        err,
        EngineError::Selector(SelectorError::InvalidStrategy { .. })
    ));
    assert_eq!(channel.request_count(), 0);
}

#[tokio::test]
async fn find_sends_the_canonical_locator() {
    let channel = FakeChannel::new();
    let session = session_with(channel.clone());

    channel.push_element("e1");
    session.find("~submit").await.unwrap();

    let (method, path, body) = channel.requests().remove(0);
    assert_eq!(method, Method::Post);
    assert_eq!(path, "/session/sess/element");
    assert_eq!(body, json!({ "using": "accessibility id", "value": "submit" }));
}

#[tokio::test]
async fn find_all_binds_indexed_handles() {
    let channel = FakeChannel::new();
    let session = session_with(channel.clone());

    channel.push_elements(&["a", "b", "c"]);
    let rows = session.find_all("tr").await.unwrap();
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0].index(), Some(0));
    assert_eq!(rows[1].index(), Some(1));
    assert_eq!(rows[1].element_id().unwrap().as_str(), "b");
    assert!(rows[2].parent().is_none());
}

#[tokio::test]
async fn legacy_element_key_is_understood() {
    let channel = FakeChannel::new();
    let session = session_with(channel.clone());

    channel.push(Ok(json!({ "value": { LEGACY_ELEMENT_KEY: "legacy-1" } })));
    let element = session.find("#app").await.unwrap();
    assert_eq!(element.element_id().unwrap().as_str(), "legacy-1");

    let arg = element.as_script_arg().unwrap();
    assert_eq!(arg[W3C_ELEMENT_KEY], "legacy-1");
    assert_eq!(arg[LEGACY_ELEMENT_KEY], "legacy-1");
}

#[tokio::test]
async fn shadow_selector_expands_to_a_piercing_query() {
    let channel = FakeChannel::new();
    let session = session_with(channel.clone());

    channel.push(Ok(json!({ "value": { W3C_ELEMENT_KEY: "deep-1" } })));
    let element = session.find(">>>.panel .btn").await.unwrap();
    assert_eq!(element.element_id().unwrap().as_str(), "deep-1");

    let (_, path, body) = channel.requests().remove(0);
    assert_eq!(path, "/session/sess/execute/sync");
    let script = body["script"].as_str().unwrap();
    assert!(script.contains("shadowRoot"));
    assert_eq!(body["args"], json!([".panel .btn", false, null]));
}

#[tokio::test]
async fn aria_selector_runs_the_accessible_name_script() {
    let channel = FakeChannel::new();
    let session = session_with(channel.clone());

    channel.push(Ok(json!({
        "value": {
            "elements": [{ W3C_ELEMENT_KEY: "btn-1" }],
            "descriptors": ["<button> \"Submit\""],
            "capHit": false,
        }
    })));
    let element = session.find("aria/Submit").await.unwrap();
    assert_eq!(element.element_id().unwrap().as_str(), "btn-1");

    let (_, path, body) = channel.requests().remove(0);
    assert_eq!(path, "/session/sess/execute/sync");
    assert!(body["script"].as_str().unwrap().contains("capHit"));
    assert_eq!(body["args"][0], "Submit");
    assert_eq!(body["args"][1], json!(null));
}

#[tokio::test]
async fn strict_accessibility_selector_rejects_ambiguity() {
    let channel = FakeChannel::new();
    let session = session_with(channel.clone());

    channel.push(Ok(json!({
        "value": {
            "elements": [{ W3C_ELEMENT_KEY: "b1" }, { W3C_ELEMENT_KEY: "b2" }],
            "descriptors": ["<button> \"Submit\"", "<button> \"Submit\""],
            "capHit": false,
        }
    })));
    let selector = AriaSelector::named("Submit").with_strictness(Strictness::Strict);
    let err = session.find(selector).await.unwrap_err();
    match err {
        EngineError::StrictSelector { matches, .. } => assert_eq!(matches, 2),
        other => panic!("expected StrictSelector, got {other:?}"),
    }
}

#[tokio::test]
async fn warn_accessibility_selector_returns_first_match() {
    let channel = FakeChannel::new();
    let session = session_with(channel.clone());

    channel.push(Ok(json!({
        "value": {
            "elements": [{ W3C_ELEMENT_KEY: "b1" }, { W3C_ELEMENT_KEY: "b2" }],
            "descriptors": ["<button> \"Submit\"", "<button> \"Submit\""],
            "capHit": false,
        }
    })));
    let selector = AriaSelector::named("Submit").with_strictness(Strictness::Warn);
    let element = session.find(selector).await.unwrap();
    assert_eq!(element.element_id().unwrap().as_str(), "b1");
}

#[tokio::test]
async fn custom_strategies_are_per_session_and_unique() {
    let channel = FakeChannel::new();
    let session = session_with(channel.clone());

    session
        .register_strategy("datacy", "return document.querySelector('[data-cy=' + arguments[0] + ']');")
        .unwrap();
    let err = session.register_strategy("datacy", "return null;").unwrap_err();
    assert!(matches!(err, EngineError::DuplicateStrategy(name) if name == "datacy"));

    // a second session knows nothing about the strategy
    let other = session_with(FakeChannel::new());
    let err = other
        .find_custom("datacy", vec![json!("submit")])
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::UnknownStrategy(name) if name == "datacy"));
}

#[tokio::test]
async fn custom_strategy_executes_with_scope_appended() {
    let channel = FakeChannel::new();
    let session = session_with(channel.clone());
    session
        .register_strategy("datacy", "return document.querySelector('[data-cy=' + arguments[0] + ']');")
        .unwrap();

    channel.push(Ok(json!({ "value": { W3C_ELEMENT_KEY: "cy-1" } })));
    let element = session
        .find_custom("datacy", vec![json!("submit")])
        .await
        .unwrap();
    assert_eq!(element.element_id().unwrap().as_str(), "cy-1");

    let (_, path, body) = channel.requests().remove(0);
    assert_eq!(path, "/session/sess/execute/sync");
    assert_eq!(body["args"], json!(["submit", null]));
}

#[tokio::test]
async fn pre_resolved_references_bind_without_lookup() {
    let channel = FakeChannel::new();
    let session = session_with(channel.clone());

    let element = session
        .find(Selector::Existing(tiller::ElementRef::new("node-9")))
        .await
        .unwrap();
    assert!(element.is_resolved());
    assert_eq!(channel.request_count(), 0); // no lookup needed

    channel.push_value(json!("ok"));
    assert_eq!(element.text().await.unwrap(), "ok");
}

#[tokio::test]
async fn execute_script_unwraps_the_envelope() {
    let channel = FakeChannel::new();
    let session = session_with(channel.clone());

    channel.push_value(json!({ "title": "home" }));
    let value = session
        .execute_script("return { title: document.title };", vec![])
        .await
        .unwrap();
    assert_eq!(value, json!({ "title": "home" }));
}

#[tokio::test]
async fn matcher_selectors_serialize_to_the_wire() {
    let channel = FakeChannel::new();
    let mut config = tiller::SessionConfig::default();
    config.mode = tiller::SessionMode::mobile(true);
    let session = tiller::Session::new(Box::new(channel.clone()), "sess", config);

    channel.push_element("m-1");
    let matcher = json!({
        "name": "withText",
        "args": "Next",
        "class": "androidx.test.espresso.matcher.ViewMatchers",
    });
    session.find(Selector::Matcher(matcher)).await.unwrap();

    let (_, _, body) = channel.requests().remove(0);
    assert_eq!(body["using"], "-android viewmatcher");
    assert!(body["value"].as_str().unwrap().contains("withText"));
}
