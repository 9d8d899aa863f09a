mod common;

use common::{no_such_element, session_with, stale, FakeChannel};
use serde_json::json;
use tiller::{EngineError, Selector};

#[tokio::test]
async fn stale_recovery_replays_the_chain_root_first() {
    let channel = FakeChannel::new();
    let session = session_with(channel.clone());

    // browser.$('div').$$('.item')[2].$('.label')
    channel.push_element("div-1");
    let div = session.find("div").await.unwrap();

    channel.push_elements(&["item-0", "item-1", "item-2"]);
    let items = div.find_all(".item").await.unwrap();
    assert_eq!(items.len(), 3);
    let item = items[2].clone();
    assert_eq!(item.index(), Some(2));

    channel.push_element("label-1");
    let label = item.find(".label").await.unwrap();
    assert_eq!(label.element_id().unwrap().as_str(), "label-1");

    // the label goes stale; replay re-resolves div → .item[2] → .label
    channel.push_error(stale());
    channel.push_element("div-2");
    channel.push_elements(&["fresh-0", "fresh-1", "fresh-2"]);
    channel.push_element("label-2");
    channel.push_value(json!("Price"));

    let text = label.text().await.unwrap();
    assert_eq!(text, "Price");

    // the handle now carries the fresh reference, same logical chain
    assert_eq!(label.element_id().unwrap().as_str(), "label-2");
    assert_eq!(label.selector(), Selector::from(".label"));

    let paths = channel.paths();
    assert_eq!(
        paths,
        vec![
            "/session/sess/element".to_string(),               // bind div
            "/session/sess/element/div-1/elements".to_string(), // bind .item list
            "/session/sess/element/item-2/element".to_string(), // bind .label
            "/session/sess/element/label-1/text".to_string(),   // stale answer
            "/session/sess/element".to_string(),                // replay: div
            "/session/sess/element/div-2/elements".to_string(), // replay: .item (indexed)
            "/session/sess/element/fresh-2/element".to_string(), // replay: .label
            "/session/sess/element/label-2/text".to_string(),   // retried command
        ]
    );
}

#[tokio::test]
async fn broken_intermediate_hop_fails_naming_that_hop() {
    let channel = FakeChannel::new();
    let session = session_with(channel.clone());

    channel.push_element("div-1");
    let div = session.find("div").await.unwrap();
    channel.push_elements(&["item-0", "item-1", "item-2"]);
    let items = div.find_all(".item").await.unwrap();
    channel.push_element("label-1");
    let label = items[2].find(".label").await.unwrap();

    // stale, then the .item collection only holds one element from now on
    channel.push_error(stale());
    channel.push_element("div-2");
    channel.set_fallback(Ok(json!({ "value": [{ tiller::W3C_ELEMENT_KEY: "only-0" }] })));

    let err = label.text().await.unwrap_err();
    match err {
        EngineError::NotFound(not_found) => {
            assert_eq!(not_found.selector, ".item");
            assert_eq!(not_found.command, "getText");
        }
        other => panic!("expected NotFound for the .item hop, got {other:?}"),
    }
}

#[tokio::test]
async fn second_staleness_in_one_call_is_a_hard_failure() {
    let channel = FakeChannel::new();
    let session = session_with(channel.clone());

    channel.push_element("div-1");
    let div = session.find("div").await.unwrap();

    channel.push_error(stale()); // click fails
    channel.push_element("div-2"); // replay succeeds
    channel.push_error(stale()); // retried click fails again

    let err = div.click().await.unwrap_err();
    match err {
        EngineError::Stale { selector, command } => {
            assert_eq!(selector, "div");
            assert_eq!(command, "click");
        }
        other => panic!("expected Stale, got {other:?}"),
    }
}

#[tokio::test]
async fn unbound_handle_waits_for_existence_before_commands() {
    let channel = FakeChannel::new();
    let session = session_with(channel.clone());

    // nothing matches at bind time: the handle is created unresolved
    channel.push_error(no_such_element());
    let element = session.find("div.late").await.unwrap();
    assert!(!element.is_resolved());
    assert!(element.binding_error().is_some());

    // first command polls existence until the element appears
    channel.push_error(no_such_element());
    channel.push_element("late-1");
    channel.push_value(json!("hello"));

    assert_eq!(element.text().await.unwrap(), "hello");
    assert!(element.is_resolved());
}

#[tokio::test]
async fn existence_timeout_names_selector_and_command() {
    let channel = FakeChannel::new();
    let session = session_with(channel.clone());

    channel.set_fallback(Err(no_such_element()));
    let element = session.find("div.missing").await.unwrap();

    let err = element.text().await.unwrap_err();
    let message = err.to_string();
    assert!(
        message.contains("can't call \"getText\" on element (\"div.missing\")"),
        "unexpected message: {message}"
    );
    assert!(message.contains("200ms"), "unexpected message: {message}");
}

#[tokio::test]
async fn is_existing_answers_immediately_without_polling() {
    let channel = FakeChannel::new();
    let session = session_with(channel.clone());

    channel.set_fallback(Err(no_such_element()));
    let element = session.find("div.missing").await.unwrap();
    let before = channel.request_count();

    assert!(!element.is_existing().await.unwrap());

    // exactly one probe, no implicit-wait polling
    assert_eq!(channel.request_count(), before + 1);
}

#[tokio::test]
async fn is_displayed_treats_absence_as_not_displayed() {
    let channel = FakeChannel::new();
    let session = session_with(channel.clone());

    channel.set_fallback(Err(no_such_element()));
    let element = session.find("div.hidden").await.unwrap();
    assert!(!element.is_displayed().await.unwrap());
}

#[tokio::test]
async fn relation_not_found_names_the_relation() {
    let channel = FakeChannel::new();
    let session = session_with(channel.clone());

    channel.push_element("card-1");
    let card = session.find("div.card").await.unwrap();

    // the relation script keeps answering null: no parent exists
    channel.set_fallback(Ok(json!({ "value": null })));
    let parent = card.parent_element().await.unwrap();
    assert!(!parent.is_resolved());

    let err = parent.click().await.unwrap_err();
    let message = err.to_string();
    assert!(
        message.contains("can't call \"click\" on the parent element of element (\"div.card\")"),
        "unexpected message: {message}"
    );
}

#[tokio::test]
async fn non_stale_remote_failures_surface_unmodified() {
    let channel = FakeChannel::new();
    let session = session_with(channel.clone());

    channel.push_element("div-1");
    let div = session.find("div").await.unwrap();

    channel.push_error(tiller::TransportError::wire(
        "invalid element state",
        "element not interactable",
    ));
    let err = div.click().await.unwrap_err();
    match err {
        EngineError::Wire(e) => {
            assert_eq!(e.to_string(), "invalid element state: element not interactable");
        }
        other => panic!("expected the wire error untouched, got {other:?}"),
    }
    // no replay was attempted
    assert_eq!(channel.request_count(), 2);
}

#[tokio::test]
async fn wait_for_exist_rebinds_with_a_fresh_lookup() {
    let channel = FakeChannel::new();
    let session = session_with(channel.clone());

    channel.push_error(no_such_element());
    let element = session.find("p.note").await.unwrap();

    channel.push_error(no_such_element());
    channel.push_element("note-1");
    element.wait_for_exist().await.unwrap();
    assert_eq!(element.element_id().unwrap().as_str(), "note-1");
}
