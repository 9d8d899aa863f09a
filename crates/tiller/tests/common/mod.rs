//! Scripted fake transport for engine tests.
#![allow(dead_code)]

use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tiller::{CommandChannel, Method, Session, SessionConfig, TransportError, W3C_ELEMENT_KEY};

#[derive(Default)]
struct State {
    queue: Mutex<VecDeque<Result<Value, TransportError>>>,
    fallback: Mutex<Option<Result<Value, TransportError>>>,
    log: Mutex<Vec<(Method, String, Value)>>,
}

/// A command channel answering from a scripted queue, recording every
/// request. When the queue runs dry the configured fallback answer repeats,
/// which keeps poll loops deterministic.
#[derive(Clone, Default)]
pub struct FakeChannel {
    state: Arc<State>,
}

impl FakeChannel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, response: Result<Value, TransportError>) {
        self.state.queue.lock().unwrap().push_back(response);
    }

    /// Queue a successful find answer carrying one element reference.
    pub fn push_element(&self, id: &str) {
        self.push(Ok(json!({ "value": { W3C_ELEMENT_KEY: id } })));
    }

    /// Queue a successful find-all answer.
    pub fn push_elements(&self, ids: &[&str]) {
        let refs: Vec<Value> = ids
            .iter()
            .map(|id| json!({ W3C_ELEMENT_KEY: id }))
            .collect();
        self.push(Ok(json!({ "value": refs })));
    }

    /// Queue an arbitrary enveloped value.
    pub fn push_value(&self, value: Value) {
        self.push(Ok(json!({ "value": value })));
    }

    pub fn push_error(&self, error: TransportError) {
        self.push(Err(error));
    }

    /// Answer repeated once the queue is empty.
    pub fn set_fallback(&self, response: Result<Value, TransportError>) {
        *self.state.fallback.lock().unwrap() = Some(response);
    }

    pub fn requests(&self) -> Vec<(Method, String, Value)> {
        self.state.log.lock().unwrap().clone()
    }

    pub fn paths(&self) -> Vec<String> {
        self.requests().into_iter().map(|(_, p, _)| p).collect()
    }

    pub fn request_count(&self) -> usize {
        self.state.log.lock().unwrap().len()
    }
}

#[async_trait]
impl CommandChannel for FakeChannel {
    async fn send(&self, method: Method, path: &str, body: Value) -> Result<Value, TransportError> {
        self.state
            .log
            .lock()
            .unwrap()
            .push((method, path.to_string(), body));
        if let Some(response) = self.state.queue.lock().unwrap().pop_front() {
            return response;
        }
        if let Some(fallback) = self.state.fallback.lock().unwrap().clone() {
            return fallback;
        }
        Err(TransportError::Connection(format!(
            "unexpected command: {path}"
        )))
    }
}

pub fn no_such_element() -> TransportError {
    TransportError::wire("no such element", "Unable to locate element")
}

pub fn stale() -> TransportError {
    TransportError::wire(
        "stale element reference",
        "stale element reference: element is not attached to the page document",
    )
}

/// A session over the fake channel with test-friendly wait settings.
pub fn session_with(channel: FakeChannel) -> Session {
    let config = SessionConfig::default()
        .with_implicit_timeout(Duration::from_millis(200))
        .with_poll_interval(Duration::from_millis(10));
    Session::new(Box::new(channel), "sess", config)
}
