//! The session root and its binding-node arena.
//!
//! A [`Session`] is the browser end of the object model: it owns the command
//! channel, the per-session custom-strategy registry, and the arena of
//! binding nodes the retry engine walks during stale recovery. Independent
//! sessions share nothing; multiremote is simply several `Session` values.

use crate::config::SessionConfig;
use crate::element::Element;
use crate::engine;
use crate::error::EngineError;
use crate::protocol::{self, Command};
use crate::transport::{CommandChannel, ScriptExecutor, TransportError};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex};
use tiller_core::{ElementRef, Selector, SessionMode};

/// One binding node: the selector/index an element was found with, plus the
/// parent link the recovery chain walks. The resolved reference is cached
/// here so sibling handles over the same node stay in sync.
#[derive(Debug, Clone)]
pub(crate) struct BindingNode {
    pub(crate) parent: Option<usize>,
    pub(crate) selector: Selector,
    pub(crate) index: Option<usize>,
    pub(crate) bound: Option<ElementRef>,
    pub(crate) last_error: Option<String>,
}

pub(crate) struct SessionInner {
    pub(crate) channel: Box<dyn CommandChannel>,
    pub(crate) session_id: String,
    pub(crate) config: SessionConfig,
    strategies: Mutex<HashMap<String, String>>,
    arena: Mutex<Vec<BindingNode>>,
}

impl SessionInner {
    pub(crate) fn alloc_node(
        &self,
        parent: Option<usize>,
        selector: Selector,
        index: Option<usize>,
    ) -> usize {
        let mut arena = self.arena.lock().unwrap();
        arena.push(BindingNode {
            parent,
            selector,
            index,
            bound: None,
            last_error: None,
        });
        arena.len() - 1
    }

    pub(crate) fn node(&self, id: usize) -> BindingNode {
        self.arena.lock().unwrap()[id].clone()
    }

    pub(crate) fn bound(&self, id: usize) -> Option<ElementRef> {
        self.arena.lock().unwrap()[id].bound.clone()
    }

    pub(crate) fn set_bound(&self, id: usize, reference: ElementRef) {
        let mut arena = self.arena.lock().unwrap();
        arena[id].bound = Some(reference);
        arena[id].last_error = None;
    }

    pub(crate) fn record_error(&self, id: usize, message: String) {
        let mut arena = self.arena.lock().unwrap();
        arena[id].bound = None;
        arena[id].last_error = Some(message);
    }

    pub(crate) fn strategy_source(&self, name: &str) -> Option<String> {
        self.strategies.lock().unwrap().get(name).cloned()
    }

    pub(crate) async fn send(&self, command: &Command) -> Result<Value, TransportError> {
        self.channel
            .send(command.method, &command.path, command.body.clone())
            .await
    }
}

#[async_trait]
impl ScriptExecutor for SessionInner {
    async fn execute(&self, script: &str, args: Vec<Value>) -> Result<Value, TransportError> {
        let command = protocol::execute_sync(&self.session_id, self.config.mode, script, args);
        self.send(&command).await.map(protocol::unwrap_value)
    }
}

/// A bound remote automation session.
#[derive(Clone)]
pub struct Session {
    pub(crate) inner: Arc<SessionInner>,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("session_id", &self.inner.session_id)
            .field("mode", &self.inner.config.mode)
            .finish_non_exhaustive()
    }
}

impl Session {
    /// Wrap an established remote session. The channel is the session's one
    /// logical command pipe; the engine issues at most one exchange on it at
    /// a time.
    pub fn new(
        channel: Box<dyn CommandChannel>,
        session_id: impl Into<String>,
        config: SessionConfig,
    ) -> Self {
        Self {
            inner: Arc::new(SessionInner {
                channel,
                session_id: session_id.into(),
                config,
                strategies: Mutex::new(HashMap::new()),
                arena: Mutex::new(Vec::new()),
            }),
        }
    }

    pub fn session_id(&self) -> &str {
        &self.inner.session_id
    }

    pub fn config(&self) -> &SessionConfig {
        &self.inner.config
    }

    pub fn mode(&self) -> SessionMode {
        self.inner.config.mode
    }

    /// Bind an element for the given selector.
    ///
    /// The find is attempted once right away; when nothing matches yet the
    /// handle is returned unresolved with the failure recorded, and the first
    /// command on it runs the implicit existence wait. Selector and strategy
    /// errors are not deferred; they surface here.
    pub async fn find(&self, selector: impl Into<Selector>) -> Result<Element, EngineError> {
        let node = self
            .inner
            .alloc_node(None, selector.into(), None);
        engine::try_bind(&self.inner, node).await?;
        Ok(Element::new(self.inner.clone(), node))
    }

    /// Bind every element matching the selector, each handle carrying its
    /// index into the result set.
    pub async fn find_all(&self, selector: impl Into<Selector>) -> Result<Vec<Element>, EngineError> {
        let selector = selector.into();
        let refs = engine::find_refs(&self.inner, None, &selector, true).await?;
        let mut elements = Vec::with_capacity(refs.len());
        for (index, reference) in refs.into_iter().enumerate() {
            let node = self
                .inner
                .alloc_node(None, selector.clone(), Some(index));
            self.inner.set_bound(node, reference);
            elements.push(Element::new(self.inner.clone(), node));
        }
        Ok(elements)
    }

    /// Bind an element through a caller-registered custom strategy.
    pub async fn find_custom(
        &self,
        name: impl Into<String>,
        args: Vec<Value>,
    ) -> Result<Element, EngineError> {
        self.find(Selector::Custom {
            name: name.into(),
            args,
        })
        .await
    }

    /// Register a custom find strategy: in-page JavaScript that receives the
    /// registered arguments (scope element appended last) and returns the
    /// matched node(s). Duplicate names are rejected.
    pub fn register_strategy(
        &self,
        name: impl Into<String>,
        source: impl Into<String>,
    ) -> Result<(), EngineError> {
        let name = name.into();
        let mut strategies = self.inner.strategies.lock().unwrap();
        if strategies.contains_key(&name) {
            return Err(EngineError::DuplicateStrategy(name));
        }
        strategies.insert(name, source.into());
        Ok(())
    }

    /// Execute JavaScript in the page. Element arguments belong in the list
    /// as their script-argument encoding (see [`Element::as_script_arg`]).
    pub async fn execute_script(
        &self,
        script: &str,
        args: Vec<Value>,
    ) -> Result<Value, EngineError> {
        Ok(self.inner.execute(script, args).await?)
    }
}

#[async_trait]
impl ScriptExecutor for Session {
    async fn execute(&self, script: &str, args: Vec<Value>) -> Result<Value, TransportError> {
        self.inner.execute(script, args).await
    }
}
