//! Element handles.
//!
//! An [`Element`] is a cheap, clonable handle over one binding node: the
//! selector and index it was found with, a parent link, and (once resolved)
//! the remote reference. Handles are never mutated on staleness: recovery
//! resolves a fresh reference and the engine substitutes it before the one
//! retry, invisibly to the caller.

use crate::engine;
use crate::error::EngineError;
use crate::protocol::{ElementCommand, Rect};
use crate::scripts::RELATION_JS;
use crate::session::SessionInner;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use tiller_core::{ElementRef, Relation, ScriptSelector, Selector};

/// A handle to a remote element, bound to the selector chain that found it.
#[derive(Clone)]
pub struct Element {
    pub(crate) inner: Arc<SessionInner>,
    pub(crate) node: usize,
}

impl fmt::Debug for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let node = self.inner.node(self.node);
        f.debug_struct("Element")
            .field("selector", &node.selector.describe())
            .field("index", &node.index)
            .field("resolved", &node.bound.is_some())
            .finish_non_exhaustive()
    }
}

impl Element {
    pub(crate) fn new(inner: Arc<SessionInner>, node: usize) -> Self {
        Self { inner, node }
    }

    /// The selector this handle was bound with.
    pub fn selector(&self) -> Selector {
        self.inner.node(self.node).selector
    }

    /// Index into the multi-element result set this handle came from, if any.
    pub fn index(&self) -> Option<usize> {
        self.inner.node(self.node).index
    }

    /// The parent handle, or `None` when bound directly on the session root.
    pub fn parent(&self) -> Option<Element> {
        self.inner
            .node(self.node)
            .parent
            .map(|p| Element::new(self.inner.clone(), p))
    }

    /// The current remote reference, if the handle is resolved.
    pub fn element_id(&self) -> Option<ElementRef> {
        self.inner.bound(self.node)
    }

    pub fn is_resolved(&self) -> bool {
        self.element_id().is_some()
    }

    /// The failure recorded when binding last came up empty.
    pub fn binding_error(&self) -> Option<String> {
        self.inner.node(self.node).last_error
    }

    /// This element as a script-execution argument, carrying both identity
    /// keys. `None` while the handle is unresolved.
    pub fn as_script_arg(&self) -> Option<Value> {
        self.element_id().map(|r| r.to_script_arg())
    }

    // ---- scoped finds -----------------------------------------------------

    /// Bind a child element, scoped to this one.
    pub async fn find(&self, selector: impl Into<Selector>) -> Result<Element, EngineError> {
        let node = self
            .inner
            .alloc_node(Some(self.node), selector.into(), None);
        engine::try_bind(&self.inner, node).await?;
        Ok(Element::new(self.inner.clone(), node))
    }

    /// Bind every child element matching the selector. Waits for this
    /// element's own existence first.
    pub async fn find_all(
        &self,
        selector: impl Into<Selector>,
    ) -> Result<Vec<Element>, EngineError> {
        let selector = selector.into();
        let scope = engine::bind_chain(&self.inner, self.node, true, "findElements").await?;
        let refs = engine::find_refs(&self.inner, Some(&scope), &selector, true).await?;
        let mut elements = Vec::with_capacity(refs.len());
        for (index, reference) in refs.into_iter().enumerate() {
            let node = self
                .inner
                .alloc_node(Some(self.node), selector.clone(), Some(index));
            self.inner.set_bound(node, reference);
            elements.push(Element::new(self.inner.clone(), node));
        }
        Ok(elements)
    }

    /// The structural parent of this element.
    pub async fn parent_element(&self) -> Result<Element, EngineError> {
        self.relation(Relation::Parent).await
    }

    /// The following sibling of this element.
    pub async fn next_element(&self) -> Result<Element, EngineError> {
        self.relation(Relation::NextSibling).await
    }

    /// The preceding sibling of this element.
    pub async fn previous_element(&self) -> Result<Element, EngineError> {
        self.relation(Relation::PreviousSibling).await
    }

    async fn relation(&self, relation: Relation) -> Result<Element, EngineError> {
        let selector = Selector::Script(ScriptSelector::for_relation(relation, RELATION_JS));
        let node = self.inner.alloc_node(Some(self.node), selector, None);
        engine::try_bind(&self.inner, node).await?;
        Ok(Element::new(self.inner.clone(), node))
    }

    // ---- commands ---------------------------------------------------------

    pub async fn click(&self) -> Result<(), EngineError> {
        self.run(ElementCommand::click()).await.map(|_| ())
    }

    pub async fn clear(&self) -> Result<(), EngineError> {
        self.run(ElementCommand::clear()).await.map(|_| ())
    }

    /// Send keystrokes to the element.
    pub async fn send_keys(&self, text: &str) -> Result<(), EngineError> {
        self.run(ElementCommand::send_keys(self.inner.config.mode, text))
            .await
            .map(|_| ())
    }

    /// Clear the element, then send keystrokes.
    pub async fn set_value(&self, text: &str) -> Result<(), EngineError> {
        self.clear().await?;
        self.send_keys(text).await
    }

    pub async fn text(&self) -> Result<String, EngineError> {
        self.run(ElementCommand::text()).await.map(as_string)
    }

    pub async fn tag_name(&self) -> Result<String, EngineError> {
        self.run(ElementCommand::tag_name()).await.map(as_string)
    }

    /// An attribute value, or `None` when the attribute is absent.
    pub async fn attribute(&self, name: &str) -> Result<Option<String>, EngineError> {
        let value = self.run(ElementCommand::attribute(name)).await?;
        Ok(match value {
            Value::Null => None,
            other => Some(as_string(other)),
        })
    }

    pub async fn property(&self, name: &str) -> Result<Value, EngineError> {
        self.run(ElementCommand::property(name)).await
    }

    pub async fn css_value(&self, property: &str) -> Result<String, EngineError> {
        self.run(ElementCommand::css_value(property))
            .await
            .map(as_string)
    }

    pub async fn rect(&self) -> Result<Rect, EngineError> {
        let value = self.run(ElementCommand::rect()).await?;
        serde_json::from_value(value.clone())
            .map_err(|_| EngineError::Response(format!("unexpected rect payload: {value}")))
    }

    pub async fn is_selected(&self) -> Result<bool, EngineError> {
        self.run(ElementCommand::is_selected()).await.map(as_bool)
    }

    pub async fn is_enabled(&self) -> Result<bool, EngineError> {
        self.run(ElementCommand::is_enabled()).await.map(as_bool)
    }

    /// Visibility probe. Absent elements are simply not displayed; no
    /// implicit wait is applied.
    pub async fn is_displayed(&self) -> Result<bool, EngineError> {
        match self.run(ElementCommand::is_displayed()).await {
            Ok(value) => Ok(as_bool(value)),
            Err(EngineError::NotFound(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Existence probe with a fresh lookup; never waits.
    pub async fn is_existing(&self) -> Result<bool, EngineError> {
        engine::exists_now(&self.inner, self.node).await
    }

    /// Block until the element exists, bounded by the implicit-wait timeout.
    pub async fn wait_for_exist(&self) -> Result<(), EngineError> {
        engine::replay(&self.inner, self.node, "waitForExist", true)
            .await
            .map(|_| ())
    }

    async fn run(&self, command: ElementCommand) -> Result<Value, EngineError> {
        engine::run(&self.inner, self.node, &command).await
    }
}

fn as_string(value: Value) -> String {
    match value {
        Value::String(s) => s,
        other => other.to_string(),
    }
}

fn as_bool(value: Value) -> bool {
    value.as_bool().unwrap_or(false)
}
