//! Capability traits shared by browser-rooted handles.
//!
//! Sessions and elements share the command-capable surface; elements
//! additionally expose their lineage. The custom-strategy registry lives on
//! the session and is threaded through construction, so commands registered
//! against one session never leak into another.

use crate::element::Element;
use crate::error::EngineError;
use crate::session::Session;
use async_trait::async_trait;
use serde_json::Value;
use tiller_core::{Selector, SessionMode};

/// The capability set common to every handle rooted in a session.
#[async_trait]
pub trait CommandCapable {
    fn mode(&self) -> SessionMode;

    /// Execute JavaScript in the page this handle belongs to.
    async fn execute_script(&self, script: &str, args: Vec<Value>)
        -> Result<Value, EngineError>;
}

/// Lineage of handles that were found through a parent.
pub trait OwnedByParent {
    fn selector(&self) -> Selector;
    fn index(&self) -> Option<usize>;
    fn parent(&self) -> Option<Element>;
}

#[async_trait]
impl CommandCapable for Session {
    fn mode(&self) -> SessionMode {
        self.inner.config.mode
    }

    async fn execute_script(
        &self,
        script: &str,
        args: Vec<Value>,
    ) -> Result<Value, EngineError> {
        Session::execute_script(self, script, args).await
    }
}

#[async_trait]
impl CommandCapable for Element {
    fn mode(&self) -> SessionMode {
        self.inner.config.mode
    }

    async fn execute_script(
        &self,
        script: &str,
        args: Vec<Value>,
    ) -> Result<Value, EngineError> {
        use crate::transport::ScriptExecutor as _;
        Ok(self.inner.execute(script, args).await?)
    }
}

impl OwnedByParent for Element {
    fn selector(&self) -> Selector {
        Element::selector(self)
    }

    fn index(&self) -> Option<usize> {
        Element::index(self)
    }

    fn parent(&self) -> Option<Element> {
        Element::parent(self)
    }
}
