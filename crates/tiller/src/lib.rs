//! Resilient element binding over the WebDriver wire protocol.
//!
//! The crate drives remote browser/mobile automation engines through a
//! caller-supplied transport. Selectors of any supported shape are classified
//! into canonical `{using, value}` locators (see `tiller-core`); elements are
//! bound lazily, waited for on first use, and, when the remote invalidates a
//! reference, reconstructed by replaying the selector chain from the session
//! root down to the element.
//!
//! The transport and the full protocol command table are collaborators, not
//! residents: implement [`transport::CommandChannel`] over whatever HTTP or
//! WebSocket stack the application already has.

pub mod accessibility;
pub mod config;
pub mod element;
mod engine;
pub mod error;
pub mod object;
pub mod protocol;
pub mod scripts;
pub mod session;
pub mod transport;

pub use accessibility::MatchSet;
pub use config::SessionConfig;
pub use element::Element;
pub use error::{EngineError, NotFound};
pub use object::{CommandCapable, OwnedByParent};
pub use protocol::Rect;
pub use session::Session;
pub use transport::{CommandChannel, Method, ScriptExecutor, TransportError};

pub use tiller_core::{
    classify, classify_matcher, AriaSelector, ElementRef, Locator, Relation, ScriptSelector,
    Selector, SelectorError, SessionMode, Strategy, Strictness, ARIA_MARKER, DEEP_MARKER,
    LEGACY_ELEMENT_KEY, W3C_ELEMENT_KEY,
};
