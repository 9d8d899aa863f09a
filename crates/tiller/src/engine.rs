//! The resolution and retry engine.
//!
//! Per handle the lifecycle is `Unbound → (wait) → Bound → (external
//! mutation) → Stale → (replay) → Bound'`. Binding resolves the chain of
//! `(selector, index)` hops from the session root down; stale recovery
//! replays the same chain with fresh lookups and retries the failed command
//! exactly once. Selector errors are static and never retried; non-stale
//! remote failures surface unmodified.

use crate::accessibility;
use crate::error::EngineError;
use crate::protocol::{self, ElementCommand};
use crate::scripts::DEEP_QUERY_JS;
use crate::session::SessionInner;
use crate::transport::ScriptExecutor;
use serde_json::Value;
use std::time::Instant;
use tiller_core::{
    classify, classify_matcher, AriaSelector, ElementRef, Locator, Selector, SelectorError,
    Strategy,
};
use tracing::debug;

/// Commands that probe for existence or visibility must not trigger the
/// implicit wait; their whole point is answering "is it there yet".
pub(crate) fn skips_implicit_wait(name: &str) -> bool {
    matches!(
        name,
        "isExisting" | "isDisplayed" | "isDisplayedInViewport" | "waitForExist" | "waitForDisplayed"
    )
}

/// One hop of a binding chain.
#[derive(Debug, Clone)]
pub(crate) struct Hop {
    pub(crate) node: usize,
    pub(crate) parent: Option<usize>,
    pub(crate) selector: Selector,
    pub(crate) index: Option<usize>,
}

/// Collect the chain for a node by walking parent links to the root, then
/// reverse it into root-first order for resolution.
pub(crate) fn chain(inner: &SessionInner, node: usize) -> Vec<Hop> {
    let mut hops = Vec::new();
    let mut current = Some(node);
    while let Some(id) = current {
        let n = inner.node(id);
        hops.push(Hop {
            node: id,
            parent: n.parent,
            selector: n.selector,
            index: n.index,
        });
        current = n.parent;
    }
    hops.reverse();
    hops
}

/// Resolve a selector within a scope into remote references.
///
/// `all` selects the multi-element lookup; single lookups yield zero or one
/// reference, with the remote's "no such element" answer mapped to zero.
pub(crate) async fn find_refs(
    inner: &SessionInner,
    scope: Option<&ElementRef>,
    selector: &Selector,
    all: bool,
) -> Result<Vec<ElementRef>, EngineError> {
    match selector {
        Selector::Raw(text) => {
            let locator = classify(text, inner.config.mode)?;
            resolve_locator(inner, scope, &locator, all).await
        }
        Selector::Locator(locator) => {
            // caller-provided locators name their strategy directly and get
            // the same mode check a direct `strategy:value` selector gets
            validate_direct(locator, inner)?;
            resolve_locator(inner, scope, locator, all).await
        }
        Selector::Matcher(value) => {
            let locator = classify_matcher(value);
            resolve_locator(inner, scope, &locator, all).await
        }
        Selector::Script(script) => {
            let mut args = script.args.clone();
            args.push(scope_arg(scope));
            let value = inner.execute(&script.source, args).await?;
            refs_from_value(&value)
        }
        Selector::Custom { name, args } => {
            let source = inner
                .strategy_source(name)
                .ok_or_else(|| EngineError::UnknownStrategy(name.clone()))?;
            let mut args = args.clone();
            args.push(scope_arg(scope));
            let value = inner.execute(&source, args).await?;
            refs_from_value(&value)
        }
        Selector::Existing(reference) => Ok(vec![reference.clone()]),
        Selector::Aria(aria) => aria_refs(inner, scope, aria, all).await,
    }
}

async fn resolve_locator(
    inner: &SessionInner,
    scope: Option<&ElementRef>,
    locator: &Locator,
    all: bool,
) -> Result<Vec<ElementRef>, EngineError> {
    match locator.using {
        // internal pseudo-strategies expand into in-page queries
        Strategy::Shadow => {
            let args = vec![
                Value::String(locator.value.clone()),
                Value::Bool(all),
                scope_arg(scope),
            ];
            let value = inner.execute(DEEP_QUERY_JS, args).await?;
            refs_from_value(&value)
        }
        Strategy::Aria => {
            let aria = AriaSelector::named(locator.value.clone())
                .with_candidate_cap(inner.config.candidate_cap);
            aria_refs(inner, scope, &aria, all).await
        }
        _ => wire_find(inner, scope, locator, all).await,
    }
}

fn validate_direct(locator: &Locator, inner: &SessionInner) -> Result<(), EngineError> {
    if !locator.using.is_internal() && !locator.using.allowed_in(inner.config.mode) {
        return Err(EngineError::Selector(SelectorError::InvalidStrategy {
            strategy: locator.using.as_str().to_string(),
            selector: locator.to_string(),
        }));
    }
    Ok(())
}

async fn wire_find(
    inner: &SessionInner,
    scope: Option<&ElementRef>,
    locator: &Locator,
    all: bool,
) -> Result<Vec<ElementRef>, EngineError> {
    let sid = &inner.session_id;
    let command = match (scope, all) {
        (None, false) => protocol::find_element(sid, locator),
        (None, true) => protocol::find_elements(sid, locator),
        (Some(e), false) => protocol::find_element_from_element(sid, e, locator),
        (Some(e), true) => protocol::find_elements_from_element(sid, e, locator),
    };
    match inner.send(&command).await {
        Ok(response) => {
            let value = protocol::unwrap_value(response);
            if all {
                let items = value.as_array().ok_or_else(|| {
                    EngineError::Response(format!("expected an element list, got {value}"))
                })?;
                items
                    .iter()
                    .map(|v| {
                        ElementRef::from_value(v).ok_or_else(|| {
                            EngineError::Response(format!("not an element reference: {v}"))
                        })
                    })
                    .collect()
            } else {
                let reference = ElementRef::from_value(&value).ok_or_else(|| {
                    EngineError::Response(format!("not an element reference: {value}"))
                })?;
                Ok(vec![reference])
            }
        }
        Err(e) if !all && e.is_no_such_element() => Ok(Vec::new()),
        Err(e) => Err(e.into()),
    }
}

async fn aria_refs(
    inner: &SessionInner,
    scope: Option<&ElementRef>,
    aria: &AriaSelector,
    all: bool,
) -> Result<Vec<ElementRef>, EngineError> {
    let set = accessibility::resolve_set(inner, aria, scope).await?;
    if all {
        Ok(set.elements)
    } else {
        Ok(accessibility::select_single(aria, &set)?
            .into_iter()
            .collect())
    }
}

fn scope_arg(scope: Option<&ElementRef>) -> Value {
    scope.map(|r| r.to_script_arg()).unwrap_or(Value::Null)
}

/// Interpret a script result as element references: a node, a node list, or
/// null/undefined for "nothing matched".
fn refs_from_value(value: &Value) -> Result<Vec<ElementRef>, EngineError> {
    match value {
        Value::Null => Ok(Vec::new()),
        Value::Array(items) => items
            .iter()
            .map(|v| {
                ElementRef::from_value(v)
                    .ok_or_else(|| EngineError::Response(format!("not an element reference: {v}")))
            })
            .collect(),
        other => ElementRef::from_value(other)
            .map(|r| vec![r])
            .ok_or_else(|| EngineError::Response(format!("not an element reference: {other}"))),
    }
}

/// Resolve one hop, polling up to the implicit-wait timeout when `wait` is
/// set. Static selector errors and non-stale remote failures abort the poll
/// immediately; only "not there yet" keeps it going.
async fn wait_for_hop(
    inner: &SessionInner,
    scope: Option<&ElementRef>,
    hop: &Hop,
    command: &str,
    wait: bool,
) -> Result<ElementRef, EngineError> {
    let needs_all = matches!(hop.index, Some(i) if i > 0);
    let index = hop.index.unwrap_or(0);
    let timeout = inner.config.implicit_timeout;
    let deadline = Instant::now() + timeout;

    loop {
        let refs = find_refs(inner, scope, &hop.selector, needs_all).await?;
        if let Some(reference) = refs.get(index) {
            return Ok(reference.clone());
        }
        if !wait || Instant::now() >= deadline {
            let timeout_ms = if wait { timeout.as_millis() as u64 } else { 0 };
            return Err(hop_not_found(inner, hop, command, timeout_ms));
        }
        tokio::time::sleep(inner.config.poll_interval).await;
    }
}

/// Build the not-found error for a hop, naming the synthesized relation (and
/// the element it was taken from) where one exists.
fn hop_not_found(inner: &SessionInner, hop: &Hop, command: &str, timeout_ms: u64) -> EngineError {
    if let Selector::Script(script) = &hop.selector {
        if let Some(relation) = script.relation {
            let base = hop
                .parent
                .map(|p| inner.node(p).selector.describe())
                .unwrap_or_else(|| "<session root>".to_string());
            return EngineError::not_found(base, Some(relation), command, timeout_ms, None);
        }
    }
    let last_error = inner.node(hop.node).last_error;
    EngineError::not_found(hop.selector.describe(), None, command, timeout_ms, last_error)
}

/// Resolve the chain for a node root-first. With `use_cache` the already
/// bound hops are reused (first-use binding); without it every hop gets a
/// fresh lookup (stale replay). Refreshed references are written back so
/// sibling handles over the same nodes recover too.
async fn resolve_chain(
    inner: &SessionInner,
    node: usize,
    wait: bool,
    command: &str,
    use_cache: bool,
) -> Result<ElementRef, EngineError> {
    let hops = chain(inner, node);
    let mut scope: Option<ElementRef> = None;
    for hop in &hops {
        if use_cache {
            if let Some(cached) = inner.bound(hop.node) {
                scope = Some(cached);
                continue;
            }
        }
        match wait_for_hop(inner, scope.as_ref(), hop, command, wait).await {
            Ok(reference) => {
                inner.set_bound(hop.node, reference.clone());
                scope = Some(reference);
            }
            Err(e) => {
                // keep a concise note on the node; a rendered NotFound would
                // re-nest itself on every retry
                let note = match &e {
                    EngineError::NotFound(nf) => nf
                        .last_error
                        .clone()
                        .unwrap_or_else(|| format!("element (\"{}\") not found", nf.selector)),
                    other => other.to_string(),
                };
                inner.record_error(hop.node, note);
                return Err(e);
            }
        }
    }
    Ok(scope.expect("binding chain is never empty"))
}

/// Bind the chain for a node, reusing cached hop references. Used on first
/// command dispatch; `command` is only for error attribution.
pub(crate) async fn bind_chain(
    inner: &SessionInner,
    node: usize,
    wait: bool,
    command: &str,
) -> Result<ElementRef, EngineError> {
    resolve_chain(inner, node, wait, command, true).await
}

/// Replay the full chain with fresh lookups, ignoring cached references.
/// Idempotent and non-mutating with respect to the handle: the caller
/// substitutes the returned reference before retrying.
pub(crate) async fn replay(
    inner: &SessionInner,
    node: usize,
    command: &str,
    wait: bool,
) -> Result<ElementRef, EngineError> {
    resolve_chain(inner, node, wait, command, false).await
}

/// Eagerly attempt a first bind at handle-creation time. Absence is not an
/// error (the handle stays unresolved with the failure recorded), but
/// selector and strategy problems surface immediately.
pub(crate) async fn try_bind(inner: &SessionInner, node: usize) -> Result<(), EngineError> {
    match bind_chain(inner, node, false, "findElement").await {
        Ok(_) => Ok(()),
        Err(EngineError::NotFound(_)) => Ok(()),
        Err(e) => Err(e),
    }
}

/// Fresh existence probe, bypassing cached references and the implicit wait.
pub(crate) async fn exists_now(inner: &SessionInner, node: usize) -> Result<bool, EngineError> {
    match replay(inner, node, "isExisting", false).await {
        Ok(_) => Ok(true),
        Err(EngineError::NotFound(_)) => Ok(false),
        Err(e) => Err(e),
    }
}

/// Dispatch an element command through the full pipeline: implicit wait on an
/// unbound handle, then at most one chain replay when the remote reports the
/// reference stale. A second staleness within the same call is a hard
/// failure.
pub(crate) async fn run(
    inner: &SessionInner,
    node: usize,
    command: &ElementCommand,
) -> Result<Value, EngineError> {
    let wait = !skips_implicit_wait(command.name);
    let reference = match bind_chain(inner, node, wait, command.name).await {
        Ok(r) => r,
        // a cached hop went stale underneath us; recover through replay
        Err(EngineError::Wire(e)) if e.is_stale_class() => {
            replay(inner, node, command.name, wait).await?
        }
        Err(e) => return Err(e),
    };

    let wire = command.to_command(&inner.session_id, &reference);
    match inner.send(&wire).await {
        Ok(value) => Ok(protocol::unwrap_value(value)),
        Err(e) if e.is_stale_class() => {
            debug!(
                selector = %inner.node(node).selector,
                command = command.name,
                "stale element reference, replaying selector chain"
            );
            let fresh = replay(inner, node, command.name, true).await?;
            let wire = command.to_command(&inner.session_id, &fresh);
            match inner.send(&wire).await {
                Ok(value) => Ok(protocol::unwrap_value(value)),
                Err(e) if e.is_stale_class() => Err(EngineError::Stale {
                    selector: inner.node(node).selector.describe(),
                    command: command.name.to_string(),
                }),
                Err(e) => Err(e.into()),
            }
        }
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn existence_probes_skip_the_wait() {
        assert!(skips_implicit_wait("isExisting"));
        assert!(skips_implicit_wait("isDisplayed"));
        assert!(skips_implicit_wait("waitForExist"));
        assert!(!skips_implicit_wait("click"));
        assert!(!skips_implicit_wait("getText"));
    }

    #[test]
    fn script_results_become_references() {
        use serde_json::json;
        use tiller_core::W3C_ELEMENT_KEY;

        assert!(refs_from_value(&Value::Null).unwrap().is_empty());
        let single = refs_from_value(&json!({ W3C_ELEMENT_KEY: "e1" })).unwrap();
        assert_eq!(single.len(), 1);
        let many =
            refs_from_value(&json!([{ W3C_ELEMENT_KEY: "e1" }, { "ELEMENT": "e2" }])).unwrap();
        assert_eq!(many.len(), 2);
        assert!(refs_from_value(&json!(42)).is_err());
    }
}
