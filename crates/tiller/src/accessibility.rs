//! Accessible-name resolution.
//!
//! No wire-protocol accessibility locator exists, so lookups run entirely as
//! an in-page computation through the session's script channel. The resolver
//! only needs a [`ScriptExecutor`], which keeps it testable against a fake.

use crate::error::EngineError;
use crate::scripts::ACCESSIBLE_NAME_JS;
use crate::transport::ScriptExecutor;
use serde_json::{json, Value};
use tiller_core::{AriaSelector, ElementRef, Strictness};
use tracing::warn;

/// How many truncated descriptors a strict-mode error carries.
const STRICT_SAMPLE: usize = 3;

/// Result of one in-page accessibility lookup.
#[derive(Debug, Clone)]
pub struct MatchSet {
    /// Matches in document order.
    pub elements: Vec<ElementRef>,
    /// Truncated descriptors for diagnostics, parallel to `elements`.
    pub descriptors: Vec<String>,
    /// True when the in-page candidate cap was exceeded.
    pub cap_hit: bool,
}

/// Run the in-page lookup and gather all matches.
///
/// A hit candidate cap is always surfaced as a warning (the selector is too
/// broad), but execution continues with the capped set.
pub async fn resolve_set(
    executor: &dyn ScriptExecutor,
    selector: &AriaSelector,
    scope: Option<&ElementRef>,
) -> Result<MatchSet, EngineError> {
    let options = json!({
        "strict": selector.strictness,
        "candidateCap": selector.candidate_cap,
        "includeHidden": selector.include_hidden,
        "scopeElement": scope.map(|r| r.to_script_arg()),
    });
    let args = vec![
        Value::String(selector.name.clone()),
        selector
            .role
            .as_ref()
            .map(|r| Value::String(r.clone()))
            .unwrap_or(Value::Null),
        options,
    ];

    let value = executor.execute(ACCESSIBLE_NAME_JS, args).await?;
    let set = parse_match_set(&value)?;

    if set.cap_hit {
        warn!(
            name = %selector.name,
            cap = selector.candidate_cap,
            "accessibility selector exceeded its candidate cap; result set is truncated"
        );
    }
    Ok(set)
}

/// Apply the match-count policy and pick the single result.
pub fn select_single(
    selector: &AriaSelector,
    set: &MatchSet,
) -> Result<Option<ElementRef>, EngineError> {
    match set.elements.len() {
        0 => Ok(None),
        1 => Ok(Some(set.elements[0].clone())),
        n => match selector.strictness {
            Strictness::Strict => Err(EngineError::StrictSelector {
                name: selector.name.clone(),
                matches: n,
                descriptors: set.descriptors.iter().take(STRICT_SAMPLE).cloned().collect(),
            }),
            Strictness::Warn => {
                warn!(
                    name = %selector.name,
                    matches = n,
                    "accessibility selector matched more than one element; using the first"
                );
                Ok(Some(set.elements[0].clone()))
            }
            Strictness::First => Ok(Some(set.elements[0].clone())),
        },
    }
}

fn parse_match_set(value: &Value) -> Result<MatchSet, EngineError> {
    let obj = value
        .as_object()
        .ok_or_else(|| EngineError::Response(format!("unexpected accessibility result: {value}")))?;

    let elements = obj
        .get("elements")
        .and_then(Value::as_array)
        .ok_or_else(|| EngineError::Response("accessibility result lacks elements".to_string()))?
        .iter()
        .map(|v| {
            ElementRef::from_value(v)
                .ok_or_else(|| EngineError::Response(format!("not an element reference: {v}")))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let descriptors = obj
        .get("descriptors")
        .and_then(Value::as_array)
        .map(|a| {
            a.iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    let cap_hit = obj.get("capHit").and_then(Value::as_bool).unwrap_or(false);

    Ok(MatchSet {
        elements,
        descriptors,
        cap_hit,
    })
}
