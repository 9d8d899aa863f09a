//! Element identity and its dual-key wire encoding.
//!
//! Remote ends return element references under one of two keys: the legacy
//! JSONWireProtocol `ELEMENT` key or the W3C GUID key. The engine reads
//! whichever is present and writes the key the active dialect expects;
//! script-execution arguments carry both for maximum compatibility.

use crate::strategy::SessionMode;
use serde::de::{self, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{json, Value};
use std::fmt;

/// W3C element identity key.
pub const W3C_ELEMENT_KEY: &str = "element-6066-11e4-a52e-4f735466cecf";

/// Legacy JSONWireProtocol element identity key.
pub const LEGACY_ELEMENT_KEY: &str = "ELEMENT";

/// A remote element reference.
///
/// The domain model only ever sees this newtype; the two wire keys exist
/// solely at the (de)serialization boundary.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ElementRef(String);

impl ElementRef {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Read a reference out of a wire value, accepting either identity key.
    pub fn from_value(value: &Value) -> Option<Self> {
        let obj = value.as_object()?;
        obj.get(W3C_ELEMENT_KEY)
            .or_else(|| obj.get(LEGACY_ELEMENT_KEY))
            .and_then(Value::as_str)
            .map(ElementRef::new)
    }

    /// Encode under the single key the given session mode expects.
    pub fn to_wire(&self, mode: SessionMode) -> Value {
        if mode.w3c {
            json!({ W3C_ELEMENT_KEY: self.0 })
        } else {
            json!({ LEGACY_ELEMENT_KEY: self.0 })
        }
    }

    /// Encode under both keys, for script-execution argument lists where the
    /// dialect of the consuming end is ambiguous.
    pub fn to_script_arg(&self) -> Value {
        json!({
            W3C_ELEMENT_KEY: self.0,
            LEGACY_ELEMENT_KEY: self.0,
        })
    }
}

impl fmt::Display for ElementRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for ElementRef {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(2))?;
        map.serialize_entry(W3C_ELEMENT_KEY, &self.0)?;
        map.serialize_entry(LEGACY_ELEMENT_KEY, &self.0)?;
        map.end()
    }
}

impl<'de> Deserialize<'de> for ElementRef {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct RefVisitor;

        impl<'de> Visitor<'de> for RefVisitor {
            type Value = ElementRef;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("an object carrying an element identity key")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
                let mut id: Option<String> = None;
                while let Some((key, value)) = map.next_entry::<String, Value>()? {
                    if key == W3C_ELEMENT_KEY || key == LEGACY_ELEMENT_KEY {
                        if let Some(s) = value.as_str() {
                            id.get_or_insert_with(|| s.to_string());
                        }
                    }
                }
                id.map(ElementRef)
                    .ok_or_else(|| de::Error::custom("missing element identity key"))
            }
        }

        deserializer.deserialize_map(RefVisitor)
    }
}
