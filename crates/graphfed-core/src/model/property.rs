use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::location::NodeId;

/// Reserved property holding a node's identity
pub const IDENTITY_PROPERTY: &str = "graph:uuid";

/// Reserved property holding a parent's ordered child segments
pub const CHILD_LIST_PROPERTY: &str = "graph:childSegments";

/// A single stored value
///
/// Typed conversion between arbitrary client values is outside the engine; it
/// only needs values it can store, compare and hand back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum PropertyValue {
    String(String),
    Long(i64),
    Double(f64),
    Boolean(bool),
    Binary(#[serde(with = "base64_bytes")] Vec<u8>),
    Uuid(NodeId),
}

impl PropertyValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            PropertyValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_node_id(&self) -> Option<NodeId> {
        match self {
            PropertyValue::Uuid(id) => Some(*id),
            PropertyValue::String(s) => s.parse().ok(),
            _ => None,
        }
    }
}

impl From<&str> for PropertyValue {
    fn from(s: &str) -> Self {
        PropertyValue::String(s.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(s: String) -> Self {
        PropertyValue::String(s)
    }
}

impl From<i64> for PropertyValue {
    fn from(v: i64) -> Self {
        PropertyValue::Long(v)
    }
}

impl From<f64> for PropertyValue {
    fn from(v: f64) -> Self {
        PropertyValue::Double(v)
    }
}

impl From<bool> for PropertyValue {
    fn from(v: bool) -> Self {
        PropertyValue::Boolean(v)
    }
}

impl From<Vec<u8>> for PropertyValue {
    fn from(v: Vec<u8>) -> Self {
        PropertyValue::Binary(v)
    }
}

impl From<NodeId> for PropertyValue {
    fn from(id: NodeId) -> Self {
        PropertyValue::Uuid(id)
    }
}

/// Named property with zero or more values
///
/// A property with no values is the request-level encoding of "remove".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Property {
    pub name: String,
    pub values: Vec<PropertyValue>,
}

impl Property {
    pub fn new(name: impl Into<String>, values: Vec<PropertyValue>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }

    pub fn single(name: impl Into<String>, value: impl Into<PropertyValue>) -> Self {
        Self::new(name, vec![value.into()])
    }

    /// Property with no values, i.e. a removal
    pub fn empty(name: impl Into<String>) -> Self {
        Self::new(name, Vec::new())
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn is_reserved(&self) -> bool {
        self.name == CHILD_LIST_PROPERTY || self.name == IDENTITY_PROPERTY
    }
}

/// Stored properties of one node, keyed by name
pub type PropertyMap = BTreeMap<String, Vec<PropertyValue>>;

mod base64_bytes {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine as _;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        STANDARD
            .decode(encoded.as_bytes())
            .map_err(serde::de::Error::custom)
    }
}
