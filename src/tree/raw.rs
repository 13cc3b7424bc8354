use serde::{Deserialize, Deserializer};
use serde_json::Value;
use thiserror::Error;

/// An undecoded listing child: a `kind` tag plus its `data` payload.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawThing {
    #[serde(default)]
    pub kind: String,
    #[serde(default)]
    pub data: Value,
}

/// Typed view of a listing child, decoded once.
#[derive(Debug, Clone)]
pub enum RawNode {
    Comment(RawComment),
    More(MoreStub),
    Unknown(String),
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawComment {
    pub id: String,
    pub body: String,
    #[serde(default)]
    pub parent_id: Option<String>,
    #[serde(default, deserialize_with = "deserialize_replies")]
    pub replies: Vec<RawThing>,
}

/// Placeholder for children the API did not inline.
#[derive(Debug, Clone, Deserialize)]
pub struct MoreStub {
    #[serde(default)]
    pub children: Vec<String>,
    #[serde(default)]
    pub parent_id: Option<String>,
    #[serde(default)]
    pub count: i64,
}

/// A comment or stub missing required fields. Callers skip these.
#[derive(Error, Debug)]
#[error("malformed {kind} node: {reason}")]
pub struct MalformedNodeError {
    pub kind: String,
    pub reason: String,
}

impl RawNode {
    pub fn decode(thing: RawThing) -> Result<Self, MalformedNodeError> {
        let RawThing { kind, data } = thing;
        let malformed = |kind: String, e: serde_json::Error| MalformedNodeError {
            kind,
            reason: e.to_string(),
        };

        match kind.as_str() {
            "t1" => serde_json::from_value(data)
                .map(RawNode::Comment)
                .map_err(|e| malformed(kind, e)),
            "more" => serde_json::from_value(data)
                .map(RawNode::More)
                .map_err(|e| malformed(kind, e)),
            _ => Ok(RawNode::Unknown(kind)),
        }
    }
}

#[derive(Deserialize)]
struct RepliesListing {
    data: RepliesData,
}

#[derive(Deserialize)]
struct RepliesData {
    #[serde(default)]
    children: Vec<RawThing>,
}

/// `replies` is an empty string when a comment has none, a listing otherwise.
fn deserialize_replies<'de, D>(deserializer: D) -> Result<Vec<RawThing>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;

    Ok(match value {
        Some(value @ Value::Object(_)) => serde_json::from_value::<RepliesListing>(value)
            .map(|listing| listing.data.children)
            .unwrap_or_default(),
        _ => Vec::new(),
    })
}
