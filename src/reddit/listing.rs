use serde::Deserialize;

use crate::tree::RawThing;

/// `{kind, data: {children, after}}` wrapper around every listing
#[derive(Debug, Clone, Deserialize)]
pub struct ListingEnvelope<T> {
    pub data: Listing<T>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Listing<T> {
    pub children: Vec<T>,
    #[serde(default)]
    pub after: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Thing<T> {
    pub data: T,
}

/// Only the id is needed from the post half of a comments payload.
#[derive(Debug, Clone, Deserialize)]
pub struct PostRef {
    pub id: String,
}

/// Response of the `morechildren` endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct MoreChildrenResponse {
    pub json: MoreChildrenBody,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MoreChildrenBody {
    #[serde(default)]
    pub errors: Vec<serde_json::Value>,
    #[serde(default)]
    pub data: Option<MoreChildrenData>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MoreChildrenData {
    #[serde(default)]
    pub things: Vec<RawThing>,
}
