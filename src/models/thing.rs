//! The `Thing` envelope and paged `Listing`.

use serde::{Deserialize, Serialize};

/// Envelope around every API object: a kind tag plus the object itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Thing<T> {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Type prefix such as `t1` (comment), `t3` (link) or `Listing`.
    pub kind: String,
    /// Fullname, `<kind>_<id>`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub data: T,
}

/// One page of a paged collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Listing<T> {
    /// Fullname of the item preceding this page, if any.
    #[serde(default)]
    pub before: Option<String>,
    /// Fullname of the item following this page, if any.
    #[serde(default)]
    pub after: Option<String>,
    #[serde(default)]
    pub modhash: Option<String>,
    #[serde(default)]
    pub dist: Option<u64>,
    pub children: Vec<Thing<T>>,
}
