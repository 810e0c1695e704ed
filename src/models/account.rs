//! The authenticated account, as returned by `/api/v1/me`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Identity {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub created: f64,
    #[serde(default)]
    pub created_utc: f64,
    #[serde(default)]
    pub link_karma: i64,
    #[serde(default)]
    pub comment_karma: i64,
    #[serde(default)]
    pub total_karma: Option<i64>,
    #[serde(default)]
    pub is_gold: bool,
    #[serde(default)]
    pub is_mod: bool,
    #[serde(default)]
    pub is_employee: bool,
    #[serde(default)]
    pub has_verified_email: Option<bool>,
    #[serde(default)]
    pub over_18: Option<bool>,
    #[serde(default)]
    pub icon_img: Option<String>,
    /// Everything else the endpoint returns (preferences, feature flags, ...).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
