//! Company records.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Company {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub postal_code: Option<String>,
    #[serde(default)]
    pub properties: Option<HashMap<String, Value>>,
}

/// Reply to `company/get`: a [`Company`] flattened into the envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompanyReply {
    pub status: String,
    #[serde(flatten)]
    pub company: Company,
}

/// Reply to `company/add`: probe token plus the id of the new admin user.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCompanyReply {
    pub status: String,
    pub token: String,
    pub admin_id: i64,
}

/// Reply to `company/token/reset`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResetReply {
    pub status: String,
    pub token: String,
}
