//! User account records.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    #[serde(default)]
    pub usr_ext_id: Option<String>,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub avatar_url: Option<String>,
    pub is_admin: bool,
    #[serde(default)]
    pub properties: Option<HashMap<String, Value>>,
}

/// Reply to `user/get`: a [`User`] flattened into the envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserReply {
    pub status: String,
    #[serde(flatten)]
    pub user: User,
}

/// Reply to `user/all`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UsersAllReply {
    pub status: String,
    pub users: Vec<User>,
}

/// Reply to `user/add`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserAddReply {
    pub status: String,
    pub id: i64,
}
