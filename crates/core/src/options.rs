//! Optional-argument bundles for facade operations.
//!
//! The wire protocol expresses optional fields by omission, so every
//! `Option` here that stays `None` simply never appears in the request
//! body. All bundles implement `Default` for the common "just the
//! required arguments" call.

use serde_json::Value;

/// Options for [`ask`](crate::Client::ask) and
/// [`ask_sync`](crate::Client::ask_sync).
#[derive(Debug, Clone, Default)]
pub struct AskOptions {
    /// Additional JSON data passed through to the model.
    pub data: Option<Value>,
    /// Collect processing log on the server.
    pub enable_log: bool,
    /// Act on behalf of this user id (admins only).
    pub usr_id: Option<i64>,
    /// Act on behalf of this external user id.
    pub usr_ext_id: Option<String>,
}

/// Scope for operations that can act on behalf of another user.
/// With neither id set, the operation applies to the signed-in user.
#[derive(Debug, Clone, Default)]
pub struct UserScope {
    pub usr_id: Option<i64>,
    pub usr_ext_id: Option<String>,
}

/// Filter for [`check`](crate::Client::check).
#[derive(Debug, Clone, Default)]
pub struct CheckFilter {
    /// Restrict to these request ids; `None` means all.
    pub srv_req_ids: Option<Vec<String>>,
    /// Maximum number of records to return.
    pub max_rows: Option<i64>,
    pub scope: UserScope,
}

/// Filter for [`cancel`](crate::Client::cancel). With no ids set, all
/// of the scoped user's outstanding requests are cancelled.
#[derive(Debug, Clone, Default)]
pub struct CancelFilter {
    pub srv_req_ids: Option<Vec<String>>,
    pub scope: UserScope,
}

/// Filter for [`get_all_feedback`](crate::Client::get_all_feedback).
#[derive(Debug, Clone, Default)]
pub struct FeedbackFilter {
    pub srv_req_id: Option<String>,
    pub scope: UserScope,
}

/// Arguments for [`add_user`](crate::Client::add_user).
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub passwd: String,
    pub first_name: String,
    pub last_name: String,
    pub avatar_url: Option<String>,
    pub is_admin: bool,
    pub properties: Option<Value>,
    pub ext_id: Option<String>,
}

/// Arguments for [`update_user`](crate::Client::update_user).
#[derive(Debug, Clone)]
pub struct UserUpdate {
    pub first_name: String,
    pub last_name: String,
    pub avatar_url: Option<String>,
    pub properties: Option<Value>,
}

/// Selects a user by internal or external id; with neither set, the
/// signed-in user.
#[derive(Debug, Clone, Default)]
pub struct UserSelector {
    pub id: Option<i64>,
    pub ext_id: Option<String>,
}

/// Arguments for [`add_company`](crate::Client::add_company).
#[derive(Debug, Clone)]
pub struct NewCompany {
    pub name: String,
    pub website: Option<String>,
    pub country: Option<String>,
    pub region: Option<String>,
    pub city: Option<String>,
    pub address: Option<String>,
    pub postal_code: Option<String>,
    pub admin_email: String,
    pub admin_passwd: String,
    pub admin_first_name: String,
    pub admin_last_name: String,
    pub admin_avatar_url: Option<String>,
}

/// Arguments for [`update_company`](crate::Client::update_company).
#[derive(Debug, Clone)]
pub struct CompanyUpdate {
    pub name: String,
    pub website: Option<String>,
    pub country: Option<String>,
    pub region: Option<String>,
    pub city: Option<String>,
    pub address: Option<String>,
    pub postal_code: Option<String>,
}
