//! Uniform response envelope.
//!
//! Every well-formed server response is a JSON object carrying a `status`
//! field (`"API_OK"` on success) plus either the typed success payload or
//! an error body. Transport-level failures are the only case where the
//! HTTP status code is not 200; their body, when parseable, has the
//! [`ErrorReply`] shape.

use serde::{Deserialize, Serialize};

/// Envelope status value reported on every successful response.
pub const STATUS_OK: &str = "API_OK";

/// Minimal envelope: just the `status` field.
///
/// Used both to pre-check the envelope before decoding a typed payload
/// and as the full reply shape for operations that return no data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusReply {
    pub status: String,
}

/// Body of a non-200 response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorReply {
    /// Server error code, e.g. `NC_INVALID_ACCESS_TOKEN`.
    pub code: String,
    /// Human-readable message.
    pub msg: String,
}

/// Reply to `signin`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SigninReply {
    pub status: String,
    pub acs_tok: String,
}

/// Reply to `ask`: the server-issued opaque request identifier.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AskReply {
    pub status: String,
    pub srv_req_id: String,
}
