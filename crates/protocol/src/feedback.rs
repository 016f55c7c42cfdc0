//! User feedback records.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Feedback {
    pub id: i64,
    pub srv_req_id: String,
    pub usr_id: i64,
    pub score: f64,
    #[serde(default)]
    pub comment: Option<String>,
    pub create_tstamp: i64,
}

/// Reply to `feedback/all`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedbackAllReply {
    pub status: String,
    pub feedback: Vec<Feedback>,
}

/// Reply to `feedback/add`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedbackAddReply {
    pub status: String,
    pub id: i64,
}
