//! Probe (model host) records.

use serde::{Deserialize, Serialize};

/// One model deployed on a probe.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProbeModel {
    pub id: String,
    pub name: String,
    pub version: String,
    #[serde(default)]
    pub enabled_built_in_tokens: Option<Vec<String>>,
}

/// A connected probe and its runtime environment.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Probe {
    pub probe_id: String,
    pub probe_token: String,
    pub probe_guid: String,
    pub probe_api_version: String,
    pub probe_api_date: String,
    pub os_version: String,
    pub os_name: String,
    pub os_arch: String,
    pub start_tstamp: i64,
    pub tmz_id: String,
    pub tmz_abbr: String,
    pub tmz_name: String,
    pub user_name: String,
    pub host_name: String,
    pub host_addr: String,
    #[serde(default)]
    pub mac_addr: Option<String>,
    pub models: Vec<ProbeModel>,
}

/// Reply to `probe/all`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProbesAllReply {
    pub status: String,
    pub probes: Vec<Probe>,
}
