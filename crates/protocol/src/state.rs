//! Request state records returned by `check`.

use serde::de::Deserializer;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// Processing state of one submitted request.
///
/// A record is *terminal* once it carries either a result body or an
/// error message; a record with neither is still in flight.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestState {
    pub srv_req_id: String,
    pub txt: String,
    pub usr_id: i64,
    pub mdl_id: String,
    #[serde(default)]
    pub probe_id: Option<String>,
    pub status: String,
    #[serde(default)]
    pub res_type: Option<String>,
    /// Result body. The server sends either a JSON string or a raw JSON
    /// object here; objects are normalized to their compact JSON text.
    #[serde(default, deserialize_with = "json_text")]
    pub res_body: Option<String>,
    #[serde(default)]
    pub error_code: Option<i32>,
    #[serde(default)]
    pub error: Option<String>,
    /// Processing log, same string-or-object duality as `res_body`.
    #[serde(default, deserialize_with = "json_text")]
    pub log_holder: Option<String>,
    #[serde(default)]
    pub res_meta: Option<HashMap<String, Value>>,
}

impl RequestState {
    /// Whether this record is terminal (finished, successfully or not).
    pub fn is_ready(&self) -> bool {
        self.res_body.is_some() || self.error.is_some()
    }
}

/// Reply to `check`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckReply {
    pub status: String,
    pub states: Vec<RequestState>,
}

fn json_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.map(|v| match v {
        Value::String(s) => s,
        other => other.to_string(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn res_body_as_string() {
        let s: RequestState = serde_json::from_str(
            r#"{"srvReqId":"r1","txt":"hi","usrId":7,"mdlId":"m","status":"QRY_READY","resBody":"OK"}"#,
        )
        .unwrap();
        assert_eq!(s.res_body.as_deref(), Some("OK"));
        assert!(s.is_ready());
    }

    #[test]
    fn res_body_as_object_is_normalized() {
        let s: RequestState = serde_json::from_str(
            r#"{"srvReqId":"r1","txt":"hi","usrId":7,"mdlId":"m","status":"QRY_READY","resBody":{"x":1}}"#,
        )
        .unwrap();
        let body = s.res_body.unwrap();
        let v: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(v["x"], 1);
    }

    #[test]
    fn in_flight_record_is_not_ready() {
        let s: RequestState = serde_json::from_str(
            r#"{"srvReqId":"r1","txt":"hi","usrId":7,"mdlId":"m","status":"QRY_ENLISTED","resBody":null}"#,
        )
        .unwrap();
        assert!(!s.is_ready());
    }

    #[test]
    fn error_record_is_ready() {
        let s: RequestState = serde_json::from_str(
            r#"{"srvReqId":"r1","txt":"hi","usrId":7,"mdlId":"m","status":"QRY_READY","errorCode":1,"error":"rejected"}"#,
        )
        .unwrap();
        assert!(s.is_ready());
        assert_eq!(s.error_code, Some(1));
    }
}
