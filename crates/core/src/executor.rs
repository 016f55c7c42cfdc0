//! Single-call execution: build the JSON body, POST it, classify the
//! reply.
//!
//! The executor never retries and adds no timeout logic of its own; the
//! auth-retry policy lives in [`crate::dispatch`] and wire deadlines in
//! the transport.

use crate::error::{Error, Result};
use crate::transport::HttpTransport;
use nlq_protocol::{ErrorReply, STATUS_OK, StatusReply};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::sync::Arc;

/// Named call parameters. Entries with a JSON `null` value are omitted
/// from the request body, which is how optional fields are expressed on
/// the wire.
pub(crate) type Params<'a> = Vec<(&'a str, Value)>;

pub(crate) struct Executor {
    transport: Arc<dyn HttpTransport>,
    base_url: String,
}

impl Executor {
    /// `base_url` is stored without a trailing slash; paths are joined
    /// with exactly one.
    pub(crate) fn new(transport: Arc<dyn HttpTransport>, base_url: &str) -> Self {
        Self {
            transport,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// POST `params` to `path` and return the raw 200 body.
    ///
    /// * empty body (any HTTP code) -> [`Error::Remote`] without a code
    /// * non-200 with a parseable `{code, msg}` body -> [`Error::Remote`]
    ///   carrying the server code
    /// * non-200 otherwise -> [`Error::Remote`] without a code
    pub(crate) async fn execute(&self, path: &str, params: &Params<'_>) -> Result<String> {
        let body: Map<String, Value> = params
            .iter()
            .filter(|(_, v)| !v.is_null())
            .map(|(k, v)| ((*k).to_string(), v.clone()))
            .collect();

        let url = format!("{}/{}", self.base_url, path);
        let reply = self.transport.post(&url, Value::Object(body)).await?;

        if reply.body.trim().is_empty() {
            return Err(Error::remote(
                None,
                format!("unexpected empty response [code={}]", reply.status),
            ));
        }

        if reply.status == 200 {
            return Ok(reply.body);
        }

        match serde_json::from_str::<ErrorReply>(&reply.body) {
            Ok(err) => Err(Error::remote(Some(err.code), err.msg)),
            Err(_) => Err(Error::remote(
                None,
                format!("unexpected server error [code={}]", reply.status),
            )),
        }
    }
}

/// Decode a 200 body into a typed reply, checking the envelope status
/// first. A non-`API_OK` status is a server-side rejection; a body that
/// does not parse is a transport-class failure.
pub(crate) fn decode<T: DeserializeOwned>(body: &str) -> Result<T> {
    let envelope: StatusReply = serde_json::from_str(body)?;
    if envelope.status != STATUS_OK {
        return Err(Error::remote(
            None,
            format!("unexpected response status: {}", envelope.status),
        ));
    }
    Ok(serde_json::from_str(body)?)
}

/// Decode a 200 body that carries no payload beyond the envelope.
pub(crate) fn decode_status(body: &str) -> Result<()> {
    decode::<StatusReply>(body).map(|_| ())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::HttpReply;
    use crate::transport::fake::FakeTransport;
    use nlq_protocol::SigninReply;
    use serde_json::json;

    fn executor(t: FakeTransport) -> (Arc<FakeTransport>, Executor) {
        let t = Arc::new(t);
        let e = Executor::new(t.clone(), "http://localhost:8081/api/v1/");
        (t, e)
    }

    #[tokio::test]
    async fn null_params_are_omitted() {
        let (t, e) = executor(FakeTransport::new(|_, _| {
            Ok(HttpReply::ok(json!({"status": "API_OK"})))
        }));
        e.execute(
            "ask",
            &vec![("txt", json!("hi")), ("usrId", Value::Null), ("usrExtId", Value::Null)],
        )
        .await
        .unwrap();

        let (_, body) = &t.calls()[0];
        assert_eq!(body["txt"], "hi");
        assert!(body.get("usrId").is_none());
        assert!(body.get("usrExtId").is_none());
    }

    #[tokio::test]
    async fn empty_body_fails_without_code() {
        let (_, e) = executor(FakeTransport::new(|_, _| Ok(HttpReply::new(200, "  "))));
        let err = e.execute("ask", &vec![]).await.unwrap_err();
        match err {
            Error::Remote { code, message } => {
                assert!(code.is_none());
                assert!(message.contains("unexpected empty response"));
            }
            other => panic!("expected Remote, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn non_200_with_error_body_carries_server_code() {
        let (_, e) = executor(FakeTransport::new(|_, _| {
            Ok(HttpReply::new(
                401,
                json!({"code": "NC_SIGNIN_FAILURE", "msg": "bad credentials"}).to_string(),
            ))
        }));
        let err = e.execute("signin", &vec![]).await.unwrap_err();
        assert_eq!(err.remote_code(), Some("NC_SIGNIN_FAILURE"));
    }

    #[tokio::test]
    async fn non_200_unparseable_body_fails_without_code() {
        let (_, e) = executor(FakeTransport::new(|_, _| {
            Ok(HttpReply::new(500, "<html>oops</html>"))
        }));
        let err = e.execute("ask", &vec![]).await.unwrap_err();
        match err {
            Error::Remote { code, message } => {
                assert!(code.is_none());
                assert!(message.contains("unexpected server error [code=500]"));
            }
            other => panic!("expected Remote, got {other:?}"),
        }
    }

    #[test]
    fn decode_rejects_non_ok_envelope() {
        let err = decode::<SigninReply>(r#"{"status":"API_ERROR"}"#).unwrap_err();
        assert!(matches!(err, Error::Remote { code: None, .. }));
    }

    #[test]
    fn decode_malformed_body_is_transport_error() {
        let err = decode_status("not json").unwrap_err();
        assert!(matches!(err, Error::Transport { .. }));
    }
}
