//! HTTP transport seam.
//!
//! The client issues every call as a JSON POST through the
//! [`HttpTransport`] trait. Production code uses [`ReqwestTransport`];
//! tests substitute [`fake::FakeTransport`] to script server behavior
//! without a socket.

use crate::error::{Error, Result};
use serde_json::Value;
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

/// Raw HTTP reply: status code plus the body text.
///
/// Envelope classification (status vs error body) happens one layer up,
/// in the executor; the transport only moves bytes.
#[derive(Debug, Clone)]
pub struct HttpReply {
    pub status: u16,
    pub body: String,
}

impl HttpReply {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// 200 reply with the given JSON body.
    pub fn ok(body: Value) -> Self {
        Self::new(200, body.to_string())
    }
}

/// A single authenticated POST hop.
pub trait HttpTransport: Send + Sync {
    /// POST `body` as JSON to `url` and return the raw reply.
    fn post(
        &self,
        url: &str,
        body: Value,
    ) -> Pin<Box<dyn Future<Output = Result<HttpReply>> + Send + '_>>;
}

/// Production transport backed by a shared `reqwest` client.
///
/// Timeout handling is left entirely to `reqwest`: the configured
/// request timeout is installed on the client at construction and every
/// wire-level failure (including an HTTP timeout) surfaces as
/// [`Error::Transport`].
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(request_timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()
            .map_err(Error::from)?;
        Ok(Self { client })
    }
}

impl HttpTransport for ReqwestTransport {
    fn post(
        &self,
        url: &str,
        body: Value,
    ) -> Pin<Box<dyn Future<Output = Result<HttpReply>> + Send + '_>> {
        let request = self.client.post(url).json(&body);
        Box::pin(async move {
            let response = request.send().await?;
            let status = response.status().as_u16();
            let body = response.text().await?;
            Ok(HttpReply { status, body })
        })
    }
}

pub mod fake {
    //! Scripted in-memory transport for unit testing the dispatch and
    //! reconciliation layers without a server.
    //!
    //! The handler closure receives the request path (relative to the
    //! base URL) and the JSON body, and returns either an [`HttpReply`]
    //! or a transport-level error. Every call is recorded and can be
    //! inspected afterwards.

    use super::{HttpReply, HttpTransport};
    use crate::error::Result;
    use parking_lot::Mutex;
    use serde_json::Value;
    use std::future::Future;
    use std::pin::Pin;

    type Handler = Box<dyn Fn(&str, &Value) -> Result<HttpReply> + Send + Sync>;

    pub struct FakeTransport {
        handler: Handler,
        calls: Mutex<Vec<(String, Value)>>,
    }

    impl FakeTransport {
        pub fn new(handler: impl Fn(&str, &Value) -> Result<HttpReply> + Send + Sync + 'static) -> Self {
            Self {
                handler: Box::new(handler),
                calls: Mutex::new(Vec::new()),
            }
        }

        /// All `(path, body)` pairs sent so far.
        pub fn calls(&self) -> Vec<(String, Value)> {
            self.calls.lock().clone()
        }

        /// Number of calls made to the given path.
        pub fn calls_to(&self, path: &str) -> usize {
            self.calls.lock().iter().filter(|(p, _)| p == path).count()
        }

        /// Total number of calls made.
        pub fn total_calls(&self) -> usize {
            self.calls.lock().len()
        }
    }

    impl HttpTransport for FakeTransport {
        fn post(
            &self,
            url: &str,
            body: Value,
        ) -> Pin<Box<dyn Future<Output = Result<HttpReply>> + Send + '_>> {
            // Strip scheme and host so handlers match on bare paths.
            let path = url
                .rsplit_once("/api/v1/")
                .map(|(_, p)| p.to_string())
                .unwrap_or_else(|| url.to_string());
            self.calls.lock().push((path.clone(), body.clone()));
            let reply = (self.handler)(&path, &body);
            Box::pin(async move { reply })
        }
    }
}
