//! Client configuration and connection.
//!
//! All settings are supplied up front and become immutable once
//! [`ClientBuilder::connect`] signs in and hands out an active
//! [`Client`].
//!
//! ```ignore
//! let client = ClientBuilder::new()
//!     .base_url("http://localhost:8081/api/v1/")
//!     .login("admin@admin.com", "admin")
//!     .connect()
//!     .await?;
//!
//! let state = client.ask_sync("my.model.id", "what's the weather?", &AskOptions::default()).await?;
//!
//! client.close().await?;
//! ```

use crate::client::Client;
use crate::dispatch::Dispatcher;
use crate::error::{Error, Result};
use crate::executor::Executor;
use crate::results::ResultTable;
use crate::session::Session;
use crate::transport::{HttpTransport, ReqwestTransport};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Default REST API endpoint.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8081/api/v1/";
/// Default sign-in email.
pub const DEFAULT_EMAIL: &str = "admin@admin.com";
/// Default sign-in password.
pub const DEFAULT_PASSWORD: &str = "admin";
/// Default synchronous-request deadline; also the wire timeout of the
/// bundled HTTP transport.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Builder for [`Client`] instances.
#[derive(Default)]
pub struct ClientBuilder {
    base_url: Option<String>,
    email: Option<String>,
    password: Option<String>,
    request_timeout: Option<Duration>,
    cancel_on_exit: Option<bool>,
    embedded_mode: Option<bool>,
    transport: Option<Arc<dyn HttpTransport>>,
}

impl ClientBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Base URL of the REST server.
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Sign-in credentials. Either set both or neither (the defaults
    /// are the server's built-in admin account).
    pub fn login(mut self, email: impl Into<String>, password: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self.password = Some(password.into());
        self
    }

    /// Sign-in email alone. Must be paired with [`password`] before
    /// [`connect`]; [`login`] sets both at once.
    ///
    /// [`password`]: ClientBuilder::password
    /// [`login`]: ClientBuilder::login
    /// [`connect`]: ClientBuilder::connect
    pub fn email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Sign-in password alone. Must be paired with [`email`].
    ///
    /// [`email`]: ClientBuilder::email
    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    /// Deadline for synchronous `ask_sync` completion; also installed
    /// as the wire timeout on the bundled transport.
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    /// Cancel all outstanding requests on [`Client::close`].
    /// Defaults to `true`.
    pub fn cancel_on_exit(mut self, cancel: bool) -> Self {
        self.cancel_on_exit = Some(cancel);
        self
    }

    /// Expect the query processing runtime in-process: synchronous
    /// results arrive through [`Client::result_sink`] instead of
    /// remote polling. Defaults to `false`.
    pub fn embedded_mode(mut self, embedded: bool) -> Self {
        self.embedded_mode = Some(embedded);
        self
    }

    /// Substitute a custom HTTP transport. Mostly a testing seam; when
    /// unset a shared `reqwest` client is built with the configured
    /// request timeout.
    pub fn transport(mut self, transport: Arc<dyn HttpTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Sign in and return an active [`Client`].
    pub async fn connect(self) -> Result<Client> {
        // Either both credentials or neither (then the defaults apply).
        if self.email.is_some() != self.password.is_some() {
            return Err(Error::Validation { param: "login" });
        }

        let base_url = self.base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let email = self.email.unwrap_or_else(|| DEFAULT_EMAIL.to_string());
        let password = self.password.unwrap_or_else(|| DEFAULT_PASSWORD.to_string());
        let request_timeout = self.request_timeout.unwrap_or(DEFAULT_REQUEST_TIMEOUT);
        let cancel_on_exit = self.cancel_on_exit.unwrap_or(true);
        let embedded = self.embedded_mode.unwrap_or(false);

        let transport: Arc<dyn HttpTransport> = match self.transport {
            Some(t) => t,
            None => Arc::new(ReqwestTransport::new(request_timeout)?),
        };

        let session = Arc::new(Session::new(
            base_url.trim_end_matches('/').to_string(),
            email,
            password,
            String::new(),
            cancel_on_exit,
            embedded,
            request_timeout,
        ));
        let dispatcher = Dispatcher::new(
            Executor::new(transport, &base_url),
            session.clone(),
        );

        let token = dispatcher.sign_in().await?;
        session.replace_token(token);
        debug!(%base_url, embedded, "signed in");

        Ok(Client::new(dispatcher, ResultTable::new()))
    }
}
