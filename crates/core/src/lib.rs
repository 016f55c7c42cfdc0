//! Async client for the NLQ natural-language query REST API.
//!
//! The client signs in once, issues authenticated JSON/HTTP operations,
//! and offers two completion modes for queries: asynchronous
//! ([`Client::ask`] + [`Client::check`]) and synchronous
//! ([`Client::ask_sync`], which blocks the calling task until the
//! result arrives or the configured deadline passes).
//!
//! Expired access tokens are renewed transparently: a call rejected
//! with the stale-token code triggers exactly one sign-in and replay.
//! Everything else propagates as a typed [`Error`].
//!
//! Wire shapes live in the `nlq-protocol` crate and are re-exported
//! under [`protocol`].

pub mod builder;
pub mod client;
pub mod error;
pub mod options;
pub mod results;
pub mod transport;

mod dispatch;
mod executor;
mod session;

/// Wire types, re-exported from `nlq-protocol`.
pub mod protocol {
    pub use nlq_protocol::*;
}

pub use builder::{
    ClientBuilder, DEFAULT_BASE_URL, DEFAULT_EMAIL, DEFAULT_PASSWORD, DEFAULT_REQUEST_TIMEOUT,
};
pub use client::Client;
pub use error::{Error, Result};
pub use options::{
    AskOptions, CancelFilter, CheckFilter, CompanyUpdate, FeedbackFilter, NewCompany, NewUser,
    UserScope, UserSelector, UserUpdate,
};
pub use results::{EmbeddedResult, ResultSink};
pub use transport::{HttpReply, HttpTransport, ReqwestTransport};
