//! Authenticated dispatch with single-shot token renewal.
//!
//! Every facade operation funnels through [`Dispatcher::dispatch`],
//! which injects the current access token under the reserved `acsTok`
//! key, executes the call, and - only when the server reports the
//! stale-token code - signs in again and replays the call exactly once
//! with a fresh token. Business-logic errors are never retried: a
//! second `user/add` after a validation failure would be a duplicate
//! side effect, not a recovery.

use crate::error::{Error, Result};
use crate::executor::{Executor, Params, decode};
use crate::session::Session;
use nlq_protocol::SigninReply;
use serde_json::json;
use std::sync::Arc;
use tracing::debug;

/// Reserved parameter carrying the access token on every call.
pub(crate) const TOKEN_PARAM: &str = "acsTok";

/// Server error code reporting an expired or revoked access token.
pub(crate) const STALE_TOKEN_CODE: &str = "NC_INVALID_ACCESS_TOKEN";

pub(crate) struct Dispatcher {
    executor: Executor,
    session: Arc<Session>,
}

impl Dispatcher {
    pub(crate) fn new(executor: Executor, session: Arc<Session>) -> Self {
        Self { executor, session }
    }

    /// Execute an authenticated call, renewing the token at most once.
    ///
    /// The replay reads the session token fresh rather than using the
    /// value this call just stored: a concurrent renewal may have won
    /// the race, and any valid token will do.
    pub(crate) async fn dispatch(&self, path: &str, params: Params<'_>) -> Result<String> {
        self.session.ensure_active()?;

        match self.execute_with_token(path, &params, self.session.token()).await {
            Err(Error::Remote {
                code: Some(code), ..
            }) if code == STALE_TOKEN_CODE => {
                debug!(path, "access token rejected, signing in again");
                let fresh = self.sign_in().await?;
                self.session.replace_token(fresh);
                debug!(path, "token renewed, replaying call");
                self.execute_with_token(path, &params, self.session.token())
                    .await
            }
            other => other,
        }
    }

    async fn execute_with_token(
        &self,
        path: &str,
        params: &Params<'_>,
        token: String,
    ) -> Result<String> {
        let mut with_token: Params<'_> = Vec::with_capacity(params.len() + 1);
        with_token.push((TOKEN_PARAM, json!(token)));
        with_token.extend(params.iter().cloned());
        self.executor.execute(path, &with_token).await
    }

    /// POST `signin` with the configured credentials; the only call that
    /// carries no token. Also used by the builder at connect time.
    pub(crate) async fn sign_in(&self) -> Result<String> {
        let body = self
            .executor
            .execute(
                "signin",
                &vec![
                    ("email", json!(self.session.email())),
                    ("passwd", json!(self.session.password())),
                ],
            )
            .await?;
        let reply: SigninReply = decode(&body)?;
        Ok(reply.acs_tok)
    }

    pub(crate) fn session(&self) -> &Arc<Session> {
        &self.session
    }
}
