//! Client facade: one method per remote operation.
//!
//! Every operation follows the same shape: validate required arguments
//! locally, build the named-parameter set, dispatch (which injects the
//! access token and handles the single renewal retry), decode the typed
//! reply. The synchronous `ask_sync` additionally reconciles the
//! submitted request with its eventual result, either by polling the
//! remote `check` endpoint or by waiting on the embedded completion
//! table.

use crate::dispatch::Dispatcher;
use crate::error::{Error, Result};
use crate::executor::{Params, decode, decode_status};
use crate::options::{
    AskOptions, CancelFilter, CheckFilter, CompanyUpdate, FeedbackFilter, NewCompany, NewUser,
    UserScope, UserSelector, UserUpdate,
};
use crate::results::{EmbeddedResult, ResultSink, ResultTable};
use crate::session::Session;
use nlq_protocol::{
    AskReply, CheckReply, Company, CompanyReply, Feedback, FeedbackAddReply, FeedbackAllReply,
    NewCompanyReply, Probe, ProbesAllReply, RequestState, TokenResetReply, User, UserAddReply,
    UserReply, UsersAllReply,
};
use serde_json::json;
use std::cmp::min;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, warn};

/// Interval between `check` polls while waiting for a synchronous
/// result in remote mode.
const POLL_INTERVAL: Duration = Duration::from_millis(200);

struct Inner {
    dispatcher: Dispatcher,
    results: Arc<ResultTable>,
}

/// Handle to a signed-in session against the NLQ server.
///
/// Cheap to clone; all clones share the same session and token. Safe to
/// use from multiple tasks or threads concurrently - operations are
/// independent and unordered with respect to each other.
#[derive(Clone)]
pub struct Client {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client").finish_non_exhaustive()
    }
}

fn require(param: &'static str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        Err(Error::Validation { param })
    } else {
        Ok(())
    }
}

fn scope_params(scope: &UserScope) -> [(&'static str, serde_json::Value); 2] {
    [
        ("usrId", json!(scope.usr_id)),
        ("usrExtId", json!(scope.usr_ext_id)),
    ]
}

impl Client {
    pub(crate) fn new(dispatcher: Dispatcher, results: Arc<ResultTable>) -> Self {
        Self {
            inner: Arc::new(Inner {
                dispatcher,
                results,
            }),
        }
    }

    fn session(&self) -> &Session {
        self.inner.dispatcher.session()
    }

    async fn dispatch(&self, path: &str, params: Params<'_>) -> Result<String> {
        self.inner.dispatcher.dispatch(path, params).await
    }

    // ------------------------------------------------------------------
    // Asking
    // ------------------------------------------------------------------

    /// Submit a query for asynchronous processing; returns the
    /// server-issued request id. Track completion via [`check`] or
    /// cancel via [`cancel`].
    ///
    /// [`check`]: Client::check
    /// [`cancel`]: Client::cancel
    pub async fn ask(&self, mdl_id: &str, txt: &str, opts: &AskOptions) -> Result<String> {
        require("mdlId", mdl_id)?;
        require("txt", txt)?;

        let body = self
            .dispatch(
                "ask",
                vec![
                    ("txt", json!(txt)),
                    ("mdlId", json!(mdl_id)),
                    ("data", opts.data.clone().unwrap_or(serde_json::Value::Null)),
                    ("enableLog", json!(opts.enable_log)),
                    ("usrId", json!(opts.usr_id)),
                    ("usrExtId", json!(opts.usr_ext_id)),
                ],
            )
            .await?;
        let reply: AskReply = decode(&body)?;
        Ok(reply.srv_req_id)
    }

    /// Submit a query and block until its result is available or the
    /// configured request timeout elapses.
    ///
    /// In remote mode the request state is polled via `check`; in
    /// embedded mode the result arrives through the in-process delivery
    /// callback (see [`result_sink`]). Abandoning the wait does not
    /// cancel the request server-side.
    ///
    /// [`result_sink`]: Client::result_sink
    pub async fn ask_sync(&self, mdl_id: &str, txt: &str, opts: &AskOptions) -> Result<RequestState> {
        require("mdlId", mdl_id)?;
        require("txt", txt)?;

        let timeout = self.session().request_timeout();
        let srv_req_id = self.ask(mdl_id, txt, opts).await?;
        let deadline = Instant::now() + timeout;

        if self.session().embedded() {
            debug!(%srv_req_id, "waiting on embedded delivery");
            let result = self
                .inner
                .results
                .await_until(&srv_req_id, deadline, timeout)
                .await?;
            Ok(state_from_embedded(result))
        } else {
            debug!(%srv_req_id, "polling request state");
            self.poll_until_ready(&srv_req_id, deadline, timeout).await
        }
    }

    /// Poll `check` for one request id until a terminal record shows up
    /// or the deadline passes.
    async fn poll_until_ready(
        &self,
        srv_req_id: &str,
        deadline: Instant,
        timeout: Duration,
    ) -> Result<RequestState> {
        let filter = CheckFilter {
            srv_req_ids: Some(vec![srv_req_id.to_string()]),
            ..CheckFilter::default()
        };

        loop {
            let states = self.check(&filter).await?;
            if let Some(state) = states
                .into_iter()
                .find(|s| s.srv_req_id == srv_req_id && s.is_ready())
            {
                return Ok(state);
            }

            let now = Instant::now();
            if now >= deadline {
                return Err(Error::Timeout { timeout });
            }
            tokio::time::sleep_until(min(now + POLL_INTERVAL, deadline)).await;
            if Instant::now() >= deadline {
                return Err(Error::Timeout { timeout });
            }
        }
    }

    /// Fetch processing states, optionally filtered by request ids.
    pub async fn check(&self, filter: &CheckFilter) -> Result<Vec<RequestState>> {
        let body = self
            .dispatch(
                "check",
                vec![
                    ("srvReqIds", json!(filter.srv_req_ids)),
                    ("maxRows", json!(filter.max_rows)),
                    ("usrId", json!(filter.scope.usr_id)),
                    ("usrExtId", json!(filter.scope.usr_ext_id)),
                ],
            )
            .await?;
        let reply: CheckReply = decode(&body)?;
        Ok(reply.states)
    }

    /// Cancel outstanding requests. Unknown ids are ignored by the
    /// server; with no ids given, all of the scoped user's requests are
    /// cancelled.
    pub async fn cancel(&self, filter: &CancelFilter) -> Result<()> {
        let body = self
            .dispatch(
                "cancel",
                vec![
                    ("srvReqIds", json!(filter.srv_req_ids)),
                    ("usrId", json!(filter.scope.usr_id)),
                    ("usrExtId", json!(filter.scope.usr_ext_id)),
                ],
            )
            .await?;
        decode_status(&body)
    }

    /// Clear the conversation context for a model.
    pub async fn clear_conversation(&self, mdl_id: &str, scope: &UserScope) -> Result<()> {
        require("mdlId", mdl_id)?;
        let [usr_id, usr_ext_id] = scope_params(scope);
        let body = self
            .dispatch(
                "clear/conversation",
                vec![("mdlId", json!(mdl_id)), usr_id, usr_ext_id],
            )
            .await?;
        decode_status(&body)
    }

    /// Clear the dialog flow for a model.
    pub async fn clear_dialog(&self, mdl_id: &str, scope: &UserScope) -> Result<()> {
        require("mdlId", mdl_id)?;
        let [usr_id, usr_ext_id] = scope_params(scope);
        let body = self
            .dispatch(
                "clear/dialog",
                vec![("mdlId", json!(mdl_id)), usr_id, usr_ext_id],
            )
            .await?;
        decode_status(&body)
    }

    // ------------------------------------------------------------------
    // Users
    // ------------------------------------------------------------------

    /// Create a user; returns the new user id.
    pub async fn add_user(&self, user: &NewUser) -> Result<i64> {
        require("email", &user.email)?;
        require("passwd", &user.passwd)?;
        require("firstName", &user.first_name)?;
        require("lastName", &user.last_name)?;

        let body = self
            .dispatch(
                "user/add",
                vec![
                    ("email", json!(user.email)),
                    ("passwd", json!(user.passwd)),
                    ("firstName", json!(user.first_name)),
                    ("lastName", json!(user.last_name)),
                    ("isAdmin", json!(user.is_admin)),
                    ("avatarUrl", json!(user.avatar_url)),
                    ("properties", user.properties.clone().unwrap_or(serde_json::Value::Null)),
                    ("extId", json!(user.ext_id)),
                ],
            )
            .await?;
        let reply: UserAddReply = decode(&body)?;
        Ok(reply.id)
    }

    pub async fn update_user(&self, id: i64, update: &UserUpdate) -> Result<()> {
        require("firstName", &update.first_name)?;
        require("lastName", &update.last_name)?;

        let body = self
            .dispatch(
                "user/update",
                vec![
                    ("id", json!(id)),
                    ("firstName", json!(update.first_name)),
                    ("lastName", json!(update.last_name)),
                    ("avatarUrl", json!(update.avatar_url)),
                    ("properties", update.properties.clone().unwrap_or(serde_json::Value::Null)),
                ],
            )
            .await?;
        decode_status(&body)
    }

    /// Grant or revoke admin rights; with `id` unset, the signed-in
    /// user.
    pub async fn update_user_admin(&self, id: Option<i64>, admin: bool) -> Result<()> {
        let body = self
            .dispatch(
                "user/admin",
                vec![("id", json!(id)), ("admin", json!(admin))],
            )
            .await?;
        decode_status(&body)
    }

    pub async fn reset_user_password(&self, id: Option<i64>, new_passwd: &str) -> Result<()> {
        require("newPasswd", new_passwd)?;
        let body = self
            .dispatch(
                "user/passwd/reset",
                vec![("id", json!(id)), ("newPasswd", json!(new_passwd))],
            )
            .await?;
        decode_status(&body)
    }

    pub async fn delete_user(&self, selector: &UserSelector) -> Result<()> {
        let body = self
            .dispatch(
                "user/delete",
                vec![("id", json!(selector.id)), ("extId", json!(selector.ext_id))],
            )
            .await?;
        decode_status(&body)
    }

    pub async fn get_user(&self, selector: &UserSelector) -> Result<User> {
        let body = self
            .dispatch(
                "user/get",
                vec![("id", json!(selector.id)), ("extId", json!(selector.ext_id))],
            )
            .await?;
        let reply: UserReply = decode(&body)?;
        Ok(reply.user)
    }

    pub async fn get_all_users(&self) -> Result<Vec<User>> {
        let body = self.dispatch("user/all", vec![]).await?;
        let reply: UsersAllReply = decode(&body)?;
        Ok(reply.users)
    }

    // ------------------------------------------------------------------
    // Company
    // ------------------------------------------------------------------

    /// Create a company together with its first admin user; returns the
    /// probe token and the admin's user id.
    pub async fn add_company(&self, company: &NewCompany) -> Result<NewCompanyReply> {
        require("name", &company.name)?;
        require("adminEmail", &company.admin_email)?;
        require("adminPasswd", &company.admin_passwd)?;
        require("adminFirstName", &company.admin_first_name)?;
        require("adminLastName", &company.admin_last_name)?;

        let body = self
            .dispatch(
                "company/add",
                vec![
                    ("name", json!(company.name)),
                    ("website", json!(company.website)),
                    ("country", json!(company.country)),
                    ("region", json!(company.region)),
                    ("city", json!(company.city)),
                    ("address", json!(company.address)),
                    ("postalCode", json!(company.postal_code)),
                    ("adminEmail", json!(company.admin_email)),
                    ("adminPasswd", json!(company.admin_passwd)),
                    ("adminFirstName", json!(company.admin_first_name)),
                    ("adminLastName", json!(company.admin_last_name)),
                    ("adminAvatarUrl", json!(company.admin_avatar_url)),
                ],
            )
            .await?;
        decode(&body)
    }

    /// Fetch the signed-in user's company.
    pub async fn get_company(&self) -> Result<Company> {
        let body = self.dispatch("company/get", vec![]).await?;
        let reply: CompanyReply = decode(&body)?;
        Ok(reply.company)
    }

    pub async fn update_company(&self, update: &CompanyUpdate) -> Result<()> {
        require("name", &update.name)?;
        let body = self
            .dispatch(
                "company/update",
                vec![
                    ("name", json!(update.name)),
                    ("website", json!(update.website)),
                    ("country", json!(update.country)),
                    ("region", json!(update.region)),
                    ("city", json!(update.city)),
                    ("address", json!(update.address)),
                    ("postalCode", json!(update.postal_code)),
                ],
            )
            .await?;
        decode_status(&body)
    }

    /// Regenerate the company probe token; returns the new token.
    pub async fn reset_company_token(&self) -> Result<String> {
        let body = self.dispatch("company/token/reset", vec![]).await?;
        let reply: TokenResetReply = decode(&body)?;
        Ok(reply.token)
    }

    pub async fn delete_company(&self) -> Result<()> {
        let body = self.dispatch("company/delete", vec![]).await?;
        decode_status(&body)
    }

    // ------------------------------------------------------------------
    // Feedback
    // ------------------------------------------------------------------

    /// Attach feedback to a request; returns the feedback record id.
    pub async fn add_feedback(
        &self,
        srv_req_id: &str,
        score: f64,
        comment: Option<&str>,
        scope: &UserScope,
    ) -> Result<i64> {
        require("srvReqId", srv_req_id)?;
        let [usr_id, usr_ext_id] = scope_params(scope);
        let body = self
            .dispatch(
                "feedback/add",
                vec![
                    ("srvReqId", json!(srv_req_id)),
                    ("score", json!(score)),
                    ("comment", json!(comment)),
                    usr_id,
                    usr_ext_id,
                ],
            )
            .await?;
        let reply: FeedbackAddReply = decode(&body)?;
        Ok(reply.id)
    }

    /// Delete one feedback record, or all of them with `id` unset.
    pub async fn delete_feedback(&self, id: Option<i64>) -> Result<()> {
        let body = self
            .dispatch("feedback/delete", vec![("id", json!(id))])
            .await?;
        decode_status(&body)
    }

    pub async fn get_all_feedback(&self, filter: &FeedbackFilter) -> Result<Vec<Feedback>> {
        let [usr_id, usr_ext_id] = scope_params(&filter.scope);
        let body = self
            .dispatch(
                "feedback/all",
                vec![("srvReqId", json!(filter.srv_req_id)), usr_id, usr_ext_id],
            )
            .await?;
        let reply: FeedbackAllReply = decode(&body)?;
        Ok(reply.feedback)
    }

    // ------------------------------------------------------------------
    // Probes
    // ------------------------------------------------------------------

    /// List the probes connected to the server.
    pub async fn get_probes(&self) -> Result<Vec<Probe>> {
        let body = self.dispatch("probe/all", vec![]).await?;
        let reply: ProbesAllReply = decode(&body)?;
        Ok(reply.probes)
    }

    // ------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------

    /// Sign out and close this client. Terminal: every subsequent
    /// operation on this client (or any clone) fails with
    /// [`Error::NotInitialized`], even if sign-out itself failed.
    ///
    /// With cancel-on-exit configured, outstanding requests of the
    /// signed-in user are cancelled first, best-effort.
    pub async fn close(&self) -> Result<()> {
        self.session().ensure_active()?;

        if self.session().cancel_on_exit() {
            if let Err(error) = self.cancel(&CancelFilter::default()).await {
                warn!(%error, "cancel-on-exit failed");
            }
        }

        let signed_out = match self.dispatch("signout", vec![]).await {
            Ok(body) => decode_status(&body),
            Err(e) => Err(e),
        };

        // The session dies regardless of how sign-out went.
        self.session().mark_closed();
        self.inner.results.close();

        signed_out
    }

    /// Delivery handle for embedded mode. The embedding runtime calls
    /// [`ResultSink::deliver`] once per completed request; waiting
    /// `ask_sync` callers are woken by request id.
    pub fn result_sink(&self) -> ResultSink {
        ResultSink::new(self.inner.results.clone())
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    pub fn base_url(&self) -> &str {
        self.session().base_url()
    }

    pub fn email(&self) -> &str {
        self.session().email()
    }

    pub fn embedded_mode(&self) -> bool {
        self.session().embedded()
    }

    pub fn cancel_on_exit(&self) -> bool {
        self.session().cancel_on_exit()
    }

    pub fn request_timeout(&self) -> Duration {
        self.session().request_timeout()
    }
}

fn state_from_embedded(result: EmbeddedResult) -> RequestState {
    RequestState {
        srv_req_id: result.srv_req_id,
        txt: result.original_text,
        usr_id: result.usr_id,
        mdl_id: result.mdl_id,
        probe_id: result.probe_id,
        status: "QRY_READY".to_string(),
        res_type: result.res_type,
        res_body: result.res_body,
        error_code: result.error_code,
        error: result.error,
        log_holder: result.log_holder,
        res_meta: None,
    }
}
