//! Completion table for embedded (in-process) result delivery.
//!
//! When the query processing runtime runs colocated with the client, it
//! delivers results through a callback instead of the remote `check`
//! endpoint. The callback thread publishes into [`ResultTable`] and the
//! waiting caller picks its record up by request id. This is the only
//! structure in the crate mutated by a non-caller thread, so the whole
//! map-plus-signal contract lives here rather than being spread over
//! call sites.

use crate::error::{Error, Result};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;
use tokio::time::Instant;

/// One completed request as delivered by the embedded runtime.
///
/// Mirrors the delivery callback contract: identification, the original
/// query, and either a result body or an error.
#[derive(Debug, Clone)]
pub struct EmbeddedResult {
    pub srv_req_id: String,
    pub original_text: String,
    pub usr_id: i64,
    pub mdl_id: String,
    pub probe_id: Option<String>,
    pub res_type: Option<String>,
    pub res_body: Option<String>,
    pub error_code: Option<i32>,
    pub error: Option<String>,
    pub log_holder: Option<String>,
}

#[derive(Default)]
struct TableState {
    completed: HashMap<String, EmbeddedResult>,
    closed: bool,
}

/// Shared completion map with wait/notify semantics.
///
/// `put` is synchronous and callable from any thread; `await_until`
/// suspends the calling task until its record arrives, the deadline
/// passes, or the table is closed. Consumed records are removed on
/// read, so the table does not grow with the number of completed
/// requests.
#[derive(Default)]
pub(crate) struct ResultTable {
    state: Mutex<TableState>,
    wakeup: Notify,
}

impl ResultTable {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Publish a completed result and wake every waiter.
    ///
    /// Waiters re-check the map on wake, so waking all of them for one
    /// delivery is correct, just not minimal.
    pub(crate) fn put(&self, result: EmbeddedResult) {
        let mut state = self.state.lock();
        state.completed.insert(result.srv_req_id.clone(), result);
        drop(state);
        self.wakeup.notify_waiters();
    }

    /// Wait for the record keyed by `id` until `deadline`.
    ///
    /// The notification future is armed *before* the map is checked, so
    /// a delivery landing between the check and the suspension still
    /// wakes this waiter. Readiness is always re-derived from the map;
    /// a spurious wake just loops.
    pub(crate) async fn await_until(
        &self,
        id: &str,
        deadline: Instant,
        timeout: Duration,
    ) -> Result<EmbeddedResult> {
        loop {
            let notified = self.wakeup.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            {
                let mut state = self.state.lock();
                if let Some(result) = state.completed.remove(id) {
                    return Ok(result);
                }
                if state.closed {
                    return Err(Error::Interrupted);
                }
            }

            if Instant::now() >= deadline {
                return Err(Error::Timeout { timeout });
            }

            tokio::select! {
                _ = &mut notified => {}
                _ = tokio::time::sleep_until(deadline) => {}
            }
        }
    }

    /// Close the table and wake all waiters; they fail with
    /// [`Error::Interrupted`]. Called on client shutdown.
    pub(crate) fn close(&self) {
        self.state.lock().closed = true;
        self.wakeup.notify_waiters();
    }
}

/// Clonable delivery handle handed to the embedding runtime.
///
/// The runtime invokes [`ResultSink::deliver`] once per completed
/// request, from whatever thread drives its executor.
#[derive(Clone)]
pub struct ResultSink {
    table: Arc<ResultTable>,
}

impl ResultSink {
    pub(crate) fn new(table: Arc<ResultTable>) -> Self {
        Self { table }
    }

    pub fn deliver(&self, result: EmbeddedResult) {
        self.table.put(result);
    }
}
