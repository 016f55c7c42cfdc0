//! Session state: connection settings, the live access token and the
//! lifecycle flag.
//!
//! A [`Session`] is created ACTIVE by the builder (which signs in before
//! handing out a client) and becomes CLOSED exactly once; there is no
//! reopening. The token is the only field mutated after construction
//! besides the lifecycle flag, and both must be safe to touch from
//! concurrent callers.

use crate::error::{Error, Result};
use parking_lot::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

pub(crate) struct Session {
    base_url: String,
    email: String,
    password: String,
    /// Current access token. Replaced wholesale on renewal and read
    /// fresh before every call; last-writer-wins is fine because any
    /// valid token is interchangeable with any other.
    token: RwLock<String>,
    closed: AtomicBool,
    cancel_on_exit: bool,
    embedded: bool,
    request_timeout: Duration,
}

impl Session {
    pub(crate) fn new(
        base_url: String,
        email: String,
        password: String,
        token: String,
        cancel_on_exit: bool,
        embedded: bool,
        request_timeout: Duration,
    ) -> Self {
        Self {
            base_url,
            email,
            password,
            token: RwLock::new(token),
            closed: AtomicBool::new(false),
            cancel_on_exit,
            embedded,
            request_timeout,
        }
    }

    pub(crate) fn ensure_active(&self) -> Result<()> {
        if self.closed.load(Ordering::Acquire) {
            Err(Error::NotInitialized)
        } else {
            Ok(())
        }
    }

    /// Marks the session CLOSED. Terminal.
    pub(crate) fn mark_closed(&self) {
        self.closed.store(true, Ordering::Release);
    }

    pub(crate) fn token(&self) -> String {
        self.token.read().clone()
    }

    pub(crate) fn replace_token(&self, token: String) {
        *self.token.write() = token;
    }

    pub(crate) fn base_url(&self) -> &str {
        &self.base_url
    }

    pub(crate) fn email(&self) -> &str {
        &self.email
    }

    pub(crate) fn password(&self) -> &str {
        &self.password
    }

    pub(crate) fn cancel_on_exit(&self) -> bool {
        self.cancel_on_exit
    }

    pub(crate) fn embedded(&self) -> bool {
        self.embedded
    }

    pub(crate) fn request_timeout(&self) -> Duration {
        self.request_timeout
    }
}
