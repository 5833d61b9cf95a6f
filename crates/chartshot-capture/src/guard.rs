//! Session ownership guard
//!
//! A [`SessionGuard`] owns the session for the whole capture. The normal exit
//! is [`SessionGuard::release`]; any other exit (early return through `?`,
//! cancellation of the capture future, panic) hits `Drop`, which schedules the
//! close on the current tokio runtime.

use crate::session::BrowserSession;
use std::ops::Deref;

/// Owns a session and guarantees it is closed once
pub struct SessionGuard {
    session: Option<Box<dyn BrowserSession>>,
}

impl SessionGuard {
    /// Take ownership of a session
    #[must_use]
    pub fn new(session: Box<dyn BrowserSession>) -> Self {
        Self {
            session: Some(session),
        }
    }

    /// Close the session and wait for the driver to confirm
    pub async fn release(mut self) {
        if let Some(session) = self.session.take() {
            if let Err(err) = session.close().await {
                tracing::warn!(error = %err, "browser session close failed");
            }
        }
    }
}

impl Deref for SessionGuard {
    type Target = dyn BrowserSession;

    fn deref(&self) -> &Self::Target {
        match &self.session {
            Some(session) => session.as_ref(),
            // `session` is only taken by `release`, which consumes the guard
            None => unreachable!("session guard used after release"),
        }
    }
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        let Some(session) = self.session.take() else {
            return;
        };
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                tracing::debug!("closing abandoned browser session");
                handle.spawn(async move {
                    if let Err(err) = session.close().await {
                        tracing::warn!(error = %err, "abandoned browser session close failed");
                    }
                });
            }
            Err(_) => {
                tracing::error!("browser session dropped outside a tokio runtime, leaking it");
            }
        }
    }
}

impl std::fmt::Debug for SessionGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionGuard")
            .field("open", &self.session.is_some())
            .finish()
    }
}
