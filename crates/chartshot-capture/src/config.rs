//! Capture engine configuration

use crate::crop::DEFAULT_PADDING;
use crate::retry::RetryPolicy;
use crate::session::{AuthCookie, DomSignals, SessionOptions};
use std::time::Duration;

/// Timings, signals and auth for the capture engine
#[derive(Debug, Clone, PartialEq)]
pub struct CaptureConfig {
    /// Budget for `document.readyState == "complete"`
    pub page_load_timeout: Duration,
    /// Poll interval while waiting for readiness or containers
    pub poll_interval: Duration,
    /// Pause after the document is ready
    pub settle_delay: Duration,
    /// Per-attempt budget for chart containers to appear
    pub element_timeout: Duration,
    /// Pause after containers appear
    pub stabilize_delay: Duration,
    /// Container wait attempts and backoff
    pub retry: RetryPolicy,
    /// Margin around the chart, in pixels
    pub crop_padding: u32,
    /// Deadline for the whole capture
    pub capture_timeout: Duration,
    /// Browser settings
    pub session: SessionOptions,
    /// Cookie installed before navigation
    pub auth: Option<AuthCookie>,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            page_load_timeout: Duration::from_secs(5),
            poll_interval: Duration::from_millis(250),
            settle_delay: Duration::from_secs(1),
            element_timeout: Duration::from_secs(5),
            stabilize_delay: Duration::from_secs(1),
            retry: RetryPolicy::default(),
            crop_padding: DEFAULT_PADDING,
            capture_timeout: Duration::from_secs(60),
            session: SessionOptions::default(),
            auth: None,
        }
    }
}

impl CaptureConfig {
    /// Set auth cookie (builder style)
    #[must_use]
    pub fn with_auth(mut self, auth: Option<AuthCookie>) -> Self {
        self.auth = auth;
        self
    }

    /// Set retry policy (builder style)
    #[must_use]
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Set whole-capture deadline (builder style)
    #[must_use]
    pub fn with_capture_timeout(mut self, timeout: Duration) -> Self {
        self.capture_timeout = timeout;
        self
    }

    /// Set page readiness budget (builder style)
    #[must_use]
    pub fn with_page_load_timeout(mut self, timeout: Duration) -> Self {
        self.page_load_timeout = timeout;
        self
    }

    /// Set per-attempt container budget (builder style)
    #[must_use]
    pub fn with_element_timeout(mut self, timeout: Duration) -> Self {
        self.element_timeout = timeout;
        self
    }

    /// Set settle and stabilize pauses (builder style)
    #[must_use]
    pub fn with_delays(mut self, settle: Duration, stabilize: Duration) -> Self {
        self.settle_delay = settle;
        self.stabilize_delay = stabilize;
        self
    }

    /// Set browser settings (builder style)
    #[must_use]
    pub fn with_session(mut self, session: SessionOptions) -> Self {
        self.session = session;
        self
    }

    /// Set page signals (builder style)
    #[must_use]
    pub fn with_signals(mut self, signals: DomSignals) -> Self {
        self.session.signals = signals;
        self
    }

    /// Zero delays and tight budgets, for tests that script the page
    #[must_use]
    pub fn immediate() -> Self {
        Self {
            page_load_timeout: Duration::from_millis(50),
            poll_interval: Duration::from_millis(5),
            settle_delay: Duration::ZERO,
            element_timeout: Duration::from_millis(50),
            stabilize_delay: Duration::ZERO,
            retry: RetryPolicy::fixed(2, Duration::ZERO),
            capture_timeout: Duration::from_secs(5),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_timings() {
        let config = CaptureConfig::default();
        assert_eq!(config.page_load_timeout, Duration::from_secs(5));
        assert_eq!(config.retry.max_attempts(), 2);
        assert_eq!(config.retry.delay_before(2), Duration::from_secs(1));
        assert_eq!(config.crop_padding, 10);
        assert_eq!(config.capture_timeout, Duration::from_secs(60));
        assert!(config.auth.is_none());
    }

    #[test]
    fn builders_override() {
        let config = CaptureConfig::default()
            .with_capture_timeout(Duration::from_secs(5))
            .with_signals(DomSignals {
                no_data_text: "Nothing here".to_string(),
                ..DomSignals::default()
            });
        assert_eq!(config.capture_timeout, Duration::from_secs(5));
        assert_eq!(config.session.signals.no_data_text, "Nothing here");
    }
}
