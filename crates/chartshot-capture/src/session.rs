//! Browser automation seam
//!
//! The capture engine only talks to [`SessionLauncher`] and [`BrowserSession`].
//! The production implementation is the WebDriver client in
//! [`crate::webdriver`]; tests script page conditions with in-memory doubles.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Bounding box in viewport CSS pixels
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ElementRect {
    /// Left edge
    pub x: f64,
    /// Top edge
    pub y: f64,
    /// Width
    pub width: f64,
    /// Height
    pub height: f64,
}

impl ElementRect {
    /// Create rect
    #[inline]
    #[must_use]
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Area, zero for degenerate rects
    #[inline]
    #[must_use]
    pub fn area(&self) -> f64 {
        self.width.max(0.0) * self.height.max(0.0)
    }
}

/// Page signals queried by the session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DomSignals {
    /// Text of the renderer's empty-state marker
    pub no_data_text: String,
    /// Selector for rendered series
    pub series_selector: String,
    /// Selector for chart containers
    pub container_selector: String,
}

impl Default for DomSignals {
    fn default() -> Self {
        Self {
            no_data_text: "No data available".to_string(),
            series_selector: ".highcharts-series".to_string(),
            container_selector: ".highcharts-container".to_string(),
        }
    }
}

/// Settings a session is launched with
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionOptions {
    /// Run without a visible window
    pub headless: bool,
    /// Viewport width
    pub viewport_width: u32,
    /// Viewport height
    pub viewport_height: u32,
    /// Page load budget handed to the driver
    pub page_load_timeout_ms: u64,
    /// Page signals
    pub signals: DomSignals,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            headless: true,
            viewport_width: 1920,
            viewport_height: 1080,
            page_load_timeout_ms: 30_000,
            signals: DomSignals::default(),
        }
    }
}

/// Backend auth token installed as a cookie before navigation
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthCookie {
    /// Cookie name
    pub name: String,
    /// Token
    pub value: String,
    /// Domain with leading dot
    pub domain: String,
    /// Path
    pub path: String,
    /// Send only over HTTPS
    pub secure: bool,
}

impl AuthCookie {
    /// Cookie scoped to `domain` at path `/`
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<String>, domain: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            domain: domain.into(),
            path: "/".to_string(),
            secure: true,
        }
    }

    /// Set the `Secure` attribute
    #[must_use]
    pub fn with_secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }
}

impl std::fmt::Debug for AuthCookie {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthCookie")
            .field("name", &self.name)
            .field("value", &"<redacted>")
            .field("domain", &self.domain)
            .field("path", &self.path)
            .field("secure", &self.secure)
            .finish()
    }
}

/// Errors raised by a browser driver
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DriverError {
    /// Driver endpoint unreachable or the HTTP exchange failed
    #[error("driver transport error: {0}")]
    Transport(String),

    /// Driver reported a command failure
    #[error("{error}: {message}")]
    Command {
        /// WebDriver error code
        error: String,
        /// Driver message, including browser network errors
        message: String,
    },

    /// Response did not have the expected shape
    #[error("unexpected driver response: {0}")]
    Protocol(String),

    /// Element no longer available
    #[error("element not found: {0}")]
    ElementMissing(String),
}

/// Factory for browser sessions
#[async_trait]
pub trait SessionLauncher: Send + Sync {
    /// Start a dedicated session
    async fn launch(&self, options: &SessionOptions) -> Result<Box<dyn BrowserSession>, DriverError>;
}

/// One live browser session, owned by a single capture
#[async_trait]
pub trait BrowserSession: Send + Sync {
    /// Install a cookie before navigation
    async fn install_cookie(&self, cookie: &AuthCookie) -> Result<(), DriverError>;

    /// Navigate to `url`
    async fn navigate(&self, url: &str) -> Result<(), DriverError>;

    /// `document.readyState`
    async fn ready_state(&self) -> Result<String, DriverError>;

    /// Whether the empty-state marker is displayed
    async fn no_data_marker_visible(&self) -> Result<bool, DriverError>;

    /// `Some(true)` when the first chart exists and all its series are
    /// empty, `None` when there is no chart object
    async fn chart_series_empty(&self) -> Result<Option<bool>, DriverError>;

    /// Number of displayed series elements
    async fn visible_series_count(&self) -> Result<usize, DriverError>;

    /// Chart container rects in document order
    async fn chart_containers(&self) -> Result<Vec<ElementRect>, DriverError>;

    /// Scroll container `index` into view and return its current rect
    async fn focus_container(&self, index: usize) -> Result<ElementRect, DriverError>;

    /// Full-viewport PNG
    async fn screenshot_png(&self) -> Result<Vec<u8>, DriverError>;

    /// End the session
    async fn close(self: Box<Self>) -> Result<(), DriverError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn area_ignores_negative_sizes() {
        assert_eq!(ElementRect::new(0.0, 0.0, 10.0, 20.0).area(), 200.0);
        assert_eq!(ElementRect::new(0.0, 0.0, -5.0, 20.0).area(), 0.0);
    }

    #[test]
    fn cookie_debug_hides_token() {
        let cookie = AuthCookie::new("artemis_api_key", "secret-token", ".example.com");
        let debug = format!("{cookie:?}");
        assert!(!debug.contains("secret-token"));
        assert!(debug.contains(".example.com"));
    }

    #[test]
    fn driver_command_error_keeps_browser_text() {
        let err = DriverError::Command {
            error: "unknown error".to_string(),
            message: "net::ERR_NAME_NOT_RESOLVED".to_string(),
        };
        assert_eq!(err.to_string(), "unknown error: net::ERR_NAME_NOT_RESOLVED");
    }
}
