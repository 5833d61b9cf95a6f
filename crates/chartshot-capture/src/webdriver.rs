//! W3C WebDriver client
//!
//! Talks JSON over HTTP to a chromedriver-compatible endpoint. One
//! [`WebDriverSession`] maps to one browser session; the launcher holds the
//! pooled HTTP client shared by every session it creates.

use crate::scripts;
use crate::session::{AuthCookie, BrowserSession, DomSignals, DriverError, ElementRect, SessionLauncher, SessionOptions};
use async_trait::async_trait;
use base64::Engine as _;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;

/// Default chromedriver endpoint
pub const DEFAULT_WEBDRIVER_URL: &str = "http://localhost:9515";

/// HTTP budget per driver command
const COMMAND_TIMEOUT: Duration = Duration::from_secs(90);

/// Launches Chrome sessions through a WebDriver endpoint
#[derive(Debug, Clone)]
pub struct WebDriverLauncher {
    http: reqwest::Client,
    endpoint: String,
}

impl WebDriverLauncher {
    /// Create launcher for `endpoint`
    ///
    /// # Errors
    /// Returns [`DriverError::Transport`] if the HTTP client cannot be built
    pub fn new(endpoint: impl Into<String>) -> Result<Self, DriverError> {
        let http = reqwest::Client::builder()
            .timeout(COMMAND_TIMEOUT)
            .build()
            .map_err(|e| DriverError::Transport(e.to_string()))?;
        Ok(Self {
            http,
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
        })
    }

    /// Endpoint in use
    #[inline]
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

/// Chrome command-line flags for deterministic headless rendering
#[must_use]
pub fn chrome_args(options: &SessionOptions) -> Vec<String> {
    let mut args = Vec::with_capacity(10);
    if options.headless {
        args.push("--headless=new".to_string());
    }
    args.extend(
        [
            "--no-sandbox",
            "--disable-dev-shm-usage",
            "--disable-gpu",
            "--disable-extensions",
            "--hide-scrollbars",
            "--force-device-scale-factor=1",
            "--force-prefers-reduced-motion",
        ]
        .map(str::to_string),
    );
    args.push(format!(
        "--window-size={},{}",
        options.viewport_width, options.viewport_height
    ));
    args
}

#[async_trait]
impl SessionLauncher for WebDriverLauncher {
    async fn launch(&self, options: &SessionOptions) -> Result<Box<dyn BrowserSession>, DriverError> {
        let body = json!({
            "capabilities": {
                "alwaysMatch": {
                    "browserName": "chrome",
                    "goog:chromeOptions": { "args": chrome_args(options) }
                }
            }
        });
        let value = exchange(
            self.http
                .post(format!("{}/session", self.endpoint))
                .json(&body),
        )
        .await?;
        let session_id = value
            .get("sessionId")
            .and_then(Value::as_str)
            .ok_or_else(|| DriverError::Protocol("new session response without sessionId".to_string()))?;

        let session = WebDriverSession {
            http: self.http.clone(),
            base: format!("{}/session/{session_id}", self.endpoint),
            signals: options.signals.clone(),
        };
        tracing::debug!(session = %session_id, "webdriver session started");

        if let Err(err) = session.configure(options).await {
            return Err(abandon(Box::new(session), err).await);
        }
        Ok(Box::new(session))
    }
}

/// Close a session that failed setup and hand back the setup error
async fn abandon(session: Box<dyn BrowserSession>, err: DriverError) -> DriverError {
    if let Err(close_err) = session.close().await {
        tracing::warn!(error = %close_err, setup_error = %err, "failed to close unconfigured session");
    }
    err
}

/// One live WebDriver session
#[derive(Debug)]
pub struct WebDriverSession {
    http: reqwest::Client,
    base: String,
    signals: DomSignals,
}

impl WebDriverSession {
    async fn configure(&self, options: &SessionOptions) -> Result<(), DriverError> {
        self.post(
            "window/rect",
            &json!({
                "x": 0,
                "y": 0,
                "width": options.viewport_width,
                "height": options.viewport_height
            }),
        )
        .await?;
        self.post(
            "timeouts",
            &json!({ "pageLoad": options.page_load_timeout_ms, "script": 30_000 }),
        )
        .await?;
        Ok(())
    }

    async fn post(&self, path: &str, body: &Value) -> Result<Value, DriverError> {
        exchange(self.http.post(format!("{}/{path}", self.base)).json(body)).await
    }

    async fn execute(&self, script: &str, args: Value) -> Result<Value, DriverError> {
        self.post("execute/sync", &json!({ "script": script, "args": args }))
            .await
    }
}

#[async_trait]
impl BrowserSession for WebDriverSession {
    async fn install_cookie(&self, cookie: &AuthCookie) -> Result<(), DriverError> {
        self.post("goog/cdp/execute", &set_cookie_command(cookie))
            .await?;
        Ok(())
    }

    async fn navigate(&self, url: &str) -> Result<(), DriverError> {
        self.post("url", &json!({ "url": url })).await?;
        Ok(())
    }

    async fn ready_state(&self) -> Result<String, DriverError> {
        let value = self.execute(scripts::READY_STATE, json!([])).await?;
        value
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| unexpected("readyState", &value))
    }

    async fn no_data_marker_visible(&self) -> Result<bool, DriverError> {
        let value = self
            .execute(scripts::NO_DATA_VISIBLE, json!([self.signals.no_data_text]))
            .await?;
        value.as_bool().ok_or_else(|| unexpected("no-data probe", &value))
    }

    async fn chart_series_empty(&self) -> Result<Option<bool>, DriverError> {
        let value = self.execute(scripts::SERIES_EMPTY, json!([])).await?;
        match value {
            Value::Null => Ok(None),
            Value::Bool(empty) => Ok(Some(empty)),
            other => Err(unexpected("series probe", &other)),
        }
    }

    async fn visible_series_count(&self) -> Result<usize, DriverError> {
        let value = self
            .execute(scripts::VISIBLE_COUNT, json!([self.signals.series_selector]))
            .await?;
        value
            .as_u64()
            .and_then(|n| usize::try_from(n).ok())
            .ok_or_else(|| unexpected("series count", &value))
    }

    async fn chart_containers(&self) -> Result<Vec<ElementRect>, DriverError> {
        let value = self
            .execute(
                scripts::CONTAINER_RECTS,
                json!([self.signals.container_selector]),
            )
            .await?;
        serde_json::from_value(value).map_err(|e| DriverError::Protocol(e.to_string()))
    }

    async fn focus_container(&self, index: usize) -> Result<ElementRect, DriverError> {
        let value = self
            .execute(
                scripts::FOCUS_CONTAINER,
                json!([self.signals.container_selector, index]),
            )
            .await?;
        if value.is_null() {
            return Err(DriverError::ElementMissing(format!(
                "{}[{index}]",
                self.signals.container_selector
            )));
        }
        serde_json::from_value(value).map_err(|e| DriverError::Protocol(e.to_string()))
    }

    async fn screenshot_png(&self) -> Result<Vec<u8>, DriverError> {
        let value = exchange(self.http.get(format!("{}/screenshot", self.base))).await?;
        let encoded = value
            .as_str()
            .ok_or_else(|| unexpected("screenshot", &value))?;
        base64::engine::general_purpose::STANDARD
            .decode(encoded)
            .map_err(|e| DriverError::Protocol(format!("screenshot is not base64: {e}")))
    }

    async fn close(self: Box<Self>) -> Result<(), DriverError> {
        exchange(self.http.delete(&self.base)).await?;
        tracing::debug!(session = %self.base, "webdriver session closed");
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
struct WireError {
    error: String,
    #[serde(default)]
    message: String,
}

/// Send one command and unwrap the `value` member of the response
async fn exchange(request: reqwest::RequestBuilder) -> Result<Value, DriverError> {
    let response = request
        .send()
        .await
        .map_err(|e| DriverError::Transport(e.to_string()))?;
    let status = response.status();
    let mut body: Value = response
        .json()
        .await
        .map_err(|e| DriverError::Protocol(format!("status {status}: {e}")))?;
    let value = body.get_mut("value").map(Value::take).unwrap_or(Value::Null);

    if status.is_success() {
        return Ok(value);
    }
    match serde_json::from_value::<WireError>(value) {
        Ok(wire) => Err(DriverError::Command {
            error: wire.error,
            message: wire.message,
        }),
        Err(_) => Err(DriverError::Protocol(format!("status {status} without error payload"))),
    }
}

/// CDP `Network.setCookie` command for `cookie`
fn set_cookie_command(cookie: &AuthCookie) -> Value {
    json!({
        "cmd": "Network.setCookie",
        "params": {
            "name": cookie.name,
            "value": cookie.value,
            "domain": cookie.domain,
            "path": cookie.path,
            "secure": cookie.secure
        }
    })
}

fn unexpected(what: &str, value: &Value) -> DriverError {
    DriverError::Protocol(format!("{what} returned {value}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn args_follow_options() {
        let args = chrome_args(&SessionOptions::default());
        assert_eq!(args[0], "--headless=new");
        assert!(args.contains(&"--window-size=1920,1080".to_string()));
        assert!(args.contains(&"--force-device-scale-factor=1".to_string()));

        let visible = chrome_args(&SessionOptions {
            headless: false,
            viewport_width: 800,
            viewport_height: 600,
            ..SessionOptions::default()
        });
        assert!(!visible.iter().any(|a| a.starts_with("--headless")));
        assert!(visible.contains(&"--window-size=800,600".to_string()));
    }

    #[test]
    fn endpoint_trailing_slash_is_trimmed() {
        let launcher = WebDriverLauncher::new("http://localhost:9515/").unwrap();
        assert_eq!(launcher.endpoint(), DEFAULT_WEBDRIVER_URL);
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_transport_error() {
        let launcher = WebDriverLauncher::new("http://127.0.0.1:1").unwrap();
        match launcher.launch(&SessionOptions::default()).await {
            Err(err) => assert!(matches!(err, DriverError::Transport(_)), "{err}"),
            Ok(_) => panic!("launch against a closed port succeeded"),
        }
    }

    struct UnclosableSession(Arc<AtomicUsize>);

    #[async_trait]
    impl BrowserSession for UnclosableSession {
        async fn install_cookie(&self, _cookie: &AuthCookie) -> Result<(), DriverError> {
            Ok(())
        }
        async fn navigate(&self, _url: &str) -> Result<(), DriverError> {
            Ok(())
        }
        async fn ready_state(&self) -> Result<String, DriverError> {
            Ok("complete".to_string())
        }
        async fn no_data_marker_visible(&self) -> Result<bool, DriverError> {
            Ok(false)
        }
        async fn chart_series_empty(&self) -> Result<Option<bool>, DriverError> {
            Ok(None)
        }
        async fn visible_series_count(&self) -> Result<usize, DriverError> {
            Ok(0)
        }
        async fn chart_containers(&self) -> Result<Vec<ElementRect>, DriverError> {
            Ok(Vec::new())
        }
        async fn focus_container(&self, index: usize) -> Result<ElementRect, DriverError> {
            Err(DriverError::ElementMissing(index.to_string()))
        }
        async fn screenshot_png(&self) -> Result<Vec<u8>, DriverError> {
            Ok(Vec::new())
        }
        async fn close(self: Box<Self>) -> Result<(), DriverError> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Err(DriverError::Transport("socket closed".to_string()))
        }
    }

    #[tokio::test]
    async fn abandoned_session_is_closed_and_setup_error_kept() {
        let closes = Arc::new(AtomicUsize::new(0));
        let setup = DriverError::Protocol("window/rect rejected".to_string());

        let err = abandon(Box::new(UnclosableSession(Arc::clone(&closes))), setup.clone()).await;

        assert_eq!(err, setup);
        assert_eq!(closes.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn cookie_command_follows_secure_flag() {
        let cookie = AuthCookie::new("artemis_api_key", "token", ".example.com");
        let command = set_cookie_command(&cookie);
        assert_eq!(command["cmd"], "Network.setCookie");
        assert_eq!(command["params"]["domain"], ".example.com");
        assert_eq!(command["params"]["secure"], true);

        let plain = set_cookie_command(&cookie.with_secure(false));
        assert_eq!(plain["params"]["secure"], false);
    }
}
