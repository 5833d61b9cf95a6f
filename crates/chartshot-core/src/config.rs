//! Pipeline configuration
//!
//! Every field has a default, so an empty TOML document is a valid config.
//! Environment variables override file values; see [`ChartshotConfig::apply_env`].

use crate::error::ConfigError;
use chartshot_capture::{
    AuthCookie, CacheSettings, CaptureConfig, DomSignals, RetryPolicy, SessionOptions, DEFAULT_WEBDRIVER_URL,
};
use chartshot_command::DEFAULT_GROUP_PREFIX;
use chartshot_descriptor::DEFAULT_BASE_URL;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

/// Default asset mapping file
pub const DEFAULT_MAPPINGS_PATH: &str = "asset_mappings.json";

/// Default auth cookie name
pub const DEFAULT_COOKIE_NAME: &str = "artemis_api_key";

/// Default summarizer budget in seconds
pub const DEFAULT_SUMMARY_TIMEOUT_SECS: u64 = 30;

/// Top-level configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartshotConfig {
    /// Asset mapping JSON file
    pub mappings_path: PathBuf,
    /// Chart backend base URL
    pub chart_base_url: String,
    /// chromedriver-compatible endpoint
    pub webdriver_url: String,
    /// Group-chat command prefix
    pub group_prefix: String,
    /// Summarizer budget in seconds
    pub summary_timeout_secs: u64,
    /// Backend auth
    pub auth: AuthSettings,
    /// Capture cache
    pub cache: CacheConfig,
    /// Capture timings and browser settings
    pub capture: CaptureTimings,
}

impl Default for ChartshotConfig {
    fn default() -> Self {
        Self {
            mappings_path: PathBuf::from(DEFAULT_MAPPINGS_PATH),
            chart_base_url: DEFAULT_BASE_URL.to_string(),
            webdriver_url: DEFAULT_WEBDRIVER_URL.to_string(),
            group_prefix: DEFAULT_GROUP_PREFIX.to_string(),
            summary_timeout_secs: DEFAULT_SUMMARY_TIMEOUT_SECS,
            auth: AuthSettings::default(),
            cache: CacheConfig::default(),
            capture: CaptureTimings::default(),
        }
    }
}

/// Backend auth token and its cookie
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthSettings {
    /// Token; no cookie is installed without one
    pub token: Option<String>,
    /// Cookie name
    pub cookie_name: String,
    /// Cookie domain; derived from the chart base URL when unset
    pub cookie_domain: Option<String>,
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            token: None,
            cookie_name: DEFAULT_COOKIE_NAME.to_string(),
            cookie_domain: None,
        }
    }
}

impl std::fmt::Debug for AuthSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthSettings")
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("cookie_name", &self.cookie_name)
            .field("cookie_domain", &self.cookie_domain)
            .finish()
    }
}

/// Capture cache sizing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Entry lifetime in seconds
    pub ttl_secs: u64,
    /// Entry bound, `None` for unbounded
    pub max_entries: Option<u64>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        let settings = CacheSettings::default();
        Self {
            ttl_secs: settings.ttl.as_secs(),
            max_entries: settings.max_entries,
        }
    }
}

/// Capture timings in integer units, plus browser settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureTimings {
    /// Readiness budget
    pub page_load_timeout_ms: u64,
    /// Poll interval
    pub poll_interval_ms: u64,
    /// Pause after readiness
    pub settle_delay_ms: u64,
    /// Per-attempt container budget
    pub element_timeout_ms: u64,
    /// Pause after containers appear
    pub stabilize_delay_ms: u64,
    /// Container wait attempts
    pub retry_attempts: u32,
    /// Fixed delay between container attempts
    pub retry_backoff_ms: u64,
    /// Crop margin in pixels
    pub crop_padding: u32,
    /// Whole-capture deadline
    pub capture_timeout_secs: u64,
    /// Headless browser
    pub headless: bool,
    /// Viewport width
    pub viewport_width: u32,
    /// Viewport height
    pub viewport_height: u32,
    /// Page signals
    pub signals: DomSignals,
}

impl Default for CaptureTimings {
    fn default() -> Self {
        let capture = CaptureConfig::default();
        let retry_backoff = capture.retry.delay_before(2);
        Self {
            page_load_timeout_ms: millis(capture.page_load_timeout),
            poll_interval_ms: millis(capture.poll_interval),
            settle_delay_ms: millis(capture.settle_delay),
            element_timeout_ms: millis(capture.element_timeout),
            stabilize_delay_ms: millis(capture.stabilize_delay),
            retry_attempts: capture.retry.max_attempts(),
            retry_backoff_ms: millis(retry_backoff),
            crop_padding: capture.crop_padding,
            capture_timeout_secs: capture.capture_timeout.as_secs(),
            headless: capture.session.headless,
            viewport_width: capture.session.viewport_width,
            viewport_height: capture.session.viewport_height,
            signals: capture.session.signals,
        }
    }
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

impl ChartshotConfig {
    /// Parse TOML text
    ///
    /// # Errors
    /// Returns [`ConfigError::Malformed`] if the text does not match the schema
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Read a TOML file
    ///
    /// # Errors
    /// Returns [`ConfigError::Io`] or [`ConfigError::Malformed`]
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Apply `CHARTSHOT_*` overrides from the process environment
    ///
    /// # Errors
    /// Returns [`ConfigError::InvalidEnv`] naming the first unparseable variable
    pub fn apply_env(self) -> Result<Self, ConfigError> {
        self.apply_env_with(|var| std::env::var(var).ok())
    }

    /// Apply `CHARTSHOT_*` overrides from `lookup`
    ///
    /// # Errors
    /// Returns [`ConfigError::InvalidEnv`] naming the first unparseable variable
    pub fn apply_env_with<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = lookup("CHARTSHOT_MAPPINGS_PATH") {
            self.mappings_path = PathBuf::from(path);
        }
        if let Some(url) = lookup("CHARTSHOT_CHART_BASE_URL") {
            self.chart_base_url = url;
        }
        if let Some(url) = lookup("CHARTSHOT_WEBDRIVER_URL") {
            self.webdriver_url = url;
        }
        if let Some(token) = lookup("CHARTSHOT_AUTH_TOKEN") {
            self.auth.token = Some(token).filter(|t| !t.trim().is_empty());
        }
        if let Some(name) = lookup("CHARTSHOT_AUTH_COOKIE_NAME") {
            self.auth.cookie_name = name;
        }
        if let Some(prefix) = lookup("CHARTSHOT_GROUP_PREFIX") {
            self.group_prefix = prefix;
        }
        if let Some(raw) = lookup("CHARTSHOT_CACHE_TTL_SECS") {
            self.cache.ttl_secs = parse_var("CHARTSHOT_CACHE_TTL_SECS", &raw, "whole seconds")?;
        }
        if let Some(raw) = lookup("CHARTSHOT_CACHE_MAX_ENTRIES") {
            let max: u64 = parse_var("CHARTSHOT_CACHE_MAX_ENTRIES", &raw, "entry count, 0 for unbounded")?;
            self.cache.max_entries = (max > 0).then_some(max);
        }
        if let Some(raw) = lookup("CHARTSHOT_SUMMARY_TIMEOUT_SECS") {
            self.summary_timeout_secs = parse_var("CHARTSHOT_SUMMARY_TIMEOUT_SECS", &raw, "whole seconds")?;
        }
        if let Some(raw) = lookup("CHARTSHOT_HEADLESS") {
            self.capture.headless = parse_flag("CHARTSHOT_HEADLESS", &raw)?;
        }
        Ok(self)
    }

    /// Cache settings for [`chartshot_capture::CaptureCache`]
    #[must_use]
    pub fn cache_settings(&self) -> CacheSettings {
        CacheSettings::default()
            .with_ttl(Duration::from_secs(self.cache.ttl_secs))
            .with_max_entries(self.cache.max_entries)
    }

    /// Summarizer budget
    #[must_use]
    pub fn summary_timeout(&self) -> Duration {
        Duration::from_secs(self.summary_timeout_secs)
    }

    /// Cookie domain, explicit or derived from the chart base URL
    ///
    /// # Errors
    /// Returns [`ConfigError::CookieDomain`] if the base URL has no host
    pub fn cookie_domain(&self) -> Result<String, ConfigError> {
        match &self.auth.cookie_domain {
            Some(domain) => Ok(domain.clone()),
            None => derive_cookie_domain(&self.chart_base_url),
        }
    }

    /// Auth cookie, if a token is configured
    ///
    /// The cookie is marked secure unless the chart base URL is plain HTTP.
    ///
    /// # Errors
    /// Returns [`ConfigError::CookieDomain`] if the domain cannot be derived
    pub fn auth_cookie(&self) -> Result<Option<AuthCookie>, ConfigError> {
        let Some(token) = &self.auth.token else {
            return Ok(None);
        };
        let secure = !reqwest::Url::parse(&self.chart_base_url).is_ok_and(|url| url.scheme() == "http");
        Ok(Some(
            AuthCookie::new(self.auth.cookie_name.clone(), token.clone(), self.cookie_domain()?)
                .with_secure(secure),
        ))
    }

    /// Engine configuration
    ///
    /// # Errors
    /// Returns [`ConfigError::CookieDomain`] if a token is set and the domain
    /// cannot be derived
    pub fn capture_config(&self) -> Result<CaptureConfig, ConfigError> {
        let t = &self.capture;
        let session = SessionOptions {
            headless: t.headless,
            viewport_width: t.viewport_width,
            viewport_height: t.viewport_height,
            signals: t.signals.clone(),
            ..SessionOptions::default()
        };
        let config = CaptureConfig {
            page_load_timeout: Duration::from_millis(t.page_load_timeout_ms),
            poll_interval: Duration::from_millis(t.poll_interval_ms),
            element_timeout: Duration::from_millis(t.element_timeout_ms),
            crop_padding: t.crop_padding,
            ..CaptureConfig::default()
        };
        Ok(config
            .with_delays(
                Duration::from_millis(t.settle_delay_ms),
                Duration::from_millis(t.stabilize_delay_ms),
            )
            .with_retry(RetryPolicy::fixed(
                t.retry_attempts,
                Duration::from_millis(t.retry_backoff_ms),
            ))
            .with_capture_timeout(Duration::from_secs(t.capture_timeout_secs))
            .with_session(session)
            .with_auth(self.auth_cookie()?))
    }
}

/// Parent domain of the URL host with a leading dot
///
/// `app.example.com` becomes `.example.com`; a bare two-label domain is
/// kept whole, single-label hosts and IP addresses are returned unchanged.
///
/// # Errors
/// Returns [`ConfigError::CookieDomain`] if the URL has no host
pub fn derive_cookie_domain(base_url: &str) -> Result<String, ConfigError> {
    let invalid = || ConfigError::CookieDomain(base_url.to_string());
    let url = reqwest::Url::parse(base_url).map_err(|_| invalid())?;

    let Some(domain) = url.domain() else {
        return url.host_str().map(str::to_string).ok_or_else(invalid);
    };
    let labels: Vec<&str> = domain.split('.').filter(|label| !label.is_empty()).collect();
    match labels.as_slice() {
        [] => Err(invalid()),
        [single] => Ok((*single).to_string()),
        [_, _] => Ok(format!(".{}", labels.join("."))),
        [_, parent @ ..] => Ok(format!(".{}", parent.join("."))),
    }
}

fn parse_var<T: FromStr>(var: &'static str, raw: &str, expected: &'static str) -> Result<T, ConfigError> {
    raw.trim().parse().map_err(|_| ConfigError::InvalidEnv {
        var,
        value: raw.to_string(),
        expected,
    })
}

fn parse_flag(var: &'static str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidEnv {
            var,
            value: raw.to_string(),
            expected: "true or false",
        }),
    }
}
