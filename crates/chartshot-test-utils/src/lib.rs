//! Testing utilities for the chartshot workspace
//!
//! Fixture registries, PNG frames, a scripted browser and canned summarizers.

#![allow(missing_docs)]
#![allow(clippy::missing_panics_doc, clippy::must_use_candidate)]

use async_trait::async_trait;
use chartshot_asset::{AssetRegistry, MappingDocument};
use chartshot_capture::{AuthCookie, BrowserSession, DriverError, ElementRect, SessionLauncher, SessionOptions};
use chartshot_core::{Summarizer, SummaryError};
use image::{ImageFormat, Rgba, RgbaImage};
use parking_lot::Mutex;
use std::io::{Cursor, Write};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tempfile::NamedTempFile;

// ---------------------------------------------------------------------------
// Assets
// ---------------------------------------------------------------------------

/// solana, ethereum, uniswap and bitcoin
pub fn sample_document() -> MappingDocument {
    MappingDocument::new()
        .with_asset("solana", ["sol", "solana"], "chain")
        .with_asset("ethereum", ["eth", "ethereum"], "chain")
        .with_asset("uniswap", ["uni"], "application")
        .with_asset("bitcoin", ["btc"], "chain")
}

pub fn sample_registry() -> Arc<AssetRegistry> {
    Arc::new(AssetRegistry::from_document(sample_document()).unwrap())
}

/// Sample document written to a temporary JSON file
pub fn mappings_file() -> NamedTempFile {
    mappings_file_with(&sample_document())
}

pub fn mappings_file_with(doc: &MappingDocument) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(serde_json::to_string(doc).unwrap().as_bytes())
        .unwrap();
    file.flush().unwrap();
    file
}

// ---------------------------------------------------------------------------
// Images
// ---------------------------------------------------------------------------

/// Opaque single-colour PNG
pub fn solid_png(width: u32, height: u32) -> Vec<u8> {
    let frame = RgbaImage::from_pixel(width, height, Rgba([30, 30, 46, 255]));
    let mut out = Cursor::new(Vec::new());
    frame.write_to(&mut out, ImageFormat::Png).unwrap();
    out.into_inner()
}

/// Decoded dimensions of a PNG
pub fn png_dimensions(png: &[u8]) -> (u32, u32) {
    let decoded = image::load_from_memory_with_format(png, ImageFormat::Png).unwrap();
    (decoded.width(), decoded.height())
}

// ---------------------------------------------------------------------------
// Scripted browser
// ---------------------------------------------------------------------------

/// Page behaviour for every session a [`ScriptedLauncher`] starts
#[derive(Debug, Clone)]
pub struct PageScript {
    pub launch_error: Option<DriverError>,
    pub cookie_error: Option<DriverError>,
    pub navigate_error: Option<DriverError>,
    /// Time spent inside `navigate`
    pub navigate_delay: Duration,
    /// `readyState` polls answered "loading" before "complete"; `None` never completes
    pub ready_after_polls: Option<usize>,
    pub no_data_marker: bool,
    pub series_empty: Option<bool>,
    pub visible_series: Result<usize, DriverError>,
    /// Container polls answered empty first; `None` never shows containers
    pub containers_after_polls: Option<usize>,
    pub containers: Vec<ElementRect>,
    pub focus_error: bool,
    pub screenshot_error: Option<DriverError>,
    pub frame: (u32, u32),
}

impl Default for PageScript {
    fn default() -> Self {
        Self {
            launch_error: None,
            cookie_error: None,
            navigate_error: None,
            navigate_delay: Duration::ZERO,
            ready_after_polls: Some(0),
            no_data_marker: false,
            series_empty: Some(false),
            visible_series: Ok(2),
            containers_after_polls: Some(0),
            containers: vec![ElementRect::new(100.0, 120.0, 800.0, 400.0)],
            focus_error: false,
            screenshot_error: None,
            frame: (1280, 800),
        }
    }
}

impl PageScript {
    pub fn no_data_marker() -> Self {
        Self {
            no_data_marker: true,
            ..Self::default()
        }
    }

    pub fn navigate_fails(message: &str) -> Self {
        Self {
            navigate_error: Some(DriverError::Command {
                error: "unknown error".to_string(),
                message: message.to_string(),
            }),
            ..Self::default()
        }
    }
}

/// What the scripted sessions were asked to do
#[derive(Debug, Default)]
pub struct SessionLog {
    pub launches: AtomicUsize,
    pub closes: AtomicUsize,
    pub cookies: AtomicUsize,
    pub navigations: AtomicUsize,
    pub screenshots: AtomicUsize,
    pub urls: Mutex<Vec<String>>,
    pub focused: Mutex<Vec<usize>>,
}

impl SessionLog {
    pub fn launches(&self) -> usize {
        self.launches.load(Ordering::SeqCst)
    }

    pub fn closes(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }

    pub fn cookies(&self) -> usize {
        self.cookies.load(Ordering::SeqCst)
    }

    pub fn navigations(&self) -> usize {
        self.navigations.load(Ordering::SeqCst)
    }

    pub fn screenshots(&self) -> usize {
        self.screenshots.load(Ordering::SeqCst)
    }

    pub fn focused(&self) -> Vec<usize> {
        self.focused.lock().clone()
    }

    pub fn urls(&self) -> Vec<String> {
        self.urls.lock().clone()
    }
}

/// In-memory launcher; every session follows the same [`PageScript`]
#[derive(Debug, Clone)]
pub struct ScriptedLauncher {
    script: PageScript,
    log: Arc<SessionLog>,
}

impl ScriptedLauncher {
    pub fn new(script: PageScript) -> Self {
        Self {
            script,
            log: Arc::new(SessionLog::default()),
        }
    }

    pub fn log(&self) -> Arc<SessionLog> {
        Arc::clone(&self.log)
    }
}

impl Default for ScriptedLauncher {
    fn default() -> Self {
        Self::new(PageScript::default())
    }
}

#[async_trait]
impl SessionLauncher for ScriptedLauncher {
    async fn launch(&self, _options: &SessionOptions) -> Result<Box<dyn BrowserSession>, DriverError> {
        self.log.launches.fetch_add(1, Ordering::SeqCst);
        if let Some(err) = &self.script.launch_error {
            return Err(err.clone());
        }
        Ok(Box::new(ScriptedSession {
            script: self.script.clone(),
            log: Arc::clone(&self.log),
            ready_polls: AtomicUsize::new(0),
            container_polls: AtomicUsize::new(0),
        }))
    }
}

pub struct ScriptedSession {
    script: PageScript,
    log: Arc<SessionLog>,
    ready_polls: AtomicUsize,
    container_polls: AtomicUsize,
}

#[async_trait]
impl BrowserSession for ScriptedSession {
    async fn install_cookie(&self, _cookie: &AuthCookie) -> Result<(), DriverError> {
        self.log.cookies.fetch_add(1, Ordering::SeqCst);
        match &self.script.cookie_error {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }

    async fn navigate(&self, url: &str) -> Result<(), DriverError> {
        self.log.navigations.fetch_add(1, Ordering::SeqCst);
        self.log.urls.lock().push(url.to_string());
        if !self.script.navigate_delay.is_zero() {
            tokio::time::sleep(self.script.navigate_delay).await;
        }
        match &self.script.navigate_error {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }

    async fn ready_state(&self) -> Result<String, DriverError> {
        let polls = self.ready_polls.fetch_add(1, Ordering::SeqCst);
        let ready = self.script.ready_after_polls.is_some_and(|after| polls >= after);
        Ok(if ready { "complete" } else { "loading" }.to_string())
    }

    async fn no_data_marker_visible(&self) -> Result<bool, DriverError> {
        Ok(self.script.no_data_marker)
    }

    async fn chart_series_empty(&self) -> Result<Option<bool>, DriverError> {
        Ok(self.script.series_empty)
    }

    async fn visible_series_count(&self) -> Result<usize, DriverError> {
        self.script.visible_series.clone()
    }

    async fn chart_containers(&self) -> Result<Vec<ElementRect>, DriverError> {
        let polls = self.container_polls.fetch_add(1, Ordering::SeqCst);
        let shown = self.script.containers_after_polls.is_some_and(|after| polls >= after);
        Ok(if shown { self.script.containers.clone() } else { Vec::new() })
    }

    async fn focus_container(&self, index: usize) -> Result<ElementRect, DriverError> {
        self.log.focused.lock().push(index);
        if self.script.focus_error {
            return Err(DriverError::ElementMissing(format!("container {index}")));
        }
        self.script
            .containers
            .get(index)
            .copied()
            .ok_or_else(|| DriverError::ElementMissing(format!("container {index}")))
    }

    async fn screenshot_png(&self) -> Result<Vec<u8>, DriverError> {
        self.log.screenshots.fetch_add(1, Ordering::SeqCst);
        if let Some(err) = &self.script.screenshot_error {
            return Err(err.clone());
        }
        Ok(solid_png(self.script.frame.0, self.script.frame.1))
    }

    async fn close(self: Box<Self>) -> Result<(), DriverError> {
        self.log.closes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Summarizers
// ---------------------------------------------------------------------------

/// Always answers with the same caption
#[derive(Debug, Default)]
pub struct StaticSummarizer {
    caption: String,
    calls: AtomicUsize,
}

impl StaticSummarizer {
    pub fn new(caption: impl Into<String>) -> Self {
        Self {
            caption: caption.into(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Summarizer for StaticSummarizer {
    async fn summarize(&self, _image: &[u8]) -> Result<Option<String>, SummaryError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(Some(self.caption.clone()))
    }
}

/// Always fails
#[derive(Debug, Clone, Copy, Default)]
pub struct FailingSummarizer;

#[async_trait]
impl Summarizer for FailingSummarizer {
    async fn summarize(&self, _image: &[u8]) -> Result<Option<String>, SummaryError> {
        Err(SummaryError::new("summarizer unavailable"))
    }
}

/// Answers after `delay`
#[derive(Debug, Clone, Copy)]
pub struct SlowSummarizer(pub Duration);

#[async_trait]
impl Summarizer for SlowSummarizer {
    async fn summarize(&self, _image: &[u8]) -> Result<Option<String>, SummaryError> {
        tokio::time::sleep(self.0).await;
        Ok(Some("late caption".to_string()))
    }
}
