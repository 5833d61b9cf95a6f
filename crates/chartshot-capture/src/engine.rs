//! Capture engine
//!
//! One capture: cache lookup, then (single-flight per fingerprint) launch a
//! dedicated session, navigate, wait for readiness, classify empty states,
//! wait for the chart container, screenshot and crop. Every wait is bounded
//! and the whole render runs under a deadline.

use crate::cache::CaptureCache;
use crate::classify::classify_driver_error;
use crate::config::CaptureConfig;
use crate::crop::crop_png;
use crate::guard::SessionGuard;
use crate::outcome::{CaptureFailure, CaptureOutcome, FailureKind, ImageBytes};
use crate::session::{BrowserSession, ElementRect, SessionLauncher};
use chartshot_descriptor::{ChartDescriptor, ChartEndpoint, Fingerprint};
use std::sync::Arc;

const READY_STATE_COMPLETE: &str = "complete";

/// Drives browser sessions to produce cropped chart images
#[derive(Clone)]
pub struct CaptureEngine {
    launcher: Arc<dyn SessionLauncher>,
    cache: CaptureCache,
    config: CaptureConfig,
    endpoint: ChartEndpoint,
}

impl std::fmt::Debug for CaptureEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CaptureEngine")
            .field("cache", &self.cache)
            .field("config", &self.config)
            .field("endpoint", &self.endpoint)
            .finish_non_exhaustive()
    }
}

impl CaptureEngine {
    /// Create engine with the default chart endpoint
    #[must_use]
    pub fn new(launcher: Arc<dyn SessionLauncher>, cache: CaptureCache, config: CaptureConfig) -> Self {
        Self {
            launcher,
            cache,
            config,
            endpoint: ChartEndpoint::default(),
        }
    }

    /// Override the chart endpoint (builder style)
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: ChartEndpoint) -> Self {
        self.endpoint = endpoint;
        self
    }

    /// Cache shared by all captures of this engine
    #[inline]
    #[must_use]
    pub fn cache(&self) -> &CaptureCache {
        &self.cache
    }

    /// Configuration in use
    #[inline]
    #[must_use]
    pub fn config(&self) -> &CaptureConfig {
        &self.config
    }

    /// Endpoint used to encode descriptors
    #[inline]
    #[must_use]
    pub fn endpoint(&self) -> &ChartEndpoint {
        &self.endpoint
    }

    /// Capture the chart for a descriptor
    pub async fn capture(&self, descriptor: &ChartDescriptor) -> CaptureOutcome {
        match self.endpoint.locate(descriptor) {
            Ok((url, fingerprint)) => self.capture_url(&url, fingerprint).await,
            Err(err) => CaptureFailure::render_failed(err.to_string()).into(),
        }
    }

    /// Capture an already-encoded chart URL
    pub async fn capture_url(&self, url: &str, fingerprint: Fingerprint) -> CaptureOutcome {
        if let Some(image) = self.cache.get(&fingerprint).await {
            tracing::debug!(fingerprint = %fingerprint.short(), "capture cache hit");
            return CaptureOutcome::Success { image };
        }

        let deadline = self.config.capture_timeout;
        let render = async {
            tokio::time::timeout(deadline, self.render(url))
                .await
                .unwrap_or_else(|_| {
                    Err(CaptureFailure::render_failed(format!(
                        "capture exceeded {}ms",
                        deadline.as_millis()
                    )))
                })
        };

        match self.cache.get_or_capture(fingerprint, render).await {
            Ok(image) => {
                tracing::debug!(fingerprint = %fingerprint.short(), bytes = image.len(), "chart captured");
                CaptureOutcome::Success { image }
            }
            Err(failure) => {
                let failure = CaptureFailure::clone(&failure);
                if failure.kind == FailureKind::RenderFailed {
                    tracing::error!(fingerprint = %fingerprint.short(), detail = %failure.detail, "chart capture failed");
                } else {
                    tracing::info!(fingerprint = %fingerprint.short(), kind = %failure.kind, detail = %failure.detail, "chart capture classified");
                }
                failure.into()
            }
        }
    }

    async fn render(&self, url: &str) -> Result<ImageBytes, CaptureFailure> {
        let session = self
            .launcher
            .launch(&self.config.session)
            .await
            .map_err(|err| classify_driver_error("launch", &err))?;
        let session = SessionGuard::new(session);

        let result = self.drive(&*session, url).await;
        session.release().await;
        result
    }

    async fn drive(&self, session: &dyn BrowserSession, url: &str) -> Result<ImageBytes, CaptureFailure> {
        let config = &self.config;

        if let Some(cookie) = &config.auth {
            session
                .install_cookie(cookie)
                .await
                .map_err(|err| classify_driver_error("auth cookie", &err))?;
        }
        session
            .navigate(url)
            .await
            .map_err(|err| classify_driver_error("navigate", &err))?;

        self.wait_ready(session).await?;
        tokio::time::sleep(config.settle_delay).await;

        detect_no_data(session).await?;

        let containers = config
            .retry
            .run(|attempt| self.wait_for_containers(session, attempt))
            .await
            .map_err(|failure| CaptureFailure::render_failed(failure.detail))?;
        tokio::time::sleep(config.stabilize_delay).await;

        let Some((index, rect)) = select_largest(&containers) else {
            return Err(CaptureFailure::render_failed("no chart container found"));
        };
        let rect = match session.focus_container(index).await {
            Ok(focused) if focused.area() > 0.0 => focused,
            Ok(_) => rect,
            Err(err) => {
                tracing::debug!(error = %err, "container re-read failed, using earlier rect");
                rect
            }
        };

        let png = session
            .screenshot_png()
            .await
            .map_err(|err| classify_driver_error("screenshot", &err))?;
        let cropped = crop_png(&png, rect, config.crop_padding)
            .map_err(|err| CaptureFailure::render_failed(err.to_string()))?;
        Ok(Arc::from(cropped))
    }

    async fn wait_ready(&self, session: &dyn BrowserSession) -> Result<(), CaptureFailure> {
        let poll = self.config.poll_interval;
        let budget = self.config.page_load_timeout;
        let waited = tokio::time::timeout(budget, async {
            loop {
                match session.ready_state().await {
                    Ok(state) if state == READY_STATE_COMPLETE => return Ok(()),
                    Ok(_) => {}
                    Err(err) => return Err(classify_driver_error("ready state", &err)),
                }
                tokio::time::sleep(poll).await;
            }
        })
        .await;

        waited.unwrap_or_else(|_| {
            Err(CaptureFailure::render_failed(format!(
                "page not ready within {}ms",
                budget.as_millis()
            )))
        })
    }

    async fn wait_for_containers(
        &self,
        session: &dyn BrowserSession,
        attempt: u32,
    ) -> Result<Vec<ElementRect>, CaptureFailure> {
        let poll = self.config.poll_interval;
        let budget = self.config.element_timeout;
        let waited = tokio::time::timeout(budget, async {
            loop {
                match session.chart_containers().await {
                    Ok(rects) if !rects.is_empty() => return rects,
                    Ok(_) => {}
                    Err(err) => tracing::debug!(attempt, error = %err, "container probe failed"),
                }
                tokio::time::sleep(poll).await;
            }
        })
        .await;

        waited.map_err(|_| {
            CaptureFailure::render_failed(format!(
                "no chart container within {}ms (attempt {attempt})",
                budget.as_millis()
            ))
        })
    }
}

/// Short-circuit explicit and implicit empty states
///
/// Probe errors are not evidence of missing data and are ignored, except for
/// the final series check where an unanswerable probe counts as no series.
async fn detect_no_data(session: &dyn BrowserSession) -> Result<(), CaptureFailure> {
    match session.no_data_marker_visible().await {
        Ok(true) => return Err(CaptureFailure::no_data("no-data marker visible")),
        Ok(false) => {}
        Err(err) => tracing::debug!(error = %err, "no-data marker probe failed"),
    }

    match session.chart_series_empty().await {
        Ok(Some(true)) => return Err(CaptureFailure::no_data("chart series are empty")),
        Ok(_) => {}
        Err(err) => tracing::debug!(error = %err, "series probe failed"),
    }

    match session.visible_series_count().await {
        Ok(0) => Err(CaptureFailure::no_data("no visible chart series")),
        Ok(_) => Ok(()),
        Err(err) => Err(CaptureFailure::no_data(format!("series count unavailable: {err}"))),
    }
}

/// Largest container by area; ties go to the first in document order
#[must_use]
pub fn select_largest(rects: &[ElementRect]) -> Option<(usize, ElementRect)> {
    rects
        .iter()
        .copied()
        .enumerate()
        .fold(None, |best: Option<(usize, ElementRect)>, (index, rect)| match best {
            Some((_, current)) if rect.area() <= current.area() => best,
            _ => Some((index, rect)),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn largest_wins() {
        let rects = [
            ElementRect::new(0.0, 0.0, 100.0, 100.0),
            ElementRect::new(0.0, 200.0, 800.0, 400.0),
            ElementRect::new(0.0, 700.0, 300.0, 300.0),
        ];
        assert_eq!(select_largest(&rects).map(|(i, _)| i), Some(1));
    }

    #[test]
    fn ties_keep_first() {
        let rects = [
            ElementRect::new(0.0, 0.0, 200.0, 100.0),
            ElementRect::new(0.0, 200.0, 100.0, 200.0),
        ];
        assert_eq!(select_largest(&rects).map(|(i, _)| i), Some(0));
    }

    #[test]
    fn empty_list_has_no_selection() {
        assert!(select_largest(&[]).is_none());
    }
}
