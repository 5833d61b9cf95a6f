//! Pipeline orchestrator
//!
//! `run` sequences parser, descriptor builder and capture engine, then asks
//! the summarizer for a caption. Every exit is a [`ChartReply`] or a
//! [`PipelineFailure`]; nothing escapes as a panic or an untyped error.

use crate::config::ChartshotConfig;
use crate::error::SetupError;
use crate::message::PipelineFailure;
use crate::summarize::{NoSummarizer, Summarizer};
use chartshot_asset::{AssetRegistry, JsonFileSource, LoadError, MappingSource};
use chartshot_capture::{
    CaptureCache, CaptureEngine, CaptureOutcome, ImageBytes, SessionLauncher, WebDriverLauncher,
};
use chartshot_command::{ChartRequest, CommandParser};
use chartshot_descriptor::{ChartDescriptor, ChartEndpoint, DescriptorBuilder, Fingerprint};
use std::sync::Arc;
use std::time::Duration;
use tracing::Instrument;
use ulid::Ulid;

/// Successful run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartReply {
    /// Cropped chart PNG
    pub image: ImageBytes,
    /// Chart URL that was rendered
    pub url: String,
    /// Chart title
    pub title: String,
    /// Optional caption
    pub summary: Option<String>,
}

/// Everything known about a command before the browser is involved
#[derive(Debug, Clone, PartialEq)]
pub struct ChartPlan {
    /// Validated request
    pub request: ChartRequest,
    /// Backend descriptor
    pub descriptor: ChartDescriptor,
    /// Canonical chart URL
    pub url: String,
    /// Cache key
    pub fingerprint: Fingerprint,
}

/// Parse, describe, capture, summarize
pub struct ChartPipeline {
    registry: Arc<AssetRegistry>,
    parser: CommandParser,
    builder: DescriptorBuilder,
    engine: CaptureEngine,
    summarizer: Arc<dyn Summarizer>,
    summary_timeout: Duration,
}

impl std::fmt::Debug for ChartPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChartPipeline")
            .field("assets", &self.registry.len())
            .field("group_prefix", &self.parser.group_prefix())
            .field("engine", &self.engine)
            .field("summary_timeout", &self.summary_timeout)
            .finish_non_exhaustive()
    }
}

impl ChartPipeline {
    /// Create pipeline without a summarizer
    #[must_use]
    pub fn new(registry: Arc<AssetRegistry>, engine: CaptureEngine) -> Self {
        Self {
            parser: CommandParser::new(Arc::clone(&registry)),
            builder: DescriptorBuilder::new(Arc::clone(&registry)),
            registry,
            engine,
            summarizer: Arc::new(NoSummarizer),
            summary_timeout: Duration::from_secs(crate::config::DEFAULT_SUMMARY_TIMEOUT_SECS),
        }
    }

    /// Build a pipeline backed by the configured WebDriver endpoint
    ///
    /// # Errors
    /// Returns [`SetupError`] if the config, mapping file or endpoint is invalid
    pub fn from_config(config: &ChartshotConfig) -> Result<Self, SetupError> {
        let launcher = WebDriverLauncher::new(config.webdriver_url.clone())?;
        Self::with_launcher(config, Arc::new(launcher))
    }

    /// Build a pipeline from config with an explicit session launcher
    ///
    /// # Errors
    /// Returns [`SetupError`] if the config, mapping file or endpoint is invalid
    pub fn with_launcher(
        config: &ChartshotConfig,
        launcher: Arc<dyn SessionLauncher>,
    ) -> Result<Self, SetupError> {
        let registry = Arc::new(AssetRegistry::load(&JsonFileSource::new(&config.mappings_path))?);
        let endpoint = ChartEndpoint::new(config.chart_base_url.clone())?;
        let engine = CaptureEngine::new(
            launcher,
            CaptureCache::new(config.cache_settings()),
            config.capture_config()?,
        )
        .with_endpoint(endpoint);

        Ok(Self::new(registry, engine)
            .with_group_prefix(config.group_prefix.clone())
            .with_summary_timeout(config.summary_timeout()))
    }

    /// Set summarizer (builder style)
    #[must_use]
    pub fn with_summarizer(mut self, summarizer: Arc<dyn Summarizer>) -> Self {
        self.summarizer = summarizer;
        self
    }

    /// Set summarizer budget (builder style)
    #[must_use]
    pub fn with_summary_timeout(mut self, timeout: Duration) -> Self {
        self.summary_timeout = timeout;
        self
    }

    /// Set group-chat prefix (builder style)
    #[must_use]
    pub fn with_group_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.parser = self.parser.with_group_prefix(prefix);
        self
    }

    /// Command parser
    #[inline]
    #[must_use]
    pub fn parser(&self) -> &CommandParser {
        &self.parser
    }

    /// Asset registry
    #[inline]
    #[must_use]
    pub fn registry(&self) -> &Arc<AssetRegistry> {
        &self.registry
    }

    /// Capture engine
    #[inline]
    #[must_use]
    pub fn engine(&self) -> &CaptureEngine {
        &self.engine
    }

    /// Re-read asset mappings; the old index stays on failure
    ///
    /// # Errors
    /// Returns the [`LoadError`] of the rejected mappings
    pub fn reload_assets(&self, source: &dyn MappingSource) -> Result<(), LoadError> {
        self.registry.reload(source)
    }

    /// Parse and describe a command without capturing it
    ///
    /// # Errors
    /// Returns [`PipelineFailure`] for unparseable commands, or a render
    /// failure if the descriptor cannot be encoded
    pub fn plan(&self, raw: &str, is_group: bool) -> Result<ChartPlan, PipelineFailure> {
        let request = self.parser.parse(raw, is_group)?;
        let descriptor = self.builder.build(&request);
        let (url, fingerprint) = self.engine.endpoint().locate(&descriptor).map_err(|err| {
            tracing::error!(error = %err, "descriptor could not be encoded");
            PipelineFailure::render_failed()
        })?;
        Ok(ChartPlan {
            request,
            descriptor,
            url,
            fingerprint,
        })
    }

    /// Run one chart command
    ///
    /// # Errors
    /// Returns [`PipelineFailure`] with user-facing text when no chart is produced
    pub async fn run(&self, raw: &str, is_group: bool) -> Result<ChartReply, PipelineFailure> {
        let run_id = Ulid::new();
        let span = tracing::info_span!("chart_run", %run_id, group = is_group);
        self.run_inner(raw, is_group).instrument(span).await
    }

    async fn run_inner(&self, raw: &str, is_group: bool) -> Result<ChartReply, PipelineFailure> {
        tracing::info!(command = raw.trim(), "chart run started");

        let plan = self.plan(raw, is_group).inspect_err(|failure| {
            tracing::info!(kind = %failure.kind, "chart command rejected");
        })?;

        let image = match self.engine.capture_url(&plan.url, plan.fingerprint).await {
            CaptureOutcome::Success { image } => image,
            CaptureOutcome::Failure { kind, detail } => {
                let failure = PipelineFailure::from_capture(kind, &self.builder.asset_names(&plan.request));
                tracing::info!(kind = %failure.kind, %detail, "chart run failed");
                return Err(failure);
            }
        };

        let summary = self.summarize(&image).await;
        tracing::info!(
            fingerprint = %plan.fingerprint.short(),
            bytes = image.len(),
            summarized = summary.is_some(),
            "chart run finished"
        );
        Ok(ChartReply {
            image,
            url: plan.url,
            title: plan.descriptor.title,
            summary,
        })
    }

    async fn summarize(&self, image: &ImageBytes) -> Option<String> {
        match tokio::time::timeout(self.summary_timeout, self.summarizer.summarize(image)).await {
            Ok(Ok(summary)) => summary.filter(|text| !text.trim().is_empty()),
            Ok(Err(err)) => {
                tracing::warn!(error = %err, "summary unavailable");
                None
            }
            Err(_) => {
                tracing::warn!(
                    timeout_secs = self.summary_timeout.as_secs(),
                    "summary timed out"
                );
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SummaryError;
    use crate::message::RunFailureKind;
    use crate::summarize::MockSummarizer;
    use async_trait::async_trait;
    use chartshot_asset::MappingDocument;
    use chartshot_capture::{BrowserSession, CaptureConfig, DriverError, SessionOptions};
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct RefusingLauncher {
        launches: AtomicUsize,
    }

    #[async_trait]
    impl SessionLauncher for RefusingLauncher {
        async fn launch(&self, _options: &SessionOptions) -> Result<Box<dyn BrowserSession>, DriverError> {
            self.launches.fetch_add(1, Ordering::SeqCst);
            Err(DriverError::Command {
                error: "unknown error".to_string(),
                message: "net::ERR_CONNECTION_REFUSED".to_string(),
            })
        }
    }

    fn pipeline(launcher: Arc<RefusingLauncher>) -> ChartPipeline {
        let doc = MappingDocument::new()
            .with_asset("solana", ["sol", "solana"], "chain")
            .with_asset("ethereum", ["eth"], "chain");
        let registry = Arc::new(AssetRegistry::from_document(doc).unwrap());
        let engine = CaptureEngine::new(launcher, CaptureCache::default(), CaptureConfig::immediate());
        ChartPipeline::new(registry, engine)
    }

    #[tokio::test]
    async fn parse_failure_never_launches() {
        let launcher = Arc::new(RefusingLauncher::default());
        let mut summarizer = MockSummarizer::new();
        summarizer.expect_summarize().never();
        let pipeline = pipeline(Arc::clone(&launcher)).with_summarizer(Arc::new(summarizer));

        let failure = pipeline.run("price dogecoin_invalid 1w 1d", false).await.unwrap_err();

        assert_eq!(failure.kind, RunFailureKind::InvalidCommand);
        assert!(failure.message.contains("dogecoin_invalid"));
        assert!(failure.message.contains("Format:"));
        assert_eq!(launcher.launches.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn capture_failure_skips_summarizer() {
        let launcher = Arc::new(RefusingLauncher::default());
        let mut summarizer = MockSummarizer::new();
        summarizer.expect_summarize().never();
        let pipeline = pipeline(Arc::clone(&launcher)).with_summarizer(Arc::new(summarizer));

        let failure = pipeline.run("price sol 1w 1d", false).await.unwrap_err();

        assert_eq!(failure.kind, RunFailureKind::AuthRequired);
        assert_eq!(failure.message, crate::message::AUTH_REQUIRED_MESSAGE);
        assert_eq!(launcher.launches.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn summarizer_error_degrades_to_none() {
        let mut summarizer = MockSummarizer::new();
        summarizer
            .expect_summarize()
            .times(1)
            .returning(|_| Err(SummaryError::new("model offline")));
        let pipeline = pipeline(Arc::new(RefusingLauncher::default())).with_summarizer(Arc::new(summarizer));

        let image: ImageBytes = Arc::from(vec![1u8, 2, 3]);
        assert_eq!(pipeline.summarize(&image).await, None);
    }

    #[tokio::test]
    async fn blank_summary_is_dropped() {
        let mut summarizer = MockSummarizer::new();
        summarizer
            .expect_summarize()
            .returning(|_| Ok(Some("   ".to_string())));
        let pipeline = pipeline(Arc::new(RefusingLauncher::default())).with_summarizer(Arc::new(summarizer));

        let image: ImageBytes = Arc::from(vec![0u8]);
        assert_eq!(pipeline.summarize(&image).await, None);
    }

    #[test]
    fn plan_is_deterministic() {
        let pipeline = pipeline(Arc::new(RefusingLauncher::default()));
        let a = pipeline.plan("price vs tvl SOL 1m 1d", false).unwrap();
        let b = pipeline.plan("price, vs, tvl, solana, 1m, 1d", false).unwrap();
        assert_eq!(a.url, b.url);
        assert_eq!(a.fingerprint, b.fingerprint);
        assert_eq!(a.descriptor.title, "Price vs TVL - Solana (1 Month, Daily)");
    }

    #[test]
    fn reload_swaps_registry() {
        let pipeline = pipeline(Arc::new(RefusingLauncher::default()));
        assert!(pipeline.plan("price btc 1w 1d", false).is_err());

        let doc = MappingDocument::new().with_asset("bitcoin", ["btc"], "chain");
        pipeline.reload_assets(&doc).unwrap();

        assert!(pipeline.plan("price btc 1w 1d", false).is_ok());
        assert!(pipeline.plan("price sol 1w 1d", false).is_err());
    }
}
