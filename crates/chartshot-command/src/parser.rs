//! Free-text command parser
//!
//! Grammar: `[prefix] <metric> [vs <metric>] <asset> <time_period> <granularity> [%]`
//!
//! Tokens are split on commas, then on whitespace, and lower-cased before any
//! comparison. The metric chain is consumed first; metric validation runs only
//! after the chain is complete so a typo in either metric reports the same way.

use crate::error::{ParseError, ParseErrorKind};
use crate::request::{ChartRequest, MAX_METRICS};
use crate::vocab::{Granularity, Metric, TimePeriod};
use chartshot_asset::AssetRegistry;
use std::sync::Arc;

/// Default group-chat command prefix
pub const DEFAULT_GROUP_PREFIX: &str = "=art";

/// Minimum tokens: metric, asset, period, granularity
const MIN_TOKENS: usize = 4;

const CHAIN_SEPARATOR: &str = "vs";
const PERCENT_FLAG: &str = "%";

/// Parser bound to an asset registry
#[derive(Debug, Clone)]
pub struct CommandParser {
    registry: Arc<AssetRegistry>,
    group_prefix: String,
}

impl CommandParser {
    /// Create parser with the default group prefix
    #[must_use]
    pub fn new(registry: Arc<AssetRegistry>) -> Self {
        Self {
            registry,
            group_prefix: DEFAULT_GROUP_PREFIX.to_string(),
        }
    }

    /// Override the group prefix (builder style)
    #[must_use]
    pub fn with_group_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.group_prefix = prefix.into();
        self
    }

    /// Group prefix in use
    #[inline]
    #[must_use]
    pub fn group_prefix(&self) -> &str {
        &self.group_prefix
    }

    /// Registry used for asset resolution
    #[inline]
    #[must_use]
    pub fn registry(&self) -> &Arc<AssetRegistry> {
        &self.registry
    }

    /// Usage hint, prefixed only in group context
    #[must_use]
    pub fn usage(&self, is_group: bool) -> String {
        Self::usage_for(&self.group_prefix, is_group)
    }

    /// Usage hint for `group_prefix` without a registry
    #[must_use]
    pub fn usage_for(group_prefix: &str, is_group: bool) -> String {
        let prefix = if is_group {
            format!("{group_prefix} ")
        } else {
            String::new()
        };
        format!(
            "Format: {prefix}<metric> [vs <metric>] <asset> <time_period> <granularity> [%]\n\
             Example: {prefix}price vs tvl solana 1w 1d"
        )
    }

    /// Parse a command into a validated request
    ///
    /// # Errors
    /// Returns [`ParseError`] with the reason and a usage hint
    pub fn parse(&self, text: &str, is_group: bool) -> Result<ChartRequest, ParseError> {
        let result = self.parse_tokens(&self.tokenize(text));
        if let Err(kind) = &result {
            tracing::debug!(command = %text, reason = %kind, "command rejected");
        }
        result.map_err(|kind| ParseError::new(kind, self.usage(is_group)))
    }

    /// Cheap gate deciding whether a message is meant for the parser at all
    ///
    /// Group messages must carry the prefix. Every command must open with a
    /// known metric; direct messages must also have enough tokens.
    #[must_use]
    pub fn is_chart_command(&self, text: &str, is_group: bool) -> bool {
        let trimmed = text.trim();
        if is_group && !trimmed.starts_with(self.group_prefix.as_str()) {
            return false;
        }

        let tokens = self.tokenize(trimmed);
        let opens_with_metric = tokens.first().is_some_and(|t| Metric::lookup(t).is_some());
        if is_group {
            opens_with_metric
        } else {
            opens_with_metric && tokens.len() >= MIN_TOKENS
        }
    }

    /// Command reference for help replies
    #[must_use]
    pub fn help_text(&self) -> String {
        Self::help_text_for(&self.group_prefix)
    }

    /// Command reference for `group_prefix` without a registry
    #[must_use]
    pub fn help_text_for(group_prefix: &str) -> String {
        format!(
            "Chart commands\n\n\
             Format: <metric> [vs <metric>] <asset> <time_period> <granularity> [%]\n\n\
             Examples:\n\
             - price solana 1w 1d\n\
             - fees ethereum 3m 1d\n\
             - price vs tvl solana 1y 1d\n\
             - fees vs revenue ethereum 6m 1w %\n\n\
             Metrics: {}\n\
             Time periods: {}\n\
             Granularity: {}\n\n\
             In group chats, start with '{} '",
            Metric::allowed(),
            TimePeriod::allowed(),
            Granularity::allowed(),
            group_prefix,
        )
    }

    fn tokenize(&self, text: &str) -> Vec<String> {
        let trimmed = text.trim();
        let body = trimmed
            .strip_prefix(self.group_prefix.as_str())
            .unwrap_or(trimmed);

        body.split(',')
            .flat_map(str::split_whitespace)
            .map(str::to_lowercase)
            .collect()
    }

    fn parse_tokens(&self, tokens: &[String]) -> Result<ChartRequest, ParseErrorKind> {
        if tokens.len() < MIN_TOKENS {
            return Err(ParseErrorKind::TooFewParts);
        }

        let (metric_tokens, rest) = split_metric_chain(tokens)?;
        if metric_tokens.len() > MAX_METRICS {
            return Err(ParseErrorKind::TooManyMetrics(metric_tokens.len()));
        }

        let (asset, period, granularity, as_percentage) = match rest {
            [asset, period, granularity] => (asset, period, granularity, false),
            [asset, period, granularity, flag] if flag == PERCENT_FLAG => {
                (asset, period, granularity, true)
            }
            [_, _, _, extra, ..] if extra != PERCENT_FLAG => {
                return Err(ParseErrorKind::UnexpectedToken(extra.clone()))
            }
            [_, _, _, _, extra, ..] => {
                return Err(ParseErrorKind::UnexpectedToken(extra.clone()))
            }
            _ => return Err(ParseErrorKind::TooFewParts),
        };

        let metrics = metric_tokens
            .iter()
            .map(|token| {
                Metric::lookup(token).ok_or_else(|| ParseErrorKind::InvalidMetric {
                    token: (*token).clone(),
                    allowed: Metric::allowed(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let time_period =
            TimePeriod::from_token(period).ok_or_else(|| ParseErrorKind::InvalidTimePeriod {
                token: period.clone(),
                allowed: TimePeriod::allowed(),
            })?;

        let granularity =
            Granularity::from_token(granularity).ok_or_else(|| {
                ParseErrorKind::InvalidGranularity {
                    token: granularity.clone(),
                    allowed: Granularity::allowed(),
                }
            })?;

        let record = self
            .registry
            .resolve(asset)
            .ok_or_else(|| ParseErrorKind::UnknownAsset(asset.clone()))?;

        let request = ChartRequest::new(
            &self.registry,
            metrics,
            vec![record.id().to_string()],
            time_period,
            granularity,
            as_percentage,
        )?;
        Ok(request)
    }
}

/// Consume `metric [vs metric]...` from the front of the token list
///
/// Runs of `vs` collapse and a leading `vs` is skipped. The chain ends at the
/// first metric not followed by `vs`.
fn split_metric_chain(tokens: &[String]) -> Result<(Vec<&String>, &[String]), ParseErrorKind> {
    let mut metrics = Vec::new();
    let mut pos = 0;

    loop {
        while tokens.get(pos).is_some_and(|t| t == CHAIN_SEPARATOR) {
            pos += 1;
        }
        let Some(token) = tokens.get(pos) else {
            return Err(ParseErrorKind::DanglingVs);
        };
        metrics.push(token);
        pos += 1;

        if tokens.get(pos).map_or(true, |t| t != CHAIN_SEPARATOR) {
            break;
        }
    }

    Ok((metrics, &tokens[pos..]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chartshot_asset::MappingDocument;
    use pretty_assertions::assert_eq;

    fn parser() -> CommandParser {
        let registry = AssetRegistry::from_document(
            MappingDocument::new()
                .with_asset("solana", ["sol", "solana"], "chain")
                .with_asset("ethereum", ["eth", "ethereum"], "chain"),
        )
        .unwrap();
        CommandParser::new(Arc::new(registry))
    }

    fn tokens(text: &str) -> Vec<String> {
        text.split_whitespace().map(str::to_string).collect()
    }

    #[test]
    fn chain_collapses_repeated_vs() {
        let toks = tokens("vs price vs vs tvl sol 1w 1d");
        let (metrics, rest) = split_metric_chain(&toks).unwrap();
        assert_eq!(metrics, vec!["price", "tvl"]);
        assert_eq!(rest, &toks[5..]);
    }

    #[test]
    fn chain_rejects_trailing_vs() {
        let toks = tokens("price vs vs");
        assert_eq!(
            split_metric_chain(&toks).unwrap_err(),
            ParseErrorKind::DanglingVs
        );
    }

    #[test]
    fn commas_split_tokens() {
        let request = parser().parse("price,vs,tvl, SOL,1w , 1d", false).unwrap();
        assert_eq!(request.metrics(), &[Metric::Price, Metric::Tvl]);
        assert_eq!(request.asset_ids(), &["solana".to_string()]);
    }

    #[test]
    fn group_prefix_is_stripped() {
        let request = parser().parse("=art fees eth 3m 1w", true).unwrap();
        assert_eq!(request.metrics(), &[Metric::Fees]);
        assert_eq!(request.time_period(), TimePeriod::ThreeMonths);
        assert_eq!(request.granularity(), Granularity::Weekly);
    }

    #[test]
    fn usage_hint_depends_on_context() {
        let parser = parser();
        assert!(parser.usage(false).starts_with("Format: <metric>"));
        assert!(parser.usage(true).starts_with("Format: =art <metric>"));
        assert!(parser.usage(true).ends_with("Example: =art price vs tvl solana 1w 1d"));

        let custom = parser.with_group_prefix("!chart");
        assert!(custom.usage(true).contains("Example: !chart price"));
    }

    #[test]
    fn trailing_tokens_are_rejected() {
        let parser = parser();
        let err = parser.parse("price sol 1w 1d extra", false).unwrap_err();
        assert_eq!(
            err.kind(),
            &ParseErrorKind::UnexpectedToken("extra".to_string())
        );

        let err = parser.parse("price sol 1w 1d % more", false).unwrap_err();
        assert_eq!(
            err.kind(),
            &ParseErrorKind::UnexpectedToken("more".to_string())
        );
    }

    #[test]
    fn too_few_after_chain() {
        let err = parser().parse("price vs tvl sol 1w", false).unwrap_err();
        assert_eq!(err.kind(), &ParseErrorKind::TooFewParts);
    }

    #[test]
    fn aliases_are_accepted() {
        let request = parser().parse("mcap vs vol eth all 1m", false).unwrap();
        assert_eq!(request.metrics(), &[Metric::MarketCap, Metric::Volume]);
        assert_eq!(request.time_period(), TimePeriod::All);
    }

    #[test]
    fn gate_filters_messages() {
        let parser = parser();
        assert!(parser.is_chart_command("price sol 1w 1d", false));
        assert!(parser.is_chart_command("Fee eth 1m 1d", false));
        assert!(!parser.is_chart_command("hello there friend again", false));
        assert!(!parser.is_chart_command("price sol", false));
        assert!(!parser.is_chart_command("price sol 1w 1d", true));
        assert!(parser.is_chart_command("=art price sol 1w 1d", true));
        assert!(!parser.is_chart_command("=art news", true));
    }

    #[test]
    fn help_lists_vocabularies() {
        let help = parser().help_text();
        assert!(help.contains("Metrics: price, volume, tvl"));
        assert!(help.contains("Time periods: 1w, mtd"));
        assert!(help.contains("start with '=art '"));
    }

    #[test]
    fn help_and_usage_need_only_the_prefix() {
        let parser = parser().with_group_prefix("!chart");
        assert_eq!(CommandParser::help_text_for("!chart"), parser.help_text());
        assert_eq!(CommandParser::usage_for("!chart", true), parser.usage(true));
        assert!(CommandParser::usage_for("!chart", false).starts_with("Format: <metric>"));
    }
}
