//! Summarization collaborator seam

use crate::error::SummaryError;
use async_trait::async_trait;

/// Produces an optional caption for a captured chart
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Summarizer: Send + Sync {
    /// Summarize PNG bytes; `Ok(None)` when there is nothing to say
    async fn summarize(&self, image: &[u8]) -> Result<Option<String>, SummaryError>;
}

/// Summarizer that never produces a caption
#[derive(Debug, Clone, Copy, Default)]
pub struct NoSummarizer;

#[async_trait]
impl Summarizer for NoSummarizer {
    async fn summarize(&self, _image: &[u8]) -> Result<Option<String>, SummaryError> {
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn no_summarizer_is_silent() {
        assert_eq!(NoSummarizer.summarize(&[1, 2, 3]).await, Ok(None));
    }
}
