//! Backend URL encoding

use crate::descriptor::ChartDescriptor;
use crate::error::DescriptorError;
use crate::fingerprint::Fingerprint;

/// Default chart-builder base path
pub const DEFAULT_BASE_URL: &str = "https://app.artemisanalytics.com/chart-builder/";

/// Chart-builder base path that descriptors are appended to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartEndpoint {
    base: String,
}

impl Default for ChartEndpoint {
    fn default() -> Self {
        Self {
            base: DEFAULT_BASE_URL.to_string(),
        }
    }
}

impl ChartEndpoint {
    /// Create endpoint for `base`, adding a trailing slash if missing
    ///
    /// # Errors
    /// Returns [`DescriptorError::InvalidBase`] unless `base` is an http(s) URL
    pub fn new(base: impl Into<String>) -> Result<Self, DescriptorError> {
        let mut base = base.into().trim().to_string();
        let has_host = ["https://", "http://"]
            .iter()
            .find_map(|scheme| base.strip_prefix(scheme))
            .is_some_and(|rest| !rest.is_empty() && !rest.starts_with('/'));
        if !has_host {
            return Err(DescriptorError::InvalidBase(base));
        }
        if !base.ends_with('/') {
            base.push('/');
        }
        Ok(Self { base })
    }

    /// Base path, always ending in `/`
    #[inline]
    #[must_use]
    pub fn base(&self) -> &str {
        &self.base
    }

    /// Canonical URL: base path plus the percent-encoded compact JSON
    ///
    /// # Errors
    /// Returns error if the descriptor cannot be serialized
    pub fn url_for(&self, descriptor: &ChartDescriptor) -> Result<String, DescriptorError> {
        let json = descriptor.to_json()?;
        Ok(format!("{}{}", self.base, urlencoding::encode(&json)))
    }

    /// URL and its fingerprint in one step
    ///
    /// # Errors
    /// Returns error if the descriptor cannot be serialized
    pub fn locate(&self, descriptor: &ChartDescriptor) -> Result<(String, Fingerprint), DescriptorError> {
        let url = self.url_for(descriptor)?;
        let fingerprint = Fingerprint::of_url(&url);
        Ok((url, fingerprint))
    }
}
