//! Configuration for a document-analysis batch.
//!
//! Every knob lives in [`AnalysisConfig`], built via
//! [`AnalysisConfigBuilder`]. The config is cheap to clone, so each
//! concurrent document task carries its own copy.

use crate::error::ReportError;
use crate::pipeline::analyzer::DocumentAnalyzer;
use crate::progress::ProgressCallback;
use crate::report::{ExtractionType, ReportFormat};
use std::fmt;
use std::sync::Arc;

/// Configuration for analysing a batch of documents.
///
/// Built via [`AnalysisConfig::builder()`] or using
/// [`AnalysisConfig::default()`].
///
/// # Example
/// ```rust
/// use scan2report::{AnalysisConfig, ExtractionType, ReportFormat};
///
/// let config = AnalysisConfig::builder()
///     .format(ReportFormat::Delimited)
///     .extraction(ExtractionType::Table)
///     .concurrency(5)
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct AnalysisConfig {
    /// Longest allowed image edge before submission. Default: `Some(1500)`.
    ///
    /// Larger images are scaled down to fit inside a square of this size,
    /// keeping their aspect ratio. `None` submits images untouched.
    pub max_dimension: Option<u32>,

    /// Documents analysed at the same time. Default: 20.
    pub concurrency: usize,

    /// Largest accepted batch. Default: 20.
    pub max_documents: usize,

    /// Per-document analysis timeout in seconds. Default: 60.
    pub api_timeout_secs: u64,

    /// Download timeout for URL inputs in seconds. Default: 120.
    pub download_timeout_secs: u64,

    /// Output file format. Default: [`ReportFormat::Plain`].
    pub format: ReportFormat,

    /// Facet rendered for each document. Default: [`ExtractionType::Text`].
    pub extraction: ExtractionType,

    /// Textract-compatible endpoint for the HTTP analyzer.
    /// If None along with `analyzer`, falls back to the environment.
    pub endpoint: Option<String>,

    /// Bearer token sent to `endpoint`.
    pub api_key: Option<String>,

    /// Pre-constructed analyzer. Takes precedence over `endpoint`.
    pub analyzer: Option<Arc<dyn DocumentAnalyzer>>,

    /// Receives per-document progress events.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            max_dimension: Some(1500),
            concurrency: 20,
            max_documents: 20,
            api_timeout_secs: 60,
            download_timeout_secs: 120,
            format: ReportFormat::default(),
            extraction: ExtractionType::default(),
            endpoint: None,
            api_key: None,
            analyzer: None,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for AnalysisConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnalysisConfig")
            .field("max_dimension", &self.max_dimension)
            .field("concurrency", &self.concurrency)
            .field("max_documents", &self.max_documents)
            .field("api_timeout_secs", &self.api_timeout_secs)
            .field("download_timeout_secs", &self.download_timeout_secs)
            .field("format", &self.format)
            .field("extraction", &self.extraction)
            .field("endpoint", &self.endpoint)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("analyzer", &self.analyzer.as_ref().map(|a| a.name().to_string()))
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<dyn AnalysisProgressCallback>"),
            )
            .finish()
    }
}

impl AnalysisConfig {
    /// Create a new builder for `AnalysisConfig`.
    pub fn builder() -> AnalysisConfigBuilder {
        AnalysisConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`AnalysisConfig`].
#[derive(Debug)]
pub struct AnalysisConfigBuilder {
    config: AnalysisConfig,
}

impl AnalysisConfigBuilder {
    pub fn max_dimension(mut self, px: Option<u32>) -> Self {
        self.config.max_dimension = px.map(|p| p.max(100));
        self
    }

    pub fn concurrency(mut self, n: usize) -> Self {
        self.config.concurrency = n.max(1);
        self
    }

    pub fn max_documents(mut self, n: usize) -> Self {
        self.config.max_documents = n;
        self
    }

    pub fn api_timeout_secs(mut self, secs: u64) -> Self {
        self.config.api_timeout_secs = secs;
        self
    }

    pub fn download_timeout_secs(mut self, secs: u64) -> Self {
        self.config.download_timeout_secs = secs;
        self
    }

    pub fn format(mut self, format: ReportFormat) -> Self {
        self.config.format = format;
        self
    }

    pub fn extraction(mut self, extraction: ExtractionType) -> Self {
        self.config.extraction = extraction;
        self
    }

    pub fn endpoint(mut self, url: impl Into<String>) -> Self {
        self.config.endpoint = Some(url.into());
        self
    }

    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.config.api_key = Some(key.into());
        self
    }

    pub fn analyzer(mut self, analyzer: Arc<dyn DocumentAnalyzer>) -> Self {
        self.config.analyzer = Some(analyzer);
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<AnalysisConfig, ReportError> {
        let c = &self.config;
        if c.max_documents == 0 {
            return Err(ReportError::InvalidConfig(
                "max_documents must be ≥ 1".into(),
            ));
        }
        if c.api_timeout_secs == 0 {
            return Err(ReportError::InvalidConfig(
                "api_timeout_secs must be ≥ 1".into(),
            ));
        }
        if let Some(ref url) = c.endpoint {
            if !crate::pipeline::input::is_url(url) {
                return Err(ReportError::InvalidConfig(format!(
                    "endpoint must be an HTTP/HTTPS URL, got '{url}'"
                )));
            }
        }
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let c = AnalysisConfig::default();
        assert_eq!(c.max_dimension, Some(1500));
        assert_eq!(c.concurrency, 20);
        assert_eq!(c.max_documents, 20);
        assert_eq!(c.format, ReportFormat::Plain);
        assert_eq!(c.extraction, ExtractionType::Text);
    }

    #[test]
    fn builder_clamps() {
        let c = AnalysisConfig::builder()
            .concurrency(0)
            .max_dimension(Some(10))
            .build()
            .unwrap();
        assert_eq!(c.concurrency, 1);
        assert_eq!(c.max_dimension, Some(100));
    }

    #[test]
    fn builder_rejects_bad_endpoint() {
        let err = AnalysisConfig::builder()
            .endpoint("ftp://nope")
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("ftp://nope"));
    }

    #[test]
    fn builder_rejects_zero_limits() {
        assert!(AnalysisConfig::builder().max_documents(0).build().is_err());
        assert!(AnalysisConfig::builder().api_timeout_secs(0).build().is_err());
    }

    #[test]
    fn debug_redacts_api_key() {
        let c = AnalysisConfig::builder().api_key("secret-token").build().unwrap();
        let shown = format!("{c:?}");
        assert!(!shown.contains("secret-token"));
        assert!(shown.contains("<redacted>"));
    }
}
