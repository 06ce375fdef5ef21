//! Eager (whole-batch) analysis entry points.
//!
//! These functions wait for every document to settle, then render the
//! report. Use [`crate::stream::analyze_stream`] instead to receive
//! per-document results as they complete.
//!
//! ## Isolation
//!
//! Each document runs in its own future and always resolves to a
//! [`DocumentResult`]: read failures, pre-processing failures, service
//! errors and timeouts are captured into that document's `error`. Nothing a
//! single document does can fail the batch. Results are put back in input
//! order by `index` before rendering, whatever order they completed in.

use crate::config::AnalysisConfig;
use crate::error::{DocumentError, ReportError};
use crate::graph::AnalysisResponse;
use crate::output::{AnalysisOutput, AnalysisStats, DocumentResult};
use crate::pipeline::analyzer::{DocumentAnalyzer, HttpAnalyzer};
use crate::pipeline::input::{DocumentInput, DocumentSource};
use crate::pipeline::{normalize, preprocess};
use crate::report::{render_report, ReportFormat};
use futures::stream::{self, StreamExt};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Environment variable naming a Textract-compatible endpoint.
pub const ENDPOINT_ENV: &str = "SCAN2REPORT_ENDPOINT";
/// Environment variable holding the endpoint's bearer token.
pub const API_KEY_ENV: &str = "SCAN2REPORT_API_KEY";

/// Analyse in-memory document buffers and render the report.
///
/// This is the primary entry point for the library.
///
/// # Returns
/// `Ok(AnalysisOutput)` whenever the batch itself was acceptable, even if
/// every document failed (check `output.stats.failed`).
///
/// # Errors
/// Returns `Err(ReportError)` only for batch-level problems:
/// - No documents, or more than `max_documents`
/// - No analyzer could be configured
/// - The report could not be encoded
pub async fn analyze_documents(
    inputs: Vec<DocumentInput>,
    config: &AnalysisConfig,
) -> Result<AnalysisOutput, ReportError> {
    run_batch(inputs.into_iter().map(DocumentSource::from).collect(), config).await
}

/// Analyse documents given as local paths or HTTP(S) URLs.
///
/// A path that cannot be read, or a URL that cannot be downloaded, becomes
/// that document's error rather than a batch failure.
pub async fn analyze_sources<S: AsRef<str>>(
    sources: &[S],
    config: &AnalysisConfig,
) -> Result<AnalysisOutput, ReportError> {
    let sources = sources
        .iter()
        .map(|s| DocumentSource::Location(s.as_ref().to_string()))
        .collect();
    run_batch(sources, config).await
}

/// Analyse paths/URLs and write the report to `output_path`.
///
/// When `output_path` is an existing directory, the report is written
/// inside it under the format's suggested file name. Uses atomic write
/// (temp file + rename) to prevent partial files.
pub async fn analyze_to_file<S: AsRef<str>>(
    sources: &[S],
    output_path: impl AsRef<Path>,
    config: &AnalysisConfig,
) -> Result<AnalysisStats, ReportError> {
    let output = analyze_sources(sources, config).await?;
    let path = report_path(output_path.as_ref(), config.format);
    write_report(&path, &output.report.body).await?;
    info!("Report written to {}", path.display());
    Ok(output.stats)
}

/// Synchronous wrapper around [`analyze_documents`].
///
/// Creates a temporary tokio runtime internally.
pub fn analyze_sync(
    inputs: Vec<DocumentInput>,
    config: &AnalysisConfig,
) -> Result<AnalysisOutput, ReportError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| ReportError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(analyze_documents(inputs, config))
}

/// Where a report for `format` lands when the user asked for `requested`.
pub fn report_path(requested: &Path, format: ReportFormat) -> PathBuf {
    if requested.is_dir() {
        requested.join(format.file_name())
    } else {
        requested.to_path_buf()
    }
}

// ── Internal helpers ─────────────────────────────────────────────────────

async fn run_batch(
    sources: Vec<DocumentSource>,
    config: &AnalysisConfig,
) -> Result<AnalysisOutput, ReportError> {
    let total_start = Instant::now();
    check_batch_size(sources.len(), config)?;
    let total = sources.len();
    info!("Starting analysis of {} documents", total);

    let analyzer = resolve_analyzer(config).await?;
    debug!("Using analyzer '{}'", analyzer.name());

    if let Some(ref cb) = config.progress_callback {
        cb.on_batch_start(total);
    }

    let analysis_start = Instant::now();
    let mut results: Vec<DocumentResult> = stream::iter(sources.into_iter().enumerate().map(
        |(i, source)| {
            let analyzer = Arc::clone(&analyzer);
            let cfg = config.clone();
            async move { process_document(&analyzer, i + 1, total, source, &cfg).await }
        },
    ))
    .buffer_unordered(config.concurrency)
    .collect()
    .await;
    let analysis_duration_ms = analysis_start.elapsed().as_millis() as u64;

    // Completion order is arbitrary; the report follows input order.
    results.sort_by_key(|r| r.index);

    let report = render_report(&results, config.format, config.extraction)?;

    let mut stats = AnalysisStats::from_results(&results);
    stats.analysis_duration_ms = analysis_duration_ms;
    stats.total_duration_ms = total_start.elapsed().as_millis() as u64;

    info!(
        "Analysis complete: {}/{} documents, {}ms total",
        stats.succeeded, stats.total_documents, stats.total_duration_ms
    );

    if let Some(ref cb) = config.progress_callback {
        cb.on_batch_complete(total, stats.succeeded);
    }

    Ok(AnalysisOutput {
        results,
        report,
        stats,
    })
}

pub(crate) fn check_batch_size(count: usize, config: &AnalysisConfig) -> Result<(), ReportError> {
    if count == 0 {
        return Err(ReportError::NoDocuments);
    }
    if count > config.max_documents {
        return Err(ReportError::TooManyDocuments {
            count,
            max: config.max_documents,
        });
    }
    Ok(())
}

/// Run one document through the pipeline. Never fails: errors end up in
/// the returned record.
pub(crate) async fn process_document(
    analyzer: &Arc<dyn DocumentAnalyzer>,
    index: usize,
    total: usize,
    source: DocumentSource,
    config: &AnalysisConfig,
) -> DocumentResult {
    if let Some(ref cb) = config.progress_callback {
        cb.on_document_start(index, total);
    }

    let result = normalize::normalize_response(index, analyze_one(analyzer, index, source, config).await);

    if let Some(ref cb) = config.progress_callback {
        match (result.content(), result.error()) {
            (Some(content), _) => cb.on_document_complete(index, total, content.text.len()),
            (None, Some(e)) => cb.on_document_error(index, total, &e.to_string()),
            (None, None) => {}
        }
    }
    result
}

async fn analyze_one(
    analyzer: &Arc<dyn DocumentAnalyzer>,
    index: usize,
    source: DocumentSource,
    config: &AnalysisConfig,
) -> Result<AnalysisResponse, DocumentError> {
    let start = Instant::now();
    let input = source.load(index, config.download_timeout_secs).await?;
    input.validate(index)?;

    let DocumentInput { name, bytes } = input;
    info!("Document {}: analysing '{}' ({} bytes)", index, name, bytes.len());

    let bytes = match config.max_dimension {
        Some(max) => preprocess::fit_within(bytes, max)
            .await
            .map_err(|detail| DocumentError::PreprocessFailed { index, detail })?,
        None => bytes,
    };

    let secs = config.api_timeout_secs;
    match tokio::time::timeout(Duration::from_secs(secs), analyzer.analyze(&bytes)).await {
        Ok(Ok(response)) => {
            debug!(
                "Document {}: {} blocks in {:?}",
                index,
                response.blocks.len(),
                start.elapsed()
            );
            Ok(response)
        }
        Ok(Err(e)) => {
            warn!("Document {}: analysis failed: {}", index, e);
            Err(DocumentError::AnalysisFailed {
                index,
                detail: e.to_string(),
            })
        }
        Err(_) => {
            warn!("Document {}: analysis timed out after {}s", index, secs);
            Err(DocumentError::Timeout { index, secs })
        }
    }
}

/// Resolve the analyzer, from most-specific to least-specific.
///
/// 1. `config.analyzer`, used as-is (tests and embedding applications
///    inject their own backend this way).
/// 2. `config.endpoint`: an [`HttpAnalyzer`] with `config.api_key`.
/// 3. `SCAN2REPORT_ENDPOINT` with optional `SCAN2REPORT_API_KEY`.
/// 4. With feature `textract`: the AWS SDK and its default credential chain.
pub(crate) async fn resolve_analyzer(
    config: &AnalysisConfig,
) -> Result<Arc<dyn DocumentAnalyzer>, ReportError> {
    if let Some(ref analyzer) = config.analyzer {
        return Ok(Arc::clone(analyzer));
    }

    let timeout = Duration::from_secs(config.api_timeout_secs);

    if let Some(ref endpoint) = config.endpoint {
        return http_analyzer(endpoint, config.api_key.clone(), timeout);
    }

    if let Ok(endpoint) = std::env::var(ENDPOINT_ENV) {
        if !endpoint.is_empty() {
            let key = std::env::var(API_KEY_ENV).ok().filter(|k| !k.is_empty());
            return http_analyzer(&endpoint, key, timeout);
        }
    }

    #[cfg(feature = "textract")]
    {
        let analyzer = crate::pipeline::textract::TextractAnalyzer::from_env().await;
        return Ok(Arc::new(analyzer));
    }

    #[cfg(not(feature = "textract"))]
    Err(ReportError::AnalyzerNotConfigured {
        hint: format!(
            "Set {ENDPOINT_ENV} (and optionally {API_KEY_ENV}) or pass --endpoint,\n\
             or build with the `textract` feature to call AWS directly."
        ),
    })
}

fn http_analyzer(
    endpoint: &str,
    api_key: Option<String>,
    timeout: Duration,
) -> Result<Arc<dyn DocumentAnalyzer>, ReportError> {
    let analyzer = HttpAnalyzer::new(endpoint, api_key, timeout).map_err(|e| {
        ReportError::AnalyzerNotConfigured {
            hint: format!("Cannot build HTTP client for '{endpoint}': {e}"),
        }
    })?;
    Ok(Arc::new(analyzer))
}

async fn write_report(path: &Path, body: &str) -> Result<(), ReportError> {
    let write_err = |source| ReportError::OutputWriteFailed {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await.map_err(write_err)?;
        }
    }

    let mut tmp_name = path.as_os_str().to_owned();
    tmp_name.push(".tmp");
    let tmp_path = PathBuf::from(tmp_name);

    tokio::fs::write(&tmp_path, body).await.map_err(write_err)?;
    tokio::fs::rename(&tmp_path, path).await.map_err(write_err)?;
    Ok(())
}
