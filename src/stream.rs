//! Streaming analysis API: emit documents as they settle.
//!
//! Unlike the eager [`crate::analyze::analyze_documents`], which returns
//! only after every document finishes and the report is rendered,
//! [`analyze_stream`] yields each [`DocumentResult`] through a `Stream` as
//! soon as its analysis completes. Results arrive in completion order; sort
//! by `index` if order matters, then hand the slice to
//! [`crate::report::render_report`].

use crate::analyze::{check_batch_size, process_document, resolve_analyzer};
use crate::config::AnalysisConfig;
use crate::error::ReportError;
use crate::output::DocumentResult;
use crate::pipeline::input::{DocumentInput, DocumentSource};
use futures::future;
use futures::stream::{self, StreamExt};
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio_stream::Stream;
use tracing::info;

/// A boxed stream of per-document results.
pub type DocumentStream = Pin<Box<dyn Stream<Item = DocumentResult> + Send>>;

/// Analyse documents, streaming each result as it is ready.
///
/// Failed documents are yielded too, carrying their error. Batch-level
/// problems (empty batch, too many documents, no analyzer) are reported
/// before the stream is created. The progress callback's
/// `on_batch_complete` fires once the stream has been drained; dropping the
/// stream early skips it.
///
/// # Example
/// ```rust,no_run
/// use scan2report::{analyze_stream, AnalysisConfig, DocumentInput};
/// use futures::StreamExt;
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let bytes = std::fs::read("receipt.png")?;
/// let config = AnalysisConfig::builder()
///     .endpoint("https://textract.example.com/")
///     .build()?;
/// let mut stream = analyze_stream(vec![DocumentInput::new("receipt.png", bytes)], &config).await?;
/// while let Some(result) = stream.next().await {
///     match result.error() {
///         Some(e) => eprintln!("Image {}: {e}", result.index),
///         None => println!("Image {} done", result.index),
///     }
/// }
/// # Ok(())
/// # }
/// ```
pub async fn analyze_stream(
    inputs: Vec<DocumentInput>,
    config: &AnalysisConfig,
) -> Result<DocumentStream, ReportError> {
    stream_sources(inputs.into_iter().map(DocumentSource::from).collect(), config).await
}

/// Streaming counterpart of [`crate::analyze::analyze_sources`].
pub async fn analyze_sources_stream<S: AsRef<str>>(
    sources: &[S],
    config: &AnalysisConfig,
) -> Result<DocumentStream, ReportError> {
    let sources = sources
        .iter()
        .map(|s| DocumentSource::Location(s.as_ref().to_string()))
        .collect();
    stream_sources(sources, config).await
}

async fn stream_sources(
    sources: Vec<DocumentSource>,
    config: &AnalysisConfig,
) -> Result<DocumentStream, ReportError> {
    check_batch_size(sources.len(), config)?;
    let total = sources.len();
    info!("Starting streaming analysis of {} documents", total);

    let analyzer = resolve_analyzer(config).await?;
    if let Some(ref cb) = config.progress_callback {
        cb.on_batch_start(total);
    }

    let concurrency = config.concurrency;
    let config_clone = config.clone();
    let callback = config.progress_callback.clone();
    let succeeded = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&succeeded);

    let documents = stream::iter(sources.into_iter().enumerate().map(move |(i, source)| {
        let analyzer = Arc::clone(&analyzer);
        let cfg = config_clone.clone();
        async move { process_document(&analyzer, i + 1, total, source, &cfg).await }
    }))
    .buffer_unordered(concurrency)
    .inspect(move |result| {
        if result.is_ok() {
            counter.fetch_add(1, Ordering::SeqCst);
        }
    });

    // Yields nothing; runs once every document has been emitted.
    let finish = stream::once(async move {
        let success_count = succeeded.load(Ordering::SeqCst);
        info!("Streaming analysis complete: {}/{} documents", success_count, total);
        if let Some(cb) = callback {
            cb.on_batch_complete(total, success_count);
        }
    })
    .filter_map(|()| future::ready(None::<DocumentResult>));

    Ok(Box::pin(documents.chain(finish)))
}
