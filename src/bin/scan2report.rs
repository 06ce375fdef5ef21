//! CLI binary for scan2report.
//!
//! A thin shim over the library crate that maps CLI flags
//! to `AnalysisConfig` and prints the report.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use scan2report::{
    analyze_sources, analyze_to_file, report_path, AnalysisConfig, AnalysisProgressCallback,
    ExtractionType, ProgressCallback, ReportFormat,
};
use std::collections::HashMap;
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers ──────────────────────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

const TICKS: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"];

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress callback: a live bar plus one log line per settled
/// document. Documents complete out of order.
struct CliProgressCallback {
    bar: ProgressBar,
    start_times: Mutex<HashMap<usize, Instant>>,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new(0);
        bar.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_strings(TICKS),
        );
        bar.set_prefix("Preparing");
        bar.set_message("Resolving analyzer…");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self {
            bar,
            start_times: Mutex::new(HashMap::new()),
        })
    }

    fn elapsed_secs(&self, index: usize) -> f64 {
        self.start_times
            .lock()
            .ok()
            .and_then(|mut times| times.remove(&index))
            .map(|t| t.elapsed().as_secs_f64())
            .unwrap_or(0.0)
    }
}

impl AnalysisProgressCallback for CliProgressCallback {
    fn on_batch_start(&self, total: usize) {
        let style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>3}/{len} images  \
             ⏱ {elapsed_precise}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(TICKS);

        self.bar.set_length(total as u64);
        self.bar.set_style(style);
        self.bar.set_prefix("Analysing");
        self.bar.println(format!(
            "{} {}",
            cyan("◆"),
            bold(&format!("Starting analysis of {total} images…"))
        ));
    }

    fn on_document_start(&self, index: usize, _total: usize) {
        if let Ok(mut times) = self.start_times.lock() {
            times.insert(index, Instant::now());
        }
        self.bar.set_message(format!("image {index}"));
    }

    fn on_document_complete(&self, index: usize, total: usize, lines: usize) {
        let secs = self.elapsed_secs(index);
        self.bar.println(format!(
            "  {} Image {:>3}/{:<3}  {:<8}  {}",
            green("✓"),
            index,
            total,
            dim(&format!("{lines:>4} lines")),
            dim(&format!("{secs:.1}s")),
        ));
        self.bar.inc(1);
    }

    fn on_document_error(&self, index: usize, total: usize, error: &str) {
        let secs = self.elapsed_secs(index);

        let msg: String = if error.chars().count() > 80 {
            error.chars().take(79).chain(['…']).collect()
        } else {
            error.to_string()
        };

        self.bar.println(format!(
            "  {} Image {:>3}/{:<3}  {}  {}",
            red("✗"),
            index,
            total,
            red(&msg),
            dim(&format!("{secs:.1}s")),
        ));
        self.bar.inc(1);
    }

    fn on_batch_complete(&self, total: usize, success_count: usize) {
        let failed = total.saturating_sub(success_count);
        self.bar.finish_and_clear();

        if failed == 0 {
            eprintln!(
                "{} {} images analysed successfully",
                green("✔"),
                bold(&success_count.to_string())
            );
        } else {
            eprintln!(
                "{} {}/{} images analysed  ({} failed)",
                if failed == total { red("✘") } else { cyan("⚠") },
                bold(&success_count.to_string()),
                total,
                red(&failed.to_string()),
            );
        }
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Extracted text of two scans (stdout)
  scan2report receipt.png invoice.jpg

  # Tables as CSV into a file
  scan2report --format csv --extraction-type table scans/*.png -o tables.csv

  # Everything, written into a directory (analysis_results.txt)
  scan2report --extraction-type all form.tiff -o out/

  # Structured JSON with per-document records and stats
  scan2report --json https://example.com/scan.png

EXTRACTION TYPES:
  text    extracted lines (default)
  table   reconstructed tables
  forms   key: value pairs
  all     text, tables and forms

ENVIRONMENT VARIABLES:
  SCAN2REPORT_ENDPOINT   Textract-compatible endpoint URL
  SCAN2REPORT_API_KEY    Bearer token for the endpoint
  AWS_REGION, AWS_*      AWS credentials (builds with the `textract` feature)
  RUST_LOG               Override the log filter
"#;

/// Analyse scanned document images into a text or CSV report.
#[derive(Parser, Debug)]
#[command(
    name = "scan2report",
    version,
    about = "Analyse scanned document images into a text or CSV report",
    long_about = "Send document images (local files or URLs) to a Textract-compatible analysis \
service and turn the result into a report of extracted text, tables or form fields.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Local image paths or HTTP/HTTPS URLs.
    #[arg(required = true)]
    inputs: Vec<String>,

    /// Write the report to this file (or into this directory) instead of stdout.
    #[arg(short, long, env = "SCAN2REPORT_OUTPUT")]
    output: Option<PathBuf>,

    /// Report format: txt or csv.
    #[arg(long, env = "SCAN2REPORT_FORMAT", default_value = "txt")]
    format: ReportFormat,

    /// Facet to render: text, table, forms or all.
    #[arg(long, env = "SCAN2REPORT_EXTRACTION_TYPE", default_value = "text")]
    extraction_type: ExtractionType,

    /// Textract-compatible endpoint URL.
    #[arg(long, env = "SCAN2REPORT_ENDPOINT")]
    endpoint: Option<String>,

    /// Bearer token sent to the endpoint.
    #[arg(long, env = "SCAN2REPORT_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Longest image edge in pixels before submission.
    #[arg(long, env = "SCAN2REPORT_MAX_DIMENSION", default_value_t = 1500,
          value_parser = clap::value_parser!(u32).range(100..=10000))]
    max_dimension: u32,

    /// Submit images without resizing.
    #[arg(long, env = "SCAN2REPORT_NO_RESIZE")]
    no_resize: bool,

    /// Number of concurrent analysis calls.
    #[arg(short, long, env = "SCAN2REPORT_CONCURRENCY", default_value_t = 20)]
    concurrency: usize,

    /// Largest accepted batch.
    #[arg(long, env = "SCAN2REPORT_MAX_DOCUMENTS", default_value_t = 20)]
    max_documents: usize,

    /// Per-document analysis timeout in seconds.
    #[arg(long, env = "SCAN2REPORT_API_TIMEOUT", default_value_t = 60)]
    api_timeout: u64,

    /// HTTP download timeout in seconds.
    #[arg(long, env = "SCAN2REPORT_DOWNLOAD_TIMEOUT", default_value_t = 120)]
    download_timeout: u64,

    /// Output structured JSON (AnalysisOutput) instead of the report body.
    #[arg(long, env = "SCAN2REPORT_JSON", conflicts_with = "output")]
    json: bool,

    /// Exit with an error when any document fails.
    #[arg(long, env = "SCAN2REPORT_STRICT")]
    strict: bool,

    /// Disable progress bar.
    #[arg(long, env = "SCAN2REPORT_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "SCAN2REPORT_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "SCAN2REPORT_QUIET")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The progress bar replaces INFO-level library logs.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    let progress_cb: Option<ProgressCallback> = if show_progress {
        Some(CliProgressCallback::new() as Arc<dyn AnalysisProgressCallback>)
    } else {
        None
    };

    let config = build_config(&cli, progress_cb)?;

    // ── Run analysis ─────────────────────────────────────────────────────
    if let Some(ref output_path) = cli.output {
        let stats = analyze_to_file(&cli.inputs, output_path, &config)
            .await
            .context("Analysis failed")?;

        if !cli.quiet {
            eprintln!(
                "{}  {}/{} images  {}ms  →  {}",
                if stats.failed == 0 { green("✔") } else { cyan("⚠") },
                stats.succeeded,
                stats.total_documents,
                stats.total_duration_ms,
                bold(&report_path(output_path, config.format).display().to_string()),
            );
        }
        if cli.strict && stats.failed > 0 {
            anyhow::bail!(
                "{}/{} documents failed during analysis",
                stats.failed,
                stats.total_documents
            );
        }
    } else {
        let output = analyze_sources(&cli.inputs, &config)
            .await
            .context("Analysis failed")?;

        if cli.json {
            let json =
                serde_json::to_string_pretty(&output).context("Failed to serialise output")?;
            println!("{json}");
        } else {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            handle
                .write_all(output.report.body.as_bytes())
                .context("Failed to write to stdout")?;
        }

        if !cli.quiet && !show_progress && !cli.json {
            eprintln!(
                "Analysed {}/{} images in {}ms ({} lines, {} tables, {} form fields)",
                output.stats.succeeded,
                output.stats.total_documents,
                output.stats.total_duration_ms,
                output.stats.total_lines,
                output.stats.total_tables,
                output.stats.total_forms,
            );
        }

        if cli.strict {
            output.into_result().context("Strict mode")?;
        }
    }

    Ok(())
}

/// Map CLI args to `AnalysisConfig`.
fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<AnalysisConfig> {
    let max_dimension = if cli.no_resize {
        None
    } else {
        Some(cli.max_dimension)
    };

    let mut builder = AnalysisConfig::builder()
        .format(cli.format)
        .extraction(cli.extraction_type)
        .max_dimension(max_dimension)
        .concurrency(cli.concurrency)
        .max_documents(cli.max_documents)
        .api_timeout_secs(cli.api_timeout)
        .download_timeout_secs(cli.download_timeout);

    if let Some(ref endpoint) = cli.endpoint {
        builder = builder.endpoint(endpoint.clone());
    }
    if let Some(ref key) = cli.api_key {
        builder = builder.api_key(key.clone());
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}
