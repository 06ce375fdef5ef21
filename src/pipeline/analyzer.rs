//! The document-analysis service seam.
//!
//! [`DocumentAnalyzer`] is the only stage with network I/O. The pipeline
//! treats it as a black box: bytes in, block graph or error out. Calls are
//! never retried; a failure is terminal for that one document.
//!
//! [`HttpAnalyzer`] talks to any endpoint that speaks the Textract JSON
//! protocol (`Textract.AnalyzeDocument` over `application/x-amz-json-1.1`),
//! such as a signing gateway or a local emulator. With the `textract`
//! feature, [`crate::pipeline::textract::TextractAnalyzer`] calls AWS
//! directly.

use crate::error::AnalyzeError;
use crate::graph::AnalysisResponse;
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::Serialize;
use std::time::Duration;
use tracing::debug;

/// Feature types requested for every document.
pub const FEATURE_TYPES: [&str; 2] = ["TABLES", "FORMS"];

const AMZ_TARGET: &str = "Textract.AnalyzeDocument";
const AMZ_JSON: &str = "application/x-amz-json-1.1";

/// A document-analysis backend.
///
/// Implementations must be `Send + Sync`: one analyzer serves every
/// concurrent document task of a batch.
#[async_trait]
pub trait DocumentAnalyzer: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &str;

    /// Analyse one (already pre-processed) document.
    async fn analyze(&self, document: &[u8]) -> Result<AnalysisResponse, AnalyzeError>;
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct AnalyzeRequest<'a> {
    document: RequestDocument,
    feature_types: &'a [&'a str],
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct RequestDocument {
    bytes: String,
}

/// Analyzer for a Textract-compatible JSON endpoint.
#[derive(Debug, Clone)]
pub struct HttpAnalyzer {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
}

impl HttpAnalyzer {
    /// Build an analyzer posting to `endpoint`, with a per-request timeout.
    pub fn new(
        endpoint: impl Into<String>,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, AnalyzeError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AnalyzeError::Transport(e.to_string()))?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
            api_key,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl DocumentAnalyzer for HttpAnalyzer {
    fn name(&self) -> &str {
        "http"
    }

    async fn analyze(&self, document: &[u8]) -> Result<AnalysisResponse, AnalyzeError> {
        let body = AnalyzeRequest {
            document: RequestDocument {
                bytes: STANDARD.encode(document),
            },
            feature_types: &FEATURE_TYPES,
        };
        let payload =
            serde_json::to_vec(&body).map_err(|e| AnalyzeError::Decode(e.to_string()))?;

        let mut request = self
            .client
            .post(&self.endpoint)
            .header("X-Amz-Target", AMZ_TARGET)
            .header(reqwest::header::CONTENT_TYPE, AMZ_JSON)
            .body(payload);
        if let Some(ref key) = self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                AnalyzeError::Transport(format!("timed out: {e}"))
            } else {
                AnalyzeError::Transport(e.to_string())
            }
        })?;

        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| AnalyzeError::Transport(e.to_string()))?;

        if !status.is_success() {
            return Err(AnalyzeError::Http {
                status: status.as_u16(),
                body: String::from_utf8_lossy(&bytes).trim().to_string(),
            });
        }

        let parsed: AnalysisResponse =
            serde_json::from_slice(&bytes).map_err(|e| AnalyzeError::Decode(e.to_string()))?;
        debug!("{}: received {} blocks", self.endpoint, parsed.blocks.len());
        Ok(parsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_body_shape() {
        let body = AnalyzeRequest {
            document: RequestDocument {
                bytes: STANDARD.encode(b"abc"),
            },
            feature_types: &FEATURE_TYPES,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["Document"]["Bytes"], "YWJj");
        assert_eq!(json["FeatureTypes"][0], "TABLES");
        assert_eq!(json["FeatureTypes"][1], "FORMS");
    }

    #[test]
    fn unreachable_endpoint_is_transport_error() {
        let analyzer =
            HttpAnalyzer::new("http://127.0.0.1:9/analyze", None, Duration::from_secs(2)).unwrap();
        let err = tokio_test::block_on(analyzer.analyze(b"x")).unwrap_err();
        assert!(matches!(err, AnalyzeError::Transport(_)), "got: {err:?}");
    }
}
