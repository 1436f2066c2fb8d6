use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use tokio_util::io::ReaderStream;

#[async_trait]
pub trait PlagiarismChecker: Send + Sync {
    /// Similarity percentage reported for the file at `path`.
    async fn check(&self, path: &Path) -> Result<f64>;
}

#[derive(Deserialize)]
struct CheckResponse {
    #[serde(rename = "matchPercent")]
    match_percent: f64,
}

/// Client for the external service: `POST {endpoint}/check/plagiarism`
/// with the document in the `file` form field.
pub struct HttpPlagiarismChecker {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpPlagiarismChecker {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build plagiarism HTTP client")?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    fn check_url(&self) -> String {
        format!("{}/check/plagiarism", self.endpoint.trim_end_matches('/'))
    }
}

#[async_trait]
impl PlagiarismChecker for HttpPlagiarismChecker {
    async fn check(&self, path: &Path) -> Result<f64> {
        let file = tokio::fs::File::open(path)
            .await
            .with_context(|| format!("failed to open {:?} for plagiarism check", path))?;
        let length = file.metadata().await?.len();
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "document.pdf".to_string());

        let part = Part::stream_with_length(
            reqwest::Body::wrap_stream(ReaderStream::new(file)),
            length,
        )
        .file_name(file_name)
        .mime_str("application/pdf")?;

        let response = self
            .client
            .post(self.check_url())
            .multipart(Form::new().part("file", part))
            .send()
            .await
            .context("plagiarism service unreachable")?;

        let status = response.status();
        if !status.is_success() {
            return Err(anyhow!("plagiarism service responded with {}", status));
        }

        let result: CheckResponse = response
            .json()
            .await
            .context("invalid plagiarism service response")?;

        tracing::debug!("🔍 Plagiarism check for {:?}: {}%", path, result.match_percent);
        Ok(result.match_percent)
    }
}
