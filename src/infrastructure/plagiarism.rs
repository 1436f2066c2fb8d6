use crate::config::PlagiarismConfig;
use crate::services::plagiarism::{HttpPlagiarismChecker, PlagiarismChecker};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

pub fn setup_plagiarism(
    config: &PlagiarismConfig,
    timeout: Duration,
) -> anyhow::Result<Arc<dyn PlagiarismChecker>> {
    info!(
        "🔍 Plagiarism service: {} (threshold {}%)",
        config.endpoint, config.threshold
    );

    let checker = HttpPlagiarismChecker::new(config.endpoint.clone(), timeout)?;
    Ok(Arc::new(checker))
}
