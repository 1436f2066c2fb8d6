use crate::config::StorageConfig;
use crate::services::storage::S3StorageService;
use aws_config::retry::RetryConfig;
use aws_sdk_s3::config::{Credentials, Region};
use std::sync::Arc;
use tracing::info;

pub async fn setup_storage(config: &StorageConfig) -> anyhow::Result<Arc<S3StorageService>> {
    config.validate()?;

    info!(
        "☁️  S3 Storage: {} (Bucket: {}, Region: {})",
        config.endpoint_url.as_deref().unwrap_or("aws"),
        config.bucket,
        config.region
    );

    let mut loader = aws_config::from_env()
        .region(Region::new(config.region.clone()))
        .credentials_provider(Credentials::new(
            config.access_key_id.clone(),
            config.secret_access_key.clone(),
            None,
            None,
            "static",
        ))
        .retry_config(RetryConfig::standard().with_max_attempts(3));

    if let Some(endpoint_url) = &config.endpoint_url {
        loader = loader.endpoint_url(endpoint_url);
    }

    let aws_config = loader.load().await;

    let s3_config = aws_sdk_s3::config::Builder::from(&aws_config)
        .force_path_style(config.endpoint_url.is_some())
        .build();

    let s3_client = aws_sdk_s3::Client::from_conf(s3_config);

    match s3_client.head_bucket().bucket(&config.bucket).send().await {
        Ok(_) => info!("✅ Bucket '{}' is ready", config.bucket),
        Err(e) => tracing::warn!(
            "⚠️  Bucket '{}' not reachable yet: {}. Uploads will fail until it is.",
            config.bucket,
            e
        ),
    }

    Ok(Arc::new(S3StorageService::new(
        s3_client,
        config.bucket.clone(),
    )))
}
