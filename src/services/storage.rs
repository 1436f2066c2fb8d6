use anyhow::{Context, Result};
use async_trait::async_trait;
use aws_sdk_s3::Client;
use aws_sdk_s3::presigning::PresigningConfig;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::ObjectCannedAcl;
use std::path::Path;
use std::pin::Pin;
use std::time::Duration;
use tokio::io::AsyncRead;

/// Presigned download links stay valid for one week.
pub const PRESIGNED_URL_TTL: Duration = Duration::from_secs(7 * 24 * 60 * 60);

/// Body of a stored object, read incrementally.
pub type ObjectReader = Pin<Box<dyn AsyncRead + Send>>;

#[async_trait]
pub trait StorageService: Send + Sync {
    /// Uploads the local file at `local_path` under `key`.
    async fn put_file(&self, local_path: &Path, key: &str) -> Result<()>;
    async fn presign(&self, key: &str, ttl: Duration) -> Result<String>;
    async fn delete_file(&self, key: &str) -> Result<()>;
    async fn file_exists(&self, key: &str) -> Result<bool>;
    async fn open_object(&self, key: &str) -> Result<ObjectReader>;
    async fn list_objects(&self, prefix: &str) -> Result<Vec<String>>;
}

pub struct S3StorageService {
    client: Client,
    bucket: String,
}

impl S3StorageService {
    pub fn new(client: Client, bucket: String) -> Self {
        Self { client, bucket }
    }
}

#[async_trait]
impl StorageService for S3StorageService {
    async fn put_file(&self, local_path: &Path, key: &str) -> Result<()> {
        let body = ByteStream::from_path(local_path)
            .await
            .with_context(|| format!("failed to open file {:?}", local_path))?;

        let res = self
            .client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(body)
            .content_type(mime::APPLICATION_OCTET_STREAM.as_ref())
            .acl(ObjectCannedAcl::Private)
            .send()
            .await;

        if let Err(e) = res {
            tracing::error!(
                "S3 put_object failed: bucket={}, key={}, error={:?}",
                self.bucket,
                key,
                e
            );
            return Err(e.into());
        }
        Ok(())
    }

    async fn presign(&self, key: &str, ttl: Duration) -> Result<String> {
        let presigning_config =
            PresigningConfig::expires_in(ttl).context("Failed to create presigning config")?;

        let presigned = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .presigned(presigning_config)
            .await
            .context("Failed to generate presigned URL")?;

        Ok(presigned.uri().to_string())
    }

    async fn delete_file(&self, key: &str) -> Result<()> {
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .with_context(|| format!("failed to delete object (bucket: {}, key: {})", self.bucket, key))?;
        Ok(())
    }

    async fn file_exists(&self, key: &str) -> Result<bool> {
        let res = self
            .client
            .head_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await;

        match res {
            Ok(_) => Ok(true),
            Err(e) => {
                let service_error = e.into_service_error();
                if service_error.is_not_found() {
                    Ok(false)
                } else {
                    Err(anyhow::anyhow!(service_error))
                }
            }
        }
    }

    async fn open_object(&self, key: &str) -> Result<ObjectReader> {
        let res = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .with_context(|| format!("failed to get object {}", key))?;
        Ok(Box::pin(res.body.into_async_read()))
    }

    async fn list_objects(&self, prefix: &str) -> Result<Vec<String>> {
        let mut objects = Vec::new();
        let mut continuation_token = None;

        loop {
            let res = self
                .client
                .list_objects_v2()
                .bucket(&self.bucket)
                .prefix(prefix)
                .set_continuation_token(continuation_token)
                .send()
                .await
                .context("failed to list objects")?;

            if let Some(contents) = res.contents {
                for object in contents {
                    if let Some(key) = object.key {
                        objects.push(key);
                    }
                }
            }

            if res.is_truncated.unwrap_or(false) {
                continuation_token = res.next_continuation_token;
            } else {
                break;
            }
        }

        Ok(objects)
    }
}

/// `projects/{year}/{intake}/{team_id}/{file_name}`
pub fn storage_key(year: i32, intake: &str, team_id: &str, file_name: &str) -> String {
    format!("projects/{}/{}/{}/{}", year, intake, team_id, file_name)
}
