use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// HTTP server settings
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Listen port (default: 8080)
    pub port: u16,

    /// Read timeout (default: 15s)
    pub timeout_read: Duration,

    /// Write timeout (default: 15s)
    pub timeout_write: Duration,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
}

/// Local scratch storage for incoming uploads
#[derive(Debug, Clone)]
pub struct UploadConfig {
    /// Directory staged files are written to (default: "./uploads")
    pub dir: PathBuf,

    /// Maximum upload size in megabytes (default: 100)
    pub max_upload_size_mb: usize,
}

#[derive(Debug, Clone)]
pub struct PlagiarismConfig {
    /// Base URL of the plagiarism service (default: "http://localhost:8081")
    pub endpoint: String,

    /// Similarity percentage at or above which a PDF is rejected (default: 15)
    pub threshold: u32,
}

/// S3 / MinIO connection settings. All fields except the endpoint are required.
#[derive(Debug, Clone, Default)]
pub struct StorageConfig {
    pub bucket: String,
    pub region: String,
    pub access_key_id: String,
    pub secret_access_key: String,
    /// Custom endpoint for S3-compatible stores such as MinIO
    pub endpoint_url: Option<String>,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub upload: UploadConfig,
    pub plagiarism: PlagiarismConfig,
    pub storage: StorageConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                port: 8080,
                timeout_read: Duration::from_secs(15),
                timeout_write: Duration::from_secs(15),
            },
            database: DatabaseConfig {
                url: "sqlite://capstone.db?mode=rwc".to_string(),
            },
            upload: UploadConfig {
                dir: PathBuf::from("./uploads"),
                max_upload_size_mb: 100,
            },
            plagiarism: PlagiarismConfig {
                endpoint: "http://localhost:8081".to_string(),
                threshold: 15,
            },
            storage: StorageConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let default = Self::default();

        Self {
            server: ServerConfig {
                port: env::var("PORT")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(default.server.port),

                timeout_read: env::var("SERVER_TIMEOUT_READ")
                    .ok()
                    .and_then(|v| parse_duration(&v))
                    .unwrap_or(default.server.timeout_read),

                timeout_write: env::var("SERVER_TIMEOUT_WRITE")
                    .ok()
                    .and_then(|v| parse_duration(&v))
                    .unwrap_or(default.server.timeout_write),
            },

            database: DatabaseConfig {
                url: env::var("DATABASE_URL").unwrap_or(default.database.url),
            },

            upload: UploadConfig {
                dir: env::var("UPLOAD_DIR")
                    .map(PathBuf::from)
                    .unwrap_or(default.upload.dir),

                max_upload_size_mb: env::var("MAX_UPLOAD_SIZE_MB")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(default.upload.max_upload_size_mb),
            },

            plagiarism: PlagiarismConfig {
                endpoint: env::var("PLAGIARISM_API_ENDPOINT")
                    .map(|v| normalize_endpoint(&v))
                    .unwrap_or(default.plagiarism.endpoint),

                threshold: env::var("PLAGIARISM_THRESHOLD")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(default.plagiarism.threshold),
            },

            storage: StorageConfig {
                bucket: env::var("AWS_BUCKET_NAME").unwrap_or_default(),
                region: env::var("AWS_REGION").unwrap_or_default(),
                access_key_id: env::var("AWS_ACCESS_KEY_ID").unwrap_or_default(),
                secret_access_key: env::var("AWS_SECRET_ACCESS_KEY").unwrap_or_default(),
                endpoint_url: env::var("AWS_ENDPOINT_URL").ok().filter(|v| !v.is_empty()),
            },
        }
    }

    /// Config for local development: 10 MB uploads, scratch dir under the system temp dir.
    pub fn development() -> Self {
        Self {
            upload: UploadConfig {
                dir: env::temp_dir().join("capstone-uploads"),
                max_upload_size_mb: 10,
            },
            ..Self::default()
        }
    }

    pub fn max_upload_bytes(&self) -> usize {
        self.upload.max_upload_size_mb * 1024 * 1024
    }

    pub fn request_timeout(&self) -> Duration {
        self.server.timeout_read + self.server.timeout_write
    }
}

impl StorageConfig {
    /// Returns an error naming every missing required variable.
    pub fn validate(&self) -> anyhow::Result<()> {
        let missing: Vec<&str> = [
            ("AWS_BUCKET_NAME", &self.bucket),
            ("AWS_REGION", &self.region),
            ("AWS_ACCESS_KEY_ID", &self.access_key_id),
            ("AWS_SECRET_ACCESS_KEY", &self.secret_access_key),
        ]
        .into_iter()
        .filter(|(_, value)| value.is_empty())
        .map(|(name, _)| name)
        .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(anyhow::anyhow!(
                "missing AWS configuration: {}",
                missing.join(", ")
            ))
        }
    }
}

/// Accepts "15", "15s", "2m" and "1h".
fn parse_duration(value: &str) -> Option<Duration> {
    let value = value.trim();
    let (number, multiplier) = if let Some(n) = value.strip_suffix('s') {
        (n, 1)
    } else if let Some(n) = value.strip_suffix('m') {
        (n, 60)
    } else if let Some(n) = value.strip_suffix('h') {
        (n, 3600)
    } else {
        (value, 1)
    };

    number
        .trim()
        .parse::<u64>()
        .ok()
        .map(|n| Duration::from_secs(n * multiplier))
}

// "localhost:8081" is a valid setting, reqwest needs the scheme
fn normalize_endpoint(value: &str) -> String {
    let value = value.trim().trim_end_matches('/');
    if value.starts_with("http://") || value.starts_with("https://") {
        value.to_string()
    } else {
        format!("http://{}", value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.upload.max_upload_size_mb, 100);
        assert_eq!(config.plagiarism.threshold, 15);
        assert_eq!(config.plagiarism.endpoint, "http://localhost:8081");
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_development_config() {
        let config = AppConfig::development();
        assert_eq!(config.max_upload_bytes(), 10 * 1024 * 1024);
        assert!(config.upload.dir.ends_with("capstone-uploads"));
    }

    #[test]
    fn test_parse_duration() {
        assert_eq!(parse_duration("15s"), Some(Duration::from_secs(15)));
        assert_eq!(parse_duration("20"), Some(Duration::from_secs(20)));
        assert_eq!(parse_duration("2m"), Some(Duration::from_secs(120)));
        assert_eq!(parse_duration("soon"), None);
    }

    #[test]
    fn test_normalize_endpoint() {
        assert_eq!(normalize_endpoint("localhost:8081"), "http://localhost:8081");
        assert_eq!(
            normalize_endpoint("https://plag.example.com/"),
            "https://plag.example.com"
        );
    }

    #[test]
    fn test_storage_config_reports_missing_fields() {
        let err = StorageConfig {
            bucket: "capstone".to_string(),
            ..Default::default()
        }
        .validate()
        .unwrap_err()
        .to_string();

        assert!(err.contains("AWS_REGION"));
        assert!(err.contains("AWS_SECRET_ACCESS_KEY"));
        assert!(!err.contains("AWS_BUCKET_NAME"));
    }
}
