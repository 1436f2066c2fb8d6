#![allow(dead_code)]

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use capstone_upload::config::AppConfig;
use capstone_upload::entities::files;
use capstone_upload::infrastructure::database;
use capstone_upload::services::file_repository::{
    FileRepository, NewFileRecord, SeaOrmFileRepository, TeamFile,
};
use capstone_upload::services::file_service::FileService;
use capstone_upload::services::plagiarism::PlagiarismChecker;
use capstone_upload::services::staging::StagingArea;
use capstone_upload::services::storage::{ObjectReader, StorageService};
use sea_orm::{Database, DatabaseConnection};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

pub async fn setup_test_db() -> DatabaseConnection {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    database::run_migrations(&db).await.unwrap();
    db
}

/// In-memory object store with switchable failures.
#[derive(Default)]
pub struct MockStorageService {
    pub objects: Mutex<BTreeMap<String, Vec<u8>>>,
    pub fail_put: AtomicBool,
    pub fail_presign: AtomicBool,
    pub fail_delete: AtomicBool,
}

impl MockStorageService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn keys(&self) -> Vec<String> {
        self.objects.lock().unwrap().keys().cloned().collect()
    }

    pub fn get_file_bytes(&self, key: &str) -> Vec<u8> {
        self.objects.lock().unwrap().get(key).cloned().unwrap_or_default()
    }

    pub fn insert(&self, key: &str, data: &[u8]) {
        self.objects
            .lock()
            .unwrap()
            .insert(key.to_string(), data.to_vec());
    }
}

#[async_trait]
impl StorageService for MockStorageService {
    async fn put_file(&self, local_path: &Path, key: &str) -> Result<()> {
        if self.fail_put.load(Ordering::SeqCst) {
            return Err(anyhow!("object store unavailable"));
        }
        let data = tokio::fs::read(local_path).await?;
        self.insert(key, &data);
        Ok(())
    }

    async fn presign(&self, key: &str, ttl: Duration) -> Result<String> {
        if self.fail_presign.load(Ordering::SeqCst) {
            return Err(anyhow!("presign failed"));
        }
        Ok(format!(
            "https://bucket.test/{}?X-Amz-Expires={}",
            key,
            ttl.as_secs()
        ))
    }

    async fn delete_file(&self, key: &str) -> Result<()> {
        if self.fail_delete.load(Ordering::SeqCst) {
            return Err(anyhow!("delete failed"));
        }
        // S3 deletes are idempotent
        self.objects.lock().unwrap().remove(key);
        Ok(())
    }

    async fn file_exists(&self, key: &str) -> Result<bool> {
        Ok(self.objects.lock().unwrap().contains_key(key))
    }

    async fn open_object(&self, key: &str) -> Result<ObjectReader> {
        let data = self
            .objects
            .lock()
            .unwrap()
            .get(key)
            .cloned()
            .ok_or_else(|| anyhow!("no such key: {}", key))?;
        Ok(Box::pin(std::io::Cursor::new(data)))
    }

    async fn list_objects(&self, prefix: &str) -> Result<Vec<String>> {
        Ok(self
            .keys()
            .into_iter()
            .filter(|k| k.starts_with(prefix))
            .collect())
    }
}

/// Answers every check with a fixed percentage, or fails.
pub struct StubPlagiarism {
    pub percent: Option<f64>,
    pub calls: Mutex<u32>,
}

impl StubPlagiarism {
    pub fn reporting(percent: f64) -> Self {
        Self {
            percent: Some(percent),
            calls: Mutex::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            percent: None,
            calls: Mutex::new(0),
        }
    }

    pub fn calls(&self) -> u32 {
        *self.calls.lock().unwrap()
    }
}

#[async_trait]
impl PlagiarismChecker for StubPlagiarism {
    async fn check(&self, path: &Path) -> Result<f64> {
        *self.calls.lock().unwrap() += 1;
        // The staged copy must still exist while the check runs
        assert!(path.exists(), "staged file removed before plagiarism check");
        self.percent
            .ok_or_else(|| anyhow!("connection refused"))
    }
}

/// Repository whose writes always fail.
pub struct BrokenRepository;

#[async_trait]
impl FileRepository for BrokenRepository {
    async fn create(&self, _record: NewFileRecord) -> Result<files::Model> {
        Err(anyhow!("database is locked"))
    }

    async fn find_by_id(&self, _id: i32) -> Result<Option<files::Model>> {
        Err(anyhow!("database is locked"))
    }

    async fn delete_by_key(&self, _key: &str) -> Result<u64> {
        Err(anyhow!("database is locked"))
    }

    async fn list_by_team(&self, _team_id: &str) -> Result<Vec<TeamFile>> {
        Err(anyhow!("database is locked"))
    }
}

pub struct TestHarness {
    pub db: DatabaseConnection,
    pub storage: Arc<MockStorageService>,
    pub plagiarism: Arc<StubPlagiarism>,
    pub service: Arc<FileService>,
    pub config: AppConfig,
    pub scratch: tempfile::TempDir,
}

impl TestHarness {
    pub async fn new(plagiarism: StubPlagiarism) -> Self {
        let db = setup_test_db().await;
        let repository = Arc::new(SeaOrmFileRepository::new(db.clone()));
        Self::with_repository(db, repository, plagiarism)
    }

    pub fn with_repository(
        db: DatabaseConnection,
        repository: Arc<dyn FileRepository>,
        plagiarism: StubPlagiarism,
    ) -> Self {
        let scratch = tempfile::tempdir().unwrap();
        let mut config = AppConfig::development();
        config.upload.dir = scratch.path().to_path_buf();

        let storage = Arc::new(MockStorageService::new());
        let plagiarism = Arc::new(plagiarism);
        let service = Arc::new(FileService::new(
            storage.clone(),
            repository,
            plagiarism.clone(),
            StagingArea::new(scratch.path()),
            &config.plagiarism,
        ));

        Self {
            db,
            storage,
            plagiarism,
            service,
            config,
            scratch,
        }
    }

    pub fn scratch_entries(&self) -> usize {
        std::fs::read_dir(self.scratch.path()).unwrap().count()
    }
}
