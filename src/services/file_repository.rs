use crate::entities::{files, prelude::*};
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, FromQueryResult, QueryFilter,
    QueryOrder, QuerySelect, Set,
};
use serde::Serialize;
use utoipa::ToSchema;

/// Metadata written after a successful object upload.
#[derive(Debug, Clone, PartialEq)]
pub struct NewFileRecord {
    pub original_name: String,
    pub storage_key: String,
    pub download_url: String,
    pub size: i64,
    pub team_id: String,
    pub file_type: String,
    pub content_type: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema, FromQueryResult)]
pub struct TeamFile {
    pub download_url: String,
    pub file_type: String,
}

#[async_trait]
pub trait FileRepository: Send + Sync {
    async fn create(&self, record: NewFileRecord) -> Result<files::Model>;
    async fn find_by_id(&self, id: i32) -> Result<Option<files::Model>>;
    /// Returns the number of rows removed.
    async fn delete_by_key(&self, key: &str) -> Result<u64>;
    async fn list_by_team(&self, team_id: &str) -> Result<Vec<TeamFile>>;
}

pub struct SeaOrmFileRepository {
    db: DatabaseConnection,
}

impl SeaOrmFileRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl FileRepository for SeaOrmFileRepository {
    async fn create(&self, record: NewFileRecord) -> Result<files::Model> {
        let model = files::ActiveModel {
            original_name: Set(record.original_name),
            storage_key: Set(record.storage_key),
            download_url: Set(record.download_url),
            size: Set(record.size),
            team_id: Set(record.team_id),
            file_type: Set(record.file_type),
            content_type: Set(record.content_type),
            created_at: Set(record.created_at),
            ..Default::default()
        };

        // Re-uploading under the same key replaces the previous record
        let on_conflict = OnConflict::column(files::Column::StorageKey)
            .update_columns([
                files::Column::OriginalName,
                files::Column::DownloadUrl,
                files::Column::Size,
                files::Column::TeamId,
                files::Column::FileType,
                files::Column::ContentType,
                files::Column::CreatedAt,
            ])
            .to_owned();

        Ok(Files::insert(model)
            .on_conflict(on_conflict)
            .exec_with_returning(&self.db)
            .await?)
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<files::Model>> {
        Ok(Files::find_by_id(id).one(&self.db).await?)
    }

    async fn delete_by_key(&self, key: &str) -> Result<u64> {
        if key.is_empty() {
            return Err(anyhow!("empty file key provided"));
        }

        let res = Files::delete_many()
            .filter(files::Column::StorageKey.eq(key))
            .exec(&self.db)
            .await
            .map_err(|e| anyhow!("database deletion failed: {}", e))?;

        Ok(res.rows_affected)
    }

    async fn list_by_team(&self, team_id: &str) -> Result<Vec<TeamFile>> {
        let rows = Files::find()
            .select_only()
            .column(files::Column::DownloadUrl)
            .column(files::Column::FileType)
            .filter(files::Column::TeamId.eq(team_id))
            .order_by_asc(files::Column::CreatedAt)
            .into_model::<TeamFile>()
            .all(&self.db)
            .await?;

        Ok(rows)
    }
}
