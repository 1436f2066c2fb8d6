use crate::services::storage::StorageService;
use anyhow::{Context, Result};
use std::fs::File;
use std::io::{Seek, SeekFrom};
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio_util::io::SyncIoBridge;
use zip::ZipWriter;
use zip::write::FileOptions;

/// Writes every object in the bucket into a ZIP archive, one entry per key.
///
/// The archive lives in an anonymous temp file that the OS reclaims once the
/// returned handle is dropped. The handle is rewound to the start.
///
/// Object bodies are copied chunk by chunk into their entries on a blocking
/// thread, so neither a whole object nor the zip I/O sits on the runtime.
pub async fn archive_bucket(storage: Arc<dyn StorageService>) -> Result<(File, usize)> {
    let keys = storage.list_objects("").await?;
    let handle = Handle::current();

    let (file, count) = tokio::task::spawn_blocking(move || write_archive(&handle, storage, &keys))
        .await
        .context("backup task did not complete")??;

    tracing::info!("🗜️  Bucket backup archived {} objects", count);
    Ok((file, count))
}

fn write_archive(
    handle: &Handle,
    storage: Arc<dyn StorageService>,
    keys: &[String],
) -> Result<(File, usize)> {
    let temp = tempfile::tempfile().context("failed to create backup temp file")?;

    let mut zip = ZipWriter::new(temp);
    let options = FileOptions::default()
        .compression_method(zip::CompressionMethod::Deflated)
        .large_file(true);

    for key in keys {
        let reader = handle
            .block_on(storage.open_object(key))
            .with_context(|| format!("failed to get object {}", key))?;

        zip.start_file(key.as_str(), options)
            .with_context(|| format!("failed to create zip entry {}", key))?;

        let mut body = SyncIoBridge::new_with_handle(reader, handle.clone());
        std::io::copy(&mut body, &mut zip)
            .with_context(|| format!("failed to write {} to zip", key))?;
    }

    let mut file = zip.finish().context("failed to finalize zip")?;
    file.seek(SeekFrom::Start(0))?;

    Ok((file, keys.len()))
}
