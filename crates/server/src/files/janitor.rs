//! Sweep of expired temporary files.

use super::error::FileResult;
use super::storage::{FileStorage, StoredFile};
use crate::metrics;
use quizvault_core::{ARCHIVER_COMPONENT, FileArea, parse_temp_expiry};
use serde::Serialize;
use std::sync::Arc;

/// Outcome of one sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SweepStats {
    pub files_scanned: u64,
    pub files_deleted: u64,
    pub bytes_reclaimed: u64,
    pub errors: u64,
}

/// Deletes temp files whose embedded expiry has passed.
pub struct TempFileJanitor {
    files: Arc<FileStorage>,
    batch_size: u32,
}

impl TempFileJanitor {
    pub fn new(files: Arc<FileStorage>, batch_size: u32) -> Self {
        Self {
            files,
            batch_size: batch_size.max(1),
        }
    }

    /// Run one sweep.
    ///
    /// The current time and the highest file id are captured once up front;
    /// temp files created after that are left for the next sweep. Per-file
    /// failures are counted and do not stop the sweep.
    pub async fn sweep(&self) -> FileResult<SweepStats> {
        let now = self.files.clock().unix_timestamp();
        let watermark = self.files.metadata().max_file_id().await?;
        self.sweep_bounded(now, watermark).await
    }

    /// Sweep temp files with id `<= watermark` whose expiry is `<= now`.
    pub async fn sweep_bounded(&self, now: i64, watermark: i64) -> FileResult<SweepStats> {
        let timer = metrics::JANITOR_SWEEP_DURATION.start_timer();
        let result = self.sweep_batches(now, watermark).await;
        timer.observe_duration();

        match &result {
            Ok(stats) => {
                metrics::JANITOR_SWEEPS.with_label_values(&["completed"]).inc();
                metrics::JANITOR_FILES_DELETED.inc_by(stats.files_deleted);
                metrics::JANITOR_BYTES_RECLAIMED.inc_by(stats.bytes_reclaimed);
                metrics::JANITOR_ERRORS.inc_by(stats.errors);
            }
            Err(_) => {
                metrics::JANITOR_SWEEPS.with_label_values(&["failed"]).inc();
            }
        }
        result
    }

    async fn sweep_batches(&self, now: i64, watermark: i64) -> FileResult<SweepStats> {
        let mut stats = SweepStats::default();
        let mut after_id = 0;

        tracing::debug!(now, watermark, "Starting temp file sweep");

        loop {
            let batch = self
                .files
                .metadata()
                .list_files_in_id_range(
                    ARCHIVER_COMPONENT,
                    FileArea::Temp.as_str(),
                    after_id,
                    watermark,
                    self.batch_size,
                )
                .await?;
            let Some(last) = batch.last() else {
                break;
            };
            after_id = last.id;

            for row in batch {
                stats.files_scanned += 1;

                let expiry = match parse_temp_expiry(&row.file_path) {
                    Ok(expiry) => expiry,
                    Err(e) => {
                        tracing::warn!(
                            file_id = row.id,
                            error = %e,
                            "Unparsable temp file expiry, treating as expired"
                        );
                        0
                    }
                };
                if expiry > now {
                    continue;
                }

                let file = match StoredFile::try_from(row) {
                    Ok(file) => file,
                    Err(e) => {
                        tracing::warn!(error = %e, "Skipping unreadable temp file record");
                        stats.errors += 1;
                        continue;
                    }
                };

                match self.files.delete_file(&file).await {
                    Ok(true) => {
                        stats.files_deleted += 1;
                        stats.bytes_reclaimed += file.size();
                    }
                    // Removed concurrently by someone else
                    Ok(false) => {}
                    Err(e) => {
                        tracing::warn!(
                            file_id = file.id(),
                            error = %e,
                            "Failed to delete expired temp file"
                        );
                        stats.errors += 1;
                    }
                }
            }
        }

        tracing::info!(
            files_scanned = stats.files_scanned,
            files_deleted = stats.files_deleted,
            bytes_reclaimed = stats.bytes_reclaimed,
            errors = stats.errors,
            "Temp file sweep finished"
        );

        Ok(stats)
    }
}
