//! UploadOrchestrator - submits a draft memory with all of its media.
//!
//! One submission runs three steps:
//!
//! 1. Create (`POST /memories/`, first pending image inline) or update
//!    (`PUT /memories/{id}/`) the memory record. Failure aborts everything.
//! 2. Upload each remaining new asset on its own, images, then videos, then
//!    audio. A failed upload is recorded and the next one proceeds.
//! 3. Delete the existing assets the user removed. Failures are recorded,
//!    never rolled back.

use relive_core::media::{AssetId, UploadStatus};
use relive_core::memory::{AssetOutcome, DraftMemory, MemoryId, UploadReport};
use relive_core::{ReliveError, Result};
use relive_interaction::ReliveApi;

pub struct UploadOrchestrator {
    api: ReliveApi,
}

impl UploadOrchestrator {
    pub fn new(api: ReliveApi) -> Self {
        Self { api }
    }

    /// Submits `draft`, updating per-asset statuses in place.
    ///
    /// `editing_memory_id` selects update over create. When it is `None` but a
    /// previous submit of the same draft already created the memory, that
    /// memory is updated instead, so a retry only re-sends unfinished assets.
    ///
    /// # Returns
    ///
    /// - `Ok(report)`: The memory record was saved; check the report for asset failures
    /// - `Err(InvalidDraft)`: Required fields are missing, nothing was sent
    /// - `Err(MemoryPersistFailed)`: Step 1 failed, nothing else was attempted
    pub async fn submit(
        &self,
        draft: &mut DraftMemory,
        editing_memory_id: Option<MemoryId>,
    ) -> Result<UploadReport> {
        draft.validate()?;

        let mut report = match editing_memory_id.or(draft.memory_id) {
            Some(id) => self.update_record(draft, id).await?,
            None => self.create_record(draft).await?,
        };

        self.upload_assets(draft, &mut report).await;
        self.delete_assets(draft, &mut report).await;

        if report.has_failures() {
            tracing::warn!(
                "[UploadOrchestrator] Memory {} saved with {} failed upload(s) and {} failed deletion(s)",
                report.memory_id,
                report.failed_assets().len(),
                report.failed_deletions().len()
            );
        } else {
            tracing::info!(
                "[UploadOrchestrator] Memory {} saved ({} asset(s) uploaded, {} deleted)",
                report.memory_id,
                report.per_asset.len() + usize::from(report.inline_asset.is_some()),
                report.deletions.len()
            );
        }

        Ok(report)
    }

    async fn update_record(&self, draft: &mut DraftMemory, id: MemoryId) -> Result<UploadReport> {
        tracing::debug!("[UploadOrchestrator] Updating memory {}", id);
        self.api
            .update_memory(id, &draft.fields)
            .await
            .map_err(ReliveError::memory_persist_failed)?;
        Ok(UploadReport::new(id, false))
    }

    async fn create_record(&self, draft: &mut DraftMemory) -> Result<UploadReport> {
        let inline = draft.first_pending_image().cloned();
        let previous_status = inline.as_ref().map(|asset| asset.upload_status);
        if let Some(asset) = &inline {
            draft.set_status(&asset.id, UploadStatus::Uploading);
        }

        tracing::debug!(
            "[UploadOrchestrator] Creating memory (inline image: {})",
            inline.is_some()
        );
        let created = self
            .api
            .create_memory(&draft.fields, draft.patient_id, inline.as_ref())
            .await;

        let record = match created {
            Ok(record) => record,
            Err(e) => {
                if let (Some(asset), Some(status)) = (&inline, previous_status) {
                    draft.set_status(&asset.id, status);
                }
                tracing::warn!("[UploadOrchestrator] Creating memory failed: {}", e);
                return Err(ReliveError::memory_persist_failed(e));
            }
        };

        draft.memory_id = Some(record.id);
        let mut report = UploadReport::new(record.id, true);
        if let Some(asset) = inline {
            draft.set_status(&asset.id, UploadStatus::Succeeded);
            report.inline_asset = Some(asset.id);
        }
        Ok(report)
    }

    async fn upload_assets(&self, draft: &mut DraftMemory, report: &mut UploadReport) {
        for id in draft.upload_queue() {
            let Some(asset) = draft.asset(&id).cloned() else {
                continue;
            };

            draft.set_status(&id, UploadStatus::Uploading);
            let outcome = match self.api.upload_asset(report.memory_id, &asset).await {
                Ok(()) => {
                    draft.set_status(&id, UploadStatus::Succeeded);
                    AssetOutcome::succeeded()
                }
                Err(e) => {
                    let failure = ReliveError::AssetUploadFailed {
                        asset_id: id.to_string(),
                        reason: e.to_string(),
                    };
                    tracing::warn!("[UploadOrchestrator] {}", failure);
                    draft.set_status(&id, UploadStatus::Failed);
                    AssetOutcome::failed(e.to_string())
                }
            };
            report.per_asset.insert(id, outcome);
        }
    }

    async fn delete_assets(&self, draft: &mut DraftMemory, report: &mut UploadReport) {
        let requested: Vec<AssetId> = draft.deleted_existing_asset_ids.clone();
        for id in requested {
            let target = draft
                .existing_asset(&id)
                .and_then(|asset| asset.server_id.map(|server_id| (asset.kind, server_id)));
            let outcome = match target {
                None => {
                    AssetOutcome::failed(ReliveError::not_found("asset", id.as_str()).to_string())
                }
                Some((kind, server_id)) => match self.api.delete_asset(kind, server_id).await {
                    Ok(()) => {
                        draft.forget_existing(&id);
                        AssetOutcome::succeeded()
                    }
                    Err(e) => {
                        tracing::warn!(
                            "[UploadOrchestrator] Deleting {} {} failed: {}",
                            kind,
                            server_id,
                            e
                        );
                        AssetOutcome::failed(e.to_string())
                    }
                },
            };
            report.deletions.insert(id, outcome);
        }
    }
}
