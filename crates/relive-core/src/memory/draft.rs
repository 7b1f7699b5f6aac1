use chrono::NaiveDate;

use super::model::{MemoryDetail, MemoryFields, MemoryId};
use crate::error::{ReliveError, Result};
use crate::media::{AssetId, AssetKind, AssetOrigin, MediaAsset, UploadStatus};

/// The in-progress edit of a memory before submission.
///
/// Owned by the editing UI for the lifetime of the edit; the upload
/// orchestrator borrows it mutably to record per-asset progress.
#[derive(Debug, Clone, Default)]
pub struct DraftMemory {
    /// Server id once the memory exists, either because an existing memory is
    /// being edited or because a previous submit created it.
    pub memory_id: Option<MemoryId>,
    pub fields: MemoryFields,
    /// Assets added in this edit, in insertion order.
    pub new_assets: Vec<MediaAsset>,
    /// Assets already attached on the server.
    pub existing_assets: Vec<MediaAsset>,
    /// Existing assets the user removed, in the order they were removed.
    pub deleted_existing_asset_ids: Vec<AssetId>,
    /// Patient the memory is created for when a family member submits it.
    /// Only sent on creation.
    pub patient_id: Option<u64>,
}

impl DraftMemory {
    pub fn new(fields: MemoryFields) -> Self {
        Self {
            fields,
            ..Self::default()
        }
    }

    /// Starts editing a memory that already exists.
    pub fn from_detail(detail: &MemoryDetail) -> Self {
        Self {
            memory_id: Some(detail.id),
            fields: detail.fields(),
            existing_assets: detail.existing_assets(),
            ..Self::default()
        }
    }

    /// Queues a local asset for upload and returns its id.
    pub fn add_asset(&mut self, asset: MediaAsset) -> Result<AssetId> {
        if asset.origin == AssetOrigin::ExistingRemote {
            return Err(ReliveError::InvalidDraft(
                "existing remote assets cannot be queued for upload".to_string(),
            ));
        }
        let id = asset.id.clone();
        self.new_assets.push(asset);
        Ok(id)
    }

    /// Removes a queued asset. Dropping the returned value releases its preview.
    pub fn remove_asset(&mut self, id: &AssetId) -> Option<MediaAsset> {
        let index = self.new_assets.iter().position(|a| &a.id == id)?;
        Some(self.new_assets.remove(index))
    }

    pub fn asset(&self, id: &AssetId) -> Option<&MediaAsset> {
        self.new_assets.iter().find(|a| &a.id == id)
    }

    pub fn asset_mut(&mut self, id: &AssetId) -> Option<&mut MediaAsset> {
        self.new_assets.iter_mut().find(|a| &a.id == id)
    }

    pub fn set_status(&mut self, id: &AssetId, status: UploadStatus) {
        if let Some(asset) = self.asset_mut(id) {
            asset.upload_status = status;
        }
    }

    /// Marks an existing asset for deletion on the next submit.
    pub fn mark_for_deletion(&mut self, id: &AssetId) -> Result<()> {
        if self.existing_asset(id).is_none() {
            return Err(ReliveError::not_found("asset", id.as_str()));
        }
        if !self.deleted_existing_asset_ids.contains(id) {
            self.deleted_existing_asset_ids.push(id.clone());
        }
        Ok(())
    }

    pub fn unmark_for_deletion(&mut self, id: &AssetId) {
        self.deleted_existing_asset_ids.retain(|d| d != id);
    }

    /// An asset already attached on the server. Its kind and server id route
    /// the deletion request.
    pub fn existing_asset(&self, id: &AssetId) -> Option<&MediaAsset> {
        self.existing_assets.iter().find(|a| &a.id == id)
    }

    /// Forgets an existing asset after the server confirmed its deletion.
    pub fn forget_existing(&mut self, id: &AssetId) {
        self.existing_assets.retain(|a| &a.id != id);
        self.deleted_existing_asset_ids.retain(|d| d != id);
    }

    /// The first new image that still has to be sent.
    pub fn first_pending_image(&self) -> Option<&MediaAsset> {
        self.new_assets
            .iter()
            .find(|a| a.kind == AssetKind::Image && a.needs_upload())
    }

    /// Ids of new assets still to upload, images first, then videos, then audio.
    pub fn upload_queue(&self) -> Vec<AssetId> {
        AssetKind::UPLOAD_ORDER
            .iter()
            .flat_map(|kind| {
                self.new_assets
                    .iter()
                    .filter(move |a| a.kind == *kind && a.needs_upload())
                    .map(|a| a.id.clone())
            })
            .collect()
    }

    /// Checks that the scalar fields can be submitted.
    pub fn validate(&self) -> Result<()> {
        if self.fields.title.trim().is_empty() {
            return Err(ReliveError::InvalidDraft("title is required".to_string()));
        }
        let date = self.fields.date.trim();
        if date.is_empty() {
            return Err(ReliveError::InvalidDraft("date is required".to_string()));
        }
        NaiveDate::parse_from_str(date, "%Y-%m-%d").map_err(|_| {
            ReliveError::InvalidDraft(format!("date '{}' is not in YYYY-MM-DD form", date))
        })?;
        Ok(())
    }

    /// Ends the edit, releasing every preview held by the draft.
    pub fn discard(self) {
        drop(self);
    }
}
