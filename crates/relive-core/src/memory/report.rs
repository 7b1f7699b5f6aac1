use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::model::MemoryId;
use crate::media::{AssetId, UploadStatus};

/// Final state of one asset upload or deletion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetOutcome {
    pub status: UploadStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AssetOutcome {
    pub fn succeeded() -> Self {
        Self {
            status: UploadStatus::Succeeded,
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            status: UploadStatus::Failed,
            error: Some(error.into()),
        }
    }

    pub fn is_failed(&self) -> bool {
        self.status == UploadStatus::Failed
    }
}

/// Result of one orchestrated submission.
///
/// The memory record exists on the server whenever a report is produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadReport {
    pub memory_id: MemoryId,
    /// `true` when the memory was created by this run, `false` for an update.
    pub created: bool,
    /// The image that travelled inline with the create call, if any.
    pub inline_asset: Option<AssetId>,
    /// One entry per separately uploaded asset.
    pub per_asset: BTreeMap<AssetId, AssetOutcome>,
    /// One entry per requested deletion of an existing asset.
    pub deletions: BTreeMap<AssetId, AssetOutcome>,
}

impl UploadReport {
    pub fn new(memory_id: MemoryId, created: bool) -> Self {
        Self {
            memory_id,
            created,
            inline_asset: None,
            per_asset: BTreeMap::new(),
            deletions: BTreeMap::new(),
        }
    }

    pub fn has_failures(&self) -> bool {
        self.per_asset.values().any(AssetOutcome::is_failed)
            || self.deletions.values().any(AssetOutcome::is_failed)
    }

    /// Ids of uploads that failed and can be retried.
    pub fn failed_assets(&self) -> Vec<&AssetId> {
        self.per_asset
            .iter()
            .filter(|(_, outcome)| outcome.is_failed())
            .map(|(id, _)| id)
            .collect()
    }

    pub fn failed_deletions(&self) -> Vec<&AssetId> {
        self.deletions
            .iter()
            .filter(|(_, outcome)| outcome.is_failed())
            .map(|(id, _)| id)
            .collect()
    }

    /// A short summary for the user when anything went wrong, `None` otherwise.
    pub fn warning_message(&self) -> Option<String> {
        let uploads = self.failed_assets().len();
        let deletions = self.failed_deletions().len();
        if uploads == 0 && deletions == 0 {
            return None;
        }

        let mut parts = Vec::new();
        if uploads > 0 {
            parts.push(format!(
                "{} of {} media file{} failed to upload",
                uploads,
                self.per_asset.len(),
                if self.per_asset.len() == 1 { "" } else { "s" }
            ));
        }
        if deletions > 0 {
            parts.push(format!(
                "{} media file{} could not be removed",
                deletions,
                if deletions == 1 { "" } else { "s" }
            ));
        }
        Some(format!("Memory saved, but {}.", parts.join(" and ")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_report_has_no_warning() {
        let mut report = UploadReport::new(MemoryId(1), true);
        report
            .per_asset
            .insert(AssetId::from("a"), AssetOutcome::succeeded());
        assert!(!report.has_failures());
        assert!(report.warning_message().is_none());
    }

    #[test]
    fn test_warning_lists_failures() {
        let mut report = UploadReport::new(MemoryId(1), false);
        report
            .per_asset
            .insert(AssetId::from("a"), AssetOutcome::succeeded());
        report
            .per_asset
            .insert(AssetId::from("b"), AssetOutcome::failed("500"));
        report
            .deletions
            .insert(AssetId::from("c"), AssetOutcome::failed("404"));

        assert!(report.has_failures());
        assert_eq!(report.failed_assets(), vec![&AssetId::from("b")]);
        assert_eq!(
            report.warning_message().unwrap(),
            "Memory saved, but 1 of 2 media files failed to upload and 1 media file could not be removed."
        );
    }
}
