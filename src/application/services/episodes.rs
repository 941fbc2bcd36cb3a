//! Episode listing and deletion
//!
//! Deletion is a best-effort sequential batch: every file is deleted in its
//! own call, a failure is recorded and the remaining files are still tried.
//! Nothing is rolled back.

use std::sync::Arc;

use tracing::{debug, instrument, warn};

use crate::application::{ApplicationResult, HubResultExt};
use crate::config::Settings;
use crate::domain::{summarize_episodes, DeletionPlan, EpisodeIndex, EpisodeSummary};
use crate::infrastructure::traits::DatasetHub;
use crate::infrastructure::HubError;

/// Result of deleting one file.
#[derive(Debug)]
pub struct FileOutcome {
    pub path: String,
    pub error: Option<HubError>,
}

impl FileOutcome {
    pub fn is_deleted(&self) -> bool {
        self.error.is_none()
    }
}

/// Per-file results of a deletion batch, in deletion order.
#[derive(Debug, Default)]
pub struct DeletionReport {
    pub outcomes: Vec<FileOutcome>,
}

impl DeletionReport {
    pub fn deleted(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_deleted()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.deleted()
    }
}

/// Episode operations on the configured repository.
pub struct EpisodeService {
    hub: Arc<dyn DatasetHub>,
    settings: Arc<Settings>,
}

impl EpisodeService {
    pub fn new(hub: Arc<dyn DatasetHub>, settings: Arc<Settings>) -> Self {
        Self { hub, settings }
    }

    pub fn repo(&self) -> &str {
        &self.settings.repo_id
    }

    fn list_files(&self) -> ApplicationResult<Vec<String>> {
        self.hub
            .list_repo_files(self.repo())
            .context(|| format!("list files of {}", self.repo()))
    }

    /// Episodes present in the repository, ascending, with file counts.
    #[instrument(skip(self))]
    pub fn list_episodes(&self) -> ApplicationResult<Vec<EpisodeSummary>> {
        let files = self.list_files()?;
        let episodes = summarize_episodes(&files);
        debug!(
            files = files.len(),
            episodes = episodes.len(),
            "summarized episodes"
        );
        Ok(episodes)
    }

    /// Resolve the files that deleting `indices` would remove.
    #[instrument(skip(self))]
    pub fn plan_deletion(&self, indices: &[EpisodeIndex]) -> ApplicationResult<DeletionPlan> {
        if indices.is_empty() {
            return Ok(DeletionPlan::default());
        }
        let files = self.list_files()?;
        Ok(DeletionPlan::build(&files, indices))
    }

    /// Delete every planned file, reporting each outcome to `on_file` as it happens.
    #[instrument(skip(self, plan, on_file), fields(files = plan.file_count()))]
    pub fn delete_planned<F>(&self, plan: &DeletionPlan, mut on_file: F) -> DeletionReport
    where
        F: FnMut(&FileOutcome),
    {
        let message = plan.commit_message();
        let mut report = DeletionReport::default();

        for path in &plan.files {
            let error = self.hub.delete_file(self.repo(), path, &message).err();
            if let Some(e) = &error {
                warn!(path = %path, error = %e, "failed to delete file");
            }
            let outcome = FileOutcome {
                path: path.clone(),
                error,
            };
            on_file(&outcome);
            report.outcomes.push(outcome);
        }

        report
    }
}
