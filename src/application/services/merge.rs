//! Merging two dataset repositories.
//!
//! The steps are exposed separately so the caller can report progress and
//! ask for confirmation between them. A failure in any step aborts the rest;
//! earlier steps are not undone.

use std::sync::Arc;

use tracing::{info, instrument};

use crate::application::{ApplicationResult, HubResultExt};
use crate::config::Settings;
use crate::domain::{Dataset, DomainResult, MergePlan};
use crate::infrastructure::traits::DatasetHub;

/// Source, target and output repositories of a merge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeTargets {
    pub source: String,
    pub target: String,
    pub output: String,
}

pub struct MergeService {
    hub: Arc<dyn DatasetHub>,
    settings: Arc<Settings>,
}

impl MergeService {
    pub fn new(hub: Arc<dyn DatasetHub>, settings: Arc<Settings>) -> Self {
        Self { hub, settings }
    }

    /// Target defaults to the configured repository, output to the target.
    pub fn resolve(
        &self,
        source: &str,
        target: Option<&str>,
        output: Option<&str>,
    ) -> MergeTargets {
        let target = target.unwrap_or(&self.settings.repo_id).to_string();
        let output = output.map(String::from).unwrap_or_else(|| target.clone());
        MergeTargets {
            source: source.to_string(),
            target,
            output,
        }
    }

    #[instrument(skip(self))]
    pub fn load(&self, repo: &str) -> ApplicationResult<Dataset> {
        self.hub
            .load_dataset(repo)
            .context(|| format!("load dataset {repo}"))
    }

    /// Both datasets must have identical features.
    pub fn check_schemas(&self, target: &Dataset, source: &Dataset) -> DomainResult<()> {
        target.ensure_same_schema(source)
    }

    pub fn plan(&self, targets: &MergeTargets, target: &Dataset, source: &Dataset) -> MergePlan {
        MergePlan {
            source: targets.source.clone(),
            target: targets.target.clone(),
            output: targets.output.clone(),
            source_rows: source.len(),
            target_rows: target.len(),
        }
    }

    /// Target rows first, then source rows.
    #[instrument(skip_all)]
    pub fn concatenate(&self, target: Dataset, source: Dataset) -> ApplicationResult<Dataset> {
        self.hub
            .concatenate_datasets(&[target, source])
            .context(|| "merge datasets".to_string())
    }

    #[instrument(skip(self, merged), fields(rows = merged.len()))]
    pub fn push(&self, merged: &Dataset, plan: &MergePlan) -> ApplicationResult<()> {
        self.hub
            .push_to_hub(merged, &plan.output, &plan.commit_message())
            .context(|| format!("push merged dataset to {}", plan.output))?;
        info!(output = %plan.output, "merge pushed");
        Ok(())
    }
}
