//! Branch and tag administration.

use std::sync::Arc;

use tracing::{debug, instrument};

use crate::application::{ApplicationResult, HubResultExt};
use crate::config::Settings;
use crate::domain::RepoRefs;
use crate::infrastructure::traits::DatasetHub;

/// Lists references and creates/deletes tags on the configured repository.
pub struct VersionService {
    hub: Arc<dyn DatasetHub>,
    settings: Arc<Settings>,
}

impl VersionService {
    pub fn new(hub: Arc<dyn DatasetHub>, settings: Arc<Settings>) -> Self {
        Self { hub, settings }
    }

    pub fn repo(&self) -> &str {
        &self.settings.repo_id
    }

    /// Branches then tags, in hub order.
    #[instrument(skip(self))]
    pub fn list_versions(&self) -> ApplicationResult<RepoRefs> {
        let refs = self
            .hub
            .list_repo_refs(self.repo())
            .context(|| format!("list refs of {}", self.repo()))?;
        debug!(
            branches = refs.branches.len(),
            tags = refs.tags.len(),
            "listed refs"
        );
        Ok(refs)
    }

    /// Tag the current head of the configured revision.
    #[instrument(skip(self))]
    pub fn create_tag(&self, name: &str, message: &str) -> ApplicationResult<()> {
        self.hub
            .create_tag(self.repo(), name, message, &self.settings.revision)
            .context(|| format!("create tag '{}' on {}", name, self.repo()))
    }

    #[instrument(skip(self))]
    pub fn delete_tag(&self, name: &str) -> ApplicationResult<()> {
        self.hub
            .delete_tag(self.repo(), name)
            .context(|| format!("delete tag '{}' on {}", name, self.repo()))
    }
}
