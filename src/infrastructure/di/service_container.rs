//! Service container for dependency injection
//!
//! Wires up all services with their dependencies.

use std::sync::Arc;

use crate::application::services::{EpisodeService, MergeService, VersionService};
use crate::config::Settings;
use crate::infrastructure::hub::HubClient;
use crate::infrastructure::traits::{AssumeYes, Confirmer, DatasetHub, StdinConfirmer};
use crate::infrastructure::InfraResult;

/// Container holding all application services.
pub struct ServiceContainer {
    /// Application settings
    pub settings: Arc<Settings>,

    /// Remote dataset hub
    pub hub: Arc<dyn DatasetHub>,

    /// Operator confirmation
    pub confirmer: Arc<dyn Confirmer>,

    pub versions: VersionService,
    pub episodes: EpisodeService,
    pub merge: MergeService,
}

impl ServiceContainer {
    /// Create a new service container with real implementations.
    ///
    /// With `assume_yes` every confirmation is answered without prompting.
    pub fn new(settings: Settings, assume_yes: bool) -> InfraResult<Self> {
        let hub = Arc::new(HubClient::new(&settings)?);
        let confirmer: Arc<dyn Confirmer> = if assume_yes {
            Arc::new(AssumeYes)
        } else {
            Arc::new(StdinConfirmer)
        };
        Ok(Self::with_deps(settings, hub, confirmer))
    }

    /// Create a service container with custom dependencies (for testing).
    pub fn with_deps(
        settings: Settings,
        hub: Arc<dyn DatasetHub>,
        confirmer: Arc<dyn Confirmer>,
    ) -> Self {
        let settings = Arc::new(settings);

        Self {
            versions: VersionService::new(hub.clone(), settings.clone()),
            episodes: EpisodeService::new(hub.clone(), settings.clone()),
            merge: MergeService::new(hub.clone(), settings.clone()),
            settings,
            hub,
            confirmer,
        }
    }
}
