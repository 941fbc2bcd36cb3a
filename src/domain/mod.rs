//! Domain layer: entities and business logic
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod dataset;
pub mod entities;
pub mod episode;
pub mod error;

pub use dataset::{Dataset, Features, MergePlan, Row, SchemaDiff};
pub use entities::*;
pub use episode::{
    format_indices, summarize_episodes, DeletionPlan, EpisodeFiles, EpisodeIndex, EpisodeMarker,
    EpisodeSelection, EpisodeSummary,
};
pub use error::{DomainError, DomainResult};
