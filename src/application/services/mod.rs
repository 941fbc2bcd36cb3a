//! Application services
//!
//! Concrete service implementations that orchestrate domain logic.
//! Services depend on I/O boundary traits (DatasetHub)
//! but are themselves concrete structs, not traits.

mod episodes;
mod merge;
mod versions;

pub use episodes::{DeletionReport, EpisodeService, FileOutcome};
pub use merge::{MergeService, MergeTargets};
pub use versions::VersionService;
