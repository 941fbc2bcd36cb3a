//! Episode naming convention and file selection.
//!
//! An episode is not stored anywhere; it is inferred from file names. Every
//! file of episode `i` carries the marker `episode_{i:06}` somewhere in its
//! path, e.g.:
//!
//! ```text
//! data/chunk-000/episode_000003.parquet
//! videos/chunk-000/observation.images.wrist/episode_000003.mp4
//! ```

use std::fmt;
use std::str::FromStr;

use itertools::Itertools;
use tracing::warn;

use crate::domain::error::{DomainError, DomainResult};

/// Prefix shared by every episode marker.
pub const EPISODE_PREFIX: &str = "episode_";

/// Extension of the tabular file each episode owns exactly one of.
pub const TABULAR_EXTENSION: &str = ".parquet";

/// Width of the zero-padded index field.
pub const INDEX_WIDTH: usize = 6;

/// Index of an episode within a dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EpisodeIndex(pub u64);

impl EpisodeIndex {
    pub fn marker(self) -> EpisodeMarker {
        EpisodeMarker::new(self)
    }
}

impl fmt::Display for EpisodeIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for EpisodeIndex {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl FromStr for EpisodeIndex {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        trimmed
            .parse::<u64>()
            .map(EpisodeIndex)
            .map_err(|_| DomainError::InvalidEpisodeIndex {
                value: trimmed.to_string(),
            })
    }
}

/// The `episode_XXXXXX` token identifying an episode's files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EpisodeMarker {
    token: String,
}

impl EpisodeMarker {
    pub fn new(index: EpisodeIndex) -> Self {
        Self {
            token: format!("{}{:0width$}", EPISODE_PREFIX, index.0, width = INDEX_WIDTH),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.token
    }

    /// True if `path` contains the full marker token.
    ///
    /// The token must not be followed by another digit, so `episode_100000`
    /// does not match `episode_1000000.parquet`.
    pub fn matches(&self, path: &str) -> bool {
        path.match_indices(self.token.as_str()).any(|(pos, _)| {
            !path[pos + self.token.len()..]
                .chars()
                .next()
                .is_some_and(|c| c.is_ascii_digit())
        })
    }
}

impl fmt::Display for EpisodeMarker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.token)
    }
}

/// Comma-separated episode list as given on the command line (`5,10,15`).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EpisodeSelection(pub Vec<EpisodeIndex>);

impl EpisodeSelection {
    pub fn indices(&self) -> &[EpisodeIndex] {
        &self.0
    }
}

impl FromStr for EpisodeSelection {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().is_empty() {
            return Ok(Self::default());
        }
        s.split(',')
            .map(EpisodeIndex::from_str)
            .collect::<DomainResult<Vec<_>>>()
            .map(Self)
    }
}

impl From<Vec<u64>> for EpisodeSelection {
    fn from(values: Vec<u64>) -> Self {
        Self(values.into_iter().map(EpisodeIndex).collect())
    }
}

/// Render indices the way commit messages and warnings show them: `[3, 7]`.
pub fn format_indices(indices: &[EpisodeIndex]) -> String {
    format!("[{}]", indices.iter().join(", "))
}

/// Extract the episode index from a tabular file name.
///
/// The number runs from the first `episode_` to the next `.`. Returns `None`
/// for anything that is not a `.parquet` file carrying the episode prefix,
/// or whose embedded number does not parse.
pub fn tabular_episode_index(path: &str) -> Option<EpisodeIndex> {
    if !path.ends_with(TABULAR_EXTENSION) {
        return None;
    }
    let (_, rest) = path.split_once(EPISODE_PREFIX)?;
    let digits = rest.split('.').next().unwrap_or_default();
    match digits.parse::<u64>() {
        Ok(n) => Some(EpisodeIndex(n)),
        Err(_) => {
            warn!(path, "skipping tabular file with unparsable episode number");
            None
        }
    }
}

/// Every listed path belonging to `index`, in listing order.
pub fn files_for_episode<'a>(files: &'a [String], index: EpisodeIndex) -> Vec<&'a str> {
    let marker = index.marker();
    files
        .iter()
        .map(String::as_str)
        .filter(|f| marker.matches(f))
        .collect()
}

/// One row of the `list-episodes` report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EpisodeSummary {
    pub index: EpisodeIndex,
    pub file_count: usize,
}

impl EpisodeSummary {
    /// Files beyond the single tabular file.
    pub fn media_count(&self) -> usize {
        self.file_count.saturating_sub(1)
    }
}

/// Distinct episodes found in a listing, ascending, with their file counts.
pub fn summarize_episodes(files: &[String]) -> Vec<EpisodeSummary> {
    files
        .iter()
        .filter_map(|f| tabular_episode_index(f))
        .sorted()
        .dedup()
        .map(|index| EpisodeSummary {
            index,
            file_count: files_for_episode(files, index).len(),
        })
        .collect()
}

/// Files of one requested episode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EpisodeFiles {
    pub index: EpisodeIndex,
    pub files: Vec<String>,
}

/// What `delete-episodes` is about to remove.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DeletionPlan {
    /// Requested indices, duplicates removed, request order kept
    pub indices: Vec<EpisodeIndex>,
    /// Per-episode breakdown, same order as `indices`
    pub groups: Vec<EpisodeFiles>,
    /// Union of all group files, first occurrence order
    pub files: Vec<String>,
}

impl DeletionPlan {
    pub fn build(files: &[String], requested: &[EpisodeIndex]) -> Self {
        let indices: Vec<EpisodeIndex> = requested.iter().copied().unique().collect();

        let groups: Vec<EpisodeFiles> = indices
            .iter()
            .map(|&index| EpisodeFiles {
                index,
                files: files_for_episode(files, index)
                    .into_iter()
                    .map(String::from)
                    .collect(),
            })
            .collect();

        let union = groups
            .iter()
            .flat_map(|g| g.files.iter().cloned())
            .unique()
            .collect();

        Self {
            indices,
            groups,
            files: union,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    pub fn commit_message(&self) -> String {
        format!("Delete episodes {}", format_indices(&self.indices))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listing(paths: &[&str]) -> Vec<String> {
        paths.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn given_index_when_marker_then_zero_padded() {
        assert_eq!(EpisodeIndex(3).marker().as_str(), "episode_000003");
        assert_eq!(EpisodeIndex(123456).marker().as_str(), "episode_123456");
        assert_eq!(EpisodeIndex(1234567).marker().as_str(), "episode_1234567");
    }

    #[test]
    fn given_marker_followed_by_digit_when_matching_then_rejects() {
        let marker = EpisodeIndex(100000).marker();
        assert!(marker.matches("data/episode_100000.parquet"));
        assert!(marker.matches("videos/cam/episode_100000_cam1.mp4"));
        assert!(!marker.matches("data/episode_1000000.parquet"));
    }

    #[test]
    fn given_marker_at_end_of_path_when_matching_then_accepts() {
        assert!(EpisodeIndex(7).marker().matches("meta/episode_000007"));
    }

    #[test]
    fn given_nested_tabular_path_when_extracting_then_returns_index() {
        assert_eq!(
            tabular_episode_index("data/chunk-000/episode_000042.parquet"),
            Some(EpisodeIndex(42))
        );
        assert_eq!(tabular_episode_index("videos/episode_000042.mp4"), None);
        assert_eq!(tabular_episode_index("data/train.parquet"), None);
        assert_eq!(tabular_episode_index("data/episode_x.parquet"), None);
    }

    #[test]
    fn given_prefix_twice_in_path_when_extracting_then_first_occurrence_wins() {
        assert_eq!(
            tabular_episode_index("episode_000001_of_episode_000002.parquet"),
            None
        );
        assert_eq!(
            tabular_episode_index("data/episode_000005.episode_000009.parquet"),
            Some(EpisodeIndex(5))
        );
    }

    #[test]
    fn given_selection_with_whitespace_when_parsing_then_trims() {
        let sel: EpisodeSelection = "5, 10 ,15".parse().unwrap();
        assert_eq!(sel, EpisodeSelection::from(vec![5, 10, 15]));
    }

    #[test]
    fn given_invalid_selection_when_parsing_then_errors() {
        let err = "a,1".parse::<EpisodeSelection>().unwrap_err();
        assert_eq!(
            err,
            DomainError::InvalidEpisodeIndex {
                value: "a".to_string()
            }
        );
        assert!("-1".parse::<EpisodeSelection>().is_err());
        assert!("1,,2".parse::<EpisodeSelection>().is_err());
    }

    #[test]
    fn given_duplicate_requests_when_planning_then_files_listed_once() {
        let files = listing(&["episode_000001.parquet", "episode_000001_cam.mp4"]);
        let plan = DeletionPlan::build(&files, &[EpisodeIndex(1), EpisodeIndex(1)]);
        assert_eq!(plan.indices, vec![EpisodeIndex(1)]);
        assert_eq!(plan.file_count(), 2);
        assert_eq!(plan.commit_message(), "Delete episodes [1]");
    }

    #[test]
    fn given_listing_when_summarizing_then_counts_all_related_files() {
        let files = listing(&[
            "data/episode_000002.parquet",
            "videos/a/episode_000002.mp4",
            "videos/b/episode_000002.mp4",
            "data/episode_000000.parquet",
            "README.md",
        ]);
        let summary = summarize_episodes(&files);
        assert_eq!(summary.len(), 2);
        assert_eq!(summary[0].index, EpisodeIndex(0));
        assert_eq!(summary[0].file_count, 1);
        assert_eq!(summary[1].file_count, 3);
        assert_eq!(summary[1].media_count(), 2);
    }
}
