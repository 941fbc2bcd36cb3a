//! I/O boundary traits for testability
//!
//! These traits abstract the remote hub and the interactive operator,
//! allowing services and commands to be tested with fake implementations.

use std::io::{self, BufRead, Write};

use colored::Colorize;
use tracing::debug;

use crate::domain::{Dataset, RepoRefs};
use crate::infrastructure::error::{HubError, HubResult};

/// Remote versioned dataset storage.
///
/// Every call is blocking. `repo` is a repository id such as `org/name`.
pub trait DatasetHub: Send + Sync {
    /// Branches and tags of the repository.
    fn list_repo_refs(&self, repo: &str) -> HubResult<RepoRefs>;

    /// Every file path in the repository at the configured revision.
    fn list_repo_files(&self, repo: &str) -> HubResult<Vec<String>>;

    /// Create `tag` pointing at the head of `revision`.
    fn create_tag(&self, repo: &str, tag: &str, message: &str, revision: &str) -> HubResult<()>;

    /// Delete `tag`.
    fn delete_tag(&self, repo: &str, tag: &str) -> HubResult<()>;

    /// Delete one file in its own commit.
    fn delete_file(&self, repo: &str, path: &str, commit_message: &str) -> HubResult<()>;

    /// Load the configured split of a dataset fully into memory.
    fn load_dataset(&self, repo: &str) -> HubResult<Dataset>;

    /// Concatenate datasets, keeping row order. Schemas must be identical.
    fn concatenate_datasets(&self, datasets: &[Dataset]) -> HubResult<Dataset> {
        Dataset::concatenate(datasets).map_err(|e| HubError::Rejected(e.to_string()))
    }

    /// Upload `dataset` as the content of `repo`, creating it if needed.
    fn push_to_hub(&self, dataset: &Dataset, repo: &str, commit_message: &str) -> HubResult<()>;
}

/// Interactive yes/no confirmation.
pub trait Confirmer: Send + Sync {
    /// Ask `question`; `Ok(true)` only on an affirmative answer.
    fn confirm(&self, question: &str) -> io::Result<bool>;
}

/// Only `yes` (any case, surrounding whitespace ignored) is affirmative.
pub fn is_affirmative(answer: &str) -> bool {
    answer.trim().eq_ignore_ascii_case("yes")
}

// ============================================================
// REAL IMPLEMENTATIONS
// ============================================================

/// Reads the answer from stdin.
#[derive(Debug, Default)]
pub struct StdinConfirmer;

impl Confirmer for StdinConfirmer {
    fn confirm(&self, question: &str) -> io::Result<bool> {
        print!("{} ", format!("{question} (yes/no):").cyan());
        io::stdout().flush()?;

        let mut answer = String::new();
        io::stdin().lock().read_line(&mut answer)?;
        Ok(is_affirmative(&answer))
    }
}

/// Answers every question with yes (`--yes`).
#[derive(Debug, Default)]
pub struct AssumeYes;

impl Confirmer for AssumeYes {
    fn confirm(&self, question: &str) -> io::Result<bool> {
        debug!(question, "assuming yes");
        Ok(true)
    }
}
