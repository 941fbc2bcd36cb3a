//! Domain entities: repository references

use serde::{Deserialize, Serialize};

/// Mutable named reference into repository history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Branch {
    pub name: String,
    /// Commit the branch currently points at
    #[serde(default, rename = "targetCommit")]
    pub target_commit: Option<String>,
}

/// Immutable named snapshot reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub name: String,
    #[serde(default, rename = "targetCommit")]
    pub target_commit: Option<String>,
}

/// Branches and tags of a repository, in the order the hub returned them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoRefs {
    #[serde(default)]
    pub branches: Vec<Branch>,
    #[serde(default)]
    pub tags: Vec<Tag>,
}

impl RepoRefs {
    pub fn branch_names(&self) -> impl Iterator<Item = &str> {
        self.branches.iter().map(|b| b.name.as_str())
    }

    pub fn tag_names(&self) -> impl Iterator<Item = &str> {
        self.tags.iter().map(|t| t.name.as_str())
    }

    pub fn has_tag(&self, name: &str) -> bool {
        self.tags.iter().any(|t| t.name == name)
    }
}

/// Expand environment variables in a path string.
///
/// Supports `$VAR`, `${VAR}` and `~` for the home directory.
pub fn expand_env_vars(path: &str) -> String {
    shellexpand::full(path)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| path.to_string())
}
