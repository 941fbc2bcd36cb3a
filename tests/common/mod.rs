//! Shared test doubles: a recording in-memory hub and a scripted confirmer.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet, VecDeque};
use std::io;
use std::sync::{Arc, Mutex};

use serde_json::json;

use hubadmin::config::Settings;
use hubadmin::domain::{Branch, Dataset, Features, RepoRefs, Row, Tag};
use hubadmin::infrastructure::di::ServiceContainer;
use hubadmin::infrastructure::traits::{Confirmer, DatasetHub};
use hubadmin::infrastructure::{HubError, HubResult};
use hubadmin::util::testing;

pub const REPO: &str = "test-org/robot-data";

/// Every hub call, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    ListRefs(String),
    ListFiles(String),
    CreateTag {
        repo: String,
        tag: String,
        message: String,
        revision: String,
    },
    DeleteTag {
        repo: String,
        tag: String,
    },
    DeleteFile {
        repo: String,
        path: String,
        message: String,
    },
    Load(String),
    Concatenate(usize),
    Push {
        repo: String,
        rows: usize,
        message: String,
    },
}

#[derive(Default)]
pub struct FakeHub {
    pub refs: RepoRefs,
    pub files: Vec<String>,
    pub datasets: HashMap<String, Dataset>,
    pub failing_deletes: HashSet<String>,
    pub fail_push: bool,
    pub fail_concatenate: bool,
    pub calls: Mutex<Vec<Call>>,
}

impl FakeHub {
    pub fn with_files(files: &[&str]) -> Self {
        Self {
            files: files.iter().map(|s| s.to_string()).collect(),
            ..Default::default()
        }
    }

    pub fn with_dataset(mut self, repo: &str, dataset: Dataset) -> Self {
        self.datasets.insert(repo.to_string(), dataset);
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn deleted_paths(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::DeleteFile { path, .. } => Some(path),
                _ => None,
            })
            .collect()
    }

    pub fn pushes(&self) -> Vec<(String, usize)> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Push { repo, rows, .. } => Some((repo, rows)),
                _ => None,
            })
            .collect()
    }

    pub fn concatenations(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, Call::Concatenate(_)))
            .count()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

impl DatasetHub for FakeHub {
    fn list_repo_refs(&self, repo: &str) -> HubResult<RepoRefs> {
        self.record(Call::ListRefs(repo.to_string()));
        Ok(self.refs.clone())
    }

    fn list_repo_files(&self, repo: &str) -> HubResult<Vec<String>> {
        self.record(Call::ListFiles(repo.to_string()));
        Ok(self.files.clone())
    }

    fn create_tag(&self, repo: &str, tag: &str, message: &str, revision: &str) -> HubResult<()> {
        self.record(Call::CreateTag {
            repo: repo.to_string(),
            tag: tag.to_string(),
            message: message.to_string(),
            revision: revision.to_string(),
        });
        if self.refs.has_tag(tag) {
            return Err(HubError::Status {
                method: "POST".into(),
                url: format!("https://hub.test/api/datasets/{repo}/tag/{revision}"),
                status: 409,
                message: "Tag already exists".into(),
            });
        }
        Ok(())
    }

    fn delete_tag(&self, repo: &str, tag: &str) -> HubResult<()> {
        self.record(Call::DeleteTag {
            repo: repo.to_string(),
            tag: tag.to_string(),
        });
        Ok(())
    }

    fn delete_file(&self, repo: &str, path: &str, commit_message: &str) -> HubResult<()> {
        self.record(Call::DeleteFile {
            repo: repo.to_string(),
            path: path.to_string(),
            message: commit_message.to_string(),
        });
        if self.failing_deletes.contains(path) {
            return Err(HubError::Rejected(format!("cannot delete {path}")));
        }
        Ok(())
    }

    fn load_dataset(&self, repo: &str) -> HubResult<Dataset> {
        self.record(Call::Load(repo.to_string()));
        self.datasets.get(repo).cloned().ok_or_else(|| HubError::Status {
            method: "GET".into(),
            url: format!("https://datasets-server.test/rows?dataset={repo}"),
            status: 404,
            message: "dataset not found".into(),
        })
    }

    fn concatenate_datasets(&self, datasets: &[Dataset]) -> HubResult<Dataset> {
        self.record(Call::Concatenate(datasets.len()));
        if self.fail_concatenate {
            return Err(HubError::Rejected("out of memory while concatenating".into()));
        }
        Dataset::concatenate(datasets).map_err(|e| HubError::Rejected(e.to_string()))
    }

    fn push_to_hub(&self, dataset: &Dataset, repo: &str, commit_message: &str) -> HubResult<()> {
        self.record(Call::Push {
            repo: repo.to_string(),
            rows: dataset.len(),
            message: commit_message.to_string(),
        });
        if self.fail_push {
            return Err(HubError::Rejected("push rejected".into()));
        }
        Ok(())
    }
}

/// Replays canned answers; answers "no" once they run out.
#[derive(Default)]
pub struct ScriptedConfirmer {
    answers: Mutex<VecDeque<bool>>,
    asked: Mutex<Vec<String>>,
}

impl ScriptedConfirmer {
    pub fn answering(answers: &[bool]) -> Self {
        Self {
            answers: Mutex::new(answers.iter().copied().collect()),
            asked: Mutex::new(Vec::new()),
        }
    }

    pub fn questions(&self) -> Vec<String> {
        self.asked.lock().unwrap().clone()
    }
}

impl Confirmer for ScriptedConfirmer {
    fn confirm(&self, question: &str) -> io::Result<bool> {
        self.asked.lock().unwrap().push(question.to_string());
        Ok(self.answers.lock().unwrap().pop_front().unwrap_or(false))
    }
}

pub fn test_settings() -> Settings {
    Settings {
        repo_id: REPO.to_string(),
        endpoint: "https://hub.test".to_string(),
        ..Default::default()
    }
}

pub fn container(hub: &Arc<FakeHub>, confirmer: &Arc<ScriptedConfirmer>) -> ServiceContainer {
    testing::init_test_setup();
    ServiceContainer::with_deps(test_settings(), hub.clone(), confirmer.clone())
}

pub fn refs(branches: &[&str], tags: &[&str]) -> RepoRefs {
    RepoRefs {
        branches: branches
            .iter()
            .map(|name| Branch {
                name: name.to_string(),
                target_commit: None,
            })
            .collect(),
        tags: tags
            .iter()
            .map(|name| Tag {
                name: name.to_string(),
                target_commit: None,
            })
            .collect(),
    }
}

/// Dataset with `rows` rows of an `index`/`action` schema.
pub fn dataset(rows: usize, action_dtype: &str) -> Dataset {
    let mut features = Features::default();
    features.insert("index", json!({"dtype": "int64", "_type": "Value"}));
    features.insert("action", json!({"dtype": action_dtype, "_type": "Value"}));
    let rows = (0..rows)
        .map(|i| {
            let mut row = Row::new();
            row.insert("index".into(), json!(i));
            row.insert("action".into(), json!(0.5));
            row
        })
        .collect();
    Dataset::new(features, rows)
}
