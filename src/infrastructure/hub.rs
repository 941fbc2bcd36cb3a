//! HTTP implementation of [`DatasetHub`] against the Hugging Face hub API.
//!
//! Repository operations go to `{endpoint}/api/datasets/{repo}/...`; dataset
//! rows are read through the datasets-server `/rows` endpoint.

use std::time::Duration;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use itertools::Itertools;
use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::header::{CONTENT_TYPE, LINK};
use reqwest::{StatusCode, Url};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, info};

use crate::config::Settings;
use crate::domain::{Dataset, Features, RepoRefs, Row};
use crate::infrastructure::error::{HubError, HubResult, InfraError, InfraResult};
use crate::infrastructure::traits::DatasetHub;

/// Maximum page size accepted by the datasets-server `/rows` endpoint.
const ROWS_PAGE_SIZE: usize = 100;

const NDJSON: &str = "application/x-ndjson";

/// Blocking hub client.
pub struct HubClient {
    client: Client,
    endpoint: Url,
    datasets_server: Url,
    token: Option<String>,
    revision: String,
    config_name: String,
    split: String,
}

#[derive(Debug, Deserialize)]
struct TreeEntry {
    #[serde(rename = "type")]
    kind: String,
    path: String,
}

#[derive(Debug, Deserialize)]
struct RowsPage {
    #[serde(default)]
    features: Vec<RowsFeature>,
    #[serde(default)]
    rows: Vec<RowsEntry>,
    num_rows_total: Option<usize>,
    /// Set when the server only indexed part of the split
    #[serde(default)]
    partial: bool,
}

#[derive(Debug, Deserialize)]
struct RowsFeature {
    name: String,
    #[serde(rename = "type")]
    dtype: Value,
}

#[derive(Debug, Deserialize)]
struct RowsEntry {
    row: Row,
    /// Columns whose value the server cut short
    #[serde(default)]
    truncated_cells: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

/// Accumulates `/rows` pages into one complete split.
///
/// Any page the server marks as partial or truncated fails the whole load.
#[derive(Debug, Default)]
struct RowsCollector {
    features: Features,
    rows: Vec<Row>,
    total: Option<usize>,
}

impl RowsCollector {
    fn offset(&self) -> usize {
        self.rows.len()
    }

    /// Absorb one page; `Ok(true)` once every row of the split is collected.
    fn absorb(&mut self, repo: &str, page: RowsPage) -> HubResult<bool> {
        if page.partial {
            return Err(HubError::Rejected(format!(
                "datasets-server only covers part of {repo}; refusing to load an incomplete dataset"
            )));
        }

        let truncated = page
            .rows
            .iter()
            .flat_map(|r| r.truncated_cells.iter().map(String::as_str))
            .unique()
            .join(", ");
        if !truncated.is_empty() {
            return Err(HubError::Rejected(format!(
                "dataset rows of {repo} truncated by datasets-server (columns: {truncated})"
            )));
        }

        let total = match (page.num_rows_total, self.total) {
            (None, _) if page.rows.is_empty() => return Ok(true),
            (None, _) => {
                return Err(HubError::Rejected(format!(
                    "datasets-server reply for {repo} has no num_rows_total"
                )))
            }
            (Some(total), Some(known)) if total != known => {
                return Err(HubError::Rejected(format!(
                    "{repo} changed while loading: {known} rows, now {total}"
                )))
            }
            (Some(total), _) => total,
        };

        if self.total.is_none() {
            for f in page.features {
                self.features.insert(f.name, f.dtype);
            }
            self.total = Some(total);
        }

        let fetched = page.rows.len();
        self.rows.extend(page.rows.into_iter().map(|r| r.row));
        if self.rows.len() >= total {
            return Ok(true);
        }
        if fetched == 0 {
            return Err(HubError::Rejected(format!(
                "datasets-server returned {} of {total} rows of {repo}",
                self.rows.len()
            )));
        }
        Ok(false)
    }

    fn finish(self) -> Dataset {
        Dataset::new(self.features, self.rows)
    }
}

impl HubClient {
    pub fn new(settings: &Settings) -> InfraResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .user_agent(user_agent())
            .build()
            .map_err(|e| InfraError::Client {
                message: e.to_string(),
            })?;

        Ok(Self {
            client,
            endpoint: parse_base(&settings.endpoint)?,
            datasets_server: parse_base(&settings.datasets_server)?,
            token: settings.resolve_token(),
            revision: settings.revision.clone(),
            config_name: settings.config_name.clone(),
            split: settings.split.clone(),
        })
    }

    /// `{endpoint}/api/datasets/{org}/{name}/{rest..}`
    fn repo_url(&self, repo: &str, rest: &[&str]) -> HubResult<Url> {
        join_segments(
            &self.endpoint,
            ["api", "datasets"]
                .into_iter()
                .chain(repo.split('/'))
                .chain(rest.iter().copied()),
        )
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// Send a request and turn non-success statuses into [`HubError::Status`].
    fn send(&self, method: &str, url: &str, request: RequestBuilder) -> HubResult<Response> {
        debug!(method, url, "hub request");
        let response = self
            .authorized(request)
            .send()
            .map_err(|source| HubError::Transport {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().unwrap_or_default();
        Err(HubError::Status {
            method: method.to_string(),
            url: url.to_string(),
            status: status.as_u16(),
            message: error_message(&body, status),
        })
    }

    fn get_json<T: for<'de> Deserialize<'de>>(&self, url: &str) -> HubResult<T> {
        self.send("GET", url, self.client.get(url))?
            .json()
            .map_err(|e| HubError::Decode {
                url: url.to_string(),
                message: e.to_string(),
            })
    }

    /// Post a commit made of NDJSON operations on the configured revision.
    fn commit(&self, repo: &str, operations: &[Value]) -> HubResult<()> {
        let url = self.repo_url(repo, &["commit", self.revision.as_str()])?;
        let body = ndjson(operations);
        self.send(
            "POST",
            url.as_str(),
            self.client
                .post(url.clone())
                .header(CONTENT_TYPE, NDJSON)
                .body(body),
        )?;
        Ok(())
    }

    /// Create the dataset repository; an existing one is fine.
    fn ensure_repo(&self, repo: &str) -> HubResult<()> {
        let url = join_segments(&self.endpoint, ["api", "repos", "create"])?;
        let (organization, name) = match repo.split_once('/') {
            Some((org, name)) => (Some(org), name),
            None => (None, repo),
        };
        let body = json!({ "type": "dataset", "name": name, "organization": organization });
        match self.send("POST", url.as_str(), self.client.post(url.clone()).json(&body)) {
            Ok(_) => {
                info!(repo, "created dataset repository");
                Ok(())
            }
            Err(HubError::Status { status: 409, .. }) => Ok(()),
            Err(e) => Err(e),
        }
    }
}

impl DatasetHub for HubClient {
    fn list_repo_refs(&self, repo: &str) -> HubResult<RepoRefs> {
        self.get_json(self.repo_url(repo, &["refs"])?.as_str())
    }

    fn list_repo_files(&self, repo: &str) -> HubResult<Vec<String>> {
        let mut first = self.repo_url(repo, &["tree", self.revision.as_str()])?;
        first
            .query_pairs_mut()
            .append_pair("recursive", "true")
            .append_pair("expand", "false");

        let mut files = Vec::new();
        let mut next = Some(first.to_string());
        while let Some(url) = next.take() {
            let response = self.send("GET", &url, self.client.get(&url))?;
            next = response
                .headers()
                .get(LINK)
                .and_then(|v| v.to_str().ok())
                .and_then(next_page_url);
            let entries: Vec<TreeEntry> = response.json().map_err(|e| HubError::Decode {
                url: url.clone(),
                message: e.to_string(),
            })?;
            files.extend(
                entries
                    .into_iter()
                    .filter(|e| e.kind == "file")
                    .map(|e| e.path),
            );
        }

        debug!(repo, count = files.len(), "listed repository files");
        Ok(files)
    }

    fn create_tag(&self, repo: &str, tag: &str, message: &str, revision: &str) -> HubResult<()> {
        let url = self.repo_url(repo, &["tag", revision])?;
        let body = json!({ "tag": tag, "message": message });
        self.send("POST", url.as_str(), self.client.post(url.clone()).json(&body))?;
        info!(repo, tag, revision, "created tag");
        Ok(())
    }

    fn delete_tag(&self, repo: &str, tag: &str) -> HubResult<()> {
        let url = self.repo_url(repo, &["tag", tag])?;
        self.send("DELETE", url.as_str(), self.client.delete(url.clone()))?;
        info!(repo, tag, "deleted tag");
        Ok(())
    }

    fn delete_file(&self, repo: &str, path: &str, commit_message: &str) -> HubResult<()> {
        self.commit(
            repo,
            &[
                commit_header(commit_message),
                json!({ "key": "deletedFile", "value": { "path": path } }),
            ],
        )?;
        info!(repo, path, "deleted file");
        Ok(())
    }

    fn load_dataset(&self, repo: &str) -> HubResult<Dataset> {
        let mut collector = RowsCollector::default();
        loop {
            let mut url = join_segments(&self.datasets_server, ["rows"])?;
            url.query_pairs_mut()
                .append_pair("dataset", repo)
                .append_pair("config", &self.config_name)
                .append_pair("split", &self.split)
                .append_pair("offset", &collector.offset().to_string())
                .append_pair("length", &ROWS_PAGE_SIZE.to_string());
            let page: RowsPage = self.get_json(url.as_str())?;
            if collector.absorb(repo, page)? {
                break;
            }
        }

        let dataset = collector.finish();
        debug!(
            repo,
            rows = dataset.len(),
            columns = dataset.features.len(),
            "loaded dataset"
        );
        Ok(dataset)
    }

    fn push_to_hub(&self, dataset: &Dataset, repo: &str, commit_message: &str) -> HubResult<()> {
        self.ensure_repo(repo)?;

        let content = dataset
            .to_json_lines()
            .map_err(|e| HubError::Rejected(e.to_string()))?;
        let existing = match self.list_repo_files(repo) {
            Ok(files) => files,
            Err(e) if e.is_not_found() => Vec::new(),
            Err(e) => return Err(e),
        };

        let operations = push_operations(&existing, &self.split, &content, commit_message);
        self.commit(repo, &operations)?;
        info!(repo, rows = dataset.len(), "pushed dataset");
        Ok(())
    }
}

fn user_agent() -> String {
    format!("hubadmin/{}", env!("CARGO_PKG_VERSION"))
}

fn parse_base(raw: &str) -> InfraResult<Url> {
    Url::parse(raw).map_err(|e| InfraError::Client {
        message: format!("invalid URL {raw}: {e}"),
    })
}

/// `base` with `segments` appended as percent-encoded path segments.
fn join_segments<'a>(base: &Url, segments: impl IntoIterator<Item = &'a str>) -> HubResult<Url> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| HubError::Rejected(format!("{base} cannot take a path")))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

/// Repository path of the single file a pushed split is written to.
pub fn data_file_path(split: &str) -> String {
    format!("data/{split}-00000-of-00001.jsonl")
}

/// Commit operations that replace every `data/{split}-*` shard in `existing`
/// with one base64-encoded JSON Lines file holding `content`.
pub fn push_operations(
    existing: &[String],
    split: &str,
    content: &str,
    commit_message: &str,
) -> Vec<Value> {
    let data_path = data_file_path(split);
    let split_prefix = format!("data/{split}-");

    let mut operations = vec![commit_header(commit_message)];
    operations.extend(
        existing
            .iter()
            .filter(|p| p.starts_with(&split_prefix) && **p != data_path)
            .map(|p| json!({ "key": "deletedFile", "value": { "path": p } })),
    );
    operations.push(json!({
        "key": "file",
        "value": {
            "content": BASE64.encode(content.as_bytes()),
            "path": data_path,
            "encoding": "base64",
        }
    }));
    operations
}

fn commit_header(summary: &str) -> Value {
    json!({ "key": "header", "value": { "summary": summary, "description": "" } })
}

fn ndjson(operations: &[Value]) -> String {
    operations
        .iter()
        .map(Value::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Server-provided `{"error": ...}` message, else the raw body, else the reason phrase.
fn error_message(body: &str, status: StatusCode) -> String {
    if let Ok(parsed) = serde_json::from_str::<ErrorBody>(body) {
        return parsed.error;
    }
    let body = body.trim();
    if body.is_empty() {
        status.canonical_reason().unwrap_or("unknown error").to_string()
    } else {
        body.to_string()
    }
}

/// URL of the `rel="next"` entry of a `Link` header.
pub fn next_page_url(link: &str) -> Option<String> {
    link.split(',').find_map(|part| {
        let (target, params) = part.split_once(';')?;
        if !params
            .split(';')
            .any(|p| p.trim().replace(' ', "") == "rel=\"next\"")
        {
            return None;
        }
        let target = target.trim();
        target
            .strip_prefix('<')
            .and_then(|t| t.strip_suffix('>'))
            .map(String::from)
    })
}
