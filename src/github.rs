//! GitHub REST API collaborator.
//!
//! The reconciliation engine talks to the remote tracker only through the
//! [`Tracker`] trait; [`GitHubClient`] is its production implementation over
//! the GitHub REST v3 API. All transport detail lives here — authentication
//! headers, API versioning, `per_page` pagination — the engine never sees a
//! partial page or an HTTP status code.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use reqwest::header::HeaderMap;
use reqwest::{Client, Method, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use thiserror::Error;

use crate::models::{IssueRef, NewIssue};

const GITHUB_API: &str = "https://api.github.com";
const API_VERSION: &str = "2022-11-28";
const USER_AGENT: &str = concat!("backlog-sync/", env!("CARGO_PKG_VERSION"));

/// Remote tracker errors.
#[derive(Debug, Error)]
pub enum TrackerError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unauthorized: token rejected or missing repo scope")]
    Unauthorized,

    #[error("Rejected by remote: {0}")]
    Rejected(String),

    #[error("Server error: {0}")]
    Server(String),
}

/// Read and write operations the reconciliation engine needs from a
/// tracker.
///
/// The list operations enumerate the full remote set (all pages, all
/// states); callers treat the result as a consistent snapshot and never
/// re-fetch mid-run. No operation retries internally — any failure is
/// surfaced as-is and aborts the run.
#[async_trait]
pub trait Tracker {
    /// Names of every label defined on the repository.
    async fn list_labels(&self) -> Result<HashSet<String>, TrackerError>;

    /// Title → milestone number for every milestone, open or closed.
    async fn list_milestones(&self) -> Result<HashMap<String, u64>, TrackerError>;

    /// Every issue, open or closed, with pull requests already excluded.
    async fn list_issues(&self) -> Result<Vec<IssueRef>, TrackerError>;

    async fn create_label(&self, name: &str) -> Result<(), TrackerError>;

    /// Returns the number assigned to the new milestone.
    async fn create_milestone(&self, title: &str) -> Result<u64, TrackerError>;

    /// Returns the number assigned to the new issue.
    async fn create_issue(&self, issue: &NewIssue) -> Result<u64, TrackerError>;
}

/// [`Tracker`] implementation over the GitHub REST API.
#[derive(Debug, Clone)]
pub struct GitHubClient {
    base_url: String,
    repo: String,
    token: String,
    client: Client,
}

impl GitHubClient {
    /// Create a client for `owner/repo` authenticated with a personal
    /// access token.
    pub fn new(repo: impl Into<String>, token: impl Into<String>) -> Result<Self, TrackerError> {
        Self::with_base_url(GITHUB_API, repo, token)
    }

    /// Create with an explicit API base URL (GitHub Enterprise, test
    /// servers).
    pub fn with_base_url(
        base_url: impl Into<String>,
        repo: impl Into<String>,
        token: impl Into<String>,
    ) -> Result<Self, TrackerError> {
        let client = Client::builder().user_agent(USER_AGENT).build()?;
        Ok(Self {
            base_url: base_url.into(),
            repo: repo.into(),
            token: token.into(),
            client,
        })
    }

    /// Build a request with auth and API-version headers attached.
    fn request(&self, method: Method, url: &str) -> reqwest::RequestBuilder {
        self.client
            .request(method, url)
            .bearer_auth(&self.token)
            .header("Accept", "application/vnd.github+json")
            .header("X-GitHub-Api-Version", API_VERSION)
    }

    fn repo_url(&self, path: &str) -> String {
        format!("{}/repos/{}{}", self.base_url, self.repo, path)
    }

    /// Map an error response to a TrackerError, passing success through.
    async fn check_status(response: Response) -> Result<Response, TrackerError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        match status {
            StatusCode::NOT_FOUND => Err(TrackerError::NotFound(body)),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(TrackerError::Unauthorized),
            StatusCode::UNPROCESSABLE_ENTITY => Err(TrackerError::Rejected(body)),
            _ => Err(TrackerError::Server(format!("{}: {}", status, body))),
        }
    }

    /// Fetch every page of a list endpoint, following `Link: rel="next"`.
    async fn get_paged<T: DeserializeOwned>(&self, first_url: String) -> Result<Vec<T>, TrackerError> {
        let mut items = Vec::new();
        let mut url = Some(first_url);
        while let Some(current) = url {
            let response = self.request(Method::GET, &current).send().await?;
            let response = Self::check_status(response).await?;
            url = next_page(response.headers());
            let mut page: Vec<T> = response.json().await?;
            items.append(&mut page);
        }
        Ok(items)
    }

    async fn post<T: DeserializeOwned>(
        &self,
        path: &str,
        payload: &impl serde::Serialize,
    ) -> Result<T, TrackerError> {
        let response = self
            .request(Method::POST, &self.repo_url(path))
            .json(payload)
            .send()
            .await?;
        let response = Self::check_status(response).await?;
        Ok(response.json().await?)
    }
}

#[async_trait]
impl Tracker for GitHubClient {
    async fn list_labels(&self) -> Result<HashSet<String>, TrackerError> {
        let labels: Vec<RawLabel> = self
            .get_paged(self.repo_url("/labels?per_page=100"))
            .await?;
        Ok(labels.into_iter().map(|l| l.name).collect())
    }

    async fn list_milestones(&self) -> Result<HashMap<String, u64>, TrackerError> {
        let milestones: Vec<RawMilestone> = self
            .get_paged(self.repo_url("/milestones?state=all&per_page=100"))
            .await?;
        Ok(milestones.into_iter().map(|m| (m.title, m.number)).collect())
    }

    async fn list_issues(&self) -> Result<Vec<IssueRef>, TrackerError> {
        // The issues endpoint returns pull requests too; they carry a
        // `pull_request` member and are dropped here.
        let issues: Vec<RawIssue> = self
            .get_paged(self.repo_url("/issues?state=all&per_page=100"))
            .await?;
        Ok(issue_refs(issues))
    }

    async fn create_label(&self, name: &str) -> Result<(), TrackerError> {
        let _: RawLabel = self
            .post("/labels", &serde_json::json!({ "name": name }))
            .await?;
        Ok(())
    }

    async fn create_milestone(&self, title: &str) -> Result<u64, TrackerError> {
        let milestone: RawMilestone = self
            .post("/milestones", &serde_json::json!({ "title": title }))
            .await?;
        Ok(milestone.number)
    }

    async fn create_issue(&self, issue: &NewIssue) -> Result<u64, TrackerError> {
        let created: CreatedIssue = self.post("/issues", issue).await?;
        Ok(created.number)
    }
}

#[derive(Debug, Deserialize)]
struct RawLabel {
    name: String,
}

#[derive(Debug, Deserialize)]
struct RawMilestone {
    title: String,
    number: u64,
}

#[derive(Debug, Deserialize)]
struct RawIssue {
    title: String,
    number: u64,
    pull_request: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct CreatedIssue {
    number: u64,
}

fn issue_refs(raw: Vec<RawIssue>) -> Vec<IssueRef> {
    raw.into_iter()
        .filter(|issue| issue.pull_request.is_none())
        .map(|issue| IssueRef {
            title: issue.title,
            number: issue.number,
        })
        .collect()
}

/// Extract the `rel="next"` target from a `Link` response header, if any.
fn next_page(headers: &HeaderMap) -> Option<String> {
    let link = headers.get("link")?.to_str().ok()?;
    for part in link.split(',') {
        let Some((target, params)) = part.split_once(';') else {
            continue;
        };
        if params.contains("rel=\"next\"") {
            let target = target.trim();
            return Some(
                target
                    .strip_prefix('<')?
                    .strip_suffix('>')?
                    .to_string(),
            );
        }
    }
    None
}
