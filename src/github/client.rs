use crate::error::{GitpulseError, Result};
use crate::github::types::{
    ApiCall, AuthenticatedUser, Branch, CallOutcome, Commit, OrgInfo, RateLimit,
    RateLimitSnapshot, Repository, WorkflowRunsPage,
};
use reqwest::header::{HeaderMap, ACCEPT, LINK};
use serde::de::DeserializeOwned;
use std::sync::{Arc, Mutex, PoisonError};

pub const GITHUB_API_BASE: &str = "https://api.github.com";
const API_VERSION: &str = "2022-11-28";

/// GitHub REST client. Owns an observability context (call log plus
/// rate-limit snapshot) that every request records into; the context lives
/// for one command invocation, so `Clone` shares it across concurrent
/// fetches rather than forking it.
#[derive(Clone)]
pub struct GithubClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
    telemetry: Arc<Mutex<Telemetry>>,
}

#[derive(Default)]
struct Telemetry {
    calls: Vec<ApiCall>,
    rate_limit: Option<RateLimitSnapshot>,
}

impl GithubClient {
    pub fn new(token: Option<String>) -> Result<Self> {
        Self::with_base_url(token, GITHUB_API_BASE)
    }

    /// Base URL is injectable so tests can point at a mock server.
    pub fn with_base_url(token: Option<String>, base_url: &str) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("gitpulse/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
            telemetry: Arc::new(Mutex::new(Telemetry::default())),
        })
    }

    /// Call log recorded so far in this invocation.
    pub fn calls(&self) -> Vec<ApiCall> {
        self.telemetry
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .calls
            .clone()
    }

    /// Latest header-derived rate-limit values; last write wins under
    /// concurrent responses.
    pub fn rate_limit_snapshot(&self) -> Option<RateLimitSnapshot> {
        self.telemetry
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .rate_limit
    }

    async fn send(&self, path: &str) -> Result<reqwest::Response> {
        let mut req = self
            .http
            .get(format!("{}{}", self.base_url, path))
            .header(ACCEPT, "application/vnd.github+json")
            .header("X-GitHub-Api-Version", API_VERSION);
        if let Some(token) = &self.token {
            req = req.bearer_auth(token);
        }
        let res = req.send().await?;
        self.record_rate_limit(res.headers());
        Ok(res)
    }

    /// Perform a GET against the API and deserialize the JSON body.
    ///
    /// Every response updates the rate-limit snapshot and appends to the
    /// call log; non-2xx responses read the body as text and surface it in
    /// a typed API error carrying the status and endpoint.
    pub async fn request<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let res = self.send(path).await?;
        let status = res.status();

        if !status.is_success() {
            let message = res.text().await.unwrap_or_default();
            self.record_call(path, CallOutcome::Error, status.as_u16(), Some(message.clone()));
            return Err(GitpulseError::Api {
                status: status.as_u16(),
                endpoint: path.to_string(),
                message,
            });
        }

        self.record_call(path, CallOutcome::Ok, status.as_u16(), None);
        Ok(res.json::<T>().await?)
    }

    fn record_rate_limit(&self, headers: &HeaderMap) {
        let snapshot = RateLimitSnapshot {
            limit: header_number(headers, "x-ratelimit-limit"),
            remaining: header_number(headers, "x-ratelimit-remaining"),
            reset: header_number(headers, "x-ratelimit-reset") as i64,
        };
        self.telemetry
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .rate_limit = Some(snapshot);
    }

    fn record_call(&self, endpoint: &str, status: CallOutcome, code: u16, message: Option<String>) {
        self.telemetry
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .calls
            .push(ApiCall {
                endpoint: endpoint.to_string(),
                status,
                code,
                message,
            });
    }

    // -- Resource fetchers ---------------------------------------------------
    //
    // Each is a pure parameter-to-endpoint mapping, first page only, with
    // HTTP mechanics and the typed error surfaced unchanged from `request`.

    pub async fn org_repositories(&self, org: &str) -> Result<Vec<Repository>> {
        self.request(&format!("/orgs/{org}/repos?per_page=100")).await
    }

    pub async fn user_repositories(&self, user: &str) -> Result<Vec<Repository>> {
        self.request(&format!("/users/{user}/repos?per_page=100")).await
    }

    pub async fn branches(&self, owner: &str, repo: &str) -> Result<Vec<Branch>> {
        self.request(&format!("/repos/{owner}/{repo}/branches?per_page=100"))
            .await
    }

    /// Latest workflow run; the wrapper holds zero or one runs.
    pub async fn latest_workflow_run(&self, owner: &str, repo: &str) -> Result<WorkflowRunsPage> {
        self.request(&format!("/repos/{owner}/{repo}/actions/runs?per_page=1"))
            .await
    }

    pub async fn recent_workflow_runs(
        &self,
        owner: &str,
        repo: &str,
        count: u32,
    ) -> Result<WorkflowRunsPage> {
        self.request(&format!("/repos/{owner}/{repo}/actions/runs?per_page={count}"))
            .await
    }

    pub async fn open_pull_requests(&self, owner: &str, repo: &str) -> Result<Vec<serde_json::Value>> {
        self.request(&format!("/repos/{owner}/{repo}/pulls?state=open&per_page=1"))
            .await
    }

    /// Open-PR total via the `Link` header's `rel="last"` page number,
    /// falling back to the returned array length. Any failure counts as 0.
    pub async fn open_pull_request_count(&self, owner: &str, repo: &str) -> u32 {
        let path = format!("/repos/{owner}/{repo}/pulls?state=open&per_page=1");
        let res = match self.send(&path).await {
            Ok(res) => res,
            Err(_) => return 0,
        };

        let status = res.status();
        if !status.is_success() {
            let message = res.text().await.unwrap_or_default();
            self.record_call(&path, CallOutcome::Error, status.as_u16(), Some(message));
            return 0;
        }

        let link = res
            .headers()
            .get(LINK)
            .and_then(|v| v.to_str().ok())
            .map(String::from);
        self.record_call(&path, CallOutcome::Ok, status.as_u16(), None);

        if let Some(last) = link.as_deref().and_then(parse_last_page) {
            return last;
        }

        match res.json::<Vec<serde_json::Value>>().await {
            Ok(items) => items.len() as u32,
            Err(_) => 0,
        }
    }

    /// Open issues, first page only. The issues endpoint also returns pull
    /// requests, so this is an approximate open-items signal.
    pub async fn open_issues(&self, owner: &str, repo: &str) -> Result<Vec<serde_json::Value>> {
        self.request(&format!("/repos/{owner}/{repo}/issues?state=open&per_page=1"))
            .await
    }

    pub async fn last_commit(&self, owner: &str, repo: &str, branch: &str) -> Result<Vec<Commit>> {
        self.request(&format!("/repos/{owner}/{repo}/commits?sha={branch}&per_page=1"))
            .await
    }

    pub async fn authenticated_user(&self) -> Result<AuthenticatedUser> {
        self.request("/user").await
    }

    pub async fn user_orgs(&self) -> Result<Vec<OrgInfo>> {
        self.request("/user/orgs?per_page=50").await
    }

    pub async fn org_repositories_by_activity(&self, org: &str) -> Result<Vec<Repository>> {
        self.request(&format!("/orgs/{org}/repos?per_page=50&sort=updated"))
            .await
    }

    pub async fn own_repositories_by_activity(&self) -> Result<Vec<Repository>> {
        self.request("/user/repos?affiliation=owner&per_page=50&sort=updated")
            .await
    }

    pub async fn rate_limit(&self) -> Result<RateLimit> {
        self.request("/rate_limit").await
    }

    pub async fn warn_if_rate_limited(&self) -> Result<()> {
        let rl = self.rate_limit().await?;
        if rl.resources.core.remaining < 100 {
            crate::display::warn(&format!(
                "Only {} API calls remaining (resets at {})",
                rl.resources.core.remaining,
                chrono::DateTime::from_timestamp(rl.resources.core.reset, 0)
                    .map(|dt| dt.format("%H:%M:%S UTC").to_string())
                    .unwrap_or_else(|| rl.resources.core.reset.to_string())
            ));
        }
        Ok(())
    }
}

fn header_number(headers: &HeaderMap, name: &str) -> u64 {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse().ok())
        .unwrap_or(0)
}

/// Extract the `rel="last"` page number from a `Link` header.
///
/// GitHub Link headers look like:
/// `<https://api.github.com/repos/o/r/pulls?state=open&page=2>; rel="next", <...&page=7>; rel="last"`
fn parse_last_page(link_header: &str) -> Option<u32> {
    for part in link_header.split(',') {
        let part = part.trim();

        let mut url = None;
        let mut rel = None;
        for segment in part.split(';') {
            let segment = segment.trim();
            if segment.starts_with('<') && segment.ends_with('>') {
                url = Some(&segment[1..segment.len() - 1]);
            } else if let Some(value) = segment.strip_prefix("rel=") {
                rel = Some(value.trim_matches('"'));
            }
        }

        if rel == Some("last") {
            return url.and_then(page_from_url);
        }
    }
    None
}

fn page_from_url(url: &str) -> Option<u32> {
    let query = &url[url.find('?')? + 1..];
    for param in query.split('&') {
        if let Some(value) = param.strip_prefix("page=") {
            return value.parse().ok();
        }
    }
    None
}
