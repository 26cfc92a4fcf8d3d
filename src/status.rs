use crate::display;
use crate::error::GitpulseError;
use crate::github::types::Repository;
use crate::github::GithubClient;
use crate::sources::{ResolvedSources, SourceMode};
use chrono::{DateTime, Utc};
use futures::future::join_all;
use serde::Serialize;
use std::collections::hash_map::Entry;
use std::collections::HashMap;

/// Aggregated health signals for one repository.
///
/// `build_error_code`/`build_error_message` are only populated when the
/// workflow-run fetch itself failed with a typed API error; every other
/// signal degrades silently to empty/zero on failure.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RepoStatus {
    pub repo: String,
    pub owner: String,
    pub visibility: String,
    pub default_branch: String,
    pub branch_count: usize,
    pub branches: Vec<String>,
    pub last_commit_date: Option<DateTime<Utc>>,
    pub last_build_status: String,
    pub last_build_time: Option<DateTime<Utc>>,
    pub build_error_code: Option<u16>,
    pub build_error_message: Option<String>,
    pub open_pull_requests: usize,
    pub open_issues: usize,
}

/// A repository paired with the owner string it was fetched under, before
/// de-duplication.
#[derive(Debug, Clone)]
struct Candidate {
    owner: String,
    repo: Repository,
}

/// Aggregate status records for every repository the resolved sources name.
///
/// Returns an empty list without issuing any HTTP call when nothing is
/// configured. Per-source and per-signal failures never abort the pass.
pub async fn aggregate_status(
    client: &GithubClient,
    sources: &ResolvedSources,
) -> Vec<RepoStatus> {
    if sources.mode == SourceMode::None {
        return Vec::new();
    }

    let candidates = discover_candidates(client, sources).await;
    let unique = dedup_candidates(candidates);

    // Fan out across the whole unique set at once; each repository's
    // signals are fetched concurrently inside `enrich`.
    join_all(unique.iter().map(|c| enrich(client, c))).await
}

async fn discover_candidates(
    client: &GithubClient,
    sources: &ResolvedSources,
) -> Vec<Candidate> {
    let mut candidates = Vec::new();

    match sources.mode {
        SourceMode::None => {}
        SourceMode::ExplicitRepos => {
            for repo_ref in &sources.repos {
                match find_owned_repo(client, &repo_ref.owner, &repo_ref.name).await {
                    Some(repo) => candidates.push(Candidate {
                        owner: repo_ref.owner.clone(),
                        repo,
                    }),
                    // Existence unconfirmed: dropped, no partial record.
                    None => display::warn(&format!("Repository not found: {repo_ref}")),
                }
            }
        }
        SourceMode::OrgsAndUsers => {
            for org in &sources.organizations {
                match client.org_repositories(org).await {
                    Ok(repos) => candidates.extend(repos.into_iter().map(|repo| Candidate {
                        owner: org.clone(),
                        repo,
                    })),
                    Err(e) => {
                        display::warn(&format!("Failed to fetch repositories for {org}: {e}"))
                    }
                }
            }
            for user in &sources.users {
                match client.user_repositories(user).await {
                    Ok(repos) => candidates.extend(repos.into_iter().map(|repo| Candidate {
                        owner: user.clone(),
                        repo,
                    })),
                    Err(e) => {
                        display::warn(&format!("Failed to fetch repositories for {user}: {e}"))
                    }
                }
            }
        }
    }

    candidates
}

/// Locate an explicit repo by listing its owner's repositories, trying the
/// organization endpoint first and falling back to the user endpoint.
async fn find_owned_repo(client: &GithubClient, owner: &str, name: &str) -> Option<Repository> {
    let repos = match client.org_repositories(owner).await {
        Ok(repos) => repos,
        Err(_) => client.user_repositories(owner).await.ok()?,
    };
    repos.into_iter().find(|r| r.name == name)
}

/// Merge candidates keyed by `(owner, name)`, last write wins, output order
/// following first-seen insertion order.
fn dedup_candidates(candidates: Vec<Candidate>) -> Vec<Candidate> {
    let mut index: HashMap<(String, String), usize> = HashMap::new();
    let mut unique: Vec<Candidate> = Vec::new();

    for candidate in candidates {
        let key = (candidate.owner.clone(), candidate.repo.name.clone());
        match index.entry(key) {
            Entry::Occupied(slot) => unique[*slot.get()] = candidate,
            Entry::Vacant(slot) => {
                slot.insert(unique.len());
                unique.push(candidate);
            }
        }
    }

    unique
}

async fn enrich(client: &GithubClient, candidate: &Candidate) -> RepoStatus {
    let owner = &candidate.owner;
    let repo = &candidate.repo;

    let (commit, run, branches, pulls, issues) = tokio::join!(
        client.last_commit(owner, &repo.name, &repo.default_branch),
        client.latest_workflow_run(owner, &repo.name),
        client.branches(owner, &repo.name),
        client.open_pull_requests(owner, &repo.name),
        client.open_issues(owner, &repo.name),
    );

    let mut build_error_code = None;
    let mut build_error_message = None;
    let latest_run = match run {
        Ok(page) => page.workflow_runs.into_iter().next(),
        Err(GitpulseError::Api {
            status, message, ..
        }) => {
            build_error_code = Some(status);
            build_error_message = Some(message);
            None
        }
        Err(_) => None,
    };

    let branches: Vec<String> = branches
        .map(|b| b.into_iter().map(|branch| branch.name).collect())
        .unwrap_or_default();

    let last_commit_date = commit.ok().and_then(|commits| {
        commits
            .into_iter()
            .next()
            .and_then(|c| c.commit.author.map(|a| a.date))
    });

    RepoStatus {
        repo: repo.name.clone(),
        owner: owner.clone(),
        visibility: if repo.private {
            "private".to_string()
        } else {
            "public".to_string()
        },
        default_branch: repo.default_branch.clone(),
        branch_count: branches.len(),
        branches,
        last_commit_date,
        last_build_status: latest_run
            .as_ref()
            .and_then(|r| r.conclusion.clone())
            .unwrap_or_else(|| "no builds".to_string()),
        last_build_time: latest_run.as_ref().and_then(|r| r.updated_at),
        build_error_code,
        build_error_message,
        open_pull_requests: pulls.map(|p| p.len()).unwrap_or(0),
        open_issues: issues.map(|i| i.len()).unwrap_or(0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(owner: &str, name: &str, id: u64) -> Candidate {
        Candidate {
            owner: owner.to_string(),
            repo: Repository {
                id,
                name: name.to_string(),
                full_name: format!("{owner}/{name}"),
                html_url: None,
                private: false,
                default_branch: "main".to_string(),
                open_issues_count: 0,
                pushed_at: None,
                updated_at: None,
            },
        }
    }

    #[test]
    fn dedup_keeps_one_record_per_owner_and_name() {
        let unique = dedup_candidates(vec![
            candidate("acme", "widget", 1),
            candidate("acme", "gadget", 2),
            candidate("acme", "widget", 3),
        ]);
        assert_eq!(unique.len(), 2);
    }

    #[test]
    fn dedup_is_last_write_wins_at_first_seen_position() {
        let unique = dedup_candidates(vec![
            candidate("acme", "widget", 1),
            candidate("acme", "gadget", 2),
            candidate("acme", "widget", 3),
        ]);
        assert_eq!(unique[0].repo.name, "widget");
        assert_eq!(unique[0].repo.id, 3);
        assert_eq!(unique[1].repo.name, "gadget");
    }

    #[test]
    fn dedup_distinguishes_owners_with_same_repo_name() {
        let unique = dedup_candidates(vec![
            candidate("acme", "widget", 1),
            candidate("octocat", "widget", 2),
        ]);
        assert_eq!(unique.len(), 2);
    }
}
