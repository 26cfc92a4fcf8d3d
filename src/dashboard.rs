use crate::error::Result;
use crate::github::types::{OrgInfo, Repository, WorkflowRun};
use crate::github::GithubClient;
use crate::health::{
    average_duration_seconds, classify_health, classify_pipeline, format_duration,
    format_relative_time, run_duration_seconds, total_minutes, Health, Pipeline,
};
use chrono::{DateTime, Utc};
use futures::future::join_all;
use serde::Serialize;

/// Sentinel org id for the caller's personal account.
pub const PERSONAL_ORG_ID: &str = "__personal";

const MAX_REPOS: usize = 12;
const RUN_WINDOW: u32 = 5;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RepoSummary {
    pub name: String,
    pub is_private: bool,
    pub repo_url: String,
    pub health: Health,
    pub pipeline: Pipeline,
    pub avg_runtime: String,
    pub avg_seconds: f64,
    pub open_issues: u32,
    pub open_prs: u32,
    pub actions_minutes: i64,
    pub last_commit: String,
    pub last_commit_at: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct OrgOption {
    pub id: String,
    pub label: String,
    #[serde(rename = "type")]
    pub kind: OrgOptionKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OrgOptionKind {
    Org,
    Personal,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelinePoint {
    pub label: String,
    pub minutes: i64,
    pub success_rate: u8,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardData {
    pub user_name: String,
    pub org_name: String,
    pub org_options: Vec<OrgOption>,
    pub selected_org_id: String,
    pub repos: Vec<RepoSummary>,
    pub pipeline_series: Vec<PipelinePoint>,
}

struct OrgSelection {
    id: String,
    label: String,
    is_personal: bool,
    options: Vec<OrgOption>,
}

/// Build the dashboard view for the authenticated caller: organization
/// options, the 12 most recently updated repositories in the selected
/// scope, per-repo health summaries, and a pipeline time series taken from
/// the first repository with at least one workflow run.
pub async fn dashboard_data(
    client: &GithubClient,
    selected_org_id: Option<&str>,
) -> Result<DashboardData> {
    let user = client.authenticated_user().await?;
    let orgs = client.user_orgs().await?;
    let selection = resolve_org_selection(&user.login, &orgs, selected_org_id);

    let repos = if selection.is_personal {
        client.own_repositories_by_activity().await?
    } else {
        client.org_repositories_by_activity(&selection.id).await?
    };
    let selected: Vec<Repository> = repos.into_iter().take(MAX_REPOS).collect();

    let now = Utc::now();
    let enriched = join_all(selected.iter().map(|repo| summarize(client, repo, now))).await;

    let mut summaries = Vec::with_capacity(selected.len());
    let mut pipeline_series = Vec::new();
    for result in enriched {
        let (summary, runs) = result?;
        if pipeline_series.is_empty() && !runs.is_empty() {
            pipeline_series = build_series(&runs);
        }
        summaries.push(summary);
    }

    Ok(DashboardData {
        user_name: user.name.unwrap_or(user.login),
        org_name: selection.label,
        org_options: selection.options,
        selected_org_id: selection.id,
        repos: summaries,
        pipeline_series,
    })
}

/// Pick the operating organization: the explicit selection when it matches
/// an option, else the first membership, else the personal account.
fn resolve_org_selection(
    login: &str,
    orgs: &[OrgInfo],
    selected: Option<&str>,
) -> OrgSelection {
    let mut options = vec![OrgOption {
        id: PERSONAL_ORG_ID.to_string(),
        label: format!("{login} (Personal)"),
        kind: OrgOptionKind::Personal,
    }];
    options.extend(orgs.iter().map(|org| OrgOption {
        id: org.login.clone(),
        label: org.login.clone(),
        kind: OrgOptionKind::Org,
    }));

    let fallback = orgs
        .first()
        .map(|org| org.login.clone())
        .unwrap_or_else(|| PERSONAL_ORG_ID.to_string());
    let id = match selected {
        Some(id) if options.iter().any(|option| option.id == id) => id.to_string(),
        _ => fallback,
    };
    let label = options
        .iter()
        .find(|option| option.id == id)
        .map(|option| option.label.clone())
        .unwrap_or_else(|| id.clone());

    OrgSelection {
        is_personal: id == PERSONAL_ORG_ID,
        id,
        label,
        options,
    }
}

async fn summarize(
    client: &GithubClient,
    repo: &Repository,
    now: DateTime<Utc>,
) -> Result<(RepoSummary, Vec<WorkflowRun>)> {
    let (owner, name) = match repo.full_name.split_once('/') {
        Some((owner, name)) => (owner.to_string(), name.to_string()),
        None => (repo.full_name.clone(), repo.name.clone()),
    };

    let (runs, open_prs) = tokio::join!(
        client.recent_workflow_runs(&owner, &name, RUN_WINDOW),
        client.open_pull_request_count(&owner, &name),
    );
    let runs = runs?.workflow_runs;

    let pipeline = classify_pipeline(runs.first());
    let avg_seconds = average_duration_seconds(&runs);
    // GitHub's issue count includes pull requests; subtract them out.
    let open_issues = repo.open_issues_count.saturating_sub(open_prs);

    let last_commit_at = repo.pushed_at.or(repo.updated_at);

    let summary = RepoSummary {
        name: repo.name.clone(),
        is_private: repo.private,
        repo_url: repo.html_url.clone().unwrap_or_default(),
        health: classify_health(pipeline, open_issues),
        pipeline,
        avg_runtime: if avg_seconds > 0.0 {
            format_duration(avg_seconds)
        } else {
            "--".to_string()
        },
        avg_seconds,
        open_issues,
        open_prs,
        actions_minutes: total_minutes(&runs),
        last_commit: format_relative_time(last_commit_at, now),
        last_commit_at: last_commit_at.map(|at| at.timestamp_millis()).unwrap_or(0),
    };

    Ok((summary, runs))
}

fn build_series(runs: &[WorkflowRun]) -> Vec<PipelinePoint> {
    runs.iter()
        .take(RUN_WINDOW as usize)
        .enumerate()
        .map(|(index, run)| {
            let label = run
                .run_started_at
                .map(|started| started.format("%a").to_string())
                .unwrap_or_else(|| format!("Run {}", index + 1));
            let minutes = (run_duration_seconds(run) / 60.0).round().max(0.0) as i64;
            let success_rate = if run.conclusion.as_deref() == Some("success") {
                100
            } else {
                0
            };
            PipelinePoint {
                label,
                minutes,
                success_rate,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn org(login: &str) -> OrgInfo {
        OrgInfo {
            login: login.to_string(),
            description: None,
        }
    }

    #[test]
    fn valid_selection_is_honored() {
        let selection =
            resolve_org_selection("octocat", &[org("acme"), org("widget-co")], Some("widget-co"));
        assert_eq!(selection.id, "widget-co");
        assert!(!selection.is_personal);
    }

    #[test]
    fn invalid_selection_falls_back_to_first_membership() {
        let selection = resolve_org_selection("octocat", &[org("acme")], Some("nope"));
        assert_eq!(selection.id, "acme");
    }

    #[test]
    fn no_memberships_fall_back_to_personal() {
        let selection = resolve_org_selection("octocat", &[], None);
        assert_eq!(selection.id, PERSONAL_ORG_ID);
        assert!(selection.is_personal);
        assert_eq!(selection.label, "octocat (Personal)");
    }

    #[test]
    fn personal_option_comes_first() {
        let selection = resolve_org_selection("octocat", &[org("acme")], None);
        assert_eq!(selection.options[0].id, PERSONAL_ORG_ID);
        assert_eq!(selection.options[0].kind, OrgOptionKind::Personal);
        assert_eq!(selection.options[1].id, "acme");
    }

    #[test]
    fn series_labels_use_weekday_or_run_index() {
        let runs = vec![
            WorkflowRun {
                id: 1,
                status: Some("completed".into()),
                conclusion: Some("success".into()),
                run_started_at: Some("2026-08-24T09:00:00Z".parse().unwrap()), // a Monday
                updated_at: Some("2026-08-24T09:04:00Z".parse().unwrap()),
            },
            WorkflowRun {
                id: 2,
                status: Some("completed".into()),
                conclusion: Some("failure".into()),
                run_started_at: None,
                updated_at: None,
            },
        ];
        let series = build_series(&runs);
        assert_eq!(series[0].label, "Mon");
        assert_eq!(series[0].minutes, 4);
        assert_eq!(series[0].success_rate, 100);
        assert_eq!(series[1].label, "Run 2");
        assert_eq!(series[1].minutes, 0);
        assert_eq!(series[1].success_rate, 0);
    }
}
