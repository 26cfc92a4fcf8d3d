use crate::commands::report_api_activity;
use crate::config::load_config;
use crate::display;
use crate::error::Result;
use crate::github::GithubClient;
use crate::sources::{self, SourceMode};
use crate::status::{aggregate_status, RepoStatus};

pub async fn run(json: bool, verbose: bool) -> Result<()> {
    let config = load_config()?;
    let resolved = sources::resolve(&config.effective_sources());

    if resolved.mode == SourceMode::None && !json {
        display::warn(
            "No sources configured. Set [sources] in the config file or GITPULSE_ORGS/GITPULSE_USERS/GITPULSE_REPOS.",
        );
    }

    let client = GithubClient::new(config.token())?;

    if resolved.mode != SourceMode::None {
        client.warn_if_rate_limited().await.ok();
    }

    let records = aggregate_status(&client, &resolved).await;

    display::output(json, &records, |data| {
        render_status_table(data);
    });

    report_api_activity(&client, verbose);

    Ok(())
}

fn render_status_table(records: &[RepoStatus]) {
    if records.is_empty() {
        display::warn("No repositories found.");
        return;
    }

    display::section_header("Repository Status");

    let mut table = display::new_table(&[
        "Repository",
        "Owner",
        "Visibility",
        "Default Branch",
        "Branches",
        "Last Commit",
        "Build Status",
        "Last Build",
        "Build Error",
        "PRs",
        "Issues",
    ]);

    for r in records {
        let build_error = match (r.build_error_code, &r.build_error_message) {
            (Some(code), Some(message)) => format!("{code}: {message}"),
            (Some(code), None) => code.to_string(),
            _ => "—".to_string(),
        };
        table.add_row(vec![
            r.repo.clone(),
            r.owner.clone(),
            r.visibility.clone(),
            r.default_branch.clone(),
            r.branch_count.to_string(),
            r.last_commit_date
                .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
                .unwrap_or_else(|| "—".to_string()),
            r.last_build_status.clone(),
            r.last_build_time
                .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
                .unwrap_or_else(|| "—".to_string()),
            build_error,
            r.open_pull_requests.to_string(),
            r.open_issues.to_string(),
        ]);
    }

    println!("{table}");
    println!("\n{} repository(ies) found.", records.len());
}
