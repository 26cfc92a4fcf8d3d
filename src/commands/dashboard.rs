use crate::commands::report_api_activity;
use crate::config::load_config;
use crate::dashboard::{dashboard_data, DashboardData};
use crate::display;
use crate::error::Result;
use crate::github::GithubClient;
use owo_colors::OwoColorize;

pub async fn run(org: &Option<String>, json: bool, verbose: bool) -> Result<()> {
    let config = load_config()?;
    let token = config.require_token()?;
    let client = GithubClient::new(Some(token))?;

    let data = dashboard_data(&client, org.as_deref()).await?;

    display::output(json, &data, |data| {
        render_dashboard(data);
    });

    report_api_activity(&client, verbose);

    Ok(())
}

fn render_dashboard(data: &DashboardData) {
    display::section_header(&format!("Dashboard — {}", data.org_name));
    println!("  {} {}", "User:".bold(), data.user_name);
    println!(
        "  {} {}",
        "Scopes:".bold(),
        data.org_options
            .iter()
            .map(|option| option.id.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    );

    if data.repos.is_empty() {
        display::warn("No repositories in this scope.");
        return;
    }

    let mut table = display::new_table(&[
        "Name",
        "Health",
        "Pipeline",
        "Avg Runtime",
        "Issues",
        "PRs",
        "Actions Min",
        "Last Commit",
    ]);

    for repo in &data.repos {
        table.add_row(vec![
            repo.name.clone(),
            display::health_label(repo.health),
            display::pipeline_label(repo.pipeline),
            repo.avg_runtime.clone(),
            repo.open_issues.to_string(),
            repo.open_prs.to_string(),
            repo.actions_minutes.to_string(),
            repo.last_commit.clone(),
        ]);
    }

    println!("{table}");

    if !data.pipeline_series.is_empty() {
        display::section_header("Pipeline Runs");
        let mut table = display::new_table(&["Run", "Minutes", "Success"]);
        for point in &data.pipeline_series {
            table.add_row(vec![
                point.label.clone(),
                point.minutes.to_string(),
                format!("{}%", point.success_rate),
            ]);
        }
        println!("{table}");
    }
}
