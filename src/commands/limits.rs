use crate::commands::report_api_activity;
use crate::config::load_config;
use crate::display;
use crate::error::Result;
use crate::github::GithubClient;
use owo_colors::OwoColorize;

pub async fn run(json: bool, verbose: bool) -> Result<()> {
    let config = load_config()?;
    let client = GithubClient::new(config.token())?;

    let rl = client.rate_limit().await?;
    let core = rl.resources.core;

    display::output(json, &core, |core| {
        display::section_header("GitHub Rate Limit");
        println!("  {} {}", "Limit:".bold(), core.limit);
        println!("  {} {}", "Remaining:".bold(), core.remaining);
        println!(
            "  {} {}",
            "Resets:".bold(),
            chrono::DateTime::from_timestamp(core.reset, 0)
                .map(|dt| dt.format("%Y-%m-%d %H:%M:%S UTC").to_string())
                .unwrap_or_else(|| core.reset.to_string())
        );
    });

    report_api_activity(&client, verbose);

    Ok(())
}
