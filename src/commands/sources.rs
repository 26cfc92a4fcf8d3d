use crate::config::load_config;
use crate::display;
use crate::error::Result;
use crate::sources::{self, ResolvedSources};
use owo_colors::OwoColorize;

/// Show the resolved source configuration without touching the network.
pub async fn run(json: bool) -> Result<()> {
    let config = load_config()?;
    let resolved = sources::resolve(&config.effective_sources());

    display::output(json, &resolved, |data| {
        render_sources(data);
    });

    Ok(())
}

fn render_sources(resolved: &ResolvedSources) {
    display::section_header("Source Configuration");
    println!("  {} {}", "Mode:".bold(), resolved.mode);

    if !resolved.repos.is_empty() {
        println!("\n  {}", "Explicit repos:".bold());
        for repo in &resolved.repos {
            println!("    {repo}");
        }
    }
    if !resolved.organizations.is_empty() {
        println!("\n  {}", "Organizations:".bold());
        for org in &resolved.organizations {
            println!("    {org}");
        }
    }
    if !resolved.users.is_empty() {
        println!("\n  {}", "Users:".bold());
        for user in &resolved.users {
            println!("    {user}");
        }
    }

    if resolved.repos.is_empty() && resolved.organizations.is_empty() && resolved.users.is_empty() {
        println!("\n  Nothing configured.");
    }
}
