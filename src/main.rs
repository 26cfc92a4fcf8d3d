use clap::{Parser, Subcommand};
use gitpulse::{commands, display};

#[derive(Parser)]
#[command(
    name = "gitpulse",
    version,
    about = "Monitor GitHub repository pipeline health across organizations and users"
)]
pub struct Cli {
    /// Output results as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Show verbose output (API call log, rate limits)
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Authenticate with a GitHub personal access token
    Auth {
        /// Token to use (if omitted, prompts interactively)
        #[arg(long)]
        token: Option<String>,
    },
    /// Aggregate health status for every configured repository
    Status,
    /// Show the authenticated dashboard for an organization or your account
    Dashboard {
        /// Organization to show (defaults to your first membership)
        #[arg(long)]
        org: Option<String>,
    },
    /// Show the resolved source configuration
    Sources,
    /// Show the current GitHub API rate limit
    Limits,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let result = match &cli.command {
        Commands::Auth { token } => commands::auth::run(token).await,
        Commands::Status => commands::status::run(cli.json, cli.verbose).await,
        Commands::Dashboard { org } => commands::dashboard::run(org, cli.json, cli.verbose).await,
        Commands::Sources => commands::sources::run(cli.json).await,
        Commands::Limits => commands::limits::run(cli.json, cli.verbose).await,
    };

    if let Err(e) = result {
        display::error(&e.to_string());
        std::process::exit(1);
    }
}
