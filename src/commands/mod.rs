pub mod auth;
pub mod dashboard;
pub mod limits;
pub mod sources;
pub mod status;

use crate::github::types::CallOutcome;
use crate::github::GithubClient;

/// Dump the client's call log and latest rate-limit snapshot to stderr.
pub fn report_api_activity(client: &GithubClient, verbose: bool) {
    if !verbose {
        return;
    }

    for call in client.calls() {
        let outcome = match call.status {
            CallOutcome::Ok => "ok",
            CallOutcome::Error => "error",
        };
        match call.message {
            Some(message) => eprintln!(
                "api: {} -> {} {outcome} ({message})",
                call.endpoint, call.code
            ),
            None => eprintln!("api: {} -> {} {outcome}", call.endpoint, call.code),
        }
    }

    if let Some(rl) = client.rate_limit_snapshot() {
        eprintln!(
            "Rate limit: {}/{} remaining (resets at {})",
            rl.remaining,
            rl.limit,
            chrono::DateTime::from_timestamp(rl.reset, 0)
                .map(|dt| dt.format("%H:%M:%S UTC").to_string())
                .unwrap_or_else(|| rl.reset.to_string())
        );
    }
}
