use crate::github::types::WorkflowRun;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

/// Classification of the most recent CI workflow run outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Pipeline {
    #[serde(rename = "Passing")]
    Passing,
    #[serde(rename = "Failing")]
    Failing,
    #[serde(rename = "Running")]
    Running,
    #[serde(rename = "Flaky")]
    Flaky,
    #[serde(rename = "No runs")]
    NoRuns,
}

impl fmt::Display for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Pipeline::Passing => "Passing",
            Pipeline::Failing => "Failing",
            Pipeline::Running => "Running",
            Pipeline::Flaky => "Flaky",
            Pipeline::NoRuns => "No runs",
        };
        f.write_str(label)
    }
}

/// Risk classification combining pipeline state and issue volume.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Health {
    Healthy,
    Watch,
    Risk,
}

impl fmt::Display for Health {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Health::Healthy => "healthy",
            Health::Watch => "watch",
            Health::Risk => "risk",
        };
        f.write_str(label)
    }
}

/// Classify from the single latest run. Anything not yet completed counts
/// as running; completed conclusions other than success/failure/cancelled
/// are treated as flaky.
pub fn classify_pipeline(latest: Option<&WorkflowRun>) -> Pipeline {
    let Some(run) = latest else {
        return Pipeline::NoRuns;
    };
    if run.status.as_deref() != Some("completed") {
        return Pipeline::Running;
    }
    match run.conclusion.as_deref() {
        Some("success") => Pipeline::Passing,
        Some("failure") | Some("cancelled") => Pipeline::Failing,
        _ => Pipeline::Flaky,
    }
}

pub fn classify_health(pipeline: Pipeline, open_issues: u32) -> Health {
    if pipeline == Pipeline::Failing || open_issues >= 12 {
        return Health::Risk;
    }
    if pipeline == Pipeline::Flaky || open_issues >= 6 {
        return Health::Watch;
    }
    Health::Healthy
}

/// Wall-clock duration of a run in seconds; 0 when either timestamp is
/// missing.
pub fn run_duration_seconds(run: &WorkflowRun) -> f64 {
    match (run.run_started_at, run.updated_at) {
        (Some(started), Some(updated)) => (updated - started).num_milliseconds() as f64 / 1000.0,
        _ => 0.0,
    }
}

/// Mean of the positive run durations, 0 when none are positive.
pub fn average_duration_seconds(runs: &[WorkflowRun]) -> f64 {
    let durations: Vec<f64> = runs
        .iter()
        .map(run_duration_seconds)
        .filter(|d| *d > 0.0)
        .collect();
    if durations.is_empty() {
        return 0.0;
    }
    durations.iter().sum::<f64>() / durations.len() as f64
}

/// Total positive run time, rounded to whole minutes.
pub fn total_minutes(runs: &[WorkflowRun]) -> i64 {
    let total: f64 = runs
        .iter()
        .map(run_duration_seconds)
        .filter(|d| *d > 0.0)
        .sum();
    (total / 60.0).round() as i64
}

pub fn format_duration(seconds: f64) -> String {
    let minutes = (seconds / 60.0).round().max(0.0);
    let mins = minutes.floor() as i64;
    let secs = (seconds % 60.0).round() as i64;
    if mins <= 0 {
        return format!("{secs}s");
    }
    format!("{mins}m {secs}s")
}

pub fn format_relative_time(at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> String {
    let Some(at) = at else {
        return "unknown".to_string();
    };
    let diff_mins = (now - at).num_minutes();
    if diff_mins < 60 {
        return format!("{diff_mins} minutes ago");
    }
    let diff_hours = diff_mins / 60;
    if diff_hours < 24 {
        return format!("{diff_hours} hours ago");
    }
    format!("{} days ago", diff_hours / 24)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn run(status: Option<&str>, conclusion: Option<&str>) -> WorkflowRun {
        WorkflowRun {
            id: 1,
            status: status.map(String::from),
            conclusion: conclusion.map(String::from),
            run_started_at: None,
            updated_at: None,
        }
    }

    fn timed_run(started: &str, updated: &str) -> WorkflowRun {
        WorkflowRun {
            id: 1,
            status: Some("completed".into()),
            conclusion: Some("success".into()),
            run_started_at: Some(started.parse().unwrap()),
            updated_at: Some(updated.parse().unwrap()),
        }
    }

    #[test]
    fn pipeline_classification_table() {
        assert_eq!(classify_pipeline(None), Pipeline::NoRuns);
        assert_eq!(
            classify_pipeline(Some(&run(Some("in_progress"), None))),
            Pipeline::Running
        );
        assert_eq!(
            classify_pipeline(Some(&run(Some("completed"), Some("success")))),
            Pipeline::Passing
        );
        assert_eq!(
            classify_pipeline(Some(&run(Some("completed"), Some("failure")))),
            Pipeline::Failing
        );
        assert_eq!(
            classify_pipeline(Some(&run(Some("completed"), Some("cancelled")))),
            Pipeline::Failing
        );
        assert_eq!(
            classify_pipeline(Some(&run(Some("completed"), Some("skipped")))),
            Pipeline::Flaky
        );
        assert_eq!(
            classify_pipeline(Some(&run(None, None))),
            Pipeline::Running
        );
    }

    #[test]
    fn failing_pipeline_is_risk_regardless_of_issues() {
        assert_eq!(classify_health(Pipeline::Failing, 0), Health::Risk);
        assert_eq!(classify_health(Pipeline::Failing, 100), Health::Risk);
    }

    #[test]
    fn issue_count_thresholds_dominate_passing_pipeline() {
        assert_eq!(classify_health(Pipeline::Passing, 15), Health::Risk);
        assert_eq!(classify_health(Pipeline::Passing, 12), Health::Risk);
        assert_eq!(classify_health(Pipeline::Passing, 6), Health::Watch);
        assert_eq!(classify_health(Pipeline::Passing, 3), Health::Healthy);
    }

    #[test]
    fn flaky_pipeline_is_watch() {
        assert_eq!(classify_health(Pipeline::Flaky, 0), Health::Watch);
        assert_eq!(classify_health(Pipeline::Flaky, 12), Health::Risk);
    }

    #[test]
    fn duration_requires_both_timestamps() {
        let mut r = timed_run("2026-08-01T10:00:00Z", "2026-08-01T10:01:30Z");
        assert_eq!(run_duration_seconds(&r), 90.0);
        r.run_started_at = None;
        assert_eq!(run_duration_seconds(&r), 0.0);
    }

    #[test]
    fn average_ignores_non_positive_durations() {
        let runs = vec![
            timed_run("2026-08-01T10:00:00Z", "2026-08-01T10:01:00Z"), // 60s
            timed_run("2026-08-01T11:00:00Z", "2026-08-01T11:03:00Z"), // 180s
            run(Some("completed"), Some("success")),                   // no timestamps
        ];
        assert_eq!(average_duration_seconds(&runs), 120.0);
        assert_eq!(total_minutes(&runs), 4);
        assert_eq!(average_duration_seconds(&[]), 0.0);
    }

    #[test]
    fn duration_formatting() {
        assert_eq!(format_duration(42.0), "42s");
        assert_eq!(format_duration(125.0), "2m 5s");
        assert_eq!(format_duration(0.0), "0s");
    }

    #[test]
    fn relative_time_formatting() {
        let now = Utc.with_ymd_and_hms(2026, 8, 30, 12, 0, 0).unwrap();
        assert_eq!(format_relative_time(None, now), "unknown");
        assert_eq!(
            format_relative_time(Some(now - chrono::Duration::minutes(5)), now),
            "5 minutes ago"
        );
        assert_eq!(
            format_relative_time(Some(now - chrono::Duration::hours(3)), now),
            "3 hours ago"
        );
        assert_eq!(
            format_relative_time(Some(now - chrono::Duration::days(2)), now),
            "2 days ago"
        );
    }
}
