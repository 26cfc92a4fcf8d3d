use crate::config::SourcesConfig;
use serde::Serialize;
use std::collections::HashSet;
use std::fmt;

/// Operating mode derived from configuration.
///
/// Precedence: explicit repos beat org/user discovery, which beats nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SourceMode {
    None,
    ExplicitRepos,
    OrgsAndUsers,
}

impl fmt::Display for SourceMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SourceMode::None => "none",
            SourceMode::ExplicitRepos => "explicit-repos",
            SourceMode::OrgsAndUsers => "orgs-and-users",
        };
        f.write_str(label)
    }
}

/// A directly named `owner/repo` pair bypassing discovery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RepoRef {
    pub owner: String,
    pub name: String,
}

impl RepoRef {
    /// Parse an `owner/repo` string; entries without both halves are
    /// rejected.
    pub fn parse(raw: &str) -> Option<Self> {
        let (owner, name) = raw.split_once('/')?;
        let owner = owner.trim();
        let name = name.trim();
        if owner.is_empty() || name.is_empty() || name.contains('/') {
            return None;
        }
        Some(Self {
            owner: owner.to_string(),
            name: name.to_string(),
        })
    }
}

impl fmt::Display for RepoRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ResolvedSources {
    pub mode: SourceMode,
    pub repos: Vec<RepoRef>,
    pub organizations: Vec<String>,
    pub users: Vec<String>,
}

/// Derive the operating mode and effective source lists from configuration.
///
/// Pure function of its input. Single-org/single-user convenience fields are
/// merged into the lists, every list is de-duplicated keeping first
/// occurrence, and in explicit-repos mode the org/user sources are ignored
/// entirely.
pub fn resolve(config: &SourcesConfig) -> ResolvedSources {
    let repos = dedup(config.repos.iter().cloned());

    if !repos.is_empty() {
        return ResolvedSources {
            mode: SourceMode::ExplicitRepos,
            repos: repos.iter().filter_map(|r| RepoRef::parse(r)).collect(),
            organizations: Vec::new(),
            users: Vec::new(),
        };
    }

    let organizations = dedup(
        config
            .orgs
            .iter()
            .cloned()
            .chain(config.org.iter().cloned()),
    );
    let users = dedup(
        config
            .users
            .iter()
            .cloned()
            .chain(config.user.iter().cloned()),
    );

    let mode = if organizations.is_empty() && users.is_empty() {
        SourceMode::None
    } else {
        SourceMode::OrgsAndUsers
    };

    ResolvedSources {
        mode,
        repos: Vec::new(),
        organizations,
        users,
    }
}

fn dedup(items: impl Iterator<Item = String>) -> Vec<String> {
    let mut seen = HashSet::new();
    items
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .filter(|s| seen.insert(s.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(
        orgs: &[&str],
        users: &[&str],
        repos: &[&str],
    ) -> SourcesConfig {
        SourcesConfig {
            orgs: orgs.iter().map(|s| s.to_string()).collect(),
            users: users.iter().map(|s| s.to_string()).collect(),
            repos: repos.iter().map(|s| s.to_string()).collect(),
            org: None,
            user: None,
        }
    }

    #[test]
    fn empty_config_resolves_to_none() {
        let resolved = resolve(&config(&[], &[], &[]));
        assert_eq!(resolved.mode, SourceMode::None);
        assert!(resolved.repos.is_empty());
        assert!(resolved.organizations.is_empty());
        assert!(resolved.users.is_empty());
    }

    #[test]
    fn explicit_repos_take_precedence_over_sources() {
        let resolved = resolve(&config(&["acme"], &["octocat"], &["acme/widget"]));
        assert_eq!(resolved.mode, SourceMode::ExplicitRepos);
        assert_eq!(
            resolved.repos,
            vec![RepoRef {
                owner: "acme".into(),
                name: "widget".into()
            }]
        );
        // Org/user sources are ignored entirely in explicit mode.
        assert!(resolved.organizations.is_empty());
        assert!(resolved.users.is_empty());
    }

    #[test]
    fn orgs_or_users_resolve_to_discovery_mode() {
        let resolved = resolve(&config(&["acme"], &[], &[]));
        assert_eq!(resolved.mode, SourceMode::OrgsAndUsers);
        assert_eq!(resolved.organizations, vec!["acme"]);

        let resolved = resolve(&config(&[], &["octocat"], &[]));
        assert_eq!(resolved.mode, SourceMode::OrgsAndUsers);
        assert_eq!(resolved.users, vec!["octocat"]);
    }

    #[test]
    fn single_fields_merge_into_lists() {
        let mut cfg = config(&["acme"], &[], &[]);
        cfg.org = Some("acme".into());
        cfg.user = Some("octocat".into());
        let resolved = resolve(&cfg);
        assert_eq!(resolved.organizations, vec!["acme"]);
        assert_eq!(resolved.users, vec!["octocat"]);
    }

    #[test]
    fn lists_are_deduplicated_keeping_first_occurrence() {
        let resolved = resolve(&config(&["acme", "widget-co", "acme"], &[], &[]));
        assert_eq!(resolved.organizations, vec!["acme", "widget-co"]);

        let resolved = resolve(&config(&[], &[], &["a/x", "a/y", "a/x"]));
        assert_eq!(resolved.repos.len(), 2);
    }

    #[test]
    fn malformed_explicit_entries_are_dropped() {
        let resolved = resolve(&config(&[], &[], &["no-slash", "/empty-owner", "a/b"]));
        assert_eq!(resolved.mode, SourceMode::ExplicitRepos);
        assert_eq!(
            resolved.repos,
            vec![RepoRef {
                owner: "a".into(),
                name: "b".into()
            }]
        );
    }

    #[test]
    fn repo_ref_parsing() {
        assert_eq!(
            RepoRef::parse("acme/widget"),
            Some(RepoRef {
                owner: "acme".into(),
                name: "widget".into()
            })
        );
        assert_eq!(RepoRef::parse("acme"), None);
        assert_eq!(RepoRef::parse("acme/"), None);
        assert_eq!(RepoRef::parse("a/b/c"), None);
    }

    #[test]
    fn mode_labels() {
        assert_eq!(SourceMode::None.to_string(), "none");
        assert_eq!(SourceMode::ExplicitRepos.to_string(), "explicit-repos");
        assert_eq!(SourceMode::OrgsAndUsers.to_string(), "orgs-and-users");
    }
}
