use crate::error::{GitpulseError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub sources: SourcesConfig,
}

#[derive(Debug, Serialize, Deserialize, Default)]
pub struct AuthConfig {
    pub token: Option<String>,
}

/// Where to look for repositories. Explicit repos take precedence over
/// org/user discovery; see `sources::resolve`.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SourcesConfig {
    /// Organizations whose repositories are discovered by listing.
    #[serde(default)]
    pub orgs: Vec<String>,
    /// Users whose repositories are discovered by listing.
    #[serde(default)]
    pub users: Vec<String>,
    /// Explicit `owner/repo` allow-list, bypassing discovery.
    #[serde(default)]
    pub repos: Vec<String>,
    /// Single-org convenience field, merged into `orgs`.
    pub org: Option<String>,
    /// Single-user convenience field, merged into `users`.
    pub user: Option<String>,
}

impl Config {
    /// Token if configured, `GITHUB_TOKEN` taking precedence over the file.
    pub fn token(&self) -> Option<String> {
        if let Ok(token) = std::env::var("GITHUB_TOKEN") {
            let token = token.trim().to_string();
            if !token.is_empty() {
                return Some(token);
            }
        }
        self.auth.token.clone()
    }

    pub fn require_token(&self) -> Result<String> {
        self.token().ok_or(GitpulseError::NotAuthenticated)
    }

    /// Source lists with environment overrides applied. A set env var
    /// replaces the corresponding file list entirely.
    pub fn effective_sources(&self) -> SourcesConfig {
        let mut sources = self.sources.clone();
        if let Some(orgs) = env_list("GITPULSE_ORGS") {
            sources.orgs = orgs;
        }
        if let Some(users) = env_list("GITPULSE_USERS") {
            sources.users = users;
        }
        if let Some(repos) = env_list("GITPULSE_REPOS") {
            sources.repos = repos;
        }
        sources
    }
}

/// Comma-separated env list: entries trimmed, empties dropped.
/// Returns `None` when the variable is unset.
fn env_list(var: &str) -> Option<Vec<String>> {
    let raw = std::env::var(var).ok()?;
    Some(split_list(&raw))
}

pub fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

pub fn config_path() -> Result<PathBuf> {
    if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
        let path = PathBuf::from(xdg).join("gitpulse").join("config.toml");
        return Ok(path);
    }

    let home = dirs::home_dir()
        .ok_or_else(|| GitpulseError::Config("Cannot find home directory".into()))?;
    Ok(home.join(".config").join("gitpulse").join("config.toml"))
}

pub fn load_config() -> Result<Config> {
    let path = config_path()?;
    if !path.exists() {
        return Ok(Config::default());
    }
    let contents = fs::read_to_string(&path)?;
    let config: Config = toml::from_str(&contents)?;
    Ok(config)
}

pub fn save_config(config: &Config) -> Result<()> {
    let path = config_path()?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let contents = toml::to_string_pretty(config)?;
    fs::write(&path, &contents)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let perms = fs::Permissions::from_mode(0o600);
        fs::set_permissions(&path, perms)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_roundtrip() {
        let config = Config {
            auth: AuthConfig {
                token: Some("ghp_test123".to_string()),
            },
            sources: SourcesConfig {
                orgs: vec!["acme".to_string()],
                users: vec!["octocat".to_string()],
                repos: vec!["acme/widget".to_string()],
                org: None,
                user: None,
            },
        };

        let serialized = toml::to_string_pretty(&config).unwrap();
        let deserialized: Config = toml::from_str(&serialized).unwrap();

        assert_eq!(deserialized.auth.token.as_deref(), Some("ghp_test123"));
        assert_eq!(deserialized.sources.orgs, vec!["acme".to_string()]);
        assert_eq!(deserialized.sources.repos, vec!["acme/widget".to_string()]);
    }

    #[test]
    fn config_deserialize_empty() {
        let config: Config = toml::from_str("").unwrap();
        assert!(config.auth.token.is_none());
        assert!(config.sources.orgs.is_empty());
        assert!(config.sources.org.is_none());
    }

    #[test]
    fn split_list_trims_and_drops_empties() {
        assert_eq!(
            split_list(" acme , octocat ,, widget-co "),
            vec!["acme", "octocat", "widget-co"]
        );
        assert!(split_list("").is_empty());
        assert!(split_list(" , ,").is_empty());
    }

    #[test]
    fn config_path_uses_xdg() {
        std::env::set_var("XDG_CONFIG_HOME", "/tmp/test_gitpulse_xdg");
        let path = config_path().unwrap();
        assert_eq!(
            path,
            PathBuf::from("/tmp/test_gitpulse_xdg/gitpulse/config.toml")
        );
        std::env::remove_var("XDG_CONFIG_HOME");
    }
}
