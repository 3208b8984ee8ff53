use crate::{Error, Result};

/// Runtime configuration read from the environment
///
/// `PHABRICATOR_URL` and `API_TOKEN` are mandatory and checked before any
/// network call. `DEVTEAM_MEMBERS` is an optional comma-separated list of
/// usernames (or PHIDs) making up the team roster.
#[derive(Debug, Clone)]
pub struct Config {
    /// Tracker root, stored without a trailing slash.
    pub base_url: String,
    /// Opaque Conduit token, passed through as-is.
    pub api_token: String,
    pub team_members: Vec<String>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as `from_env` with the variable lookup injected, so parsing is
    /// testable without touching the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let base_url = required(&lookup, "PHABRICATOR_URL")?;
        let api_token = required(&lookup, "API_TOKEN")?;
        let team_members = lookup("DEVTEAM_MEMBERS")
            .map(|raw| split_list(&raw))
            .unwrap_or_default();

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_token,
            team_members,
        })
    }
}

fn required<F>(lookup: &F, name: &str) -> Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        Some(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(Error::Config(format!(
            "{} environment variable is not set",
            name
        ))),
    }
}

/// Split a comma-separated list, trimming entries and dropping empty ones.
pub fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(str::to_string)
        .collect()
}
