use std::collections::HashMap;

use tracing::{debug, warn};

use crate::{models::ProjectDirectory, source::TrackerSource, Result};

/// Resolve requested project names against the prefetched directory.
///
/// An empty request means every project, in listing order. Matching is exact
/// and case-sensitive; unmatched names are dropped; duplicate requests
/// collapse to one PHID. No network calls happen here.
pub fn resolve_projects(directory: &ProjectDirectory, requested: &[String]) -> Vec<String> {
    if requested.is_empty() {
        return directory.all_phids();
    }

    let mut phids: Vec<String> = Vec::new();
    for name in requested {
        match directory.phid_for_name(name) {
            Some(phid) => {
                if !phids.iter().any(|p| p == phid) {
                    phids.push(phid.to_string());
                }
            }
            None => debug!(project = %name, "project name did not match, skipping"),
        }
    }
    phids
}

/// Resolve one username to a PHID, trying strategies in order: a verbatim
/// `PHID-` input (no network), exact username search, generic name lookup,
/// then a full scan matching username or real name. First hit wins.
pub async fn resolve_user(source: &dyn TrackerSource, username: &str) -> Result<Option<String>> {
    if username.starts_with("PHID-") {
        return Ok(Some(username.to_string()));
    }

    if let Some(user) = source.user_by_username(username).await? {
        return Ok(Some(user.phid));
    }

    // Lookup failures fall through to the scan instead of aborting
    match source.lookup_phid(username).await {
        Ok(Some(phid)) => return Ok(Some(phid)),
        Ok(None) => {}
        Err(err) => debug!(username, error = %err, "phid lookup failed, trying full scan"),
    }

    let users = source.users().await?;
    Ok(users
        .into_iter()
        .find(|user| user.username == username || user.real_name.as_deref() == Some(username))
        .map(|user| user.phid))
}

/// Resolve a team roster to a `username -> PHID` map.
///
/// Best-effort: an unresolved or failing entry is logged and skipped, the
/// remaining entries are still attempted. Absence from the map means "not
/// found", never a fatal condition.
pub async fn resolve_team(
    source: &dyn TrackerSource,
    usernames: &[String],
) -> HashMap<String, String> {
    let mut resolved = HashMap::new();
    for username in usernames {
        match resolve_user(source, username).await {
            Ok(Some(phid)) => {
                resolved.insert(username.clone(), phid);
            }
            Ok(None) => warn!(username = %username, "user not found"),
            Err(err) => warn!(username = %username, error = %err, "user resolution failed, skipping"),
        }
    }
    resolved
}
