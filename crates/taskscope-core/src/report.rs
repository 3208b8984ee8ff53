use std::collections::{HashMap, HashSet};

use crate::models::{Task, User};

/// Build the `PHID -> username` display map from the user snapshot.
pub fn username_map(users: &[User]) -> HashMap<String, String> {
    users
        .iter()
        .filter(|user| !user.username.is_empty())
        .map(|user| (user.phid.clone(), user.username.clone()))
        .collect()
}

/// Keep tasks whose owner or author is on the team.
pub fn filter_by_team(tasks: Vec<Task>, team_phids: &HashSet<String>) -> Vec<Task> {
    tasks
        .into_iter()
        .filter(|task| is_team_task(task, team_phids))
        .collect()
}

fn is_team_task(task: &Task, team_phids: &HashSet<String>) -> bool {
    let owned = task
        .owner_phid
        .as_ref()
        .map_or(false, |phid| team_phids.contains(phid));
    let authored = task
        .author_phid
        .as_ref()
        .map_or(false, |phid| team_phids.contains(phid));
    owned || authored
}

/// Resolve a PHID to a display username, falling back to the raw PHID and
/// blank when the task has none.
pub fn display_name(phid: &Option<String>, usernames: &HashMap<String, String>) -> String {
    match phid {
        Some(phid) => usernames.get(phid).cloned().unwrap_or_else(|| phid.clone()),
        None => String::new(),
    }
}

/// Render one task block for the console report. No trailing newline.
pub fn render_task(task: &Task, usernames: &HashMap<String, String>) -> String {
    let mut out = String::new();
    out.push_str(&format!("T{}: {}\n", task.id, task.title));
    out.push_str(&format!("  Status: {}\n", task.status));
    out.push_str(&format!("  Projects: {}\n", task.projects.join(", ")));
    out.push_str(&format!("  Priority: {}\n", task.priority));
    out.push_str(&format!(
        "  Created: {}\n",
        task.created_at.format("%Y-%m-%d %H:%M:%S")
    ));
    out.push_str(&format!(
        "  Modified: {}\n",
        task.modified_at.format("%Y-%m-%d %H:%M:%S")
    ));
    out.push_str(&format!("  URL: {}\n", task.url));
    out.push_str(&format!(
        "  Author: {}\n",
        display_name(&task.author_phid, usernames)
    ));
    out.push_str(&format!(
        "  Owner: {}",
        display_name(&task.owner_phid, usernames)
    ));
    out
}
