use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};

/// Issue-tracker task - the star of the show
#[derive(Debug, Clone)]
pub struct Task {
    /// Numeric id; unique within one run and the key for all merging.
    pub id: u64,
    pub phid: String,
    pub title: String,
    pub status: String,
    pub priority: String,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
    pub author_phid: Option<String>,
    pub owner_phid: Option<String>,
    /// Direct link, `{base_url}/T{id}`.
    pub url: String,
    /// Names of the matched projects, first match first. Filled during
    /// aggregation; empty as the task comes off the wire.
    pub projects: Vec<String>,
}

/// A project as listed by the tracker
#[derive(Debug, Clone)]
pub struct Project {
    pub phid: String,
    pub name: String,
}

/// A user snapshot entry
#[derive(Debug, Clone)]
pub struct User {
    pub phid: String,
    pub username: String,
    pub real_name: Option<String>,
    pub roles: Vec<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub disabled: bool,
    pub bot: bool,
    pub mailing_list: bool,
    pub system_agent: bool,
}

/// The full project listing, fetched once per run and read-only after that.
///
/// Keeps the tracker's listing order so name resolution can pick the first
/// match deterministically.
#[derive(Debug, Clone, Default)]
pub struct ProjectDirectory {
    projects: Vec<Project>,
    by_phid: HashMap<String, usize>,
}

impl ProjectDirectory {
    pub fn new(projects: Vec<Project>) -> Self {
        let mut by_phid = HashMap::new();
        for (idx, project) in projects.iter().enumerate() {
            by_phid.entry(project.phid.clone()).or_insert(idx);
        }
        Self { projects, by_phid }
    }

    pub fn len(&self) -> usize {
        self.projects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.projects.is_empty()
    }

    /// Every known project PHID, in listing order.
    pub fn all_phids(&self) -> Vec<String> {
        self.projects.iter().map(|p| p.phid.clone()).collect()
    }

    /// PHID of the first project whose name matches exactly, case-sensitive.
    pub fn phid_for_name(&self, name: &str) -> Option<&str> {
        self.projects
            .iter()
            .find(|p| p.name == name)
            .map(|p| p.phid.as_str())
    }

    /// Display name for a PHID, `None` for entries the tracker never listed.
    pub fn name_of(&self, phid: &str) -> Option<&str> {
        self.by_phid
            .get(phid)
            .map(|&idx| self.projects[idx].name.as_str())
    }
}

/// Inclusive calendar window as epoch-second bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub start: i64,
    pub end: i64,
}

impl TimeWindow {
    /// Both bounds land on 00:00:00 UTC of their date.
    pub fn from_dates(start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            start: start.and_time(NaiveTime::MIN).and_utc().timestamp(),
            end: end.and_time(NaiveTime::MIN).and_utc().timestamp(),
        }
    }
}

/// Which task timestamp the search window constrains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DateField {
    Created,
    #[default]
    Modified,
}

/// How multiple project constraints combine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CombineMode {
    /// Tasks in at least one requested project, one query per project,
    /// merged afterwards.
    #[default]
    Any,
    /// Tasks in every requested project at once, one combined query.
    All,
}

/// One maniphest search as the aggregator issues it.
#[derive(Debug, Clone)]
pub struct TaskFilter {
    /// Resolved project PHIDs. Empty means no project constraint.
    pub project_phids: Vec<String>,
    pub window: TimeWindow,
    pub date_field: DateField,
    /// Status names passed through verbatim. Empty means the server default.
    pub statuses: Vec<String>,
    /// Page size only; pagination still runs every query to exhaustion.
    pub limit: u32,
}
