// End-to-end report flow over a scripted tracker: resolve, aggregate,
// filter by team, export.
use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use chrono::{TimeZone, Utc};

use taskscope_core::{
    report, resolver, CombineMode, CsvExporter, DateField, Project, ProjectDirectory, Task,
    TaskAggregator, TaskFilter, TimeWindow, TrackerSource, User,
};

fn project(phid: &str, name: &str) -> Project {
    Project {
        phid: phid.to_string(),
        name: name.to_string(),
    }
}

fn user(phid: &str, username: &str) -> User {
    User {
        phid: phid.to_string(),
        username: username.to_string(),
        real_name: None,
        roles: vec!["verified".to_string()],
        created_at: None,
        disabled: false,
        bot: false,
        mailing_list: false,
        system_agent: false,
    }
}

fn task(id: u64, created: i64, owner: Option<&str>, author: Option<&str>) -> Task {
    Task {
        id,
        phid: format!("PHID-TASK-{}", id),
        title: format!("Task {}", id),
        status: "Open".to_string(),
        priority: "Normal".to_string(),
        created_at: Utc.timestamp_opt(created, 0).unwrap(),
        modified_at: Utc.timestamp_opt(created + 3600, 0).unwrap(),
        author_phid: author.map(str::to_string),
        owner_phid: owner.map(str::to_string),
        url: format!("https://phab.example.com/T{}", id),
        projects: Vec::new(),
    }
}

/// Three projects; task 2 lives in both Alpha and Beta.
struct FakeTracker {
    projects: Vec<Project>,
    users: Vec<User>,
    tasks_by_project: HashMap<String, Vec<Task>>,
}

impl FakeTracker {
    fn new() -> Self {
        let mut tasks_by_project = HashMap::new();
        tasks_by_project.insert(
            "PHID-PROJ-a".to_string(),
            vec![
                task(1, 300, Some("PHID-USER-alice"), None),
                task(2, 200, Some("PHID-USER-bob"), Some("PHID-USER-bob")),
            ],
        );
        tasks_by_project.insert(
            "PHID-PROJ-b".to_string(),
            vec![task(2, 200, Some("PHID-USER-bob"), Some("PHID-USER-bob"))],
        );
        tasks_by_project.insert(
            "PHID-PROJ-c".to_string(),
            vec![task(3, 100, Some("PHID-USER-alice"), None)],
        );

        Self {
            projects: vec![
                project("PHID-PROJ-a", "Alpha"),
                project("PHID-PROJ-b", "Beta"),
                project("PHID-PROJ-c", "Gamma"),
            ],
            users: vec![
                user("PHID-USER-alice", "alice"),
                user("PHID-USER-bob", "bob"),
            ],
            tasks_by_project,
        }
    }
}

#[async_trait]
impl TrackerSource for FakeTracker {
    async fn projects(&self) -> taskscope_core::Result<Vec<Project>> {
        Ok(self.projects.clone())
    }

    async fn users(&self) -> taskscope_core::Result<Vec<User>> {
        Ok(self.users.clone())
    }

    async fn user_by_username(&self, username: &str) -> taskscope_core::Result<Option<User>> {
        Ok(self.users.iter().find(|u| u.username == username).cloned())
    }

    async fn lookup_phid(&self, _name: &str) -> taskscope_core::Result<Option<String>> {
        Ok(None)
    }

    async fn tasks(&self, filter: &TaskFilter) -> taskscope_core::Result<Vec<Task>> {
        Ok(filter
            .project_phids
            .first()
            .and_then(|phid| self.tasks_by_project.get(phid))
            .cloned()
            .unwrap_or_default())
    }
}

fn window() -> TimeWindow {
    TimeWindow { start: 0, end: 1000 }
}

#[tokio::test]
async fn team_report_flow_in_any_mode() {
    let tracker = FakeTracker::new();

    let directory = ProjectDirectory::new(tracker.projects().await.unwrap());
    assert_eq!(directory.len(), 3);

    // No project filter selects everything, in listing order
    let project_phids = resolver::resolve_projects(&directory, &[]);
    assert_eq!(project_phids.len(), 3);

    let team = resolver::resolve_team(&tracker, &["alice".to_string()]).await;
    assert_eq!(team["alice"], "PHID-USER-alice");

    let filter = TaskFilter {
        project_phids,
        window: window(),
        date_field: DateField::Modified,
        statuses: vec!["open".to_string(), "resolved".to_string()],
        limit: 100,
    };

    let aggregator = TaskAggregator::new(&tracker, &directory);
    let tasks = aggregator.collect(&filter, CombineMode::Any).await.unwrap();

    // Task 2 was found under Alpha and Beta but appears once
    assert_eq!(tasks.len(), 3);
    let shared = tasks.iter().find(|t| t.id == 2).unwrap();
    assert_eq!(shared.projects, vec!["Alpha", "Beta"]);

    // Newest created first
    let ids: Vec<u64> = tasks.iter().map(|t| t.id).collect();
    assert_eq!(ids, vec![1, 2, 3]);

    let team_phids: HashSet<String> = team.values().cloned().collect();
    let retained = report::filter_by_team(tasks, &team_phids);

    // Task 2 belongs to bob and drops out
    let retained_ids: Vec<u64> = retained.iter().map(|t| t.id).collect();
    assert_eq!(retained_ids, vec![1, 3]);
}

#[tokio::test]
async fn csv_export_round_trips_through_a_file() {
    let tracker = FakeTracker::new();
    let directory = ProjectDirectory::new(tracker.projects().await.unwrap());

    let filter = TaskFilter {
        project_phids: resolver::resolve_projects(&directory, &["Alpha".to_string()]),
        window: window(),
        date_field: DateField::Created,
        statuses: Vec::new(),
        limit: 100,
    };

    let aggregator = TaskAggregator::new(&tracker, &directory);
    let tasks = aggregator.collect(&filter, CombineMode::Any).await.unwrap();
    let usernames = report::username_map(&tracker.users().await.unwrap());

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("report.csv");
    CsvExporter::write_to_file(&tasks, &usernames, &path).unwrap();

    let contents = std::fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = contents.lines().collect();

    assert_eq!(lines.len(), 3);
    assert_eq!(
        lines[0],
        "id,title,projects,status,priority,created,modified,url,author,owner"
    );
    // Owner and author PHIDs render as usernames
    assert!(lines[1].starts_with("1,Task 1,Alpha,Open,Normal,"));
    assert!(lines[1].ends_with(",alice"));
    assert!(lines[2].starts_with("2,Task 2,Alpha,"));
    assert!(lines[2].contains(",bob,bob"));
    assert!(lines[2].contains("https://phab.example.com/T2"));
}
