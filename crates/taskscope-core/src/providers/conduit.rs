// Conduit provider - bridges the wire client with the TrackerSource trait
use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use taskscope_api::{
    Conduit, ConduitClient, LookupEntry, PagedQuery, ParamMap, ProjectData, TaskData, UserData,
};

use crate::{
    models::{DateField, Project, Task, TaskFilter, User},
    source::TrackerSource,
    Error, Result,
};

/// `TrackerSource` over a live Conduit endpoint.
pub struct ConduitTracker {
    conduit: ConduitClient,
}

impl ConduitTracker {
    pub fn new(base_url: &str, token: &str) -> Self {
        Self {
            conduit: ConduitClient::new(base_url, token),
        }
    }

    pub fn base_url(&self) -> &str {
        self.conduit.base_url()
    }
}

#[async_trait]
impl TrackerSource for ConduitTracker {
    async fn projects(&self) -> Result<Vec<Project>> {
        let query: PagedQuery<ProjectData> =
            PagedQuery::new(&self.conduit, "project.search", ParamMap::new());
        let items = query.collect_all().await?;
        Ok(items.into_iter().map(project_from_wire).collect())
    }

    async fn users(&self) -> Result<Vec<User>> {
        let query: PagedQuery<UserData> =
            PagedQuery::new(&self.conduit, "user.search", user_listing_params());
        let items = query.collect_all().await?;
        Ok(items.into_iter().map(user_from_wire).collect())
    }

    async fn user_by_username(&self, username: &str) -> Result<Option<User>> {
        let mut params = ParamMap::new();
        params.insert("constraints[usernames][0]".to_string(), username.to_string());

        let query: PagedQuery<UserData> = PagedQuery::new(&self.conduit, "user.search", params);
        let users = query.collect_all().await?;
        Ok(users.into_iter().next().map(user_from_wire))
    }

    async fn lookup_phid(&self, name: &str) -> Result<Option<String>> {
        let mut params = ParamMap::new();
        params.insert("names[0]".to_string(), name.to_string());

        let result = self.conduit.call("phid.lookup", &params).await?;
        let entries = decode_lookup(result)?;
        Ok(entries.get(name).map(|entry| entry.phid.clone()))
    }

    async fn tasks(&self, filter: &TaskFilter) -> Result<Vec<Task>> {
        let query: PagedQuery<TaskData> =
            PagedQuery::new(&self.conduit, "maniphest.search", task_params(filter));
        let items = query.collect_all().await?;
        Ok(items
            .into_iter()
            .map(|item| task_from_wire(item, self.conduit.base_url()))
            .collect())
    }
}

/// Flatten a task filter into Conduit constraint parameters.
fn task_params(filter: &TaskFilter) -> ParamMap {
    let mut params = ParamMap::new();
    params.insert("order".to_string(), "created".to_string());
    params.insert("limit".to_string(), filter.limit.to_string());

    for (i, phid) in filter.project_phids.iter().enumerate() {
        params.insert(format!("constraints[projects][{}]", i), phid.clone());
    }
    for (i, status) in filter.statuses.iter().enumerate() {
        params.insert(format!("constraints[statuses][{}]", i), status.clone());
    }

    let (start_key, end_key) = match filter.date_field {
        DateField::Created => ("constraints[createdStart]", "constraints[createdEnd]"),
        DateField::Modified => ("constraints[modifiedStart]", "constraints[modifiedEnd]"),
    };
    params.insert(start_key.to_string(), filter.window.start.to_string());
    params.insert(end_key.to_string(), filter.window.end.to_string());

    params
}

fn user_listing_params() -> ParamMap {
    let mut params = ParamMap::new();
    params.insert("order".to_string(), "newest".to_string());
    params.insert("limit".to_string(), "100".to_string());
    params
}

/// `phid.lookup` returns a name-keyed object, except that an empty result
/// comes back as `[]`.
fn decode_lookup(result: serde_json::Value) -> Result<HashMap<String, LookupEntry>> {
    if matches!(&result, serde_json::Value::Array(items) if items.is_empty()) {
        return Ok(HashMap::new());
    }
    serde_json::from_value(result)
        .map_err(|e| Error::Transport(format!("Malformed phid.lookup response: {}", e)))
}

/// Convert a maniphest.search item to the domain task. Provenance starts
/// empty; the aggregator fills it in.
fn task_from_wire(data: TaskData, base_url: &str) -> Task {
    Task {
        id: data.id,
        url: format!("{}/T{}", base_url, data.id),
        phid: data.phid,
        title: data.fields.name,
        status: data.fields.status.name,
        priority: data.fields.priority.name,
        created_at: epoch_to_utc(data.fields.date_created),
        modified_at: epoch_to_utc(data.fields.date_modified),
        author_phid: data.fields.author_phid,
        owner_phid: data.fields.owner_phid,
        projects: Vec::new(),
    }
}

fn project_from_wire(data: ProjectData) -> Project {
    Project {
        phid: data.phid,
        name: data.fields.name,
    }
}

fn user_from_wire(data: UserData) -> User {
    User {
        phid: data.phid,
        username: data.fields.username,
        real_name: data.fields.real_name,
        roles: data.fields.roles,
        created_at: data.fields.date_created.map(epoch_to_utc),
        disabled: data.fields.disabled,
        bot: data.fields.bot,
        mailing_list: data.fields.mailing_list,
        system_agent: data.fields.system_agent,
    }
}

fn epoch_to_utc(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(secs, 0).single().unwrap_or_default()
}
