use serde::Deserialize;

/// One task item from `maniphest.search`.
#[derive(Debug, Clone, Deserialize)]
pub struct TaskData {
    pub id: u64,
    pub phid: String,
    #[serde(default)]
    pub fields: TaskFields,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TaskFields {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub status: EnumField,
    #[serde(default)]
    pub priority: EnumField,
    #[serde(default, rename = "dateCreated")]
    pub date_created: i64,
    #[serde(default, rename = "dateModified")]
    pub date_modified: i64,
    #[serde(default, rename = "authorPHID")]
    pub author_phid: Option<String>,
    #[serde(default, rename = "ownerPHID")]
    pub owner_phid: Option<String>,
}

/// Conduit renders enumerated fields as `{value, name, color}` objects;
/// only the display name matters for reporting.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EnumField {
    #[serde(default)]
    pub name: String,
}

/// One project item from `project.search`.
#[derive(Debug, Clone, Deserialize)]
pub struct ProjectData {
    pub phid: String,
    #[serde(default)]
    pub fields: ProjectFields,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProjectFields {
    #[serde(default)]
    pub name: String,
}

/// One user item from `user.search`.
#[derive(Debug, Clone, Deserialize)]
pub struct UserData {
    pub phid: String,
    #[serde(default)]
    pub fields: UserFields,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserFields {
    #[serde(default)]
    pub username: String,
    #[serde(default, rename = "realName")]
    pub real_name: Option<String>,
    #[serde(default)]
    pub roles: Vec<String>,
    #[serde(default, rename = "dateCreated")]
    pub date_created: Option<i64>,
    #[serde(default, rename = "isDisabled")]
    pub disabled: bool,
    #[serde(default, rename = "isBot")]
    pub bot: bool,
    #[serde(default, rename = "isMailingList")]
    pub mailing_list: bool,
    #[serde(default, rename = "isSystemAgent")]
    pub system_agent: bool,
}

/// One entry from `phid.lookup`, keyed by the queried name.
#[derive(Debug, Clone, Deserialize)]
pub struct LookupEntry {
    pub phid: String,
    #[serde(default, rename = "fullName")]
    pub full_name: Option<String>,
    #[serde(default, rename = "typeName")]
    pub type_name: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn deserializes_task_item() {
        let task: TaskData = serde_json::from_value(json!({
            "id": 4521,
            "type": "TASK",
            "phid": "PHID-TASK-abcd1234",
            "fields": {
                "name": "Fix login redirect loop",
                "authorPHID": "PHID-USER-author11",
                "ownerPHID": null,
                "status": {"value": "open", "name": "Open", "color": null},
                "priority": {"value": 80, "name": "High", "color": "red"},
                "dateCreated": 1714003200,
                "dateModified": 1714521600
            }
        }))
        .unwrap();

        assert_eq!(task.id, 4521);
        assert_eq!(task.phid, "PHID-TASK-abcd1234");
        assert_eq!(task.fields.name, "Fix login redirect loop");
        assert_eq!(task.fields.status.name, "Open");
        assert_eq!(task.fields.priority.name, "High");
        assert_eq!(task.fields.date_created, 1714003200);
        assert_eq!(task.fields.date_modified, 1714521600);
        assert_eq!(task.fields.author_phid.as_deref(), Some("PHID-USER-author11"));
        assert_eq!(task.fields.owner_phid, None);
    }

    #[test]
    fn missing_task_fields_fall_back_to_defaults() {
        let task: TaskData = serde_json::from_value(json!({
            "id": 7,
            "phid": "PHID-TASK-sparse"
        }))
        .unwrap();

        assert_eq!(task.fields.name, "");
        assert_eq!(task.fields.status.name, "");
        assert_eq!(task.fields.date_created, 0);
        assert_eq!(task.fields.author_phid, None);
    }

    #[test]
    fn deserializes_user_item() {
        let user: UserData = serde_json::from_value(json!({
            "id": 12,
            "type": "USER",
            "phid": "PHID-USER-xyz",
            "fields": {
                "username": "alice",
                "realName": "Alice Liddell",
                "roles": ["verified", "approved", "activated"],
                "dateCreated": 1600000000,
                "isDisabled": false,
                "isBot": false,
                "isMailingList": false,
                "isSystemAgent": false
            }
        }))
        .unwrap();

        assert_eq!(user.phid, "PHID-USER-xyz");
        assert_eq!(user.fields.username, "alice");
        assert_eq!(user.fields.real_name.as_deref(), Some("Alice Liddell"));
        assert_eq!(user.fields.roles.len(), 3);
        assert!(!user.fields.bot);
    }

    #[test]
    fn deserializes_project_and_lookup_items() {
        let project: ProjectData = serde_json::from_value(json!({
            "id": 3,
            "phid": "PHID-PROJ-backend",
            "fields": {"name": "Backend", "slug": "backend"}
        }))
        .unwrap();

        assert_eq!(project.phid, "PHID-PROJ-backend");
        assert_eq!(project.fields.name, "Backend");

        let entry: LookupEntry = serde_json::from_value(json!({
            "phid": "PHID-USER-bob",
            "uri": "https://phab.example.com/p/bob/",
            "fullName": "bob (Bob Ross)",
            "typeName": "User"
        }))
        .unwrap();

        assert_eq!(entry.phid, "PHID-USER-bob");
        assert_eq!(entry.full_name.as_deref(), Some("bob (Bob Ross)"));
        assert_eq!(entry.type_name.as_deref(), Some("User"));
    }
}
