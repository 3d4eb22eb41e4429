//! To-do tasks, as stored in the `tasks` collection

use std::fmt::{Display, Formatter};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::outcome::ValidationError;

/// How urgent a task is
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Default for Priority {
    fn default() -> Self {
        Priority::Medium
    }
}

impl Display for Priority {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Priority::High => write!(f, "high"),
            Priority::Medium => write!(f, "medium"),
            Priority::Low => write!(f, "low"),
        }
    }
}

/// A to-do task, as the store returned it
///
/// Ids and timestamps are issued by the store. They cannot be changed by this crate.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Task {
    id: String,
    title: String,
    #[serde(default, deserialize_with = "crate::utils::null_as_default")]
    description: String,
    #[serde(default, deserialize_with = "crate::utils::null_as_default")]
    priority: Priority,
    #[serde(default, deserialize_with = "crate::utils::null_as_default")]
    completed: bool,
    #[serde(default, deserialize_with = "crate::utils::date_or_timestamp")]
    due_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "crate::utils::null_as_default")]
    tags: Vec<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Task {
    pub fn id(&self) -> &str              { &self.id          }
    pub fn title(&self) -> &str           { &self.title       }
    pub fn description(&self) -> &str    { &self.description }
    pub fn priority(&self) -> Priority    { self.priority     }
    pub fn completed(&self) -> bool       { self.completed    }
    pub fn due_date(&self) -> Option<NaiveDate>  { self.due_date }
    pub fn tags(&self) -> &[String]              { &self.tags }
    pub fn created_at(&self) -> &DateTime<Utc>   { &self.created_at }
    pub fn updated_at(&self) -> &DateTime<Utc>   { &self.updated_at }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    /// Only used to display a change before the store has confirmed it
    pub(crate) fn set_completed(&mut self, completed: bool) {
        self.completed = completed;
    }

    #[cfg(test)]
    pub(crate) fn new_for_tests(id: &str, title: &str, completed: bool) -> Self {
        Self {
            id: id.to_string(),
            title: title.to_string(),
            description: String::new(),
            priority: Priority::Medium,
            completed,
            due_date: None,
            tags: Vec::new(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }
}


/// Add a tag, unless it is blank or already there. Returns whether it has been added
pub fn add_tag(tags: &mut Vec<String>, tag: &str) -> bool {
    let tag = tag.trim();
    if tag.is_empty() || tags.iter().any(|t| t == tag) {
        return false;
    }
    tags.push(tag.to_string());
    true
}

/// Remove duplicated and blank tags, keeping the first occurrence of each
pub fn dedup_tags<I, S>(tags: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut result = Vec::new();
    for tag in tags {
        add_tag(&mut result, tag.as_ref());
    }
    result
}

fn check_title(title: &str) -> Result<(), ValidationError> {
    if title.trim().is_empty() {
        return Err(ValidationError::EmptyTitle);
    }
    Ok(())
}


/// The content of a task that is not in the store yet
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct NewTask {
    pub title: String,
    pub description: String,
    pub priority: Priority,
    pub completed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
    pub tags: Vec<String>,
}

impl NewTask {
    /// A task with an empty description, a medium priority, no tags, that is not completed
    pub fn new<S: ToString>(title: S) -> Self {
        Self {
            title: title.to_string(),
            description: String::new(),
            priority: Priority::default(),
            completed: false,
            due_date: None,
            tags: Vec::new(),
        }
    }

    pub fn add_tag(&mut self, tag: &str) -> bool {
        add_tag(&mut self.tags, tag)
    }

    pub fn remove_tag(&mut self, tag: &str) {
        self.tags.retain(|t| t != tag);
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        check_title(&self.title)
    }
}


/// Some fields of a task to overwrite. Fields that are `None` are left untouched
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct TaskChanges {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
    /// `Some(None)` clears the due date
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<Option<NaiveDate>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

impl TaskChanges {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title<S: ToString>(mut self, title: S) -> Self {
        self.title = Some(title.to_string());
        self
    }

    pub fn description<S: ToString>(mut self, description: S) -> Self {
        self.description = Some(description.to_string());
        self
    }

    pub fn priority(mut self, priority: Priority) -> Self {
        self.priority = Some(priority);
        self
    }

    pub fn completed(mut self, completed: bool) -> Self {
        self.completed = Some(completed);
        self
    }

    pub fn due_date(mut self, due_date: Option<NaiveDate>) -> Self {
        self.due_date = Some(due_date);
        self
    }

    /// Duplicated and blank tags are dropped
    pub fn tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.tags = Some(dedup_tags(tags));
        self
    }

    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        match &self.title {
            None => Ok(()),
            Some(title) => check_title(title),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn new_task_defaults() {
        let task = NewTask::new("Buy milk");
        assert_eq!(task.priority, Priority::Medium);
        assert_eq!(task.completed, false);
        assert!(task.validate().is_ok());

        assert_eq!(NewTask::new("   ").validate(), Err(ValidationError::EmptyTitle));
        assert_eq!(NewTask::new("").validate(), Err(ValidationError::EmptyTitle));
    }

    #[test]
    fn tags_are_deduplicated() {
        let mut task = NewTask::new("Buy milk");
        assert!(task.add_tag("shopping"));
        assert!(task.add_tag(" shopping ") == false);
        assert!(task.add_tag("") == false);
        assert!(task.add_tag("home"));
        assert_eq!(task.tags, vec!["shopping", "home"]);

        task.remove_tag("shopping");
        assert_eq!(task.tags, vec!["home"]);

        let changes = TaskChanges::new().tags(vec!["a", "b", "a", " "]);
        assert_eq!(changes.tags, Some(vec!["a".to_string(), "b".to_string()]));
    }

    #[test]
    fn changes_only_serialize_what_they_set() {
        let changes = TaskChanges::new().title("New").due_date(None);
        assert_eq!(serde_json::to_value(&changes).unwrap(), json!({ "title": "New", "due_date": null }));
        assert!(TaskChanges::new().is_empty());
        assert_eq!(TaskChanges::new().title("").validate(), Err(ValidationError::EmptyTitle));
    }

    #[test]
    fn tasks_from_store_rows() {
        let task: Task = serde_json::from_value(json!({
            "id": "8a1f",
            "title": "Write report",
            "description": null,
            "priority": "high",
            "completed": false,
            "due_date": "2021-03-05",
            "tags": null,
            "created_at": "2021-03-01T08:00:00.123456+00:00",
            "updated_at": "2021-03-01T08:00:00.123456+00:00",
        })).unwrap();

        assert_eq!(task.priority(), Priority::High);
        assert_eq!(task.description(), "");
        assert!(task.tags().is_empty());
        assert_eq!(task.due_date(), NaiveDate::from_ymd_opt(2021, 3, 5));
    }

    #[test]
    fn partial_store_rows() {
        let task: Task = serde_json::from_value(json!({
            "id": "8a1f",
            "title": "Write report",
            "priority": null,
            "completed": null,
            "due_date": "2021-03-05T23:30:00-02:00",
            "created_at": "2021-03-01T08:00:00Z",
            "updated_at": "2021-03-01T08:00:00Z",
        })).unwrap();

        assert_eq!(task.priority(), Priority::Medium);
        assert_eq!(task.completed(), false);
        assert_eq!(task.due_date(), NaiveDate::from_ymd_opt(2021, 3, 5));

        let no_due_date: Task = serde_json::from_value(json!({
            "id": "8a20",
            "title": "Call mum",
            "due_date": null,
            "created_at": "2021-03-01T08:00:00Z",
            "updated_at": "2021-03-01T08:00:00Z",
        })).unwrap();
        assert_eq!(no_due_date.due_date(), None);

        let invalid: Result<Task, _> = serde_json::from_value(json!({
            "id": "8a21",
            "title": "Call mum",
            "due_date": "next week",
            "created_at": "2021-03-01T08:00:00Z",
            "updated_at": "2021-03-01T08:00:00Z",
        }));
        assert!(invalid.is_err());
    }
}
