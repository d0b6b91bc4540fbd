// Task record and its persisted JSON shape

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::warn;
use uuid::Uuid;

/// A single todo entry
///
/// Serialized with the field names `id`, `Todo` and `isCompleted` so lists
/// written by the browser version of the app load unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Opaque identifier, generated once and never reused
    pub id: String,

    #[serde(rename = "Todo", alias = "text")]
    pub text: String,

    #[serde(rename = "isCompleted", default)]
    pub is_completed: bool,
}

impl Task {
    /// Create a pending task with a fresh id
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            id: fresh_id(),
            text: text.into(),
            is_completed: false,
        }
    }
}

/// Generate a new task identifier (random UUID v4)
pub fn fresh_id() -> String {
    Uuid::new_v4().to_string()
}

/// Serialize the full task list for the persisted slot
pub fn encode_tasks(tasks: &[Task]) -> serde_json::Result<String> {
    serde_json::to_string(tasks)
}

/// Parse a persisted task list
///
/// Anything that is not a JSON array of tasks yields `None`. Duplicate ids
/// keep their first occurrence.
pub fn decode_tasks(raw: &str) -> Option<Vec<Task>> {
    let parsed: Vec<Task> = match serde_json::from_str(raw) {
        Ok(tasks) => tasks,
        Err(e) => {
            warn!(error = %e, "Persisted task list is malformed, ignoring it");
            return None;
        }
    };

    let mut seen = HashSet::new();
    let total = parsed.len();
    let tasks: Vec<Task> = parsed.into_iter().filter(|t| seen.insert(t.id.clone())).collect();

    if tasks.len() != total {
        warn!(dropped = total - tasks.len(), "Dropped tasks with duplicate ids");
    }

    Some(tasks)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_task_is_pending() {
        let task = Task::new("Buy milk");
        assert_eq!(task.text, "Buy milk");
        assert!(!task.is_completed);
        assert!(Uuid::parse_str(&task.id).is_ok());
    }

    #[test]
    fn test_fresh_ids_differ() {
        let ids: HashSet<String> = (0..100).map(|_| fresh_id()).collect();
        assert_eq!(ids.len(), 100);
    }

    #[test]
    fn test_serialized_field_names() {
        let task = Task {
            id: "a1".to_string(),
            text: "Walk dog".to_string(),
            is_completed: true,
        };

        let json = serde_json::to_string(&task).unwrap();
        assert_eq!(json, r#"{"id":"a1","Todo":"Walk dog","isCompleted":true}"#);
    }

    #[test]
    fn test_decode_accepts_text_alias() {
        let tasks = decode_tasks(r#"[{"id":"a1","text":"Draft","isCompleted":false}]"#).unwrap();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].text, "Draft");
    }

    #[test]
    fn test_decode_roundtrip_preserves_order() {
        let tasks = vec![
            Task {
                id: "b".to_string(),
                text: "second".to_string(),
                is_completed: true,
            },
            Task {
                id: "a".to_string(),
                text: "first".to_string(),
                is_completed: false,
            },
        ];

        let raw = encode_tasks(&tasks).unwrap();
        assert_eq!(decode_tasks(&raw).unwrap(), tasks);
    }

    #[test]
    fn test_decode_rejects_non_lists() {
        assert!(decode_tasks("{not json").is_none());
        assert!(decode_tasks("null").is_none());
        assert!(decode_tasks(r#"{"id":"a1"}"#).is_none());
        assert!(decode_tasks(r#"[{"id":"a1"}]"#).is_none());
    }

    #[test]
    fn test_decode_drops_duplicate_ids() {
        let raw = r#"[
            {"id":"a1","Todo":"kept","isCompleted":false},
            {"id":"a1","Todo":"dropped","isCompleted":true},
            {"id":"b2","Todo":"other","isCompleted":false}
        ]"#;

        let tasks = decode_tasks(raw).unwrap();
        assert_eq!(tasks.len(), 2);
        assert_eq!(tasks[0].text, "kept");
        assert_eq!(tasks[1].id, "b2");
    }
}
