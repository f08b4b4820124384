use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

/// A task as stored in the database and returned by the API.
///
/// Always owned by exactly one user; every query against this table is
/// scoped by `user_id` taken from the session context.
#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct Task {
    pub id: Uuid,
    pub user_id: i32,
    pub title: String,
    pub description: Option<String>,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input structure for creating or updating a task.
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct TaskInput {
    #[validate(length(min = 1, max = 200))]
    pub title: String,

    #[validate(length(max = 1000))]
    pub description: Option<String>,

    /// Defaults to false on creation; updates send the full desired state.
    #[serde(default)]
    pub completed: bool,
}

impl Task {
    pub fn new(input: TaskInput, user_id: i32) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id,
            title: input.title,
            description: input.description,
            completed: input.completed,
            created_at: now,
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_creation() {
        let input = TaskInput {
            title: "Write report".to_string(),
            description: Some("Quarterly numbers".to_string()),
            completed: false,
        };

        let task = Task::new(input, 1);
        assert_eq!(task.title, "Write report");
        assert_eq!(task.user_id, 1);
        assert!(!task.completed);
    }

    #[test]
    fn test_task_input_validation() {
        let valid = TaskInput {
            title: "Valid Task".to_string(),
            description: Some("Valid Description".to_string()),
            completed: false,
        };
        assert!(valid.validate().is_ok());

        let empty_title = TaskInput {
            title: "".to_string(),
            description: None,
            completed: false,
        };
        assert!(empty_title.validate().is_err());

        let long_title = TaskInput {
            title: "a".repeat(201),
            description: None,
            completed: false,
        };
        assert!(long_title.validate().is_err());

        let long_description = TaskInput {
            title: "Valid Task".to_string(),
            description: Some("b".repeat(1001)),
            completed: true,
        };
        assert!(long_description.validate().is_err());
    }

    #[test]
    fn test_completed_defaults_to_false_on_deserialize() {
        let input: TaskInput = serde_json::from_str(r#"{"title": "No flag"}"#).unwrap();
        assert!(!input.completed);
    }
}
