use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use time::OffsetDateTime;

use crate::error::AppError;

/// A single to-do item. Field names on disk follow the `nextask-tasks` key layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub category: Category,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub due_date: Option<OffsetDateTime>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub modified_at: OffsetDateTime,
}

impl Task {
    pub fn is_overdue_at(&self, now: OffsetDateTime) -> bool {
        !self.completed && self.due_date.is_some_and(|due| due < now)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    Urgent,
}

impl Priority {
    pub fn rank(self) -> u8 {
        match self {
            Self::Urgent => 3,
            Self::Medium => 2,
            Self::Low => 1,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::Urgent => "urgent",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = AppError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "urgent" => Ok(Self::Urgent),
            other => Err(AppError::validation(format!("unknown priority '{other}'"))),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Work,
    #[default]
    Personal,
    Shopping,
    Health,
}

impl Category {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Work => "work",
            Self::Personal => "personal",
            Self::Shopping => "shopping",
            Self::Health => "health",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = AppError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "work" => Ok(Self::Work),
            "personal" => Ok(Self::Personal),
            "shopping" => Ok(Self::Shopping),
            "health" => Ok(Self::Health),
            other => Err(AppError::validation(format!("unknown category '{other}'"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Category, Priority, Task};
    use time::macros::datetime;

    fn sample() -> Task {
        Task {
            id: "task-1".to_string(),
            title: "demo".to_string(),
            description: String::new(),
            completed: false,
            priority: Priority::Medium,
            category: Category::Personal,
            due_date: Some(datetime!(2020-01-01 00:00 UTC)),
            created_at: datetime!(2019-12-01 00:00 UTC),
            modified_at: datetime!(2019-12-01 00:00 UTC),
        }
    }

    #[test]
    fn serializes_with_camel_case_keys() {
        let value = serde_json::to_value(sample()).unwrap();

        assert_eq!(value["dueDate"], "2020-01-01T00:00:00Z");
        assert_eq!(value["createdAt"], "2019-12-01T00:00:00Z");
        assert_eq!(value["priority"], "medium");
        assert_eq!(value["category"], "personal");
        assert!(value.get("due_date").is_none());
    }

    #[test]
    fn missing_optional_fields_take_defaults() {
        let raw = r#"{
            "id": "task-1",
            "title": "demo",
            "createdAt": "2025-12-20T00:00:00Z",
            "modifiedAt": "2025-12-20T00:00:00Z"
        }"#;

        let task: Task = serde_json::from_str(raw).unwrap();

        assert_eq!(task.description, "");
        assert!(!task.completed);
        assert_eq!(task.priority, Priority::Medium);
        assert_eq!(task.category, Category::Personal);
        assert_eq!(task.due_date, None);
    }

    #[test]
    fn overdue_requires_pending_task_with_past_due_date() {
        let now = datetime!(2025-01-01 00:00 UTC);
        let mut task = sample();
        assert!(task.is_overdue_at(now));

        task.completed = true;
        assert!(!task.is_overdue_at(now));

        task.completed = false;
        task.due_date = None;
        assert!(!task.is_overdue_at(now));

        task.due_date = Some(now);
        assert!(!task.is_overdue_at(now));
    }

    #[test]
    fn priority_and_category_parse_case_insensitively() {
        assert_eq!(" Urgent ".parse::<Priority>().unwrap(), Priority::Urgent);
        assert_eq!("SHOPPING".parse::<Category>().unwrap(), Category::Shopping);
        assert_eq!("later".parse::<Priority>().unwrap_err().code(), "validation_error");
        assert!(Priority::Urgent.rank() > Priority::Medium.rank());
        assert!(Priority::Medium.rank() > Priority::Low.rank());
    }
}
