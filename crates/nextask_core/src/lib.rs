pub mod alarm;
pub mod config;
pub mod error;
pub mod export;
pub mod milestones;
pub mod model;
pub mod motivation;
pub mod notify;
pub mod query;
pub mod storage;
pub mod task_api;

#[cfg(test)]
mod tests {
    use crate::error::AppError;
    use crate::model::{Category, Priority, Task};
    use time::macros::datetime;

    #[test]
    fn task_has_required_fields() {
        let task = Task {
            id: "task-1".to_string(),
            title: "demo".to_string(),
            description: String::new(),
            completed: false,
            priority: Priority::Medium,
            category: Category::Personal,
            due_date: None,
            created_at: datetime!(2025-12-20 00:00 UTC),
            modified_at: datetime!(2025-12-20 00:00 UTC),
        };

        assert_eq!(task.id, "task-1");
        assert_eq!(task.title, "demo");
        assert!(!task.completed);
        assert!(task.modified_at >= task.created_at);
    }

    #[test]
    fn app_error_exposes_code() {
        let err = AppError::validation("missing title");
        assert_eq!(err.code(), "validation_error");
        assert_eq!(err.message(), "missing title");
        assert_eq!(err.to_string(), "validation_error - missing title");
    }
}
