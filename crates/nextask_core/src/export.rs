use crate::error::AppError;
use crate::model::Task;
use std::path::{Path, PathBuf};
use time::Date;
use time::macros::format_description;

pub fn export_file_name(date: Date) -> Result<String, AppError> {
    let stamp = date
        .format(format_description!("[year]-[month]-[day]"))
        .map_err(|err| AppError::invalid_data(err.to_string()))?;
    Ok(format!("nextask-tasks-{stamp}.json"))
}

/// Pretty-printed JSON array in the same shape as the stored collection.
pub fn export_json(tasks: &[Task]) -> Result<String, AppError> {
    serde_json::to_string_pretty(tasks).map_err(|err| AppError::invalid_data(err.to_string()))
}

pub fn export_to_dir(tasks: &[Task], dir: &Path, today: Date) -> Result<PathBuf, AppError> {
    std::fs::create_dir_all(dir)
        .map_err(|err| AppError::io(format!("{}: {}", dir.display(), err)))?;
    let path = dir.join(export_file_name(today)?);
    std::fs::write(&path, export_json(tasks)?)
        .map_err(|err| AppError::io(format!("{}: {}", path.display(), err)))?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::{export_file_name, export_json, export_to_dir};
    use crate::model::{Category, Priority};
    use crate::storage::{MemoryStore, TaskStore};
    use crate::task_api::{NewTask, TaskSession};
    use std::time::{SystemTime, UNIX_EPOCH};
    use time::macros::date;

    #[test]
    fn file_name_carries_the_date() {
        assert_eq!(
            export_file_name(date!(2025 - 03 - 07)).unwrap(),
            "nextask-tasks-2025-03-07.json"
        );
    }

    #[test]
    fn single_added_task_exports_as_one_element_array() {
        let mut session = TaskSession::open(TaskStore::new(MemoryStore::new()));
        session
            .add(NewTask {
                priority: Priority::Low,
                category: Category::Shopping,
                ..NewTask::titled("Buy milk")
            })
            .unwrap();

        let json = export_json(session.tasks()).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        let items = parsed.as_array().expect("json array");

        assert!(json.contains('\n'));
        assert_eq!(items.len(), 1);
        assert_eq!(items[0]["title"], "Buy milk");
        assert_eq!(items[0]["completed"], false);
        assert_eq!(items[0]["priority"], "low");
        assert_eq!(items[0]["category"], "shopping");
    }

    #[test]
    fn empty_collection_exports_empty_array() {
        assert_eq!(export_json(&[]).unwrap(), "[]");
    }

    #[test]
    fn writes_file_into_directory() {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        let dir = std::env::temp_dir().join(format!("nextask-{nanos}-export"));

        let path = export_to_dir(&[], &dir, date!(2025 - 12 - 20)).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        std::fs::remove_dir_all(&dir).ok();

        assert!(path.ends_with("nextask-tasks-2025-12-20.json"));
        assert_eq!(content, "[]");
    }
}
