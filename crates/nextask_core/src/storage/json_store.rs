use crate::config::Theme;
use crate::error::AppError;
use crate::model::Task;
use crate::storage::kv::KeyValueStore;
use std::path::PathBuf;
use tracing::{debug, warn};

pub const TASKS_KEY: &str = "nextask-tasks";
pub const THEME_KEY: &str = "nextask-theme";
const DATA_DIR_ENV_VAR: &str = "NEXTASK_DATA_DIR";

pub fn data_dir() -> Result<PathBuf, AppError> {
    if let Ok(path) = std::env::var(DATA_DIR_ENV_VAR)
        && !path.trim().is_empty()
    {
        return Ok(PathBuf::from(path));
    }

    if cfg!(windows) {
        let appdata =
            std::env::var("APPDATA").map_err(|_| AppError::invalid_data("APPDATA is not set"))?;
        Ok(PathBuf::from(appdata).join("nextask"))
    } else {
        let home = std::env::var("HOME").map_err(|_| AppError::invalid_data("HOME is not set"))?;
        Ok(PathBuf::from(home).join(".config").join("nextask"))
    }
}

/// The persisted task collection, written through in full on every mutation.
#[derive(Debug, Clone)]
pub struct TaskStore<S> {
    backend: S,
}

impl<S: KeyValueStore> TaskStore<S> {
    pub fn new(backend: S) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &S {
        &self.backend
    }

    /// Never fails: an absent, unreadable or malformed blob yields an empty collection.
    pub fn load(&self) -> Vec<Task> {
        match self.try_load() {
            Ok(tasks) => tasks,
            Err(err) => {
                warn!(error = %err, "discarding unreadable task collection");
                Vec::new()
            }
        }
    }

    pub fn try_load(&self) -> Result<Vec<Task>, AppError> {
        let Some(content) = self.backend.get(TASKS_KEY)? else {
            return Ok(Vec::new());
        };

        let tasks: Vec<Task> = serde_json::from_str(&content)
            .map_err(|err| AppError::invalid_data(err.to_string()))?;
        debug!(count = tasks.len(), "loaded task collection");
        Ok(tasks)
    }

    pub fn save(&self, tasks: &[Task]) -> Result<(), AppError> {
        let content = serde_json::to_string(tasks)
            .map_err(|err| AppError::invalid_data(err.to_string()))?;
        self.backend.set(TASKS_KEY, &content)?;
        debug!(count = tasks.len(), "saved task collection");
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct ThemeStore<S> {
    backend: S,
}

impl<S: KeyValueStore> ThemeStore<S> {
    pub fn new(backend: S) -> Self {
        Self { backend }
    }

    pub fn load(&self) -> Theme {
        match self.backend.get(THEME_KEY) {
            Ok(Some(raw)) => Theme::from_stored(&raw),
            Ok(None) => Theme::Light,
            Err(err) => {
                warn!(error = %err, "falling back to light theme");
                Theme::Light
            }
        }
    }

    pub fn save(&self, theme: Theme) -> Result<(), AppError> {
        self.backend.set(THEME_KEY, theme.as_str())
    }

    pub fn toggle(&self) -> Result<Theme, AppError> {
        let next = self.load().toggled();
        self.save(next)?;
        Ok(next)
    }
}
