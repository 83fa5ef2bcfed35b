//! Filtering and ordering of the task collection for display.
//!
//! Everything here is pure: the input slice is never touched and each call
//! returns a freshly ordered `Vec`.

use crate::error::AppError;
use crate::model::Task;
use std::cmp::Ordering;
use std::str::FromStr;
use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TaskFilter {
    #[default]
    All,
    Active,
    Completed,
}

impl TaskFilter {
    pub fn matches(self, task: &Task) -> bool {
        match self {
            Self::All => true,
            Self::Active => !task.completed,
            Self::Completed => task.completed,
        }
    }
}

impl FromStr for TaskFilter {
    type Err = AppError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(Self::All),
            "active" => Ok(Self::Active),
            "completed" => Ok(Self::Completed),
            other => Err(AppError::validation(format!("unknown filter '{other}'"))),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TaskSort {
    #[default]
    Date,
    Priority,
    Alphabetical,
}

impl FromStr for TaskSort {
    type Err = AppError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "date" => Ok(Self::Date),
            "priority" => Ok(Self::Priority),
            "alphabetical" | "a-z" => Ok(Self::Alphabetical),
            other => Err(AppError::validation(format!("unknown sort key '{other}'"))),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskQuery {
    pub search: String,
    pub filter: TaskFilter,
    pub sort: TaskSort,
}

impl TaskQuery {
    pub fn matches(&self, task: &Task) -> bool {
        matches_search(task, &self.search) && self.filter.matches(task)
    }
}

/// Case-insensitive substring match on title or description; an empty needle matches all.
pub fn matches_search(task: &Task, search: &str) -> bool {
    let needle = search.to_lowercase();
    task.title.to_lowercase().contains(&needle) || task.description.to_lowercase().contains(&needle)
}

pub fn apply_query(tasks: &[Task], query: &TaskQuery) -> Vec<Task> {
    let mut selected: Vec<Task> = tasks
        .iter()
        .filter(|task| query.matches(task))
        .cloned()
        .collect();
    sort_tasks(&mut selected, query.sort);
    selected
}

/// Stable in every mode, so equal keys keep their collection order.
pub fn sort_tasks(tasks: &mut [Task], sort: TaskSort) {
    match sort {
        TaskSort::Date => tasks.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
        TaskSort::Priority => tasks.sort_by(|a, b| b.priority.rank().cmp(&a.priority.rank())),
        TaskSort::Alphabetical => tasks.sort_by(|a, b| compare_titles(&a.title, &b.title)),
    }
}

/// Base letters first, then accents, then case, then the raw string.
fn compare_titles(a: &str, b: &str) -> Ordering {
    collation_key(a)
        .cmp(&collation_key(b))
        .then_with(|| a.to_lowercase().cmp(&b.to_lowercase()))
        .then_with(|| a.cmp(b))
}

fn collation_key(title: &str) -> String {
    title
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .collect()
}

pub fn pending_count(tasks: &[Task]) -> usize {
    tasks.iter().filter(|task| !task.completed).count()
}
