use crate::error::AppError;
use crate::model::{Category, Priority, Task};
use crate::query::{TaskQuery, apply_query};
use crate::storage::{FileStore, KeyValueStore, TaskStore, data_dir};
use time::{Duration, OffsetDateTime};
use tracing::{info, warn};

/// Fields accepted when creating a task. Title and description are trimmed on write.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewTask {
    pub title: String,
    pub description: String,
    pub priority: Priority,
    pub category: Category,
    pub due_date: Option<OffsetDateTime>,
}

impl NewTask {
    pub fn titled<T: Into<String>>(title: T) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }
}

/// Partial update for `edit`. `due_date: Some(None)` clears the due date.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub priority: Option<Priority>,
    pub category: Option<Category>,
    pub due_date: Option<Option<OffsetDateTime>>,
}

impl TaskPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.priority.is_none()
            && self.category.is_none()
            && self.due_date.is_none()
    }

    fn apply_to(&self, task: &mut Task) -> Result<(), AppError> {
        if let Some(title) = self.title.as_deref() {
            task.title = required_title(title)?;
        }
        if let Some(description) = self.description.as_deref() {
            task.description = description.trim().to_string();
        }
        if let Some(priority) = self.priority {
            task.priority = priority;
        }
        if let Some(category) = self.category {
            task.category = category;
        }
        if let Some(due_date) = self.due_date {
            task.due_date = due_date;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationKind {
    Added,
    Updated,
    Completed,
    Reopened,
    Deleted,
}

/// Outcome of a successful mutation. The in-memory change always stands;
/// `persist_error` records a failed write-through.
#[derive(Debug, Clone)]
pub struct Mutation {
    pub kind: MutationKind,
    pub task: Task,
    pub before: Option<Task>,
    pub persist_error: Option<AppError>,
}

impl Mutation {
    pub fn toast(&self) -> &'static str {
        match self.kind {
            MutationKind::Added => "Task added successfully!",
            MutationKind::Updated => "Task updated!",
            MutationKind::Completed => "Task completed!",
            MutationKind::Reopened => "Task reopened.",
            MutationKind::Deleted => "Task deleted!",
        }
    }

    /// True when the due date or completion flag moved, which re-arms an overdue alarm.
    pub fn changes_alarm_state(&self) -> bool {
        match (&self.before, self.kind) {
            (_, MutationKind::Deleted) => true,
            (Some(before), _) => {
                before.due_date != self.task.due_date || before.completed != self.task.completed
            }
            (None, _) => false,
        }
    }
}

pub type Clock = fn() -> OffsetDateTime;

/// The session's authoritative task collection plus its write-through store.
pub struct TaskSession<S> {
    store: TaskStore<S>,
    tasks: Vec<Task>,
    clock: Clock,
}

pub fn open_default_session() -> Result<TaskSession<FileStore>, AppError> {
    let dir = data_dir()?;
    Ok(TaskSession::open(TaskStore::new(FileStore::new(dir))))
}

impl<S: KeyValueStore> TaskSession<S> {
    pub fn open(store: TaskStore<S>) -> Self {
        let tasks = store.load();
        Self {
            store,
            tasks,
            clock: OffsetDateTime::now_utc,
        }
    }

    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    pub fn store(&self) -> &TaskStore<S> {
        &self.store
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn get(&self, id: &str) -> Result<&Task, AppError> {
        let id = required_id(id)?;
        self.tasks
            .iter()
            .find(|task| task.id == id)
            .ok_or_else(|| not_found(id))
    }

    pub fn query(&self, query: &TaskQuery) -> Vec<Task> {
        apply_query(&self.tasks, query)
    }

    /// Every task is done and there is at least one of them.
    pub fn celebration_due(&self) -> bool {
        !self.tasks.is_empty() && self.tasks.iter().all(|task| task.completed)
    }

    pub fn add(&mut self, new_task: NewTask) -> Result<Mutation, AppError> {
        let title = required_title(&new_task.title)?;
        let now = (self.clock)();

        let task = Task {
            id: self.next_id(now),
            title,
            description: new_task.description.trim().to_string(),
            completed: false,
            priority: new_task.priority,
            category: new_task.category,
            due_date: new_task.due_date,
            created_at: now,
            modified_at: now,
        };

        self.tasks.insert(0, task.clone());
        info!(id = %task.id, "task added");
        Ok(self.persist(MutationKind::Added, task, None))
    }

    pub fn edit(&mut self, id: &str, patch: &TaskPatch) -> Result<Mutation, AppError> {
        let index = self.position(id)?;
        let before = self.tasks[index].clone();

        let mut updated = before.clone();
        patch.apply_to(&mut updated)?;
        updated.modified_at = advance(before.modified_at, (self.clock)());

        self.tasks[index] = updated.clone();
        info!(id = %updated.id, "task updated");
        Ok(self.persist(MutationKind::Updated, updated, Some(before)))
    }

    pub fn toggle_complete(&mut self, id: &str) -> Result<Mutation, AppError> {
        let index = self.position(id)?;
        let before = self.tasks[index].clone();

        let mut updated = before.clone();
        updated.completed = !before.completed;
        updated.modified_at = advance(before.modified_at, (self.clock)());

        let kind = if updated.completed {
            MutationKind::Completed
        } else {
            MutationKind::Reopened
        };
        self.tasks[index] = updated.clone();
        info!(id = %updated.id, completed = updated.completed, "task toggled");
        Ok(self.persist(kind, updated, Some(before)))
    }

    /// Unknown ids fail with `NotFound`; nothing is written in that case.
    pub fn delete(&mut self, id: &str) -> Result<Mutation, AppError> {
        let index = self.position(id)?;
        let removed = self.tasks.remove(index);
        info!(id = %removed.id, "task deleted");
        Ok(self.persist(MutationKind::Deleted, removed.clone(), Some(removed)))
    }

    fn position(&self, id: &str) -> Result<usize, AppError> {
        let id = required_id(id)?;
        self.tasks
            .iter()
            .position(|task| task.id == id)
            .ok_or_else(|| not_found(id))
    }

    fn next_id(&self, now: OffsetDateTime) -> String {
        let mut stamp = now.unix_timestamp_nanos();
        loop {
            let candidate = format!("task-{stamp}");
            if !self.tasks.iter().any(|task| task.id == candidate) {
                return candidate;
            }
            stamp += 1;
        }
    }

    fn persist(&self, kind: MutationKind, task: Task, before: Option<Task>) -> Mutation {
        let persist_error = match self.store.save(&self.tasks) {
            Ok(()) => None,
            Err(err) => {
                warn!(error = %err, "task change kept in memory only");
                Some(err)
            }
        };

        Mutation {
            kind,
            task,
            before,
            persist_error,
        }
    }
}

fn required_id(id: &str) -> Result<&str, AppError> {
    let trimmed = id.trim();
    if trimmed.is_empty() {
        return Err(AppError::validation("id is required"));
    }
    Ok(trimmed)
}

fn required_title(title: &str) -> Result<String, AppError> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(AppError::validation("title is required"));
    }
    Ok(trimmed.to_string())
}

fn not_found(id: &str) -> AppError {
    AppError::not_found(format!("task {id} not found"))
}

/// Modification stamps strictly increase even when the clock has not moved.
fn advance(previous: OffsetDateTime, now: OffsetDateTime) -> OffsetDateTime {
    if now > previous {
        now
    } else {
        previous + Duration::nanoseconds(1)
    }
}
