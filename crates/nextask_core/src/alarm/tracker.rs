use crate::model::Task;
use crate::task_api::Mutation;
use std::collections::HashMap;
use time::OffsetDateTime;

/// The task state an alert was raised against. Any change to it re-arms the alarm.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct AlarmKey {
    due_date: Option<OffsetDateTime>,
    completed: bool,
}

impl AlarmKey {
    fn of(task: &Task) -> Self {
        Self {
            due_date: task.due_date,
            completed: task.completed,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckOutcome {
    pub newly_overdue: Vec<Task>,
}

impl CheckOutcome {
    pub fn is_empty(&self) -> bool {
        self.newly_overdue.is_empty()
    }
}

/// Remembers which overdue tasks were already alerted and which alerts are still on screen.
#[derive(Debug, Clone, Default)]
pub struct OverdueTracker {
    known: HashMap<String, AlarmKey>,
    active: Vec<Task>,
}

impl OverdueTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn check(&mut self, tasks: &[Task], now: OffsetDateTime) -> CheckOutcome {
        self.rearm_changed(tasks);

        let newly_overdue: Vec<Task> = tasks
            .iter()
            .filter(|task| task.is_overdue_at(now) && !self.known.contains_key(&task.id))
            .cloned()
            .collect();

        for task in &newly_overdue {
            self.known.insert(task.id.clone(), AlarmKey::of(task));
            self.active.push(task.clone());
        }

        CheckOutcome { newly_overdue }
    }

    /// Hides an alert. The task stays known, so it is not raised again.
    pub fn dismiss(&mut self, id: &str) -> bool {
        let before = self.active.len();
        self.active.retain(|task| task.id != id);
        self.active.len() != before
    }

    pub fn dismiss_all(&mut self) -> usize {
        let dismissed = self.active.len();
        self.active.clear();
        dismissed
    }

    /// Forgets a task so its next overdue check alerts again.
    pub fn rearm(&mut self, id: &str) {
        self.known.remove(id);
        self.active.retain(|task| task.id != id);
    }

    pub fn observe(&mut self, mutation: &Mutation) {
        if mutation.changes_alarm_state() {
            self.rearm(&mutation.task.id);
        }
    }

    pub fn active_alerts(&self) -> &[Task] {
        &self.active
    }

    pub fn is_known(&self, id: &str) -> bool {
        self.known.contains_key(id)
    }

    fn rearm_changed(&mut self, tasks: &[Task]) {
        let stale: Vec<String> = self
            .known
            .iter()
            .filter(|(id, key)| {
                tasks
                    .iter()
                    .find(|task| &task.id == *id)
                    .is_none_or(|task| AlarmKey::of(task) != **key)
            })
            .map(|(id, _)| id.clone())
            .collect();

        for id in stale {
            self.rearm(&id);
        }
    }
}
