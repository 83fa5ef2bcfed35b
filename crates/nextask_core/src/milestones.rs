//! Daily progress summary: what is due today, what is done, and what slipped.

use crate::model::Task;
use time::{Date, OffsetDateTime, UtcOffset};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DailySummary {
    pub today: Vec<Task>,
    pub completed_today: Vec<Task>,
    pub pending_today: Vec<Task>,
    pub overdue: Vec<Task>,
    pub completion_rate: u8,
}

impl DailySummary {
    /// Days are taken in `offset`. Overdue here means due before today started,
    /// which is coarser than the alarm's minute-level check.
    pub fn compute(tasks: &[Task], today: Date, offset: UtcOffset) -> Self {
        let start_of_today = today.midnight().assume_offset(offset);
        let local_day = |due: OffsetDateTime| due.to_offset(offset).date();

        let due_today: Vec<Task> = tasks
            .iter()
            .filter(|task| task.due_date.is_some_and(|due| local_day(due) == today))
            .cloned()
            .collect();
        let (completed_today, pending_today): (Vec<Task>, Vec<Task>) =
            due_today.iter().cloned().partition(|task| task.completed);
        let overdue = tasks
            .iter()
            .filter(|task| task.is_overdue_at(start_of_today))
            .cloned()
            .collect();

        let completion_rate = if due_today.is_empty() {
            0
        } else {
            ((completed_today.len() as f64 / due_today.len() as f64) * 100.0).round() as u8
        };

        Self {
            today: due_today,
            completed_today,
            pending_today,
            overdue,
            completion_rate,
        }
    }
}
