use nextask_core::config::Palette;
use nextask_core::error::AppError;
use nextask_core::milestones::DailySummary;
use nextask_core::model::Task;
use nextask_core::notify::{AlertSink, alert_body, format_due};
use tabled::settings::Style;
use tabled::{Table, Tabled};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

#[derive(Tabled)]
struct TaskRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "Priority")]
    priority: String,
    #[tabled(rename = "Category")]
    category: String,
    #[tabled(rename = "Due")]
    due: String,
    #[tabled(rename = "Status")]
    status: String,
}

pub fn status_label(task: &Task, now: OffsetDateTime) -> &'static str {
    if task.completed {
        "completed"
    } else if task.is_overdue_at(now) {
        "overdue"
    } else {
        "active"
    }
}

pub fn task_table(tasks: &[Task], now: OffsetDateTime) -> String {
    let rows = tasks.iter().map(|task| TaskRow {
        id: task.id.clone(),
        title: task.title.clone(),
        priority: task.priority.to_string(),
        category: task.category.to_string(),
        due: task.due_date.map(format_due).unwrap_or_else(|| "-".to_string()),
        status: status_label(task, now).to_string(),
    });
    Table::new(rows).with(Style::rounded()).to_string()
}

pub fn task_details(task: &Task, now: OffsetDateTime) -> Vec<String> {
    let stamp = |value: OffsetDateTime| value.format(&Rfc3339).unwrap_or_else(|_| value.to_string());
    let mut lines = vec![
        format!("ID: {}", task.id),
        format!("Title: {}", task.title),
    ];
    if !task.description.is_empty() {
        lines.push(format!("Description: {}", task.description));
    }
    lines.push(format!("Priority: {}", task.priority));
    lines.push(format!("Category: {}", task.category));
    lines.push(format!(
        "Due: {}",
        task.due_date.map(format_due).unwrap_or_else(|| "-".to_string())
    ));
    lines.push(format!("Status: {}", status_label(task, now)));
    lines.push(format!("Created: {}", stamp(task.created_at)));
    lines.push(format!("Modified: {}", stamp(task.modified_at)));
    lines
}

pub fn summary_lines(summary: &DailySummary) -> Vec<String> {
    let mut lines = vec![
        format!(
            "Today's progress: {}% ({} of {} tasks completed)",
            summary.completion_rate,
            summary.completed_today.len(),
            summary.today.len()
        ),
        format!("Pending today: {}", summary.pending_today.len()),
        format!("Overdue: {}", summary.overdue.len()),
        format!("Completed: {}", summary.completed_today.len()),
    ];

    if !summary.overdue.is_empty() {
        lines.push(format!("Overdue tasks ({}):", summary.overdue.len()));
        lines.extend(summary.overdue.iter().map(|task| format!("  ! {}", alert_body(task))));
    }

    if summary.today.is_empty() {
        lines.push("No tasks scheduled for today".to_string());
    } else {
        lines.push(format!("Today's tasks ({}):", summary.today.len()));
        lines.extend(summary.today.iter().map(|task| {
            let mark = if task.completed { "x" } else { " " };
            format!("  [{mark}] {} ({})", task.title, task.id)
        }));
    }

    lines
}

/// Prints overdue banners on stdout.
pub struct TerminalAlertSink {
    palette: Palette,
}

impl TerminalAlertSink {
    pub fn new(palette: Palette) -> Self {
        Self { palette }
    }
}

impl AlertSink for TerminalAlertSink {
    fn show(&self, alerts: &[Task]) -> Result<(), AppError> {
        for task in alerts {
            println!(
                "{} {} [{}]",
                self.palette.alertize("Task Overdue!"),
                alert_body(task),
                task.id
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{status_label, summary_lines, task_details, task_table};
    use nextask_core::milestones::DailySummary;
    use nextask_core::model::{Category, Priority, Task};
    use time::macros::{date, datetime, offset};

    fn task(id: &str, title: &str, completed: bool) -> Task {
        Task {
            id: id.to_string(),
            title: title.to_string(),
            description: String::new(),
            completed,
            priority: Priority::Urgent,
            category: Category::Work,
            due_date: Some(datetime!(2020-01-01 00:00 UTC)),
            created_at: datetime!(2019-12-01 00:00 UTC),
            modified_at: datetime!(2019-12-01 00:00 UTC),
        }
    }

    #[test]
    fn status_label_flags_overdue() {
        let now = datetime!(2025-01-01 00:00 UTC);
        assert_eq!(status_label(&task("a", "x", false), now), "overdue");
        assert_eq!(status_label(&task("a", "x", true), now), "completed");
    }

    #[test]
    fn table_contains_headers_and_rows() {
        let table = task_table(&[task("task-1", "Ship it", false)], datetime!(2025-01-01 00:00 UTC));
        assert!(table.contains("Title"));
        assert!(table.contains("Ship it"));
        assert!(table.contains("urgent"));
        assert!(table.contains("overdue"));
    }

    #[test]
    fn details_skip_empty_description() {
        let lines = task_details(&task("task-1", "Ship it", false), datetime!(2025-01-01 00:00 UTC));
        assert!(lines.iter().all(|line| !line.starts_with("Description")));
        assert!(lines.contains(&"Created: 2019-12-01T00:00:00Z".to_string()));
    }

    #[test]
    fn summary_lists_overdue_tasks() {
        let tasks = vec![task("task-1", "Late", false)];
        let summary = DailySummary::compute(&tasks, date!(2025 - 12 - 20), offset!(UTC));
        let lines = summary_lines(&summary);

        assert!(lines.contains(&"Overdue: 1".to_string()));
        assert!(lines.iter().any(|line| line.starts_with("  ! Late (Due: ")));
        assert!(lines.contains(&"No tasks scheduled for today".to_string()));
    }
}
