use crate::error::AppError;
use crate::model::Task;
use crate::notify::{AlertSink, alert_body, launch_show};
use notify_rust::Notification;

pub struct LinuxAlertSink;

impl AlertSink for LinuxAlertSink {
    fn show(&self, alerts: &[Task]) -> Result<(), AppError> {
        let body = alerts
            .iter()
            .map(alert_body)
            .collect::<Vec<_>>()
            .join("\n");

        let mut notification = Notification::new();
        notification.summary("Task Overdue!");
        notification.body(&body);

        let single = match alerts {
            [task] => Some(task.id.clone()),
            _ => None,
        };
        if single.is_some() {
            notification.action("default", "Open");
        }

        let handle = notification
            .show()
            .map_err(|err| AppError::io(err.to_string()))?;

        if let Some(task_id) = single {
            std::thread::spawn(move || {
                handle.wait_for_action(|selected| {
                    if selected == "default" {
                        let _ = launch_show(&task_id);
                    }
                });
            });
        }

        Ok(())
    }
}
