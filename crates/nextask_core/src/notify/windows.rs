use crate::error::AppError;
use crate::model::Task;
use crate::notify::{AlertSink, activation_argument, alert_body, launch_show, parse_activation_argument};
use tauri_winrt_notification::Toast;

pub struct WindowsAlertSink;

impl AlertSink for WindowsAlertSink {
    fn show(&self, alerts: &[Task]) -> Result<(), AppError> {
        for task in alerts {
            let task_id = task.id.clone();
            Toast::new(Toast::POWERSHELL_APP_ID)
                .title("Task Overdue!")
                .text1(&alert_body(task))
                .add_button("Open", &activation_argument(&task.id))
                .on_activated(move |args| {
                    match args.as_deref().and_then(parse_activation_argument) {
                        Some(id) => {
                            let _ = launch_show(&id);
                        }
                        None => {
                            let _ = launch_show(&task_id);
                        }
                    }
                    Ok(())
                })
                .show()
                .map_err(|err| AppError::io(err.to_string()))?;
        }
        Ok(())
    }
}
