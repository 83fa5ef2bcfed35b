use crate::error::AppError;
use crate::model::Task;
use std::io::Write;
use time::macros::format_description;
use time::{OffsetDateTime, UtcOffset};

#[cfg(target_os = "linux")]
mod linux;
#[cfg(target_os = "linux")]
pub use linux::LinuxAlertSink;

#[cfg(windows)]
mod windows;
#[cfg(windows)]
pub use windows::WindowsAlertSink;

/// Visual overdue banner.
pub trait AlertSink: Send {
    fn show(&self, alerts: &[Task]) -> Result<(), AppError>;
}

/// Audible alarm tone. Failures are reported, never fatal.
pub trait Chime: Send {
    fn ring(&self) -> Result<(), AppError>;
}

pub struct NoopAlertSink;

impl AlertSink for NoopAlertSink {
    fn show(&self, _alerts: &[Task]) -> Result<(), AppError> {
        Ok(())
    }
}

/// Shows every alert through each sink in turn; a failing sink does not stop the others.
pub struct FanOutSink {
    sinks: Vec<Box<dyn AlertSink>>,
}

impl FanOutSink {
    pub fn new(sinks: Vec<Box<dyn AlertSink>>) -> Self {
        Self { sinks }
    }
}

impl AlertSink for FanOutSink {
    fn show(&self, alerts: &[Task]) -> Result<(), AppError> {
        let mut first_error = None;
        for sink in &self.sinks {
            if let Err(err) = sink.show(alerts) {
                first_error.get_or_insert(err);
            }
        }
        first_error.map_or(Ok(()), Err)
    }
}

pub struct TerminalBell;

impl Chime for TerminalBell {
    fn ring(&self) -> Result<(), AppError> {
        let mut stderr = std::io::stderr();
        stderr
            .write_all(b"\x07")
            .and_then(|_| stderr.flush())
            .map_err(|err| AppError::io(err.to_string()))
    }
}

pub struct SilentChime;

impl Chime for SilentChime {
    fn ring(&self) -> Result<(), AppError> {
        Ok(())
    }
}

pub fn chime_for(enabled: bool) -> Box<dyn Chime> {
    if enabled {
        Box::new(TerminalBell)
    } else {
        Box::new(SilentChime)
    }
}

pub fn desktop_sink_from_env(enabled: bool) -> Box<dyn AlertSink> {
    if !enabled || std::env::var("NEXTASK_DISABLE_NOTIFICATIONS").is_ok() {
        return Box::new(NoopAlertSink);
    }

    match platform_alert_sink() {
        Ok(sink) => sink,
        Err(_) => Box::new(NoopAlertSink),
    }
}

pub fn alert_body(task: &Task) -> String {
    match task.due_date {
        Some(due) => format!("{} (Due: {})", task.title, format_due(due)),
        None => task.title.clone(),
    }
}

pub fn format_due(due: OffsetDateTime) -> String {
    let offset = UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC);
    due.to_offset(offset)
        .format(format_description!(
            "[year]-[month]-[day] at [hour]:[minute]"
        ))
        .unwrap_or_else(|_| due.to_string())
}

const ACTION_PREFIX: &str = "show:";

pub fn activation_argument(task_id: &str) -> String {
    format!("{ACTION_PREFIX}{task_id}")
}

pub fn parse_activation_argument(argument: &str) -> Option<String> {
    argument
        .strip_prefix(ACTION_PREFIX)
        .map(|id| id.to_string())
}

/// Opens `nextask show <id>` in a new process when a notification is clicked.
pub fn launch_show(task_id: &str) -> Result<(), AppError> {
    let exe = std::env::current_exe().map_err(|err| AppError::io(err.to_string()))?;
    std::process::Command::new(exe)
        .arg("show")
        .arg(task_id)
        .spawn()
        .map_err(|err| AppError::io(err.to_string()))?;
    Ok(())
}

#[cfg(target_os = "linux")]
pub fn platform_alert_sink() -> Result<Box<dyn AlertSink>, AppError> {
    Ok(Box::new(LinuxAlertSink))
}

#[cfg(windows)]
pub fn platform_alert_sink() -> Result<Box<dyn AlertSink>, AppError> {
    Ok(Box::new(WindowsAlertSink))
}

#[cfg(not(any(target_os = "linux", windows)))]
pub fn platform_alert_sink() -> Result<Box<dyn AlertSink>, AppError> {
    Err(AppError::invalid_data(
        "notifications are not supported on this platform",
    ))
}
