use crate::alarm::tracker::{CheckOutcome, OverdueTracker};
use crate::error::AppError;
use crate::model::Task;
use crate::notify::{AlertSink, Chime};
use crate::storage::{KeyValueStore, TaskStore};
use crate::task_api::Mutation;
use std::time::Duration;
use time::OffsetDateTime;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

/// Where each check reads the live collection from.
pub trait TaskSource: Send + 'static {
    fn current_tasks(&self) -> Result<Vec<Task>, AppError>;
}

impl<S: KeyValueStore + Send + 'static> TaskSource for TaskStore<S> {
    fn current_tasks(&self) -> Result<Vec<Task>, AppError> {
        self.try_load()
    }
}

pub struct AlarmChecker<Src> {
    source: Src,
    tracker: OverdueTracker,
    sink: Box<dyn AlertSink>,
    chime: Box<dyn Chime>,
}

impl<Src: TaskSource> AlarmChecker<Src> {
    pub fn new(source: Src, sink: Box<dyn AlertSink>, chime: Box<dyn Chime>) -> Self {
        Self {
            source,
            tracker: OverdueTracker::new(),
            sink,
            chime,
        }
    }

    pub fn tracker(&self) -> &OverdueTracker {
        &self.tracker
    }

    /// One check against a fresh read of the source. A batch gets one banner and one chime.
    /// An unreadable source skips the check and leaves the tracker as it was.
    pub fn tick(&mut self, now: OffsetDateTime) -> CheckOutcome {
        let tasks = match self.source.current_tasks() {
            Ok(tasks) => tasks,
            Err(err) => {
                warn!(error = %err, "skipping overdue check, task collection unreadable");
                return CheckOutcome::default();
            }
        };
        let outcome = self.tracker.check(&tasks, now);
        if outcome.is_empty() {
            debug!(tasks = tasks.len(), "no new overdue tasks");
            return outcome;
        }

        info!(count = outcome.newly_overdue.len(), "tasks became overdue");
        if let Err(err) = self.sink.show(&outcome.newly_overdue) {
            warn!(error = %err, "overdue alert could not be displayed");
        }
        if let Err(err) = self.chime.ring() {
            warn!(error = %err, "alarm chime unavailable");
        }
        outcome
    }
}

enum Command {
    Check,
    Observe(Box<Mutation>),
    Dismiss(String),
    DismissAll,
    Stop,
}

pub struct AlarmHandle<Src> {
    commands: mpsc::UnboundedSender<Command>,
    worker: JoinHandle<AlarmChecker<Src>>,
}

/// Spawns the periodic checker on the current tokio runtime. The first check runs immediately.
pub fn start<Src: TaskSource>(checker: AlarmChecker<Src>, interval: Duration) -> AlarmHandle<Src> {
    let (commands, receiver) = mpsc::unbounded_channel();
    let worker = tokio::spawn(run(checker, interval, receiver));
    AlarmHandle { commands, worker }
}

async fn run<Src: TaskSource>(
    mut checker: AlarmChecker<Src>,
    interval: Duration,
    mut commands: mpsc::UnboundedReceiver<Command>,
) -> AlarmChecker<Src> {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    // Commands queued before the first check wait until it has run.
    ticker.tick().await;
    checker.tick(OffsetDateTime::now_utc());

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                checker.tick(OffsetDateTime::now_utc());
            }
            command = commands.recv() => match command {
                Some(Command::Check) => {
                    checker.tick(OffsetDateTime::now_utc());
                }
                Some(Command::Observe(mutation)) => {
                    checker.tracker.observe(&mutation);
                    checker.tick(OffsetDateTime::now_utc());
                }
                Some(Command::Dismiss(id)) => {
                    checker.tracker.dismiss(&id);
                }
                Some(Command::DismissAll) => {
                    checker.tracker.dismiss_all();
                }
                Some(Command::Stop) | None => break,
            },
        }
    }

    debug!("alarm checker stopped");
    checker
}

impl<Src: TaskSource> AlarmHandle<Src> {
    /// Requests an extra check, used when the collection changed.
    pub fn poke(&self) {
        let _ = self.commands.send(Command::Check);
    }

    /// Re-arms the mutated task when its due date or completion moved, then rechecks.
    pub fn observe(&self, mutation: &Mutation) {
        let _ = self.commands.send(Command::Observe(Box::new(mutation.clone())));
    }

    pub fn dismiss(&self, id: &str) {
        let _ = self.commands.send(Command::Dismiss(id.to_string()));
    }

    pub fn dismiss_all(&self) {
        let _ = self.commands.send(Command::DismissAll);
    }

    pub async fn stop(self) -> Result<AlarmChecker<Src>, AppError> {
        let _ = self.commands.send(Command::Stop);
        self.worker
            .await
            .map_err(|err| AppError::io(format!("alarm checker failed: {err}")))
    }
}
