use clap::{CommandFactory, Parser};
use nextask_cli::cli::{Cli, Command, apply_config_override, split_command_line};
use nextask_cli::due::{local_offset, parse_due};
use nextask_cli::render::{TerminalAlertSink, summary_lines, task_details, task_table};
use nextask_core::alarm::{self, AlarmChecker};
use nextask_core::config::{
    Config, ConfigOverrides, Palette, Theme, load_config_with_fallback, merge_overrides,
    palette_for_theme,
};
use nextask_core::error::AppError;
use nextask_core::export::export_to_dir;
use nextask_core::milestones::DailySummary;
use nextask_core::model::{Category, Priority, Task};
use nextask_core::motivation::random_quote;
use nextask_core::notify::{FanOutSink, chime_for, desktop_sink_from_env};
use nextask_core::query::{TaskQuery, pending_count};
use nextask_core::storage::{FileStore, TaskStore, ThemeStore, data_dir};
use nextask_core::task_api::{Mutation, NewTask, TaskPatch, open_default_session};
use std::io::{self, BufRead};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use time::OffsetDateTime;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

const STORE_POLL_INTERVAL: Duration = Duration::from_secs(2);

struct Context {
    json: bool,
    config: Config,
    palette: Palette,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("NEXTASK_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}

fn build_context(cli: &Cli) -> Result<Context, AppError> {
    let load = load_config_with_fallback();
    if let Some(err) = load.error.as_ref() {
        eprintln!("WARNING: using default configuration ({err})");
    }

    let mut overrides = ConfigOverrides::default();
    for raw in &cli.config_override {
        apply_config_override(raw, &mut overrides).map_err(AppError::validation)?;
    }

    let theme = ThemeStore::new(FileStore::new(data_dir()?)).load();
    Ok(Context {
        json: cli.json,
        config: merge_overrides(&load.config, &overrides),
        palette: palette_for_theme(theme),
    })
}

fn print_task_json(task: &Task) -> Result<(), AppError> {
    let json = serde_json::to_string(task).map_err(|err| AppError::invalid_data(err.to_string()))?;
    println!("{json}");
    Ok(())
}

fn print_tasks_json(tasks: &[Task]) -> Result<(), AppError> {
    let json = serde_json::to_string(tasks).map_err(|err| AppError::invalid_data(err.to_string()))?;
    println!("{json}");
    Ok(())
}

fn report_mutation(ctx: &Context, mutation: &Mutation) -> Result<(), AppError> {
    if let Some(err) = mutation.persist_error.as_ref() {
        eprintln!("WARNING: change not saved ({err})");
    }

    if ctx.json {
        return print_task_json(&mutation.task);
    }

    println!(
        "{} {} ({})",
        ctx.palette.accentize(mutation.toast()),
        mutation.task.title,
        mutation.task.id
    );
    Ok(())
}

fn parse_optional_due(raw: Option<&str>) -> Result<Option<OffsetDateTime>, AppError> {
    raw.map(|value| parse_due(value, local_offset())).transpose()
}

fn run_command(cli: Cli) -> Result<(), AppError> {
    let ctx = build_context(&cli)?;
    let now = OffsetDateTime::now_utc();

    match cli.command {
        Command::Add {
            title,
            description,
            priority,
            category,
            due,
        } => {
            let new_task = NewTask {
                title,
                description,
                priority: priority.parse::<Priority>()?,
                category: category.parse::<Category>()?,
                due_date: parse_optional_due(due.as_deref())?,
            };
            let mut session = open_default_session()?;
            let mutation = session.add(new_task)?;
            report_mutation(&ctx, &mutation)?;
        }
        Command::Edit {
            id,
            title,
            description,
            priority,
            category,
            due,
            clear_due,
        } => {
            let due_date = if clear_due {
                Some(None)
            } else {
                parse_optional_due(due.as_deref())?.map(Some)
            };
            let patch = TaskPatch {
                title,
                description,
                priority: priority.as_deref().map(str::parse::<Priority>).transpose()?,
                category: category.as_deref().map(str::parse::<Category>).transpose()?,
                due_date,
            };
            if patch.is_empty() {
                return Err(AppError::validation("nothing to update"));
            }

            let mut session = open_default_session()?;
            let mutation = session.edit(&id, &patch)?;
            report_mutation(&ctx, &mutation)?;
        }
        Command::Toggle { id } => {
            let mut session = open_default_session()?;
            let mutation = session.toggle_complete(&id)?;
            report_mutation(&ctx, &mutation)?;
            if !ctx.json && session.celebration_due() {
                println!("{}", ctx.palette.accentize("*** All tasks completed! ***"));
            }
        }
        Command::Delete { id } => {
            let mut session = open_default_session()?;
            let mutation = session.delete(&id)?;
            report_mutation(&ctx, &mutation)?;
        }
        Command::Show { id } => {
            let session = open_default_session()?;
            let task = session.get(&id)?;
            if ctx.json {
                print_task_json(task)?;
            } else {
                for line in task_details(task, now) {
                    println!("{line}");
                }
            }
        }
        Command::List {
            search,
            filter,
            sort,
        } => {
            let query = TaskQuery {
                search,
                filter: filter.parse()?,
                sort: sort.parse()?,
            };
            let session = open_default_session()?;
            let tasks = session.query(&query);
            if ctx.json {
                print_tasks_json(&tasks)?;
            } else if tasks.is_empty() {
                println!("{}", ctx.palette.mutedize("No tasks found"));
            } else {
                println!("{}", task_table(&tasks, now));
                println!(
                    "{}",
                    ctx.palette
                        .mutedize(&format!("{} pending", pending_count(session.tasks())))
                );
            }
        }
        Command::Export { dir } => {
            let session = open_default_session()?;
            let today = now.to_offset(local_offset()).date();
            let path = export_to_dir(session.tasks(), Path::new(&dir), today)?;
            if ctx.json {
                println!("{}", serde_json::json!({ "path": path.display().to_string() }));
            } else {
                println!("Tasks exported! {}", path.display());
            }
        }
        Command::Theme { mode } => {
            let store = ThemeStore::new(FileStore::new(data_dir()?));
            let theme = match mode.as_deref().map(str::trim) {
                None => store.load(),
                Some("toggle") => store.toggle()?,
                Some("dark") => {
                    store.save(Theme::Dark)?;
                    Theme::Dark
                }
                Some("light") => {
                    store.save(Theme::Light)?;
                    Theme::Light
                }
                Some(other) => {
                    return Err(AppError::validation(format!(
                        "unknown theme '{other}'; use dark, light or toggle"
                    )));
                }
            };
            if ctx.json {
                println!("{}", serde_json::json!({ "theme": theme.as_str() }));
            } else {
                println!("Theme: {}", theme.as_str());
            }
        }
        Command::Check => {
            let store = TaskStore::new(FileStore::new(data_dir()?));
            let mut checker = build_checker(&ctx, store);
            let outcome = checker.tick(now);
            if ctx.json {
                print_tasks_json(&outcome.newly_overdue)?;
            } else if outcome.is_empty() {
                println!("No overdue tasks");
            }
        }
        Command::Watch { interval } => {
            let interval = interval
                .map(|secs| Duration::from_secs(secs.max(1)))
                .unwrap_or_else(|| ctx.config.alarm_interval());
            run_watch(&ctx, interval)?;
        }
        Command::Milestones => {
            let session = open_default_session()?;
            let offset = local_offset();
            let summary = DailySummary::compute(session.tasks(), now.to_offset(offset).date(), offset);
            if ctx.json {
                println!(
                    "{}",
                    serde_json::json!({
                        "completion_rate": summary.completion_rate,
                        "today": summary.today.len(),
                        "completed_today": summary.completed_today.len(),
                        "pending_today": summary.pending_today.len(),
                        "overdue": summary.overdue.iter().map(|task| task.id.clone()).collect::<Vec<_>>(),
                    })
                );
            } else {
                for line in summary_lines(&summary) {
                    println!("{line}");
                }
            }
        }
        Command::Quote => {
            let quote = random_quote();
            if ctx.json {
                println!("{}", serde_json::json!({ "quote": quote }));
            } else {
                println!("\"{quote}\"");
            }
        }
    }

    Ok(())
}

fn build_checker(ctx: &Context, store: TaskStore<FileStore>) -> AlarmChecker<TaskStore<FileStore>> {
    let mut sinks = vec![desktop_sink_from_env(ctx.config.desktop_notifications)];
    if !ctx.json {
        sinks.push(Box::new(TerminalAlertSink::new(ctx.palette.clone())));
    }
    AlarmChecker::new(
        store,
        Box::new(FanOutSink::new(sinks)),
        chime_for(ctx.config.chime),
    )
}

fn modified_time(path: &Path) -> Option<SystemTime> {
    std::fs::metadata(path).and_then(|meta| meta.modified()).ok()
}

fn run_watch(ctx: &Context, interval: Duration) -> Result<(), AppError> {
    let store = TaskStore::new(FileStore::new(data_dir()?));
    let tasks_path = store.backend().path_for(nextask_core::storage::TASKS_KEY);
    let checker = build_checker(ctx, store);

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|err| AppError::io(err.to_string()))?;
    runtime.block_on(watch_loop(checker, interval, tasks_path))
}

async fn watch_loop(
    checker: AlarmChecker<TaskStore<FileStore>>,
    interval: Duration,
    tasks_path: PathBuf,
) -> Result<(), AppError> {
    info!(interval_secs = interval.as_secs(), "watching for overdue tasks");
    let handle = alarm::start(checker, interval);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut store_poll = tokio::time::interval(STORE_POLL_INTERVAL);
    let mut last_modified = modified_time(&tasks_path);

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let line = line.map_err(|err| AppError::io(err.to_string()))?;
                let Some(line) = line else { break };
                let args = line.split_whitespace().collect::<Vec<_>>();
                match args.as_slice() {
                    [] => {}
                    ["quit"] | ["exit"] => break,
                    ["dismiss", "all"] => handle.dismiss_all(),
                    ["dismiss", id] => handle.dismiss(id),
                    ["check"] => handle.poke(),
                    ["toggle", id] => {
                        match open_default_session().and_then(|mut session| session.toggle_complete(id)) {
                            Ok(mutation) => {
                                println!("{} {} ({})", mutation.toast(), mutation.task.title, mutation.task.id);
                                handle.observe(&mutation);
                            }
                            Err(err) => eprintln!("ERROR: {err}"),
                        }
                    }
                    _ => eprintln!("ERROR: expected 'dismiss <id>', 'dismiss all', 'toggle <id>', 'check' or 'quit'"),
                }
            }
            _ = store_poll.tick() => {
                let modified = modified_time(&tasks_path);
                if modified != last_modified {
                    debug!(path = %tasks_path.display(), "task store changed");
                    last_modified = modified;
                    handle.poke();
                }
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    let checker = handle.stop().await?;
    let remaining = checker.tracker().active_alerts().len();
    if remaining > 0 {
        println!("{remaining} overdue alert(s) not dismissed");
    }
    Ok(())
}

fn normalize_parse_error(err: clap::Error) -> AppError {
    let rendered = err.to_string();
    let first_line = rendered.lines().next().unwrap_or("invalid command").trim();
    let message = first_line
        .strip_prefix("error: ")
        .unwrap_or(first_line)
        .to_string();
    AppError::validation(message)
}

fn print_help() {
    let mut cmd = Cli::command();
    let help = cmd.render_help();
    println!("{help}");
}

fn run_interactive() -> Result<(), AppError> {
    println!("\"{}\"", random_quote());
    if let Ok(session) = open_default_session() {
        println!("{} pending", pending_count(session.tasks()));
    }

    let mut input = String::new();
    let stdin = io::stdin();
    let mut stdin_lock = stdin.lock();

    loop {
        input.clear();
        let bytes = stdin_lock
            .read_line(&mut input)
            .map_err(|err| AppError::io(err.to_string()))?;

        if bytes == 0 {
            break;
        }

        let line = input.trim();
        if line.is_empty() {
            continue;
        }

        if line.eq_ignore_ascii_case("exit") || line.eq_ignore_ascii_case("quit") {
            break;
        }

        if line == "help" || line == "?" {
            print_help();
            continue;
        }

        let args = match split_command_line(line) {
            Ok(args) => args,
            Err(err) => {
                eprintln!("ERROR: {}", AppError::validation(err));
                continue;
            }
        };

        if args.is_empty() {
            continue;
        }

        let mut argv = Vec::with_capacity(args.len() + 1);
        argv.push("nextask".to_string());
        argv.extend(args);

        let cli = match Cli::try_parse_from(argv) {
            Ok(cli) => cli,
            Err(err) => {
                eprintln!("ERROR: {}", normalize_parse_error(err));
                continue;
            }
        };

        if let Err(err) = run_command(cli) {
            eprintln!("ERROR: {}", err);
        }
    }

    Ok(())
}

fn main() {
    init_tracing();

    let mut args = std::env::args_os();
    args.next();
    if args.next().is_none() {
        if let Err(err) = run_interactive() {
            eprintln!("ERROR: {}", err);
            std::process::exit(1);
        }
        return;
    }

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) if !err.use_stderr() => {
            let _ = err.print();
            return;
        }
        Err(err) => {
            eprintln!("ERROR: {}", normalize_parse_error(err));
            std::process::exit(1);
        }
    };

    if let Err(err) = run_command(cli) {
        eprintln!("ERROR: {}", err);
        std::process::exit(1);
    }
}
