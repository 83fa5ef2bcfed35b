use clap::{Parser, Subcommand};
use nextask_core::config::ConfigOverrides;

#[derive(Parser, Debug)]
#[command(name = "nextask", author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Output JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Override configuration values (format KEY=VALUE)
    #[arg(long = "config-override", value_name = "KEY=VALUE", global = true)]
    pub config_override: Vec<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Add a new task
    ///
    /// Example: nextask add "Buy milk" --priority low --category shopping
    Add {
        title: String,
        #[arg(short, long, default_value = "")]
        description: String,
        #[arg(short, long, default_value = "medium")]
        priority: String,
        #[arg(short, long, default_value = "personal")]
        category: String,
        /// Due date, e.g. "2025-12-25 10:00" or "2025-12-25" (midnight)
        #[arg(long)]
        due: Option<String>,
    },
    /// Edit fields of a task
    ///
    /// Example: nextask edit task-1 --title "Buy oat milk" --due "2025-12-26 14:00"
    Edit {
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(short, long)]
        description: Option<String>,
        #[arg(short, long)]
        priority: Option<String>,
        #[arg(short, long)]
        category: Option<String>,
        #[arg(long, conflicts_with = "clear_due")]
        due: Option<String>,
        /// Remove the due date
        #[arg(long)]
        clear_due: bool,
    },
    /// Mark a task completed, or active again
    ///
    /// Example: nextask toggle task-1
    Toggle { id: String },
    /// Delete a task
    ///
    /// Example: nextask delete task-1
    Delete { id: String },
    /// Show details of a task
    ///
    /// Example: nextask show task-1
    Show { id: String },
    /// List tasks
    ///
    /// Example: nextask list --search milk --filter active --sort priority
    List {
        #[arg(short, long, default_value = "")]
        search: String,
        /// all, active or completed
        #[arg(short, long, default_value = "all")]
        filter: String,
        /// date, priority or alphabetical
        #[arg(long, default_value = "date")]
        sort: String,
    },
    /// Write all tasks to nextask-tasks-<date>.json
    ///
    /// Example: nextask export --dir ~/backups
    Export {
        #[arg(long, default_value = ".")]
        dir: String,
    },
    /// Show or change the theme (dark, light or toggle)
    ///
    /// Example: nextask theme toggle
    Theme { mode: Option<String> },
    /// Run one overdue check and print the alerts
    Check,
    /// Keep checking for overdue tasks until stdin closes
    ///
    /// Commands while watching: dismiss <id>, dismiss all, toggle <id>, check, quit
    Watch {
        /// Seconds between checks
        #[arg(long)]
        interval: Option<u64>,
    },
    /// Today's progress, pending and overdue tasks
    Milestones,
    /// Print a motivational quote
    Quote,
}

/// Parse a raw `KEY=VALUE` override and fold it into `overrides`.
pub fn apply_config_override(raw: &str, overrides: &mut ConfigOverrides) -> Result<(), String> {
    let trimmed = raw.trim();
    let (key_raw, value_raw) = trimmed
        .split_once('=')
        .ok_or_else(|| "override must be in KEY=VALUE format".to_string())?;
    let value = value_raw.trim();

    let field =
        canonicalize_flag_name(key_raw).ok_or_else(|| "override key cannot be empty".to_string())?;

    match field.as_str() {
        "alarm_interval" | "alarm_interval_secs" | "interval" => {
            let secs = value
                .parse::<u64>()
                .map_err(|_| format!("'{value}' is not a number of seconds"))?;
            overrides.alarm_interval_secs = Some(secs);
        }
        "chime" => overrides.chime = Some(parse_bool(value)?),
        "desktop_notifications" | "notifications" => {
            overrides.desktop_notifications = Some(parse_bool(value)?)
        }
        other => return Err(format!("unknown config field '{other}'")),
    }

    Ok(())
}

fn parse_bool(value: &str) -> Result<bool, String> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Ok(true),
        "false" | "no" | "off" | "0" => Ok(false),
        other => Err(format!("'{other}' is not a boolean")),
    }
}

fn canonicalize_flag_name(name: &str) -> Option<String> {
    let mut cleaned = String::new();
    let mut previous_underscore = false;

    for ch in name.chars() {
        if ch.is_ascii_alphanumeric() {
            cleaned.push(ch.to_ascii_lowercase());
            previous_underscore = false;
        } else if !previous_underscore && !cleaned.is_empty() {
            cleaned.push('_');
            previous_underscore = true;
        }
    }

    let trimmed = cleaned.trim_matches('_');
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Split an interactive line into arguments, honouring double quotes.
pub fn split_command_line(line: &str) -> Result<Vec<String>, String> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut escape = false;

    for ch in line.chars() {
        if escape {
            if ch != '"' && ch != '\\' {
                current.push('\\');
            }
            current.push(ch);
            escape = false;
            continue;
        }

        if in_quotes && ch == '\\' {
            escape = true;
            continue;
        }

        if ch == '"' {
            in_quotes = !in_quotes;
            continue;
        }

        if ch.is_whitespace() && !in_quotes {
            if !current.is_empty() {
                args.push(std::mem::take(&mut current));
            }
            continue;
        }

        current.push(ch);
    }

    if in_quotes {
        return Err("unterminated quote in command".to_string());
    }

    if !current.is_empty() {
        args.push(current);
    }

    Ok(args)
}
