use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::{SystemTime, UNIX_EPOCH};

fn temp_dir(name: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    std::env::temp_dir().join(format!("nextask-{nanos}-{name}"))
}

fn nextask(data_dir: &Path) -> Command {
    let mut command = Command::new(env!("CARGO_BIN_EXE_nextask"));
    command
        .env("NEXTASK_DATA_DIR", data_dir)
        .env("NEXTASK_CONFIG_PATH", data_dir.join("config.json"))
        .env("NEXTASK_DISABLE_NOTIFICATIONS", "1");
    command
}

fn write_tasks(data_dir: &Path, tasks: serde_json::Value) {
    std::fs::create_dir_all(data_dir).unwrap();
    std::fs::write(
        data_dir.join("nextask-tasks"),
        serde_json::to_string(&tasks).unwrap(),
    )
    .unwrap();
}

fn stored_tasks(data_dir: &Path) -> serde_json::Value {
    let content = std::fs::read_to_string(data_dir.join("nextask-tasks")).unwrap();
    serde_json::from_str(&content).unwrap()
}

fn seed(data_dir: &Path) {
    write_tasks(
        data_dir,
        serde_json::json!([
            {
                "id": "task-1",
                "title": "old",
                "description": "",
                "completed": false,
                "priority": "low",
                "category": "work",
                "dueDate": "2025-12-22T09:00:00Z",
                "createdAt": "2025-12-20T00:00:00Z",
                "modifiedAt": "2025-12-20T00:00:00Z"
            }
        ]),
    );
}

#[test]
fn edit_command_merges_given_fields() {
    let data_dir = temp_dir("cli-edit");
    seed(&data_dir);

    let output = nextask(&data_dir)
        .args(["edit", "task-1", "--title", "new", "--priority", "urgent"])
        .output()
        .expect("failed to run edit command");
    let stored = stored_tasks(&data_dir);
    std::fs::remove_dir_all(&data_dir).ok();

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Task updated! new (task-1)"));

    let task = &stored[0];
    assert_eq!(task["id"], "task-1");
    assert_eq!(task["title"], "new");
    assert_eq!(task["priority"], "urgent");
    assert_eq!(task["category"], "work");
    assert_eq!(task["dueDate"], "2025-12-22T09:00:00Z");
    assert_eq!(task["createdAt"], "2025-12-20T00:00:00Z");
    assert_ne!(task["modifiedAt"], "2025-12-20T00:00:00Z");
}

#[test]
fn edit_command_clears_due_date() {
    let data_dir = temp_dir("cli-edit-clear-due");
    seed(&data_dir);

    let output = nextask(&data_dir)
        .args(["edit", "task-1", "--clear-due"])
        .output()
        .expect("failed to run edit command");
    let stored = stored_tasks(&data_dir);
    std::fs::remove_dir_all(&data_dir).ok();

    assert!(output.status.success());
    assert!(stored[0]["dueDate"].is_null());
}

#[test]
fn edit_command_requires_a_field() {
    let data_dir = temp_dir("cli-edit-empty");
    seed(&data_dir);

    let output = nextask(&data_dir)
        .args(["edit", "task-1"])
        .output()
        .expect("failed to run edit command");
    std::fs::remove_dir_all(&data_dir).ok();

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("nothing to update"));
}

#[test]
fn edit_command_reports_unknown_id() {
    let data_dir = temp_dir("cli-edit-missing");
    seed(&data_dir);

    let output = nextask(&data_dir)
        .args(["edit", "task-2", "--title", "new"])
        .output()
        .expect("failed to run edit command");
    let stored = stored_tasks(&data_dir);
    std::fs::remove_dir_all(&data_dir).ok();

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("not_found"));
    assert_eq!(stored[0]["title"], "old");
}

#[test]
fn delete_command_removes_task() {
    let data_dir = temp_dir("cli-delete");
    seed(&data_dir);

    let output = nextask(&data_dir)
        .args(["delete", "task-1"])
        .output()
        .expect("failed to run delete command");
    let stored = stored_tasks(&data_dir);
    std::fs::remove_dir_all(&data_dir).ok();

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Task deleted! old (task-1)"));
    assert_eq!(stored.as_array().map(Vec::len), Some(0));
}

#[test]
fn delete_command_rejects_unknown_id() {
    let data_dir = temp_dir("cli-delete-missing");
    seed(&data_dir);

    let output = nextask(&data_dir)
        .args(["delete", "task-9"])
        .output()
        .expect("failed to run delete command");
    std::fs::remove_dir_all(&data_dir).ok();

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("not_found - task task-9 not found"));
}

#[test]
fn toggle_command_completes_and_celebrates() {
    let data_dir = temp_dir("cli-toggle");
    seed(&data_dir);

    let output = nextask(&data_dir)
        .args(["toggle", "task-1"])
        .output()
        .expect("failed to run toggle command");
    let stored = stored_tasks(&data_dir);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Task completed! old (task-1)"));
    assert!(stdout.contains("All tasks completed!"));
    assert_eq!(stored[0]["completed"], true);

    let output = nextask(&data_dir)
        .args(["toggle", "task-1"])
        .output()
        .expect("failed to run toggle command");
    let stored = stored_tasks(&data_dir);
    std::fs::remove_dir_all(&data_dir).ok();

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Task reopened."));
    assert_eq!(stored[0]["completed"], false);
}

#[test]
fn show_command_prints_details() {
    let data_dir = temp_dir("cli-show");
    seed(&data_dir);

    let output = nextask(&data_dir)
        .args(["show", "task-1"])
        .output()
        .expect("failed to run show command");
    std::fs::remove_dir_all(&data_dir).ok();

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("ID: task-1"));
    assert!(stdout.contains("Priority: low"));
    assert!(stdout.contains("Category: work"));
    assert!(stdout.contains("Created: 2025-12-20T00:00:00Z"));
}
