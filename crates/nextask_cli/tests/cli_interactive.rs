use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
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

#[test]
fn interactive_session_runs_commands_until_quit() {
    let data_dir = temp_dir("cli-interactive");

    let mut child = nextask(&data_dir)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("failed to spawn interactive session");
    child
        .stdin
        .take()
        .expect("stdin")
        .write_all(b"add \"Water plants\" --category health\nlist\nbogus\nquit\nadd never\n")
        .unwrap();
    let output = child.wait_with_output().expect("interactive output");

    let stored = std::fs::read_to_string(data_dir.join("nextask-tasks")).unwrap();
    std::fs::remove_dir_all(&data_dir).ok();

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stdout.contains("Task added successfully! Water plants"));
    assert!(stdout.contains("1 pending"));
    assert!(stderr.contains("ERROR: validation_error"));

    let tasks: serde_json::Value = serde_json::from_str(&stored).unwrap();
    assert_eq!(tasks.as_array().map(Vec::len), Some(1));
    assert_eq!(tasks[0]["category"], "health");
}
