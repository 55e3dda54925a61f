/*
[INPUT]:  taskr binary, temporary config and data directory, mock backend
[OUTPUT]: Exit status and output checks for CLI commands
[POS]:    Integration tests - binary entry point
[UPDATE]: When CLI commands or their output change
*/

mod common;

use common::{USER_ID, mount_tasks, setup_mock_server, task_json, temp_dir};
use std::path::{Path, PathBuf};
use std::process::Output;
use tokio::process::Command;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn write_config(dir: &Path, base_url: &str) -> PathBuf {
    write_config_with_offline(dir, base_url, true)
}

fn write_config_with_offline(dir: &Path, base_url: &str, offline: bool) -> PathBuf {
    let config_path = dir.join("config.yaml");
    let yaml = format!(
        "api:\n  base_url: {base_url}\n  flavor: rest\ndata_dir: {}\nundo_window_secs: 1\noffline:\n  enabled: {offline}\n",
        dir.join("data").display()
    );
    std::fs::write(&config_path, yaml).expect("write config");
    config_path
}

async fn taskr(config: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_taskr"))
        .arg("--config")
        .arg(config)
        .args(args)
        .env("RUST_LOG", "error")
        .output()
        .await
        .expect("Failed to start taskr binary")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

async fn mount_login(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/login.php"))
        .and(body_string_contains("email=sam%40example.com"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "success": true,
            "user_id": USER_ID,
            "username": "sam",
            "email": "sam@example.com"
        })))
        .mount(server)
        .await;
}

async fn login(config: &Path) {
    let output = taskr(
        config,
        &["login", "--email", "sam@example.com", "--password", "Secret!23"],
    )
    .await;
    assert!(output.status.success(), "stderr: {}", stderr(&output));
}

async fn mount_status_update(server: &MockServer, flag: &str) {
    Mock::given(method("POST"))
        .and(path("/update_task_status.php"))
        .and(body_string_contains(format!("is_completed={flag}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"success": true})))
        .expect(1)
        .mount(server)
        .await;
}

fn position(haystack: &str, needle: &str) -> usize {
    haystack
        .find(needle)
        .unwrap_or_else(|| panic!("'{needle}' missing from:\n{haystack}"))
}

#[tokio::test]
async fn test_whoami_without_session() {
    let dir = temp_dir("cli-whoami");
    let config = write_config(&dir, "http://127.0.0.1:9/");

    let output = taskr(&config, &["whoami"]).await;
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(stdout(&output).contains("Not logged in."));

    std::fs::remove_dir_all(dir).unwrap();
}

#[tokio::test]
async fn test_list_requires_login() {
    let dir = temp_dir("cli-list");
    let config = write_config(&dir, "http://127.0.0.1:9/");

    let output = taskr(&config, &["list"]).await;
    assert!(!output.status.success());
    let err = stderr(&output);
    assert!(err.contains("error:"), "stderr: {err}");
    assert!(err.contains("Not logged in"), "stderr: {err}");

    std::fs::remove_dir_all(dir).unwrap();
}

#[tokio::test]
async fn test_login_then_list_and_settings() {
    let server = setup_mock_server().await;
    mount_login(&server).await;
    mount_tasks(
        &server,
        vec![
            task_json(1, "Plan trip", "HIGH", 0, false),
            task_json(2, "Water plants", "LOW", 0, false),
            task_json(3, "Pay rent", "MEDIUM", 0, true),
        ],
        None,
    )
    .await;

    let dir = temp_dir("cli-login");
    let config = write_config(&dir, &server.uri());

    let output = taskr(
        &config,
        &["login", "--email", "sam@example.com", "--password", "Secret!23"],
    )
    .await;
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(stdout(&output).contains("sam"));

    let output = taskr(&config, &["whoami"]).await;
    assert!(stdout(&output).contains("sam@example.com"));

    let output = taskr(&config, &["list"]).await;
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let listing = stdout(&output);
    assert!(listing.contains("High Priority"));
    assert!(listing.contains("Plan trip"));
    assert!(listing.contains("Water plants"));
    assert!(!listing.contains("Pay rent"));

    let output = taskr(&config, &["completed"]).await;
    assert!(stdout(&output).contains("Pay rent"));

    let output = taskr(&config, &["settings", "--text-size", "20", "--dark-mode", "true"]).await;
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let settings = stdout(&output);
    assert!(settings.contains("Text size  20"));
    assert!(settings.contains("on"));

    let output = taskr(&config, &["logout"]).await;
    assert!(output.status.success());
    let output = taskr(&config, &["whoami"]).await;
    assert!(stdout(&output).contains("Not logged in."));

    std::fs::remove_dir_all(dir).unwrap();
}

#[tokio::test]
async fn test_blank_title_is_rejected_before_sending() {
    let server = setup_mock_server().await;
    mount_login(&server).await;
    mount_tasks(&server, vec![], None).await;
    Mock::given(method("POST"))
        .and(path("/add_task.php"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let dir = temp_dir("cli-add");
    let config = write_config(&dir, &server.uri());
    let output = taskr(
        &config,
        &["login", "--email", "sam@example.com", "--password", "Secret!23"],
    )
    .await;
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let output = taskr(&config, &["add", "   "]).await;
    assert!(!output.status.success());
    assert!(stderr(&output).contains("Task title cannot be empty"));

    std::fs::remove_dir_all(dir).unwrap();
}

#[tokio::test]
async fn test_unknown_priority_is_a_usage_error() {
    let dir = temp_dir("cli-usage");
    let config = write_config(&dir, "http://127.0.0.1:9/");

    let output = taskr(&config, &["add", "Task", "--priority", "urgent"]).await;
    assert_eq!(output.status.code(), Some(2));

    std::fs::remove_dir_all(dir).unwrap();
}

#[tokio::test]
async fn test_reorder_persists_between_runs() {
    let server = setup_mock_server().await;
    mount_login(&server).await;
    mount_tasks(
        &server,
        vec![
            task_json(1, "First", "MEDIUM", 0, false),
            task_json(2, "Second", "MEDIUM", 1, false),
            task_json(3, "Third", "MEDIUM", 2, false),
        ],
        None,
    )
    .await;

    let dir = temp_dir("cli-reorder");
    let config = write_config(&dir, &server.uri());
    login(&config).await;

    let output = taskr(&config, &["reorder", "3", "1"]).await;
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let listing = stdout(&output);
    assert!(position(&listing, "Third") < position(&listing, "First"));

    let output = taskr(&config, &["list"]).await;
    let listing = stdout(&output);
    assert!(position(&listing, "1. Third") < position(&listing, "2. First"));
    assert!(position(&listing, "2. First") < position(&listing, "3. Second"));

    std::fs::remove_dir_all(dir).unwrap();
}

#[tokio::test]
async fn test_reorder_without_offline_storage_fails() {
    let server = setup_mock_server().await;
    mount_login(&server).await;
    mount_tasks(
        &server,
        vec![
            task_json(1, "First", "MEDIUM", 0, false),
            task_json(2, "Second", "MEDIUM", 1, false),
        ],
        None,
    )
    .await;

    let dir = temp_dir("cli-reorder-off");
    let config = write_config_with_offline(&dir, &server.uri(), false);
    login(&config).await;

    let output = taskr(&config, &["reorder", "2", "1"]).await;
    assert!(!output.status.success());
    assert!(stderr(&output).contains("Reordering needs offline storage enabled"));

    std::fs::remove_dir_all(dir).unwrap();
}

#[tokio::test]
async fn test_complete_reopen_and_delete() {
    let server = setup_mock_server().await;
    mount_login(&server).await;
    mount_tasks(
        &server,
        vec![
            task_json(1, "Plan trip", "HIGH", 0, false),
            task_json(2, "Pay rent", "MEDIUM", 0, true),
        ],
        None,
    )
    .await;
    mount_status_update(&server, "1").await;
    mount_status_update(&server, "0").await;
    Mock::given(method("POST"))
        .and(path("/delete_task.php"))
        .and(body_string_contains("task_id=1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"success": true})))
        .expect(1)
        .mount(&server)
        .await;

    let dir = temp_dir("cli-complete");
    let config = write_config(&dir, &server.uri());
    login(&config).await;

    // stdin is not a terminal here, so no undo prompt is shown
    let output = taskr(&config, &["complete", "1"]).await;
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let printed = stdout(&output);
    assert!(printed.contains("Completed"));
    assert!(printed.contains("Plan trip"));
    assert!(!printed.contains("to undo"));

    let output = taskr(&config, &["reopen", "2"]).await;
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(stdout(&output).contains("Task moved back to the list."));

    let output = taskr(&config, &["delete", "1", "--yes"]).await;
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(stdout(&output).contains("Task deleted."));

    std::fs::remove_dir_all(dir).unwrap();
}

#[tokio::test]
async fn test_edit_with_empty_description_clears_it() {
    let server = setup_mock_server().await;
    mount_login(&server).await;
    let mut task = task_json(1, "Plan trip", "HIGH", 0, false);
    task["description"] = "Book hotel".into();
    mount_tasks(&server, vec![task], None).await;
    Mock::given(method("POST"))
        .and(path("/update_task.php"))
        .and(body_string_contains("title=Plan+trip&description=&priority=HIGH"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"success": true})))
        .expect(1)
        .mount(&server)
        .await;

    let dir = temp_dir("cli-edit");
    let config = write_config(&dir, &server.uri());
    login(&config).await;

    let output = taskr(&config, &["edit", "1", "--description", ""]).await;
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(stdout(&output).contains("Task updated."));

    std::fs::remove_dir_all(dir).unwrap();
}
