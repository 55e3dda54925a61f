/*
[INPUT]:  Test configuration and mock server requirements
[OUTPUT]: Shared test utilities, fixtures, and mock helpers
[POS]:    Test infrastructure - shared across all test modules
[UPDATE]: When adding new test patterns or fixtures
*/

//! Common test utilities for taskr-client tests

use taskr_client::{ApiFlavor, ClientConfig, TaskrClient};
use wiremock::MockServer;

/// Setup a mock HTTP server for testing
pub async fn setup_mock_server() -> MockServer {
    MockServer::start().await
}

/// Client pointed at the mock server
pub fn client_for(server: &MockServer, flavor: ApiFlavor) -> TaskrClient {
    TaskrClient::with_config(ClientConfig {
        base_url: server.uri(),
        flavor,
        ..ClientConfig::default()
    })
    .expect("client init")
}

/// Base URL on a local port nothing listens on
pub fn closed_port_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().expect("local addr").port();
    drop(listener);
    format!("http://127.0.0.1:{port}/")
}

/// Task row in the current server schema
pub fn rest_task_json(
    id: i64,
    title: &str,
    priority: &str,
    order: i64,
    completed: bool,
) -> serde_json::Value {
    let flag = u8::from(completed);
    let completed_at = completed.then_some("2025-01-13 03:59:40");
    serde_json::json!({
        "id": id,
        "user_id": 1,
        "title": title,
        "description": format!("{title} details"),
        "priority": priority,
        "due_date": null,
        "order": order,
        "is_completed": flag,
        "is_deleted": 0,
        "completed_at": completed_at,
        "created_at": "2025-01-13 03:50:00"
    })
}

/// Task row as the legacy tasks.php script reports it
pub fn script_task_json(id: i64, title: &str, completed: bool) -> serde_json::Value {
    let flag = if completed { "1" } else { "0" };
    serde_json::json!({
        "id": id.to_string(),
        "user_id": "1",
        "task_title": title,
        "task_description": "",
        "priority": "Normal",
        "is_completed": flag,
        "is_soft_deleted": "0",
        "created_at": "2025-01-10 10:00:00",
        "updated_at": "2025-01-10 10:00:00"
    })
}
