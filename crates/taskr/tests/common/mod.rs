/*
[INPUT]:  Test configuration and mock server requirements
[OUTPUT]: Shared fixtures for taskr integration tests
[POS]:    Test infrastructure - shared across all test modules
[UPDATE]: When adding new test patterns or fixtures
*/

#![allow(dead_code)]

use std::path::PathBuf;
use taskr_client::{ApiFlavor, ClientConfig, TaskrClient};
use uuid::Uuid;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const USER_ID: i64 = 1;

pub async fn setup_mock_server() -> MockServer {
    MockServer::start().await
}

/// Rest-flavor client pointed at the mock server
pub fn rest_client(server: &MockServer) -> TaskrClient {
    TaskrClient::with_config(ClientConfig {
        base_url: server.uri(),
        flavor: ApiFlavor::Rest,
        ..ClientConfig::default()
    })
    .expect("client init")
}

/// Rest-flavor client for a local port nothing listens on
pub fn unreachable_client() -> TaskrClient {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().expect("local addr").port();
    drop(listener);
    TaskrClient::with_config(ClientConfig {
        base_url: format!("http://127.0.0.1:{port}/"),
        flavor: ApiFlavor::Rest,
        ..ClientConfig::default()
    })
    .expect("client init")
}

/// Fresh directory under the system temp dir
pub fn temp_dir(label: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("taskr-{label}-{}", Uuid::new_v4()));
    std::fs::create_dir_all(&dir).expect("create temp dir");
    dir
}

pub fn task_json(id: i64, title: &str, priority: &str, order: i64, completed: bool) -> serde_json::Value {
    let flag = u8::from(completed);
    let completed_at = completed.then_some("2025-01-13 03:59:40");
    serde_json::json!({
        "id": id,
        "user_id": USER_ID,
        "title": title,
        "description": "",
        "priority": priority,
        "order": order,
        "is_completed": flag,
        "is_deleted": 0,
        "completed_at": completed_at,
        "created_at": "2025-01-13 03:50:00"
    })
}

/// Serve `tasks` from get_tasks.php. Mocks match in mount order, so mount a
/// limited snapshot before the one that replaces it.
pub async fn mount_tasks(server: &MockServer, tasks: Vec<serde_json::Value>, times: Option<u64>) {
    let mock = Mock::given(method("GET"))
        .and(path("/get_tasks.php"))
        .and(query_param("user_id", USER_ID.to_string()))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::Value::Array(tasks)));
    let mock = match times {
        Some(times) => mock.up_to_n_times(times),
        None => mock,
    };
    mock.mount(server).await;
}

pub async fn mount_ok(server: &MockServer, endpoint: &str) {
    Mock::given(method("POST"))
        .and(path(format!("/{endpoint}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "success": true,
            "message": "ok"
        })))
        .mount(server)
        .await;
}
