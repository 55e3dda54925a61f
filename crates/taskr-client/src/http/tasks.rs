/*
[INPUT]:  User id, task fields and the configured backend flavor
[OUTPUT]: Task lists and mutation confirmations
[POS]:    HTTP layer - task endpoints for both script layouts
[UPDATE]: When task scripts change their form fields or answers
*/

// ### Task Endpoints

use crate::http::client::{expect_success, read_json};
use crate::http::{Result, TaskrClient, TaskrError};
use crate::types::{ApiFlavor, NewTask, Task, TaskAction, TaskEdit, TaskListResponse, TasksEnvelope};
use reqwest::Method;
use std::collections::BTreeMap;

const GET_TASKS_ENDPOINT: &str = "get_tasks.php";
const ADD_TASK_ENDPOINT: &str = "add_task.php";
const UPDATE_TASK_ENDPOINT: &str = "update_task.php";
const UPDATE_STATUS_ENDPOINT: &str = "update_task_status.php";
const DELETE_TASK_ENDPOINT: &str = "delete_task.php";
const TASKS_SCRIPT: &str = "tasks.php";

type Form = Vec<(&'static str, String)>;

impl TaskrClient {
    /// Every non-deleted task the server holds for the user, active and completed
    ///
    /// Rest:   GET get_tasks.php?user_id={user_id}
    /// Script: POST tasks.php action=fetch, then action=fetch_completed
    pub async fn fetch_tasks(&self, user_id: i64) -> Result<Vec<Task>> {
        let tasks = match self.flavor() {
            ApiFlavor::Rest => {
                let builder = self
                    .request(Method::GET, GET_TASKS_ENDPOINT)?
                    .query(&[("user_id", user_id)]);
                match self.send_json::<TaskListResponse>(builder).await? {
                    TaskListResponse::Bare(tasks) => tasks,
                    TaskListResponse::Wrapped(envelope) => {
                        unwrap_envelope(envelope, "Failed to fetch tasks")?
                    }
                }
            }
            ApiFlavor::Script => {
                let mut merged = BTreeMap::new();
                for action in [TaskAction::Fetch, TaskAction::FetchCompleted] {
                    for task in self.script_fetch(action, user_id).await? {
                        merged.insert(task.id, task);
                    }
                }
                merged.into_values().collect()
            }
        };

        let visible: Vec<Task> = tasks.into_iter().filter(|task| !task.is_deleted).collect();
        tracing::debug!(user_id, count = visible.len(), "fetched tasks");
        Ok(visible)
    }

    /// Create a task; the server assigns id and order
    ///
    /// Rest:   POST add_task.php (user_id, title, description, priority, due_date)
    /// Script: POST tasks.php action=add
    pub async fn add_task(&self, user_id: i64, task: &NewTask) -> Result<()> {
        let flavor = self.flavor();
        let (endpoint, form): (&str, Form) = match flavor {
            ApiFlavor::Rest => {
                let mut form = vec![
                    ("user_id", user_id.to_string()),
                    ("title", task.title.clone()),
                    ("priority", task.priority.wire_name(flavor).to_string()),
                ];
                if let Some(description) = &task.description {
                    form.push(("description", description.clone()));
                }
                if let Some(due_date) = &task.due_date {
                    form.push(("due_date", due_date.clone()));
                }
                (ADD_TASK_ENDPOINT, form)
            }
            ApiFlavor::Script => (
                TASKS_SCRIPT,
                vec![
                    ("action", TaskAction::Add.as_str().to_string()),
                    ("user_id", user_id.to_string()),
                    ("task_title", task.title.clone()),
                    ("task_description", task.description.clone().unwrap_or_default()),
                    ("priority", task.priority.wire_name(flavor).to_string()),
                ],
            ),
        };

        let response = self.post_form(endpoint, &form).await?;
        expect_success(response, "Failed to add task").await?;
        tracing::info!(user_id, title = %task.title, "task added");
        Ok(())
    }

    /// Change title, description and priority; completion state is kept
    ///
    /// Rest:   POST update_task.php (task_id, title, description, priority)
    /// Script: POST tasks.php action=update with the full row
    pub async fn update_task(&self, user_id: i64, current: &Task, edit: &TaskEdit) -> Result<()> {
        let flavor = self.flavor();
        let (endpoint, form): (&str, Form) = match flavor {
            ApiFlavor::Rest => (
                UPDATE_TASK_ENDPOINT,
                vec![
                    ("task_id", current.id.to_string()),
                    ("title", edit.title.clone()),
                    ("description", edit.description.clone().unwrap_or_default()),
                    ("priority", edit.priority.wire_name(flavor).to_string()),
                ],
            ),
            ApiFlavor::Script => (
                TASKS_SCRIPT,
                script_update_form(user_id, current.id, edit, current.is_completed),
            ),
        };

        let response = self.post_form(endpoint, &form).await?;
        expect_success(response, "Error editing task").await?;
        tracing::info!(user_id, task_id = current.id, "task updated");
        Ok(())
    }

    /// Mark a task completed or active again
    ///
    /// Rest:   POST update_task_status.php (task_id, is_completed)
    /// Script: POST tasks.php action=update with the full row
    pub async fn set_completed(&self, user_id: i64, current: &Task, completed: bool) -> Result<()> {
        let (endpoint, form): (&str, Form) = match self.flavor() {
            ApiFlavor::Rest => (
                UPDATE_STATUS_ENDPOINT,
                vec![
                    ("task_id", current.id.to_string()),
                    ("is_completed", flag(completed)),
                ],
            ),
            ApiFlavor::Script => (
                TASKS_SCRIPT,
                script_update_form(user_id, current.id, &TaskEdit::from_task(current), completed),
            ),
        };

        let response = self.post_form(endpoint, &form).await?;
        expect_success(response, "Error updating task").await?;
        tracing::info!(user_id, task_id = current.id, completed, "task status updated");
        Ok(())
    }

    /// Flag a task as deleted; the row is never removed
    ///
    /// Rest:   POST delete_task.php (task_id)
    /// Script: POST tasks.php action=soft_delete
    pub async fn soft_delete(&self, user_id: i64, task_id: i64) -> Result<()> {
        let (endpoint, form): (&str, Form) = match self.flavor() {
            ApiFlavor::Rest => (DELETE_TASK_ENDPOINT, vec![("task_id", task_id.to_string())]),
            ApiFlavor::Script => (
                TASKS_SCRIPT,
                vec![
                    ("action", TaskAction::SoftDelete.as_str().to_string()),
                    ("user_id", user_id.to_string()),
                    ("task_id", task_id.to_string()),
                ],
            ),
        };

        let response = self.post_form(endpoint, &form).await?;
        expect_success(response, "Failed to delete task").await?;
        tracing::info!(user_id, task_id, "task soft-deleted");
        Ok(())
    }

    async fn script_fetch(&self, action: TaskAction, user_id: i64) -> Result<Vec<Task>> {
        let form: Form = vec![
            ("action", action.as_str().to_string()),
            ("user_id", user_id.to_string()),
        ];
        let response = self.post_form(TASKS_SCRIPT, &form).await?;
        let envelope: TasksEnvelope = read_json(response).await?;
        let fallback = match action {
            TaskAction::FetchCompleted => "Failed to fetch completed tasks",
            _ => "Failed to fetch tasks",
        };
        unwrap_envelope(envelope, fallback)
    }
}

fn unwrap_envelope(envelope: TasksEnvelope, fallback: &str) -> Result<Vec<Task>> {
    if envelope.success {
        Ok(envelope.tasks)
    } else {
        Err(TaskrError::rejected(envelope.message, fallback))
    }
}

fn script_update_form(user_id: i64, task_id: i64, edit: &TaskEdit, completed: bool) -> Form {
    vec![
        ("action", TaskAction::Update.as_str().to_string()),
        ("user_id", user_id.to_string()),
        ("task_id", task_id.to_string()),
        ("task_title", edit.title.clone()),
        ("task_description", edit.description.clone().unwrap_or_default()),
        ("priority", edit.priority.wire_name(ApiFlavor::Script).to_string()),
        ("is_completed", flag(completed)),
    ]
}

fn flag(value: bool) -> String {
    u8::from(value).to_string()
}
