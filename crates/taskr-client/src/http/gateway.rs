/*
[INPUT]:  Task operations requested by the application layer
[OUTPUT]: Backend-agnostic async interface over the task endpoints
[POS]:    HTTP layer - seam between the client and its consumers
[UPDATE]: When task operations are added or change signature
*/

use async_trait::async_trait;

use crate::http::{Result, TaskrClient};
use crate::types::{NewTask, Task, TaskEdit};

/// Task operations the application layer relies on
#[async_trait]
pub trait TaskGateway: Send + Sync {
    async fn fetch_tasks(&self, user_id: i64) -> Result<Vec<Task>>;

    async fn add_task(&self, user_id: i64, task: &NewTask) -> Result<()>;

    async fn update_task(&self, user_id: i64, current: &Task, edit: &TaskEdit) -> Result<()>;

    async fn set_completed(&self, user_id: i64, current: &Task, completed: bool) -> Result<()>;

    async fn soft_delete(&self, user_id: i64, task_id: i64) -> Result<()>;
}

#[async_trait]
impl TaskGateway for TaskrClient {
    async fn fetch_tasks(&self, user_id: i64) -> Result<Vec<Task>> {
        TaskrClient::fetch_tasks(self, user_id).await
    }

    async fn add_task(&self, user_id: i64, task: &NewTask) -> Result<()> {
        TaskrClient::add_task(self, user_id, task).await
    }

    async fn update_task(&self, user_id: i64, current: &Task, edit: &TaskEdit) -> Result<()> {
        TaskrClient::update_task(self, user_id, current, edit).await
    }

    async fn set_completed(&self, user_id: i64, current: &Task, completed: bool) -> Result<()> {
        TaskrClient::set_completed(self, user_id, current, completed).await
    }

    async fn soft_delete(&self, user_id: i64, task_id: i64) -> Result<()> {
        TaskrClient::soft_delete(self, user_id, task_id).await
    }
}
