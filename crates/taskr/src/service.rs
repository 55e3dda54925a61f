/*
[INPUT]:  TaskGateway, TaskBoard, OfflineStore, UndoWindow
[OUTPUT]: Task operations with optimistic updates and rollback
[POS]:    Service layer - orchestration for one logged-in user
[UPDATE]: When task operations or reconciliation rules change
*/

use anyhow::{Result, anyhow, bail};
use chrono::Local;
use std::collections::HashMap;
use taskr_client::{NewTask, Priority, Task, TaskEdit, TaskGateway, TaskrError};

use crate::board::TaskBoard;
use crate::offline::OfflineStore;
use crate::undo::{UndoTicket, UndoWindow};
use crate::validation;

/// Task operations for a single user.
///
/// Every mutation patches the board first, then calls the server. A failed
/// call restores the board and returns the error; a successful one is
/// followed by a refresh.
pub struct TaskService<G: TaskGateway> {
    gateway: G,
    user_id: i64,
    board: TaskBoard,
    offline: Option<OfflineStore>,
    undo: UndoWindow,
}

impl<G: TaskGateway> TaskService<G> {
    pub fn new(gateway: G, user_id: i64) -> Self {
        Self {
            gateway,
            user_id,
            board: TaskBoard::new(),
            offline: None,
            undo: UndoWindow::default(),
        }
    }

    pub fn with_offline(mut self, store: OfflineStore) -> Self {
        self.offline = Some(store);
        self
    }

    pub fn with_undo_window(mut self, undo: UndoWindow) -> Self {
        self.undo = undo;
        self
    }

    pub fn user_id(&self) -> i64 {
        self.user_id
    }

    pub fn board(&self) -> &TaskBoard {
        &self.board
    }

    pub fn undo_window(&self) -> &UndoWindow {
        &self.undo
    }

    /// Reload from the server and mirror the result offline.
    ///
    /// Local ordering from the mirror is kept for tasks that are still in
    /// the same group; tasks new to the mirror go to the end of their group.
    pub async fn refresh(&mut self) -> Result<()> {
        let mut tasks = self
            .gateway
            .fetch_tasks(self.user_id)
            .await
            .inspect_err(|err| tracing::warn!(user_id = self.user_id, error = %err, "fetch tasks failed"))?;

        if let Some(store) = &self.offline {
            match store.active_tasks(self.user_id) {
                Ok(local) => apply_local_order(&mut tasks, &local),
                Err(err) => tracing::warn!(error = %err, "offline order unavailable"),
            }
        }

        self.board.replace(tasks);
        self.mirror();
        tracing::debug!(
            user_id = self.user_id,
            active = self.board.active_count(),
            total = self.board.len(),
            "tasks refreshed"
        );
        Ok(())
    }

    pub async fn add(&mut self, task: NewTask) -> Result<()> {
        let task = validation::normalize_new_task(task)?;
        self.gateway
            .add_task(self.user_id, &task)
            .await
            .inspect_err(|err| tracing::warn!(title = %task.title, error = %err, "add task failed"))?;

        tracing::info!(title = %task.title, priority = %task.priority, "task added");
        self.refresh_after("add").await;
        Ok(())
    }

    pub async fn edit(&mut self, id: i64, edit: TaskEdit) -> Result<()> {
        let edit = validation::normalize_edit(edit)?;
        let current = self.current(id)?;

        let snapshot = self.board.patch_edit(id, &edit)?;
        if let Err(err) = self.gateway.update_task(self.user_id, &current, &edit).await {
            tracing::warn!(task_id = id, error = %err, "edit failed, rolled back");
            self.board.restore(snapshot);
            return Err(err.into());
        }

        tracing::info!(task_id = id, "task edited");
        self.refresh_after("edit").await;
        Ok(())
    }

    /// Complete an active task and open the undo window for it
    pub async fn complete(&mut self, id: i64) -> Result<UndoTicket> {
        let current = self.current(id)?;
        if !current.is_active() {
            bail!("Task {id} is already completed");
        }

        self.set_completed(&current, true).await?;
        let ticket = self.undo.arm(id);
        tracing::info!(task_id = id, "task completed");
        self.refresh_after("complete").await;
        Ok(ticket)
    }

    /// Revert the last completion while its window is open.
    ///
    /// Returns the reopened task id, or `None` when there was nothing to undo.
    pub async fn undo_complete(&mut self) -> Result<Option<i64>> {
        let Some(id) = self.undo.undo() else {
            return Ok(None);
        };
        self.reopen(id).await?;
        tracing::info!(task_id = id, "completion undone");
        Ok(Some(id))
    }

    /// Mark a completed task active again
    pub async fn reopen(&mut self, id: i64) -> Result<()> {
        let current = self.current(id)?;
        if !current.is_completed {
            bail!("Task {id} is not completed");
        }

        self.set_completed(&current, false).await?;
        self.refresh_after("reopen").await;
        Ok(())
    }

    pub async fn delete(&mut self, id: i64) -> Result<()> {
        let snapshot = self.board.patch_deleted(id)?;
        if let Err(err) = self.gateway.soft_delete(self.user_id, id).await {
            tracing::warn!(task_id = id, error = %err, "delete failed, rolled back");
            self.board.restore(snapshot);
            return Err(err.into());
        }

        if self.undo.pending() == Some(id) {
            self.undo.dismiss();
        }
        tracing::info!(task_id = id, "task deleted");
        self.refresh_after("delete").await;
        Ok(())
    }

    /// Move a task inside its priority group.
    ///
    /// The server has no ordering endpoint, so the new order lives only in
    /// the offline mirror and reordering fails when the mirror is disabled.
    pub fn reorder(&mut self, id: i64, to_index: usize) -> Result<Vec<(i64, i64)>> {
        let store = self
            .offline
            .as_ref()
            .ok_or_else(|| anyhow!("Reordering needs offline storage enabled"))?;
        let changes = self.board.reorder(id, to_index)?;
        for (task_id, order) in &changes {
            if !store.set_order(*task_id, *order)? {
                // row missing from the mirror; store the whole board
                store.replace_for_user(self.user_id, self.board.tasks())?;
                break;
            }
        }
        Ok(changes)
    }

    /// Fill the board from the offline mirror. Returns the number of tasks loaded.
    pub fn load_offline(&mut self) -> Result<usize> {
        let store = self
            .offline
            .as_ref()
            .ok_or_else(|| anyhow!("Offline storage is disabled"))?;
        let tasks = store.all_tasks(self.user_id)?;
        self.board.replace(tasks);
        tracing::info!(user_id = self.user_id, count = self.board.len(), "loaded offline tasks");
        Ok(self.board.len())
    }

    async fn set_completed(&mut self, current: &Task, completed: bool) -> Result<()> {
        let now = Local::now().naive_local();
        let snapshot = self.board.patch_completed(current.id, completed, now)?;

        if let Err(err) = self
            .gateway
            .set_completed(self.user_id, current, completed)
            .await
        {
            tracing::warn!(task_id = current.id, completed, error = %err, "status update failed, rolled back");
            self.board.restore(snapshot);
            return Err(err.into());
        }
        Ok(())
    }

    async fn refresh_after(&mut self, operation: &str) {
        if let Err(err) = self.refresh().await {
            tracing::warn!(operation, error = %err, "refresh after mutation failed, keeping local state");
            self.mirror();
        }
    }

    fn current(&self, id: i64) -> Result<Task> {
        self.board
            .get(id)
            .cloned()
            .ok_or_else(|| TaskrError::NotFound { task_id: id }.into())
    }

    fn mirror(&self) {
        if let Some(store) = &self.offline {
            if let Err(err) = store.replace_for_user(self.user_id, self.board.tasks()) {
                tracing::warn!(error = %err, "offline mirror update failed");
            }
        }
    }
}

/// Overlay mirrored order onto fetched tasks.
fn apply_local_order(tasks: &mut [Task], local: &[Task]) {
    if local.is_empty() {
        return;
    }

    let known: HashMap<i64, (Priority, i64)> = local
        .iter()
        .map(|task| (task.id, (task.priority, task.order)))
        .collect();
    let mut group_len: HashMap<Priority, i64> = HashMap::new();
    for (priority, _) in known.values() {
        *group_len.entry(*priority).or_default() += 1;
    }

    for task in tasks.iter_mut().filter(|task| task.is_active()) {
        match known.get(&task.id) {
            Some((priority, order)) if *priority == task.priority => task.order = *order,
            _ => task.order += group_len.get(&task.priority).copied().unwrap_or(0),
        }
    }
}
