/*
[INPUT]:  Server task snapshots and local edits (complete, delete, edit, reorder)
[OUTPUT]: Active tasks grouped by priority, completed history, rollback snapshots
[POS]:    State layer - in-memory task cache reconciled against the server
[UPDATE]: When list views or ordering rules change
*/

use anyhow::{Result, bail};
use chrono::NaiveDateTime;
use std::cmp::Reverse;
use taskr_client::{Priority, TIMESTAMP_FORMAT, Task, TaskEdit, TaskrError};

/// Active tasks sharing one priority, in display order
#[derive(Debug, Clone, PartialEq)]
pub struct PriorityGroup<'a> {
    pub priority: Priority,
    pub tasks: Vec<&'a Task>,
}

/// Board contents captured before an optimistic patch
#[derive(Debug, Clone, PartialEq)]
pub struct BoardSnapshot(Vec<Task>);

/// The user's cached tasks.
///
/// Within every (priority, active) group the `order` fields always read
/// 0, 1, 2, ... in display order.
#[derive(Debug, Clone, Default)]
pub struct TaskBoard {
    tasks: Vec<Task>,
}

impl TaskBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Board seeded from a server snapshot
    pub fn from_tasks(tasks: Vec<Task>) -> Self {
        let mut board = Self::new();
        board.replace(tasks);
        board
    }

    /// Replace the cache with a server snapshot; deleted rows are dropped
    pub fn replace(&mut self, tasks: Vec<Task>) {
        self.tasks = tasks.into_iter().filter(|task| !task.is_deleted).collect();
        self.normalize();
    }

    /// Rewrite `order` to 0..n inside every active group, keeping relative order
    pub fn normalize(&mut self) {
        for priority in Priority::ALL {
            let ids = self.group_ids(priority);
            self.renumber(&ids);
        }
    }

    /// Raw cache contents, optimistic soft deletes included
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn get(&self, id: i64) -> Option<&Task> {
        self.find(id).ok()
    }

    /// Tasks not soft-deleted
    pub fn len(&self) -> usize {
        self.tasks.iter().filter(|task| !task.is_deleted).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Active tasks grouped High, Medium, Low; empty groups omitted
    pub fn active(&self) -> Vec<PriorityGroup<'_>> {
        Priority::ALL
            .into_iter()
            .filter_map(|priority| {
                let tasks = self.group(priority);
                (!tasks.is_empty()).then_some(PriorityGroup { priority, tasks })
            })
            .collect()
    }

    pub fn active_count(&self) -> usize {
        self.tasks.iter().filter(|task| task.is_active()).count()
    }

    /// Completed history, most recently completed first
    pub fn completed(&self) -> Vec<&Task> {
        let mut done: Vec<&Task> = self.tasks.iter().filter(|task| task.is_in_history()).collect();
        // None sorts below Some, so undated tasks land last
        done.sort_by_key(|task| (Reverse(task.completed_time()), Reverse(task.id)));
        done
    }

    /// Move an active task to `to_index` within its priority group.
    ///
    /// The index is clamped to the group. Returns `(id, order)` for every
    /// task whose order changed.
    pub fn reorder(&mut self, id: i64, to_index: usize) -> Result<Vec<(i64, i64)>> {
        let task = self.find(id)?;
        if !task.is_active() {
            bail!("Only active tasks can be reordered");
        }
        let priority = task.priority;

        let mut ids = self.group_ids(priority);
        let from = ids
            .iter()
            .position(|candidate| *candidate == id)
            .ok_or(TaskrError::NotFound { task_id: id })?;
        let moved = ids.remove(from);
        let target = to_index.min(ids.len());
        ids.insert(target, moved);

        let changes = self.renumber(&ids);
        tracing::debug!(task_id = id, from, to = target, changed = changes.len(), "reordered");
        Ok(changes)
    }

    /// Optimistically mark a task completed or active.
    ///
    /// Completing stamps `completed_at` with `now`; reopening clears it and
    /// appends the task to the end of its group.
    pub fn patch_completed(
        &mut self,
        id: i64,
        completed: bool,
        now: NaiveDateTime,
    ) -> Result<BoardSnapshot> {
        let snapshot = self.snapshot();
        let priority = self.find(id)?.priority;
        let next_order = self.group_ids(priority).len() as i64;

        let task = self.find_mut(id)?;
        if task.is_completed == completed {
            return Ok(snapshot);
        }
        task.is_completed = completed;
        if completed {
            task.completed_at = Some(now.format(TIMESTAMP_FORMAT).to_string());
        } else {
            task.completed_at = None;
            task.order = next_order;
        }

        let ids = self.group_ids(priority);
        self.renumber(&ids);
        Ok(snapshot)
    }

    /// Optimistically soft-delete a task
    pub fn patch_deleted(&mut self, id: i64) -> Result<BoardSnapshot> {
        let snapshot = self.snapshot();
        let task = self.find_mut(id)?;
        task.is_deleted = true;
        let priority = task.priority;

        let ids = self.group_ids(priority);
        self.renumber(&ids);
        Ok(snapshot)
    }

    /// Optimistically apply an edit; a new priority moves the task to the
    /// end of that group.
    pub fn patch_edit(&mut self, id: i64, edit: &TaskEdit) -> Result<BoardSnapshot> {
        let snapshot = self.snapshot();
        let old_priority = self.find(id)?.priority;
        let moves_group = old_priority != edit.priority;
        let next_order = self.group_ids(edit.priority).len() as i64;

        let task = self.find_mut(id)?;
        task.title = edit.title.clone();
        task.description = edit.description.clone();
        if moves_group {
            task.priority = edit.priority;
            task.order = next_order;
            for priority in [old_priority, edit.priority] {
                let ids = self.group_ids(priority);
                self.renumber(&ids);
            }
        }
        Ok(snapshot)
    }

    /// Roll back to a snapshot taken by one of the `patch_*` methods
    pub fn restore(&mut self, snapshot: BoardSnapshot) {
        self.tasks = snapshot.0;
    }

    fn snapshot(&self) -> BoardSnapshot {
        BoardSnapshot(self.tasks.clone())
    }

    fn find(&self, id: i64) -> Result<&Task> {
        self.tasks
            .iter()
            .find(|task| task.id == id && !task.is_deleted)
            .ok_or_else(|| TaskrError::NotFound { task_id: id }.into())
    }

    fn find_mut(&mut self, id: i64) -> Result<&mut Task> {
        self.tasks
            .iter_mut()
            .find(|task| task.id == id && !task.is_deleted)
            .ok_or_else(|| TaskrError::NotFound { task_id: id }.into())
    }

    fn group(&self, priority: Priority) -> Vec<&Task> {
        let mut tasks: Vec<&Task> = self
            .tasks
            .iter()
            .filter(|task| task.is_active() && task.priority == priority)
            .collect();
        tasks.sort_by_key(|task| (task.order, task.id));
        tasks
    }

    fn group_ids(&self, priority: Priority) -> Vec<i64> {
        self.group(priority).into_iter().map(|task| task.id).collect()
    }

    /// Assign order = position in `ids`; returns the pairs that changed
    fn renumber(&mut self, ids: &[i64]) -> Vec<(i64, i64)> {
        let mut changes = Vec::new();
        for (index, id) in ids.iter().enumerate() {
            let order = index as i64;
            if let Some(task) = self.tasks.iter_mut().find(|task| task.id == *id) {
                if task.order != order {
                    task.order = order;
                    changes.push((task.id, order));
                }
            }
        }
        changes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn task(id: i64, priority: Priority, order: i64) -> Task {
        Task {
            id,
            user_id: 1,
            title: format!("Task {id}"),
            description: None,
            priority,
            order,
            is_completed: false,
            is_deleted: false,
            due_date: None,
            completed_at: None,
            created_at: None,
            updated_at: None,
        }
    }

    fn done(id: i64, completed_at: Option<&str>) -> Task {
        Task {
            is_completed: true,
            completed_at: completed_at.map(str::to_string),
            ..task(id, Priority::Medium, 0)
        }
    }

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 1, 13)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap()
    }

    fn orders(board: &TaskBoard, priority: Priority) -> Vec<(i64, i64)> {
        board
            .group(priority)
            .into_iter()
            .map(|task| (task.id, task.order))
            .collect()
    }

    #[test]
    fn test_replace_normalizes_orders() {
        let board = TaskBoard::from_tasks(vec![
            task(1, Priority::High, 5),
            task(2, Priority::High, 2),
            task(3, Priority::Low, 0),
            task(4, Priority::High, 2),
        ]);

        assert_eq!(orders(&board, Priority::High), vec![(2, 0), (4, 1), (1, 2)]);
        assert_eq!(orders(&board, Priority::Low), vec![(3, 0)]);
    }

    #[test]
    fn test_active_groups_in_priority_order() {
        let board = TaskBoard::from_tasks(vec![
            task(1, Priority::Low, 0),
            task(2, Priority::High, 0),
            done(3, Some("2025-01-01 00:00:00")),
        ]);

        let groups = board.active();
        let priorities: Vec<Priority> = groups.iter().map(|group| group.priority).collect();
        assert_eq!(priorities, vec![Priority::High, Priority::Low]);
        assert_eq!(board.active_count(), 2);
        assert_eq!(board.len(), 3);
    }

    #[test]
    fn test_replace_drops_deleted_rows() {
        let mut deleted = task(2, Priority::High, 1);
        deleted.is_deleted = true;
        let board = TaskBoard::from_tasks(vec![task(1, Priority::High, 0), deleted]);
        assert_eq!(board.len(), 1);
        assert!(board.get(2).is_none());
    }

    #[test]
    fn test_completed_newest_first_undated_last() {
        let board = TaskBoard::from_tasks(vec![
            done(1, Some("2025-01-10 08:00:00")),
            done(2, None),
            done(3, Some("2025-01-12 08:00:00")),
            task(4, Priority::High, 0),
        ]);

        let ids: Vec<i64> = board.completed().iter().map(|task| task.id).collect();
        assert_eq!(ids, vec![3, 1, 2]);
    }

    #[test]
    fn test_reorder_within_group() {
        let mut board = TaskBoard::from_tasks(vec![
            task(1, Priority::Medium, 0),
            task(2, Priority::Medium, 1),
            task(3, Priority::Medium, 2),
            task(9, Priority::High, 0),
        ]);

        let changes = board.reorder(3, 0).unwrap();
        assert_eq!(orders(&board, Priority::Medium), vec![(3, 0), (1, 1), (2, 2)]);
        assert_eq!(changes, vec![(3, 0), (1, 1), (2, 2)]);
        assert_eq!(orders(&board, Priority::High), vec![(9, 0)]);
    }

    #[test]
    fn test_reorder_clamps_index_and_preserves_membership() {
        let mut board = TaskBoard::from_tasks(vec![
            task(1, Priority::Low, 0),
            task(2, Priority::Low, 1),
            task(3, Priority::Low, 2),
        ]);

        board.reorder(1, 99).unwrap();
        let group = orders(&board, Priority::Low);
        assert_eq!(group, vec![(2, 0), (3, 1), (1, 2)]);

        let mut ids: Vec<i64> = group.iter().map(|(id, _)| *id).collect();
        ids.sort();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn test_reorder_rejects_completed_and_unknown() {
        let mut board = TaskBoard::from_tasks(vec![done(1, None), task(2, Priority::High, 0)]);
        assert!(board.reorder(1, 0).is_err());
        assert!(board.reorder(42, 0).is_err());
    }

    #[test]
    fn test_complete_moves_task_to_history() {
        let mut board = TaskBoard::from_tasks(vec![
            task(1, Priority::High, 0),
            task(2, Priority::High, 1),
        ]);

        board.patch_completed(1, true, now()).unwrap();

        assert_eq!(orders(&board, Priority::High), vec![(2, 0)]);
        let history = board.completed();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].completed_at.as_deref(), Some("2025-01-13 09:30:00"));
    }

    #[test]
    fn test_reopen_appends_to_group() {
        let mut board = TaskBoard::from_tasks(vec![
            done(1, Some("2025-01-10 08:00:00")),
            task(2, Priority::Medium, 0),
            task(3, Priority::Medium, 1),
        ]);

        board.patch_completed(1, false, now()).unwrap();

        assert_eq!(orders(&board, Priority::Medium), vec![(2, 0), (3, 1), (1, 2)]);
        assert!(board.completed().is_empty());
        assert_eq!(board.get(1).unwrap().completed_at, None);
    }

    #[test]
    fn test_soft_delete_hides_from_every_view() {
        let mut board = TaskBoard::from_tasks(vec![
            task(1, Priority::High, 0),
            task(2, Priority::High, 1),
            done(3, None),
        ]);

        board.patch_deleted(1).unwrap();
        board.patch_deleted(3).unwrap();

        assert_eq!(orders(&board, Priority::High), vec![(2, 0)]);
        assert!(board.completed().is_empty());
        assert!(board.active().iter().all(|group| group.tasks.iter().all(|t| t.id != 1)));
        assert_eq!(board.len(), 1);
        assert!(board.patch_deleted(1).is_err());
    }

    #[test]
    fn test_edit_priority_moves_between_groups() {
        let mut board = TaskBoard::from_tasks(vec![
            task(1, Priority::High, 0),
            task(2, Priority::High, 1),
            task(3, Priority::Low, 0),
        ]);
        let edit = TaskEdit {
            title: "Renamed".to_string(),
            description: Some("now low".to_string()),
            priority: Priority::Low,
        };

        board.patch_edit(1, &edit).unwrap();

        assert_eq!(orders(&board, Priority::High), vec![(2, 0)]);
        assert_eq!(orders(&board, Priority::Low), vec![(3, 0), (1, 1)]);
        assert_eq!(board.get(1).unwrap().title, "Renamed");
    }

    #[test]
    fn test_restore_rolls_back_patch() {
        let mut board = TaskBoard::from_tasks(vec![
            task(1, Priority::High, 0),
            task(2, Priority::High, 1),
        ]);
        let before = board.tasks().to_vec();

        let snapshot = board.patch_completed(1, true, now()).unwrap();
        board.restore(snapshot);

        assert_eq!(board.tasks(), before.as_slice());
    }
}
