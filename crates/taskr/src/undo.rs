/*
[INPUT]:  Task completions and undo requests
[OUTPUT]: A single timed undo affordance (elapsed or cancelled)
[POS]:    State layer - the only delayed behavior in the client
[UPDATE]: When undo timing rules change
*/

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::time::{Instant, sleep_until};
use tokio_util::sync::CancellationToken;

pub const DEFAULT_UNDO_WINDOW: Duration = Duration::from_secs(5);

/// How an armed window ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UndoOutcome {
    /// Timer ran out; the completion is final
    Elapsed,
    /// Undone by the user or replaced by a newer completion
    Cancelled,
}

#[derive(Debug)]
struct Pending {
    generation: u64,
    task_id: i64,
    deadline: Instant,
    token: CancellationToken,
}

#[derive(Debug, Default)]
struct Slot {
    generation: u64,
    pending: Option<Pending>,
}

/// At most one completion can be undone at a time; arming a new window
/// cancels the previous one.
#[derive(Debug, Clone)]
pub struct UndoWindow {
    duration: Duration,
    slot: Arc<Mutex<Slot>>,
}

/// Handle for waiting on one armed window
#[derive(Debug)]
pub struct UndoTicket {
    generation: u64,
    task_id: i64,
    deadline: Instant,
    token: CancellationToken,
    slot: Arc<Mutex<Slot>>,
}

impl Default for UndoWindow {
    fn default() -> Self {
        Self::new(DEFAULT_UNDO_WINDOW)
    }
}

impl UndoWindow {
    pub fn new(duration: Duration) -> Self {
        Self {
            duration,
            slot: Arc::new(Mutex::new(Slot::default())),
        }
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Open a window for `task_id`, cancelling any open one
    pub fn arm(&self, task_id: i64) -> UndoTicket {
        let mut slot = self.lock();
        if let Some(previous) = slot.pending.take() {
            tracing::debug!(task_id = previous.task_id, "undo window superseded");
            previous.token.cancel();
        }

        slot.generation += 1;
        let pending = Pending {
            generation: slot.generation,
            task_id,
            deadline: Instant::now() + self.duration,
            token: CancellationToken::new(),
        };
        let ticket = UndoTicket {
            generation: pending.generation,
            task_id,
            deadline: pending.deadline,
            token: pending.token.clone(),
            slot: Arc::clone(&self.slot),
        };
        slot.pending = Some(pending);
        ticket
    }

    /// Take the pending task id if its window is still open
    pub fn undo(&self) -> Option<i64> {
        let mut slot = self.lock();
        let pending = slot.pending.take()?;
        if Instant::now() >= pending.deadline {
            return None;
        }
        pending.token.cancel();
        Some(pending.task_id)
    }

    /// Task id whose completion can still be undone
    pub fn pending(&self) -> Option<i64> {
        self.remaining().map(|(task_id, _)| task_id)
    }

    /// Pending task id and time left
    pub fn remaining(&self) -> Option<(i64, Duration)> {
        let slot = self.lock();
        let pending = slot.pending.as_ref()?;
        let left = pending.deadline.checked_duration_since(Instant::now())?;
        (!left.is_zero()).then_some((pending.task_id, left))
    }

    /// Close the window without undoing
    pub fn dismiss(&self) {
        if let Some(pending) = self.lock().pending.take() {
            pending.token.cancel();
        }
    }

    fn lock(&self) -> MutexGuard<'_, Slot> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl UndoTicket {
    pub fn task_id(&self) -> i64 {
        self.task_id
    }

    /// Resolve once the window elapses or is cancelled
    pub async fn wait(self) -> UndoOutcome {
        tokio::select! {
            _ = self.token.cancelled() => UndoOutcome::Cancelled,
            _ = sleep_until(self.deadline) => {
                let mut slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
                if slot
                    .pending
                    .as_ref()
                    .is_some_and(|pending| pending.generation == self.generation)
                {
                    slot.pending = None;
                }
                tracing::debug!(task_id = self.task_id, "undo window elapsed");
                UndoOutcome::Elapsed
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_window_elapses() {
        let window = UndoWindow::new(Duration::from_secs(5));
        let ticket = window.arm(7);
        assert_eq!(window.pending(), Some(7));

        assert_eq!(ticket.wait().await, UndoOutcome::Elapsed);
        assert_eq!(window.pending(), None);
        assert_eq!(window.undo(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_undo_within_window_cancels_timer() {
        let window = UndoWindow::new(Duration::from_secs(5));
        let ticket = window.arm(7);

        tokio::time::advance(Duration::from_secs(2)).await;
        let (task_id, left) = window.remaining().unwrap();
        assert_eq!(task_id, 7);
        assert_eq!(left, Duration::from_secs(3));

        assert_eq!(window.undo(), Some(7));
        assert_eq!(ticket.wait().await, UndoOutcome::Cancelled);
        assert_eq!(window.undo(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_undo_after_deadline_is_noop() {
        let window = UndoWindow::new(Duration::from_secs(5));
        let _ticket = window.arm(7);

        tokio::time::advance(Duration::from_secs(6)).await;
        assert_eq!(window.pending(), None);
        assert_eq!(window.undo(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_new_completion_supersedes_previous() {
        let window = UndoWindow::new(Duration::from_secs(5));
        let first = window.arm(1);
        let second = window.arm(2);

        assert_eq!(first.wait().await, UndoOutcome::Cancelled);
        assert_eq!(window.pending(), Some(2));
        assert_eq!(second.task_id(), 2);

        window.dismiss();
        assert_eq!(window.pending(), None);
        assert_eq!(second.wait().await, UndoOutcome::Cancelled);
    }
}
