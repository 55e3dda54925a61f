/*
[INPUT]:  Public API exports for the taskr crate
[OUTPUT]: Module declarations and public re-exports
[POS]:    Crate root - library entry point
[UPDATE]: When adding new modules or public exports
*/

pub mod board;
pub mod config;
pub mod offline;
pub mod prefs;
pub mod service;
pub mod undo;
pub mod validation;

// Re-export main types for convenience
pub use board::{PriorityGroup, TaskBoard};
pub use config::AppConfig;
pub use offline::OfflineStore;
pub use prefs::{PrefStore, Session};
pub use service::TaskService;
pub use undo::{UndoOutcome, UndoTicket, UndoWindow};
