//! Shared helpers for the TUI.

pub mod task;
pub mod text;
pub mod text_input;

pub use task::{TaskCompleted, TaskId, TaskKind, TaskSeq, TaskStarted, TaskState, Tasks};
pub use text::{truncate_start_with_ellipsis, truncate_with_ellipsis};
pub use text_input::TextInput;
