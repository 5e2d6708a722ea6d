//! Shared TUI building blocks.

pub mod form;
pub mod task;

pub use form::{Form, FormKey, TextField};
pub use task::{TaskCompleted, TaskId, TaskKind, TaskSeq, TaskStarted, TaskState, Tasks};
