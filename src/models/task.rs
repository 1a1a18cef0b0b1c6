//! Brand task lifecycle and outcome types.

use std::fmt;

/// Lifecycle of a single brand task.
///
/// `Pending -> Rendering -> Extracting -> Persisting -> Done`, with
/// `Rendering` and `Persisting` able to end in `Failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskState {
    Pending,
    Rendering,
    Extracting,
    Persisting,
    Done,
    Failed,
}

impl TaskState {
    /// Check whether moving from `self` to `next` is a legal transition.
    pub fn can_advance_to(self, next: TaskState) -> bool {
        use TaskState::*;
        matches!(
            (self, next),
            (Pending, Rendering)
                | (Rendering, Extracting)
                | (Rendering, Failed)
                | (Extracting, Persisting)
                | (Persisting, Done)
                | (Persisting, Failed)
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, TaskState::Done | TaskState::Failed)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TaskState::Pending => "pending",
            TaskState::Rendering => "rendering",
            TaskState::Extracting => "extracting",
            TaskState::Persisting => "persisting",
            TaskState::Done => "done",
            TaskState::Failed => "failed",
        }
    }
}

impl fmt::Display for TaskState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Final result of one brand task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskOutcome {
    Success { brand: String, record_count: usize },
    Failure { brand: String, cause: String },
}

impl TaskOutcome {
    pub fn brand(&self) -> &str {
        match self {
            TaskOutcome::Success { brand, .. } | TaskOutcome::Failure { brand, .. } => brand,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, TaskOutcome::Success { .. })
    }
}

impl fmt::Display for TaskOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskOutcome::Success {
                brand,
                record_count,
            } => write!(f, "Brand '{}' => {} items.", brand, record_count),
            TaskOutcome::Failure { brand, cause } => {
                write!(f, "Brand '{}' failed: {}", brand, cause)
            }
        }
    }
}
