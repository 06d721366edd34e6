use crate::annotation::VideoAnnotation;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

pub const UNKNOWN_TASK: &str = "unknown task";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskStatus {
    Processing,
    Completed,
    Aborted,
    Error(String),
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskStatus::Processing => write!(f, "processing"),
            TaskStatus::Completed => write!(f, "completed"),
            TaskStatus::Aborted => write!(f, "aborted"),
            TaskStatus::Error(message) => write!(f, "error: {}", message),
        }
    }
}

/// Status and results of every task since startup. Nothing is ever evicted.
#[derive(Debug, Default)]
pub struct TaskRegistry {
    statuses: RwLock<HashMap<String, TaskStatus>>,
    results: RwLock<HashMap<String, Arc<VideoAnnotation>>>,
}

impl TaskRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn new_task_id() -> String {
        uuid::Uuid::new_v4().to_string()
    }

    pub fn set_status(&self, task_id: &str, status: TaskStatus) {
        self.statuses.write().insert(task_id.to_string(), status);
    }

    pub fn status(&self, task_id: &str) -> Option<TaskStatus> {
        self.statuses.read().get(task_id).cloned()
    }

    pub fn status_label(&self, task_id: &str) -> String {
        self.status(task_id)
            .map(|status| status.to_string())
            .unwrap_or_else(|| UNKNOWN_TASK.to_string())
    }

    pub fn store_result(&self, task_id: &str, annotation: VideoAnnotation) {
        self.results
            .write()
            .insert(task_id.to_string(), Arc::new(annotation));
    }

    pub fn result(&self, task_id: &str) -> Option<Arc<VideoAnnotation>> {
        self.results.read().get(task_id).cloned()
    }
}
