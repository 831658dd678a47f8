//! Evaluation tasks and the fixed task batch.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// One unit of evaluation work wrapping an opaque context payload.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Task {
    /// Position of the task within its batch.
    pub index: usize,

    /// Context drawn from the task source. Opaque to the pipeline.
    pub context: serde_json::Value,
}

impl Task {
    pub fn new(index: usize, context: serde_json::Value) -> Self {
        Self { index, context }
    }

    /// Stable key for looking up per-task model output.
    ///
    /// Uses the context's `task_id` string when present, otherwise the index.
    pub fn key(&self) -> String {
        match self.context.get("task_id").and_then(|v| v.as_str()) {
            Some(id) => id.to_string(),
            None => self.index.to_string(),
        }
    }
}

/// Ordered, fixed-length batch of tasks shared by every model in a run.
///
/// Fields are private: once built the batch cannot change.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TaskBatch {
    tasks: Vec<Task>,
    digest: String,
}

impl TaskBatch {
    pub fn new(tasks: Vec<Task>) -> Self {
        let digest = compute_batch_digest(&tasks);
        Self { tasks, digest }
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Task> {
        self.tasks.iter()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// SHA-256 hex digest over the ordered task contexts.
    pub fn digest(&self) -> &str {
        &self.digest
    }
}

impl<'a> IntoIterator for &'a TaskBatch {
    type Item = &'a Task;
    type IntoIter = std::slice::Iter<'a, Task>;

    fn into_iter(self) -> Self::IntoIter {
        self.tasks.iter()
    }
}

/// Order-sensitive digest of task contexts.
fn compute_batch_digest(tasks: &[Task]) -> String {
    let mut hasher = Sha256::new();
    for task in tasks {
        // serde_json maps are key-sorted, so this encoding is canonical.
        hasher.update(task.context.to_string().as_bytes());
        hasher.update(b"\0");
    }
    hex::encode(hasher.finalize())
}
