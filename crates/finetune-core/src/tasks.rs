//! Task generation from a task-context source.

use std::io::BufRead;
use std::path::Path;

use tracing::debug;

use crate::domain::{EvalError, Result, Task, TaskBatch};

/// Upstream supplier of task contexts (a dataset cursor).
///
/// Each call to `get` advances the source's own cursor.
pub trait TaskContextSource {
    fn get(&mut self) -> serde_json::Value;
}

impl<F> TaskContextSource for F
where
    F: FnMut() -> serde_json::Value,
{
    fn get(&mut self) -> serde_json::Value {
        self()
    }
}

/// Draw `count` tasks from `source`, calling it exactly once per task, in order.
///
/// Contexts are accepted as-is; no deduplication or validation.
pub fn generate_tasks(source: &mut dyn TaskContextSource, count: usize) -> Result<TaskBatch> {
    if count == 0 {
        return Err(EvalError::InvalidConfig(
            "task count must be at least 1".to_string(),
        ));
    }

    let tasks: Vec<Task> = (0..count).map(|i| Task::new(i, source.get())).collect();
    let batch = TaskBatch::new(tasks);
    debug!(count = batch.len(), digest = %batch.digest(), "generated task batch");
    Ok(batch)
}

/// In-order source over a fixed set of contexts that wraps at the end.
#[derive(Debug, Clone)]
pub struct CyclicTaskSource {
    contexts: Vec<serde_json::Value>,
    cursor: usize,
}

impl CyclicTaskSource {
    pub fn new(contexts: Vec<serde_json::Value>) -> Result<Self> {
        if contexts.is_empty() {
            return Err(EvalError::TaskSource(
                "task source has no contexts".to_string(),
            ));
        }
        Ok(Self {
            contexts,
            cursor: 0,
        })
    }

    /// Load one JSON context per non-blank line.
    pub fn from_jsonl(path: &Path) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        let mut contexts = Vec::new();
        for (lineno, line) in std::io::BufReader::new(file).lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let value = serde_json::from_str(&line).map_err(|e| {
                EvalError::TaskSource(format!("{}:{}: {}", path.display(), lineno + 1, e))
            })?;
            contexts.push(value);
        }
        Self::new(contexts)
    }

    pub fn len(&self) -> usize {
        self.contexts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contexts.is_empty()
    }

    /// Index of the next context to be returned.
    pub fn cursor(&self) -> usize {
        self.cursor
    }
}

impl TaskContextSource for CyclicTaskSource {
    fn get(&mut self) -> serde_json::Value {
        let value = self.contexts[self.cursor].clone();
        self.cursor = (self.cursor + 1) % self.contexts.len();
        value
    }
}
