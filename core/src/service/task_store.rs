use std::collections::HashSet;

use anyhow::{anyhow, Context, Result};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::model::task::{normalize_description, Task, TaskDraft};
use crate::repository::KeyValueStore;

/// Key under which the whole task list is stored.
pub const STORAGE_KEY: &str = "zenTasks";

/// Owns the task list (newest first) and writes it back to storage after
/// every mutation.
pub struct TaskStore<S: KeyValueStore> {
    storage: S,
    tasks: Vec<Task>,
}

impl<S: KeyValueStore> TaskStore<S> {
    /// Loads the persisted list. Missing or unreadable data yields an empty
    /// list; this never fails.
    pub fn hydrate(storage: S) -> Self {
        let tasks = match load_tasks(&storage) {
            Ok(Some(tasks)) => {
                info!(count = tasks.len(), "hydrated task list");
                tasks
            }
            Ok(None) => {
                debug!("no persisted task list, starting empty");
                Vec::new()
            }
            Err(e) => {
                warn!("Failed to load tasks, starting empty: {:#}", e);
                Vec::new()
            }
        };
        Self { storage, tasks }
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn get(&self, id: &Uuid) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == *id)
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn pending_count(&self) -> usize {
        self.tasks.iter().filter(|t| !t.completed).count()
    }

    /// Returns `Ok(None)` without touching anything if the title is blank.
    pub fn add(&mut self, draft: TaskDraft) -> Result<Option<Task>> {
        if draft.title.trim().is_empty() {
            debug!("rejected draft with empty title");
            return Ok(None);
        }

        let task = Task::from_draft(draft);
        info!(id = %task.id, title = %task.title, "added task");
        self.tasks.insert(0, task.clone());
        self.persist()?;
        Ok(Some(task))
    }

    pub fn delete(&mut self, id: &Uuid) -> Result<bool> {
        let initial_len = self.tasks.len();
        self.tasks.retain(|t| t.id != *id);

        if self.tasks.len() == initial_len {
            return Ok(false);
        }

        info!(%id, "deleted task");
        self.persist()?;
        Ok(true)
    }

    pub fn toggle_complete(&mut self, id: &Uuid) -> Result<bool> {
        let Some(task) = self.tasks.iter_mut().find(|t| t.id == *id) else {
            return Ok(false);
        };
        task.completed = !task.completed;
        info!(%id, completed = task.completed, "toggled task");

        self.persist()?;
        Ok(true)
    }

    /// Replaces title and description. Unlike `add`, the title is not
    /// validated.
    pub fn save_edit(&mut self, id: &Uuid, title: &str, description: &str) -> Result<bool> {
        let Some(task) = self.tasks.iter_mut().find(|t| t.id == *id) else {
            return Ok(false);
        };
        task.title = title.to_string();
        task.description = normalize_description(Some(description.to_string()));
        info!(%id, "edited task");

        self.persist()?;
        Ok(true)
    }

    pub fn persist(&self) -> Result<()> {
        let json = serde_json::to_string_pretty(&self.tasks)?;
        self.storage
            .set(STORAGE_KEY, &json)
            .context("Failed to persist tasks")?;
        debug!(count = self.tasks.len(), "persisted task list");
        Ok(())
    }

    /// Finds the single task whose id starts with `prefix`.
    pub fn resolve_id(&self, prefix: &str) -> Result<Uuid> {
        let prefix = prefix.trim().to_lowercase();
        if prefix.is_empty() {
            return Err(anyhow!("Task id is required"));
        }

        let matches: Vec<Uuid> = self
            .tasks
            .iter()
            .map(|t| t.id)
            .filter(|id| id.to_string().starts_with(&prefix))
            .collect();

        match matches.len() {
            1 => Ok(matches[0]),
            0 => Err(anyhow!("No task matches '{}'", prefix)),
            n => Err(anyhow!("Ambiguous id '{}' matches {} tasks", prefix, n)),
        }
    }
}

fn load_tasks<S: KeyValueStore>(storage: &S) -> Result<Option<Vec<Task>>> {
    let Some(raw) = storage.get(STORAGE_KEY)? else {
        return Ok(None);
    };
    let tasks: Vec<Task> =
        serde_json::from_str(&raw).context("Persisted task list is not valid")?;
    Ok(Some(dedup_by_id(tasks)))
}

/// Keeps the first task for each id; later copies are dropped.
fn dedup_by_id(tasks: Vec<Task>) -> Vec<Task> {
    let mut seen = HashSet::with_capacity(tasks.len());
    tasks
        .into_iter()
        .filter(|task| {
            let first = seen.insert(task.id);
            if !first {
                warn!(id = %task.id, title = %task.title, "dropping task with duplicate id");
            }
            first
        })
        .collect()
}
