//! CRUD over the `tasks` collection

use std::error::Error;

use serde::Serialize;
use serde_json::json;

use crate::config::TASKS;
use crate::outcome::{Outcome, ValidationError};
use crate::query::Query;
use crate::task::{dedup_tags, NewTask, Task, TaskChanges};
use crate::traits::RemoteStore;
use crate::utils::{from_row, to_row};

/// A thin layer over the store, for tasks.
///
/// Store errors are logged and never returned: writes result in `Outcome::Failed`, reads in an empty list.
pub struct TaskService<S: RemoteStore> {
    store: S,
}

impl<S: RemoteStore> TaskService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S { &self.store }

    /// Store a new task. A blank title is rejected without contacting the store
    pub async fn create_task(&self, new_task: &NewTask) -> Result<Outcome<Task>, ValidationError> {
        new_task.validate()?;

        let result = self.insert_task(new_task).await;
        Ok(Outcome::from_result(result, "creating a task"))
    }

    /// Every task, most recently created first. Returns an empty list in case the store cannot be read.
    ///
    /// Stored rows that cannot be read as tasks are skipped.
    pub async fn get_tasks(&self) -> Vec<Task> {
        match self.fetch_tasks().await {
            Ok(tasks) => tasks,
            Err(err) => {
                log::error!("Error fetching tasks: {}", err);
                Vec::new()
            },
        }
    }

    /// Overwrite some fields of a task
    pub async fn update_task(&self, id: &str, changes: &TaskChanges) -> Result<Outcome<Task>, ValidationError> {
        changes.validate()?;

        let result = self.patch_task(id, changes).await;
        Ok(Outcome::from_result(result, format!("updating task {}", id)))
    }

    pub async fn delete_task(&self, id: &str) -> Outcome<()> {
        let result = self.store.delete(TASKS, id).await;
        Outcome::from_result(result, format!("deleting task {}", id))
    }

    /// Set whether a task is completed, leaving its other fields untouched
    pub async fn toggle_task_completion(&self, id: &str, completed: bool) -> Outcome<()> {
        let result = self.patch_task(id, &json!({ "completed": completed })).await;
        Outcome::from_result(result, format!("updating the completion of task {}", id))
            .map(|_| ())
    }

    async fn insert_task(&self, new_task: &NewTask) -> Result<Task, Box<dyn Error>> {
        let mut new_task = new_task.clone();
        new_task.tags = dedup_tags(&new_task.tags);
        let row = to_row(&new_task)?;
        let stored = self.store.insert(TASKS, row).await?;
        from_row(stored)
    }

    async fn fetch_tasks(&self) -> Result<Vec<Task>, Box<dyn Error>> {
        let rows = self.store.select(TASKS, &Query::new().order("created_at", false)).await?;

        let mut tasks = Vec::with_capacity(rows.len());
        for row in rows {
            let id = row.get("id").cloned();
            match from_row::<Task>(row) {
                Err(err) => log::warn!("Ignoring an invalid stored task ({:?}): {}", id, err),
                Ok(task) => tasks.push(task),
            }
        }
        Ok(tasks)
    }

    async fn patch_task<T: Serialize>(&self, id: &str, changes: &T) -> Result<Task, Box<dyn Error>> {
        let row = to_row(changes)?;
        let stored = self.store.update(TASKS, id, row).await?;
        from_row(stored)
    }
}
