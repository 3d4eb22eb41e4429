//! The task list a view displays
//!
//! The board holds a disposable copy of the `tasks` collection, the display order of that copy,
//! and the UI state around it (current folder, selected task, filters).
//! Every write goes through a [`TaskService`], and the board then applies the store's answer.

use std::collections::BTreeSet;

use crate::outcome::{Outcome, ValidationError};
use crate::task::{NewTask, Priority, Task, TaskChanges};
use crate::tasks::TaskService;
use crate::traits::RemoteStore;
use crate::view::{Generation, Ticket};

/// The two task folders
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Folder {
    /// Tasks that are not completed
    Active,
    Completed,
}

impl Default for Folder {
    fn default() -> Self {
        Folder::Active
    }
}

impl Folder {
    pub fn contains(&self, task: &Task) -> bool {
        match self {
            Folder::Active => task.completed() == false,
            Folder::Completed => task.completed(),
        }
    }
}

/// Extra filters on the displayed tasks. `None` means "all"
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TaskFilters {
    pub priority: Option<Priority>,
    pub tag: Option<String>,
}

impl TaskFilters {
    pub fn matches(&self, task: &Task) -> bool {
        if let Some(priority) = self.priority {
            if task.priority() != priority {
                return false;
            }
        }
        if let Some(tag) = &self.tag {
            if task.has_tag(tag) == false {
                return false;
            }
        }
        true
    }
}

/// The state of a task view
#[derive(Debug, Default)]
pub struct TaskBoard {
    /// In display order. This order is never stored, and is lost on the next refresh
    tasks: Vec<Task>,
    folder: Folder,
    selected: Option<String>,
    filters: TaskFilters,
    generation: Generation,
}

impl TaskBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tasks(&self) -> &[Task] { &self.tasks }
    pub fn folder(&self) -> Folder { self.folder }
    pub fn filters(&self) -> &TaskFilters { &self.filters }

    pub fn task(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id() == id)
    }

    pub fn set_folder(&mut self, folder: Folder) {
        self.folder = folder;
    }

    pub fn set_filters(&mut self, filters: TaskFilters) {
        self.filters = filters;
    }

    /// Select a task (e.g. to show its details), or clear the selection
    pub fn select(&mut self, id: Option<&str>) {
        self.selected = id.map(|id| id.to_string());
    }

    pub fn selected_task(&self) -> Option<&Task> {
        self.selected.as_deref().and_then(|id| self.task(id))
    }

    /// Tasks of the current folder that match the filters, in display order
    pub fn visible_tasks(&self) -> Vec<&Task> {
        self.tasks.iter()
            .filter(|t| self.folder.contains(t) && self.filters.matches(t))
            .collect()
    }

    /// How many tasks are in the (active, completed) folders
    pub fn counts(&self) -> (usize, usize) {
        let completed = self.tasks.iter().filter(|t| t.completed()).count();
        (self.tasks.len() - completed, completed)
    }

    /// Every tag used by any task, sorted
    pub fn available_tags(&self) -> Vec<String> {
        let tags: BTreeSet<&String> = self.tasks.iter().flat_map(|t| t.tags()).collect();
        tags.into_iter().cloned().collect()
    }

    /// Start a refresh. Refreshes that are still in flight will be ignored.
    ///
    /// Writes that change the board also invalidate the refreshes started before them.
    pub fn begin_refresh(&mut self) -> Ticket {
        self.generation.issue()
    }

    /// Replace the whole list with a fresh one from the store.
    /// Returns `false` (and ignores the list) in case another refresh has started since, or the board has been detached
    pub fn finish_refresh(&mut self, ticket: Ticket, tasks: Vec<Task>) -> bool {
        if self.generation.is_current(ticket) == false {
            log::debug!("Ignoring a stale task list");
            return false;
        }
        self.tasks = tasks;
        if let Some(id) = &self.selected {
            if self.tasks.iter().all(|t| t.id() != id) {
                self.selected = None;
            }
        }
        true
    }

    /// The board is no longer displayed. Refreshes in flight will be ignored
    pub fn detach(&mut self) {
        self.generation.invalidate();
    }

    pub async fn refresh<S: RemoteStore>(&mut self, service: &TaskService<S>) {
        let ticket = self.begin_refresh();
        let tasks = service.get_tasks().await;
        self.finish_refresh(ticket, tasks);
    }

    /// Create an active task from a title, and put it on top of the list once the store has saved it
    pub async fn create_task<S: RemoteStore>(&mut self, service: &TaskService<S>, title: &str) -> Result<Outcome<()>, ValidationError> {
        let outcome = service.create_task(&NewTask::new(title)).await?;
        Ok(outcome.map(|task| {
            self.generation.invalidate();
            self.tasks.insert(0, task);
        }))
    }

    /// Update a task, display the store's version of it, and close its details
    pub async fn update_task<S: RemoteStore>(&mut self, service: &TaskService<S>, id: &str, changes: &TaskChanges) -> Result<Outcome<()>, ValidationError> {
        let outcome = service.update_task(id, changes).await?;
        Ok(outcome.map(|updated| {
            self.generation.invalidate();
            match self.tasks.iter().position(|t| t.id() == updated.id()) {
                Some(index) => self.tasks[index] = updated,
                None => self.tasks.insert(0, updated),
            }
            self.selected = None;
        }))
    }

    /// Delete a task, and remove it from the list once the store has deleted it
    pub async fn delete_task<S: RemoteStore>(&mut self, service: &TaskService<S>, id: &str) -> Outcome<()> {
        let outcome = service.delete_task(id).await;
        if outcome.is_done() {
            self.generation.invalidate();
            self.tasks.retain(|t| t.id() != id);
            if self.selected.as_deref() == Some(id) {
                self.selected = None;
            }
        }
        outcome
    }

    /// Mark a task as completed (or not).
    ///
    /// The change is displayed at once, and rolled back in case the store does not apply it.
    pub async fn set_completion<S: RemoteStore>(&mut self, service: &TaskService<S>, id: &str, completed: bool) -> Result<Outcome<()>, ValidationError> {
        let index = self.tasks.iter().position(|t| t.id() == id)
            .ok_or_else(|| ValidationError::UnknownTask(id.to_string()))?;
        let previous = self.tasks[index].completed();
        self.tasks[index].set_completed(completed);
        self.generation.invalidate();

        let outcome = service.toggle_task_completion(id, completed).await;
        if outcome.is_failed() {
            log::info!("Rolling back the completion of task {}", id);
            if let Some(task) = self.tasks.iter_mut().find(|t| t.id() == id) {
                task.set_completed(previous);
            }
        }
        Ok(outcome)
    }

    /// Move a task to another position among the tasks that have the same completion status.
    ///
    /// `to_index` is a position within that subset. Tasks of the other status keep their positions.
    /// This only changes the display order, which is never stored.
    pub fn reorder(&mut self, id: &str, to_index: usize) -> bool {
        let completed = match self.task(id) {
            None => return false,
            Some(task) => task.completed(),
        };

        let positions: Vec<usize> = self.tasks.iter().enumerate()
            .filter(|(_, t)| t.completed() == completed)
            .map(|(i, _)| i)
            .collect();
        let mut subset: Vec<Task> = positions.iter().map(|&i| self.tasks[i].clone()).collect();

        let from_index = match subset.iter().position(|t| t.id() == id) {
            None => return false,
            Some(i) => i,
        };
        let dragged = subset.remove(from_index);
        let to_index = to_index.min(subset.len());
        subset.insert(to_index, dragged);

        for (position, task) in positions.into_iter().zip(subset) {
            self.tasks[position] = task;
        }
        true
    }
}
