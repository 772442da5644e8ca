//! Task board: the store plus the session's view state.
//!
//! Mutations go to the store, reads come back through [`derive`], and edit
//! mode is kept consistent with the collection (a task that disappears
//! cannot stay in edit mode).

use crate::error::Result;
use crate::id::{IdGenerator, UuidGenerator};
use crate::storage::KeyValueSlot;
use crate::store::{TaskCounts, TaskStore};
use crate::task::{NewTask, Task, TaskPatch};
use crate::view::{derive, SortConfig, StatusFilter};
use crate::view_state::ViewState;

#[derive(Debug, Clone)]
pub struct TaskBoard<S, G = UuidGenerator> {
    store: TaskStore<S, G>,
    view: ViewState,
}

impl<S: KeyValueSlot, G: IdGenerator> TaskBoard<S, G> {
    pub fn new(store: TaskStore<S, G>, view: ViewState) -> Self {
        Self { store, view }
    }

    pub fn store(&self) -> &TaskStore<S, G> {
        &self.store
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut ViewState {
        &mut self.view
    }

    /// Tasks to render under the current filter and sort.
    pub fn visible_tasks(&self) -> Vec<Task> {
        derive(
            self.store.all(),
            self.view.status_filter(),
            self.view.sort(),
        )
    }

    pub fn counts(&self) -> TaskCounts {
        self.store.counts()
    }

    pub fn set_status_filter(&mut self, filter: StatusFilter) {
        self.view.set_status_filter(filter);
    }

    pub fn set_sort(&mut self, sort: SortConfig) {
        self.view.set_sort(sort);
    }

    pub fn add(&mut self, params: NewTask) -> Result<Task> {
        self.store.create(params)
    }

    pub fn toggle(&mut self, id: &str) -> Option<Task> {
        self.store.toggle(id)
    }

    pub fn update(&mut self, id: &str, patch: TaskPatch) -> Result<Option<Task>> {
        self.store.update(id, patch)
    }

    pub fn delete(&mut self, id: &str) -> Option<Task> {
        let removed = self.store.delete(id)?;
        if self.view.is_editing(id) {
            self.view.stop_editing();
        }
        Some(removed)
    }

    pub fn clear_completed(&mut self) -> usize {
        let removed = self.store.clear_completed();
        self.drop_stale_edit();
        removed
    }

    pub fn reset(&mut self) {
        self.store.reset();
        self.view.stop_editing();
    }

    /// Enter edit mode for `id`. Returns false when no such task exists.
    pub fn start_editing(&mut self, id: &str) -> bool {
        if self.store.get(id).is_none() {
            return false;
        }
        self.view.start_editing(id);
        true
    }

    pub fn cancel_editing(&mut self) {
        self.view.stop_editing();
    }

    /// Apply `patch` to the task being edited and leave edit mode.
    ///
    /// `Ok(None)` when nothing is being edited. A validation failure keeps
    /// the task in edit mode.
    pub fn commit_edit(&mut self, patch: TaskPatch) -> Result<Option<Task>> {
        let Some(id) = self.view.editing_task_id().map(str::to_string) else {
            return Ok(None);
        };
        let updated = self.store.update(&id, patch)?;
        self.view.stop_editing();
        Ok(updated)
    }

    fn drop_stale_edit(&mut self) {
        let stale = self
            .view
            .editing_task_id()
            .is_some_and(|id| self.store.get(id).is_none());
        if stale {
            self.view.stop_editing();
        }
    }
}
