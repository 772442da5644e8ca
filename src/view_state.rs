//! Session-only view selection: status filter, sort and edit target.
//!
//! Nothing here is persisted.

use crate::view::{SortConfig, SortCriterion, SortDirection, StatusFilter};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewState {
    status_filter: StatusFilter,
    sort: SortConfig,
    editing_task_id: Option<String>,
}

impl ViewState {
    pub fn new(status_filter: StatusFilter, sort: SortConfig) -> Self {
        Self {
            status_filter,
            sort,
            editing_task_id: None,
        }
    }

    pub fn status_filter(&self) -> StatusFilter {
        self.status_filter
    }

    pub fn sort(&self) -> SortConfig {
        self.sort
    }

    pub fn editing_task_id(&self) -> Option<&str> {
        self.editing_task_id.as_deref()
    }

    pub fn is_editing(&self, id: &str) -> bool {
        self.editing_task_id.as_deref() == Some(id)
    }

    pub fn set_status_filter(&mut self, filter: StatusFilter) {
        self.status_filter = filter;
    }

    pub fn set_sort(&mut self, sort: SortConfig) {
        self.sort = sort;
    }

    pub fn set_sort_criterion(&mut self, criterion: SortCriterion) {
        self.sort.criterion = criterion;
    }

    pub fn set_sort_direction(&mut self, direction: SortDirection) {
        self.sort.direction = direction;
    }

    pub fn toggle_sort_direction(&mut self) {
        self.sort.direction = self.sort.direction.reversed();
    }

    /// Put `id` into edit mode, returning the task that was being edited.
    ///
    /// The previous edit is dropped without saving.
    pub fn start_editing(&mut self, id: impl Into<String>) -> Option<String> {
        self.editing_task_id.replace(id.into())
    }

    pub fn stop_editing(&mut self) -> Option<String> {
        self.editing_task_id.take()
    }
}
