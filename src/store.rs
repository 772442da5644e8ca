//! The task store.
//!
//! [`TaskStore`] owns the task collection. Every mutation goes through it and
//! every successful mutation is written through to [`TaskPersistence`]
//! before the call returns. Storage failures are logged by the persistence
//! layer and never reach the caller, so the in-memory collection is always
//! the source of truth for the session.

use std::collections::HashSet;

use chrono::Utc;
use tracing::{debug, warn};

use crate::error::Result;
use crate::id::{IdGenerator, UuidGenerator};
use crate::storage::{KeyValueSlot, TaskPersistence};
use crate::task::{normalize_title, NewTask, Task, TaskPatch};

/// Number of tasks per status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TaskCounts {
    pub all: usize,
    pub active: usize,
    pub completed: usize,
}

#[derive(Debug, Clone)]
pub struct TaskStore<S, G = UuidGenerator> {
    tasks: Vec<Task>,
    persistence: TaskPersistence<S>,
    ids: G,
}

impl<S: KeyValueSlot> TaskStore<S> {
    /// Open a store, initialising the collection from one load.
    pub fn open(persistence: TaskPersistence<S>) -> Self {
        Self::with_id_generator(persistence, UuidGenerator)
    }
}

impl<S: KeyValueSlot, G: IdGenerator> TaskStore<S, G> {
    pub fn with_id_generator(persistence: TaskPersistence<S>, ids: G) -> Self {
        let tasks = retain_valid(persistence.load());
        debug!(tasks = tasks.len(), "opened task store");
        Self {
            tasks,
            persistence,
            ids,
        }
    }

    pub fn persistence(&self) -> &TaskPersistence<S> {
        &self.persistence
    }

    pub fn persistence_mut(&mut self) -> &mut TaskPersistence<S> {
        &mut self.persistence
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Create a task and append it to the collection.
    ///
    /// Fails with a validation error when the title is blank.
    pub fn create(&mut self, params: NewTask) -> Result<Task> {
        let title = normalize_title(&params.title)?;
        let task = Task {
            id: self.next_id(),
            title,
            completed: params.completed.unwrap_or(false),
            creation_date: Utc::now(),
            description: params.description,
            due_date: params.due_date,
            priority: params.priority,
        };
        debug!(id = %task.id, "created task");
        self.tasks.push(task.clone());
        self.persist();
        Ok(task)
    }

    /// Merge `patch` onto the task with `id`.
    ///
    /// `Ok(None)` when no task matches; nothing is changed or saved then.
    pub fn update(&mut self, id: &str, patch: TaskPatch) -> Result<Option<Task>> {
        let patch = patch.validated()?;
        let Some(task) = self.tasks.iter_mut().find(|task| task.id == id) else {
            debug!(id, "update skipped: task not found");
            return Ok(None);
        };
        task.apply(patch);
        let updated = task.clone();
        debug!(id, "updated task");
        self.persist();
        Ok(Some(updated))
    }

    /// Flip `completed` on the task with `id`.
    pub fn toggle(&mut self, id: &str) -> Option<Task> {
        let task = self.tasks.iter_mut().find(|task| task.id == id)?;
        task.completed = !task.completed;
        let toggled = task.clone();
        debug!(id, completed = toggled.completed, "toggled task");
        self.persist();
        Some(toggled)
    }

    /// Remove the task with `id`, returning it.
    pub fn delete(&mut self, id: &str) -> Option<Task> {
        let index = self.tasks.iter().position(|task| task.id == id)?;
        let removed = self.tasks.remove(index);
        debug!(id, "deleted task");
        self.persist();
        Some(removed)
    }

    /// Remove every completed task, returning how many were removed.
    ///
    /// Always saves, even when nothing was removed.
    pub fn clear_completed(&mut self) -> usize {
        let before = self.tasks.len();
        self.tasks.retain(Task::is_active);
        let removed = before - self.tasks.len();
        debug!(removed, "cleared completed tasks");
        self.persist();
        removed
    }

    /// Empty the collection.
    pub fn reset(&mut self) {
        self.tasks.clear();
        debug!("reset task store");
        self.persist();
    }

    // =========================================================================
    // Selectors
    // =========================================================================

    /// All tasks in insertion order.
    pub fn all(&self) -> &[Task] {
        &self.tasks
    }

    pub fn active(&self) -> Vec<&Task> {
        self.tasks.iter().filter(|task| !task.completed).collect()
    }

    pub fn completed(&self) -> Vec<&Task> {
        self.tasks.iter().filter(|task| task.completed).collect()
    }

    pub fn get(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == id)
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn counts(&self) -> TaskCounts {
        let completed = self.tasks.iter().filter(|task| task.completed).count();
        TaskCounts {
            all: self.tasks.len(),
            active: self.tasks.len() - completed,
            completed,
        }
    }

    fn next_id(&mut self) -> String {
        // Regenerate on the (practically impossible) clash with a stored id.
        loop {
            let id = self.ids.generate();
            if self.get(&id).is_none() {
                return id;
            }
        }
    }

    fn persist(&mut self) {
        self.persistence.save(&self.tasks);
    }
}

/// Drop loaded records with a blank title or an id seen earlier.
fn retain_valid(tasks: Vec<Task>) -> Vec<Task> {
    let mut seen = HashSet::new();
    tasks
        .into_iter()
        .filter(|task| {
            if task.title.trim().is_empty() {
                warn!(id = %task.id, "dropping stored task with blank title");
                return false;
            }
            if !seen.insert(task.id.clone()) {
                warn!(id = %task.id, "dropping stored task with duplicate id");
                return false;
            }
            true
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemorySlot;
    use crate::task::Priority;

    /// Yields the queued ids in order, then numbered ones.
    struct ScriptedIds {
        queued: Vec<String>,
        counter: usize,
    }

    impl IdGenerator for ScriptedIds {
        fn generate(&mut self) -> String {
            if !self.queued.is_empty() {
                return self.queued.remove(0);
            }
            self.counter += 1;
            format!("id-{}", self.counter)
        }
    }

    fn memory_store() -> TaskStore<MemorySlot> {
        TaskStore::open(TaskPersistence::new(MemorySlot::new()))
    }

    #[test]
    fn create_assigns_distinct_ids() {
        let mut store = memory_store();
        for i in 0..50 {
            store.create(NewTask::new(format!("task {i}"))).expect("create");
        }
        let ids: HashSet<&str> = store.all().iter().map(|task| task.id.as_str()).collect();
        assert_eq!(ids.len(), 50);
    }

    #[test]
    fn create_applies_defaults_and_trims() {
        let mut store = memory_store();
        let task = store.create(NewTask::new("  Buy milk  ")).expect("create");
        assert_eq!(task.title, "Buy milk");
        assert!(!task.completed);
        assert_eq!(task.priority, None);
        assert_eq!(store.all(), std::slice::from_ref(&task));
        assert_eq!(store.persistence().slot().writes(), 1);
    }

    #[test]
    fn create_keeps_supplied_fields() {
        let mut store = memory_store();
        let due = chrono::NaiveDate::from_ymd_opt(2024, 3, 1).expect("date");
        let task = store
            .create(
                NewTask::new("Pay rent")
                    .completed(true)
                    .description("landlord")
                    .due_date(due)
                    .priority(Priority::High),
            )
            .expect("create");
        assert!(task.completed);
        assert_eq!(task.description.as_deref(), Some("landlord"));
        assert_eq!(task.due_date, Some(due));
        assert_eq!(task.priority, Some(Priority::High));
    }

    #[test]
    fn create_blank_title_is_rejected() {
        let mut store = memory_store();
        let err = store.create(NewTask::new("   ")).expect_err("blank");
        assert!(err.is_validation());
        assert!(store.is_empty());
        assert_eq!(store.persistence().slot().writes(), 0);
    }

    #[test]
    fn id_clash_is_regenerated() {
        let ids = ScriptedIds {
            queued: vec!["dup".to_string(), "dup".to_string()],
            counter: 0,
        };
        let mut store =
            TaskStore::with_id_generator(TaskPersistence::new(MemorySlot::new()), ids);
        let first = store.create(NewTask::new("one")).expect("create");
        let second = store.create(NewTask::new("two")).expect("create");
        assert_eq!(first.id, "dup");
        assert_eq!(second.id, "id-1");
    }

    #[test]
    fn update_merges_and_preserves_identity() {
        let mut store = memory_store();
        let task = store.create(NewTask::new("Draft")).expect("create");
        let updated = store
            .update(
                &task.id,
                TaskPatch::new()
                    .title(" Final ")
                    .priority(Some(Priority::Medium)),
            )
            .expect("valid")
            .expect("found");
        assert_eq!(updated.title, "Final");
        assert_eq!(updated.priority, Some(Priority::Medium));
        assert_eq!(updated.id, task.id);
        assert_eq!(updated.creation_date, task.creation_date);
        assert_eq!(store.get(&task.id), Some(&updated));
    }

    #[test]
    fn update_blank_title_leaves_task_unchanged() {
        let mut store = memory_store();
        let task = store.create(NewTask::new("Keep")).expect("create");
        let writes = store.persistence().slot().writes();
        assert!(store.update(&task.id, TaskPatch::new().title("  ")).is_err());
        assert_eq!(store.get(&task.id), Some(&task));
        assert_eq!(store.persistence().slot().writes(), writes);
    }

    #[test]
    fn missing_id_operations_change_nothing() {
        let mut store = memory_store();
        store.create(NewTask::new("only")).expect("create");
        let before = store.all().to_vec();
        let writes = store.persistence().slot().writes();

        assert_eq!(
            store
                .update("missing", TaskPatch::new().completed(true))
                .expect("valid"),
            None
        );
        assert_eq!(store.toggle("missing"), None);
        assert_eq!(store.delete("missing"), None);

        assert_eq!(store.all(), before.as_slice());
        assert_eq!(store.persistence().slot().writes(), writes);
    }

    #[test]
    fn toggle_twice_restores_status() {
        let mut store = memory_store();
        let task = store.create(NewTask::new("Flip")).expect("create");
        assert!(store.toggle(&task.id).expect("found").completed);
        assert!(!store.toggle(&task.id).expect("found").completed);
    }

    #[test]
    fn delete_returns_removed_task() {
        let mut store = memory_store();
        let a = store.create(NewTask::new("a")).expect("create");
        let b = store.create(NewTask::new("b")).expect("create");
        assert_eq!(store.delete(&a.id), Some(a));
        assert_eq!(store.all(), std::slice::from_ref(&b));
    }

    #[test]
    fn clear_completed_keeps_active_in_order() {
        let mut store = memory_store();
        let a = store.create(NewTask::new("a")).expect("create");
        let b = store.create(NewTask::new("b").completed(true)).expect("create");
        let c = store.create(NewTask::new("c")).expect("create");
        let d = store.create(NewTask::new("d").completed(true)).expect("create");

        assert_eq!(store.clear_completed(), 2);
        let ids: Vec<&str> = store.all().iter().map(|task| task.id.as_str()).collect();
        assert_eq!(ids, vec![a.id.as_str(), c.id.as_str()]);
        assert!(store.get(&b.id).is_none());
        assert!(store.get(&d.id).is_none());
    }

    #[test]
    fn clear_completed_saves_even_when_nothing_removed() {
        let mut store = memory_store();
        store.create(NewTask::new("a")).expect("create");
        let writes = store.persistence().slot().writes();
        assert_eq!(store.clear_completed(), 0);
        assert_eq!(store.persistence().slot().writes(), writes + 1);
    }

    #[test]
    fn reset_empties_and_persists() {
        let mut store = memory_store();
        store.create(NewTask::new("a")).expect("create");
        store.reset();
        assert!(store.is_empty());
        assert!(store.persistence().load().is_empty());
    }

    #[test]
    fn counts_and_selectors_follow_status() {
        let mut store = memory_store();
        store.create(NewTask::new("a")).expect("create");
        store.create(NewTask::new("b").completed(true)).expect("create");
        store.create(NewTask::new("c")).expect("create");

        assert_eq!(
            store.counts(),
            TaskCounts {
                all: 3,
                active: 2,
                completed: 1
            }
        );
        assert_eq!(store.active().len(), 2);
        assert_eq!(store.completed()[0].title, "b");
    }

    #[test]
    fn storage_failure_does_not_block_mutation() {
        let mut slot = MemorySlot::new();
        slot.set_failing(true);
        let mut store = TaskStore::open(TaskPersistence::new(slot));
        let task = store.create(NewTask::new("offline")).expect("create");
        assert!(store.toggle(&task.id).expect("found").completed);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn open_drops_duplicate_ids_and_blank_titles() {
        let mut slot = MemorySlot::new();
        slot.insert(
            crate::storage::DEFAULT_STORAGE_KEY,
            r#"{"state":{"tasks":[
                {"id":"a","title":"one","creationDate":"2024-01-01T00:00:00Z"},
                {"id":"a","title":"two","creationDate":"2024-01-02T00:00:00Z"},
                {"id":"b","title":"   ","creationDate":"2024-01-03T00:00:00Z"},
                {"id":"c","title":"three","creationDate":"2024-01-04T00:00:00Z"}
            ]},"version":0}"#,
        );
        let mut store = TaskStore::open(TaskPersistence::new(slot));
        let titles: Vec<&str> = store.all().iter().map(|task| task.title.as_str()).collect();
        assert_eq!(titles, vec!["one", "three"]);

        assert_eq!(store.delete("a").map(|task| task.title), Some("one".to_string()));
        assert!(store.get("a").is_none());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn open_restores_saved_tasks() {
        let mut store = memory_store();
        let task = store.create(NewTask::new("persisted")).expect("create");
        let slot = store.persistence().slot().clone();
        let reopened = TaskStore::open(TaskPersistence::new(slot));
        assert_eq!(reopened.all(), std::slice::from_ref(&task));
    }
}
