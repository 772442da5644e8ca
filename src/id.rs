//! Task identifier helpers.

use uuid::Uuid;

/// Generate a new task id.
pub fn generate_task_id() -> String {
    Uuid::new_v4().to_string()
}

/// Source of task ids for a store.
pub trait IdGenerator {
    fn generate(&mut self) -> String;
}

/// Random UUID v4 ids.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidGenerator;

impl IdGenerator for UuidGenerator {
    fn generate(&mut self) -> String {
        generate_task_id()
    }
}
