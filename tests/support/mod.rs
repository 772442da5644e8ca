use std::fs;
use std::path::PathBuf;

use taskdeck::storage::{FileSlot, TaskPersistence, DEFAULT_STORAGE_KEY};
use taskdeck::store::TaskStore;
use tempfile::TempDir;

/// A temporary directory holding one file-backed task slot.
pub struct TestDir {
    dir: TempDir,
}

impl TestDir {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().expect("failed to create tempdir"),
        }
    }

    pub fn slot_dir(&self) -> PathBuf {
        self.dir.path().join("data")
    }

    pub fn persistence(&self) -> TaskPersistence<FileSlot> {
        TaskPersistence::new(FileSlot::new(self.slot_dir()))
    }

    pub fn open_store(&self) -> TaskStore<FileSlot> {
        TaskStore::open(self.persistence())
    }

    pub fn slot_file(&self) -> PathBuf {
        FileSlot::new(self.slot_dir()).path_for(DEFAULT_STORAGE_KEY)
    }

    pub fn read_slot(&self) -> Option<String> {
        fs::read_to_string(self.slot_file()).ok()
    }

    pub fn write_slot(&self, contents: &str) {
        fs::create_dir_all(self.slot_dir()).expect("create slot dir");
        fs::write(self.slot_file(), contents).expect("write slot");
    }
}
