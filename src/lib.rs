//! taskdeck - task store library
//!
//! Keeps a list of task records consistent across editing, filtering,
//! sorting and persistence for a single-user view layer.
//!
//! # Core Concepts
//!
//! - **Tasks**: records with a stable id, a non-empty title and a tri-state
//!   priority (high, medium, low or none)
//! - **Store**: the only owner of the collection; writes every change
//!   through to storage
//! - **Persistence**: one JSON record under a fixed key; failures are logged,
//!   never raised
//! - **View pipeline**: pure filter + sort over the collection
//! - **View state**: session-only filter, sort and edit target
//!
//! # Module Organization
//!
//! - `board`: store and view state wired together
//! - `config`: Configuration loading from `taskdeck.toml`
//! - `error`: Error types and result aliases
//! - `id`: Task id generation
//! - `logging`: Tracing subscriber setup
//! - `storage`: Key-value slots and the persisted record
//! - `store`: The task store and its selectors
//! - `task`: Task records, creation params and patches
//! - `view`: Status filter and sort pipeline
//! - `view_state`: Filter, sort and edit selection

pub mod board;
pub mod config;
pub mod error;
pub mod id;
pub mod logging;
pub mod storage;
pub mod store;
pub mod task;
pub mod view;
pub mod view_state;

pub use error::{Error, Result};
