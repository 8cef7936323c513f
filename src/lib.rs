//! # Planner
//!
//! A local-first task planner: task CRUD with categories, priorities and
//! statuses, team member assignment, agenda and calendar views, and derived
//! dashboard analytics. All state lives in memory and is written to JSON
//! snapshots in a data directory after every change.
//!
//! ## Layout
//!
//! - `store`: [`TaskStore`], the single owner of mutable state, with change
//!   notifications for views
//! - `filter`: search/filter/sort pipeline
//! - `stats`: dashboard statistics
//! - `views`: agenda buckets, month calendar grid, team workload
//! - `db`: persisted state, versioned snapshots, date and text helpers
//! - `fields` / `task`: the data model
//! - `config`, `error`, `id`, `seed`, `prefs`: supporting pieces
//!
//! ```no_run
//! use task_planner::{FilterCriteria, TaskStore};
//!
//! let mut store = TaskStore::in_memory();
//! store.initialize_data();
//! let overdue = store.overdue_tasks();
//! let listed = store.query("report", &FilterCriteria::new());
//! println!("{} overdue, {} matching", overdue.len(), listed.len());
//! ```

pub mod config;
pub mod db;
pub mod error;
pub mod fields;
pub mod filter;
pub mod id;
pub mod prefs;
pub mod seed;
pub mod stats;
pub mod store;
pub mod task;
pub mod views;

pub use error::{Error, Result};
pub use filter::{filter_tasks, sort_tasks, FilterCriteria};
pub use stats::DashboardStats;
pub use store::{StoreEvent, TaskStore};
