//! Lookup records and enumerations used to categorise and order tasks.
//!
//! Categories, priorities and statuses are small user-editable tables. A task
//! embeds a full copy of the record it was assigned, so later edits to the
//! table do not rewrite existing tasks.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Status name that marks a task as done.
pub const COMPLETED: &str = "Completed";

/// Status name a completed task falls back to when toggled.
pub const IN_PROGRESS: &str = "In Progress";

/// A user-defined task category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub name: String,
    pub color: String,
    pub icon: String,
}

/// Priority classification; `level` runs 1 (lowest) to 5 (highest).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Priority {
    pub id: String,
    pub name: String,
    pub color: String,
    pub level: u8,
}

/// Workflow status record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Status {
    pub id: String,
    pub name: String,
    pub color: String,
}

impl Status {
    pub fn is_completed(&self) -> bool {
        self.name == COMPLETED
    }
}

/// Fields for creating a category; the store assigns the id.
#[derive(Debug, Clone, Default)]
pub struct CategoryDraft {
    pub name: String,
    pub color: String,
    pub icon: String,
}

/// Partial update for a category.
#[derive(Debug, Clone, Default)]
pub struct CategoryPatch {
    pub name: Option<String>,
    pub color: Option<String>,
    pub icon: Option<String>,
}

/// Available sorting options for task lists.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "camelCase")]
pub enum SortKey {
    #[default]
    DueDate,
    CreatedAt,
    Priority,
    Title,
    Progress,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

/// Date-based quick filter held in the store's active filter settings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum DateFilter {
    #[default]
    Any,
    Today,
    ThisWeek,
    Overdue,
}

fn category(id: &str, name: &str, color: &str, icon: &str) -> Category {
    Category {
        id: id.into(),
        name: name.into(),
        color: color.into(),
        icon: icon.into(),
    }
}

fn priority(id: &str, name: &str, color: &str, level: u8) -> Priority {
    Priority {
        id: id.into(),
        name: name.into(),
        color: color.into(),
        level,
    }
}

fn status(id: &str, name: &str, color: &str) -> Status {
    Status {
        id: id.into(),
        name: name.into(),
        color: color.into(),
    }
}

/// Built-in category table for a fresh store.
pub fn default_categories() -> Vec<Category> {
    vec![
        category("1", "Work", "#3B82F6", "briefcase"),
        category("2", "Personal", "#8B5CF6", "user"),
        category("3", "Health", "#10B981", "heart"),
        category("4", "Learning", "#F59E0B", "book"),
        category("5", "Finance", "#EF4444", "dollar-sign"),
    ]
}

/// Built-in priority table for a fresh store.
pub fn default_priorities() -> Vec<Priority> {
    vec![
        priority("1", "Very Low", "#6B7280", 1),
        priority("2", "Low", "#10B981", 2),
        priority("3", "Medium", "#F59E0B", 3),
        priority("4", "High", "#EF4444", 4),
        priority("5", "Critical", "#DC2626", 5),
    ]
}

/// Built-in status table for a fresh store.
pub fn default_statuses() -> Vec<Status> {
    vec![
        status("1", "Not Started", "#6B7280"),
        status("2", IN_PROGRESS, "#3B82F6"),
        status("3", "Review", "#F59E0B"),
        status("4", COMPLETED, "#10B981"),
        status("5", "Cancelled", "#EF4444"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_tables_have_unique_ids() {
        let ids: Vec<_> = default_categories().into_iter().map(|c| c.id).collect();
        let mut dedup = ids.clone();
        dedup.dedup();
        assert_eq!(ids, dedup);
        assert_eq!(default_priorities().len(), 5);
    }

    #[test]
    fn test_toggle_statuses_present_by_default() {
        let statuses = default_statuses();
        assert!(statuses.iter().any(|s| s.name == COMPLETED));
        assert!(statuses.iter().any(|s| s.name == IN_PROGRESS));
        assert!(statuses.iter().find(|s| s.id == "4").unwrap().is_completed());
    }

    #[test]
    fn test_priority_levels_ascend() {
        let levels: Vec<u8> = default_priorities().iter().map(|p| p.level).collect();
        assert_eq!(levels, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_sort_key_serialises_camel_case() {
        assert_eq!(serde_json::to_string(&SortKey::DueDate).unwrap(), "\"dueDate\"");
        assert_eq!(serde_json::to_string(&DateFilter::ThisWeek).unwrap(), "\"this-week\"");
    }
}
