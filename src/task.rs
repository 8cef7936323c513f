//! Task, subtask and team member records.
//!
//! This module defines the `Task` struct together with the draft and patch
//! types the store uses for creation and partial updates.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::fields::{Category, Priority, Status};
use crate::id::generate_id;

/// A unit of work with scheduling, categorisation and assignment metadata.
///
/// `category`, `priority` and `status` are copies of the lookup records taken
/// at assignment time. `assignee` is a loose team member id that is never
/// checked against the team table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub category: Category,
    pub priority: Priority,
    pub status: Status,
    pub due_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Minutes.
    #[serde(default, deserialize_with = "lenient_minutes", skip_serializing_if = "Option::is_none")]
    pub estimated_time: Option<u32>,
    /// Minutes.
    #[serde(default, deserialize_with = "lenient_minutes", skip_serializing_if = "Option::is_none")]
    pub actual_time: Option<u32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub subtasks: Vec<SubTask>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee: Option<String>,
    /// Percentage, 0..=100.
    #[serde(default, deserialize_with = "lenient_progress", skip_serializing_if = "Option::is_none")]
    pub progress: Option<u8>,
}

/// Stored numbers may be fractional or out of range; round and clamp them
/// instead of rejecting the whole snapshot.
fn lenient_number<'de, D: Deserializer<'de>>(deserializer: D, max: f64) -> Result<Option<f64>, D::Error> {
    let raw = Option::<f64>::deserialize(deserializer)?;
    Ok(raw.filter(|v| v.is_finite()).map(|v| v.round().clamp(0.0, max)))
}

fn lenient_minutes<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u32>, D::Error> {
    Ok(lenient_number(deserializer, u32::MAX as f64)?.map(|v| v as u32))
}

fn lenient_progress<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u8>, D::Error> {
    Ok(lenient_number(deserializer, 100.0)?.map(|v| v as u8))
}

impl Task {
    /// Build a task from a draft, stamping a fresh id and `created_at == updated_at == now`.
    pub fn from_draft(draft: TaskDraft, now: DateTime<Utc>) -> Self {
        Task {
            id: generate_id(),
            title: draft.title,
            description: draft.description,
            category: draft.category,
            priority: draft.priority,
            status: draft.status,
            due_date: draft.due_date,
            created_at: now,
            updated_at: now,
            tags: draft.tags,
            estimated_time: draft.estimated_time,
            actual_time: draft.actual_time,
            attachments: draft.attachments,
            subtasks: draft.subtasks,
            assignee: draft.assignee,
            progress: draft.progress.map(clamp_progress),
        }
    }

    /// Merge `patch` onto this task. Fields absent from the patch are left alone.
    pub fn apply(&mut self, patch: TaskPatch) {
        if let Some(v) = patch.title {
            self.title = v;
        }
        if let Some(v) = patch.description {
            self.description = v;
        }
        if let Some(v) = patch.category {
            self.category = v;
        }
        if let Some(v) = patch.priority {
            self.priority = v;
        }
        if let Some(v) = patch.status {
            self.status = v;
        }
        if let Some(v) = patch.due_date {
            self.due_date = v;
        }
        if let Some(v) = patch.tags {
            self.tags = v;
        }
        if let Some(v) = patch.estimated_time {
            self.estimated_time = v;
        }
        if let Some(v) = patch.actual_time {
            self.actual_time = v;
        }
        if let Some(v) = patch.attachments {
            self.attachments = v;
        }
        if let Some(v) = patch.subtasks {
            self.subtasks = v;
        }
        if let Some(v) = patch.assignee {
            self.assignee = v;
        }
        if let Some(v) = patch.progress {
            self.progress = v.map(clamp_progress);
        }
    }

    pub fn is_completed(&self) -> bool {
        self.status.is_completed()
    }

    /// Due strictly before `now` and not completed.
    pub fn is_overdue_at(&self, now: DateTime<Utc>) -> bool {
        self.due_date < now && !self.is_completed()
    }

    pub fn has_subtasks(&self) -> bool {
        !self.subtasks.is_empty()
    }
}

/// Out-of-range progress is coerced rather than rejected.
fn clamp_progress(p: u8) -> u8 {
    p.min(100)
}

/// A checklist item owned by its parent task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubTask {
    pub id: String,
    pub title: String,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
}

impl SubTask {
    pub fn new(title: impl Into<String>, completed: bool, now: DateTime<Utc>) -> Self {
        SubTask {
            id: generate_id(),
            title: title.into(),
            completed,
            created_at: now,
        }
    }
}

/// Everything needed to create a task except the id and timestamps.
#[derive(Debug, Clone)]
pub struct TaskDraft {
    pub title: String,
    pub description: String,
    pub category: Category,
    pub priority: Priority,
    pub status: Status,
    pub due_date: DateTime<Utc>,
    pub tags: Vec<String>,
    pub estimated_time: Option<u32>,
    pub actual_time: Option<u32>,
    pub attachments: Vec<String>,
    pub subtasks: Vec<SubTask>,
    pub assignee: Option<String>,
    pub progress: Option<u8>,
}

impl TaskDraft {
    pub fn new(
        title: impl Into<String>,
        category: Category,
        priority: Priority,
        status: Status,
        due_date: DateTime<Utc>,
    ) -> Self {
        TaskDraft {
            title: title.into(),
            description: String::new(),
            category,
            priority,
            status,
            due_date,
            tags: Vec::new(),
            estimated_time: None,
            actual_time: None,
            attachments: Vec::new(),
            subtasks: Vec::new(),
            assignee: None,
            progress: None,
        }
    }
}

/// Partial update for a task.
///
/// The outer `Option` says whether the field is being set; for optional task
/// fields the inner `Option` allows clearing the value.
#[derive(Debug, Clone, Default)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<Category>,
    pub priority: Option<Priority>,
    pub status: Option<Status>,
    pub due_date: Option<DateTime<Utc>>,
    pub tags: Option<Vec<String>>,
    pub estimated_time: Option<Option<u32>>,
    pub actual_time: Option<Option<u32>>,
    pub attachments: Option<Vec<String>>,
    pub subtasks: Option<Vec<SubTask>>,
    pub assignee: Option<Option<String>>,
    pub progress: Option<Option<u8>>,
}

impl TaskPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.category.is_none()
            && self.priority.is_none()
            && self.status.is_none()
            && self.due_date.is_none()
            && self.tags.is_none()
            && self.estimated_time.is_none()
            && self.actual_time.is_none()
            && self.attachments.is_none()
            && self.subtasks.is_none()
            && self.assignee.is_none()
            && self.progress.is_none()
    }
}

/// A person tasks can be assigned to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamMember {
    pub id: String,
    pub name: String,
    pub role: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    pub joined_date: DateTime<Utc>,
}

impl TeamMember {
    pub fn from_draft(draft: MemberDraft, now: DateTime<Utc>) -> Self {
        TeamMember {
            id: generate_id(),
            name: draft.name,
            role: draft.role,
            email: draft.email,
            phone: draft.phone,
            department: draft.department,
            avatar: draft.avatar,
            joined_date: now,
        }
    }

    pub fn apply(&mut self, patch: MemberPatch) {
        if let Some(v) = patch.name {
            self.name = v;
        }
        if let Some(v) = patch.role {
            self.role = v;
        }
        if let Some(v) = patch.email {
            self.email = v;
        }
        if let Some(v) = patch.phone {
            self.phone = v;
        }
        if let Some(v) = patch.department {
            self.department = v;
        }
        if let Some(v) = patch.avatar {
            self.avatar = v;
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemberDraft {
    pub name: String,
    pub role: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub department: Option<String>,
    pub avatar: Option<String>,
}

/// Partial update for a team member. Id and join date are immutable.
#[derive(Debug, Clone, Default)]
pub struct MemberPatch {
    pub name: Option<String>,
    pub role: Option<String>,
    pub email: Option<Option<String>>,
    pub phone: Option<Option<String>>,
    pub department: Option<Option<String>>,
    pub avatar: Option<Option<String>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::{default_categories, default_priorities, default_statuses};
    use chrono::TimeZone;

    fn draft() -> TaskDraft {
        TaskDraft::new(
            "Write report",
            default_categories()[0].clone(),
            default_priorities()[3].clone(),
            default_statuses()[0].clone(),
            Utc.with_ymd_and_hms(2024, 6, 20, 12, 0, 0).unwrap(),
        )
    }

    #[test]
    fn test_from_draft_stamps_timestamps() {
        let now = Utc.with_ymd_and_hms(2024, 6, 10, 9, 0, 0).unwrap();
        let t = Task::from_draft(draft(), now);
        assert_eq!(t.created_at, now);
        assert_eq!(t.updated_at, now);
        assert!(!t.id.is_empty());
    }

    #[test]
    fn test_progress_is_clamped() {
        let mut d = draft();
        d.progress = Some(250);
        let mut t = Task::from_draft(d, Utc::now());
        assert_eq!(t.progress, Some(100));

        t.apply(TaskPatch {
            progress: Some(Some(180)),
            ..Default::default()
        });
        assert_eq!(t.progress, Some(100));
    }

    #[test]
    fn test_apply_leaves_unpatched_fields() {
        let mut t = Task::from_draft(draft(), Utc::now());
        t.estimated_time = Some(30);
        let before = t.clone();
        t.apply(TaskPatch {
            title: Some("Renamed".into()),
            actual_time: Some(Some(45)),
            ..Default::default()
        });
        assert_eq!(t.title, "Renamed");
        assert_eq!(t.actual_time, Some(45));
        assert_eq!(t.estimated_time, before.estimated_time);
        assert_eq!(t.category, before.category);
        assert_eq!(t.due_date, before.due_date);
    }

    #[test]
    fn test_apply_can_clear_optional_fields() {
        let mut d = draft();
        d.assignee = Some("m1".into());
        let mut t = Task::from_draft(d, Utc::now());
        t.apply(TaskPatch {
            assignee: Some(None),
            ..Default::default()
        });
        assert_eq!(t.assignee, None);
    }

    #[test]
    fn test_overdue_ignores_completed() {
        let now = Utc.with_ymd_and_hms(2024, 6, 25, 0, 0, 0).unwrap();
        let mut t = Task::from_draft(draft(), now);
        assert!(t.is_overdue_at(now));
        t.status = default_statuses()[3].clone();
        assert!(!t.is_overdue_at(now));
    }

    #[test]
    fn test_serialises_camel_case() {
        let t = Task::from_draft(draft(), Utc::now());
        let json = serde_json::to_value(&t).unwrap();
        assert!(json.get("dueDate").is_some());
        assert!(json.get("createdAt").is_some());
        assert!(json.get("subtasks").is_none());
    }

    #[test]
    fn test_loads_fractional_and_out_of_range_numbers() {
        let mut json = serde_json::to_value(Task::from_draft(draft(), Utc::now())).unwrap();
        json["estimatedTime"] = serde_json::json!(12.5);
        json["actualTime"] = serde_json::json!(-4);
        json["progress"] = serde_json::json!(300);
        let t: Task = serde_json::from_value(json).unwrap();
        assert_eq!(t.estimated_time, Some(13));
        assert_eq!(t.actual_time, Some(0));
        assert_eq!(t.progress, Some(100));
    }

    #[test]
    fn test_member_patch() {
        let mut m = TeamMember::from_draft(
            MemberDraft {
                name: "Ana".into(),
                role: "Dev".into(),
                email: Some("ana@example.com".into()),
                ..Default::default()
            },
            Utc::now(),
        );
        let joined = m.joined_date;
        m.apply(MemberPatch {
            role: Some("Lead".into()),
            email: Some(None),
            ..Default::default()
        });
        assert_eq!(m.role, "Lead");
        assert_eq!(m.email, None);
        assert_eq!(m.joined_date, joined);
    }
}
