//! The task store: sole owner of mutable planner state.
//!
//! Every read and write of tasks, lookup tables, team members and active
//! filter settings goes through `TaskStore`. Mutations never report failure:
//! an unknown id is a silent no-op. Each effective mutation writes the
//! snapshot (when the store is file-backed) and then notifies subscribers.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use tracing::{debug, error};

use crate::config::WeekStart;
use crate::db::{load_snapshot, save_snapshot, snapshot_path, Database, STORAGE_NAMESPACE};
use crate::fields::{Category, CategoryDraft, CategoryPatch, Priority, Status, COMPLETED, IN_PROGRESS};
use crate::filter::{filter_tasks_at, is_due_this_week, is_due_today, matches_date_filter, sort_tasks, ActiveFilters, FilterCriteria, FiltersPatch};
use crate::id::generate_id;
use crate::seed::sample_tasks;
use crate::stats::{self, DashboardStats};
use crate::task::{MemberDraft, MemberPatch, Task, TaskDraft, TaskPatch, TeamMember};

/// What changed in the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreEvent {
    TaskAdded(String),
    TaskUpdated(String),
    TaskDeleted(String),
    CategoryAdded(String),
    CategoryUpdated(String),
    CategoryDeleted(String),
    MemberAdded(String),
    MemberUpdated(String),
    MemberDeleted(String),
    FiltersChanged,
    /// Sample data was loaded; carries the number of tasks added.
    Seeded(usize),
}

pub type SubscriptionId = u64;

type Listener = Box<dyn FnMut(&StoreEvent)>;

pub struct TaskStore {
    db: Database,
    path: Option<PathBuf>,
    week_start: WeekStart,
    listeners: Vec<(SubscriptionId, Listener)>,
    next_subscription: SubscriptionId,
}

impl TaskStore {
    /// A store that never touches the filesystem.
    pub fn in_memory() -> Self {
        Self::with_database(Database::default())
    }

    pub fn with_database(db: Database) -> Self {
        TaskStore {
            db,
            path: None,
            week_start: WeekStart::default(),
            listeners: Vec::new(),
            next_subscription: 0,
        }
    }

    /// Open the file-backed store in `dir`. A missing or unreadable snapshot
    /// is logged and replaced with a fresh state.
    pub fn open(dir: &Path) -> Self {
        let path = snapshot_path(dir, STORAGE_NAMESPACE);
        let db: Database = load_snapshot(&path);
        debug!(path = %path.display(), tasks = db.tasks.len(), "opened task store");
        TaskStore {
            path: Some(path),
            ..Self::with_database(db)
        }
    }

    pub fn with_week_start(mut self, week_start: WeekStart) -> Self {
        self.week_start = week_start;
        self
    }

    pub fn week_start(&self) -> WeekStart {
        self.week_start
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    // =========================================================================
    // Observers
    // =========================================================================

    pub fn subscribe(&mut self, listener: impl FnMut(&StoreEvent) + 'static) -> SubscriptionId {
        let id = self.next_subscription;
        self.next_subscription += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Returns false when the id was not subscribed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(sid, _)| *sid != id);
        self.listeners.len() != before
    }

    fn commit(&mut self, event: StoreEvent) {
        debug!(?event, "store mutation");
        self.persist();
        for (_, listener) in self.listeners.iter_mut() {
            listener(&event);
        }
    }

    fn persist(&self) {
        let Some(path) = &self.path else {
            return;
        };
        if let Err(e) = save_snapshot(path, &self.db) {
            error!(path = %path.display(), error = %e, "failed to persist task store");
        }
    }

    // =========================================================================
    // State access
    // =========================================================================

    pub fn database(&self) -> &Database {
        &self.db
    }

    pub fn tasks(&self) -> &[Task] {
        &self.db.tasks
    }

    pub fn get_task(&self, id: &str) -> Option<&Task> {
        self.db.get(id)
    }

    pub fn categories(&self) -> &[Category] {
        &self.db.categories
    }

    pub fn priorities(&self) -> &[Priority] {
        &self.db.priorities
    }

    pub fn statuses(&self) -> &[Status] {
        &self.db.statuses
    }

    pub fn team_members(&self) -> &[TeamMember] {
        &self.db.team_members
    }

    pub fn filters(&self) -> &ActiveFilters {
        &self.db.filters
    }

    // =========================================================================
    // Task mutations
    // =========================================================================

    /// Append a new task and return its id. No field validation happens here.
    pub fn add_task(&mut self, draft: TaskDraft) -> String {
        self.add_task_at(draft, Utc::now())
    }

    pub fn add_task_at(&mut self, draft: TaskDraft, now: DateTime<Utc>) -> String {
        let task = Task::from_draft(draft, now);
        let id = task.id.clone();
        self.db.tasks.push(task);
        self.commit(StoreEvent::TaskAdded(id.clone()));
        id
    }

    pub fn update_task(&mut self, id: &str, patch: TaskPatch) {
        self.update_task_at(id, patch, Utc::now())
    }

    /// Merge `patch` onto the task and refresh `updated_at`. The timestamp
    /// never moves backwards.
    pub fn update_task_at(&mut self, id: &str, patch: TaskPatch, now: DateTime<Utc>) {
        let Some(task) = self.db.get_mut(id) else {
            return;
        };
        task.apply(patch);
        task.updated_at = now.max(task.updated_at);
        self.commit(StoreEvent::TaskUpdated(id.to_string()));
    }

    pub fn delete_task(&mut self, id: &str) {
        let before = self.db.tasks.len();
        self.db.tasks.retain(|t| t.id != id);
        if self.db.tasks.len() != before {
            self.commit(StoreEvent::TaskDeleted(id.to_string()));
        }
    }

    pub fn toggle_task_status(&mut self, id: &str) {
        self.toggle_task_status_at(id, Utc::now())
    }

    /// Flip between the "Completed" and "In Progress" status records.
    ///
    /// Completing forces progress to 100; reopening leaves progress as is.
    /// Does nothing if either status is missing from the lookup table.
    pub fn toggle_task_status_at(&mut self, id: &str, now: DateTime<Utc>) {
        let (Some(completed), Some(in_progress)) = (
            self.db.status_named(COMPLETED).cloned(),
            self.db.status_named(IN_PROGRESS).cloned(),
        ) else {
            return;
        };
        let Some(task) = self.db.get_mut(id) else {
            return;
        };
        if task.is_completed() {
            task.status = in_progress;
        } else {
            task.status = completed;
            task.progress = Some(100);
        }
        task.updated_at = now.max(task.updated_at);
        self.commit(StoreEvent::TaskUpdated(id.to_string()));
    }

    // =========================================================================
    // Lookup tables and team
    // =========================================================================

    pub fn add_category(&mut self, draft: CategoryDraft) -> String {
        let id = generate_id();
        self.db.categories.push(Category {
            id: id.clone(),
            name: draft.name,
            color: draft.color,
            icon: draft.icon,
        });
        self.commit(StoreEvent::CategoryAdded(id.clone()));
        id
    }

    /// Tasks keep the copy of the category they were given.
    pub fn update_category(&mut self, id: &str, patch: CategoryPatch) {
        let Some(cat) = self.db.categories.iter_mut().find(|c| c.id == id) else {
            return;
        };
        if let Some(v) = patch.name {
            cat.name = v;
        }
        if let Some(v) = patch.color {
            cat.color = v;
        }
        if let Some(v) = patch.icon {
            cat.icon = v;
        }
        self.commit(StoreEvent::CategoryUpdated(id.to_string()));
    }

    pub fn delete_category(&mut self, id: &str) {
        let before = self.db.categories.len();
        self.db.categories.retain(|c| c.id != id);
        if self.db.categories.len() != before {
            self.commit(StoreEvent::CategoryDeleted(id.to_string()));
        }
    }

    pub fn add_team_member(&mut self, draft: MemberDraft) -> String {
        self.add_team_member_at(draft, Utc::now())
    }

    pub fn add_team_member_at(&mut self, draft: MemberDraft, now: DateTime<Utc>) -> String {
        let member = TeamMember::from_draft(draft, now);
        let id = member.id.clone();
        self.db.team_members.push(member);
        self.commit(StoreEvent::MemberAdded(id.clone()));
        id
    }

    pub fn update_team_member(&mut self, id: &str, patch: MemberPatch) {
        let Some(member) = self.db.team_members.iter_mut().find(|m| m.id == id) else {
            return;
        };
        member.apply(patch);
        self.commit(StoreEvent::MemberUpdated(id.to_string()));
    }

    /// Tasks assigned to the member keep the now-dangling id.
    pub fn delete_team_member(&mut self, id: &str) {
        let before = self.db.team_members.len();
        self.db.team_members.retain(|m| m.id != id);
        if self.db.team_members.len() != before {
            self.commit(StoreEvent::MemberDeleted(id.to_string()));
        }
    }

    pub fn set_filters(&mut self, patch: FiltersPatch) {
        self.db.filters.apply(patch);
        self.commit(StoreEvent::FiltersChanged);
    }

    /// Seed the sample task set when there are no tasks yet.
    pub fn initialize_data(&mut self) {
        self.initialize_data_at(Utc::now())
    }

    pub fn initialize_data_at(&mut self, now: DateTime<Utc>) {
        if !self.db.tasks.is_empty() {
            return;
        }
        self.db.tasks = sample_tasks(now)
            .into_iter()
            .map(|draft| Task::from_draft(draft, now))
            .collect();
        let n = self.db.tasks.len();
        self.commit(StoreEvent::Seeded(n));
    }

    // =========================================================================
    // Derived views
    // =========================================================================

    pub fn tasks_by_category(&self, category_id: &str) -> Vec<&Task> {
        self.db.tasks.iter().filter(|t| t.category.id == category_id).collect()
    }

    pub fn tasks_by_status(&self, status_id: &str) -> Vec<&Task> {
        self.db.tasks.iter().filter(|t| t.status.id == status_id).collect()
    }

    /// Tasks assigned to a team member id (exact match).
    pub fn tasks_for_member(&self, member_id: &str) -> Vec<&Task> {
        self.db
            .tasks
            .iter()
            .filter(|t| t.assignee.as_deref() == Some(member_id))
            .collect()
    }

    pub fn overdue_tasks(&self) -> Vec<&Task> {
        self.overdue_tasks_at(Utc::now())
    }

    pub fn overdue_tasks_at(&self, now: DateTime<Utc>) -> Vec<&Task> {
        self.db.tasks.iter().filter(|t| t.is_overdue_at(now)).collect()
    }

    pub fn today_tasks(&self) -> Vec<&Task> {
        self.today_tasks_at(Utc::now())
    }

    pub fn today_tasks_at(&self, now: DateTime<Utc>) -> Vec<&Task> {
        self.db.tasks.iter().filter(|t| is_due_today(t, now)).collect()
    }

    pub fn this_week_tasks(&self) -> Vec<&Task> {
        self.this_week_tasks_at(Utc::now())
    }

    pub fn this_week_tasks_at(&self, now: DateTime<Utc>) -> Vec<&Task> {
        self.db
            .tasks
            .iter()
            .filter(|t| is_due_this_week(t, now, self.week_start))
            .collect()
    }

    pub fn dashboard_stats(&self) -> DashboardStats {
        self.dashboard_stats_at(Utc::now())
    }

    pub fn dashboard_stats_at(&self, now: DateTime<Utc>) -> DashboardStats {
        stats::compute(&self.db, now, self.week_start)
    }

    /// Filter then sort, per `criteria`.
    pub fn query(&self, search: &str, criteria: &FilterCriteria) -> Vec<&Task> {
        self.query_at(search, criteria, Utc::now())
    }

    pub fn query_at(&self, search: &str, criteria: &FilterCriteria, now: DateTime<Utc>) -> Vec<&Task> {
        let filtered = filter_tasks_at(&self.db.tasks, search, criteria, now);
        sort_tasks(filtered, criteria.sort_by, criteria.sort_order)
    }

    /// Tasks passing the stored active filter settings, in collection order.
    pub fn active_tasks(&self) -> Vec<&Task> {
        self.active_tasks_at(Utc::now())
    }

    pub fn active_tasks_at(&self, now: DateTime<Utc>) -> Vec<&Task> {
        let active = &self.db.filters;
        filter_tasks_at(&self.db.tasks, &active.search_query, &active.to_criteria(), now)
            .into_iter()
            .filter(|t| matches_date_filter(t, active.date_filter, now, self.week_start))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::{default_categories, default_priorities, DateFilter};
    use chrono::{Duration, Local, TimeZone};
    use std::cell::RefCell;
    use std::rc::Rc;

    fn now() -> DateTime<Utc> {
        Local
            .with_ymd_and_hms(2024, 6, 12, 12, 0, 0)
            .unwrap()
            .with_timezone(&Utc)
    }

    fn status(store: &TaskStore, name: &str) -> Status {
        store.database().status_named(name).cloned().unwrap()
    }

    fn draft(store: &TaskStore, title: &str, status_name: &str, due: DateTime<Utc>) -> TaskDraft {
        TaskDraft::new(
            title,
            default_categories()[0].clone(),
            default_priorities()[2].clone(),
            status(store, status_name),
            due,
        )
    }

    fn ids(tasks: &[&Task]) -> Vec<String> {
        tasks.iter().map(|t| t.id.clone()).collect()
    }

    #[test]
    fn test_add_task_assigns_id_and_timestamps() {
        let mut store = TaskStore::in_memory();
        let d = draft(&store, "Write", "Not Started", now());
        let id = store.add_task_at(d, now());
        let t = store.get_task(&id).unwrap();
        assert_eq!(t.created_at, now());
        assert_eq!(t.updated_at, now());
        assert_eq!(store.tasks().len(), 1);
    }

    #[test]
    fn test_update_task_merges_and_refreshes() {
        let mut store = TaskStore::in_memory();
        let d = draft(&store, "Write", "Not Started", now());
        let id = store.add_task_at(d, now());
        let before = store.get_task(&id).unwrap().clone();

        let later = now() + Duration::minutes(5);
        store.update_task_at(
            &id,
            TaskPatch {
                title: Some("Rewrite".into()),
                tags: Some(vec!["draft".into()]),
                ..Default::default()
            },
            later,
        );
        let after = store.get_task(&id).unwrap();
        assert_eq!(after.title, "Rewrite");
        assert_eq!(after.tags, vec!["draft"]);
        assert_eq!(after.updated_at, later);
        assert_eq!(after.created_at, before.created_at);
        assert_eq!(after.description, before.description);
        assert_eq!(after.status, before.status);
    }

    #[test]
    fn test_updated_at_never_regresses() {
        let mut store = TaskStore::in_memory();
        let d = draft(&store, "Write", "Not Started", now());
        let id = store.add_task_at(d, now());
        store.update_task_at(&id, TaskPatch::default(), now() - Duration::hours(1));
        assert_eq!(store.get_task(&id).unwrap().updated_at, now());
    }

    #[test]
    fn test_update_unknown_id_is_noop() {
        let mut store = TaskStore::in_memory();
        let d = draft(&store, "Write", "Not Started", now());
        store.add_task_at(d, now());
        let snapshot = store.tasks().to_vec();
        store.update_task("missing", TaskPatch {
            title: Some("x".into()),
            ..Default::default()
        });
        assert_eq!(store.tasks(), snapshot.as_slice());
    }

    #[test]
    fn test_delete_task_is_idempotent() {
        let mut store = TaskStore::in_memory();
        let d1 = draft(&store, "A", "Not Started", now() - Duration::days(1));
        let d2 = draft(&store, "B", "Not Started", now());
        let a = store.add_task_at(d1, now());
        store.add_task_at(d2, now());

        store.delete_task(&a);
        assert!(store.get_task(&a).is_none());
        assert!(!ids(&store.overdue_tasks_at(now())).contains(&a));
        assert!(!ids(&store.tasks_by_category("1")).contains(&a));

        let remaining = store.tasks().to_vec();
        store.delete_task(&a);
        store.delete_task("never-existed");
        assert_eq!(store.tasks(), remaining.as_slice());
    }

    #[test]
    fn test_toggle_is_asymmetric_on_progress() {
        let mut store = TaskStore::in_memory();
        let mut d = draft(&store, "A", "In Progress", now());
        d.progress = Some(40);
        let id = store.add_task_at(d, now());
        let original_status = store.get_task(&id).unwrap().status.clone();

        store.toggle_task_status_at(&id, now());
        let t = store.get_task(&id).unwrap();
        assert_eq!(t.status.name, "Completed");
        assert_eq!(t.progress, Some(100));

        store.toggle_task_status_at(&id, now());
        let t = store.get_task(&id).unwrap();
        assert_eq!(t.status, original_status);
        assert_eq!(t.progress, Some(100));
    }

    #[test]
    fn test_toggle_from_other_status_completes() {
        let mut store = TaskStore::in_memory();
        let d = draft(&store, "A", "Review", now());
        let id = store.add_task_at(d, now());
        store.toggle_task_status_at(&id, now());
        assert!(store.get_task(&id).unwrap().is_completed());
        store.toggle_task_status_at(&id, now());
        assert_eq!(store.get_task(&id).unwrap().status.name, "In Progress");
    }

    #[test]
    fn test_toggle_without_lookup_statuses_is_noop() {
        let mut store = TaskStore::in_memory();
        let d = draft(&store, "A", "Not Started", now());
        let id = store.add_task_at(d, now());
        let mut db = store.database().clone();
        db.statuses.retain(|s| s.name != "In Progress");
        let mut store = TaskStore::with_database(db);
        let before = store.get_task(&id).unwrap().clone();
        store.toggle_task_status_at(&id, now() + Duration::hours(1));
        assert_eq!(store.get_task(&id).unwrap(), &before);
    }

    #[test]
    fn test_overdue_and_today_scenario() {
        let mut store = TaskStore::in_memory();
        let d1 = draft(&store, "Yesterday", "In Progress", now() - Duration::days(1));
        let d2 = draft(&store, "Today", "Not Started", now() + Duration::hours(1));
        let yesterday = store.add_task_at(d1, now());
        let today = store.add_task_at(d2, now());

        assert_eq!(ids(&store.overdue_tasks_at(now())), vec![yesterday]);
        assert_eq!(ids(&store.today_tasks_at(now())), vec![today]);
    }

    #[test]
    fn test_this_week_uses_configured_start() {
        // 2024-06-12 is a Wednesday.
        let mut store = TaskStore::in_memory();
        let d = draft(&store, "Sunday", "Not Started", now() - Duration::days(3));
        store.add_task_at(d, now());
        assert_eq!(store.this_week_tasks_at(now()).len(), 1);

        let store = TaskStore::with_database(store.database().clone()).with_week_start(WeekStart::Monday);
        assert!(store.this_week_tasks_at(now()).is_empty());
    }

    #[test]
    fn test_initialize_data_is_idempotent() {
        let mut store = TaskStore::in_memory();
        store.initialize_data_at(now());
        assert_eq!(store.tasks().len(), 5);
        let first = store.tasks().to_vec();
        store.initialize_data_at(now());
        assert_eq!(store.tasks(), first.as_slice());
    }

    #[test]
    fn test_average_completion_time_scenario() {
        let mut store = TaskStore::in_memory();
        let mut d = draft(&store, "Done", "Completed", now());
        d.estimated_time = Some(60);
        store.add_task_at(d, now());
        let d = draft(&store, "Open", "Not Started", now());
        store.add_task_at(d, now());
        let stats = store.dashboard_stats_at(now());
        assert_eq!(stats.average_completion_time, 60.0);
        assert_eq!(stats.total_tasks, store.tasks().len());
    }

    #[test]
    fn test_category_rename_does_not_touch_tasks() {
        let mut store = TaskStore::in_memory();
        let d = draft(&store, "A", "Not Started", now());
        let id = store.add_task_at(d, now());
        store.update_category("1", CategoryPatch {
            name: Some("Job".into()),
            ..Default::default()
        });
        assert_eq!(store.categories()[0].name, "Job");
        assert_eq!(store.get_task(&id).unwrap().category.name, "Work");

        store.delete_category("1");
        assert_eq!(store.categories().len(), 4);
        assert_eq!(store.tasks_by_category("1").len(), 1);
    }

    #[test]
    fn test_add_category() {
        let mut store = TaskStore::in_memory();
        let id = store.add_category(CategoryDraft {
            name: "Errands".into(),
            color: "#000000".into(),
            icon: "cart".into(),
        });
        assert_eq!(store.categories().last().unwrap().id, id);
        assert_eq!(store.dashboard_stats_at(now()).category_breakdown["Errands"], 0);
    }

    #[test]
    fn test_member_delete_leaves_assignee() {
        let mut store = TaskStore::in_memory();
        let member = store.add_team_member_at(
            MemberDraft {
                name: "Dana".into(),
                role: "Ops".into(),
                ..Default::default()
            },
            now(),
        );
        let mut d = draft(&store, "A", "Not Started", now());
        d.assignee = Some(member.clone());
        let id = store.add_task_at(d, now());
        assert_eq!(store.tasks_for_member(&member).len(), 1);

        store.update_team_member(&member, MemberPatch {
            role: Some("SRE".into()),
            ..Default::default()
        });
        assert_eq!(store.database().member(&member).unwrap().role, "SRE");

        store.delete_team_member(&member);
        assert!(store.database().member(&member).is_none());
        assert_eq!(store.get_task(&id).unwrap().assignee.as_deref(), Some(member.as_str()));
    }

    #[test]
    fn test_tasks_by_status() {
        let mut store = TaskStore::in_memory();
        let d = draft(&store, "A", "Review", now());
        store.add_task_at(d, now());
        let d = draft(&store, "B", "Not Started", now());
        store.add_task_at(d, now());
        assert_eq!(store.tasks_by_status("3").len(), 1);
        assert_eq!(store.tasks_by_status("3")[0].title, "A");
    }

    #[test]
    fn test_active_filters() {
        let mut store = TaskStore::in_memory();
        let d = draft(&store, "Report", "In Progress", now() - Duration::days(1));
        store.add_task_at(d, now());
        let d = draft(&store, "Report draft", "Not Started", now() + Duration::days(10));
        store.add_task_at(d, now());
        let d = draft(&store, "Other", "In Progress", now() + Duration::days(10));
        store.add_task_at(d, now());

        assert_eq!(store.active_tasks_at(now()).len(), 3);
        store.set_filters(FiltersPatch {
            search_query: Some("report".into()),
            ..Default::default()
        });
        assert_eq!(store.active_tasks_at(now()).len(), 2);
        store.set_filters(FiltersPatch {
            date_filter: Some(DateFilter::Overdue),
            ..Default::default()
        });
        let out = store.active_tasks_at(now());
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].title, "Report");
    }

    #[test]
    fn test_query_filters_then_sorts() {
        let mut store = TaskStore::in_memory();
        for (title, days) in [("c", 3), ("a", 1), ("b", 2)] {
            let d = draft(&store, title, "Not Started", now() + Duration::days(days));
            store.add_task_at(d, now());
        }
        let criteria = FilterCriteria::new()
            .sorted_by(crate::fields::SortKey::DueDate, crate::fields::SortOrder::Desc);
        let titles: Vec<_> = store.query_at("", &criteria, now()).iter().map(|t| t.title.clone()).collect();
        assert_eq!(titles, vec!["c", "b", "a"]);
    }

    #[test]
    fn test_subscribers_see_effective_mutations_only() {
        let mut store = TaskStore::in_memory();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let sub = store.subscribe(move |e| sink.borrow_mut().push(e.clone()));

        let d = draft(&store, "A", "Not Started", now());
        let id = store.add_task_at(d, now());
        store.delete_task("missing");
        store.toggle_task_status_at(&id, now());
        store.delete_task(&id);

        assert_eq!(
            *seen.borrow(),
            vec![
                StoreEvent::TaskAdded(id.clone()),
                StoreEvent::TaskUpdated(id.clone()),
                StoreEvent::TaskDeleted(id.clone()),
            ]
        );

        assert!(store.unsubscribe(sub));
        assert!(!store.unsubscribe(sub));
        store.initialize_data_at(now());
        assert_eq!(seen.borrow().len(), 3);
    }
}
