//! Search, filter and sort pipeline over task collections.
//!
//! Every criterion is conjunctive and an empty/unset criterion places no
//! restriction. Time-dependent predicates take the instant explicitly so a
//! query always reflects "now" at the moment it runs.

use std::cmp::Ordering;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

use crate::config::WeekStart;
use crate::db::{local_date, local_start_of_day, start_of_week};
use crate::fields::{DateFilter, SortKey, SortOrder};
use crate::task::Task;

/// Inclusive due-date window. Only applied when both ends are set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DateRange {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

/// Filter and sort settings for a task list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterCriteria {
    pub categories: Vec<String>,
    pub priorities: Vec<String>,
    pub statuses: Vec<String>,
    pub date_range: Option<DateRange>,
    pub tags: Vec<String>,
    pub assignee: Option<String>,
    pub has_subtasks: Option<bool>,
    pub is_overdue: Option<bool>,
    pub sort_by: SortKey,
    pub sort_order: SortOrder,
}

impl FilterCriteria {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_category(mut self, id: impl Into<String>) -> Self {
        self.categories.push(id.into());
        self
    }

    pub fn with_priority(mut self, id: impl Into<String>) -> Self {
        self.priorities.push(id.into());
        self
    }

    pub fn with_status(mut self, id: impl Into<String>) -> Self {
        self.statuses.push(id.into());
        self
    }

    pub fn with_tags(mut self, tags: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.tags.extend(tags.into_iter().map(Into::into));
        self
    }

    pub fn with_date_range(mut self, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        self.date_range = Some(DateRange {
            start: Some(start),
            end: Some(end),
        });
        self
    }

    pub fn with_assignee(mut self, assignee: impl Into<String>) -> Self {
        self.assignee = Some(assignee.into());
        self
    }

    pub fn with_subtasks(mut self, has_subtasks: bool) -> Self {
        self.has_subtasks = Some(has_subtasks);
        self
    }

    pub fn overdue(mut self, is_overdue: bool) -> Self {
        self.is_overdue = Some(is_overdue);
        self
    }

    pub fn sorted_by(mut self, key: SortKey, order: SortOrder) -> Self {
        self.sort_by = key;
        self.sort_order = order;
        self
    }

    /// True when `task` passes every set criterion.
    pub fn matches(&self, task: &Task, now: DateTime<Utc>) -> bool {
        if !self.categories.is_empty() && !self.categories.contains(&task.category.id) {
            return false;
        }
        if !self.priorities.is_empty() && !self.priorities.contains(&task.priority.id) {
            return false;
        }
        if !self.statuses.is_empty() && !self.statuses.contains(&task.status.id) {
            return false;
        }
        if let Some(DateRange {
            start: Some(start),
            end: Some(end),
        }) = &self.date_range
        {
            if task.due_date < *start || task.due_date > *end {
                return false;
            }
        }
        if !self.tags.is_empty() && !self.tags.iter().any(|tag| task.tags.contains(tag)) {
            return false;
        }
        if let Some(needle) = self.assignee.as_deref().filter(|a| !a.is_empty()) {
            let needle = needle.to_lowercase();
            let hit = task
                .assignee
                .as_deref()
                .is_some_and(|a| a.to_lowercase().contains(&needle));
            if !hit {
                return false;
            }
        }
        if let Some(want) = self.has_subtasks {
            if task.has_subtasks() != want {
                return false;
            }
        }
        if let Some(want) = self.is_overdue {
            if task.is_overdue_at(now) != want {
                return false;
            }
        }
        true
    }
}

/// Case-insensitive free-text match over title, description, tags, category
/// name and assignee id. An empty query matches everything.
pub fn matches_query(task: &Task, query: &str) -> bool {
    if query.is_empty() {
        return true;
    }
    let q = query.to_lowercase();
    task.title.to_lowercase().contains(&q)
        || task.description.to_lowercase().contains(&q)
        || task.tags.iter().any(|t| t.to_lowercase().contains(&q))
        || task.category.name.to_lowercase().contains(&q)
        || task
            .assignee
            .as_deref()
            .is_some_and(|a| a.to_lowercase().contains(&q))
}

/// Filter tasks by search query and criteria, evaluated at the current instant.
pub fn filter_tasks<'a>(tasks: &'a [Task], query: &str, criteria: &FilterCriteria) -> Vec<&'a Task> {
    filter_tasks_at(tasks, query, criteria, Utc::now())
}

/// Filter tasks as of `now`. Input order is preserved.
pub fn filter_tasks_at<'a>(
    tasks: &'a [Task],
    query: &str,
    criteria: &FilterCriteria,
    now: DateTime<Utc>,
) -> Vec<&'a Task> {
    tasks
        .iter()
        .filter(|t| matches_query(t, query) && criteria.matches(t, now))
        .collect()
}

/// Stable sort. Priority "ascending" means highest level first; `Desc`
/// reverses whatever the key's natural comparison is.
pub fn sort_tasks<'a>(mut tasks: Vec<&'a Task>, key: SortKey, order: SortOrder) -> Vec<&'a Task> {
    tasks.sort_by(|a, b| {
        let ord = match key {
            SortKey::DueDate => a.due_date.cmp(&b.due_date),
            SortKey::CreatedAt => a.created_at.cmp(&b.created_at),
            SortKey::Priority => b.priority.level.cmp(&a.priority.level),
            SortKey::Title => compare_titles(&a.title, &b.title),
            SortKey::Progress => a.progress.unwrap_or(0).cmp(&b.progress.unwrap_or(0)),
        };
        match order {
            SortOrder::Asc => ord,
            SortOrder::Desc => ord.reverse(),
        }
    });
    tasks
}

/// Dictionary-style title order.
///
/// Letters compare by base form first ("éclair" sorts with the e's), then
/// unaccented before accented, then lowercase before uppercase.
pub fn compare_titles(a: &str, b: &str) -> Ordering {
    let (la, lb) = (a.to_lowercase(), b.to_lowercase());
    fold_diacritics(&la)
        .cmp(&fold_diacritics(&lb))
        .then_with(|| la.cmp(&lb))
        .then_with(|| b.cmp(a))
}

fn fold_diacritics(s: &str) -> String {
    s.nfd().filter(|c| !is_combining_mark(*c)).collect()
}

/// Due on the same local calendar day as `now`.
pub fn is_due_today(task: &Task, now: DateTime<Utc>) -> bool {
    local_date(task.due_date) == local_date(now)
}

/// Due within `[start of week, start of week + 7 days)`.
pub fn is_due_this_week(task: &Task, now: DateTime<Utc>, week_start: WeekStart) -> bool {
    let start = local_start_of_day(start_of_week(local_date(now), week_start));
    let end = local_start_of_day(start_of_week(local_date(now), week_start) + Duration::days(7));
    task.due_date >= start && task.due_date < end
}

/// Quick date filter held by the store's active settings.
pub fn matches_date_filter(
    task: &Task,
    filter: DateFilter,
    now: DateTime<Utc>,
    week_start: WeekStart,
) -> bool {
    match filter {
        DateFilter::Any => true,
        DateFilter::Today => is_due_today(task, now),
        DateFilter::ThisWeek => is_due_this_week(task, now, week_start),
        DateFilter::Overdue => task.is_overdue_at(now),
    }
}

/// Filter settings the store keeps between sessions.
///
/// Each single-valued field narrows the list when non-empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveFilters {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub priority: String,
    #[serde(default)]
    pub date_filter: DateFilter,
    #[serde(default)]
    pub search_query: String,
    #[serde(default)]
    pub category_id: String,
}

impl ActiveFilters {
    pub fn apply(&mut self, patch: FiltersPatch) {
        if let Some(v) = patch.status {
            self.status = v;
        }
        if let Some(v) = patch.priority {
            self.priority = v;
        }
        if let Some(v) = patch.date_filter {
            self.date_filter = v;
        }
        if let Some(v) = patch.search_query {
            self.search_query = v;
        }
        if let Some(v) = patch.category_id {
            self.category_id = v;
        }
    }

    /// Equivalent filter criteria (the date filter is applied separately).
    pub fn to_criteria(&self) -> FilterCriteria {
        let mut criteria = FilterCriteria::new();
        if !self.status.is_empty() {
            criteria = criteria.with_status(self.status.clone());
        }
        if !self.priority.is_empty() {
            criteria = criteria.with_priority(self.priority.clone());
        }
        if !self.category_id.is_empty() {
            criteria = criteria.with_category(self.category_id.clone());
        }
        criteria
    }
}

#[derive(Debug, Clone, Default)]
pub struct FiltersPatch {
    pub status: Option<String>,
    pub priority: Option<String>,
    pub date_filter: Option<DateFilter>,
    pub search_query: Option<String>,
    pub category_id: Option<String>,
}
