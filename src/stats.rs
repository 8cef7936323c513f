//! Dashboard statistics derived from the current task collection.
//!
//! Nothing here is cached: each call recomputes from the state it is given.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::Serialize;

use crate::config::WeekStart;
use crate::db::{local_date, Database};
use crate::filter::{is_due_this_week, is_due_today};

/// Aggregate counts for one calendar day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailyProgress {
    pub date: NaiveDate,
    pub completed: usize,
    pub created: usize,
}

impl DailyProgress {
    /// Completed-to-created percentage, 0 when nothing was created.
    pub fn ratio(&self) -> u32 {
        if self.created == 0 {
            return 0;
        }
        js_round(self.completed as f64 / self.created as f64 * 100.0) as u32
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_tasks: usize,
    pub completed_tasks: usize,
    pub overdue_tasks: usize,
    pub today_tasks: usize,
    pub this_week_tasks: usize,
    /// Minutes.
    pub average_completion_time: f64,
    /// At most 100. Not floored at zero.
    pub productivity_score: i64,
    pub category_breakdown: BTreeMap<String, usize>,
    pub priority_breakdown: BTreeMap<String, usize>,
    /// Seven entries, oldest first, ending today.
    pub weekly_progress: Vec<DailyProgress>,
}

impl DashboardStats {
    /// Share of tasks completed, as a rounded percentage.
    pub fn completion_rate(&self) -> u32 {
        if self.total_tasks == 0 {
            return 0;
        }
        js_round(self.completed_tasks as f64 / self.total_tasks as f64 * 100.0) as u32
    }
}

/// Round half toward positive infinity.
fn js_round(x: f64) -> f64 {
    (x + 0.5).floor()
}

pub fn compute(db: &Database, now: DateTime<Utc>, week_start: WeekStart) -> DashboardStats {
    let tasks = &db.tasks;
    let completed: Vec<_> = tasks.iter().filter(|t| t.is_completed()).collect();
    let overdue = tasks.iter().filter(|t| t.is_overdue_at(now)).count();
    let today = tasks.iter().filter(|t| is_due_today(t, now)).count();
    let this_week = tasks
        .iter()
        .filter(|t| is_due_this_week(t, now, week_start))
        .count();

    let category_breakdown = db
        .categories
        .iter()
        .map(|c| {
            let n = tasks.iter().filter(|t| t.category.id == c.id).count();
            (c.name.clone(), n)
        })
        .collect();

    let priority_breakdown = db
        .priorities
        .iter()
        .map(|p| {
            let n = tasks.iter().filter(|t| t.priority.id == p.id).count();
            (p.name.clone(), n)
        })
        .collect();

    let minutes: u64 = completed
        .iter()
        .map(|t| t.actual_time.or(t.estimated_time).unwrap_or(0) as u64)
        .sum();
    let average_completion_time = minutes as f64 / completed.len().max(1) as f64;

    let total = tasks.len().max(1) as f64;
    let raw = (completed.len() as f64 / total) * 100.0 * (1.0 - overdue as f64 / total);
    let productivity_score = js_round(raw).min(100.0) as i64;

    let today_date = local_date(now);
    let weekly_progress = (0..7)
        .rev()
        .map(|back| {
            let date = today_date - Duration::days(back);
            DailyProgress {
                date,
                completed: completed
                    .iter()
                    .filter(|t| local_date(t.updated_at) == date)
                    .count(),
                created: tasks
                    .iter()
                    .filter(|t| local_date(t.created_at) == date)
                    .count(),
            }
        })
        .collect();

    DashboardStats {
        total_tasks: tasks.len(),
        completed_tasks: completed.len(),
        overdue_tasks: overdue,
        today_tasks: today,
        this_week_tasks: this_week,
        average_completion_time,
        productivity_score,
        category_breakdown,
        priority_breakdown,
        weekly_progress,
    }
}
