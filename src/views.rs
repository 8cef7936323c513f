//! Agenda, calendar and team views built on top of a task slice.

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use serde::Serialize;

use crate::db::local_date;
use crate::task::{Task, TeamMember};

/// Tasks partitioned by how soon they are due.
#[derive(Debug, Default)]
pub struct Agenda<'a> {
    pub overdue: Vec<&'a Task>,
    pub today: Vec<&'a Task>,
    pub tomorrow: Vec<&'a Task>,
    pub this_week: Vec<&'a Task>,
    pub later: Vec<&'a Task>,
}

impl<'a> Agenda<'a> {
    /// Bucket labels paired with their tasks, in display order.
    pub fn sections(&self) -> [(&'static str, &[&'a Task]); 5] {
        [
            ("Overdue", self.overdue.as_slice()),
            ("Today", self.today.as_slice()),
            ("Tomorrow", self.tomorrow.as_slice()),
            ("This week", self.this_week.as_slice()),
            ("Later", self.later.as_slice()),
        ]
    }
}

/// Group tasks by local due day relative to `now`, keeping input order in
/// each bucket.
///
/// A past-due completed task is not overdue; it lands in `this_week` since
/// its day is before the seven-day horizon.
pub fn group_by_due<'a>(tasks: &[&'a Task], now: DateTime<Utc>) -> Agenda<'a> {
    let today = local_date(now);
    let tomorrow = today + Duration::days(1);
    let horizon = today + Duration::days(7);

    let mut agenda = Agenda::default();
    for &task in tasks {
        let due = local_date(task.due_date);
        let bucket = if due < today && !task.is_completed() {
            &mut agenda.overdue
        } else if due == today {
            &mut agenda.today
        } else if due == tomorrow {
            &mut agenda.tomorrow
        } else if due <= horizon {
            &mut agenda.this_week
        } else {
            &mut agenda.later
        };
        bucket.push(task);
    }
    agenda
}

/// One cell of a month grid.
#[derive(Debug)]
pub struct CalendarDay<'a> {
    pub date: NaiveDate,
    pub in_month: bool,
    pub tasks: Vec<&'a Task>,
}

/// Number of cells in a month grid: six Sunday-started weeks.
pub const CALENDAR_CELLS: usize = 42;

/// Build the month grid for `year`/`month`. Only in-month cells carry tasks.
/// Returns `None` for an invalid month.
pub fn calendar_month<'a>(tasks: &[&'a Task], year: i32, month: u32) -> Option<Vec<CalendarDay<'a>>> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let lead = first.weekday().num_days_from_sunday() as i64;
    let grid_start = first - Duration::days(lead);

    let days = (0..CALENDAR_CELLS as i64)
        .map(|offset| {
            let date = grid_start + Duration::days(offset);
            let in_month = date.month() == month && date.year() == year;
            let tasks = if in_month {
                tasks
                    .iter()
                    .copied()
                    .filter(|t| local_date(t.due_date) == date)
                    .collect()
            } else {
                Vec::new()
            };
            CalendarDay { date, in_month, tasks }
        })
        .collect();
    Some(days)
}

/// Workload summary for a team member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberStats {
    pub member_id: String,
    pub total_tasks: usize,
    pub completed_tasks: usize,
    /// Rounded mean of recorded actual minutes over all assigned tasks.
    pub average_actual_time: u32,
}

pub fn member_stats(tasks: &[Task], member: &TeamMember) -> MemberStats {
    let assigned: Vec<&Task> = tasks
        .iter()
        .filter(|t| t.assignee.as_deref() == Some(member.id.as_str()))
        .collect();
    let completed = assigned.iter().filter(|t| t.is_completed()).count();
    let average_actual_time = if assigned.is_empty() {
        0
    } else {
        let minutes: u64 = assigned.iter().map(|t| t.actual_time.unwrap_or(0) as u64).sum();
        (minutes as f64 / assigned.len() as f64 + 0.5).floor() as u32
    };
    MemberStats {
        member_id: member.id.clone(),
        total_tasks: assigned.len(),
        completed_tasks: completed,
        average_actual_time,
    }
}
