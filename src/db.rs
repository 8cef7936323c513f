//! Persisted state and utility functions for the planner.
//!
//! This module provides the `Database` struct (the task store's canonical
//! state), the versioned snapshot envelope written to disk, and helpers for
//! tags, due-date input, local calendar days and text formatting.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Datelike, Duration, Local, LocalResult, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::WeekStart;
use crate::error::Result;
use crate::fields::{default_categories, default_priorities, default_statuses, Category, Priority, Status};
use crate::filter::ActiveFilters;
use crate::seed::default_team_members;
use crate::task::{Task, TeamMember};

/// Storage namespace for task state.
pub const STORAGE_NAMESPACE: &str = "zz-planner-storage";

/// Storage namespace for the display preference snapshot.
pub const THEME_NAMESPACE: &str = "zz-planner-theme";

/// Schema version written with every snapshot.
pub const SCHEMA_VERSION: u32 = 1;

/// Canonical task store state.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Database {
    #[serde(default)]
    pub tasks: Vec<Task>,
    #[serde(default = "default_categories")]
    pub categories: Vec<Category>,
    #[serde(default = "default_priorities")]
    pub priorities: Vec<Priority>,
    #[serde(default = "default_statuses")]
    pub statuses: Vec<Status>,
    #[serde(default)]
    pub team_members: Vec<TeamMember>,
    #[serde(default)]
    pub filters: ActiveFilters,
}

impl Default for Database {
    fn default() -> Self {
        Database {
            tasks: Vec::new(),
            categories: default_categories(),
            priorities: default_priorities(),
            statuses: default_statuses(),
            team_members: default_team_members(Utc::now()),
            filters: ActiveFilters::default(),
        }
    }
}

impl Database {
    pub fn get(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut Task> {
        self.tasks.iter_mut().find(|t| t.id == id)
    }

    pub fn status_named(&self, name: &str) -> Option<&Status> {
        self.statuses.iter().find(|s| s.name == name)
    }

    pub fn member(&self, id: &str) -> Option<&TeamMember> {
        self.team_members.iter().find(|m| m.id == id)
    }
}

/// Display preferences, persisted separately from task state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Preferences {
    #[serde(default)]
    pub dark_mode: bool,
}

/// Versioned envelope around a persisted state object.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot<T> {
    pub state: T,
    pub version: u32,
}

/// Path of the snapshot file for a namespace inside the data directory.
pub fn snapshot_path(dir: &Path, namespace: &str) -> PathBuf {
    dir.join(format!("{namespace}.json"))
}

/// Read a snapshot. `Ok(None)` when the file does not exist.
pub fn try_load_snapshot<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    if !path.exists() {
        return Ok(None);
    }
    let buf = fs::read_to_string(path)?;
    let snapshot: Snapshot<T> = serde_json::from_str(&buf)?;
    if snapshot.version != SCHEMA_VERSION {
        warn!(
            path = %path.display(),
            found = snapshot.version,
            expected = SCHEMA_VERSION,
            "snapshot version mismatch, loading as-is"
        );
    }
    Ok(Some(snapshot.state))
}

/// Read a snapshot, falling back to defaults when it is missing or unreadable.
///
/// An unreadable file is moved aside with [`quarantine_snapshot`] first, so
/// the next save cannot overwrite it.
pub fn load_snapshot<T: DeserializeOwned + Default>(path: &Path) -> T {
    match try_load_snapshot(path) {
        Ok(Some(state)) => state,
        Ok(None) => {
            debug!(path = %path.display(), "no snapshot, starting fresh");
            T::default()
        }
        Err(e) => {
            match quarantine_snapshot(path, Utc::now()) {
                Ok(moved) => warn!(
                    path = %path.display(),
                    kept = %moved.display(),
                    error = %e,
                    "failed to load snapshot, starting fresh"
                ),
                Err(mv) => warn!(
                    path = %path.display(),
                    error = %e,
                    rename_error = %mv,
                    "failed to load snapshot and could not move it aside"
                ),
            }
            T::default()
        }
    }
}

/// Rename a snapshot to `<file>.corrupt-<timestamp>` and return the new path.
pub fn quarantine_snapshot(path: &Path, now: DateTime<Utc>) -> Result<PathBuf> {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let target = path.with_file_name(format!("{name}.corrupt-{}", now.format("%Y%m%dT%H%M%S%3fZ")));
    fs::rename(path, &target)?;
    Ok(target)
}

/// Write a snapshot using temp file + rename.
pub fn save_snapshot<T: Serialize>(path: &Path, state: &T) -> Result<()> {
    let snapshot = Snapshot {
        state,
        version: SCHEMA_VERSION,
    };
    let data = serde_json::to_string_pretty(&snapshot)?;
    let tmp = path.with_extension("json.tmp");
    let mut f = File::create(&tmp)?;
    f.write_all(data.as_bytes())?;
    f.flush()?;
    fs::rename(tmp, path)?;
    Ok(())
}

/// Normalize a tag string by trimming, lowercasing, and replacing spaces with hyphens.
pub fn normalise_tag(s: &str) -> String {
    s.trim().to_lowercase().replace(' ', "-")
}

/// Split comma-separated tag strings and normalize each tag, keeping first-seen order.
pub fn split_and_normalise_tags(inputs: &[String]) -> Vec<String> {
    let mut tags: Vec<String> = Vec::new();
    for raw in inputs {
        for part in raw.split(',') {
            let tag = normalise_tag(part);
            if !tag.is_empty() && !tags.contains(&tag) {
                tags.push(tag);
            }
        }
    }
    tags
}

/// Local calendar date of an instant.
pub fn local_date(at: DateTime<Utc>) -> NaiveDate {
    at.with_timezone(&Local).date_naive()
}

/// First instant of a local calendar day.
pub fn local_start_of_day(date: NaiveDate) -> DateTime<Utc> {
    let naive = date.and_time(NaiveTime::MIN);
    match Local.from_local_datetime(&naive) {
        LocalResult::Single(t) | LocalResult::Ambiguous(t, _) => t.with_timezone(&Utc),
        // Midnight skipped by a DST jump.
        LocalResult::None => naive.and_utc(),
    }
}

/// Last second of a local calendar day.
pub fn local_end_of_day(date: NaiveDate) -> DateTime<Utc> {
    match date.succ_opt() {
        Some(next) => local_start_of_day(next) - Duration::seconds(1),
        None => date.and_time(NaiveTime::MIN).and_utc(),
    }
}

/// First day of the week containing `today`.
pub fn start_of_week(today: NaiveDate, week_start: WeekStart) -> NaiveDate {
    let offset = match week_start {
        WeekStart::Sunday => today.weekday().num_days_from_sunday(),
        WeekStart::Monday => today.weekday().num_days_from_monday(),
    };
    today - Duration::days(offset as i64)
}

/// `date + days`, or `None` when the result leaves chrono's date range.
fn add_days(date: NaiveDate, days: i64) -> Option<NaiveDate> {
    date.checked_add_signed(Duration::try_days(days)?)
}

/// Parse human-readable due date input.
///
/// Supports:
/// - "today", "tomorrow", "yesterday"
/// - "monday".."sunday", "next monday", "this friday"
/// - "end of week", "end of month"
/// - "in 3d", "in 2w", "in 1m"
/// - "YYYY-MM-DD" format
pub fn parse_due_input(s: &str, today: NaiveDate, week_start: WeekStart) -> Option<NaiveDate> {
    let s = s.trim().to_lowercase();

    match s.as_str() {
        "today" => return Some(today),
        "tomorrow" => return today.succ_opt(),
        "yesterday" => return today.pred_opt(),
        "end of week" | "eow" => {
            return add_days(start_of_week(today, week_start), 6);
        }
        "end of month" | "eom" => {
            let (year, month) = if today.month() == 12 {
                (today.year() + 1, 1)
            } else {
                (today.year(), today.month() + 1)
            };
            let first_of_next = NaiveDate::from_ymd_opt(year, month, 1)?;
            return first_of_next.pred_opt();
        }
        _ => {}
    }

    if let Some(rest) = s.strip_prefix("in ") {
        let rest = rest.trim();
        let split = rest.char_indices().last().map_or(0, |(i, _)| i);
        let (num, unit) = rest.split_at(split);
        if let Ok(n) = num.trim().parse::<i64>() {
            // Approximate: 30 days per month
            let days = match unit {
                "d" => Some(n),
                "w" => n.checked_mul(7),
                "m" => n.checked_mul(30),
                _ => None,
            };
            if let Some(days) = days {
                return add_days(today, days);
            }
        }
    }

    let weekdays = [
        ("monday", 0), ("tuesday", 1), ("wednesday", 2), ("thursday", 3),
        ("friday", 4), ("saturday", 5), ("sunday", 6),
        ("mon", 0), ("tue", 1), ("wed", 2), ("thu", 3),
        ("fri", 4), ("sat", 5), ("sun", 6),
    ];
    let current = today.weekday().num_days_from_monday() as i64;
    for (day_name, target) in weekdays {
        let days_ahead = (target + 7 - current) % 7;
        if s == day_name || s == format!("this {day_name}") {
            return add_days(today, days_ahead);
        }
        if s == format!("next {day_name}") {
            let days = if days_ahead == 0 { 7 } else { days_ahead + 7 };
            return add_days(today, days);
        }
    }

    NaiveDate::parse_from_str(&s, "%Y-%m-%d").ok()
}

/// Format a due date relative to today ("today", "tomorrow", "in 3d", "2d late").
pub fn format_due_relative(due: NaiveDate, today: NaiveDate) -> String {
    let delta = (due - today).num_days();
    match delta {
        0 => "today".into(),
        1 => "tomorrow".into(),
        d if d > 1 => format!("in {d}d"),
        d => format!("{}d late", -d),
    }
}

/// Truncate a string to a maximum width, adding ellipsis if needed.
pub fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        s.to_string()
    } else {
        let mut out = String::new();
        for (i, ch) in s.chars().enumerate() {
            if i + 1 >= width {
                out.push('…');
                break;
            }
            out.push(ch);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_normalise_tags() {
        let tags = split_and_normalise_tags(&["Deep Work, admin".into(), "admin,,urgent ".into()]);
        assert_eq!(tags, vec!["deep-work", "admin", "urgent"]);
    }

    #[test]
    fn test_start_of_week() {
        // 2024-06-12 is a Wednesday.
        assert_eq!(start_of_week(d(2024, 6, 12), WeekStart::Sunday), d(2024, 6, 9));
        assert_eq!(start_of_week(d(2024, 6, 12), WeekStart::Monday), d(2024, 6, 10));
        assert_eq!(start_of_week(d(2024, 6, 9), WeekStart::Sunday), d(2024, 6, 9));
        assert_eq!(start_of_week(d(2024, 6, 9), WeekStart::Monday), d(2024, 6, 3));
    }

    #[test]
    fn test_parse_due_input() {
        let today = d(2024, 6, 12);
        let ws = WeekStart::Sunday;
        assert_eq!(parse_due_input("today", today, ws), Some(today));
        assert_eq!(parse_due_input("Tomorrow", today, ws), Some(d(2024, 6, 13)));
        assert_eq!(parse_due_input("in 3d", today, ws), Some(d(2024, 6, 15)));
        assert_eq!(parse_due_input("in 2w", today, ws), Some(d(2024, 6, 26)));
        assert_eq!(parse_due_input("friday", today, ws), Some(d(2024, 6, 14)));
        assert_eq!(parse_due_input("wednesday", today, ws), Some(today));
        assert_eq!(parse_due_input("next wednesday", today, ws), Some(d(2024, 6, 19)));
        assert_eq!(parse_due_input("next friday", today, ws), Some(d(2024, 6, 21)));
        assert_eq!(parse_due_input("eow", today, ws), Some(d(2024, 6, 15)));
        assert_eq!(parse_due_input("eom", today, ws), Some(d(2024, 6, 30)));
        assert_eq!(parse_due_input("2024-12-31", today, ws), Some(d(2024, 12, 31)));
        assert_eq!(parse_due_input("someday", today, ws), None);
        assert_eq!(parse_due_input("in -2d", today, ws), Some(d(2024, 6, 10)));
        assert_eq!(parse_due_input("in 999999999d", today, ws), None);
        assert_eq!(parse_due_input("in 400000000000000000m", today, ws), None);
        assert_eq!(parse_due_input("in 9223372036854775807w", today, ws), None);
    }

    #[test]
    fn test_relative_input_at_the_edge_of_the_calendar() {
        let ws = WeekStart::Sunday;
        assert_eq!(parse_due_input("tomorrow", NaiveDate::MAX, ws), None);
        assert_eq!(parse_due_input("yesterday", NaiveDate::MIN, ws), None);
        assert_eq!(parse_due_input("in 1d", NaiveDate::MAX, ws), None);
    }

    #[test]
    fn test_unreadable_snapshot_is_moved_aside() {
        let dir = tempfile::tempdir().unwrap();
        let path = snapshot_path(dir.path(), STORAGE_NAMESPACE);
        fs::write(&path, "{broken").unwrap();

        let prefs: Preferences = load_snapshot(&path);
        assert_eq!(prefs, Preferences::default());
        assert!(!path.exists());

        let kept: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .filter(|n| n.starts_with("zz-planner-storage.json.corrupt-"))
            .collect();
        assert_eq!(kept.len(), 1);
        assert_eq!(fs::read_to_string(dir.path().join(&kept[0])).unwrap(), "{broken");
    }

    #[test]
    fn test_end_of_month_december() {
        assert_eq!(
            parse_due_input("end of month", d(2024, 12, 3), WeekStart::Sunday),
            Some(d(2024, 12, 31))
        );
    }

    #[test]
    fn test_local_day_bounds() {
        let day = d(2024, 6, 12);
        assert_eq!(local_date(local_start_of_day(day)), day);
        assert_eq!(local_date(local_end_of_day(day)), day);
        assert!(local_end_of_day(day) > local_start_of_day(day));
    }

    #[test]
    fn test_format_due_relative() {
        let today = d(2024, 6, 12);
        assert_eq!(format_due_relative(today, today), "today");
        assert_eq!(format_due_relative(d(2024, 6, 13), today), "tomorrow");
        assert_eq!(format_due_relative(d(2024, 6, 16), today), "in 4d");
        assert_eq!(format_due_relative(d(2024, 6, 10), today), "2d late");
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("a longer title", 6), "a lon…");
    }

    #[test]
    fn test_snapshot_roundtrip() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = snapshot_path(dir.path(), THEME_NAMESPACE);
        save_snapshot(&path, &Preferences { dark_mode: true }).unwrap();

        let raw: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw["version"], 1);
        assert_eq!(raw["state"]["darkMode"], true);

        let loaded: Preferences = load_snapshot(&path);
        assert!(loaded.dark_mode);
    }

    #[test]
    fn test_corrupt_snapshot_falls_back_to_default() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = snapshot_path(dir.path(), THEME_NAMESPACE);
        fs::write(&path, "{not json").unwrap();
        assert!(try_load_snapshot::<Preferences>(&path).is_err());
        assert_eq!(load_snapshot::<Preferences>(&path), Preferences::default());
    }

    #[test]
    fn test_version_mismatch_still_loads() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = snapshot_path(dir.path(), THEME_NAMESPACE);
        fs::write(&path, r#"{"state":{"darkMode":true},"version":7}"#).unwrap();
        assert!(load_snapshot::<Preferences>(&path).dark_mode);
    }

    #[test]
    fn test_default_database_has_lookup_tables() {
        let db = Database::default();
        assert!(db.tasks.is_empty());
        assert_eq!(db.categories.len(), 5);
        assert_eq!(db.team_members.len(), 3);
        assert!(db.status_named("Completed").is_some());
    }
}
