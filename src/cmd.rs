//! Command implementations for the CLI interface.
//!
//! Each handler resolves user input (ids, names, natural-language dates)
//! against the store, performs one store operation and prints the result.

use std::path::Path;

use clap::{Args, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};

use chrono::{DateTime, Datelike, Local, NaiveDate, Utc};
use task_planner::config::{Config, WeekStart};
use task_planner::db::{
    format_due_relative, local_date, local_end_of_day, local_start_of_day, parse_due_input,
    split_and_normalise_tags, truncate,
};
use task_planner::fields::{Category, CategoryDraft, CategoryPatch, DateFilter, Priority, SortKey, SortOrder, Status};
use task_planner::filter::{DateRange, FilterCriteria, FiltersPatch};
use task_planner::prefs::PreferenceStore;
use task_planner::task::{MemberDraft, MemberPatch, SubTask, Task, TaskDraft, TaskPatch, TeamMember};
use task_planner::views::{calendar_month, group_by_due, member_stats, MemberStats};
use task_planner::{Error, Result, TaskStore};

#[derive(Subcommand)]
pub enum Commands {
    /// Add a new task.
    Add(AddArgs),

    /// List tasks with optional search, filters and sorting.
    List(ListArgs),

    /// View a single task by id, id prefix or title.
    View {
        /// Task id, id prefix or title
        id: String,
    },

    /// Update fields on a task.
    Update(UpdateArgs),

    /// Toggle a task between Completed and In Progress.
    Toggle {
        /// Task id, id prefix or title
        id: String,
    },

    /// Delete a task.
    Delete {
        /// Task id, id prefix or title
        id: String,
    },

    /// Show dashboard statistics.
    Stats {
        /// Print the statistics as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Show tasks grouped by due day: overdue, today, tomorrow, this week, later.
    Agenda,

    /// Show a month calendar with task counts per day.
    Calendar {
        /// Month as YYYY-MM. Defaults to the current month.
        #[arg(long)]
        month: Option<String>,
        /// Only place tasks that pass the saved filters.
        #[arg(long)]
        active: bool,
    },

    /// Manage categories.
    Category {
        #[command(subcommand)]
        action: CategoryAction,
    },

    /// Manage team members.
    Team {
        #[command(subcommand)]
        action: TeamAction,
    },

    /// Set or clear the saved filters used by `list --active`.
    Filters(FiltersArgs),

    /// Load the sample task set if there are no tasks yet and write a
    /// default config.toml if none exists.
    Init,

    /// Show or change the dark mode preference.
    DarkMode {
        #[arg(value_enum)]
        value: Option<Switch>,
    },

    /// Generate shell completion scripts.
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Args)]
pub struct AddArgs {
    /// Short title for the task.
    pub title: String,
    /// Longer description.
    #[arg(long)]
    pub desc: Option<String>,
    /// Category id or name. Defaults to the first category.
    #[arg(long)]
    pub category: Option<String>,
    /// Priority id or name.
    #[arg(long, default_value = "Medium")]
    pub priority: String,
    /// Status id or name.
    #[arg(long, default_value = "Not Started")]
    pub status: String,
    /// Due date: YYYY-MM-DD, "today", "tomorrow", "friday", "in 3d".
    #[arg(long, default_value = "today")]
    pub due: String,
    /// Comma-separated tags. May be repeated.
    #[arg(long = "tag")]
    pub tags: Vec<String>,
    /// Estimated minutes.
    #[arg(long)]
    pub estimate: Option<u32>,
    /// Actual minutes.
    #[arg(long)]
    pub actual: Option<u32>,
    /// Team member id or name.
    #[arg(long)]
    pub assignee: Option<String>,
    /// Progress percentage (values above 100 are capped).
    #[arg(long)]
    pub progress: Option<u8>,
    /// Subtask title. May be repeated.
    #[arg(long = "subtask")]
    pub subtasks: Vec<String>,
}

#[derive(Args)]
pub struct ListArgs {
    /// Free-text search over title, description, tags, category and assignee.
    #[arg(long, short)]
    pub search: Option<String>,
    /// Category id or name. May be repeated.
    #[arg(long)]
    pub category: Vec<String>,
    /// Priority id or name. May be repeated.
    #[arg(long)]
    pub priority: Vec<String>,
    /// Status id or name. May be repeated.
    #[arg(long)]
    pub status: Vec<String>,
    /// Match tasks carrying any of these tags. May be repeated and comma-separated.
    #[arg(long = "tag")]
    pub tags: Vec<String>,
    /// Assignee id substring.
    #[arg(long)]
    pub assignee: Option<String>,
    /// Earliest due date (inclusive). Needs --to.
    #[arg(long, requires = "to")]
    pub from: Option<String>,
    /// Latest due date (inclusive). Needs --from.
    #[arg(long, requires = "from")]
    pub to: Option<String>,
    /// Only tasks with (true) or without (false) subtasks.
    #[arg(long)]
    pub has_subtasks: Option<bool>,
    /// Only overdue (true) or not overdue (false) tasks.
    #[arg(long)]
    pub overdue: Option<bool>,
    #[arg(long, value_enum, default_value_t = SortKey::DueDate)]
    pub sort: SortKey,
    #[arg(long, value_enum, default_value_t = SortOrder::Asc)]
    pub order: SortOrder,
    /// Use the saved filters instead of the options above.
    #[arg(long)]
    pub active: bool,
    /// Limit number of rows printed.
    #[arg(long)]
    pub limit: Option<usize>,
}

#[derive(Args)]
pub struct UpdateArgs {
    /// Task id, id prefix or title
    pub id: String,
    #[arg(long)]
    pub title: Option<String>,
    #[arg(long)]
    pub desc: Option<String>,
    #[arg(long)]
    pub category: Option<String>,
    #[arg(long)]
    pub priority: Option<String>,
    #[arg(long)]
    pub status: Option<String>,
    #[arg(long)]
    pub due: Option<String>,
    /// Add tags. May be repeated and comma-separated.
    #[arg(long = "add-tag")]
    pub add_tags: Vec<String>,
    /// Remove tags. May be repeated and comma-separated.
    #[arg(long = "rm-tag")]
    pub rm_tags: Vec<String>,
    #[arg(long)]
    pub estimate: Option<u32>,
    #[arg(long)]
    pub actual: Option<u32>,
    #[arg(long)]
    pub progress: Option<u8>,
    /// Team member id or name.
    #[arg(long, conflicts_with = "clear_assignee")]
    pub assignee: Option<String>,
    #[arg(long)]
    pub clear_assignee: bool,
    /// Append a subtask. May be repeated.
    #[arg(long = "add-subtask")]
    pub add_subtasks: Vec<String>,
    /// Mark a subtask done by id or title. May be repeated.
    #[arg(long = "check")]
    pub check: Vec<String>,
}

#[derive(Args)]
pub struct FiltersArgs {
    /// Status id or name.
    #[arg(long)]
    pub status: Option<String>,
    /// Priority id or name.
    #[arg(long)]
    pub priority: Option<String>,
    /// Category id or name.
    #[arg(long)]
    pub category: Option<String>,
    #[arg(long)]
    pub search: Option<String>,
    #[arg(long, value_enum)]
    pub date: Option<DateFilter>,
    /// Reset every saved filter.
    #[arg(long)]
    pub clear: bool,
}

#[derive(Subcommand)]
pub enum CategoryAction {
    /// List categories with task counts.
    List,
    /// Add a category.
    Add {
        name: String,
        #[arg(long, default_value = "#6B7280")]
        color: String,
        #[arg(long, default_value = "tag")]
        icon: String,
    },
    /// Rename or restyle a category. Existing tasks keep their copy.
    Update {
        /// Category id or name
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        color: Option<String>,
        #[arg(long)]
        icon: Option<String>,
    },
    /// Delete a category. Existing tasks keep their copy.
    Delete {
        /// Category id or name
        id: String,
    },
}

#[derive(Subcommand)]
pub enum TeamAction {
    /// List team members with their workload.
    List {
        /// Print the workload table as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Add a team member.
    Add {
        name: String,
        #[arg(long)]
        role: String,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        department: Option<String>,
        #[arg(long)]
        avatar: Option<String>,
    },
    /// Update a team member.
    Update {
        /// Member id or name
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        role: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        department: Option<String>,
    },
    /// Remove a team member. Assigned tasks keep the member id.
    Delete {
        /// Member id or name
        id: String,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Switch {
    On,
    Off,
    Toggle,
}

// =========================================================================
// Resolution helpers
// =========================================================================

/// Resolve a task by exact id, unique id prefix or case-insensitive title.
pub fn resolve_task_id(store: &TaskStore, ident: &str) -> Result<String> {
    let ident = ident.trim();
    if ident.is_empty() {
        return Err(Error::not_found("Task", ident));
    }
    if store.get_task(ident).is_some() {
        return Ok(ident.to_string());
    }
    let lower = ident.to_lowercase();
    let by_prefix: Vec<&Task> = store.tasks().iter().filter(|t| t.id.starts_with(&lower)).collect();
    if by_prefix.len() == 1 {
        return Ok(by_prefix[0].id.clone());
    }
    let by_title: Vec<&Task> = store
        .tasks()
        .iter()
        .filter(|t| t.title.to_lowercase() == lower)
        .collect();
    match by_title.len() {
        0 => Err(Error::not_found("Task", ident)),
        1 => Ok(by_title[0].id.clone()),
        _ => {
            let ids: Vec<&str> = by_title.iter().map(|t| t.id.as_str()).collect();
            Err(Error::InvalidArgument(format!(
                "multiple tasks titled '{ident}' ({}); use an id instead",
                ids.join(", ")
            )))
        }
    }
}

fn resolve_lookup<'a, T>(
    items: &'a [T],
    ident: &str,
    kind: &'static str,
    key: impl Fn(&T) -> (&str, &str),
) -> Result<&'a T> {
    items
        .iter()
        .find(|item| key(*item).0 == ident)
        .or_else(|| items.iter().find(|item| key(*item).1.eq_ignore_ascii_case(ident)))
        .ok_or_else(|| Error::not_found(kind, ident))
}

fn resolve_category(store: &TaskStore, ident: &str) -> Result<Category> {
    resolve_lookup(store.categories(), ident, "Category", |c| (c.id.as_str(), c.name.as_str())).cloned()
}

fn resolve_priority(store: &TaskStore, ident: &str) -> Result<Priority> {
    resolve_lookup(store.priorities(), ident, "Priority", |p| (p.id.as_str(), p.name.as_str())).cloned()
}

fn resolve_status(store: &TaskStore, ident: &str) -> Result<Status> {
    resolve_lookup(store.statuses(), ident, "Status", |s| (s.id.as_str(), s.name.as_str())).cloned()
}

fn resolve_member(store: &TaskStore, ident: &str) -> Result<TeamMember> {
    resolve_lookup(store.team_members(), ident, "Team member", |m| (m.id.as_str(), m.name.as_str())).cloned()
}

fn parse_day(input: &str, week_start: WeekStart) -> Result<NaiveDate> {
    parse_due_input(input, Local::now().date_naive(), week_start)
        .ok_or_else(|| Error::InvalidArgument(format!("unrecognised date '{input}'")))
}

/// A date-only due is the end of that local day.
fn parse_due(input: &str, week_start: WeekStart) -> Result<DateTime<Utc>> {
    parse_day(input, week_start).map(local_end_of_day)
}

fn assignee_label(store: &TaskStore, task: &Task) -> String {
    match task.assignee.as_deref() {
        None | Some("") => "-".into(),
        Some(id) => store
            .database()
            .member(id)
            .map(|m| m.name.clone())
            .unwrap_or_else(|| format!("{} (removed)", truncate(id, 8))),
    }
}

fn short_id(id: &str) -> &str {
    id.get(..8).unwrap_or(id)
}

/// Print tasks in a formatted table.
pub fn print_table(store: &TaskStore, tasks: &[&Task]) {
    println!(
        "{:<9} {:<12} {:<9} {:<10} {:<10} {:>4} {:<16} {}",
        "ID", "Status", "Priority", "Due", "Category", "Prog", "Assignee", "Title [tags]"
    );
    let today = Local::now().date_naive();
    for t in tasks {
        let tags = if t.tags.is_empty() {
            String::new()
        } else {
            format!(" [{}]", t.tags.join(","))
        };
        let progress = t.progress.map(|p| format!("{p}%")).unwrap_or_else(|| "-".into());
        println!(
            "{:<9} {:<12} {:<9} {:<10} {:<10} {:>4} {:<16} {}{}",
            short_id(&t.id),
            truncate(&t.status.name, 12),
            truncate(&t.priority.name, 9),
            format_due_relative(local_date(t.due_date), today),
            truncate(&t.category.name, 10),
            progress,
            truncate(&assignee_label(store, t), 16),
            t.title,
            tags
        );
    }
}

// =========================================================================
// Task commands
// =========================================================================

pub fn cmd_add(store: &mut TaskStore, args: AddArgs) -> Result<()> {
    let category = match args.category.as_deref() {
        Some(ident) => resolve_category(store, ident)?,
        None => store
            .categories()
            .first()
            .cloned()
            .ok_or_else(|| Error::InvalidArgument("no categories defined".into()))?,
    };
    let priority = resolve_priority(store, &args.priority)?;
    let status = resolve_status(store, &args.status)?;
    let due = parse_due(&args.due, store.week_start())?;
    let assignee = match args.assignee.as_deref() {
        Some(ident) => Some(resolve_member(store, ident)?.id),
        None => None,
    };

    let now = Utc::now();
    let mut draft = TaskDraft::new(args.title, category, priority, status, due);
    draft.description = args.desc.unwrap_or_default();
    draft.tags = split_and_normalise_tags(&args.tags);
    draft.estimated_time = args.estimate;
    draft.actual_time = args.actual;
    draft.assignee = assignee;
    draft.progress = args.progress;
    draft.subtasks = args
        .subtasks
        .into_iter()
        .map(|title| SubTask::new(title, false, now))
        .collect();

    let id = store.add_task_at(draft, now);
    println!("Added task {}", short_id(&id));
    Ok(())
}

pub fn cmd_list(store: &TaskStore, args: ListArgs) -> Result<()> {
    let mut tasks = if args.active {
        store.active_tasks()
    } else {
        let mut criteria = FilterCriteria::new()
            .with_tags(split_and_normalise_tags(&args.tags))
            .sorted_by(args.sort, args.order);
        for ident in &args.category {
            criteria = criteria.with_category(resolve_category(store, ident)?.id);
        }
        for ident in &args.priority {
            criteria = criteria.with_priority(resolve_priority(store, ident)?.id);
        }
        for ident in &args.status {
            criteria = criteria.with_status(resolve_status(store, ident)?.id);
        }
        criteria.assignee = args.assignee;
        criteria.has_subtasks = args.has_subtasks;
        criteria.is_overdue = args.overdue;
        if args.from.is_some() && args.to.is_some() {
            let ws = store.week_start();
            criteria.date_range = Some(DateRange {
                start: args.from.as_deref().map(|s| parse_day(s, ws)).transpose()?.map(local_start_of_day),
                end: args.to.as_deref().map(|s| parse_day(s, ws)).transpose()?.map(local_end_of_day),
            });
        }
        store.query(args.search.as_deref().unwrap_or(""), &criteria)
    };

    if let Some(n) = args.limit {
        tasks.truncate(n);
    }
    print_table(store, &tasks);
    Ok(())
}

pub fn cmd_view(store: &TaskStore, ident: &str) -> Result<()> {
    let id = resolve_task_id(store, ident)?;
    let Some(task) = store.get_task(&id) else {
        return Err(Error::not_found("Task", ident));
    };
    let today = Local::now().date_naive();
    let due = local_date(task.due_date);
    let minutes = |m: Option<u32>| m.map(|m| format!("{m} min")).unwrap_or_else(|| "-".into());

    println!("ID:           {}", task.id);
    println!("Title:        {}", task.title);
    println!("Status:       {}", task.status.name);
    println!("Priority:     {} (level {})", task.priority.name, task.priority.level);
    println!("Category:     {}", task.category.name);
    println!("Due:          {due} ({})", format_due_relative(due, today));
    println!("Assignee:     {}", assignee_label(store, task));
    println!("Progress:     {}", task.progress.map(|p| format!("{p}%")).unwrap_or_else(|| "-".into()));
    println!("Estimated:    {}", minutes(task.estimated_time));
    println!("Actual:       {}", minutes(task.actual_time));
    println!("Tags:         {}", if task.tags.is_empty() { "-".into() } else { task.tags.join(",") });
    println!("Created:      {}", task.created_at.to_rfc3339());
    println!("Updated:      {}", task.updated_at.to_rfc3339());
    if !task.description.is_empty() {
        println!("Description:\n{}", task.description);
    }
    if task.has_subtasks() {
        println!("Subtasks:");
        for s in &task.subtasks {
            println!("  [{}] {} (#{})", if s.completed { "x" } else { " " }, s.title, short_id(&s.id));
        }
    }
    Ok(())
}

pub fn cmd_update(store: &mut TaskStore, args: UpdateArgs) -> Result<()> {
    let id = resolve_task_id(store, &args.id)?;
    let Some(current) = store.get_task(&id).cloned() else {
        return Err(Error::not_found("Task", &args.id));
    };
    let ws = store.week_start();

    let mut patch = TaskPatch {
        title: args.title,
        description: args.desc,
        category: args.category.as_deref().map(|c| resolve_category(store, c)).transpose()?,
        priority: args.priority.as_deref().map(|p| resolve_priority(store, p)).transpose()?,
        status: args.status.as_deref().map(|s| resolve_status(store, s)).transpose()?,
        due_date: args.due.as_deref().map(|d| parse_due(d, ws)).transpose()?,
        estimated_time: args.estimate.map(Some),
        actual_time: args.actual.map(Some),
        progress: args.progress.map(Some),
        ..Default::default()
    };

    if let Some(ident) = args.assignee.as_deref() {
        patch.assignee = Some(Some(resolve_member(store, ident)?.id));
    } else if args.clear_assignee {
        patch.assignee = Some(None);
    }

    if !args.add_tags.is_empty() || !args.rm_tags.is_empty() {
        let remove = split_and_normalise_tags(&args.rm_tags);
        let mut tags: Vec<String> = current.tags.iter().filter(|t| !remove.contains(t)).cloned().collect();
        for tag in split_and_normalise_tags(&args.add_tags) {
            if !tags.contains(&tag) {
                tags.push(tag);
            }
        }
        patch.tags = Some(tags);
    }

    if !args.add_subtasks.is_empty() || !args.check.is_empty() {
        let now = Utc::now();
        let mut subtasks = current.subtasks.clone();
        for ident in &args.check {
            let lower = ident.to_lowercase();
            let Some(s) = subtasks
                .iter_mut()
                .find(|s| s.id.starts_with(&lower) || s.title.to_lowercase() == lower)
            else {
                return Err(Error::not_found("Subtask", ident.as_str()));
            };
            s.completed = true;
        }
        subtasks.extend(args.add_subtasks.into_iter().map(|t| SubTask::new(t, false, now)));
        patch.subtasks = Some(subtasks);
    }

    if patch.is_empty() {
        println!("Nothing to update.");
        return Ok(());
    }
    store.update_task(&id, patch);
    println!("Updated {}", short_id(&id));
    Ok(())
}

pub fn cmd_toggle(store: &mut TaskStore, ident: &str) -> Result<()> {
    let id = resolve_task_id(store, ident)?;
    store.toggle_task_status(&id);
    match store.get_task(&id) {
        Some(t) => println!("{} is now {}", short_id(&id), t.status.name),
        None => println!("{} unchanged", short_id(&id)),
    }
    Ok(())
}

pub fn cmd_delete(store: &mut TaskStore, ident: &str) -> Result<()> {
    let id = resolve_task_id(store, ident)?;
    store.delete_task(&id);
    println!("Deleted {}", short_id(&id));
    Ok(())
}

// =========================================================================
// Derived views
// =========================================================================

pub fn cmd_stats(store: &TaskStore, json: bool) -> Result<()> {
    let stats = store.dashboard_stats();
    if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
        return Ok(());
    }
    println!("Total:          {}", stats.total_tasks);
    println!("Completed:      {} ({}%)", stats.completed_tasks, stats.completion_rate());
    println!("Overdue:        {}", stats.overdue_tasks);
    println!("Due today:      {}", stats.today_tasks);
    println!("Due this week:  {}", stats.this_week_tasks);
    println!("Avg completion: {:.0} min", stats.average_completion_time);
    println!("Productivity:   {}", stats.productivity_score);

    println!("\n{:<16} {}", "Category", "Count");
    for (name, count) in &stats.category_breakdown {
        println!("{:<16} {}", truncate(name, 16), count);
    }
    println!("\n{:<16} {}", "Priority", "Count");
    for (name, count) in &stats.priority_breakdown {
        println!("{:<16} {}", truncate(name, 16), count);
    }
    println!("\n{:<12} {:>9} {:>7} {:>6}", "Day", "Completed", "Created", "Ratio");
    for day in &stats.weekly_progress {
        println!(
            "{:<12} {:>9} {:>7} {:>5}%",
            day.date.format("%a %m-%d").to_string(),
            day.completed,
            day.created,
            day.ratio()
        );
    }
    Ok(())
}

pub fn cmd_agenda(store: &TaskStore) {
    let all: Vec<&Task> = store.tasks().iter().collect();
    let agenda = group_by_due(&all, Utc::now());
    for (label, tasks) in agenda.sections() {
        if tasks.is_empty() {
            continue;
        }
        println!("{label} ({})", tasks.len());
        for t in tasks {
            println!("  {:<9} {:<12} {}", short_id(&t.id), truncate(&t.status.name, 12), t.title);
        }
    }
}

/// Tasks placed on the calendar: all of them, or only those passing the
/// saved filters.
fn calendar_tasks(store: &TaskStore, active: bool) -> Vec<&Task> {
    if active {
        store.active_tasks()
    } else {
        store.tasks().iter().collect()
    }
}

pub fn cmd_calendar(store: &TaskStore, month: Option<String>, active: bool) -> Result<()> {
    let (year, month) = match month {
        Some(raw) => {
            let first = NaiveDate::parse_from_str(&format!("{raw}-01"), "%Y-%m-%d")
                .map_err(|_| Error::InvalidArgument(format!("expected YYYY-MM, got '{raw}'")))?;
            (first.year(), first.month())
        }
        None => {
            let today = Local::now().date_naive();
            (today.year(), today.month())
        }
    };
    let tasks = calendar_tasks(store, active);
    let Some(grid) = calendar_month(&tasks, year, month) else {
        return Err(Error::InvalidArgument(format!("invalid month {year}-{month:02}")));
    };

    println!("{year}-{month:02}");
    println!(" Sun  Mon  Tue  Wed  Thu  Fri  Sat");
    for week in grid.chunks(7) {
        let line: Vec<String> = week
            .iter()
            .map(|d| {
                if !d.in_month {
                    "    ".to_string()
                } else if d.tasks.is_empty() {
                    format!("{:>3} ", d.date.day())
                } else {
                    format!("{:>2}*{}", d.date.day(), d.tasks.len().min(9))
                }
            })
            .collect();
        println!("{}", line.join(" "));
    }
    Ok(())
}

// =========================================================================
// Lookup tables, team, filters, preferences
// =========================================================================

pub fn cmd_category(store: &mut TaskStore, action: CategoryAction) -> Result<()> {
    match action {
        CategoryAction::List => {
            println!("{:<9} {:<16} {:<8} {:<12} {}", "ID", "Name", "Color", "Icon", "Tasks");
            for c in store.categories() {
                println!(
                    "{:<9} {:<16} {:<8} {:<12} {}",
                    short_id(&c.id),
                    truncate(&c.name, 16),
                    c.color,
                    truncate(&c.icon, 12),
                    store.tasks_by_category(&c.id).len()
                );
            }
        }
        CategoryAction::Add { name, color, icon } => {
            let id = store.add_category(CategoryDraft { name, color, icon });
            println!("Added category {}", short_id(&id));
        }
        CategoryAction::Update { id, name, color, icon } => {
            let cat = resolve_category(store, &id)?;
            store.update_category(&cat.id, CategoryPatch { name, color, icon });
            println!("Updated category {}", short_id(&cat.id));
        }
        CategoryAction::Delete { id } => {
            let cat = resolve_category(store, &id)?;
            store.delete_category(&cat.id);
            println!("Deleted category {}", cat.name);
        }
    }
    Ok(())
}

pub fn cmd_team(store: &mut TaskStore, action: TeamAction) -> Result<()> {
    match action {
        TeamAction::List { json } => {
            if json {
                let rows: Vec<MemberStats> = store
                    .team_members()
                    .iter()
                    .map(|m| member_stats(store.tasks(), m))
                    .collect();
                println!("{}", serde_json::to_string_pretty(&rows)?);
                return Ok(());
            }
            println!("{:<9} {:<18} {:<18} {:>5} {:>5} {:>8}", "ID", "Name", "Role", "Tasks", "Done", "Avg min");
            for m in store.team_members() {
                let s = member_stats(store.tasks(), m);
                println!(
                    "{:<9} {:<18} {:<18} {:>5} {:>5} {:>8}",
                    short_id(&m.id),
                    truncate(&m.name, 18),
                    truncate(&m.role, 18),
                    s.total_tasks,
                    s.completed_tasks,
                    s.average_actual_time
                );
            }
        }
        TeamAction::Add { name, role, email, phone, department, avatar } => {
            let id = store.add_team_member(MemberDraft { name, role, email, phone, department, avatar });
            println!("Added team member {}", short_id(&id));
        }
        TeamAction::Update { id, name, role, email, phone, department } => {
            let member = resolve_member(store, &id)?;
            store.update_team_member(
                &member.id,
                MemberPatch {
                    name,
                    role,
                    email: email.map(Some),
                    phone: phone.map(Some),
                    department: department.map(Some),
                    avatar: None,
                },
            );
            println!("Updated team member {}", short_id(&member.id));
        }
        TeamAction::Delete { id } => {
            let member = resolve_member(store, &id)?;
            store.delete_team_member(&member.id);
            println!("Removed {}", member.name);
        }
    }
    Ok(())
}

pub fn cmd_filters(store: &mut TaskStore, args: FiltersArgs) -> Result<()> {
    let patch = if args.clear {
        FiltersPatch {
            status: Some(String::new()),
            priority: Some(String::new()),
            date_filter: Some(DateFilter::Any),
            search_query: Some(String::new()),
            category_id: Some(String::new()),
        }
    } else {
        FiltersPatch {
            status: args.status.as_deref().map(|s| resolve_status(store, s)).transpose()?.map(|s| s.id),
            priority: args.priority.as_deref().map(|p| resolve_priority(store, p)).transpose()?.map(|p| p.id),
            category_id: args.category.as_deref().map(|c| resolve_category(store, c)).transpose()?.map(|c| c.id),
            search_query: args.search,
            date_filter: args.date,
        }
    };
    store.set_filters(patch);
    let f = store.filters();
    println!(
        "status={} priority={} category={} search={:?} date={:?}",
        if f.status.is_empty() { "-" } else { f.status.as_str() },
        if f.priority.is_empty() { "-" } else { f.priority.as_str() },
        if f.category_id.is_empty() { "-" } else { f.category_id.as_str() },
        f.search_query,
        f.date_filter
    );
    Ok(())
}

pub fn cmd_init(store: &mut TaskStore, data_dir: &Path) -> Result<()> {
    if let Some(path) = Config::write_default_if_missing(data_dir)? {
        println!("Wrote {}", path.display());
    }
    let before = store.tasks().len();
    store.initialize_data();
    if before == 0 {
        println!("Loaded {} sample tasks", store.tasks().len());
    } else {
        println!("Store already has {before} task(s); nothing loaded");
    }
    Ok(())
}

pub fn cmd_dark_mode(prefs: &mut PreferenceStore, value: Option<Switch>) {
    match value {
        Some(Switch::On) => prefs.set_dark_mode(true),
        Some(Switch::Off) => prefs.set_dark_mode(false),
        Some(Switch::Toggle) => prefs.toggle_dark_mode(),
        None => {}
    }
    println!("Dark mode: {}", if prefs.dark_mode() { "on" } else { "off" });
}

/// Generate shell completion scripts.
pub fn cmd_completions(shell: Shell) {
    use clap::CommandFactory;
    use crate::cli::Cli;

    let mut app = Cli::command();
    let app_name = app.get_name().to_string();
    generate(shell, &mut app, app_name, &mut std::io::stdout());
}
