//! Built-in sample data for a first run.

use chrono::{DateTime, Duration, Utc};

use crate::fields::{default_categories, default_priorities, default_statuses};
use crate::task::{MemberDraft, SubTask, TaskDraft, TeamMember};

/// The three team members a fresh store starts with.
pub fn default_team_members(now: DateTime<Utc>) -> Vec<TeamMember> {
    let members = [
        ("Sarah Johnson", "Project Manager", "sarah.johnson@company.com", "+1-555-0123", "Management",
         "https://images.unsplash.com/photo-1494790108755-2616b612b786?w=150&h=150&fit=crop&crop=face"),
        ("Michael Chen", "Senior Developer", "michael.chen@company.com", "+1-555-0124", "Engineering",
         "https://images.unsplash.com/photo-1507003211169-0a1dd7228f2d?w=150&h=150&fit=crop&crop=face"),
        ("Emily Rodriguez", "UX Designer", "emily.rodriguez@company.com", "+1-555-0125", "Design",
         "https://images.unsplash.com/photo-1438761681033-6461ffad8d80?w=150&h=150&fit=crop&crop=face"),
    ];
    members
        .into_iter()
        .map(|(name, role, email, phone, department, avatar)| {
            TeamMember::from_draft(
                MemberDraft {
                    name: name.into(),
                    role: role.into(),
                    email: Some(email.into()),
                    phone: Some(phone.into()),
                    department: Some(department.into()),
                    avatar: Some(avatar.into()),
                },
                now,
            )
        })
        .collect()
}

fn tags(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

/// Sample tasks with due dates relative to `now`.
pub fn sample_tasks(now: DateTime<Utc>) -> Vec<TaskDraft> {
    let categories = default_categories();
    let priorities = default_priorities();
    let statuses = default_statuses();

    let mut report = TaskDraft::new(
        "Complete quarterly report",
        categories[0].clone(),
        priorities[3].clone(),
        statuses[1].clone(),
        now + Duration::days(3),
    );
    report.description = "Prepare and submit Q4 financial report to stakeholders".into();
    report.tags = tags(&["finance", "quarterly", "stakeholders"]);
    report.estimated_time = Some(240);
    report.actual_time = Some(180);
    report.progress = Some(65);
    report.subtasks = vec![
        SubTask::new("Gather financial data", true, now),
        SubTask::new("Analyze trends", true, now),
        SubTask::new("Create visualizations", false, now),
        SubTask::new("Write executive summary", false, now),
    ];

    let mut workout = TaskDraft::new(
        "Morning workout routine",
        categories[2].clone(),
        priorities[2].clone(),
        statuses[0].clone(),
        now,
    );
    workout.description = "Daily 45-minute workout including cardio and strength training".into();
    workout.tags = tags(&["fitness", "daily", "health"]);
    workout.estimated_time = Some(45);
    workout.progress = Some(0);

    let mut study = TaskDraft::new(
        "Learn React Advanced Patterns",
        categories[3].clone(),
        priorities[2].clone(),
        statuses[1].clone(),
        now + Duration::days(7),
    );
    study.description =
        "Study advanced React patterns including hooks, context, and performance optimization".into();
    study.tags = tags(&["react", "programming", "learning"]);
    study.estimated_time = Some(300);
    study.actual_time = Some(120);
    study.progress = Some(40);

    let mut trip = TaskDraft::new(
        "Plan weekend trip",
        categories[1].clone(),
        priorities[1].clone(),
        statuses[0].clone(),
        now + Duration::days(5),
    );
    trip.description = "Research and book accommodations for weekend getaway".into();
    trip.tags = tags(&["travel", "planning", "weekend"]);
    trip.estimated_time = Some(90);
    trip.progress = Some(10);

    let mut portfolio = TaskDraft::new(
        "Review investment portfolio",
        categories[4].clone(),
        priorities[3].clone(),
        statuses[2].clone(),
        now + Duration::days(2),
    );
    portfolio.description = "Quarterly review of investment performance and rebalancing".into();
    portfolio.tags = tags(&["investments", "quarterly", "finance"]);
    portfolio.estimated_time = Some(120);
    portfolio.actual_time = Some(90);
    portfolio.progress = Some(85);

    vec![report, workout, study, trip, portfolio]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_tasks() {
        let now = Utc::now();
        let drafts = sample_tasks(now);
        assert_eq!(drafts.len(), 5);
        assert_eq!(drafts[0].subtasks.len(), 4);
        assert!(drafts.iter().all(|d| d.due_date >= now));
        assert!(drafts.iter().all(|d| d.assignee.is_none()));
    }

    #[test]
    fn test_default_members_have_distinct_ids() {
        let members = default_team_members(Utc::now());
        assert_eq!(members.len(), 3);
        assert_ne!(members[0].id, members[1].id);
        assert_eq!(members[1].department.as_deref(), Some("Engineering"));
    }
}
