//! Task board records, status transitions and reminder scheduling.

use super::normalize_optional;
use chrono::{DateTime, Duration, Months, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use uuid::Uuid;

/// Kanban column a task sits in.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum TaskStatus {
    #[default]
    Todo,
    InProgress,
    Review,
    Done,
}

impl TaskStatus {
    /// Board columns, left to right.
    pub const ALL: [TaskStatus; 4] = [
        TaskStatus::Todo,
        TaskStatus::InProgress,
        TaskStatus::Review,
        TaskStatus::Done,
    ];

    /// Status after a checkbox toggle: anything open becomes done, done reopens.
    pub fn toggled(self) -> Self {
        match self {
            TaskStatus::Done => TaskStatus::Todo,
            _ => TaskStatus::Done,
        }
    }

    /// Column heading.
    pub fn label(self) -> &'static str {
        match self {
            TaskStatus::Todo => "Todo",
            TaskStatus::InProgress => "In Progress",
            TaskStatus::Review => "Review",
            TaskStatus::Done => "Done",
        }
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

/// How often an open task re-surfaces as a reminder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ReminderInterval {
    Daily,
    Weekly,
    Biweekly,
    Monthly,
}

impl ReminderInterval {
    /// Next reminder time strictly after `from`.
    pub fn next_after(self, from: DateTime<Utc>) -> DateTime<Utc> {
        match self {
            ReminderInterval::Daily => from + Duration::days(1),
            ReminderInterval::Weekly => from + Duration::days(7),
            ReminderInterval::Biweekly => from + Duration::days(14),
            ReminderInterval::Monthly => from
                .checked_add_months(Months::new(1))
                .unwrap_or_else(|| from + Duration::days(30)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub owner_id: String,
    pub title: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    pub priority: Priority,
    pub assignee: Option<String>,
    pub due_date: Option<NaiveDate>,
    pub reminder: Option<ReminderInterval>,
    pub next_reminder_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request payload for creating a task.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateTaskRequest {
    pub title: String,
    pub description: Option<String>,
    pub status: Option<TaskStatus>,
    pub priority: Option<Priority>,
    pub assignee: Option<String>,
    pub due_date: Option<NaiveDate>,
    pub reminder: Option<ReminderInterval>,
}

/// Partial task update.
///
/// `description` and `assignee` use an empty string to clear the value; the
/// due date and reminder have explicit clear flags because they are not text.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<TaskStatus>,
    pub priority: Option<Priority>,
    pub assignee: Option<String>,
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub clear_due_date: bool,
    pub reminder: Option<ReminderInterval>,
    #[serde(default)]
    pub clear_reminder: bool,
}

impl TaskPatch {
    pub fn status(status: TaskStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    pub fn reminder(reminder: Option<ReminderInterval>) -> Self {
        Self {
            reminder,
            clear_reminder: reminder.is_none(),
            ..Self::default()
        }
    }

    /// Apply the patch in place and recompute derived fields.
    pub fn apply_to(&self, task: &mut Task, now: DateTime<Utc>) {
        if let Some(title) = &self.title {
            task.title = title.trim().to_string();
        }
        if let Some(description) = &self.description {
            task.description = normalize_optional(Some(description.clone()));
        }
        if let Some(priority) = self.priority {
            task.priority = priority;
        }
        if let Some(assignee) = &self.assignee {
            task.assignee = normalize_optional(Some(assignee.clone()));
        }
        if self.clear_due_date {
            task.due_date = None;
        } else if let Some(due) = self.due_date {
            task.due_date = Some(due);
        }

        let mut reschedule = false;
        if self.clear_reminder {
            task.reminder = None;
            reschedule = true;
        } else if let Some(reminder) = self.reminder {
            task.reminder = Some(reminder);
            reschedule = true;
        }
        if let Some(status) = self.status {
            if status != task.status {
                task.completed_at = (status == TaskStatus::Done).then_some(now);
                task.status = status;
                reschedule = true;
            }
        }
        if reschedule {
            task.schedule_reminder(now);
        }
        task.updated_at = now;
    }
}

impl Task {
    /// Build a task row from a create request.
    pub fn from_request(owner_id: &str, request: &CreateTaskRequest, now: DateTime<Utc>) -> Self {
        let status = request.status.unwrap_or_default();
        let mut task = Self {
            id: Uuid::new_v4().to_string(),
            owner_id: owner_id.to_string(),
            title: request.title.trim().to_string(),
            description: normalize_optional(request.description.clone()),
            status,
            priority: request.priority.unwrap_or_default(),
            assignee: normalize_optional(request.assignee.clone()),
            due_date: request.due_date,
            reminder: request.reminder,
            next_reminder_at: None,
            completed_at: (status == TaskStatus::Done).then_some(now),
            created_at: now,
            updated_at: now,
        };
        task.schedule_reminder(now);
        task
    }

    /// Unsaved task used as an optimistic placeholder.
    pub fn draft(request: &CreateTaskRequest) -> Self {
        let mut task = Self::from_request("", request, Utc::now());
        task.id = String::new();
        task
    }

    /// Recompute `next_reminder_at`; done tasks never remind.
    pub fn schedule_reminder(&mut self, now: DateTime<Utc>) {
        self.next_reminder_at = match (self.reminder, self.status) {
            (Some(_), TaskStatus::Done) | (None, _) => None,
            (Some(interval), _) => Some(interval.next_after(now)),
        };
    }

    /// `true` when a reminder is due at `now`.
    pub fn reminder_due(&self, now: DateTime<Utc>) -> bool {
        self.next_reminder_at.map(|at| at <= now).unwrap_or(false)
    }
}
