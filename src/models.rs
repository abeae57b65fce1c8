// Canonical status and priority members with their rank tables

use std::fmt;

/// Lower-cased status key with `-`/`_` read as spaces ("on-hold" == "On Hold")
pub fn status_key(s: &str) -> String {
    s.trim()
        .to_lowercase()
        .chars()
        .map(|c| if c == '-' || c == '_' { ' ' } else { c })
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Priority of a task or project
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Priority {
    High,
    Medium,
    Low,
    Unknown,
}

impl Priority {
    pub fn parse(s: &str) -> Self {
        match status_key(s).as_str() {
            "high" => Priority::High,
            "medium" => Priority::Medium,
            "low" => Priority::Low,
            _ => Priority::Unknown,
        }
    }

    /// Domain order: High sorts before Medium before Low before anything else
    pub fn rank(self) -> u8 {
        match self {
            Priority::High => 1,
            Priority::Medium => 2,
            Priority::Low => 3,
            Priority::Unknown => 4,
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Priority::High => write!(f, "High"),
            Priority::Medium => write!(f, "Medium"),
            Priority::Low => write!(f, "Low"),
            Priority::Unknown => write!(f, "Unknown"),
        }
    }
}

/// Task status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskStatus {
    ToDo,
    InProgress,
    Overdue,
    Completed,
    Unknown,
}

impl TaskStatus {
    pub fn parse(s: &str) -> Self {
        match status_key(s).as_str() {
            "to do" | "todo" => TaskStatus::ToDo,
            "in progress" => TaskStatus::InProgress,
            "overdue" => TaskStatus::Overdue,
            "completed" => TaskStatus::Completed,
            _ => TaskStatus::Unknown,
        }
    }

    pub fn rank(self) -> u8 {
        match self {
            TaskStatus::ToDo => 1,
            TaskStatus::InProgress => 2,
            TaskStatus::Overdue => 3,
            TaskStatus::Completed => 4,
            TaskStatus::Unknown => 5,
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskStatus::ToDo => write!(f, "To Do"),
            TaskStatus::InProgress => write!(f, "In Progress"),
            TaskStatus::Overdue => write!(f, "Overdue"),
            TaskStatus::Completed => write!(f, "Completed"),
            TaskStatus::Unknown => write!(f, "Unknown"),
        }
    }
}

/// Project status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectStatus {
    Planning,
    Active,
    OnHold,
    Completed,
    Unknown,
}

impl ProjectStatus {
    pub fn parse(s: &str) -> Self {
        match status_key(s).as_str() {
            "planning" => ProjectStatus::Planning,
            "active" => ProjectStatus::Active,
            "on hold" => ProjectStatus::OnHold,
            "completed" => ProjectStatus::Completed,
            _ => ProjectStatus::Unknown,
        }
    }

    pub fn rank(self) -> u8 {
        match self {
            ProjectStatus::Planning => 1,
            ProjectStatus::Active => 2,
            ProjectStatus::OnHold => 3,
            ProjectStatus::Completed => 4,
            ProjectStatus::Unknown => 5,
        }
    }
}

impl fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProjectStatus::Planning => write!(f, "Planning"),
            ProjectStatus::Active => write!(f, "Active"),
            ProjectStatus::OnHold => write!(f, "On Hold"),
            ProjectStatus::Completed => write!(f, "Completed"),
            ProjectStatus::Unknown => write!(f, "Unknown"),
        }
    }
}
