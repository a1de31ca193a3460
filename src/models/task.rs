use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use utoipa::ToSchema;
use validator::Validate;

pub const TASK_STATUSES: [&str; 4] = ["todo", "in_progress", "review", "completed"];
pub const TASK_PRIORITIES: [&str; 3] = ["low", "medium", "high"];
pub const DEFAULT_STATUS: &str = "todo";
pub const DEFAULT_PRIORITY: &str = "medium";
pub const STATUS_COMPLETED: &str = "completed";

pub fn is_valid_status(status: &str) -> bool {
    TASK_STATUSES.contains(&status)
}

pub fn is_valid_priority(priority: &str) -> bool {
    TASK_PRIORITIES.contains(&priority)
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize, ToSchema)]
pub struct Task {
    pub id: i32,
    pub title: String,
    pub description: Option<String>,
    pub status: String,
    pub priority: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub due_date: Option<DateTime<Utc>>,
    pub start_date: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub estimated_hours: Option<f64>,
    pub actual_hours: Option<f64>,
    pub assigned_to_id: Option<i32>,
    pub creator_id: i32,
    pub project_id: i32,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TaskResponse {
    pub id: i32,
    pub title: String,
    pub description: Option<String>,
    pub status: String,
    pub priority: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub due_date: Option<DateTime<Utc>>,
    pub start_date: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub estimated_hours: Option<f64>,
    pub actual_hours: Option<f64>,
    pub assigned_to: Option<String>,
    pub creator: String,
    pub project_id: i32,
    pub project_name: String,
    pub tags: Vec<TagResponse>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateTaskRequest {
    #[validate(length(min = 1, max = 100, message = "task title must be 1-100 characters"))]
    pub title: String,
    pub description: Option<String>,
    pub status: Option<String>,
    pub priority: Option<String>,
    pub due_date: Option<DateTime<Utc>>,
    pub start_date: Option<DateTime<Utc>>,
    pub estimated_hours: Option<f64>,
    pub assigned_to_id: Option<i32>,
    pub project_id: i32,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateTaskRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
    pub priority: Option<String>,
    pub due_date: Option<DateTime<Utc>>,
    pub start_date: Option<DateTime<Utc>>,
    pub estimated_hours: Option<f64>,
    pub actual_hours: Option<f64>,
    pub assigned_to_id: Option<i32>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TaskMetricsResponse {
    pub total_tasks: i64,
    pub status_counts: HashMap<String, i64>,
    pub avg_estimated_hours: Option<f64>,
    pub avg_actual_hours: Option<f64>,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize, ToSchema)]
pub struct TaskTag {
    pub id: i32,
    pub name: String,
    pub color: String,
    pub task_id: i32,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TagResponse {
    pub id: i32,
    pub name: String,
    pub color: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateTagRequest {
    #[validate(length(min = 1, max = 50, message = "tag name must be 1-50 characters"))]
    pub name: String,
    pub color: Option<String>,
}

/// Hex color in `#rrggbb` form.
pub fn is_valid_tag_color(color: &str) -> bool {
    color.len() == 7
        && color.starts_with('#')
        && color[1..].chars().all(|c| c.is_ascii_hexdigit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_and_priority_lists_accept_known_values() {
        assert!(is_valid_status("todo"));
        assert!(is_valid_status("in_progress"));
        assert!(is_valid_status("review"));
        assert!(is_valid_status("completed"));
        assert!(!is_valid_status("done"));

        assert!(is_valid_priority("low"));
        assert!(is_valid_priority("high"));
        assert!(!is_valid_priority("urgent"));
    }

    #[test]
    fn update_request_only_carries_supplied_fields() {
        let req: UpdateTaskRequest = serde_json::from_str(r#"{"status":"review"}"#).unwrap();
        assert_eq!(req.status.as_deref(), Some("review"));
        assert!(req.title.is_none());
        assert!(req.priority.is_none());
        assert!(req.assigned_to_id.is_none());
    }

    #[test]
    fn create_request_requires_only_title_and_project() {
        let req: CreateTaskRequest =
            serde_json::from_str(r#"{"title":"T1","project_id":3}"#).unwrap();
        assert!(req.validate().is_ok());
        assert!(req.status.is_none());
        assert!(req.assigned_to_id.is_none());
    }

    #[test]
    fn tag_colors_are_hex_checked() {
        assert!(is_valid_tag_color("#00ff00"));
        assert!(is_valid_tag_color("#ABCDEF"));
        assert!(!is_valid_tag_color("00ff00"));
        assert!(!is_valid_tag_color("#00ff0"));
        assert!(!is_valid_tag_color("#00gg00"));
    }
}
