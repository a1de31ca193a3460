use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use chrono::{DateTime, Utc};
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Clone, FromRow, Serialize, Deserialize, ToSchema)]
pub struct Project {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub deadline: Option<DateTime<Utc>>,
    pub status: String,
    pub creator_id: i32,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProjectResponse {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub deadline: Option<DateTime<Utc>>,
    pub status: String,
    pub creator: String,
    pub task_count: i64,
}

/// Trimmed task payload embedded in the single-project response.
#[derive(Debug, Serialize, ToSchema)]
pub struct ProjectTaskSummary {
    pub id: i32,
    pub title: String,
    pub description: Option<String>,
    pub status: String,
    pub priority: String,
    pub due_date: Option<DateTime<Utc>>,
    pub assigned_to: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProjectDetailResponse {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub deadline: Option<DateTime<Utc>>,
    pub status: String,
    pub creator: String,
    pub tasks: Vec<ProjectTaskSummary>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateProjectRequest {
    #[validate(length(min = 1, max = 100, message = "project name must be 1-100 characters"))]
    pub name: String,
    pub description: Option<String>,
    pub deadline: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateProjectRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub deadline: Option<DateTime<Utc>>,
    pub status: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProjectMemberResponse {
    pub id: i32,
    pub user_id: i32,
    pub username: String,
    pub role: String,
    pub joined_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct AddMemberRequest {
    pub user_id: i32,
    pub role: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_request_fields_default_to_absent() {
        let req: UpdateProjectRequest = serde_json::from_str(r#"{"name":"Renamed"}"#).unwrap();
        assert_eq!(req.name.as_deref(), Some("Renamed"));
        assert!(req.description.is_none());
        assert!(req.deadline.is_none());
        assert!(req.status.is_none());
    }

    #[test]
    fn create_request_parses_rfc3339_deadline() {
        let req: CreateProjectRequest = serde_json::from_str(
            r#"{"name":"P1","deadline":"2026-09-01T00:00:00Z"}"#,
        )
        .unwrap();
        assert!(req.deadline.is_some());
    }
}
