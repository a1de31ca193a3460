use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use chrono::{DateTime, Utc};
use utoipa::ToSchema;

pub const NOTIFY_TASK_UPDATE: &str = "task_update";
pub const NOTIFY_COMMENT: &str = "comment";

#[derive(Debug, Clone, FromRow, Serialize, Deserialize, ToSchema)]
pub struct Notification {
    pub id: i32,
    pub user_id: i32,
    pub title: String,
    pub message: String,
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub kind: String,
    pub created_at: DateTime<Utc>,
    pub read_at: Option<DateTime<Utc>>,
    pub related_task_id: Option<i32>,
    pub related_project_id: Option<i32>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct NotificationResponse {
    pub id: i32,
    pub title: String,
    pub message: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub created_at: DateTime<Utc>,
    pub read_at: Option<DateTime<Utc>>,
    pub related_task_id: Option<i32>,
    pub related_project_id: Option<i32>,
}

impl From<Notification> for NotificationResponse {
    fn from(n: Notification) -> Self {
        NotificationResponse {
            id: n.id,
            title: n.title,
            message: n.message,
            kind: n.kind,
            created_at: n.created_at,
            read_at: n.read_at,
            related_task_id: n.related_task_id,
            related_project_id: n.related_project_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_serializes_as_type() {
        let n = NotificationResponse {
            id: 1,
            title: "Task assigned".to_string(),
            message: "You have been assigned to 'T1'".to_string(),
            kind: NOTIFY_TASK_UPDATE.to_string(),
            created_at: Utc::now(),
            read_at: None,
            related_task_id: Some(4),
            related_project_id: None,
        };

        let json = serde_json::to_value(&n).unwrap();
        assert_eq!(json["type"], "task_update");
        assert!(json.get("kind").is_none());
    }
}
