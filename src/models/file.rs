use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use chrono::{DateTime, Utc};
use utoipa::ToSchema;

#[derive(Debug, Clone, FromRow, Serialize, Deserialize, ToSchema)]
pub struct TaskAttachment {
    pub id: i32,
    pub filename: String,
    pub original_name: String,
    pub file_path: String,
    pub file_size: i64,
    pub mime_type: String,
    pub created_at: DateTime<Utc>,
    pub task_id: i32,
    pub uploaded_by: i32,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AttachmentResponse {
    pub id: i32,
    pub task_id: i32,
    pub filename: String,
    pub original_name: String,
    pub file_size: i64,
    pub mime_type: String,
    pub uploaded_by: i32,
    pub download_url: String,
    pub created_at: DateTime<Utc>,
}

impl From<TaskAttachment> for AttachmentResponse {
    fn from(attachment: TaskAttachment) -> Self {
        let download_url = format!(
            "/api/tasks/{}/attachments/{}/download",
            attachment.task_id, attachment.id
        );
        AttachmentResponse {
            id: attachment.id,
            task_id: attachment.task_id,
            filename: attachment.filename,
            original_name: attachment.original_name,
            file_size: attachment.file_size,
            mime_type: attachment.mime_type,
            uploaded_by: attachment.uploaded_by,
            download_url,
            created_at: attachment.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UploadResponse {
    pub attachment: AttachmentResponse,
    pub message: String,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct UploadFileRequest {
    #[schema(format = "binary")]
    pub file: String,
}
