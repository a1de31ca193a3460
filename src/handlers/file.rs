use actix_multipart::Multipart;
use actix_web::{web, HttpRequest, HttpResponse, Result};
use futures_util::TryStreamExt;
use sqlx::Row;
use std::io::Write;
use std::path::{Path, PathBuf};
use uuid::Uuid;

use crate::auth::AuthService;
use crate::config::AppConfig;
use crate::database::Database;
use crate::handlers::task::ensure_task_access;
use crate::models::auth::ApiResponse;
use crate::models::file::{AttachmentResponse, TaskAttachment, UploadFileRequest, UploadResponse};
use crate::utils::errors::ServiceError;

// Max file size: 10MB
const MAX_FILE_SIZE: usize = 10 * 1024 * 1024;

// Helper function to ensure the upload directory exists
fn ensure_upload_dir(upload_dir: &str) -> Result<PathBuf, ServiceError> {
    let upload_dir = Path::new(upload_dir);
    if !upload_dir.exists() {
        std::fs::create_dir_all(upload_dir).map_err(|e| {
            log::error!("Failed to create upload directory: {}", e);
            ServiceError::InternalError("Failed to create upload directory".to_string())
        })?;
    }
    Ok(upload_dir.to_path_buf())
}

// Helper function to validate file type and size
fn validate_file(file_name: &str, file_size: usize) -> Result<String, ServiceError> {
    if file_size > MAX_FILE_SIZE {
        return Err(ServiceError::ValidationError(
            "File size exceeds 10MB limit".to_string(),
        ));
    }

    // Allowed file extensions
    let allowed_extensions = [
        "jpg", "jpeg", "png", "gif", "pdf", "doc", "docx",
        "txt", "zip", "json", "xml", "csv", "xlsx",
    ];

    let extension = Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_lowercase())
        .unwrap_or_default();

    if !allowed_extensions.contains(&extension.as_str()) {
        return Err(ServiceError::ValidationError(format!(
            "File type '{}' not allowed",
            extension
        )));
    }

    // Determine MIME type based on extension
    let mime_type = match extension.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "pdf" => "application/pdf",
        "doc" => "application/msword",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        "txt" => "text/plain",
        "zip" => "application/zip",
        "json" => "application/json",
        "xml" => "application/xml",
        "csv" => "text/csv",
        "xlsx" => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        _ => "application/octet-stream",
    };

    Ok(mime_type.to_string())
}

fn attachment_from_row(row: &sqlx::postgres::PgRow) -> AttachmentResponse {
    let task_id: i32 = row.get("task_id");
    let id: i32 = row.get("id");

    AttachmentResponse {
        id,
        task_id,
        filename: row.get("filename"),
        original_name: row.get("original_name"),
        file_size: row.get("file_size"),
        mime_type: row.get("mime_type"),
        uploaded_by: row.get("uploaded_by"),
        download_url: format!("/api/tasks/{}/attachments/{}/download", task_id, id),
        created_at: row.get("created_at"),
    }
}

/// Upload a file attachment to a task
#[utoipa::path(
    post,
    path = "/api/tasks/{task_id}/attachments",
    tag = "attachments",
    security(("bearer_auth" = [])),
    params(("task_id" = i32, Path, description = "Task ID to attach file to")),
    request_body(
        content = inline(UploadFileRequest),
        description = "File to upload as multipart/form-data",
        content_type = "multipart/form-data"
    ),
    responses(
        (status = 201, description = "File uploaded successfully", body = ApiResponse<UploadResponse>),
        (status = 400, description = "Validation error", body = crate::utils::errors::ServiceError),
        (status = 404, description = "Task not found", body = crate::utils::errors::ServiceError)
    )
)]
pub async fn upload_attachment(
    req: HttpRequest,
    db: web::Data<Database>,
    auth: web::Data<AuthService>,
    config: web::Data<AppConfig>,
    path: web::Path<i32>,
    mut payload: Multipart,
) -> Result<HttpResponse, ServiceError> {
    let task_id = path.into_inner();
    log::info!("POST /api/tasks/{}/attachments - Uploading file", task_id);

    let user = auth.current_user(&req, &db).await?;
    ensure_task_access(&db, &user, task_id).await?;

    let upload_dir = ensure_upload_dir(&config.upload_dir)?;

    // Process multipart upload
    while let Some(mut field) = payload.try_next().await.map_err(|e| {
        log::error!("Multipart error: {}", e);
        ServiceError::ValidationError("Invalid multipart data".to_string())
    })? {
        let content_disposition = field.content_disposition();

        if let Some(file_name) = content_disposition.and_then(|cd| cd.get_filename()) {
            log::info!("Processing file: {}", file_name);

            let file_name = file_name.to_string();

            // Generate unique file name
            let file_id = Uuid::new_v4();
            let extension = Path::new(&file_name)
                .extension()
                .and_then(|ext| ext.to_str())
                .unwrap_or("bin");
            let stored_file_name = format!("{}_{}.{}", task_id, file_id, extension);
            let file_path = upload_dir.join(&stored_file_name);

            // Collect file data; the size check runs during the upload so an
            // oversized body never fully buffers.
            let mut file_data = Vec::new();
            while let Some(chunk) = field.try_next().await.map_err(|e| {
                log::error!("File chunk error: {}", e);
                ServiceError::ValidationError("Error reading file data".to_string())
            })? {
                file_data.extend_from_slice(&chunk);
                if file_data.len() > MAX_FILE_SIZE {
                    return Err(ServiceError::ValidationError(
                        "File size exceeds 10MB limit".to_string(),
                    ));
                }
            }

            let file_size = file_data.len();
            let mime_type = validate_file(&file_name, file_size)?;

            // Write file to disk
            let mut file = std::fs::File::create(&file_path).map_err(|e| {
                log::error!("Failed to create file: {}", e);
                ServiceError::InternalError("Failed to save file".to_string())
            })?;

            file.write_all(&file_data).map_err(|e| {
                log::error!("Failed to write file: {}", e);
                ServiceError::InternalError("Failed to save file".to_string())
            })?;

            // Save file info to database
            let attachment = sqlx::query_as::<_, TaskAttachment>(
                "INSERT INTO task_attachments (filename, original_name, file_path, file_size,
                                               mime_type, task_id, uploaded_by)
                 VALUES ($1, $2, $3, $4, $5, $6, $7)
                 RETURNING id, filename, original_name, file_path, file_size, mime_type,
                           created_at, task_id, uploaded_by",
            )
            .bind(&stored_file_name)
            .bind(&file_name)
            .bind(file_path.to_string_lossy().to_string())
            .bind(file_size as i64)
            .bind(&mime_type)
            .bind(task_id)
            .bind(user.id)
            .fetch_one(&db.pool)
            .await
            .map_err(|e| {
                log::error!("Database error saving attachment: {}", e);
                // Clean up file if database insert fails
                let _ = std::fs::remove_file(&file_path);
                ServiceError::DatabaseError("Failed to save attachment info".to_string())
            })?;

            let upload_response = UploadResponse {
                attachment: AttachmentResponse::from(attachment),
                message: "File uploaded successfully".to_string(),
            };

            log::info!(
                "File uploaded successfully: {} ({})",
                &file_name,
                stored_file_name
            );
            return Ok(HttpResponse::Created().json(ApiResponse::success(
                "File uploaded successfully",
                upload_response,
            )));
        }
    }

    Err(ServiceError::ValidationError(
        "No file found in request".to_string(),
    ))
}

/// Get all attachments for a task
#[utoipa::path(
    get,
    path = "/api/tasks/{task_id}/attachments",
    tag = "attachments",
    security(("bearer_auth" = [])),
    params(("task_id" = i32, Path, description = "Task ID")),
    responses(
        (status = 200, description = "Attachments retrieved successfully", body = ApiResponse<Vec<AttachmentResponse>>),
        (status = 404, description = "Task not found", body = crate::utils::errors::ServiceError)
    )
)]
pub async fn get_task_attachments(
    req: HttpRequest,
    db: web::Data<Database>,
    auth: web::Data<AuthService>,
    path: web::Path<i32>,
) -> Result<HttpResponse, ServiceError> {
    let task_id = path.into_inner();
    log::info!("GET /api/tasks/{}/attachments", task_id);

    let user = auth.current_user(&req, &db).await?;
    ensure_task_access(&db, &user, task_id).await?;

    let rows = sqlx::query(
        "SELECT id, filename, original_name, file_size, mime_type, task_id, uploaded_by, created_at
         FROM task_attachments WHERE task_id = $1 ORDER BY created_at DESC",
    )
    .bind(task_id)
    .fetch_all(&db.pool)
    .await
    .map_err(|e| {
        log::error!("Database error fetching attachments: {}", e);
        ServiceError::DatabaseError("Failed to fetch attachments".to_string())
    })?;

    let attachments: Vec<AttachmentResponse> = rows.iter().map(attachment_from_row).collect();

    log::info!(
        "Retrieved {} attachments for task {}",
        attachments.len(),
        task_id
    );
    Ok(HttpResponse::Ok().json(ApiResponse::success(
        "Attachments retrieved successfully",
        attachments,
    )))
}

/// Download a file attachment
#[utoipa::path(
    get,
    path = "/api/tasks/{task_id}/attachments/{attachment_id}/download",
    tag = "attachments",
    security(("bearer_auth" = [])),
    params(
        ("task_id" = i32, Path, description = "Task ID"),
        ("attachment_id" = i32, Path, description = "Attachment ID")
    ),
    responses(
        (status = 200, description = "File download", content_type = "application/octet-stream"),
        (status = 404, description = "File not found", body = crate::utils::errors::ServiceError)
    )
)]
pub async fn download_attachment(
    req: HttpRequest,
    db: web::Data<Database>,
    auth: web::Data<AuthService>,
    path: web::Path<(i32, i32)>,
) -> Result<HttpResponse, ServiceError> {
    let (task_id, attachment_id) = path.into_inner();
    log::info!(
        "GET /api/tasks/{}/attachments/{}/download",
        task_id,
        attachment_id
    );

    let user = auth.current_user(&req, &db).await?;
    ensure_task_access(&db, &user, task_id).await?;

    let attachment_row = sqlx::query(
        "SELECT file_path, original_name, mime_type
         FROM task_attachments
         WHERE id = $1 AND task_id = $2",
    )
    .bind(attachment_id)
    .bind(task_id)
    .fetch_optional(&db.pool)
    .await
    .map_err(|e| {
        log::error!("Database error fetching attachment: {}", e);
        ServiceError::DatabaseError("Failed to fetch attachment".to_string())
    })?;

    let attachment_row = match attachment_row {
        Some(row) => row,
        None => {
            log::warn!(
                "Attachment not found: {} for task {}",
                attachment_id,
                task_id
            );
            return Err(ServiceError::NotFound("Attachment not found".to_string()));
        }
    };

    let file_path: String = attachment_row.get("file_path");
    let original_name: String = attachment_row.get("original_name");
    let mime_type: String = attachment_row.get("mime_type");

    if !Path::new(&file_path).exists() {
        log::error!("File not found on disk: {}", file_path);
        return Err(ServiceError::NotFound("File not found on disk".to_string()));
    }

    let file_data = std::fs::read(&file_path).map_err(|e| {
        log::error!("Failed to read file {}: {}", file_path, e);
        ServiceError::InternalError("Failed to read file".to_string())
    })?;

    let content_type = mime_type
        .parse::<mime::Mime>()
        .unwrap_or(mime::APPLICATION_OCTET_STREAM);

    log::info!("File downloaded: {} ({} bytes)", original_name, file_data.len());

    Ok(HttpResponse::Ok()
        .content_type(content_type)
        .insert_header((
            "Content-Disposition",
            format!("attachment; filename=\"{}\"", original_name),
        ))
        .body(file_data))
}

/// Delete a file attachment
#[utoipa::path(
    delete,
    path = "/api/tasks/{task_id}/attachments/{attachment_id}",
    tag = "attachments",
    security(("bearer_auth" = [])),
    params(
        ("task_id" = i32, Path, description = "Task ID"),
        ("attachment_id" = i32, Path, description = "Attachment ID")
    ),
    responses(
        (status = 200, description = "Attachment deleted successfully", body = ApiResponse<bool>),
        (status = 404, description = "Attachment not found", body = crate::utils::errors::ServiceError)
    )
)]
pub async fn delete_attachment(
    req: HttpRequest,
    db: web::Data<Database>,
    auth: web::Data<AuthService>,
    path: web::Path<(i32, i32)>,
) -> Result<HttpResponse, ServiceError> {
    let (task_id, attachment_id) = path.into_inner();
    log::info!("DELETE /api/tasks/{}/attachments/{}", task_id, attachment_id);

    let user = auth.current_user(&req, &db).await?;
    ensure_task_access(&db, &user, task_id).await?;

    // Get attachment info before deletion (to clean up the file)
    let attachment_row = sqlx::query(
        "SELECT file_path FROM task_attachments WHERE id = $1 AND task_id = $2",
    )
    .bind(attachment_id)
    .bind(task_id)
    .fetch_optional(&db.pool)
    .await
    .map_err(|e| {
        log::error!("Database error fetching attachment: {}", e);
        ServiceError::DatabaseError("Failed to fetch attachment".to_string())
    })?;

    let file_path = match attachment_row {
        Some(row) => row.get::<String, _>("file_path"),
        None => {
            return Err(ServiceError::NotFound("Attachment not found".to_string()));
        }
    };

    let result = sqlx::query("DELETE FROM task_attachments WHERE id = $1 AND task_id = $2")
        .bind(attachment_id)
        .bind(task_id)
        .execute(&db.pool)
        .await
        .map_err(|e| {
            log::error!("Database error deleting attachment: {}", e);
            ServiceError::DatabaseError("Failed to delete attachment".to_string())
        })?;

    if result.rows_affected() == 0 {
        return Err(ServiceError::NotFound("Attachment not found".to_string()));
    }

    // File cleanup failure is logged, not fatal; the row is already gone.
    if Path::new(&file_path).exists() {
        if let Err(e) = std::fs::remove_file(&file_path) {
            log::warn!("Failed to delete file {}: {}", file_path, e);
        }
    }

    log::info!("Attachment deleted successfully: {}", attachment_id);
    Ok(HttpResponse::Ok().json(ApiResponse::success(
        "Attachment deleted successfully",
        true,
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn oversized_files_are_rejected() {
        let err = validate_file("report.pdf", MAX_FILE_SIZE + 1).unwrap_err();
        assert!(matches!(err, ServiceError::ValidationError(_)));
    }

    #[test]
    fn disallowed_extensions_are_rejected() {
        assert!(validate_file("malware.exe", 100).is_err());
        assert!(validate_file("noextension", 100).is_err());
    }

    #[test]
    fn known_extensions_map_to_mime_types() {
        assert_eq!(validate_file("photo.JPG", 100).unwrap(), "image/jpeg");
        assert_eq!(validate_file("data.json", 100).unwrap(), "application/json");
        assert_eq!(validate_file("notes.txt", 100).unwrap(), "text/plain");
    }
}
