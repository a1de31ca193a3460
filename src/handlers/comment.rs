use actix_web::{web, HttpRequest, HttpResponse, Result};
use sqlx::Row;
use validator::Validate;

use crate::auth::AuthService;
use crate::database::Database;
use crate::handlers::notification::push_notification;
use crate::handlers::task::ensure_task_access;
use crate::models::auth::ApiResponse;
use crate::models::comment::{Comment, CommentResponse, CreateCommentRequest};
use crate::models::notification::NOTIFY_COMMENT;
use crate::utils::errors::ServiceError;

/// List the comments on a task
#[utoipa::path(
    get,
    path = "/api/tasks/{task_id}/comments",
    tag = "comments",
    security(("bearer_auth" = [])),
    params(("task_id" = i32, Path, description = "Task ID")),
    responses(
        (status = 200, description = "Comments retrieved successfully", body = ApiResponse<Vec<CommentResponse>>),
        (status = 403, description = "Forbidden", body = crate::utils::errors::ServiceError),
        (status = 404, description = "Task not found", body = crate::utils::errors::ServiceError)
    )
)]
pub async fn get_task_comments(
    req: HttpRequest,
    db: web::Data<Database>,
    auth: web::Data<AuthService>,
    path: web::Path<i32>,
) -> Result<HttpResponse, ServiceError> {
    let task_id = path.into_inner();
    log::info!("GET /api/tasks/{}/comments", task_id);

    let user = auth.current_user(&req, &db).await?;
    ensure_task_access(&db, &user, task_id).await?;

    let rows = sqlx::query(
        "SELECT c.id, c.content, c.created_at, c.updated_at, c.task_id,
                u.username AS author
         FROM comments c
         JOIN users u ON u.id = c.author_id
         WHERE c.task_id = $1
         ORDER BY c.created_at",
    )
    .bind(task_id)
    .fetch_all(&db.pool)
    .await
    .map_err(|e| {
        log::error!("Database error fetching comments: {}", e);
        ServiceError::DatabaseError("Failed to fetch comments".to_string())
    })?;

    let comments: Vec<CommentResponse> = rows
        .iter()
        .map(|row| CommentResponse {
            id: row.get("id"),
            content: row.get("content"),
            created_at: row.get("created_at"),
            updated_at: row.get("updated_at"),
            author: row.get("author"),
            task_id: row.get("task_id"),
        })
        .collect();

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        "Comments retrieved successfully",
        comments,
    )))
}

/// Add a comment to a task
#[utoipa::path(
    post,
    path = "/api/tasks/{task_id}/comments",
    tag = "comments",
    security(("bearer_auth" = [])),
    params(("task_id" = i32, Path, description = "Task ID")),
    request_body = CreateCommentRequest,
    responses(
        (status = 201, description = "Comment created successfully", body = ApiResponse<CommentResponse>),
        (status = 400, description = "Validation error", body = crate::utils::errors::ServiceError),
        (status = 403, description = "Forbidden", body = crate::utils::errors::ServiceError),
        (status = 404, description = "Task not found", body = crate::utils::errors::ServiceError)
    )
)]
pub async fn create_comment(
    req: HttpRequest,
    db: web::Data<Database>,
    auth: web::Data<AuthService>,
    path: web::Path<i32>,
    comment_req: web::Json<CreateCommentRequest>,
) -> Result<HttpResponse, ServiceError> {
    let task_id = path.into_inner();
    log::info!("POST /api/tasks/{}/comments", task_id);

    let user = auth.current_user(&req, &db).await?;
    let task = ensure_task_access(&db, &user, task_id).await?;

    comment_req
        .validate()
        .map_err(|e| ServiceError::ValidationError(e.to_string()))?;

    let mut tx = db.pool.begin().await.map_err(|e| {
        log::error!("Failed to begin transaction: {}", e);
        ServiceError::DatabaseError("Transaction failed".to_string())
    })?;

    let inserted = sqlx::query_as::<_, Comment>(
        "INSERT INTO comments (content, author_id, task_id)
         VALUES ($1, $2, $3)
         RETURNING id, content, created_at, updated_at, author_id, task_id",
    )
    .bind(&comment_req.content)
    .bind(user.id)
    .bind(task_id)
    .fetch_one(&mut *tx)
    .await
    .map_err(|e| {
        log::error!("Database error creating comment: {}", e);
        ServiceError::DatabaseError("Failed to create comment".to_string())
    })?;

    // The assignee hears about comments from anyone else.
    if let Some(assignee_id) = task.assigned_to_id {
        if assignee_id != user.id {
            push_notification(
                &mut tx,
                assignee_id,
                "New comment",
                &format!("{} commented on '{}'", user.username, task.title),
                NOTIFY_COMMENT,
                Some(task_id),
                Some(task.project_id),
            )
            .await?;
        }
    }

    tx.commit().await.map_err(|e| {
        log::error!("Failed to commit transaction: {}", e);
        ServiceError::DatabaseError("Transaction failed".to_string())
    })?;

    let comment = CommentResponse {
        id: inserted.id,
        content: inserted.content,
        created_at: inserted.created_at,
        updated_at: inserted.updated_at,
        author: user.username.clone(),
        task_id: inserted.task_id,
    };

    log::info!("Comment created with ID: {}", comment.id);
    Ok(HttpResponse::Created().json(ApiResponse::success(
        "Comment created successfully",
        comment,
    )))
}

/// Delete a comment
#[utoipa::path(
    delete,
    path = "/api/comments/{id}",
    tag = "comments",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Comment ID")),
    responses(
        (status = 200, description = "Comment deleted successfully", body = ApiResponse<bool>),
        (status = 403, description = "Forbidden", body = crate::utils::errors::ServiceError),
        (status = 404, description = "Comment not found", body = crate::utils::errors::ServiceError)
    )
)]
pub async fn delete_comment(
    req: HttpRequest,
    db: web::Data<Database>,
    auth: web::Data<AuthService>,
    path: web::Path<i32>,
) -> Result<HttpResponse, ServiceError> {
    let comment_id = path.into_inner();
    log::info!("DELETE /api/comments/{}", comment_id);

    let user = auth.current_user(&req, &db).await?;

    let row = sqlx::query("SELECT author_id FROM comments WHERE id = $1")
        .bind(comment_id)
        .fetch_optional(&db.pool)
        .await
        .map_err(|e| {
            log::error!("Database error fetching comment: {}", e);
            ServiceError::DatabaseError("Failed to fetch comment".to_string())
        })?;

    let author_id: i32 = match row {
        Some(row) => row.get("author_id"),
        None => return Err(ServiceError::NotFound("Comment not found".to_string())),
    };

    // Only the author or an admin may remove a comment.
    if !user.is_admin() && author_id != user.id {
        return Err(ServiceError::Forbidden("Unauthorized".to_string()));
    }

    sqlx::query("DELETE FROM comments WHERE id = $1")
        .bind(comment_id)
        .execute(&db.pool)
        .await
        .map_err(|e| {
            log::error!("Database error deleting comment: {}", e);
            ServiceError::DatabaseError("Failed to delete comment".to_string())
        })?;

    Ok(HttpResponse::Ok().json(ApiResponse::success("Comment deleted successfully", true)))
}

pub fn comment_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/comments").route("/{id}", web::delete().to(delete_comment)),
    );
}
