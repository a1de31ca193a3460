use actix_web::{web, HttpRequest, HttpResponse, Result};

use crate::auth::AuthService;
use crate::database::Database;
use crate::models::auth::ApiResponse;
use crate::models::notification::{Notification, NotificationResponse};
use crate::utils::errors::ServiceError;

/// Insert a notification row. Callers hold the surrounding transaction so a
/// failed write rolls back together with the triggering change.
pub async fn push_notification(
    conn: &mut sqlx::PgConnection,
    user_id: i32,
    title: &str,
    message: &str,
    kind: &str,
    related_task_id: Option<i32>,
    related_project_id: Option<i32>,
) -> Result<(), ServiceError> {
    sqlx::query(
        "INSERT INTO notifications (user_id, title, message, type, related_task_id, related_project_id)
         VALUES ($1, $2, $3, $4, $5, $6)",
    )
    .bind(user_id)
    .bind(title)
    .bind(message)
    .bind(kind)
    .bind(related_task_id)
    .bind(related_project_id)
    .execute(conn)
    .await
    .map_err(|e| {
        log::error!("Database error creating notification: {}", e);
        ServiceError::DatabaseError("Failed to create notification".to_string())
    })?;

    Ok(())
}

/// List the caller's notifications
#[utoipa::path(
    get,
    path = "/api/notifications",
    tag = "notifications",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Notifications retrieved successfully", body = ApiResponse<Vec<NotificationResponse>>),
        (status = 401, description = "Unauthorized", body = crate::utils::errors::ServiceError)
    )
)]
pub async fn get_notifications(
    req: HttpRequest,
    db: web::Data<Database>,
    auth: web::Data<AuthService>,
) -> Result<HttpResponse, ServiceError> {
    log::info!("GET /api/notifications");

    let user = auth.current_user(&req, &db).await?;

    let notifications = sqlx::query_as::<_, Notification>(
        "SELECT id, user_id, title, message, type, created_at, read_at,
                related_task_id, related_project_id
         FROM notifications
         WHERE user_id = $1
         ORDER BY created_at DESC",
    )
    .bind(user.id)
    .fetch_all(&db.pool)
    .await
    .map_err(|e| {
        log::error!("Database error fetching notifications: {}", e);
        ServiceError::DatabaseError("Failed to fetch notifications".to_string())
    })?;

    let notifications: Vec<NotificationResponse> = notifications
        .into_iter()
        .map(NotificationResponse::from)
        .collect();

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        "Notifications retrieved successfully",
        notifications,
    )))
}

/// Mark a notification as read
#[utoipa::path(
    put,
    path = "/api/notifications/{id}/read",
    tag = "notifications",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Notification ID")),
    responses(
        (status = 200, description = "Notification marked as read", body = ApiResponse<NotificationResponse>),
        (status = 404, description = "Notification not found", body = crate::utils::errors::ServiceError)
    )
)]
pub async fn mark_notification_read(
    req: HttpRequest,
    db: web::Data<Database>,
    auth: web::Data<AuthService>,
    path: web::Path<i32>,
) -> Result<HttpResponse, ServiceError> {
    let notification_id = path.into_inner();
    log::info!("PUT /api/notifications/{}/read", notification_id);

    let user = auth.current_user(&req, &db).await?;

    // Scoping the update by user_id keeps other users' notifications
    // indistinguishable from missing ones.
    let notification = sqlx::query_as::<_, Notification>(
        "UPDATE notifications SET read_at = NOW()
         WHERE id = $1 AND user_id = $2
         RETURNING id, user_id, title, message, type, created_at, read_at,
                   related_task_id, related_project_id",
    )
    .bind(notification_id)
    .bind(user.id)
    .fetch_optional(&db.pool)
    .await
    .map_err(|e| {
        log::error!("Database error marking notification read: {}", e);
        ServiceError::DatabaseError("Failed to mark notification read".to_string())
    })?;

    let notification =
        notification.ok_or_else(|| ServiceError::NotFound("Notification not found".to_string()))?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        "Notification marked as read",
        NotificationResponse::from(notification),
    )))
}

pub fn notification_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/notifications")
            .route("", web::get().to(get_notifications))
            .route("/{id}/read", web::put().to(mark_notification_read)),
    );
}
