use actix_web::{web, HttpRequest, HttpResponse, Result};
use sqlx::Row;
use std::collections::HashMap;
use validator::Validate;

use crate::auth::AuthService;
use crate::database::Database;
use crate::handlers::notification::push_notification;
use crate::handlers::{comment, file};
use crate::models::auth::{ApiResponse, User};
use crate::models::notification::NOTIFY_TASK_UPDATE;
use crate::models::task::{
    is_valid_priority, is_valid_status, is_valid_tag_color, CreateTagRequest, CreateTaskRequest,
    TagResponse, Task, TaskMetricsResponse, TaskResponse, TaskTag, UpdateTaskRequest,
    DEFAULT_PRIORITY, DEFAULT_STATUS, STATUS_COMPLETED,
};
use crate::utils::errors::ServiceError;

const TASK_COLUMNS: &str =
    "id, title, description, status, priority, created_at, updated_at, due_date, start_date,
     completed_at, estimated_hours, actual_hours, assigned_to_id, creator_id, project_id";

const TASK_SELECT: &str =
    "SELECT t.id, t.title, t.description, t.status, t.priority, t.created_at, t.updated_at,
            t.due_date, t.start_date, t.completed_at, t.estimated_hours, t.actual_hours,
            t.project_id, ua.username AS assigned_to, uc.username AS creator,
            p.name AS project_name
     FROM tasks t
     LEFT JOIN users ua ON ua.id = t.assigned_to_id
     JOIN users uc ON uc.id = t.creator_id
     JOIN projects p ON p.id = t.project_id";

pub(crate) async fn fetch_task(db: &Database, task_id: i32) -> Result<Task, ServiceError> {
    let task = sqlx::query_as::<_, Task>(&format!(
        "SELECT {} FROM tasks WHERE id = $1",
        TASK_COLUMNS
    ))
    .bind(task_id)
    .fetch_optional(&db.pool)
    .await
    .map_err(|e| {
        log::error!("Database error fetching task: {}", e);
        ServiceError::DatabaseError("Failed to fetch task".to_string())
    })?;

    task.ok_or_else(|| ServiceError::NotFound("Task not found".to_string()))
}

pub(crate) fn can_access_task(user: &User, task: &Task) -> bool {
    user.is_admin() || task.assigned_to_id == Some(user.id)
}

/// Fetch a task and enforce the admin-or-assignee visibility rule.
pub(crate) async fn ensure_task_access(
    db: &Database,
    user: &User,
    task_id: i32,
) -> Result<Task, ServiceError> {
    let task = fetch_task(db, task_id).await?;
    if !can_access_task(user, &task) {
        return Err(ServiceError::Forbidden("Unauthorized".to_string()));
    }
    Ok(task)
}

async fn get_task_tags(db: &Database, task_id: i32) -> Result<Vec<TagResponse>, ServiceError> {
    let rows = sqlx::query("SELECT id, name, color FROM task_tags WHERE task_id = $1 ORDER BY id")
        .bind(task_id)
        .fetch_all(&db.pool)
        .await
        .map_err(|e| {
            log::error!("Database error fetching task tags: {}", e);
            ServiceError::DatabaseError("Failed to fetch task tags".to_string())
        })?;

    Ok(rows
        .iter()
        .map(|row| TagResponse {
            id: row.get("id"),
            name: row.get("name"),
            color: row.get("color"),
        })
        .collect())
}

fn task_from_row(row: &sqlx::postgres::PgRow, tags: Vec<TagResponse>) -> TaskResponse {
    TaskResponse {
        id: row.get("id"),
        title: row.get("title"),
        description: row.get("description"),
        status: row.get("status"),
        priority: row.get("priority"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
        due_date: row.get("due_date"),
        start_date: row.get("start_date"),
        completed_at: row.get("completed_at"),
        estimated_hours: row.get("estimated_hours"),
        actual_hours: row.get("actual_hours"),
        assigned_to: row.get("assigned_to"),
        creator: row.get("creator"),
        project_id: row.get("project_id"),
        project_name: row.get("project_name"),
        tags,
    }
}

async fn task_response(db: &Database, task_id: i32) -> Result<TaskResponse, ServiceError> {
    let row = sqlx::query(&format!("{} WHERE t.id = $1", TASK_SELECT))
        .bind(task_id)
        .fetch_one(&db.pool)
        .await
        .map_err(|e| {
            log::error!("Database error fetching task: {}", e);
            ServiceError::DatabaseError("Failed to fetch task".to_string())
        })?;

    let tags = get_task_tags(db, task_id).await?;
    Ok(task_from_row(&row, tags))
}

/// List tasks visible to the caller
#[utoipa::path(
    get,
    path = "/api/tasks",
    tag = "tasks",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Tasks retrieved successfully", body = ApiResponse<Vec<TaskResponse>>),
        (status = 401, description = "Unauthorized", body = crate::utils::errors::ServiceError)
    )
)]
pub async fn get_tasks(
    req: HttpRequest,
    db: web::Data<Database>,
    auth: web::Data<AuthService>,
) -> Result<HttpResponse, ServiceError> {
    log::info!("GET /api/tasks");

    let user = auth.current_user(&req, &db).await?;

    // Admins see every task; team members only what is assigned to them.
    let rows = if user.is_admin() {
        sqlx::query(&format!("{} ORDER BY t.created_at DESC", TASK_SELECT))
            .fetch_all(&db.pool)
            .await
    } else {
        sqlx::query(&format!(
            "{} WHERE t.assigned_to_id = $1 ORDER BY t.created_at DESC",
            TASK_SELECT
        ))
        .bind(user.id)
        .fetch_all(&db.pool)
        .await
    }
    .map_err(|e| {
        log::error!("Database error fetching tasks: {}", e);
        ServiceError::DatabaseError("Failed to fetch tasks".to_string())
    })?;

    let mut tasks = Vec::with_capacity(rows.len());
    for row in &rows {
        let task_id: i32 = row.get("id");
        let tags = get_task_tags(&db, task_id).await?;
        tasks.push(task_from_row(row, tags));
    }

    log::info!("Retrieved {} tasks for {}", tasks.len(), user.username);
    Ok(HttpResponse::Ok().json(ApiResponse::success(
        "Tasks retrieved successfully",
        tasks,
    )))
}

/// Create a new task
#[utoipa::path(
    post,
    path = "/api/tasks",
    tag = "tasks",
    security(("bearer_auth" = [])),
    request_body = CreateTaskRequest,
    responses(
        (status = 201, description = "Task created successfully", body = ApiResponse<TaskResponse>),
        (status = 400, description = "Validation error", body = crate::utils::errors::ServiceError),
        (status = 404, description = "Project not found", body = crate::utils::errors::ServiceError)
    )
)]
pub async fn create_task(
    req: HttpRequest,
    db: web::Data<Database>,
    auth: web::Data<AuthService>,
    task_req: web::Json<CreateTaskRequest>,
) -> Result<HttpResponse, ServiceError> {
    log::info!("POST /api/tasks - Creating task: {}", task_req.title);

    let user = auth.current_user(&req, &db).await?;

    task_req
        .validate()
        .map_err(|e| ServiceError::ValidationError(e.to_string()))?;

    let status = task_req
        .status
        .clone()
        .unwrap_or_else(|| DEFAULT_STATUS.to_string());
    if !is_valid_status(&status) {
        return Err(ServiceError::ValidationError(
            "Invalid task status".to_string(),
        ));
    }

    let priority = task_req
        .priority
        .clone()
        .unwrap_or_else(|| DEFAULT_PRIORITY.to_string());
    if !is_valid_priority(&priority) {
        return Err(ServiceError::ValidationError(
            "Invalid task priority".to_string(),
        ));
    }

    let project = sqlx::query("SELECT id, name FROM projects WHERE id = $1")
        .bind(task_req.project_id)
        .fetch_optional(&db.pool)
        .await
        .map_err(|e| {
            log::error!("Database error checking project: {}", e);
            ServiceError::DatabaseError("Failed to check project".to_string())
        })?;

    let project_name: String = match project {
        Some(row) => row.get("name"),
        None => return Err(ServiceError::NotFound("Project not found".to_string())),
    };

    // The assignee defaults to the creator; an explicit assignee is honored
    // after an existence check.
    let (assignee_id, assignee_name) = match task_req.assigned_to_id {
        Some(id) if id != user.id => {
            let row = sqlx::query("SELECT username FROM users WHERE id = $1")
                .bind(id)
                .fetch_optional(&db.pool)
                .await
                .map_err(|e| {
                    log::error!("Database error checking assignee: {}", e);
                    ServiceError::DatabaseError("Failed to check assignee".to_string())
                })?;
            match row {
                Some(row) => (id, row.get::<String, _>("username")),
                None => {
                    return Err(ServiceError::ValidationError(
                        "Assigned user not found".to_string(),
                    ))
                }
            }
        }
        _ => (user.id, user.username.clone()),
    };

    let mut tx = db.pool.begin().await.map_err(|e| {
        log::error!("Failed to begin transaction: {}", e);
        ServiceError::DatabaseError("Transaction failed".to_string())
    })?;

    let task_row = sqlx::query(
        "INSERT INTO tasks (title, description, status, priority, due_date, start_date,
                            estimated_hours, assigned_to_id, creator_id, project_id)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
         RETURNING id, created_at, updated_at",
    )
    .bind(&task_req.title)
    .bind(&task_req.description)
    .bind(&status)
    .bind(&priority)
    .bind(task_req.due_date)
    .bind(task_req.start_date)
    .bind(task_req.estimated_hours)
    .bind(assignee_id)
    .bind(user.id)
    .bind(task_req.project_id)
    .fetch_one(&mut *tx)
    .await
    .map_err(|e| {
        log::error!("Database error creating task: {}", e);
        ServiceError::DatabaseError("Failed to create task".to_string())
    })?;

    let task_id: i32 = task_row.get("id");

    if assignee_id != user.id {
        push_notification(
            &mut tx,
            assignee_id,
            "Task assigned",
            &format!("You have been assigned to '{}'", task_req.title),
            NOTIFY_TASK_UPDATE,
            Some(task_id),
            Some(task_req.project_id),
        )
        .await?;
    }

    tx.commit().await.map_err(|e| {
        log::error!("Failed to commit transaction: {}", e);
        ServiceError::DatabaseError("Transaction failed".to_string())
    })?;

    let task = TaskResponse {
        id: task_id,
        title: task_req.title.clone(),
        description: task_req.description.clone(),
        status,
        priority,
        created_at: task_row.get("created_at"),
        updated_at: task_row.get("updated_at"),
        due_date: task_req.due_date,
        start_date: task_req.start_date,
        completed_at: None,
        estimated_hours: task_req.estimated_hours,
        actual_hours: None,
        assigned_to: Some(assignee_name),
        creator: user.username.clone(),
        project_id: task_req.project_id,
        project_name,
        tags: Vec::new(),
    };

    log::info!("Task created with ID: {}", task_id);
    Ok(HttpResponse::Created().json(ApiResponse::success("Task created successfully", task)))
}

/// Get a single task
#[utoipa::path(
    get,
    path = "/api/tasks/{id}",
    tag = "tasks",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Task ID")),
    responses(
        (status = 200, description = "Task retrieved successfully", body = ApiResponse<TaskResponse>),
        (status = 403, description = "Forbidden", body = crate::utils::errors::ServiceError),
        (status = 404, description = "Task not found", body = crate::utils::errors::ServiceError)
    )
)]
pub async fn get_task(
    req: HttpRequest,
    db: web::Data<Database>,
    auth: web::Data<AuthService>,
    path: web::Path<i32>,
) -> Result<HttpResponse, ServiceError> {
    let task_id = path.into_inner();
    log::info!("GET /api/tasks/{}", task_id);

    let user = auth.current_user(&req, &db).await?;
    ensure_task_access(&db, &user, task_id).await?;

    let task = task_response(&db, task_id).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success("Task retrieved successfully", task)))
}

/// Update a task
#[utoipa::path(
    put,
    path = "/api/tasks/{id}",
    tag = "tasks",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Task ID")),
    request_body = UpdateTaskRequest,
    responses(
        (status = 200, description = "Task updated successfully", body = ApiResponse<TaskResponse>),
        (status = 403, description = "Forbidden", body = crate::utils::errors::ServiceError),
        (status = 404, description = "Task not found", body = crate::utils::errors::ServiceError)
    )
)]
pub async fn update_task(
    req: HttpRequest,
    db: web::Data<Database>,
    auth: web::Data<AuthService>,
    path: web::Path<i32>,
    update_req: web::Json<UpdateTaskRequest>,
) -> Result<HttpResponse, ServiceError> {
    let task_id = path.into_inner();
    log::info!("PUT /api/tasks/{}", task_id);

    let user = auth.current_user(&req, &db).await?;
    let task = ensure_task_access(&db, &user, task_id).await?;

    if let Some(ref status) = update_req.status {
        if !is_valid_status(status) {
            return Err(ServiceError::ValidationError(
                "Invalid task status".to_string(),
            ));
        }
    }

    if let Some(ref priority) = update_req.priority {
        if !is_valid_priority(priority) {
            return Err(ServiceError::ValidationError(
                "Invalid task priority".to_string(),
            ));
        }
    }

    if let Some(assignee_id) = update_req.assigned_to_id {
        let exists = sqlx::query("SELECT id FROM users WHERE id = $1")
            .bind(assignee_id)
            .fetch_optional(&db.pool)
            .await
            .map_err(|e| {
                log::error!("Database error checking assignee: {}", e);
                ServiceError::DatabaseError("Failed to check assignee".to_string())
            })?;
        if exists.is_none() {
            return Err(ServiceError::ValidationError(
                "Assigned user not found".to_string(),
            ));
        }
    }

    let has_updates = update_req.title.is_some()
        || update_req.description.is_some()
        || update_req.status.is_some()
        || update_req.priority.is_some()
        || update_req.due_date.is_some()
        || update_req.start_date.is_some()
        || update_req.estimated_hours.is_some()
        || update_req.actual_hours.is_some()
        || update_req.assigned_to_id.is_some();

    let mut tx = db.pool.begin().await.map_err(|e| {
        log::error!("Failed to begin transaction: {}", e);
        ServiceError::DatabaseError("Transaction failed".to_string())
    })?;

    if has_updates {
        let mut query_builder = sqlx::QueryBuilder::new("UPDATE tasks SET updated_at = NOW()");

        if let Some(ref title) = update_req.title {
            query_builder.push(", title = ").push_bind(title);
        }
        if let Some(ref description) = update_req.description {
            query_builder.push(", description = ").push_bind(description);
        }
        if let Some(ref status) = update_req.status {
            query_builder.push(", status = ").push_bind(status);
            // Completion is stamped when the status says so, cleared when a
            // completed task is reopened.
            if status == STATUS_COMPLETED {
                query_builder.push(", completed_at = NOW()");
            } else {
                query_builder.push(", completed_at = NULL");
            }
        }
        if let Some(ref priority) = update_req.priority {
            query_builder.push(", priority = ").push_bind(priority);
        }
        if let Some(due_date) = update_req.due_date {
            query_builder.push(", due_date = ").push_bind(due_date);
        }
        if let Some(start_date) = update_req.start_date {
            query_builder.push(", start_date = ").push_bind(start_date);
        }
        if let Some(estimated_hours) = update_req.estimated_hours {
            query_builder
                .push(", estimated_hours = ")
                .push_bind(estimated_hours);
        }
        if let Some(actual_hours) = update_req.actual_hours {
            query_builder
                .push(", actual_hours = ")
                .push_bind(actual_hours);
        }
        if let Some(assignee_id) = update_req.assigned_to_id {
            query_builder
                .push(", assigned_to_id = ")
                .push_bind(assignee_id);
        }

        query_builder.push(" WHERE id = ").push_bind(task_id);

        query_builder.build().execute(&mut *tx).await.map_err(|e| {
            log::error!("Database error updating task: {}", e);
            ServiceError::DatabaseError("Failed to update task".to_string())
        })?;
    }

    // A reassignment notifies the new assignee, unless they made the change
    // themselves.
    if let Some(new_assignee) = update_req.assigned_to_id {
        if task.assigned_to_id != Some(new_assignee) && new_assignee != user.id {
            push_notification(
                &mut tx,
                new_assignee,
                "Task assigned",
                &format!("You have been assigned to '{}'", task.title),
                NOTIFY_TASK_UPDATE,
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

    let task = task_response(&db, task_id).await?;

    log::info!("Task updated: {}", task_id);
    Ok(HttpResponse::Ok().json(ApiResponse::success("Task updated successfully", task)))
}

/// Delete a task
#[utoipa::path(
    delete,
    path = "/api/tasks/{id}",
    tag = "tasks",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Task ID")),
    responses(
        (status = 200, description = "Task deleted successfully", body = ApiResponse<bool>),
        (status = 403, description = "Forbidden", body = crate::utils::errors::ServiceError),
        (status = 404, description = "Task not found", body = crate::utils::errors::ServiceError)
    )
)]
pub async fn delete_task(
    req: HttpRequest,
    db: web::Data<Database>,
    auth: web::Data<AuthService>,
    path: web::Path<i32>,
) -> Result<HttpResponse, ServiceError> {
    let task_id = path.into_inner();
    log::info!("DELETE /api/tasks/{}", task_id);

    let user = auth.current_user(&req, &db).await?;

    if !user.is_admin() {
        return Err(ServiceError::Forbidden("Unauthorized".to_string()));
    }

    let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
        .bind(task_id)
        .execute(&db.pool)
        .await
        .map_err(|e| {
            log::error!("Database error deleting task: {}", e);
            ServiceError::DatabaseError("Failed to delete task".to_string())
        })?;

    if result.rows_affected() == 0 {
        return Err(ServiceError::NotFound("Task not found".to_string()));
    }

    log::info!("Task deleted: {}", task_id);
    Ok(HttpResponse::Ok().json(ApiResponse::success("Task deleted successfully", true)))
}

/// Aggregate task metrics across all tasks
#[utoipa::path(
    get,
    path = "/api/tasks/metrics",
    tag = "tasks",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Metrics retrieved successfully", body = ApiResponse<TaskMetricsResponse>),
        (status = 401, description = "Unauthorized", body = crate::utils::errors::ServiceError)
    )
)]
pub async fn get_task_metrics(
    req: HttpRequest,
    db: web::Data<Database>,
    auth: web::Data<AuthService>,
) -> Result<HttpResponse, ServiceError> {
    log::info!("GET /api/tasks/metrics");

    // Metrics are deliberately not scoped by role; any authenticated user
    // sees the totals.
    auth.current_user(&req, &db).await?;

    let totals = sqlx::query(
        "SELECT COUNT(*) AS total_tasks,
                AVG(estimated_hours) AS avg_estimated_hours,
                AVG(actual_hours) AS avg_actual_hours
         FROM tasks",
    )
    .fetch_one(&db.pool)
    .await
    .map_err(|e| {
        log::error!("Database error computing task metrics: {}", e);
        ServiceError::DatabaseError("Failed to compute task metrics".to_string())
    })?;

    let status_rows = sqlx::query("SELECT status, COUNT(*) AS count FROM tasks GROUP BY status")
        .fetch_all(&db.pool)
        .await
        .map_err(|e| {
            log::error!("Database error computing status counts: {}", e);
            ServiceError::DatabaseError("Failed to compute status counts".to_string())
        })?;

    let status_counts: HashMap<String, i64> = status_rows
        .iter()
        .map(|row| (row.get("status"), row.get("count")))
        .collect();

    let metrics = TaskMetricsResponse {
        total_tasks: totals.get("total_tasks"),
        status_counts,
        avg_estimated_hours: totals.get("avg_estimated_hours"),
        avg_actual_hours: totals.get("avg_actual_hours"),
    };

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        "Metrics retrieved successfully",
        metrics,
    )))
}

/// Add a tag to a task
#[utoipa::path(
    post,
    path = "/api/tasks/{task_id}/tags",
    tag = "tasks",
    security(("bearer_auth" = [])),
    params(("task_id" = i32, Path, description = "Task ID")),
    request_body = CreateTagRequest,
    responses(
        (status = 201, description = "Tag added successfully", body = ApiResponse<TagResponse>),
        (status = 400, description = "Validation error", body = crate::utils::errors::ServiceError),
        (status = 404, description = "Task not found", body = crate::utils::errors::ServiceError)
    )
)]
pub async fn add_task_tag(
    req: HttpRequest,
    db: web::Data<Database>,
    auth: web::Data<AuthService>,
    path: web::Path<i32>,
    tag_req: web::Json<CreateTagRequest>,
) -> Result<HttpResponse, ServiceError> {
    let task_id = path.into_inner();
    log::info!("POST /api/tasks/{}/tags", task_id);

    let user = auth.current_user(&req, &db).await?;
    ensure_task_access(&db, &user, task_id).await?;

    tag_req
        .validate()
        .map_err(|e| ServiceError::ValidationError(e.to_string()))?;

    let color = tag_req.color.clone().unwrap_or_else(|| "#000000".to_string());
    if !is_valid_tag_color(&color) {
        return Err(ServiceError::ValidationError(
            "Tag color must be a #rrggbb hex value".to_string(),
        ));
    }

    let inserted = sqlx::query_as::<_, TaskTag>(
        "INSERT INTO task_tags (name, color, task_id) VALUES ($1, $2, $3)
         RETURNING id, name, color, task_id",
    )
    .bind(&tag_req.name)
    .bind(&color)
    .bind(task_id)
    .fetch_one(&db.pool)
    .await
    .map_err(|e| {
        log::error!("Database error adding tag: {}", e);
        ServiceError::DatabaseError("Failed to add tag".to_string())
    })?;

    let tag = TagResponse {
        id: inserted.id,
        name: inserted.name,
        color: inserted.color,
    };

    Ok(HttpResponse::Created().json(ApiResponse::success("Tag added successfully", tag)))
}

/// Remove a tag from a task
#[utoipa::path(
    delete,
    path = "/api/tasks/{task_id}/tags/{tag_id}",
    tag = "tasks",
    security(("bearer_auth" = [])),
    params(
        ("task_id" = i32, Path, description = "Task ID"),
        ("tag_id" = i32, Path, description = "Tag ID")
    ),
    responses(
        (status = 200, description = "Tag removed successfully", body = ApiResponse<bool>),
        (status = 404, description = "Tag not found", body = crate::utils::errors::ServiceError)
    )
)]
pub async fn remove_task_tag(
    req: HttpRequest,
    db: web::Data<Database>,
    auth: web::Data<AuthService>,
    path: web::Path<(i32, i32)>,
) -> Result<HttpResponse, ServiceError> {
    let (task_id, tag_id) = path.into_inner();
    log::info!("DELETE /api/tasks/{}/tags/{}", task_id, tag_id);

    let user = auth.current_user(&req, &db).await?;
    ensure_task_access(&db, &user, task_id).await?;

    let result = sqlx::query("DELETE FROM task_tags WHERE id = $1 AND task_id = $2")
        .bind(tag_id)
        .bind(task_id)
        .execute(&db.pool)
        .await
        .map_err(|e| {
            log::error!("Database error removing tag: {}", e);
            ServiceError::DatabaseError("Failed to remove tag".to_string())
        })?;

    if result.rows_affected() == 0 {
        return Err(ServiceError::NotFound("Tag not found".to_string()));
    }

    Ok(HttpResponse::Ok().json(ApiResponse::success("Tag removed successfully", true)))
}

pub fn task_config(cfg: &mut web::ServiceConfig) {
    // Every route under /api/tasks lives in this one scope; the literal
    // /metrics route must be registered ahead of /{id}.
    cfg.service(
        web::scope("/api/tasks")
            .route("", web::get().to(get_tasks))
            .route("", web::post().to(create_task))
            .route("/metrics", web::get().to(get_task_metrics))
            .route("/{id}", web::get().to(get_task))
            .route("/{id}", web::put().to(update_task))
            .route("/{id}", web::delete().to(delete_task))
            .route("/{task_id}/tags", web::post().to(add_task_tag))
            .route("/{task_id}/tags/{tag_id}", web::delete().to(remove_task_tag))
            .route("/{task_id}/comments", web::get().to(comment::get_task_comments))
            .route("/{task_id}/comments", web::post().to(comment::create_comment))
            .route("/{task_id}/attachments", web::post().to(file::upload_attachment))
            .route("/{task_id}/attachments", web::get().to(file::get_task_attachments))
            .route(
                "/{task_id}/attachments/{attachment_id}/download",
                web::get().to(file::download_attachment),
            )
            .route(
                "/{task_id}/attachments/{attachment_id}",
                web::delete().to(file::delete_attachment),
            ),
    );
}
