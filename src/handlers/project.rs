use actix_web::{web, HttpRequest, HttpResponse, Result};
use sqlx::Row;
use validator::Validate;

use crate::auth::AuthService;
use crate::database::Database;
use crate::models::auth::{ApiResponse, User};
use crate::models::project::{
    AddMemberRequest, CreateProjectRequest, Project, ProjectDetailResponse, ProjectMemberResponse,
    ProjectResponse, ProjectTaskSummary, UpdateProjectRequest,
};
use crate::utils::errors::ServiceError;

const PROJECT_LIST_COLUMNS: &str =
    "p.id, p.name, p.description, p.created_at, p.deadline, p.status, u.username AS creator,
     (SELECT COUNT(*) FROM tasks t2 WHERE t2.project_id = p.id) AS task_count";

async fn fetch_project(db: &Database, project_id: i32) -> Result<Project, ServiceError> {
    let project = sqlx::query_as::<_, Project>(
        "SELECT id, name, description, created_at, deadline, status, creator_id
         FROM projects WHERE id = $1",
    )
    .bind(project_id)
    .fetch_optional(&db.pool)
    .await
    .map_err(|e| {
        log::error!("Database error fetching project: {}", e);
        ServiceError::DatabaseError("Failed to fetch project".to_string())
    })?;

    project.ok_or_else(|| ServiceError::NotFound("Project not found".to_string()))
}

async fn user_has_assigned_tasks(
    db: &Database,
    project_id: i32,
    user_id: i32,
) -> Result<bool, ServiceError> {
    let row = sqlx::query(
        "SELECT 1 AS present FROM tasks WHERE project_id = $1 AND assigned_to_id = $2 LIMIT 1",
    )
    .bind(project_id)
    .bind(user_id)
    .fetch_optional(&db.pool)
    .await
    .map_err(|e| {
        log::error!("Database error checking project tasks: {}", e);
        ServiceError::DatabaseError("Failed to check project tasks".to_string())
    })?;

    Ok(row.is_some())
}

// Creator and admin may modify a project; everyone else is read-only at best.
fn can_manage_project(user: &User, project: &Project) -> bool {
    user.is_admin() || project.creator_id == user.id
}

fn project_from_row(row: &sqlx::postgres::PgRow) -> ProjectResponse {
    ProjectResponse {
        id: row.get("id"),
        name: row.get("name"),
        description: row.get("description"),
        created_at: row.get("created_at"),
        deadline: row.get("deadline"),
        status: row.get("status"),
        creator: row.get("creator"),
        task_count: row.get("task_count"),
    }
}

/// List projects visible to the caller
#[utoipa::path(
    get,
    path = "/api/projects",
    tag = "projects",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Projects retrieved successfully", body = ApiResponse<Vec<ProjectResponse>>),
        (status = 401, description = "Unauthorized", body = crate::utils::errors::ServiceError)
    )
)]
pub async fn get_projects(
    req: HttpRequest,
    db: web::Data<Database>,
    auth: web::Data<AuthService>,
) -> Result<HttpResponse, ServiceError> {
    log::info!("GET /api/projects");

    let user = auth.current_user(&req, &db).await?;

    // Admins see everything; everyone else sees projects they created or
    // hold an assigned task in. The LEFT JOIN keeps task-less projects a
    // user created visible.
    let rows = if user.is_admin() {
        sqlx::query(&format!(
            "SELECT {} FROM projects p
             JOIN users u ON u.id = p.creator_id
             ORDER BY p.created_at DESC",
            PROJECT_LIST_COLUMNS
        ))
        .fetch_all(&db.pool)
        .await
    } else {
        sqlx::query(&format!(
            "SELECT DISTINCT {} FROM projects p
             JOIN users u ON u.id = p.creator_id
             LEFT JOIN tasks t ON t.project_id = p.id
             WHERE p.creator_id = $1 OR t.assigned_to_id = $1
             ORDER BY p.created_at DESC",
            PROJECT_LIST_COLUMNS
        ))
        .bind(user.id)
        .fetch_all(&db.pool)
        .await
    }
    .map_err(|e| {
        log::error!("Database error fetching projects: {}", e);
        ServiceError::DatabaseError("Failed to fetch projects".to_string())
    })?;

    let projects: Vec<ProjectResponse> = rows.iter().map(project_from_row).collect();

    log::info!("Retrieved {} projects for {}", projects.len(), user.username);
    Ok(HttpResponse::Ok().json(ApiResponse::success(
        "Projects retrieved successfully",
        projects,
    )))
}

/// Create a new project
#[utoipa::path(
    post,
    path = "/api/projects",
    tag = "projects",
    security(("bearer_auth" = [])),
    request_body = CreateProjectRequest,
    responses(
        (status = 201, description = "Project created successfully", body = ApiResponse<ProjectResponse>),
        (status = 400, description = "Validation error", body = crate::utils::errors::ServiceError),
        (status = 401, description = "Unauthorized", body = crate::utils::errors::ServiceError)
    )
)]
pub async fn create_project(
    req: HttpRequest,
    db: web::Data<Database>,
    auth: web::Data<AuthService>,
    project_req: web::Json<CreateProjectRequest>,
) -> Result<HttpResponse, ServiceError> {
    log::info!("POST /api/projects - Creating project: {}", project_req.name);

    let user = auth.current_user(&req, &db).await?;

    project_req
        .validate()
        .map_err(|e| ServiceError::ValidationError(e.to_string()))?;

    let row = sqlx::query(
        "INSERT INTO projects (name, description, deadline, creator_id)
         VALUES ($1, $2, $3, $4)
         RETURNING id, name, description, created_at, deadline, status",
    )
    .bind(&project_req.name)
    .bind(&project_req.description)
    .bind(project_req.deadline)
    .bind(user.id)
    .fetch_one(&db.pool)
    .await
    .map_err(|e| {
        log::error!("Database error creating project: {}", e);
        ServiceError::DatabaseError("Failed to create project".to_string())
    })?;

    let project_response = ProjectResponse {
        id: row.get("id"),
        name: row.get("name"),
        description: row.get("description"),
        created_at: row.get("created_at"),
        deadline: row.get("deadline"),
        status: row.get("status"),
        creator: user.username.clone(),
        task_count: 0,
    };

    log::info!("Project created with ID: {}", project_response.id);
    Ok(HttpResponse::Created().json(ApiResponse::success(
        "Project created successfully",
        project_response,
    )))
}

/// Get a single project with its tasks
#[utoipa::path(
    get,
    path = "/api/projects/{id}",
    tag = "projects",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Project ID")),
    responses(
        (status = 200, description = "Project retrieved successfully", body = ApiResponse<ProjectDetailResponse>),
        (status = 403, description = "Forbidden", body = crate::utils::errors::ServiceError),
        (status = 404, description = "Project not found", body = crate::utils::errors::ServiceError)
    )
)]
pub async fn get_project(
    req: HttpRequest,
    db: web::Data<Database>,
    auth: web::Data<AuthService>,
    path: web::Path<i32>,
) -> Result<HttpResponse, ServiceError> {
    let project_id = path.into_inner();
    log::info!("GET /api/projects/{}", project_id);

    let user = auth.current_user(&req, &db).await?;
    let project = fetch_project(&db, project_id).await?;

    if !can_manage_project(&user, &project)
        && !user_has_assigned_tasks(&db, project_id, user.id).await?
    {
        return Err(ServiceError::Forbidden("Unauthorized".to_string()));
    }

    let creator: String = sqlx::query("SELECT username FROM users WHERE id = $1")
        .bind(project.creator_id)
        .fetch_one(&db.pool)
        .await
        .map_err(|e| {
            log::error!("Database error fetching project creator: {}", e);
            ServiceError::DatabaseError("Failed to fetch project creator".to_string())
        })?
        .get("username");

    let task_rows = sqlx::query(
        "SELECT t.id, t.title, t.description, t.status, t.priority, t.due_date,
                ua.username AS assigned_to
         FROM tasks t
         LEFT JOIN users ua ON ua.id = t.assigned_to_id
         WHERE t.project_id = $1
         ORDER BY t.created_at",
    )
    .bind(project_id)
    .fetch_all(&db.pool)
    .await
    .map_err(|e| {
        log::error!("Database error fetching project tasks: {}", e);
        ServiceError::DatabaseError("Failed to fetch project tasks".to_string())
    })?;

    let tasks: Vec<ProjectTaskSummary> = task_rows
        .iter()
        .map(|row| ProjectTaskSummary {
            id: row.get("id"),
            title: row.get("title"),
            description: row.get("description"),
            status: row.get("status"),
            priority: row.get("priority"),
            due_date: row.get("due_date"),
            assigned_to: row.get("assigned_to"),
        })
        .collect();

    let detail = ProjectDetailResponse {
        id: project.id,
        name: project.name,
        description: project.description,
        created_at: project.created_at,
        deadline: project.deadline,
        status: project.status,
        creator,
        tasks,
    };

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        "Project retrieved successfully",
        detail,
    )))
}

/// Update a project
#[utoipa::path(
    put,
    path = "/api/projects/{id}",
    tag = "projects",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Project ID")),
    request_body = UpdateProjectRequest,
    responses(
        (status = 200, description = "Project updated successfully", body = ApiResponse<ProjectResponse>),
        (status = 403, description = "Forbidden", body = crate::utils::errors::ServiceError),
        (status = 404, description = "Project not found", body = crate::utils::errors::ServiceError)
    )
)]
pub async fn update_project(
    req: HttpRequest,
    db: web::Data<Database>,
    auth: web::Data<AuthService>,
    path: web::Path<i32>,
    update_req: web::Json<UpdateProjectRequest>,
) -> Result<HttpResponse, ServiceError> {
    let project_id = path.into_inner();
    log::info!("PUT /api/projects/{}", project_id);

    let user = auth.current_user(&req, &db).await?;
    let project = fetch_project(&db, project_id).await?;

    if !can_manage_project(&user, &project) {
        return Err(ServiceError::Forbidden("Unauthorized".to_string()));
    }

    let has_updates = update_req.name.is_some()
        || update_req.description.is_some()
        || update_req.deadline.is_some()
        || update_req.status.is_some();

    if has_updates {
        let mut query_builder = sqlx::QueryBuilder::new("UPDATE projects SET ");

        {
            let mut fields = query_builder.separated(", ");
            if let Some(ref name) = update_req.name {
                fields.push("name = ").push_bind_unseparated(name);
            }
            if let Some(ref description) = update_req.description {
                fields
                    .push("description = ")
                    .push_bind_unseparated(description);
            }
            if let Some(deadline) = update_req.deadline {
                fields.push("deadline = ").push_bind_unseparated(deadline);
            }
            if let Some(ref status) = update_req.status {
                fields.push("status = ").push_bind_unseparated(status);
            }
        }

        query_builder.push(" WHERE id = ").push_bind(project_id);

        query_builder
            .build()
            .execute(&db.pool)
            .await
            .map_err(|e| {
                log::error!("Database error updating project: {}", e);
                ServiceError::DatabaseError("Failed to update project".to_string())
            })?;
    }

    let row = sqlx::query(&format!(
        "SELECT {} FROM projects p JOIN users u ON u.id = p.creator_id WHERE p.id = $1",
        PROJECT_LIST_COLUMNS
    ))
    .bind(project_id)
    .fetch_one(&db.pool)
    .await
    .map_err(|e| {
        log::error!("Database error fetching updated project: {}", e);
        ServiceError::DatabaseError("Failed to fetch updated project".to_string())
    })?;

    log::info!("Project updated: {}", project_id);
    Ok(HttpResponse::Ok().json(ApiResponse::success(
        "Project updated successfully",
        project_from_row(&row),
    )))
}

/// Delete a project and all of its tasks
#[utoipa::path(
    delete,
    path = "/api/projects/{id}",
    tag = "projects",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Project ID")),
    responses(
        (status = 200, description = "Project deleted successfully", body = ApiResponse<bool>),
        (status = 403, description = "Forbidden", body = crate::utils::errors::ServiceError),
        (status = 404, description = "Project not found", body = crate::utils::errors::ServiceError)
    )
)]
pub async fn delete_project(
    req: HttpRequest,
    db: web::Data<Database>,
    auth: web::Data<AuthService>,
    path: web::Path<i32>,
) -> Result<HttpResponse, ServiceError> {
    let project_id = path.into_inner();
    log::info!("DELETE /api/projects/{}", project_id);

    let user = auth.current_user(&req, &db).await?;
    let project = fetch_project(&db, project_id).await?;

    if !can_manage_project(&user, &project) {
        return Err(ServiceError::Forbidden("Unauthorized".to_string()));
    }

    let mut tx = db.pool.begin().await.map_err(|e| {
        log::error!("Failed to begin transaction: {}", e);
        ServiceError::DatabaseError("Transaction failed".to_string())
    })?;

    // Cascade: the project's tasks go first (their comments, attachments
    // and tags follow via foreign keys), then the project itself.
    sqlx::query("DELETE FROM tasks WHERE project_id = $1")
        .bind(project_id)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            log::error!("Database error deleting project tasks: {}", e);
            ServiceError::DatabaseError("Failed to delete project tasks".to_string())
        })?;

    sqlx::query("DELETE FROM projects WHERE id = $1")
        .bind(project_id)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            log::error!("Database error deleting project: {}", e);
            ServiceError::DatabaseError("Failed to delete project".to_string())
        })?;

    tx.commit().await.map_err(|e| {
        log::error!("Failed to commit transaction: {}", e);
        ServiceError::DatabaseError("Transaction failed".to_string())
    })?;

    log::info!("Project deleted: {}", project_id);
    Ok(HttpResponse::Ok().json(ApiResponse::success("Project deleted successfully", true)))
}

/// List the members of a project
#[utoipa::path(
    get,
    path = "/api/projects/{id}/members",
    tag = "projects",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Project ID")),
    responses(
        (status = 200, description = "Members retrieved successfully", body = ApiResponse<Vec<ProjectMemberResponse>>),
        (status = 403, description = "Forbidden", body = crate::utils::errors::ServiceError),
        (status = 404, description = "Project not found", body = crate::utils::errors::ServiceError)
    )
)]
pub async fn get_project_members(
    req: HttpRequest,
    db: web::Data<Database>,
    auth: web::Data<AuthService>,
    path: web::Path<i32>,
) -> Result<HttpResponse, ServiceError> {
    let project_id = path.into_inner();
    log::info!("GET /api/projects/{}/members", project_id);

    let user = auth.current_user(&req, &db).await?;
    let project = fetch_project(&db, project_id).await?;

    if !can_manage_project(&user, &project)
        && !user_has_assigned_tasks(&db, project_id, user.id).await?
    {
        return Err(ServiceError::Forbidden("Unauthorized".to_string()));
    }

    let rows = sqlx::query(
        "SELECT pm.id, pm.user_id, u.username, pm.role, pm.joined_at
         FROM project_members pm
         JOIN users u ON u.id = pm.user_id
         WHERE pm.project_id = $1
         ORDER BY pm.joined_at",
    )
    .bind(project_id)
    .fetch_all(&db.pool)
    .await
    .map_err(|e| {
        log::error!("Database error fetching project members: {}", e);
        ServiceError::DatabaseError("Failed to fetch project members".to_string())
    })?;

    let members: Vec<ProjectMemberResponse> = rows
        .iter()
        .map(|row| ProjectMemberResponse {
            id: row.get("id"),
            user_id: row.get("user_id"),
            username: row.get("username"),
            role: row.get("role"),
            joined_at: row.get("joined_at"),
        })
        .collect();

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        "Members retrieved successfully",
        members,
    )))
}

/// Add a member to a project
#[utoipa::path(
    post,
    path = "/api/projects/{id}/members",
    tag = "projects",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Project ID")),
    request_body = AddMemberRequest,
    responses(
        (status = 201, description = "Member added successfully", body = ApiResponse<ProjectMemberResponse>),
        (status = 400, description = "User is already a member", body = crate::utils::errors::ServiceError),
        (status = 403, description = "Forbidden", body = crate::utils::errors::ServiceError),
        (status = 404, description = "Project or user not found", body = crate::utils::errors::ServiceError)
    )
)]
pub async fn add_project_member(
    req: HttpRequest,
    db: web::Data<Database>,
    auth: web::Data<AuthService>,
    path: web::Path<i32>,
    member_req: web::Json<AddMemberRequest>,
) -> Result<HttpResponse, ServiceError> {
    let project_id = path.into_inner();
    log::info!(
        "POST /api/projects/{}/members - user {}",
        project_id,
        member_req.user_id
    );

    let user = auth.current_user(&req, &db).await?;
    let project = fetch_project(&db, project_id).await?;

    if !can_manage_project(&user, &project) {
        return Err(ServiceError::Forbidden("Unauthorized".to_string()));
    }

    let target = sqlx::query("SELECT username FROM users WHERE id = $1")
        .bind(member_req.user_id)
        .fetch_optional(&db.pool)
        .await
        .map_err(|e| {
            log::error!("Database error checking user: {}", e);
            ServiceError::DatabaseError("Failed to check user".to_string())
        })?;

    let username: String = match target {
        Some(row) => row.get("username"),
        None => return Err(ServiceError::NotFound("User not found".to_string())),
    };

    let existing = sqlx::query(
        "SELECT id FROM project_members WHERE project_id = $1 AND user_id = $2",
    )
    .bind(project_id)
    .bind(member_req.user_id)
    .fetch_optional(&db.pool)
    .await
    .map_err(|e| {
        log::error!("Database error checking membership: {}", e);
        ServiceError::DatabaseError("Failed to check membership".to_string())
    })?;

    if existing.is_some() {
        return Err(ServiceError::ValidationError(
            "User is already a project member".to_string(),
        ));
    }

    let role = member_req.role.clone().unwrap_or_else(|| "member".to_string());

    let row = sqlx::query(
        "INSERT INTO project_members (project_id, user_id, role)
         VALUES ($1, $2, $3)
         RETURNING id, user_id, role, joined_at",
    )
    .bind(project_id)
    .bind(member_req.user_id)
    .bind(&role)
    .fetch_one(&db.pool)
    .await
    .map_err(|e| {
        log::error!("Database error adding project member: {}", e);
        ServiceError::DatabaseError("Failed to add project member".to_string())
    })?;

    let member = ProjectMemberResponse {
        id: row.get("id"),
        user_id: row.get("user_id"),
        username,
        role: row.get("role"),
        joined_at: row.get("joined_at"),
    };

    log::info!(
        "User {} added to project {} as {}",
        member.user_id,
        project_id,
        member.role
    );
    Ok(HttpResponse::Created().json(ApiResponse::success("Member added successfully", member)))
}

/// Remove a member from a project
#[utoipa::path(
    delete,
    path = "/api/projects/{id}/members/{user_id}",
    tag = "projects",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Project ID"),
        ("user_id" = i32, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "Member removed successfully", body = ApiResponse<bool>),
        (status = 403, description = "Forbidden", body = crate::utils::errors::ServiceError),
        (status = 404, description = "Project or member not found", body = crate::utils::errors::ServiceError)
    )
)]
pub async fn remove_project_member(
    req: HttpRequest,
    db: web::Data<Database>,
    auth: web::Data<AuthService>,
    path: web::Path<(i32, i32)>,
) -> Result<HttpResponse, ServiceError> {
    let (project_id, member_user_id) = path.into_inner();
    log::info!(
        "DELETE /api/projects/{}/members/{}",
        project_id,
        member_user_id
    );

    let user = auth.current_user(&req, &db).await?;
    let project = fetch_project(&db, project_id).await?;

    if !can_manage_project(&user, &project) {
        return Err(ServiceError::Forbidden("Unauthorized".to_string()));
    }

    let result = sqlx::query(
        "DELETE FROM project_members WHERE project_id = $1 AND user_id = $2",
    )
    .bind(project_id)
    .bind(member_user_id)
    .execute(&db.pool)
    .await
    .map_err(|e| {
        log::error!("Database error removing project member: {}", e);
        ServiceError::DatabaseError("Failed to remove project member".to_string())
    })?;

    if result.rows_affected() == 0 {
        return Err(ServiceError::NotFound(
            "Project member not found".to_string(),
        ));
    }

    Ok(HttpResponse::Ok().json(ApiResponse::success("Member removed successfully", true)))
}

pub fn project_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/projects")
            .route("", web::get().to(get_projects))
            .route("", web::post().to(create_project))
            .route("/{id}", web::get().to(get_project))
            .route("/{id}", web::put().to(update_project))
            .route("/{id}", web::delete().to(delete_project))
            .route("/{id}/members", web::get().to(get_project_members))
            .route("/{id}/members", web::post().to(add_project_member))
            .route("/{id}/members/{user_id}", web::delete().to(remove_project_member)),
    );
}
