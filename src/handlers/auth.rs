use actix_web::{web, HttpRequest, HttpResponse, Result};
use bcrypt::{hash, verify, DEFAULT_COST};
use sqlx::Row;
use validator::Validate;

use crate::auth::AuthService;
use crate::database::Database;
use crate::models::auth::{
    ApiResponse, AuthResponseData, DebugDeleteUserRequest, LoginRequest, RegisterRequest,
    UpdateProfileRequest, User, UserResponse, ROLE_TEAM_MEMBER, VALID_ROLES,
};
use crate::utils::errors::ServiceError;

const USER_COLUMNS: &str =
    "id, username, email, password_hash, role, created_at, last_login, is_active";

/// Register a new user account
#[utoipa::path(
    post,
    path = "/api/auth/register",
    tag = "auth",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User registered successfully", body = ApiResponse<AuthResponseData>),
        (status = 400, description = "Validation error or duplicate username/email", body = crate::utils::errors::ServiceError)
    )
)]
pub async fn register(
    db: web::Data<Database>,
    auth: web::Data<AuthService>,
    register_req: web::Json<RegisterRequest>,
) -> Result<HttpResponse, ServiceError> {
    log::info!(
        "POST /api/auth/register - Registration attempt for: {}",
        register_req.username
    );

    register_req
        .validate()
        .map_err(|e| ServiceError::ValidationError(e.to_string()))?;

    let role = register_req
        .role
        .clone()
        .unwrap_or_else(|| ROLE_TEAM_MEMBER.to_string());
    if !VALID_ROLES.contains(&role.as_str()) {
        return Err(ServiceError::ValidationError("Invalid role".to_string()));
    }

    let email_taken = sqlx::query("SELECT id FROM users WHERE email = $1")
        .bind(&register_req.email)
        .fetch_optional(&db.pool)
        .await
        .map_err(|e| {
            log::error!("Database error checking email: {}", e);
            ServiceError::DatabaseError("Failed to check email".to_string())
        })?;

    if email_taken.is_some() {
        log::warn!("Email already registered: {}", register_req.email);
        return Err(ServiceError::ValidationError(
            "Email already registered".to_string(),
        ));
    }

    let username_taken = sqlx::query("SELECT id FROM users WHERE username = $1")
        .bind(&register_req.username)
        .fetch_optional(&db.pool)
        .await
        .map_err(|e| {
            log::error!("Database error checking username: {}", e);
            ServiceError::DatabaseError("Failed to check username".to_string())
        })?;

    if username_taken.is_some() {
        log::warn!("Username already taken: {}", register_req.username);
        return Err(ServiceError::ValidationError(
            "Username already taken".to_string(),
        ));
    }

    let password_hash = hash(&register_req.password, DEFAULT_COST)?;

    let user = sqlx::query_as::<_, User>(&format!(
        "INSERT INTO users (username, email, password_hash, role)
         VALUES ($1, $2, $3, $4)
         RETURNING {}",
        USER_COLUMNS
    ))
    .bind(&register_req.username)
    .bind(&register_req.email)
    .bind(&password_hash)
    .bind(&role)
    .fetch_one(&db.pool)
    .await
    .map_err(|e| {
        log::error!("Database error creating user: {}", e);
        ServiceError::DatabaseError("Failed to create user".to_string())
    })?;

    let access_token = auth.create_token(&user)?;

    log::info!("User registered successfully: {}", user.username);
    Ok(HttpResponse::Created().json(ApiResponse::success(
        "User registered successfully",
        AuthResponseData {
            access_token,
            user: UserResponse::from(user),
        },
    )))
}

/// User login endpoint
#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = ApiResponse<AuthResponseData>),
        (status = 401, description = "Invalid credentials", body = crate::utils::errors::ServiceError)
    )
)]
pub async fn login(
    db: web::Data<Database>,
    auth: web::Data<AuthService>,
    login_req: web::Json<LoginRequest>,
) -> Result<HttpResponse, ServiceError> {
    log::info!(
        "POST /api/auth/login - Login attempt for: {}",
        login_req.email
    );

    login_req
        .validate()
        .map_err(|e| ServiceError::ValidationError(e.to_string()))?;

    let user = sqlx::query_as::<_, User>(&format!(
        "SELECT {} FROM users WHERE email = $1",
        USER_COLUMNS
    ))
    .bind(&login_req.email)
    .fetch_optional(&db.pool)
    .await
    .map_err(|e| {
        log::error!("Database error during login: {}", e);
        ServiceError::DatabaseError("Failed to query user".to_string())
    })?;

    let user = match user {
        Some(user) => user,
        None => {
            log::warn!("Login failed: user not found - {}", login_req.email);
            return Err(ServiceError::Unauthorized(
                "Invalid email or password".to_string(),
            ));
        }
    };

    let password_valid = verify(&login_req.password, &user.password_hash).map_err(|e| {
        log::error!("Password verification error: {}", e);
        ServiceError::AuthenticationError("Password verification failed".to_string())
    })?;

    if !password_valid {
        log::warn!("Login failed: invalid password for {}", login_req.email);
        return Err(ServiceError::Unauthorized(
            "Invalid email or password".to_string(),
        ));
    }

    let user = sqlx::query_as::<_, User>(&format!(
        "UPDATE users SET last_login = NOW() WHERE id = $1 RETURNING {}",
        USER_COLUMNS
    ))
    .bind(user.id)
    .fetch_one(&db.pool)
    .await
    .map_err(|e| {
        log::error!("Database error updating last login: {}", e);
        ServiceError::DatabaseError("Failed to update last login".to_string())
    })?;

    let access_token = auth.create_token(&user)?;

    log::info!("Login successful for user: {}", user.username);
    Ok(HttpResponse::Ok().json(ApiResponse::success(
        "Login successful",
        AuthResponseData {
            access_token,
            user: UserResponse::from(user),
        },
    )))
}

/// Get current user information
#[utoipa::path(
    get,
    path = "/api/auth/me",
    tag = "auth",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "User information retrieved", body = ApiResponse<UserResponse>),
        (status = 401, description = "Unauthorized", body = crate::utils::errors::ServiceError)
    )
)]
pub async fn get_me(
    req: HttpRequest,
    db: web::Data<Database>,
    auth: web::Data<AuthService>,
) -> Result<HttpResponse, ServiceError> {
    log::info!("GET /api/auth/me");

    let user = auth.current_user(&req, &db).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        "Successfully retrieved user data",
        UserResponse::from(user),
    )))
}

/// Update the current user's profile
#[utoipa::path(
    put,
    path = "/api/auth/profile",
    tag = "auth",
    security(("bearer_auth" = [])),
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Profile updated", body = ApiResponse<UserResponse>),
        (status = 400, description = "Duplicate username/email", body = crate::utils::errors::ServiceError),
        (status = 401, description = "Unauthorized", body = crate::utils::errors::ServiceError)
    )
)]
pub async fn update_profile(
    req: HttpRequest,
    db: web::Data<Database>,
    auth: web::Data<AuthService>,
    update_req: web::Json<UpdateProfileRequest>,
) -> Result<HttpResponse, ServiceError> {
    log::info!("PUT /api/auth/profile");

    let user = auth.current_user(&req, &db).await?;

    if let Some(ref username) = update_req.username {
        if username != &user.username {
            let taken = sqlx::query("SELECT id FROM users WHERE username = $1 AND id <> $2")
                .bind(username)
                .bind(user.id)
                .fetch_optional(&db.pool)
                .await
                .map_err(|e| {
                    log::error!("Database error checking username: {}", e);
                    ServiceError::DatabaseError("Failed to check username".to_string())
                })?;
            if taken.is_some() {
                return Err(ServiceError::ValidationError(
                    "Username already taken".to_string(),
                ));
            }
        }
    }

    if let Some(ref email) = update_req.email {
        if email != &user.email {
            let taken = sqlx::query("SELECT id FROM users WHERE email = $1 AND id <> $2")
                .bind(email)
                .bind(user.id)
                .fetch_optional(&db.pool)
                .await
                .map_err(|e| {
                    log::error!("Database error checking email: {}", e);
                    ServiceError::DatabaseError("Failed to check email".to_string())
                })?;
            if taken.is_some() {
                return Err(ServiceError::ValidationError(
                    "Email already registered".to_string(),
                ));
            }
        }
    }

    let updated = if update_req.username.is_some() || update_req.email.is_some() {
        let mut query_builder = sqlx::QueryBuilder::new("UPDATE users SET ");

        {
            let mut fields = query_builder.separated(", ");
            if let Some(ref username) = update_req.username {
                fields.push("username = ").push_bind_unseparated(username);
            }
            if let Some(ref email) = update_req.email {
                fields.push("email = ").push_bind_unseparated(email);
            }
        }

        query_builder.push(" WHERE id = ").push_bind(user.id);
        query_builder.push(format!(" RETURNING {}", USER_COLUMNS));

        query_builder
            .build_query_as::<User>()
            .fetch_one(&db.pool)
            .await
            .map_err(|e| {
                log::error!("Database error updating profile: {}", e);
                ServiceError::DatabaseError("Failed to update profile".to_string())
            })?
    } else {
        user
    };

    log::info!("Profile updated for user: {}", updated.username);
    Ok(HttpResponse::Ok().json(ApiResponse::success(
        "Profile updated successfully",
        UserResponse::from(updated),
    )))
}

// Development-only helper: list every registered user.
pub async fn debug_users(db: web::Data<Database>) -> Result<HttpResponse, ServiceError> {
    log::info!("GET /api/auth/debug/users");

    let rows = sqlx::query("SELECT id, username, email FROM users ORDER BY id")
        .fetch_all(&db.pool)
        .await
        .map_err(|e| {
            log::error!("Database error listing users: {}", e);
            ServiceError::DatabaseError("Failed to list users".to_string())
        })?;

    let users: Vec<serde_json::Value> = rows
        .iter()
        .map(|row| {
            serde_json::json!({
                "id": row.get::<i32, _>("id"),
                "username": row.get::<String, _>("username"),
                "email": row.get::<String, _>("email"),
            })
        })
        .collect();

    Ok(HttpResponse::Ok().json(serde_json::json!({ "users": users })))
}

// Development-only helper: delete a user by email.
pub async fn debug_delete_user(
    db: web::Data<Database>,
    delete_req: web::Json<DebugDeleteUserRequest>,
) -> Result<HttpResponse, ServiceError> {
    log::info!("POST /api/auth/debug/delete-user - {}", delete_req.email);

    let result = sqlx::query("DELETE FROM users WHERE email = $1")
        .bind(&delete_req.email)
        .execute(&db.pool)
        .await
        .map_err(|e| {
            log::error!("Database error deleting user: {}", e);
            ServiceError::DatabaseError("Failed to delete user".to_string())
        })?;

    if result.rows_affected() == 0 {
        return Err(ServiceError::NotFound("User not found".to_string()));
    }

    Ok(HttpResponse::Ok().json(ApiResponse::success("User deleted successfully", true)))
}

pub fn auth_config(cfg: &mut web::ServiceConfig, enable_debug_routes: bool) {
    let mut scope = web::scope("/api/auth")
        .route("/register", web::post().to(register))
        .route("/login", web::post().to(login))
        .route("/me", web::get().to(get_me))
        .route("/profile", web::put().to(update_profile));

    if enable_debug_routes {
        scope = scope
            .route("/debug/users", web::get().to(debug_users))
            .route("/debug/delete-user", web::post().to(debug_delete_user));
    }

    cfg.service(scope);
}
