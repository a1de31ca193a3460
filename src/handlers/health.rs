use actix_web::{web, HttpResponse, Result};
use serde_json::json;

use crate::database::Database;
use crate::models::auth::ApiResponse;

/// Liveness probe: pings the database and reports row counts per table.
pub async fn health_check(db: web::Data<Database>) -> Result<HttpResponse> {
    if let Err(e) = db.health_check().await {
        log::error!("Database health check failed: {}", e);
        return Ok(HttpResponse::ServiceUnavailable().json(json!({
            "status": "error",
            "message": "Database connection failed",
            "error": e.to_string()
        })));
    }

    let stats = match db.get_stats().await {
        Ok(stats) => json!({
            "users": stats.users,
            "projects": stats.projects,
            "tasks": stats.tasks,
            "notifications": stats.notifications
        }),
        Err(e) => {
            log::warn!("Failed to collect database stats: {}", e);
            json!(null)
        }
    };

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        "Lab Tasks API is running",
        json!({
            "status": "ok",
            "database": "connected",
            "stats": stats
        }),
    )))
}

pub fn health_config(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health_check));
}
