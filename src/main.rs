mod auth;
mod config;
mod database;
mod handlers;
mod models;
mod utils;

use actix_cors::Cors;
use actix_files::{Files, NamedFile};
use actix_web::dev::{fn_service, ServiceRequest, ServiceResponse};
use actix_web::{middleware, web, App, HttpResponse, HttpServer};
use dotenv::dotenv;
use env_logger::Env;
use std::path::Path;
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

use crate::auth::AuthService;
use crate::config::AppConfig;
use crate::database::Database;
use crate::models::auth::ErrorResponse;

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::auth::register,
        handlers::auth::login,
        handlers::auth::get_me,
        handlers::auth::update_profile,
        handlers::project::get_projects,
        handlers::project::create_project,
        handlers::project::get_project,
        handlers::project::update_project,
        handlers::project::delete_project,
        handlers::project::get_project_members,
        handlers::project::add_project_member,
        handlers::project::remove_project_member,
        handlers::task::get_tasks,
        handlers::task::create_task,
        handlers::task::get_task,
        handlers::task::update_task,
        handlers::task::delete_task,
        handlers::task::get_task_metrics,
        handlers::task::add_task_tag,
        handlers::task::remove_task_tag,
        handlers::comment::get_task_comments,
        handlers::comment::create_comment,
        handlers::comment::delete_comment,
        handlers::file::upload_attachment,
        handlers::file::get_task_attachments,
        handlers::file::download_attachment,
        handlers::file::delete_attachment,
        handlers::notification::get_notifications,
        handlers::notification::mark_notification_read,
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "auth", description = "Registration, login and profile endpoints"),
        (name = "projects", description = "Project CRUD and membership"),
        (name = "tasks", description = "Task CRUD, tags and metrics"),
        (name = "comments", description = "Task comments"),
        (name = "attachments", description = "Task file attachments"),
        (name = "notifications", description = "Per-user notifications")
    )
)]
struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};

        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load environment variables
    dotenv().ok();

    // Initialize logger
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            log::error!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    let database = match Database::new(&config.database_url).await {
        Ok(database) => database,
        Err(e) => {
            log::error!("Database setup failed: {:#}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = database.init_schema().await {
        log::error!("Schema setup failed: {:#}", e);
        std::process::exit(1);
    }

    database.check_tables().await.ok();
    if let Ok(stats) = database.get_stats().await {
        stats.log_stats();
    }

    let auth_service = AuthService::new(&config.jwt_secret);

    let db_data = web::Data::new(database);
    let auth_data = web::Data::new(auth_service);
    let config_data = web::Data::new(config.clone());
    let openapi = ApiDoc::openapi();

    log::info!("🚀 Starting Lab Tasks API on port {}", config.port);
    log::info!("📋 Allowed frontend URLs: {:?}", config.frontend_urls);

    let bind_addr = ("0.0.0.0", config.port);

    HttpServer::new(move || {
        let mut cors = Cors::default()
            .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
            .allowed_headers(vec![
                "Authorization",
                "Content-Type",
                "Accept",
                "Origin",
                "X-Requested-With",
            ])
            .supports_credentials()
            .max_age(3600);

        for origin in &config.frontend_urls {
            cors = cors.allowed_origin(origin);
        }

        let static_dir = config.static_dir.clone();
        let spa_index = Path::new(&config.static_dir).join("index.html");

        App::new()
            .wrap(cors)
            .wrap(middleware::NormalizePath::trim())
            .wrap(middleware::Logger::default())
            .app_data(db_data.clone())
            .app_data(auth_data.clone())
            .app_data(config_data.clone())
            .configure(handlers::health_config)
            .configure(|cfg| handlers::auth_config(cfg, config.is_development()))
            .configure(handlers::project_config)
            .configure(handlers::task_config)
            .configure(handlers::comment_config)
            .configure(handlers::notification_config)
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-docs/openapi.json", openapi.clone()),
            )
            // Everything that is not an API route is the single-page app:
            // exact files are served as-is, anything else gets index.html so
            // client-side routing works after a refresh.
            .service(
                Files::new("/", &static_dir)
                    .index_file("index.html")
                    .default_handler(fn_service(move |req: ServiceRequest| {
                        let spa_index = spa_index.clone();
                        async move {
                            let (req, _) = req.into_parts();

                            if req.path().starts_with("/api") {
                                let resp = HttpResponse::NotFound().json(ErrorResponse {
                                    error: "Not Found".to_string(),
                                    message: None,
                                });
                                return Ok::<_, actix_web::Error>(ServiceResponse::new(req, resp));
                            }

                            match NamedFile::open_async(&spa_index).await {
                                Ok(file) => {
                                    let resp = file.into_response(&req);
                                    Ok(ServiceResponse::new(req, resp))
                                }
                                Err(e) => {
                                    log::error!("Failed to serve SPA entry point: {}", e);
                                    let resp = HttpResponse::NotFound().json(ErrorResponse {
                                        error: "Not Found".to_string(),
                                        message: None,
                                    });
                                    Ok(ServiceResponse::new(req, resp))
                                }
                            }
                        }
                    })),
            )
    })
    .bind(bind_addr)?
    .run()
    .await
}
