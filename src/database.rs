use sqlx::{PgPool, Row};
use anyhow::{Result, Context};

pub struct Database {
    pub pool: PgPool,
}

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS users (
        id SERIAL PRIMARY KEY,
        username VARCHAR(80) NOT NULL UNIQUE,
        email VARCHAR(120) NOT NULL UNIQUE,
        password_hash VARCHAR(256) NOT NULL,
        role VARCHAR(20) NOT NULL DEFAULT 'team_member',
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        last_login TIMESTAMPTZ,
        is_active BOOLEAN NOT NULL DEFAULT TRUE
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS projects (
        id SERIAL PRIMARY KEY,
        name VARCHAR(100) NOT NULL,
        description TEXT,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        deadline TIMESTAMPTZ,
        status VARCHAR(20) NOT NULL DEFAULT 'active',
        creator_id INTEGER NOT NULL REFERENCES users(id)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS project_members (
        id SERIAL PRIMARY KEY,
        project_id INTEGER NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
        user_id INTEGER NOT NULL REFERENCES users(id),
        role VARCHAR(20) NOT NULL DEFAULT 'member',
        joined_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS tasks (
        id SERIAL PRIMARY KEY,
        title VARCHAR(100) NOT NULL,
        description TEXT,
        status VARCHAR(20) NOT NULL DEFAULT 'todo',
        priority VARCHAR(20) NOT NULL DEFAULT 'medium',
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        due_date TIMESTAMPTZ,
        start_date TIMESTAMPTZ,
        completed_at TIMESTAMPTZ,
        estimated_hours DOUBLE PRECISION,
        actual_hours DOUBLE PRECISION,
        assigned_to_id INTEGER REFERENCES users(id),
        creator_id INTEGER NOT NULL REFERENCES users(id),
        project_id INTEGER NOT NULL REFERENCES projects(id)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS comments (
        id SERIAL PRIMARY KEY,
        content TEXT NOT NULL,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        author_id INTEGER NOT NULL REFERENCES users(id),
        task_id INTEGER NOT NULL REFERENCES tasks(id) ON DELETE CASCADE
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS task_attachments (
        id SERIAL PRIMARY KEY,
        filename VARCHAR(255) NOT NULL,
        original_name VARCHAR(255) NOT NULL,
        file_path VARCHAR(512) NOT NULL,
        file_size BIGINT NOT NULL,
        mime_type VARCHAR(100) NOT NULL,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        task_id INTEGER NOT NULL REFERENCES tasks(id) ON DELETE CASCADE,
        uploaded_by INTEGER NOT NULL REFERENCES users(id)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS task_tags (
        id SERIAL PRIMARY KEY,
        name VARCHAR(50) NOT NULL,
        color VARCHAR(7) NOT NULL DEFAULT '#000000',
        task_id INTEGER NOT NULL REFERENCES tasks(id) ON DELETE CASCADE
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS notifications (
        id SERIAL PRIMARY KEY,
        user_id INTEGER NOT NULL REFERENCES users(id),
        title VARCHAR(100) NOT NULL,
        message TEXT NOT NULL,
        type VARCHAR(20) NOT NULL,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        read_at TIMESTAMPTZ,
        related_task_id INTEGER REFERENCES tasks(id) ON DELETE SET NULL,
        related_project_id INTEGER REFERENCES projects(id) ON DELETE SET NULL
    )
    "#,
];

const TABLES: &[&str] = &[
    "comments",
    "notifications",
    "project_members",
    "projects",
    "task_attachments",
    "task_tags",
    "tasks",
    "users",
];

impl Database {
    pub async fn new(database_url: &str) -> Result<Self> {
        log::info!("🔗 Connecting to database...");

        let pool = PgPool::connect(database_url)
            .await
            .context("Failed to connect to the database")?;

        log::info!("✅ Database connection established");

        Ok(Database { pool })
    }

    pub async fn health_check(&self) -> Result<()> {
        let row = sqlx::query("SELECT 1 as health_check")
            .fetch_one(&self.pool)
            .await
            .context("Failed to execute health check query")?;

        let result: i32 = row.get("health_check");

        if result == 1 {
            Ok(())
        } else {
            Err(anyhow::anyhow!("Database health check failed"))
        }
    }

    /// Create any missing tables. Idempotent, safe to run on every startup.
    pub async fn init_schema(&self) -> Result<()> {
        log::info!("📋 Ensuring database schema...");

        for statement in SCHEMA {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .context("Failed to create database table")?;
        }

        log::info!("✅ Database schema is up to date");
        Ok(())
    }

    pub async fn check_tables(&self) -> Result<()> {
        let tables = sqlx::query(
            r#"
            SELECT table_name
            FROM information_schema.tables
            WHERE table_schema = 'public'
            AND table_name = ANY($1)
            ORDER BY table_name
            "#,
        )
        .bind(TABLES)
        .fetch_all(&self.pool)
        .await
        .context("Failed to check database tables")?;

        let found_tables: Vec<String> = tables
            .iter()
            .map(|row| row.get::<String, _>("table_name"))
            .collect();

        log::info!("📊 Found tables: {:?}", found_tables);

        if found_tables.len() == TABLES.len() {
            log::info!("✅ All required tables exist");
        } else {
            log::warn!("⚠️  Some tables may be missing. Expected: {:?}", TABLES);
        }

        Ok(())
    }

    pub async fn get_stats(&self) -> Result<DatabaseStats> {
        let stats = sqlx::query(
            r#"
            SELECT
                (SELECT COUNT(*) FROM users) as user_count,
                (SELECT COUNT(*) FROM projects) as project_count,
                (SELECT COUNT(*) FROM tasks) as task_count,
                (SELECT COUNT(*) FROM notifications) as notification_count
            "#,
        )
        .fetch_one(&self.pool)
        .await
        .context("Failed to get database statistics")?;

        Ok(DatabaseStats {
            users: stats.get::<i64, _>("user_count"),
            projects: stats.get::<i64, _>("project_count"),
            tasks: stats.get::<i64, _>("task_count"),
            notifications: stats.get::<i64, _>("notification_count"),
        })
    }
}

#[derive(Debug)]
pub struct DatabaseStats {
    pub users: i64,
    pub projects: i64,
    pub tasks: i64,
    pub notifications: i64,
}

impl DatabaseStats {
    pub fn log_stats(&self) {
        log::info!("📈 Database Statistics:");
        log::info!("   👥 Users: {}", self.users);
        log::info!("   📁 Projects: {}", self.projects);
        log::info!("   📋 Tasks: {}", self.tasks);
        log::info!("   🔔 Notifications: {}", self.notifications);
    }
}
