pub mod auth;
pub mod comment;
pub mod file;
pub mod health;
pub mod notification;
pub mod project;
pub mod task;

pub use auth::auth_config;
pub use comment::comment_config;
pub use health::health_config;
pub use notification::notification_config;
pub use project::project_config;
pub use task::task_config;
