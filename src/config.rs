use std::env;
use thiserror::Error;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub port: u16,
    pub jwt_secret: String,
    pub environment: String,
    pub frontend_urls: Vec<String>,
    pub static_dir: String,
    pub upload_dir: String,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingVariable(String),
    #[error("Invalid format: {0}")]
    InvalidFormat(String),
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();

        let database_url = env::var("DATABASE_URL")
            .map_err(|_| ConfigError::MissingVariable("DATABASE_URL".to_string()))?;

        let jwt_secret = env::var("JWT_SECRET")
            .map_err(|_| ConfigError::MissingVariable("JWT_SECRET".to_string()))?;

        let environment = env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string());

        let port = env::var("SERVER_PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse::<u16>()
            .map_err(|_| {
                ConfigError::InvalidFormat("SERVER_PORT must be a valid port number".to_string())
            })?;

        let frontend_urls = parse_origins(
            &env::var("CORS_ALLOWED_ORIGINS")
                .unwrap_or_else(|_| "http://localhost:3000".to_string()),
        );

        let static_dir =
            env::var("STATIC_DIR").unwrap_or_else(|_| "./frontend/build".to_string());

        let upload_dir = env::var("UPLOAD_DIR").unwrap_or_else(|_| "uploads".to_string());

        Ok(AppConfig {
            database_url,
            jwt_secret,
            environment,
            port,
            frontend_urls,
            static_dir,
            upload_dir,
        })
    }

    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn origins_are_split_and_trimmed() {
        let origins = parse_origins("http://localhost:3000, https://tasks.example.com ,");
        assert_eq!(
            origins,
            vec![
                "http://localhost:3000".to_string(),
                "https://tasks.example.com".to_string()
            ]
        );
    }

    #[test]
    fn single_origin_passes_through() {
        assert_eq!(
            parse_origins("http://localhost:3000"),
            vec!["http://localhost:3000".to_string()]
        );
    }
}
